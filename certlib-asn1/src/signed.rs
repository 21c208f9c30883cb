//! Envelope shared by certificates and CRLs.
//!
//! ```not_rust
//! SEQUENCE {
//!      tbs                  SEQUENCE,
//!      signatureAlgorithm   AlgorithmIdentifier,
//!      signatureValue       BIT STRING }
//! ```
//!
//! Only the outer header is ever parsed or written here, the three parts are moved around as
//! they appeared on the wire.

use crate::tlv::{self, universal, TlvError};

/// The three elements of a signed object, each one a complete TLV borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedParts<'a> {
    pub tbs: &'a [u8],
    pub algorithm: &'a [u8],
    pub signature: &'a [u8],
}

impl<'a> SignedParts<'a> {
    /// Content octets of the signature BIT STRING, unused-bits octet included.
    pub fn signature_content(&self) -> Result<&'a [u8], TlvError> {
        tlv::expect_single(self.signature, universal::BIT_STRING)
    }
}

pub fn split(signed: &[u8]) -> Result<SignedParts<'_>, TlvError> {
    let content = tlv::expect_single(signed, universal::SEQUENCE)?;
    let (tbs, rest) = tlv::split_element(content)?;
    let (algorithm, rest) = tlv::split_element(rest)?;
    let (signature, rest) = tlv::split_element(rest)?;
    if !rest.is_empty() {
        return Err(TlvError::TrailingData(rest.len()));
    }

    for (element, expected) in [
        (tbs, universal::SEQUENCE),
        (algorithm, universal::SEQUENCE),
        (signature, universal::BIT_STRING),
    ] {
        if element[0] != expected {
            return Err(TlvError::UnexpectedTag {
                expected,
                actual: element[0],
            });
        }
    }

    Ok(SignedParts {
        tbs,
        algorithm,
        signature,
    })
}

/// Wraps pre-encoded parts in a new outer SEQUENCE.
pub fn join(tbs: &[u8], algorithm: &[u8], signature: &[u8]) -> Vec<u8> {
    let mut content = Vec::with_capacity(tbs.len() + algorithm.len() + signature.len());
    content.extend_from_slice(tbs);
    content.extend_from_slice(algorithm);
    content.extend_from_slice(signature);
    tlv::encode(universal::SEQUENCE, &content)
}

/// Encodes `signature_bits` as a BIT STRING with no unused bits, ready for [`join`].
pub fn signature_bit_string(signature_bits: &[u8]) -> Vec<u8> {
    let mut content = Vec::with_capacity(signature_bits.len() + 1);
    content.push(0);
    content.extend_from_slice(signature_bits);
    tlv::encode(universal::BIT_STRING, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_then_join_is_identity() {
        for der in [
            certlib_test_data::CA_CERT_DER,
            certlib_test_data::LEAF_CERT_DER,
            certlib_test_data::CA_CRL_DER,
        ] {
            let parts = split(der).unwrap();
            assert_eq!(parts.tbs[0], 0x30);
            assert_eq!(parts.algorithm[0], 0x30);
            assert_eq!(parts.signature[0], 0x03);
            assert_eq!(join(parts.tbs, parts.algorithm, parts.signature), der);
        }
    }

    #[test]
    fn parts_are_exact_slices() {
        let der = certlib_test_data::CA_CRL_DER;
        let parts = split(der).unwrap();
        // 30 82 01 35 | 30 81 DC ...
        assert_eq!(parts.tbs.as_ptr(), der[4..].as_ptr());
        assert_eq!(parts.tbs.len(), 0xDC + 3);
        assert_eq!(parts.signature_content().unwrap()[0], 0x00);
    }

    #[test]
    fn rejects_malformed_envelopes() {
        let der = certlib_test_data::CA_CERT_DER;

        let mut trailing = der.to_vec();
        trailing.push(0);
        assert_eq!(split(&trailing), Err(TlvError::TrailingData(1)));

        let parts = split(der).unwrap();
        let missing_signature = join(parts.tbs, parts.algorithm, &[]);
        assert_eq!(split(&missing_signature), Err(TlvError::Empty));

        let wrong_tag = join(parts.tbs, parts.algorithm, &[0x04, 0x01, 0x00]);
        assert_eq!(
            split(&wrong_tag),
            Err(TlvError::UnexpectedTag {
                expected: universal::BIT_STRING,
                actual: 0x04
            })
        );
    }

    #[test]
    fn oversized_length_is_an_error() {
        let mut der = vec![0x30, 0x88];
        der.extend_from_slice(&[0xFF; 8]);
        assert_eq!(split(&der), Err(TlvError::LengthOverflow(8)));

        // same length field on the TBS inside a well-formed outer header
        let inner = [0x30, 0x88, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(split(&tlv::encode(universal::SEQUENCE, &inner)), Err(TlvError::LengthOverflow(8)));
    }

    #[test]
    fn signature_bits() {
        assert_eq!(signature_bit_string(&[0xAB, 0xCD]), [0x03, 0x03, 0x00, 0xAB, 0xCD]);
    }
}
