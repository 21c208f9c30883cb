//! Boundary with the cryptography provider.
//!
//! This crate never computes signatures itself. Callers plug a [`SignatureService`] in and the
//! helpers below take care of wrapping and unwrapping the signed envelope.

use crate::error::CodecError;
use crate::field::{FieldValue, TbsField};
use crate::item::CertItem;
use certlib_asn1::{signed, tlv, AlgorithmIdentifier};
use rand::Rng;
use std::fmt;

pub trait SignatureService {
    type PrivateKey: ?Sized;
    type PublicKey: ?Sized;
    type Error: fmt::Display;

    /// Signs `tbs`, returning the raw signature bits.
    fn sign(&self, tbs: &[u8], algorithm: &AlgorithmIdentifier, key: &Self::PrivateKey) -> Result<Vec<u8>, Self::Error>;

    fn verify(
        &self,
        tbs: &[u8],
        algorithm: &AlgorithmIdentifier,
        signature: &[u8],
        public_key: &Self::PublicKey,
    ) -> Result<bool, Self::Error>;
}

fn service_error<E: fmt::Display>(e: E) -> CodecError {
    CodecError::Signature { context: e.to_string() }
}

/// Signs an encoded TBS and wraps it into a complete signed object.
pub fn sign_encoded<S: SignatureService>(
    tbs: &[u8],
    algorithm: &AlgorithmIdentifier,
    key: &S::PrivateKey,
    service: &S,
) -> Result<Vec<u8>, CodecError> {
    let signature_bits = service.sign(tbs, algorithm, key).map_err(service_error)?;
    let algorithm_der = algorithm.to_der().map_err(CodecError::encode("signature algorithm"))?;
    log::trace!("signed {} bytes of TBS with {}", tbs.len(), Into::<String>::into(algorithm.algorithm()));

    Ok(signed::join(
        tbs,
        &algorithm_der,
        &signed::signature_bit_string(&signature_bits),
    ))
}

/// Checks the signature of a signed certificate or CRL against `public_key`.
pub fn verify_signed<S: SignatureService>(
    signed: &[u8],
    public_key: &S::PublicKey,
    service: &S,
) -> Result<bool, CodecError> {
    let parts = signed::split(signed).map_err(CodecError::decode("signed object"))?;
    let algorithm =
        AlgorithmIdentifier::from_der(parts.algorithm).map_err(CodecError::decode("signature algorithm"))?;
    let signature_bits = match parts
        .signature_content()
        .map_err(CodecError::decode("signature value"))?
    {
        [0, bits @ ..] => bits,
        _ => {
            return Err(CodecError::Signature {
                context: "signature value has unused bits".to_owned(),
            })
        }
    };

    service
        .verify(parts.tbs, &algorithm, signature_bits, public_key)
        .map_err(service_error)
}

/// Random positive serial number, as INTEGER content octets.
pub fn generate_serial_number() -> Vec<u8> {
    let x = rand::thread_rng().gen_range(1..=u32::MAX);
    // serial number MUST be a positive integer
    tlv::unsigned_content(&x.to_be_bytes())
}

impl CertItem {
    /// Sets a freshly generated serial number on a certificate being built.
    pub fn set_generated_serial_number(&mut self) -> Result<(), CodecError> {
        self.set(
            &TbsField::SerialNumber.into(),
            FieldValue::Integer(generate_serial_number()),
        )
    }
}
