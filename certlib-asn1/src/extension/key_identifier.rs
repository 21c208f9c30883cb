use crate::general_name::GeneralNames;
use crate::tlv::{self, universal, SequenceReader, SequenceWriter, TlvError};
use picky_asn1::wrapper::{IntegerAsn1, OctetStringAsn1};

/// [RFC 5280 #4.2.1.2](https://tools.ietf.org/html/rfc5280#section-4.2.1.2)
///
/// ```not_rust
/// SubjectKeyIdentifier ::= KeyIdentifier
/// KeyIdentifier ::= OCTET STRING
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectKeyIdentifier(pub Vec<u8>);

impl SubjectKeyIdentifier {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        tlv::expect_single(der, universal::OCTET_STRING)?;
        let key_id: OctetStringAsn1 =
            picky_asn1_der::from_bytes(der).map_err(|e| TlvError::der("subject key identifier", e))?;
        Ok(Self(key_id.0))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        picky_asn1_der::to_vec(&OctetStringAsn1(self.0.clone())).map_err(|e| TlvError::der("subject key identifier", e))
    }
}

impl_serde_from_der!(SubjectKeyIdentifier);

/// [RFC 5280 #4.2.1.1](https://tools.ietf.org/html/rfc5280#section-4.2.1.1)
///
/// ```not_rust
/// AuthorityKeyIdentifier ::= SEQUENCE {
///   keyIdentifier             [0] KeyIdentifier           OPTIONAL,
///   authorityCertIssuer       [1] GeneralNames            OPTIONAL,
///   authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL  }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorityKeyIdentifier {
    pub key_identifier: Option<Vec<u8>>,
    pub authority_cert_issuer: Option<GeneralNames>,
    /// INTEGER content octets
    pub authority_cert_serial_number: Option<Vec<u8>>,
}

impl AuthorityKeyIdentifier {
    pub fn from_key_identifier<V: Into<Vec<u8>>>(key_identifier: V) -> Self {
        Self {
            key_identifier: Some(key_identifier.into()),
            ..Self::default()
        }
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let key_identifier: Option<OctetStringAsn1> =
            reader.next_implicit(0, universal::OCTET_STRING, "keyIdentifier")?;
        let authority_cert_issuer: Option<GeneralNames> =
            reader.next_implicit(1, universal::SEQUENCE, "authorityCertIssuer")?;
        let authority_cert_serial_number: Option<IntegerAsn1> =
            reader.next_implicit(2, universal::INTEGER, "authorityCertSerialNumber")?;
        reader.finish()?;

        Ok(Self {
            key_identifier: key_identifier.map(|key_id| key_id.0),
            authority_cert_issuer,
            authority_cert_serial_number: authority_cert_serial_number.map(|serial| serial.0),
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        if let Some(key_identifier) = &self.key_identifier {
            writer.push_implicit(
                &OctetStringAsn1(key_identifier.clone()),
                tlv::context_primitive(0),
                "keyIdentifier",
            )?;
        }
        if let Some(issuer) = &self.authority_cert_issuer {
            writer.push_implicit(issuer, tlv::context_constructed(1), "authorityCertIssuer")?;
        }
        if let Some(serial) = &self.authority_cert_serial_number {
            writer.push_implicit(
                &IntegerAsn1(serial.clone()),
                tlv::context_primitive(2),
                "authorityCertSerialNumber",
            )?;
        }
        Ok(writer.finish_sequence())
    }
}

impl_serde_from_der!(AuthorityKeyIdentifier);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::general_name::GeneralName;
    use crate::name::Name;
    use pretty_assertions::assert_eq;

    const KEY_ID: [u8; 20] = [
        0xBD, 0xB2, 0xF7, 0xBB, 0x43, 0x2A, 0x72, 0xDC, 0xA5, 0x0A, 0x26, 0x50, 0x3A, 0x0B, 0xF6, 0xE0, 0xB4, 0x4D,
        0x4D, 0x04,
    ];

    #[test]
    fn subject_key_identifier() {
        let mut der = vec![0x04, 0x14];
        der.extend_from_slice(&KEY_ID);
        let ski = SubjectKeyIdentifier::from_der(&der).unwrap();
        assert_eq!(ski.as_bytes(), KEY_ID);
        assert_eq!(ski.to_der().unwrap(), der);
    }

    #[test]
    fn key_identifier_only() {
        let mut der = vec![0x30, 0x16, 0x80, 0x14];
        der.extend_from_slice(&KEY_ID);

        let aki = AuthorityKeyIdentifier::from_der(&der).unwrap();
        assert_eq!(aki, AuthorityKeyIdentifier::from_key_identifier(KEY_ID.to_vec()));
        assert_eq!(aki.to_der().unwrap(), der);

        let again = AuthorityKeyIdentifier::from_der(&aki.to_der().unwrap()).unwrap();
        assert!(again.authority_cert_issuer.is_none());
        assert!(again.authority_cert_serial_number.is_none());
    }

    #[test]
    fn all_fields() {
        let aki = AuthorityKeyIdentifier {
            key_identifier: Some(vec![1, 2, 3]),
            authority_cert_issuer: Some(GeneralName::new_directory_name(Name::new_common_name("ca")).into()),
            authority_cert_serial_number: Some(vec![0x00, 0x80]),
        };
        let der = aki.to_der().unwrap();
        assert_eq!(&der[2..7], &[0x80, 0x03, 1, 2, 3]);
        assert_eq!(der[7], 0xA1);
        assert_eq!(&der[der.len() - 4..], &[0x82, 0x02, 0x00, 0x80]);
        assert_eq!(AuthorityKeyIdentifier::from_der(&der).unwrap(), aki);
    }
}
