use crate::tlv::{self, universal, TlvError};
use oid::ObjectIdentifier;
use picky_asn1::wrapper::{Asn1SequenceOf, ObjectIdentifierAsn1};

/// [RFC 5280 #4.2.1.12](https://tools.ietf.org/html/rfc5280#section-4.2.1.12)
///
/// ```not_rust
/// ExtKeyUsageSyntax ::= SEQUENCE SIZE (1..MAX) OF KeyPurposeId
/// KeyPurposeId ::= OBJECT IDENTIFIER
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtendedKeyUsage(pub Vec<ObjectIdentifier>);

impl ExtendedKeyUsage {
    pub fn new<OID: Into<ObjectIdentifier>>(purposes: Vec<OID>) -> Self {
        Self(purposes.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, purpose: &ObjectIdentifier) -> bool {
        self.0.iter().any(|candidate| candidate == purpose)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObjectIdentifier> {
        self.0.iter()
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        tlv::expect_single(der, universal::SEQUENCE)?;
        let purposes: Asn1SequenceOf<ObjectIdentifierAsn1> =
            picky_asn1_der::from_bytes(der).map_err(|e| TlvError::der("extended key usage", e))?;
        Ok(Self(purposes.0.into_iter().map(|oid| oid.0).collect()))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let purposes = Asn1SequenceOf(self.0.iter().cloned().map(ObjectIdentifierAsn1).collect::<Vec<_>>());
        picky_asn1_der::to_vec(&purposes).map_err(|e| TlvError::der("extended key usage", e))
    }
}

impl_serde_from_der!(ExtendedKeyUsage);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oids;
    use pretty_assertions::assert_eq;

    #[test]
    fn server_and_client_auth() {
        let der = [
            0x30, 0x14, 0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x01, 0x06, 0x08, 0x2B, 0x06, 0x01, 0x05,
            0x05, 0x07, 0x03, 0x02,
        ];
        let eku = ExtendedKeyUsage::from_der(&der).unwrap();
        assert_eq!(eku, ExtendedKeyUsage::new(vec![oids::kp_server_auth(), oids::kp_client_auth()]));
        assert!(eku.contains(&oids::kp_client_auth()));
        assert!(!eku.contains(&oids::kp_code_signing()));
        assert_eq!(eku.to_der().unwrap(), der);
    }
}
