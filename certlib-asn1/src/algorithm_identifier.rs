use crate::oids;
use crate::tlv::{self, universal, SequenceReader, SequenceWriter, TlvError};
use oid::ObjectIdentifier;
use picky_asn1::wrapper::ObjectIdentifierAsn1;
use picky_asn1_der::Asn1RawDer;
use serde::{de, ser, Deserialize, Serialize};

const NULL_ELEMENT: [u8; 2] = [universal::NULL, 0x00];

/// [RFC 5280 #4.1.1.2](https://tools.ietf.org/html/rfc5280#section-4.1.1.2)
///
/// ```not_rust
/// AlgorithmIdentifier  ::=  SEQUENCE  {
///      algorithm               OBJECT IDENTIFIER,
///      parameters              ANY DEFINED BY algorithm OPTIONAL  }
/// ```
///
/// Parameters are carried as their encoded element. Absent and explicit NULL parameters are
/// different encodings and are kept apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    algorithm: ObjectIdentifier,
    parameters: Option<Vec<u8>>,
}

impl AlgorithmIdentifier {
    pub fn new(algorithm: ObjectIdentifier, parameters: Option<Vec<u8>>) -> Self {
        Self { algorithm, parameters }
    }

    pub fn new_ecdsa_with_sha256() -> Self {
        Self::new(oids::ecdsa_with_sha256(), None)
    }

    pub fn new_ecdsa_with_sha384() -> Self {
        Self::new(oids::ecdsa_with_sha384(), None)
    }

    pub fn new_sha256_with_rsa_encryption() -> Self {
        Self::new(oids::sha256_with_rsa_encryption(), Some(NULL_ELEMENT.to_vec()))
    }

    pub fn new_sha384_with_rsa_encryption() -> Self {
        Self::new(oids::sha384_with_rsa_encryption(), Some(NULL_ELEMENT.to_vec()))
    }

    pub fn new_ed25519() -> Self {
        Self::new(oids::ed25519(), None)
    }

    pub fn new_elliptic_curve(named_curve: &ObjectIdentifier) -> Result<Self, TlvError> {
        let parameters = picky_asn1_der::to_vec(&ObjectIdentifierAsn1(named_curve.clone()))
            .map_err(|e| TlvError::der("named curve", e))?;
        Ok(Self::new(oids::ec_public_key(), Some(parameters)))
    }

    pub fn algorithm(&self) -> &ObjectIdentifier {
        &self.algorithm
    }

    pub fn parameters(&self) -> Option<&[u8]> {
        self.parameters.as_deref()
    }

    pub fn is_a(&self, algorithm: &ObjectIdentifier) -> bool {
        &self.algorithm == algorithm
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let algorithm: ObjectIdentifierAsn1 = reader.next("algorithm")?;
        let parameters = if reader.is_empty() {
            None
        } else {
            Some(reader.next_raw("parameters")?.to_vec())
        };
        reader.finish()?;

        Ok(Self {
            algorithm: algorithm.0,
            parameters,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        writer.push(&ObjectIdentifierAsn1(self.algorithm.clone()), "algorithm")?;
        if let Some(parameters) = &self.parameters {
            tlv::parse_single(parameters)?;
            writer.push_raw(parameters);
        }
        Ok(writer.finish_sequence())
    }
}

impl ser::Serialize for AlgorithmIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<<S as ser::Serializer>::Ok, <S as ser::Serializer>::Error>
    where
        S: ser::Serializer,
    {
        let der = self.to_der().map_err(ser::Error::custom)?;
        Asn1RawDer(der).serialize(serializer)
    }
}

impl<'de> de::Deserialize<'de> for AlgorithmIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        let raw = Asn1RawDer::deserialize(deserializer)?;
        AlgorithmIdentifier::from_der(&raw.0).map_err(de::Error::custom)
    }
}
