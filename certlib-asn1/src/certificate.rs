use crate::algorithm_identifier::AlgorithmIdentifier;
use crate::extension::Extensions;
use crate::name::Name;
use crate::signed::{self, SignedParts};
use crate::time::Time;
use crate::tlv::{self, universal, SequenceReader, SequenceWriter, TlvError};
use picky_asn1::wrapper::IntegerAsn1;

/// ```not_rust
/// Version  ::=  INTEGER  {  v1(0), v2(1), v3(2)  }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Version {
    V1,
    V2,
    V3,
}

impl Version {
    pub fn to_u8(self) -> u8 {
        match self {
            Version::V1 => 0,
            Version::V2 => 1,
            Version::V3 => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Version::V1),
            1 => Some(Version::V2),
            2 => Some(Version::V3),
            _ => None,
        }
    }

    pub(crate) fn from_integer(integer: &IntegerAsn1) -> Result<Self, TlvError> {
        tlv::content_to_u32(&integer.0)
            .and_then(|value| u8::try_from(value).ok())
            .and_then(Self::from_u8)
            .ok_or(TlvError::Der {
                element: "version",
                message: "unknown version".to_owned(),
            })
    }

    pub(crate) fn to_integer(self) -> IntegerAsn1 {
        IntegerAsn1(vec![self.to_u8()])
    }
}

/// [RFC 5280 #4.1.2.5](https://tools.ietf.org/html/rfc5280#section-4.1.2.5)
///
/// ```not_rust
/// Validity ::= SEQUENCE {
///      notBefore      Time,
///      notAfter       Time }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validity {
    pub not_before: Time,
    pub not_after: Time,
}

impl Validity {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let not_before = Time::from_element(reader.next_raw("notBefore")?)?;
        let not_after = Time::from_element(reader.next_raw("notAfter")?)?;
        reader.finish()?;

        Ok(Self { not_before, not_after })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        writer.push_raw(&self.not_before.to_element());
        writer.push_raw(&self.not_after.to_element());
        Ok(writer.finish_sequence())
    }
}

/// [RFC 5280 #4.1.2.7](https://tools.ietf.org/html/rfc5280#section-4.1.2.7)
///
/// ```not_rust
/// SubjectPublicKeyInfo  ::=  SEQUENCE  {
///      algorithm            AlgorithmIdentifier,
///      subjectPublicKey     BIT STRING  }
/// ```
///
/// The key itself stays opaque: it is handed over to whatever performs verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPublicKeyInfo {
    pub algorithm: AlgorithmIdentifier,
    /// BIT STRING content octets, unused-bits octet included
    pub subject_public_key: Vec<u8>,
}

impl SubjectPublicKeyInfo {
    pub fn new(algorithm: AlgorithmIdentifier, key_bytes: &[u8]) -> Self {
        let mut subject_public_key = Vec::with_capacity(key_bytes.len() + 1);
        subject_public_key.push(0);
        subject_public_key.extend_from_slice(key_bytes);
        Self {
            algorithm,
            subject_public_key,
        }
    }

    /// Key bytes, without the unused-bits octet.
    pub fn key_bytes(&self) -> &[u8] {
        self.subject_public_key.get(1..).unwrap_or(&[])
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let algorithm = AlgorithmIdentifier::from_der(reader.next_raw("algorithm")?)?;
        let subject_public_key = bit_string_content(reader.next_raw("subjectPublicKey")?)?;
        reader.finish()?;

        Ok(Self {
            algorithm,
            subject_public_key,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        writer.push_raw(&self.algorithm.to_der()?);
        writer.push_raw(&tlv::encode(universal::BIT_STRING, &self.subject_public_key));
        Ok(writer.finish_sequence())
    }
}

pub(crate) fn bit_string_content(element: &[u8]) -> Result<Vec<u8>, TlvError> {
    let content = tlv::expect_single(element, universal::BIT_STRING)?;
    match content.first() {
        Some(unused) if *unused < 8 => Ok(content.to_vec()),
        Some(_) => Err(TlvError::Der {
            element: "bit string",
            message: "invalid unused bits count".to_owned(),
        }),
        None => Err(TlvError::Missing("bit string unused bits")),
    }
}

/// [RFC 5280 #4.1](https://tools.ietf.org/html/rfc5280#section-4.1)
///
/// ```not_rust
/// TBSCertificate  ::=  SEQUENCE  {
///      version         [0]  EXPLICIT Version DEFAULT v1,
///      serialNumber         CertificateSerialNumber,
///      signature            AlgorithmIdentifier,
///      issuer               Name,
///      validity             Validity,
///      subject              Name,
///      subjectPublicKeyInfo SubjectPublicKeyInfo,
///      issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
///                           -- If present, version MUST be v2 or v3
///      subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
///                           -- If present, version MUST be v2 or v3
///      extensions      [3]  EXPLICIT Extensions OPTIONAL
///                           -- If present, version MUST be v3
///      }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TbsCertificate {
    /// `None` when the DEFAULT (v1) was relied upon.
    pub version: Option<Version>,
    /// INTEGER content octets
    pub serial_number: Vec<u8>,
    pub signature: AlgorithmIdentifier,
    pub issuer: Name,
    pub validity: Validity,
    pub subject: Name,
    pub subject_public_key_info: SubjectPublicKeyInfo,
    /// BIT STRING content octets
    pub issuer_unique_id: Option<Vec<u8>>,
    /// BIT STRING content octets
    pub subject_unique_id: Option<Vec<u8>>,
    pub extensions: Option<Extensions>,
}

impl TbsCertificate {
    pub fn effective_version(&self) -> Version {
        self.version.unwrap_or(Version::V1)
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let version = reader
            .next_explicit::<IntegerAsn1>(0, "version")?
            .map(|integer| Version::from_integer(&integer))
            .transpose()?;
        let serial_number: IntegerAsn1 = reader.next("serialNumber")?;
        let signature = AlgorithmIdentifier::from_der(reader.next_raw("signature")?)?;
        let issuer = Name::from_der(reader.next_raw("issuer")?)?;
        let validity = Validity::from_der(reader.next_raw("validity")?)?;
        let subject = Name::from_der(reader.next_raw("subject")?)?;
        let subject_public_key_info = SubjectPublicKeyInfo::from_der(reader.next_raw("subjectPublicKeyInfo")?)?;
        let issuer_unique_id = read_unique_id(&mut reader, 1)?;
        let subject_unique_id = read_unique_id(&mut reader, 2)?;
        let extensions = match reader.next_raw_if(tlv::context_constructed(3)) {
            Some(element) => Some(Extensions::from_der(tlv::expect_single(
                element,
                tlv::context_constructed(3),
            )?)?),
            None => None,
        };
        reader.finish()?;

        Ok(Self {
            version,
            serial_number: serial_number.0,
            signature,
            issuer,
            validity,
            subject,
            subject_public_key_info,
            issuer_unique_id,
            subject_unique_id,
            extensions,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        if let Some(version) = self.version {
            writer.push_explicit(&version.to_integer(), 0, "version")?;
        }
        writer.push(&IntegerAsn1(self.serial_number.clone()), "serialNumber")?;
        writer.push_raw(&self.signature.to_der()?);
        writer.push_raw(&self.issuer.to_der()?);
        writer.push_raw(&self.validity.to_der()?);
        writer.push_raw(&self.subject.to_der()?);
        writer.push_raw(&self.subject_public_key_info.to_der()?);
        if let Some(unique_id) = &self.issuer_unique_id {
            writer.push_raw(&tlv::encode(tlv::context_primitive(1), unique_id));
        }
        if let Some(unique_id) = &self.subject_unique_id {
            writer.push_raw(&tlv::encode(tlv::context_primitive(2), unique_id));
        }
        if let Some(extensions) = &self.extensions {
            writer.push_raw(&tlv::encode(tlv::context_constructed(3), &extensions.to_der()?));
        }
        Ok(writer.finish_sequence())
    }
}

fn read_unique_id(reader: &mut SequenceReader<'_>, number: u8) -> Result<Option<Vec<u8>>, TlvError> {
    match reader.next_raw_if(tlv::context_primitive(number)) {
        Some(element) => {
            let element = tlv::retag(element.to_vec(), universal::BIT_STRING)?;
            bit_string_content(&element).map(Some)
        }
        None => Ok(None),
    }
}

/// [RFC 5280 #4.1](https://tools.ietf.org/html/rfc5280#section-4.1)
///
/// ```not_rust
/// Certificate  ::=  SEQUENCE  {
///      tbsCertificate       TBSCertificate,
///      signatureAlgorithm   AlgorithmIdentifier,
///      signatureValue       BIT STRING  }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub tbs_certificate: TbsCertificate,
    pub signature_algorithm: AlgorithmIdentifier,
    /// BIT STRING content octets
    pub signature_value: Vec<u8>,
}

impl Certificate {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let SignedParts {
            tbs,
            algorithm,
            signature,
        } = signed::split(der)?;

        Ok(Self {
            tbs_certificate: TbsCertificate::from_der(tbs)?,
            signature_algorithm: AlgorithmIdentifier::from_der(algorithm)?,
            signature_value: bit_string_content(signature)?,
        })
    }

    /// Re-encodes every part. To keep the signed bytes intact, use [`signed::split`] instead.
    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        Ok(signed::join(
            &self.tbs_certificate.to_der()?,
            &self.signature_algorithm.to_der()?,
            &tlv::encode(universal::BIT_STRING, &self.signature_value),
        ))
    }
}

impl_serde_from_der!(Validity, SubjectPublicKeyInfo, TbsCertificate, Certificate);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oids;
    use crate::time::UtcDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_leaf_certificate() {
        let cert = Certificate::from_der(certlib_test_data::LEAF_CERT_DER).unwrap();
        let tbs = &cert.tbs_certificate;

        assert_eq!(tbs.version, Some(Version::V3));
        assert_eq!(tbs.serial_number, [0x10, 0x01]);
        assert_eq!(tbs.signature, AlgorithmIdentifier::new_ecdsa_with_sha256());
        assert_eq!(tbs.issuer.find_common_name().as_deref(), Some("Example Issuing CA"));
        assert_eq!(tbs.subject.find_common_name().as_deref(), Some("leaf.example.com"));
        assert_eq!(
            tbs.validity.not_after.to_date().unwrap(),
            UtcDate::ymd(2026, 1, 1).unwrap()
        );
        assert!(tbs.subject_public_key_info.algorithm.is_a(&oids::ec_public_key()));
        assert_eq!(tbs.subject_public_key_info.key_bytes().len(), 65);
        assert!(tbs.issuer_unique_id.is_none());

        let extensions = tbs.extensions.as_ref().unwrap();
        assert_eq!(extensions.len(), 8);
        assert_eq!(Into::<String>::into(extensions.0[7].extn_id()), "1.2.3.4.5");
    }

    #[test]
    fn tbs_reencodes_identically() {
        for der in [certlib_test_data::CA_CERT_DER, certlib_test_data::LEAF_CERT_DER] {
            let parts = signed::split(der).unwrap();
            let tbs = TbsCertificate::from_der(parts.tbs).unwrap();
            assert_eq!(tbs.to_der().unwrap(), parts.tbs);

            let cert = Certificate::from_der(der).unwrap();
            assert_eq!(cert.to_der().unwrap(), der);
        }
    }

    #[test]
    fn unique_identifiers() {
        let mut tbs = Certificate::from_der(certlib_test_data::CA_CERT_DER).unwrap().tbs_certificate;
        tbs.issuer_unique_id = Some(vec![0x00, 0x01, 0x02]);
        tbs.subject_unique_id = Some(vec![0x04, 0xF0]);

        let encoded = tbs.to_der().unwrap();
        let decoded = TbsCertificate::from_der(&encoded).unwrap();
        assert_eq!(decoded.issuer_unique_id, Some(vec![0x00, 0x01, 0x02]));
        assert_eq!(decoded.subject_unique_id, Some(vec![0x04, 0xF0]));
        assert_eq!(decoded, tbs);
    }

    #[test]
    fn v1_certificate_without_version() {
        let mut tbs = Certificate::from_der(certlib_test_data::CA_CERT_DER).unwrap().tbs_certificate;
        tbs.version = None;
        tbs.extensions = None;

        let encoded = tbs.to_der().unwrap();
        assert_eq!(&encoded[4..7], &[0x02, 0x01, 0x2A]);
        let decoded = TbsCertificate::from_der(&encoded).unwrap();
        assert_eq!(decoded.effective_version(), Version::V1);
    }
}
