use crate::algorithm_identifier::AlgorithmIdentifier;
use crate::certificate::{bit_string_content, Version};
use crate::extension::Extensions;
use crate::name::Name;
use crate::signed::{self, SignedParts};
use crate::time::Time;
use crate::tlv::{self, universal, SequenceReader, SequenceWriter, TlvError};
use picky_asn1::wrapper::{Asn1SequenceOf, IntegerAsn1};

/// [RFC 5280 #5.1](https://tools.ietf.org/html/rfc5280#section-5.1)
///
/// ```not_rust
/// revokedCertificates     SEQUENCE OF SEQUENCE  {
///      userCertificate         CertificateSerialNumber,
///      revocationDate          Time,
///      crlEntryExtensions      Extensions OPTIONAL
///                               -- if present, version MUST be v2
///                           }  OPTIONAL,
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedCertificate {
    /// INTEGER content octets
    pub user_certificate: Vec<u8>,
    pub revocation_date: Time,
    pub crl_entry_extensions: Option<Extensions>,
}

impl RevokedCertificate {
    pub fn new(user_certificate: Vec<u8>, revocation_date: Time) -> Self {
        Self {
            user_certificate,
            revocation_date,
            crl_entry_extensions: None,
        }
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let user_certificate: IntegerAsn1 = reader.next("userCertificate")?;
        let revocation_date = Time::from_element(reader.next_raw("revocationDate")?)?;
        let crl_entry_extensions = match reader.next_raw_if(universal::SEQUENCE) {
            Some(element) => Some(Extensions::from_der(element)?),
            None => None,
        };
        reader.finish()?;

        Ok(Self {
            user_certificate: user_certificate.0,
            revocation_date,
            crl_entry_extensions,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        writer.push(&IntegerAsn1(self.user_certificate.clone()), "userCertificate")?;
        writer.push_raw(&self.revocation_date.to_element());
        if let Some(extensions) = &self.crl_entry_extensions {
            writer.push_raw(&extensions.to_der()?);
        }
        Ok(writer.finish_sequence())
    }
}

/// [RFC 5280 #5.1](https://tools.ietf.org/html/rfc5280#section-5.1)
///
/// ```not_rust
/// TBSCertList  ::=  SEQUENCE  {
///      version                 Version OPTIONAL,
///                                   -- if present, MUST be v2
///      signature               AlgorithmIdentifier,
///      issuer                  Name,
///      thisUpdate              Time,
///      nextUpdate              Time OPTIONAL,
///      revokedCertificates     SEQUENCE OF RevokedCertificate OPTIONAL,
///      crlExtensions           [0]  EXPLICIT Extensions OPTIONAL
///                                   -- if present, version MUST be v2
///                           }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TbsCertList {
    pub version: Option<Version>,
    pub signature: AlgorithmIdentifier,
    pub issuer: Name,
    pub this_update: Time,
    pub next_update: Option<Time>,
    pub revoked_certificates: Option<Vec<RevokedCertificate>>,
    pub crl_extensions: Option<Extensions>,
}

impl TbsCertList {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let version = reader
            .next_if::<IntegerAsn1>(universal::INTEGER, "version")?
            .map(|integer| Version::from_integer(&integer))
            .transpose()?;
        let signature = AlgorithmIdentifier::from_der(reader.next_raw("signature")?)?;
        let issuer = Name::from_der(reader.next_raw("issuer")?)?;
        let this_update = Time::from_element(reader.next_raw("thisUpdate")?)?;
        let next_update = match reader.peek_tag() {
            Some(tag) if Time::is_time_tag(tag) => Some(Time::from_element(reader.next_raw("nextUpdate")?)?),
            _ => None,
        };
        let revoked_certificates = match reader.next_raw_if(universal::SEQUENCE) {
            Some(element) => Some(
                tlv::elements(tlv::expect_single(element, universal::SEQUENCE)?)?
                    .into_iter()
                    .map(RevokedCertificate::from_der)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };
        let crl_extensions = match reader.next_raw_if(tlv::context_constructed(0)) {
            Some(element) => Some(Extensions::from_der(tlv::expect_single(
                element,
                tlv::context_constructed(0),
            )?)?),
            None => None,
        };
        reader.finish()?;

        Ok(Self {
            version,
            signature,
            issuer,
            this_update,
            next_update,
            revoked_certificates,
            crl_extensions,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        if let Some(version) = self.version {
            writer.push(&version.to_integer(), "version")?;
        }
        writer.push_raw(&self.signature.to_der()?);
        writer.push_raw(&self.issuer.to_der()?);
        writer.push_raw(&self.this_update.to_element());
        if let Some(next_update) = &self.next_update {
            writer.push_raw(&next_update.to_element());
        }
        if let Some(revoked) = &self.revoked_certificates {
            writer.push(&Asn1SequenceOf(revoked.iter().collect::<Vec<_>>()), "revokedCertificates")?;
        }
        if let Some(extensions) = &self.crl_extensions {
            writer.push_raw(&tlv::encode(tlv::context_constructed(0), &extensions.to_der()?));
        }
        Ok(writer.finish_sequence())
    }
}

/// [RFC 5280 #5.1](https://tools.ietf.org/html/rfc5280#section-5.1)
///
/// ```not_rust
/// CertificateList  ::=  SEQUENCE  {
///      tbsCertList          TBSCertList,
///      signatureAlgorithm   AlgorithmIdentifier,
///      signatureValue       BIT STRING  }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateList {
    pub tbs_cert_list: TbsCertList,
    pub signature_algorithm: AlgorithmIdentifier,
    /// BIT STRING content octets
    pub signature_value: Vec<u8>,
}

impl CertificateList {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let SignedParts {
            tbs,
            algorithm,
            signature,
        } = signed::split(der)?;

        Ok(Self {
            tbs_cert_list: TbsCertList::from_der(tbs)?,
            signature_algorithm: AlgorithmIdentifier::from_der(algorithm)?,
            signature_value: bit_string_content(signature)?,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        Ok(signed::join(
            &self.tbs_cert_list.to_der()?,
            &self.signature_algorithm.to_der()?,
            &tlv::encode(universal::BIT_STRING, &self.signature_value),
        ))
    }
}

impl_serde_from_der!(RevokedCertificate, TbsCertList, CertificateList);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oids;
    use crate::time::UtcDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_crl() {
        let crl = CertificateList::from_der(certlib_test_data::CA_CRL_DER).unwrap();
        let tbs = &crl.tbs_cert_list;

        assert_eq!(tbs.version, Some(Version::V2));
        assert_eq!(tbs.issuer.find_common_name().as_deref(), Some("Example Issuing CA"));
        assert_eq!(tbs.this_update.to_date().unwrap(), UtcDate::ymd(2024, 6, 1).unwrap());
        assert_eq!(
            tbs.next_update.as_ref().unwrap().to_date().unwrap(),
            UtcDate::ymd(2024, 7, 1).unwrap()
        );

        let revoked = tbs.revoked_certificates.as_ref().unwrap();
        assert_eq!(revoked.len(), 2);
        assert_eq!(revoked[0].user_certificate, [0x10, 0x01]);
        let entry_extensions = revoked[0].crl_entry_extensions.as_ref().unwrap();
        assert_eq!(entry_extensions.0[0].extn_id(), &oids::crl_reason_code());
        assert_eq!(entry_extensions.0[0].extn_value(), [0x0A, 0x01, 0x01]);
        assert_eq!(revoked[1].user_certificate, [0x00, 0xC0, 0xFF, 0xEE]);
        assert!(revoked[1].crl_entry_extensions.is_none());

        let crl_extensions = tbs.crl_extensions.as_ref().unwrap();
        assert_eq!(crl_extensions.0[0].extn_id(), &oids::crl_number());
        assert_eq!(crl_extensions.len(), 2);
    }

    #[test]
    fn reencodes_identically() {
        let der = certlib_test_data::CA_CRL_DER;
        let parts = signed::split(der).unwrap();
        let tbs = TbsCertList::from_der(parts.tbs).unwrap();
        assert_eq!(tbs.to_der().unwrap(), parts.tbs);
        assert_eq!(CertificateList::from_der(der).unwrap().to_der().unwrap(), der);
    }

    #[test]
    fn v1_crl_without_optional_parts() {
        let crl = CertificateList::from_der(certlib_test_data::CA_CRL_DER).unwrap();
        let tbs = TbsCertList {
            version: None,
            next_update: None,
            revoked_certificates: None,
            crl_extensions: None,
            ..crl.tbs_cert_list
        };

        let der = tbs.to_der().unwrap();
        let decoded = TbsCertList::from_der(&der).unwrap();
        assert_eq!(decoded, tbs);
        assert!(decoded.next_update.is_none());
    }
}
