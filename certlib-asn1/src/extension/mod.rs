//! Extension wire types.
//!
//! [`Extension`] keeps `extnValue` as the raw bytes found inside the OCTET STRING. Interpreting
//! them according to `extnID` is left to the layer above, which picks one of the typed shapes of
//! this module.

mod basic_constraints;
mod crl;
mod distribution_points;
mod extended_key_usage;
mod info_access;
mod key_identifier;
mod name_constraints;
mod named_bits;
mod policies;
mod private_key_usage_period;
mod qc_statements;

pub use basic_constraints::BasicConstraints;
pub use crl::{CrlNumber, CrlReason, HoldInstructionCode, InvalidityDate};
pub use distribution_points::{CrlDistributionPoints, DistributionPoint, DistributionPointName, IssuingDistributionPoint};
pub use extended_key_usage::ExtendedKeyUsage;
pub use info_access::{AccessDescription, InfoAccess};
pub use key_identifier::{AuthorityKeyIdentifier, SubjectKeyIdentifier};
pub use name_constraints::{GeneralSubtree, NameConstraints};
pub use named_bits::{KeyUsage, NamedBits, NetscapeCertType, ReasonFlags};
pub use policies::{
    CertificatePolicies, InhibitAnyPolicy, PolicyConstraints, PolicyInformation, PolicyMapping, PolicyMappings,
    PolicyQualifierInfo,
};
pub use private_key_usage_period::PrivateKeyUsagePeriod;
pub use qc_statements::{QcStatement, QcStatements};

use crate::tlv::{self, universal, SequenceReader, SequenceWriter, TlvError};
use oid::ObjectIdentifier;
use picky_asn1::wrapper::{Asn1SequenceOf, ObjectIdentifierAsn1, OctetStringAsn1};

/// [RFC 5280 #4.1.2.9](https://tools.ietf.org/html/rfc5280#section-4.1.2.9)
///
/// ```not_rust
/// Extension  ::=  SEQUENCE  {
///      extnID      OBJECT IDENTIFIER,
///      critical    BOOLEAN DEFAULT FALSE,
///      extnValue   OCTET STRING
///                  -- contains the DER encoding of an ASN.1 value
///                  -- corresponding to the extension type identified
///                  -- by extnID
///      }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    extn_id: ObjectIdentifier,
    critical: bool,
    extn_value: Vec<u8>,
}

impl Extension {
    pub fn new(extn_id: ObjectIdentifier, critical: bool, extn_value: Vec<u8>) -> Self {
        Self {
            extn_id,
            critical,
            extn_value,
        }
    }

    pub fn extn_id(&self) -> &ObjectIdentifier {
        &self.extn_id
    }

    pub fn critical(&self) -> bool {
        self.critical
    }

    /// Content of the `extnValue` OCTET STRING.
    pub fn extn_value(&self) -> &[u8] {
        &self.extn_value
    }

    pub fn into_parts(self) -> (ObjectIdentifier, bool, Vec<u8>) {
        (self.extn_id, self.critical, self.extn_value)
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let extn_id: ObjectIdentifierAsn1 = reader.next("extnID")?;
        // BER producers sometimes write the DEFAULT value explicitly
        let critical: Option<bool> = reader.next_if(universal::BOOLEAN, "critical")?;
        let extn_value: OctetStringAsn1 = reader.next("extnValue")?;
        reader.finish()?;

        Ok(Self {
            extn_id: extn_id.0,
            critical: critical.unwrap_or(false),
            extn_value: extn_value.0,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        writer.push(&ObjectIdentifierAsn1(self.extn_id.clone()), "extnID")?;
        if self.critical {
            writer.push(&self.critical, "critical")?;
        }
        writer.push_raw(&tlv::encode(universal::OCTET_STRING, &self.extn_value));
        Ok(writer.finish_sequence())
    }
}

/// ```not_rust
/// Extensions  ::=  SEQUENCE SIZE (1..MAX) OF Extension
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extensions(pub Vec<Extension>);

impl Extensions {
    pub fn iter(&self) -> std::slice::Iter<'_, Extension> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        tlv::expect_single(der, universal::SEQUENCE)?;
        let extensions: Asn1SequenceOf<Extension> =
            picky_asn1_der::from_bytes(der).map_err(|e| TlvError::der("extensions", e))?;
        Ok(Self(extensions.0))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        picky_asn1_der::to_vec(&Asn1SequenceOf(self.0.iter().collect::<Vec<_>>()))
            .map_err(|e| TlvError::der("extensions", e))
    }
}

impl_serde_from_der!(Extension, Extensions);
