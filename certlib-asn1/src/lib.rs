//! ASN.1 wire types for X.509 certificates, certificate revocation lists and their extensions.
//!
//! Every type reads and writes its own DER element (`from_der` / `to_der`) and also implements
//! serde so that it can be nested inside `picky-asn1-der` driven structures.

#[macro_use]
mod macros;

pub mod algorithm_identifier;
pub mod certificate;
pub mod crl;
pub mod extension;
pub mod general_name;
pub mod name;
pub mod oids;
pub mod signed;
pub mod time;
pub mod tlv;

pub use algorithm_identifier::AlgorithmIdentifier;
pub use certificate::{Certificate, SubjectPublicKeyInfo, TbsCertificate, Validity, Version};
pub use crl::{CertificateList, RevokedCertificate, TbsCertList};
pub use extension::{Extension, Extensions};
pub use general_name::{GeneralName, GeneralNames, OtherName, PreEncoded};
pub use name::{AttributeTypeAndValue, AttributeValue, Name, NameAttr, NamePrettyFormatter, RelativeDistinguishedName};
pub use signed::SignedParts;
pub use time::{Time, TimeError, TimeKind, UtcDate};
pub use tlv::TlvError;

pub use oid::ObjectIdentifier;
