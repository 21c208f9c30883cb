use crate::general_name::GeneralName;
use crate::oids;
use crate::tlv::{self, universal, SequenceReader, SequenceWriter, TlvError};
use oid::ObjectIdentifier;
use picky_asn1::wrapper::{Asn1SequenceOf, ObjectIdentifierAsn1};

/// ```not_rust
/// AccessDescription  ::=  SEQUENCE {
///         accessMethod          OBJECT IDENTIFIER,
///         accessLocation        GeneralName  }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDescription {
    pub access_method: ObjectIdentifier,
    pub access_location: GeneralName,
}

impl AccessDescription {
    pub fn new(access_method: ObjectIdentifier, access_location: GeneralName) -> Self {
        Self {
            access_method,
            access_location,
        }
    }

    pub fn new_ocsp<S: Into<String>>(uri: S) -> Self {
        Self::new(oids::ad_ocsp(), GeneralName::new_uri(uri))
    }

    pub fn new_ca_issuers<S: Into<String>>(uri: S) -> Self {
        Self::new(oids::ad_ca_issuers(), GeneralName::new_uri(uri))
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let access_method: ObjectIdentifierAsn1 = reader.next("accessMethod")?;
        let access_location = GeneralName::from_element(reader.next_raw("accessLocation")?)?;
        reader.finish()?;

        Ok(Self::new(access_method.0, access_location))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        writer.push(&ObjectIdentifierAsn1(self.access_method.clone()), "accessMethod")?;
        writer.push_raw(&self.access_location.to_element()?);
        Ok(writer.finish_sequence())
    }
}

/// [RFC 5280 #4.2.2.1](https://tools.ietf.org/html/rfc5280#section-4.2.2.1) and
/// [#4.2.2.2](https://tools.ietf.org/html/rfc5280#section-4.2.2.2)
///
/// ```not_rust
/// AuthorityInfoAccessSyntax  ::=
///         SEQUENCE SIZE (1..MAX) OF AccessDescription
/// SubjectInfoAccessSyntax  ::=
///         SEQUENCE SIZE (1..MAX) OF AccessDescription
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InfoAccess(pub Vec<AccessDescription>);

impl InfoAccess {
    pub fn iter(&self) -> std::slice::Iter<'_, AccessDescription> {
        self.0.iter()
    }

    /// Locations registered for `method`, in order.
    pub fn locations<'a>(&'a self, method: &'a ObjectIdentifier) -> impl Iterator<Item = &'a GeneralName> + 'a {
        self.0
            .iter()
            .filter(move |description| &description.access_method == method)
            .map(|description| &description.access_location)
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        tlv::expect_single(der, universal::SEQUENCE)?;
        let descriptions: Asn1SequenceOf<AccessDescription> =
            picky_asn1_der::from_bytes(der).map_err(|e| TlvError::der("info access", e))?;
        Ok(Self(descriptions.0))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        picky_asn1_der::to_vec(&Asn1SequenceOf(self.0.iter().collect::<Vec<_>>()))
            .map_err(|e| TlvError::der("info access", e))
    }
}

impl_serde_from_der!(AccessDescription, InfoAccess);
