use crate::name::Name;
use crate::tlv::{self, universal, SequenceReader, SequenceWriter, TlvError};
use oid::ObjectIdentifier;
use picky_asn1::wrapper::{Asn1SequenceOf, ObjectIdentifierAsn1};
use picky_asn1_der::Asn1RawDer;
use serde::{de, ser, Deserialize, Serialize};
use std::net::IpAddr;

const OTHER_NAME: u8 = 0;
const RFC822_NAME: u8 = 1;
const DNS_NAME: u8 = 2;
const X400_ADDRESS: u8 = 3;
const DIRECTORY_NAME: u8 = 4;
const EDI_PARTY_NAME: u8 = 5;
const URI: u8 = 6;
const IP_ADDRESS: u8 = 7;
const REGISTERED_ID: u8 = 8;

/// ```not_rust
/// OtherName ::= SEQUENCE {
///      type-id    OBJECT IDENTIFIER,
///      value      [0] EXPLICIT ANY DEFINED BY type-id }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherName {
    pub type_id: ObjectIdentifier,
    /// Encoded value found inside the `[0]` wrapper
    pub value: Vec<u8>,
}

impl OtherName {
    pub fn new(type_id: ObjectIdentifier, value: Vec<u8>) -> Self {
        Self { type_id, value }
    }

    fn from_content(content: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::from_content(content)?;
        let type_id: ObjectIdentifierAsn1 = reader.next("other name type id")?;
        let wrapper = reader.next_raw("other name value")?;
        let value = tlv::expect_single(wrapper, tlv::context_constructed(0))?;
        tlv::parse_single(value)?;
        reader.finish()?;

        Ok(Self {
            type_id: type_id.0,
            value: value.to_vec(),
        })
    }

    fn to_element(&self, tag: u8) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        writer.push(&ObjectIdentifierAsn1(self.type_id.clone()), "other name type id")?;
        writer.push_raw(&tlv::encode(tlv::context_constructed(0), &self.value));
        Ok(writer.finish(tag))
    }
}

/// A choice alternative kept exactly as it was received, tag included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreEncoded(pub Vec<u8>);

impl PreEncoded {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// [RFC 5280 #4.2.1.6](https://tools.ietf.org/html/rfc5280#section-4.2.1.6)
///
/// ```not_rust
/// GeneralName ::= CHOICE {
///      otherName                       [0]     OtherName,
///      rfc822Name                      [1]     IA5String,
///      dNSName                         [2]     IA5String,
///      x400Address                     [3]     ORAddress,
///      directoryName                   [4]     Name,
///      ediPartyName                    [5]     EDIPartyName,
///      uniformResourceIdentifier       [6]     IA5String,
///      iPAddress                       [7]     OCTET STRING,
///      registeredID                    [8]     OBJECT IDENTIFIER }
/// ```
///
/// `OtherName` and `DirectoryName` are decoded further. `X400Address` and `EdiPartyName`
/// have no typed form and stay [`PreEncoded`]. The remaining alternatives hold their content
/// octets directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneralName {
    OtherName(OtherName),
    Rfc822Name(Vec<u8>),
    DnsName(Vec<u8>),
    X400Address(PreEncoded),
    DirectoryName(Name),
    EdiPartyName(PreEncoded),
    Uri(Vec<u8>),
    IpAddress(Vec<u8>),
    RegisteredId(Vec<u8>),
}

impl GeneralName {
    pub fn new_dns_name<S: Into<String>>(name: S) -> Self {
        Self::DnsName(name.into().into_bytes())
    }

    pub fn new_rfc822_name<S: Into<String>>(name: S) -> Self {
        Self::Rfc822Name(name.into().into_bytes())
    }

    pub fn new_uri<S: Into<String>>(uri: S) -> Self {
        Self::Uri(uri.into().into_bytes())
    }

    pub fn new_ip_address(address: IpAddr) -> Self {
        match address {
            IpAddr::V4(v4) => Self::IpAddress(v4.octets().to_vec()),
            IpAddr::V6(v6) => Self::IpAddress(v6.octets().to_vec()),
        }
    }

    pub fn new_registered_id(oid: &ObjectIdentifier) -> Result<Self, TlvError> {
        let der = picky_asn1_der::to_vec(&ObjectIdentifierAsn1(oid.clone())).map_err(|e| TlvError::der("registered id", e))?;
        let content = tlv::expect_single(&der, universal::OID)?;
        Ok(Self::RegisteredId(content.to_vec()))
    }

    pub fn new_directory_name(name: Name) -> Self {
        Self::DirectoryName(name)
    }

    pub fn new_other_name(type_id: ObjectIdentifier, value: Vec<u8>) -> Self {
        Self::OtherName(OtherName::new(type_id, value))
    }

    /// Context tag number of the alternative.
    pub fn tag_number(&self) -> u8 {
        match self {
            GeneralName::OtherName(_) => OTHER_NAME,
            GeneralName::Rfc822Name(_) => RFC822_NAME,
            GeneralName::DnsName(_) => DNS_NAME,
            GeneralName::X400Address(_) => X400_ADDRESS,
            GeneralName::DirectoryName(_) => DIRECTORY_NAME,
            GeneralName::EdiPartyName(_) => EDI_PARTY_NAME,
            GeneralName::Uri(_) => URI,
            GeneralName::IpAddress(_) => IP_ADDRESS,
            GeneralName::RegisteredId(_) => REGISTERED_ID,
        }
    }

    /// Whether the alternative is carried as pre-encoded bytes rather than a typed value.
    pub fn is_pre_encoded(&self) -> bool {
        matches!(self, GeneralName::X400Address(_) | GeneralName::EdiPartyName(_))
    }

    pub fn as_dns_name(&self) -> Option<&str> {
        match self {
            GeneralName::DnsName(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    pub fn as_rfc822_name(&self) -> Option<&str> {
        match self {
            GeneralName::Rfc822Name(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    pub fn as_uri(&self) -> Option<&str> {
        match self {
            GeneralName::Uri(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    pub fn as_ip_address(&self) -> Option<IpAddr> {
        match self {
            GeneralName::IpAddress(bytes) => match bytes.len() {
                4 => <[u8; 4]>::try_from(bytes.as_slice()).ok().map(IpAddr::from),
                16 => <[u8; 16]>::try_from(bytes.as_slice()).ok().map(IpAddr::from),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_registered_id(&self) -> Option<ObjectIdentifier> {
        match self {
            GeneralName::RegisteredId(content) => {
                let der = tlv::encode(universal::OID, content);
                picky_asn1_der::from_bytes::<ObjectIdentifierAsn1>(&der).ok().map(|oid| oid.0)
            }
            _ => None,
        }
    }

    pub fn as_directory_name(&self) -> Option<&Name> {
        match self {
            GeneralName::DirectoryName(name) => Some(name),
            _ => None,
        }
    }

    pub fn from_element(element: &[u8]) -> Result<Self, TlvError> {
        let (header, content) = tlv::parse_single(element)?;
        if !tlv::is_context_specific(header.tag) {
            return Err(TlvError::UnexpectedElement(header.tag));
        }

        // Both the primitive and the constructed form of each tag are accepted.
        let name = match tlv::tag_number(header.tag) {
            OTHER_NAME => GeneralName::OtherName(OtherName::from_content(content)?),
            RFC822_NAME => GeneralName::Rfc822Name(content.to_vec()),
            DNS_NAME => GeneralName::DnsName(content.to_vec()),
            X400_ADDRESS => GeneralName::X400Address(PreEncoded(element.to_vec())),
            DIRECTORY_NAME => GeneralName::DirectoryName(Name::from_der(content)?),
            EDI_PARTY_NAME => GeneralName::EdiPartyName(PreEncoded(element.to_vec())),
            URI => GeneralName::Uri(content.to_vec()),
            IP_ADDRESS => GeneralName::IpAddress(content.to_vec()),
            REGISTERED_ID => GeneralName::RegisteredId(content.to_vec()),
            _ => return Err(TlvError::UnexpectedElement(header.tag)),
        };

        Ok(name)
    }

    pub fn to_element(&self) -> Result<Vec<u8>, TlvError> {
        let number = self.tag_number();
        let element = match self {
            GeneralName::OtherName(other_name) => other_name.to_element(tlv::context_constructed(number))?,
            GeneralName::Rfc822Name(bytes)
            | GeneralName::DnsName(bytes)
            | GeneralName::Uri(bytes)
            | GeneralName::IpAddress(bytes)
            | GeneralName::RegisteredId(bytes) => tlv::encode(tlv::context_primitive(number), bytes),
            GeneralName::DirectoryName(name) => tlv::encode(tlv::context_constructed(number), &name.to_der()?),
            GeneralName::X400Address(pre_encoded) | GeneralName::EdiPartyName(pre_encoded) => {
                let tag = tlv::context_constructed(number);
                if pre_encoded.0.first() != Some(&tag) {
                    log::warn!(
                        "forcing pre-encoded general name tag {:02X?} to 0x{:02X}",
                        pre_encoded.0.first(),
                        tag
                    );
                }
                tlv::retag(pre_encoded.0.clone(), tag)?
            }
        };

        Ok(element)
    }
}

impl ser::Serialize for GeneralName {
    fn serialize<S>(&self, serializer: S) -> Result<<S as ser::Serializer>::Ok, <S as ser::Serializer>::Error>
    where
        S: ser::Serializer,
    {
        let element = self.to_element().map_err(ser::Error::custom)?;
        Asn1RawDer(element).serialize(serializer)
    }
}

impl<'de> de::Deserialize<'de> for GeneralName {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        let raw = Asn1RawDer::deserialize(deserializer)?;
        GeneralName::from_element(&raw.0).map_err(de::Error::custom)
    }
}

/// ```not_rust
/// GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneralNames(pub Vec<GeneralName>);

impl GeneralNames {
    pub fn new(name: GeneralName) -> Self {
        Self(vec![name])
    }

    pub fn with_names(names: Vec<GeneralName>) -> Self {
        Self(names)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneralName> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        tlv::expect_single(der, universal::SEQUENCE)?;
        picky_asn1_der::from_bytes(der).map_err(|e| TlvError::der("general names", e))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        picky_asn1_der::to_vec(self).map_err(|e| TlvError::der("general names", e))
    }
}

impl From<GeneralName> for GeneralNames {
    fn from(name: GeneralName) -> Self {
        Self::new(name)
    }
}

impl ser::Serialize for GeneralNames {
    fn serialize<S>(&self, serializer: S) -> Result<<S as ser::Serializer>::Ok, <S as ser::Serializer>::Error>
    where
        S: ser::Serializer,
    {
        Asn1SequenceOf(self.0.iter().collect::<Vec<_>>()).serialize(serializer)
    }
}

impl<'de> de::Deserialize<'de> for GeneralNames {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        let seq = Asn1SequenceOf::<GeneralName>::deserialize(deserializer)?;
        Ok(Self(seq.0))
    }
}
