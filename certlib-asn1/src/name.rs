use crate::oids;
use crate::tlv::{self, universal, TlvError};
use oid::ObjectIdentifier;
use picky_asn1::wrapper::{Asn1SequenceOf, Asn1SetOf, ObjectIdentifierAsn1};
use picky_asn1_der::Asn1RawDer;
use serde::{de, ser, Deserialize, Serialize};
use std::fmt;

/// Attribute value kept as its universal tag and content octets.
///
/// No interpretation of the string type happens at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeValue {
    pub tag: u8,
    pub bytes: Vec<u8>,
}

impl AttributeValue {
    pub fn new(tag: u8, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            bytes: bytes.into(),
        }
    }

    /// PrintableString when every character is allowed there, UTF8String otherwise.
    pub fn from_text(text: &str) -> Self {
        let tag = if text.bytes().all(is_printable_char) {
            universal::PRINTABLE_STRING
        } else {
            universal::UTF8_STRING
        };
        Self::new(tag, text.as_bytes())
    }

    /// Best-effort textual rendering.
    pub fn to_text(&self) -> Option<String> {
        match self.tag {
            universal::PRINTABLE_STRING
            | universal::IA5_STRING
            | universal::NUMERIC_STRING
            | universal::VISIBLE_STRING
            | universal::UTF8_STRING
            | universal::GENERAL_STRING => String::from_utf8(self.bytes.clone()).ok(),
            // T.61 is close enough to latin-1 for the characters found in practice
            universal::TELETEX_STRING => Some(self.bytes.iter().map(|b| char::from(*b)).collect()),
            universal::BMP_STRING => {
                if self.bytes.len() % 2 != 0 {
                    return None;
                }
                let units: Vec<u16> = self
                    .bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&units).ok()
            }
            universal::UNIVERSAL_STRING => {
                if self.bytes.len() % 4 != 0 {
                    return None;
                }
                self.bytes
                    .chunks_exact(4)
                    .map(|quad| char::from_u32(u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]])))
                    .collect()
            }
            _ => None,
        }
    }
}

fn is_printable_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || b" '()+,-./:=?".contains(&c)
}

/// [RFC 5280 #4.1.2.4](https://tools.ietf.org/html/rfc5280#section-4.1.2.4)
///
/// ```not_rust
/// AttributeTypeAndValue ::= SEQUENCE {
///   type     AttributeType,
///   value    AttributeValue }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeAndValue {
    pub ty: ObjectIdentifier,
    pub value: AttributeValue,
}

impl AttributeTypeAndValue {
    pub fn new(ty: ObjectIdentifier, value: AttributeValue) -> Self {
        Self { ty, value }
    }
}

impl ser::Serialize for AttributeTypeAndValue {
    fn serialize<S>(&self, serializer: S) -> Result<<S as ser::Serializer>::Ok, <S as ser::Serializer>::Error>
    where
        S: ser::Serializer,
    {
        use ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&ObjectIdentifierAsn1(self.ty.clone()))?;
        seq.serialize_element(&Asn1RawDer(tlv::encode(self.value.tag, &self.value.bytes)))?;
        seq.end()
    }
}

impl<'de> de::Deserialize<'de> for AttributeTypeAndValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = AttributeTypeAndValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid DER-encoded AttributeTypeAndValue")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let ty: ObjectIdentifierAsn1 = seq_next_element!(seq, AttributeTypeAndValue, "type oid");
                let raw: Asn1RawDer = seq_next_element!(seq, AttributeTypeAndValue, "attribute value");
                let (header, content) = tlv::parse_single(&raw.0).map_err(de::Error::custom)?;

                Ok(AttributeTypeAndValue {
                    ty: ty.0,
                    value: AttributeValue::new(header.tag, content),
                })
            }
        }

        deserializer.deserialize_seq(Visitor)
    }
}

/// ```not_rust
/// RelativeDistinguishedName ::= SET SIZE (1..MAX) OF AttributeTypeAndValue
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelativeDistinguishedName(pub Vec<AttributeTypeAndValue>);

impl ser::Serialize for RelativeDistinguishedName {
    fn serialize<S>(&self, serializer: S) -> Result<<S as ser::Serializer>::Ok, <S as ser::Serializer>::Error>
    where
        S: ser::Serializer,
    {
        Asn1SetOf(self.0.iter().collect::<Vec<_>>()).serialize(serializer)
    }
}

impl<'de> de::Deserialize<'de> for RelativeDistinguishedName {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        let set = Asn1SetOf::<AttributeTypeAndValue>::deserialize(deserializer)?;
        Ok(Self(set.0))
    }
}

/// [RFC 5280 #4.1.2.4](https://tools.ietf.org/html/rfc5280#section-4.1.2.4)
///
/// ```not_rust
/// Name ::= CHOICE { -- only one possibility for now --
///   rdnSequence  RDNSequence }
///
/// RDNSequence ::= SEQUENCE OF RelativeDistinguishedName
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Name(pub Vec<RelativeDistinguishedName>);

impl Name {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_common_name<S: AsRef<str>>(name: S) -> Self {
        let mut dn = Self::default();
        dn.add_attr(NameAttr::CommonName, name);
        dn
    }

    /// Appends a new RDN holding a single attribute.
    pub fn add_attr<S: AsRef<str>>(&mut self, attr: NameAttr, value: S) {
        self.push_atv(AttributeTypeAndValue::new(
            attr.oid(),
            AttributeValue::from_text(value.as_ref()),
        ));
    }

    pub fn push_atv(&mut self, atv: AttributeTypeAndValue) {
        self.0.push(RelativeDistinguishedName(vec![atv]));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every attribute, in RDN order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeTypeAndValue> {
        self.0.iter().flat_map(|rdn| rdn.0.iter())
    }

    pub fn find_attr(&self, attr: NameAttr) -> Option<&AttributeValue> {
        let oid = attr.oid();
        self.attributes().find(|atv| atv.ty == oid).map(|atv| &atv.value)
    }

    pub fn find_common_name(&self) -> Option<String> {
        self.find_attr(NameAttr::CommonName).and_then(AttributeValue::to_text)
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        picky_asn1_der::to_vec(self).map_err(|e| TlvError::der("name", e))
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        // reject trailing garbage, which picky_asn1_der would silently ignore
        tlv::parse_single(der)?;
        picky_asn1_der::from_bytes(der).map_err(|e| TlvError::der("name", e))
    }
}

impl ser::Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> Result<<S as ser::Serializer>::Ok, <S as ser::Serializer>::Error>
    where
        S: ser::Serializer,
    {
        Asn1SequenceOf(self.0.iter().collect::<Vec<_>>()).serialize(serializer)
    }
}

impl<'de> de::Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        let seq = Asn1SequenceOf::<RelativeDistinguishedName>::deserialize(deserializer)?;
        Ok(Self(seq.0))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        NamePrettyFormatter(self).fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameAttr {
    CommonName,
    Surname,
    SerialNumber,
    CountryName,
    LocalityName,
    StateOrProvinceName,
    StreetName,
    OrganizationName,
    OrganizationalUnitName,
    Title,
    GivenName,
    DomainComponent,
    EmailAddress,
}

impl NameAttr {
    pub fn oid(self) -> ObjectIdentifier {
        match self {
            NameAttr::CommonName => oids::at_common_name(),
            NameAttr::Surname => oids::at_surname(),
            NameAttr::SerialNumber => oids::at_serial_number(),
            NameAttr::CountryName => oids::at_country_name(),
            NameAttr::LocalityName => oids::at_locality_name(),
            NameAttr::StateOrProvinceName => oids::at_state_or_province_name(),
            NameAttr::StreetName => oids::at_street_name(),
            NameAttr::OrganizationName => oids::at_organization_name(),
            NameAttr::OrganizationalUnitName => oids::at_organizational_unit_name(),
            NameAttr::Title => oids::at_title(),
            NameAttr::GivenName => oids::at_given_name(),
            NameAttr::DomainComponent => oids::domain_component(),
            NameAttr::EmailAddress => oids::email_address(),
        }
    }

    fn short_name(oid: &str) -> Option<&'static str> {
        let name = match oid {
            oids::AT_COMMON_NAME => "CN",
            oids::AT_SURNAME => "SN",
            oids::AT_SERIAL_NUMBER => "SERIALNUMBER",
            oids::AT_COUNTRY_NAME => "C",
            oids::AT_LOCALITY_NAME => "L",
            oids::AT_STATE_OR_PROVINCE_NAME => "ST",
            oids::AT_STREET_NAME => "STREET",
            oids::AT_ORGANIZATION_NAME => "O",
            oids::AT_ORGANIZATIONAL_UNIT_NAME => "OU",
            oids::AT_TITLE => "T",
            oids::AT_GIVEN_NAME => "G",
            oids::DOMAIN_COMPONENT => "DC",
            oids::EMAIL_ADDRESS => "E",
            _ => return None,
        };
        Some(name)
    }
}

/// Formats a name as `CN=..,O=..`, RDNs in encoding order.
///
/// Attributes with an unknown type print their dotted OID, values without a textual form
/// print as `#` followed by the hex encoding of the whole value element.
pub struct NamePrettyFormatter<'a>(pub &'a Name);

impl fmt::Display for NamePrettyFormatter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for rdn in &(self.0).0 {
            if first {
                first = false;
            } else {
                write!(f, ",")?;
            }

            let mut first_atv = true;
            for atv in &rdn.0 {
                if first_atv {
                    first_atv = false;
                } else {
                    write!(f, "+")?;
                }

                let oid = Into::<String>::into(&atv.ty);
                match NameAttr::short_name(&oid) {
                    Some(short) => write!(f, "{short}=")?,
                    None => write!(f, "{oid}=")?,
                }

                match atv.value.to_text() {
                    Some(text) => write!(f, "{text}")?,
                    None => {
                        write!(f, "#")?;
                        for byte in tlv::encode(atv.value.tag, &atv.value.bytes) {
                            write!(f, "{byte:02x}")?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
