use super::named_bits::ReasonFlags;
use crate::general_name::{GeneralName, GeneralNames};
use crate::name::RelativeDistinguishedName;
use crate::tlv::{self, universal, SequenceReader, SequenceWriter, TlvError};
use picky_asn1::wrapper::Asn1SequenceOf;

const FULL_NAME: u8 = 0;
const NAME_RELATIVE_TO_CRL_ISSUER: u8 = 1;

/// ```not_rust
/// DistributionPointName ::= CHOICE {
///      fullName                [0]     GeneralNames,
///      nameRelativeToCRLIssuer [1]     RelativeDistinguishedName }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistributionPointName {
    FullName(GeneralNames),
    NameRelativeToCrlIssuer(RelativeDistinguishedName),
}

impl DistributionPointName {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let (header, _) = tlv::parse_single(der)?;
        if !tlv::is_context_specific(header.tag) {
            return Err(TlvError::UnexpectedElement(header.tag));
        }

        match tlv::tag_number(header.tag) {
            FULL_NAME => tlv::decode_implicit(der, universal::SEQUENCE, "fullName").map(Self::FullName),
            NAME_RELATIVE_TO_CRL_ISSUER => tlv::decode_implicit(der, universal::SET, "nameRelativeToCRLIssuer")
                .map(Self::NameRelativeToCrlIssuer),
            _ => Err(TlvError::UnexpectedElement(header.tag)),
        }
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        match self {
            Self::FullName(names) => tlv::encode_implicit(names, tlv::context_constructed(FULL_NAME), "fullName"),
            Self::NameRelativeToCrlIssuer(rdn) => tlv::encode_implicit(
                rdn,
                tlv::context_constructed(NAME_RELATIVE_TO_CRL_ISSUER),
                "nameRelativeToCRLIssuer",
            ),
        }
    }

    fn read_explicit(reader: &mut SequenceReader<'_>) -> Result<Option<Self>, TlvError> {
        match reader.next_raw_if(tlv::context_constructed(0)) {
            Some(element) => {
                let inner = tlv::expect_single(element, tlv::context_constructed(0))?;
                Self::from_der(inner).map(Some)
            }
            None => Ok(None),
        }
    }

    fn write_explicit(&self, writer: &mut SequenceWriter) -> Result<(), TlvError> {
        writer.push_raw(&tlv::encode(tlv::context_constructed(0), &self.to_der()?));
        Ok(())
    }
}

/// ```not_rust
/// DistributionPoint ::= SEQUENCE {
///      distributionPoint       [0]     DistributionPointName OPTIONAL,
///      reasons                 [1]     ReasonFlags OPTIONAL,
///      cRLIssuer               [2]     GeneralNames OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DistributionPoint {
    pub distribution_point: Option<DistributionPointName>,
    pub reasons: Option<ReasonFlags>,
    pub crl_issuer: Option<GeneralNames>,
}

impl DistributionPoint {
    pub fn new_uri<S: Into<String>>(uri: S) -> Self {
        Self {
            distribution_point: Some(DistributionPointName::FullName(GeneralName::new_uri(uri).into())),
            ..Self::default()
        }
    }

    /// URIs listed in the full name, if any.
    pub fn uris(&self) -> Vec<&str> {
        match &self.distribution_point {
            Some(DistributionPointName::FullName(names)) => names.iter().filter_map(GeneralName::as_uri).collect(),
            _ => Vec::new(),
        }
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let distribution_point = DistributionPointName::read_explicit(&mut reader)?;
        let reasons: Option<ReasonFlags> = reader.next_implicit(1, universal::BIT_STRING, "reasons")?;
        let crl_issuer: Option<GeneralNames> = reader.next_implicit(2, universal::SEQUENCE, "cRLIssuer")?;
        reader.finish()?;

        Ok(Self {
            distribution_point,
            reasons,
            crl_issuer,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        if let Some(name) = &self.distribution_point {
            name.write_explicit(&mut writer)?;
        }
        if let Some(reasons) = &self.reasons {
            writer.push_implicit(reasons, tlv::context_primitive(1), "reasons")?;
        }
        if let Some(issuer) = &self.crl_issuer {
            writer.push_implicit(issuer, tlv::context_constructed(2), "cRLIssuer")?;
        }
        Ok(writer.finish_sequence())
    }
}

/// [RFC 5280 #4.2.1.13](https://tools.ietf.org/html/rfc5280#section-4.2.1.13)
///
/// ```not_rust
/// CRLDistributionPoints ::= SEQUENCE SIZE (1..MAX) OF DistributionPoint
/// ```
///
/// Also the shape of the freshest CRL extension.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrlDistributionPoints(pub Vec<DistributionPoint>);

impl CrlDistributionPoints {
    pub fn iter(&self) -> std::slice::Iter<'_, DistributionPoint> {
        self.0.iter()
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        tlv::expect_single(der, universal::SEQUENCE)?;
        let points: Asn1SequenceOf<DistributionPoint> =
            picky_asn1_der::from_bytes(der).map_err(|e| TlvError::der("CRL distribution points", e))?;
        Ok(Self(points.0))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        picky_asn1_der::to_vec(&Asn1SequenceOf(self.0.iter().collect::<Vec<_>>()))
            .map_err(|e| TlvError::der("CRL distribution points", e))
    }
}

/// [RFC 5280 #5.2.5](https://tools.ietf.org/html/rfc5280#section-5.2.5)
///
/// ```not_rust
/// IssuingDistributionPoint ::= SEQUENCE {
///      distributionPoint          [0] DistributionPointName OPTIONAL,
///      onlyContainsUserCerts      [1] BOOLEAN DEFAULT FALSE,
///      onlyContainsCACerts        [2] BOOLEAN DEFAULT FALSE,
///      onlySomeReasons            [3] ReasonFlags OPTIONAL,
///      indirectCRL                [4] BOOLEAN DEFAULT FALSE,
///      onlyContainsAttributeCerts [5] BOOLEAN DEFAULT FALSE }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IssuingDistributionPoint {
    pub distribution_point: Option<DistributionPointName>,
    pub only_contains_user_certs: bool,
    pub only_contains_ca_certs: bool,
    pub only_some_reasons: Option<ReasonFlags>,
    pub indirect_crl: bool,
    pub only_contains_attribute_certs: bool,
}

impl IssuingDistributionPoint {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let distribution_point = DistributionPointName::read_explicit(&mut reader)?;
        let only_contains_user_certs = read_flag(&mut reader, 1, "onlyContainsUserCerts")?;
        let only_contains_ca_certs = read_flag(&mut reader, 2, "onlyContainsCACerts")?;
        let only_some_reasons: Option<ReasonFlags> =
            reader.next_implicit(3, universal::BIT_STRING, "onlySomeReasons")?;
        let indirect_crl = read_flag(&mut reader, 4, "indirectCRL")?;
        let only_contains_attribute_certs = read_flag(&mut reader, 5, "onlyContainsAttributeCerts")?;
        reader.finish()?;

        Ok(Self {
            distribution_point,
            only_contains_user_certs,
            only_contains_ca_certs,
            only_some_reasons,
            indirect_crl,
            only_contains_attribute_certs,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        if let Some(name) = &self.distribution_point {
            name.write_explicit(&mut writer)?;
        }
        write_flag(&mut writer, self.only_contains_user_certs, 1, "onlyContainsUserCerts")?;
        write_flag(&mut writer, self.only_contains_ca_certs, 2, "onlyContainsCACerts")?;
        if let Some(reasons) = &self.only_some_reasons {
            writer.push_implicit(reasons, tlv::context_primitive(3), "onlySomeReasons")?;
        }
        write_flag(&mut writer, self.indirect_crl, 4, "indirectCRL")?;
        write_flag(&mut writer, self.only_contains_attribute_certs, 5, "onlyContainsAttributeCerts")?;
        Ok(writer.finish_sequence())
    }
}

fn read_flag(reader: &mut SequenceReader<'_>, number: u8, name: &'static str) -> Result<bool, TlvError> {
    Ok(reader.next_implicit(number, universal::BOOLEAN, name)?.unwrap_or(false))
}

// DEFAULT FALSE is never encoded
fn write_flag(writer: &mut SequenceWriter, value: bool, number: u8, name: &'static str) -> Result<(), TlvError> {
    if value {
        writer.push_implicit(&value, tlv::context_primitive(number), name)?;
    }
    Ok(())
}

impl_serde_from_der!(
    DistributionPointName,
    DistributionPoint,
    CrlDistributionPoints,
    IssuingDistributionPoint,
);
