use crate::general_name::GeneralName;
use crate::tlv::{self, universal, SequenceReader, SequenceWriter, TlvError};
use picky_asn1::wrapper::{Asn1SequenceOf, IntegerAsn1};

/// ```not_rust
/// GeneralSubtree ::= SEQUENCE {
///      base                    GeneralName,
///      minimum         [0]     BaseDistance DEFAULT 0,
///      maximum         [1]     BaseDistance OPTIONAL }
///
/// BaseDistance ::= INTEGER (0..MAX)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralSubtree {
    pub base: GeneralName,
    pub minimum: u32,
    pub maximum: Option<u32>,
}

impl GeneralSubtree {
    pub fn new(base: GeneralName) -> Self {
        Self {
            base,
            minimum: 0,
            maximum: None,
        }
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let base = GeneralName::from_element(reader.next_raw("base")?)?;
        let minimum: Option<IntegerAsn1> = reader.next_implicit(0, universal::INTEGER, "minimum")?;
        let maximum: Option<IntegerAsn1> = reader.next_implicit(1, universal::INTEGER, "maximum")?;
        reader.finish()?;

        Ok(Self {
            base,
            minimum: minimum.map(|min| base_distance(&min.0)).transpose()?.unwrap_or(0),
            maximum: maximum.map(|max| base_distance(&max.0)).transpose()?,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        writer.push_raw(&self.base.to_element()?);
        if self.minimum != 0 {
            writer.push_implicit(
                &IntegerAsn1(tlv::u32_to_content(self.minimum)),
                tlv::context_primitive(0),
                "minimum",
            )?;
        }
        if let Some(maximum) = self.maximum {
            writer.push_implicit(
                &IntegerAsn1(tlv::u32_to_content(maximum)),
                tlv::context_primitive(1),
                "maximum",
            )?;
        }
        Ok(writer.finish_sequence())
    }
}

fn base_distance(content: &[u8]) -> Result<u32, TlvError> {
    tlv::content_to_u32(content).ok_or(TlvError::Der {
        element: "BaseDistance",
        message: "value out of range".to_owned(),
    })
}

/// [RFC 5280 #4.2.1.10](https://tools.ietf.org/html/rfc5280#section-4.2.1.10)
///
/// ```not_rust
/// NameConstraints ::= SEQUENCE {
///      permittedSubtrees       [0]     GeneralSubtrees OPTIONAL,
///      excludedSubtrees        [1]     GeneralSubtrees OPTIONAL }
///
/// GeneralSubtrees ::= SEQUENCE SIZE (1..MAX) OF GeneralSubtree
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameConstraints {
    pub permitted_subtrees: Option<Vec<GeneralSubtree>>,
    pub excluded_subtrees: Option<Vec<GeneralSubtree>>,
}

impl NameConstraints {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let permitted: Option<Asn1SequenceOf<GeneralSubtree>> =
            reader.next_implicit(0, universal::SEQUENCE, "permittedSubtrees")?;
        let excluded: Option<Asn1SequenceOf<GeneralSubtree>> =
            reader.next_implicit(1, universal::SEQUENCE, "excludedSubtrees")?;
        reader.finish()?;

        Ok(Self {
            permitted_subtrees: permitted.map(|subtrees| subtrees.0),
            excluded_subtrees: excluded.map(|subtrees| subtrees.0),
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        if let Some(permitted) = &self.permitted_subtrees {
            writer.push_implicit(
                &Asn1SequenceOf(permitted.iter().collect::<Vec<_>>()),
                tlv::context_constructed(0),
                "permittedSubtrees",
            )?;
        }
        if let Some(excluded) = &self.excluded_subtrees {
            writer.push_implicit(
                &Asn1SequenceOf(excluded.iter().collect::<Vec<_>>()),
                tlv::context_constructed(1),
                "excludedSubtrees",
            )?;
        }
        Ok(writer.finish_sequence())
    }
}

impl_serde_from_der!(GeneralSubtree, NameConstraints);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn permitted_dns_subtree() {
        // permitted: dNSName ".example.com"
        let der = hex::decode("3012A010300E820C2E6578616D706C652E636F6D").unwrap();
        let constraints = NameConstraints::from_der(&der).unwrap();
        let permitted = constraints.permitted_subtrees.as_ref().unwrap();
        assert_eq!(permitted, &vec![GeneralSubtree::new(GeneralName::new_dns_name(".example.com"))]);
        assert!(constraints.excluded_subtrees.is_none());
        assert_eq!(constraints.to_der().unwrap(), der);
    }

    #[test]
    fn explicit_bounds() {
        let subtree = GeneralSubtree {
            base: GeneralName::new_dns_name("a"),
            minimum: 1,
            maximum: Some(3),
        };
        let der = subtree.to_der().unwrap();
        assert_eq!(der, [0x30, 0x09, 0x82, 0x01, b'a', 0x80, 0x01, 0x01, 0x81, 0x01, 0x03]);
        assert_eq!(GeneralSubtree::from_der(&der).unwrap(), subtree);
    }
}
