use crate::tlv::{self, universal, SequenceReader, SequenceWriter, TlvError};
use picky_asn1::wrapper::IntegerAsn1;

/// [RFC 5280 #4.2.1.9](https://tools.ietf.org/html/rfc5280#section-4.2.1.9)
///
/// ```not_rust
/// BasicConstraints ::= SEQUENCE {
///      cA                      BOOLEAN DEFAULT FALSE,
///      pathLenConstraint       INTEGER (0..MAX) OPTIONAL }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BasicConstraints {
    /// `None` when the DEFAULT was relied upon.
    pub ca: Option<bool>,
    pub path_len_constraint: Option<u32>,
}

impl BasicConstraints {
    pub fn new<CA: Into<Option<bool>>, PLC: Into<Option<u32>>>(ca: CA, path_len_constraint: PLC) -> Self {
        Self {
            ca: ca.into(),
            path_len_constraint: path_len_constraint.into(),
        }
    }

    pub fn is_ca(&self) -> bool {
        self.ca.unwrap_or(false)
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let ca: Option<bool> = reader.next_if(universal::BOOLEAN, "cA")?;
        let path_len_constraint = match reader.next_if::<IntegerAsn1>(universal::INTEGER, "pathLenConstraint")? {
            Some(integer) => Some(tlv::content_to_u32(&integer.0).ok_or(TlvError::Der {
                element: "pathLenConstraint",
                message: "value out of range".to_owned(),
            })?),
            None => None,
        };
        reader.finish()?;

        Ok(Self {
            ca,
            path_len_constraint,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        if let Some(ca) = self.ca {
            writer.push(&ca, "cA")?;
        }
        if let Some(path_len) = self.path_len_constraint {
            writer.push(&IntegerAsn1(tlv::u32_to_content(path_len)), "pathLenConstraint")?;
        }
        Ok(writer.finish_sequence())
    }
}

impl_serde_from_der!(BasicConstraints);
