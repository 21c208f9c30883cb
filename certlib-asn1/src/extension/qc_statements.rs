use crate::tlv::{self, universal, SequenceReader, SequenceWriter, TlvError};
use oid::ObjectIdentifier;
use picky_asn1::wrapper::{Asn1SequenceOf, ObjectIdentifierAsn1};

/// [RFC 3739 #3.2.6](https://tools.ietf.org/html/rfc3739#section-3.2.6)
///
/// ```not_rust
/// QCStatement ::= SEQUENCE {
///     statementId   QC-STATEMENT.&Id({SupportedStatements}),
///     statementInfo QC-STATEMENT.&Type
///     ({SupportedStatements}{@statementId}) OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QcStatement {
    pub statement_id: ObjectIdentifier,
    /// Encoded statement info element
    pub statement_info: Option<Vec<u8>>,
}

impl QcStatement {
    pub fn new(statement_id: ObjectIdentifier, statement_info: Option<Vec<u8>>) -> Self {
        Self {
            statement_id,
            statement_info,
        }
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let statement_id: ObjectIdentifierAsn1 = reader.next("statementId")?;
        let statement_info = if reader.is_empty() {
            None
        } else {
            Some(reader.next_raw("statementInfo")?.to_vec())
        };
        reader.finish()?;

        Ok(Self::new(statement_id.0, statement_info))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        writer.push(&ObjectIdentifierAsn1(self.statement_id.clone()), "statementId")?;
        if let Some(info) = &self.statement_info {
            tlv::parse_single(info)?;
            writer.push_raw(info);
        }
        Ok(writer.finish_sequence())
    }
}

/// ```not_rust
/// QCStatements ::= SEQUENCE OF QCStatement
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QcStatements(pub Vec<QcStatement>);

impl QcStatements {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        tlv::expect_single(der, universal::SEQUENCE)?;
        let statements: Asn1SequenceOf<QcStatement> =
            picky_asn1_der::from_bytes(der).map_err(|e| TlvError::der("qualified certificate statements", e))?;
        Ok(Self(statements.0))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        picky_asn1_der::to_vec(&Asn1SequenceOf(self.0.iter().collect::<Vec<_>>()))
            .map_err(|e| TlvError::der("qualified certificate statements", e))
    }
}

impl_serde_from_der!(QcStatement, QcStatements);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn statements_with_and_without_info() {
        // id-etsi-qcs-QcCompliance, then id-etsi-qcs-QcType with { id-etsi-qct-esign }
        let der = hex::decode("301F3008060604008E4601013013060604008E4601063009060704008E46010601").unwrap();
        let statements = QcStatements::from_der(&der).unwrap();
        assert_eq!(statements.0.len(), 2);
        assert_eq!(Into::<String>::into(&statements.0[0].statement_id), "0.4.0.1862.1.1");
        assert!(statements.0[0].statement_info.is_none());
        assert_eq!(
            statements.0[1].statement_info.as_deref(),
            Some(&[0x30, 0x09, 0x06, 0x07, 0x04, 0x00, 0x8E, 0x46, 0x01, 0x06, 0x01][..])
        );
        assert_eq!(statements.to_der().unwrap(), der);
    }
}
