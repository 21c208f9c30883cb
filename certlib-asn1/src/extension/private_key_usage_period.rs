use crate::time::{Time, TimeKind};
use crate::tlv::{self, universal, SequenceReader, SequenceWriter, TlvError};

/// [RFC 3280 #4.2.1.4](https://tools.ietf.org/html/rfc3280#section-4.2.1.4)
///
/// ```not_rust
/// PrivateKeyUsagePeriod ::= SEQUENCE {
///      notBefore       [0]     GeneralizedTime OPTIONAL,
///      notAfter        [1]     GeneralizedTime OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrivateKeyUsagePeriod {
    pub not_before: Option<Time>,
    pub not_after: Option<Time>,
}

impl PrivateKeyUsagePeriod {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let not_before = read_time(&mut reader, 0)?;
        let not_after = read_time(&mut reader, 1)?;
        reader.finish()?;

        Ok(Self { not_before, not_after })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        for (number, time) in [(0, &self.not_before), (1, &self.not_after)] {
            if let Some(time) = time {
                if time.kind() != TimeKind::Generalized {
                    return Err(TlvError::UnexpectedTag {
                        expected: universal::GENERALIZED_TIME,
                        actual: universal::UTC_TIME,
                    });
                }
                writer.push_raw(&tlv::retag(time.to_element(), tlv::context_primitive(number))?);
            }
        }
        Ok(writer.finish_sequence())
    }
}

fn read_time(reader: &mut SequenceReader<'_>, number: u8) -> Result<Option<Time>, TlvError> {
    match reader.next_raw_if(tlv::context_primitive(number)) {
        Some(element) => {
            let element = tlv::retag(element.to_vec(), universal::GENERALIZED_TIME)?;
            Time::from_element(&element).map(Some)
        }
        None => Ok(None),
    }
}

impl_serde_from_der!(PrivateKeyUsagePeriod);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::UtcDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn both_bounds() {
        let period = PrivateKeyUsagePeriod {
            not_before: Some(Time::generalized(UtcDate::ymd(2024, 1, 1).unwrap())),
            not_after: Some(Time::generalized(UtcDate::ymd(2025, 1, 1).unwrap())),
        };
        let der = period.to_der().unwrap();
        assert_eq!(&der[..4], &[0x30, 0x22, 0x80, 0x0F]);
        assert_eq!(&der[4..19], b"20240101000000Z");
        assert_eq!(der[19], 0x81);
        assert_eq!(PrivateKeyUsagePeriod::from_der(&der).unwrap(), period);
    }

    #[test]
    fn utc_time_is_refused_on_encode() {
        let period = PrivateKeyUsagePeriod {
            not_before: Some(Time::from_date(UtcDate::ymd(2024, 1, 1).unwrap())),
            not_after: None,
        };
        assert!(period.to_der().is_err());
    }
}
