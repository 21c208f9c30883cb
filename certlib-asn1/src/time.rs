use crate::tlv::{self, universal, TlvError};
use picky_asn1::date::{GeneralizedTime, UTCTime};
use picky_asn1_der::Asn1RawDer;
use serde::de::value::BytesDeserializer;
use serde::{de, ser, Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("time value is not ASCII")]
    NotAscii,
    #[error("unsupported time format: {0}")]
    UnsupportedFormat(String),
    #[error("date component out of range: {0}")]
    OutOfRange(&'static str),
}

/// A calendar date and time of day, always in UTC.
///
/// Stored as a `GeneralizedTime`, which covers every year a `Time` can carry. Unlike
/// `Date::new`, [`UtcDate::new`] also checks the day against the length of the month.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDate(GeneralizedTime);

impl UtcDate {
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<Self> {
        if day > days_in_month(year, month) {
            return None;
        }
        GeneralizedTime::new(year, month, day, hour, minute, second).map(Self)
    }

    pub fn ymd(year: u16, month: u8, day: u8) -> Option<Self> {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// UTCTime years are already widened to four digits by the 1950-2049 window.
    pub fn from_utc_time(time: &UTCTime) -> Option<Self> {
        Self::new(
            time.year(),
            time.month(),
            time.day(),
            time.hour(),
            time.minute(),
            time.second(),
        )
    }

    pub fn from_generalized_time(time: GeneralizedTime) -> Option<Self> {
        Self::new(
            time.year(),
            time.month(),
            time.day(),
            time.hour(),
            time.minute(),
            time.second(),
        )
    }

    /// `None` outside of 1950 through 2049, the years a two-digit UTCTime can express.
    pub fn to_utc_time(&self) -> Option<UTCTime> {
        if !(1950..2050).contains(&self.year()) {
            return None;
        }
        UTCTime::new(
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second(),
        )
    }

    pub fn as_generalized_time(&self) -> &GeneralizedTime {
        &self.0
    }

    pub fn year(&self) -> u16 {
        self.0.year()
    }

    pub fn month(&self) -> u8 {
        self.0.month()
    }

    pub fn day(&self) -> u8 {
        self.0.day()
    }

    pub fn hour(&self) -> u8 {
        self.0.hour()
    }

    pub fn minute(&self) -> u8 {
        self.0.minute()
    }

    pub fn second(&self) -> u8 {
        self.0.second()
    }
}

impl fmt::Display for UtcDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeKind {
    Utc,
    Generalized,
}

impl TimeKind {
    pub fn tag(self) -> u8 {
        match self {
            TimeKind::Utc => universal::UTC_TIME,
            TimeKind::Generalized => universal::GENERALIZED_TIME,
        }
    }
}

/// [RFC 5280 #4.1.2.5](https://tools.ietf.org/html/rfc5280#section-4.1.2.5)
///
/// ```not_rust
/// Time ::= CHOICE {
///      utcTime        UTCTime,
///      generalTime    GeneralizedTime }
/// ```
///
/// The textual form is kept exactly as received so that re-encoding never alters a signed
/// structure, even when the producer used a form DER does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Time {
    kind: TimeKind,
    text: String,
}

impl Time {
    /// Picks UTCTime for years 1950 through 2049 and GeneralizedTime otherwise.
    pub fn from_date(date: UtcDate) -> Self {
        match date.to_utc_time() {
            Some(utc) => Self::utc(&utc),
            None => Self::generalized(date),
        }
    }

    fn utc(time: &UTCTime) -> Self {
        Self {
            kind: TimeKind::Utc,
            text: format!(
                "{:02}{:02}{:02}{:02}{:02}{:02}Z",
                time.year() % 100,
                time.month(),
                time.day(),
                time.hour(),
                time.minute(),
                time.second()
            ),
        }
    }

    pub fn generalized(date: UtcDate) -> Self {
        Self {
            kind: TimeKind::Generalized,
            text: format!(
                "{:04}{:02}{:02}{:02}{:02}{:02}Z",
                date.year(),
                date.month(),
                date.day(),
                date.hour(),
                date.minute(),
                date.second()
            ),
        }
    }

    pub fn kind(&self) -> TimeKind {
        self.kind
    }

    /// Content octets as they appear on the wire.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn to_date(&self) -> Result<UtcDate, TimeError> {
        parse_time(self.kind, &self.text)
    }

    pub fn from_element(element: &[u8]) -> Result<Self, TlvError> {
        let (header, content) = tlv::parse_single(element)?;
        let kind = match header.tag {
            universal::UTC_TIME => TimeKind::Utc,
            universal::GENERALIZED_TIME => TimeKind::Generalized,
            actual => {
                return Err(TlvError::UnexpectedTag {
                    expected: universal::UTC_TIME,
                    actual,
                })
            }
        };

        if !content.is_ascii() {
            return Err(TlvError::Der {
                element: "time",
                message: TimeError::NotAscii.to_string(),
            });
        }

        Ok(Self {
            kind,
            text: String::from_utf8_lossy(content).into_owned(),
        })
    }

    pub fn to_element(&self) -> Vec<u8> {
        tlv::encode(self.kind.tag(), self.text.as_bytes())
    }

    /// Whether the next element tagged `tag` can be a `Time`.
    pub fn is_time_tag(tag: u8) -> bool {
        tag == universal::UTC_TIME || tag == universal::GENERALIZED_TIME
    }
}

impl From<UtcDate> for Time {
    fn from(date: UtcDate) -> Self {
        Self::from_date(date)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_date() {
            Ok(date) => date.fmt(f),
            Err(_) => f.write_str(&self.text),
        }
    }
}

impl ser::Serialize for Time {
    fn serialize<S>(&self, serializer: S) -> Result<<S as ser::Serializer>::Ok, <S as ser::Serializer>::Error>
    where
        S: ser::Serializer,
    {
        Asn1RawDer(self.to_element()).serialize(serializer)
    }
}

impl<'de> de::Deserialize<'de> for Time {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        let raw = Asn1RawDer::deserialize(deserializer)?;
        Time::from_element(&raw.0).map_err(de::Error::custom)
    }
}

fn parse_time(kind: TimeKind, text: &str) -> Result<UtcDate, TimeError> {
    let canonical = canonical_form(kind, text)?;
    let date = match kind {
        TimeKind::Utc => UtcDate::from_utc_time(&UTCTime::deserialize(bytes_deserializer(&canonical))?),
        TimeKind::Generalized => {
            UtcDate::from_generalized_time(GeneralizedTime::deserialize(bytes_deserializer(&canonical))?)
        }
    };
    date.ok_or(TimeError::OutOfRange("day of month"))
}

fn bytes_deserializer(content: &[u8]) -> BytesDeserializer<'_, de::value::Error> {
    BytesDeserializer::new(content)
}

impl From<de::value::Error> for TimeError {
    fn from(e: de::value::Error) -> Self {
        log::debug!("rejected time value: {e}");
        TimeError::OutOfRange("date")
    }
}

/// Rewrites the textual forms BER tolerates (no seconds, fractional seconds) into the fixed
/// `YYMMDDHHMMSSZ` / `YYYYMMDDHHMMSSZ` layout `picky-asn1` reads.
fn canonical_form(kind: TimeKind, text: &str) -> Result<Vec<u8>, TimeError> {
    let unsupported = || TimeError::UnsupportedFormat(text.to_owned());

    let body = text.strip_suffix('Z').ok_or_else(unsupported)?;
    let body = match (kind, body.split_once('.')) {
        (TimeKind::Generalized, Some((body, fraction))) if fraction.bytes().all(|b| b.is_ascii_digit()) => body,
        (_, None) => body,
        _ => return Err(unsupported()),
    };

    if !body.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unsupported());
    }

    let year_digits = match kind {
        TimeKind::Utc => 2,
        TimeKind::Generalized => 4,
    };

    let mut canonical = body.as_bytes().to_vec();
    // seconds may be omitted in BER
    match canonical.len() - year_digits.min(canonical.len()) {
        8 => canonical.extend_from_slice(b"00"),
        10 => {}
        _ => return Err(unsupported()),
    }
    canonical.push(b'Z');

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(&[0x17, 0x0D, b'2', b'4', b'0', b'1', b'0', b'1', b'0', b'0', b'0', b'0', b'0', b'0', b'Z'], (2024, 1, 1, 0, 0, 0))]
    #[case(b"\x17\x0D991231235959Z", (1999, 12, 31, 23, 59, 59))]
    #[case(b"\x18\x0F20500101120000Z", (2050, 1, 1, 12, 0, 0))]
    #[case(b"\x18\x1120240229101112.5Z", (2024, 2, 29, 10, 11, 12))]
    #[case(b"\x17\x0B2401011230Z", (2024, 1, 1, 12, 30, 0))]
    fn decodes_times(#[case] der: &[u8], #[case] expected: (u16, u8, u8, u8, u8, u8)) {
        let time: Time = picky_asn1_der::from_bytes(der).unwrap();
        let date = time.to_date().unwrap();
        assert_eq!(
            (date.year(), date.month(), date.day(), date.hour(), date.minute(), date.second()),
            expected
        );
        assert_eq!(picky_asn1_der::to_vec(&time).unwrap(), der);
    }

    #[test]
    fn picks_time_kind_from_year() {
        let utc = Time::from(UtcDate::ymd(2049, 12, 31).unwrap());
        assert_eq!(utc.kind(), TimeKind::Utc);
        assert_eq!(utc.as_str(), "491231000000Z");

        let generalized = Time::from(UtcDate::ymd(2050, 1, 1).unwrap());
        assert_eq!(generalized.kind(), TimeKind::Generalized);
        assert_eq!(generalized.as_str(), "20500101000000Z");
    }

    #[test]
    fn rejects_invalid_dates() {
        assert!(UtcDate::new(2023, 2, 29, 0, 0, 0).is_none());
        assert!(UtcDate::new(2024, 13, 1, 0, 0, 0).is_none());

        let offset: Time = picky_asn1_der::from_bytes(b"\x17\x11240101000000+0100").unwrap();
        assert!(matches!(offset.to_date(), Err(TimeError::UnsupportedFormat(_))));

        // month and hour are range checked by picky-asn1, the day of month here
        let february: Time = picky_asn1_der::from_bytes(b"\x17\x0D230229000000Z").unwrap();
        assert_eq!(february.to_date(), Err(TimeError::OutOfRange("day of month")));
        let hour: Time = picky_asn1_der::from_bytes(b"\x17\x0D230101250000Z").unwrap();
        assert_eq!(hour.to_date(), Err(TimeError::OutOfRange("date")));
    }

    #[test]
    fn utc_time_window() {
        let date = UtcDate::ymd(1950, 1, 1).unwrap();
        let utc = date.to_utc_time().unwrap();
        assert_eq!(UtcDate::from_utc_time(&utc), Some(date));

        assert!(UtcDate::ymd(1949, 12, 31).unwrap().to_utc_time().is_none());
        assert!(UtcDate::ymd(2050, 1, 1).unwrap().to_utc_time().is_none());

        let old: Time = picky_asn1_der::from_bytes(b"\x17\x0D500101000000Z").unwrap();
        assert_eq!(old.to_date().unwrap().year(), 1950);
        let recent: Time = picky_asn1_der::from_bytes(b"\x17\x0D491231000000Z").unwrap();
        assert_eq!(recent.to_date().unwrap().year(), 2049);
    }

    #[test]
    fn dates_are_ordered() {
        let earlier = UtcDate::new(2024, 1, 1, 0, 0, 0).unwrap();
        let later = UtcDate::new(2024, 1, 1, 0, 0, 1).unwrap();
        assert!(earlier < later);
        assert_eq!(later.to_string(), "2024-01-01T00:00:01Z");
    }
}
