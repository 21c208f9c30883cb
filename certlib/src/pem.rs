//! PEM armor ([RFC 7468](https://tools.ietf.org/html/rfc7468)).

use crate::error::CodecError;
use crate::item::{CertItem, CrlItem};
use base64::engine::general_purpose;
use base64::{DecodeError, Engine as _};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PEM_HEADER_START: &str = "-----BEGIN";
const PEM_HEADER_END: &str = "-----END";
const PEM_DASHES_BOUNDARIES: &str = "-----";

pub const CERT_PEM_LABEL: &str = "CERTIFICATE";
pub const CRL_PEM_LABEL: &str = "X509 CRL";

#[derive(Debug, Clone, Error)]
pub enum PemError {
    /// pem header not found
    #[error("pem header not found")]
    HeaderNotFound,

    /// invalid pem header
    #[error("invalid pem header")]
    InvalidHeader,

    /// pem footer not found
    #[error("pem footer not found")]
    FooterNotFound,

    /// couldn't decode base64
    #[error("couldn't decode base64: {source}")]
    Base64Decoding { source: DecodeError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pem<'a> {
    label: String,
    data: Cow<'a, [u8]>,
}

impl<'a> Pem<'a> {
    pub fn new<S: Into<String>, D: Into<Cow<'a, [u8]>>>(label: S, data: D) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Cow<'a, [u8]> {
        self.data
    }
}

impl FromStr for Pem<'static> {
    type Err = PemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_pem(s.as_bytes())
    }
}

impl fmt::Display for Pem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}-----", PEM_HEADER_START, self.label)?;

        let encoded = general_purpose::STANDARD.encode(&self.data);
        for chunk in encoded.as_bytes().chunks(64) {
            let chunk = std::str::from_utf8(chunk).map_err(|_| fmt::Error)?;
            writeln!(f, "{}", chunk)?;
        }

        write!(f, "{} {}-----", PEM_HEADER_END, self.label)
    }
}

impl From<Pem<'_>> for String {
    fn from(pem: Pem<'_>) -> Self {
        pem.to_string()
    }
}

/// Reads a PEM-encoded structure.
///
/// Line endings inside the base64 body are skipped.
pub fn parse_pem<T: ?Sized + AsRef<[u8]>>(input: &T) -> Result<Pem<'static>, PemError> {
    parse_pem_impl(input.as_ref())
}

fn parse_pem_impl(input: &[u8]) -> Result<Pem<'static>, PemError> {
    let header_start_idx = find(input, PEM_HEADER_START.as_bytes()).ok_or(PemError::HeaderNotFound)?;

    let label_start_idx = header_start_idx + PEM_HEADER_START.len();
    let label_end_idx = find(&input[label_start_idx..], b"-").ok_or(PemError::InvalidHeader)? + label_start_idx;
    let label = String::from_utf8_lossy(&input[label_start_idx..label_end_idx])
        .trim()
        .to_owned();

    let header_end_idx = find(&input[label_end_idx..], PEM_DASHES_BOUNDARIES.as_bytes())
        .ok_or(PemError::InvalidHeader)?
        + label_end_idx
        + PEM_DASHES_BOUNDARIES.len();

    let footer_start_idx =
        find(&input[header_end_idx..], PEM_HEADER_END.as_bytes()).ok_or(PemError::FooterNotFound)? + header_end_idx;

    let raw_data = &input[header_end_idx..footer_start_idx];

    let data = if raw_data.iter().any(u8::is_ascii_whitespace) {
        let stripped: Vec<u8> = raw_data
            .iter()
            .copied()
            .filter(|byte| !byte.is_ascii_whitespace())
            .collect();
        general_purpose::STANDARD.decode(stripped)
    } else {
        general_purpose::STANDARD.decode(raw_data)
    }
    .map_err(|source| PemError::Base64Decoding { source })?;

    Ok(Pem {
        label,
        data: Cow::Owned(data),
    })
}

fn find(buffer: &[u8], value: &[u8]) -> Option<usize> {
    buffer.windows(value.len()).position(|window| window == value)
}

/// Builds a PEM-encoded structure into a String.
pub fn to_pem<S, T>(label: S, data: &T) -> String
where
    S: Into<String>,
    T: ?Sized + AsRef<[u8]>,
{
    Pem::new(label, data.as_ref()).to_string()
}

fn check_label(pem: &Pem<'_>, expected: &str) -> Result<(), CodecError> {
    if pem.label() == expected {
        Ok(())
    } else {
        Err(CodecError::InvalidPemLabel {
            label: pem.label().to_owned(),
        })
    }
}

impl CertItem {
    pub fn from_pem(pem: &Pem<'_>) -> Result<Self, CodecError> {
        check_label(pem, CERT_PEM_LABEL)?;
        Self::decode(pem.data())
    }

    pub fn from_pem_str(pem_str: &str) -> Result<Self, CodecError> {
        let pem = parse_pem(pem_str)?;
        Self::from_pem(&pem)
    }

    pub fn to_pem(&self) -> Result<Pem<'static>, CodecError> {
        Ok(Pem::new(CERT_PEM_LABEL, self.to_der()?))
    }
}

impl CrlItem {
    pub fn from_pem(pem: &Pem<'_>) -> Result<Self, CodecError> {
        check_label(pem, CRL_PEM_LABEL)?;
        Self::decode(pem.data())
    }

    pub fn from_pem_str(pem_str: &str) -> Result<Self, CodecError> {
        let pem = parse_pem(pem_str)?;
        Self::from_pem(&pem)
    }

    pub fn to_pem(&self) -> Result<Pem<'static>, CodecError> {
        Ok(Pem::new(CRL_PEM_LABEL, self.to_der()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FLATTENED_PEM: &str = "-----BEGIN GARBAGE-----GARBAGE-----END GARBAGE-----";

    #[test]
    fn read_pem() {
        let pem_from_bytes = parse_pem(certlib_test_data::CA_CERT_PEM.as_bytes()).unwrap();
        assert_eq!(pem_from_bytes.label(), CERT_PEM_LABEL);
        assert_eq!(pem_from_bytes.data(), certlib_test_data::CA_CERT_DER);

        let pem_from_str = certlib_test_data::CA_CERT_PEM.parse::<Pem>().unwrap();
        assert_eq!(pem_from_bytes, pem_from_str);
    }

    #[test]
    fn to_pem_matches_fixture() {
        let pem = certlib_test_data::LEAF_CERT_PEM.parse::<Pem>().unwrap();
        assert_eq!(pem.to_string(), certlib_test_data::LEAF_CERT_PEM.trim_end());
    }

    #[test]
    fn flattened_pem() {
        FLATTENED_PEM.parse::<Pem>().unwrap();
    }

    #[test]
    fn missing_footer() {
        let err = "-----BEGIN CERTIFICATE-----MIIB".parse::<Pem>().unwrap_err();
        assert!(matches!(err, PemError::FooterNotFound));
    }

    #[test]
    fn items_from_pem() {
        let cert = CertItem::from_pem_str(certlib_test_data::CA_CERT_PEM).unwrap();
        assert_eq!(cert.to_der().unwrap(), certlib_test_data::CA_CERT_DER);

        let crl = CrlItem::from_pem_str(certlib_test_data::CA_CRL_PEM).unwrap();
        assert_eq!(crl.to_pem().unwrap().data(), certlib_test_data::CA_CRL_DER);
    }

    #[test]
    fn wrong_label_is_rejected() {
        let err = CrlItem::from_pem_str(certlib_test_data::CA_CERT_PEM).unwrap_err();
        assert!(matches!(err, CodecError::InvalidPemLabel { label } if label == CERT_PEM_LABEL));
    }
}
