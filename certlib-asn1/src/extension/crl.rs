//! Extensions found on CRLs and on CRL entries.

use crate::time::{Time, TimeKind};
use crate::tlv::{self, universal, TlvError};
use oid::ObjectIdentifier;
use picky_asn1::wrapper::{IntegerAsn1, ObjectIdentifierAsn1};

/// [RFC 5280 #5.2.3](https://tools.ietf.org/html/rfc5280#section-5.2.3)
///
/// ```not_rust
/// CRLNumber ::= INTEGER (0..MAX)
/// ```
///
/// Also the shape of the delta CRL indicator (`BaseCRLNumber`). Values wider than 32 bits are
/// refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrlNumber(pub u32);

impl CrlNumber {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        tlv::expect_single(der, universal::INTEGER)?;
        let number: IntegerAsn1 = picky_asn1_der::from_bytes(der).map_err(|e| TlvError::der("CRL number", e))?;
        tlv::content_to_u32(&number.0).map(Self).ok_or(TlvError::Der {
            element: "CRL number",
            message: format!("{} content octets do not fit the supported range", number.0.len()),
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        picky_asn1_der::to_vec(&IntegerAsn1(tlv::u32_to_content(self.0))).map_err(|e| TlvError::der("CRL number", e))
    }
}

/// [RFC 5280 #5.3.1](https://tools.ietf.org/html/rfc5280#section-5.3.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrlReason {
    Unspecified,
    KeyCompromise,
    CaCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    RemoveFromCrl,
    PrivilegeWithdrawn,
    AaCompromise,
}

impl CrlReason {
    pub fn code(self) -> u8 {
        match self {
            CrlReason::Unspecified => 0,
            CrlReason::KeyCompromise => 1,
            CrlReason::CaCompromise => 2,
            CrlReason::AffiliationChanged => 3,
            CrlReason::Superseded => 4,
            CrlReason::CessationOfOperation => 5,
            CrlReason::CertificateHold => 6,
            // 7 is not used
            CrlReason::RemoveFromCrl => 8,
            CrlReason::PrivilegeWithdrawn => 9,
            CrlReason::AaCompromise => 10,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        let reason = match code {
            0 => CrlReason::Unspecified,
            1 => CrlReason::KeyCompromise,
            2 => CrlReason::CaCompromise,
            3 => CrlReason::AffiliationChanged,
            4 => CrlReason::Superseded,
            5 => CrlReason::CessationOfOperation,
            6 => CrlReason::CertificateHold,
            8 => CrlReason::RemoveFromCrl,
            9 => CrlReason::PrivilegeWithdrawn,
            10 => CrlReason::AaCompromise,
            _ => return None,
        };
        Some(reason)
    }

    /// `CRLReason ::= ENUMERATED`
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let content = tlv::expect_single(der, universal::ENUMERATED)?;
        tlv::content_to_u32(content)
            .and_then(Self::from_code)
            .ok_or(TlvError::Der {
                element: "CRL reason",
                message: "unknown reason code".to_owned(),
            })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        Ok(tlv::encode(universal::ENUMERATED, &[self.code()]))
    }
}

/// [RFC 5280 #5.3.2](https://tools.ietf.org/html/rfc5280#section-5.3.2)
///
/// ```not_rust
/// InvalidityDate ::=  GeneralizedTime
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvalidityDate(pub Time);

impl InvalidityDate {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let time = Time::from_element(der)?;
        if time.kind() != TimeKind::Generalized {
            return Err(TlvError::UnexpectedTag {
                expected: universal::GENERALIZED_TIME,
                actual: universal::UTC_TIME,
            });
        }
        Ok(Self(time))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        Ok(self.0.to_element())
    }
}

/// [RFC 3280 #5.3.2](https://tools.ietf.org/html/rfc3280#section-5.3.2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldInstructionCode(pub ObjectIdentifier);

impl HoldInstructionCode {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        tlv::expect_single(der, universal::OID)?;
        let code: ObjectIdentifierAsn1 =
            picky_asn1_der::from_bytes(der).map_err(|e| TlvError::der("hold instruction code", e))?;
        Ok(Self(code.0))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        picky_asn1_der::to_vec(&ObjectIdentifierAsn1(self.0.clone()))
            .map_err(|e| TlvError::der("hold instruction code", e))
    }
}

impl_serde_from_der!(CrlNumber, CrlReason, InvalidityDate, HoldInstructionCode);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::UtcDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn crl_number() {
        assert_eq!(CrlNumber::from_der(&[0x02, 0x01, 0x07]).unwrap(), CrlNumber(7));
        assert_eq!(
            CrlNumber(0xFFFF_FFFF).to_der().unwrap(),
            [0x02, 0x05, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        assert_eq!(
            CrlNumber::from_der(&[0x02, 0x05, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap(),
            CrlNumber(u32::MAX)
        );
    }

    #[test]
    fn wide_crl_number_is_refused() {
        assert!(CrlNumber::from_der(&[0x02, 0x05, 0x01, 0x00, 0x00, 0x00, 0x00]).is_err());
        assert!(CrlNumber::from_der(&[0x02, 0x01, 0x80]).is_err());
    }

    #[test]
    fn reason_code() {
        let reason: CrlReason = picky_asn1_der::from_bytes(&[0x0A, 0x01, 0x01]).unwrap();
        assert_eq!(reason, CrlReason::KeyCompromise);
        assert_eq!(CrlReason::RemoveFromCrl.to_der().unwrap(), [0x0A, 0x01, 0x08]);
        assert!(CrlReason::from_der(&[0x0A, 0x01, 0x07]).is_err());
        assert!(CrlReason::from_der(&[0x02, 0x01, 0x01]).is_err());
    }

    #[test]
    fn invalidity_date_is_generalized() {
        let date = InvalidityDate(Time::generalized(UtcDate::ymd(2024, 5, 1).unwrap()));
        let der = date.to_der().unwrap();
        assert_eq!(der[0], universal::GENERALIZED_TIME);
        assert_eq!(InvalidityDate::from_der(&der).unwrap(), date);
        assert!(InvalidityDate::from_der(b"\x17\x0D240501000000Z").is_err());
    }
}
