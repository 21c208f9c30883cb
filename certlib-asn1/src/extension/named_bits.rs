use crate::tlv::{self, universal, TlvError};
use picky_asn1::bit_string::BitString;
use picky_asn1::wrapper::BitStringAsn1;

/// Highest named bit any of the supported BIT STRING shapes defines, plus one.
const MAX_NAMED_BITS: usize = 32;

/// A `NamedBitList` BIT STRING.
///
/// Stored as a mask indexed by bit number. DER requires trailing zero bits to be dropped, which
/// [`NamedBits::to_der`] does, so two values with the same named bits always encode the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NamedBits(u32);

impl NamedBits {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn from_mask(mask: u32) -> Self {
        Self(mask)
    }

    pub fn mask(self) -> u32 {
        self.0
    }

    pub fn is_set(self, idx: usize) -> bool {
        idx < MAX_NAMED_BITS && self.0 & (1 << idx) != 0
    }

    pub fn set(&mut self, idx: usize, val: bool) {
        if idx >= MAX_NAMED_BITS {
            return;
        }
        if val {
            self.0 |= 1 << idx;
        } else {
            self.0 &= !(1 << idx);
        }
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        tlv::expect_single(der, universal::BIT_STRING)?;
        let bit_string: BitStringAsn1 = picky_asn1_der::from_bytes(der).map_err(|e| TlvError::der("named bits", e))?;
        let bits = bit_string.0;

        let mut mask = 0u32;
        for idx in 0..bits.get_num_bits() {
            if !bits.is_set(idx) {
                continue;
            }
            if idx >= MAX_NAMED_BITS {
                return Err(TlvError::Der {
                    element: "named bits",
                    message: format!("bit {idx} is not a named bit"),
                });
            }
            mask |= 1 << idx;
        }

        Ok(Self(mask))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let num_bits = MAX_NAMED_BITS - self.0.leading_zeros() as usize;
        let mut bits = BitString::with_len(num_bits);
        for idx in 0..num_bits {
            if self.is_set(idx) {
                bits.set(idx, true);
            }
        }
        picky_asn1_der::to_vec(&BitStringAsn1(bits)).map_err(|e| TlvError::der("named bits", e))
    }
}

impl_serde_from_der!(NamedBits);

macro_rules! named_bit_get_set {
    ($getter:ident , $setter:ident , $idx:literal) => {
        pub fn $getter(&self) -> bool {
            self.0.is_set($idx)
        }

        pub fn $setter(&mut self, val: bool) {
            self.0.set($idx, val);
        }
    };
    ( $( $getter:ident , $setter:ident , $idx:literal ; )+ ) => {
        $( named_bit_get_set! { $getter, $setter, $idx } )+
    };
}

macro_rules! named_bit_string {
    ($(#[$meta:meta])* $name:ident { $( $getter:ident , $setter:ident , $idx:literal ; )+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(NamedBits);

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn from_bits(bits: NamedBits) -> Self {
                Self(bits)
            }

            pub fn bits(&self) -> NamedBits {
                self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.mask() == 0
            }

            pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
                NamedBits::from_der(der).map(Self)
            }

            pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
                self.0.to_der()
            }

            named_bit_get_set! {
                $( $getter, $setter, $idx; )+
            }
        }

        impl_serde_from_der!($name);
    };
}

named_bit_string! {
    /// [RFC 5280 #4.2.1.3](https://tools.ietf.org/html/rfc5280#section-4.2.1.3)
    KeyUsage {
        digital_signature, set_digital_signature, 0;
        content_commitment, set_content_commitment, 1;
        key_encipherment, set_key_encipherment, 2;
        data_encipherment, set_data_encipherment, 3;
        key_agreement, set_key_agreement, 4;
        key_cert_sign, set_key_cert_sign, 5;
        crl_sign, set_crl_sign, 6;
        encipher_only, set_encipher_only, 7;
        decipher_only, set_decipher_only, 8;
    }
}

named_bit_string! {
    /// [RFC 5280 #4.2.1.13](https://tools.ietf.org/html/rfc5280#section-4.2.1.13)
    ///
    /// Bit 0 is `unused`.
    ReasonFlags {
        key_compromise, set_key_compromise, 1;
        ca_compromise, set_ca_compromise, 2;
        affiliation_changed, set_affiliation_changed, 3;
        superseded, set_superseded, 4;
        cessation_of_operation, set_cessation_of_operation, 5;
        certificate_hold, set_certificate_hold, 6;
        privilege_withdrawn, set_privilege_withdrawn, 7;
        aa_compromise, set_aa_compromise, 8;
    }
}

named_bit_string! {
    /// Netscape certificate type (`2.16.840.1.113730.1.1`)
    NetscapeCertType {
        ssl_client, set_ssl_client, 0;
        ssl_server, set_ssl_server, 1;
        smime, set_smime, 2;
        object_signing, set_object_signing, 3;
        ssl_ca, set_ssl_ca, 5;
        smime_ca, set_smime_ca, 6;
        object_signing_ca, set_object_signing_ca, 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn key_usage() {
        let encoded: [u8; 4] = [0x03, 0x02, 0x05, 0xA0];
        let mut key_usage = KeyUsage::new();
        key_usage.set_digital_signature(true);
        key_usage.set_key_encipherment(true);
        assert_eq!(key_usage.to_der().unwrap(), encoded);

        let decoded: KeyUsage = picky_asn1_der::from_bytes(&encoded).unwrap();
        assert_eq!(decoded, key_usage);
        assert!(decoded.digital_signature());
        assert!(!decoded.key_cert_sign());
    }

    #[test]
    fn trailing_zero_bits_are_dropped() {
        // digitalSignature only, but encoded with the full nine-bit width
        let padded = [0x03, 0x03, 0x07, 0x80, 0x00];
        let key_usage = KeyUsage::from_der(&padded).unwrap();
        assert!(key_usage.digital_signature());
        assert_eq!(key_usage.to_der().unwrap(), [0x03, 0x02, 0x07, 0x80]);
    }

    #[test]
    fn decipher_only_spills_into_second_octet() {
        let mut key_usage = KeyUsage::new();
        key_usage.set_decipher_only(true);
        assert_eq!(key_usage.to_der().unwrap(), [0x03, 0x03, 0x07, 0x00, 0x80]);
    }

    #[test]
    fn empty_bit_string() {
        assert_eq!(ReasonFlags::new().to_der().unwrap(), [0x03, 0x01, 0x00]);
        assert!(ReasonFlags::from_der(&[0x03, 0x01, 0x00]).unwrap().is_empty());
    }

    #[test]
    fn netscape_cert_type() {
        let cert_type = NetscapeCertType::from_der(&[0x03, 0x02, 0x06, 0x40]).unwrap();
        assert!(cert_type.ssl_server());
        assert!(!cert_type.ssl_client());
    }
}
