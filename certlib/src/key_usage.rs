//! Operations a certified key may be used for.

use crate::item::CertItem;
use crate::registry::{ExtensionKind, ExtensionValue};
use certlib_asn1::extension::KeyUsage;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyUse(u8);

impl KeyUse {
    pub const SIGN: KeyUse = KeyUse(1 << 0);
    pub const VERIFY: KeyUse = KeyUse(1 << 1);
    pub const ENCRYPT: KeyUse = KeyUse(1 << 2);
    pub const DECRYPT: KeyUse = KeyUse(1 << 3);
    pub const WRAP: KeyUse = KeyUse(1 << 4);
    pub const UNWRAP: KeyUse = KeyUse(1 << 5);
    pub const DERIVE: KeyUse = KeyUse(1 << 6);
    pub const ALL: KeyUse = KeyUse(0x7F);

    const NAMES: [(KeyUse, &'static str); 7] = [
        (KeyUse::SIGN, "sign"),
        (KeyUse::VERIFY, "verify"),
        (KeyUse::ENCRYPT, "encrypt"),
        (KeyUse::DECRYPT, "decrypt"),
        (KeyUse::WRAP, "wrap"),
        (KeyUse::UNWRAP, "unwrap"),
        (KeyUse::DERIVE, "derive"),
    ];

    pub const fn empty() -> Self {
        KeyUse(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: KeyUse) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: KeyUse) {
        self.0 |= other.0;
    }

    /// Usages allowed by a keyUsage extension, optionally on a CA certificate.
    pub fn from_key_usage(key_usage: &KeyUsage, is_ca: bool) -> Self {
        let mut usage = KeyUse::empty();

        if key_usage.digital_signature() || key_usage.content_commitment() {
            usage |= KeyUse::SIGN | KeyUse::VERIFY;
        }
        if key_usage.key_encipherment() {
            usage |= KeyUse::WRAP | KeyUse::UNWRAP;
        }
        if key_usage.data_encipherment() {
            usage |= KeyUse::ENCRYPT | KeyUse::DECRYPT;
        }
        if key_usage.key_agreement() {
            usage |= KeyUse::DERIVE;
        }
        if key_usage.key_cert_sign() || key_usage.crl_sign() {
            usage |= KeyUse::SIGN | KeyUse::VERIFY;
        }

        // a CA key always verifies what it issued
        if is_ca {
            usage |= KeyUse::VERIFY;
        }

        usage
    }
}

impl BitOr for KeyUse {
    type Output = KeyUse;

    fn bitor(self, rhs: KeyUse) -> KeyUse {
        KeyUse(self.0 | rhs.0)
    }
}

impl BitOrAssign for KeyUse {
    fn bitor_assign(&mut self, rhs: KeyUse) {
        self.insert(rhs);
    }
}

impl fmt::Debug for KeyUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for (flag, name) in KeyUse::NAMES {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}

impl CertItem {
    /// Key usages allowed for the certified key.
    ///
    /// A certificate without a decodable keyUsage extension allows everything.
    pub fn infer_key_usage(&self) -> KeyUse {
        let extensions = self.extensions();

        let Some(ExtensionValue::KeyUsage(key_usage)) = extensions.find_value(ExtensionKind::KeyUsage) else {
            return KeyUse::ALL;
        };

        let is_ca = matches!(
            extensions.find_value(ExtensionKind::BasicConstraints),
            Some(ExtensionValue::BasicConstraints(constraints)) if constraints.is_ca()
        );

        KeyUse::from_key_usage(key_usage, is_ca)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn key_usage(bits: &[usize]) -> KeyUsage {
        let mut key_usage = KeyUsage::new();
        for bit in bits {
            let mut named = key_usage.bits();
            named.set(*bit, true);
            key_usage = KeyUsage::from_bits(named);
        }
        key_usage
    }

    #[rstest]
    #[case(&[0], false, KeyUse::SIGN | KeyUse::VERIFY)]
    #[case(&[1], false, KeyUse::SIGN | KeyUse::VERIFY)]
    #[case(&[2], false, KeyUse::WRAP | KeyUse::UNWRAP)]
    #[case(&[3], false, KeyUse::ENCRYPT | KeyUse::DECRYPT)]
    #[case(&[4], false, KeyUse::DERIVE)]
    #[case(&[5, 6], true, KeyUse::SIGN | KeyUse::VERIFY)]
    #[case(&[2], true, KeyUse::WRAP | KeyUse::UNWRAP | KeyUse::VERIFY)]
    #[case(&[], false, KeyUse::empty())]
    fn from_key_usage_bits(#[case] bits: &[usize], #[case] is_ca: bool, #[case] expected: KeyUse) {
        assert_eq!(KeyUse::from_key_usage(&key_usage(bits), is_ca), expected);
    }

    #[test]
    fn leaf_key_usage() {
        let leaf = CertItem::decode(certlib_test_data::LEAF_CERT_DER).unwrap();
        assert_eq!(
            leaf.infer_key_usage(),
            KeyUse::SIGN | KeyUse::VERIFY | KeyUse::WRAP | KeyUse::UNWRAP
        );
    }

    #[test]
    fn missing_key_usage_allows_everything() {
        assert_eq!(CertItem::new().infer_key_usage(), KeyUse::ALL);
    }

    #[test]
    fn debug_lists_flags() {
        assert_eq!(format!("{:?}", KeyUse::SIGN | KeyUse::DERIVE), "{sign, derive}");
    }
}
