//! Distinguished name comparison, following the matching rules of RFC 2459 #4.1.2.4.
//!
//! Values held in a case-insensitive string type are normalized before comparing:
//! trailing NUL and whitespace are stripped, leading whitespace is removed, interior runs of
//! whitespace collapse to a single space and ASCII letters are uppercased. Other string types
//! (IA5String, BMPString, ...) are compared as encoded.

use crate::error::CodecError;
use certlib_asn1::name::{AttributeTypeAndValue, AttributeValue, RelativeDistinguishedName};
use certlib_asn1::tlv::universal;
use certlib_asn1::Name;

pub use certlib_asn1::name::{NameAttr, NamePrettyFormatter};

fn is_case_insensitive(tag: u8) -> bool {
    matches!(
        tag,
        universal::PRINTABLE_STRING | universal::TELETEX_STRING | universal::UTF8_STRING
    )
}

fn normalize_bytes(bytes: &[u8]) -> Vec<u8> {
    let end = bytes
        .iter()
        .rposition(|byte| *byte != 0 && !byte.is_ascii_whitespace())
        .map_or(0, |idx| idx + 1);
    let start = bytes[..end]
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(end);

    let mut normalized = Vec::with_capacity(end - start);
    let mut in_space = false;
    for byte in &bytes[start..end] {
        if byte.is_ascii_whitespace() {
            if !in_space {
                normalized.push(b' ');
                in_space = true;
            }
        } else {
            normalized.push(byte.to_ascii_uppercase());
            in_space = false;
        }
    }
    normalized
}

fn normalize_value(value: &AttributeValue) -> AttributeValue {
    if is_case_insensitive(value.tag) {
        AttributeValue::new(value.tag, normalize_bytes(&value.bytes))
    } else {
        value.clone()
    }
}

/// Returns a copy of `name` with every case-insensitive value normalized.
pub fn normalize(name: &Name) -> Name {
    Name(
        name.0
            .iter()
            .map(|rdn| {
                RelativeDistinguishedName(
                    rdn.0
                        .iter()
                        .map(|atv| AttributeTypeAndValue::new(atv.ty.clone(), normalize_value(&atv.value)))
                        .collect(),
                )
            })
            .collect(),
    )
}

pub fn normalized_der(name: &Name) -> Result<Vec<u8>, CodecError> {
    normalize(name).to_der().map_err(CodecError::encode("normalized name"))
}

/// Whether both names designate the same entity once normalized.
pub fn same_dn(lhs: &Name, rhs: &Name) -> Result<bool, CodecError> {
    Ok(normalized_der(lhs)? == normalized_der(rhs)?)
}

/// Builds a name holding one attribute per RDN, in the given order.
pub fn build_name<S: AsRef<str>>(attributes: &[(NameAttr, S)]) -> Name {
    let mut name = Name::new();
    for (attr, value) in attributes {
        name.add_attr(*attr, value);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use certlib_asn1::oids;
    use expect_test::expect;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn printable(text: &[u8]) -> Name {
        let mut name = Name::new();
        name.push_atv(AttributeTypeAndValue::new(
            oids::at_common_name(),
            AttributeValue::new(universal::PRINTABLE_STRING, text.to_vec()),
        ));
        name
    }

    #[rstest]
    #[case(b"Example  CA", b"EXAMPLE CA")]
    #[case(b"  example ca  ", b"EXAMPLE CA")]
    #[case(b"example\t\t ca\0", b"EXAMPLE CA")]
    #[case(b"a \0", b"A")]
    #[case(b"", b"")]
    #[case(b"   ", b"")]
    fn normalizes_printable_values(#[case] input: &[u8], #[case] expected: &[u8]) {
        let normalized = normalize(&printable(input));
        assert_eq!(normalized.attributes().next().unwrap().value.bytes, expected);
    }

    #[rstest]
    #[case(b"Example  CA")]
    #[case(b" x\0\0 ")]
    #[case(b"a\0b")]
    fn normalization_is_idempotent(#[case] input: &[u8]) {
        let once = normalize(&printable(input));
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn ia5_values_are_left_alone() {
        let mut name = Name::new();
        name.push_atv(AttributeTypeAndValue::new(
            oids::email_address(),
            AttributeValue::new(universal::IA5_STRING, b" Admin@Example.com ".to_vec()),
        ));
        assert_eq!(normalize(&name), name);
    }

    #[test]
    fn same_dn_ignores_case_and_spacing() {
        let lhs = build_name(&[
            (NameAttr::CountryName, "CA"),
            (NameAttr::OrganizationName, "Example Org"),
            (NameAttr::CommonName, "Example Issuing CA"),
        ]);
        let rhs = build_name(&[
            (NameAttr::CountryName, "ca"),
            (NameAttr::OrganizationName, "example  org"),
            (NameAttr::CommonName, " Example Issuing   ca"),
        ]);
        assert!(same_dn(&lhs, &rhs).unwrap());

        let other = build_name(&[(NameAttr::CommonName, "Example Issuing CA")]);
        assert!(!same_dn(&lhs, &other).unwrap());
    }

    #[test]
    fn string_type_matters() {
        let lhs = printable(b"Acme");
        let mut rhs = Name::new();
        rhs.push_atv(AttributeTypeAndValue::new(
            oids::at_common_name(),
            AttributeValue::new(universal::UTF8_STRING, b"ACME".to_vec()),
        ));
        assert!(!same_dn(&lhs, &rhs).unwrap());
    }

    #[test]
    fn pretty_format() {
        let name = build_name(&[
            (NameAttr::CountryName, "CA"),
            (NameAttr::OrganizationName, "Example Org"),
            (NameAttr::CommonName, "Example Issuing CA"),
        ]);
        expect!["C=CA,O=Example Org,CN=Example Issuing CA"].assert_eq(&NamePrettyFormatter(&name).to_string());
    }
}
