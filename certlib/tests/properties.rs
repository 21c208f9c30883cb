use certlib::asn1::extension::{
    AccessDescription, AuthorityKeyIdentifier, BasicConstraints, CertificatePolicies, CrlDistributionPoints,
    CrlNumber, CrlReason, DistributionPoint, DistributionPointName, ExtendedKeyUsage, GeneralSubtree,
    HoldInstructionCode, InfoAccess, InhibitAnyPolicy, InvalidityDate, IssuingDistributionPoint, KeyUsage,
    NameConstraints, NetscapeCertType, PolicyConstraints, PolicyInformation, PolicyMapping, PolicyMappings,
    PolicyQualifierInfo, PrivateKeyUsagePeriod, QcStatement, QcStatements, ReasonFlags, SubjectKeyIdentifier,
};
use certlib::asn1::{
    oids, signed, GeneralName, GeneralNames, Name, NameAttr, ObjectIdentifier, Time, UtcDate,
};
use certlib::name::{build_name, normalize, same_dn};
use certlib::{CertItem, CrlItem, ExtensionKind, ExtensionValue};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case(certlib_test_data::CA_CERT_DER)]
#[case(certlib_test_data::LEAF_CERT_DER)]
#[case(certlib_test_data::CA_CRL_DER)]
fn split_then_join_is_identity(#[case] der: &[u8]) {
    let parts = signed::split(der).unwrap();
    assert_eq!(signed::join(parts.tbs, parts.algorithm, parts.signature), der);
}

#[rstest]
#[case(certlib_test_data::CA_CERT_DER)]
#[case(certlib_test_data::LEAF_CERT_DER)]
fn decoded_certificate_reencodes_exactly(#[case] der: &[u8]) {
    let cert = CertItem::decode(der).unwrap();
    assert_eq!(cert.to_der().unwrap(), der);
    assert_eq!(cert.extensions().encode_all().unwrap().to_der().unwrap(), extensions_der(der));
}

fn extensions_der(der: &[u8]) -> Vec<u8> {
    let parts = signed::split(der).unwrap();
    certlib::asn1::TbsCertificate::from_der(parts.tbs)
        .unwrap()
        .extensions
        .unwrap()
        .to_der()
        .unwrap()
}

#[test]
fn pem_and_der_fixtures_agree() {
    use base64::Engine as _;

    let body: String = certlib_test_data::CA_CRL_PEM
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .collect();
    let der = base64::engine::general_purpose::STANDARD.decode(body).unwrap();
    assert_eq!(der, certlib_test_data::CA_CRL_DER);
    assert_eq!(hex::encode(&der[..7]), "308201353081dc");

    let crl = CrlItem::decode(&der).unwrap();
    assert_eq!(crl.revoked_entries().len(), 2);
}

fn oid(dotted: &str) -> ObjectIdentifier {
    ObjectIdentifier::try_from(dotted).unwrap()
}

fn generalized(year: u16) -> Time {
    Time::generalized(UtcDate::ymd(year, 1, 1).unwrap())
}

/// One non-trivial value for every registered extension kind.
fn sample_values() -> Vec<ExtensionValue> {
    let mut key_usage = KeyUsage::new();
    key_usage.set_key_cert_sign(true);
    key_usage.set_crl_sign(true);

    let mut reasons = ReasonFlags::new();
    reasons.set_key_compromise(true);
    reasons.set_ca_compromise(true);

    let mut cert_type = NetscapeCertType::new();
    cert_type.set_ssl_server(true);
    cert_type.set_object_signing_ca(true);

    let mut excluded = GeneralSubtree::new(GeneralName::new_rfc822_name("example.org"));
    excluded.minimum = 1;
    excluded.maximum = Some(4);

    vec![
        ExtensionValue::KeyUsage(key_usage),
        ExtensionValue::BasicConstraints(BasicConstraints::new(true, 3u32)),
        ExtensionValue::ExtendedKeyUsage(ExtendedKeyUsage::new(vec![
            oids::kp_server_auth(),
            oids::kp_client_auth(),
        ])),
        ExtensionValue::SubjectKeyIdentifier(SubjectKeyIdentifier(vec![0x01, 0x02, 0x03])),
        ExtensionValue::AuthorityKeyIdentifier(AuthorityKeyIdentifier {
            key_identifier: Some(vec![0xAB; 20]),
            authority_cert_issuer: Some(GeneralNames::new(GeneralName::new_directory_name(
                Name::new_common_name("Root"),
            ))),
            authority_cert_serial_number: Some(vec![0x10, 0x01]),
        }),
        ExtensionValue::SubjectAltName(GeneralNames::with_names(vec![
            GeneralName::new_dns_name("a.example.com"),
            GeneralName::new_uri("https://example.com"),
        ])),
        ExtensionValue::IssuerAltName(GeneralNames::new(GeneralName::new_rfc822_name("ca@example.com"))),
        ExtensionValue::CertificatePolicies(CertificatePolicies(vec![
            PolicyInformation::new(oid("2.23.140.1.2.1"))
                .with_qualifier(PolicyQualifierInfo::new_cps_uri("https://example.com/cps")),
            PolicyInformation::new(oids::any_policy()),
        ])),
        ExtensionValue::PolicyMappings(PolicyMappings(vec![PolicyMapping::new(
            oid("1.2.3.4.1"),
            oid("1.2.3.4.2"),
        )])),
        ExtensionValue::PolicyConstraints(PolicyConstraints {
            require_explicit_policy: Some(0),
            inhibit_policy_mapping: Some(2),
        }),
        ExtensionValue::InhibitAnyPolicy(InhibitAnyPolicy(0)),
        ExtensionValue::NameConstraints(NameConstraints {
            permitted_subtrees: Some(vec![GeneralSubtree::new(GeneralName::new_dns_name(".example.com"))]),
            excluded_subtrees: Some(vec![excluded]),
        }),
        ExtensionValue::CrlDistributionPoints(CrlDistributionPoints(vec![DistributionPoint::new_uri(
            "http://crl.example.com/x.crl",
        )])),
        ExtensionValue::FreshestCrl(CrlDistributionPoints(vec![DistributionPoint {
            distribution_point: Some(DistributionPointName::FullName(GeneralNames::new(
                GeneralName::new_uri("http://crl.example.com/delta.crl"),
            ))),
            reasons: Some(reasons),
            crl_issuer: None,
        }])),
        ExtensionValue::AuthorityInfoAccess(InfoAccess(vec![
            AccessDescription::new_ocsp("http://ocsp.example.com"),
            AccessDescription::new_ca_issuers("http://example.com/ca.crt"),
        ])),
        ExtensionValue::SubjectInfoAccess(InfoAccess(vec![AccessDescription::new(
            oid("1.3.6.1.5.5.7.48.5"),
            GeneralName::new_uri("http://example.com/repo/"),
        )])),
        ExtensionValue::QcStatements(QcStatements(vec![
            QcStatement::new(oid("0.4.0.1862.1.1"), None),
            QcStatement::new(oid("0.4.0.1862.1.3"), Some(vec![0x02, 0x01, 0x05])),
        ])),
        ExtensionValue::PrivateKeyUsagePeriod(PrivateKeyUsagePeriod {
            not_before: Some(generalized(2024)),
            not_after: Some(generalized(2025)),
        }),
        ExtensionValue::NetscapeCertType(cert_type),
        ExtensionValue::CrlNumber(CrlNumber(u32::MAX)),
        ExtensionValue::DeltaCrlIndicator(CrlNumber(6)),
        ExtensionValue::IssuingDistributionPoint(IssuingDistributionPoint {
            distribution_point: Some(DistributionPointName::FullName(GeneralNames::new(
                GeneralName::new_uri("http://crl.example.com/x.crl"),
            ))),
            only_contains_user_certs: true,
            only_contains_ca_certs: false,
            only_some_reasons: Some(reasons),
            indirect_crl: false,
            only_contains_attribute_certs: false,
        }),
        ExtensionValue::ReasonCode(CrlReason::CessationOfOperation),
        ExtensionValue::InvalidityDate(InvalidityDate(generalized(2024))),
        ExtensionValue::CertificateIssuer(GeneralNames::new(GeneralName::new_directory_name(
            Name::new_common_name("Indirect Issuer"),
        ))),
        ExtensionValue::HoldInstructionCode(HoldInstructionCode(oid("1.2.840.10040.2.2"))),
    ]
}

#[test]
fn every_registered_kind_has_a_sample() {
    let kinds: Vec<ExtensionKind> = sample_values().iter().map(ExtensionValue::kind).collect();
    assert_eq!(kinds, ExtensionKind::ALL);
}

#[test]
fn registered_values_survive_encoding() {
    for value in sample_values() {
        let kind = value.kind();
        let der = value.encode().unwrap();
        assert_eq!(kind.decode(&der).unwrap(), value, "{}", kind.name());
        assert_eq!(ExtensionKind::from_oid(&kind.oid()), Some(kind));
    }
}

#[test]
fn crl_number_wider_than_u32_is_rejected() {
    // 2^32
    let der = [0x02, 0x05, 0x01, 0x00, 0x00, 0x00, 0x00];
    assert!(ExtensionKind::CrlNumber.decode(&der).is_err());
}

#[rstest]
#[case("Example Org", "EXAMPLE ORG")]
#[case("Example Org", "  example   org ")]
fn normalization_ignores_case_and_whitespace_runs(#[case] lhs: &str, #[case] rhs: &str) {
    let lhs = build_name(&[(NameAttr::OrganizationName, lhs)]);
    let rhs = build_name(&[(NameAttr::OrganizationName, rhs)]);
    assert!(same_dn(&lhs, &rhs).unwrap());
    assert_eq!(normalize(&lhs), normalize(&rhs));
}

#[rstest]
#[case(certlib_test_data::CA_CERT_DER)]
#[case(certlib_test_data::LEAF_CERT_DER)]
fn normalization_is_idempotent_on_fixtures(#[case] der: &[u8]) {
    let cert = CertItem::decode(der).unwrap();
    for name in [cert.issuer().unwrap(), cert.subject().unwrap()] {
        let once: Name = normalize(name);
        assert_eq!(normalize(&once), once);
    }
}
