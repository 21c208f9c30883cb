//! Object identifiers used by the X.509 wire types.
//!
//! Each entry produces a `&'static str` constant usable in `match` arms and a function
//! returning the parsed [`oid::ObjectIdentifier`].

macro_rules! define_oid {
    ($uppercase:ident => $lowercase:ident => $str_value:literal) => {
        pub const $uppercase: &str = $str_value;

        pub fn $lowercase() -> oid::ObjectIdentifier {
            use std::sync::OnceLock;

            static OID: OnceLock<oid::ObjectIdentifier> = OnceLock::new();
            OID.get_or_init(|| {
                oid::ObjectIdentifier::try_from($uppercase).expect(concat!("invalid built-in OID ", $str_value))
            })
            .clone()
        }
    };
    ( $( $uppercase:ident => $lowercase:ident => $str_value:literal, )+ ) => {
        $( define_oid! { $uppercase => $lowercase => $str_value } )+
    };
}

define_oid! {
    // x9-57
    DSA_WITH_SHA1 => dsa_with_sha1 => "1.2.840.10040.4.3",

    // x9-62
    EC_PUBLIC_KEY => ec_public_key => "1.2.840.10045.2.1",
    ECDSA_WITH_SHA256 => ecdsa_with_sha256 => "1.2.840.10045.4.3.2",
    ECDSA_WITH_SHA384 => ecdsa_with_sha384 => "1.2.840.10045.4.3.3",
    ECDSA_WITH_SHA512 => ecdsa_with_sha512 => "1.2.840.10045.4.3.4",
    SECP256R1 => secp256r1 => "1.2.840.10045.3.1.7",

    // RSADSI
    RSA_ENCRYPTION => rsa_encryption => "1.2.840.113549.1.1.1",
    SHA1_WITH_RSA_ENCRYPTION => sha1_with_rsa_encryption => "1.2.840.113549.1.1.5",
    SHA256_WITH_RSA_ENCRYPTION => sha256_with_rsa_encryption => "1.2.840.113549.1.1.11",
    SHA384_WITH_RSA_ENCRYPTION => sha384_with_rsa_encryption => "1.2.840.113549.1.1.12",
    SHA512_WITH_RSA_ENCRYPTION => sha512_with_rsa_encryption => "1.2.840.113549.1.1.13",
    EMAIL_ADDRESS => email_address => "1.2.840.113549.1.9.1",

    // thawte
    ED25519 => ed25519 => "1.3.101.112",

    // attribute types
    AT_COMMON_NAME => at_common_name => "2.5.4.3",
    AT_SURNAME => at_surname => "2.5.4.4",
    AT_SERIAL_NUMBER => at_serial_number => "2.5.4.5",
    AT_COUNTRY_NAME => at_country_name => "2.5.4.6",
    AT_LOCALITY_NAME => at_locality_name => "2.5.4.7",
    AT_STATE_OR_PROVINCE_NAME => at_state_or_province_name => "2.5.4.8",
    AT_STREET_NAME => at_street_name => "2.5.4.9",
    AT_ORGANIZATION_NAME => at_organization_name => "2.5.4.10",
    AT_ORGANIZATIONAL_UNIT_NAME => at_organizational_unit_name => "2.5.4.11",
    AT_TITLE => at_title => "2.5.4.12",
    AT_GIVEN_NAME => at_given_name => "2.5.4.42",
    DOMAIN_COMPONENT => domain_component => "0.9.2342.19200300.100.1.25",

    // certificate extensions
    SUBJECT_DIRECTORY_ATTRIBUTES => subject_directory_attributes => "2.5.29.9",
    SUBJECT_KEY_IDENTIFIER => subject_key_identifier => "2.5.29.14",
    KEY_USAGE => key_usage => "2.5.29.15",
    PRIVATE_KEY_USAGE_PERIOD => private_key_usage_period => "2.5.29.16",
    SUBJECT_ALTERNATIVE_NAME => subject_alternative_name => "2.5.29.17",
    ISSUER_ALTERNATIVE_NAME => issuer_alternative_name => "2.5.29.18",
    BASIC_CONSTRAINTS => basic_constraints => "2.5.29.19",
    CRL_NUMBER => crl_number => "2.5.29.20",
    CRL_REASON_CODE => crl_reason_code => "2.5.29.21",
    HOLD_INSTRUCTION_CODE => hold_instruction_code => "2.5.29.23",
    INVALIDITY_DATE => invalidity_date => "2.5.29.24",
    DELTA_CRL_INDICATOR => delta_crl_indicator => "2.5.29.27",
    ISSUING_DISTRIBUTION_POINT => issuing_distribution_point => "2.5.29.28",
    CERTIFICATE_ISSUER => certificate_issuer => "2.5.29.29",
    NAME_CONSTRAINTS => name_constraints => "2.5.29.30",
    CRL_DISTRIBUTION_POINTS => crl_distribution_points => "2.5.29.31",
    CERTIFICATE_POLICIES => certificate_policies => "2.5.29.32",
    POLICY_MAPPINGS => policy_mappings => "2.5.29.33",
    AUTHORITY_KEY_IDENTIFIER => authority_key_identifier => "2.5.29.35",
    POLICY_CONSTRAINTS => policy_constraints => "2.5.29.36",
    EXTENDED_KEY_USAGE => extended_key_usage => "2.5.29.37",
    FRESHEST_CRL => freshest_crl => "2.5.29.46",
    INHIBIT_ANY_POLICY => inhibit_any_policy => "2.5.29.54",
    ANY_POLICY => any_policy => "2.5.29.32.0",
    ANY_EXTENDED_KEY_USAGE => any_extended_key_usage => "2.5.29.37.0",

    // pkix
    AUTHORITY_INFO_ACCESS => authority_info_access => "1.3.6.1.5.5.7.1.1",
    QC_STATEMENTS => qc_statements => "1.3.6.1.5.5.7.1.3",
    SUBJECT_INFO_ACCESS => subject_info_access => "1.3.6.1.5.5.7.1.11",
    CPS_QUALIFIER => cps_qualifier => "1.3.6.1.5.5.7.2.1",
    USER_NOTICE_QUALIFIER => user_notice_qualifier => "1.3.6.1.5.5.7.2.2",
    KP_SERVER_AUTH => kp_server_auth => "1.3.6.1.5.5.7.3.1",
    KP_CLIENT_AUTH => kp_client_auth => "1.3.6.1.5.5.7.3.2",
    KP_CODE_SIGNING => kp_code_signing => "1.3.6.1.5.5.7.3.3",
    KP_EMAIL_PROTECTION => kp_email_protection => "1.3.6.1.5.5.7.3.4",
    KP_TIME_STAMPING => kp_time_stamping => "1.3.6.1.5.5.7.3.8",
    KP_OCSP_SIGNING => kp_ocsp_signing => "1.3.6.1.5.5.7.3.9",
    AD_OCSP => ad_ocsp => "1.3.6.1.5.5.7.48.1",
    AD_CA_ISSUERS => ad_ca_issuers => "1.3.6.1.5.5.7.48.2",

    // netscape
    NETSCAPE_CERT_TYPE => netscape_cert_type => "2.16.840.1.113730.1.1",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_and_functions_agree() {
        assert_eq!(Into::<String>::into(&key_usage()), KEY_USAGE);
        assert_eq!(Into::<String>::into(&qc_statements()), QC_STATEMENTS);
        assert_eq!(Into::<String>::into(&netscape_cert_type()), NETSCAPE_CERT_TYPE);
        assert_eq!(crl_number(), crl_number());
        assert_ne!(crl_number(), delta_crl_indicator());
    }
}
