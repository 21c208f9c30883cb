//! Static table of every extension this crate knows how to interpret.
//!
//! Dispatch is a closed `match` over [`ExtensionKind`]: an identifier missing from the table is
//! simply not decoded, and its value travels through untouched.

use certlib_asn1::extension::{
    AuthorityKeyIdentifier, BasicConstraints, CertificatePolicies, CrlDistributionPoints, CrlNumber, CrlReason,
    ExtendedKeyUsage, HoldInstructionCode, InfoAccess, InhibitAnyPolicy, InvalidityDate, IssuingDistributionPoint,
    KeyUsage, NameConstraints, NetscapeCertType, PolicyConstraints, PolicyMappings, PrivateKeyUsagePeriod,
    QcStatements, SubjectKeyIdentifier,
};
use certlib_asn1::{oids, GeneralNames, ObjectIdentifier, TlvError};

macro_rules! extension_registry {
    ( $( $variant:ident => $oid:ident, $ty:ty, $name:literal; )+ ) => {
        /// A registered extension identifier.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ExtensionKind {
            $( $variant, )+
        }

        impl ExtensionKind {
            pub const ALL: &'static [ExtensionKind] = &[ $( ExtensionKind::$variant, )+ ];

            pub fn oid(self) -> ObjectIdentifier {
                match self {
                    $( ExtensionKind::$variant => oids::$oid(), )+
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $( ExtensionKind::$variant => $name, )+
                }
            }

            /// Decodes the content of an `extnValue` OCTET STRING.
            pub fn decode(self, der: &[u8]) -> Result<ExtensionValue, TlvError> {
                match self {
                    $( ExtensionKind::$variant => <$ty>::from_der(der).map(ExtensionValue::$variant), )+
                }
            }
        }

        /// Decoded value of a registered extension.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum ExtensionValue {
            $( $variant($ty), )+
        }

        impl ExtensionValue {
            pub fn kind(&self) -> ExtensionKind {
                match self {
                    $( ExtensionValue::$variant(_) => ExtensionKind::$variant, )+
                }
            }

            /// Encodes the value that goes inside `extnValue`.
            pub fn encode(&self) -> Result<Vec<u8>, TlvError> {
                match self {
                    $( ExtensionValue::$variant(value) => value.to_der(), )+
                }
            }
        }
    };
}

extension_registry! {
    KeyUsage => key_usage, KeyUsage, "keyUsage";
    BasicConstraints => basic_constraints, BasicConstraints, "basicConstraints";
    ExtendedKeyUsage => extended_key_usage, ExtendedKeyUsage, "extKeyUsage";
    SubjectKeyIdentifier => subject_key_identifier, SubjectKeyIdentifier, "subjectKeyIdentifier";
    AuthorityKeyIdentifier => authority_key_identifier, AuthorityKeyIdentifier, "authorityKeyIdentifier";
    SubjectAltName => subject_alternative_name, GeneralNames, "subjectAltName";
    IssuerAltName => issuer_alternative_name, GeneralNames, "issuerAltName";
    CertificatePolicies => certificate_policies, CertificatePolicies, "certificatePolicies";
    PolicyMappings => policy_mappings, PolicyMappings, "policyMappings";
    PolicyConstraints => policy_constraints, PolicyConstraints, "policyConstraints";
    InhibitAnyPolicy => inhibit_any_policy, InhibitAnyPolicy, "inhibitAnyPolicy";
    NameConstraints => name_constraints, NameConstraints, "nameConstraints";
    CrlDistributionPoints => crl_distribution_points, CrlDistributionPoints, "cRLDistributionPoints";
    FreshestCrl => freshest_crl, CrlDistributionPoints, "freshestCRL";
    AuthorityInfoAccess => authority_info_access, InfoAccess, "authorityInfoAccess";
    SubjectInfoAccess => subject_info_access, InfoAccess, "subjectInfoAccess";
    QcStatements => qc_statements, QcStatements, "qcStatements";
    PrivateKeyUsagePeriod => private_key_usage_period, PrivateKeyUsagePeriod, "privateKeyUsagePeriod";
    NetscapeCertType => netscape_cert_type, NetscapeCertType, "netscapeCertType";
    CrlNumber => crl_number, CrlNumber, "cRLNumber";
    DeltaCrlIndicator => delta_crl_indicator, CrlNumber, "deltaCRLIndicator";
    IssuingDistributionPoint => issuing_distribution_point, IssuingDistributionPoint, "issuingDistributionPoint";
    ReasonCode => crl_reason_code, CrlReason, "reasonCode";
    InvalidityDate => invalidity_date, InvalidityDate, "invalidityDate";
    CertificateIssuer => certificate_issuer, GeneralNames, "certificateIssuer";
    HoldInstructionCode => hold_instruction_code, HoldInstructionCode, "holdInstructionCode";
}

impl ExtensionKind {
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.oid() == *oid)
    }
}
