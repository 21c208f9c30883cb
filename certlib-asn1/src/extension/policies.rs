use crate::oids;
use crate::tlv::{self, universal, SequenceReader, SequenceWriter, TlvError};
use oid::ObjectIdentifier;
use picky_asn1::wrapper::{Asn1SequenceOf, IntegerAsn1, ObjectIdentifierAsn1};

/// ```not_rust
/// PolicyQualifierInfo ::= SEQUENCE {
///      policyQualifierId  PolicyQualifierId,
///      qualifier          ANY DEFINED BY policyQualifierId }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyQualifierInfo {
    pub policy_qualifier_id: ObjectIdentifier,
    /// Encoded qualifier element
    pub qualifier: Vec<u8>,
}

impl PolicyQualifierInfo {
    pub fn new_cps_uri<S: AsRef<str>>(uri: S) -> Self {
        Self {
            policy_qualifier_id: oids::cps_qualifier(),
            qualifier: tlv::encode(universal::IA5_STRING, uri.as_ref().as_bytes()),
        }
    }

    /// CPS pointer, when this is an `id-qt-cps` qualifier.
    pub fn cps_uri(&self) -> Option<String> {
        if Into::<String>::into(&self.policy_qualifier_id) != oids::CPS_QUALIFIER {
            return None;
        }
        let content = tlv::expect_single(&self.qualifier, universal::IA5_STRING).ok()?;
        String::from_utf8(content.to_vec()).ok()
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let policy_qualifier_id: ObjectIdentifierAsn1 = reader.next("policyQualifierId")?;
        let qualifier = reader.next_raw("qualifier")?.to_vec();
        reader.finish()?;

        Ok(Self {
            policy_qualifier_id: policy_qualifier_id.0,
            qualifier,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        writer.push(&ObjectIdentifierAsn1(self.policy_qualifier_id.clone()), "policyQualifierId")?;
        tlv::parse_single(&self.qualifier)?;
        writer.push_raw(&self.qualifier);
        Ok(writer.finish_sequence())
    }
}

/// ```not_rust
/// PolicyInformation ::= SEQUENCE {
///      policyIdentifier   CertPolicyId,
///      policyQualifiers   SEQUENCE SIZE (1..MAX) OF
///                              PolicyQualifierInfo OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyInformation {
    pub policy_identifier: ObjectIdentifier,
    pub policy_qualifiers: Option<Vec<PolicyQualifierInfo>>,
}

impl PolicyInformation {
    pub fn new(policy_identifier: ObjectIdentifier) -> Self {
        Self {
            policy_identifier,
            policy_qualifiers: None,
        }
    }

    pub fn with_qualifier(mut self, qualifier: PolicyQualifierInfo) -> Self {
        self.policy_qualifiers.get_or_insert_with(Vec::new).push(qualifier);
        self
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let policy_identifier: ObjectIdentifierAsn1 = reader.next("policyIdentifier")?;
        let policy_qualifiers: Option<Asn1SequenceOf<PolicyQualifierInfo>> =
            reader.next_if(universal::SEQUENCE, "policyQualifiers")?;
        reader.finish()?;

        Ok(Self {
            policy_identifier: policy_identifier.0,
            policy_qualifiers: policy_qualifiers.map(|qualifiers| qualifiers.0),
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        writer.push(&ObjectIdentifierAsn1(self.policy_identifier.clone()), "policyIdentifier")?;
        if let Some(qualifiers) = &self.policy_qualifiers {
            writer.push(&Asn1SequenceOf(qualifiers.iter().collect::<Vec<_>>()), "policyQualifiers")?;
        }
        Ok(writer.finish_sequence())
    }
}

/// [RFC 5280 #4.2.1.4](https://tools.ietf.org/html/rfc5280#section-4.2.1.4)
///
/// ```not_rust
/// certificatePolicies ::= SEQUENCE SIZE (1..MAX) OF PolicyInformation
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CertificatePolicies(pub Vec<PolicyInformation>);

impl CertificatePolicies {
    pub fn iter(&self) -> std::slice::Iter<'_, PolicyInformation> {
        self.0.iter()
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        tlv::expect_single(der, universal::SEQUENCE)?;
        let policies: Asn1SequenceOf<PolicyInformation> =
            picky_asn1_der::from_bytes(der).map_err(|e| TlvError::der("certificate policies", e))?;
        Ok(Self(policies.0))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        picky_asn1_der::to_vec(&Asn1SequenceOf(self.0.iter().collect::<Vec<_>>()))
            .map_err(|e| TlvError::der("certificate policies", e))
    }
}

/// ```not_rust
/// PolicyMappings ::= SEQUENCE SIZE (1..MAX) OF SEQUENCE {
///      issuerDomainPolicy      CertPolicyId,
///      subjectDomainPolicy     CertPolicyId }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyMapping {
    pub issuer_domain_policy: ObjectIdentifier,
    pub subject_domain_policy: ObjectIdentifier,
}

impl PolicyMapping {
    pub fn new(issuer_domain_policy: ObjectIdentifier, subject_domain_policy: ObjectIdentifier) -> Self {
        Self {
            issuer_domain_policy,
            subject_domain_policy,
        }
    }

    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let issuer_domain_policy: ObjectIdentifierAsn1 = reader.next("issuerDomainPolicy")?;
        let subject_domain_policy: ObjectIdentifierAsn1 = reader.next("subjectDomainPolicy")?;
        reader.finish()?;

        Ok(Self::new(issuer_domain_policy.0, subject_domain_policy.0))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        writer.push(&ObjectIdentifierAsn1(self.issuer_domain_policy.clone()), "issuerDomainPolicy")?;
        writer.push(&ObjectIdentifierAsn1(self.subject_domain_policy.clone()), "subjectDomainPolicy")?;
        Ok(writer.finish_sequence())
    }
}

/// [RFC 5280 #4.2.1.5](https://tools.ietf.org/html/rfc5280#section-4.2.1.5)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolicyMappings(pub Vec<PolicyMapping>);

impl PolicyMappings {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        tlv::expect_single(der, universal::SEQUENCE)?;
        let mappings: Asn1SequenceOf<PolicyMapping> =
            picky_asn1_der::from_bytes(der).map_err(|e| TlvError::der("policy mappings", e))?;
        Ok(Self(mappings.0))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        picky_asn1_der::to_vec(&Asn1SequenceOf(self.0.iter().collect::<Vec<_>>()))
            .map_err(|e| TlvError::der("policy mappings", e))
    }
}

/// [RFC 5280 #4.2.1.11](https://tools.ietf.org/html/rfc5280#section-4.2.1.11)
///
/// ```not_rust
/// PolicyConstraints ::= SEQUENCE {
///      requireExplicitPolicy           [0] SkipCerts OPTIONAL,
///      inhibitPolicyMapping            [1] SkipCerts OPTIONAL }
///
/// SkipCerts ::= INTEGER (0..MAX)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolicyConstraints {
    pub require_explicit_policy: Option<u32>,
    pub inhibit_policy_mapping: Option<u32>,
}

impl PolicyConstraints {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        let mut reader = SequenceReader::new(der, universal::SEQUENCE)?;
        let require_explicit_policy: Option<IntegerAsn1> =
            reader.next_implicit(0, universal::INTEGER, "requireExplicitPolicy")?;
        let inhibit_policy_mapping: Option<IntegerAsn1> =
            reader.next_implicit(1, universal::INTEGER, "inhibitPolicyMapping")?;
        reader.finish()?;

        Ok(Self {
            require_explicit_policy: require_explicit_policy
                .map(|skip| skip_certs(&skip.0, "requireExplicitPolicy"))
                .transpose()?,
            inhibit_policy_mapping: inhibit_policy_mapping
                .map(|skip| skip_certs(&skip.0, "inhibitPolicyMapping"))
                .transpose()?,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        let mut writer = SequenceWriter::new();
        if let Some(skip) = self.require_explicit_policy {
            writer.push_implicit(
                &IntegerAsn1(tlv::u32_to_content(skip)),
                tlv::context_primitive(0),
                "requireExplicitPolicy",
            )?;
        }
        if let Some(skip) = self.inhibit_policy_mapping {
            writer.push_implicit(
                &IntegerAsn1(tlv::u32_to_content(skip)),
                tlv::context_primitive(1),
                "inhibitPolicyMapping",
            )?;
        }
        Ok(writer.finish_sequence())
    }
}

/// [RFC 5280 #4.2.1.14](https://tools.ietf.org/html/rfc5280#section-4.2.1.14)
///
/// ```not_rust
/// InhibitAnyPolicy ::= SkipCerts
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InhibitAnyPolicy(pub u32);

impl InhibitAnyPolicy {
    pub fn from_der(der: &[u8]) -> Result<Self, TlvError> {
        tlv::expect_single(der, universal::INTEGER)?;
        let skip: IntegerAsn1 = picky_asn1_der::from_bytes(der).map_err(|e| TlvError::der("inhibit any policy", e))?;
        skip_certs(&skip.0, "inhibit any policy").map(Self)
    }

    pub fn to_der(&self) -> Result<Vec<u8>, TlvError> {
        picky_asn1_der::to_vec(&IntegerAsn1(tlv::u32_to_content(self.0)))
            .map_err(|e| TlvError::der("inhibit any policy", e))
    }
}

fn skip_certs(content: &[u8], element: &'static str) -> Result<u32, TlvError> {
    tlv::content_to_u32(content).ok_or(TlvError::Der {
        element,
        message: "SkipCerts out of range".to_owned(),
    })
}

impl_serde_from_der!(
    PolicyQualifierInfo,
    PolicyInformation,
    CertificatePolicies,
    PolicyMapping,
    PolicyMappings,
    PolicyConstraints,
    InhibitAnyPolicy,
);
