use super::{FieldDescriptor, FieldLookup, FieldTable, FieldValue, TbsField};
use crate::error::CodecError;
use crate::extension_store::ExtensionStore;
use crate::item::CertContent;
use certlib_asn1::Name;

unique_slot!(CertContent, Version, get_version, set_version, version, Version);
unique_slot!(CertContent, SerialNumber, get_serial_number, set_serial_number, serial_number, Integer);
unique_slot!(CertContent, Issuer, get_issuer, set_issuer, issuer, Name);
unique_slot!(CertContent, Subject, get_subject, set_subject, subject, Name);
unique_slot!(CertContent, NotBefore, get_not_before, set_not_before, not_before, Time);
unique_slot!(CertContent, NotAfter, get_not_after, set_not_after, not_after, Time);
unique_slot!(
    CertContent,
    SubjectPublicKeyInfo,
    get_spki,
    set_spki,
    subject_public_key_info,
    PublicKeyInfo
);
unique_slot!(
    CertContent,
    IssuerUniqueId,
    get_issuer_unique_id,
    set_issuer_unique_id,
    issuer_unique_id,
    BitString
);
unique_slot!(
    CertContent,
    SubjectUniqueId,
    get_subject_unique_id,
    set_subject_unique_id,
    subject_unique_id,
    BitString
);
unique_slot!(
    CertContent,
    TbsSignatureAlgorithm,
    get_tbs_signature_algorithm,
    set_tbs_signature_algorithm,
    signature,
    Algorithm
);

pub(super) fn name_der(name: Option<&Name>, element: &'static str) -> Result<FieldLookup, CodecError> {
    name.map(|name| name.to_der().map(FieldValue::Der))
        .transpose()
        .map(FieldLookup::from)
        .map_err(CodecError::encode(element))
}

fn get_issuer_der(content: &CertContent, _: usize) -> Result<FieldLookup, CodecError> {
    name_der(content.issuer.as_ref(), "issuer")
}

fn get_subject_der(content: &CertContent, _: usize) -> Result<FieldLookup, CodecError> {
    name_der(content.subject.as_ref(), "subject")
}

fn get_signature_algorithm(content: &CertContent, _: usize) -> Result<FieldLookup, CodecError> {
    Ok(content
        .signed
        .as_ref()
        .map(|signed| FieldValue::Algorithm(signed.algorithm.clone()))
        .into())
}

fn get_signature(content: &CertContent, _: usize) -> Result<FieldLookup, CodecError> {
    Ok(content
        .signed
        .as_ref()
        .map(|signed| FieldValue::BitString(signed.signature.clone()))
        .into())
}

impl FieldTable for CertContent {
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::unique(TbsField::Version, get_version, set_version),
        FieldDescriptor::unique(TbsField::SerialNumber, get_serial_number, set_serial_number),
        FieldDescriptor::unique(TbsField::Issuer, get_issuer, set_issuer),
        FieldDescriptor::read_only(TbsField::IssuerDer, get_issuer_der),
        FieldDescriptor::unique(TbsField::Subject, get_subject, set_subject),
        FieldDescriptor::read_only(TbsField::SubjectDer, get_subject_der),
        FieldDescriptor::unique(TbsField::NotBefore, get_not_before, set_not_before),
        FieldDescriptor::unique(TbsField::NotAfter, get_not_after, set_not_after),
        FieldDescriptor::unique(TbsField::SubjectPublicKeyInfo, get_spki, set_spki),
        FieldDescriptor::unique(TbsField::IssuerUniqueId, get_issuer_unique_id, set_issuer_unique_id),
        FieldDescriptor::unique(TbsField::SubjectUniqueId, get_subject_unique_id, set_subject_unique_id),
        FieldDescriptor::unique(
            TbsField::TbsSignatureAlgorithm,
            get_tbs_signature_algorithm,
            set_tbs_signature_algorithm,
        ),
        FieldDescriptor::read_only(TbsField::SignatureAlgorithm, get_signature_algorithm),
        FieldDescriptor::read_only(TbsField::Signature, get_signature),
    ];

    fn extensions(&self) -> &ExtensionStore {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> Option<&mut ExtensionStore> {
        Some(&mut self.extensions)
    }
}
