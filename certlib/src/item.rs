//! Certificates and CRLs as field-addressed items.
//!
//! An item starts `Empty`. Decoding a signed object yields `DecodedAll`, decoding a bare TBS
//! (an unsigned template) yields `DecodedTbs`, and setting fields on an empty item yields
//! `Building`. Decoded items are read-only; building items can't be queried and are turned into
//! a TBS with `encode`.

use crate::error::CodecError;
use crate::extension_store::{ExtensionStore, StoredExtension};
use crate::field::{self, Cardinality, ExtensionField, FieldId, FieldLookup, FieldValue};
use crate::name;
use crate::registry::{ExtensionKind, ExtensionValue};
use certlib_asn1::extension::{CrlReason, Extensions};
use certlib_asn1::{
    signed, tlv, AlgorithmIdentifier, CertificateList, Name, RevokedCertificate, SubjectPublicKeyInfo, TbsCertList,
    TbsCertificate, Time, Validity, Version,
};
use std::cell::OnceCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    Empty,
    DecodedAll,
    DecodedTbs,
    Building,
}

/// Knobs for decoding CRLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Decode every entry's extensions right away instead of on first access.
    pub decode_entry_extensions_eagerly: bool,
}

/// Signed envelope of a decoded object, the TBS kept exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SignedBlobs {
    pub(crate) tbs: Vec<u8>,
    pub(crate) algorithm: AlgorithmIdentifier,
    algorithm_der: Vec<u8>,
    /// BIT STRING content octets
    pub(crate) signature: Vec<u8>,
    signature_der: Vec<u8>,
}

impl SignedBlobs {
    fn split(der: &[u8], element: &'static str) -> Result<Self, CodecError> {
        let parts = signed::split(der).map_err(CodecError::decode(element))?;
        let algorithm =
            AlgorithmIdentifier::from_der(parts.algorithm).map_err(CodecError::decode("signature algorithm"))?;
        let signature = parts
            .signature_content()
            .map_err(CodecError::decode("signature value"))?
            .to_vec();

        Ok(Self {
            tbs: parts.tbs.to_vec(),
            algorithm,
            algorithm_der: parts.algorithm.to_vec(),
            signature,
            signature_der: parts.signature.to_vec(),
        })
    }

    fn join(&self) -> Vec<u8> {
        signed::join(&self.tbs, &self.algorithm_der, &self.signature_der)
    }
}

fn enter_state(current: &mut ItemState, next: ItemState) {
    if *current != next {
        log::trace!("item state {:?} -> {:?}", current, next);
        *current = next;
    }
}

fn ensure_settable(state: ItemState) -> Result<(), CodecError> {
    match state {
        ItemState::Empty | ItemState::Building => Ok(()),
        ItemState::DecodedAll | ItemState::DecodedTbs => Err(CodecError::invalid_state("set", state)),
    }
}

fn ensure_queryable(state: ItemState) -> Result<(), CodecError> {
    match state {
        ItemState::DecodedAll | ItemState::DecodedTbs => Ok(()),
        ItemState::Empty | ItemState::Building => Err(CodecError::invalid_state("get", state)),
    }
}

fn extensions_or_none(store: &ExtensionStore) -> Result<Option<Extensions>, CodecError> {
    if store.is_empty() {
        // still goes through the double-encode guard
        store.encode_all()?;
        Ok(None)
    } else {
        store.encode_all().map(Some)
    }
}

// === certificate === //

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CertContent {
    pub(crate) version: Option<Version>,
    pub(crate) serial_number: Option<Vec<u8>>,
    pub(crate) signature: Option<AlgorithmIdentifier>,
    pub(crate) issuer: Option<Name>,
    pub(crate) not_before: Option<Time>,
    pub(crate) not_after: Option<Time>,
    pub(crate) subject: Option<Name>,
    pub(crate) subject_public_key_info: Option<SubjectPublicKeyInfo>,
    pub(crate) issuer_unique_id: Option<Vec<u8>>,
    pub(crate) subject_unique_id: Option<Vec<u8>>,
    pub(crate) extensions: ExtensionStore,
    pub(crate) signed: Option<SignedBlobs>,
}

impl CertContent {
    fn from_tbs(tbs: TbsCertificate) -> Self {
        let extensions = tbs
            .extensions
            .as_ref()
            .map(ExtensionStore::decode_all)
            .unwrap_or_default();

        Self {
            version: tbs.version,
            serial_number: Some(tbs.serial_number),
            signature: Some(tbs.signature),
            issuer: Some(tbs.issuer),
            not_before: Some(tbs.validity.not_before),
            not_after: Some(tbs.validity.not_after),
            subject: Some(tbs.subject),
            subject_public_key_info: Some(tbs.subject_public_key_info),
            issuer_unique_id: tbs.issuer_unique_id,
            subject_unique_id: tbs.subject_unique_id,
            extensions,
            signed: None,
        }
    }

    fn to_tbs(&self) -> Result<TbsCertificate, CodecError> {
        let extensions = extensions_or_none(&self.extensions)?;
        let signature = required(&self.signature, "signature algorithm")?;
        let issuer = required(&self.issuer, "issuer")?;
        let subject = required(&self.subject, "subject")?;
        let not_before = required(&self.not_before, "notBefore")?;
        let not_after = required(&self.not_after, "notAfter")?;
        let serial_number = required(&self.serial_number, "serial number")?;
        let subject_public_key_info = required(&self.subject_public_key_info, "subject public key info")?;

        Ok(TbsCertificate {
            version: self.version,
            serial_number,
            signature,
            issuer,
            validity: Validity { not_before, not_after },
            subject,
            subject_public_key_info,
            issuer_unique_id: self.issuer_unique_id.clone(),
            subject_unique_id: self.subject_unique_id.clone(),
            extensions,
        })
    }
}

fn required<T: Clone>(slot: &Option<T>, missing: &'static str) -> Result<T, CodecError> {
    slot.clone().ok_or(CodecError::IncompleteObject { missing })
}

/// A certificate, decoded or under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertItem {
    state: ItemState,
    pub(crate) content: CertContent,
}

impl Default for CertItem {
    fn default() -> Self {
        Self::new()
    }
}

impl CertItem {
    pub fn new() -> Self {
        Self {
            state: ItemState::Empty,
            content: CertContent::default(),
        }
    }

    /// Decodes a signed certificate. Every extension is decoded.
    pub fn decode(der: &[u8]) -> Result<Self, CodecError> {
        let signed = SignedBlobs::split(der, "certificate")?;
        let tbs = TbsCertificate::from_der(&signed.tbs).map_err(CodecError::decode("tbs certificate"))?;

        let mut content = CertContent::from_tbs(tbs);
        content.signed = Some(signed);

        let mut state = ItemState::Empty;
        enter_state(&mut state, ItemState::DecodedAll);
        Ok(Self { state, content })
    }

    /// Decodes an unsigned `TBSCertificate`.
    pub fn decode_tbs(der: &[u8]) -> Result<Self, CodecError> {
        let tbs = TbsCertificate::from_der(der).map_err(CodecError::decode("tbs certificate"))?;

        let mut state = ItemState::Empty;
        enter_state(&mut state, ItemState::DecodedTbs);
        Ok(Self {
            state,
            content: CertContent::from_tbs(tbs),
        })
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn cardinality(id: &FieldId) -> Option<Cardinality> {
        field::cardinality::<CertContent>(id)
    }

    /// `index`-th value of field `id`. Only decoded items can be queried.
    pub fn get(&self, id: &FieldId, index: usize) -> Result<FieldLookup, CodecError> {
        ensure_queryable(self.state)?;
        field::get_field(&self.content, id, index)
    }

    pub fn set(&mut self, id: &FieldId, value: FieldValue) -> Result<(), CodecError> {
        ensure_settable(self.state)?;
        field::set_field(&mut self.content, id, value)?;
        enter_state(&mut self.state, ItemState::Building);
        Ok(())
    }

    /// Shorthand for setting a registered extension.
    pub fn set_extension(&mut self, value: ExtensionValue, critical: bool) -> Result<(), CodecError> {
        let id = FieldId::extension(value.kind());
        self.set(&id, FieldValue::Extension(ExtensionField::new(value, critical)))
    }

    /// Encodes the `TBSCertificate` of a building item, ready to be signed.
    pub fn encode(&mut self) -> Result<Vec<u8>, CodecError> {
        if self.state != ItemState::Building {
            return Err(CodecError::invalid_state("encode", self.state));
        }

        let tbs = self.content.to_tbs()?;
        let der = tbs.to_der().map_err(CodecError::encode("tbs certificate"))?;
        self.content.extensions.mark_encoded();
        Ok(der)
    }

    /// Signed certificate as received. Only available on items decoded with [`CertItem::decode`].
    pub fn to_der(&self) -> Result<Vec<u8>, CodecError> {
        self.content
            .signed
            .as_ref()
            .map(SignedBlobs::join)
            .ok_or_else(|| CodecError::invalid_state("to_der", self.state))
    }

    /// TBS bytes as received, for signature verification.
    pub fn tbs_der(&self) -> Option<&[u8]> {
        self.content.signed.as_ref().map(|signed| signed.tbs.as_slice())
    }

    pub fn signature_algorithm(&self) -> Option<&AlgorithmIdentifier> {
        self.content.signed.as_ref().map(|signed| &signed.algorithm)
    }

    /// BIT STRING content of the signature, unused-bits octet included.
    pub fn signature_value(&self) -> Option<&[u8]> {
        self.content.signed.as_ref().map(|signed| signed.signature.as_slice())
    }

    pub fn extensions(&self) -> &ExtensionStore {
        &self.content.extensions
    }

    pub fn issuer(&self) -> Option<&Name> {
        self.content.issuer.as_ref()
    }

    pub fn subject(&self) -> Option<&Name> {
        self.content.subject.as_ref()
    }

    /// INTEGER content octets of the serial number.
    pub fn serial_number(&self) -> Option<&[u8]> {
        self.content.serial_number.as_deref()
    }

    pub fn subject_public_key_info(&self) -> Option<&SubjectPublicKeyInfo> {
        self.content.subject_public_key_info.as_ref()
    }
}

// === CRL === //

/// One `revokedCertificates` entry.
///
/// Entry extensions of a decoded CRL are only interpreted on first access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedEntry {
    pub(crate) serial_number: Vec<u8>,
    pub(crate) revocation_date: Time,
    raw_extensions: Option<Extensions>,
    extensions: OnceCell<ExtensionStore>,
}

impl RevokedEntry {
    /// `serial_number` holds INTEGER content octets.
    pub fn new(serial_number: Vec<u8>, revocation_date: Time) -> Self {
        Self {
            serial_number,
            revocation_date,
            raw_extensions: None,
            extensions: OnceCell::from(ExtensionStore::new()),
        }
    }

    pub fn with_extension(mut self, value: ExtensionValue, critical: bool) -> Result<Self, CodecError> {
        let mut store = self.take_extensions();
        store.push(StoredExtension::new(value, critical))?;
        self.extensions = OnceCell::from(store);
        Ok(self)
    }

    fn from_wire(entry: RevokedCertificate) -> Self {
        Self {
            serial_number: entry.user_certificate,
            revocation_date: entry.revocation_date,
            raw_extensions: entry.crl_entry_extensions,
            extensions: OnceCell::new(),
        }
    }

    fn to_wire(&self) -> Result<RevokedCertificate, CodecError> {
        let crl_entry_extensions = match self.extensions.get() {
            Some(store) if store.is_empty() => None,
            Some(store) => Some(store.encode_all()?),
            None => self.raw_extensions.clone(),
        };

        Ok(RevokedCertificate {
            user_certificate: self.serial_number.clone(),
            revocation_date: self.revocation_date.clone(),
            crl_entry_extensions,
        })
    }

    fn take_extensions(&mut self) -> ExtensionStore {
        let raw = self.raw_extensions.take();
        std::mem::take(&mut self.extensions)
            .into_inner()
            .unwrap_or_else(|| raw.as_ref().map(ExtensionStore::decode_all).unwrap_or_default())
    }

    /// INTEGER content octets.
    pub fn serial_number(&self) -> &[u8] {
        &self.serial_number
    }

    pub fn revocation_date(&self) -> &Time {
        &self.revocation_date
    }

    /// Entry extensions, decoded on first call.
    pub fn extensions(&self) -> &ExtensionStore {
        self.extensions.get_or_init(|| {
            log::trace!("decoding extensions of revoked entry");
            self.raw_extensions
                .as_ref()
                .map(ExtensionStore::decode_all)
                .unwrap_or_default()
        })
    }

    pub fn extensions_decoded(&self) -> bool {
        self.extensions.get().is_some()
    }

    pub fn reason(&self) -> Option<CrlReason> {
        match self.extensions().find_value(ExtensionKind::ReasonCode) {
            Some(ExtensionValue::ReasonCode(reason)) => Some(*reason),
            _ => None,
        }
    }

    pub fn cardinality(id: &FieldId) -> Option<Cardinality> {
        field::cardinality::<RevokedEntry>(id)
    }

    pub fn get(&self, id: &FieldId, index: usize) -> Result<FieldLookup, CodecError> {
        field::get_field(self, id, index)
    }

    /// Same serial number, ignoring leading zero octets.
    pub fn matches_serial(&self, serial_number: &[u8]) -> bool {
        tlv::unsigned_magnitude(&self.serial_number) == tlv::unsigned_magnitude(serial_number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CrlContent {
    pub(crate) version: Option<Version>,
    pub(crate) signature: Option<AlgorithmIdentifier>,
    pub(crate) issuer: Option<Name>,
    pub(crate) this_update: Option<Time>,
    pub(crate) next_update: Option<Time>,
    pub(crate) revoked: Vec<RevokedEntry>,
    pub(crate) extensions: ExtensionStore,
    pub(crate) signed: Option<SignedBlobs>,
}

impl CrlContent {
    fn from_tbs(tbs: TbsCertList, options: DecodeOptions) -> Self {
        let revoked: Vec<RevokedEntry> = tbs
            .revoked_certificates
            .unwrap_or_default()
            .into_iter()
            .map(RevokedEntry::from_wire)
            .collect();

        if options.decode_entry_extensions_eagerly {
            for entry in &revoked {
                entry.extensions();
            }
        }

        Self {
            version: tbs.version,
            signature: Some(tbs.signature),
            issuer: Some(tbs.issuer),
            this_update: Some(tbs.this_update),
            next_update: tbs.next_update,
            revoked,
            extensions: tbs
                .crl_extensions
                .as_ref()
                .map(ExtensionStore::decode_all)
                .unwrap_or_default(),
            signed: None,
        }
    }

    fn to_tbs(&self) -> Result<TbsCertList, CodecError> {
        let crl_extensions = extensions_or_none(&self.extensions)?;
        let signature = required(&self.signature, "signature algorithm")?;
        let issuer = required(&self.issuer, "issuer")?;
        let this_update = required(&self.this_update, "thisUpdate")?;

        let revoked_certificates = if self.revoked.is_empty() {
            None
        } else {
            Some(
                self.revoked
                    .iter()
                    .map(RevokedEntry::to_wire)
                    .collect::<Result<Vec<_>, _>>()?,
            )
        };

        Ok(TbsCertList {
            version: self.version,
            signature,
            issuer,
            this_update,
            next_update: self.next_update.clone(),
            revoked_certificates,
            crl_extensions,
        })
    }
}

/// A certificate revocation list, decoded or under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrlItem {
    state: ItemState,
    pub(crate) content: CrlContent,
}

impl Default for CrlItem {
    fn default() -> Self {
        Self::new()
    }
}

impl CrlItem {
    pub fn new() -> Self {
        Self {
            state: ItemState::Empty,
            content: CrlContent::default(),
        }
    }

    pub fn decode(der: &[u8]) -> Result<Self, CodecError> {
        Self::decode_with_options(der, DecodeOptions::default())
    }

    /// Decodes a signed CRL. CRL extensions are decoded, entry extensions wait for first access
    /// unless `options` say otherwise.
    pub fn decode_with_options(der: &[u8], options: DecodeOptions) -> Result<Self, CodecError> {
        let signed = SignedBlobs::split(der, "certificate list")?;
        let tbs = TbsCertList::from_der(&signed.tbs).map_err(CodecError::decode("tbs cert list"))?;

        let mut content = CrlContent::from_tbs(tbs, options);
        content.signed = Some(signed);

        let mut state = ItemState::Empty;
        enter_state(&mut state, ItemState::DecodedAll);
        Ok(Self { state, content })
    }

    pub fn decode_tbs(der: &[u8]) -> Result<Self, CodecError> {
        Self::decode_tbs_with_options(der, DecodeOptions::default())
    }

    /// Decodes an unsigned `TBSCertList`.
    pub fn decode_tbs_with_options(der: &[u8], options: DecodeOptions) -> Result<Self, CodecError> {
        let tbs = TbsCertList::from_der(der).map_err(CodecError::decode("tbs cert list"))?;

        let mut state = ItemState::Empty;
        enter_state(&mut state, ItemState::DecodedTbs);
        Ok(Self {
            state,
            content: CrlContent::from_tbs(tbs, options),
        })
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn cardinality(id: &FieldId) -> Option<Cardinality> {
        field::cardinality::<CrlContent>(id)
    }

    pub fn get(&self, id: &FieldId, index: usize) -> Result<FieldLookup, CodecError> {
        ensure_queryable(self.state)?;
        field::get_field(&self.content, id, index)
    }

    pub fn set(&mut self, id: &FieldId, value: FieldValue) -> Result<(), CodecError> {
        ensure_settable(self.state)?;
        field::set_field(&mut self.content, id, value)?;
        enter_state(&mut self.state, ItemState::Building);
        Ok(())
    }

    pub fn set_extension(&mut self, value: ExtensionValue, critical: bool) -> Result<(), CodecError> {
        let id = FieldId::extension(value.kind());
        self.set(&id, FieldValue::Extension(ExtensionField::new(value, critical)))
    }

    /// Encodes the `TBSCertList` of a building item, ready to be signed.
    pub fn encode(&mut self) -> Result<Vec<u8>, CodecError> {
        if self.state != ItemState::Building {
            return Err(CodecError::invalid_state("encode", self.state));
        }

        let tbs = self.content.to_tbs()?;
        let der = tbs.to_der().map_err(CodecError::encode("tbs cert list"))?;
        self.content.extensions.mark_encoded();
        Ok(der)
    }

    /// Signed CRL as received. Only available on items decoded with [`CrlItem::decode`].
    pub fn to_der(&self) -> Result<Vec<u8>, CodecError> {
        self.content
            .signed
            .as_ref()
            .map(SignedBlobs::join)
            .ok_or_else(|| CodecError::invalid_state("to_der", self.state))
    }

    pub fn tbs_der(&self) -> Option<&[u8]> {
        self.content.signed.as_ref().map(|signed| signed.tbs.as_slice())
    }

    pub fn signature_algorithm(&self) -> Option<&AlgorithmIdentifier> {
        self.content.signed.as_ref().map(|signed| &signed.algorithm)
    }

    pub fn signature_value(&self) -> Option<&[u8]> {
        self.content.signed.as_ref().map(|signed| signed.signature.as_slice())
    }

    pub fn extensions(&self) -> &ExtensionStore {
        &self.content.extensions
    }

    pub fn issuer(&self) -> Option<&Name> {
        self.content.issuer.as_ref()
    }

    pub fn revoked_entries(&self) -> &[RevokedEntry] {
        &self.content.revoked
    }

    /// Entry for `serial_number` if `issuer` is this CRL's issuer.
    pub fn find_revoked_serial(&self, issuer: &Name, serial_number: &[u8]) -> Result<Option<&RevokedEntry>, CodecError> {
        let Some(crl_issuer) = &self.content.issuer else {
            return Ok(None);
        };

        if !name::same_dn(crl_issuer, issuer)? {
            return Ok(None);
        }

        Ok(self
            .content
            .revoked
            .iter()
            .find(|entry| entry.matches_serial(serial_number)))
    }

    /// Entry revoking `cert`, if any.
    pub fn find_revoked(&self, cert: &CertItem) -> Result<Option<&RevokedEntry>, CodecError> {
        match (cert.issuer(), cert.serial_number()) {
            (Some(issuer), Some(serial_number)) => self.find_revoked_serial(issuer, serial_number),
            _ => Ok(None),
        }
    }

    pub fn is_revoked(&self, cert: &CertItem) -> Result<bool, CodecError> {
        self.find_revoked(cert).map(|entry| entry.is_some())
    }

    /// Rebuilds the whole signed CRL, decoding every entry's extensions.
    pub fn to_certificate_list(&self) -> Result<CertificateList, CodecError> {
        let signed = self
            .content
            .signed
            .as_ref()
            .ok_or_else(|| CodecError::invalid_state("to_certificate_list", self.state))?;
        let tbs_cert_list = TbsCertList::from_der(&signed.tbs).map_err(CodecError::decode("tbs cert list"))?;

        Ok(CertificateList {
            tbs_cert_list,
            signature_algorithm: signed.algorithm.clone(),
            signature_value: signed.signature.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::TbsField;
    use certlib_asn1::extension::{BasicConstraints, CrlNumber, KeyUsage};
    use certlib_asn1::time::UtcDate;
    use certlib_asn1::NameAttr;
    use pretty_assertions::assert_eq;

    #[test]
    fn decoded_certificate_is_read_only() {
        let mut cert = CertItem::decode(certlib_test_data::CA_CERT_DER).unwrap();
        assert_eq!(cert.state(), ItemState::DecodedAll);

        let err = cert
            .set(&TbsField::SerialNumber.into(), FieldValue::Integer(vec![0x01]))
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidState {
                operation: "set",
                state: ItemState::DecodedAll
            }
        ));
        assert!(matches!(cert.encode(), Err(CodecError::InvalidState { .. })));
    }

    #[test]
    fn building_item_cannot_be_queried() {
        let mut cert = CertItem::new();
        assert!(matches!(
            cert.get(&TbsField::SerialNumber.into(), 0),
            Err(CodecError::InvalidState {
                state: ItemState::Empty,
                ..
            })
        ));

        cert.set(&TbsField::SerialNumber.into(), FieldValue::Integer(vec![0x01]))
            .unwrap();
        assert_eq!(cert.state(), ItemState::Building);
        assert!(matches!(
            cert.get(&TbsField::SerialNumber.into(), 0),
            Err(CodecError::InvalidState {
                state: ItemState::Building,
                ..
            })
        ));
    }

    #[test]
    fn oversized_length_fails_to_decode() {
        let mut der = vec![0x30, 0x88];
        der.extend_from_slice(&[0xFF; 8]);
        assert!(matches!(CertItem::decode(&der), Err(CodecError::Decode { .. })));
        assert!(matches!(CrlItem::decode(&der), Err(CodecError::Decode { .. })));
        assert!(matches!(CertItem::decode_tbs(&der), Err(CodecError::Decode { .. })));
    }

    #[test]
    fn rejected_set_leaves_item_empty() {
        let mut cert = CertItem::new();

        let err = cert
            .set(&TbsField::ThisUpdate.into(), FieldValue::Integer(vec![0x01]))
            .unwrap_err();
        assert!(matches!(err, CodecError::UnknownField { .. }));
        assert_eq!(cert.state(), ItemState::Empty);

        let err = cert
            .set(&TbsField::SerialNumber.into(), FieldValue::Version(Version::V3))
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidFieldValue { .. }));
        assert_eq!(cert.state(), ItemState::Empty);

        let mut crl = CrlItem::new();
        assert!(crl
            .set(&TbsField::Signature.into(), FieldValue::BitString(vec![0x00]))
            .is_err());
        assert_eq!(crl.state(), ItemState::Empty);

        cert.set(&TbsField::SerialNumber.into(), FieldValue::Integer(vec![0x01]))
            .unwrap();
        assert_eq!(cert.state(), ItemState::Building);
    }

    #[test]
    fn signed_envelope_is_kept_byte_for_byte() {
        let der = certlib_test_data::CA_CRL_DER;
        let parts = signed::split(der).unwrap();
        let content = parts.signature_content().unwrap();

        // same signature, BIT STRING length in a redundant long form
        let mut signature = vec![tlv::universal::BIT_STRING, 0x82];
        signature.extend_from_slice(&(content.len() as u16).to_be_bytes());
        signature.extend_from_slice(content);
        let ber = signed::join(parts.tbs, parts.algorithm, &signature);
        assert_ne!(ber, der);

        let crl = CrlItem::decode(&ber).unwrap();
        assert_eq!(crl.signature_value(), Some(content));
        assert_eq!(crl.to_der().unwrap(), ber);
    }

    #[test]
    fn tbs_only_decode() {
        let parts = signed::split(certlib_test_data::CA_CERT_DER).unwrap();
        let cert = CertItem::decode_tbs(parts.tbs).unwrap();
        assert_eq!(cert.state(), ItemState::DecodedTbs);
        assert!(cert.tbs_der().is_none());
        assert_eq!(
            cert.get(&TbsField::Signature.into(), 0).unwrap(),
            FieldLookup::NotFound
        );
        assert!(cert.get(&TbsField::Subject.into(), 0).unwrap().is_found());
    }

    #[test]
    fn encode_requires_structural_fields() {
        let mut cert = CertItem::new();
        cert.set(&TbsField::SerialNumber.into(), FieldValue::Integer(vec![0x01]))
            .unwrap();
        assert!(matches!(
            cert.encode(),
            Err(CodecError::IncompleteObject {
                missing: "signature algorithm"
            })
        ));

        cert.set(
            &TbsField::TbsSignatureAlgorithm.into(),
            FieldValue::Algorithm(AlgorithmIdentifier::new_ecdsa_with_sha256()),
        )
        .unwrap();
        cert.set(
            &TbsField::Issuer.into(),
            FieldValue::Name(Name::new_common_name("Issuer")),
        )
        .unwrap();
        assert!(matches!(
            cert.encode(),
            Err(CodecError::IncompleteObject { missing: "subject" })
        ));
    }

    #[test]
    fn built_certificate_decodes_back() {
        let ca = CertItem::decode(certlib_test_data::CA_CERT_DER).unwrap();
        let spki = ca.subject_public_key_info().unwrap().clone();

        let mut cert = CertItem::new();
        let date = |year| Time::from_date(UtcDate::ymd(year, 1, 1).unwrap());
        let subject = name::build_name(&[(NameAttr::CommonName, "built.example.com")]);
        let fields = [
            (TbsField::Version, FieldValue::Version(Version::V3)),
            (TbsField::SerialNumber, FieldValue::Integer(vec![0x00, 0x9F, 0x01])),
            (
                TbsField::TbsSignatureAlgorithm,
                FieldValue::Algorithm(AlgorithmIdentifier::new_ecdsa_with_sha256()),
            ),
            (TbsField::Issuer, FieldValue::Name(ca.subject().unwrap().clone())),
            (TbsField::NotBefore, FieldValue::Time(date(2024))),
            (TbsField::NotAfter, FieldValue::Time(date(2025))),
            (TbsField::Subject, FieldValue::Name(subject.clone())),
            (TbsField::SubjectPublicKeyInfo, FieldValue::PublicKeyInfo(spki)),
        ];
        for (field, value) in fields {
            cert.set(&field.into(), value).unwrap();
        }
        cert.set_extension(ExtensionValue::BasicConstraints(BasicConstraints::new(false, None)), true)
            .unwrap();
        let mut key_usage = KeyUsage::new();
        key_usage.set_digital_signature(true);
        cert.set_extension(ExtensionValue::KeyUsage(key_usage), true).unwrap();

        let tbs = cert.encode().unwrap();
        assert!(matches!(cert.encode(), Err(CodecError::ExtensionsAlreadyEncoded)));

        let decoded = CertItem::decode_tbs(&tbs).unwrap();
        assert_eq!(decoded.subject(), Some(&subject));
        assert_eq!(decoded.serial_number(), Some(&[0x00, 0x9F, 0x01][..]));
        assert_eq!(decoded.extensions().num_extensions(), 2);
        assert_eq!(
            decoded.extensions().find_value(ExtensionKind::KeyUsage),
            Some(&ExtensionValue::KeyUsage(key_usage))
        );
    }

    #[test]
    fn crl_entry_extensions_are_lazy() {
        let crl = CrlItem::decode(certlib_test_data::CA_CRL_DER).unwrap();
        let entries = crl.revoked_entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|entry| !entry.extensions_decoded()));

        assert_eq!(entries[0].reason(), Some(CrlReason::KeyCompromise));
        assert!(entries[0].extensions_decoded());
        assert!(!entries[1].extensions_decoded());

        let eager = CrlItem::decode_with_options(
            certlib_test_data::CA_CRL_DER,
            DecodeOptions {
                decode_entry_extensions_eagerly: true,
            },
        )
        .unwrap();
        assert!(eager.revoked_entries().iter().all(RevokedEntry::extensions_decoded));
    }

    #[test]
    fn crl_extensions_are_decoded() {
        let crl = CrlItem::decode(certlib_test_data::CA_CRL_DER).unwrap();
        assert_eq!(
            crl.extensions().find_value(ExtensionKind::CrlNumber),
            Some(&ExtensionValue::CrlNumber(CrlNumber(7)))
        );
        assert_eq!(crl.to_certificate_list().unwrap().to_der().unwrap(), certlib_test_data::CA_CRL_DER);
        assert_eq!(crl.to_der().unwrap(), certlib_test_data::CA_CRL_DER);
    }

    #[test]
    fn built_crl_roundtrip() {
        let issuer = name::build_name(&[(NameAttr::CommonName, "Example Issuing CA")]);
        let this_update = Time::from_date(UtcDate::ymd(2024, 6, 1).unwrap());

        let mut crl = CrlItem::new();
        crl.set(
            &TbsField::TbsSignatureAlgorithm.into(),
            FieldValue::Algorithm(AlgorithmIdentifier::new_ecdsa_with_sha256()),
        )
        .unwrap();
        crl.set(&TbsField::Issuer.into(), FieldValue::Name(issuer.clone()))
            .unwrap();
        assert!(matches!(
            crl.encode(),
            Err(CodecError::IncompleteObject { missing: "thisUpdate" })
        ));

        crl.set(&TbsField::ThisUpdate.into(), FieldValue::Time(this_update.clone()))
            .unwrap();
        let entry = RevokedEntry::new(vec![0x05], this_update.clone())
            .with_extension(ExtensionValue::ReasonCode(CrlReason::Superseded), false)
            .unwrap();
        crl.set(&TbsField::RevokedCertificate.into(), FieldValue::RevokedCertificate(entry))
            .unwrap();
        crl.set(
            &TbsField::RevokedCertificate.into(),
            FieldValue::RevokedCertificate(RevokedEntry::new(vec![0x06], this_update)),
        )
        .unwrap();
        crl.set_extension(ExtensionValue::CrlNumber(CrlNumber(1)), false)
            .unwrap();

        let tbs = crl.encode().unwrap();
        let decoded = CrlItem::decode_tbs(&tbs).unwrap();
        assert_eq!(decoded.issuer(), Some(&issuer));
        assert_eq!(decoded.revoked_entries().len(), 2);
        assert_eq!(decoded.revoked_entries()[0].reason(), Some(CrlReason::Superseded));
        assert_eq!(decoded.revoked_entries()[1].extensions().num_extensions(), 0);
    }
}
