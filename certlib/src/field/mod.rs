//! Field-addressed access to certificates and CRLs.
//!
//! Every kind of object owns a static table of [`FieldDescriptor`]s describing its top-level
//! fields. Extensions are addressed by OID and routed to the object's [`ExtensionStore`]; the
//! registry decides which OIDs are known.

/// Generates the getter and setter of a `Unique` field stored as `Option<_>` in `$content`.
macro_rules! unique_slot {
    ($content:ty, $field:ident, $get:ident, $set:ident, $slot:ident, $variant:ident) => {
        fn $get(content: &$content, _index: usize) -> Result<$crate::field::FieldLookup, $crate::error::CodecError> {
            Ok(content.$slot.clone().map($crate::field::FieldValue::$variant).into())
        }

        fn $set(content: &mut $content, value: $crate::field::FieldValue) -> Result<(), $crate::error::CodecError> {
            match value {
                $crate::field::FieldValue::$variant(value) => {
                    content.$slot = Some(value);
                    Ok(())
                }
                _ => Err($crate::error::CodecError::InvalidFieldValue {
                    id: $crate::field::FieldId::Tbs($crate::field::TbsField::$field),
                    expected: stringify!($variant),
                }),
            }
        }
    };
}

pub(crate) mod cert;
pub(crate) mod crl;

use crate::error::CodecError;
use crate::extension_store::{ExtensionPayload, ExtensionQuery, ExtensionStore, StoredExtension};
use crate::item::RevokedEntry;
use crate::registry::{ExtensionKind, ExtensionValue};
use certlib_asn1::{AlgorithmIdentifier, Name, ObjectIdentifier, SubjectPublicKeyInfo, Time, Version};
use std::fmt;

/// Top-level fields of certificates, CRLs and CRL entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TbsField {
    Version,
    SerialNumber,
    Issuer,
    /// DER encoding of the issuer name
    IssuerDer,
    Subject,
    /// DER encoding of the subject name
    SubjectDer,
    NotBefore,
    NotAfter,
    SubjectPublicKeyInfo,
    IssuerUniqueId,
    SubjectUniqueId,
    /// `signature` field inside the TBS
    TbsSignatureAlgorithm,
    /// `signatureAlgorithm` of the signed envelope
    SignatureAlgorithm,
    Signature,
    ThisUpdate,
    NextUpdate,
    RevokedCertificate,
    /// The whole signed CRL, entry extensions included
    SignedCrl,
    RevocationDate,
}

impl TbsField {
    fn expected_value(self) -> &'static str {
        match self {
            TbsField::Version => "version",
            TbsField::SerialNumber => "integer",
            TbsField::Issuer | TbsField::Subject => "name",
            TbsField::IssuerDer | TbsField::SubjectDer => "DER bytes",
            TbsField::NotBefore
            | TbsField::NotAfter
            | TbsField::ThisUpdate
            | TbsField::NextUpdate
            | TbsField::RevocationDate => "time",
            TbsField::SubjectPublicKeyInfo => "subject public key info",
            TbsField::IssuerUniqueId | TbsField::SubjectUniqueId | TbsField::Signature => "bit string",
            TbsField::TbsSignatureAlgorithm | TbsField::SignatureAlgorithm => "algorithm identifier",
            TbsField::RevokedCertificate => "revoked certificate entry",
            TbsField::SignedCrl => "signed CRL",
        }
    }
}

/// Identifies a field of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldId {
    Tbs(TbsField),
    /// A registered extension, by `extnID`.
    Extension(ObjectIdentifier),
    /// Any extension kept opaque, whatever its identifier.
    AnyOpaqueExtension,
}

impl FieldId {
    pub fn extension(kind: ExtensionKind) -> Self {
        FieldId::Extension(kind.oid())
    }
}

impl From<TbsField> for FieldId {
    fn from(field: TbsField) -> Self {
        FieldId::Tbs(field)
    }
}

impl From<ExtensionKind> for FieldId {
    fn from(kind: ExtensionKind) -> Self {
        FieldId::extension(kind)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldId::Tbs(field) => write!(f, "{field:?}"),
            FieldId::Extension(oid) => match ExtensionKind::from_oid(oid) {
                Some(kind) => write!(f, "{}", kind.name()),
                None => write!(f, "{}", Into::<String>::into(oid)),
            },
            FieldId::AnyOpaqueExtension => write!(f, "any opaque extension"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// At most one value, only reachable with index 0.
    Unique,
    /// Any number of values, `set` appends.
    Repeatable,
    /// Can be queried but never set.
    ReadOnly,
}

/// A registered extension as seen through the field interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionField {
    pub critical: bool,
    pub value: ExtensionValue,
}

impl ExtensionField {
    pub fn new(value: ExtensionValue, critical: bool) -> Self {
        Self { critical, value }
    }

    pub fn critical(value: ExtensionValue) -> Self {
        Self::new(value, true)
    }

    pub fn non_critical(value: ExtensionValue) -> Self {
        Self::new(value, false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueExtension {
    pub id: ObjectIdentifier,
    pub critical: bool,
    /// `extnValue` content
    pub value: Vec<u8>,
}

/// The signed CRL with every entry's extensions decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCrl {
    pub tbs_der: Vec<u8>,
    pub signature_algorithm: AlgorithmIdentifier,
    /// BIT STRING content octets
    pub signature: Vec<u8>,
    pub revoked_certificates: Vec<RevokedEntry>,
}

/// Public typed shape of a field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Version(Version),
    /// INTEGER content octets
    Integer(Vec<u8>),
    Name(Name),
    Der(Vec<u8>),
    Time(Time),
    PublicKeyInfo(SubjectPublicKeyInfo),
    /// BIT STRING content octets, unused-bits octet included
    BitString(Vec<u8>),
    Algorithm(AlgorithmIdentifier),
    Extension(ExtensionField),
    OpaqueExtension(OpaqueExtension),
    RevokedCertificate(RevokedEntry),
    SignedCrl(Box<SignedCrl>),
}

impl FieldValue {
    /// Whether this value has the shape expected for `id`.
    pub fn fits(&self, id: &FieldId) -> bool {
        match (id, self) {
            (FieldId::Tbs(field), value) => matches!(
                (field, value),
                (TbsField::Version, FieldValue::Version(_))
                    | (TbsField::SerialNumber, FieldValue::Integer(_))
                    | (TbsField::Issuer | TbsField::Subject, FieldValue::Name(_))
                    | (TbsField::IssuerDer | TbsField::SubjectDer, FieldValue::Der(_))
                    | (
                        TbsField::NotBefore
                            | TbsField::NotAfter
                            | TbsField::ThisUpdate
                            | TbsField::NextUpdate
                            | TbsField::RevocationDate,
                        FieldValue::Time(_)
                    )
                    | (TbsField::SubjectPublicKeyInfo, FieldValue::PublicKeyInfo(_))
                    | (
                        TbsField::IssuerUniqueId | TbsField::SubjectUniqueId | TbsField::Signature,
                        FieldValue::BitString(_)
                    )
                    | (
                        TbsField::TbsSignatureAlgorithm | TbsField::SignatureAlgorithm,
                        FieldValue::Algorithm(_)
                    )
                    | (TbsField::RevokedCertificate, FieldValue::RevokedCertificate(_))
                    | (TbsField::SignedCrl, FieldValue::SignedCrl(_))
            ),
            (FieldId::Extension(oid), FieldValue::Extension(extension)) => extension.value.kind().oid() == *oid,
            (FieldId::AnyOpaqueExtension, FieldValue::OpaqueExtension(_)) => true,
            _ => false,
        }
    }
}

/// Outcome of a field query. Absence is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLookup {
    Found {
        value: FieldValue,
        /// Total number of values for this field, reported for index 0 only.
        count: Option<usize>,
    },
    NotFound,
}

impl FieldLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, FieldLookup::Found { .. })
    }

    pub fn value(&self) -> Option<&FieldValue> {
        match self {
            FieldLookup::Found { value, .. } => Some(value),
            FieldLookup::NotFound => None,
        }
    }

    pub fn into_value(self) -> Option<FieldValue> {
        match self {
            FieldLookup::Found { value, .. } => Some(value),
            FieldLookup::NotFound => None,
        }
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            FieldLookup::Found { count, .. } => *count,
            FieldLookup::NotFound => None,
        }
    }
}

impl From<Option<FieldValue>> for FieldLookup {
    fn from(value: Option<FieldValue>) -> Self {
        match value {
            Some(value) => FieldLookup::Found { value, count: Some(1) },
            None => FieldLookup::NotFound,
        }
    }
}

pub(crate) type GetFn<T> = fn(&T, usize) -> Result<FieldLookup, CodecError>;
pub(crate) type SetFn<T> = fn(&mut T, FieldValue) -> Result<(), CodecError>;

pub struct FieldDescriptor<T> {
    pub field: TbsField,
    pub cardinality: Cardinality,
    pub(crate) get: GetFn<T>,
    pub(crate) set: Option<SetFn<T>>,
}

impl<T> FieldDescriptor<T> {
    pub(crate) const fn unique(field: TbsField, get: GetFn<T>, set: SetFn<T>) -> Self {
        Self {
            field,
            cardinality: Cardinality::Unique,
            get,
            set: Some(set),
        }
    }

    pub(crate) const fn repeatable(field: TbsField, get: GetFn<T>, set: SetFn<T>) -> Self {
        Self {
            field,
            cardinality: Cardinality::Repeatable,
            get,
            set: Some(set),
        }
    }

    pub(crate) const fn read_only(field: TbsField, get: GetFn<T>) -> Self {
        Self {
            field,
            cardinality: Cardinality::ReadOnly,
            get,
            set: None,
        }
    }
}

/// Storage exposing its fields through a descriptor table.
pub(crate) trait FieldTable: Sized + 'static {
    const FIELDS: &'static [FieldDescriptor<Self>];

    const EXTENSION_CARDINALITY: Cardinality = Cardinality::Repeatable;

    fn extensions(&self) -> &ExtensionStore;

    /// `None` when extensions can't be modified through the field interface.
    fn extensions_mut(&mut self) -> Option<&mut ExtensionStore>;
}

fn descriptor<T: FieldTable>(field: TbsField) -> Option<&'static FieldDescriptor<T>> {
    T::FIELDS.iter().find(|descriptor| descriptor.field == field)
}

/// Cardinality of `id` for this kind of object, `None` if the field doesn't exist there.
pub(crate) fn cardinality<T: FieldTable>(id: &FieldId) -> Option<Cardinality> {
    match id {
        FieldId::Tbs(field) => descriptor::<T>(*field).map(|descriptor| descriptor.cardinality),
        FieldId::Extension(oid) => ExtensionKind::from_oid(oid).map(|_| T::EXTENSION_CARDINALITY),
        FieldId::AnyOpaqueExtension => Some(Cardinality::ReadOnly),
    }
}

pub(crate) fn get_field<T: FieldTable>(target: &T, id: &FieldId, index: usize) -> Result<FieldLookup, CodecError> {
    match id {
        FieldId::Tbs(field) => {
            let descriptor = descriptor::<T>(*field).ok_or_else(|| CodecError::UnknownField { id: id.clone() })?;
            if descriptor.cardinality != Cardinality::Repeatable && index != 0 {
                return Ok(FieldLookup::NotFound);
            }
            (descriptor.get)(target, index)
        }
        FieldId::Extension(oid) => {
            if ExtensionKind::from_oid(oid).is_none() {
                return Err(CodecError::UnknownField { id: id.clone() });
            }
            Ok(extension_lookup(target.extensions(), &ExtensionQuery::Id(oid), index))
        }
        FieldId::AnyOpaqueExtension => Ok(extension_lookup(
            target.extensions(),
            &ExtensionQuery::AnyOpaque,
            index,
        )),
    }
}

fn extension_lookup(store: &ExtensionStore, query: &ExtensionQuery<'_>, index: usize) -> FieldLookup {
    match store.find(query, index) {
        Some((extension, count)) => FieldLookup::Found {
            value: to_field_value(extension),
            count,
        },
        None => FieldLookup::NotFound,
    }
}

fn to_field_value(extension: &StoredExtension) -> FieldValue {
    match extension.value() {
        ExtensionPayload::Decoded(value) => FieldValue::Extension(ExtensionField::new(value.clone(), extension.critical())),
        ExtensionPayload::Opaque(bytes) => FieldValue::OpaqueExtension(OpaqueExtension {
            id: extension.id().clone(),
            critical: extension.critical(),
            value: extension.raw_encoding().unwrap_or(bytes).to_vec(),
        }),
    }
}

pub(crate) fn set_field<T: FieldTable>(target: &mut T, id: &FieldId, value: FieldValue) -> Result<(), CodecError> {
    match id {
        FieldId::Tbs(field) => {
            let descriptor = descriptor::<T>(*field).ok_or_else(|| CodecError::UnknownField { id: id.clone() })?;
            let set = descriptor
                .set
                .ok_or_else(|| CodecError::UnsupportedOperation { id: id.clone() })?;
            check_shape(id, &value, field.expected_value())?;
            if descriptor.cardinality == Cardinality::Unique && (descriptor.get)(target, 0)?.is_found() {
                return Err(CodecError::DuplicateField { id: id.clone() });
            }
            set(target, value)
        }
        FieldId::Extension(oid) => {
            let kind = ExtensionKind::from_oid(oid).ok_or_else(|| CodecError::UnknownField { id: id.clone() })?;
            check_shape(id, &value, kind.name())?;
            let store = target
                .extensions_mut()
                .ok_or_else(|| CodecError::UnsupportedOperation { id: id.clone() })?;
            match value {
                FieldValue::Extension(ExtensionField { critical, value }) => {
                    store.push(StoredExtension::new(value, critical))
                }
                _ => Err(CodecError::InvalidFieldValue {
                    id: id.clone(),
                    expected: kind.name(),
                }),
            }
        }
        FieldId::AnyOpaqueExtension => Err(CodecError::UnsupportedOperation { id: id.clone() }),
    }
}

fn check_shape(id: &FieldId, value: &FieldValue, expected: &'static str) -> Result<(), CodecError> {
    if value.fits(id) {
        Ok(())
    } else {
        Err(CodecError::InvalidFieldValue { id: id.clone(), expected })
    }
}

/// Releases a value obtained through `get`, reporting values handed back under the wrong
/// identifier.
pub fn free(id: &FieldId, value: FieldValue) -> Result<(), CodecError> {
    let expected = match id {
        FieldId::Tbs(field) => field.expected_value(),
        FieldId::Extension(oid) => ExtensionKind::from_oid(oid)
            .map(ExtensionKind::name)
            .ok_or_else(|| CodecError::UnknownField { id: id.clone() })?,
        FieldId::AnyOpaqueExtension => "opaque extension",
    };
    check_shape(id, &value, expected)?;
    drop(value);
    Ok(())
}
