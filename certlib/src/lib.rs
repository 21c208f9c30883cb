//! # certlib
//!
//! Field-addressed codec for X.509 certificates and certificate revocation lists.
//!
//! Objects are decoded into [`CertItem`] / [`CrlItem`] and inspected one field at a time with
//! `get`, or built from scratch with `set` and turned into a TBS with `encode`. Extensions are
//! interpreted through a static registry; anything unknown travels through untouched.

mod error;
mod extension_store;
mod item;
mod key_usage;

pub mod field;
pub mod name;
pub mod registry;
pub mod signature;

#[cfg(feature = "pem")]
pub mod pem;

pub use error::CodecError;
pub use extension_store::{ExtensionPayload, ExtensionQuery, ExtensionStore, StoredExtension};
pub use field::{
    free, Cardinality, ExtensionField, FieldId, FieldLookup, FieldValue, OpaqueExtension, SignedCrl, TbsField,
};
pub use item::{CertItem, CrlItem, DecodeOptions, ItemState, RevokedEntry};
pub use key_usage::KeyUse;
pub use registry::{ExtensionKind, ExtensionValue};
pub use signature::{generate_serial_number, sign_encoded, verify_signed, SignatureService};

pub use certlib_asn1 as asn1;
