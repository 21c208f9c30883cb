use crate::field::FieldId;
use crate::item::ItemState;
#[cfg(feature = "pem")]
use crate::pem::PemError;
use certlib_asn1::TlvError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    /// malformed wire data
    #[error("couldn't decode {element}: {source}")]
    Decode {
        element: &'static str,
        source: TlvError,
    },

    /// value couldn't be written
    #[error("couldn't encode {element}: {source}")]
    Encode {
        element: &'static str,
        source: TlvError,
    },

    /// field identifier not known for this kind of object
    #[error("unknown field: {id}")]
    UnknownField { id: FieldId },

    /// a unique field was set twice
    #[error("field {id} is already set")]
    DuplicateField { id: FieldId },

    /// a structurally required field was never set
    #[error("incomplete object: missing {missing}")]
    IncompleteObject { missing: &'static str },

    /// operation not allowed in the current item state
    #[error("`{operation}` is not allowed in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: ItemState,
    },

    /// field is read-only
    #[error("field {id} cannot be set")]
    UnsupportedOperation { id: FieldId },

    /// value shape doesn't match the field identifier
    #[error("invalid value for field {id}: expected {expected}")]
    InvalidFieldValue { id: FieldId, expected: &'static str },

    /// extensions were already written into a TBS
    #[error("extensions were already encoded")]
    ExtensionsAlreadyEncoded,

    /// invalid PEM provided
    #[cfg(feature = "pem")]
    #[error("invalid PEM provided: {source}")]
    Pem { source: PemError },

    /// invalid PEM label
    #[cfg(feature = "pem")]
    #[error("invalid PEM label: {label}")]
    InvalidPemLabel { label: String },

    /// reported by the signature service
    #[error("signature error: {context}")]
    Signature { context: String },
}

impl CodecError {
    pub(crate) fn decode(element: &'static str) -> impl FnOnce(TlvError) -> Self {
        move |source| Self::Decode { element, source }
    }

    pub(crate) fn encode(element: &'static str) -> impl FnOnce(TlvError) -> Self {
        move |source| Self::Encode { element, source }
    }

    pub(crate) fn invalid_state(operation: &'static str, state: ItemState) -> Self {
        Self::InvalidState { operation, state }
    }
}

#[cfg(feature = "pem")]
impl From<PemError> for CodecError {
    fn from(e: PemError) -> Self {
        Self::Pem { source: e }
    }
}
