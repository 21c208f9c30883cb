use crate::error::CodecError;
use crate::registry::{ExtensionKind, ExtensionValue};
use certlib_asn1::extension::{Extension, Extensions};
use certlib_asn1::ObjectIdentifier;

/// Either the typed value of a registered extension, or bytes this crate doesn't interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionPayload {
    Decoded(ExtensionValue),
    Opaque(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredExtension {
    id: ObjectIdentifier,
    critical: bool,
    value: ExtensionPayload,
    /// `extnValue` content as found on the wire, absent for extensions built locally.
    raw_encoding: Option<Vec<u8>>,
}

impl StoredExtension {
    pub fn new(value: ExtensionValue, critical: bool) -> Self {
        Self {
            id: value.kind().oid(),
            critical,
            value: ExtensionPayload::Decoded(value),
            raw_encoding: None,
        }
    }

    /// Interprets a wire extension through the registry.
    ///
    /// Unregistered identifiers, and registered ones whose value doesn't parse, are kept opaque.
    pub fn decode(extension: &Extension) -> Self {
        let raw = extension.extn_value().to_vec();

        let value = match ExtensionKind::from_oid(extension.extn_id()) {
            Some(kind) => match kind.decode(&raw) {
                Ok(value) => ExtensionPayload::Decoded(value),
                Err(e) => {
                    log::debug!(
                        "keeping {} ({}) opaque: {}",
                        kind.name(),
                        Into::<String>::into(extension.extn_id()),
                        e
                    );
                    ExtensionPayload::Opaque(raw.clone())
                }
            },
            None => ExtensionPayload::Opaque(raw.clone()),
        };

        Self {
            id: extension.extn_id().clone(),
            critical: extension.critical(),
            value,
            raw_encoding: Some(raw),
        }
    }

    pub fn id(&self) -> &ObjectIdentifier {
        &self.id
    }

    pub fn critical(&self) -> bool {
        self.critical
    }

    pub fn value(&self) -> &ExtensionPayload {
        &self.value
    }

    pub fn raw_encoding(&self) -> Option<&[u8]> {
        self.raw_encoding.as_deref()
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self.value, ExtensionPayload::Opaque(_))
    }

    pub fn decoded(&self) -> Option<&ExtensionValue> {
        match &self.value {
            ExtensionPayload::Decoded(value) => Some(value),
            ExtensionPayload::Opaque(_) => None,
        }
    }

    fn encode(&self) -> Result<Extension, CodecError> {
        let extn_value = match (&self.value, &self.raw_encoding) {
            (ExtensionPayload::Opaque(_), Some(raw)) => raw.clone(),
            (ExtensionPayload::Opaque(bytes), None) => bytes.clone(),
            (ExtensionPayload::Decoded(value), _) => value.encode().map_err(CodecError::encode("extension value"))?,
        };
        Ok(Extension::new(self.id.clone(), self.critical, extn_value))
    }
}

/// What [`ExtensionStore::find`] looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionQuery<'a> {
    /// Decoded extensions with this identifier.
    Id(&'a ObjectIdentifier),
    /// Every opaque extension, whatever its identifier.
    AnyOpaque,
}

impl ExtensionQuery<'_> {
    fn matches(&self, extension: &StoredExtension) -> bool {
        match self {
            ExtensionQuery::Id(id) => !extension.is_opaque() && extension.id == **id,
            ExtensionQuery::AnyOpaque => extension.is_opaque(),
        }
    }
}

/// Extensions of one object, in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionStore {
    entries: Vec<StoredExtension>,
    encoded: bool,
}

impl ExtensionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never fails: anything the registry can't handle is stored opaque.
    pub fn decode_all(extensions: &Extensions) -> Self {
        Self {
            entries: extensions.iter().map(StoredExtension::decode).collect(),
            encoded: false,
        }
    }

    /// Encodes every entry in store order.
    pub fn encode_all(&self) -> Result<Extensions, CodecError> {
        if self.encoded {
            return Err(CodecError::ExtensionsAlreadyEncoded);
        }

        self.entries
            .iter()
            .map(StoredExtension::encode)
            .collect::<Result<Vec<_>, _>>()
            .map(Extensions)
    }

    pub(crate) fn mark_encoded(&mut self) {
        self.encoded = true;
    }

    pub fn is_encoded(&self) -> bool {
        self.encoded
    }

    pub fn push(&mut self, extension: StoredExtension) -> Result<(), CodecError> {
        if self.encoded {
            return Err(CodecError::ExtensionsAlreadyEncoded);
        }
        self.entries.push(extension);
        Ok(())
    }

    pub fn num_extensions(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StoredExtension> {
        self.entries.iter()
    }

    /// `index`-th extension matching `query`, along with the number of matches when `index` is 0.
    pub fn find(&self, query: &ExtensionQuery<'_>, index: usize) -> Option<(&StoredExtension, Option<usize>)> {
        let mut matching = self.entries.iter().filter(|extension| query.matches(extension));

        if index == 0 {
            let first = matching.next()?;
            Some((first, Some(1 + matching.count())))
        } else {
            matching.nth(index).map(|extension| (extension, None))
        }
    }

    /// First decoded value of `kind`.
    pub fn find_value(&self, kind: ExtensionKind) -> Option<&ExtensionValue> {
        let oid = kind.oid();
        self.find(&ExtensionQuery::Id(&oid), 0)
            .and_then(|(extension, _)| extension.decoded())
    }
}
