//! Lookup tiers consulted by the scenario data store.

use crate::document::{Document, Value};
use crate::durable::DurableFile;
use std::fmt;
use tracing::warn;

/// A source of values that can answer a key lookup.
pub trait Tier {
    /// Which tier this is.
    fn kind(&self) -> TierKind;

    /// Returns the value for `key`, or `None` if this tier doesn't hold it.
    fn try_get(&self, key: &str) -> Option<Value>;
}

/// The tiers, in lookup precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TierKind {
    /// Values written during the current scenario.
    Dynamic,
    /// The Resolved Static Document.
    Static,
    /// The run-wide durable file.
    Durable,
}

impl TierKind {
    /// Lowercase name used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dynamic => "dynamic",
            Self::Static => "static",
            Self::Durable => "durable",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value found by [`resolve_key`], with the tier that held it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    /// The value found.
    pub value: Value,
    /// The tier that answered.
    pub tier: TierKind,
}

/// Queries `tiers` in order; the first tier holding `key` wins.
///
/// Values are never merged across tiers.
pub fn resolve_key(tiers: &[&dyn Tier], key: &str) -> Option<Lookup> {
    tiers.iter().find_map(|tier| {
        tier.try_get(key).map(|value| Lookup {
            value,
            tier: tier.kind(),
        })
    })
}

/// In-memory tier owned by the current scenario.
#[derive(Debug, Clone, Default)]
pub struct DynamicTier {
    values: Document,
}

impl DynamicTier {
    /// Empty tier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a key.
    pub fn insert(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    /// Drops every value.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the tier holds no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Tier for DynamicTier {
    fn kind(&self) -> TierKind {
        TierKind::Dynamic
    }

    fn try_get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }
}

/// Tier over the Resolved Static Document.
#[derive(Debug, Clone, Default)]
pub struct StaticTier {
    document: Document,
}

impl StaticTier {
    /// Wraps a resolved document.
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The resolved document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Tier for StaticTier {
    fn kind(&self) -> TierKind {
        TierKind::Static
    }

    fn try_get(&self, key: &str) -> Option<Value> {
        self.document.get(key).cloned()
    }
}

/// Tier reading the durable file on every lookup.
///
/// Read failures are logged and treated as "key absent".
#[derive(Debug, Clone)]
pub struct DurableTier<'a> {
    file: &'a DurableFile,
}

impl<'a> DurableTier<'a> {
    /// Tier over `file`.
    pub fn new(file: &'a DurableFile) -> Self {
        Self { file }
    }
}

impl Tier for DurableTier<'_> {
    fn kind(&self) -> TierKind {
        TierKind::Durable
    }

    fn try_get(&self, key: &str) -> Option<Value> {
        match self.file.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    key = key,
                    path = %self.file.path().display(),
                    error = %e,
                    "Could not retrieve persistent data"
                );
                None
            }
        }
    }
}
