//! Per-row content fingerprints.
//!
//! Every trigger source (mutation flush, visibility, periodic sweep) funnels
//! through [`SignatureTracker::should_process`], so a row touched by all
//! three in one turn is processed at most once, and an unchanged row costs a
//! hash and a map lookup.

use crate::schema::HostSchema;
use dom::{Document, NodeKey};
use std::collections::HashMap;

/// Cheap digest of a row's (text, sender) pair. Equality only says "probably
/// unchanged"; it is never used as an identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    /// FNV-1a over `text`, a NUL separator, then `name`.
    pub fn of(text: &str, name: &str) -> Self {
        let mut hash = Self::OFFSET;
        let bytes = text.as_bytes().iter().chain(&[0u8]).chain(name.as_bytes());
        for byte in bytes {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(Self::PRIME);
        }
        Fingerprint(hash)
    }

    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }
}

/// Fingerprint of a row as it currently renders. Rows without a sender or
/// content element hash their whole text with an empty name.
pub fn row_fingerprint(doc: &Document, schema: &HostSchema, row: NodeKey) -> Fingerprint {
    match (schema.sender_of(doc, row), schema.content_of(doc, row)) {
        (Some(sender), Some(content)) => {
            Fingerprint::of(&doc.text_content(content), &doc.text_content(sender))
        }
        _ => Fingerprint::of(&doc.text_content(row), ""),
    }
}

/// Identity a row's records are filed under. The host's own row id survives
/// node replacement, so it is preferred over the arena key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RowKey {
    Stable(String),
    Node(NodeKey),
}

impl RowKey {
    pub fn of(doc: &Document, schema: &HostSchema, row: NodeKey) -> Self {
        match schema.row_id(doc, row) {
            Some(id) => RowKey::Stable(id.to_string()),
            None => RowKey::Node(row),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    fingerprint: Fingerprint,
    node: NodeKey,
}

pub struct SignatureTracker {
    schema: HostSchema,
    entries: HashMap<RowKey, Entry>,
}

impl SignatureTracker {
    pub fn new(schema: HostSchema) -> Self {
        Self {
            schema,
            entries: HashMap::new(),
        }
    }

    pub fn should_process(&self, doc: &Document, row: NodeKey) -> bool {
        let key = RowKey::of(doc, &self.schema, row);
        match self.entries.get(&key) {
            Some(entry) => entry.fingerprint != row_fingerprint(doc, &self.schema, row),
            None => true,
        }
    }

    pub fn record_processed(&mut self, doc: &Document, row: NodeKey) {
        let key = RowKey::of(doc, &self.schema, row);
        let fingerprint = row_fingerprint(doc, &self.schema, row);
        self.entries.insert(key, Entry {
            fingerprint,
            node: row,
        });
    }

    /// Drop entries whose row node no longer exists. Returns how many.
    pub fn prune(&mut self, doc: &Document) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| doc.contains(entry.node));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
