//! Mutation observation.
//!
//! Observers register interest in a target node and receive queued
//! [`MutationRecord`]s for every matching change. Records accumulate until
//! the owner drains them with [`Document::take_records`](crate::Document::take_records);
//! there is no callback, so delivery timing is entirely up to the caller.
//!
//! Records are appended in mutation order. A record may reference nodes that
//! were removed afterwards; consumers must check liveness before use.

use crate::types::NodeKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObserveOptions {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
}

impl ObserveOptions {
    /// Structural changes anywhere below the target.
    pub fn structure() -> Self {
        Self {
            child_list: true,
            subtree: true,
            ..Self::default()
        }
    }

    /// Every kind of change anywhere below the target.
    pub fn everything() -> Self {
        Self {
            child_list: true,
            attributes: true,
            character_data: true,
            subtree: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationRecord {
    ChildList {
        target: NodeKey,
        added: Vec<NodeKey>,
        removed: Vec<NodeKey>,
    },
    Attributes {
        target: NodeKey,
        name: String,
    },
    CharacterData {
        target: NodeKey,
    },
}

impl MutationRecord {
    pub fn target(&self) -> NodeKey {
        match self {
            MutationRecord::ChildList { target, .. }
            | MutationRecord::Attributes { target, .. }
            | MutationRecord::CharacterData { target } => *target,
        }
    }

    fn wanted_by(&self, options: &ObserveOptions) -> bool {
        match self {
            MutationRecord::ChildList { .. } => options.child_list,
            MutationRecord::Attributes { .. } => options.attributes,
            MutationRecord::CharacterData { .. } => options.character_data,
        }
    }
}

struct Registration {
    id: ObserverId,
    target: NodeKey,
    options: ObserveOptions,
    queue: Vec<MutationRecord>,
}

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u32,
    registrations: Vec<Registration>,
}

impl ObserverRegistry {
    pub(crate) fn register(&mut self, target: NodeKey, options: ObserveOptions) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.registrations.push(Registration {
            id,
            target,
            options,
            queue: Vec::new(),
        });
        id
    }

    pub(crate) fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        before != self.registrations.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub(crate) fn take(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.registrations
            .iter_mut()
            .find(|r| r.id == id)
            .map(|r| std::mem::take(&mut r.queue))
            .unwrap_or_default()
    }

    pub(crate) fn pending(&self, id: ObserverId) -> usize {
        self.registrations
            .iter()
            .find(|r| r.id == id)
            .map_or(0, |r| r.queue.len())
    }

    /// Queue `record` on every registration whose target is the record's
    /// target, or an ancestor of it when observing the subtree. `ancestors`
    /// is the inclusive ancestor chain of the target.
    pub(crate) fn deliver(&mut self, record: MutationRecord, ancestors: &[NodeKey]) {
        let target = record.target();
        for reg in &mut self.registrations {
            if !record.wanted_by(&reg.options) {
                continue;
            }
            let hit = reg.target == target || (reg.options.subtree && ancestors.contains(&reg.target));
            if hit {
                reg.queue.push(record.clone());
            }
        }
    }
}
