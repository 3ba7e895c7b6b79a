//! This module implements leaf-set entry interning.
//!
//! A large leaf-list of a type with few possible values (booleans,
//! enumerations, identities) repeats the same entries over and over. An
//! interner hands out one shared entry node per distinct value, for as long
//! as some tree still holds it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use log::trace;
use parking_lot::Mutex;

use crate::node::{NormalizedNode, ValueNode};
use crate::value::Value;

// Dead entries are swept once the table doubles past this.
const INITIAL_SWEEP: usize = 64;

struct Table {
    entries: HashMap<Value, Weak<ValueNode>>,
    sweep_at: usize,
}

/// A cache of leaf-set entries, shared by all leaf sets of one leaf-list.
pub struct LeafSetEntryInterner {
    table: Mutex<Table>,
}

impl LeafSetEntryInterner {
    /// Create an empty interner.
    pub fn new() -> LeafSetEntryInterner {
        LeafSetEntryInterner {
            table: Mutex::new(Table {
                entries: HashMap::new(),
                sweep_at: INITIAL_SWEEP,
            }),
        }
    }

    /// Return the canonical entry equal to `entry`.
    ///
    /// If no live entry with this value is known, `entry` becomes the
    /// canonical one. Nodes that aren't leaf-set entries pass through.
    pub fn intern(&self, entry: NormalizedNode) -> NormalizedNode {
        let node = match &entry {
            NormalizedNode::LeafSetEntry(node) => node,
            _ => return entry,
        };

        let mut table = self.table.lock();
        if let Some(existing) = table.entries.get(&node.value).and_then(Weak::upgrade) {
            if existing.identifier == node.identifier {
                return NormalizedNode::LeafSetEntry(existing);
            }
        }

        table.entries.insert(node.value.clone(), Arc::downgrade(node));
        if table.entries.len() >= table.sweep_at {
            table.entries.retain(|_, weak| weak.strong_count() > 0);
            table.sweep_at = (table.entries.len() * 2).max(INITIAL_SWEEP);
            trace!("interner swept, {} live entries", table.entries.len());
        }
        entry
    }

    /// The number of values with a live canonical entry.
    pub fn len(&self) -> usize {
        let table = self.table.lock();
        table
            .entries
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// True if no live entries are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LeafSetEntryInterner {
    fn default() -> Self {
        LeafSetEntryInterner::new()
    }
}

impl fmt::Debug for LeafSetEntryInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafSetEntryInterner")
            .field("live", &self.len())
            .finish()
    }
}

#[test]
fn test_interner_shares_entries() {
    use crate::builder::leaf_set_entry;
    use crate::path::QName;

    let q = QName::new("urn:example", "flag");
    let interner = LeafSetEntryInterner::new();

    let first = interner.intern(leaf_set_entry(q.clone(), true));
    let second = interner.intern(leaf_set_entry(q.clone(), true));
    assert!(first.ptr_eq(&second));
    assert_eq!(interner.len(), 1);

    let other = interner.intern(leaf_set_entry(q, false));
    assert!(!first.ptr_eq(&other));
    assert_eq!(interner.len(), 2);

    // Once nothing holds an entry, it no longer counts.
    drop(first);
    drop(second);
    assert_eq!(interner.len(), 1);
}
