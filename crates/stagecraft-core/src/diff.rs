// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collection-level diff between two store snapshots.
//!
//! Only top-level arrays whose every element is an object carrying a string
//! or numeric identifier are compared. Other top-level keys are not diffed.
use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;

use crate::hash::{canonical_bytes, number_text};
use crate::store::StoreSnapshot;
use crate::value::{ObjectRef, Value};

/// Stable identifier of one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordId {
    /// String identifier.
    Text(String),
    /// Numeric identifier, held in canonical text form.
    Number(String),
}

impl RecordId {
    fn of(record: &ObjectRef, id_field: &str) -> Option<Self> {
        match record.get(id_field)? {
            Value::String(s) => Some(Self::Text(s)),
            Value::Number(n) => Some(Self::Number(number_text(n))),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Number(s) => f.write_str(s),
        }
    }
}

/// One changed record.
#[derive(Debug, Clone)]
pub struct DiffEntry {
    /// Record identifier.
    pub id: RecordId,
    /// Record before the command; `None` when created.
    pub before: Option<Value>,
    /// Record after the command; `None` when deleted.
    pub after: Option<Value>,
}

/// Changes within one collection.
#[derive(Debug, Clone, Default)]
pub struct CollectionDiff {
    /// Records only present afterwards, in their array order.
    pub created: Vec<DiffEntry>,
    /// Records only present before, in their array order.
    pub deleted: Vec<DiffEntry>,
    /// Records whose non-identifier fields changed, in their new array order.
    pub mutated: Vec<DiffEntry>,
}

impl CollectionDiff {
    /// Returns true when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty() && self.mutated.is_empty()
    }
}

/// Per-collection changes, keyed by top-level store key.
///
/// Collections without changes are omitted.
#[derive(Debug, Clone, Default)]
pub struct StoreDiff {
    collections: BTreeMap<String, CollectionDiff>,
}

impl StoreDiff {
    /// Returns true when no collection changed.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Changes in `name`, if any.
    pub fn collection(&self, name: &str) -> Option<&CollectionDiff> {
        self.collections.get(name)
    }

    /// Changed collections in key order.
    pub fn collections(&self) -> impl Iterator<Item = (&str, &CollectionDiff)> {
        self.collections.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Diffs `before` against `after` using `id_field` as the record identifier.
///
/// A collection missing on one side counts as empty. A collection that does
/// not qualify on either side is skipped. Within one array, the first record
/// with a given identifier wins.
pub fn diff_snapshots(before: &StoreSnapshot, after: &StoreSnapshot, id_field: &str) -> StoreDiff {
    let empty = ObjectRef::new();
    let old_root = before.as_value().as_object().unwrap_or(&empty);
    let new_root = after.as_value().as_object().unwrap_or(&empty);

    let mut names = old_root.keys();
    for key in new_root.keys() {
        if !old_root.contains_key(&key) {
            names.push(key);
        }
    }

    let mut out = StoreDiff::default();
    for name in names {
        let (Some(old), Some(new)) = (
            collection(old_root.get(&name), id_field),
            collection(new_root.get(&name), id_field),
        ) else {
            continue;
        };
        let diff = diff_collection(&old, &new, id_field);
        if !diff.is_empty() {
            out.collections.insert(name, diff);
        }
    }
    out
}

type Records = IndexMap<RecordId, ObjectRef>;

/// `Some` when `value` is absent or a qualifying array.
fn collection(value: Option<Value>, id_field: &str) -> Option<Records> {
    let Some(value) = value else {
        return Some(Records::new());
    };
    let array = value.as_array()?;
    let mut records = Records::new();
    for item in array.items() {
        let record = item.as_object()?;
        let id = RecordId::of(record, id_field)?;
        records.entry(id).or_insert_with(|| record.clone());
    }
    Some(records)
}

fn diff_collection(old: &Records, new: &Records, id_field: &str) -> CollectionDiff {
    let mut diff = CollectionDiff::default();
    for (id, record) in new {
        match old.get(id) {
            None => diff.created.push(DiffEntry {
                id: id.clone(),
                before: None,
                after: Some(Value::Object(record.clone())),
            }),
            Some(prev) if !same_fields(prev, record, id_field) => diff.mutated.push(DiffEntry {
                id: id.clone(),
                before: Some(Value::Object(prev.clone())),
                after: Some(Value::Object(record.clone())),
            }),
            Some(_) => {}
        }
    }
    for (id, record) in old {
        if !new.contains_key(id) {
            diff.deleted.push(DiffEntry {
                id: id.clone(),
                before: Some(Value::Object(record.clone())),
                after: None,
            });
        }
    }
    diff
}

/// Canonical comparison with the identifier excluded. Records without a
/// canonical form never compare equal.
fn same_fields(a: &ObjectRef, b: &ObjectRef, id_field: &str) -> bool {
    match (fields_bytes(a, id_field), fields_bytes(b, id_field)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn fields_bytes(record: &ObjectRef, id_field: &str) -> Option<Vec<u8>> {
    let fields = ObjectRef::from_entries(
        record
            .entries()
            .into_iter()
            .filter(|(k, _)| k != id_field),
    );
    canonical_bytes(&Value::Object(fields)).ok()
}
