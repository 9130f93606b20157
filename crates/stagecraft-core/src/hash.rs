// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Structural integrity hash.
//!
//! Values are fed through a canonical, tagged, length-prefixed encoding:
//!
//! - object keys are sorted before mixing, so insertion order never matters;
//! - array elements are mixed positionally, so element order always matters;
//! - numbers are encoded as text, which keeps `NaN` and `-0` distinct;
//! - bigints and dates are encoded as decimal text under their own tags;
//! - `undefined`, `null`, `false` and `true` are single sentinel bytes.
//!
//! Functions and symbols are unsupported. Cycles are rejected: unlike
//! [`crate::deep_freeze`], hashing needs a finite canonical form. Shared
//! (acyclic) sub-structures are fine and are hashed at every occurrence.
//!
//! The 64-bit mix is FNV-1a. Not cryptographic; it exists to notice writes
//! that slipped past the frozen flag.
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::value::Value;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

const TAG_UNDEFINED: u8 = 0x00;
const TAG_NULL: u8 = 0x01;
const TAG_FALSE: u8 = 0x02;
const TAG_TRUE: u8 = 0x03;
const TAG_NUMBER: u8 = 0x04;
const TAG_BIGINT: u8 = 0x05;
const TAG_STRING: u8 = 0x06;
const TAG_DATE: u8 = 0x07;
const TAG_ARRAY: u8 = 0x08;
const TAG_OBJECT: u8 = 0x09;
const TAG_SYMBOL: u8 = 0x0a;
const TAG_FUNCTION: u8 = 0x0b;
const TAG_BACKREF: u8 = 0x0c;

/// Errors raised while encoding a value canonically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    /// The value graph contains a cycle.
    #[error("cannot hash cyclic structure")]
    Cycle,
    /// The value graph contains a value with no canonical form.
    #[error("cannot hash {kind} value")]
    Unsupported {
        /// Kind of the offending value (`function` or `symbol`).
        kind: &'static str,
    },
}

trait Sink {
    fn put(&mut self, bytes: &[u8]);
}

impl Sink for Vec<u8> {
    fn put(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

struct Fnv1a(u64);

impl Sink for Fnv1a {
    #[inline]
    fn put(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = (self.0 ^ u64::from(b)).wrapping_mul(FNV_PRIME);
        }
    }
}

/// How values without a canonical form are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Reject functions, symbols and cycles.
    Canonical,
    /// Encode functions and symbols by address, cycles as back-references.
    Identity,
}

/// Computes the 64-bit structural hash of `value`.
pub fn integrity_hash(value: &Value) -> Result<u64, HashError> {
    let mut sink = Fnv1a(FNV_OFFSET);
    encode(value, &mut sink, &mut FxHashSet::default(), Mode::Canonical)?;
    Ok(sink.0)
}

/// Hash that is total over every value graph.
///
/// Agrees with [`integrity_hash`] on structure; functions and symbols mix in
/// their address and a cycle mixes in the address of the container it closes
/// on. Only meaningful within one process, between two reads of the same
/// graph.
pub(crate) fn identity_hash(value: &Value) -> u64 {
    let mut sink = Fnv1a(FNV_OFFSET);
    let encoded = encode(value, &mut sink, &mut FxHashSet::default(), Mode::Identity);
    debug_assert!(encoded.is_ok(), "identity encoding accepts every value");
    sink.0
}

/// Returns the canonical encoding that [`integrity_hash`] mixes.
///
/// Two values with equal canonical bytes are structurally equal.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>, HashError> {
    let mut out = Vec::new();
    encode(value, &mut out, &mut FxHashSet::default(), Mode::Canonical)?;
    Ok(out)
}

fn put_len(sink: &mut impl Sink, len: usize) {
    sink.put(&(len as u64).to_le_bytes());
}

fn put_text(sink: &mut impl Sink, tag: u8, text: &str) {
    sink.put(&[tag]);
    put_len(sink, text.len());
    sink.put(text.as_bytes());
}

pub(crate) fn number_text(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        let text = if n.is_sign_positive() {
            "Infinity"
        } else {
            "-Infinity"
        };
        text.to_owned()
    } else if n == 0.0 && n.is_sign_negative() {
        "-0".to_owned()
    } else {
        format!("{n}")
    }
}

fn put_addr(sink: &mut impl Sink, tag: u8, addr: usize) {
    sink.put(&[tag]);
    sink.put(&(addr as u64).to_le_bytes());
}

fn encode(
    value: &Value,
    sink: &mut impl Sink,
    ancestors: &mut FxHashSet<usize>,
    mode: Mode,
) -> Result<(), HashError> {
    match value {
        Value::Undefined => sink.put(&[TAG_UNDEFINED]),
        Value::Null => sink.put(&[TAG_NULL]),
        Value::Bool(false) => sink.put(&[TAG_FALSE]),
        Value::Bool(true) => sink.put(&[TAG_TRUE]),
        Value::Number(n) => put_text(sink, TAG_NUMBER, &number_text(*n)),
        Value::BigInt(n) => put_text(sink, TAG_BIGINT, &n.to_string()),
        Value::String(s) => put_text(sink, TAG_STRING, s),
        Value::Date(d) => put_text(sink, TAG_DATE, &d.time().to_string()),
        Value::Symbol(s) if mode == Mode::Identity => put_addr(sink, TAG_SYMBOL, s.addr()),
        Value::Function(f) if mode == Mode::Identity => put_addr(sink, TAG_FUNCTION, f.addr()),
        Value::Symbol(_) | Value::Function(_) => {
            return Err(HashError::Unsupported { kind: value.kind() })
        }
        Value::Array(arr) => {
            if !ancestors.insert(arr.addr()) {
                return back_reference(sink, arr.addr(), mode);
            }
            let items = arr.items();
            sink.put(&[TAG_ARRAY]);
            put_len(sink, items.len());
            for item in &items {
                encode(item, sink, ancestors, mode)?;
            }
            ancestors.remove(&arr.addr());
        }
        Value::Object(obj) => {
            if !ancestors.insert(obj.addr()) {
                return back_reference(sink, obj.addr(), mode);
            }
            let mut entries = obj.entries();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            sink.put(&[TAG_OBJECT]);
            put_len(sink, entries.len());
            for (key, item) in &entries {
                put_len(sink, key.len());
                sink.put(key.as_bytes());
                encode(item, sink, ancestors, mode)?;
            }
            ancestors.remove(&obj.addr());
        }
    }
    Ok(())
}

fn back_reference(sink: &mut impl Sink, addr: usize, mode: Mode) -> Result<(), HashError> {
    match mode {
        Mode::Canonical => Err(HashError::Cycle),
        Mode::Identity => {
            put_addr(sink, TAG_BACKREF, addr);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ArrayRef, ObjectRef};

    fn h(v: &Value) -> u64 {
        integrity_hash(v).unwrap_or_default()
    }

    #[test]
    fn empty_input_distinct_from_offset() {
        assert_ne!(h(&Value::Undefined), FNV_OFFSET);
        assert_ne!(h(&Value::Undefined), h(&Value::Null));
    }

    #[test]
    fn object_key_order_is_irrelevant() {
        let a = Value::from_entries([("x", Value::from(1)), ("y", Value::from(2))]);
        let b = Value::from_entries([("y", Value::from(2)), ("x", Value::from(1))]);
        assert_eq!(h(&a), h(&b));
    }

    #[test]
    fn array_order_matters() {
        let a = Value::array([Value::from(1), Value::from(2)]);
        let b = Value::array([Value::from(2), Value::from(1)]);
        assert_ne!(h(&a), h(&b));
    }

    #[test]
    fn signed_zero_and_nan_are_distinct() {
        assert_ne!(h(&Value::from(0.0)), h(&Value::from(-0.0)));
        assert_ne!(h(&Value::from(f64::NAN)), h(&Value::Null));
        assert_eq!(h(&Value::from(f64::NAN)), h(&Value::from(f64::NAN)));
    }

    #[test]
    fn multi_unit_code_points_hash_by_utf8_bytes() {
        let mut expected = Vec::new();
        put_text(&mut expected, TAG_STRING, "😀");
        assert_eq!(canonical_bytes(&Value::from("😀")), Ok(expected));
        assert_ne!(h(&Value::from("😀")), h(&Value::from("😁")));
    }

    #[test]
    fn type_tags_keep_lookalikes_apart() {
        assert_ne!(h(&Value::from("1")), h(&Value::from(1)));
        assert_ne!(h(&Value::BigInt(1)), h(&Value::from(1)));
        assert_ne!(h(&Value::date(1)), h(&Value::from(1)));
    }

    #[test]
    fn bigint_beyond_f64_precision() {
        let a = Value::BigInt(9_007_199_254_740_993);
        let b = Value::BigInt(9_007_199_254_740_992);
        assert_ne!(h(&a), h(&b));
    }

    #[test]
    fn cycles_are_rejected() {
        let obj = ObjectRef::new();
        assert!(obj.set("loop", Value::Object(obj.clone())).is_ok());
        assert_eq!(integrity_hash(&Value::Object(obj)), Err(HashError::Cycle));
    }

    #[test]
    fn shared_acyclic_refs_are_fine() {
        let shared = ArrayRef::from_items([Value::from(1)]);
        let root = Value::array([Value::Array(shared.clone()), Value::Array(shared)]);
        assert!(integrity_hash(&root).is_ok());
    }

    #[test]
    fn functions_and_symbols_are_rejected() {
        assert_eq!(
            integrity_hash(&Value::function(|_| Value::Null)),
            Err(HashError::Unsupported { kind: "function" })
        );
        let nested = Value::from_entries([("s", Value::symbol("tag"))]);
        assert_eq!(
            integrity_hash(&nested),
            Err(HashError::Unsupported { kind: "symbol" })
        );
    }

    #[test]
    fn identity_hash_covers_functions_symbols_and_cycles() {
        let f = Value::function(|_| Value::Null);
        let root = ObjectRef::from_entries([("f", f.clone()), ("s", Value::symbol("tag"))]);
        assert!(root.set("me", Value::Object(root.clone())).is_ok());
        let value = Value::Object(root);
        assert_eq!(identity_hash(&value), identity_hash(&value));
        assert!(integrity_hash(&value).is_err());

        let other = Value::from_entries([("f", Value::function(|_| Value::Null))]);
        let same = Value::from_entries([("f", f)]);
        assert_ne!(identity_hash(&other), identity_hash(&same));
    }

    #[test]
    fn identity_hash_sees_date_writes_beside_functions() {
        let date = crate::value::DateRef::new(0);
        let value = Value::from_entries([
            ("at", Value::Date(date.clone())),
            ("f", Value::function(|_| Value::Null)),
        ]);
        let before = identity_hash(&value);
        date.set_time(5);
        assert_ne!(identity_hash(&value), before);
    }

    #[test]
    fn identity_hash_matches_structure_for_plain_data() {
        let a = Value::from_entries([("x", Value::from(1))]);
        let b = Value::from_entries([("x", Value::from(1))]);
        assert_eq!(identity_hash(&a), identity_hash(&b));
    }
}
