// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ordered side-effect capture.
use rustc_hash::FxHashSet;

use crate::freeze::deep_freeze;
use crate::hash::canonical_bytes;
use crate::value::Value;

/// Side-effect descriptor emitted by a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    kind: String,
    target: String,
    payload: Option<Value>,
}

impl Effect {
    /// Builds an effect. The payload is not frozen until it is drained.
    pub fn new(kind: impl Into<String>, target: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            kind: kind.into(),
            target: target.into(),
            payload,
        }
    }

    /// Effect type (`"log"`, `"damage"`, ...), caller-defined.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Entity the effect applies to.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Optional payload.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }
}

/// Append-only buffer of effects for one command invocation.
///
/// No deduplication or filtering happens here.
#[derive(Debug, Default)]
pub struct EffectsBuffer {
    pending: Vec<Effect>,
}

impl EffectsBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an effect in call order.
    pub fn add(
        &mut self,
        kind: impl Into<String>,
        target: impl Into<String>,
        payload: Option<Value>,
    ) {
        self.pending.push(Effect::new(kind, target, payload));
    }

    /// Number of buffered effects.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Takes every buffered effect, leaving the buffer empty.
    ///
    /// Payloads are deep-frozen on the way out, so the drained list cannot be
    /// altered through handles a rule kept.
    pub fn drain(&mut self) -> Vec<Effect> {
        let drained = std::mem::take(&mut self.pending);
        for effect in &drained {
            if let Some(payload) = &effect.payload {
                deep_freeze(payload);
            }
        }
        drained
    }
}

/// Appends derived effects after `effects`, deduplicated.
///
/// `derive` is called once per original effect, in order. A derived effect is
/// dropped when an effect with the same type, target and canonical payload is
/// already in the output. Payloads without a canonical form never compare
/// equal and are always kept.
///
/// This is a post-processing pass for layers wrapping the engine; the engine
/// itself never mirrors.
pub fn mirror_effects<F>(effects: &[Effect], mut derive: F) -> Vec<Effect>
where
    F: FnMut(&Effect) -> Option<Effect>,
{
    let mut seen: FxHashSet<(String, String, Option<Vec<u8>>)> = FxHashSet::default();
    let mut out: Vec<Effect> = Vec::with_capacity(effects.len());
    for effect in effects {
        if let Some(key) = dedup_key(effect) {
            seen.insert(key);
        }
        out.push(effect.clone());
    }
    for effect in effects {
        let Some(derived) = derive(effect) else {
            continue;
        };
        match dedup_key(&derived) {
            Some(key) => {
                if seen.insert(key) {
                    out.push(derived);
                }
            }
            None => out.push(derived),
        }
    }
    out
}

fn dedup_key(effect: &Effect) -> Option<(String, String, Option<Vec<u8>>)> {
    let payload = match &effect.payload {
        Some(p) => Some(canonical_bytes(p).ok()?),
        None => None,
    };
    Some((effect.kind.clone(), effect.target.clone(), payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order_and_empties() {
        let mut buf = EffectsBuffer::new();
        buf.add("a", "t1", None);
        buf.add("b", "t2", Some(Value::from(1)));
        let drained = buf.drain();
        assert_eq!(
            drained.iter().map(Effect::kind).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert!(buf.is_empty());
        assert!(buf.drain().is_empty());
    }

    #[test]
    fn drain_cycles_are_independent() {
        let mut buf = EffectsBuffer::new();
        buf.add("first", "x", None);
        let one = buf.drain();
        buf.add("second", "x", None);
        let two = buf.drain();
        assert_eq!(one.len(), 1);
        assert_eq!(two.len(), 1);
        assert_eq!(one[0].kind(), "first");
        assert_eq!(two[0].kind(), "second");
    }

    #[test]
    fn drained_payloads_are_frozen() {
        let payload = Value::from_entries([("hp", Value::from(3))]);
        let mut buf = EffectsBuffer::new();
        buf.add("heal", "hero", Some(payload.clone()));
        let _ = buf.drain();
        assert!(payload.is_frozen());
    }

    #[test]
    fn no_dedup_in_buffer() {
        let mut buf = EffectsBuffer::new();
        buf.add("same", "x", None);
        buf.add("same", "x", None);
        assert_eq!(buf.drain().len(), 2);
    }

    #[test]
    fn mirror_appends_unique_derived_effects() {
        let effects = vec![
            Effect::new("damage", "orc", Some(Value::from(2))),
            Effect::new("damage", "goblin", Some(Value::from(2))),
            Effect::new("log", "orc", None),
        ];
        let mirrored = mirror_effects(&effects, |e| {
            (e.kind() == "damage").then(|| Effect::new("log", e.target(), None))
        });
        let shape: Vec<(&str, &str)> = mirrored.iter().map(|e| (e.kind(), e.target())).collect();
        assert_eq!(
            shape,
            vec![
                ("damage", "orc"),
                ("damage", "goblin"),
                ("log", "orc"),
                ("log", "goblin"),
            ]
        );
    }

    #[test]
    fn mirror_dedups_derived_effects_but_keeps_opaque_payloads() {
        let effects = vec![Effect::new("hit", "orc", None), Effect::new("hit", "orc", None)];
        let once = mirror_effects(&effects, |_| Some(Effect::new("audit", "orc", None)));
        assert_eq!(once.len(), 3);

        let opaque = mirror_effects(&effects, |_| {
            Some(Effect::new("audit", "orc", Some(Value::function(|_| Value::Null))))
        });
        assert_eq!(opaque.len(), 4);
    }
}
