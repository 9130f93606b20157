// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Command descriptors, rules, and the authoring builder.
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::accumulator::Accumulator;
use crate::effects::EffectsBuffer;
use crate::outcome::Failure;
use crate::prng::Rng;
use crate::registry::{Registry, RegistryError};
use crate::store::MemoryStore;
use crate::value::{ObjectRef, Value, ValueError};

/// Fixed execution phases, in the order the executor runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Reject malformed params.
    Validate,
    /// Read state the command depends on.
    Load,
    /// Pure computation.
    Calc,
    /// Write through the store.
    Mutate,
    /// Emit effects.
    Emit,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 5] = [
        Stage::Validate,
        Stage::Load,
        Stage::Calc,
        Stage::Mutate,
        Stage::Emit,
    ];

    /// Lower-case stage name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Load => "load",
            Self::Calc => "calc",
            Self::Mutate => "mutate",
            Self::Emit => "emit",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Validate => 0,
            Self::Load => 1,
            Self::Calc => 2,
            Self::Mutate => 3,
            Self::Emit => 4,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error a rule raises instead of returning an output.
///
/// A [`ValueError::Frozen`] (a write to an immutable value) classifies as
/// `INTEGRITY_MUTATION`; anything else as `RULE_EXCEPTION`.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A value operation failed.
    #[error(transparent)]
    Value(#[from] ValueError),
    /// Free-form rule error.
    #[error("{0}")]
    Message(String),
}

impl RuleError {
    /// Free-form error with `message`.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub(crate) fn is_immutable_write(&self) -> bool {
        matches!(self, Self::Value(ValueError::Frozen { .. }))
    }
}

/// What a rule hands back to the executor.
#[derive(Debug, Clone, Default)]
pub enum RuleOutput {
    /// No contribution.
    #[default]
    Nothing,
    /// Partial result. Only objects are merged; other values are ignored.
    Fragment(Value),
    /// Short-circuit the command with a failure.
    Reject(Failure),
}

impl RuleOutput {
    /// Fragment built from `(key, value)` pairs.
    pub fn fragment<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Fragment(Value::from_entries(entries))
    }
}

impl From<Failure> for RuleOutput {
    fn from(failure: Failure) -> Self {
        Self::Reject(failure)
    }
}

impl From<Value> for RuleOutput {
    fn from(value: Value) -> Self {
        Self::Fragment(value)
    }
}

impl From<ObjectRef> for RuleOutput {
    fn from(obj: ObjectRef) -> Self {
        Self::Fragment(Value::Object(obj))
    }
}

/// Return type of every rule.
pub type RuleResult = Result<RuleOutput, RuleError>;

/// Handles a rule may touch besides its read-only inputs.
///
/// All cross-invocation mutation flows through here: the engine RNG, the
/// invocation's effects buffer, and the engine store.
pub struct RuleContext<'a, S> {
    command: &'a str,
    rng: &'a mut Rng,
    effects: &'a mut EffectsBuffer,
    store: &'a mut S,
}

impl<'a, S> RuleContext<'a, S> {
    pub(crate) fn new(
        command: &'a str,
        rng: &'a mut Rng,
        effects: &'a mut EffectsBuffer,
        store: &'a mut S,
    ) -> Self {
        Self {
            command,
            rng,
            effects,
            store,
        }
    }

    /// Key of the running command.
    pub fn command(&self) -> &str {
        self.command
    }

    /// Engine RNG.
    pub fn rng(&mut self) -> &mut Rng {
        &mut *self.rng
    }

    /// Effects buffer of this invocation.
    pub fn effects(&mut self) -> &mut EffectsBuffer {
        &mut *self.effects
    }

    /// Shorthand for `self.effects().add(..)`.
    pub fn emit(
        &mut self,
        kind: impl Into<String>,
        target: impl Into<String>,
        payload: Option<Value>,
    ) {
        self.effects.add(kind, target, payload);
    }

    /// Engine store.
    pub fn store(&self) -> &S {
        &*self.store
    }

    /// Engine store, mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut *self.store
    }
}

type RuleBody<S> = dyn Fn(&Accumulator, &Value, &mut RuleContext<'_, S>) -> RuleResult;

/// A rule: `(accumulator, params, context) -> output`.
///
/// Rules must not rely on mutating their accumulator argument; the executor
/// treats any such write as an integrity violation.
pub struct Rule<S = MemoryStore> {
    body: Rc<RuleBody<S>>,
}

impl<S> Rule<S> {
    /// Wraps `f` as a rule.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Accumulator, &Value, &mut RuleContext<'_, S>) -> RuleResult + 'static,
    {
        Self { body: Rc::new(f) }
    }

    pub(crate) fn invoke(
        &self,
        acc: &Accumulator,
        params: &Value,
        ctx: &mut RuleContext<'_, S>,
    ) -> RuleResult {
        (self.body)(acc, params, ctx)
    }
}

impl<S> Clone for Rule<S> {
    fn clone(&self) -> Self {
        Self {
            body: Rc::clone(&self.body),
        }
    }
}

impl<S> fmt::Debug for Rule<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").finish_non_exhaustive()
    }
}

/// Immutable, published command: a key plus one ordered rule list per stage.
///
/// Invariant: at least one rule across all stages.
pub struct CommandDescriptor<S = MemoryStore> {
    key: String,
    stages: [Vec<Rule<S>>; 5],
}

impl<S> CommandDescriptor<S> {
    /// Command key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Rules of `stage` in registration order.
    pub fn rules(&self, stage: Stage) -> &[Rule<S>] {
        &self.stages[stage.index()]
    }

    /// Total rule count across every stage.
    pub fn rule_count(&self) -> usize {
        self.stages.iter().map(Vec::len).sum()
    }
}

impl<S> Clone for CommandDescriptor<S> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            stages: self.stages.clone(),
        }
    }
}

impl<S> fmt::Debug for CommandDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("CommandDescriptor");
        dbg.field("key", &self.key);
        for stage in Stage::ALL {
            dbg.field(stage.as_str(), &self.rules(stage).len());
        }
        dbg.finish()
    }
}

/// Starts a [`CommandBuilder`] for `key`.
pub fn command<S>(key: impl Into<String>) -> CommandBuilder<S> {
    CommandBuilder::new(key)
}

/// Fluent authoring surface.
///
/// Stages accumulate privately; nothing is visible to a registry until
/// [`CommandBuilder::build`] or [`CommandBuilder::register`] publishes one
/// immutable descriptor.
///
/// ```
/// use stagecraft_core::{command, Registry, RuleOutput, Value};
///
/// let mut registry: Registry = Registry::new();
/// command("add")
///     .calc(|_, _, _| Ok(RuleOutput::fragment([("value", Value::from(1))])))
///     .register(&mut registry)
///     .expect("fresh registry");
/// assert!(registry.contains("add"));
/// ```
pub struct CommandBuilder<S = MemoryStore> {
    key: String,
    stages: [Vec<Rule<S>>; 5],
}

impl<S> CommandBuilder<S> {
    /// New builder with no rules.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            stages: Default::default(),
        }
    }

    /// Appends `f` to `stage`.
    pub fn rule<F>(mut self, stage: Stage, f: F) -> Self
    where
        F: Fn(&Accumulator, &Value, &mut RuleContext<'_, S>) -> RuleResult + 'static,
    {
        self.stages[stage.index()].push(Rule::new(f));
        self
    }

    /// Appends a validate rule.
    pub fn validate<F>(self, f: F) -> Self
    where
        F: Fn(&Accumulator, &Value, &mut RuleContext<'_, S>) -> RuleResult + 'static,
    {
        self.rule(Stage::Validate, f)
    }

    /// Appends a load rule.
    pub fn load<F>(self, f: F) -> Self
    where
        F: Fn(&Accumulator, &Value, &mut RuleContext<'_, S>) -> RuleResult + 'static,
    {
        self.rule(Stage::Load, f)
    }

    /// Appends a calc rule.
    pub fn calc<F>(self, f: F) -> Self
    where
        F: Fn(&Accumulator, &Value, &mut RuleContext<'_, S>) -> RuleResult + 'static,
    {
        self.rule(Stage::Calc, f)
    }

    /// Appends a mutate rule.
    pub fn mutate<F>(self, f: F) -> Self
    where
        F: Fn(&Accumulator, &Value, &mut RuleContext<'_, S>) -> RuleResult + 'static,
    {
        self.rule(Stage::Mutate, f)
    }

    /// Appends an emit rule.
    pub fn emit<F>(self, f: F) -> Self
    where
        F: Fn(&Accumulator, &Value, &mut RuleContext<'_, S>) -> RuleResult + 'static,
    {
        self.rule(Stage::Emit, f)
    }

    /// Publishes the descriptor.
    ///
    /// # Errors
    /// [`RegistryError::EmptyCommand`] when no rule was added.
    pub fn build(self) -> Result<CommandDescriptor<S>, RegistryError> {
        let descriptor = CommandDescriptor {
            key: self.key,
            stages: self.stages,
        };
        if descriptor.rule_count() == 0 {
            return Err(RegistryError::EmptyCommand(descriptor.key));
        }
        Ok(descriptor)
    }

    /// Publishes the descriptor into `registry`.
    ///
    /// # Errors
    /// [`RegistryError::EmptyCommand`] or [`RegistryError::DuplicateCommand`].
    pub fn register(self, registry: &mut Registry<S>) -> Result<(), RegistryError> {
        registry.register(self.build()?)
    }
}
