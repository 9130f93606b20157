// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Explicit command table.
use indexmap::IndexMap;
use thiserror::Error;

use crate::command::CommandDescriptor;
use crate::store::MemoryStore;

/// Errors raised while publishing commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A command with the same key is already registered.
    #[error("duplicate command key: {0}")]
    DuplicateCommand(String),
    /// The command has no rules in any stage.
    #[error("command has no rules: {0}")]
    EmptyCommand(String),
}

/// In-memory table of published commands, keyed by command key.
///
/// Registries are plain values: build one per engine configuration and lend
/// it to each [`crate::Engine`] that should see those commands.
pub struct Registry<S = MemoryStore> {
    commands: IndexMap<String, CommandDescriptor<S>>,
}

impl<S> Registry<S> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            commands: IndexMap::new(),
        }
    }

    /// Publishes `descriptor`.
    ///
    /// Descriptors only come out of [`crate::CommandBuilder::build`], so every
    /// one already has at least one rule.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateCommand`] if the key is taken.
    pub fn register(&mut self, descriptor: CommandDescriptor<S>) -> Result<(), RegistryError> {
        if self.commands.contains_key(descriptor.key()) {
            return Err(RegistryError::DuplicateCommand(descriptor.key().to_owned()));
        }
        tracing::debug!(
            command = descriptor.key(),
            rules = descriptor.rule_count(),
            "command registered"
        );
        self.commands.insert(descriptor.key().to_owned(), descriptor);
        Ok(())
    }

    /// Looks up a command.
    pub fn get(&self, key: &str) -> Option<&CommandDescriptor<S>> {
        self.commands.get(key)
    }

    /// Returns true when `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.commands.contains_key(key)
    }

    /// Descriptors in registration order.
    pub fn list(&self) -> impl Iterator<Item = &CommandDescriptor<S>> {
        self.commands.values()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Removes every command.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> std::fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.commands.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{command, RuleOutput};

    fn noop(key: &str) -> CommandDescriptor {
        let built = command(key)
            .calc(|_, _, _| Ok(RuleOutput::Nothing))
            .build();
        let Ok(descriptor) = built else {
            unreachable!("builder has a rule");
        };
        descriptor
    }

    #[test]
    fn list_follows_registration_order() {
        let mut registry: Registry = Registry::new();
        for key in ["zeta", "alpha", "mid"] {
            assert!(registry.register(noop(key)).is_ok());
        }
        let keys: Vec<&str> = registry.list().map(CommandDescriptor::key).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut registry: Registry = Registry::new();
        assert!(registry.register(noop("dup")).is_ok());
        assert_eq!(
            registry.register(noop("dup")),
            Err(RegistryError::DuplicateCommand("dup".to_owned()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clear_empties_the_table() {
        let mut registry: Registry = Registry::new();
        assert!(registry.register(noop("a")).is_ok());
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.get("a").is_none());
    }

    #[test]
    fn empty_builder_never_reaches_the_table() {
        let mut registry: Registry = Registry::new();
        assert_eq!(
            command("hollow").register(&mut registry),
            Err(RegistryError::EmptyCommand("hollow".to_owned()))
        );
        assert!(registry.is_empty());
    }
}
