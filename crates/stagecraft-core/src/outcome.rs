// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Command outcomes and failure taxonomy.
use std::fmt;

use crate::accumulator::Accumulator;
use crate::effects::Effect;

/// Engine-failure codes: structural or programmer-level execution errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCode {
    /// No command is registered under the requested key.
    UnknownCommand,
    /// Params were rejected before any domain logic ran.
    ParamInvalid,
    /// A rule raised an error or panicked.
    RuleException,
    /// Two fragments in one invocation produced the same key.
    DuplicateResultKey,
    /// A rule wrote to the frozen accumulator.
    IntegrityMutation,
}

impl FailureCode {
    /// Stable machine-readable code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownCommand => "UNKNOWN_COMMAND",
            Self::ParamInvalid => "PARAM_INVALID",
            Self::RuleException => "RULE_EXCEPTION",
            Self::DuplicateResultKey => "DUPLICATE_RESULT_KEY",
            Self::IntegrityMutation => "INTEGRITY_MUTATION",
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure returned by a rule to short-circuit its command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Expected business rejection with a caller-defined code.
    Domain {
        /// Caller-defined code.
        code: String,
        /// Diagnostic text.
        message: Option<String>,
    },
    /// Structural failure.
    Engine {
        /// Engine code.
        code: FailureCode,
        /// Diagnostic text.
        message: Option<String>,
    },
}

impl Failure {
    /// Domain failure without a message.
    pub fn domain(code: impl Into<String>) -> Self {
        Self::Domain {
            code: code.into(),
            message: None,
        }
    }

    /// Engine failure without a message.
    pub fn engine(code: FailureCode) -> Self {
        Self::Engine {
            code,
            message: None,
        }
    }

    /// Shorthand for a `PARAM_INVALID` engine failure.
    pub fn param_invalid(message: impl Into<String>) -> Self {
        Self::engine(FailureCode::ParamInvalid).with_message(message)
    }

    /// Attaches a diagnostic message.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        let message = Some(message.into());
        match self {
            Self::Domain { code, .. } => Self::Domain { code, message },
            Self::Engine { code, .. } => Self::Engine { code, message },
        }
    }
}

/// Result of one command invocation.
///
/// Domain failures never carry effects. Engine failures produced by the
/// executor carry none either; the field exists so the three variants share
/// one shape.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    /// Every stage completed.
    Success {
        /// Final frozen accumulator.
        data: Accumulator,
        /// Effects in emission order.
        effects: Vec<Effect>,
    },
    /// A rule rejected the command for a business reason.
    DomainFailure {
        /// Caller-defined code.
        code: String,
        /// Diagnostic text.
        message: Option<String>,
    },
    /// The command failed structurally.
    EngineFailure {
        /// Engine code.
        code: FailureCode,
        /// Diagnostic text.
        message: Option<String>,
        /// Surfaced effects (empty when produced by the executor).
        effects: Vec<Effect>,
    },
}

impl CommandOutcome {
    pub(crate) fn engine(code: FailureCode, message: impl Into<String>) -> Self {
        Self::EngineFailure {
            code,
            message: Some(message.into()),
            effects: Vec::new(),
        }
    }

    /// Returns true for [`CommandOutcome::Success`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Machine-readable code; `None` on success.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::DomainFailure { code, .. } => Some(code),
            Self::EngineFailure { code, .. } => Some(code.as_str()),
        }
    }

    /// Engine code when this is an engine failure.
    pub fn engine_code(&self) -> Option<FailureCode> {
        match self {
            Self::EngineFailure { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Diagnostic message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::DomainFailure { message, .. } | Self::EngineFailure { message, .. } => {
                message.as_deref()
            }
        }
    }

    /// Accumulator on success.
    pub fn data(&self) -> Option<&Accumulator> {
        match self {
            Self::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Effects carried by the outcome.
    pub fn effects(&self) -> &[Effect] {
        match self {
            Self::Success { effects, .. } | Self::EngineFailure { effects, .. } => effects,
            Self::DomainFailure { .. } => &[],
        }
    }

    /// Discriminant string: `"success"`, `"domain-failure"` or `"engine-failure"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::DomainFailure { .. } => "domain-failure",
            Self::EngineFailure { .. } => "engine-failure",
        }
    }
}

impl From<Failure> for CommandOutcome {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Domain { code, message } => Self::DomainFailure { code, message },
            Failure::Engine { code, message } => Self::EngineFailure {
                code,
                message,
                effects: Vec::new(),
            },
        }
    }
}
