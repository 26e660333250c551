//! Engine error types.
//!
//! Three classes, matching when a problem can be detected:
//! - [`ConfigError`]: while assembling descriptors and the factory, before
//!   any origin type is known
//! - [`SynthesisError`]: while compiling one origin type; aborts that type only
//! - [`AdaptError`]: while constructing or calling a wrapper

use adapter_types::{AccessError, ValueType};
use thiserror::Error;

/// Programming mistakes in the adapter configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A mandatory descriptor field was never set.
    #[error("Descriptor '{descriptor}' is missing required field: {field}")]
    MissingField { descriptor: String, field: String },

    /// A descriptor targets an operation the contract does not declare.
    #[error("Contract '{contract}' has no operation '{operation}'")]
    UnknownOperation { contract: String, operation: String },

    /// A contract operation has no descriptor.
    #[error("Operation '{operation}' of contract '{contract}' has no descriptor")]
    UncoveredOperation { contract: String, operation: String },

    /// Two descriptors target the same operation.
    #[error("Operation '{operation}' has more than one descriptor")]
    DuplicateDescriptor { operation: String },

    /// The contract declares an operation name twice.
    #[error("Contract '{contract}' declares operation '{operation}' more than once")]
    DuplicateOperation { contract: String, operation: String },

    /// A parameter source routes a wrapper argument the operation does not take.
    #[error("Descriptor '{descriptor}' routes wrapper argument {index}, but the operation takes {arity}")]
    ArgumentOutOfRange {
        descriptor: String,
        index: usize,
        arity: usize,
    },

    /// A default value does not fit the operation's result type.
    #[error("Default value for '{descriptor}' has type {found}, operation returns {expected}")]
    DefaultTypeMismatch {
        descriptor: String,
        expected: ValueType,
        found: ValueType,
    },

    /// Factory configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failures compiling a specific origin type.
///
/// Every variant names the origin type, the target operation, and what was
/// missing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthesisError {
    /// No translator converts between the two declared types.
    #[error("No suitable translator found: '{origin}' operation '{operation}' needs {from} -> {to} for {member}")]
    NoSuitableTranslatorFound {
        origin: String,
        operation: String,
        member: String,
        from: ValueType,
        to: ValueType,
    },

    /// A Singleton matched nothing and has no default.
    #[error("No member of '{origin}' matches {criterion} for operation '{operation}' and no default is configured")]
    MissingMember {
        origin: String,
        operation: String,
        criterion: String,
    },

    /// A selected member cannot serve the operation.
    #[error("Member '{member}' of '{origin}' cannot serve operation '{operation}': {reason}")]
    AlienMember {
        origin: String,
        operation: String,
        member: String,
        reason: String,
    },

    /// Several members matched a Singleton under the rejecting ambiguity policy.
    #[error("Operation '{operation}' is ambiguous on '{origin}': candidates {candidates:?}")]
    AmbiguousMember {
        origin: String,
        operation: String,
        candidates: Vec<String>,
    },

    /// Two members map to the same key under the rejecting duplicate-key policy.
    #[error("Operation '{operation}' on '{origin}' has duplicate key '{key}'")]
    DuplicateMapKey {
        origin: String,
        operation: String,
        key: String,
    },

    /// A Map member yielded no key.
    #[error("Member '{member}' of '{origin}' yields no key for operation '{operation}'")]
    MissingMapKey {
        origin: String,
        operation: String,
        member: String,
    },

    /// A required origin parameter received no wrapper argument.
    #[error("Parameter '{parameter}' of '{origin}.{member}' is not bound by operation '{operation}'")]
    UnboundParameter {
        origin: String,
        operation: String,
        member: String,
        parameter: String,
    },
}

impl SynthesisError {
    /// Name of the origin type the failure belongs to.
    pub fn origin(&self) -> &str {
        match self {
            Self::NoSuitableTranslatorFound { origin, .. }
            | Self::MissingMember { origin, .. }
            | Self::AlienMember { origin, .. }
            | Self::AmbiguousMember { origin, .. }
            | Self::DuplicateMapKey { origin, .. }
            | Self::MissingMapKey { origin, .. }
            | Self::UnboundParameter { origin, .. } => origin,
        }
    }

    /// Name of the contract operation the failure belongs to.
    pub fn operation(&self) -> &str {
        match self {
            Self::NoSuitableTranslatorFound { operation, .. }
            | Self::MissingMember { operation, .. }
            | Self::AlienMember { operation, .. }
            | Self::AmbiguousMember { operation, .. }
            | Self::DuplicateMapKey { operation, .. }
            | Self::MissingMapKey { operation, .. }
            | Self::UnboundParameter { operation, .. } => operation,
        }
    }
}

/// Raised by a translator function at call time.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Translation failed: {message}")]
pub struct TranslationError {
    pub message: String,
}

impl TranslationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The translator received a value of an unexpected type.
    pub fn unexpected(expected: &ValueType, found: &adapter_types::Value) -> Self {
        Self::new(format!(
            "expected {}, found {} ({})",
            expected,
            found.value_type(),
            found
        ))
    }
}

/// Failures constructing or calling a wrapper.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdaptError {
    /// The contract has no such operation.
    #[error("Contract '{contract}' has no operation '{operation}'")]
    UnknownOperation { contract: String, operation: String },

    /// Wrong number of wrapper arguments.
    #[error("Operation '{operation}' takes {expected} argument(s), got {found}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        found: usize,
    },

    /// The call shape does not match the operation's cardinality.
    #[error("Operation '{operation}' is {actual}, not {expected}")]
    CardinalityMismatch {
        operation: String,
        expected: String,
        actual: String,
    },

    /// A translator rejected a value.
    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// The origin accessor failed.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Adapting an instance required compiling its type, which failed.
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for synthesis.
pub type SynthesisResult<T> = Result<T, SynthesisError>;

/// Result type for wrapper construction and calls.
pub type AdaptResult<T> = Result<T, AdaptError>;

/// Result type for translator functions.
pub type TranslationResult<T> = Result<T, TranslationError>;

/// Location of a compilation step, used to build descriptive synthesis errors.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Site<'a> {
    pub origin: &'a str,
    pub operation: &'a str,
}

impl Site<'_> {
    pub fn no_translator(&self, member: &str, from: &ValueType, to: &ValueType) -> SynthesisError {
        SynthesisError::NoSuitableTranslatorFound {
            origin: self.origin.to_string(),
            operation: self.operation.to_string(),
            member: member.to_string(),
            from: from.clone(),
            to: to.clone(),
        }
    }

    pub fn alien(&self, member: &str, reason: impl Into<String>) -> SynthesisError {
        SynthesisError::AlienMember {
            origin: self.origin.to_string(),
            operation: self.operation.to_string(),
            member: member.to_string(),
            reason: reason.into(),
        }
    }
}
