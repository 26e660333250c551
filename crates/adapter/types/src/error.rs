//! Errors raised by bound origin accessors.

use thiserror::Error;

/// Failure while reading, writing or invoking a member of an origin instance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccessError {
    /// The accessor was handed an instance of a different concrete type.
    #[error("Instance mismatch: accessor for '{expected}' received a different type")]
    InstanceMismatch { expected: String },

    /// The field exists but cannot be written.
    #[error("Field '{field}' on '{origin}' is read-only")]
    ReadOnly { origin: String, field: String },

    /// The member does not exist on the instance.
    #[error("Member '{member}' not found on '{origin}'")]
    NoSuchMember { origin: String, member: String },

    /// A written or passed value does not fit the declared type.
    #[error("Type mismatch on '{member}': expected {expected}, found {found}")]
    TypeMismatch {
        member: String,
        expected: String,
        found: String,
    },

    /// The origin member itself reported a failure.
    #[error("Invocation of '{member}' failed: {message}")]
    Failed { member: String, message: String },
}

impl AccessError {
    /// Convenience constructor for member-reported failures.
    pub fn failed(member: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            member: member.into(),
            message: message.into(),
        }
    }
}

/// Result type for accessor calls.
pub type AccessResult<T> = Result<T, AccessError>;
