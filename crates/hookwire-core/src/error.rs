//! Unified error types for the hookwire core.
//!
//! - [`WiringError`] - a single resolution failure (one producer, consumer or locator)
//! - [`DispatcherError`] - the typed error raised when strict mode aborts construction
//! - [`MemberError`] - attach/detach failures reported by event members

use std::fmt;

use thiserror::Error;

// =============================================================================
// Roles
// =============================================================================

/// The side of a wiring declaration a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The type/event pair that raises an event.
    Producer,
    /// The type/method pair that handles an event.
    Consumer,
    /// The configured fallback instance locator.
    Locator,
}

impl Role {
    /// Returns the lowercase role name used in log and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Producer => "producer",
            Self::Consumer => "consumer",
            Self::Locator => "locator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Wiring Errors
// =============================================================================

/// Errors produced while resolving a wiring declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WiringError {
    /// The qualified type name is not known to the registry.
    #[error("cannot find {role} type '{type_name}'")]
    TypeNotFound {
        /// Which side of the declaration failed.
        role: Role,
        /// The qualified type name that was looked up.
        type_name: String,
    },

    /// The type exists but has no visible member with the given name.
    #[error("{role} member '{type_name}.{member}' cannot be loaded")]
    MemberNotFound {
        /// Which side of the declaration failed.
        role: Role,
        /// The qualified type name.
        type_name: String,
        /// The member name that was looked up.
        member: String,
    },

    /// `findInstance` was requested but no resolver is available.
    #[error(
        "{role} type '{type_name}' has findInstance set to true, however no resolver was passed \
         and no locator was configured or it could not be loaded"
    )]
    ResolverMissing {
        /// Which side of the declaration failed.
        role: Role,
        /// The qualified type name.
        type_name: String,
    },

    /// A static member was declared with `findInstance = true`.
    #[error(
        "{role} '{type_name}.{member}' is configured incorrectly: if the member is static, \
         findInstance must be false"
    )]
    StaticInstanceMismatch {
        /// Which side of the declaration failed.
        role: Role,
        /// The qualified type name.
        type_name: String,
        /// The static member name.
        member: String,
    },

    /// The consumer handler cannot be adapted to the producer's handler shape.
    #[error("cannot bind '{consumer}' to '{producer}': {reason}")]
    SignatureIncompatible {
        /// `type.event` of the producer.
        producer: String,
        /// `type.method` of the consumer.
        consumer: String,
        /// Why the adaptation failed.
        reason: String,
    },

    /// The configured locator cannot be turned into a resolver.
    #[error("cannot use locator '{type_name}.{method_name}': {reason}")]
    LocatorMisconfigured {
        /// The locator's qualified type name.
        type_name: String,
        /// The locator's function name.
        method_name: String,
        /// Why the locator was rejected.
        reason: String,
    },

    /// Two declarations share the same natural key.
    #[error("duplicate {role} wiring key '{key}'")]
    DuplicateWiringKey {
        /// Whether the duplicate is an event (producer) or a consumer.
        role: Role,
        /// The duplicated `type.member` key.
        key: String,
    },
}

impl WiringError {
    /// Returns the short kind name of this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TypeNotFound { .. } => "TypeNotFound",
            Self::MemberNotFound { .. } => "MemberNotFound",
            Self::ResolverMissing { .. } => "ResolverMissing",
            Self::StaticInstanceMismatch { .. } => "StaticInstanceMismatch",
            Self::SignatureIncompatible { .. } => "SignatureIncompatible",
            Self::LocatorMisconfigured { .. } => "LocatorMisconfigured",
            Self::DuplicateWiringKey { .. } => "DuplicateWiringKey",
        }
    }

    /// Returns `true` for problems that are reported at warn level.
    ///
    /// Locator problems and duplicate declarations degrade the wiring but are
    /// not resolution failures of a specific member.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::LocatorMisconfigured { .. } | Self::DuplicateWiringKey { .. }
        )
    }

    pub(crate) fn locator(
        type_name: impl Into<String>,
        method_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::LocatorMisconfigured {
            type_name: type_name.into(),
            method_name: method_name.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Dispatcher Error
// =============================================================================

/// The single typed error raised when strict mode aborts dispatcher construction.
///
/// Carries a human-readable description of the offending producer, consumer
/// or locator together with the underlying [`WiringError`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DispatcherError {
    message: String,
    #[source]
    cause: WiringError,
}

impl DispatcherError {
    /// Creates a dispatcher error wrapping the given cause.
    pub fn new(message: impl Into<String>, cause: WiringError) -> Self {
        Self {
            message: message.into(),
            cause,
        }
    }

    /// Returns the human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the resolution failure that triggered this error.
    pub fn cause(&self) -> &WiringError {
        &self.cause
    }
}

// =============================================================================
// Member Errors
// =============================================================================

/// Errors raised by an event member while subscribing or unsubscribing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemberError {
    /// An instance event was accessed without a producer instance.
    #[error("event '{member}' requires an instance but none was resolved")]
    InstanceRequired {
        /// `type.event` of the member.
        member: String,
    },

    /// The producer instance is not of the declaring type.
    #[error("instance passed to '{member}' is not a '{expected}'")]
    InstanceMismatch {
        /// `type.event` of the member.
        member: String,
        /// The qualified name of the declaring type.
        expected: String,
    },
}

/// Result type for resolution steps.
pub type WiringResult<T> = Result<T, WiringError>;

/// Result type for dispatcher construction.
pub type DispatcherResult<T> = Result<T, DispatcherError>;
