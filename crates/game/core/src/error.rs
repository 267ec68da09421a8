//! Common error infrastructure for game-core.
//!
//! Domain-specific errors (`WorldError`, `ConfigError`) live next to the code
//! that raises them. They share the [`GameError`] trait so callers can classify
//! failures without matching on every variant.
//!
//! Errors come from invalid construction and from requests a caller makes
//! against the wrong entity. Inside a tick, out-of-range numbers are clamped
//! and stale entity references are no-ops.

/// How a caller should treat an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// A request against a stale or unsuitable entity; the world is fine and
    /// the caller may retry with another target.
    Recoverable,
    /// Invalid configuration or content, rejected at construction.
    Validation,
}

impl ErrorSeverity {
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all game-core errors.
///
/// Implementors return a stable `error_code` per variant so tests and logs
/// can match on it.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
