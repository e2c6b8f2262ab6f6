//! Runtime errors.

use thiserror::Error;

/// Bound on synchronous transient-state cascading. A definition whose
/// transient states cycle with no escaping guard hits this instead of
/// looping forever.
pub const TRANSIENT_CASCADE_LIMIT: usize = 64;

/// Errors raised by interpreter lifecycle operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterpreterError {
    #[error("interpreter has not been started")]
    NotStarted,

    #[error("interpreter is already running")]
    AlreadyStarted,

    #[error("interpreter has been stopped")]
    Stopped,

    #[error("transient cascade exceeded {limit} levels entering state '{state}'")]
    RecursionLimitExceeded { state: String, limit: usize },
}
