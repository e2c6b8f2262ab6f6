//! Definition-time errors.

use thiserror::Error;

/// Errors raised while building a machine definition.
///
/// Every name a definition references (states, guards, delays, actions,
/// activities) is validated when the definition is built, never deferred
/// to runtime.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("initial state '{0}' is not defined")]
    UnknownInitialState(String),

    #[error("state '{name}' is defined more than once")]
    DuplicateState { name: String },

    #[error("transition in state '{state}' targets unknown state '{target}'")]
    UnknownTarget { state: String, target: String },

    #[error("guard '{0}' is not registered")]
    UnknownGuard(String),

    #[error("delay '{0}' is not registered")]
    UnknownDelay(String),

    #[error("action '{0}' is not registered")]
    UnknownAction(String),

    #[error("activity '{0}' is not registered")]
    UnknownActivity(String),

    #[error("final state '{0}' must not declare transitions, timers, or activities")]
    FinalStateWithTransitions(String),

    #[error("transient state '{0}' must declare at least one 'always' candidate")]
    TransientWithoutAlways(String),

    #[error("state '{0}' declares 'always' candidates but is not transient")]
    AlwaysOnNonTransient(String),

    #[error("context defaults must be a JSON object")]
    ContextNotAnObject,
}
