//! Declarative state and transition specifications.

use std::collections::HashMap;

use crate::core::GuardExpr;

/// How a state behaves once entered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StateType {
    /// Ordinary state.
    #[default]
    Normal,
    /// Immediately re-resolves its `always` candidates on entry, before
    /// control returns to the caller. Used to force a clean re-arm of
    /// timers by routing through an intermediate state.
    Transient,
    /// Terminal. No transitions out of it are ever considered.
    Final,
}

/// Policy for a recurring timer whose guard evaluates false at a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecurrencePolicy {
    /// Skip this tick but keep the recurrence armed; the guard is
    /// re-checked on the next tick.
    #[default]
    Skip,
    /// Cancel the recurrence until the state is entered again.
    Cancel,
}

/// A delay, either a literal duration in milliseconds or a reference to a
/// delay function registered on the machine definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DelayRef {
    /// Literal duration in milliseconds.
    Millis(u64),
    /// Named delay function, resolved against the context at arm time.
    Named(String),
}

impl From<u64> for DelayRef {
    fn from(ms: u64) -> Self {
        DelayRef::Millis(ms)
    }
}

impl From<&str> for DelayRef {
    fn from(name: &str) -> Self {
        DelayRef::Named(name.to_string())
    }
}

impl From<String> for DelayRef {
    fn from(name: String) -> Self {
        DelayRef::Named(name)
    }
}

/// One candidate rule mapping an event to a target state and action list.
///
/// A spec without a `target` is an internal transition: its actions run but
/// no exit/entry cycle happens and the current state is unchanged.
#[derive(Clone, Debug, Default)]
pub struct TransitionSpec {
    /// Optional eligibility guard.
    pub guard: Option<GuardExpr>,
    /// Target state name; `None` means internal.
    pub target: Option<String>,
    /// Action names to run, in order.
    pub actions: Vec<String>,
}

/// A one-shot timed transition, armed on state entry and canceled by exit.
#[derive(Clone, Debug)]
pub struct AfterSpec {
    pub delay: DelayRef,
    pub transition: TransitionSpec,
}

/// A recurring timed action, re-armed after each firing while the state is
/// current. Each firing independently re-checks the guard.
#[derive(Clone, Debug)]
pub struct EverySpec {
    pub delay: DelayRef,
    pub guard: Option<GuardExpr>,
    pub actions: Vec<String>,
    pub policy: RecurrencePolicy,
}

/// The compiled definition of a single state.
#[derive(Clone, Debug, Default)]
pub struct StateDef {
    /// Action names run on entry, in order.
    pub entry: Vec<String>,
    /// Action names run on exit, in order.
    pub exit: Vec<String>,
    /// Activities kept running while this state is current.
    pub activities: Vec<String>,
    /// Event handlers; candidates per event are tried in declaration order.
    pub on: HashMap<String, Vec<TransitionSpec>>,
    /// One-shot timed transitions.
    pub after: Vec<AfterSpec>,
    /// Recurring timed actions.
    pub every: Vec<EverySpec>,
    /// Transient escape candidates, tried in declaration order on entry.
    pub always: Vec<TransitionSpec>,
    /// Behavior kind.
    pub kind: StateType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_ref_builds_from_literals_and_names() {
        assert_eq!(DelayRef::from(1000), DelayRef::Millis(1000));
        assert_eq!(
            DelayRef::from("VISIBLE_DURATION"),
            DelayRef::Named("VISIBLE_DURATION".into())
        );
    }

    #[test]
    fn defaults_are_normal_and_skip() {
        assert_eq!(StateType::default(), StateType::Normal);
        assert_eq!(RecurrencePolicy::default(), RecurrencePolicy::Skip);
        assert_eq!(StateDef::default().kind, StateType::Normal);
    }

    #[test]
    fn default_transition_is_internal() {
        let spec = TransitionSpec::default();
        assert!(spec.target.is_none());
        assert!(spec.guard.is_none());
        assert!(spec.actions.is_empty());
    }
}
