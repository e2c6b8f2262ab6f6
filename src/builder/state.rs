//! Builders for states, transitions, and recurring timers.

use crate::core::GuardExpr;
use crate::machine::state::{
    AfterSpec, DelayRef, EverySpec, RecurrencePolicy, StateDef, StateType, TransitionSpec,
};

/// Builder for one candidate transition.
///
/// # Example
///
/// ```rust
/// use uimachines::{TransitionBuilder, guards::not};
///
/// // Guarded transition with an action.
/// let resume = TransitionBuilder::to("active").guard(not("isLoadingType"));
///
/// // Internal transition: actions run, state does not change.
/// let update = TransitionBuilder::internal().action("setContext");
/// ```
#[derive(Clone, Debug, Default)]
pub struct TransitionBuilder {
    spec: TransitionSpec,
}

impl TransitionBuilder {
    /// Transition to a target state.
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            spec: TransitionSpec {
                target: Some(target.into()),
                ..TransitionSpec::default()
            },
        }
    }

    /// Internal transition: no state change, actions still run.
    pub fn internal() -> Self {
        Self::default()
    }

    /// Attach an eligibility guard.
    pub fn guard(mut self, guard: impl Into<GuardExpr>) -> Self {
        self.spec.guard = Some(guard.into());
        self
    }

    /// Append an action to run when this transition is taken.
    pub fn action(mut self, name: impl Into<String>) -> Self {
        self.spec.actions.push(name.into());
        self
    }

    /// Append several actions, kept in order.
    pub fn actions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.actions.extend(names.into_iter().map(Into::into));
        self
    }

    pub(crate) fn into_spec(self) -> TransitionSpec {
        self.spec
    }
}

impl From<&str> for TransitionBuilder {
    /// A bare string is shorthand for an unguarded transition to that state.
    fn from(target: &str) -> Self {
        TransitionBuilder::to(target)
    }
}

/// Builder for a recurring timed action.
///
/// # Example
///
/// ```rust
/// use uimachines::{EveryBuilder, guards::not};
///
/// let progress = EveryBuilder::new("PROGRESS_INTERVAL")
///     .guard(not("isLoadingType"))
///     .action("setProgressValue");
/// ```
#[derive(Clone, Debug)]
pub struct EveryBuilder {
    spec: EverySpec,
}

impl EveryBuilder {
    /// Recur on the given delay (literal milliseconds or a registered delay
    /// name).
    pub fn new(delay: impl Into<DelayRef>) -> Self {
        Self {
            spec: EverySpec {
                delay: delay.into(),
                guard: None,
                actions: Vec::new(),
                policy: RecurrencePolicy::default(),
            },
        }
    }

    /// Re-checked independently at every tick.
    pub fn guard(mut self, guard: impl Into<GuardExpr>) -> Self {
        self.spec.guard = Some(guard.into());
        self
    }

    /// Append an action to run at each passing tick.
    pub fn action(mut self, name: impl Into<String>) -> Self {
        self.spec.actions.push(name.into());
        self
    }

    /// What a failing guard does to the recurrence (default: skip the tick,
    /// keep recurring).
    pub fn policy(mut self, policy: RecurrencePolicy) -> Self {
        self.spec.policy = policy;
        self
    }

    pub(crate) fn into_spec(self) -> EverySpec {
        self.spec
    }
}

/// Builder for one state definition.
///
/// # Example
///
/// ```rust
/// use uimachines::{EveryBuilder, StateBuilder, TransitionBuilder, guards::not};
///
/// let active = StateBuilder::new()
///     .activity("trackDocumentVisibility")
///     .after("VISIBLE_DURATION", "dismissing")
///     .every(EveryBuilder::new(10).action("setProgressValue"))
///     .on("DISMISS", "dismissing")
///     .on("PAUSE", TransitionBuilder::to("visible").action("setDurationToProgress"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct StateBuilder {
    def: StateDef,
}

impl StateBuilder {
    /// An ordinary state.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transient state: resolves its `always` candidates immediately on
    /// entry.
    pub fn transient() -> Self {
        Self {
            def: StateDef {
                kind: StateType::Transient,
                ..StateDef::default()
            },
        }
    }

    /// A final state: terminal, no outgoing transitions.
    pub fn final_state() -> Self {
        Self {
            def: StateDef {
                kind: StateType::Final,
                ..StateDef::default()
            },
        }
    }

    /// Append an entry action.
    pub fn entry(mut self, name: impl Into<String>) -> Self {
        self.def.entry.push(name.into());
        self
    }

    /// Append an exit action.
    pub fn exit(mut self, name: impl Into<String>) -> Self {
        self.def.exit.push(name.into());
        self
    }

    /// Keep an activity running while this state is current.
    pub fn activity(mut self, name: impl Into<String>) -> Self {
        self.def.activities.push(name.into());
        self
    }

    /// Add a candidate transition for an event. Calling `on` repeatedly
    /// with the same event appends candidates in declaration order.
    pub fn on(mut self, event: impl Into<String>, transition: impl Into<TransitionBuilder>) -> Self {
        self.def
            .on
            .entry(event.into())
            .or_default()
            .push(transition.into().into_spec());
        self
    }

    /// Arm a one-shot timed transition on entry; canceled by exit.
    pub fn after(
        mut self,
        delay: impl Into<DelayRef>,
        transition: impl Into<TransitionBuilder>,
    ) -> Self {
        self.def.after.push(AfterSpec {
            delay: delay.into(),
            transition: transition.into().into_spec(),
        });
        self
    }

    /// Arm a recurring timed action on entry; canceled by exit.
    pub fn every(mut self, every: EveryBuilder) -> Self {
        self.def.every.push(every.into_spec());
        self
    }

    /// Add a transient escape candidate, tried in declaration order on
    /// entry. Only valid on transient states.
    pub fn always(mut self, transition: impl Into<TransitionBuilder>) -> Self {
        self.def.always.push(transition.into().into_spec());
        self
    }

    pub(crate) fn into_def(self) -> StateDef {
        self.def
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_string_is_an_unguarded_transition() {
        let state = StateBuilder::new().on("DISMISS", "dismissing").into_def();
        let candidates = &state.on["DISMISS"];
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].target.as_deref(), Some("dismissing"));
        assert!(candidates[0].guard.is_none());
    }

    #[test]
    fn repeated_on_keeps_declaration_order() {
        let state = StateBuilder::new()
            .on("UPDATE", TransitionBuilder::to("visible").action("first"))
            .on("UPDATE", TransitionBuilder::to("active").action("second"))
            .on("UPDATE", TransitionBuilder::internal().action("third"))
            .into_def();

        let candidates = &state.on["UPDATE"];
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].actions, vec!["first"]);
        assert_eq!(candidates[1].actions, vec!["second"]);
        assert_eq!(candidates[2].actions, vec!["third"]);
        assert!(candidates[2].target.is_none());
    }

    #[test]
    fn state_kinds_are_recorded() {
        assert_eq!(StateBuilder::new().into_def().kind, StateType::Normal);
        assert_eq!(StateBuilder::transient().into_def().kind, StateType::Transient);
        assert_eq!(StateBuilder::final_state().into_def().kind, StateType::Final);
    }

    #[test]
    fn after_and_every_record_delays() {
        let state = StateBuilder::new()
            .after(1000, "inactive")
            .every(EveryBuilder::new("PROGRESS_INTERVAL").action("tick"))
            .into_def();

        assert_eq!(state.after[0].delay, DelayRef::Millis(1000));
        assert_eq!(
            state.every[0].delay,
            DelayRef::Named("PROGRESS_INTERVAL".into())
        );
        assert_eq!(state.every[0].policy, RecurrencePolicy::Skip);
    }

    #[test]
    fn entry_exit_actions_keep_order() {
        let state = StateBuilder::new()
            .entry("a")
            .entry("b")
            .exit("c")
            .into_def();

        assert_eq!(state.entry, vec!["a", "b"]);
        assert_eq!(state.exit, vec!["c"]);
    }
}
