//! The static machine definition: states, transitions, and the registries
//! behavior is dispatched through.
//!
//! A [`MachineDefinition`] is compiled once by the
//! [builder](crate::builder), is immutable afterwards, and is safely shared
//! (behind an `Arc`) by any number of interpreter instances.

pub mod error;
pub mod state;

pub use error::DefinitionError;
pub use state::{AfterSpec, DelayRef, EverySpec, RecurrencePolicy, StateDef, StateType, TransitionSpec};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::{Context, Event, EventSender, GuardFn};

/// Signature of an action: mutates the context and may request effects
/// (events to self or parent) through [`Effects`].
pub type ActionFn = dyn Fn(&mut Context, &Event, &mut Effects) + Send + Sync;

/// Signature of a delay function: resolves a duration in milliseconds from
/// the context at arm time.
pub type DelayFn = dyn Fn(&Context) -> u64 + Send + Sync;

/// Cleanup returned by an activity; called exactly once when the activity
/// stops.
pub type Cleanup = Box<dyn FnOnce() + Send>;

/// Signature of an activity: starts a background effect and returns its
/// cleanup. The [`EventSender`] may be used to inject events at any time
/// between start and stop; later sends are discarded.
pub type ActivityFn = dyn Fn(&Context, EventSender) -> Cleanup + Send + Sync;

/// Effect requests collected while actions run in one event cycle.
///
/// Events sent to self are queued behind the current cycle
/// (run-to-completion); events sent to the parent land on the parent's
/// mailbox and follow the parent's own ordering.
#[derive(Debug, Default)]
pub struct Effects {
    pub(crate) raised: Vec<Event>,
    pub(crate) to_parent: Vec<Event>,
}

impl Effects {
    /// Queue an event on this interpreter, processed after the current
    /// cycle completes.
    pub fn send(&mut self, event: impl Into<Event>) {
        self.raised.push(event.into());
    }

    /// Send an event upward to the parent interpreter, if one is attached.
    pub fn send_parent(&mut self, event: impl Into<Event>) {
        self.to_parent.push(event.into());
    }
}

/// Immutable, compiled machine definition.
///
/// Holds the state table, the global event handlers, the default context,
/// and the name-to-implementation registries for guards, delays, actions,
/// and activities. Built with [`MachineBuilder`](crate::MachineBuilder).
pub struct MachineDefinition {
    pub(crate) id: String,
    pub(crate) initial: String,
    pub(crate) context: Context,
    pub(crate) states: HashMap<String, StateDef>,
    pub(crate) on: HashMap<String, Vec<TransitionSpec>>,
    pub(crate) guards: HashMap<String, Arc<GuardFn>>,
    pub(crate) delays: HashMap<String, Arc<DelayFn>>,
    pub(crate) actions: HashMap<String, Arc<ActionFn>>,
    pub(crate) activities: HashMap<String, Arc<ActivityFn>>,
}

impl MachineDefinition {
    /// The machine's unique id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The initial state name.
    pub fn initial(&self) -> &str {
        &self.initial
    }

    /// The default context every interpreter starts from.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Look up a state definition.
    pub fn state(&self, name: &str) -> Option<&StateDef> {
        self.states.get(name)
    }

    /// The defined state names, in no particular order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    /// Resolve a delay reference to milliseconds against the context.
    ///
    /// Named references are validated at build time; an unresolvable name
    /// falls back to zero.
    pub(crate) fn resolve_delay(&self, delay: &DelayRef, ctx: &Context) -> u64 {
        match delay {
            DelayRef::Millis(ms) => *ms,
            DelayRef::Named(name) => match self.delays.get(name) {
                Some(delay_fn) => delay_fn(ctx),
                None => {
                    debug_assert!(false, "delay '{name}' missing from a validated definition");
                    0
                }
            },
        }
    }

    /// Evaluate an optional guard expression; absent guards pass.
    pub(crate) fn guard_passes(
        &self,
        guard: Option<&crate::core::GuardExpr>,
        ctx: &Context,
        event: &Event,
    ) -> bool {
        guard.map_or(true, |g| g.evaluate(&self.guards, ctx, event))
    }
}

impl fmt::Debug for MachineDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineDefinition")
            .field("id", &self.id)
            .field("initial", &self.initial)
            .field("states", &self.states.keys().collect::<Vec<_>>())
            .field("guards", &self.guards.keys().collect::<Vec<_>>())
            .field("delays", &self.delays.keys().collect::<Vec<_>>())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("activities", &self.activities.keys().collect::<Vec<_>>())
            .finish()
    }
}
