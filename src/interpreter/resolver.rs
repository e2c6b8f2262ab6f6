//! Transition resolution: picking the next state and action list for an
//! event.
//!
//! Candidates come from the current state's `on` table; when the state
//! defines no handler for the event's kind, the definition's global `on`
//! table is consulted instead. Candidates are tried strictly in declaration
//! order and the first whose guard passes (or which has no guard) wins. An
//! event matching nothing is dropped without error.

use crate::core::{Context, Event};
use crate::machine::state::{StateDef, TransitionSpec};
use crate::machine::MachineDefinition;

/// Outcome of resolving an event: where to go and what to run.
#[derive(Clone, Debug)]
pub(crate) struct Resolution {
    /// `None` for internal transitions.
    pub target: Option<String>,
    pub actions: Vec<String>,
}

/// Resolve an event against the current state, falling back to the global
/// handlers.
pub(crate) fn resolve_event(
    def: &MachineDefinition,
    state: &StateDef,
    ctx: &Context,
    event: &Event,
) -> Option<Resolution> {
    let candidates = state
        .on
        .get(event.kind())
        .or_else(|| def.on.get(event.kind()))?;
    first_match(def, candidates, ctx, event)
}

/// Resolve a transient state's `always` candidates against the synthetic
/// internal event.
pub(crate) fn resolve_always(
    def: &MachineDefinition,
    state: &StateDef,
    ctx: &Context,
) -> Option<Resolution> {
    first_match(def, &state.always, ctx, &Event::internal())
}

/// Resolve a single spec (used for `after` timers, which carry exactly one
/// candidate).
pub(crate) fn resolve_single(
    def: &MachineDefinition,
    spec: &TransitionSpec,
    ctx: &Context,
    event: &Event,
) -> Option<Resolution> {
    def.guard_passes(spec.guard.as_ref(), ctx, event)
        .then(|| Resolution {
            target: spec.target.clone(),
            actions: spec.actions.clone(),
        })
}

fn first_match(
    def: &MachineDefinition,
    candidates: &[TransitionSpec],
    ctx: &Context,
    event: &Event,
) -> Option<Resolution> {
    candidates
        .iter()
        .find_map(|spec| resolve_single(def, spec, ctx, event))
}
