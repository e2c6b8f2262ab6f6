//! Fluent construction and eager validation of machine definitions.
//!
//! [`MachineBuilder::build`] validates every reference the definition makes,
//! from transition targets to guard, delay, action, and activity names, and
//! fails fast with a [`DefinitionError`]. A definition that
//! builds cannot hit an unknown-name condition at runtime.

mod state;

pub use state::{EveryBuilder, StateBuilder, TransitionBuilder};

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::core::{Context, Event, EventSender, GuardExpr};
use crate::machine::state::{DelayRef, StateDef, StateType, TransitionSpec};
use crate::machine::{ActionFn, ActivityFn, Cleanup, DefinitionError, DelayFn, Effects, MachineDefinition};
use crate::core::GuardFn;

/// Builder for a [`MachineDefinition`].
///
/// # Example
///
/// ```rust
/// use uimachines::{MachineBuilder, StateBuilder};
/// use serde_json::json;
///
/// let machine = MachineBuilder::new("toggle")
///     .initial("off")
///     .context(json!({ "flips": 0 }))
///     .state("off", StateBuilder::new().on("TOGGLE", "on"))
///     .state("on", StateBuilder::new().on("TOGGLE", "off"))
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.id(), "toggle");
/// assert_eq!(machine.initial(), "off");
/// ```
pub struct MachineBuilder {
    id: String,
    initial: Option<String>,
    context: Option<Value>,
    states: Vec<(String, StateBuilder)>,
    on: Vec<(String, TransitionBuilder)>,
    guards: HashMap<String, Arc<GuardFn>>,
    delays: HashMap<String, Arc<DelayFn>>,
    actions: HashMap<String, Arc<ActionFn>>,
    activities: HashMap<String, Arc<ActivityFn>>,
}

impl MachineBuilder {
    /// Start a definition with the given machine id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            initial: None,
            context: None,
            states: Vec::new(),
            on: Vec::new(),
            guards: HashMap::new(),
            delays: HashMap::new(),
            actions: HashMap::new(),
            activities: HashMap::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: impl Into<String>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// Default context fields; must be a JSON object.
    pub fn context(mut self, defaults: Value) -> Self {
        self.context = Some(defaults);
        self
    }

    /// Define a state.
    pub fn state(mut self, name: impl Into<String>, state: StateBuilder) -> Self {
        self.states.push((name.into(), state));
        self
    }

    /// Add a global candidate for an event, consulted when the current
    /// state defines no handler for it. Repeated calls with the same event
    /// append candidates in declaration order.
    pub fn on(mut self, event: impl Into<String>, transition: impl Into<TransitionBuilder>) -> Self {
        self.on.push((event.into(), transition.into()));
        self
    }

    /// Register a named guard predicate.
    pub fn guard<F>(mut self, name: impl Into<String>, guard: F) -> Self
    where
        F: Fn(&Context, &Event) -> bool + Send + Sync + 'static,
    {
        self.guards.insert(name.into(), Arc::new(guard));
        self
    }

    /// Register a named delay function.
    pub fn delay<F>(mut self, name: impl Into<String>, delay: F) -> Self
    where
        F: Fn(&Context) -> u64 + Send + Sync + 'static,
    {
        self.delays.insert(name.into(), Arc::new(delay));
        self
    }

    /// Register a named action.
    pub fn action<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut Context, &Event, &mut Effects) + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(action));
        self
    }

    /// Register a named activity.
    pub fn activity<F>(mut self, name: impl Into<String>, activity: F) -> Self
    where
        F: Fn(&Context, EventSender) -> Cleanup + Send + Sync + 'static,
    {
        self.activities.insert(name.into(), Arc::new(activity));
        self
    }

    /// Compile and validate the definition.
    pub fn build(self) -> Result<MachineDefinition, DefinitionError> {
        let context = match self.context {
            Some(value) => Context::from_object(value).ok_or(DefinitionError::ContextNotAnObject)?,
            None => Context::new(),
        };

        let mut states: HashMap<String, StateDef> = HashMap::new();
        for (name, builder) in self.states {
            if states.contains_key(&name) {
                return Err(DefinitionError::DuplicateState { name });
            }
            states.insert(name, builder.into_def());
        }

        let initial = self.initial.unwrap_or_default();
        if !states.contains_key(&initial) {
            return Err(DefinitionError::UnknownInitialState(initial));
        }

        let mut on: HashMap<String, Vec<TransitionSpec>> = HashMap::new();
        for (event, transition) in self.on {
            on.entry(event).or_default().push(transition.into_spec());
        }

        let definition = MachineDefinition {
            id: self.id,
            initial,
            context,
            states,
            on,
            guards: self.guards,
            delays: self.delays,
            actions: self.actions,
            activities: self.activities,
        };

        validate(&definition)?;
        Ok(definition)
    }
}

/// Walk the whole definition, checking every reference against the state
/// table and the registries.
fn validate(def: &MachineDefinition) -> Result<(), DefinitionError> {
    for (name, state) in &def.states {
        match state.kind {
            StateType::Final => {
                let has_outgoing = !state.on.is_empty()
                    || !state.after.is_empty()
                    || !state.every.is_empty()
                    || !state.always.is_empty()
                    || !state.activities.is_empty();
                if has_outgoing {
                    return Err(DefinitionError::FinalStateWithTransitions(name.clone()));
                }
            }
            StateType::Transient => {
                if state.always.is_empty() {
                    return Err(DefinitionError::TransientWithoutAlways(name.clone()));
                }
            }
            StateType::Normal => {
                if !state.always.is_empty() {
                    return Err(DefinitionError::AlwaysOnNonTransient(name.clone()));
                }
            }
        }

        check_action_names(def, state.entry.iter().chain(&state.exit))?;

        for activity in &state.activities {
            if !def.activities.contains_key(activity) {
                return Err(DefinitionError::UnknownActivity(activity.clone()));
            }
        }

        for spec in state.on.values().flatten().chain(&state.always) {
            check_transition(def, name, spec)?;
        }

        for after in &state.after {
            check_delay(def, &after.delay)?;
            check_transition(def, name, &after.transition)?;
        }

        for every in &state.every {
            check_delay(def, &every.delay)?;
            check_guard(def, every.guard.as_ref())?;
            check_action_names(def, every.actions.iter())?;
        }
    }

    for spec in def.on.values().flatten() {
        check_transition(def, "<global>", spec)?;
    }

    Ok(())
}

fn check_transition(
    def: &MachineDefinition,
    source: &str,
    spec: &TransitionSpec,
) -> Result<(), DefinitionError> {
    if let Some(target) = &spec.target {
        if !def.states.contains_key(target) {
            return Err(DefinitionError::UnknownTarget {
                state: source.to_string(),
                target: target.clone(),
            });
        }
    }
    check_guard(def, spec.guard.as_ref())?;
    check_action_names(def, spec.actions.iter())
}

fn check_guard(def: &MachineDefinition, guard: Option<&GuardExpr>) -> Result<(), DefinitionError> {
    let Some(guard) = guard else { return Ok(()) };
    let mut missing = None;
    guard.visit_names(&mut |name| {
        if missing.is_none() && !def.guards.contains_key(name) {
            missing = Some(name.to_string());
        }
    });
    match missing {
        Some(name) => Err(DefinitionError::UnknownGuard(name)),
        None => Ok(()),
    }
}

fn check_delay(def: &MachineDefinition, delay: &DelayRef) -> Result<(), DefinitionError> {
    if let DelayRef::Named(name) = delay {
        if !def.delays.contains_key(name) {
            return Err(DefinitionError::UnknownDelay(name.clone()));
        }
    }
    Ok(())
}

fn check_action_names<'a>(
    def: &MachineDefinition,
    names: impl Iterator<Item = &'a String>,
) -> Result<(), DefinitionError> {
    for name in names {
        if !def.actions.contains_key(name) {
            return Err(DefinitionError::UnknownAction(name.clone()));
        }
    }
    Ok(())
}
