//! The interpreter: executes a machine definition against an owned context.
//!
//! One interpreter owns exactly one current state and one context. Events
//! are processed with run-to-completion semantics: a cycle (exit actions →
//! transition actions → entry actions → timer re-arm) finishes before the
//! next queued event begins, and events raised by actions queue behind the
//! cycle that raised them. Timed behavior runs off a virtual clock advanced
//! by the host through [`Interpreter::advance`]; no ambient timers exist.

mod activity;
mod error;
mod resolver;
mod scheduler;

pub use activity::ActivityHandle;
pub use error::{InterpreterError, TRANSIENT_CASCADE_LIMIT};

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::core::{Context, Event, EventSender, Mailbox};
use crate::machine::state::{RecurrencePolicy, StateType};
use crate::machine::{DefinitionError, Effects, MachineDefinition};

use activity::ActivityManager;
use resolver::Resolution;
use scheduler::{Firing, Scheduler, TimerId, TimerTask};

/// Interpreter lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Created but not started.
    Idle,
    /// Processing events.
    Running,
    /// Permanently stopped.
    Stopped,
}

/// Read-only view of the interpreter after a cycle: the current state name
/// and a copy of the context.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub value: String,
    pub context: Context,
}

type Subscriber = Box<dyn Fn(&StateSnapshot) + Send + Sync>;

/// Executes one machine definition instance.
///
/// # Example
///
/// ```rust
/// use uimachines::{Interpreter, MachineBuilder, StateBuilder};
///
/// let machine = MachineBuilder::new("toggle")
///     .initial("off")
///     .state("off", StateBuilder::new().on("TOGGLE", "on"))
///     .state("on", StateBuilder::new().on("TOGGLE", "off"))
///     .build()
///     .unwrap();
///
/// let mut toggle = Interpreter::new(machine);
/// toggle.start().unwrap();
/// toggle.send("TOGGLE").unwrap();
/// assert_eq!(toggle.state().value, "on");
/// ```
pub struct Interpreter {
    definition: Arc<MachineDefinition>,
    context: Context,
    current: String,
    status: Status,
    queue: VecDeque<Event>,
    mailbox: Mailbox,
    scheduler: Scheduler,
    activities: ActivityManager,
    /// Timers armed by the current state, canceled on exit.
    armed: Vec<TimerId>,
    parent: Option<EventSender>,
    subscribers: Vec<Subscriber>,
}

impl Interpreter {
    /// Create an idle interpreter for a definition. The definition may be
    /// an `Arc` shared with other interpreters.
    pub fn new(definition: impl Into<Arc<MachineDefinition>>) -> Self {
        let definition = definition.into();
        let context = definition.context().clone();
        let current = definition.initial().to_string();
        Self {
            definition,
            context,
            current,
            status: Status::Idle,
            queue: VecDeque::new(),
            mailbox: Mailbox::new(),
            scheduler: Scheduler::new(),
            activities: ActivityManager::new(),
            armed: Vec::new(),
            parent: None,
            subscribers: Vec::new(),
        }
    }

    /// Merge per-instance overrides into the context defaults. Intended
    /// before [`start`](Self::start); must be a JSON object.
    pub fn with_context(mut self, overrides: serde_json::Value) -> Result<Self, DefinitionError> {
        if !overrides.is_object() {
            return Err(DefinitionError::ContextNotAnObject);
        }
        self.context.merge(overrides);
        Ok(self)
    }

    /// The definition's machine id.
    pub fn id(&self) -> &str {
        self.definition.id()
    }

    /// Lifecycle status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Snapshot the current state name and context.
    pub fn state(&self) -> StateSnapshot {
        StateSnapshot {
            value: self.current.clone(),
            context: self.context.clone(),
        }
    }

    /// Whether the current state has the given name.
    pub fn matches(&self, value: &str) -> bool {
        self.current == value
    }

    /// Hand out a capability for injecting events into this interpreter.
    /// Used to wire activities' external callbacks and child-to-parent
    /// messaging.
    pub fn sender(&self) -> EventSender {
        self.mailbox.sender()
    }

    /// Attach a parent interpreter's sender; actions reach it through
    /// [`Effects::send_parent`].
    pub fn set_parent(&mut self, parent: EventSender) {
        self.parent = Some(parent);
    }

    /// Register a listener invoked once per completed event cycle with the
    /// settled snapshot. Dropped (unmatched) events do not notify.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&StateSnapshot) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(listener));
    }

    /// Enter the initial state: run its entry actions, start its
    /// activities, arm its timers, and settle any transient cascade.
    pub fn start(&mut self) -> Result<(), InterpreterError> {
        match self.status {
            Status::Idle => {}
            Status::Running => return Err(InterpreterError::AlreadyStarted),
            Status::Stopped => return Err(InterpreterError::Stopped),
        }
        self.status = Status::Running;
        debug!(machine = %self.definition.id(), "interpreter started");

        let initial = self.definition.initial().to_string();
        let mut fx = Effects::default();
        self.enter_state(&initial, &Event::internal(), &mut fx, 0)?;
        self.flush_effects(fx);
        self.notify();
        self.drain()
    }

    /// Deliver an event, running its full cycle plus any events it raises
    /// or that arrived through senders in the meantime.
    pub fn send(&mut self, event: impl Into<Event>) -> Result<(), InterpreterError> {
        self.ensure_running()?;
        self.queue.push_back(event.into());
        self.drain()
    }

    /// Advance the virtual clock by `ms` milliseconds, delivering due
    /// `after` and `every` firings in deadline order as ordinary cycles.
    pub fn advance(&mut self, ms: u64) -> Result<(), InterpreterError> {
        self.ensure_running()?;
        let until = self.scheduler.now().saturating_add(ms);
        self.drain()?;
        while let Some(firing) = self.scheduler.pop_due(until) {
            self.handle_firing(firing)?;
            self.drain()?;
        }
        self.scheduler.settle(until);
        Ok(())
    }

    /// Process events injected through [`EventSender`] handles while no
    /// cycle was running.
    pub fn pump(&mut self) -> Result<(), InterpreterError> {
        self.ensure_running()?;
        self.drain()
    }

    /// Exit the current state, cancel all timers, stop all activities,
    /// detach from the parent, and permanently disable the interpreter.
    /// Idempotent: stopping twice is `Ok`.
    pub fn stop(&mut self) -> Result<(), InterpreterError> {
        match self.status {
            Status::Stopped => return Ok(()),
            Status::Idle => {
                self.status = Status::Stopped;
                self.mailbox.close();
                return Ok(());
            }
            Status::Running => {}
        }
        debug!(machine = %self.definition.id(), state = %self.current, "interpreter stopped");

        let mut fx = Effects::default();
        self.exit_current(&Event::internal(), &mut fx);
        self.scheduler.cancel_all();
        self.status = Status::Stopped;
        self.mailbox.close();
        self.queue.clear();

        // Exit actions may still message the parent; raised self-events die
        // with the instance.
        if let Some(parent) = &self.parent {
            for event in fx.to_parent {
                parent.send(event);
            }
        }
        self.parent = None;
        self.notify();
        Ok(())
    }

    fn ensure_running(&self) -> Result<(), InterpreterError> {
        match self.status {
            Status::Running => Ok(()),
            Status::Idle => Err(InterpreterError::NotStarted),
            Status::Stopped => Err(InterpreterError::Stopped),
        }
    }

    /// Run-to-completion loop: one event fully processed per iteration,
    /// injected events pulled in between cycles.
    fn drain(&mut self) -> Result<(), InterpreterError> {
        loop {
            for event in self.mailbox.drain() {
                self.queue.push_back(event);
            }
            let Some(event) = self.queue.pop_front() else {
                return Ok(());
            };
            if self.process_event(&event)? {
                self.notify();
            }
        }
    }

    /// Returns whether the event matched a transition (and subscribers
    /// should be notified).
    fn process_event(&mut self, event: &Event) -> Result<bool, InterpreterError> {
        let def = Arc::clone(&self.definition);
        let Some(state) = def.state(&self.current) else {
            return Ok(false);
        };
        if state.kind == StateType::Final {
            trace!(kind = event.kind(), state = %self.current, "event dropped in final state");
            return Ok(false);
        }
        let Some(resolution) = resolver::resolve_event(&def, state, &self.context, event) else {
            trace!(kind = event.kind(), state = %self.current, "event dropped, no transition");
            return Ok(false);
        };
        self.apply(resolution, event)?;
        Ok(true)
    }

    /// Execute a resolved transition: exit/actions/entry for a state
    /// change, actions only for internal transitions and self-loops.
    fn apply(&mut self, resolution: Resolution, event: &Event) -> Result<(), InterpreterError> {
        let mut fx = Effects::default();
        match resolution.target {
            Some(target) if target != self.current => {
                self.exit_current(event, &mut fx);
                self.run_actions(&resolution.actions, event, &mut fx);
                self.enter_state(&target, event, &mut fx, 0)?;
            }
            _ => self.run_actions(&resolution.actions, event, &mut fx),
        }
        self.flush_effects(fx);
        Ok(())
    }

    fn handle_firing(&mut self, firing: Firing) -> Result<(), InterpreterError> {
        let def = Arc::clone(&self.definition);
        let event = Event::internal();
        match firing.task {
            TimerTask::After(spec) => {
                self.armed.retain(|id| *id != firing.id);
                if let Some(resolution) =
                    resolver::resolve_single(&def, &spec, &self.context, &event)
                {
                    self.apply(resolution, &event)?;
                    self.notify();
                }
            }
            TimerTask::Every(spec) => {
                if def.guard_passes(spec.guard.as_ref(), &self.context, &event) {
                    let mut fx = Effects::default();
                    self.run_actions(&spec.actions, &event, &mut fx);
                    self.flush_effects(fx);
                    self.notify();
                } else if spec.policy == RecurrencePolicy::Cancel {
                    trace!(state = %self.current, "recurrence canceled by failing guard");
                    self.scheduler.cancel(firing.id);
                    self.armed.retain(|id| *id != firing.id);
                } else {
                    trace!(state = %self.current, "recurrence tick skipped by failing guard");
                }
            }
        }
        Ok(())
    }

    /// Entry procedure: entry actions, activities, `after`/`every` timers,
    /// then the transient cascade, all before control returns.
    fn enter_state(
        &mut self,
        target: &str,
        event: &Event,
        fx: &mut Effects,
        depth: usize,
    ) -> Result<(), InterpreterError> {
        if depth > TRANSIENT_CASCADE_LIMIT {
            return Err(InterpreterError::RecursionLimitExceeded {
                state: target.to_string(),
                limit: TRANSIENT_CASCADE_LIMIT,
            });
        }
        self.current = target.to_string();
        debug!(machine = %self.definition.id(), state = %self.current, "state entered");

        let def = Arc::clone(&self.definition);
        let Some(state) = def.state(target) else {
            return Ok(());
        };

        self.run_actions(&state.entry, event, fx);

        for name in &state.activities {
            if let Some(activity) = def.activities.get(name) {
                self.activities
                    .start(name, activity, &self.context, self.mailbox.sender());
            }
        }

        for after in &state.after {
            let ms = def.resolve_delay(&after.delay, &self.context);
            let id = self
                .scheduler
                .schedule_after(ms, TimerTask::After(after.transition.clone()));
            self.armed.push(id);
        }
        for every in &state.every {
            let ms = def.resolve_delay(&every.delay, &self.context);
            let id = self
                .scheduler
                .schedule_every(ms, TimerTask::Every(every.clone()));
            self.armed.push(id);
        }

        if state.kind == StateType::Transient {
            if let Some(resolution) = resolver::resolve_always(&def, state, &self.context) {
                match resolution.target {
                    Some(next) => {
                        self.exit_current(event, fx);
                        self.run_actions(&resolution.actions, event, fx);
                        self.enter_state(&next, event, fx, depth + 1)?;
                    }
                    None => self.run_actions(&resolution.actions, event, fx),
                }
            }
        }
        Ok(())
    }

    /// Exit procedure: cancel the state's timers, stop its activities, run
    /// its exit actions.
    fn exit_current(&mut self, event: &Event, fx: &mut Effects) {
        for id in self.armed.drain(..) {
            self.scheduler.cancel(id);
        }
        self.activities.stop_all();

        let def = Arc::clone(&self.definition);
        if let Some(state) = def.state(&self.current) {
            let exit = state.exit.clone();
            self.run_actions(&exit, event, fx);
        }
        debug!(machine = %self.definition.id(), state = %self.current, "state exited");
    }

    fn run_actions(&mut self, names: &[String], event: &Event, fx: &mut Effects) {
        let def = Arc::clone(&self.definition);
        for name in names {
            match def.actions.get(name) {
                Some(action) => action(&mut self.context, event, fx),
                None => debug_assert!(false, "action '{name}' missing from a validated definition"),
            }
        }
    }

    /// Move effect requests out of a completed cycle: self-sends queue
    /// behind it, parent-sends land on the parent's mailbox.
    fn flush_effects(&mut self, fx: Effects) {
        for event in fx.raised {
            self.queue.push_back(event);
        }
        if fx.to_parent.is_empty() {
            return;
        }
        match &self.parent {
            Some(parent) => {
                for event in fx.to_parent {
                    parent.send(event);
                }
            }
            None => trace!(machine = %self.definition.id(), "parent send with no parent attached"),
        }
    }

    /// Called only after every mutation of a cycle has completed, so a
    /// throwing subscriber observes a consistent machine.
    fn notify(&self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.state();
        for subscriber in &self.subscribers {
            subscriber(&snapshot);
        }
    }
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("id", &self.definition.id())
            .field("status", &self.status)
            .field("current", &self.current)
            .field("queued", &self.queue.len())
            .finish()
    }
}
