//! Uimachines: a declarative state machine interpreter for UI widgets.
//!
//! Uimachines drives interactive widget behavior (menus, tabs, toasts, tag
//! inputs) as guarded, timed state machines, independent of any rendering
//! framework. A machine is described once as a declarative
//! [`MachineDefinition`] (states, transitions, guards, delays, actions,
//! activities) and executed by any number of [`Interpreter`] instances,
//! each owning its own [`Context`].
//!
//! # Core concepts
//!
//! - **Definition**: immutable state/transition tables built with
//!   [`MachineBuilder`] and validated eagerly: unknown guard, delay,
//!   action, activity, or state names fail at build time
//! - **Guards**: side-effect-free predicates composed with
//!   [`guards::not`], [`guards::and`], [`guards::or`]
//! - **Timers**: one-shot `after` transitions and recurring `every`
//!   actions, armed on state entry, canceled on exit, driven by a virtual
//!   clock through [`Interpreter::advance`]
//! - **Activities**: background effects started on entry and stopped
//!   exactly once on exit, able to inject events through an [`EventSender`]
//! - **Run-to-completion**: one event is fully processed before the next
//!   queued event begins; parent/child machines communicate only by events
//!
//! # Example
//!
//! ```rust
//! use uimachines::{Interpreter, MachineBuilder, StateBuilder, TransitionBuilder, guards::not};
//! use serde_json::json;
//!
//! let machine = MachineBuilder::new("toast")
//!     .initial("active")
//!     .context(json!({ "type": "info", "duration": 300 }))
//!     .guard("isLoadingType", |ctx, _| ctx.get_str("type") == Some("loading"))
//!     .delay("VISIBLE_DURATION", |ctx| ctx.get_u64("duration").unwrap_or(0))
//!     .state("active", StateBuilder::new()
//!         .after("VISIBLE_DURATION", "dismissing")
//!         .on("PAUSE", "visible"))
//!     .state("visible", StateBuilder::new()
//!         .on("RESUME", TransitionBuilder::to("active").guard(not("isLoadingType"))))
//!     .state("dismissing", StateBuilder::new().after(1000, "inactive"))
//!     .state("inactive", StateBuilder::final_state())
//!     .build()?;
//!
//! let mut toast = Interpreter::new(machine);
//! toast.start()?;
//!
//! toast.advance(300)?; // visible duration elapses
//! assert_eq!(toast.state().value, "dismissing");
//!
//! toast.advance(1000)?;
//! assert_eq!(toast.state().value, "inactive");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod core;
pub mod interpreter;
pub mod machine;

/// Guard combinators, re-exported for terse machine definitions.
pub mod guards {
    pub use crate::core::guard::{and, named, not, or, when};
}

pub use builder::{EveryBuilder, MachineBuilder, StateBuilder, TransitionBuilder};
pub use core::{Context, Event, EventSender, GuardExpr};
pub use interpreter::{
    ActivityHandle, Interpreter, InterpreterError, StateSnapshot, Status, TRANSIENT_CASCADE_LIMIT,
};
pub use machine::{
    DefinitionError, DelayRef, Effects, MachineDefinition, RecurrencePolicy, StateType,
};
