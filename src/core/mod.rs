//! Core data types shared by definitions and interpreters.
//!
//! This module contains the small, side-effect-free pieces of the engine:
//! - The [`Context`] data bag guards read and actions mutate
//! - [`Event`] values with JSON payloads
//! - [`GuardExpr`] predicates with `not`/`and`/`or` composition
//! - The [`EventSender`] capability for injecting events from outside

mod context;
mod event;
pub mod guard;
mod mailbox;

pub use context::Context;
pub use event::Event;
pub use guard::{GuardExpr, GuardFn};
pub use mailbox::EventSender;

pub(crate) use mailbox::Mailbox;
