//! Guard expressions for controlling transitions.
//!
//! Guards are side-effect-free predicates over the context and the current
//! event. A transition guard is either a reference to a guard registered on
//! the machine definition, an inline predicate, or a composite built with
//! [`not`], [`and`], and [`or`]. Named references are validated when the
//! definition is built, so an unknown guard name is a definition-time error
//! rather than a runtime surprise.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::context::Context;
use crate::core::event::Event;

/// Signature of a guard predicate.
///
/// Guards must be pure: deterministic and free of side effects. The engine
/// does not enforce this, it is a contract of the definition.
pub type GuardFn = dyn Fn(&Context, &Event) -> bool + Send + Sync;

/// A guard expression attached to a transition.
///
/// Composite evaluation short-circuits: [`and`] stops at the first false
/// operand, [`or`] at the first true one.
///
/// # Example
///
/// ```rust
/// use uimachines::guards::{and, named, not, or};
///
/// let expr = or([
///     and([named("hasTypeChanged"), named("isLoadingType")]),
///     not(named("hasDurationChanged")),
/// ]);
/// ```
#[derive(Clone)]
pub enum GuardExpr {
    /// Reference to a guard registered on the machine definition.
    Named(String),
    /// Inline predicate.
    When(Arc<GuardFn>),
    /// Negation.
    Not(Box<GuardExpr>),
    /// Conjunction, short-circuits at the first false operand.
    And(Vec<GuardExpr>),
    /// Disjunction, short-circuits at the first true operand.
    Or(Vec<GuardExpr>),
}

impl fmt::Debug for GuardExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "Named({name:?})"),
            Self::When(_) => write!(f, "When(<predicate>)"),
            Self::Not(inner) => write!(f, "Not({inner:?})"),
            Self::And(inner) => write!(f, "And({inner:?})"),
            Self::Or(inner) => write!(f, "Or({inner:?})"),
        }
    }
}

impl From<&str> for GuardExpr {
    fn from(name: &str) -> Self {
        GuardExpr::Named(name.to_string())
    }
}

impl From<String> for GuardExpr {
    fn from(name: String) -> Self {
        GuardExpr::Named(name)
    }
}

/// Reference a guard registered on the machine definition by name.
pub fn named(name: impl Into<String>) -> GuardExpr {
    GuardExpr::Named(name.into())
}

/// Build a guard from an inline predicate.
pub fn when<F>(predicate: F) -> GuardExpr
where
    F: Fn(&Context, &Event) -> bool + Send + Sync + 'static,
{
    GuardExpr::When(Arc::new(predicate))
}

/// Negate a guard expression.
pub fn not(expr: impl Into<GuardExpr>) -> GuardExpr {
    GuardExpr::Not(Box::new(expr.into()))
}

/// All operands must pass. Evaluation stops at the first false operand.
pub fn and<I, G>(exprs: I) -> GuardExpr
where
    I: IntoIterator<Item = G>,
    G: Into<GuardExpr>,
{
    GuardExpr::And(exprs.into_iter().map(Into::into).collect())
}

/// Any operand may pass. Evaluation stops at the first true operand.
pub fn or<I, G>(exprs: I) -> GuardExpr
where
    I: IntoIterator<Item = G>,
    G: Into<GuardExpr>,
{
    GuardExpr::Or(exprs.into_iter().map(Into::into).collect())
}

impl GuardExpr {
    /// Evaluate the expression against the context and event.
    ///
    /// Named references are looked up in `registry`. Definitions are
    /// validated at build time, so a missing name cannot occur for a built
    /// machine; it evaluates to false if it somehow does.
    pub fn evaluate(
        &self,
        registry: &HashMap<String, Arc<GuardFn>>,
        ctx: &Context,
        event: &Event,
    ) -> bool {
        match self {
            Self::Named(name) => match registry.get(name) {
                Some(guard) => guard(ctx, event),
                None => {
                    debug_assert!(false, "guard '{name}' missing from a validated definition");
                    false
                }
            },
            Self::When(predicate) => predicate(ctx, event),
            Self::Not(inner) => !inner.evaluate(registry, ctx, event),
            Self::And(inner) => inner.iter().all(|g| g.evaluate(registry, ctx, event)),
            Self::Or(inner) => inner.iter().any(|g| g.evaluate(registry, ctx, event)),
        }
    }

    /// Visit every named reference in the expression tree.
    ///
    /// Used by the builder to validate references eagerly.
    pub(crate) fn visit_names(&self, visit: &mut impl FnMut(&str)) {
        match self {
            Self::Named(name) => visit(name),
            Self::When(_) => {}
            Self::Not(inner) => inner.visit_names(visit),
            Self::And(inner) | Self::Or(inner) => {
                for expr in inner {
                    expr.visit_names(visit);
                }
            }
        }
    }
}
