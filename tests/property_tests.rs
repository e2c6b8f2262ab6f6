//! Property-based tests for the interpreter.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use uimachines::guards::{and, named, not, or};
use uimachines::{
    Event, GuardExpr, Interpreter, MachineBuilder, MachineDefinition, StateBuilder,
    TransitionBuilder,
};

/// A small machine with guarded transitions and context mutation, enough
/// surface for sequences of events to diverge if execution were not
/// deterministic.
fn counter_machine() -> MachineDefinition {
    MachineBuilder::new("counter")
        .initial("low")
        .context(json!({ "count": 0, "locked": false }))
        .guard("isHigh", |ctx, _| ctx.get_u64("count").unwrap_or(0) >= 3)
        .guard("isLocked", |ctx, _| ctx.get_bool("locked") == Some(true))
        .action("increment", |ctx, _, _| {
            let count = ctx.get_u64("count").unwrap_or(0);
            ctx.set("count", count + 1);
        })
        .action("reset", |ctx, _, _| ctx.set("count", 0))
        .action("toggleLock", |ctx, _, _| {
            let locked = ctx.get_bool("locked") == Some(true);
            ctx.set("locked", !locked);
        })
        .state(
            "low",
            StateBuilder::new()
                .on(
                    "BUMP",
                    TransitionBuilder::to("high")
                        .guard(and([named("isHigh"), not("isLocked")]))
                        .action("increment"),
                )
                .on("BUMP", TransitionBuilder::internal().action("increment"))
                .on("LOCK", TransitionBuilder::internal().action("toggleLock")),
        )
        .state(
            "high",
            StateBuilder::new()
                .on("RESET", TransitionBuilder::to("low").action("reset"))
                .on("LOCK", TransitionBuilder::internal().action("toggleLock")),
        )
        .build()
        .unwrap()
}

/// A machine whose only timer belongs to the `waiting` state; leaving that
/// state must make the timer unobservable no matter how the clock advances.
fn timed_machine() -> MachineDefinition {
    MachineBuilder::new("timed")
        .initial("waiting")
        .context(json!({ "fired": false }))
        .action("markFired", |ctx, _, _| ctx.set("fired", true))
        .state(
            "waiting",
            StateBuilder::new()
                .after(100, TransitionBuilder::to("late").action("markFired"))
                .on("LEAVE", "safe"),
        )
        .state("late", StateBuilder::new())
        .state("safe", StateBuilder::new().on("BACK", "waiting"))
        .build()
        .unwrap()
}

prop_compose! {
    fn arbitrary_event()(variant in 0..4u8) -> Event {
        match variant {
            0 => Event::new("BUMP"),
            1 => Event::new("RESET"),
            2 => Event::new("LOCK"),
            _ => Event::new("UNHANDLED"),
        }
    }
}

prop_compose! {
    /// A step for the timed machine: advance by some milliseconds, leave
    /// the waiting state, or come back to it.
    fn arbitrary_timed_step()(variant in 0..3u8, ms in 0..250u64) -> TimedStep {
        match variant {
            0 => TimedStep::Advance(ms),
            1 => TimedStep::Leave,
            _ => TimedStep::Back,
        }
    }
}

#[derive(Clone, Debug)]
enum TimedStep {
    Advance(u64),
    Leave,
    Back,
}

prop_compose! {
    fn arbitrary_guard_expr()(variant in 0..5u8, flag in any::<bool>()) -> (GuardExpr, bool) {
        let base = |b: bool| if b { named("yes") } else { named("no") };
        match variant {
            0 => (base(flag), flag),
            1 => (not(base(flag)), !flag),
            2 => (and([base(flag), base(true)]), flag),
            3 => (or([base(flag), base(false)]), flag),
            _ => (not(not(base(flag))), flag),
        }
    }
}

proptest! {
    #[test]
    fn identical_event_sequences_produce_identical_snapshots(
        events in prop::collection::vec(arbitrary_event(), 0..25)
    ) {
        let definition = Arc::new(counter_machine());
        let mut first = Interpreter::new(Arc::clone(&definition));
        let mut second = Interpreter::new(Arc::clone(&definition));
        first.start().unwrap();
        second.start().unwrap();

        for event in &events {
            first.send(event.clone()).unwrap();
            second.send(event.clone()).unwrap();
        }

        prop_assert_eq!(first.state(), second.state());
    }

    #[test]
    fn unmatched_events_never_change_the_snapshot(
        events in prop::collection::vec(arbitrary_event(), 0..25),
        noise in prop::collection::vec("[A-Z]{3,8}", 1..10)
    ) {
        let mut interp = Interpreter::new(counter_machine());
        interp.start().unwrap();
        for event in events {
            interp.send(event).unwrap();
        }
        let before = interp.state();

        // Kinds outside the machine's vocabulary are dropped bit-for-bit.
        let handled = ["BUMP", "RESET", "LOCK"];
        for kind in noise {
            if handled.contains(&kind.as_str()) {
                continue;
            }
            interp.send(Event::new(kind)).unwrap();
            prop_assert_eq!(interp.state(), before.clone());
        }
    }

    #[test]
    fn timers_never_fire_for_exited_states(
        steps in prop::collection::vec(arbitrary_timed_step(), 1..20)
    ) {
        let mut interp = Interpreter::new(timed_machine());
        interp.start().unwrap();
        // Virtual time remaining before the armed timer would fire.
        let mut remaining: Option<u64> = Some(100);

        for step in steps {
            match step {
                TimedStep::Advance(ms) => {
                    interp.advance(ms).unwrap();
                    if let Some(left) = remaining {
                        remaining = left.checked_sub(ms).filter(|_| ms < left);
                    }
                }
                TimedStep::Leave => {
                    interp.send("LEAVE").unwrap();
                    if interp.matches("safe") {
                        remaining = None;
                    }
                }
                TimedStep::Back => {
                    interp.send("BACK").unwrap();
                    if interp.matches("waiting") && remaining.is_none() {
                        remaining = Some(100);
                    }
                }
            }

            let fired = interp.state().context.get_bool("fired") == Some(true);
            match remaining {
                // Timer still pending: it must not have fired early.
                Some(_) => prop_assert!(!fired && !interp.matches("late")),
                // Timer canceled by exit, or already delivered.
                None => prop_assert_eq!(fired, interp.matches("late")),
            }
            if interp.matches("late") {
                break;
            }
        }
    }

    #[test]
    fn guard_composition_matches_boolean_semantics((expr, expected) in arbitrary_guard_expr()) {
        let registry = {
            let mut map = std::collections::HashMap::new();
            map.insert(
                "yes".to_string(),
                Arc::new(|_: &uimachines::Context, _: &Event| true)
                    as Arc<uimachines::core::guard::GuardFn>,
            );
            map.insert(
                "no".to_string(),
                Arc::new(|_: &uimachines::Context, _: &Event| false)
                    as Arc<uimachines::core::guard::GuardFn>,
            );
            map
        };
        let ctx = uimachines::Context::new();
        let event = Event::internal();

        prop_assert_eq!(expr.evaluate(&registry, &ctx, &event), expected);
        // Evaluation is pure: repeating it yields the same answer.
        prop_assert_eq!(expr.evaluate(&registry, &ctx, &event), expected);
    }

    #[test]
    fn advance_is_divisible(total in 0..500u64, split in 0..500u64) {
        let split = split.min(total);
        let definition = Arc::new(timed_machine());

        let mut whole = Interpreter::new(Arc::clone(&definition));
        whole.start().unwrap();
        whole.advance(total).unwrap();

        let mut parts = Interpreter::new(Arc::clone(&definition));
        parts.start().unwrap();
        parts.advance(split).unwrap();
        parts.advance(total - split).unwrap();

        prop_assert_eq!(whole.state(), parts.state());
    }
}
