//! Toast Notification Machine
//!
//! This demo drives a self-dismissing toast notification.
//!
//! Key concepts:
//! - Named delays resolved from the context (`VISIBLE_DURATION`)
//! - A recurring tick updating a progress bar
//! - Pause and resume with the remaining duration
//! - A virtual clock advanced explicitly by the host
//!
//! Run with: cargo run --example toast

use serde_json::{json, Value};
use uimachines::guards::not;
use uimachines::{Context, EveryBuilder, Interpreter, MachineBuilder, StateBuilder, TransitionBuilder};

const PROGRESS_INTERVAL: u64 = 100;

fn progress(ctx: &Context) -> u64 {
    ctx.get("progress")
        .and_then(|p| p.get("value"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

fn main() {
    println!("=== Toast Notification Machine ===\n");

    let machine = MachineBuilder::new("toast")
        .initial("active")
        .context(json!({
            "type": "info",
            "duration": 1000,
            "progress": { "max": 1000, "value": 1000 },
        }))
        .guard("isLoadingType", |ctx, _| ctx.get_str("type") == Some("loading"))
        .delay("VISIBLE_DURATION", |ctx| ctx.get_u64("duration").unwrap_or(0))
        .action("tickProgress", |ctx, _, _| {
            let value = progress(ctx).saturating_sub(PROGRESS_INTERVAL);
            if let Some(Value::Object(p)) = ctx.get_mut("progress") {
                p.insert("value".into(), json!(value));
            }
        })
        .action("setDurationToProgress", |ctx, _, _| {
            let remaining = progress(ctx);
            ctx.set("duration", remaining);
        })
        .state(
            "active",
            StateBuilder::new()
                .after("VISIBLE_DURATION", "dismissing")
                .every(
                    EveryBuilder::new(PROGRESS_INTERVAL)
                        .guard(not("isLoadingType"))
                        .action("tickProgress"),
                )
                .on(
                    "PAUSE",
                    TransitionBuilder::to("visible").action("setDurationToProgress"),
                ),
        )
        .state(
            "visible",
            StateBuilder::new().on("RESUME", TransitionBuilder::to("active").guard(not("isLoadingType"))),
        )
        .state("dismissing", StateBuilder::new().after(300, "inactive"))
        .state("inactive", StateBuilder::final_state())
        .build()
        .unwrap();

    let mut toast = Interpreter::new(machine);
    toast.subscribe(|snapshot| {
        println!(
            "  [{:>10}] progress={}",
            snapshot.value,
            snapshot.context.get("progress").and_then(|p| p.get("value")).unwrap_or(&json!(0)),
        );
    });

    toast.start().unwrap();
    println!("Started in {:?}\n", toast.state().value);

    println!("Hovering pauses the toast after 400ms:");
    toast.advance(400).unwrap();
    toast.send("PAUSE").unwrap();
    println!(
        "Paused with {}ms remaining\n",
        toast.state().context.get_u64("duration").unwrap_or(0)
    );

    println!("While paused, time passing changes nothing:");
    toast.advance(5000).unwrap();
    println!("Still {:?}\n", toast.state().value);

    println!("Resuming runs out the remaining duration:");
    toast.send("RESUME").unwrap();
    toast.advance(600).unwrap();
    println!("Now {:?}\n", toast.state().value);

    println!("The dismiss animation finishes and the toast goes terminal:");
    toast.advance(300).unwrap();
    println!("Final state: {:?}", toast.state().value);

    println!("\n=== Demo Complete ===");
}
