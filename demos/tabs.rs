//! Tabs Machine
//!
//! This demo drives keyboard focus and selection for a tablist.
//!
//! Key concepts:
//! - Internal transitions (context changes without leaving the state)
//! - Guard-free transitions built straight from a state name
//! - Context-driven behavior (the `loop` flag decides edge wrapping)
//!
//! Run with: cargo run --example tabs

use serde_json::{json, Value};
use uimachines::{Context, Event, Interpreter, MachineBuilder, StateBuilder, TransitionBuilder};

fn focus_next(ctx: &mut Context) {
    let ids: Vec<String> = ctx
        .get("tabIds")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    let Some(focused) = ctx.get_str("focusedId").map(str::to_string) else {
        return;
    };
    let Some(idx) = ids.iter().position(|id| *id == focused) else {
        return;
    };
    let looping = ctx.get_bool("loop") == Some(true);
    let next = if idx + 1 < ids.len() {
        idx + 1
    } else if looping {
        0
    } else {
        idx
    };
    ctx.set("focusedId", ids[next].clone());
}

fn main() {
    println!("=== Tabs Machine ===\n");

    let machine = MachineBuilder::new("tabs")
        .initial("idle")
        .context(json!({
            "tabIds": ["general", "billing", "advanced"],
            "value": "general",
            "focusedId": null,
            "loop": true,
        }))
        .action("setFocusedId", |ctx, evt, _| {
            if let Some(id) = evt.get_str("id") {
                ctx.set("focusedId", id.to_string());
            }
        })
        .action("clearFocusedId", |ctx, _, _| ctx.set("focusedId", Value::Null))
        .action("focusNext", |ctx, _, _| focus_next(ctx))
        .action("setValue", |ctx, evt, _| {
            if let Some(id) = evt.get_str("id") {
                ctx.set("value", id.to_string());
            }
        })
        .state(
            "idle",
            StateBuilder::new().on(
                "TAB_FOCUS",
                TransitionBuilder::to("focused").action("setFocusedId"),
            ),
        )
        .state(
            "focused",
            StateBuilder::new()
                .on("ARROW_RIGHT", TransitionBuilder::internal().action("focusNext"))
                .on("TAB_CLICK", TransitionBuilder::internal().action("setValue"))
                .on("BLUR", TransitionBuilder::to("idle").action("clearFocusedId")),
        )
        .build()
        .unwrap();

    let mut tabs = Interpreter::new(machine);
    tabs.start().unwrap();
    println!("Started in {:?}", tabs.state().value);

    println!("\nFocus the first tab, then arrow through the list:");
    tabs.send(Event::new("TAB_FOCUS").with("id", "general")).unwrap();
    for _ in 0..4 {
        tabs.send("ARROW_RIGHT").unwrap();
        println!(
            "  focused = {:?}",
            tabs.state().context.get_str("focusedId").unwrap_or("-")
        );
    }
    println!("(looping wrapped focus past the last tab)");

    println!("\nClicking selects the focused tab:");
    tabs.send(Event::new("TAB_CLICK").with("id", "billing")).unwrap();
    println!(
        "  selected = {:?}",
        tabs.state().context.get_str("value").unwrap_or("-")
    );

    println!("\nBlurring returns to idle:");
    tabs.send("BLUR").unwrap();
    println!("  state = {:?}", tabs.state().value);

    println!("\n=== Demo Complete ===");
}
