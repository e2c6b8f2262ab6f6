//! Scenario tests for a tabs machine: focus movement with and without
//! looping, selection, and blur.

use serde_json::{json, Value};
use uimachines::{Context, Event, Interpreter, MachineBuilder, MachineDefinition, StateBuilder, TransitionBuilder};

fn tab_ids(ctx: &Context) -> Vec<String> {
    ctx.get("tabIds")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Index of the focused tab's neighbor, honoring the `loop` flag: at the
/// edge, a looping tablist wraps while a non-looping one stays put.
fn step(ctx: &mut Context, forward: bool) {
    let ids = tab_ids(ctx);
    let Some(focused) = ctx.get_str("focusedId").map(str::to_string) else {
        return;
    };
    let Some(idx) = ids.iter().position(|id| *id == focused) else {
        return;
    };
    let looping = ctx.get_bool("loop") == Some(true);
    let last = ids.len() - 1;
    let next = match (forward, idx, looping) {
        (true, i, _) if i < last => i + 1,
        (true, _, true) => 0,
        (true, i, false) => i,
        (false, 0, true) => last,
        (false, 0, false) => 0,
        (false, i, _) => i - 1,
    };
    ctx.set("focusedId", ids[next].clone());
}

fn tabs_machine(loop_focus: bool) -> MachineDefinition {
    MachineBuilder::new("tabs")
        .initial("idle")
        .context(json!({
            "tabIds": ["a", "b", "c"],
            "value": "a",
            "focusedId": null,
            "loop": loop_focus,
        }))
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
                .on("TAB_FOCUS", TransitionBuilder::internal().action("setFocusedId"))
                .on("ARROW_RIGHT", TransitionBuilder::internal().action("focusNext"))
                .on("ARROW_LEFT", TransitionBuilder::internal().action("focusPrev"))
                .on("TAB_CLICK", TransitionBuilder::internal().action("setValue"))
                .on("BLUR", TransitionBuilder::to("idle").action("clearFocusedId")),
        )
        .action("setFocusedId", |ctx, evt, _| {
            if let Some(id) = evt.get_str("id") {
                ctx.set("focusedId", id.to_string());
            }
        })
        .action("clearFocusedId", |ctx, _, _| ctx.set("focusedId", Value::Null))
        .action("focusNext", |ctx, _, _| step(ctx, true))
        .action("focusPrev", |ctx, _, _| step(ctx, false))
        .action("setValue", |ctx, evt, _| {
            if let Some(id) = evt.get_str("id") {
                ctx.set("value", id.to_string());
            }
        })
        .build()
        .unwrap()
}

fn focused(interp: &Interpreter) -> Option<String> {
    interp.state().context.get_str("focusedId").map(str::to_string)
}

#[test]
fn next_from_last_wraps_when_looping() {
    let mut tabs = Interpreter::new(tabs_machine(true));
    tabs.start().unwrap();

    tabs.send(Event::new("TAB_FOCUS").with("id", "c")).unwrap();
    tabs.send("ARROW_RIGHT").unwrap();

    assert_eq!(focused(&tabs), Some("a".into()));
}

#[test]
fn next_from_last_stays_put_without_looping() {
    let mut tabs = Interpreter::new(tabs_machine(false));
    tabs.start().unwrap();

    tabs.send(Event::new("TAB_FOCUS").with("id", "c")).unwrap();
    tabs.send("ARROW_RIGHT").unwrap();

    assert_eq!(focused(&tabs), Some("c".into()));
}

#[test]
fn prev_from_first_wraps_when_looping() {
    let mut tabs = Interpreter::new(tabs_machine(true));
    tabs.start().unwrap();

    tabs.send(Event::new("TAB_FOCUS").with("id", "a")).unwrap();
    tabs.send("ARROW_LEFT").unwrap();

    assert_eq!(focused(&tabs), Some("c".into()));
}

#[test]
fn prev_from_first_stays_put_without_looping() {
    let mut tabs = Interpreter::new(tabs_machine(false));
    tabs.start().unwrap();

    tabs.send(Event::new("TAB_FOCUS").with("id", "a")).unwrap();
    tabs.send("ARROW_LEFT").unwrap();

    assert_eq!(focused(&tabs), Some("a".into()));
}

#[test]
fn arrows_walk_the_tablist_in_order() {
    let mut tabs = Interpreter::new(tabs_machine(true));
    tabs.start().unwrap();

    tabs.send(Event::new("TAB_FOCUS").with("id", "a")).unwrap();
    tabs.send("ARROW_RIGHT").unwrap();
    assert_eq!(focused(&tabs), Some("b".into()));
    tabs.send("ARROW_RIGHT").unwrap();
    assert_eq!(focused(&tabs), Some("c".into()));
    tabs.send("ARROW_LEFT").unwrap();
    assert_eq!(focused(&tabs), Some("b".into()));
}

#[test]
fn click_selects_without_moving_focus() {
    let mut tabs = Interpreter::new(tabs_machine(true));
    tabs.start().unwrap();

    tabs.send(Event::new("TAB_FOCUS").with("id", "b")).unwrap();
    tabs.send(Event::new("TAB_CLICK").with("id", "b")).unwrap();

    let snapshot = tabs.state();
    assert_eq!(snapshot.value, "focused");
    assert_eq!(snapshot.context.get_str("value"), Some("b"));
    assert_eq!(focused(&tabs), Some("b".into()));
}

#[test]
fn blur_returns_to_idle_and_clears_focus() {
    let mut tabs = Interpreter::new(tabs_machine(true));
    tabs.start().unwrap();

    tabs.send(Event::new("TAB_FOCUS").with("id", "b")).unwrap();
    tabs.send("BLUR").unwrap();

    assert!(tabs.matches("idle"));
    assert_eq!(focused(&tabs), None);
}

#[test]
fn arrow_keys_do_nothing_while_idle() {
    let mut tabs = Interpreter::new(tabs_machine(true));
    tabs.start().unwrap();
    let before = tabs.state();

    tabs.send("ARROW_RIGHT").unwrap();
    assert_eq!(tabs.state(), before);
}
