use super::{connect, test_config, TARGET};
use crate::platforms::simulated::{ClickEffect, SimNodeBuilder, SimulatedBridge};
use crate::query;
use crate::Session;
use std::sync::Arc;
use std::time::Duration;

fn single_screen(root: SimNodeBuilder) -> (Session, Arc<SimulatedBridge>) {
    let bridge = SimulatedBridge::new((1000, 2000));
    bridge.add_screen("main", TARGET, root);
    bridge.add_screen("next", TARGET, SimNodeBuilder::new("android.widget.FrameLayout"));
    bridge.set_stack(&["main"]);
    connect(bridge, test_config())
}

#[test]
fn test_click_native_action_on_clickable_node() {
    let (session, bridge) = single_screen(
        SimNodeBuilder::new("android.widget.FrameLayout").child(
            SimNodeBuilder::new("android.widget.Button")
                .text("Go")
                .clickable()
                .on_click(ClickEffect::Push("next".into())),
        ),
    );
    let root = session.root().unwrap();
    let button = query::find_by_text(&root, "Go", true).unwrap();

    assert!(session.click_node(&button));
    assert_eq!(bridge.current_screen().unwrap(), "next");
    // Accessibility action sufficed; no gesture was synthesized.
    assert!(bridge.dispatched_gestures().is_empty());
}

#[test]
fn test_click_falls_back_to_parent() {
    let (session, bridge) = single_screen(
        SimNodeBuilder::new("android.widget.FrameLayout").child(
            SimNodeBuilder::new("android.widget.LinearLayout")
                .clickable()
                .on_click(ClickEffect::Push("next".into()))
                .child(SimNodeBuilder::new("android.widget.TextView").text("Row label")),
        ),
    );
    let root = session.root().unwrap();
    let label = query::find_by_text(&root, "Row label", true).unwrap();

    assert!(!label.is_clickable());
    assert!(session.click_node(&label));
    assert_eq!(bridge.current_screen().unwrap(), "next");
}

#[test]
fn test_click_falls_back_to_centroid_tap() {
    let (session, bridge) = single_screen(
        SimNodeBuilder::new("android.widget.FrameLayout").child(
            // Neither the node nor its parent accepts the native action;
            // only the synthesized tap lands.
            SimNodeBuilder::new("android.widget.TextView")
                .text("Tap target")
                .bounds(100, 100, 300, 200)
                .on_click(ClickEffect::Push("next".into())),
        ),
    );
    let root = session.root().unwrap();
    let target = query::find_by_text(&root, "Tap target", true).unwrap();

    assert!(session.click_node(&target));
    assert_eq!(bridge.current_screen().unwrap(), "next");

    let gestures = bridge.dispatched_gestures();
    assert_eq!(gestures.len(), 1);
    assert!(gestures[0].is_tap());
    assert_eq!(gestures[0].start, (200.0, 150.0));
}

#[test]
fn test_click_fails_closed_without_gesture_support() {
    let (session, bridge) = single_screen(
        SimNodeBuilder::new("android.widget.FrameLayout").child(
            SimNodeBuilder::new("android.widget.TextView")
                .text("Tap target")
                .on_click(ClickEffect::Push("next".into())),
        ),
    );
    bridge.set_gestures_enabled(false);

    let root = session.root().unwrap();
    let target = query::find_by_text(&root, "Tap target", true).unwrap();
    assert!(!session.click_node(&target));
    assert_eq!(bridge.current_screen().unwrap(), "main");
}

#[test]
fn test_click_by_resource_id_indexed() {
    let (session, bridge) = single_screen(
        SimNodeBuilder::new("android.widget.FrameLayout")
            .child(
                SimNodeBuilder::new("android.widget.Button")
                    .resource_id("app:id/item")
                    .clickable(),
            )
            .child(
                SimNodeBuilder::new("android.widget.Button")
                    .resource_id("app:id/item")
                    .clickable()
                    .on_click(ClickEffect::Push("next".into())),
            ),
    );

    assert!(session.click_by_resource_id("app:id/item", 1));
    assert_eq!(bridge.current_screen().unwrap(), "next");
    assert!(!session.click_by_resource_id("app:id/item", 5));
    assert!(!session.click_by_resource_id("app:id/absent", 0));
}

#[test]
fn test_text_injection() {
    let (session, bridge) = single_screen(
        SimNodeBuilder::new("android.widget.FrameLayout")
            .child(SimNodeBuilder::new("android.widget.TextView").text("static"))
            .child(
                SimNodeBuilder::new("android.widget.EditText")
                    .editable()
                    .resource_id("app:id/caption"),
            ),
    );

    assert!(session.input_text("hello from the engine", 0));
    let field = bridge
        .find_screen_node("main", "app:id/caption")
        .unwrap();
    assert_eq!(field.text().unwrap(), "hello from the engine");

    assert!(session.input_text_by_resource_id("app:id/caption", "rewritten"));
    assert!(!session.input_text_by_resource_id("app:id/absent", "x"));
    // Set-text on a non-editable node is rejected, no retry.
    assert!(!session.input_text("nope", 1));
}

#[test]
fn test_reading_texts_by_resource_id() {
    let (session, _bridge) = single_screen(
        SimNodeBuilder::new("android.widget.FrameLayout")
            .child(
                SimNodeBuilder::new("android.widget.TextView")
                    .resource_id("app:id/amount")
                    .text("1,204"),
            )
            .child(
                SimNodeBuilder::new("android.widget.TextView")
                    .resource_id("app:id/amount")
                    .text("987"),
            ),
    );

    assert_eq!(
        session.text_by_resource_id("app:id/amount").unwrap(),
        "1,204"
    );
    assert_eq!(
        session.all_texts_by_resource_id("app:id/amount"),
        vec!["1,204", "987"]
    );
    assert!(session.text_by_resource_id("app:id/absent").is_none());
}

#[test]
fn test_swipe_geometry() {
    let (session, bridge) = single_screen(SimNodeBuilder::new("android.widget.FrameLayout"));

    assert!(session.swipe_up(Duration::from_millis(400)));
    assert!(session.swipe_down(Duration::from_millis(400)));
    assert!(session.swipe_right_to_left(Duration::from_millis(300)));

    let gestures = bridge.dispatched_gestures();
    assert_eq!(gestures.len(), 3);

    // Vertical swipes travel between 78% and 35% of height at mid-width.
    assert_eq!(gestures[0].start, (500.0, 1560.0));
    assert_eq!(gestures[0].end, (500.0, 700.0));
    assert_eq!(gestures[1].start, (500.0, 700.0));
    assert_eq!(gestures[1].end, (500.0, 1560.0));
    // Horizontal swipe runs from 90% to 10% of width at mid-height.
    assert_eq!(gestures[2].start, (900.0, 1000.0));
    assert_eq!(gestures[2].end, (100.0, 1000.0));
}

#[test]
fn test_swipes_fail_closed_without_gesture_support() {
    let (session, bridge) = single_screen(SimNodeBuilder::new("android.widget.FrameLayout"));
    bridge.set_gestures_enabled(false);

    assert!(!session.swipe_up(Duration::from_millis(400)));
    assert!(!session.tap_at_fraction(0.9, 0.2));
    assert!(bridge.dispatched_gestures().is_empty());
}

#[test]
fn test_tap_at_fraction() {
    let (session, bridge) = single_screen(SimNodeBuilder::new("android.widget.FrameLayout"));

    assert!(session.tap_at_fraction(0.9, 0.2));
    let gestures = bridge.dispatched_gestures();
    assert_eq!(gestures[0].start, (900.0, 400.0));
    assert!(gestures[0].is_tap());
}

#[test]
fn test_click_top_right_action_prefers_rightmost_then_topmost() {
    let (session, bridge) = single_screen(
        SimNodeBuilder::new("android.widget.FrameLayout")
            .child(
                // Center-left: outside the corner region.
                SimNodeBuilder::new("android.widget.Button")
                    .text("Draft")
                    .bounds(400, 50, 600, 150)
                    .clickable(),
            )
            .child(
                SimNodeBuilder::new("android.widget.TextView")
                    .text("Save")
                    .bounds(760, 20, 840, 80)
                    .clickable(),
            )
            .child(
                SimNodeBuilder::new("android.widget.Button")
                    .text("Post")
                    .bounds(860, 40, 980, 120)
                    .clickable()
                    .on_click(ClickEffect::Push("next".into())),
            ),
    );

    assert!(session.click_top_right_action());
    assert_eq!(bridge.current_screen().unwrap(), "next");
}

#[test]
fn test_click_top_right_action_without_candidates() {
    let (session, _bridge) = single_screen(
        SimNodeBuilder::new("android.widget.FrameLayout").child(
            SimNodeBuilder::new("android.widget.Button")
                .text("Bottom")
                .bounds(800, 1800, 950, 1900)
                .clickable(),
        ),
    );
    assert!(!session.click_top_right_action());
}

#[test]
fn test_scroll_forward_on_indexed_container() {
    let (session, _bridge) = single_screen(
        SimNodeBuilder::new("android.widget.FrameLayout")
            .child(SimNodeBuilder::new("androidx.recyclerview.widget.RecyclerView").scrollable()),
    );

    assert!(session.scroll_forward(0));
    assert!(!session.scroll_forward(1));

    let root = session.root().unwrap();
    let list = query::find_scrollable(&root, 0).unwrap();
    assert!(list.perform_scroll_backward());
}

#[test]
fn test_tap_first_click_variant_leads_with_gesture() {
    let (session, bridge) = single_screen(
        SimNodeBuilder::new("android.widget.FrameLayout").child(
            SimNodeBuilder::new("android.widget.Button")
                .text("Go")
                .bounds(0, 0, 200, 100)
                .clickable()
                .on_click(ClickEffect::Push("next".into())),
        ),
    );
    let root = session.root().unwrap();
    let button = query::find_by_text(&root, "Go", true).unwrap();

    assert!(session.click_node_tap_first(&button));
    assert_eq!(bridge.current_screen().unwrap(), "next");
    assert_eq!(bridge.dispatched_gestures().len(), 1);
}
