use super::{connect, test_config, TARGET};
use crate::errors::AutomationError;
use crate::platforms::simulated::{SimNodeBuilder, SimulatedBridge};
use crate::selector::Selector;
use std::time::Duration;
use tokio::time::sleep;

fn searchable_bridge() -> SimulatedBridge {
    let bridge = SimulatedBridge::new((1080, 1920));
    bridge.add_screen(
        "empty",
        TARGET,
        SimNodeBuilder::new("android.widget.FrameLayout"),
    );
    bridge.add_screen(
        "loaded",
        TARGET,
        SimNodeBuilder::new("android.widget.FrameLayout").child(
            SimNodeBuilder::new("android.widget.TextView")
                .resource_id("app:id/late")
                .text("arrived"),
        ),
    );
    bridge.set_stack(&["empty"]);
    bridge
}

#[tokio::test(start_paused = true)]
async fn test_wait_times_out_when_element_never_appears() {
    let (session, _bridge) = connect(searchable_bridge(), test_config());

    let result = session
        .locator(Selector::resource_id("app:id/late"))
        .set_default_timeout(Duration::from_millis(800))
        .wait()
        .await;

    match result {
        Err(AutomationError::Timeout(msg)) => assert!(msg.contains("app:id/late")),
        other => panic!("Expected timeout, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_wait_picks_up_element_appearing_later() {
    let mut config = test_config();
    config.delays.wait_poll_ms = 50;
    let (session, bridge) = connect(searchable_bridge(), config);

    let locator = session
        .locator(Selector::resource_id("app:id/late"))
        .set_default_timeout(Duration::from_secs(5));

    let switcher = async {
        sleep(Duration::from_millis(300)).await;
        bridge.set_stack(&["loaded"]);
    };
    let (found, ()) = tokio::join!(locator.wait(), switcher);

    assert_eq!(found.unwrap().text().unwrap(), "arrived");
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_accessors_do_not_wait() {
    let (session, bridge) = connect(searchable_bridge(), test_config());

    let locator = session.locator("id:app:id/late");
    assert!(locator.first().is_none());
    assert!(locator.all().is_empty());

    bridge.set_stack(&["loaded"]);
    assert!(locator.first().is_some());
    assert_eq!(locator.visible().len(), 1);

    // A node flagged invisible still matches `first` but not `visible`.
    bridge
        .find_screen_node("loaded", "app:id/late")
        .unwrap()
        .set_visible(false);
    assert!(locator.visible().is_empty());
    assert!(locator.first().is_some());
}
