use super::{connect, test_config, HOST, LAUNCHER, TARGET};
use crate::platforms::simulated::{ClickEffect, SimNodeBuilder, SimulatedBridge};

fn plain_screen() -> SimNodeBuilder {
    SimNodeBuilder::new("android.widget.FrameLayout")
}

fn home_screen() -> SimNodeBuilder {
    plain_screen().child(
        SimNodeBuilder::new("android.widget.ImageView")
            .resource_id("sg.bigo.live:id/iv_search")
            .clickable(),
    )
}

#[test]
fn test_foreground_detection_by_substring() {
    let bridge = SimulatedBridge::new((1080, 1920));
    bridge.add_screen("a", "sg.bigo.live.lite", plain_screen());
    bridge.set_stack(&["a"]);
    let (session, _bridge) = connect(bridge, test_config());

    assert!(session.is_app_foreground(None));
    assert!(session.is_app_foreground(Some("sg.bigo.live")));
    assert!(!session.is_app_foreground(Some("com.other.app")));
}

#[test]
fn test_credential_manager_counts_as_foreground() {
    let bridge = SimulatedBridge::new((1080, 1920));
    bridge.add_screen("login", "com.google.android.gms", plain_screen());
    bridge.set_stack(&["login"]);
    let (session, _bridge) = connect(bridge, test_config());

    assert!(session.is_app_foreground(None));
    assert!(session.is_app_foreground(Some("com.whatever.else")));
}

#[tokio::test(start_paused = true)]
async fn test_short_back_respects_press_bound() {
    let bridge = SimulatedBridge::new((1080, 1920));
    for name in ["s1", "s2", "s3", "s4", "s5", "s6"] {
        bridge.add_screen(name, TARGET, plain_screen());
    }
    bridge.set_stack(&["s1", "s2", "s3", "s4", "s5", "s6"]);
    let (session, bridge) = connect(bridge, test_config());

    // The target never leaves the foreground within the bound; exactly
    // three presses are issued anyway.
    assert!(session.go_back(3, true).await);
    assert_eq!(bridge.back_press_count(), 3);
    assert_eq!(bridge.current_screen().unwrap(), "s3");
}

#[tokio::test(start_paused = true)]
async fn test_short_back_stops_pressing_once_target_left() {
    let bridge = SimulatedBridge::new((1080, 1920));
    bridge.add_screen("other", "com.other.app", plain_screen());
    bridge.add_screen("t1", TARGET, plain_screen());
    bridge.set_stack(&["other", "t1"]);
    let (session, bridge) = connect(bridge, test_config());

    assert!(session.go_back(5, true).await);
    // One press leaves the target; the rest are withheld.
    assert_eq!(bridge.back_press_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_long_back_stops_at_home_marker() {
    let bridge = SimulatedBridge::new((1080, 1920));
    bridge.add_screen("home", TARGET, home_screen());
    bridge.add_screen("deep1", TARGET, plain_screen());
    bridge.add_screen("deep2", TARGET, plain_screen());
    bridge.set_stack(&["home", "deep1", "deep2"]);
    let (session, bridge) = connect(bridge, test_config());

    assert!(session.go_back(10, true).await);
    // The walk pressed back until the feed appeared, then stopped there.
    assert_eq!(bridge.current_screen().unwrap(), "home");
}

#[tokio::test(start_paused = true)]
async fn test_long_back_exit_leaves_target_and_relaunches_host() {
    let bridge = SimulatedBridge::new((1080, 1920));
    bridge.add_screen("launcher", LAUNCHER, plain_screen());
    bridge.add_screen("host_home", HOST, plain_screen());
    bridge.add_screen("home", TARGET, home_screen());
    bridge.add_screen("deep", TARGET, plain_screen());
    bridge.register_entry(HOST, "host_home");
    bridge.set_stack(&["launcher", "home", "deep"]);
    let (session, bridge) = connect(bridge, test_config());

    assert!(session.go_back(10, false).await);
    // The walk backed all the way out of the target, then brought the
    // automation's own app to the front.
    assert_eq!(bridge.current_screen().unwrap(), "host_home");
    assert!(bridge.launched_packages().contains(&HOST.to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_long_back_without_root_reports_failure() {
    let bridge = SimulatedBridge::new((1080, 1920));
    let (session, _bridge) = connect(bridge, test_config());

    assert!(!session.go_back(10, true).await);
}

#[tokio::test(start_paused = true)]
async fn test_popup_dismissal_probes_known_ids() {
    let bridge = SimulatedBridge::new((1080, 1920));
    bridge.add_screen("base", TARGET, home_screen());
    bridge.add_screen(
        "autofill",
        TARGET,
        plain_screen().child(
            SimNodeBuilder::new("android.widget.Button")
                .resource_id("android:id/autofill_dialog_no")
                .text("No thanks")
                .clickable()
                .on_click(ClickEffect::Pop),
        ),
    );
    bridge.set_stack(&["base", "autofill"]);
    let (session, bridge) = connect(bridge, test_config());

    session.dismiss_popups().await;
    assert_eq!(bridge.current_screen().unwrap(), "base");
}

#[tokio::test(start_paused = true)]
async fn test_popup_dismissal_closes_sheet_by_description() {
    let bridge = SimulatedBridge::new((1080, 1920));
    bridge.add_screen("base", TARGET, home_screen());
    bridge.add_screen(
        "sheet",
        TARGET,
        plain_screen().child(
            SimNodeBuilder::new("android.view.View")
                .description("Close sheet")
                .clickable()
                .on_click(ClickEffect::Pop),
        ),
    );
    bridge.set_stack(&["base", "sheet"]);
    let (session, bridge) = connect(bridge, test_config());

    session.dismiss_popups().await;
    assert_eq!(bridge.current_screen().unwrap(), "base");
}

#[tokio::test(start_paused = true)]
async fn test_popup_dismissal_is_silent_when_nothing_matches() {
    let bridge = SimulatedBridge::new((1080, 1920));
    bridge.add_screen("base", TARGET, home_screen());
    bridge.set_stack(&["base"]);
    let (session, bridge) = connect(bridge, test_config());

    session.dismiss_popups().await;
    assert_eq!(bridge.current_screen().unwrap(), "base");
    assert_eq!(bridge.back_press_count(), 0);
}

#[test]
fn test_launch_app_skips_when_already_foreground() {
    let bridge = SimulatedBridge::new((1080, 1920));
    bridge.add_screen("home", TARGET, home_screen());
    bridge.register_entry(TARGET, "home");
    bridge.set_stack(&["home"]);
    let (session, bridge) = connect(bridge, test_config());

    assert!(session.launch_app(TARGET));
    assert!(bridge.launched_packages().is_empty());
}

#[test]
fn test_launch_app_reports_missing_entry_point() {
    let bridge = SimulatedBridge::new((1080, 1920));
    bridge.add_screen("other", "com.other.app", plain_screen());
    bridge.set_stack(&["other"]);
    let (session, _bridge) = connect(bridge, test_config());

    assert!(!session.launch_app("com.not.installed"));
}
