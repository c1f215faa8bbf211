//! Navigation control: foreground detection, back-navigation with
//! home-stop semantics, popup dismissal, and app launching.

use crate::query;
use crate::Session;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Back-navigation bounds below this value run the short burst mode;
/// bounds at or above it run the home-marker walk.
pub const LONG_BACK_THRESHOLD: u32 = 10;

/// Bound used by workflows for the long walk back to a resting state
pub const LONG_BACK_BOUND: u32 = 10;

impl Session {
    /// Whether the given package (or the configured target when `None`)
    /// owns the current foreground window.
    ///
    /// Matching is substring containment: target apps ship regional
    /// package variants sharing a common stem. The credential-manager
    /// overlay always counts as foreground so a system login prompt does
    /// not read as the target having been left.
    pub fn is_app_foreground(&self, package: Option<&str>) -> bool {
        let Some(current) = self.foreground_package() else {
            debug!("Foreground check: no active window root");
            return false;
        };
        if current == self.config().packages.credential_manager {
            return true;
        }
        let target = package.unwrap_or(&self.config().packages.target);
        let result = current.contains(target);
        debug!("Foreground check: current={current}, target={target}, result={result}");
        result
    }

    /// Navigate backwards.
    ///
    /// Short mode (`max_attempts` < [`LONG_BACK_THRESHOLD`]) presses back
    /// up to the bound, but only while the target app stays foreground.
    /// Used for small local corrections like hiding the keyboard.
    ///
    /// Long mode repeatedly polls for the home-marker element. With
    /// `stop_at_home` the walk stops as soon as the marker appears,
    /// leaving the target app at its feed (workflow entry). Without it
    /// the walk keeps pressing past the marker until the target leaves
    /// the foreground, then relaunches the automation's own app to
    /// guarantee a clean resting state (workflow exit).
    #[instrument(level = "debug", skip(self))]
    pub async fn go_back(&self, max_attempts: u32, stop_at_home: bool) -> bool {
        let delays = self.config().delays.clone();

        if max_attempts < LONG_BACK_THRESHOLD {
            for _ in 0..max_attempts {
                if self.is_app_foreground(None) {
                    self.bridge().press_back();
                    sleep(delays.back_press_gap()).await;
                }
            }
            return true;
        }

        sleep(delays.nav_settle()).await;
        if self.root().is_none() {
            return false;
        }

        let home_marker = self.config().selectors.home_marker.clone();
        let mut reached_home = false;
        for _ in 0..max_attempts {
            sleep(delays.long_back_poll()).await;
            if let Some(root) = self.root() {
                if query::find_by_resource_id(&root, &home_marker, 0).is_some() {
                    if stop_at_home {
                        debug!("Home marker visible; stopping back-navigation");
                        return true;
                    }
                    reached_home = true;
                }
                if self.is_app_foreground(None) {
                    self.bridge().press_back();
                    sleep(delays.long_back_press_gap()).await;
                }
            }
        }

        if reached_home || !stop_at_home {
            let mut presses = 0;
            while self.is_app_foreground(None) && presses < max_attempts * 2 {
                self.bridge().press_back();
                presses += 1;
                sleep(delays.long_back_press_gap()).await;
            }
            let host = self.config().packages.host.clone();
            self.launch_app(&host);
        }

        true
    }

    /// Best-effort dismissal of known interstitial popups.
    ///
    /// A fixed, ordered probe list: the sheet-close affordance by content
    /// description, then each known dismiss resource id. Every probe is
    /// independent, misses are swallowed, and a successful dismissal is
    /// followed by a short pause. Bounded by the probe count; this never
    /// loops on tree state.
    #[instrument(level = "debug", skip(self))]
    pub async fn dismiss_popups(&self) {
        let delays = self.config().delays.clone();
        let popups = self.config().popups.clone();

        if let Some(root) = self.root() {
            let description = popups.close_sheet_description.as_str();
            if let Some(sheet) = query::find_first(&root, |node| {
                node.content_description().as_deref() == Some(description)
            }) {
                if self.click_node(&sheet) {
                    debug!("Dismissed sheet via content description");
                    sleep(delays.popup_pause()).await;
                }
            }
        }

        for id in &popups.dismiss_ids {
            if self.click_by_resource_id(id, 0) {
                info!("Dismissed popup: {id}");
                sleep(delays.popup_pause()).await;
            }
        }
    }

    /// Bring the package to the foreground, launching it if needed.
    /// Reports resolution failure, never retries.
    pub fn launch_app(&self, package: &str) -> bool {
        if self.is_app_foreground(Some(package)) {
            debug!("App {package} is already in foreground");
            return true;
        }
        let launched = self.bridge().launch_app(package);
        if !launched {
            warn!("No launch entry point found for {package}");
        }
        launched
    }
}
