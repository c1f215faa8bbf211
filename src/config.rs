//! Per-app-version automation configuration.
//!
//! Resource identifiers and localized labels are a fragile, versioned
//! contract with the target app: they break silently when the target
//! changes its UI. Everything here is plain data, deserializable from a
//! config file, so an identifier bump never needs a code change.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Package identifiers involved in a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packages {
    /// The app being driven
    pub target: String,
    /// The automation host app itself, relaunched after a full back-out
    pub host: String,
    /// Credential-manager overlay; counts as "target foreground" so system
    /// login prompts do not read as the target having been left
    pub credential_manager: String,
}

impl Default for Packages {
    fn default() -> Self {
        Self {
            target: "sg.bigo.live".to_string(),
            host: "com.bigolive.scrapper".to_string(),
            credential_manager: "com.google.android.gms".to_string(),
        }
    }
}

/// Resource identifiers pinned to the target app version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorTable {
    pub search_button: String,
    pub search_input: String,
    pub search_confirm: String,
    pub tab_title: String,
    pub result_avatar: String,
    pub contrib_entry: String,
    pub contrib_label: String,
    pub user_name: String,
    pub contribution_amount: String,
    pub user_level: String,
    pub profile_id: String,
    /// Element whose presence identifies the target app's home screen
    pub home_marker: String,
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self {
            search_button: "sg.bigo.live:id/iv_search".to_string(),
            search_input: "sg.bigo.live:id/searchInput".to_string(),
            search_confirm: "sg.bigo.live:id/searchOrCancel".to_string(),
            tab_title: "sg.bigo.live:id/uiTabTitle".to_string(),
            result_avatar: "sg.bigo.live:id/avatar_container".to_string(),
            contrib_entry: "sg.bigo.live:id/fl_contrib_entry".to_string(),
            contrib_label: "sg.bigo.live:id/tv_contribute".to_string(),
            user_name: "sg.bigo.live:id/tv_name".to_string(),
            contribution_amount: "sg.bigo.live:id/tv_contribution".to_string(),
            user_level: "sg.bigo.live:id/tv_user_level".to_string(),
            profile_id: "sg.bigo.live:id/tv_bigo_id".to_string(),
            home_marker: "sg.bigo.live:id/iv_search".to_string(),
        }
    }
}

/// Ordered label fallback chains for the posting affordances.
///
/// Each chain is tried in order until one click lands; the lists mix
/// locales because the target ships localized UI and the device locale is
/// not known in advance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelTable {
    pub compose: Vec<String>,
    pub photo_video: Vec<String>,
    pub select_photo: Vec<String>,
    pub select_video: Vec<String>,
    pub next: Vec<String>,
    pub post: Vec<String>,
    pub share_now: Vec<String>,
    pub contribution: Vec<String>,
}

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for LabelTable {
    fn default() -> Self {
        Self {
            compose: labels(&[
                "Create post",
                "Beitrag erstellen",
                "What's on your mind?",
                "Was machst du gerade?",
            ]),
            photo_video: labels(&["Photo/video", "Foto/Video"]),
            select_photo: labels(&["Photo", "Foto"]),
            select_video: labels(&["Video", "Video"]),
            next: labels(&["NEXT", "WEITER"]),
            post: labels(&["POST", "POSTEN"]),
            share_now: labels(&["Share now", "Jetzt teilen"]),
            contribution: labels(&["Contribution", "Beitrag"]),
        }
    }
}

/// Resource identifiers of known interstitial popups, probed in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupTable {
    pub dismiss_ids: Vec<String>,
    /// Content description of the sheet-close affordance probed before the
    /// id list
    pub close_sheet_description: String,
}

impl Default for PopupTable {
    fn default() -> Self {
        Self {
            dismiss_ids: labels(&[
                "android:id/autofill_dialog_no",
                "com.google.android.gms:id/touch_outside",
                "com.google.android.gms:id/cancel",
                "android:id/autofill_save_no",
            ]),
            close_sheet_description: "Close sheet".to_string(),
        }
    }
}

/// Settle delays and poll intervals, all in milliseconds.
///
/// These are pauses for the target app's UI to finish rendering after an
/// action, not network waits. Tests shrink them to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delays {
    pub launch_settle_ms: u64,
    pub nav_settle_ms: u64,
    pub step_settle_ms: u64,
    pub tab_settle_ms: u64,
    pub publish_settle_ms: u64,
    pub back_press_gap_ms: u64,
    pub long_back_poll_ms: u64,
    pub long_back_press_gap_ms: u64,
    pub popup_pause_ms: u64,
    pub wait_poll_ms: u64,
    pub wait_timeout_ms: u64,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            launch_settle_ms: 3000,
            nav_settle_ms: 2000,
            step_settle_ms: 1000,
            tab_settle_ms: 1500,
            publish_settle_ms: 3000,
            back_press_gap_ms: 500,
            long_back_poll_ms: 1000,
            long_back_press_gap_ms: 100,
            popup_pause_ms: 1000,
            wait_poll_ms: 500,
            wait_timeout_ms: 5000,
        }
    }
}

impl Delays {
    pub fn launch_settle(&self) -> Duration {
        Duration::from_millis(self.launch_settle_ms)
    }
    pub fn nav_settle(&self) -> Duration {
        Duration::from_millis(self.nav_settle_ms)
    }
    pub fn step_settle(&self) -> Duration {
        Duration::from_millis(self.step_settle_ms)
    }
    pub fn tab_settle(&self) -> Duration {
        Duration::from_millis(self.tab_settle_ms)
    }
    pub fn publish_settle(&self) -> Duration {
        Duration::from_millis(self.publish_settle_ms)
    }
    pub fn back_press_gap(&self) -> Duration {
        Duration::from_millis(self.back_press_gap_ms)
    }
    pub fn long_back_poll(&self) -> Duration {
        Duration::from_millis(self.long_back_poll_ms)
    }
    pub fn long_back_press_gap(&self) -> Duration {
        Duration::from_millis(self.long_back_press_gap_ms)
    }
    pub fn popup_pause(&self) -> Duration {
        Duration::from_millis(self.popup_pause_ms)
    }
    pub fn wait_poll(&self) -> Duration {
        Duration::from_millis(self.wait_poll_ms)
    }
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// All-zero delays for simulated-bridge runs
    pub fn none() -> Self {
        Self {
            launch_settle_ms: 0,
            nav_settle_ms: 0,
            step_settle_ms: 0,
            tab_settle_ms: 0,
            publish_settle_ms: 0,
            back_press_gap_ms: 0,
            long_back_poll_ms: 0,
            long_back_press_gap_ms: 0,
            popup_pause_ms: 0,
            wait_poll_ms: 0,
            wait_timeout_ms: 0,
        }
    }
}

/// Avatar-URL enrichment settings.
///
/// The fetch hits a public web page per scraped user, so it is an explicit
/// switched and rate-limited step rather than an implicit side effect of
/// scraping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    pub profile_host: String,
    pub timeout_ms: u64,
    pub min_interval_ms: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            profile_host: "https://www.bigo.tv".to_string(),
            timeout_ms: 10_000,
            min_interval_ms: 500,
        }
    }
}

impl EnrichmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// Everything one target app version pins: packages, identifiers, labels,
/// popups, timing and enrichment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub packages: Packages,
    #[serde(default)]
    pub selectors: SelectorTable,
    #[serde(default)]
    pub labels: LabelTable,
    #[serde(default)]
    pub popups: PopupTable,
    #[serde(default)]
    pub delays: Delays,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    /// Suppresses the final publish click of the posting workflow
    #[serde(default)]
    pub test_mode: bool,
}
