//! Ranking-scrape workflow: navigate into the target's contribution
//! ranking, iterate its tabs, and assemble structured records into a JSON
//! document.

use super::click_any_label;
use crate::enrich::AvatarFetcher;
use crate::navigation::LONG_BACK_BOUND;
use crate::query;
use crate::selector::Selector;
use crate::utils::{decode_unicode_escapes, strip_id_prefix};
use crate::workflow::{step, RunContext, StepAbort, StepResult, Workflow};
use crate::Session;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// The ranking tabs, in click order. The order is meaningful: it drives
/// both tab navigation and the result document's keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabKind {
    Daily,
    Weekly,
    Monthly,
    Overall,
}

impl TabKind {
    pub const ALL: [TabKind; 4] = [
        TabKind::Daily,
        TabKind::Weekly,
        TabKind::Monthly,
        TabKind::Overall,
    ];

    pub fn title(self) -> &'static str {
        match self {
            TabKind::Daily => "Daily",
            TabKind::Weekly => "Weekly",
            TabKind::Monthly => "Monthly",
            TabKind::Overall => "Overall",
        }
    }
}

/// One tab's scrape bound
#[derive(Debug, Clone, Copy)]
pub struct TabConfig {
    pub kind: TabKind,
    pub max_items: usize,
}

impl TabConfig {
    pub fn name(&self) -> &'static str {
        self.kind.title()
    }
}

/// Scrape parameters
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Search query identifying the target user/host
    pub query: String,
    /// Record cap for the Overall tab: 10 in the standard configuration,
    /// 3 under the reduced test configuration
    pub overall_cap: usize,
}

impl ScrapeOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            overall_cap: 10,
        }
    }

    pub fn with_overall_cap(mut self, cap: usize) -> Self {
        self.overall_cap = cap;
        self
    }

    pub fn tab_plan(&self) -> [TabConfig; 4] {
        TabKind::ALL.map(|kind| TabConfig {
            kind,
            max_items: match kind {
                TabKind::Overall => self.overall_cap,
                _ => 3,
            },
        })
    }
}

/// One contributor row, assembled across the list and profile screens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedRecord {
    pub user_id: String,
    pub username: String,
    pub amount: String,
    pub rank_position: usize,
    pub user_level: String,
    pub profile_picture_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabCounts {
    #[serde(rename = "Daily")]
    pub daily: usize,
    #[serde(rename = "Weekly")]
    pub weekly: usize,
    #[serde(rename = "Monthly")]
    pub monthly: usize,
    #[serde(rename = "Overall")]
    pub overall: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeSummary {
    pub total_users_scraped: usize,
    pub total_tabs_scraped: usize,
    pub tabs: TabCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabData {
    #[serde(rename = "Daily")]
    pub daily: Vec<ScrapedRecord>,
    #[serde(rename = "Weekly")]
    pub weekly: Vec<ScrapedRecord>,
    #[serde(rename = "Monthly")]
    pub monthly: Vec<ScrapedRecord>,
    #[serde(rename = "Overall")]
    pub overall: Vec<ScrapedRecord>,
}

/// The aggregate result: summary totals plus per-tab record lists.
/// A tab that scraped nothing contributes an empty list, never a
/// document-level failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeDocument {
    pub summary: ScrapeSummary,
    pub data: TabData,
}

impl ScrapeDocument {
    pub fn assemble(tabs: &[(TabKind, Vec<ScrapedRecord>)]) -> Self {
        let mut document = ScrapeDocument::default();
        for (kind, records) in tabs {
            let count = records.len();
            match kind {
                TabKind::Daily => {
                    document.data.daily = records.clone();
                    document.summary.tabs.daily = count;
                }
                TabKind::Weekly => {
                    document.data.weekly = records.clone();
                    document.summary.tabs.weekly = count;
                }
                TabKind::Monthly => {
                    document.data.monthly = records.clone();
                    document.summary.tabs.monthly = count;
                }
                TabKind::Overall => {
                    document.data.overall = records.clone();
                    document.summary.tabs.overall = count;
                }
            }
            document.summary.total_users_scraped += count;
            if count > 0 {
                document.summary.total_tabs_scraped += 1;
            }
        }
        document
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Shared slot the scrape workflow publishes its document into, so the
/// caller can read the best-effort partial result even after a failure or
/// a stop request
#[derive(Clone, Default)]
pub struct DocumentSlot(Arc<Mutex<Option<ScrapeDocument>>>);

impl DocumentSlot {
    pub fn get(&self) -> Option<ScrapeDocument> {
        self.0.lock().unwrap().clone()
    }
}

pub struct ScrapeWorkflow {
    options: ScrapeOptions,
    output: DocumentSlot,
}

impl ScrapeWorkflow {
    pub fn new(options: ScrapeOptions) -> Self {
        Self {
            options,
            output: DocumentSlot::default(),
        }
    }

    /// Clone of the output slot; survives the workflow being moved into a
    /// spawned run
    pub fn document_slot(&self) -> DocumentSlot {
        self.output.clone()
    }

    async fn run_steps(
        &self,
        session: &Session,
        ctx: &RunContext,
        fetcher: &AvatarFetcher,
        collected: &mut Vec<(TabKind, Vec<ScrapedRecord>)>,
    ) -> Result<(), StepAbort> {
        let config = session.config().clone();
        let delays = &config.delays;
        let selectors = &config.selectors;

        step(ctx, "launch target app", async {
            if session.launch_app(&config.packages.target) {
                sleep(delays.launch_settle()).await;
                StepResult::ok("Target app in foreground")
            } else {
                StepResult::fail("Failed to launch target app")
            }
        })
        .await?;

        step(ctx, "navigate to home", async {
            if session.go_back(LONG_BACK_BOUND, true).await {
                sleep(delays.nav_settle()).await;
                StepResult::ok("At home feed")
            } else {
                StepResult::fail("Could not reach the target app's home screen")
            }
        })
        .await?;

        step(ctx, "open search", async {
            if session.click_by_resource_id(&selectors.search_button, 0) {
                sleep(delays.step_settle()).await;
                StepResult::ok("Search open")
            } else {
                StepResult::fail("Could not open search")
            }
        })
        .await?;

        step(ctx, "enter search query", async {
            let entered = session
                .input_text_by_resource_id(&selectors.search_input, &self.options.query)
                || session.input_text(&self.options.query, 0);
            if entered {
                sleep(delays.step_settle()).await;
                StepResult::ok("Query entered")
            } else {
                StepResult::fail("Could not find the search input")
            }
        })
        .await?;

        step(ctx, "hide keyboard", async {
            session.go_back(1, true).await;
            StepResult::ok("Keyboard hidden")
        })
        .await?;

        step(ctx, "confirm search", async {
            if session.click_by_resource_id(&selectors.search_confirm, 0) {
                sleep(delays.step_settle()).await;
                StepResult::ok("Search confirmed")
            } else {
                StepResult::fail("Could not confirm search")
            }
        })
        .await?;

        step(ctx, "open first result", async {
            if session.click_by_resource_id(&selectors.result_avatar, 0) {
                sleep(delays.nav_settle()).await;
                StepResult::ok("Profile open")
            } else {
                StepResult::fail("Could not open the first search result")
            }
        })
        .await?;

        step(ctx, "open contribution ranking", async {
            let opened = session.click_by_resource_id(&selectors.contrib_entry, 0)
                || session.click_by_resource_id(&selectors.contrib_label, 0)
                || click_any_label(session, &config.labels.contribution, false);
            if opened {
                sleep(delays.step_settle()).await;
                StepResult::ok("Ranking open")
            } else {
                StepResult::fail("Could not open the contribution ranking")
            }
        })
        .await?;

        for tab in self.options.tab_plan() {
            ctx.checkpoint()?;
            if !click_tab(session, &selectors.tab_title, tab.name()) {
                warn!("Could not open tab {}; emitting empty list", tab.name());
                collected.push((tab.kind, Vec::new()));
                continue;
            }
            sleep(delays.tab_settle()).await;
            let mut records = Vec::new();
            let result = scrape_tab(session, ctx, &tab, fetcher, &mut records).await;
            info!("Scraped {} records from tab {}", records.len(), tab.name());
            collected.push((tab.kind, records));
            result?;
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl Workflow for ScrapeWorkflow {
    fn name(&self) -> &str {
        "scrape"
    }

    async fn execute(&self, session: &Session, ctx: &RunContext) -> Result<String, StepAbort> {
        let fetcher = AvatarFetcher::new(session.config().enrichment.clone())?;
        let mut collected: Vec<(TabKind, Vec<ScrapedRecord>)> = Vec::new();

        let result = self
            .run_steps(session, ctx, &fetcher, &mut collected)
            .await;

        // Whatever was collected is published, even on abort.
        let document = ScrapeDocument::assemble(&collected);
        *self.output.0.lock().unwrap() = Some(document.clone());

        result?;
        document
            .to_json()
            .map_err(|e| StepAbort::Failed(format!("Could not serialize scrape document: {e}")))
    }
}

/// Click a ranking tab: prefer the visible tab-title node with the exact
/// text, fall back to a plain exact-text click. Visibility matters here:
/// animated tab transitions leave stale duplicates of the title nodes.
fn click_tab(session: &Session, tab_title_id: &str, name: &str) -> bool {
    if let Some(root) = session.root() {
        let tabs =
            query::filter_visible(query::find_all_by_resource_id(&root, tab_title_id));
        let matching = tabs.into_iter().find(|tab| {
            tab.text_or_description()
                .map(|text| text.trim() == name)
                .unwrap_or(false)
        });
        if let Some(tab) = matching {
            if session.click_node(&tab) {
                return true;
            }
        }
    }
    session.click_by_text(name, true)
}

/// Scrape up to `tab.max_items` entries from the currently visible tab.
///
/// Identity fields are snapshotted from the list before each navigation;
/// the true user id only exists on the profile screen, so every entry
/// clicks in, reads it, and navigates back. The list is re-queried on
/// every iteration because that round trip invalidates the tree. Only
/// cancellation aborts the tab; anything else degrades to a partial or
/// empty record.
async fn scrape_tab(
    session: &Session,
    ctx: &RunContext,
    tab: &TabConfig,
    fetcher: &AvatarFetcher,
    records: &mut Vec<ScrapedRecord>,
) -> Result<(), StepAbort> {
    let config = session.config().clone();
    let delays = &config.delays;
    let selectors = &config.selectors;

    let count = match session.root() {
        Some(root) => {
            let visible = query::filter_visible(query::find_all_by_resource_id(
                &root,
                &selectors.user_name,
            ));
            debug!(
                "Tab {}: {} visible entries, cap {}",
                tab.name(),
                visible.len(),
                tab.max_items
            );
            visible.len().min(tab.max_items)
        }
        None => {
            warn!("No active window while scraping tab {}", tab.name());
            return Ok(());
        }
    };

    for position in 0..count {
        ctx.checkpoint()?;

        let Some(root) = session.root() else {
            warn!("Lost the active window mid-tab; stopping {}", tab.name());
            break;
        };
        let names = query::filter_visible(query::find_all_by_resource_id(
            &root,
            &selectors.user_name,
        ));
        let Some(name_node) = names.get(position) else {
            warn!(
                "Entry {position} disappeared from tab {}; stopping",
                tab.name()
            );
            break;
        };

        // Snapshot row data now; the profile round trip invalidates it.
        let amounts = query::filter_visible(query::find_all_by_resource_id(
            &root,
            &selectors.contribution_amount,
        ));
        let levels = query::filter_visible(query::find_all_by_resource_id(
            &root,
            &selectors.user_level,
        ));
        let amount = amounts
            .get(position)
            .and_then(|node| node.text())
            .unwrap_or_default();
        let user_level = levels
            .get(position)
            .and_then(|node| node.text())
            .unwrap_or_default();
        let username =
            decode_unicode_escapes(&name_node.text_or_description().unwrap_or_default());

        let mut user_id = String::new();
        if session.click_node(name_node) {
            sleep(delays.step_settle()).await;
            match session
                .locator(Selector::resource_id(&selectors.profile_id))
                .wait()
                .await
            {
                Ok(id_node) => {
                    user_id = strip_id_prefix(&id_node.text_or_description().unwrap_or_default());
                }
                Err(_) => {
                    warn!("Profile id field not found for {username}; emitting record without id");
                }
            }
            session.go_back(1, true).await;
            sleep(delays.step_settle()).await;
        } else {
            warn!("Could not open profile for {username}; emitting record without id");
        }

        let profile_picture_url = if user_id.is_empty() {
            String::new()
        } else {
            fetcher.avatar_url(&user_id).await.unwrap_or_default()
        };

        records.push(ScrapedRecord {
            user_id,
            username,
            amount,
            rank_position: position + 1,
            user_level,
            profile_picture_url,
        });
    }

    Ok(())
}
