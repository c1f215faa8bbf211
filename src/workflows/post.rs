//! Scripted posting workflow: navigate the target app's composer and
//! publish a caption with optional media.

use super::click_any_label;
use crate::navigation::LONG_BACK_BOUND;
use crate::query;
use crate::workflow::{step, RunContext, StepAbort, StepResult, Workflow};
use crate::Session;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
}

/// What to publish
#[derive(Debug, Clone)]
pub struct PostRequest {
    pub caption: String,
    /// Presence enables the media-attach steps; the gallery's first item
    /// of the matching kind is selected.
    pub media_path: Option<String>,
    pub media_kind: MediaKind,
}

impl PostRequest {
    pub fn caption_only(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            media_path: None,
            media_kind: MediaKind::Photo,
        }
    }

    pub fn with_media(
        caption: impl Into<String>,
        media_path: impl Into<String>,
        media_kind: MediaKind,
    ) -> Self {
        Self {
            caption: caption.into(),
            media_path: Some(media_path.into()),
            media_kind,
        }
    }
}

pub struct PostWorkflow {
    request: PostRequest,
}

impl PostWorkflow {
    pub fn new(request: PostRequest) -> Self {
        Self { request }
    }
}

#[async_trait::async_trait]
impl Workflow for PostWorkflow {
    fn name(&self) -> &str {
        "post"
    }

    async fn execute(&self, session: &Session, ctx: &RunContext) -> Result<String, StepAbort> {
        let config = session.config().clone();
        let delays = &config.delays;
        let labels = &config.labels;

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

        step(ctx, "open composer", async {
            if click_any_label(session, &labels.compose, false) {
                sleep(delays.nav_settle()).await;
                StepResult::ok("Composer open")
            } else {
                StepResult::fail("Could not find create post button")
            }
        })
        .await?;

        if self.request.media_path.is_some() {
            let media_kind = self.request.media_kind;
            step(ctx, "attach media", async {
                if !click_any_label(session, &labels.photo_video, false) {
                    warn!("Could not click photo button, continuing without media");
                    return StepResult::ok("Continuing without media");
                }
                sleep(delays.nav_settle()).await;
                let select_labels = match media_kind {
                    MediaKind::Photo => &labels.select_photo,
                    MediaKind::Video => &labels.select_video,
                };
                if click_any_label(session, select_labels, false) {
                    sleep(delays.step_settle()).await;
                    StepResult::ok("Media attached")
                } else {
                    StepResult::fail("Could not select media from gallery")
                }
            })
            .await?;
        }

        step(ctx, "enter caption", async {
            // Some composer builds only accept injected text after the
            // field has been touched.
            if let Some(root) = session.root() {
                if let Some(field) =
                    query::find_by_class(&root, "android.widget.AutoCompleteTextView")
                {
                    if !session.click_node(&field) {
                        debug!("Caption field click was rejected, injecting anyway");
                    }
                    sleep(delays.step_settle()).await;
                }
            }
            if session.input_text(&self.request.caption, 0) {
                sleep(delays.step_settle()).await;
                StepResult::ok("Caption entered")
            } else {
                StepResult::fail("Could not enter caption text")
            }
        })
        .await?;

        step(ctx, "confirm next", async {
            if click_any_label(session, &labels.next, true) {
                sleep(delays.step_settle()).await;
                StepResult::ok("Next confirmed")
            } else {
                StepResult::fail("Could not find NEXT button")
            }
        })
        .await?;

        if config.test_mode {
            return Ok("Post prepared without publishing (test mode)".to_string());
        }

        step(ctx, "publish post", async {
            let published = click_any_label(session, &labels.post, true)
                || click_any_label(session, &labels.share_now, true);
            if published {
                sleep(delays.publish_settle()).await;
                StepResult::ok("Published")
            } else {
                StepResult::fail("Could not find POST/SHARE button")
            }
        })
        .await?;

        Ok("Post published".to_string())
    }
}
