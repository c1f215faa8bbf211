//! The end-to-end automation routines, each a linear sequence of named
//! steps over the session's primitives.

pub mod post;
pub mod scrape;

pub use post::{MediaKind, PostRequest, PostWorkflow};
pub use scrape::{
    DocumentSlot, ScrapeDocument, ScrapeOptions, ScrapeSummary, ScrapeWorkflow, ScrapedRecord,
    TabConfig, TabCounts, TabData, TabKind,
};

use crate::Session;

/// Try an ordered label fallback chain until one click lands.
/// Labels are tried with the given match mode; the first success wins.
pub(crate) fn click_any_label(session: &Session, labels: &[String], exact: bool) -> bool {
    labels.iter().any(|label| session.click_by_text(label, exact))
}
