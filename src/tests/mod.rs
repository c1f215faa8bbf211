use crate::config::{Delays, TargetConfig};
use crate::platforms::simulated::SimulatedBridge;
use crate::Session;
use std::sync::Arc;

mod enrich_tests;
mod interaction_tests;
mod locator_tests;
mod navigation_tests;

pub(crate) const TARGET: &str = "sg.bigo.live";
pub(crate) const HOST: &str = "com.bigolive.scrapper";
pub(crate) const LAUNCHER: &str = "com.android.launcher";

/// Default configuration for simulated runs: real selectors and labels,
/// zeroed delays, enrichment off
pub(crate) fn test_config() -> TargetConfig {
    let mut config = TargetConfig::default();
    config.delays = Delays::none();
    config.enrichment.enabled = false;
    config
}

pub(crate) fn connect(
    bridge: SimulatedBridge,
    config: TargetConfig,
) -> (Session, Arc<SimulatedBridge>) {
    crate::utils::init_tracing();
    let bridge = Arc::new(bridge);
    let session = Session::connect(bridge.clone(), config);
    (session, bridge)
}
