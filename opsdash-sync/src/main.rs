//! Headless host for the dashboard sync core.
//!
//! Wires config, store, envelope client and push reconciler together and
//! logs a periodic state summary. The dashboard UI embeds the same library
//! and renders the store instead of logging it.

use anyhow::{Context, Result};
use opsdash_sync::{DashboardState, EnvelopeClient, LogNotifier, Notifier, PushReconciler};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let cfg = opsdash_sync::config::load_config().await;
    info!("syncing against {} (push: {})", cfg.api_base, cfg.ws_endpoint());

    let notifier: Notifier = Arc::new(LogNotifier);
    let api = Arc::new(
        EnvelopeClient::new(&cfg, notifier.clone()).context("failed to build envelope client")?,
    );
    let state = DashboardState::new();

    PushReconciler::new(state.clone(), api, notifier, &cfg).spawn();

    let mut summary_timer = interval(Duration::from_secs(30));
    loop {
        summary_timer.tick().await;
        let snap = state.snapshot();
        info!(
            "state: {} nodes, {} systems, {} active alerts, connected={}, reconnects={}",
            snap.nodes.len(),
            snap.systems.len(),
            snap.active_alerts,
            snap.connected,
            snap.reconnects
        );
    }
}
