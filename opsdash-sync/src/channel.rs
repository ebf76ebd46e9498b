//! Push-channel reconciler.
//!
//! Owns the single WebSocket connection to the master and is the only
//! writer of the shared dashboard state. Incremental alert deltas give the
//! UI low-latency feedback, but pushes can be missed while disconnected, so
//! every (re)connect re-anchors the counter to the authoritative snapshot
//! fetch - drift is bounded by one disconnect interval instead of growing
//! forever. Runs for the lifetime of the process; a lost channel leaves the
//! last good state visible with `connected == false` and retries after a
//! fixed backoff.

use crate::config::SyncConfig;
use crate::envelope::EnvelopeClient;
use crate::models::{AlertDelta, AlertEventsSnapshot, PushFrame};
use crate::notify::{Notice, Notifier};
use crate::state::DashboardState;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const ALERTS_EVENTS_PATH: &str = "/api/alerts/events";

pub struct PushReconciler {
    state: DashboardState,
    api: Arc<EnvelopeClient>,
    notifier: Notifier,
    cfg: SyncConfig,
    reconnect_delay: Duration,
}

impl PushReconciler {
    pub fn new(
        state: DashboardState,
        api: Arc<EnvelopeClient>,
        notifier: Notifier,
        cfg: &SyncConfig,
    ) -> Self {
        Self {
            state,
            api,
            notifier,
            cfg: cfg.clone(),
            reconnect_delay: Duration::from_secs(cfg.reconnect_secs),
        }
    }

    /// Starts the connect/read/backoff loop on a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        loop {
            let ws_url = self.cfg.ws_endpoint();
            debug!("connecting push channel: {ws_url}");
            match connect_async(ws_url.as_str()).await {
                Ok((ws, _)) => {
                    info!("push channel connected");
                    self.state.set_connected(true);
                    self.spawn_alert_reconciliation();
                    self.read_frames(ws).await;
                    self.state.set_connected(false);
                    self.state.record_reconnect();
                    warn!("push channel lost, retrying in {:?}", self.reconnect_delay);
                }
                Err(e) => {
                    warn!("push channel connect failed: {e}");
                }
            }
            // Sequential loop: at most one backoff is ever pending.
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    /// Re-anchors the alert counter to the authoritative snapshot. Runs
    /// detached: a fetch failure only logs, the incremental counter keeps
    /// serving as a degraded fallback, and a slow fetch racing later pushes
    /// is resolved by last-assignment-wins.
    fn spawn_alert_reconciliation(&self) {
        let api = self.api.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            match api.get_json::<AlertEventsSnapshot>(ALERTS_EVENTS_PATH).await {
                Ok(snap) => {
                    debug!("alert counter reconciled: {} active", snap.active.len());
                    state.reset_active_alerts(snap.active.len() as u64);
                }
                Err(e) => warn!("alert reconciliation fetch failed: {e}"),
            }
        });
    }

    /// Reads frames until the channel closes or errors. Errors are a
    /// precursor to close, never handled as a separate state.
    async fn read_frames(&self, mut ws: WsStream) {
        while let Some(item) = ws.next().await {
            match item {
                Ok(Message::Text(txt)) => self.handle_frame(txt.as_str()),
                Ok(Message::Close(_)) => break,
                // Protocol is text-framed; ping/pong is transport-level.
                Ok(_) => {}
                Err(e) => {
                    warn!("push channel error: {e}");
                    break;
                }
            }
        }
    }

    /// Applies one inbound frame to the store. Malformed input is logged
    /// and dropped; it must never close the channel or crash the process.
    fn handle_frame(&self, raw: &str) {
        let frame: PushFrame = match serde_json::from_str(raw) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("discarding malformed push frame: {e}");
                return;
            }
        };

        match frame {
            PushFrame::Nodes { data } => {
                self.state.replace_nodes(data.unwrap_or_default());
            }
            PushFrame::Systems { data } => {
                self.state.replace_systems(data.unwrap_or_default());
            }
            PushFrame::Alert { data } => self.apply_alert(data),
            PushFrame::Unknown => {}
        }
    }

    fn apply_alert(&self, delta: AlertDelta) {
        match delta {
            AlertDelta::Fire { message, target } => {
                let count = self.state.record_alert_fired();
                let text = message.unwrap_or_else(|| "alert fired".into());
                debug!("alert fired (target {:?}), {count} active", target);
                self.notifier.notify(Notice::sticky_error(text));
            }
            AlertDelta::Resolve { id } => {
                let count = self.state.record_alert_resolved();
                debug!("alert {id} resolved, {count} active");
                self.notifier.notify(Notice::success(format!("alert {id} resolved")));
            }
            AlertDelta::Unknown => {}
        }
    }
}
