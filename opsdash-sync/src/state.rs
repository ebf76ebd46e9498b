//! Shared dashboard state.
//!
//! Process-wide store the reconciler converges onto. Readers get cloned
//! snapshots; every mutating method is crate-private so nothing outside the
//! reconciler can write (single-writer-per-field discipline). `connected ==
//! false` means "last known state may be stale", not "state is empty".

use crate::models::{NodeRecord, SystemRecord};
use parking_lot::Mutex;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

pub type Shared<T> = Arc<Mutex<T>>;

#[derive(Debug, Default)]
struct Inner {
    nodes: Vec<NodeRecord>,
    systems: Vec<SystemRecord>,
    active_alerts: u64,
    connected: bool,
    reconnects: u32,
}

/// Read-only snapshot of the whole store, cheap to hand to a renderer.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub nodes: Vec<NodeRecord>,
    pub systems: Vec<SystemRecord>,
    pub active_alerts: u64,
    pub connected: bool,
    pub reconnects: u32,
}

#[derive(Clone, Default)]
pub struct DashboardState {
    inner: Shared<Inner>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> Vec<NodeRecord> {
        self.inner.lock().nodes.clone()
    }

    pub fn systems(&self) -> Vec<SystemRecord> {
        self.inner.lock().systems.clone()
    }

    pub fn active_alerts(&self) -> u64 {
        self.inner.lock().active_alerts
    }

    pub fn connected(&self) -> bool {
        self.inner.lock().connected
    }

    pub fn reconnects(&self) -> u32 {
        self.inner.lock().reconnects
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let inner = self.inner.lock();
        DashboardSnapshot {
            nodes: inner.nodes.clone(),
            systems: inner.systems.clone(),
            active_alerts: inner.active_alerts,
            connected: inner.connected,
            reconnects: inner.reconnects,
        }
    }

    /// Wholesale replacement, sorted ascending by `ip`. The sort is stable,
    /// so nodes with equal addresses keep their push order.
    pub(crate) fn replace_nodes(&self, mut nodes: Vec<NodeRecord>) {
        nodes.sort_by(|a, b| collate(&a.ip, &b.ip));
        self.inner.lock().nodes = nodes;
    }

    /// Wholesale replacement in server-provided order.
    pub(crate) fn replace_systems(&self, systems: Vec<SystemRecord>) {
        self.inner.lock().systems = systems;
    }

    pub(crate) fn record_alert_fired(&self) -> u64 {
        let mut inner = self.inner.lock();
        inner.active_alerts += 1;
        inner.active_alerts
    }

    /// Clamped at zero: a resolve without a matching fire is a no-op.
    pub(crate) fn record_alert_resolved(&self) -> u64 {
        let mut inner = self.inner.lock();
        inner.active_alerts = inner.active_alerts.saturating_sub(1);
        inner.active_alerts
    }

    /// Overwrites the incrementally accumulated counter with the
    /// authoritative value from a reconciliation fetch.
    pub(crate) fn reset_active_alerts(&self, count: u64) {
        self.inner.lock().active_alerts = count;
    }

    pub(crate) fn set_connected(&self, connected: bool) {
        self.inner.lock().connected = connected;
    }

    pub(crate) fn record_reconnect(&self) {
        self.inner.lock().reconnects += 1;
    }
}

/// Ordering used for the node list. Case-insensitive comparison with a
/// byte-order tiebreak, which coincides with locale order for the address
/// and hostname strings this field carries. An absent address compares as
/// the empty string and sorts first.
pub(crate) fn collate(a: &str, b: &str) -> Ordering {
    match a.to_lowercase().cmp(&b.to_lowercase()) {
        Ordering::Equal => a.cmp(b),
        ord => ord,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(ip: &str, name: &str) -> NodeRecord {
        NodeRecord { ip: ip.into(), name: name.into(), ..Default::default() }
    }

    #[test]
    fn nodes_are_sorted_by_address() {
        let state = DashboardState::new();
        state.replace_nodes(vec![node("10.0.0.5", "c"), node("10.0.0.2", "a"), node("", "b")]);

        let ips: Vec<String> = state.nodes().into_iter().map(|n| n.ip).collect();
        assert_eq!(ips, vec!["", "10.0.0.2", "10.0.0.5"]);
    }

    #[test]
    fn node_sort_is_stable_on_ties() {
        let state = DashboardState::new();
        state.replace_nodes(vec![
            node("10.0.0.2", "first"),
            node("10.0.0.1", "x"),
            node("10.0.0.2", "second"),
        ]);

        let names: Vec<String> = state.nodes().into_iter().map(|n| n.name).collect();
        assert_eq!(names, vec!["x", "first", "second"]);
    }

    #[test]
    fn node_collation_is_case_insensitive() {
        let state = DashboardState::new();
        state.replace_nodes(vec![node("Web-02", "b"), node("db-01", "a"), node("WEB-01", "c")]);

        let ips: Vec<String> = state.nodes().into_iter().map(|n| n.ip).collect();
        assert_eq!(ips, vec!["db-01", "WEB-01", "Web-02"]);
    }

    #[test]
    fn replace_is_wholesale_not_merge() {
        let state = DashboardState::new();
        state.replace_nodes(vec![node("10.0.0.1", "a"), node("10.0.0.2", "b")]);
        state.replace_nodes(vec![node("10.0.0.9", "z")]);
        assert_eq!(state.nodes().len(), 1);

        state.replace_systems(vec![SystemRecord { name: "billing".into(), ..Default::default() }]);
        state.replace_systems(Vec::new());
        assert!(state.systems().is_empty());
    }

    #[test]
    fn alert_counter_never_goes_negative() {
        let state = DashboardState::new();
        assert_eq!(state.record_alert_resolved(), 0);
        assert_eq!(state.record_alert_fired(), 1);
        assert_eq!(state.record_alert_fired(), 2);
        assert_eq!(state.record_alert_resolved(), 1);
        assert_eq!(state.record_alert_resolved(), 0);
        assert_eq!(state.record_alert_resolved(), 0);
    }

    #[test]
    fn reconciliation_overrides_accumulated_drift() {
        let state = DashboardState::new();
        for _ in 0..7 {
            state.record_alert_fired();
        }
        state.reset_active_alerts(2);
        assert_eq!(state.active_alerts(), 2);

        state.reset_active_alerts(9);
        assert_eq!(state.active_alerts(), 9);
    }

    #[test]
    fn snapshot_reflects_current_fields() {
        let state = DashboardState::new();
        state.set_connected(true);
        state.record_reconnect();
        state.record_alert_fired();

        let snap = state.snapshot();
        assert!(snap.connected);
        assert_eq!(snap.reconnects, 1);
        assert_eq!(snap.active_alerts, 1);
    }
}
