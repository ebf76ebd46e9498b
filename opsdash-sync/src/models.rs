use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One cluster node as pushed by the server. The server owns the shape;
/// fields the dashboard does not model are preserved in `extra` so a newer
/// server never loses data through this client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NodeRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub cpu_usage: f64,
    #[serde(default)]
    pub mem_usage: f64,
    #[serde(default)]
    pub last_heartbeat: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One managed business system, kept in server-provided order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SystemRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub create_time: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Alert event record as returned by `GET /api/alerts/events`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AlertEvent {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub rule_id: i64,
    #[serde(default)]
    pub rule_name: String,
    #[serde(default)]
    pub target_type: String,
    #[serde(default)]
    pub target_id: String,
    #[serde(default)]
    pub target_name: String,
    #[serde(default)]
    pub metric_val: f64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub end_time: i64,
}

/// Payload of the alert reconciliation endpoint. Only `active.len()` feeds
/// the counter; the rest is available to direct callers.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AlertEventsSnapshot {
    #[serde(default)]
    pub active: Vec<AlertEvent>,
    #[serde(default)]
    pub history: Vec<AlertEvent>,
}

/// One push-channel frame: `{"type": ..., "data": ...}`. Unknown kinds
/// deserialize to `Unknown` and are ignored by the reconciler.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PushFrame {
    Nodes {
        #[serde(default)]
        data: Option<Vec<NodeRecord>>,
    },
    Systems {
        #[serde(default)]
        data: Option<Vec<SystemRecord>>,
    },
    Alert { data: AlertDelta },
    #[serde(other)]
    Unknown,
}

/// Incremental alert delta carried by an `alert` frame.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AlertDelta {
    Fire {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        target: Option<String>,
    },
    Resolve { id: AlertId },
    #[serde(other)]
    Unknown,
}

/// Alert identifiers arrive as numbers from the server but the contract
/// only promises "an identifier", so strings are accepted too.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AlertId {
    Num(i64),
    Text(String),
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertId::Num(n) => write!(f, "{n}"),
            AlertId::Text(s) => write!(f, "{s}"),
        }
    }
}
