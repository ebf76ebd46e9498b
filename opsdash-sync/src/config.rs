use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::warn;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SyncConfig {
    /// HTTP base URL of the master, e.g. "http://127.0.0.1:8080".
    pub api_base: String,
    /// Bearer token attached to every HTTP call.
    pub token: String,
    /// Explicit push-channel URL. When unset, derived from `api_base`.
    pub ws_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_reconnect_secs")]
    pub reconnect_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_reconnect_secs() -> u64 {
    3
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080".into(),
            token: "ops-system-secret-key".into(),
            ws_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            reconnect_secs: default_reconnect_secs(),
        }
    }
}

impl SyncConfig {
    /// Push-channel endpoint. The explicit override wins; otherwise the
    /// scheme is derived from `api_base`, upgrading to `wss` when the API
    /// is served over TLS.
    pub fn ws_endpoint(&self) -> String {
        if let Some(url) = &self.ws_url {
            return url.clone();
        }
        let base = self.api_base.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            format!("ws://{base}")
        };
        format!("{ws_base}/api/ws")
    }
}

/// Loads the config from the YAML file named by `OPSDASH_CONFIG` (default
/// `opsdash.yaml`). A missing or invalid file falls back to defaults.
pub async fn load_config() -> SyncConfig {
    let path = std::env::var("OPSDASH_CONFIG").unwrap_or_else(|_| "opsdash.yaml".into());
    if Path::new(&path).exists() {
        let txt = fs::read_to_string(&path).await.unwrap_or_default();
        if txt.trim().is_empty() {
            return SyncConfig::default();
        }
        serde_yaml::from_str(&txt).unwrap_or_else(|e| {
            warn!("invalid config {path}: {e}");
            SyncConfig::default()
        })
    } else {
        warn!("no {path}, using default config");
        SyncConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_endpoint_derives_scheme_from_api_base() {
        let cfg = SyncConfig { api_base: "http://10.1.2.3:8080".into(), ..Default::default() };
        assert_eq!(cfg.ws_endpoint(), "ws://10.1.2.3:8080/api/ws");

        let cfg = SyncConfig { api_base: "https://ops.example.com/".into(), ..Default::default() };
        assert_eq!(cfg.ws_endpoint(), "wss://ops.example.com/api/ws");
    }

    #[test]
    fn ws_endpoint_override_wins() {
        let cfg = SyncConfig {
            ws_url: Some("ws://localhost:9999/api/ws".into()),
            api_base: "https://ops.example.com".into(),
            ..Default::default()
        };
        assert_eq!(cfg.ws_endpoint(), "ws://localhost:9999/api/ws");
    }

    #[test]
    fn default_points_at_local_master() {
        let cfg = SyncConfig::default();
        assert_eq!(cfg.ws_endpoint(), "ws://localhost:8080/api/ws");
        assert_eq!(cfg.reconnect_secs, 3);
        assert_eq!(cfg.request_timeout_secs, 15);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: SyncConfig =
            serde_yaml::from_str("api_base: http://10.0.0.1:8080\ntoken: abc\n").unwrap();
        assert_eq!(cfg.token, "abc");
        assert_eq!(cfg.reconnect_secs, 3);
        assert!(cfg.ws_url.is_none());
    }
}
