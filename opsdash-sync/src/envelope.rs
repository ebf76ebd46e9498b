//! Envelope client - the single chokepoint for outbound HTTP.
//!
//! Every master endpoint answers with the `{code, msg, data}` envelope
//! unless the caller asked for a binary body or the endpoint predates the
//! convention. This client attaches the bearer credential, unwraps the
//! envelope, and collapses every way a call can fail into `ApiError`,
//! emitting a user notice for each failure as a side effect. Retry policy,
//! if any, belongs to the caller.

use crate::config::SyncConfig;
use crate::error::ApiError;
use crate::notify::{Notice, Notifier};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub use reqwest::Method;

const FALLBACK_BUSINESS_MSG: &str = "unknown server error";
const INVALID_PAYLOAD_MSG: &str = "invalid response payload";

/// Full response handed back in binary passthrough mode.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

pub struct EnvelopeClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    notifier: Notifier,
}

impl EnvelopeClient {
    pub fn new(cfg: &SyncConfig, notifier: Notifier) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.api_base.trim_end_matches('/').to_string(),
            token: cfg.token.clone(),
            notifier,
        })
    }

    /// Enveloped JSON call. Resolves with the unwrapped `data` on business
    /// success, with the whole body on legacy (pre-envelope) endpoints.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let resp = self.send(method, path, body).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| self.transport_fail(transport_message(&e)))?;
        let parsed: Value = serde_json::from_slice(&bytes)
            .map_err(|_| self.transport_fail(INVALID_PAYLOAD_MSG.into()))?;

        match unwrap_envelope(parsed) {
            Unwrapped::Data(data) => Ok(data),
            Unwrapped::Legacy(body) => Ok(body),
            Unwrapped::Rejected { code, msg } => {
                self.notifier.notify(Notice::error(&msg));
                Err(ApiError::Business { code, msg })
            }
        }
    }

    /// Typed convenience wrapper over `call`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let data = self.call(Method::GET, path, None).await?;
        serde_json::from_value(data).map_err(|_| self.transport_fail(INVALID_PAYLOAD_MSG.into()))
    }

    /// Binary passthrough: envelope parsing is skipped and the full 2xx
    /// response is returned. Transport failures classify exactly as for
    /// `call`.
    pub async fn call_raw(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<RawResponse, ApiError> {
        let resp = self.send(method, path, body).await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| self.transport_fail(transport_message(&e)))?
            .to_vec();
        Ok(RawResponse { status, headers, body })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, url).bearer_auth(&self.token);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| self.transport_fail(transport_message(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(self.transport_fail(status_message(status)));
        }
        Ok(resp)
    }

    /// Every transport failure is both surfaced to the caller and shown to
    /// the user; callers cannot suppress the notice.
    fn transport_fail(&self, msg: String) -> ApiError {
        self.notifier.notify(Notice::error(&msg));
        ApiError::Transport { msg }
    }
}

enum Unwrapped {
    Data(Value),
    Legacy(Value),
    Rejected { code: i64, msg: String },
}

/// Envelope unwrapping rules: a body without a `code` key is a legacy
/// endpoint and passes through untouched; `code == 0` resolves with `data`;
/// anything else is a business rejection.
fn unwrap_envelope(body: Value) -> Unwrapped {
    let Some(code_val) = body.get("code") else {
        return Unwrapped::Legacy(body);
    };
    if code_val.as_i64() == Some(0) {
        let data = body.get("data").cloned().unwrap_or(Value::Null);
        return Unwrapped::Data(data);
    }
    let code = code_val.as_i64().unwrap_or(-1);
    let msg = body
        .get("msg")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_BUSINESS_MSG)
        .to_string();
    Unwrapped::Rejected { code, msg }
}

fn status_message(status: StatusCode) -> String {
    match status.as_u16() {
        400 => "invalid request parameters (400)".into(),
        401 => "unauthorized, please sign in again (401)".into(),
        403 => "access denied (403)".into(),
        404 => "requested resource not found (404)".into(),
        408 => "request timed out (408)".into(),
        500 => "internal server error (500)".into(),
        502 => "bad gateway (502)".into(),
        503 => "service unavailable (503)".into(),
        504 => "gateway timeout (504)".into(),
        s => format!("connection error ({s})"),
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "network request timed out".into()
    } else {
        "network connection failed".into()
    }
}
