//! opsdash-sync - client-side state synchronization for the ops dashboard.
//!
//! Keeps a local, read-mostly view of cluster inventory (nodes, managed
//! systems) and the active-alert counter consistent with the master, using
//! the WebSocket push channel plus authoritative HTTP fallback fetches:
//! - `envelope`: the single chokepoint for outbound HTTP, unwrapping the
//!   `{code, msg, data}` envelope into one error taxonomy
//! - `channel`: the push-channel reconciler, sole writer of the store
//! - `state`: the shared dashboard state everything else reads
//! - `notify`: the output port for user-visible notices

pub mod channel;
pub mod config;
pub mod envelope;
pub mod error;
pub mod models;
pub mod notify;
pub mod state;

pub use channel::PushReconciler;
pub use config::SyncConfig;
pub use envelope::{EnvelopeClient, Method, RawResponse};
pub use error::ApiError;
pub use notify::{LogNotifier, Notice, NoticeLevel, Notifier, Notify, NOTICE_TIMEOUT};
pub use state::{DashboardSnapshot, DashboardState};
