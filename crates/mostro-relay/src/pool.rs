use async_trait::async_trait;
use mostro_protocol::event::Event;
use serde_json::Value;

use crate::error::RelayError;

/// The relay transport port (§6 "Relay transport"). A concrete
/// implementation fans a publish or query out to every configured relay
/// in parallel; per-relay failures are warnings as long as at least one
/// relay succeeds.
#[async_trait]
pub trait RelayPool: Send + Sync {
    /// Publish `event` to every configured relay. Returns the number of
    /// relays that accepted it, or [`RelayError::PublishFailed`] if none
    /// did.
    async fn publish(&self, event: Event) -> Result<usize, RelayError>;

    /// Query every configured relay with `filter` and return the union of
    /// matching events, deduplicated by `id`. Per-relay query failures are
    /// logged and otherwise ignored.
    async fn query(&self, filter: Value) -> Vec<Event>;

    /// Release all relay connections. Must be safe to call more than once
    /// and on every exit path, success or failure.
    async fn close(&self);
}
