//! Cross-cutting utilities shared by every other crate in this workspace:
//! the network enum, a testable clock abstraction, and a sleep helper.

mod clock;
mod network;

pub use clock::{Clock, FixedClock, SystemClock};
pub use network::Network;

/// Suspend the current task for `duration`.
///
/// Thin wrapper kept so call sites don't depend on `tokio` directly, mirroring
/// the teacher crate's cross-platform `sleep` seam.
pub async fn sleep(duration: std::time::Duration) {
    tokio::time::sleep(duration).await;
}
