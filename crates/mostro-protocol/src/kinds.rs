//! Relay event kind numbers. Exact values must match the target
//! coordinator's deployment; these mirror the values the reference
//! Mostro daemon and its clients have historically used.

/// Public order-book listing, authored by the coordinator.
pub const ORDER_BOOK: u16 = 38_383;

/// Maker/taker reputation rating, authored by the coordinator.
pub const RATING: u16 = 31_989;

/// Coordinator self-describing info event.
pub const COORDINATOR_INFO: u16 = 10_002;

/// Dispute status event, authored by the coordinator.
pub const DISPUTE: u16 = 38_384;

/// NIP-59-style gift wrap, signed by an ephemeral key.
pub const GIFT_WRAP: u16 = 1_059;

/// NIP-59-style seal, signed by the identity or trade key.
pub const SEAL: u16 = 13;

/// Ordinary text note, used as the inner rumor/chat event.
pub const TEXT_NOTE: u16 = 1;
