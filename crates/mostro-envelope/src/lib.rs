//! Gift-wrap (component D) and P2P chat (component E) envelope
//! construction: layered encryption that anonymizes the sender from
//! relays and, in the gift-wrap case, from the coordinator's view of
//! which trade key authored which action.

mod chat;
mod error;
mod gift_wrap;
mod timestamp;

pub use chat::{build_chat_envelope, shared_identity, unwrap_chat_envelope, ChatMessage, SharedIdentity};
pub use error::EnvelopeError;
pub use gift_wrap::{build_gift_wrap, unwrap_gift_wrap, UnwrappedMessage};
pub use timestamp::tweaked_past_timestamp;
