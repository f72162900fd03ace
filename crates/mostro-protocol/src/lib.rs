//! Wire message model (components C/F/G): relay event canonicalization and
//! verification, the tagged `Message`/`Payload` shapes, request-id
//! generation and correlation, order-builder helpers, and order-book tag
//! parsing.

pub mod builders;
pub mod correlation;
pub mod error;
pub mod event;
pub mod kinds;
pub mod message;
pub mod orderbook;
pub mod parsing;
pub mod request_id;

pub use error::ProtocolError;
pub use event::{Event, Tag, UnsignedEvent};
pub use message::{
    Action, Category, Message, MessageKind, OrderKind, PaymentFailed, Payload, Peer, RestoreData,
    SmallOrder,
};
pub use orderbook::{order_from_event, OrderBookEntry, OrderFilter};
pub use request_id::generate_request_id;
