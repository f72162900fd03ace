//! Hierarchical-deterministic key management (component A): a single
//! mnemonic seed yields an identity key at index 0 and an unbounded stream
//! of trade keys at index >= 1, each derived via the protocol's fixed
//! BIP-32 path. The trade-index cursor and the order-to-index map are the
//! only mutable state this crate persists.

mod error;
mod hierarchy;
mod keypair;
mod mnemonic;

pub use error::KeysError;
pub use hierarchy::KeyHierarchy;
pub use keypair::{TradeKeypair, TradePrivateKey, TradePublicKey};
pub use mnemonic::{generate_mnemonic, parse_mnemonic};
