//! Crypto primitives (component B): ECDH conversation-key derivation,
//! ChaCha20-Poly1305 authenticated encryption over that key, BIP-340
//! Schnorr signing/verification, and SHA-256 hashing.

mod aead;
mod conversation_key;
mod error;
mod hash;
mod schnorr;

pub use aead::{decrypt, encrypt};
pub use conversation_key::{conversation_key, shared_x_coordinate};
pub use error::CryptoError;
pub use hash::sha256;
pub use schnorr::{sign, verify};
