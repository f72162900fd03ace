use secp256k1::{Keypair, SecretKey, SECP256K1};
use serde::{Deserialize, Serialize};

use crate::error::KeysError;

/// A 32-byte secp256k1 scalar. Never implements `Display`, and its `Debug`
/// impl is always redacted — this is the one type in the workspace that
/// must never reach a log line.
#[derive(Clone, Copy)]
pub struct TradePrivateKey([u8; 32]);

impl TradePrivateKey {
    pub(crate) fn from_bytes(bytes: [u8; 32]) -> Result<Self, KeysError> {
        SecretKey::from_slice(&bytes).map_err(|_| KeysError::InvalidScalar)?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_secret_key(&self) -> SecretKey {
        SecretKey::from_slice(&self.0).expect("validated at construction")
    }

    pub fn public_key(&self) -> TradePublicKey {
        let keypair = Keypair::from_secret_key(SECP256K1, &self.to_secret_key());
        let (xonly, _parity) = keypair.x_only_public_key();
        TradePublicKey(xonly.serialize())
    }
}

impl std::fmt::Debug for TradePrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TradePrivateKey").field(&"<redacted>").finish()
    }
}

/// A 32-byte x-only (BIP-340) public key. Safe to log, serialize, and send
/// over the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TradePublicKey(#[serde(with = "hex_bytes")] [u8; 32]);

impl TradePublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, KeysError> {
        let bytes = hex::decode(s).map_err(|_| KeysError::InvalidScalar)?;
        let arr: [u8; 32] = bytes.try_into().map_err(|_| KeysError::InvalidScalar)?;
        Ok(Self(arr))
    }
}

impl std::fmt::Display for TradePublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::fmt::Debug for TradePublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TradePublicKey({})", self.to_hex())
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(d)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}

/// A key pair derived at a specific index in the hierarchy (§4.A). `index`
/// is 0 for the identity key and >= 1 for trade keys.
#[derive(Clone, Copy)]
pub struct TradeKeypair {
    pub index: u32,
    pub private: TradePrivateKey,
    pub public: TradePublicKey,
}

impl TradeKeypair {
    pub(crate) fn from_private_bytes(index: u32, bytes: [u8; 32]) -> Result<Self, KeysError> {
        let private = TradePrivateKey::from_bytes(bytes)?;
        let public = private.public_key();
        Ok(Self {
            index,
            private,
            public,
        })
    }
}

impl std::fmt::Debug for TradeKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeKeypair")
            .field("index", &self.index)
            .field("public", &self.public)
            .finish()
    }
}
