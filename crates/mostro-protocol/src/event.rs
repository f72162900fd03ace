use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

pub type Tag = Vec<String>;

/// An event before it has been hashed and signed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsignedEvent {
    pub signer_pubkey: String,
    pub created_at: i64,
    pub kind: u16,
    pub tags: Vec<Tag>,
    pub content: String,
}

/// A finalized, network-ready relay event (§4.C / §8 "relay event integrity").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub signer_pubkey: String,
    pub created_at: i64,
    pub kind: u16,
    pub tags: Vec<Tag>,
    pub content: String,
    pub sig: String,
}

impl UnsignedEvent {
    /// `[0, signer_pubkey, created_at, kind, tags, content]`, serialized
    /// with no extraneous whitespace — the relay ecosystem's canonical
    /// hashing preimage.
    pub fn canonical_json(&self) -> String {
        let value = Value::Array(vec![
            Value::from(0),
            Value::String(self.signer_pubkey.clone()),
            Value::from(self.created_at),
            Value::from(self.kind),
            Value::Array(
                self.tags
                    .iter()
                    .map(|tag| Value::Array(tag.iter().map(|s| Value::String(s.clone())).collect()))
                    .collect(),
            ),
            Value::String(self.content.clone()),
        ]);
        serde_json::to_string(&value).expect("Value serialization never fails")
    }

    pub fn id(&self) -> [u8; 32] {
        mostro_crypto::sha256(self.canonical_json().as_bytes())
    }

    /// Hash and Schnorr-sign this event, producing a publishable [`Event`].
    pub fn finalize(self, private_key: &[u8; 32]) -> Result<Event, ProtocolError> {
        let id = self.id();
        let sig_bytes = mostro_crypto::sign(private_key, &id)?;
        Ok(Event {
            id: hex::encode(id),
            signer_pubkey: self.signer_pubkey,
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags,
            content: self.content,
            sig: hex::encode(sig_bytes),
        })
    }
}

impl Event {
    fn as_unsigned(&self) -> UnsignedEvent {
        UnsignedEvent {
            signer_pubkey: self.signer_pubkey.clone(),
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags.clone(),
            content: self.content.clone(),
        }
    }

    /// Verify both that `id` is the canonical hash of the event's fields
    /// and that `sig` is a valid Schnorr signature over it by
    /// `signer_pubkey`. Events entering the system from the network must
    /// pass this before being trusted further.
    pub fn verify(&self) -> Result<(), ProtocolError> {
        let expected_id = self.as_unsigned().id();
        if hex::encode(expected_id) != self.id {
            return Err(ProtocolError::IdMismatch);
        }

        let pubkey_bytes = decode_32(&self.signer_pubkey)?;
        let sig_bytes = decode_64(&self.sig)?;
        mostro_crypto::verify(&pubkey_bytes, &expected_id, &sig_bytes)
            .map_err(|_| ProtocolError::SignatureInvalid)
    }

    pub fn tag_values(&self, name: &str) -> Vec<&str> {
        self.tags
            .iter()
            .filter(|tag| tag.first().map(String::as_str) == Some(name))
            .filter_map(|tag| tag.get(1))
            .map(String::as_str)
            .collect()
    }

    pub fn first_tag_value(&self, name: &str) -> Option<&str> {
        self.tag_values(name).into_iter().next()
    }
}

fn decode_32(hex_str: &str) -> Result<[u8; 32], ProtocolError> {
    let bytes = hex::decode(hex_str).map_err(|_| ProtocolError::IdMismatch)?;
    bytes.try_into().map_err(|_| ProtocolError::IdMismatch)
}

fn decode_64(hex_str: &str) -> Result<[u8; 64], ProtocolError> {
    let bytes = hex::decode(hex_str).map_err(|_| ProtocolError::SignatureInvalid)?;
    bytes.try_into().map_err(|_| ProtocolError::SignatureInvalid)
}
