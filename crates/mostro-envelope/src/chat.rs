use mostro_protocol::event::{Event, UnsignedEvent};
use mostro_protocol::kinds;
use secp256k1::{Keypair, SecretKey, SECP256K1};

use crate::error::EnvelopeError;
use crate::timestamp::tweaked_past_timestamp;

/// A decrypted, signature-verified chat line from a trade counterparty.
pub struct ChatMessage {
    pub text: String,
    pub sender_pubkey: String,
    pub created_at: i64,
}

fn pubkey_hex(secret: &[u8; 32]) -> Result<String, EnvelopeError> {
    let secret_key = SecretKey::from_slice(secret).map_err(|_| EnvelopeError::SignatureInvalid)?;
    let keypair = Keypair::from_secret_key(SECP256K1, &secret_key);
    Ok(hex::encode(keypair.x_only_public_key().0.serialize()))
}

fn decode_32(hex_str: &str) -> Result<[u8; 32], EnvelopeError> {
    Ok(hex::decode(hex_str)?
        .try_into()
        .map_err(|_| EnvelopeError::SignatureInvalid)?)
}

/// The ECDH shared identity for a trade: a scalar both parties can derive
/// independently, and its corresponding public point (§3 "ECDH shared
/// identity").
pub struct SharedIdentity {
    pub shared_secret: [u8; 32],
    pub shared_pubkey: [u8; 32],
}

pub fn shared_identity(
    my_trade_private: &[u8; 32],
    peer_trade_public: &[u8; 32],
) -> Result<SharedIdentity, EnvelopeError> {
    let shared_secret = mostro_crypto::shared_x_coordinate(my_trade_private, peer_trade_public)?;
    let shared_pubkey_hex = pubkey_hex(&shared_secret)?;
    Ok(SharedIdentity {
        shared_secret,
        shared_pubkey: decode_32(&shared_pubkey_hex)?,
    })
}

/// Build a chat wrap addressed to the trade's shared identity (§4.E).
/// There is no seal layer: the inner event is signed by the sender's
/// trade key and its signature is retained for dispute resolution.
pub fn build_chat_envelope(
    my_trade_private: &[u8; 32],
    shared: &SharedIdentity,
    text: &str,
    now: i64,
) -> Result<Event, EnvelopeError> {
    let shared_pubkey_hex = hex::encode(shared.shared_pubkey);

    let inner = UnsignedEvent {
        signer_pubkey: pubkey_hex(my_trade_private)?,
        created_at: now,
        kind: kinds::TEXT_NOTE,
        tags: vec![vec!["p".to_string(), shared_pubkey_hex.clone()]],
        content: text.to_string(),
    }
    .finalize(my_trade_private)?;
    let inner_json = serde_json::to_string(&inner)?;

    let wrap_key = mostro_crypto::conversation_key(&shared.shared_secret, &shared.shared_pubkey)?;
    let wrap_ciphertext = mostro_crypto::encrypt(&wrap_key, inner_json.as_bytes());

    let ephemeral_secret = generate_ephemeral();
    let wrap = UnsignedEvent {
        signer_pubkey: pubkey_hex(&ephemeral_secret)?,
        created_at: tweaked_past_timestamp(now),
        kind: kinds::GIFT_WRAP,
        tags: vec![vec!["p".to_string(), shared_pubkey_hex]],
        content: hex::encode(wrap_ciphertext),
    }
    .finalize(&ephemeral_secret)?;

    Ok(wrap)
}

/// Decrypt and verify an incoming chat wrap. Events whose inner signature
/// does not verify are dropped (`SignatureInvalid`) rather than silently
/// skipped, since an invalid signature here indicates tampering rather
/// than ordinary decrypt noise.
pub fn unwrap_chat_envelope(
    wrap: &Event,
    shared: &SharedIdentity,
) -> Result<Option<ChatMessage>, EnvelopeError> {
    let wrap_key = mostro_crypto::conversation_key(&shared.shared_secret, &shared.shared_pubkey)?;
    let Ok(ciphertext) = hex::decode(&wrap.content) else {
        return Ok(None);
    };
    let Ok(inner_json) = mostro_crypto::decrypt(&wrap_key, &ciphertext) else {
        return Ok(None);
    };
    let Ok(inner) = serde_json::from_slice::<Event>(&inner_json) else {
        return Ok(None);
    };

    if inner.verify().is_err() {
        return Err(EnvelopeError::SignatureInvalid);
    }

    Ok(Some(ChatMessage {
        text: inner.content.clone(),
        sender_pubkey: inner.signer_pubkey.clone(),
        created_at: inner.created_at,
    }))
}

fn generate_ephemeral() -> [u8; 32] {
    let (secret_key, _) = SECP256K1.generate_keypair(&mut rand::rng());
    secret_key.secret_bytes()
}
