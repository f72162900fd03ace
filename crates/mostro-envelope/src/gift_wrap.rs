use mostro_protocol::event::{Event, UnsignedEvent};
use mostro_protocol::kinds;
use mostro_protocol::message::Message;
use secp256k1::{Keypair, SecretKey, SECP256K1};

use crate::error::EnvelopeError;
use crate::timestamp::tweaked_past_timestamp;

/// A decoded incoming wrap: the inner message, its declared signature (if
/// any), and the rumor's (tweaked) timestamp.
pub struct UnwrappedMessage {
    pub message: Message,
    pub inner_sig: Option<[u8; 64]>,
    pub rumor_created_at: i64,
    /// The trade (or identity) key that signed the rumor, i.e. whoever sent
    /// this wrap. Lets a reply be routed back without out-of-band state.
    pub sender_pubkey: [u8; 32],
}

fn pubkey_hex(secret: &[u8; 32]) -> Result<String, EnvelopeError> {
    let secret_key = SecretKey::from_slice(secret).map_err(|_| EnvelopeError::SignatureInvalid)?;
    let keypair = Keypair::from_secret_key(SECP256K1, &secret_key);
    let (xonly, _) = keypair.x_only_public_key();
    Ok(hex::encode(xonly.serialize()))
}

fn decode_32(hex_str: &str) -> Result<[u8; 32], EnvelopeError> {
    Ok(hex::decode(hex_str)?
        .try_into()
        .map_err(|_| EnvelopeError::SignatureInvalid)?)
}

/// Build and publish-ready a gift wrap (§4.D "Build").
///
/// `identity_private` binds the action to the user's reputation (seals
/// with the identity key) when present; otherwise the seal is signed with
/// the trade key (privacy mode).
pub fn build_gift_wrap(
    recipient_public: &[u8; 32],
    message: &Message,
    trade_private: &[u8; 32],
    identity_private: Option<&[u8; 32]>,
    now: i64,
) -> Result<Event, EnvelopeError> {
    let message_json = serde_json::to_vec(message)?;
    let message_hash = mostro_crypto::sha256(&message_json);
    let inner_sig = mostro_crypto::sign(trade_private, &message_hash)?;

    let trade_public_hex = pubkey_hex(trade_private)?;
    let recipient_hex = hex::encode(recipient_public);

    let rumor = UnsignedEvent {
        signer_pubkey: trade_public_hex,
        created_at: now,
        kind: kinds::TEXT_NOTE,
        tags: vec![vec!["p".to_string(), recipient_hex.clone()]],
        content: serde_json::to_string(&(message, Some(hex::encode(inner_sig))))?,
    };
    let rumor_json = serde_json::to_string(&rumor)?;

    let seal_private = identity_private.unwrap_or(trade_private);
    let seal_key = mostro_crypto::conversation_key(seal_private, recipient_public)?;
    let seal_ciphertext = mostro_crypto::encrypt(&seal_key, rumor_json.as_bytes());

    let seal = UnsignedEvent {
        signer_pubkey: pubkey_hex(seal_private)?,
        created_at: tweaked_past_timestamp(now),
        kind: kinds::SEAL,
        tags: vec![],
        content: hex::encode(seal_ciphertext),
    }
    .finalize(seal_private)?;
    let seal_json = serde_json::to_string(&seal)?;

    let ephemeral = generate_ephemeral();
    let wrap_key = mostro_crypto::conversation_key(&ephemeral, recipient_public)?;
    let wrap_ciphertext = mostro_crypto::encrypt(&wrap_key, seal_json.as_bytes());

    let wrap = UnsignedEvent {
        signer_pubkey: pubkey_hex(&ephemeral)?,
        created_at: tweaked_past_timestamp(now),
        kind: kinds::GIFT_WRAP,
        tags: vec![vec!["p".to_string(), recipient_hex]],
        content: hex::encode(wrap_ciphertext),
    }
    .finalize(&ephemeral)?;

    Ok(wrap)
}

/// Unwrap a gift-wrap event addressed to `recipient_private` (§4.D
/// "Receive"). Returns `None` (caller should skip silently) on any
/// decryption failure at either layer.
pub fn unwrap_gift_wrap(
    wrap: &Event,
    recipient_private: &[u8; 32],
) -> Option<UnwrappedMessage> {
    let ephemeral_pub = decode_32(&wrap.signer_pubkey).ok()?;
    let wrap_key = mostro_crypto::conversation_key(recipient_private, &ephemeral_pub).ok()?;
    let wrap_ciphertext = hex::decode(&wrap.content).ok()?;
    let seal_json = mostro_crypto::decrypt(&wrap_key, &wrap_ciphertext).ok()?;
    let seal: Event = serde_json::from_slice(&seal_json).ok()?;

    let seal_signer_pub = decode_32(&seal.signer_pubkey).ok()?;
    let seal_key = mostro_crypto::conversation_key(recipient_private, &seal_signer_pub).ok()?;
    let seal_ciphertext = hex::decode(&seal.content).ok()?;
    let rumor_json = mostro_crypto::decrypt(&seal_key, &seal_ciphertext).ok()?;
    let rumor: UnsignedEvent = serde_json::from_slice(&rumor_json).ok()?;

    let (message, inner_sig_hex): (Message, Option<String>) =
        serde_json::from_str(&rumor.content).ok()?;
    let inner_sig = match inner_sig_hex {
        Some(hex_sig) => Some(decode_sig(&hex_sig)?),
        None => None,
    };
    let sender_pubkey = decode_32(&rumor.signer_pubkey).ok()?;

    Some(UnwrappedMessage {
        message,
        inner_sig,
        rumor_created_at: rumor.created_at,
        sender_pubkey,
    })
}

fn decode_sig(hex_str: &str) -> Option<[u8; 64]> {
    hex::decode(hex_str).ok()?.try_into().ok()
}

fn generate_ephemeral() -> [u8; 32] {
    let (secret_key, _) = SECP256K1.generate_keypair(&mut rand::rng());
    secret_key.secret_bytes()
}
