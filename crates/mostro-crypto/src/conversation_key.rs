use hkdf::Hkdf;
use secp256k1::{Parity, PublicKey, Scalar, SECP256K1, XOnlyPublicKey};
use sha2::Sha256;

use crate::error::CryptoError;

/// Domain-separation salt for the conversation-key HKDF, matching the
/// relay ecosystem's standard construction.
const CONVERSATION_KEY_SALT: &[u8] = b"nip44-v2";

/// Derive the ECDH shared x-coordinate `x(my_private * G·their_x_only)`.
///
/// BIP-340 x-only keys are lifted to full points assuming even parity,
/// the convention the signing side also uses, so both parties land on the
/// same point regardless of which one originally held the odd-parity key.
pub fn shared_x_coordinate(
    my_private: &[u8; 32],
    their_public: &[u8; 32],
) -> Result<[u8; 32], CryptoError> {
    let xonly = XOnlyPublicKey::from_slice(their_public).map_err(|_| CryptoError::InvalidPublicKey)?;
    let full_point: PublicKey = xonly.public_key(Parity::Even);
    let scalar = Scalar::from_be_bytes(*my_private).map_err(|_| CryptoError::InvalidSecretKey)?;
    let shared_point = full_point
        .mul_tweak(SECP256K1, &scalar)
        .map_err(|_| CryptoError::InvalidSecretKey)?;
    let (xonly_shared, _parity) = shared_point.x_only_public_key();
    Ok(xonly_shared.serialize())
}

/// Derive the 32-byte conversation key used for all ciphertexts between two
/// parties. Symmetric: `conversation_key(a, B) == conversation_key(b, A)`.
pub fn conversation_key(
    my_private: &[u8; 32],
    their_public: &[u8; 32],
) -> Result<[u8; 32], CryptoError> {
    let shared_x = shared_x_coordinate(my_private, their_public)?;
    let hk = Hkdf::<Sha256>::new(Some(CONVERSATION_KEY_SALT), &shared_x);
    let mut key = [0u8; 32];
    hk.expand(&[], &mut key)
        .expect("32 is a valid HKDF-SHA256 output length");
    Ok(key)
}
