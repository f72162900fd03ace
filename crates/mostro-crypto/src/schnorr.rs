use secp256k1::schnorr::Signature;
use secp256k1::{Keypair, SecretKey, XOnlyPublicKey, SECP256K1};

use crate::error::CryptoError;

/// Sign a 32-byte message hash with a BIP-340 Schnorr signature.
pub fn sign(secret_bytes: &[u8; 32], message_hash: &[u8; 32]) -> Result<[u8; 64], CryptoError> {
    let secret = SecretKey::from_slice(secret_bytes).map_err(|_| CryptoError::InvalidSecretKey)?;
    let keypair = Keypair::from_secret_key(SECP256K1, &secret);
    let signature = SECP256K1.sign_schnorr(message_hash.as_slice(), &keypair);
    Ok(signature.serialize())
}

/// Verify a BIP-340 Schnorr signature over a 32-byte message hash and an
/// x-only public key.
pub fn verify(
    public_bytes: &[u8; 32],
    message_hash: &[u8; 32],
    signature: &[u8; 64],
) -> Result<(), CryptoError> {
    let xonly = XOnlyPublicKey::from_slice(public_bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
    let sig = Signature::from_slice(signature).map_err(|_| CryptoError::VerifyFailed)?;
    SECP256K1
        .verify_schnorr(&sig, message_hash.as_slice(), &xonly)
        .map_err(|_| CryptoError::VerifyFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    #[test]
    fn sign_then_verify_round_trips() {
        let secret = [5u8; 32];
        let keypair = Keypair::from_secret_key(SECP256K1, &SecretKey::from_slice(&secret).unwrap());
        let (xonly, _) = keypair.x_only_public_key();
        let public = xonly.serialize();

        let digest = sha256(b"order confirmed");
        let signature = sign(&secret, &digest).unwrap();
        assert!(verify(&public, &digest, &signature).is_ok());
    }

    #[test]
    fn tampered_message_fails_verification() {
        let secret = [5u8; 32];
        let keypair = Keypair::from_secret_key(SECP256K1, &SecretKey::from_slice(&secret).unwrap());
        let (xonly, _) = keypair.x_only_public_key();
        let public = xonly.serialize();

        let digest = sha256(b"order confirmed");
        let signature = sign(&secret, &digest).unwrap();
        let other_digest = sha256(b"order cancelled");
        assert!(verify(&public, &other_digest, &signature).is_err());
    }

    #[test]
    fn wrong_public_key_fails_verification() {
        let secret = [5u8; 32];
        let other_secret = [6u8; 32];
        let other_keypair =
            Keypair::from_secret_key(SECP256K1, &SecretKey::from_slice(&other_secret).unwrap());
        let (other_xonly, _) = other_keypair.x_only_public_key();

        let digest = sha256(b"order confirmed");
        let signature = sign(&secret, &digest).unwrap();
        assert!(verify(&other_xonly.serialize(), &digest, &signature).is_err());
    }
}
