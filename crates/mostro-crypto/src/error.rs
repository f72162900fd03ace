use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid secret key")]
    InvalidSecretKey,

    #[error("ciphertext blob is too short to contain a version, nonce, and tag")]
    CiphertextTooShort,

    #[error("unsupported ciphertext version byte {0}")]
    UnsupportedVersion(u8),

    #[error("decryption failed")]
    DecryptFailed,

    #[error("signing failed: {0}")]
    Sign(#[from] secp256k1::Error),

    #[error("signature verification failed")]
    VerifyFailed,
}
