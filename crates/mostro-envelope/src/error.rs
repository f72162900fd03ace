use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("crypto error: {0}")]
    Crypto(#[from] mostro_crypto::CryptoError),

    #[error("protocol error: {0}")]
    Protocol(#[from] mostro_protocol::ProtocolError),

    #[error("failed to (de)serialize envelope layer: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid hex encoding: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("inner event signature is invalid")]
    SignatureInvalid,

    #[error("no relay accepted the published event")]
    PublishFailed,
}
