use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("crypto error: {0}")]
    Crypto(#[from] mostro_crypto::CryptoError),

    #[error("event signature does not verify")]
    SignatureInvalid,

    #[error("event id does not match the canonical serialization")]
    IdMismatch,

    #[error("failed to (de)serialize message payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown category {0:?}, skipping")]
    UnknownCategory(String),

    #[error("unknown action {0:?}, skipping")]
    UnknownAction(String),

    #[error("order tags are missing required field {0}")]
    MissingTag(&'static str),

    #[error("order tag {0} has an unparsable value: {1}")]
    MalformedTag(&'static str, String),
}
