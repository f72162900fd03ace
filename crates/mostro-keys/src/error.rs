use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeysError {
    #[error("invalid mnemonic: {0}")]
    MnemonicInvalid(#[from] bip39::Error),

    #[error("trade key index must be >= 1, got {0}")]
    InvalidIndex(u32),

    #[error("key derivation failed: {0}")]
    Derivation(#[from] bitcoin::bip32::Error),

    #[error("invalid secret scalar")]
    InvalidScalar,

    #[error("seed file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no order-to-index mapping recorded for order {0}")]
    UnknownOrder(uuid::Uuid),
}
