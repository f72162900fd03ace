use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("no relay accepted the published event")]
    PublishFailed,

    #[error("relay {relay} failed: {reason}")]
    RelayIo { relay: String, reason: String },
}
