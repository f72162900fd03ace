use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Keys(#[from] mostro_keys::KeysError),

    #[error(transparent)]
    Envelope(#[from] mostro_envelope::EnvelopeError),

    #[error(transparent)]
    Protocol(#[from] mostro_protocol::ProtocolError),

    #[error(transparent)]
    Safety(#[from] mostro_safety::SafetyError),

    #[error(transparent)]
    Relay(#[from] mostro_relay::RelayError),

    #[error("no order-to-trade-index mapping for order {0}")]
    InvalidIndex(Uuid),

    #[error("trade rejected by the safety envelope: {0}")]
    LimitExceeded(#[source] mostro_safety::SafetyError),

    #[error("no response received within the timeout window")]
    Timeout,

    #[error("releasing order {0} requires explicit confirmation (limits.require_confirmation is set)")]
    ConfirmationRequired(Uuid),

    #[error("coordinator rejected the action: {0}")]
    ProtocolReject(String),

    #[error("failed to (de)serialize: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unrecognized action or category, skipped")]
    Unknown,
}
