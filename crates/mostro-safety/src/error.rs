use thiserror::Error;

#[derive(Debug, Error)]
pub enum SafetyError {
    #[error("trade amount {amount} exceeds the configured limit {limit}")]
    MaxTradeAmountExceeded { amount: u64, limit: u64 },

    #[error("today's volume would reach {projected}, exceeding the daily limit {limit}")]
    DailyVolumeExceeded { projected: u64, limit: u64 },

    #[error("today's trade count {count} has reached the daily limit {limit}")]
    DailyTradeCountExceeded { count: u32, limit: u32 },

    #[error("cooldown active: {remaining_secs}s remaining since the last trade")]
    CooldownActive { remaining_secs: i64 },

    #[error("order price deviates {deviation_percent:.2}% from the market, exceeding the configured maximum {max_percent:.2}%")]
    PriceDeviation {
        deviation_percent: f64,
        max_percent: f64,
    },

    #[error("failed to read or write the audit journal: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize safety state: {0}")]
    Serialization(#[from] serde_json::Error),
}
