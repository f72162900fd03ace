//! The safety envelope (component I): trade-size/volume/rate limits,
//! cooldowns, market-price deviation checks, and the append-only audit
//! journal.

mod audit;
mod deviation;
mod error;
mod limits;

pub use audit::{AuditEntry, AuditJournal, AuditResult};
pub use deviation::{check_market_deviation, DeviationCheck};
pub use error::SafetyError;
pub use limits::{DailyCounters, Limits};
