use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::error::SafetyError;

const RETENTION_DAYS: i64 = 7;
const STATE_FILE: &str = "trade-state.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Limits {
    pub max_trade_amount_sats: u64,
    pub max_daily_volume_sats: u64,
    pub max_trades_per_day: u32,
    pub cooldown_seconds: i64,
    /// When set, the Trade Engine requires an explicit caller confirmation
    /// before `release` (the one action that pays out escrowed funds).
    #[serde(default)]
    pub require_confirmation: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_trade_amount_sats: 5_000_000,
            max_daily_volume_sats: 20_000_000,
            max_trades_per_day: 10,
            cooldown_seconds: 30,
            require_confirmation: false,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct DayEntry {
    sats_volume: u64,
    trade_count: u32,
}

/// Per-date trade volume/count tracking, file-backed under the same data
/// directory as the key hierarchy (§3 "Daily counters", §5 "Shared
/// state").
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DailyCounters {
    #[serde(default)]
    days: HashMap<String, DayEntry>,
    #[serde(default)]
    last_trade_at: Option<i64>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

fn date_key(unix_time: i64) -> String {
    DateTime::from_timestamp(unix_time, 0)
        .map(|dt| dt.date_naive().to_string())
        .unwrap_or_else(|| "1970-01-01".to_string())
}

impl DailyCounters {
    pub fn load_or_create(data_dir: &Path) -> Result<Self, SafetyError> {
        let path = data_dir.join(STATE_FILE);
        let mut counters = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Self::default()
        };
        counters.path = Some(path);
        Ok(counters)
    }

    /// Reject any trade whose size would violate the configured limits
    /// (§4.I "Limit check"), checked in the order the spec lists.
    pub fn check_limits(&self, amount_sats: u64, limits: &Limits, now: i64) -> Result<(), SafetyError> {
        if amount_sats > limits.max_trade_amount_sats {
            return Err(SafetyError::MaxTradeAmountExceeded {
                amount: amount_sats,
                limit: limits.max_trade_amount_sats,
            });
        }

        let today = self.days.get(&date_key(now)).cloned().unwrap_or_default();

        let projected = today.sats_volume + amount_sats;
        if projected > limits.max_daily_volume_sats {
            return Err(SafetyError::DailyVolumeExceeded {
                projected,
                limit: limits.max_daily_volume_sats,
            });
        }

        if today.trade_count >= limits.max_trades_per_day {
            return Err(SafetyError::DailyTradeCountExceeded {
                count: today.trade_count,
                limit: limits.max_trades_per_day,
            });
        }

        if let Some(last) = self.last_trade_at {
            let elapsed = now - last;
            if elapsed < limits.cooldown_seconds {
                return Err(SafetyError::CooldownActive {
                    remaining_secs: limits.cooldown_seconds - elapsed,
                });
            }
        }

        Ok(())
    }

    /// Record a completed trade and persist. Entries older than
    /// [`RETENTION_DAYS`] are garbage-collected on every write (§3, §8
    /// "limit monotonicity").
    pub fn record_trade(&mut self, amount_sats: u64, now: i64) -> Result<(), SafetyError> {
        let key = date_key(now);
        let entry = self.days.entry(key).or_default();
        entry.sats_volume += amount_sats;
        entry.trade_count += 1;
        self.last_trade_at = Some(now);
        self.gc(now);
        self.persist()
    }

    fn gc(&mut self, now: i64) {
        let cutoff = now - RETENTION_DAYS * 24 * 60 * 60;
        let cutoff_key = date_key(cutoff);
        self.days.retain(|key, _| key.as_str() >= cutoff_key.as_str());
    }

    fn persist(&self) -> Result<(), SafetyError> {
        let Some(path) = &self.path else { return Ok(()) };
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}
