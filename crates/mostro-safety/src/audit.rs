use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SafetyError;

const AUDIT_FILE: &str = "audit.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditResult {
    Success,
    Failed,
    Pending,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: i64,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiat_amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiat_code: Option<String>,
    pub result: AuditResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Append-only JSON-lines audit journal (§3, §4.I, §8 "audit append-only").
/// Owner-only permissions; every attempted action records exactly one
/// entry with a final outcome.
pub struct AuditJournal {
    path: PathBuf,
}

impl AuditJournal {
    pub fn open(data_dir: &Path) -> Result<Self, SafetyError> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(AUDIT_FILE);
        if !path.exists() {
            std::fs::write(&path, b"")?;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(Self { path })
    }

    pub fn record(&self, entry: &AuditEntry) -> Result<(), SafetyError> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<AuditEntry>, SafetyError> {
        let raw = std::fs::read_to_string(&self.path)?;
        raw.lines()
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::from_str(line).map_err(SafetyError::from))
            .collect()
    }
}
