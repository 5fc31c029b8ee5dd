//! Best-effort audit trail of cascaded changes.

use crate::error::AuditError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Severity of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Sink for audit messages. Failures are reported but never abort the
/// caller's operation.
pub trait AuditLog: Send + Sync {
    fn log(&self, level: AuditLevel, message: &str) -> Result<(), AuditError>;
}

/// Writes audit entries as `tracing` events under the `quire::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn log(&self, level: AuditLevel, message: &str) -> Result<(), AuditError> {
        match level {
            AuditLevel::Debug => debug!(target: "quire::audit", "{message}"),
            AuditLevel::Info => info!(target: "quire::audit", "{message}"),
            AuditLevel::Warning => warn!(target: "quire::audit", "{message}"),
            AuditLevel::Error => error!(target: "quire::audit", "{message}"),
        }
        Ok(())
    }
}

/// One recorded audit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub level: AuditLevel,
    pub message: String,
}

/// Keeps audit entries in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every entry logged so far.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }
}

impl AuditLog for MemoryAuditLog {
    fn log(&self, level: AuditLevel, message: &str) -> Result<(), AuditError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AuditError("audit log lock poisoned".to_string()))?;
        entries.push(AuditEntry {
            level,
            message: message.to_string(),
        });
        Ok(())
    }
}
