//! Reference cascade engine for Quire.
//!
//! When content is permanently deleted, content that points at it through
//! a `reference` field must not be left dangling. The `reference_of` field
//! on the deleted content's schema names who points at it and what to do:
//!
//! - `CASCADE` deletes the referencing content too, recursively
//! - `SET NULL` (the default) removes the reference from its data
//!
//! Persistence goes through [`ContentManager`], one per content kind.
//! Every change is announced to [`ContentObserver`]s and written to an
//! [`AuditLog`].

mod audit;
mod config;
mod engine;
mod error;
mod manager;
mod observer;
mod report;

pub use audit::{AuditEntry, AuditLevel, AuditLog, MemoryAuditLog, TracingAuditLog};
pub use config::{CascadeConfig, DEFAULT_MAX_DEPTH};
pub use engine::ReferenceCascade;
pub use error::{AuditError, CascadeError, CascadeResult, ObserverError};
pub use manager::ContentManager;
pub use observer::ContentObserver;
pub use report::{CascadeAction, CascadeReport, CascadeStage};
