pub mod audit_log;

pub use audit_log::{AuditEntry, RiskLevel, SecurityAssessment, SecurityEventKind};
