//! 보안 감사 로그 저장 계층

pub mod audit_repo;

pub use audit_repo::{AuditSink, MongoAuditSink};
