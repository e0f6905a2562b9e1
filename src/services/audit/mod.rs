//! 보안 감사 서비스 모듈

pub mod audit_service;

pub use audit_service::{assess, AuditService, SecurityContext};
