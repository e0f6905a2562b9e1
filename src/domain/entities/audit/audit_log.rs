//! 보안 감사 로그 엔티티

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// 감사 대상 보안 이벤트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityEventKind {
    LoginSucceeded,
    LoginFailed,
    AccountLocked,
    AuthenticationFailed,
    InvalidSession,
    RefreshRejected,
    RoleDenied,
    PermissionDenied,
    CrossTenantAccess,
    ResourceOwnershipViolation,
    SessionRevoked,
    PasswordChanged,
    PasswordResetRequested,
}

impl SecurityEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityEventKind::LoginSucceeded => "LOGIN_SUCCEEDED",
            SecurityEventKind::LoginFailed => "LOGIN_FAILED",
            SecurityEventKind::AccountLocked => "ACCOUNT_LOCKED",
            SecurityEventKind::AuthenticationFailed => "AUTHENTICATION_FAILED",
            SecurityEventKind::InvalidSession => "INVALID_SESSION",
            SecurityEventKind::RefreshRejected => "REFRESH_REJECTED",
            SecurityEventKind::RoleDenied => "ROLE_DENIED",
            SecurityEventKind::PermissionDenied => "PERMISSION_DENIED",
            SecurityEventKind::CrossTenantAccess => "CROSS_TENANT_ACCESS",
            SecurityEventKind::ResourceOwnershipViolation => "RESOURCE_OWNERSHIP_VIOLATION",
            SecurityEventKind::SessionRevoked => "SESSION_REVOKED",
            SecurityEventKind::PasswordChanged => "PASSWORD_CHANGED",
            SecurityEventKind::PasswordResetRequested => "PASSWORD_RESET_REQUESTED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityAssessment {
    pub risk_level: RiskLevel,
    pub requires_review: bool,
}

/// `audit_logs` 컬렉션 문서
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub event_kind: SecurityEventKind,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default)]
    pub details: serde_json::Value,
    pub security: SecurityAssessment,
    pub created_at: DateTime,
}
