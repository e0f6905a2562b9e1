//! # 보안 감사 서비스
//!
//! 인증/인가 과정에서 발생하는 보안 이벤트를 한 곳에서 기록합니다.
//! 위험도는 호출자가 정하지 않고 이벤트 종류로부터 [`assess`] 가 결정합니다.
//!
//! | 이벤트 | 위험도 | 검토 필요 |
//! |--------|--------|-----------|
//! | 로그인 성공, 비밀번호 변경/재설정 요청, 세션 폐기 | LOW | ✗ |
//! | 인증 실패, 세션 무효, 역할/권한 부족 | MEDIUM | ✗ |
//! | 계정 잠금 | HIGH | ✗ |
//! | 기관 간 접근, 리소스 소유권 위반 | HIGH | ✓ |
//!
//! 감사 저장은 최선 노력(best-effort)입니다. 저장 실패는 로그만 남기고
//! 원래 요청의 결과를 바꾸지 않습니다.

use std::sync::Arc;
use actix_web::HttpRequest;
use mongodb::bson::DateTime;
use serde_json::Value;
use crate::domain::entities::audit::{AuditEntry, RiskLevel, SecurityAssessment, SecurityEventKind};
use crate::repositories::audit::AuditSink;
use crate::utils::request_utils::{extract_client_ip, extract_user_agent};

/// 이벤트 종류별 위험도와 검토 필요 여부
pub fn assess(kind: SecurityEventKind) -> SecurityAssessment {
    let (risk_level, requires_review) = match kind {
        SecurityEventKind::LoginSucceeded
        | SecurityEventKind::PasswordChanged
        | SecurityEventKind::PasswordResetRequested
        | SecurityEventKind::SessionRevoked => (RiskLevel::Low, false),
        SecurityEventKind::LoginFailed
        | SecurityEventKind::AuthenticationFailed
        | SecurityEventKind::InvalidSession
        | SecurityEventKind::RefreshRejected
        | SecurityEventKind::RoleDenied
        | SecurityEventKind::PermissionDenied => (RiskLevel::Medium, false),
        SecurityEventKind::AccountLocked => (RiskLevel::High, false),
        SecurityEventKind::CrossTenantAccess
        | SecurityEventKind::ResourceOwnershipViolation => (RiskLevel::High, true),
    };

    SecurityAssessment { risk_level, requires_review }
}

/// 이벤트가 발생한 요청 문맥
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    pub user_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// 요청 경로 등 대상 리소스
    pub resource: Option<String>,
    pub details: Value,
}

impl SecurityContext {
    /// 요청 헤더에서 IP, User-Agent, 경로를 채웁니다.
    pub fn from_request(req: &HttpRequest) -> Self {
        Self {
            user_id: None,
            ip_address: extract_client_ip(req),
            user_agent: extract_user_agent(req),
            resource: Some(format!("{} {}", req.method(), req.path())),
            details: Value::Null,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

pub struct AuditService {
    sink: Arc<dyn AuditSink>,
}

impl AuditService {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// 보안 이벤트 기록
    ///
    /// 위험도에 따라 `info!`/`warn!`/`error!` 로 남기고 감사 저장소에 씁니다.
    pub async fn record_security_event(&self, kind: SecurityEventKind, context: SecurityContext) {
        let security = assess(kind);
        let user = context.user_id.as_deref().unwrap_or("anonymous");
        let resource = context.resource.as_deref().unwrap_or("-");

        match security.risk_level {
            RiskLevel::Low => {
                log::info!("🔐 보안 이벤트 {} - user: {}, resource: {}", kind.as_str(), user, resource)
            }
            RiskLevel::Medium => {
                log::warn!("⚠️ 보안 이벤트 {} - user: {}, resource: {}", kind.as_str(), user, resource)
            }
            RiskLevel::High | RiskLevel::Critical => log::error!(
                "🚨 보안 이벤트 {} ({:?}) - user: {}, resource: {}, 검토 필요: {}",
                kind.as_str(),
                security.risk_level,
                user,
                resource,
                security.requires_review
            ),
        }

        let entry = AuditEntry {
            id: None,
            event_kind: kind,
            action: kind.as_str().to_string(),
            user_id: context.user_id,
            ip_address: context.ip_address,
            user_agent: context.user_agent,
            resource: context.resource,
            details: context.details,
            security,
            created_at: DateTime::now(),
        };

        if let Err(e) = self.sink.write(entry).await {
            log::error!("감사 로그 저장 실패 (무시): {}", e);
        }
    }
}
