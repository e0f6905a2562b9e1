//! 인가 검사 서비스
//!
//! 인가 미들웨어가 사용하는 역할, 권한, 테넌트, 소유권 검사입니다.
//! 모든 거부는 `{success:false, message, code}` 403 응답이 되고
//! 보안 이벤트로 기록됩니다.

use std::sync::Arc;
use serde_json::json;
use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::access_control::role_names;
use crate::domain::entities::audit::SecurityEventKind;
use crate::domain::models::auth::{AccessRule, AuthenticatedUser};
use crate::services::access::AccessControlService;
use crate::services::audit::{AuditService, SecurityContext};

pub struct AuthorizationService {
    access_control: Arc<AccessControlService>,
    audit: Arc<AuditService>,
}

impl AuthorizationService {
    pub fn new(access_control: Arc<AccessControlService>, audit: Arc<AuditService>) -> Self {
        Self { access_control, audit }
    }

    /// 규칙 하나를 검사합니다. 경로 파라미터 규칙은 `path_value` 를 사용합니다.
    pub async fn check(
        &self,
        identity: &AuthenticatedUser,
        rule: &AccessRule,
        path_value: Option<&str>,
        context: SecurityContext,
    ) -> AppResult<()> {
        match rule {
            AccessRule::Role(roles) => self.require_role(identity, roles, context).await,
            AccessRule::Permission { name, scope } => {
                self.require_permission(identity, name, scope.as_deref(), context).await
            }
            AccessRule::AnyPermission(names) => {
                self.require_any_permission(identity, names, context).await
            }
            AccessRule::InstituteAccess { .. } => {
                self.require_institute_access(identity, path_value.unwrap_or_default(), context)
                    .await
            }
            AccessRule::ResourceOwnership { .. } => {
                self.require_resource_ownership(identity, path_value.unwrap_or_default(), context)
                    .await
            }
        }
    }

    pub async fn require_role(
        &self,
        identity: &AuthenticatedUser,
        roles: &[String],
        context: SecurityContext,
    ) -> AppResult<()> {
        if roles.iter().any(|r| identity.has_role(r)) {
            return Ok(());
        }

        self.deny(
            SecurityEventKind::RoleDenied,
            identity,
            context,
            json!({ "requiredRoles": roles, "userRole": identity.role() }),
        )
        .await;
        Err(AppError::forbidden("INSUFFICIENT_ROLE", "접근 권한이 없는 역할입니다"))
    }

    /// 저장소에서 유효 권한을 다시 해석해 검사합니다.
    pub async fn require_permission(
        &self,
        identity: &AuthenticatedUser,
        name: &str,
        scope: Option<&str>,
        context: SecurityContext,
    ) -> AppResult<()> {
        let grants = self.access_control.effective_permissions(&identity.user).await?;
        if grants.iter().any(|g| g.satisfies(name, scope)) {
            return Ok(());
        }

        self.deny(
            SecurityEventKind::PermissionDenied,
            identity,
            context,
            json!({ "attemptedPermissions": [name], "scope": scope }),
        )
        .await;
        Err(AppError::forbidden("INSUFFICIENT_PERMISSIONS", "필요한 권한이 없습니다"))
    }

    pub async fn require_any_permission(
        &self,
        identity: &AuthenticatedUser,
        names: &[String],
        context: SecurityContext,
    ) -> AppResult<()> {
        let grants = self.access_control.effective_permissions(&identity.user).await?;
        if names.iter().any(|name| grants.iter().any(|g| g.satisfies(name, None))) {
            return Ok(());
        }

        self.deny(
            SecurityEventKind::PermissionDenied,
            identity,
            context,
            json!({ "attemptedPermissions": names }),
        )
        .await;
        Err(AppError::forbidden("INSUFFICIENT_PERMISSIONS", "필요한 권한이 없습니다"))
    }

    /// 요청 대상 기관이 사용자 소속 기관과 같은지 검사 (super_admin 은 통과)
    pub async fn require_institute_access(
        &self,
        identity: &AuthenticatedUser,
        institute_id: &str,
        context: SecurityContext,
    ) -> AppResult<()> {
        if role_names::is_super_admin_equivalent(identity.role()) {
            return Ok(());
        }
        let own = identity.user.institute.map(|id| id.to_hex());
        if own.as_deref() == Some(institute_id) {
            return Ok(());
        }

        self.deny(
            SecurityEventKind::CrossTenantAccess,
            identity,
            context,
            json!({ "requestedInstitute": institute_id, "userInstitute": own }),
        )
        .await;
        Err(AppError::forbidden(
            "INSTITUTE_ACCESS_DENIED",
            "다른 기관의 리소스에 접근할 수 없습니다",
        ))
    }

    /// 요청 대상 사용자가 본인인지 검사 (admin 등급은 통과)
    pub async fn require_resource_ownership(
        &self,
        identity: &AuthenticatedUser,
        owner_id: &str,
        context: SecurityContext,
    ) -> AppResult<()> {
        if role_names::is_admin_equivalent(identity.role()) || identity.user_id() == owner_id {
            return Ok(());
        }

        self.deny(
            SecurityEventKind::ResourceOwnershipViolation,
            identity,
            context,
            json!({ "requestedOwner": owner_id }),
        )
        .await;
        Err(AppError::forbidden(
            "RESOURCE_ACCESS_DENIED",
            "다른 사용자의 리소스에 접근할 수 없습니다",
        ))
    }

    async fn deny(
        &self,
        kind: SecurityEventKind,
        identity: &AuthenticatedUser,
        context: SecurityContext,
        details: serde_json::Value,
    ) {
        let context = context.with_user(identity.user_id()).with_details(details);
        self.audit.record_security_event(kind, context).await;
    }
}
