//! JWT 토큰 관리 서비스 구현
//!
//! 액세스 토큰과 리프레시 토큰의 발급, 검증, 갱신을 담당합니다.
//! 모든 토큰은 서버 측 세션에 묶여 있으며, 세션의 `access_token_version` 과
//! 토큰의 `tokenVersion` 이 다르면 만료 전이라도 거부됩니다.
//!
//! ## 발급 흐름
//!
//! ```text
//! issue_pair
//!   1. Provisional 세션 생성 (자리표시자 리프레시 값)
//!   2. 액세스 토큰 서명   (version 0)
//!   3. 리프레시 토큰 서명 (version 0, jti)
//!   4. 다이제스트 기록 + Issued 전이  ──► 이후에만 토큰 반환
//!
//! refresh
//!   1. 리프레시 토큰 검증
//!   2. ID + 다이제스트로 세션 조회 (재사용된 토큰은 여기서 걸러짐)
//!   3. 사용자 상태 / 비밀번호 변경 시각 확인
//!   4. version $inc → 새 토큰 쌍 서명 → 다이제스트 교체 (마지막 쓰기 우선)
//! ```

use std::sync::Arc;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;
use crate::config::AuthSettings;
use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::audit::SecurityEventKind;
use crate::domain::entities::sessions::{digest_token, DeviceInfo, RevokeReason};
use crate::domain::entities::users::User;
use crate::domain::models::token::{
    AccessClaims, IssuedTokens, RefreshClaims, RefreshedTokens, SessionContext,
    SessionInvalidReason, SessionValidation, TokenError, TokenType, TypedClaims,
};
use crate::repositories::users::UserStore;
use crate::services::access::AccessControlService;
use crate::services::audit::{AuditService, SecurityContext};
use crate::services::sessions::SessionService;

fn invalid_refresh() -> AppError {
    AppError::unauthorized("INVALID_REFRESH_TOKEN", "유효하지 않은 리프레시 토큰입니다")
}

/// 갱신 거부 사유 (감사 기록용)
struct RefreshRejection {
    reason: String,
    user_id: Option<String>,
    session_id: Option<String>,
}

impl RefreshRejection {
    fn new(reason: String, user_id: Option<String>, session_id: Option<String>) -> Self {
        Self { reason, user_id, session_id }
    }
}

/// JWT 토큰 관리 서비스
///
/// HMAC-SHA256 으로 서명하며 액세스/리프레시 토큰은 서로 다른 시크릿을 씁니다.
pub struct TokenService {
    settings: Arc<AuthSettings>,
    sessions: Arc<SessionService>,
    users: Arc<dyn UserStore>,
    access_control: Arc<AccessControlService>,
    audit: Arc<AuditService>,
}

impl TokenService {
    pub fn new(
        settings: Arc<AuthSettings>,
        sessions: Arc<SessionService>,
        users: Arc<dyn UserStore>,
        access_control: Arc<AccessControlService>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self { settings, sessions, users, access_control, audit }
    }

    fn sign<T: Serialize>(&self, claims: &T, secret: &str) -> AppResult<String> {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_ref()))
            .map_err(|e| TokenError::Signing(e.to_string()).into())
    }

    fn mint_access(
        &self,
        user: &User,
        session_id: &str,
        token_version: i64,
        permissions: Vec<String>,
    ) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            user_id: user
                .id_string()
                .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?,
            role: user.role.clone(),
            permissions,
            session_id: session_id.to_string(),
            token_version,
            token_type: TokenType::Access,
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            iat: now,
            exp: now + self.settings.access_ttl_secs,
        };

        self.sign(&claims, &self.settings.access_secret)
    }

    fn mint_refresh(&self, user_id: &str, session_id: &str, token_version: i64) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = RefreshClaims {
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            token_version,
            jti: Uuid::new_v4().to_string(),
            token_type: TokenType::Refresh,
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            iat: now,
            exp: now + self.settings.refresh_ttl_secs,
        };

        self.sign(&claims, &self.settings.refresh_secret)
    }

    /// 로그인 성공 시 세션을 만들고 토큰 쌍을 발급합니다.
    ///
    /// 세션이 Issued 로 전이된 뒤에만 토큰을 돌려줍니다.
    pub async fn issue_pair(&self, user: &User, context: SessionContext) -> AppResult<IssuedTokens> {
        let user_id = user
            .id
            .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?;

        let session = self
            .sessions
            .create(
                user_id,
                DeviceInfo::from_user_agent(context.user_agent.as_deref()),
                context.ip_address,
                &context.login_method,
            )
            .await?;
        let session_oid = session
            .id
            .ok_or_else(|| AppError::InternalError("세션 ID가 없습니다".to_string()))?;
        let session_id = session_oid.to_hex();

        let permissions = self.access_control.permission_names(user).await?;
        let access_token = self.mint_access(user, &session_id, 0, permissions)?;
        let refresh_token = self.mint_refresh(&user_id.to_hex(), &session_id, 0)?;

        if !self.sessions.mark_issued(&session_oid, &digest_token(&refresh_token)).await? {
            return Err(AppError::InternalError(format!(
                "세션 발급 상태 전이 실패: {}",
                session_id
            )));
        }

        log::info!("🔑 토큰 발급 - user: {}, session: {}", user_id, session_id);

        Ok(IssuedTokens {
            access_token,
            refresh_token,
            session_id,
            expires_in: self.settings.access_ttl_secs,
        })
    }

    /// 리프레시 토큰으로 새 토큰 쌍을 발급합니다.
    ///
    /// 세션 버전을 올리므로 이전에 발급된 액세스 토큰은 모두 무효가 됩니다.
    /// 거부된 요청은 사유와 함께 `REFRESH_REJECTED` 감사 이벤트로 남습니다.
    pub async fn refresh(&self, refresh_token: &str, context: SecurityContext) -> AppResult<RefreshedTokens> {
        match self.rotate(refresh_token, &context).await? {
            Ok(tokens) => Ok(tokens),
            Err(rejection) => {
                let mut context = context.with_details(json!({
                    "reason": rejection.reason,
                    "sessionId": rejection.session_id,
                }));
                if let Some(user_id) = rejection.user_id {
                    context = context.with_user(user_id);
                }
                self.audit
                    .record_security_event(SecurityEventKind::RefreshRejected, context)
                    .await;
                Err(invalid_refresh())
            }
        }
    }

    async fn rotate(
        &self,
        refresh_token: &str,
        context: &SecurityContext,
    ) -> AppResult<Result<RefreshedTokens, RefreshRejection>> {
        let claims = match self.verify_refresh(refresh_token) {
            Ok(claims) => claims,
            Err(e) => {
                log::debug!("리프레시 토큰 검증 실패: {}", e);
                return Ok(Err(RefreshRejection::new(format!("token_invalid: {}", e), None, None)));
            }
        };
        let reject = |reason: &str| -> AppResult<Result<RefreshedTokens, RefreshRejection>> {
            Ok(Err(RefreshRejection::new(
                reason.to_string(),
                Some(claims.user_id.clone()),
                Some(claims.session_id.clone()),
            )))
        };
        let Ok(session_id) = ObjectId::parse_str(&claims.session_id) else {
            return reject("session_id_malformed");
        };

        let session = match self
            .sessions
            .find_by_refresh_digest(&session_id, &digest_token(refresh_token))
            .await?
        {
            Some(session) if session.is_live() => session,
            _ => {
                log::warn!("⚠️ 유효하지 않은 세션으로 갱신 시도 - session: {}", claims.session_id);
                return reject("session_invalid_or_replayed");
            }
        };

        let user = match self.users.find_by_id(&session.user).await? {
            Some(user) if user.can_sign_in() => user,
            _ => {
                let context = context.clone().with_user(claims.user_id.clone());
                self.revoke_session(&session_id, RevokeReason::AccountDeactivated, context)
                    .await?;
                return reject("user_inactive");
            }
        };

        if user.password_changed_after(claims.iat) {
            let context = context.clone().with_user(claims.user_id.clone());
            self.revoke_session(&session_id, RevokeReason::SecurityBreach, context)
                .await?;
            log::warn!("⚠️ 비밀번호 변경 이전 리프레시 토큰 사용 - session: {}", claims.session_id);
            return reject("password_changed");
        }

        let Some(version) = self.sessions.bump_version(&session_id).await? else {
            return reject("session_missing");
        };

        let permissions = self.access_control.permission_names(&user).await?;
        let access_token = self.mint_access(&user, &claims.session_id, version, permissions)?;
        let refresh_token = self.mint_refresh(&claims.user_id, &claims.session_id, version)?;
        self.sessions
            .rotate_refresh(&session_id, &digest_token(&refresh_token))
            .await?;

        log::debug!("토큰 갱신 - session: {}, version: {}", claims.session_id, version);

        Ok(Ok(RefreshedTokens {
            access_token,
            refresh_token,
            expires_in: self.settings.access_ttl_secs,
        }))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.settings.issuer.as_str()]);
        validation.set_audience(&[self.settings.audience.as_str()]);
        validation
    }

    fn verify<T>(&self, token: &str, secret: &str, expected: TokenType) -> Result<T, TokenError>
    where
        T: DeserializeOwned + TypedClaims,
    {
        let claims = decode::<T>(token, &DecodingKey::from_secret(secret.as_ref()), &self.validation())
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidAudience => TokenError::InvalidAudience,
                ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
                _ => TokenError::Malformed,
            })?;

        if claims.token_type() != expected {
            return Err(TokenError::WrongType);
        }
        Ok(claims)
    }

    /// 서명, 발급자, 대상, 만료, `type` 검증
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.verify(token, &self.settings.access_secret, TokenType::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.verify(token, &self.settings.refresh_secret, TokenType::Refresh)
    }

    /// 액세스 토큰이 가리키는 세션과 사용자가 아직 유효한지 확인
    pub async fn validate_session(&self, claims: &AccessClaims) -> AppResult<SessionValidation> {
        let Ok(session_id) = ObjectId::parse_str(&claims.session_id) else {
            return Ok(SessionValidation::invalid(SessionInvalidReason::SessionNotFound));
        };

        let session = match self.sessions.find(&session_id).await? {
            Some(session) if session.user.to_hex() == claims.user_id => session,
            _ => return Ok(SessionValidation::invalid(SessionInvalidReason::SessionNotFound)),
        };
        if !session.is_live() {
            return Ok(SessionValidation::invalid(SessionInvalidReason::SessionNotLive));
        }
        if !session.is_current_for(claims.token_version) {
            return Ok(SessionValidation::invalid(SessionInvalidReason::VersionMismatch));
        }

        let user = match self.users.find_by_id(&session.user).await? {
            Some(user) if user.can_sign_in() => user,
            _ => return Ok(SessionValidation::invalid(SessionInvalidReason::UserInactive)),
        };
        if user.password_changed_after(claims.iat) {
            return Ok(SessionValidation::invalid(SessionInvalidReason::PasswordChanged));
        }

        Ok(SessionValidation::valid(session, user))
    }

    /// 세션 하나를 폐기하고 `SESSION_REVOKED` 이벤트를 남깁니다.
    pub async fn revoke_session(
        &self,
        session_id: &ObjectId,
        reason: RevokeReason,
        context: SecurityContext,
    ) -> AppResult<bool> {
        let revoked = self.sessions.revoke(session_id, reason).await?;
        if revoked {
            self.audit
                .record_security_event(
                    SecurityEventKind::SessionRevoked,
                    context.with_details(json!({ "sessionId": session_id.to_hex(), "reason": reason })),
                )
                .await;
        }
        Ok(revoked)
    }

    /// 사용자 본인의 세션만 폐기합니다. 다른 사용자의 세션은 없는 것으로 취급합니다.
    pub async fn revoke_owned_session(
        &self,
        user_id: &ObjectId,
        session_id: &ObjectId,
        reason: RevokeReason,
        context: SecurityContext,
    ) -> AppResult<bool> {
        match self.sessions.find(session_id).await? {
            Some(session) if session.user == *user_id => {
                self.revoke_session(session_id, reason, context).await
            }
            _ => Err(AppError::NotFound("세션을 찾을 수 없습니다".to_string())),
        }
    }

    pub async fn revoke_all_user_sessions(
        &self,
        user_id: &ObjectId,
        reason: RevokeReason,
        context: SecurityContext,
    ) -> AppResult<u64> {
        let count = self.sessions.revoke_all_for_user(user_id, reason).await?;
        if count > 0 {
            self.audit
                .record_security_event(
                    SecurityEventKind::SessionRevoked,
                    context.with_details(json!({
                        "owner": user_id.to_hex(),
                        "count": count,
                        "reason": reason,
                    })),
                )
                .await;
        }
        Ok(count)
    }

    /// `Authorization` 헤더 값에서 토큰 부분만 추출
    ///
    /// ```rust,ignore
    /// let token = TokenService::extract_bearer_token("Bearer eyJhbGciOi...")?;
    /// ```
    pub fn extract_bearer_token(auth_header: &str) -> AppResult<&str> {
        match auth_header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim()),
            _ => Err(AppError::unauthorized(
                "INVALID_TOKEN_FORMAT",
                "유효하지 않은 인증 헤더 형식입니다",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::DateTime;
    use crate::config::auth_config::test_settings;
    use crate::domain::entities::access_control::AccessControlEntry;
    use crate::domain::entities::audit::{AuditEntry, RiskLevel};
    use crate::domain::entities::sessions::IssuanceState;
    use crate::domain::entities::users::{password_changed_stamp, AccountStatus, StatusChange};
    use crate::repositories::memory::{
        MemoryAccessControlStore, MemoryAuditSink, MemorySessionStore, MemoryUserStore,
    };

    struct Fixture {
        tokens: TokenService,
        sessions: Arc<MemorySessionStore>,
        users: Arc<MemoryUserStore>,
        audit: Arc<MemoryAuditSink>,
        user: User,
    }

    impl Fixture {
        fn events(&self, kind: SecurityEventKind) -> Vec<AuditEntry> {
            self.audit.entries().into_iter().filter(|e| e.event_kind == kind).collect()
        }
    }

    async fn fixture() -> Fixture {
        let settings = Arc::new(test_settings());
        let sessions = Arc::new(MemorySessionStore::default());
        let users = Arc::new(MemoryUserStore::default());
        let access = Arc::new(MemoryAccessControlStore::default());
        let read = access.put(AccessControlEntry::permission("users:read", None));
        access.put(AccessControlEntry::role("student", vec![read]));

        let mut user = User::new_pending(
            "a@x.com".to_string(),
            "alice".to_string(),
            "Alice".to_string(),
            "hash".to_string(),
            "student".to_string(),
        );
        user.account_status = AccountStatus::Active;
        user.is_active = true;
        user.is_approved = true;
        let user = users.insert(user).await.unwrap();

        let audit = Arc::new(MemoryAuditSink::default());
        let tokens = TokenService::new(
            settings.clone(),
            Arc::new(SessionService::new(sessions.clone(), settings)),
            users.clone(),
            Arc::new(AccessControlService::new(access)),
            Arc::new(AuditService::new(audit.clone())),
        );
        Fixture { tokens, sessions, users, audit, user }
    }

    fn context() -> SessionContext {
        SessionContext {
            user_agent: Some("Mozilla/5.0 (X11; Linux x86_64) Firefox/120.0".to_string()),
            ip_address: Some("127.0.0.1".to_string()),
            login_method: "password".to_string(),
        }
    }

    #[actix_web::test]
    async fn test_issue_pair_binds_tokens_to_issued_session() {
        let f = fixture().await;
        let issued = f.tokens.issue_pair(&f.user, context()).await.unwrap();

        let refresh = f.tokens.verify_refresh(&issued.refresh_token).unwrap();
        assert_eq!(refresh.session_id, issued.session_id);
        assert_eq!(refresh.token_version, 0);

        let access = f.tokens.verify_access(&issued.access_token).unwrap();
        assert_eq!(access.session_id, issued.session_id);
        assert_eq!(access.permissions, vec!["users:read".to_string()]);
        assert_eq!(issued.expires_in, 900);

        let stored = f.sessions.all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].issuance, IssuanceState::Issued);
        assert_eq!(stored[0].refresh_token, digest_token(&issued.refresh_token));
        assert_eq!(stored[0].device.browser, "Firefox");
    }

    #[actix_web::test]
    async fn test_validate_session_accepts_fresh_token() {
        let f = fixture().await;
        let issued = f.tokens.issue_pair(&f.user, context()).await.unwrap();
        let claims = f.tokens.verify_access(&issued.access_token).unwrap();

        let validation = f.tokens.validate_session(&claims).await.unwrap();
        assert!(validation.valid);
        assert_eq!(validation.user.and_then(|u| u.id), f.user.id);
    }

    #[actix_web::test]
    async fn test_refresh_bumps_version_and_stales_old_access() {
        let f = fixture().await;
        let issued = f.tokens.issue_pair(&f.user, context()).await.unwrap();
        let original = f.tokens.verify_access(&issued.access_token).unwrap();

        let mut refresh_token = issued.refresh_token.clone();
        let mut latest = String::new();
        for _ in 0..3 {
            let refreshed = f.tokens.refresh(&refresh_token, SecurityContext::default()).await.unwrap();
            refresh_token = refreshed.refresh_token;
            latest = refreshed.access_token;
        }

        assert_eq!(f.sessions.all()[0].access_token_version, 3);

        let stale = f.tokens.validate_session(&original).await.unwrap();
        assert!(!stale.valid);
        assert_eq!(stale.reason, Some(SessionInvalidReason::VersionMismatch));
        assert_eq!(stale.reason.map(|r| r.message()), Some("Token version mismatch"));

        let current = f.tokens.verify_access(&latest).unwrap();
        assert_eq!(current.token_version, 3);
        assert!(f.tokens.validate_session(&current).await.unwrap().valid);
    }

    #[actix_web::test]
    async fn test_replayed_refresh_token_is_rejected_and_audited() {
        let f = fixture().await;
        let issued = f.tokens.issue_pair(&f.user, context()).await.unwrap();

        assert!(f.tokens.refresh(&issued.refresh_token, SecurityContext::default()).await.is_ok());
        assert!(f.events(SecurityEventKind::RefreshRejected).is_empty());

        let replay = f.tokens.refresh(&issued.refresh_token, SecurityContext::default()).await.unwrap_err();
        assert_eq!(replay.code(), "INVALID_REFRESH_TOKEN");

        let rejected = f.events(SecurityEventKind::RefreshRejected);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].security.risk_level, RiskLevel::Medium);
        assert_eq!(rejected[0].details["reason"], "session_invalid_or_replayed");
        assert_eq!(rejected[0].details["sessionId"], issued.session_id.as_str());
        assert_eq!(rejected[0].user_id, f.user.id_string());
    }

    #[actix_web::test]
    async fn test_forged_refresh_token_is_audited() {
        let f = fixture().await;

        let err = f
            .tokens
            .refresh("forged.refresh.token", SecurityContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_REFRESH_TOKEN");

        let rejected = f.events(SecurityEventKind::RefreshRejected);
        assert_eq!(rejected.len(), 1);
        assert!(rejected[0].user_id.is_none());
        assert!(rejected[0].details["reason"].as_str().unwrap().starts_with("token_invalid"));
    }

    #[actix_web::test]
    async fn test_concurrent_refresh_last_write_wins() {
        let f = fixture().await;
        let issued = f.tokens.issue_pair(&f.user, context()).await.unwrap();
        let session_id = ObjectId::parse_str(&issued.session_id).unwrap();
        let original_digest = digest_token(&issued.refresh_token);

        let first = f.tokens.refresh(&issued.refresh_token, SecurityContext::default()).await.unwrap();

        // 두 번째 요청이 교체 전에 세션을 읽은 상황
        f.sessions.modify(&session_id, |s| s.refresh_token = original_digest.clone());
        let second = f.tokens.refresh(&issued.refresh_token, SecurityContext::default()).await.unwrap();

        let loser = f.tokens.verify_access(&first.access_token).unwrap();
        let winner = f.tokens.verify_access(&second.access_token).unwrap();
        assert_eq!(loser.token_version, 1);
        assert_eq!(winner.token_version, 2);

        let stale = f.tokens.validate_session(&loser).await.unwrap();
        assert_eq!(stale.reason, Some(SessionInvalidReason::VersionMismatch));
        assert!(f.tokens.validate_session(&winner).await.unwrap().valid);

        // 진 쪽의 리프레시 토큰은 저장된 다이제스트와 맞지 않음
        assert!(f.tokens.refresh(&first.refresh_token, SecurityContext::default()).await.is_err());
        assert!(f.tokens.refresh(&second.refresh_token, SecurityContext::default()).await.is_ok());
    }

    #[actix_web::test]
    async fn test_refresh_for_inactive_user_revokes_session() {
        let f = fixture().await;
        let issued = f.tokens.issue_pair(&f.user, context()).await.unwrap();
        let user_id = f.user.id.unwrap();
        let change = StatusChange { status: AccountStatus::Paused, is_active: false, is_approved: true };
        f.users.update_status(&user_id, change).await.unwrap();

        assert!(f.tokens.refresh(&issued.refresh_token, SecurityContext::default()).await.is_err());
        let session = &f.sessions.all()[0];
        assert!(session.is_revoked);
        assert_eq!(session.revoked_reason, Some(RevokeReason::AccountDeactivated));
    }

    #[actix_web::test]
    async fn test_refresh_after_password_change_is_security_breach() {
        let f = fixture().await;
        let issued = f.tokens.issue_pair(&f.user, context()).await.unwrap();
        let user_id = f.user.id.unwrap();
        let later = DateTime::from_millis(DateTime::now().timestamp_millis() + 5_000);
        f.users
            .update_password(&user_id, "new-hash", password_changed_stamp(later))
            .await
            .unwrap();

        assert!(f.tokens.refresh(&issued.refresh_token, SecurityContext::default()).await.is_err());
        assert_eq!(f.sessions.all()[0].revoked_reason, Some(RevokeReason::SecurityBreach));

        assert_eq!(f.events(SecurityEventKind::SessionRevoked)[0].details["reason"], "SecurityBreach");
        assert_eq!(f.events(SecurityEventKind::RefreshRejected)[0].details["reason"], "password_changed");
    }

    #[actix_web::test]
    async fn test_revoked_session_fails_validation() {
        let f = fixture().await;
        let issued = f.tokens.issue_pair(&f.user, context()).await.unwrap();
        let claims = f.tokens.verify_access(&issued.access_token).unwrap();

        let session_id = ObjectId::parse_str(&issued.session_id).unwrap();

        assert!(f
            .tokens
            .revoke_session(&session_id, RevokeReason::UserLogout, SecurityContext::default())
            .await
            .unwrap());
        assert!(!f
            .tokens
            .revoke_session(&session_id, RevokeReason::AdminRevoked, SecurityContext::default())
            .await
            .unwrap());

        let revoked = f.events(SecurityEventKind::SessionRevoked);
        assert_eq!(revoked.len(), 1);
        assert_eq!(revoked[0].details["reason"], "UserLogout");

        let validation = f.tokens.validate_session(&claims).await.unwrap();
        assert_eq!(validation.reason, Some(SessionInvalidReason::SessionNotLive));
        assert!(f.tokens.refresh(&issued.refresh_token, SecurityContext::default()).await.is_err());
    }

    #[actix_web::test]
    async fn test_revoke_owned_session_hides_foreign_sessions() {
        let f = fixture().await;
        let issued = f.tokens.issue_pair(&f.user, context()).await.unwrap();
        let session_id = ObjectId::parse_str(&issued.session_id).unwrap();

        let err = f
            .tokens
            .revoke_owned_session(&ObjectId::new(), &session_id, RevokeReason::UserLogout, SecurityContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(!f.sessions.all()[0].is_revoked);

        let owner = f.user.id.unwrap();
        assert!(f
            .tokens
            .revoke_owned_session(&owner, &session_id, RevokeReason::UserLogout, SecurityContext::default())
            .await
            .unwrap());
    }

    #[actix_web::test]
    async fn test_revoke_all_user_sessions_records_one_event() {
        let f = fixture().await;
        let user_id = f.user.id.unwrap();
        for _ in 0..3 {
            f.tokens.issue_pair(&f.user, context()).await.unwrap();
        }

        let count = f
            .tokens
            .revoke_all_user_sessions(&user_id, RevokeReason::AdminRevoked, SecurityContext::default().with_user("admin"))
            .await
            .unwrap();
        assert_eq!(count, 3);
        assert!(f.sessions.all().iter().all(|s| s.revoked_reason == Some(RevokeReason::AdminRevoked)));

        let revoked = f.events(SecurityEventKind::SessionRevoked);
        assert_eq!(revoked.len(), 1);
        assert_eq!(revoked[0].details["count"], 3);
        assert_eq!(revoked[0].details["owner"], user_id.to_hex());
        assert_eq!(revoked[0].user_id.as_deref(), Some("admin"));

        let again = f
            .tokens
            .revoke_all_user_sessions(&user_id, RevokeReason::AdminRevoked, SecurityContext::default())
            .await
            .unwrap();
        assert_eq!(again, 0);
        assert_eq!(f.events(SecurityEventKind::SessionRevoked).len(), 1);
    }

    #[actix_web::test]
    async fn test_token_type_confusion_is_rejected() {
        let f = fixture().await;
        let issued = f.tokens.issue_pair(&f.user, context()).await.unwrap();

        // 서로 다른 시크릿이므로 서명 단계에서 거부
        assert_eq!(f.tokens.verify_access(&issued.refresh_token).unwrap_err(), TokenError::Malformed);
        assert!(f.tokens.verify_refresh(&issued.access_token).is_err());

        let mut claims = f.tokens.verify_access(&issued.access_token).unwrap();
        claims.token_type = TokenType::Refresh;
        let forged = f.tokens.sign(&claims, &test_settings().access_secret).unwrap();
        assert_eq!(f.tokens.verify_access(&forged).unwrap_err(), TokenError::WrongType);
    }

    #[actix_web::test]
    async fn test_expired_and_foreign_audience_tokens() {
        let f = fixture().await;
        let issued = f.tokens.issue_pair(&f.user, context()).await.unwrap();
        let claims = f.tokens.verify_access(&issued.access_token).unwrap();
        let secret = test_settings().access_secret;

        let mut expired = claims.clone();
        expired.iat -= 7_200;
        expired.exp = expired.iat + 60;
        let token = f.tokens.sign(&expired, &secret).unwrap();
        assert_eq!(f.tokens.verify_access(&token).unwrap_err(), TokenError::Expired);

        let mut foreign = claims.clone();
        foreign.aud = "another-app".to_string();
        let token = f.tokens.sign(&foreign, &secret).unwrap();
        assert_eq!(f.tokens.verify_access(&token).unwrap_err(), TokenError::InvalidAudience);

        let mut issuer = claims;
        issuer.iss = "someone-else".to_string();
        let token = f.tokens.sign(&issuer, &secret).unwrap();
        assert_eq!(f.tokens.verify_access(&token).unwrap_err(), TokenError::InvalidIssuer);
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(TokenService::extract_bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");

        let err = TokenService::extract_bearer_token("Basic dXNlcg==").unwrap_err();
        assert_eq!(err.code(), "INVALID_TOKEN_FORMAT");
        assert!(TokenService::extract_bearer_token("Bearer ").is_err());
    }
}
