//! # 인증 서비스
//!
//! `/api/auth` 엔드포인트의 비즈니스 로직을 구현합니다.
//!
//! ## 로그인 판정 순서
//!
//! ```text
//! 사용자 조회 ─✗─► 401 INVALID_CREDENTIALS
//!     │
//! 잠금 여부 ───✓─► 423 ACCOUNT_LOCKED   (비밀번호 확인 전)
//!     │
//! 비밀번호 ────✗─► 실패 카운터 증가 ──► 401 INVALID_CREDENTIALS
//!     │
//! 계정 상태 ───✗─► 403 ACCOUNT_INACTIVE
//!     │
//! 카운터 초기화 ──► 토큰 쌍 발급
//! ```
//!
//! ## 비밀번호 재설정
//!
//! 재설정 토큰은 32바이트 난수이며 저장소에는 다이제스트만 남습니다.
//! 존재하지 않는 이메일에도 같은 모양의 응답을 돌려주고,
//! 운영 환경에서는 토큰 자체를 응답에 싣지 않습니다.

use std::sync::Arc;
use base64::{engine::general_purpose, Engine as _};
use mongodb::bson::DateTime;
use rand::RngCore;
use serde_json::json;
use validator::Validate;
use crate::config::AuthSettings;
use crate::core::errors::{AppError, AppResult};
use crate::domain::dto::auth::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use crate::domain::dto::users::ProfileUpdateRequest;
use crate::domain::entities::audit::SecurityEventKind;
use crate::domain::entities::sessions::{digest_token, RevokeReason};
use crate::domain::entities::users::{password_changed_stamp, User};
use crate::domain::models::auth::AuthenticatedUser;
use crate::domain::models::token::{IssuedTokens, SessionContext};
use crate::repositories::tokens::ResetTokenStore;
use crate::repositories::users::UserStore;
use crate::services::audit::{AuditService, SecurityContext};
use crate::services::auth::{PasswordPolicy, TokenService};
use crate::utils::string_utils::{clean_optional_string, normalize_email};

const LOGIN_METHOD: &str = "password";
const RESET_TOKEN_BYTES: usize = 32;

fn invalid_credentials() -> AppError {
    AppError::unauthorized("INVALID_CREDENTIALS", "이메일/사용자명 또는 비밀번호가 올바르지 않습니다")
}

pub struct AuthService {
    settings: Arc<AuthSettings>,
    users: Arc<dyn UserStore>,
    reset_tokens: Arc<dyn ResetTokenStore>,
    policy: Arc<PasswordPolicy>,
    tokens: Arc<TokenService>,
    audit: Arc<AuditService>,
}

impl AuthService {
    pub fn new(
        settings: Arc<AuthSettings>,
        users: Arc<dyn UserStore>,
        reset_tokens: Arc<dyn ResetTokenStore>,
        policy: Arc<PasswordPolicy>,
        tokens: Arc<TokenService>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self { settings, users, reset_tokens, policy, tokens, audit }
    }

    /// 회원가입. 새 계정은 관리자 승인 전까지 Pending 상태입니다.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        request.validate()?;
        self.policy
            .validate_complexity(&request.password)
            .map_err(AppError::WeakPassword)?;

        let email = normalize_email(&request.email);
        let username = request.username.trim().to_string();
        let cnic = clean_optional_string(request.cnic);

        if let Some(field) = self
            .users
            .find_conflict(&email, &username, cnic.as_deref())
            .await?
        {
            log::debug!("회원가입 중복 - field: {}", field.as_str());
            return Err(AppError::DuplicateCredential(field));
        }

        let hash = self.policy.hash(&request.password).await?;
        let mut user = User::new_pending(
            email,
            username,
            request.full_name.trim().to_string(),
            hash,
            request.role,
        );
        user.cnic = cnic;
        user.gender = request.gender;
        user.date_of_birth = request.date_of_birth;
        user.phone_numbers = request.phone_numbers;
        user.family_info = request.family_info;
        user.academic_history = request.academic_history;

        let mut created = self.users.insert(user).await?;
        created.password_hash = None;

        log::info!("✅ 회원가입 완료 (승인 대기) - username: {}", created.username);
        Ok(created)
    }

    /// 이메일 또는 사용자명으로 로그인
    pub async fn login(
        &self,
        request: LoginRequest,
        context: SecurityContext,
    ) -> AppResult<(User, IssuedTokens)> {
        request.validate()?;
        let login = request.login.trim();

        let Some(mut user) = self.users.find_by_login_with_secret(login).await? else {
            self.audit
                .record_security_event(
                    SecurityEventKind::LoginFailed,
                    context.with_details(json!({ "login": login, "reason": "unknown_user" })),
                )
                .await;
            return Err(invalid_credentials());
        };
        let user_id = user
            .id
            .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?;
        let now = DateTime::now();

        if user.is_locked_at(now) {
            self.audit
                .record_security_event(
                    SecurityEventKind::LoginFailed,
                    context.with_user(user_id.to_hex()).with_details(json!({ "reason": "locked" })),
                )
                .await;
            return Err(AppError::AccountLocked);
        }

        let matches = match user.password_hash.as_deref() {
            Some(hash) => self.policy.compare(&request.password, hash).await?,
            None => false,
        };

        if !matches {
            let updated = self
                .users
                .apply_failed_login(&user_id, user.next_lockout_update(now))
                .await?;
            let deadline = updated.and_then(|u| {
                u.lockout_deadline(now, self.settings.max_login_attempts, self.settings.lockout_millis())
            });

            let locked = match deadline {
                Some(until) => self.users.lock_account(&user_id, until, now).await?,
                None => false,
            };
            if locked {
                self.audit
                    .record_security_event(
                        SecurityEventKind::AccountLocked,
                        context.clone().with_user(user_id.to_hex()),
                    )
                    .await;
            }
            self.audit
                .record_security_event(
                    SecurityEventKind::LoginFailed,
                    context.with_user(user_id.to_hex()).with_details(json!({ "reason": "bad_password" })),
                )
                .await;
            return Err(invalid_credentials());
        }

        if !user.can_sign_in() {
            log::info!(
                "비활성 계정 로그인 시도 - user: {}, status: {}",
                user_id,
                user.account_status.as_str()
            );
            return Err(AppError::AccountInactive);
        }

        self.users.reset_login_attempts(&user_id, now).await?;

        let session_context = SessionContext {
            user_agent: context.user_agent.clone(),
            ip_address: context.ip_address.clone(),
            login_method: LOGIN_METHOD.to_string(),
        };
        let tokens = self.tokens.issue_pair(&user, session_context).await?;

        self.audit
            .record_security_event(
                SecurityEventKind::LoginSucceeded,
                context.with_user(user_id.to_hex()),
            )
            .await;

        user.password_hash = None;
        user.login_attempts = 0;
        user.lock_until = None;
        user.last_login_at = Some(now);
        Ok((user, tokens))
    }

    /// 현재 세션 폐기. 이미 폐기된 세션이어도 성공으로 처리합니다.
    pub async fn logout(&self, identity: &AuthenticatedUser, context: SecurityContext) -> AppResult<()> {
        if let Some(session_id) = identity.session.id {
            self.tokens
                .revoke_session(&session_id, RevokeReason::UserLogout, context)
                .await?;
        }
        Ok(())
    }

    pub async fn logout_all(&self, identity: &AuthenticatedUser, context: SecurityContext) -> AppResult<u64> {
        let user_id = self.user_id(identity)?;
        self.tokens
            .revoke_all_user_sessions(&user_id, RevokeReason::UserLogout, context)
            .await
    }

    /// 재설정 토큰 발급. 운영 환경이 아니면 토큰을 돌려줍니다.
    pub async fn forgot_password(&self, email: &str, context: SecurityContext) -> AppResult<Option<String>> {
        let email = normalize_email(email);

        let mut bytes = [0u8; RESET_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = general_purpose::URL_SAFE_NO_PAD.encode(bytes);

        match self.users.find_by_email(&email).await? {
            Some(user) => {
                if let Some(user_id) = user.id {
                    let ttl = self.settings.password_reset_secs().max(1) as u64;
                    self.reset_tokens.store(&digest_token(&token), &user_id, ttl).await?;
                    self.audit
                        .record_security_event(
                            SecurityEventKind::PasswordResetRequested,
                            context.with_user(user_id.to_hex()),
                        )
                        .await;
                }
            }
            None => log::debug!("존재하지 않는 이메일로 재설정 요청"),
        }

        if self.settings.environment.is_production() {
            Ok(None)
        } else {
            Ok(Some(token))
        }
    }

    /// 재설정 토큰으로 비밀번호 교체. 성공 시 모든 세션이 폐기됩니다.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        context: SecurityContext,
    ) -> AppResult<()> {
        // 토큰을 소비하기 전에 정책부터 확인
        self.policy
            .validate_complexity(new_password)
            .map_err(AppError::WeakPassword)?;

        let user_id = self
            .reset_tokens
            .consume(&digest_token(token))
            .await?
            .ok_or(AppError::InvalidResetToken)?;

        let hash = self.policy.hash(new_password).await?;
        let now = DateTime::now();
        if !self
            .users
            .update_password(&user_id, &hash, password_changed_stamp(now))
            .await?
        {
            return Err(AppError::InvalidResetToken);
        }
        self.tokens
            .revoke_all_user_sessions(
                &user_id,
                RevokeReason::SecurityBreach,
                context.clone().with_user(user_id.to_hex()),
            )
            .await?;

        self.audit
            .record_security_event(
                SecurityEventKind::PasswordChanged,
                context.with_user(user_id.to_hex()).with_details(json!({ "via": "reset" })),
            )
            .await;
        Ok(())
    }

    /// 현재 비밀번호 확인 후 교체. 성공 시 모든 세션이 폐기됩니다.
    pub async fn change_password(
        &self,
        identity: &AuthenticatedUser,
        request: ChangePasswordRequest,
        context: SecurityContext,
    ) -> AppResult<()> {
        request.validate()?;
        let user_id = self.user_id(identity)?;

        let user = self
            .users
            .find_by_id_with_secret(&user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))?;
        let matches = match user.password_hash.as_deref() {
            Some(hash) => self.policy.compare(&request.current_password, hash).await?,
            None => false,
        };
        if !matches {
            return Err(AppError::InvalidCurrentPassword);
        }

        let hash = self.policy.hash(&request.new_password).await?;
        self.users
            .update_password(&user_id, &hash, password_changed_stamp(DateTime::now()))
            .await?;
        self.tokens
            .revoke_all_user_sessions(
                &user_id,
                RevokeReason::SecurityBreach,
                context.clone().with_user(user_id.to_hex()),
            )
            .await?;

        self.audit
            .record_security_event(
                SecurityEventKind::PasswordChanged,
                context.with_user(user_id.to_hex()).with_details(json!({ "via": "change" })),
            )
            .await;
        Ok(())
    }

    pub async fn me(&self, identity: &AuthenticatedUser) -> AppResult<User> {
        let user_id = self.user_id(identity)?;
        self.users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))
    }

    /// 허용된 프로필 필드만 수정. 나머지 키는 버려집니다.
    pub async fn update_profile(
        &self,
        identity: &AuthenticatedUser,
        request: ProfileUpdateRequest,
    ) -> AppResult<User> {
        let user_id = self.user_id(identity)?;
        if !request.stripped.is_empty() {
            log::warn!(
                "⚠️ 프로필 수정에서 허용되지 않은 필드 제거 - user: {}, fields: {:?}",
                user_id,
                request.stripped
            );
        }
        if request.update.is_empty() {
            return self.me(identity).await;
        }

        self.users
            .update_profile(&user_id, &request.update)
            .await?
            .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))
    }

    fn user_id(&self, identity: &AuthenticatedUser) -> AppResult<mongodb::bson::oid::ObjectId> {
        identity
            .user
            .id
            .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))
    }
}
