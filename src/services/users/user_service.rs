//! # 사용자 관리 서비스
//!
//! 관리자용 계정 관리 로직입니다.
//!
//! ```text
//!            approve
//! Pending ───────────► Active ◄──────► Paused
//!    │                   │               │
//!    └───────────────────┴───────────────┴──► Deleted (종료)
//! ```
//!
//! Active 상태를 벗어나는 전이는 해당 사용자의 모든 세션을
//! `AccountDeactivated` 사유로 폐기합니다.

use std::sync::Arc;
use mongodb::bson::oid::ObjectId;
use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::sessions::RevokeReason;
use crate::domain::entities::users::{AccountStatus, User};
use crate::repositories::users::UserStore;
use crate::services::audit::SecurityContext;
use crate::services::auth::TokenService;

fn user_not_found() -> AppError {
    AppError::NotFound("사용자를 찾을 수 없습니다".to_string())
}

pub struct UserService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    pub async fn find(&self, user_id: &str) -> AppResult<User> {
        let id = ObjectId::parse_str(user_id)?;
        self.users.find_by_id(&id).await?.ok_or_else(user_not_found)
    }

    /// 승인 대기 계정을 활성화합니다.
    pub async fn approve(&self, user_id: &str, context: SecurityContext) -> AppResult<User> {
        let user = self.find(user_id).await?;
        if user.account_status != AccountStatus::Pending {
            return Err(AppError::ValidationError(format!(
                "승인 대기 상태가 아닙니다 (현재: {})",
                user.account_status.as_str()
            )));
        }

        let updated = self.change_status(user_id, AccountStatus::Active, context).await?;
        log::info!("✅ 계정 승인 - user: {}", user_id);
        Ok(updated)
    }

    /// 상태 전이를 검증하고 적용합니다.
    pub async fn change_status(
        &self,
        user_id: &str,
        status: AccountStatus,
        context: SecurityContext,
    ) -> AppResult<User> {
        let user = self.find(user_id).await?;
        let change = user.transition_to(status)?;
        let id = user.id.ok_or_else(user_not_found)?;

        let updated = self
            .users
            .update_status(&id, change)
            .await?
            .ok_or_else(user_not_found)?;

        if user.account_status == AccountStatus::Active && status != AccountStatus::Active {
            self.tokens
                .revoke_all_user_sessions(&id, RevokeReason::AccountDeactivated, context)
                .await?;
        }

        log::info!(
            "계정 상태 변경 - user: {}, {} → {}",
            user_id,
            user.account_status.as_str(),
            status.as_str()
        );
        Ok(updated)
    }

    /// 관리자에 의한 세션 일괄 폐기
    pub async fn revoke_all_sessions(&self, user_id: &str, context: SecurityContext) -> AppResult<u64> {
        let id = ObjectId::parse_str(user_id)?;
        self.find(user_id).await?;
        self.tokens
            .revoke_all_user_sessions(&id, RevokeReason::AdminRevoked, context)
            .await
    }

    pub async fn list_by_institute(&self, institute_id: &str) -> AppResult<Vec<User>> {
        let id = ObjectId::parse_str(institute_id)?;
        self.users.list_by_institute(&id).await
    }
}
