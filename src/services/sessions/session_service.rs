//! # 세션 서비스
//!
//! 리프레시 토큰 세션의 생명주기를 관리합니다.
//!
//! ```text
//!   create ──► Provisional ──mark_issued──► Issued ──revoke──► Revoked
//!                                             │
//!                                             ├─ touch / extend
//!                                             └─ bump_version + rotate (refresh)
//! ```
//!
//! 만료되었거나 24시간 이전에 폐기된 세션은 [`SessionService::cleanup_expired`] 가
//! 정리하며, `main` 에서 한 시간마다 실행됩니다.

use std::sync::Arc;
use std::time::Duration;
use mongodb::bson::{oid::ObjectId, DateTime};
use crate::config::AuthSettings;
use crate::core::errors::AppResult;
use crate::domain::entities::sessions::{DeviceInfo, RevokeReason, Session};
use crate::repositories::sessions::SessionStore;
use crate::utils::time_utils::{before, now_plus_secs};

/// 폐기된 세션을 보관하는 기간
const REVOKED_RETENTION_SECS: i64 = 24 * 60 * 60;

/// 정리 작업 주기
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub struct SessionService {
    store: Arc<dyn SessionStore>,
    settings: Arc<AuthSettings>,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, settings: Arc<AuthSettings>) -> Self {
        Self { store, settings }
    }

    /// Provisional 세션 생성. 만료 시각은 리프레시 토큰 수명과 같습니다.
    pub async fn create(
        &self,
        user: ObjectId,
        device: DeviceInfo,
        ip_address: Option<String>,
        login_method: &str,
    ) -> AppResult<Session> {
        let session = Session::new_provisional(
            user,
            device,
            ip_address,
            login_method,
            self.settings.refresh_ttl_secs,
        );
        let session = self.store.insert(session).await?;
        log::debug!(
            "세션 생성 (Provisional) - user: {}, session: {:?}",
            user,
            session.id_string()
        );
        Ok(session)
    }

    pub async fn find(&self, id: &ObjectId) -> AppResult<Option<Session>> {
        self.store.find_by_id(id).await
    }

    pub async fn find_by_refresh_digest(
        &self,
        id: &ObjectId,
        digest: &str,
    ) -> AppResult<Option<Session>> {
        self.store.find_by_id_and_refresh_digest(id, digest).await
    }

    /// Provisional → Issued
    pub async fn mark_issued(&self, id: &ObjectId, digest: &str) -> AppResult<bool> {
        self.store.mark_issued(id, digest).await
    }

    pub async fn bump_version(&self, id: &ObjectId) -> AppResult<Option<i64>> {
        self.store.bump_token_version(id).await
    }

    pub async fn rotate_refresh(&self, id: &ObjectId, digest: &str) -> AppResult<bool> {
        self.store.rotate_refresh_token(id, digest).await
    }

    pub async fn update_activity(&self, id: &ObjectId) -> AppResult<()> {
        self.store.touch(id, DateTime::now()).await
    }

    /// 이미 폐기된 세션이면 `false` 를 돌려주고 아무것도 바꾸지 않습니다.
    pub async fn revoke(&self, id: &ObjectId, reason: RevokeReason) -> AppResult<bool> {
        let revoked = self.store.revoke(id, reason, DateTime::now()).await?;
        if revoked {
            log::info!("🔒 세션 폐기 - session: {}, reason: {:?}", id, reason);
        }
        Ok(revoked)
    }

    /// 만료 시각을 지금부터 `secs` 초 뒤로 연장
    pub async fn extend(&self, id: &ObjectId, secs: i64) -> AppResult<bool> {
        self.store.extend(id, now_plus_secs(secs)).await
    }

    /// 살아 있는 세션 (최근 활동 순)
    pub async fn get_active_sessions(&self, user: &ObjectId) -> AppResult<Vec<Session>> {
        self.store.find_active_by_user(user, DateTime::now()).await
    }

    pub async fn revoke_all_for_user(&self, user: &ObjectId, reason: RevokeReason) -> AppResult<u64> {
        let count = self.store.revoke_all_for_user(user, reason, DateTime::now()).await?;
        if count > 0 {
            log::info!("🔒 사용자 세션 일괄 폐기 - user: {}, count: {}, reason: {:?}", user, count, reason);
        }
        Ok(count)
    }

    pub async fn cleanup_expired(&self) -> AppResult<u64> {
        let now = DateTime::now();
        let deleted = self
            .store
            .delete_expired(now, before(now, REVOKED_RETENTION_SECS))
            .await?;
        if deleted > 0 {
            log::info!("🧹 만료 세션 정리 완료: {}개", deleted);
        }
        Ok(deleted)
    }

    /// 주기적으로 만료 세션을 정리하는 백그라운드 작업
    pub fn spawn_cleanup(self: Arc<Self>) {
        actix_web::rt::spawn(async move {
            let mut interval = actix_web::rt::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                if let Err(e) = self.cleanup_expired().await {
                    log::error!("세션 정리 실패: {}", e);
                }
            }
        });
    }
}
