//! 세션 저장소 인터페이스
//!
//! 세션 행은 동시 갱신의 직렬화 지점입니다. 버전 증가는 반드시
//! 저장소 수준의 원자 연산으로 구현되어야 합니다.

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime};
use crate::core::errors::AppResult;
use crate::domain::entities::sessions::{RevokeReason, Session};

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: Session) -> AppResult<Session>;

    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<Session>>;

    /// ID 와 저장된 리프레시 토큰 다이제스트가 모두 일치하는 세션
    async fn find_by_id_and_refresh_digest(
        &self,
        id: &ObjectId,
        digest: &str,
    ) -> AppResult<Option<Session>>;

    /// Provisional 세션에 실제 다이제스트를 기록하고 Issued 로 전이합니다.
    ///
    /// 이미 Issued 인 세션이면 `false`.
    async fn mark_issued(&self, id: &ObjectId, digest: &str) -> AppResult<bool>;

    /// `last_activity` 갱신
    async fn touch(&self, id: &ObjectId, now: DateTime) -> AppResult<()>;

    /// 아직 폐기되지 않은 세션만 폐기합니다. 최초 `revoked_at` 은 유지됩니다.
    async fn revoke(&self, id: &ObjectId, reason: RevokeReason, now: DateTime) -> AppResult<bool>;

    async fn extend(&self, id: &ObjectId, expires_at: DateTime) -> AppResult<bool>;

    /// `access_token_version` 을 원자적으로 1 증가시키고 새 값을 돌려줍니다.
    ///
    /// 폐기되었거나 비활성인 세션이면 `None`.
    async fn bump_token_version(&self, id: &ObjectId) -> AppResult<Option<i64>>;

    /// 새 리프레시 토큰 다이제스트 기록 (마지막 쓰기가 이깁니다)
    async fn rotate_refresh_token(&self, id: &ObjectId, digest: &str) -> AppResult<bool>;

    /// 살아 있는 세션 목록 (`last_activity` 내림차순)
    async fn find_active_by_user(&self, user: &ObjectId, now: DateTime) -> AppResult<Vec<Session>>;

    async fn revoke_all_for_user(
        &self,
        user: &ObjectId,
        reason: RevokeReason,
        now: DateTime,
    ) -> AppResult<u64>;

    /// 만료되었거나 `revoked_before` 이전에 폐기된 세션 삭제
    async fn delete_expired(&self, now: DateTime, revoked_before: DateTime) -> AppResult<u64>;
}
