//! 자격 증명 저장소 인터페이스
//!
//! 서비스 계층은 이 trait 만 알고, MongoDB 구현([`MongoUserStore`](super::user_repo::MongoUserStore))과
//! 테스트용 메모리 구현이 이를 구현합니다.

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime};
use crate::core::errors::AppResult;
use crate::domain::entities::users::{CredentialField, LockoutUpdate, ProfileUpdate, StatusChange, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// 새 사용자 저장. 고유 인덱스 위반은 `DuplicateCredential` 로 보고됩니다.
    async fn insert(&self, user: User) -> AppResult<User>;

    /// email, username, cnic 중 이미 사용 중인 필드를 하나의 OR 조회로 찾습니다.
    ///
    /// 여러 필드가 겹치면 email → username → cnic 순서로 보고합니다.
    async fn find_conflict(
        &self,
        email: &str,
        username: &str,
        cnic: Option<&str>,
    ) -> AppResult<Option<CredentialField>>;

    /// 비밀번호 해시를 제외한 조회
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<User>>;

    /// 비밀번호 해시를 포함한 조회
    async fn find_by_id_with_secret(&self, id: &ObjectId) -> AppResult<Option<User>>;

    /// 이메일 또는 사용자명으로 조회 (비밀번호 해시 포함)
    async fn find_by_login_with_secret(&self, login: &str) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// 로그인 실패 카운터를 원자적으로 갱신하고 갱신된 문서를 돌려줍니다.
    async fn apply_failed_login(&self, id: &ObjectId, update: LockoutUpdate) -> AppResult<Option<User>>;

    /// 잠겨 있지 않은 계정에만 잠금을 겁니다. 잠금을 건 호출만 `true` 를 받습니다.
    async fn lock_account(&self, id: &ObjectId, until: DateTime, now: DateTime) -> AppResult<bool>;

    /// 카운터와 잠금을 지우고 `last_login_at` 을 기록합니다.
    async fn reset_login_attempts(&self, id: &ObjectId, now: DateTime) -> AppResult<()>;

    /// 비밀번호 교체. 잠금 상태도 함께 초기화됩니다.
    async fn update_password(
        &self,
        id: &ObjectId,
        password_hash: &str,
        changed_at: DateTime,
    ) -> AppResult<bool>;

    async fn update_profile(&self, id: &ObjectId, update: &ProfileUpdate) -> AppResult<Option<User>>;

    async fn update_status(&self, id: &ObjectId, change: StatusChange) -> AppResult<Option<User>>;

    async fn list_by_institute(&self, institute: &ObjectId) -> AppResult<Vec<User>>;
}
