//! User Entity Implementation
//!
//! 자격 증명 저장소의 핵심 엔티티입니다.
//! 해시된 비밀번호, 계정 상태, 로그인 잠금 카운터를 함께 보관합니다.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use crate::core::AppError;
use crate::domain::entities::access_control::access_control::RoleRef;

/// 계정 상태
///
/// Pending → Active (관리자 승인), Active ⇄ Paused, 어느 상태에서든 → Deleted.
/// Deleted 는 종료 상태입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Paused,
    Deleted,
    Pending,
}

impl AccountStatus {
    pub fn can_transition_to(self, next: AccountStatus) -> bool {
        match (self, next) {
            (AccountStatus::Deleted, _) => false,
            (_, AccountStatus::Deleted) => true,
            (AccountStatus::Pending, AccountStatus::Active) => true,
            (AccountStatus::Active, AccountStatus::Paused) => true,
            (AccountStatus::Paused, AccountStatus::Active) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "Active",
            AccountStatus::Paused => "Paused",
            AccountStatus::Deleted => "Deleted",
            AccountStatus::Pending => "Pending",
        }
    }
}

/// 상태 전이 결과로 함께 기록되는 플래그 묶음
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: AccountStatus,
    pub is_active: bool,
    pub is_approved: bool,
}

/// 고유성이 보장되어야 하는 자격 증명 필드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialField {
    Email,
    Username,
    Cnic,
}

impl CredentialField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialField::Email => "email",
            CredentialField::Username => "username",
            CredentialField::Cnic => "cnic",
        }
    }
}

/// 로그인 실패 시 저장소에 적용할 변경
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutUpdate {
    /// 만료된 잠금을 해제하고 카운터를 1부터 다시 시작
    Restart,
    /// 카운터 증가
    Increment,
}

/// 프로필 채널로 변경 가능한 필드
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub phone_numbers: Option<Vec<String>>,
    pub family_info: Option<serde_json::Value>,
    pub academic_history: Option<serde_json::Value>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self == &ProfileUpdate::default()
    }
}

/// 사용자 엔티티
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 사용자 이메일 (unique)
    pub email: String,
    /// 사용자 이름 (unique)
    pub username: String,
    /// 해시된 비밀번호. 기본 조회에서는 projection 으로 제외됩니다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// 주민 식별 번호 (unique, sparse)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cnic: Option<String>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_info: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic_history: Option<serde_json::Value>,
    /// 비정규화된 단일 역할 이름
    pub role: String,
    /// 역할 엔티티 참조
    #[serde(default)]
    pub roles: Vec<RoleRef>,
    /// 소속 기관 (테넌트)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institute: Option<ObjectId>,
    pub account_status: AccountStatus,
    pub is_active: bool,
    pub is_approved: bool,
    #[serde(default)]
    pub login_attempts: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_until: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    /// 회원가입으로 생성되는 사용자 (승인 대기 상태)
    pub fn new_pending(
        email: String,
        username: String,
        full_name: String,
        password_hash: String,
        role: String,
    ) -> Self {
        let now = DateTime::now();

        Self {
            id: None,
            email,
            username,
            password_hash: Some(password_hash),
            full_name,
            gender: None,
            date_of_birth: None,
            cnic: None,
            phone_numbers: Vec::new(),
            family_info: None,
            academic_history: None,
            role,
            roles: Vec::new(),
            institute: None,
            account_status: AccountStatus::Pending,
            is_active: false,
            is_approved: false,
            login_attempts: 0,
            lock_until: None,
            password_changed_at: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// ID 문자열로 변환
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    /// `lock_until` 이 설정되어 있고 아직 지나지 않았는지
    pub fn is_locked_at(&self, now: DateTime) -> bool {
        matches!(self.lock_until, Some(until) if until > now)
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked_at(DateTime::now())
    }

    /// 로그인 허용 상태인지 확인
    pub fn can_sign_in(&self) -> bool {
        self.account_status == AccountStatus::Active && self.is_active
    }

    /// 로그인 실패 한 번에 대한 카운터 변경을 계산합니다.
    pub fn next_lockout_update(&self, now: DateTime) -> LockoutUpdate {
        match self.lock_until {
            Some(until) if until <= now => LockoutUpdate::Restart,
            _ => LockoutUpdate::Increment,
        }
    }

    /// 카운터 변경을 엔티티에 직접 반영
    pub fn apply_lockout_update(&mut self, update: LockoutUpdate) {
        match update {
            LockoutUpdate::Restart => {
                self.login_attempts = 1;
                self.lock_until = None;
            }
            LockoutUpdate::Increment => self.login_attempts += 1,
        }
    }

    /// 증가가 반영된 뒤의 상태로 잠금 시각을 결정합니다.
    ///
    /// 이미 잠겨 있으면 `None` 입니다.
    pub fn lockout_deadline(&self, now: DateTime, max_attempts: i32, lockout_millis: i64) -> Option<DateTime> {
        if self.login_attempts < max_attempts || self.is_locked_at(now) {
            return None;
        }
        Some(DateTime::from_millis(now.timestamp_millis().saturating_add(lockout_millis)))
    }

    /// 상태 전이를 검증하고 함께 바뀌는 플래그를 계산합니다.
    pub fn transition_to(&self, next: AccountStatus) -> Result<StatusChange, AppError> {
        if !self.account_status.can_transition_to(next) {
            return Err(AppError::ValidationError(format!(
                "계정 상태를 {}에서 {}(으)로 변경할 수 없습니다",
                self.account_status.as_str(),
                next.as_str()
            )));
        }

        Ok(StatusChange {
            status: next,
            is_active: next == AccountStatus::Active,
            is_approved: self.is_approved || next == AccountStatus::Active,
        })
    }

    /// `iat`(초) 시점에 발급된 토큰이 비밀번호 변경 이전 것인지
    pub fn password_changed_after(&self, issued_at_secs: i64) -> bool {
        match self.password_changed_at {
            Some(changed) => changed.timestamp_millis() > issued_at_secs * 1000,
            None => false,
        }
    }
}

/// 비밀번호 변경 시각. 같은 순간 발급된 토큰을 무효로 보기 위해 1초 앞당깁니다.
pub fn password_changed_stamp(now: DateTime) -> DateTime {
    DateTime::from_millis(now.timestamp_millis() - 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THIRTY_MINUTES: i64 = 30 * 60 * 1000;

    fn pending_user() -> User {
        User::new_pending(
            "a@x.com".to_string(),
            "alice".to_string(),
            "Alice".to_string(),
            "$2b$04$hash".to_string(),
            "student".to_string(),
        )
    }

    #[test]
    fn test_new_user_is_pending_and_unapproved() {
        let user = pending_user();

        assert_eq!(user.account_status, AccountStatus::Pending);
        assert!(!user.is_approved);
        assert!(!user.can_sign_in());
    }

    #[test]
    fn test_lockout_after_max_attempts() {
        let mut user = pending_user();
        let now = DateTime::now();

        for _ in 0..4 {
            let update = user.next_lockout_update(now);
            assert_eq!(update, LockoutUpdate::Increment);
            user.apply_lockout_update(update);
            assert!(user.lockout_deadline(now, 5, THIRTY_MINUTES).is_none());
        }

        user.apply_lockout_update(user.next_lockout_update(now));
        assert_eq!(user.login_attempts, 5);

        let until = user.lockout_deadline(now, 5, THIRTY_MINUTES).unwrap();
        assert_eq!(until.timestamp_millis(), now.timestamp_millis() + THIRTY_MINUTES);

        user.lock_until = Some(until);
        assert!(user.is_locked_at(now));
        user.login_attempts = 6;
        assert!(user.lockout_deadline(now, 5, THIRTY_MINUTES).is_none());
    }

    #[test]
    fn test_expired_lock_restarts_counter() {
        let mut user = pending_user();
        let now = DateTime::now();
        user.login_attempts = 5;
        user.lock_until = Some(DateTime::from_millis(now.timestamp_millis() - 1));

        let update = user.next_lockout_update(now);
        assert_eq!(update, LockoutUpdate::Restart);

        user.apply_lockout_update(update);
        assert_eq!(user.login_attempts, 1);
        assert!(user.lock_until.is_none());
    }

    #[test]
    fn test_status_transitions() {
        let mut user = pending_user();

        let change = user.transition_to(AccountStatus::Active).unwrap();
        assert!(change.is_active && change.is_approved);
        assert!(user.transition_to(AccountStatus::Paused).is_err());

        user.account_status = AccountStatus::Active;
        user.is_approved = true;
        let change = user.transition_to(AccountStatus::Paused).unwrap();
        assert!(!change.is_active);
        assert!(change.is_approved);

        user.account_status = AccountStatus::Deleted;
        assert!(user.transition_to(AccountStatus::Active).is_err());
        assert!(user.transition_to(AccountStatus::Deleted).is_err());
    }

    #[test]
    fn test_password_changed_after_uses_skew_buffer() {
        let mut user = pending_user();
        let now = DateTime::now();
        user.password_changed_at = Some(password_changed_stamp(now));

        let issued_before = now.timestamp_millis() / 1000 - 5;
        let issued_later = now.timestamp_millis() / 1000 + 1;

        assert!(user.password_changed_after(issued_before));
        assert!(!user.password_changed_after(issued_later));
    }
}
