//! 테스트용 메모리 저장소
//!
//! MongoDB/Redis 구현과 같은 의미론을 `Mutex<Vec<_>>` 위에 구현합니다.
//! 서비스와 HTTP 테스트는 외부 서비스 없이 이 구현으로 실행됩니다.

use std::collections::HashMap;
use std::sync::Mutex;
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime};
use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::access_control::{AccessControlEntry, EntryType};
use crate::domain::entities::audit::AuditEntry;
use crate::domain::entities::sessions::{IssuanceState, RevokeReason, Session};
use crate::domain::entities::users::{CredentialField, LockoutUpdate, ProfileUpdate, StatusChange, User};
use crate::repositories::access_control::AccessControlStore;
use crate::repositories::audit::AuditSink;
use crate::repositories::sessions::SessionStore;
use crate::repositories::tokens::ResetTokenStore;
use crate::repositories::users::UserStore;

fn without_secret(mut user: User) -> User {
    user.password_hash = None;
    user
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    fn update<F>(&self, id: &ObjectId, f: F) -> Option<User>
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| u.id.as_ref() == Some(id))?;
        f(user);
        Some(user.clone())
    }

    /// 비밀번호 해시를 포함한 원본 (테스트 검증용)
    pub fn raw(&self, id: &ObjectId) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id.as_ref() == Some(id)).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, mut user: User) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        for existing in users.iter() {
            if existing.email == user.email {
                return Err(AppError::DuplicateCredential(CredentialField::Email));
            }
            if existing.username == user.username {
                return Err(AppError::DuplicateCredential(CredentialField::Username));
            }
            if user.cnic.is_some() && existing.cnic == user.cnic {
                return Err(AppError::DuplicateCredential(CredentialField::Cnic));
            }
        }
        user.id = Some(ObjectId::new());
        users.push(user.clone());
        Ok(user)
    }

    async fn find_conflict(
        &self,
        email: &str,
        username: &str,
        cnic: Option<&str>,
    ) -> AppResult<Option<CredentialField>> {
        let users = self.users.lock().unwrap();
        let existing = users.iter().find(|u| {
            u.email == email || u.username == username || (cnic.is_some() && u.cnic.as_deref() == cnic)
        });

        Ok(existing.map(|user| {
            if user.email == email {
                CredentialField::Email
            } else if user.username == username {
                CredentialField::Username
            } else {
                CredentialField::Cnic
            }
        }))
    }

    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<User>> {
        Ok(self.raw(id).map(without_secret))
    }

    async fn find_by_id_with_secret(&self, id: &ObjectId) -> AppResult<Option<User>> {
        Ok(self.raw(id))
    }

    async fn find_by_login_with_secret(&self, login: &str) -> AppResult<Option<User>> {
        let email = login.to_lowercase();
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email || u.username == login).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned().map(without_secret))
    }

    async fn apply_failed_login(&self, id: &ObjectId, update: LockoutUpdate) -> AppResult<Option<User>> {
        Ok(self.update(id, |user| user.apply_lockout_update(update)).map(without_secret))
    }

    async fn lock_account(&self, id: &ObjectId, until: DateTime, now: DateTime) -> AppResult<bool> {
        let mut locked = false;
        self.update(id, |user| {
            if !user.is_locked_at(now) {
                user.lock_until = Some(until);
                locked = true;
            }
        });
        Ok(locked)
    }

    async fn reset_login_attempts(&self, id: &ObjectId, now: DateTime) -> AppResult<()> {
        self.update(id, |user| {
            user.login_attempts = 0;
            user.lock_until = None;
            user.last_login_at = Some(now);
        });
        Ok(())
    }

    async fn update_password(
        &self,
        id: &ObjectId,
        password_hash: &str,
        changed_at: DateTime,
    ) -> AppResult<bool> {
        let updated = self.update(id, |user| {
            user.password_hash = Some(password_hash.to_string());
            user.password_changed_at = Some(changed_at);
            user.login_attempts = 0;
            user.lock_until = None;
        });
        Ok(updated.is_some())
    }

    async fn update_profile(&self, id: &ObjectId, update: &ProfileUpdate) -> AppResult<Option<User>> {
        let updated = self.update(id, |user| {
            if let Some(full_name) = &update.full_name {
                user.full_name = full_name.clone();
            }
            if let Some(gender) = &update.gender {
                user.gender = Some(gender.clone());
            }
            if let Some(date_of_birth) = &update.date_of_birth {
                user.date_of_birth = Some(date_of_birth.clone());
            }
            if let Some(phone_numbers) = &update.phone_numbers {
                user.phone_numbers = phone_numbers.clone();
            }
            if let Some(family_info) = &update.family_info {
                user.family_info = Some(family_info.clone());
            }
            if let Some(academic_history) = &update.academic_history {
                user.academic_history = Some(academic_history.clone());
            }
            user.updated_at = DateTime::now();
        });
        Ok(updated.map(without_secret))
    }

    async fn update_status(&self, id: &ObjectId, change: StatusChange) -> AppResult<Option<User>> {
        let updated = self.update(id, |user| {
            user.account_status = change.status;
            user.is_active = change.is_active;
            user.is_approved = change.is_approved;
            user.updated_at = DateTime::now();
        });
        Ok(updated.map(without_secret))
    }

    async fn list_by_institute(&self, institute: &ObjectId) -> AppResult<Vec<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .filter(|u| u.institute.as_ref() == Some(institute))
            .cloned()
            .map(without_secret)
            .collect())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<Vec<Session>>,
}

impl MemorySessionStore {
    fn update<F, R>(&self, id: &ObjectId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.iter_mut().find(|s| s.id.as_ref() == Some(id)).map(f)
    }

    pub fn all(&self) -> Vec<Session> {
        self.sessions.lock().unwrap().clone()
    }

    /// 테스트에서 만료 등 상태를 직접 조작할 때 사용
    pub fn modify<F>(&self, id: &ObjectId, f: F)
    where
        F: FnOnce(&mut Session),
    {
        self.update(id, f);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, mut session: Session) -> AppResult<Session> {
        session.id = Some(ObjectId::new());
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<Session>> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions.iter().find(|s| s.id.as_ref() == Some(id)).cloned())
    }

    async fn find_by_id_and_refresh_digest(
        &self,
        id: &ObjectId,
        digest: &str,
    ) -> AppResult<Option<Session>> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions
            .iter()
            .find(|s| s.id.as_ref() == Some(id) && s.refresh_token == digest)
            .cloned())
    }

    async fn mark_issued(&self, id: &ObjectId, digest: &str) -> AppResult<bool> {
        let marked = self.update(id, |session| {
            if session.issuance != IssuanceState::Provisional {
                return false;
            }
            session.refresh_token = digest.to_string();
            session.issuance = IssuanceState::Issued;
            true
        });
        Ok(marked.unwrap_or(false))
    }

    async fn touch(&self, id: &ObjectId, now: DateTime) -> AppResult<()> {
        self.update(id, |session| session.last_activity = now);
        Ok(())
    }

    async fn revoke(&self, id: &ObjectId, reason: RevokeReason, now: DateTime) -> AppResult<bool> {
        Ok(self.update(id, |session| session.revoke_at(reason, now)).unwrap_or(false))
    }

    async fn extend(&self, id: &ObjectId, expires_at: DateTime) -> AppResult<bool> {
        let extended = self.update(id, |session| {
            if session.is_revoked {
                return false;
            }
            session.expires_at = expires_at;
            true
        });
        Ok(extended.unwrap_or(false))
    }

    async fn bump_token_version(&self, id: &ObjectId) -> AppResult<Option<i64>> {
        let bumped = self.update(id, |session| {
            if !session.is_active || session.is_revoked {
                return None;
            }
            session.access_token_version += 1;
            Some(session.access_token_version)
        });
        Ok(bumped.flatten())
    }

    async fn rotate_refresh_token(&self, id: &ObjectId, digest: &str) -> AppResult<bool> {
        let rotated = self.update(id, |session| {
            session.refresh_token = digest.to_string();
            session.last_activity = DateTime::now();
        });
        Ok(rotated.is_some())
    }

    async fn find_active_by_user(&self, user: &ObjectId, now: DateTime) -> AppResult<Vec<Session>> {
        let sessions = self.sessions.lock().unwrap();
        let mut active: Vec<Session> = sessions
            .iter()
            .filter(|s| &s.user == user && s.is_live_at(now))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(active)
    }

    async fn revoke_all_for_user(
        &self,
        user: &ObjectId,
        reason: RevokeReason,
        now: DateTime,
    ) -> AppResult<u64> {
        let mut sessions = self.sessions.lock().unwrap();
        let revoked = sessions
            .iter_mut()
            .filter(|s| &s.user == user)
            .map(|s| s.revoke_at(reason, now))
            .filter(|&changed| changed)
            .count();
        Ok(revoked as u64)
    }

    async fn delete_expired(&self, now: DateTime, revoked_before: DateTime) -> AppResult<u64> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| {
            let expired = s.expires_at < now;
            let stale_revoked = s.is_revoked && matches!(s.revoked_at, Some(at) if at < revoked_before);
            !(expired || stale_revoked)
        });
        Ok((before - sessions.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryAccessControlStore {
    entries: Mutex<Vec<AccessControlEntry>>,
}

impl MemoryAccessControlStore {
    pub fn put(&self, mut entry: AccessControlEntry) -> ObjectId {
        let id = ObjectId::new();
        entry.id = Some(id);
        self.entries.lock().unwrap().push(entry);
        id
    }

    fn find(&self, entry_type: EntryType, ids: &[ObjectId]) -> Vec<AccessControlEntry> {
        let entries = self.entries.lock().unwrap();
        entries
            .iter()
            .filter(|e| e.entry_type == entry_type && e.id.map(|id| ids.contains(&id)).unwrap_or(false))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AccessControlStore for MemoryAccessControlStore {
    async fn find_roles_by_ids(&self, ids: &[ObjectId]) -> AppResult<Vec<AccessControlEntry>> {
        Ok(self.find(EntryType::Role, ids))
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<AccessControlEntry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .find(|e| e.entry_type == EntryType::Role && e.name == name)
            .cloned())
    }

    async fn find_permissions_by_ids(&self, ids: &[ObjectId]) -> AppResult<Vec<AccessControlEntry>> {
        Ok(self.find(EntryType::Permission, ids))
    }
}

#[derive(Default)]
pub struct MemoryResetTokenStore {
    tokens: Mutex<HashMap<String, (ObjectId, DateTime)>>,
}

impl MemoryResetTokenStore {
    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl ResetTokenStore for MemoryResetTokenStore {
    async fn store(&self, digest: &str, user_id: &ObjectId, ttl_secs: u64) -> AppResult<()> {
        let expires_at = crate::utils::time_utils::now_plus_secs(ttl_secs as i64);
        self.tokens
            .lock()
            .unwrap()
            .insert(digest.to_string(), (*user_id, expires_at));
        Ok(())
    }

    async fn consume(&self, digest: &str) -> AppResult<Option<ObjectId>> {
        let entry = self.tokens.lock().unwrap().remove(digest);
        Ok(entry
            .filter(|(_, expires_at)| *expires_at > DateTime::now())
            .map(|(user_id, _)| user_id))
    }
}

#[derive(Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn write(&self, entry: AuditEntry) -> AppResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}
