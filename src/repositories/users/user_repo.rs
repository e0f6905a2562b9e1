//! # 사용자 리포지토리 구현
//!
//! `users` 컬렉션에 대한 MongoDB 구현입니다.
//!
//! ## 특징
//!
//! - **비밀번호 보호**: 기본 조회는 projection 으로 `password_hash` 를 제외하고,
//!   `*_with_secret` 조회만 해시를 읽습니다.
//! - **원자적 카운터**: 로그인 실패 횟수는 `$inc` 로 갱신합니다.
//! - **데이터 무결성**: email, username, cnic 유니크 인덱스
//!
//! 세션과 권한 상태는 매 요청마다 저장소에서 다시 읽어야 하므로
//! 사용자 문서도 캐시하지 않습니다.

use std::sync::Arc;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, DateTime, Document},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};
use crate::{
    core::errors::{AppError, AppResult, ErrorContext},
    core::registry::Repository,
    db::Database,
    domain::entities::users::{CredentialField, LockoutUpdate, ProfileUpdate, StatusChange, User},
    repositories::users::user_store::UserStore,
};

const COLLECTION: &str = "users";

/// 기본 조회에서 제외되는 필드
fn without_secret() -> Document {
    doc! { "password_hash": 0 }
}

/// 사용자 데이터 액세스 리포지토리
///
/// ## 인덱스
///
/// | 이름 | 키 | 옵션 |
/// |------|----|------|
/// | `email_unique` | email | unique |
/// | `username_unique` | username | unique |
/// | `cnic_unique` | cnic | unique, sparse |
/// | `institute_idx` | institute | |
/// | `created_at_desc` | created_at | |
pub struct MongoUserStore {
    db: Arc<Database>,
}

impl MongoUserStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<User> {
        self.db.get_database().collection::<User>(COLLECTION)
    }

    /// 사용자 컬렉션의 인덱스를 생성합니다.
    ///
    /// 이미 중복 데이터가 있으면 유니크 인덱스 생성이 실패합니다.
    pub async fn create_indexes(&self) -> AppResult<()> {
        let unique = |name: &str| {
            IndexOptions::builder()
                .unique(true)
                .name(name.to_string())
                .build()
        };

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(unique("email_unique"))
            .build();

        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(unique("username_unique"))
            .build();

        let cnic_index = IndexModel::builder()
            .keys(doc! { "cnic": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .sparse(true)
                .name("cnic_unique".to_string())
                .build())
            .build();

        let institute_index = IndexModel::builder()
            .keys(doc! { "institute": 1 })
            .options(IndexOptions::builder()
                .name("institute_idx".to_string())
                .build())
            .build();

        let created_at_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(IndexOptions::builder()
                .name("created_at_desc".to_string())
                .build())
            .build();

        self.collection()
            .create_indexes([email_index, username_index, cnic_index, institute_index, created_at_index])
            .await?;

        Ok(())
    }
}

/// 유니크 인덱스 위반 메시지에서 충돌 필드를 추정합니다.
fn credential_from_index(message: &str) -> Option<CredentialField> {
    if message.contains("email_unique") {
        Some(CredentialField::Email)
    } else if message.contains("username_unique") {
        Some(CredentialField::Username)
    } else if message.contains("cnic_unique") {
        Some(CredentialField::Cnic)
    } else {
        None
    }
}

#[async_trait]
impl Repository for MongoUserStore {
    fn name(&self) -> &str {
        "user"
    }

    fn collection_name(&self) -> &str {
        COLLECTION
    }

    async fn init(&self) -> AppResult<()> {
        self.create_indexes().await
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn insert(&self, mut user: User) -> AppResult<User> {
        let result = match self.collection().insert_one(&user).await {
            Ok(result) => result,
            Err(e) => {
                return Err(match AppError::from(e) {
                    AppError::DuplicateField(message) => match credential_from_index(&message) {
                        Some(field) => AppError::DuplicateCredential(field),
                        None => AppError::DuplicateField(message),
                    },
                    other => other,
                });
            }
        };

        user.id = result.inserted_id.as_object_id();
        Ok(user)
    }

    async fn find_conflict(
        &self,
        email: &str,
        username: &str,
        cnic: Option<&str>,
    ) -> AppResult<Option<CredentialField>> {
        let mut conditions = vec![doc! { "email": email }, doc! { "username": username }];
        if let Some(cnic) = cnic {
            conditions.push(doc! { "cnic": cnic });
        }

        let existing = self.collection()
            .find_one(doc! { "$or": conditions })
            .projection(without_secret())
            .await?;

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
        let user = self.collection()
            .find_one(doc! { "_id": *id })
            .projection(without_secret())
            .await?;
        Ok(user)
    }

    async fn find_by_id_with_secret(&self, id: &ObjectId) -> AppResult<Option<User>> {
        Ok(self.collection().find_one(doc! { "_id": *id }).await?)
    }

    async fn find_by_login_with_secret(&self, login: &str) -> AppResult<Option<User>> {
        let user = self.collection()
            .find_one(doc! {
                "$or": [
                    { "email": login.to_lowercase() },
                    { "username": login },
                ]
            })
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = self.collection()
            .find_one(doc! { "email": email })
            .projection(without_secret())
            .await?;
        Ok(user)
    }

    async fn apply_failed_login(&self, id: &ObjectId, update: LockoutUpdate) -> AppResult<Option<User>> {
        let now = DateTime::now();
        let change = match update {
            LockoutUpdate::Restart => doc! {
                "$set": { "login_attempts": 1, "updated_at": now },
                "$unset": { "lock_until": "" },
            },
            LockoutUpdate::Increment => doc! {
                "$inc": { "login_attempts": 1 },
                "$set": { "updated_at": now },
            },
        };

        let user = self.collection()
            .find_one_and_update(doc! { "_id": *id }, change)
            .projection(without_secret())
            .return_document(ReturnDocument::After)
            .await?;
        Ok(user)
    }

    async fn lock_account(&self, id: &ObjectId, until: DateTime, now: DateTime) -> AppResult<bool> {
        let result = self.collection()
            .update_one(
                doc! {
                    "_id": *id,
                    "$or": [
                        { "lock_until": null },
                        { "lock_until": { "$lte": now } },
                    ],
                },
                doc! { "$set": { "lock_until": until, "updated_at": now } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn reset_login_attempts(&self, id: &ObjectId, now: DateTime) -> AppResult<()> {
        self.collection()
            .update_one(
                doc! { "_id": *id },
                doc! {
                    "$set": { "login_attempts": 0, "last_login_at": now, "updated_at": now },
                    "$unset": { "lock_until": "" },
                },
            )
            .await?;
        Ok(())
    }

    async fn update_password(
        &self,
        id: &ObjectId,
        password_hash: &str,
        changed_at: DateTime,
    ) -> AppResult<bool> {
        let result = self.collection()
            .update_one(
                doc! { "_id": *id },
                doc! {
                    "$set": {
                        "password_hash": password_hash,
                        "password_changed_at": changed_at,
                        "login_attempts": 0,
                        "updated_at": DateTime::now(),
                    },
                    "$unset": { "lock_until": "" },
                },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn update_profile(&self, id: &ObjectId, update: &ProfileUpdate) -> AppResult<Option<User>> {
        let mut set = doc! { "updated_at": DateTime::now() };

        if let Some(full_name) = &update.full_name {
            set.insert("full_name", full_name.as_str());
        }
        if let Some(gender) = &update.gender {
            set.insert("gender", gender.as_str());
        }
        if let Some(date_of_birth) = &update.date_of_birth {
            set.insert("date_of_birth", date_of_birth.as_str());
        }
        if let Some(phone_numbers) = &update.phone_numbers {
            set.insert("phone_numbers", phone_numbers.clone());
        }
        if let Some(family_info) = &update.family_info {
            set.insert("family_info", bson::to_bson(family_info).context("familyInfo 변환 실패")?);
        }
        if let Some(academic_history) = &update.academic_history {
            set.insert(
                "academic_history",
                bson::to_bson(academic_history).context("academicHistory 변환 실패")?,
            );
        }

        let user = self.collection()
            .find_one_and_update(doc! { "_id": *id }, doc! { "$set": set })
            .projection(without_secret())
            .return_document(ReturnDocument::After)
            .await?;
        Ok(user)
    }

    async fn update_status(&self, id: &ObjectId, change: StatusChange) -> AppResult<Option<User>> {
        let user = self.collection()
            .find_one_and_update(
                doc! { "_id": *id },
                doc! {
                    "$set": {
                        "account_status": change.status.as_str(),
                        "is_active": change.is_active,
                        "is_approved": change.is_approved,
                        "updated_at": DateTime::now(),
                    }
                },
            )
            .projection(without_secret())
            .return_document(ReturnDocument::After)
            .await?;
        Ok(user)
    }

    async fn list_by_institute(&self, institute: &ObjectId) -> AppResult<Vec<User>> {
        let users = self.collection()
            .find(doc! { "institute": *institute, "account_status": { "$ne": "Deleted" } })
            .projection(without_secret())
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_index_names_map_to_fields() {
        let message = "E11000 duplicate key error collection: college.users index: username_unique dup key";
        assert_eq!(credential_from_index(message), Some(CredentialField::Username));
        assert_eq!(credential_from_index("index: email_unique"), Some(CredentialField::Email));
        assert_eq!(credential_from_index("index: other_idx"), None);
    }
}
