//! # 세션 리포지토리 구현
//!
//! `sessions` 컬렉션에 대한 MongoDB 구현입니다.
//! `expires_at` 에는 TTL 인덱스가 걸려 있어 만료된 문서는 MongoDB 가 스스로 지우고,
//! 폐기 후 보존 기간이 지난 문서는 주기 정리 작업이 지웁니다.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, to_bson, DateTime},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};
use crate::{
    core::errors::{AppResult, ErrorContext},
    core::registry::Repository,
    db::Database,
    domain::entities::sessions::{IssuanceState, RevokeReason, Session},
    repositories::sessions::session_store::SessionStore,
};

const COLLECTION: &str = "sessions";

pub struct MongoSessionStore {
    db: Arc<Database>,
}

impl MongoSessionStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Session> {
        self.db.get_database().collection::<Session>(COLLECTION)
    }

    pub async fn create_indexes(&self) -> AppResult<()> {
        let refresh_index = IndexModel::builder()
            .keys(doc! { "refresh_token": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .sparse(true)
                .name("refresh_token_unique".to_string())
                .build())
            .build();

        let user_index = IndexModel::builder()
            .keys(doc! { "user": 1, "is_active": 1 })
            .options(IndexOptions::builder()
                .name("user_active_idx".to_string())
                .build())
            .build();

        // 만료 시각이 지나면 즉시 삭제
        let ttl_index = IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .options(IndexOptions::builder()
                .expire_after(Duration::from_secs(0))
                .name("expires_at_ttl".to_string())
                .build())
            .build();

        self.collection()
            .create_indexes([refresh_index, user_index, ttl_index])
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Repository for MongoSessionStore {
    fn name(&self) -> &str {
        "session"
    }

    fn collection_name(&self) -> &str {
        COLLECTION
    }

    async fn init(&self) -> AppResult<()> {
        self.create_indexes().await
    }
}

#[async_trait]
impl SessionStore for MongoSessionStore {
    async fn insert(&self, mut session: Session) -> AppResult<Session> {
        let result = self.collection().insert_one(&session).await?;
        session.id = result.inserted_id.as_object_id();
        Ok(session)
    }

    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<Session>> {
        Ok(self.collection().find_one(doc! { "_id": *id }).await?)
    }

    async fn find_by_id_and_refresh_digest(
        &self,
        id: &ObjectId,
        digest: &str,
    ) -> AppResult<Option<Session>> {
        let session = self.collection()
            .find_one(doc! { "_id": *id, "refresh_token": digest })
            .await?;
        Ok(session)
    }

    async fn mark_issued(&self, id: &ObjectId, digest: &str) -> AppResult<bool> {
        let issued = to_bson(&IssuanceState::Issued).context("세션 상태 변환 실패")?;
        let provisional = to_bson(&IssuanceState::Provisional).context("세션 상태 변환 실패")?;

        let result = self.collection()
            .update_one(
                doc! { "_id": *id, "issuance": provisional },
                doc! { "$set": { "refresh_token": digest, "issuance": issued } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn touch(&self, id: &ObjectId, now: DateTime) -> AppResult<()> {
        self.collection()
            .update_one(doc! { "_id": *id }, doc! { "$set": { "last_activity": now } })
            .await?;
        Ok(())
    }

    async fn revoke(&self, id: &ObjectId, reason: RevokeReason, now: DateTime) -> AppResult<bool> {
        let reason = to_bson(&reason).context("폐기 사유 변환 실패")?;

        let result = self.collection()
            .update_one(
                doc! { "_id": *id, "is_revoked": false },
                doc! {
                    "$set": {
                        "is_revoked": true,
                        "is_active": false,
                        "revoked_at": now,
                        "revoked_reason": reason,
                    }
                },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn extend(&self, id: &ObjectId, expires_at: DateTime) -> AppResult<bool> {
        let result = self.collection()
            .update_one(
                doc! { "_id": *id, "is_revoked": false },
                doc! { "$set": { "expires_at": expires_at } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn bump_token_version(&self, id: &ObjectId) -> AppResult<Option<i64>> {
        let session = self.collection()
            .find_one_and_update(
                doc! { "_id": *id, "is_active": true, "is_revoked": false },
                doc! { "$inc": { "access_token_version": 1_i64 } },
            )
            .return_document(ReturnDocument::After)
            .await?;
        Ok(session.map(|s| s.access_token_version))
    }

    async fn rotate_refresh_token(&self, id: &ObjectId, digest: &str) -> AppResult<bool> {
        let result = self.collection()
            .update_one(
                doc! { "_id": *id },
                doc! { "$set": { "refresh_token": digest, "last_activity": DateTime::now() } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn find_active_by_user(&self, user: &ObjectId, now: DateTime) -> AppResult<Vec<Session>> {
        let issued = to_bson(&IssuanceState::Issued).context("세션 상태 변환 실패")?;

        let sessions = self.collection()
            .find(doc! {
                "user": *user,
                "issuance": issued,
                "is_active": true,
                "is_revoked": false,
                "expires_at": { "$gt": now },
            })
            .sort(doc! { "last_activity": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(sessions)
    }

    async fn revoke_all_for_user(
        &self,
        user: &ObjectId,
        reason: RevokeReason,
        now: DateTime,
    ) -> AppResult<u64> {
        let reason = to_bson(&reason).context("폐기 사유 변환 실패")?;

        let result = self.collection()
            .update_many(
                doc! { "user": *user, "is_revoked": false },
                doc! {
                    "$set": {
                        "is_revoked": true,
                        "is_active": false,
                        "revoked_at": now,
                        "revoked_reason": reason,
                    }
                },
            )
            .await?;
        Ok(result.modified_count)
    }

    async fn delete_expired(&self, now: DateTime, revoked_before: DateTime) -> AppResult<u64> {
        let result = self.collection()
            .delete_many(doc! {
                "$or": [
                    { "expires_at": { "$lt": now } },
                    { "is_revoked": true, "revoked_at": { "$lt": revoked_before } },
                ]
            })
            .await?;
        Ok(result.deleted_count)
    }
}
