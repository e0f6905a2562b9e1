//! # 역할/권한 리포지토리
//!
//! `access_controls` 컬렉션 하나에 `type` 구분자로 역할과 권한 문서를 함께 보관합니다.

use std::sync::Arc;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::IndexOptions,
    Collection, IndexModel,
};
use crate::{
    core::errors::AppResult,
    core::registry::Repository,
    db::Database,
    domain::entities::access_control::AccessControlEntry,
};

const COLLECTION: &str = "access_controls";

/// 역할/권한 조회 인터페이스
#[async_trait]
pub trait AccessControlStore: Send + Sync {
    /// ID 목록에 해당하는 역할 문서
    async fn find_roles_by_ids(&self, ids: &[ObjectId]) -> AppResult<Vec<AccessControlEntry>>;

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<AccessControlEntry>>;

    /// ID 목록에 해당하는 권한 문서
    async fn find_permissions_by_ids(&self, ids: &[ObjectId]) -> AppResult<Vec<AccessControlEntry>>;
}

pub struct MongoAccessControlStore {
    db: Arc<Database>,
}

impl MongoAccessControlStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<AccessControlEntry> {
        self.db.get_database().collection::<AccessControlEntry>(COLLECTION)
    }

    async fn find_by_type(&self, entry_type: &str, ids: &[ObjectId]) -> AppResult<Vec<AccessControlEntry>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let entries = self.collection()
            .find(doc! { "type": entry_type, "_id": { "$in": ids.to_vec() } })
            .await?
            .try_collect()
            .await?;
        Ok(entries)
    }

    /// `(name, type)` 복합 유니크 인덱스
    pub async fn create_indexes(&self) -> AppResult<()> {
        let name_type_index = IndexModel::builder()
            .keys(doc! { "name": 1, "type": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("name_type_unique".to_string())
                .build())
            .build();

        self.collection().create_indexes([name_type_index]).await?;
        Ok(())
    }
}

#[async_trait]
impl Repository for MongoAccessControlStore {
    fn name(&self) -> &str {
        "access_control"
    }

    fn collection_name(&self) -> &str {
        COLLECTION
    }

    async fn init(&self) -> AppResult<()> {
        self.create_indexes().await
    }
}

#[async_trait]
impl AccessControlStore for MongoAccessControlStore {
    async fn find_roles_by_ids(&self, ids: &[ObjectId]) -> AppResult<Vec<AccessControlEntry>> {
        self.find_by_type("role", ids).await
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<AccessControlEntry>> {
        let role = self.collection()
            .find_one(doc! { "type": "role", "name": name })
            .await?;
        Ok(role)
    }

    async fn find_permissions_by_ids(&self, ids: &[ObjectId]) -> AppResult<Vec<AccessControlEntry>> {
        self.find_by_type("permission", ids).await
    }
}
