//! # 감사 로그 리포지토리
//!
//! 보안 이벤트를 `audit_logs` 컬렉션에 추가만 합니다.

use std::sync::Arc;
use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};
use crate::{
    core::errors::AppResult,
    core::registry::Repository,
    db::Database,
    domain::entities::audit::AuditEntry,
};

const COLLECTION: &str = "audit_logs";

/// 감사 로그 기록 대상
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn write(&self, entry: AuditEntry) -> AppResult<()>;
}

pub struct MongoAuditSink {
    db: Arc<Database>,
}

impl MongoAuditSink {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<AuditEntry> {
        self.db.get_database().collection::<AuditEntry>(COLLECTION)
    }

    pub async fn create_indexes(&self) -> AppResult<()> {
        let created_at_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(IndexOptions::builder()
                .name("created_at_desc".to_string())
                .build())
            .build();

        // 검토가 필요한 이벤트 조회용
        let review_index = IndexModel::builder()
            .keys(doc! { "security.requires_review": 1, "created_at": -1 })
            .options(IndexOptions::builder()
                .name("requires_review_idx".to_string())
                .build())
            .build();

        self.collection()
            .create_indexes([created_at_index, review_index])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Repository for MongoAuditSink {
    fn name(&self) -> &str {
        "audit"
    }

    fn collection_name(&self) -> &str {
        COLLECTION
    }

    async fn init(&self) -> AppResult<()> {
        self.create_indexes().await
    }
}

#[async_trait]
impl AuditSink for MongoAuditSink {
    async fn write(&self, entry: AuditEntry) -> AppResult<()> {
        self.collection().insert_one(&entry).await?;
        Ok(())
    }
}
