//! # 비밀번호 재설정 토큰 저장소
//!
//! 재설정 토큰 원문은 저장하지 않고 SHA-256 다이제스트를 키로 사용합니다.
//!
//! - **키 패턴**: `password_reset:{digest}`
//! - **값**: 사용자 ID (hex)
//! - **TTL**: `PASSWORD_RESET_EXPIRE` 분
//!
//! 토큰은 `GETDEL` 로 꺼내므로 한 번만 사용할 수 있습니다.

use std::sync::Arc;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use crate::caching::redis::RedisClient;
use crate::core::errors::AppResult;

#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    async fn store(&self, digest: &str, user_id: &ObjectId, ttl_secs: u64) -> AppResult<()>;

    /// 토큰을 소비하고 사용자 ID 를 돌려줍니다. 없거나 만료되었으면 `None`.
    async fn consume(&self, digest: &str) -> AppResult<Option<ObjectId>>;
}

pub struct RedisResetTokenStore {
    redis: Arc<RedisClient>,
}

impl RedisResetTokenStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }

    fn key(digest: &str) -> String {
        format!("password_reset:{}", digest)
    }
}

#[async_trait]
impl ResetTokenStore for RedisResetTokenStore {
    async fn store(&self, digest: &str, user_id: &ObjectId, ttl_secs: u64) -> AppResult<()> {
        self.redis
            .set_with_expiry(&Self::key(digest), &user_id.to_hex(), ttl_secs)
            .await?;
        log::debug!("비밀번호 재설정 토큰 저장 - user_id: {}, ttl: {}초", user_id, ttl_secs);
        Ok(())
    }

    async fn consume(&self, digest: &str) -> AppResult<Option<ObjectId>> {
        let stored: Option<String> = self.redis.take(&Self::key(digest)).await?;

        match stored {
            Some(hex) => Ok(Some(ObjectId::parse_str(&hex)?)),
            None => Ok(None),
        }
    }
}
