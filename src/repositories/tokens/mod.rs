//! 단기 토큰 저장 계층 (Redis)

pub mod reset_token_repo;

pub use reset_token_repo::{RedisResetTokenStore, ResetTokenStore};
