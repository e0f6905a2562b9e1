//! 사용자 데이터 액세스 계층
//!
//! [`UserStore`] trait 과 MongoDB 구현 [`MongoUserStore`] 를 제공합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::repositories::users::{MongoUserStore, UserStore};
//!
//! let users: Arc<dyn UserStore> = Arc::new(MongoUserStore::new(database.clone()));
//! let user = users.find_by_email("user@example.com").await?;
//! ```

pub mod user_store;
pub mod user_repo;

pub use user_repo::MongoUserStore;
pub use user_store::UserStore;
