//! 세션 데이터 액세스 계층

pub mod session_store;
pub mod session_repo;

pub use session_repo::MongoSessionStore;
pub use session_store::SessionStore;
