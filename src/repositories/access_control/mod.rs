//! 역할/권한 데이터 액세스 계층

pub mod access_control_repo;

pub use access_control_repo::{AccessControlStore, MongoAccessControlStore};
