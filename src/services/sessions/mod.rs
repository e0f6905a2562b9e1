//! 세션 생명주기 서비스 모듈

pub mod session_service;

pub use session_service::{SessionService, CLEANUP_INTERVAL};
