//! 역할/권한 해석과 인가 검사 서비스 모듈

pub mod access_control_service;
pub mod authorization_service;

pub use access_control_service::AccessControlService;
pub use authorization_service::AuthorizationService;
