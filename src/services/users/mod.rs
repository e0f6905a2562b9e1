//! 사용자 관리 서비스 모듈
//!
//! 관리자 승인, 계정 상태 전이, 기관별 사용자 조회를 담당합니다.

pub mod user_service;

pub use user_service::UserService;
