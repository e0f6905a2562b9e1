//! Data Transfer Objects
//!
//! HTTP 요청/응답 본문에 대응하는 타입입니다. 요청 DTO 는 `validator` 로
//! 필드 단위 검증을 수행하고, 응답 DTO 는 엔티티에서 민감 필드를 뺀
//! camelCase 표현을 만듭니다.

pub mod common;
pub mod auth;
pub mod users;

pub use common::ApiResponse;
