//! Domain Models
//!
//! 저장되지 않는 도메인 값 객체를 모아 둔 모듈입니다.
//!
//! - [`auth`] - 요청에 붙는 인증 신원, 인증 모드, 접근 규칙
//! - [`token`] - JWT 클레임, 발급 결과, 세션 검증 결과
//! - [`password`] - 비밀번호 정책 위반 코드, 강도 평가, 생성 옵션

pub mod auth;
pub mod token;
pub mod password;

pub use auth::*;
pub use token::*;
pub use password::*;
