//! 인증 및 보안 서비스 모듈
//!
//! # Features
//!
//! - 비밀번호 복잡도 검증, 강도 평가, 생성, bcrypt 해싱
//! - 세션에 묶인 JWT 액세스/리프레시 토큰 발급과 갱신
//! - 회원가입, 로그인 잠금, 비밀번호 재설정/변경
//!
//! # Security
//!
//! - HMAC-SHA256 토큰 서명 (액세스/리프레시 시크릿 분리)
//! - 리프레시 토큰은 다이제스트로만 저장
//! - 토큰 버전으로 만료 전 액세스 토큰 무효화

pub mod password_policy;
pub mod token_service;
pub mod auth_service;

pub use password_policy::PasswordPolicy;
pub use token_service::TokenService;
pub use auth_service::AuthService;
