//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! 서비스는 저장소 trait 과 다른 서비스를 생성자로 받아 조립되며,
//! 조립은 [`crate::core::AppState`] 한 곳에서 이루어집니다.
//!
//! # Features
//!
//! - 비밀번호 정책, 회원가입, 로그인, 비밀번호 재설정 ([`auth`])
//! - JWT 발급/검증/갱신과 세션 버전 관리 ([`auth`], [`sessions`])
//! - 역할/권한 해석과 인가 검사 ([`access`])
//! - 보안 감사 기록 ([`audit`])
//! - 관리자 계정 관리 ([`users`])
//!
//! # Examples
//!
//! ```rust,ignore
//! let state = AppState::with_stores(settings, stores);
//! let (user, tokens) = state.auth.login(request, SecurityContext::from_request(&req)).await?;
//! ```

pub mod access;
pub mod audit;
pub mod auth;
pub mod sessions;
pub mod users;
