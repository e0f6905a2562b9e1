//! 대학 관리 플랫폼 인증 서비스 백엔드
//!
//! 대학 관리 앱의 인증과 세션 보안을 담당하는 서비스입니다.
//! HS256 JWT 액세스/리프레시 토큰, 서버 측 세션, 역할/권한 기반 인가,
//! 기관 단위 격리, 보안 감사 로그를 제공합니다.
//!
//! # Features
//!
//! - **계정**: 회원가입(승인 대기), 로그인 잠금, 비밀번호 재설정/변경, 프로필 수정
//! - **세션**: 토큰 버전 기반 무효화, 리프레시 토큰 회전, 기기별 세션 관리
//! - **인가**: 역할, 권한(범위 포함), 기관 격리, 리소스 소유권
//! - **감사**: 보안 이벤트별 위험도 자동 산정
//! - **MongoDB**: 사용자, 세션, 권한, 감사 로그 저장
//! - **Redis**: 비밀번호 재설정 토큰
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← REST API 엔드포인트
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   Middlewares   │ ← 인증 → 인가
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← 요청/응답 처리
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← 비즈니스 로직 (AppState 로 주입)
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Repositories   │ ← 저장소 trait + MongoDB/Redis 구현
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use college_auth_backend::config::AuthSettings;
//! use college_auth_backend::core::AppState;
//!
//! let settings = AuthSettings::from_env()?;
//! settings.ensure_production_ready()?;
//! let state = AppState::from_infrastructure(settings, database, redis).await?;
//!
//! let (user, tokens) = state.auth.login(request, context).await?;
//! ```

pub mod core;
pub mod config;
pub mod db;
pub mod caching;
pub mod domain;
pub mod repositories;
pub mod services;
pub mod utils;
pub mod routes;
pub mod handlers;
pub mod middlewares;
