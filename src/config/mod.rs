//! # Configuration Module
//!
//! 백엔드 서비스의 설정 관리를 담당하는 모듈입니다.
//! 환경 변수 기반의 설정값들을 중앙집중식으로 관리합니다.
//!
//! ## 모듈 구성
//!
//! - [`data_config`] - 실행 환경, 서버 바인딩, bcrypt cost
//! - [`auth_config`] - JWT, 로그인 잠금, 비밀번호 재설정, [`AuthSettings`]
//!
//! ## 환경 분리
//!
//! `PROFILE` 값에 따라 `.env.dev` / `.env.prod` 가 로드되고,
//! `ENVIRONMENT`(또는 `NODE_ENV`)가 실행 환경을 결정합니다.
//! 운영 환경에서 시크릿 구성이 안전하지 않으면 서버가 시작되지 않습니다.
//!
//! ## 환경 변수 설정 가이드
//!
//! ```bash
//! # 서버 설정
//! export HOST="0.0.0.0"
//! export PORT="8080"
//! export WORKERS="4"
//! export CORS_ALLOWED_ORIGINS="https://college.example.com"
//!
//! # 저장소
//! export MONGODB_URI="mongodb://localhost:27017"
//! export DATABASE_NAME="college_auth"
//! export REDIS_URL="redis://127.0.0.1:6379"
//!
//! # 보안 설정
//! export BCRYPT_SALT_ROUNDS="12"      # 4-15 범위
//! export RATE_LIMIT_PER_SECOND="10"
//! export RATE_LIMIT_BURST_SIZE="30"
//! ```

pub mod data_config;
pub mod auth_config;

pub use data_config::*;
pub use auth_config::*;
