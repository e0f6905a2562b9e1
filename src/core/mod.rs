//! # Core Framework Module
//!
//! 애플리케이션 전역에서 쓰이는 기반 타입을 모아 둔 모듈입니다.
//!
//! ## 모듈 구성
//!
//! ### [`errors`] - 통합 에러 처리
//! - **AppError**: 애플리케이션 전역 에러 타입
//! - **HTTP 통합**: `{success, message, code}` 응답 봉투로 자동 변환
//! - **자동 변환**: MongoDB, Redis, validator, JWT 에러의 `From` 구현
//!
//! ### [`registry`] - 저장소 초기화
//! - **Repository**: 컬렉션 이름과 인덱스 생성 로직을 가진 저장소 공통 trait
//! - **initialize_repositories**: 시작 시 모든 저장소의 인덱스를 순서대로 준비
//!
//! ### [`state`] - 의존성 주입
//! - **AppState**: 생성자 주입으로 조립된 서비스 묶음. `web::Data` 로 공유됩니다.
//!
//! ## 애플리케이션 초기화
//!
//! ```rust,ignore
//! let settings = AuthSettings::from_env()?;
//! settings.ensure_production_ready()?;
//!
//! let database = Arc::new(Database::new().await?);
//! let redis = Arc::new(RedisClient::new().await?);
//! let state = AppState::from_infrastructure(settings, database, redis).await?;
//!
//! HttpServer::new(move || {
//!     App::new()
//!         .app_data(web::Data::new(state.clone()))
//!         .configure(configure_all_routes)
//! })
//! ```

pub mod errors;
pub mod registry;
pub mod state;

pub use errors::*;
pub use registry::{initialize_repositories, Repository};
pub use state::AppState;
