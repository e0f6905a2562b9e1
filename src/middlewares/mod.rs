//! 미들웨어 모듈
//!
//! 요청 파이프라인의 횡단 관심사를 처리합니다.
//! 한 요청은 항상 인증 → 인가 → 핸들러 순서로 처리됩니다.
//!
//! # 제공 미들웨어
//!
//! ### 1. 인증 미들웨어 (AuthMiddleware)
//! - Bearer 액세스 토큰 추출 및 검증
//! - 서버 측 세션 상태와 토큰 버전 확인
//! - 사용자/세션/클레임을 request extension 에 저장
//! - 선택적/강제 인증 모드 지원
//!
//! ### 2. 인가 미들웨어 (Authorize)
//! - 역할, 권한, 소속 기관, 리소스 소유권 규칙
//!
//! # 사용 방법
//!
//! ```rust,ignore
//! App::new()
//!     .service(
//!         web::scope("/api/admin")
//!             .wrap(Authorize::roles(&["admin", "super_admin"]))
//!             .wrap(AuthMiddleware::required())
//!             .route("/users/{userId}/approve", web::post().to(approve_user))
//!     )
//! ```

pub mod auth_middleware;
pub mod authorize;
mod auth_inner;

// 미들웨어 재export
pub use auth_middleware::AuthMiddleware;
pub use authorize::Authorize;
