//! # HTTP Request Handlers Module
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 정의하는 모듈입니다.
//! 핸들러는 `web::Data<AppState>` 에서 서비스를 꺼내 호출하고,
//! 결과를 [`ApiResponse`](crate::domain::dto::ApiResponse) 로 감싸 돌려줍니다.
//! 실패는 `AppError` 가 `{success:false, message, code}` 로 변환합니다.
//!
//! ## 아키텍처 위치
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//!   Middlewares - 인증 → 인가
//! ├─────────────────────────────────────────────┤
//!   Handlers (이 모듈) - HTTP 엔드포인트 처리         ← Web Layer
//! ├─────────────────────────────────────────────┤
//!   Services - 비즈니스 로직                        ← Service Layer
//! ├─────────────────────────────────────────────┤
//!   Repositories - 데이터 접근                     ← Repository Layer
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## 모듈 구성
//!
//! - **`auth`**: 회원가입, 로그인, 토큰 갱신, 비밀번호, 프로필, 내 세션
//! - **`admin`**: 가입 승인, 계정 상태, 세션 강제 종료
//! - **`users`**: 사용자별 세션 조회 (소유권 검사)
//! - **`institutes`**: 기관 소속 사용자 조회 (기관 격리)
//!
//! 인증된 사용자는 [`AuthenticatedUser`](crate::domain::models::auth::AuthenticatedUser)
//! 추출자로 받습니다.
//!
//! ```rust,ignore
//! #[get("/me")]
//! pub async fn me(
//!     state: web::Data<AppState>,
//!     identity: AuthenticatedUser,
//! ) -> Result<HttpResponse, AppError> {
//!     let user = state.auth.me(&identity).await?;
//!     Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse::from(user))))
//! }
//! ```

pub mod admin;
pub mod auth;
pub mod institutes;
pub mod users;
