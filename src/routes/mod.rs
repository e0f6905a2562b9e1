//! API 라우트 설정 모듈
//!
//! 엔드포인트를 기능별 스코프로 묶고 스코프마다 인증/인가 미들웨어를 겁니다.
//!
//! # 스코프 구성
//!
//! | 스코프              | 인증                         | 인가                                  |
//! |---------------------|------------------------------|---------------------------------------|
//! | `/api/auth`         | 보호 엔드포인트만 (리소스 단위) | -                                     |
//! | `/api/admin`        | 필수                          | admin, super_admin 역할 + 엔드포인트별 권한 |
//! | `/api/users`        | 필수                          | 리소스 소유권 (`userId`)               |
//! | `/api/institutes`   | 필수                          | 기관 격리 (`instituteId`)              |
//! | `/health`           | -                            | -                                     |
//!
//! actix-web 은 마지막에 등록한 `wrap` 을 먼저 실행하므로 인가 미들웨어를
//! 먼저, 인증 미들웨어를 나중에 등록합니다.
//!
//! ```rust,ignore
//! web::scope("/api/admin")
//!     .wrap(Authorize::roles(&["admin", "super_admin"]))
//!     .wrap(AuthMiddleware::required())
//! ```

use actix_web::{error, get, web, HttpRequest, HttpResponse};
use serde_json::json;
use crate::core::AppError;
use crate::domain::entities::access_control::role_names;
use crate::handlers;
use crate::middlewares::{AuthMiddleware, Authorize};

/// 모든 라우트를 설정합니다
///
/// ```rust,ignore
/// use actix_web::{web, App};
///
/// let app = App::new().configure(configure_all_routes);
/// ```
pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    // 추출 실패도 공통 에러 봉투로 응답
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler));

    cfg.service(health_check);

    configure_auth_routes(cfg);
    configure_admin_routes(cfg);
    configure_user_routes(cfg);
    configure_institute_routes(cfg);
}

/// 인증 관련 라우트
///
/// ```bash
/// curl -X POST http://localhost:8080/api/auth/login \
///   -H "Content-Type: application/json" \
///   -d '{"login":"alice","password":"Gr8!Velvet#Moon"}'
/// ```
fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .service(handlers::auth::register)
            .service(handlers::auth::login)
            .service(handlers::auth::refresh)
            .service(handlers::auth::forgot_password)
            .service(handlers::auth::reset_password)
            // 보호 엔드포인트
            .service(handlers::auth::logout)
            .service(handlers::auth::logout_all)
            .service(handlers::auth::me)
            .service(handlers::auth::update_profile)
            .service(handlers::auth::change_password)
            .service(handlers::auth::list_sessions)
            .service(handlers::auth::revoke_session),
    );
}

fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .wrap(Authorize::roles(&[role_names::ADMIN, role_names::SUPER_ADMIN]))
            .wrap(AuthMiddleware::required())
            .service(handlers::admin::approve_user)
            .service(handlers::admin::change_status)
            .service(handlers::admin::revoke_session)
            .service(handlers::admin::revoke_user_sessions),
    );
}

fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .wrap(AuthMiddleware::required())
            .service(handlers::users::user_sessions),
    );
}

fn configure_institute_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/institutes")
            .wrap(AuthMiddleware::required())
            .service(handlers::institutes::institute_users),
    );
}

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("JSON 본문 파싱 실패: {}", err);
    AppError::ValidationError(format!("잘못된 요청 본문입니다: {}", err)).into()
}

fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(format!("잘못된 경로 파라미터입니다: {}", err)).into()
}

/// 헬스체크 엔드포인트
///
/// ```bash
/// curl http://localhost:8080/health
/// ```
///
/// Response:
/// ```json
/// {
///   "status": "healthy",
///   "service": "college_auth_service",
///   "version": "0.1.0",
///   "timestamp": "2026-01-01T00:00:00Z"
/// }
/// ```
#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "college_auth_service",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "features": {
            "database": "MongoDB",
            "cache": "Redis",
            "auth": "JWT (HS256) + server-side sessions"
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::Value;
    use crate::core::state::testing::in_memory_state;

    #[actix_web::test]
    async fn test_health_check() {
        let (state, _) = in_memory_state();
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).configure(configure_all_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
    }

    #[actix_web::test]
    async fn test_protected_routes_require_token() {
        let (state, _) = in_memory_state();
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).configure(configure_all_routes),
        )
        .await;

        for uri in ["/api/auth/me", "/api/admin/sessions/abc", "/api/users/abc/sessions"] {
            let method = if uri.contains("admin") { "DELETE" } else { "GET" };
            let req = test::TestRequest::default()
                .method(method.parse().unwrap())
                .uri(uri)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 401, "{}", uri);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["code"], "NO_TOKEN");
        }
    }
}
