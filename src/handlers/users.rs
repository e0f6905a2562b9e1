//! 사용자 리소스 핸들러 (`/api/users`)
//!
//! 본인 또는 관리자만 접근할 수 있는 사용자 단위 조회입니다.

use actix_web::{get, web, HttpResponse};
use crate::core::{AppError, AppState};
use crate::domain::dto::users::{SessionListResponse, SessionResponse};
use crate::domain::dto::ApiResponse;
use crate::domain::models::auth::AuthenticatedUser;
use crate::middlewares::Authorize;

/// 특정 사용자의 활성 세션 목록
#[get("/{userId}/sessions", wrap = "Authorize::resource_ownership(\"userId\")")]
pub async fn user_sessions(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = state.users.find(&user_id).await?;
    let Some(id) = user.id else {
        return Err(AppError::NotFound("사용자를 찾을 수 없습니다".to_string()));
    };
    let current = identity.session_id();

    let sessions = state
        .sessions
        .get_active_sessions(&id)
        .await?
        .into_iter()
        .map(|s| SessionResponse::from_session(s, Some(current.as_str())))
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(SessionListResponse { sessions })))
}

#[cfg(test)]
mod tests {
    use actix_web::{test, web, App};
    use serde_json::Value;
    use crate::core::state::testing::{in_memory_state, seed_active_user, STRONG_PASSWORD};
    use crate::core::AppState;
    use crate::domain::dto::auth::LoginRequest;
    use crate::domain::entities::audit::{RiskLevel, SecurityEventKind};
    use crate::routes::configure_all_routes;
    use crate::services::audit::SecurityContext;

    async fn bearer(state: &AppState, username: &str) -> String {
        let request = LoginRequest { login: username.to_string(), password: STRONG_PASSWORD.to_string() };
        let (_, tokens) = state.auth.login(request, SecurityContext::default()).await.unwrap();
        format!("Bearer {}", tokens.access_token)
    }

    #[actix_web::test]
    async fn test_teacher_cannot_read_student_sessions() {
        let (state, stores) = in_memory_state();
        seed_active_user(&state, &stores, "alice", "teacher").await;
        let bob = seed_active_user(&state, &stores, "bob", "student").await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(state.clone())).configure(configure_all_routes),
        )
        .await;
        let alice = bearer(&state, "alice").await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/users/{}/sessions", bob.id_string().unwrap()))
            .insert_header(("Authorization", alice))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "RESOURCE_ACCESS_DENIED");

        let entry = stores
            .audit
            .entries()
            .into_iter()
            .find(|e| e.event_kind == SecurityEventKind::ResourceOwnershipViolation)
            .unwrap();
        assert_eq!(entry.security.risk_level, RiskLevel::High);
    }

    #[actix_web::test]
    async fn test_owner_and_admin_can_read_sessions() {
        let (state, stores) = in_memory_state();
        let bob = seed_active_user(&state, &stores, "bob", "student").await;
        seed_active_user(&state, &stores, "root", "admin").await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(state.clone())).configure(configure_all_routes),
        )
        .await;
        let uri = format!("/api/users/{}/sessions", bob.id_string().unwrap());

        let own = bearer(&state, "bob").await;
        let req = test::TestRequest::get().uri(&uri).insert_header(("Authorization", own)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["sessions"].as_array().unwrap().len(), 1);
        assert_eq!(body["sessions"][0]["current"], true);

        let admin = bearer(&state, "root").await;
        let req = test::TestRequest::get().uri(&uri).insert_header(("Authorization", admin)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["sessions"][0]["current"], false);
    }
}
