//! 관리자 핸들러 (`/api/admin`)
//!
//! 스코프 전체에 admin/super_admin 역할 검사가 걸려 있고,
//! 일부 엔드포인트는 권한 검사를 추가로 요구합니다.

use actix_web::{delete, post, put, web, HttpRequest, HttpResponse};
use mongodb::bson::oid::ObjectId;
use crate::core::{AppError, AppState};
use crate::domain::dto::users::{StatusChangeRequest, UserResponse};
use crate::domain::dto::ApiResponse;
use crate::domain::entities::sessions::RevokeReason;
use crate::domain::models::auth::AuthenticatedUser;
use crate::middlewares::Authorize;
use crate::services::audit::SecurityContext;

/// 감사 기록의 행위자는 요청한 관리자
fn admin_context(req: &HttpRequest, admin: &AuthenticatedUser) -> SecurityContext {
    SecurityContext::from_request(req).with_user(admin.user_id())
}

/// 가입 승인 (Pending → Active)
#[post("/users/{userId}/approve", wrap = "Authorize::permission(\"users:approve\", None)")]
pub async fn approve_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    admin: AuthenticatedUser,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = state.users.approve(&user_id, admin_context(&req, &admin)).await?;
    Ok(HttpResponse::Ok().json(
        ApiResponse::success(UserResponse::from(user)).with_message("계정이 승인되었습니다"),
    ))
}

/// 계정 상태 변경
#[put(
    "/users/{userId}/status",
    wrap = "Authorize::any_permission(&[\"users:manage\", \"users:suspend\"])"
)]
pub async fn change_status(
    req: HttpRequest,
    state: web::Data<AppState>,
    admin: AuthenticatedUser,
    user_id: web::Path<String>,
    payload: web::Json<StatusChangeRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .users
        .change_status(&user_id, payload.status, admin_context(&req, &admin))
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse::from(user))))
}

/// 임의의 세션 강제 종료
#[delete("/sessions/{sessionId}")]
pub async fn revoke_session(
    req: HttpRequest,
    state: web::Data<AppState>,
    admin: AuthenticatedUser,
    session_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(session_id.as_str())?;
    if state.sessions.find(&id).await?.is_none() {
        return Err(AppError::NotFound("세션을 찾을 수 없습니다".to_string()));
    }

    state
        .tokens
        .revoke_session(&id, RevokeReason::AdminRevoked, admin_context(&req, &admin))
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("세션이 종료되었습니다")))
}

/// 사용자의 모든 세션 강제 종료
#[post("/users/{userId}/revoke-sessions")]
pub async fn revoke_user_sessions(
    req: HttpRequest,
    state: web::Data<AppState>,
    admin: AuthenticatedUser,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let count = state
        .users
        .revoke_all_sessions(&user_id, admin_context(&req, &admin))
        .await?;
    log::warn!("관리자 세션 일괄 종료 - user: {}, count: {}", user_id, count);
    Ok(HttpResponse::Ok().json(ApiResponse::message(format!(
        "{}개의 세션이 종료되었습니다",
        count
    ))))
}

#[cfg(test)]
mod tests {
    use actix_web::{test, web, App};
    use mongodb::bson::oid::ObjectId;
    use serde_json::{json, Value};
    use crate::core::state::testing::{in_memory_state, seed_active_user, STRONG_PASSWORD};
    use crate::core::AppState;
    use crate::domain::entities::access_control::AccessControlEntry;
    use crate::domain::entities::audit::SecurityEventKind;
    use crate::domain::entities::sessions::RevokeReason;
    use crate::domain::entities::users::{AccountStatus, User};
    use crate::repositories::users::UserStore;
    use crate::routes::configure_all_routes;
    use crate::domain::dto::auth::LoginRequest;
    use crate::services::audit::SecurityContext;

    async fn bearer(state: &AppState, username: &str) -> String {
        let request = LoginRequest { login: username.to_string(), password: STRONG_PASSWORD.to_string() };
        let (_, tokens) = state.auth.login(request, SecurityContext::default()).await.unwrap();
        format!("Bearer {}", tokens.access_token)
    }

    #[actix_web::test]
    async fn test_approve_requires_permission() {
        let (state, stores) = in_memory_state();
        seed_active_user(&state, &stores, "root", "admin").await;
        let pending = stores
            .users
            .insert(User::new_pending(
                "p@x.com".to_string(),
                "pending".to_string(),
                "Pending".to_string(),
                "hash".to_string(),
                "student".to_string(),
            ))
            .await
            .unwrap();
        let uri = format!("/api/admin/users/{}/approve", pending.id_string().unwrap());

        let app = test::init_service(
            App::new().app_data(web::Data::new(state.clone())).configure(configure_all_routes),
        )
        .await;
        let admin = bearer(&state, "root").await;

        // 역할은 맞지만 users:approve 권한이 없음
        let req = test::TestRequest::post().uri(&uri).insert_header(("Authorization", admin.clone())).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "INSUFFICIENT_PERMISSIONS");

        let approve = stores.access_control.put(AccessControlEntry::permission("users:approve", None));
        stores.access_control.put(AccessControlEntry::role("admin", vec![approve]));

        let req = test::TestRequest::post().uri(&uri).insert_header(("Authorization", admin)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["accountStatus"], "Active");
    }

    #[actix_web::test]
    async fn test_non_admin_is_rejected_by_role() {
        let (state, stores) = in_memory_state();
        let student = seed_active_user(&state, &stores, "alice", "student").await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(state.clone())).configure(configure_all_routes),
        )
        .await;
        let token = bearer(&state, "alice").await;

        let uri = format!("/api/admin/users/{}/revoke-sessions", student.id_string().unwrap());
        let req = test::TestRequest::post().uri(&uri).insert_header(("Authorization", token)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "INSUFFICIENT_ROLE");
    }

    #[actix_web::test]
    async fn test_pause_user_revokes_their_sessions() {
        let (state, stores) = in_memory_state();
        seed_active_user(&state, &stores, "root", "admin").await;
        let student = seed_active_user(&state, &stores, "alice", "student").await;
        let manage = stores.access_control.put(AccessControlEntry::permission("users:manage", None));
        stores.access_control.put(AccessControlEntry::role("admin", vec![manage]));

        let app = test::init_service(
            App::new().app_data(web::Data::new(state.clone())).configure(configure_all_routes),
        )
        .await;
        let admin = bearer(&state, "root").await;
        let student_token = bearer(&state, "alice").await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/admin/users/{}/status", student.id_string().unwrap()))
            .insert_header(("Authorization", admin))
            .set_json(json!({ "status": "Paused" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let stored = stores.users.find_by_id(&student.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(stored.account_status, AccountStatus::Paused);
        assert!(stores
            .sessions
            .all()
            .iter()
            .filter(|s| s.user == student.id.unwrap())
            .all(|s| s.revoked_reason == Some(RevokeReason::AccountDeactivated)));

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", student_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);
    }

    #[actix_web::test]
    async fn test_admin_revokes_single_session() {
        let (state, stores) = in_memory_state();
        let root = seed_active_user(&state, &stores, "root", "admin").await;
        let student = seed_active_user(&state, &stores, "alice", "student").await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(state.clone())).configure(configure_all_routes),
        )
        .await;
        let admin = bearer(&state, "root").await;
        bearer(&state, "alice").await;

        let target = stores
            .sessions
            .all()
            .into_iter()
            .find(|s| s.user == student.id.unwrap())
            .and_then(|s| s.id)
            .unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/admin/sessions/{}", target.to_hex()))
            .insert_header(("Authorization", admin.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let revoked = stores.sessions.all().into_iter().find(|s| s.id == Some(target)).unwrap();
        assert_eq!(revoked.revoked_reason, Some(RevokeReason::AdminRevoked));

        let entry = stores
            .audit
            .entries()
            .into_iter()
            .find(|e| e.event_kind == SecurityEventKind::SessionRevoked)
            .unwrap();
        assert_eq!(entry.details["sessionId"], target.to_hex());
        assert_eq!(entry.details["reason"], "AdminRevoked");
        assert_eq!(entry.user_id, root.id_string());

        let req = test::TestRequest::delete()
            .uri(&format!("/api/admin/sessions/{}", ObjectId::new().to_hex()))
            .insert_header(("Authorization", admin))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
}
