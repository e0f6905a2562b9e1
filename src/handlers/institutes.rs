//! 기관 단위 조회 핸들러 (`/api/institutes`)

use actix_web::{get, web, HttpResponse};
use crate::core::{AppError, AppState};
use crate::domain::dto::users::UserListResponse;
use crate::domain::dto::ApiResponse;
use crate::middlewares::Authorize;

/// 기관 소속 사용자 목록. 다른 기관 요청은 403 으로 거부되고 감사 로그에 남습니다.
#[get("/{instituteId}/users", wrap = "Authorize::institute_access(\"instituteId\")")]
pub async fn institute_users(
    state: web::Data<AppState>,
    institute_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let users = state.users.list_by_institute(&institute_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(UserListResponse::from(users))))
}

#[cfg(test)]
mod tests {
    use actix_web::{test, web, App};
    use mongodb::bson::oid::ObjectId;
    use serde_json::Value;
    use crate::core::state::testing::{in_memory_state, STRONG_PASSWORD};
    use crate::domain::dto::auth::LoginRequest;
    use crate::domain::entities::audit::SecurityEventKind;
    use crate::domain::entities::users::{AccountStatus, User};
    use crate::repositories::users::UserStore;
    use crate::routes::configure_all_routes;
    use crate::services::audit::SecurityContext;

    async fn member(state: &crate::core::AppState, username: &str, institute: ObjectId) -> User {
        let hash = state.password_policy.hash(STRONG_PASSWORD).await.unwrap();
        let mut user = User::new_pending(
            format!("{}@x.com", username),
            username.to_string(),
            username.to_string(),
            hash,
            "teacher".to_string(),
        );
        user.account_status = AccountStatus::Active;
        user.is_active = true;
        user.is_approved = true;
        user.institute = Some(institute);
        user
    }

    #[actix_web::test]
    async fn test_tenant_isolation() {
        let (state, stores) = in_memory_state();
        let own = ObjectId::new();
        let other = ObjectId::new();
        stores.users.insert(member(&state, "alice", own).await).await.unwrap();
        stores.users.insert(member(&state, "carol", own).await).await.unwrap();
        stores.users.insert(member(&state, "dave", other).await).await.unwrap();

        let request = LoginRequest { login: "alice".to_string(), password: STRONG_PASSWORD.to_string() };
        let (_, tokens) = state.auth.login(request, SecurityContext::default()).await.unwrap();
        let bearer = format!("Bearer {}", tokens.access_token);

        let app = test::init_service(
            App::new().app_data(web::Data::new(state.clone())).configure(configure_all_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/institutes/{}/users", own.to_hex()))
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["users"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri(&format!("/api/institutes/{}/users", other.to_hex()))
            .insert_header(("Authorization", bearer))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "INSTITUTE_ACCESS_DENIED");
        assert!(stores
            .audit
            .entries()
            .iter()
            .any(|e| e.event_kind == SecurityEventKind::CrossTenantAccess));
    }
}
