//! Authentication HTTP Handlers
//!
//! `/api/auth` 엔드포인트를 처리하는 핸들러 함수들입니다.
//! 비즈니스 로직은 [`AuthService`](crate::services::auth::AuthService) 에 있고
//! 여기서는 요청 파싱과 응답 모양만 다룹니다.
//!
//! # Public
//!
//! - `POST /register`, `POST /login`, `POST /refresh`
//! - `POST /forgot-password`, `POST /reset-password/{token}`
//!
//! # 인증 필요 (리소스 단위 `AuthMiddleware::required()`)
//!
//! - `POST /logout`, `POST /logout-all`
//! - `GET /me`, `PUT /profile`, `POST /change-password`
//! - `GET /sessions`, `DELETE /sessions/{sessionId}`

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use mongodb::bson::oid::ObjectId;
use serde_json::{Map, Value};
use validator::Validate;
use crate::core::{AppError, AppState};
use crate::domain::dto::auth::{
    ChangePasswordRequest, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest,
    LoginResponse, RefreshRequest, RegisterRequest, RegisterResponse, ResetPasswordRequest,
};
use crate::domain::dto::users::{ProfileUpdateRequest, SessionListResponse, SessionResponse, UserResponse};
use crate::domain::dto::ApiResponse;
use crate::domain::entities::sessions::RevokeReason;
use crate::domain::models::auth::AuthenticatedUser;
use crate::middlewares::AuthMiddleware;
use crate::services::audit::SecurityContext;

/// 회원가입
///
/// 새 계정은 관리자 승인 전까지 로그인할 수 없습니다.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state.auth.register(payload.into_inner()).await?;

    let response = RegisterResponse {
        user: UserResponse::from(user),
        status: "pending_approval",
    };
    Ok(HttpResponse::Created().json(
        ApiResponse::success(response).with_message("회원가입이 완료되었습니다. 관리자 승인(pending approval) 후 로그인할 수 있습니다"),
    ))
}

/// 이메일 또는 사용자명 로그인
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let context = SecurityContext::from_request(&req);
    let (user, tokens) = state.auth.login(payload.into_inner(), context).await?;

    log::info!("로그인 성공 - user: {}", user.username);
    let response = LoginResponse::new(UserResponse::from(user), tokens);
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// 리프레시 토큰으로 토큰 쌍 재발급
#[post("/refresh")]
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<RefreshRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;
    let context = SecurityContext::from_request(&req);
    let tokens = state.tokens.refresh(&payload.refresh_token, context).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(tokens)))
}

/// 현재 세션 로그아웃. 세션이 이미 폐기되었어도 200 입니다.
#[post("/logout", wrap = "AuthMiddleware::required()")]
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let context = SecurityContext::from_request(&req).with_user(identity.user_id());
    state.auth.logout(&identity, context).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("로그아웃되었습니다")))
}

/// 모든 기기에서 로그아웃
#[post("/logout-all", wrap = "AuthMiddleware::required()")]
pub async fn logout_all(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let context = SecurityContext::from_request(&req).with_user(identity.user_id());
    let count = state.auth.logout_all(&identity, context).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message(format!(
        "{}개의 세션에서 로그아웃되었습니다",
        count
    ))))
}

/// 비밀번호 재설정 요청
///
/// 가입 여부와 관계없이 같은 응답을 돌려줍니다.
#[post("/forgot-password")]
pub async fn forgot_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;
    let context = SecurityContext::from_request(&req);
    let reset_token = state.auth.forgot_password(&payload.email, context).await?;

    Ok(HttpResponse::Ok().json(
        ApiResponse::success(ForgotPasswordResponse { reset_token })
            .with_message("가입된 이메일이라면 재설정 안내가 발송됩니다"),
    ))
}

#[post("/reset-password/{token}")]
pub async fn reset_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    token: web::Path<String>,
    payload: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;
    let context = SecurityContext::from_request(&req);
    state
        .auth
        .reset_password(&token, &payload.new_password, context)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message(
        "비밀번호가 변경되었습니다. 다시 로그인해주세요",
    )))
}

#[get("/me", wrap = "AuthMiddleware::required()")]
pub async fn me(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = state.auth.me(&identity).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse::from(user))))
}

/// 프로필 수정. 허용되지 않은 필드는 조용히 버려집니다.
#[put("/profile", wrap = "AuthMiddleware::required()")]
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
    payload: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let request = ProfileUpdateRequest::from_payload(payload.into_inner())?;
    let user = state.auth.update_profile(&identity, request).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse::from(user))))
}

#[post("/change-password", wrap = "AuthMiddleware::required()")]
pub async fn change_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
    payload: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let context = SecurityContext::from_request(&req);
    state
        .auth
        .change_password(&identity, payload.into_inner(), context)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message(
        "비밀번호가 변경되었습니다. 모든 기기에서 다시 로그인해주세요",
    )))
}

/// 내 활성 세션 목록
#[get("/sessions", wrap = "AuthMiddleware::required()")]
pub async fn list_sessions(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user_id = ObjectId::parse_str(identity.user_id())?;
    let current = identity.session_id();

    let sessions = state
        .sessions
        .get_active_sessions(&user_id)
        .await?
        .into_iter()
        .map(|s| SessionResponse::from_session(s, Some(current.as_str())))
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(SessionListResponse { sessions })))
}

/// 내 세션 하나 폐기
#[delete("/sessions/{sessionId}", wrap = "AuthMiddleware::required()")]
pub async fn revoke_session(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
    session_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = ObjectId::parse_str(identity.user_id())?;
    let session_id = ObjectId::parse_str(session_id.as_str())?;
    let context = SecurityContext::from_request(&req).with_user(identity.user_id());

    state
        .tokens
        .revoke_owned_session(&user_id, &session_id, RevokeReason::UserLogout, context)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("세션이 종료되었습니다")))
}
