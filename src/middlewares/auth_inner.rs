//! AuthMiddleware 인증 로직의 핵심적인 기능
use std::rc::Rc;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, Error, HttpMessage, ResponseError};
use futures_util::future::LocalBoxFuture;
use serde_json::json;
use crate::core::{AppError, AppResult, AppState};
use crate::domain::entities::audit::SecurityEventKind;
use crate::domain::models::auth::{AuthMode, AuthenticatedUser};
use crate::services::audit::SecurityContext;
use crate::services::auth::TokenService;

/// 실제 인증 로직을 수행하는 서비스
pub struct AuthMiddlewareService<S> {
    pub service: Rc<S>,
    pub mode: AuthMode,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let mode = self.mode.clone();
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let Some(state) = state else {
                log::error!("AppState 가 등록되지 않았습니다");
                let err = AppError::InternalError("AppState missing".to_string());
                return Ok(req.error_response(err).map_into_right_body());
            };

            let result = authenticate(&req, &state).await;
            match (&mode, result) {
                (_, Ok(identity)) => {
                    // 활동 시각 갱신은 응답을 기다리게 하지 않음
                    if let Some(session_id) = identity.session.id {
                        let sessions = state.sessions.clone();
                        actix_web::rt::spawn(async move {
                            if let Err(e) = sessions.update_activity(&session_id).await {
                                log::warn!("세션 활동 시각 갱신 실패: {}", e);
                            }
                        });
                    }
                    log::debug!("인증 성공: 사용자 ID {}", identity.user_id());
                    req.extensions_mut().insert(identity);
                }
                (AuthMode::Required, Err(err)) => {
                    let kind = if err.code() == "INVALID_SESSION" {
                        SecurityEventKind::InvalidSession
                    } else {
                        SecurityEventKind::AuthenticationFailed
                    };
                    let context = SecurityContext::from_request(req.request())
                        .with_details(json!({ "code": err.code() }));
                    state.audit.record_security_event(kind, context).await;

                    let (req, _) = req.into_parts();
                    let res = ServiceResponse::new(req, err.error_response()).map_into_right_body();
                    return Ok(res);
                }
                (AuthMode::Optional, Err(err)) => {
                    log::debug!("선택적 인증: {} - 인증 없이 진행", err.code());
                }
            }

            // 다음 서비스로 요청 전달
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// 헤더의 액세스 토큰을 검증하고 세션 상태까지 확인
async fn authenticate(req: &ServiceRequest, state: &AppState) -> AppResult<AuthenticatedUser> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("NO_TOKEN", "인증 토큰이 없습니다"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("INVALID_TOKEN_FORMAT", "유효하지 않은 인증 헤더 형식입니다"))?;

    let token = TokenService::extract_bearer_token(auth_header)?;
    let claims = state.tokens.verify_access(token)?;

    let validation = state.tokens.validate_session(&claims).await?;
    match (validation.valid, validation.session, validation.user) {
        (true, Some(session), Some(user)) => Ok(AuthenticatedUser { user, session, claims }),
        _ => {
            let reason = validation
                .reason
                .map(|r| r.message())
                .unwrap_or("Invalid session");
            log::debug!("세션 검증 실패 - session: {}, reason: {}", claims.session_id, reason);

            let message = if state.settings.environment.is_production() {
                "세션이 유효하지 않습니다"
            } else {
                reason
            };
            Err(AppError::unauthorized("INVALID_SESSION", message))
        }
    }
}
