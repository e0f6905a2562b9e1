//! JWT 인증 미들웨어
//!
//! ActixWeb 요청 파이프라인에서 액세스 토큰과 서버 측 세션을 검증하고
//! [`AuthenticatedUser`](crate::domain::models::auth::AuthenticatedUser)를
//! 요청 확장 영역에 붙입니다.
//!
//! | 실패 | 응답 |
//! |------|------|
//! | Authorization 헤더 없음 | 401 `NO_TOKEN` |
//! | `Bearer ` 형식이 아님 | 401 `INVALID_TOKEN_FORMAT` |
//! | 만료 | 401 `TOKEN_EXPIRED` |
//! | 서명/발급자/대상/종류 불일치 | 401 `INVALID_TOKEN` |
//! | 세션 폐기, 버전 불일치, 계정 비활성 | 401 `INVALID_SESSION` |

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, Result,
    body::EitherBody,
};
use crate::domain::models::auth::AuthMode;
use crate::middlewares::auth_inner::AuthMiddlewareService;

/// JWT 인증 미들웨어
pub struct AuthMiddleware {
    /// 인증 모드 (Required/Optional)
    mode: AuthMode,
}

impl AuthMiddleware {
    pub fn new(mode: AuthMode) -> Self {
        Self { mode }
    }

    /// 필수 인증 미들웨어 생성
    pub fn required() -> Self {
        Self::new(AuthMode::Required)
    }

    /// 선택적 인증 미들웨어 생성 (실패해도 인증 없이 진행)
    pub fn optional() -> Self {
        Self::new(AuthMode::Optional)
    }
}

/// ActixWeb Transform trait 구현
impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            mode: self.mode.clone(),
        }))
    }
}
