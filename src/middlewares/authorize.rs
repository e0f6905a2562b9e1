//! 인가 미들웨어
//!
//! [`AuthMiddleware`](super::AuthMiddleware) 뒤에서 실행되며 요청 확장 영역의
//! 인증 사용자에게 [`AccessRule`] 을 적용합니다. 경로 파라미터를 쓰는 규칙은
//! 파라미터가 매칭된 리소스에 걸어야 합니다.
//!
//! ```rust,ignore
//! web::scope("/api/admin")
//!     .wrap(Authorize::roles(&["admin", "super_admin"]))
//!     .wrap(AuthMiddleware::required())   // 마지막에 등록한 미들웨어가 먼저 실행
//!
//! web::resource("/{userId}/sessions")
//!     .wrap(Authorize::resource_ownership("userId"))
//! ```

use std::future::{ready, Ready};
use std::rc::Rc;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, HttpMessage, ResponseError};
use futures_util::future::LocalBoxFuture;
use crate::core::{AppError, AppState};
use crate::domain::models::auth::{AccessRule, AuthenticatedUser};
use crate::services::audit::SecurityContext;

pub struct Authorize {
    rule: AccessRule,
}

impl Authorize {
    pub fn new(rule: AccessRule) -> Self {
        Self { rule }
    }

    pub fn roles(roles: &[&str]) -> Self {
        Self::new(AccessRule::Role(roles.iter().map(|r| r.to_string()).collect()))
    }

    pub fn permission(name: &str, scope: Option<&str>) -> Self {
        Self::new(AccessRule::Permission {
            name: name.to_string(),
            scope: scope.map(str::to_string),
        })
    }

    pub fn any_permission(names: &[&str]) -> Self {
        Self::new(AccessRule::AnyPermission(names.iter().map(|n| n.to_string()).collect()))
    }

    pub fn institute_access(param: &str) -> Self {
        Self::new(AccessRule::InstituteAccess { param: param.to_string() })
    }

    pub fn resource_ownership(param: &str) -> Self {
        Self::new(AccessRule::ResourceOwnership { param: param.to_string() })
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authorize
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthorizeService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizeService {
            service: Rc::new(service),
            rule: Rc::new(self.rule.clone()),
        }))
    }
}

pub struct AuthorizeService<S> {
    service: Rc<S>,
    rule: Rc<AccessRule>,
}

impl<S, B> Service<ServiceRequest> for AuthorizeService<S>
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
        let rule = self.rule.clone();
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let identity = req.extensions().get::<AuthenticatedUser>().cloned();
        let path_value = rule
            .path_param()
            .and_then(|param| req.match_info().get(param))
            .map(str::to_string);

        Box::pin(async move {
            let Some(state) = state else {
                log::error!("AppState 가 등록되지 않았습니다");
                let err = AppError::InternalError("AppState missing".to_string());
                return Ok(req.error_response(err).map_into_right_body());
            };
            let Some(identity) = identity else {
                let err = AppError::unauthorized("AUTHENTICATION_REQUIRED", "인증되지 않은 요청입니다");
                return Ok(req.error_response(err).map_into_right_body());
            };

            let context = SecurityContext::from_request(req.request());
            if let Err(err) = state
                .authorization
                .check(&identity, &rule, path_value.as_deref(), context)
                .await
            {
                let (req, _) = req.into_parts();
                let res = ServiceResponse::new(req, err.error_response()).map_into_right_body();
                return Ok(res);
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
