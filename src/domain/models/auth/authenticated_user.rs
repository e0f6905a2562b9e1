use std::future::{ready, Ready};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use crate::core::AppError;
use crate::domain::entities::sessions::Session;
use crate::domain::entities::users::User;
use crate::domain::models::token::AccessClaims;

/// 인증 미들웨어가 요청 확장 영역에 붙이는 신원 정보
///
/// 토큰 클레임만이 아니라 세션 검증 시점에 저장소에서 다시 읽은
/// 사용자와 세션을 함께 담습니다.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub session: Session,
    pub claims: AccessClaims,
}

impl AuthenticatedUser {
    /// 사용자 ID (MongoDB ObjectId 문자열)
    pub fn user_id(&self) -> String {
        self.user.id_string().unwrap_or_else(|| self.claims.user_id.clone())
    }

    pub fn session_id(&self) -> String {
        self.session.id_string().unwrap_or_else(|| self.claims.session_id.clone())
    }

    pub fn role(&self) -> &str {
        &self.user.role
    }

    /// 특정 역할을 보유하고 있는지 확인
    pub fn has_role(&self, role: &str) -> bool {
        self.user.role == role
    }
}

/// ActixWeb FromRequest trait 구현
impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<actix_web::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AppError::unauthorized(
                "AUTHENTICATION_REQUIRED",
                "인증되지 않은 요청입니다",
            )
            .into())),
        }
    }
}

/// 선택적 인증 사용자 추출자
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl FromRequest for OptionalUser {
    type Error = Error;
    type Future = Ready<actix_web::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        ready(Ok(OptionalUser(user)))
    }
}
