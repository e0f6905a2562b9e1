use serde::Serialize;
use crate::domain::dto::users::response::UserResponse;
use crate::domain::models::token::IssuedTokens;

#[derive(Debug, Serialize)]
pub struct SessionRef {
    pub id: String,
}

/// 로그인 성공 응답
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub tokens: IssuedTokens,
    pub session: SessionRef,
}

impl LoginResponse {
    pub fn new(user: UserResponse, tokens: IssuedTokens) -> Self {
        let session = SessionRef { id: tokens.session_id.clone() };
        Self { user, tokens, session }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub status: &'static str,
}

/// 비밀번호 재설정 요청 응답
///
/// 재설정 토큰은 운영 환경에서는 응답에 포함되지 않습니다.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
}
