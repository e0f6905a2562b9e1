//! JWT 클레임과 토큰 발급 결과 모델
//!
//! 액세스 토큰과 리프레시 토큰은 서로 다른 시크릿으로 서명되며,
//! 같은 발급 단위의 두 토큰은 항상 같은 `sessionId`/`tokenVersion` 을 가집니다.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::entities::sessions::Session;
use crate::domain::entities::users::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// 두 종류의 클레임에 공통인 접근자
pub trait TypedClaims {
    fn token_type(&self) -> TokenType;
}

/// 액세스 토큰 클레임
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub user_id: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub session_id: String,
    pub token_version: i64,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub iss: String,
    pub aud: String,
    /// 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// 만료 시간 (Unix timestamp)
    pub exp: i64,
}

impl TypedClaims for AccessClaims {
    fn token_type(&self) -> TokenType {
        self.token_type
    }
}

/// 리프레시 토큰 클레임
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub user_id: String,
    pub session_id: String,
    pub token_version: i64,
    /// 토큰마다 고유한 식별자
    pub jti: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl TypedClaims for RefreshClaims {
    fn token_type(&self) -> TokenType {
        self.token_type
    }
}

/// 토큰 검증 실패 종류
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("토큰 대상(audience)이 올바르지 않습니다")]
    InvalidAudience,
    #[error("토큰 발급자(issuer)가 올바르지 않습니다")]
    InvalidIssuer,
    #[error("토큰 종류가 올바르지 않습니다")]
    WrongType,
    #[error("유효하지 않은 토큰입니다")]
    Malformed,
    #[error("토큰 서명 실패: {0}")]
    Signing(String),
}

/// 로그인 시 세션 생성에 쓰이는 요청 문맥
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub login_method: String,
}

/// 로그인 결과로 클라이언트에 전달되는 토큰 묶음
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(skip)]
    pub session_id: String,
    /// 액세스 토큰 만료까지 남은 시간 (초)
    pub expires_in: i64,
}

/// 갱신 결과
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInvalidReason {
    SessionNotFound,
    SessionNotLive,
    VersionMismatch,
    UserInactive,
    PasswordChanged,
}

impl SessionInvalidReason {
    pub fn message(&self) -> &'static str {
        match self {
            SessionInvalidReason::SessionNotFound => "Session not found",
            SessionInvalidReason::SessionNotLive => "Session expired or revoked",
            SessionInvalidReason::VersionMismatch => "Token version mismatch",
            SessionInvalidReason::UserInactive => "User inactive",
            SessionInvalidReason::PasswordChanged => "Password changed after token issuance",
        }
    }
}

/// `validate_session` 결과
#[derive(Debug, Clone)]
pub struct SessionValidation {
    pub valid: bool,
    pub session: Option<Session>,
    pub user: Option<User>,
    pub reason: Option<SessionInvalidReason>,
}

impl SessionValidation {
    pub fn valid(session: Session, user: User) -> Self {
        Self {
            valid: true,
            session: Some(session),
            user: Some(user),
            reason: None,
        }
    }

    pub fn invalid(reason: SessionInvalidReason) -> Self {
        Self {
            valid: false,
            session: None,
            user: None,
            reason: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_claims_wire_names() {
        let claims = AccessClaims {
            user_id: "u1".to_string(),
            role: "student".to_string(),
            permissions: vec!["users:read".to_string()],
            session_id: "s1".to_string(),
            token_version: 0,
            token_type: TokenType::Access,
            iss: "college-auth".to_string(),
            aud: "college-app".to_string(),
            iat: 1,
            exp: 2,
        };

        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["sessionId"], "s1");
        assert_eq!(value["tokenVersion"], 0);
        assert_eq!(value["type"], "access");
    }
}
