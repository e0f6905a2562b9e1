//! # Application Error Handling System
//!
//! 통합 에러 처리 시스템입니다. 도메인 에러는 라우트 경계에서
//! `{success: false, message, code}` 응답 봉투로 변환됩니다.
//!
//! ## HTTP 응답 매핑
//!
//! | AppError | HTTP Status | code |
//! |----------|-------------|------|
//! | `ValidationError` | 400 | `VALIDATION_ERROR` |
//! | `WeakPassword` | 400 | `WEAK_PASSWORD` |
//! | `DuplicateCredential` | 400 | `USER_EXISTS` |
//! | `DuplicateField` | 400 | `DUPLICATE_FIELD` |
//! | `InvalidResetToken` | 400 | `INVALID_TOKEN` |
//! | `InvalidCurrentPassword` | 400 | `INVALID_CURRENT_PASSWORD` |
//! | `AuthenticationError` | 401 | 호출자가 지정 |
//! | `AccountInactive` | 403 | `ACCOUNT_INACTIVE` |
//! | `AuthorizationError` | 403 | 호출자가 지정 |
//! | `NotFound` | 404 | `NOT_FOUND` |
//! | `ConflictError` | 409 | `CONFLICT` |
//! | `AccountLocked` | 423 | `ACCOUNT_LOCKED` |
//! | 나머지 | 500 | 일반 메시지만 노출 |
//!
//! ## 사용 패턴
//!
//! ```rust,ignore
//! use crate::core::errors::AppError;
//!
//! #[post("/login")]
//! async fn login(payload: web::Json<LoginRequest>) -> Result<HttpResponse, AppError> {
//!     payload.validate()?;                       // ValidationErrors → 400
//!     let user = users.authenticate(&payload.login, &payload.password).await?;
//!     Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
//! }
//! ```

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;
use crate::domain::entities::users::CredentialField;
use crate::domain::models::password::PasswordViolations;
use crate::domain::models::token::TokenError;

/// 클라이언트에 노출되는 500 응답 메시지
const INTERNAL_MESSAGE: &str = "서버 내부 오류가 발생했습니다";

/// 애플리케이션 전역 에러 타입
///
/// `thiserror` 로 `Error` trait 을 구현하고 `actix_web::ResponseError` 를 통해
/// HTTP 응답으로 자동 변환됩니다.
///
/// ## 에러 카테고리
///
/// - 인프라: `DatabaseError`, `RedisError`, `ConfigurationError`, `InternalError`
/// - 입력: `ValidationError`, `WeakPassword`, `DuplicateCredential`, `DuplicateField`
/// - 보안: `AuthenticationError`, `AuthorizationError`, `AccountLocked`, `AccountInactive`
#[derive(Error, Debug)]
pub enum AppError {
    /// MongoDB 연산 실패
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Redis 연산 실패
    #[error("Redis error: {0}")]
    RedisError(String),

    /// 입력값 검증 에러
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 비밀번호 정책 위반. 모든 위반 사유를 함께 담습니다.
    #[error("Weak password: {0}")]
    WeakPassword(PasswordViolations),

    /// email, username, cnic 중복
    #[error("Duplicate credential: {}", .0.as_str())]
    DuplicateCredential(CredentialField),

    /// 그 밖의 고유 인덱스 위반
    #[error("Duplicate field: {0}")]
    DuplicateField(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    ConflictError(String),

    /// 401. `code` 는 `NO_TOKEN`, `INVALID_SESSION` 같은 기계 판독용 코드
    #[error("Authentication error ({code}): {message}")]
    AuthenticationError { code: &'static str, message: String },

    /// 403. `code` 는 `INSUFFICIENT_ROLE`, `RESOURCE_ACCESS_DENIED` 등
    #[error("Authorization error ({code}): {message}")]
    AuthorizationError { code: &'static str, message: String },

    /// 423
    #[error("Account locked")]
    AccountLocked,

    #[error("Account inactive")]
    AccountInactive,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Invalid current password")]
    InvalidCurrentPassword,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        AppError::AuthenticationError { code, message: message.into() }
    }

    pub fn forbidden(code: &'static str, message: impl Into<String>) -> Self {
        AppError::AuthorizationError { code, message: message.into() }
    }

    /// 응답 본문의 `code`
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::RedisError(_) => "CACHE_ERROR",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::WeakPassword(_) => "WEAK_PASSWORD",
            AppError::DuplicateCredential(_) => "USER_EXISTS",
            AppError::DuplicateField(_) => "DUPLICATE_FIELD",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ConflictError(_) => "CONFLICT",
            AppError::AuthenticationError { code, .. } => code,
            AppError::AuthorizationError { code, .. } => code,
            AppError::AccountLocked => "ACCOUNT_LOCKED",
            AppError::AccountInactive => "ACCOUNT_INACTIVE",
            AppError::InvalidResetToken => "INVALID_TOKEN",
            AppError::InvalidCurrentPassword => "INVALID_CURRENT_PASSWORD",
            AppError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// 클라이언트에 보여도 되는 메시지. 5xx 는 내부 정보를 숨깁니다.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::ConflictError(msg) => msg.clone(),
            AppError::WeakPassword(violations) => {
                format!("비밀번호 정책을 만족하지 않습니다: {}", violations)
            }
            AppError::DuplicateCredential(field) => {
                format!("이미 사용 중인 {} 입니다", field.as_str())
            }
            AppError::DuplicateField(field) => format!("중복된 값입니다: {}", field),
            AppError::AuthenticationError { message, .. }
            | AppError::AuthorizationError { message, .. } => message.clone(),
            AppError::AccountLocked => {
                "로그인 시도 횟수를 초과하여 계정이 일시적으로 잠겼습니다".to_string()
            }
            AppError::AccountInactive => "활성화되지 않은 계정입니다".to_string(),
            AppError::InvalidResetToken => "유효하지 않거나 만료된 재설정 토큰입니다".to_string(),
            AppError::InvalidCurrentPassword => "현재 비밀번호가 올바르지 않습니다".to_string(),
            AppError::DatabaseError(_)
            | AppError::RedisError(_)
            | AppError::ConfigurationError(_)
            | AppError::InternalError(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::WeakPassword(_)
            | AppError::DuplicateCredential(_)
            | AppError::DuplicateField(_)
            | AppError::InvalidResetToken
            | AppError::InvalidCurrentPassword => StatusCode::BAD_REQUEST,
            AppError::AuthenticationError { .. } => StatusCode::UNAUTHORIZED,
            AppError::AccountInactive | AppError::AuthorizationError { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            AppError::AccountLocked => StatusCode::LOCKED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 에러를 `{success, message, code}` JSON 응답으로 변환합니다.
    ///
    /// 5xx 의 상세 내용은 서버 로그에만 남깁니다.
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("❌ 처리되지 않은 서버 오류: {}", self);
        }

        let mut body = json!({
            "success": false,
            "message": self.public_message(),
            "code": self.code(),
        });

        match self {
            AppError::WeakPassword(violations) => {
                body["violations"] = json!(violations.codes());
            }
            AppError::DuplicateCredential(field) => {
                body["field"] = json!(field.as_str());
            }
            _ => {}
        }

        HttpResponse::build(status).json(body)
    }
}

/// 중복 키 에러 코드
const DUPLICATE_KEY_CODE: i32 = 11000;

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};

        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write_error))
                if write_error.code == DUPLICATE_KEY_CODE =>
            {
                AppError::DuplicateField(write_error.message.clone())
            }
            _ => AppError::DatabaseError(err.to_string()),
        }
    }
}

impl From<mongodb::bson::oid::Error> for AppError {
    fn from(_: mongodb::bson::oid::Error) -> Self {
        AppError::ValidationError("잘못된 ID 형식입니다".to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::RedisError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        AppError::InternalError(format!("블로킹 작업 실패: {}", err))
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::unauthorized("TOKEN_EXPIRED", err.to_string()),
            TokenError::Signing(msg) => AppError::InternalError(format!("JWT 토큰 생성 실패: {}", msg)),
            other => AppError::unauthorized("INVALID_TOKEN", other.to_string()),
        }
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
///
/// ```rust,ignore
/// use crate::core::errors::ErrorContext;
///
/// let hash = bcrypt::hash(password, cost).context("비밀번호 해싱 실패")?;
/// ```
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}
