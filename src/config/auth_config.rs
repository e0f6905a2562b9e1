//! # Authentication Configuration Module
//!
//! JWT 토큰, 로그인 잠금, 비밀번호 재설정 등 인증 관련 설정을 관리하는 모듈입니다.
//!
//! 환경 변수는 `JwtConfig`, `SecurityConfig` 의 정적 리더로 읽히고,
//! 시작 시 한 번 [`AuthSettings`] 로 조립되어 검증된 뒤 토큰 서비스와
//! 인증 서비스에 생성자로 주입됩니다. 서비스는 환경 변수를 직접 읽지 않습니다.
//!
//! ## 환경 변수
//!
//! ```bash
//! export JWT_SECRET="$(openssl rand -base64 48)"
//! export JWT_REFRESH_SECRET="$(openssl rand -base64 48)"
//! export JWT_ACCESS_EXPIRE="15m"
//! export JWT_REFRESH_EXPIRE="7d"
//! export JWT_ISSUER="college-auth"
//! export JWT_AUDIENCE="college-app"
//! export MAX_LOGIN_ATTEMPTS="5"
//! export LOCKOUT_TIME="30"            # 분
//! export PASSWORD_RESET_EXPIRE="10"   # 분
//! ```
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::AuthSettings;
//!
//! let settings = AuthSettings::from_env()?;
//! settings.ensure_production_ready()?;   // 운영 환경에서 약한 시크릿이면 시작 실패
//! let tokens = TokenService::new(Arc::new(settings), sessions, users, access, audit);
//! ```

use std::env;
use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha256};
use crate::config::data_config::{Environment, PasswordConfig};
use crate::core::errors::{AppError, AppResult};

/// `JWT_SECRET` 이 없을 때 쓰이는 개발용 기본값
const DEFAULT_JWT_SECRET: &str = "your-secret-key";

/// 운영 환경 시크릿으로 허용되지 않는 값
const PLACEHOLDER_SECRETS: [&str; 6] = [
    DEFAULT_JWT_SECRET,
    "secret",
    "changeme",
    "change-me",
    "your-jwt-secret",
    "your-super-secret-jwt-key",
];

/// 운영 환경 시크릿의 최소 길이 (바이트)
const MIN_SECRET_BYTES: usize = 32;

/// JWT 관련 환경 변수 리더
pub struct JwtConfig;

impl JwtConfig {
    /// 액세스 토큰 서명 시크릿. 설정되지 않았으면 `None`.
    pub fn secret() -> Option<String> {
        env::var("JWT_SECRET").ok().filter(|s| !s.is_empty())
    }

    /// 리프레시 토큰 서명 시크릿. 설정되지 않았으면 `None`.
    pub fn refresh_secret() -> Option<String> {
        env::var("JWT_REFRESH_SECRET").ok().filter(|s| !s.is_empty())
    }

    /// 액세스 토큰 만료 (`15m` 형식). 기본값 15분
    pub fn access_expire() -> String {
        env::var("JWT_ACCESS_EXPIRE").unwrap_or_else(|_| "15m".to_string())
    }

    /// 리프레시 토큰과 세션 만료. 기본값 7일
    pub fn refresh_expire() -> String {
        env::var("JWT_REFRESH_EXPIRE").unwrap_or_else(|_| "7d".to_string())
    }

    pub fn issuer() -> String {
        env::var("JWT_ISSUER").unwrap_or_else(|_| "college-auth".to_string())
    }

    pub fn audience() -> String {
        env::var("JWT_AUDIENCE").unwrap_or_else(|_| "college-app".to_string())
    }
}

/// 로그인 잠금 및 비밀번호 재설정 설정
pub struct SecurityConfig;

impl SecurityConfig {
    /// 잠금까지 허용되는 연속 실패 횟수. 기본값 5
    pub fn max_login_attempts() -> i32 {
        read_positive("MAX_LOGIN_ATTEMPTS", 5)
    }

    /// 잠금 유지 시간 (분). 기본값 30
    pub fn lockout_minutes() -> i64 {
        read_positive("LOCKOUT_TIME", 30)
    }

    /// 재설정 토큰 유효 시간 (분). 기본값 10
    pub fn password_reset_minutes() -> i64 {
        read_positive("PASSWORD_RESET_EXPIRE", 10)
    }
}

fn read_positive<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default + Copy + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) if value > T::default() => value,
            _ => {
                log::warn!("{} 값이 올바르지 않아 기본값 {}을(를) 사용합니다", key, default);
                default
            }
        },
        Err(_) => default,
    }
}

/// 토큰 만료 상한 (10년)
const MAX_EXPIRY_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// `"15m"`, `"7d"`, `"3600"` 같은 만료 표기를 초 단위로 변환합니다.
///
/// 단위: `s`, `m`, `h`, `d`. 숫자만 있으면 초로 봅니다.
pub fn parse_expiry(raw: &str) -> AppResult<i64> {
    let value = raw.trim();
    let invalid = || AppError::ConfigurationError(format!("잘못된 만료 시간 형식입니다: {:?}", raw));

    if value.is_empty() {
        return Err(invalid());
    }

    let (digits, multiplier) = match value.char_indices().last() {
        Some((idx, 's')) => (&value[..idx], 1),
        Some((idx, 'm')) => (&value[..idx], 60),
        Some((idx, 'h')) => (&value[..idx], 60 * 60),
        Some((idx, 'd')) => (&value[..idx], 24 * 60 * 60),
        _ => (value, 1),
    };

    let amount: i64 = digits.parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }

    match amount.checked_mul(multiplier) {
        Some(secs) if secs <= MAX_EXPIRY_SECS => Ok(secs),
        _ => Err(invalid()),
    }
}

/// 시작 시 한 번 조립되어 서비스에 주입되는 인증 설정
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    /// `JWT_SECRET` 이 설정되지 않아 개발용 기본값을 쓰는 중인지
    pub access_secret_defaulted: bool,
    /// `JWT_REFRESH_SECRET` 없이 액세스 시크릿에서 파생했는지
    pub refresh_secret_derived: bool,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub issuer: String,
    pub audience: String,
    pub bcrypt_cost: u32,
    pub max_login_attempts: i32,
    pub lockout_minutes: i64,
    pub password_reset_minutes: i64,
    pub environment: Environment,
}

impl AuthSettings {
    /// 환경 변수에서 설정을 읽어 조립합니다.
    ///
    /// 만료 표기가 잘못되었으면 `ConfigurationError` 로 실패합니다.
    pub fn from_env() -> AppResult<Self> {
        let environment = Environment::current();

        let (access_secret, access_secret_defaulted) = match JwtConfig::secret() {
            Some(secret) => (secret, false),
            None => {
                log::warn!("JWT_SECRET not set, using default (not secure for production!)");
                (DEFAULT_JWT_SECRET.to_string(), true)
            }
        };

        let (refresh_secret, refresh_secret_derived) = match JwtConfig::refresh_secret() {
            Some(secret) => (secret, false),
            None => {
                log::warn!("JWT_REFRESH_SECRET 이 없어 JWT_SECRET 에서 파생합니다");
                (derive_refresh_secret(&access_secret), true)
            }
        };

        Ok(Self {
            access_secret,
            refresh_secret,
            access_secret_defaulted,
            refresh_secret_derived,
            access_ttl_secs: parse_expiry(&JwtConfig::access_expire())?,
            refresh_ttl_secs: parse_expiry(&JwtConfig::refresh_expire())?,
            issuer: JwtConfig::issuer(),
            audience: JwtConfig::audience(),
            bcrypt_cost: PasswordConfig::bcrypt_cost(),
            max_login_attempts: SecurityConfig::max_login_attempts(),
            lockout_minutes: SecurityConfig::lockout_minutes(),
            password_reset_minutes: SecurityConfig::password_reset_minutes(),
            environment,
        })
    }

    /// 운영 환경에서 안전하지 않은 시크릿 구성이면 시작을 거부합니다.
    ///
    /// 운영 환경이 아니면 항상 통과합니다.
    pub fn ensure_production_ready(&self) -> AppResult<()> {
        if !self.environment.is_production() {
            return Ok(());
        }

        if self.access_secret_defaulted {
            return Err(AppError::ConfigurationError(
                "운영 환경에서는 JWT_SECRET 이 반드시 설정되어야 합니다".to_string(),
            ));
        }

        if is_weak_secret(&self.access_secret) {
            return Err(AppError::ConfigurationError(format!(
                "JWT_SECRET 이 너무 약합니다 (최소 {}바이트, 예시 값 사용 불가)",
                MIN_SECRET_BYTES
            )));
        }

        if self.refresh_secret_derived {
            return Err(AppError::ConfigurationError(
                "운영 환경에서는 JWT_REFRESH_SECRET 을 별도로 설정해야 합니다".to_string(),
            ));
        }

        if is_weak_secret(&self.refresh_secret) || self.refresh_secret == self.access_secret {
            return Err(AppError::ConfigurationError(
                "JWT_REFRESH_SECRET 이 너무 약하거나 JWT_SECRET 과 같습니다".to_string(),
            ));
        }

        Ok(())
    }

    pub fn lockout_millis(&self) -> i64 {
        self.lockout_minutes.saturating_mul(60 * 1000)
    }

    pub fn password_reset_secs(&self) -> i64 {
        self.password_reset_minutes * 60
    }
}

fn is_weak_secret(secret: &str) -> bool {
    secret.len() < MIN_SECRET_BYTES
        || PLACEHOLDER_SECRETS
            .iter()
            .any(|placeholder| secret.eq_ignore_ascii_case(placeholder))
}

fn derive_refresh_secret(access_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"refresh:");
    hasher.update(access_secret.as_bytes());
    general_purpose::STANDARD.encode(hasher.finalize())
}

#[cfg(test)]
pub(crate) fn test_settings() -> AuthSettings {
    AuthSettings {
        access_secret: "test-access-secret-0123456789abcdef".to_string(),
        refresh_secret: "test-refresh-secret-0123456789abcdef".to_string(),
        access_secret_defaulted: false,
        refresh_secret_derived: false,
        access_ttl_secs: 15 * 60,
        refresh_ttl_secs: 7 * 24 * 60 * 60,
        issuer: "college-auth".to_string(),
        audience: "college-app".to_string(),
        bcrypt_cost: 4,
        max_login_attempts: 5,
        lockout_minutes: 30,
        password_reset_minutes: 10,
        environment: Environment::Test,
    }
}
