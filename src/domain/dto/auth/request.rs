//! 인증 요청 DTO
//!
//! 클라이언트 JSON 은 camelCase 필드명을 사용합니다.
//! 비밀번호 복잡도는 여기서 검사하지 않고 비밀번호 정책 엔진이
//! 위반 코드 목록으로 판정합니다.

use serde::Deserialize;
use validator::{Validate, ValidationError};
use crate::domain::entities::access_control::role_names;
use crate::utils::string_utils::deserialize_optional_string;

/// 회원가입 요청
///
/// ```json
/// {
///   "email": "a@x.com",
///   "username": "alice",
///   "password": "Gr8!Velvet#Moon",
///   "fullName": "Alice Kim",
///   "cnic": "11111-1111111-1",
///   "role": "student",
///   "phoneNumbers": ["+82-10-0000-0000"]
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    #[validate(length(
        min = 3,
        max = 30,
        message = "사용자명은 3-30자 사이여야 합니다"
    ))]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,

    #[serde(default)]
    pub phone_numbers: Vec<String>,

    #[validate(length(
        min = 1,
        max = 100,
        message = "이름은 1-100자 사이여야 합니다"
    ))]
    pub full_name: String,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub gender: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub date_of_birth: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(custom(function = "validate_cnic"))]
    pub cnic: Option<String>,

    #[validate(custom(function = "validate_self_registrable_role"))]
    pub role: String,

    #[serde(default)]
    pub family_info: Option<serde_json::Value>,

    #[serde(default)]
    pub academic_history: Option<serde_json::Value>,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    // 알파벳, 숫자, 언더스코어, 점만 허용
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.') {
        return Err(ValidationError::new("invalid_username")
            .with_message("사용자명은 알파벳, 숫자, 언더스코어, 점만 사용 가능합니다".into()));
    }
    Ok(())
}

/// `#####-#######-#` 형식
fn validate_cnic(cnic: &str) -> Result<(), ValidationError> {
    let parts: Vec<&str> = cnic.split('-').collect();
    let well_formed = parts.len() == 3
        && parts[0].len() == 5
        && parts[1].len() == 7
        && parts[2].len() == 1
        && parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit()));

    if !well_formed {
        return Err(ValidationError::new("invalid_cnic")
            .with_message("CNIC 형식은 #####-#######-# 이어야 합니다".into()));
    }
    Ok(())
}

fn validate_self_registrable_role(role: &str) -> Result<(), ValidationError> {
    if !role_names::SELF_REGISTRABLE.contains(&role) {
        return Err(ValidationError::new("invalid_role")
            .with_message("회원가입으로 선택할 수 없는 역할입니다".into()));
    }
    Ok(())
}

/// 로그인 요청 (`login` 은 이메일 또는 사용자명)
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "이메일 또는 사용자명을 입력해주세요"))]
    pub login: String,

    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
}

/// 리프레시 토큰 요청 구조체
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "리프레시 토큰이 필요합니다"))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "새 비밀번호를 입력해주세요"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "현재 비밀번호를 입력해주세요"))]
    pub current_password: String,

    #[validate(length(min = 1, message = "새 비밀번호를 입력해주세요"))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_json(role: &str, cnic: &str) -> String {
        format!(
            r#"{{
                "email": "a@x.com",
                "username": "alice",
                "password": "Gr8!Velvet#Moon",
                "fullName": "Alice",
                "cnic": "{}",
                "role": "{}"
            }}"#,
            cnic, role
        )
    }

    #[test]
    fn test_register_request_accepts_valid_payload() {
        let req: RegisterRequest = serde_json::from_str(&register_json("student", "11111-1111111-1")).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.phone_numbers.is_empty());
    }

    #[test]
    fn test_register_request_rejects_admin_role() {
        let req: RegisterRequest = serde_json::from_str(&register_json("admin", "11111-1111111-1")).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("role"));
    }

    #[test]
    fn test_register_request_rejects_malformed_cnic() {
        let req: RegisterRequest = serde_json::from_str(&register_json("student", "1111-11")).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("cnic"));
    }

    #[test]
    fn test_missing_refresh_token_fails_validation() {
        let req: RefreshRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_err());
    }
}
