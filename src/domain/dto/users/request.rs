//! 사용자 요청 DTO

use serde::Deserialize;
use serde_json::{Map, Value};
use crate::core::AppError;
use crate::domain::entities::users::{AccountStatus, ProfileUpdate};
use crate::utils::string_utils::{clean_optional_string, validate_required_string};

/// 프로필 채널로 바꿀 수 있는 필드 (JSON 이름)
const PROFILE_FIELDS: [&str; 6] = [
    "fullName",
    "gender",
    "dateOfBirth",
    "phoneNumbers",
    "familyInfo",
    "academicHistory",
];

/// 프로필 수정 요청
///
/// 임의의 JSON 객체를 받아 허용된 필드만 [`ProfileUpdate`]로 옮기고,
/// 나머지 키(password, email, username, role, isActive, isApproved 등)는
/// 버린 뒤 그 이름을 `stripped` 에 남깁니다.
#[derive(Debug)]
pub struct ProfileUpdateRequest {
    pub update: ProfileUpdate,
    pub stripped: Vec<String>,
}

impl ProfileUpdateRequest {
    pub fn from_payload(payload: Map<String, Value>) -> Result<Self, AppError> {
        let mut update = ProfileUpdate::default();
        let mut stripped = Vec::new();

        for (key, value) in payload {
            if !PROFILE_FIELDS.contains(&key.as_str()) {
                stripped.push(key);
                continue;
            }

            match key.as_str() {
                "fullName" => {
                    let name = expect_string(&key, value)?;
                    update.full_name = Some(validate_required_string(&name, "fullName")?);
                }
                "gender" => update.gender = clean_optional_string(Some(expect_string(&key, value)?)),
                "dateOfBirth" => {
                    update.date_of_birth = clean_optional_string(Some(expect_string(&key, value)?))
                }
                "phoneNumbers" => {
                    let numbers: Vec<String> = serde_json::from_value(value).map_err(|_| {
                        AppError::ValidationError("phoneNumbers 는 문자열 배열이어야 합니다".to_string())
                    })?;
                    update.phone_numbers = Some(numbers);
                }
                "familyInfo" => update.family_info = Some(value),
                _ => update.academic_history = Some(value),
            }
        }

        Ok(Self { update, stripped })
    }
}

fn expect_string(key: &str, value: Value) -> Result<String, AppError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(AppError::ValidationError(format!("{} 는 문자열이어야 합니다", key))),
    }
}

/// 관리자 계정 상태 변경 요청
#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: AccountStatus,
}
