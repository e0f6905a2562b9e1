use serde::Serialize;
use crate::domain::entities::sessions::{DeviceType, Session};
use crate::domain::entities::users::{AccountStatus, User};
use crate::utils::time_utils::{to_rfc3339, to_rfc3339_opt};

/// 외부로 노출되는 사용자 표현 (비밀번호 해시와 잠금 카운터 제외)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub cnic: Option<String>,
    pub phone_numbers: Vec<String>,
    pub family_info: Option<serde_json::Value>,
    pub academic_history: Option<serde_json::Value>,
    pub role: String,
    pub institute: Option<String>,
    pub account_status: AccountStatus,
    pub is_active: bool,
    pub is_approved: bool,
    pub last_login_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let User {
            id,
            email,
            username,
            full_name,
            gender,
            date_of_birth,
            cnic,
            phone_numbers,
            family_info,
            academic_history,
            role,
            institute,
            account_status,
            is_active,
            is_approved,
            last_login_at,
            created_at,
            updated_at,
            ..
        } = user;

        Self {
            id: id.map(|id| id.to_hex()).unwrap_or_default(),
            email,
            username,
            full_name,
            gender,
            date_of_birth,
            cnic,
            phone_numbers,
            family_info,
            academic_history,
            role,
            institute: institute.map(|id| id.to_hex()),
            account_status,
            is_active,
            is_approved,
            last_login_at: to_rfc3339_opt(last_login_at),
            created_at: to_rfc3339(created_at),
            updated_at: to_rfc3339(updated_at),
        }
    }
}

/// "활성 기기" 목록 항목
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub device_type: DeviceType,
    pub browser: String,
    pub os: String,
    pub ip_address: Option<String>,
    pub login_method: String,
    pub last_activity: String,
    pub expires_at: String,
    pub created_at: String,
    /// 요청을 보낸 세션 여부
    pub current: bool,
}

impl SessionResponse {
    pub fn from_session(session: Session, current_session_id: Option<&str>) -> Self {
        let id = session.id_string().unwrap_or_default();
        let current = current_session_id == Some(id.as_str());

        Self {
            id,
            device_type: session.device.device_type,
            browser: session.device.browser,
            os: session.device.os,
            ip_address: session.ip_address,
            login_method: session.login_method,
            last_activity: to_rfc3339(session.last_activity),
            expires_at: to_rfc3339(session.expires_at),
            created_at: to_rfc3339(session.created_at),
            current,
        }
    }
}

/// 세션 목록 응답
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionResponse>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}

impl From<Vec<User>> for UserListResponse {
    fn from(users: Vec<User>) -> Self {
        Self { users: users.into_iter().map(UserResponse::from).collect() }
    }
}
