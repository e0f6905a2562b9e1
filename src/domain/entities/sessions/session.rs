//! Session Entity
//!
//! 리프레시 토큰 하나에 대응하는 서버 측 세션 레코드입니다.
//! `access_token_version` 은 발급된 액세스 토큰의 유효 세대를 나타내며,
//! 토큰에 포함된 버전과 다르면 해당 토큰은 만료 전이라도 거부됩니다.

use base64::{engine::general_purpose, Engine as _};
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use crate::utils::time_utils::after;

/// 세션 발급 단계
///
/// 세션 ID 가 있어야 리프레시 토큰을 서명할 수 있으므로 세션은
/// 자리표시자 값으로 먼저 저장(Provisional)되고, 실제 토큰 다이제스트가
/// 기록된 뒤에야 Issued 로 전이됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssuanceState {
    Provisional,
    Issued,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevokeReason {
    UserLogout,
    AdminRevoked,
    SecurityBreach,
    TokenRefresh,
    AccountDeactivated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

/// User-Agent 에서 추정한 단말 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub device_type: DeviceType,
    pub browser: String,
    pub os: String,
}

impl DeviceInfo {
    /// 부분 문자열 휴리스틱으로 단말 종류, 브라우저, OS 를 판별합니다.
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let ua = user_agent.unwrap_or_default();

        let device_type = if ua.contains("iPad") || ua.contains("Tablet") {
            DeviceType::Tablet
        } else if ua.contains("Mobile") || ua.contains("Android") || ua.contains("iPhone") {
            DeviceType::Mobile
        } else {
            DeviceType::Desktop
        };

        let browser = if ua.contains("Edg") {
            "Edge"
        } else if ua.contains("OPR") || ua.contains("Opera") {
            "Opera"
        } else if ua.contains("Chrome") {
            "Chrome"
        } else if ua.contains("Firefox") {
            "Firefox"
        } else if ua.contains("Safari") {
            "Safari"
        } else {
            "Unknown"
        };

        let os = if ua.contains("Windows") {
            "Windows"
        } else if ua.contains("Android") {
            "Android"
        } else if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iOS") {
            "iOS"
        } else if ua.contains("Mac OS") {
            "macOS"
        } else if ua.contains("Linux") {
            "Linux"
        } else {
            "Unknown"
        };

        Self {
            user_agent: user_agent.map(str::to_string),
            device_type,
            browser: browser.to_string(),
            os: os.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// 세션 엔티티
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    /// 리프레시 토큰의 SHA-256 다이제스트 (Provisional 상태에서는 자리표시자)
    pub refresh_token: String,
    pub issuance: IssuanceState,
    pub access_token_version: i64,
    pub device: DeviceInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    pub login_method: String,
    pub is_active: bool,
    pub is_revoked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_reason: Option<RevokeReason>,
    pub last_activity: DateTime,
    pub expires_at: DateTime,
    pub created_at: DateTime,
}

impl Session {
    /// 자리표시자 리프레시 값을 가진 Provisional 세션
    pub fn new_provisional(
        user: ObjectId,
        device: DeviceInfo,
        ip_address: Option<String>,
        login_method: &str,
        lifetime_secs: i64,
    ) -> Self {
        let now = DateTime::now();

        Self {
            id: None,
            user,
            refresh_token: format!("provisional:{}", Uuid::new_v4()),
            issuance: IssuanceState::Provisional,
            access_token_version: 0,
            device,
            ip_address,
            location: None,
            login_method: login_method.to_string(),
            is_active: true,
            is_revoked: false,
            revoked_at: None,
            revoked_reason: None,
            last_activity: now,
            expires_at: after(now, lifetime_secs),
            created_at: now,
        }
    }

    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    /// 발급 완료 ∧ 활성 ∧ 미폐기 ∧ 미만료
    pub fn is_live_at(&self, now: DateTime) -> bool {
        self.issuance == IssuanceState::Issued
            && self.is_active
            && !self.is_revoked
            && self.expires_at > now
    }

    pub fn is_live(&self) -> bool {
        self.is_live_at(DateTime::now())
    }

    pub fn is_current_for(&self, token_version: i64) -> bool {
        self.access_token_version == token_version
    }

    /// 폐기 처리. 이미 폐기된 세션이면 아무것도 바꾸지 않고 `false`.
    pub fn revoke_at(&mut self, reason: RevokeReason, now: DateTime) -> bool {
        if self.is_revoked {
            return false;
        }
        self.is_revoked = true;
        self.is_active = false;
        self.revoked_at = Some(now);
        self.revoked_reason = Some(reason);
        true
    }
}

/// 저장용 리프레시 토큰 다이제스트
pub fn digest_token(token: &str) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}
