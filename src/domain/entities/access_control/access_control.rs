//! 역할/권한 통합 엔티티
//!
//! 하나의 컬렉션에 `type` 구분자로 역할과 권한을 함께 저장합니다.
//! 사용자 문서에는 [`RoleRef`]만 저장되고, 권한까지 채워진 형태는
//! 항상 [`ResolvedRole`]로 따로 표현됩니다.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// 역할 이름 상수와 역할 등급 판정
pub mod role_names {
    pub const SUPER_ADMIN: &str = "super_admin";
    pub const ADMIN: &str = "admin";
    pub const INSTITUTE_ADMIN: &str = "institute_admin";
    pub const TEACHER: &str = "teacher";
    pub const STUDENT: &str = "student";
    pub const PARENT: &str = "parent";
    pub const STAFF: &str = "staff";

    /// 회원가입 시 스스로 선택할 수 있는 역할
    pub const SELF_REGISTRABLE: [&str; 4] = [TEACHER, STUDENT, PARENT, STAFF];

    /// 테넌트 격리를 우회하는 역할
    pub fn is_super_admin_equivalent(role: &str) -> bool {
        role == SUPER_ADMIN
    }

    /// 리소스 소유권 검사를 우회하는 역할
    pub fn is_admin_equivalent(role: &str) -> bool {
        matches!(role, SUPER_ADMIN | ADMIN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Role,
    Permission,
}

/// `access_controls` 컬렉션 문서
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessControlEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 권한 범위 (권한 문서에만 사용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// 역할에 연결된 권한 문서 ID (역할 문서에만 사용)
    #[serde(default)]
    pub permissions: Vec<ObjectId>,
    pub created_at: DateTime,
}

impl AccessControlEntry {
    pub fn role(name: &str, permissions: Vec<ObjectId>) -> Self {
        Self {
            id: None,
            entry_type: EntryType::Role,
            name: name.to_string(),
            description: None,
            scope: None,
            permissions,
            created_at: DateTime::now(),
        }
    }

    pub fn permission(name: &str, scope: Option<&str>) -> Self {
        Self {
            id: None,
            entry_type: EntryType::Permission,
            name: name.to_string(),
            description: None,
            scope: scope.map(str::to_string),
            permissions: Vec::new(),
            created_at: DateTime::now(),
        }
    }
}

/// 사용자 문서에 저장되는 역할 참조 (ID 만 보유)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleRef(pub ObjectId);

/// 역할에 부여된 개별 권한
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl PermissionGrant {
    /// 이름이 같고, 범위 요구가 없거나 같은 범위 또는 `all` 범위이면 충족
    pub fn satisfies(&self, name: &str, scope: Option<&str>) -> bool {
        if self.name != name {
            return false;
        }
        match (scope, self.scope.as_deref()) {
            (None, _) => true,
            (Some(_), Some("all")) => true,
            (Some(required), Some(granted)) => required == granted,
            (Some(_), None) => false,
        }
    }
}

/// 권한이 채워진 역할
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRole {
    pub id: ObjectId,
    pub name: String,
    pub permissions: Vec<PermissionGrant>,
}
