//! 역할/권한 해석 서비스
//!
//! 사용자 문서에는 역할 참조([`RoleRef`])와 비정규화된 역할 이름만 있습니다.
//! [`AccessControlService::resolve_roles`] 는 두 경로를 합쳐 권한까지 채운
//! [`ResolvedRole`] 목록을 만들며, 인가 검사 때마다 저장소를 다시 읽습니다.

use std::collections::HashMap;
use std::sync::Arc;
use mongodb::bson::oid::ObjectId;
use crate::core::errors::AppResult;
use crate::domain::entities::access_control::{
    AccessControlEntry, PermissionGrant, ResolvedRole, RoleRef,
};
use crate::domain::entities::users::User;
use crate::repositories::access_control::AccessControlStore;

pub struct AccessControlService {
    store: Arc<dyn AccessControlStore>,
}

impl AccessControlService {
    pub fn new(store: Arc<dyn AccessControlStore>) -> Self {
        Self { store }
    }

    /// 사용자 역할 참조와 역할 이름을 권한이 채워진 역할로 해석
    pub async fn resolve_roles(&self, user: &User) -> AppResult<Vec<ResolvedRole>> {
        let ids: Vec<ObjectId> = user.roles.iter().map(|RoleRef(id)| *id).collect();
        let mut roles = if ids.is_empty() {
            Vec::new()
        } else {
            self.store.find_roles_by_ids(&ids).await?
        };

        if !roles.iter().any(|r| r.name == user.role) {
            if let Some(named) = self.store.find_role_by_name(&user.role).await? {
                roles.push(named);
            }
        }

        let permission_ids: Vec<ObjectId> = roles
            .iter()
            .flat_map(|r| r.permissions.iter().copied())
            .collect();
        let permissions: HashMap<ObjectId, AccessControlEntry> = if permission_ids.is_empty() {
            HashMap::new()
        } else {
            self.store
                .find_permissions_by_ids(&permission_ids)
                .await?
                .into_iter()
                .filter_map(|p| p.id.map(|id| (id, p)))
                .collect()
        };

        let resolved = roles
            .into_iter()
            .filter_map(|role| {
                let id = role.id?;
                let grants = role
                    .permissions
                    .iter()
                    .filter_map(|pid| permissions.get(pid))
                    .map(|p| PermissionGrant { name: p.name.clone(), scope: p.scope.clone() })
                    .collect();
                Some(ResolvedRole { id, name: role.name, permissions: grants })
            })
            .collect();

        Ok(resolved)
    }

    /// 모든 역할의 권한을 중복 없이 합친 목록
    pub async fn effective_permissions(&self, user: &User) -> AppResult<Vec<PermissionGrant>> {
        let mut grants: Vec<PermissionGrant> = Vec::new();
        for role in self.resolve_roles(user).await? {
            for grant in role.permissions {
                if !grants.contains(&grant) {
                    grants.push(grant);
                }
            }
        }
        Ok(grants)
    }

    /// 액세스 토큰에 싣는 권한 이름 목록
    pub async fn permission_names(&self, user: &User) -> AppResult<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        for grant in self.effective_permissions(user).await? {
            if !names.contains(&grant.name) {
                names.push(grant.name);
            }
        }
        Ok(names)
    }
}
