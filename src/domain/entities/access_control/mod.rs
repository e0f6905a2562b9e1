//! 역할/권한 엔티티 모듈

pub mod access_control;

pub use access_control::{
    role_names, AccessControlEntry, EntryType, PermissionGrant, ResolvedRole, RoleRef,
};
