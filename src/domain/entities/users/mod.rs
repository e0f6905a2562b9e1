//! Users Entity Module
//!
//! 자격 증명 저장소의 사용자 엔티티와 계정 상태 머신을 정의합니다.
//!
//! ```rust,ignore
//! use crate::domain::entities::users::User;
//!
//! let user = User::new_pending(
//!     "user@example.com".to_string(),
//!     "username".to_string(),
//!     "Full Name".to_string(),
//!     hashed_password,
//!     "student".to_string(),
//! );
//! assert!(!user.can_sign_in());
//! ```

pub mod user;

pub use user::{
    password_changed_stamp, AccountStatus, CredentialField, LockoutUpdate, ProfileUpdate,
    StatusChange, User,
};
