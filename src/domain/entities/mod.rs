//! Domain Entities
//!
//! MongoDB 컬렉션에 저장되는 영속 엔티티를 정의합니다.
//!
//! | 엔티티 | 컬렉션 | 설명 |
//! |--------|--------|------|
//! | [`users::User`] | `users` | 자격 증명, 계정 상태, 로그인 잠금 |
//! | [`sessions::Session`] | `sessions` | 리프레시 토큰 세션, 토큰 버전 |
//! | [`access_control::AccessControlEntry`] | `access_controls` | 역할/권한 통합 문서 |
//! | [`audit::AuditEntry`] | `audit_logs` | 보안 감사 기록 |

pub mod users;
pub mod sessions;
pub mod access_control;
pub mod audit;

pub use users::*;
pub use sessions::*;
pub use access_control::*;
pub use audit::*;
