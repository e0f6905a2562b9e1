//! 데이터 액세스 계층을 담당하는 리포지토리 모듈
//!
//! 각 저장소는 `#[async_trait]` 인터페이스와 구현체로 나뉩니다.
//! 서비스는 인터페이스(`Arc<dyn UserStore>` 등)에만 의존하고,
//! 운영에서는 MongoDB/Redis 구현이, 테스트에서는 [`memory`] 구현이 주입됩니다.
//!
//! | 인터페이스 | 운영 구현 | 저장 위치 |
//! |------------|-----------|-----------|
//! | `UserStore` | `MongoUserStore` | `users` |
//! | `SessionStore` | `MongoSessionStore` | `sessions` |
//! | `AccessControlStore` | `MongoAccessControlStore` | `access_controls` |
//! | `AuditSink` | `MongoAuditSink` | `audit_logs` |
//! | `ResetTokenStore` | `RedisResetTokenStore` | Redis `password_reset:*` |

pub mod users;
pub mod sessions;
pub mod access_control;
pub mod audit;
pub mod tokens;

#[cfg(test)]
pub mod memory;
