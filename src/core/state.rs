//! 애플리케이션 상태 (의존성 주입 루트)
//!
//! 모든 서비스는 생성자로 의존성을 받고, 여기서 한 번 조립되어
//! `web::Data<AppState>` 로 워커 간에 공유됩니다.
//!
//! ```text
//! AuthSettings ─┬─► PasswordPolicy
//!               ├─► SessionService ◄── SessionStore
//!               └─► TokenService ◄── SessionService, UserStore, AccessControlService, AuditService
//!
//! AuthService ◄── TokenService, PasswordPolicy, UserStore, ResetTokenStore, AuditService
//! AuthorizationService ◄── AccessControlService, AuditService
//! UserService ◄── UserStore, TokenService
//! ```
//!
//! 세션 폐기는 모두 `TokenService` 를 거치므로 `SESSION_REVOKED` 감사 기록이 빠지지 않습니다.

use std::sync::Arc;
use crate::caching::redis::RedisClient;
use crate::config::AuthSettings;
use crate::core::errors::AppResult;
use crate::core::registry::{initialize_repositories, Repository};
use crate::db::Database;
use crate::repositories::access_control::{AccessControlStore, MongoAccessControlStore};
use crate::repositories::audit::{AuditSink, MongoAuditSink};
use crate::repositories::sessions::{MongoSessionStore, SessionStore};
use crate::repositories::tokens::{RedisResetTokenStore, ResetTokenStore};
use crate::repositories::users::{MongoUserStore, UserStore};
use crate::services::access::{AccessControlService, AuthorizationService};
use crate::services::audit::AuditService;
use crate::services::auth::{AuthService, PasswordPolicy, TokenService};
use crate::services::sessions::SessionService;
use crate::services::users::UserService;

/// 서비스가 의존하는 저장소 묶음
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub access_control: Arc<dyn AccessControlStore>,
    pub reset_tokens: Arc<dyn ResetTokenStore>,
    pub audit: Arc<dyn AuditSink>,
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<AuthSettings>,
    pub password_policy: Arc<PasswordPolicy>,
    pub sessions: Arc<SessionService>,
    pub tokens: Arc<TokenService>,
    pub access_control: Arc<AccessControlService>,
    pub authorization: Arc<AuthorizationService>,
    pub audit: Arc<AuditService>,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
}

impl AppState {
    /// MongoDB/Redis 저장소를 만들고 인덱스를 준비한 뒤 서비스를 조립합니다.
    pub async fn from_infrastructure(
        settings: AuthSettings,
        database: Arc<Database>,
        redis: Arc<RedisClient>,
    ) -> AppResult<Self> {
        let users = Arc::new(MongoUserStore::new(database.clone()));
        let sessions = Arc::new(MongoSessionStore::new(database.clone()));
        let access_control = Arc::new(MongoAccessControlStore::new(database.clone()));
        let audit = Arc::new(MongoAuditSink::new(database));

        let repositories: Vec<Arc<dyn Repository>> = vec![
            users.clone() as Arc<dyn Repository>,
            sessions.clone() as Arc<dyn Repository>,
            access_control.clone() as Arc<dyn Repository>,
            audit.clone() as Arc<dyn Repository>,
        ];
        initialize_repositories(&repositories).await?;

        let stores = Stores {
            users,
            sessions,
            access_control,
            reset_tokens: Arc::new(RedisResetTokenStore::new(redis)),
            audit,
        };
        Ok(Self::with_stores(settings, stores))
    }

    pub fn with_stores(settings: AuthSettings, stores: Stores) -> Self {
        let settings = Arc::new(settings);
        let password_policy = Arc::new(PasswordPolicy::new(settings.bcrypt_cost));
        let audit = Arc::new(AuditService::new(stores.audit));
        let access_control = Arc::new(AccessControlService::new(stores.access_control));
        let sessions = Arc::new(SessionService::new(stores.sessions, settings.clone()));
        let tokens = Arc::new(TokenService::new(
            settings.clone(),
            sessions.clone(),
            stores.users.clone(),
            access_control.clone(),
            audit.clone(),
        ));
        let authorization = Arc::new(AuthorizationService::new(access_control.clone(), audit.clone()));
        let auth = Arc::new(AuthService::new(
            settings.clone(),
            stores.users.clone(),
            stores.reset_tokens,
            password_policy.clone(),
            tokens.clone(),
            audit.clone(),
        ));
        let users = Arc::new(UserService::new(stores.users, tokens.clone()));

        Self {
            settings,
            password_policy,
            sessions,
            tokens,
            access_control,
            authorization,
            audit,
            auth,
            users,
        }
    }
}
