//! 저장소 초기화 레지스트리
//!
//! MongoDB 저장소는 시작 시점에 한 번 인덱스를 준비해야 합니다.
//! 각 저장소는 [`Repository`] 를 구현하고, `main` 에서
//! [`initialize_repositories`] 로 한꺼번에 초기화됩니다.

use std::sync::Arc;
use async_trait::async_trait;
use log::info;
use crate::core::errors::AppResult;

/// 데이터 액세스 리포지토리를 위한 공통 인터페이스
#[async_trait]
pub trait Repository: Send + Sync {
    /// 리포지토리의 고유 이름을 반환합니다.
    fn name(&self) -> &str;

    /// 연결된 MongoDB 컬렉션의 이름을 반환합니다.
    fn collection_name(&self) -> &str;

    /// 인덱스 생성 등 데이터 액세스 관련 초기화 작업을 수행합니다.
    async fn init(&self) -> AppResult<()>;
}

/// 등록된 저장소를 순서대로 초기화합니다.
///
/// 하나라도 실패하면 즉시 에러를 반환하여 서버 시작을 중단합니다.
pub async fn initialize_repositories(repositories: &[Arc<dyn Repository>]) -> AppResult<()> {
    info!("🔄 저장소 초기화 시작 ({}개)", repositories.len());

    for repository in repositories {
        info!("  ▸ {} ({}) 초기화 중...", repository.name(), repository.collection_name());
        repository.init().await?;
        info!("  ✓ {} 초기화 완료", repository.name());
    }

    info!("✅ 저장소 초기화 완료");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::core::errors::AppError;

    struct CountingRepository {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Repository for CountingRepository {
        fn name(&self) -> &str {
            "counting"
        }

        fn collection_name(&self) -> &str {
            "counting"
        }

        async fn init(&self) -> AppResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::DatabaseError("index build failed".to_string()));
            }
            Ok(())
        }
    }

    #[actix_web::test]
    async fn test_initializes_every_repository() {
        let calls = Arc::new(AtomicUsize::new(0));
        let repositories: Vec<Arc<dyn Repository>> = vec![
            Arc::new(CountingRepository { calls: calls.clone(), fail: false }),
            Arc::new(CountingRepository { calls: calls.clone(), fail: false }),
        ];

        initialize_repositories(&repositories).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[actix_web::test]
    async fn test_stops_on_first_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let repositories: Vec<Arc<dyn Repository>> = vec![
            Arc::new(CountingRepository { calls: calls.clone(), fail: true }),
            Arc::new(CountingRepository { calls: calls.clone(), fail: false }),
        ];

        assert!(initialize_repositories(&repositories).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
