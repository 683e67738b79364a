//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 시작 시 명시적으로 구성되어 Arc로 래핑된 뒤 라우터에 주입됩니다.
//! 전역 싱글턴은 사용하지 않습니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use userhub_core::{TokenManager, UserService};

use crate::repository::PgStorage;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 사용자 서비스 (인증, CRUD)
    pub users: Arc<dyn UserService>,

    /// JWT 발급/검증기
    pub tokens: Arc<TokenManager>,

    /// PostgreSQL 저장소 (헬스 체크용, 선택적)
    pub database: Option<PgStorage>,

    /// 서버 시작 시간
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새 상태 생성.
    pub fn new(users: Arc<dyn UserService>, tokens: Arc<TokenManager>) -> Self {
        Self {
            users,
            tokens,
            database: None,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 헬스 체크 대상 데이터베이스 설정.
    pub fn with_database(mut self, database: PgStorage) -> Self {
        self.database = Some(database);
        self
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.database {
            Some(database) => database.health_check().await,
            None => false,
        }
    }
}

/// 테스트용 상태 생성.
///
/// 인메모리 저장소와 고정 서명 키(`test-secret`)를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state(storage: Arc<userhub_core::MemoryStorage>) -> AppState {
    use userhub_core::UserServiceImpl;

    let users = Arc::new(UserServiceImpl::new(storage));
    AppState::new(users, Arc::new(TokenManager::from_secret("test-secret")))
}
