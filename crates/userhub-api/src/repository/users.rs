//! PostgreSQL 사용자 저장소.
//!
//! 모든 쿼리는 파라미터 바인딩을 사용합니다. 변경 작업은 트랜잭션 안에서 실행되며,
//! 커밋되지 않은 `sqlx::Transaction`은 drop 시 롤백됩니다.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use tracing::{debug, info};
use userhub_core::config::DatabaseConfig;
use userhub_core::{AllUser, Storage, StorageError, Transaction, User};

/// sqlx 에러를 저장소 에러로 변환.
fn map_err(err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::RowNotFound => StorageError::NotFound,
        err if is_unique_violation(&err) => StorageError::UniqueViolation(err.to_string()),
        err => StorageError::backend(err),
    }
}

/// 유일성 제약 위반 여부.
///
/// 드라이버의 분류를 우선 사용하고, 분류가 없으면 메시지로 판별합니다.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation() || is_unique_message(db.message()),
        _ => false,
    }
}

fn is_unique_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("unique") || message.contains("duplicate")
}

/// PostgreSQL 기반 [`Storage`] 구현.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// 기존 연결 풀로 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 설정으로 연결 풀을 만들고 `SELECT 1`로 연결을 확인합니다.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        info!(max_connections = config.max_connections, "Database connection established");

        Ok(Self { pool })
    }

    /// 내장 마이그레이션 적용.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// `SELECT 1`로 연결 상태 확인. 준비 상태 헬스 체크에서 사용합니다.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn get_user_by_login(&self, login: &str) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>(
            "SELECT id, login, password, role FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?
        .ok_or(StorageError::NotFound)
    }

    async fn get_user_by_id(&self, id: i32) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>("SELECT id, login, password, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?
            .ok_or(StorageError::NotFound)
    }

    async fn get_all_users(&self) -> Result<Vec<AllUser>, StorageError> {
        sqlx::query_as::<_, AllUser>("SELECT id, login, role FROM users ORDER BY login ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn begin_tx(&self) -> Result<Box<dyn Transaction>, StorageError> {
        let tx = self.pool.begin().await.map_err(map_err)?;
        Ok(Box::new(PgTransaction { tx }))
    }
}

/// PostgreSQL 트랜잭션.
struct PgTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn get_user_by_id(&mut self, id: i32) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>(
            "SELECT id, login, password, role FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_err)?
        .ok_or(StorageError::NotFound)
    }

    async fn create_user(&mut self, user: &mut User) -> Result<(), StorageError> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO users (login, password, role) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&user.login)
        .bind(&user.password)
        .bind(&user.role)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_err)?;

        user.id = id;
        Ok(())
    }

    async fn update_user(&mut self, user: &User) -> Result<(), StorageError> {
        let result =
            sqlx::query("UPDATE users SET login = $1, password = $2, role = $3 WHERE id = $4")
                .bind(&user.login)
                .bind(&user.password)
                .bind(&user.role)
                .bind(user.id)
                .execute(&mut *self.tx)
                .await
                .map_err(map_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_user(&mut self, id: i32) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>(
            "DELETE FROM users WHERE id = $1 RETURNING id, login, password, role",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_err)?
        .ok_or(StorageError::NotFound)
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        self.tx.commit().await.map_err(map_err)
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        debug!("rolling back transaction");
        self.tx.rollback().await.map_err(map_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            map_err(sqlx::Error::RowNotFound),
            StorageError::NotFound
        ));
    }

    #[test]
    fn test_other_errors_are_backend() {
        assert!(matches!(
            map_err(sqlx::Error::PoolTimedOut),
            StorageError::Backend(_)
        ));
    }

    #[test]
    fn test_unique_message_fallback() {
        assert!(is_unique_message(
            "duplicate key value violates unique constraint \"users_login_key\""
        ));
        assert!(is_unique_message("UNIQUE constraint failed: users.login"));
        assert!(!is_unique_message("relation \"users\" does not exist"));
    }
}
