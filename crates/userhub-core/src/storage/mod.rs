//! 사용자 저장소 추상화.
//!
//! 서비스 계층은 [`Storage`] trait만 의존하며, 백엔드별로 이 trait를 구현합니다.
//! 변경 작업은 [`Transaction`] 안에서 실행되고, 커밋되지 않은 트랜잭션은
//! drop 시점에 롤백됩니다.
//!
//! # 구현 예시
//!
//! ```ignore
//! pub struct PgStorage {
//!     pool: PgPool,
//! }
//!
//! #[async_trait]
//! impl Storage for PgStorage {
//!     async fn begin_tx(&self) -> Result<Box<dyn Transaction>, StorageError> {
//!         // ...
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::domain::{AllUser, User};
use crate::error::StorageError;

#[cfg(any(test, feature = "test-utils"))]
mod memory;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStorage;

/// 명시적 트랜잭션 경계.
///
/// `commit`을 호출하지 않고 drop되면 모든 변경이 버려집니다.
#[async_trait]
pub trait Transaction: Send {
    /// ID로 사용자 조회 (없으면 `NotFound`).
    async fn get_user_by_id(&mut self, id: i32) -> Result<User, StorageError>;

    /// 사용자 삽입 후 할당된 ID를 `user.id`에 채웁니다.
    async fn create_user(&mut self, user: &mut User) -> Result<(), StorageError>;

    /// login, password, role을 한 번의 UPDATE로 갱신 (영향받은 행이 0이면 `NotFound`).
    async fn update_user(&mut self, user: &User) -> Result<(), StorageError>;

    /// 사용자 삭제 후 삭제된 행을 반환 (영향받은 행이 0이면 `NotFound`).
    async fn delete_user(&mut self, id: i32) -> Result<User, StorageError>;

    /// 커밋.
    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    /// 명시적 롤백.
    async fn rollback(self: Box<Self>) -> Result<(), StorageError>;
}

/// 사용자 저장소.
#[async_trait]
pub trait Storage: Send + Sync {
    /// 로그인 이름으로 사용자 조회 (없으면 `NotFound`).
    async fn get_user_by_login(&self, login: &str) -> Result<User, StorageError>;

    /// ID로 사용자 조회 (없으면 `NotFound`).
    async fn get_user_by_id(&self, id: i32) -> Result<User, StorageError>;

    /// 전체 사용자 목록 (login 오름차순, 비밀번호 제외).
    async fn get_all_users(&self) -> Result<Vec<AllUser>, StorageError>;

    /// 트랜잭션 시작.
    async fn begin_tx(&self) -> Result<Box<dyn Transaction>, StorageError>;

    /// 단일 트랜잭션으로 사용자 생성.
    async fn create_user(&self, user: &mut User) -> Result<(), StorageError> {
        let mut tx = self.begin_tx().await?;
        tx.create_user(user).await?;
        tx.commit().await
    }

    /// 단일 트랜잭션으로 사용자 갱신.
    async fn update_user(&self, user: &User) -> Result<(), StorageError> {
        let mut tx = self.begin_tx().await?;
        tx.update_user(user).await?;
        tx.commit().await
    }

    /// 단일 트랜잭션으로 사용자 삭제.
    async fn delete_user(&self, id: i32) -> Result<User, StorageError> {
        let mut tx = self.begin_tx().await?;
        let deleted = tx.delete_user(id).await?;
        tx.commit().await?;
        Ok(deleted)
    }
}
