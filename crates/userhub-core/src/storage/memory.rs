//! 테스트용 인메모리 저장소.
//!
//! 트랜잭션은 시작 시점의 복사본에서 읽고 쓰며, 변경 내역을 기록해 두었다가
//! 커밋 시 최신 공유 테이블 위에 다시 적용합니다. 재적용 중 하나라도 실패하면
//! 아무것도 반영되지 않습니다. ID는 공유 카운터에서 발급되므로 롤백되어도
//! 재사용되지 않습니다.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::{Storage, Transaction};
use crate::auth::hash_password;
use crate::domain::{AllUser, User};
use crate::error::StorageError;

const UNIQUE_LOGIN_MESSAGE: &str =
    "duplicate key value violates unique constraint \"users_login_key\"";

#[derive(Debug, Clone, Default)]
struct Table {
    rows: BTreeMap<i32, User>,
    next_id: i32,
}

impl Table {
    fn login_taken(&self, login: &str, except: Option<i32>) -> bool {
        self.rows
            .values()
            .any(|u| u.login == login && Some(u.id) != except)
    }

    fn insert(&mut self, user: User) -> Result<(), StorageError> {
        if self.login_taken(&user.login, None) {
            return Err(StorageError::UniqueViolation(UNIQUE_LOGIN_MESSAGE.to_string()));
        }
        self.rows.insert(user.id, user);
        Ok(())
    }

    fn update(&mut self, user: User) -> Result<(), StorageError> {
        if !self.rows.contains_key(&user.id) {
            return Err(StorageError::NotFound);
        }
        if self.login_taken(&user.login, Some(user.id)) {
            return Err(StorageError::UniqueViolation(UNIQUE_LOGIN_MESSAGE.to_string()));
        }
        self.rows.insert(user.id, user);
        Ok(())
    }

    fn delete(&mut self, id: i32) -> Result<User, StorageError> {
        self.rows.remove(&id).ok_or(StorageError::NotFound)
    }

    fn apply(&mut self, op: Op) -> Result<(), StorageError> {
        match op {
            Op::Insert(user) => self.insert(user),
            Op::Update(user) => self.update(user),
            Op::Delete(id) => self.delete(id).map(|_| ()),
        }
    }
}

/// 커밋 시 재적용할 변경.
#[derive(Debug)]
enum Op {
    Insert(User),
    Update(User),
    Delete(i32),
}

#[derive(Debug, Default)]
struct Inner {
    table: Table,
    latency: Duration,
    unavailable: bool,
    commits: usize,
}

/// 인메모리 사용자 저장소.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStorage {
    /// 빈 저장소 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자를 추가합니다. 비밀번호는 평문으로 받아 다이제스트로 저장합니다.
    pub fn seed(&self, login: &str, password: &str, role: &str) -> User {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.table.next_id += 1;
        let user = User {
            id: inner.table.next_id,
            login: login.to_string(),
            password: hash_password(password),
            role: role.to_string(),
        };
        inner.table.rows.insert(user.id, user.clone());
        user
    }

    /// 모든 작업에 인위적인 지연을 추가합니다.
    pub fn set_latency(&self, latency: Duration) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).latency = latency;
    }

    /// 저장소 장애를 흉내냅니다.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).unavailable = unavailable;
    }

    /// 현재 커밋된 행 (id 순).
    pub fn rows(&self) -> Vec<User> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.table.rows.values().cloned().collect()
    }

    /// 커밋된 트랜잭션 수.
    pub fn commit_count(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).commits
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StorageError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| StorageError::backend("memory storage lock poisoned"))?;
        if inner.unavailable {
            return Err(StorageError::backend("memory storage unavailable"));
        }
        Ok(inner)
    }

    fn allocate_id(&self) -> Result<i32, StorageError> {
        let mut inner = self.lock()?;
        inner.table.next_id += 1;
        Ok(inner.table.next_id)
    }

    async fn pause(&self) -> Result<(), StorageError> {
        let latency = self.lock()?.latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_user_by_login(&self, login: &str) -> Result<User, StorageError> {
        self.pause().await?;
        self.lock()?
            .table
            .rows
            .values()
            .find(|u| u.login == login)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn get_user_by_id(&self, id: i32) -> Result<User, StorageError> {
        self.pause().await?;
        self.lock()?
            .table
            .rows
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn get_all_users(&self) -> Result<Vec<AllUser>, StorageError> {
        self.pause().await?;
        let mut users: Vec<AllUser> = self
            .lock()?
            .table
            .rows
            .values()
            .cloned()
            .map(AllUser::from)
            .collect();
        users.sort_by(|a, b| a.login.cmp(&b.login));
        Ok(users)
    }

    async fn begin_tx(&self) -> Result<Box<dyn Transaction>, StorageError> {
        self.pause().await?;
        let staged = self.lock()?.table.clone();
        Ok(Box::new(MemoryTransaction {
            storage: self.clone(),
            staged,
            ops: Vec::new(),
        }))
    }
}

/// 복사본 위에서 동작하는 트랜잭션.
struct MemoryTransaction {
    storage: MemoryStorage,
    staged: Table,
    ops: Vec<Op>,
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn get_user_by_id(&mut self, id: i32) -> Result<User, StorageError> {
        self.storage.pause().await?;
        self.staged.rows.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn create_user(&mut self, user: &mut User) -> Result<(), StorageError> {
        self.storage.pause().await?;
        if self.staged.login_taken(&user.login, None) {
            return Err(StorageError::UniqueViolation(UNIQUE_LOGIN_MESSAGE.to_string()));
        }
        user.id = self.storage.allocate_id()?;
        self.staged.insert(user.clone())?;
        self.ops.push(Op::Insert(user.clone()));
        Ok(())
    }

    async fn update_user(&mut self, user: &User) -> Result<(), StorageError> {
        self.storage.pause().await?;
        self.staged.update(user.clone())?;
        self.ops.push(Op::Update(user.clone()));
        Ok(())
    }

    async fn delete_user(&mut self, id: i32) -> Result<User, StorageError> {
        self.storage.pause().await?;
        let user = self.staged.delete(id)?;
        self.ops.push(Op::Delete(id));
        Ok(user)
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        let MemoryTransaction { storage, ops, .. } = *self;
        let mut inner = storage.lock()?;

        let mut table = inner.table.clone();
        for op in ops {
            table.apply(op)?;
        }

        inner.table.rows = table.rows;
        inner.commits += 1;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        Ok(())
    }
}
