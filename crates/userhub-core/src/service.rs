//! 사용자 서비스.
//!
//! 인증 및 CRUD 비즈니스 규칙(기본 역할, 유일성 매핑, 병합 갱신, 비밀번호 해싱)을
//! [`Storage`] 위에서 조율합니다. 모든 작업은 읽기/쓰기 기한 안에서 실행되며,
//! 기한이 지나면 진행 중인 트랜잭션은 drop되어 롤백됩니다.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::auth::{hash_password, verify_password};
use crate::domain::{normalize_role, AllUser, NewUser, User, UserPatch};
use crate::error::{StorageError, UserError, UserResult};
use crate::storage::Storage;

/// 요청 기한 설정.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceTimeouts {
    /// 조회 작업 기한
    pub read: Duration,
    /// 변경 작업 기한
    pub write: Duration,
}

impl Default for ServiceTimeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(10),
            write: Duration::from_secs(5),
        }
    }
}

/// 사용자 서비스 trait.
///
/// HTTP 계층은 이 trait에만 의존하므로 테스트 더블로 교체할 수 있습니다.
#[async_trait]
pub trait UserService: Send + Sync {
    /// 로그인 인증.
    ///
    /// 존재하지 않는 로그인과 잘못된 비밀번호는 모두 `Unauthorized`로 반환합니다.
    /// 성공 시 토큰 발급을 위해 저장된 레코드 전체를 반환합니다.
    async fn authenticate(&self, login: &str, password: &str) -> UserResult<User>;

    /// 전체 사용자 목록 (login 오름차순, 비밀번호 제외).
    async fn get_all_users(&self) -> UserResult<Vec<AllUser>>;

    /// 사용자 생성. 반환값의 비밀번호는 비어 있습니다.
    async fn create_user(&self, input: NewUser) -> UserResult<User>;

    /// 사용자 병합 갱신. 반환값의 비밀번호는 비어 있습니다.
    async fn update_user(&self, id: i32, patch: UserPatch) -> UserResult<User>;

    /// 사용자 삭제 후 삭제된 레코드 반환 (비밀번호 제거됨).
    ///
    /// 자기 자신 삭제 방지는 호출자(핸들러)의 책임입니다.
    async fn delete_user(&self, id: i32) -> UserResult<User>;
}

/// [`Storage`] 기반 사용자 서비스 구현.
pub struct UserServiceImpl<S> {
    storage: Arc<S>,
    timeouts: ServiceTimeouts,
}

impl<S: Storage> UserServiceImpl<S> {
    /// 새 서비스 생성.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            timeouts: ServiceTimeouts::default(),
        }
    }

    /// 요청 기한 설정.
    pub fn with_timeouts(mut self, timeouts: ServiceTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// 내부 저장소.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// 기한 안에서 작업을 실행. 기한 초과 시 future를 drop합니다.
async fn within<T, F>(limit: Duration, op: &'static str, fut: F) -> UserResult<T>
where
    F: Future<Output = UserResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(op, limit_ms = limit.as_millis() as u64, "operation deadline exceeded");
            Err(UserError::Timeout)
        }
    }
}

#[async_trait]
impl<S: Storage + 'static> UserService for UserServiceImpl<S> {
    async fn authenticate(&self, login: &str, password: &str) -> UserResult<User> {
        within(self.timeouts.read, "authenticate", async {
            let user = match self.storage.get_user_by_login(login).await {
                Ok(user) => user,
                Err(StorageError::NotFound) => {
                    debug!(%login, "login rejected: unknown login");
                    return Err(UserError::Unauthorized);
                }
                Err(e) => return Err(e.into()),
            };

            if !verify_password(password, &user.password) {
                debug!(%login, "login rejected: password mismatch");
                return Err(UserError::Unauthorized);
            }

            Ok(user)
        })
        .await
    }

    async fn get_all_users(&self) -> UserResult<Vec<AllUser>> {
        within(self.timeouts.read, "get_all_users", async {
            Ok(self.storage.get_all_users().await?)
        })
        .await
    }

    async fn create_user(&self, input: NewUser) -> UserResult<User> {
        if input.login.is_empty() || input.password.is_empty() {
            return Err(UserError::Validation(
                "로그인과 비밀번호는 필수입니다".to_string(),
            ));
        }

        within(self.timeouts.write, "create_user", async {
            let mut user = User {
                id: 0,
                login: input.login,
                password: hash_password(&input.password),
                role: normalize_role(input.role.as_deref()),
            };

            self.storage.create_user(&mut user).await?;
            info!(user_id = user.id, login = %user.login, role = %user.role, "user created");

            Ok(user.scrub())
        })
        .await
    }

    async fn update_user(&self, id: i32, patch: UserPatch) -> UserResult<User> {
        within(self.timeouts.write, "update_user", async {
            let mut tx = self.storage.begin_tx().await?;

            let current = tx.get_user_by_id(id).await?;
            let merged = patch.merge_into(current, hash_password);
            tx.update_user(&merged).await?;
            tx.commit().await?;

            info!(user_id = id, login = %merged.login, role = %merged.role, "user updated");
            Ok(merged.scrub())
        })
        .await
    }

    async fn delete_user(&self, id: i32) -> UserResult<User> {
        within(self.timeouts.write, "delete_user", async {
            let deleted = self.storage.delete_user(id).await?;
            info!(user_id = id, login = %deleted.login, "user deleted");
            Ok(deleted.scrub())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn service() -> (Arc<MemoryStorage>, UserServiceImpl<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (storage.clone(), UserServiceImpl::new(storage))
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let (storage, svc) = service();
        let alice = storage.seed("alice", "secret", "admin");

        let user = svc.authenticate("alice", "secret").await.unwrap();
        assert_eq!(user.id, alice.id);
        assert_eq!(user.role, "admin");
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_indistinguishable() {
        let (storage, svc) = service();
        storage.seed("bob", "rightpw", "user");

        let wrong_pw = svc.authenticate("bob", "wrongpw").await.unwrap_err();
        let ghost = svc.authenticate("ghost", "anything").await.unwrap_err();

        assert!(matches!(wrong_pw, UserError::Unauthorized));
        assert!(matches!(ghost, UserError::Unauthorized));
        assert_eq!(wrong_pw.to_string(), ghost.to_string());
    }

    #[tokio::test]
    async fn test_create_defaults_role_and_hashes() {
        let (storage, svc) = service();

        let created = svc
            .create_user(NewUser {
                login: "dave".to_string(),
                password: "pw".to_string(),
                role: None,
            })
            .await
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.role, "user");
        assert!(created.password.is_empty());

        let stored = storage.rows().pop().unwrap();
        assert_eq!(stored.password, hash_password("pw"));
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let (storage, svc) = service();
        storage.seed("alice", "secret", "user");

        let err = svc
            .create_user(NewUser {
                login: "alice".to_string(),
                password: "other".to_string(),
                role: Some("admin".to_string()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Conflict));
        assert_eq!(storage.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_create_requires_login_and_password() {
        let (storage, svc) = service();

        let err = svc
            .create_user(NewUser {
                login: "x".to_string(),
                password: String::new(),
                role: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Validation(_)));
        assert!(storage.rows().is_empty());
    }

    #[tokio::test]
    async fn test_update_role_only_preserves_rest() {
        let (storage, svc) = service();
        let bob = storage.seed("bob", "pw", "user");

        let updated = svc
            .update_user(
                bob.id,
                UserPatch {
                    role: Some("admin".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, "admin");
        assert_eq!(updated.login, "bob");

        let stored = storage.rows().pop().unwrap();
        assert_eq!(stored.login, "bob");
        assert_eq!(stored.password, bob.password);
        assert_eq!(stored.role, "admin");
    }

    #[tokio::test]
    async fn test_update_password_rehashes() {
        let (storage, svc) = service();
        let bob = storage.seed("bob", "old", "user");

        svc.update_user(
            bob.id,
            UserPatch {
                password: Some("new".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(svc.authenticate("bob", "new").await.is_ok());
        assert!(svc.authenticate("bob", "old").await.is_err());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (_, svc) = service();
        let err = svc.update_user(5, UserPatch::default()).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound));
    }

    #[tokio::test]
    async fn test_update_to_taken_login_is_conflict() {
        let (storage, svc) = service();
        storage.seed("alice", "a", "user");
        let bob = storage.seed("bob", "b", "user");

        let err = svc
            .update_user(
                bob.id,
                UserPatch {
                    login: Some("alice".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Conflict));
        assert_eq!(storage.rows()[1].login, "bob");
    }

    #[tokio::test]
    async fn test_delete() {
        let (storage, svc) = service();
        let bob = storage.seed("bob", "b", "user");

        let deleted = svc.delete_user(bob.id).await.unwrap();
        assert_eq!(deleted.login, "bob");
        assert!(deleted.password.is_empty());
        assert!(storage.rows().is_empty());

        assert!(matches!(
            svc.delete_user(bob.id).await,
            Err(UserError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal() {
        let (storage, svc) = service();
        storage.set_unavailable(true);

        assert!(matches!(svc.get_all_users().await, Err(UserError::Internal)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_deadline_rolls_back() {
        let (storage, svc) = service();
        let svc = svc.with_timeouts(ServiceTimeouts {
            read: Duration::from_secs(10),
            write: Duration::from_millis(50),
        });
        let bob = storage.seed("bob", "b", "user");
        storage.set_latency(Duration::from_millis(40));

        let err = svc
            .update_user(
                bob.id,
                UserPatch {
                    role: Some("admin".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Timeout));
        assert_eq!(storage.rows()[0].role, "user");
        assert_eq!(storage.commit_count(), 0);
    }
}
