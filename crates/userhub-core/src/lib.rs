//! # Userhub Core
//!
//! 사용자 관리 서비스의 핵심 도메인 모델 및 비즈니스 규칙을 제공합니다.
//!
//! 이 크레이트는 HTTP 계층과 무관한 다음 구성 요소를 포함합니다:
//! - 사용자 도메인 타입 (User, AllUser, Identity)
//! - 비밀번호 다이제스트
//! - JWT 발급/검증
//! - 저장소(Storage) 및 트랜잭션 추상화
//! - 사용자 서비스 (인증, CRUD 규칙)
//! - 설정 및 로깅 인프라

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod service;
pub mod storage;

pub use auth::{hash_password, verify_password, Claims, TokenError, TokenManager};
pub use config::AppConfig;
pub use domain::*;
pub use error::{StorageError, UserError, UserResult};
pub use service::{ServiceTimeouts, UserService, UserServiceImpl};
pub use storage::{Storage, Transaction};

#[cfg(any(test, feature = "test-utils"))]
pub use storage::MemoryStorage;
