//! 데이터베이스 접근 계층.
//!
//! `userhub_core::Storage` / `Transaction`의 PostgreSQL 구현을 제공합니다.

pub mod users;

pub use users::PgStorage;
