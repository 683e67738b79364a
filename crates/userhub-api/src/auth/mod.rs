//! 인증 및 권한 관리.
//!
//! 토큰 발급/검증 자체는 `userhub_core::TokenManager`가 담당하고,
//! 이 모듈은 Axum 요청 파이프라인에 이를 연결합니다.
//!
//! # 구성 요소
//!
//! - [`require_auth`]: Bearer 토큰 검증 후 [`Identity`](userhub_core::Identity)를 요청에 주입
//! - [`require_admin`]: admin 역할 확인
//! - [`CurrentUser`]: 핸들러용 Identity 추출기

pub mod middleware;

pub use middleware::{require_admin, require_auth, AuthError, CurrentUser};
