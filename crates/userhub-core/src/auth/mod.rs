//! 인증 구성 요소.
//!
//! 비밀번호 다이제스트 및 JWT 발급/검증을 제공합니다.
//!
//! # 구성 요소
//!
//! - [`hash_password`] / [`verify_password`]: SHA-256 다이제스트
//! - [`Claims`]: JWT 페이로드 구조체
//! - [`TokenManager`]: 토큰 발급 및 검증

mod jwt;
mod password;

pub use jwt::{Claims, TokenError, TokenManager, DEFAULT_TOKEN_TTL_HOURS};
pub use password::{hash_password, verify_password};
