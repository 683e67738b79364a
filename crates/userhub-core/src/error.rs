//! 사용자 서비스의 에러 타입.
//!
//! 저장소 계층은 [`StorageError`]를, 서비스 계층은 이를 도메인 분류인
//! [`UserError`]로 변환하여 반환합니다. HTTP 계층은 `UserError`만 봅니다.

use thiserror::Error;

use crate::auth::TokenError;

/// 저장소 에러.
#[derive(Debug, Error)]
pub enum StorageError {
    /// 일치하는 행이 없음
    #[error("일치하는 행이 없습니다")]
    NotFound,

    /// 유일성 제약 위반 (드라이버 메시지 보존)
    #[error("유일성 제약 위반: {0}")]
    UniqueViolation(String),

    /// 기타 백엔드 에러
    #[error("저장소 에러: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    /// 임의의 백엔드 에러를 감쌉니다.
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}

/// 사용자 도메인 에러.
///
/// 메시지는 사용자에게 그대로 노출되므로 내부 정보를 포함하지 않습니다.
#[derive(Debug, Error)]
pub enum UserError {
    /// 잘못된 입력
    #[error("{0}")]
    Validation(String),

    /// 잘못된 로그인 정보 (존재하지 않는 로그인과 잘못된 비밀번호를 구분하지 않음)
    #[error("로그인 또는 비밀번호가 올바르지 않습니다")]
    Unauthorized,

    /// 유효하지 않거나 만료된 토큰
    #[error("유효하지 않거나 만료된 토큰입니다")]
    InvalidToken,

    /// 권한 부족
    #[error("권한이 부족합니다. admin 역할이 필요합니다")]
    Forbidden,

    /// 사용자 없음
    #[error("사용자를 찾을 수 없습니다")]
    NotFound,

    /// 로그인 중복
    #[error("이미 존재하는 사용자입니다")]
    Conflict,

    /// 요청 기한 초과
    #[error("요청 처리 시간이 초과되었습니다")]
    Timeout,

    /// 설정 에러 (예: 서명 키 미설정)
    #[error("서버 설정 오류")]
    Config(String),

    /// 저장소/인프라 실패
    #[error("내부 서버 오류")]
    Internal,
}

impl From<StorageError> for UserError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => UserError::NotFound,
            StorageError::UniqueViolation(detail) => {
                tracing::debug!(%detail, "unique constraint violated");
                UserError::Conflict
            }
            StorageError::Backend(source) => {
                tracing::error!(error = %source, "storage backend failure");
                UserError::Internal
            }
        }
    }
}

impl From<TokenError> for UserError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid => UserError::InvalidToken,
            TokenError::MissingSecret => {
                tracing::error!("JWT_SECRET is not configured");
                UserError::Config("JWT_SECRET is not configured".to_string())
            }
            TokenError::Encoding(source) => {
                tracing::error!(error = %source, "token encoding failure");
                UserError::Internal
            }
        }
    }
}

/// 사용자 서비스 Result 타입.
pub type UserResult<T> = Result<T, UserError>;
