//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.
//! 핸들러는 [`ApiError`]를 반환하고, 응답 본문은 항상 [`ApiErrorResponse`]입니다.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use userhub_core::UserError;
use utoipa::ToSchema;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "USER_NOT_FOUND",
///   "message": "사용자를 찾을 수 없습니다"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "VALIDATION_ERROR", "USER_NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
}

impl ApiErrorResponse {
    /// 에러 응답 생성.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// 핸들러 에러.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 서비스 계층 에러
    #[error(transparent)]
    User(#[from] UserError),

    /// 요청 본문 파싱 실패
    #[error("잘못된 요청 본문입니다")]
    InvalidBody,

    /// 경로의 사용자 ID가 정수가 아님
    #[error("잘못된 사용자 ID입니다")]
    InvalidId,

    /// 자기 자신 삭제 시도
    #[error("자기 자신은 삭제할 수 없습니다")]
    SelfDelete,
}

impl ApiError {
    /// HTTP 상태 코드와 에러 코드.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::User(err) => match err {
                UserError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                UserError::Unauthorized => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
                UserError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
                UserError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                UserError::NotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
                UserError::Conflict => (StatusCode::CONFLICT, "USER_ALREADY_EXISTS"),
                UserError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
                UserError::Config(_) | UserError::Internal => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            ApiError::InvalidBody | ApiError::InvalidId => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            ApiError::SelfDelete => (StatusCode::BAD_REQUEST, "SELF_DELETE"),
        }
    }

    /// 응답 본문.
    pub fn to_response_body(&self) -> ApiErrorResponse {
        let (_, code) = self.status_and_code();
        ApiErrorResponse::new(code, self.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, _) = self.status_and_code();
        (status, Json(self.to_response_body())).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(reason = %rejection.body_text(), "request body rejected");
        ApiError::InvalidBody
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        debug!(reason = %rejection.body_text(), "path parameter rejected");
        ApiError::InvalidId
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;
