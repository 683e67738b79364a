//! Axum용 JWT 인증 미들웨어.
//!
//! 보호된 라우트 앞에 두 단계의 관문을 둡니다:
//! 1. [`require_auth`]: `Authorization: Bearer <token>` 검증 후 [`Identity`]를 extensions에 저장
//! 2. [`require_admin`]: extensions의 Identity 역할이 `admin`인지 확인
//!
//! 두 번째 관문은 반드시 첫 번째 관문 뒤에서 실행되어야 합니다.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};
use userhub_core::{Identity, TokenError, UserError};

use crate::error::{ApiError, ApiErrorResponse};
use crate::state::AppState;

/// 인증/권한 에러.
///
/// 헤더 형식 문제는 여기서 직접 응답하고, 토큰/역할/설정 실패는
/// [`UserError`] 분류를 거쳐 [`ApiError`]와 같은 형식으로 응답합니다.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,
    #[error(transparent)]
    Denied(#[from] UserError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Denied(err) => ApiError::from(err).into_response(),
            header_error => {
                let code = match header_error {
                    AuthError::MissingToken => "MISSING_TOKEN",
                    _ => "INVALID_AUTH_HEADER",
                };
                let body = ApiErrorResponse::new(code, header_error.to_string());
                (StatusCode::UNAUTHORIZED, Json(body)).into_response()
            }
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::Denied(UserError::from(err))
    }
}

/// `Authorization` 헤더에서 Bearer 토큰 추출.
///
/// 헤더 값은 공백 하나로 구분된 정확히 두 부분(`Bearer`, 토큰)이어야 합니다.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(*token),
        _ => Err(AuthError::InvalidAuthHeader),
    }
}

/// 인증 관문.
///
/// 토큰을 검증하고 성공 시 [`Identity`]를 요청 extensions에 저장합니다.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = {
        let token = bearer_token(request.headers())?;
        state.tokens.verify(token).map_err(|e| {
            debug!(error = %e, "token rejected");
            AuthError::from(e)
        })?
    };

    let identity = Identity {
        user_id: claims.user_id,
        login: claims.login,
        role: claims.role,
    };
    debug!(user_id = identity.user_id, login = %identity.login, "request authenticated");

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// 권한 관문. admin 역할만 통과합니다.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AuthError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .ok_or(AuthError::MissingToken)?;

    if !identity.is_admin() {
        warn!(
            user_id = identity.user_id,
            login = %identity.login,
            role = %identity.role,
            "admin route denied"
        );
        return Err(UserError::Forbidden.into());
    }

    Ok(next.run(request).await)
}

/// 인증된 호출자 추출기.
///
/// [`require_auth`] 뒤에 있는 핸들러에서만 사용합니다.
///
/// ```rust,ignore
/// async fn handler(CurrentUser(identity): CurrentUser) -> String {
///     identity.login
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::MissingToken)
    }
}
