//! REST API 라우트.
//!
//! # 엔드포인트
//!
//! | 메서드 | 경로 | 인증 |
//! |---|---|---|
//! | GET | `/api/v1/users` | 없음 |
//! | POST | `/api/v1/login` | 없음 |
//! | POST | `/api/v1/admin/users` | Bearer + admin |
//! | PUT | `/api/v1/admin/users/{id}` | Bearer + admin |
//! | DELETE | `/api/v1/admin/users/{id}` | Bearer + admin |
//! | GET | `/health`, `/health/ready` | 없음 |

pub mod auth;
pub mod health;
pub mod users;

use std::sync::Arc;

use axum::{
    extract::{FromRequest, FromRequestParts},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use validator::ValidationErrors;

use crate::auth::{require_admin, require_auth};
use crate::error::ApiError;
use crate::state::AppState;

pub use auth::{LoginRequest, LoginResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use users::{CreateUserRequest, DeleteUserResponse, UpdateUserRequest};

/// JSON 본문 추출기. 파싱 실패는 400 `VALIDATION_ERROR`로 응답합니다.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// 경로 파라미터 추출기. 파싱 실패는 400 `VALIDATION_ERROR`로 응답합니다.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

/// validator 에러를 사용자용 메시지로 변환.
pub(crate) fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join("; ")
}

/// 전체 API 라우터 생성.
///
/// 관리자 라우트에는 인증 관문과 권한 관문이 이 순서로 적용됩니다.
pub fn create_api_router(state: Arc<AppState>) -> Router {
    let admin = users::admin_router()
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/health", health_router())
        .route("/api/v1/users", get(users::list_users))
        .route("/api/v1/login", post(auth::login))
        .nest("/api/v1/admin", admin)
        .with_state(state)
}
