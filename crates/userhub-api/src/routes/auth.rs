//! 로그인 endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use userhub_core::{User, UserError};
use utoipa::ToSchema;
use validator::Validate;

use super::{validation_message, AppJson};
use crate::error::{ApiErrorResponse, ApiResult};
use crate::metrics::record_login;
use crate::state::AppState;

/// 로그인 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "로그인은 필수입니다"))]
    pub login: String,
    #[validate(length(min = 1, message = "비밀번호는 필수입니다"))]
    pub password: String,
}

/// 로그인 응답. `user.password`는 항상 빈 문자열입니다.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// 로그인.
///
/// POST /api/v1/login
#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = LoginResponse),
        (status = 400, description = "잘못된 요청 본문", body = ApiErrorResponse),
        (status = 401, description = "잘못된 로그인 정보", body = ApiErrorResponse),
        (status = 500, description = "토큰 발급 실패", body = ApiErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    request
        .validate()
        .map_err(|e| UserError::Validation(validation_message(&e)))?;

    let user = state
        .users
        .authenticate(&request.login, &request.password)
        .await
        .inspect_err(|e| {
            record_login(match e {
                UserError::Unauthorized => "rejected",
                _ => "error",
            })
        })?;

    let token = state
        .tokens
        .issue(user.id, &user.login, &user.role)
        .map_err(|e| {
            error!(error = %e, login = %user.login, "failed to issue token");
            record_login("error");
            UserError::from(e)
        })?;

    record_login("success");
    info!(user_id = user.id, login = %user.login, "user logged in");

    Ok(Json(LoginResponse {
        token,
        user: user.scrub(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
        routing::post,
        Router,
    };
    use tower::ServiceExt;
    use userhub_core::{MemoryStorage, TokenManager, UserServiceImpl};

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/api/v1/login", post(login))
            .with_state(Arc::new(state))
    }

    fn login_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_success_scrubs_password() {
        let storage = Arc::new(MemoryStorage::new());
        let alice = storage.seed("alice", "secret", "admin");
        let state = create_test_state(storage);
        let tokens = state.tokens.clone();

        let response = app(state)
            .oneshot(login_request(r#"{"login":"alice","password":"secret"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: LoginResponse = serde_json::from_slice(&body).unwrap();
        assert!(!parsed.token.is_empty());
        assert_eq!(parsed.user.password, "");
        assert_eq!(parsed.user.id, alice.id);

        let claims = tokens.verify(&parsed.token).unwrap();
        assert_eq!(claims.user_id, alice.id);
        assert_eq!(claims.role, "admin");
    }

    #[tokio::test]
    async fn test_login_bad_credentials() {
        let storage = Arc::new(MemoryStorage::new());
        storage.seed("bob", "rightpw", "user");
        let router = app(create_test_state(storage));

        for body in [
            r#"{"login":"bob","password":"wrongpw"}"#,
            r#"{"login":"ghost","password":"anything"}"#,
        ] {
            let response = router.clone().oneshot(login_request(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let err: ApiErrorResponse = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(err.code, "INVALID_CREDENTIALS");
        }
    }

    #[tokio::test]
    async fn test_login_bad_body() {
        let router = app(create_test_state(Arc::new(MemoryStorage::new())));

        for body in ["not json", r#"{"login":"alice"}"#, r#"{"login":"","password":""}"#] {
            let response = router.clone().oneshot(login_request(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        }
    }

    #[tokio::test]
    async fn test_login_without_secret_is_internal_error() {
        let storage = Arc::new(MemoryStorage::new());
        storage.seed("alice", "secret", "user");
        let state = AppState::new(
            Arc::new(UserServiceImpl::new(storage)),
            Arc::new(TokenManager::new(None)),
        );

        let response = app(state)
            .oneshot(login_request(r#"{"login":"alice","password":"secret"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let err: ApiErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err.code, "INTERNAL_ERROR");
    }
}
