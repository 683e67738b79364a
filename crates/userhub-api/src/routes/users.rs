//! 사용자 관리 endpoint.
//!
//! 목록 조회는 공개이며, 생성/수정/삭제는 관리자 전용입니다.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use userhub_core::{AllUser, NewUser, UserError, UserPatch};
use utoipa::ToSchema;
use validator::Validate;

use super::{validation_message, AppJson, AppPath};
use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::metrics::record_user_mutation;
use crate::state::AppState;

/// 사용자 생성 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "로그인은 필수입니다"))]
    pub login: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "비밀번호는 필수입니다"))]
    pub password: String,
    /// 생략하거나 비우면 "user"
    #[serde(default)]
    pub role: Option<String>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            login: req.login,
            password: req.password,
            role: req.role,
        }
    }
}

/// 사용자 수정 요청. 생략하거나 비운 필드는 현재 값을 유지합니다.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        UserPatch {
            login: req.login,
            password: req.password,
            role: req.role,
        }
    }
}

/// 사용자 삭제 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteUserResponse {
    pub message: String,
    pub deleted_user: AllUser,
}

/// 전체 사용자 목록 (login 오름차순, 비밀번호 제외).
///
/// GET /api/v1/users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "사용자 목록", body = Vec<AllUser>),
        (status = 500, description = "저장소 오류", body = ApiErrorResponse)
    )
)]
pub async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<AllUser>>> {
    Ok(Json(state.users.get_all_users().await?))
}

/// 사용자 생성.
///
/// POST /api/v1/admin/users
#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    tag = "admin",
    request_body = CreateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "생성됨", body = AllUser),
        (status = 400, description = "로그인 또는 비밀번호 누락", body = ApiErrorResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse),
        (status = 403, description = "admin 역할 필요", body = ApiErrorResponse),
        (status = 409, description = "이미 존재하는 로그인", body = ApiErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<AllUser>)> {
    request
        .validate()
        .map_err(|e| UserError::Validation(validation_message(&e)))?;

    let created = state.users.create_user(request.into()).await?;
    record_user_mutation("create");

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// 사용자 병합 수정.
///
/// PUT /api/v1/admin/users/{id}
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "사용자 ID")),
    request_body = UpdateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "수정됨", body = AllUser),
        (status = 400, description = "잘못된 ID 또는 본문", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse),
        (status = 409, description = "이미 존재하는 로그인", body = ApiErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
    AppJson(request): AppJson<UpdateUserRequest>,
) -> ApiResult<Json<AllUser>> {
    let updated = state.users.update_user(id, request.into()).await?;
    record_user_mutation("update");

    Ok(Json(updated.into()))
}

/// 사용자 삭제. 자기 자신은 삭제할 수 없습니다.
///
/// DELETE /api/v1/admin/users/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "사용자 ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "삭제됨", body = DeleteUserResponse),
        (status = 400, description = "자기 자신 삭제 또는 잘못된 ID", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    AppPath(id): AppPath<i32>,
) -> ApiResult<Json<DeleteUserResponse>> {
    if caller.is_self(id) {
        warn!(user_id = caller.user_id, target_id = id, "self-deletion rejected");
        return Err(ApiError::SelfDelete);
    }

    let deleted = state.users.delete_user(id).await?;
    record_user_mutation("delete");
    info!(user_id = caller.user_id, target_id = id, "user deleted by admin");

    Ok(Json(DeleteUserResponse {
        message: "사용자가 삭제되었습니다".to_string(),
        deleted_user: deleted.into(),
    }))
}

/// 관리자 전용 라우터 (`/api/v1/admin` 아래에 마운트).
pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", put(update_user).delete(delete_user))
}
