//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;
use userhub_core::{AllUser, User};

use crate::error::ApiErrorResponse;
use crate::routes::{
    ComponentHealth, ComponentStatus, CreateUserRequest, DeleteUserResponse, HealthResponse,
    LoginRequest, LoginResponse, UpdateUserRequest,
};

/// Bearer 토큰 보안 스킴 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Userhub API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Userhub API",
        description = r#"
# Userhub 사용자 관리 REST API

JWT 인증과 역할 기반 권한을 갖춘 사용자 CRUD 서비스입니다.

## 인증

`POST /api/v1/login`으로 토큰을 받은 뒤 관리자 엔드포인트에
`Authorization: Bearer <token>` 헤더를 포함하세요. 토큰은 24시간 유효합니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "auth", description = "인증 - 로그인 및 토큰 발급"),
        (name = "users", description = "사용자 - 공개 목록"),
        (name = "admin", description = "관리 - 사용자 생성/수정/삭제 (admin 전용)")
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            HealthResponse,
            ComponentHealth,
            ComponentStatus,
            ApiErrorResponse,
            User,
            AllUser,
            LoginRequest,
            LoginResponse,
            CreateUserRequest,
            UpdateUserRequest,
            DeleteUserResponse,
        )
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
        crate::routes::auth::login,
        crate::routes::users::list_users,
        crate::routes::users::create_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
///
/// 다음 경로에 문서 UI를 마운트합니다:
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
