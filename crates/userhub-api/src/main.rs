//! 사용자 관리 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 로그인, 사용자 목록, 관리자용 사용자 CRUD 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use userhub_api::openapi::swagger_ui_router;
use userhub_api::{create_api_router, metrics_layer, setup_metrics_recorder, AppState, PgStorage};
use userhub_core::logging::{init_logging, LogConfig};
use userhub_core::{AppConfig, NewUser, TokenManager, UserError, UserService, UserServiceImpl};

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS`(쉼표 구분)가 설정되면 해당 origin만 허용하고,
/// 없으면 모든 origin을 허용합니다 (개발 모드).
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// Prometheus 메트릭 렌더링 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_api_router(state))
        .merge(swagger_ui_router())
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그가 있으면 스펙을 stdout으로 출력하고 `true`를 반환합니다.
fn handle_export_openapi() -> Result<bool, Box<dyn std::error::Error>> {
    use userhub_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    if !std::env::args().any(|arg| arg == "--export-openapi") {
        return Ok(false);
    }

    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(true)
}

/// 부트스트랩 관리자 계정 생성. 이미 존재하면 건너뜁니다.
async fn bootstrap_admin(users: &dyn UserService, login: &str, password: &str) {
    let admin = NewUser {
        login: login.to_string(),
        password: password.to_string(),
        role: Some(userhub_core::ROLE_ADMIN.to_string()),
    };

    match users.create_user(admin).await {
        Ok(user) => info!(user_id = user.id, %login, "Bootstrap admin created"),
        Err(UserError::Conflict) => info!(%login, "Bootstrap admin already exists"),
        Err(e) => warn!(%login, error = %e, "Failed to create bootstrap admin"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    if handle_export_openapi()? {
        return Ok(());
    }

    init_logging(LogConfig::from_env())?;
    info!("Starting Userhub API server...");

    let config = AppConfig::load().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            error!(
                host = %config.server.host,
                port = config.server.port,
                error = %e,
                "소켓 주소 설정이 유효하지 않습니다. API_HOST, API_PORT 환경변수를 확인하세요."
            );
            e
        })?;

    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    let jwt_secret = config.auth.jwt_secret();
    if jwt_secret.is_none() {
        warn!("JWT_SECRET not set; login and protected routes will fail until it is configured");
    }
    let tokens = TokenManager::new(jwt_secret).with_ttl(config.auth.token_ttl());

    // 데이터베이스 연결 (실패 시 즉시 종료)
    let storage = PgStorage::connect(&config.database).await.map_err(|e| {
        error!(error = %e, "Failed to connect to database");
        e
    })?;

    if config.database.run_migrations {
        storage.migrate().await?;
    }

    let users: Arc<dyn UserService> = Arc::new(
        UserServiceImpl::new(Arc::new(storage.clone()))
            .with_timeouts(config.timeouts.service_timeouts()),
    );

    if let Some((login, password)) = config.auth.bootstrap_admin() {
        bootstrap_admin(users.as_ref(), login, password).await;
    }

    let state = Arc::new(AppState::new(users, Arc::new(tokens)).with_database(storage));
    info!(version = %state.version, "Application state initialized");

    let app = create_router(state, metrics_handle);

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환하여 서버가 진행 중인 요청을 마치고 종료되게 합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
