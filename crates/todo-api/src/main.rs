//! 할 일 관리 API 서버.
//!
//! 설정을 로드하고 저장소/캐시를 연결한 뒤 Axum 서버를 시작합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use todo_api::routes::create_api_router;
use todo_api::services::AuthService;
use todo_api::state::AppState;
use todo_core::{
    init_logging, AppConfig, LogConfig, ServerConfig, SessionCache, StorageBackend, UserStore,
};
use todo_data::{Database, MemorySessionCache, MemoryUserStore, RedisCache};

/// 연결된 저장소 구성.
struct Backends {
    store: Arc<dyn UserStore>,
    cache: Arc<dyn SessionCache>,
    database: Option<Database>,
    redis: Option<RedisCache>,
}

/// 설정된 백엔드에 연결합니다.
async fn connect_backends(config: &AppConfig) -> Result<Backends, Box<dyn std::error::Error>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let database = Database::connect(&config.database).await?;
            database.migrate().await?;
            let redis = RedisCache::connect(&config.redis).await?;

            Ok(Backends {
                store: Arc::new(database.user_store()),
                cache: Arc::new(redis.clone()),
                database: Some(database),
                redis: Some(redis),
            })
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage, all data is lost on restart");
            Ok(Backends {
                store: Arc::new(MemoryUserStore::new()),
                cache: Arc::new(MemorySessionCache::new()),
                database: None,
                redis: None,
            })
        }
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let restricted = !origins.is_empty();
    let allow_origin = if restricted {
        info!("CORS configured with {} allowed origins", origins.len());
        AllowOrigin::list(origins)
    } else {
        warn!("No valid CORS origins configured, allowing any origin (development mode)");
        AllowOrigin::any()
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        // any origin과 credentials는 함께 쓸 수 없음
        .allow_credentials(restricted)
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    // 서비스 기한(504)이 먼저 동작하도록 HTTP 타임아웃은 여유를 둠
    let http_timeout = config.request_timeout() * 2;

    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            http_timeout,
        ))
        .layer(cors_layer(config))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default()?;

    init_logging(LogConfig::from(&config.logging))?;

    info!("Starting Todo API server...");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            error!(
                host = %config.server.host,
                port = config.server.port,
                error = %e,
                "소켓 주소 설정이 유효하지 않습니다. TODO__SERVER__HOST, TODO__SERVER__PORT를 확인하세요."
            );
            e
        })?;

    let backends = connect_backends(&config).await?;

    let auth = AuthService::new(&config.session, backends.store, backends.cache)?;
    info!(
        cache_write_policy = ?auth.cache_policy(),
        access_ttl_secs = config.session.access_token_ttl_secs,
        refresh_ttl_secs = config.session.refresh_token_ttl_secs,
        "Authentication service initialized"
    );

    let shutdown_token = CancellationToken::new();

    let mut state = AppState::new(Arc::new(auth), config.server.request_timeout())
        .with_shutdown(shutdown_token.clone());
    if let Some(database) = backends.database {
        state = state.with_database(database);
    }
    if let Some(redis) = backends.redis {
        state = state.with_redis(redis);
    }

    info!(
        backend = ?config.storage.backend,
        has_db = state.database.is_some(),
        has_redis = state.redis.is_some(),
        "Service connections status"
    );

    let app = create_router(Arc::new(state), &config.server);

    info!(%addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(
            shutdown_token.clone(),
            config.server.request_timeout(),
        ))
        .await?;

    shutdown_token.cancel();
    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM을 수신하면 새 연결 수락을 멈추고,
/// `drain_grace` 이후 종료 토큰을 취소하여 남은 요청의 컨텍스트에 전파합니다.
async fn shutdown_signal(shutdown_token: CancellationToken, drain_grace: Duration) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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

    tokio::spawn(async move {
        tokio::time::sleep(drain_grace).await;
        shutdown_token.cancel();
        info!("Shutdown signal propagated to in-flight requests");
    });
}
