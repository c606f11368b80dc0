use banner::auth::{ensure_admin, TokenIssuer, DEFAULT_TOKEN_TTL_SECS};
use banner::clock::SystemClock;
use banner::planes::control::CacheWritePolicy;
use server_http::{build_router, telemetry, AppState};
use shared::config::{Config, Environment};
use std::sync::Arc;
use storage_engine::build_cache;
use storage_engine::postgres::{create_pool, mask_password, run_migrations, PgBannerStore, PgUserRepository};
use tracing::{info, warn};

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[tokio::main]
async fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    // .env has to be loaded before the subscriber picks its format
    let dotenv = dotenvy::dotenv();
    let env = std::env::var("BANNER_ENV")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(Environment::Prod);
    telemetry::init_tracing(env);

    info!("Starting banner HTTP server...");
    match dotenv {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();

    info!(
        "Connecting to PostgreSQL at {}",
        mask_password(&config.database.url)
    );
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to connect to PostgreSQL");
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let store = Arc::new(PgBannerStore::new(pool.clone()));
    let users = Arc::new(PgUserRepository::new(pool));
    let cache = build_cache(config.cache_backend, Arc::new(SystemClock));

    let cache_policy = if config.cache_refresh_on_write {
        CacheWritePolicy::Refresh
    } else {
        CacheWritePolicy::Untouched
    };
    info!("Cache write policy: {:?}", cache_policy);

    let token_ttl = i64::try_from(config.token_ttl_secs).unwrap_or_else(|_| {
        warn!(
            "Token TTL {} out of range, using {}s",
            config.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS
        );
        DEFAULT_TOKEN_TTL_SECS
    });
    let tokens = TokenIssuer::new(&config.jwt_secret, token_ttl);

    let state = AppState::from_components(store, users, cache, tokens, cache_policy);

    match ensure_admin(&state.auth, &config.admin_username, &config.admin_password)
        .await
        .expect("Failed to create default admin user")
    {
        Some(admin) => info!("Default admin user created: {}", admin.username),
        None => info!("Admin user already exists: {}", config.admin_username),
    }

    let router = build_router(state, &config.allowed_origins);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind HTTP listener");

    info!("HTTP Server listening on http://{}", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server error");

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
