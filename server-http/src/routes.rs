use crate::handlers;
use crate::middleware::{auth_middleware, require_admin};
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build and configure the application router
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let auth = state.auth.clone();

    // Listing and every write
    let admin_routes = Router::new()
        .route(
            "/banner",
            get(handlers::list_banners).post(handlers::create_banner),
        )
        .route(
            "/banner/{id}",
            patch(handlers::update_banner).delete(handlers::delete_banner),
        )
        .route("/feature", post(handlers::create_feature))
        .route("/tag", post(handlers::create_tag))
        .route_layer(from_fn_with_state(auth.clone(), require_admin));

    // Any authenticated principal
    let protected_routes = Router::new()
        .route("/user_banner", get(handlers::get_user_banner))
        .merge(admin_routes)
        .route_layer(from_fn_with_state(auth, auth_middleware));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .merge(protected_routes)
        .layer(build_cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `*` or an empty list allows any origin.
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        tracing::info!("CORS: allowing all origins");
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("CORS: ignoring malformed origin '{}'", o);
                None
            }
        })
        .collect();

    tracing::info!("CORS: allowing origins {:?}", origins);
    cors.allow_origin(origins)
}
