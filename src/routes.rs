// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{auth, health, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges the auth and quiz routers plus the health probe.
/// * Protects answer submission, history and `/me` with the bearer-token middleware.
/// * Applies global middleware (Trace, CORS) and a JSON 404 fallback.
pub fn create_router(state: AppState) -> Router {
    let allow_origin = match state.config.frontend_url.as_str() {
        "*" => AllowOrigin::any(),
        url => match url.parse::<HeaderValue>() {
            Ok(origin) => AllowOrigin::exact(origin),
            Err(e) => {
                tracing::warn!("Ignoring invalid FRONTEND_URL for CORS: {}", e);
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        },
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .route_layer(require_auth.clone()),
        );

    // `/api/quiz` itself is a route, so these are registered with full paths.
    let quiz_routes = Router::new()
        .route("/api/quiz", get(quiz::get_quiz))
        .route("/api/quiz/leaderboard", get(quiz::get_leaderboard))
        .merge(
            Router::new()
                .route("/api/quiz/{id}/answer", post(quiz::submit_answer))
                .route("/api/quiz/history", get(quiz::get_history))
                .route_layer(require_auth),
        );

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/auth", auth_routes)
        .merge(quiz_routes)
        .fallback(health::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
