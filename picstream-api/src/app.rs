/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use picstream_api::{app::AppState, config::Config};
/// use picstream_shared::db::pool::create_pool;
/// use picstream_shared::media::ImageKitClient;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let media = Arc::new(ImageKitClient::new(config.imagekit.client_config())?);
/// let state = AppState::new(pool, config, media);
/// let app = picstream_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, routes};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use picstream_shared::auth::middleware::authenticate;
use picstream_shared::media::MediaStore;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Upload collaborator
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: SqlitePool, config: Config, media: Arc<dyn MediaStore>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            media,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Access token lifetime
    pub fn token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.config.jwt.lifetime_seconds)
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                     # public
/// ├── /auth/                           # public except logout
/// │   ├── POST /register
/// │   ├── POST /jwt/login
/// │   ├── POST /jwt/logout
/// │   ├── POST /request-verify-token
/// │   ├── POST /verify
/// │   ├── POST /forgot-password
/// │   └── POST /reset-password
/// ├── /users/                          # authenticated
/// │   ├── GET|PATCH /me
/// │   └── GET|DELETE /:id              # superuser
/// ├── POST   /upload
/// ├── GET    /feed
/// ├── DELETE /posts/:id
/// ├── POST|DELETE /posts/:id/like
/// ├── POST   /posts/:id/comments
/// └── DELETE /comments/:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/jwt/login", post(routes::auth::login))
        .route("/request-verify-token", post(routes::auth::request_verify_token))
        .route("/verify", post(routes::auth::verify))
        .route("/forgot-password", post(routes::auth::forgot_password))
        .route("/reset-password", post(routes::auth::reset_password));

    let session_routes = Router::new()
        .route("/jwt/logout", post(routes::auth::logout))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let user_routes = Router::new()
        .route(
            "/me",
            get(routes::users::get_me).patch(routes::users::update_me),
        )
        .route(
            "/:id",
            get(routes::users::get_user).delete(routes::users::delete_user),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let content_routes = Router::new()
        .route(
            "/upload",
            post(routes::posts::upload)
                .layer(DefaultBodyLimit::max(state.config.api.max_upload_bytes)),
        )
        .route("/feed", get(routes::feed::get_feed))
        .route("/posts/:id", delete(routes::posts::delete_post))
        .route(
            "/posts/:id/like",
            post(routes::likes::like_post).delete(routes::likes::unlike_post),
        )
        .route("/posts/:id/comments", post(routes::comments::add_comment))
        .route("/comments/:id", delete(routes::comments::delete_comment))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/auth", public_auth_routes.merge(session_routes))
        .nest("/users", user_routes)
        .merge(content_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Resolves the current active user from the bearer token, then injects
/// an `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(&state.db, state.jwt_secret(), req.headers()).await?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use picstream_shared::db::{migrations::run_migrations, pool};
    use picstream_shared::media::InMemoryMediaStore;
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        let db = pool::create_pool(pool::DatabaseConfig::in_memory())
            .await
            .unwrap();
        run_migrations(&db).await.unwrap();
        AppState::new(db, Config::for_testing(), Arc::new(InMemoryMediaStore::new()))
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = build_router(test_state().await);

        for (method, uri) in [
            ("GET", "/feed"),
            ("GET", "/users/me"),
            ("POST", "/auth/jwt/logout"),
            ("DELETE", "/posts/5f0c7a4e-0d4b-4a6e-9a59-1c1d3f2b8c11"),
        ] {
            let response = app
                .clone()
                .oneshot(
                    axum::http::Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        }
    }

    #[tokio::test]
    async fn test_token_lifetime_from_config() {
        let state = test_state().await;
        assert_eq!(state.token_lifetime(), chrono::Duration::seconds(3600));
        assert_eq!(state.media.name(), "memory");
    }
}
