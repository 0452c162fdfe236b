use axum::{
    extract::FromRef,
    http::{header, Method},
    middleware,
    routing::{get, put},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod config;
mod db;
pub mod error;
mod handlers;
mod models;
pub mod repository;
mod schema;
mod services;

use crate::auth::AuthConfig;
use crate::config::AppConfig;
use crate::db::DbPool;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub auth_config: AuthConfig,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "command_center=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    // Establish database connection pool
    let pool = db::establish_connection_pool(&config)?;

    let state = AppState {
        pool,
        auth_config: AuthConfig::from_app_config(&config),
    };

    let app = build_router(state, build_cors_layer(config.cors_allowed_origins.as_deref()));

    // Serve static frontend files if the directory exists
    let frontend_dir = &config.frontend_dir;
    let app = if std::path::Path::new(frontend_dir).exists() {
        tracing::info!("Serving frontend from {}", frontend_dir);
        let index_path = format!("{}/index.html", frontend_dir);
        let serve_dir = ServeDir::new(frontend_dir).not_found_service(ServeFile::new(&index_path));
        app.fallback_service(serve_dir)
    } else {
        tracing::info!(
            "Frontend directory not found at {}, serving API only",
            frontend_dir
        );
        app
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        // Repeated todo routes
        .route(
            "/repeated-todos",
            get(handlers::repeated_todos::list_repeated_todos)
                .post(handlers::repeated_todos::create_repeated_todo),
        )
        .route(
            "/repeated-todos/reorder",
            put(handlers::repeated_todos::reorder_repeated_todos),
        )
        .route(
            "/repeated-todos/:id/toggle",
            put(handlers::repeated_todos::toggle_day),
        )
        .route(
            "/repeated-todos/:id",
            put(handlers::repeated_todos::update_repeated_todo)
                .delete(handlers::repeated_todos::delete_repeated_todo),
        )
        // Todo routes
        .route(
            "/todos",
            get(handlers::todos::list_todos).post(handlers::todos::create_todo),
        )
        .route("/todos/reorder", put(handlers::todos::reorder_todos))
        .route(
            "/todos/:id",
            put(handlers::todos::update_todo).delete(handlers::todos::delete_todo),
        )
        // Reminder routes
        .route(
            "/reminders",
            get(handlers::reminders::list_reminders).post(handlers::reminders::create_reminder),
        )
        .route(
            "/reminders/reorder",
            put(handlers::reminders::reorder_reminders),
        )
        .route(
            "/reminders/:id",
            put(handlers::reminders::update_reminder).delete(handlers::reminders::delete_reminder),
        )
        // Category routes
        .route(
            "/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route(
            "/categories/:id",
            get(handlers::categories::get_category)
                .put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        )
        // Note routes
        .route(
            "/notes",
            get(handlers::notes::list_notes).post(handlers::notes::create_note),
        )
        .route(
            "/notes/:id",
            get(handlers::notes::get_note)
                .put(handlers::notes::update_note)
                .delete(handlers::notes::delete_note),
        )
        // Idea routes
        .route(
            "/ideas",
            get(handlers::ideas::list_ideas).post(handlers::ideas::create_idea),
        )
        .route(
            "/ideas/:id",
            get(handlers::ideas::get_idea)
                .put(handlers::ideas::update_idea)
                .delete(handlers::ideas::delete_idea),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Build CORS layer from the configured origin list.
///
/// If CORS_ALLOWED_ORIGINS is set, only those origins are allowed.
/// If not set, defaults to permissive CORS (for development only).
fn build_cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    match allowed_origins {
        Some(origins) => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                tracing::warn!(
                    "CORS_ALLOWED_ORIGINS is set but empty, using permissive CORS (not recommended for production)"
                );
                CorsLayer::permissive()
            } else {
                tracing::info!("CORS configured for origins: {:?}", origins);
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods([
                        Method::GET,
                        Method::POST,
                        Method::PUT,
                        Method::DELETE,
                        Method::OPTIONS,
                    ])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                    .allow_credentials(true)
            }
        }
        None => {
            tracing::warn!(
                "CORS_ALLOWED_ORIGINS not set, using permissive CORS (not recommended for production)"
            );
            CorsLayer::permissive()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use diesel_async::{
        pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager},
        AsyncPgConnection,
    };
    use tower::ServiceExt;

    fn test_auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "router-test-secret".to_string(),
            token_duration_days: 7,
            cookie_name: "auth_token".to_string(),
            secure_cookies: false,
        }
    }

    /// Router over a pool whose database is unreachable; building the pool
    /// does not connect.
    fn test_app() -> Router {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new("postgres://127.0.0.1:1/none");
        let pool = Pool::builder(manager).max_size(1).build().unwrap();
        let state = AppState {
            pool,
            auth_config: test_auth_config(),
        };
        build_router(state, build_cors_layer(None))
    }

    #[tokio::test]
    async fn test_api_requires_authentication() {
        for (method, uri) in [
            ("GET", "/api/repeated-todos"),
            ("PUT", "/api/repeated-todos/reorder"),
            ("GET", "/api/todos"),
            ("GET", "/api/categories"),
            ("DELETE", "/api/notes/00000000-0000-0000-0000-000000000000"),
        ] {
            let response = test_app()
                .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        }
    }

    #[tokio::test]
    async fn test_health_reports_unreachable_database() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_day_gets_json_error_body() {
        let token = auth::jwt::create_token(&test_auth_config(), uuid::Uuid::new_v4()).unwrap();
        let request = Request::builder()
            .method("PUT")
            .uri("/api/repeated-todos/00000000-0000-0000-0000-000000000000/toggle")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"day":"funday"}"#))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Invalid request body");
        assert!(body["details"].as_str().unwrap().contains("funday"));
    }
}
