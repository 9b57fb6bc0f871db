mod auth;
mod chirps;
mod config;
mod error;
mod metrics;
mod store;
mod webhooks;

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{AuthService, TokenService, UserRepository};
use chirps::ChirpRepository;
use config::{Cli, Config};
use metrics::HitCounter;
use store::DocumentStore;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::refresh_handler,
        auth::handlers::revoke_handler,
        auth::handlers::update_user_handler,
        chirps::handlers::create_chirp_handler,
        chirps::handlers::list_chirps_handler,
        chirps::handlers::get_chirp_handler,
        chirps::handlers::delete_chirp_handler,
        webhooks::polka_webhook_handler,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::UpdateUserRequest,
            auth::UserResponse,
            auth::LoginResponse,
            auth::RefreshResponse,
            chirps::Chirp,
            chirps::CreateChirpRequest,
            webhooks::PolkaWebhook,
            webhooks::PolkaWebhookData,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "users", description = "Account registration and profile updates"),
        (name = "auth", description = "Login, refresh and revocation"),
        (name = "chirps", description = "Short text posts"),
        (name = "webhooks", description = "Payment provider callbacks")
    ),
    info(
        title = "Chirpy API",
        version = "0.1.0",
        description = "Social posting API backed by a single JSON document"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chirps: ChirpRepository,
    pub auth: Arc<AuthService>,
    pub tokens: TokenService,
    pub hits: HitCounter,
    pub polka_key: Arc<str>,
}

impl AppState {
    pub fn new(store: DocumentStore, jwt_secret: &str, polka_key: &str) -> Self {
        let tokens = TokenService::new(jwt_secret);
        let auth = AuthService::new(UserRepository::new(store.clone()), tokens.clone());

        Self {
            chirps: ChirpRepository::new(store),
            auth: Arc::new(auth),
            tokens,
            hits: HitCounter::new(),
            polka_key: Arc::from(polka_key),
        }
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl FromRef<AppState> for HitCounter {
    fn from_ref(state: &AppState) -> Self {
        state.hits.clone()
    }
}

/// Handler for GET /api/healthz
async fn readiness_handler() -> &'static str {
    "OK"
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS and tracing layers
fn create_router(state: AppState, fileserver_root: &Path) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Every request under /app counts as a visit
    let app_files = ServiceBuilder::new()
        .layer(middleware::from_fn_with_state(state.hits.clone(), metrics::count_hits))
        .service(ServeDir::new(fileserver_root));

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/app", app_files)
        .route("/admin/metrics", get(metrics::metrics_handler))
        .route("/admin/reset", post(metrics::reset_handler))
        // API routes
        .route("/api/healthz", get(readiness_handler))
        .route(
            "/api/users",
            post(auth::handlers::register_handler).put(auth::handlers::update_user_handler),
        )
        .route("/api/login", post(auth::handlers::login_handler))
        .route("/api/refresh", post(auth::handlers::refresh_handler))
        .route("/api/revoke", post(auth::handlers::revoke_handler))
        .route(
            "/api/chirps",
            post(chirps::handlers::create_chirp_handler).get(chirps::handlers::list_chirps_handler),
        )
        .route(
            "/api/chirps/:chirp_id",
            get(chirps::handlers::get_chirp_handler).delete(chirps::handlers::delete_chirp_handler),
        )
        .route("/api/polka/webhooks", post(webhooks::polka_webhook_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    tracing::info!("Chirpy API - Starting...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if cli.debug {
        tracing::warn!("Debug mode: deleting {}", config.database_path.display());
        DocumentStore::remove(&config.database_path)
            .await
            .expect("Failed to delete database file");
    }

    let store = DocumentStore::open(&config.database_path)
        .await
        .expect("Failed to open document store");

    let state = AppState::new(store.clone(), &config.jwt_secret, &config.polka_key);
    let app = create_router(state, &config.fileserver_root);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!(
        "Serving files from {} on http://{}",
        config.fileserver_root.display(),
        addr
    );
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    store.close().await;
}
