use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::cache;
use crate::config::config;
use crate::database::schema::ensure_schema;
use crate::database::DatabaseManager;
use crate::state::AppState;

/// Connect, migrate, and serve until the process is stopped.
pub async fn serve() -> anyhow::Result<()> {
    let settings = config();
    tracing::info!("Starting DevAssets API in {:?} mode", settings.environment);

    let pool = DatabaseManager::connect().await?;
    ensure_schema(&pool).await?;

    let backend = cache::connect_from_config(&settings.cache).await;
    let state = AppState::new(pool, backend);
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", settings.http.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("DevAssets API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(asset_routes())
        .merge(history_routes())
        .merge(directory_routes());

    if config().http.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.layer(cors_layer()).with_state(state)
}

fn asset_routes() -> Router<AppState> {
    use crate::handlers::assets;

    Router::new()
        .route(
            "/api/assets",
            get(assets::asset_list).post(assets::asset_create),
        )
        .route(
            "/api/assets/:id",
            get(assets::asset_get)
                .patch(assets::asset_update)
                .delete(assets::asset_delete),
        )
}

fn history_routes() -> Router<AppState> {
    use crate::handlers::history;

    Router::new()
        .route("/api/assets/:id/history", get(history::asset_history))
        .route("/api/assets-history", get(history::history_feed))
}

fn directory_routes() -> Router<AppState> {
    use crate::handlers::{categories, departments, employees};

    Router::new()
        .route(
            "/api/employees",
            get(employees::employee_list).post(employees::employee_create),
        )
        .route("/api/employees/:id", get(employees::employee_get))
        .route(
            "/api/categories",
            get(categories::category_list).post(categories::category_create),
        )
        .route(
            "/api/departments",
            get(departments::department_list).post(departments::department_create),
        )
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config()
        .http
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "DevAssets API",
            "version": version,
            "description": "IT asset and employee management backend with an auditable reassignment ledger",
            "endpoints": {
                "home": "/",
                "health": "/health",
                "assets": "/api/assets, /api/assets/:id",
                "asset_history": "/api/assets/:id/history",
                "history_feed": "/api/assets-history",
                "employees": "/api/employees, /api/employees/:id",
                "categories": "/api/categories",
                "departments": "/api/departments",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
