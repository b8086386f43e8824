pub mod config;
pub mod error;
pub mod filters;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod sessions;
pub mod store;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use config::Config;
use sessions::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionRegistry,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let sessions = SessionRegistry::new(config.session_ttl());
        Self {
            sessions,
            config: Arc::new(config),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::overview))

        // Single-item form and bulk editor
        .route("/items", post(handlers::inventory::create_item))
        .route("/items/new", get(handlers::inventory::item_form))
        .route("/items/edit", get(handlers::inventory::edit_page).post(handlers::inventory::save_edits))

        // CSV import/export
        .route("/transfer", get(handlers::transfer::transfer_page))
        .route("/transfer/export", get(handlers::transfer::export_csv))
        .route("/transfer/import", post(handlers::transfer::import_csv))

        // API routes
        .route("/api/items", get(handlers::api::list_items))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))

        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(max_upload_bytes))
        )
        .with_state(state)
}
