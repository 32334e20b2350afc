//! services/api/src/bin/api.rs

use api_lib::{
    adapters::OpenAiPlanAdapter,
    config::Config,
    error::ApiError,
    web::{self, planner, rest::ApiDoc, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use meal_plan_core::{PlannerSession, SavedSettings, Settings};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Reads the saved unit system and profiles. Derived targets are re-computed while
/// parsing.
fn load_saved_settings(path: &Path) -> Result<SavedSettings, ApiError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Restore the Planner Session ---
    let restored = config.settings_path.is_some();
    let session = match &config.settings_path {
        Some(path) => {
            let saved = load_saved_settings(path)?;
            info!(
                "Restored settings for {} and {} from {}.",
                saved.her.name(),
                saved.his.name(),
                path.display()
            );
            PlannerSession::from_saved(saved)
        }
        None => {
            warn!("SETTINGS_PATH not set; waiting for PUT /settings before generating a plan.");
            PlannerSession::new(Settings::default())
        }
    };

    // --- 3. Initialize the Provider Adapter ---
    let (api_key, base_url) = config.provider_endpoint()?;
    let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base_url) = base_url {
        info!("Using provider endpoint {}", base_url);
        openai_config = openai_config.with_api_base(base_url);
    }
    let openai_client = Client::with_config(openai_config);

    let provider = Arc::new(OpenAiPlanAdapter::new(
        openai_client,
        config.plan_model.clone(),
        config.alternatives_model.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), provider, session));
    if restored {
        info!("Generating a plan for the restored profiles.");
        planner::spawn_generation(app_state.clone());
    }

    let allowed_origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid ALLOWED_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = web::router(app_state).layer(cors);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
