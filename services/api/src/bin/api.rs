//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        NoopAuthAdapter, OpenAiStudyAdapter, TextExportAdapter, YoutubeVideoAdapter,
    },
    config::Config,
    error::ApiError,
    web::{
        authenticate, create_study_handler, export_handler, generate_handler, rest::ApiDoc,
        state::AppState, transcript_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{header::CONTENT_TYPE, Method},
    middleware as axum_middleware,
    routing::post,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let generator = Arc::new(OpenAiStudyAdapter::new(
        openai_client.clone(),
        config.study_model.clone(),
        config.generation_timeout,
    ));
    let video = Arc::new(YoutubeVideoAdapter::new(reqwest::Client::new()));
    let auth = Arc::new(NoopAuthAdapter::new());
    let export = Arc::new(TextExportAdapter::new());

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        generator,
        video,
        auth,
        export,
    });

    // The generation boundary is public by design: any origin, POST plus
    // the OPTIONS preflight, Content-Type only.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/generate", post(generate_handler))
        .route("/transcript", post(transcript_handler))
        .route("/studies", post(create_study_handler))
        .route("/export", post(export_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            authenticate,
        ))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
