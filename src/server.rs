use crate::config::Config;
use crate::generator::{self, GenerateOptions};
use crate::zodiac::ZodiacSign;
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

struct AppState {
    cfg: Config,
    client: reqwest::Client,
}

/// Run the HTTP surface: one generation route plus a health probe.
pub async fn run_server(host: &str, port: u16, cfg: Config) -> Result<()> {
    let client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;

    let state = Arc::new(AppState { cfg, client });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/generate_video", post(generate_video))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on http://{}", addr);
    info!("POST /api/generate_video {{\"zodiac_sign\": \"aries\"}}");

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Deserialize)]
struct GenerateVideoRequest {
    zodiac_sign: Option<String>,
}

#[derive(Serialize)]
struct GenerateVideoResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    horoscope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn generate_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateVideoRequest>,
) -> impl IntoResponse {
    let Some(raw_sign) = req.zodiac_sign else {
        return (
            StatusCode::BAD_REQUEST,
            Json(GenerateVideoResponse {
                success: false,
                output: None,
                horoscope: None,
                error: Some("Zodiac sign not provided".to_string()),
            }),
        )
            .into_response();
    };

    let sign: ZodiacSign = match raw_sign.parse() {
        Ok(sign) => sign,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(GenerateVideoResponse {
                    success: false,
                    output: None,
                    horoscope: None,
                    error: Some(err.to_string()),
                }),
            )
                .into_response();
        }
    };

    let opts = GenerateOptions::default();
    match generator::run_generation(&state.cfg, &state.client, sign, &opts).await {
        Ok(outcome) => Json(GenerateVideoResponse {
            success: true,
            output: Some(outcome.output.display().to_string()),
            horoscope: Some(outcome.horoscope),
            error: None,
        })
        .into_response(),
        Err(err) => {
            error!("Generation failed for {}: {:#}", sign, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GenerateVideoResponse {
                    success: false,
                    output: None,
                    horoscope: None,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}
