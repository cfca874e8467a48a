pub mod config;
pub mod error;
pub mod handlers;
pub mod validation;

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use llm_core::{ChatProvider, GeminiClient, OpenAiCompatClient, TextGenerator};
use tts_core::TtsManager;

use crate::config::{ProviderConfig, ServerConfig};
use crate::error::SetupError;

/// Everything a request handler needs, built once at startup and never mutated.
///
/// A provider that failed to configure is kept as its [`SetupError`] so the
/// affected endpoints can report it per request.
#[derive(Clone)]
pub struct AppState {
    pub chat: Result<Arc<dyn ChatProvider>, SetupError>,
    pub tts: Result<Arc<TtsManager>, SetupError>,
    pub summarizer: Result<Arc<dyn TextGenerator>, SetupError>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn from_config(config: ServerConfig, providers: &ProviderConfig) -> Self {
        let chat = build_chat_provider(&config, providers);
        let gemini = build_gemini_client(&config, providers);

        let tts = gemini
            .clone()
            .map(|client| Arc::new(TtsManager::new(client)));
        let summarizer = gemini.map(|client| client as Arc<dyn TextGenerator>);

        Self {
            chat,
            tts,
            summarizer,
            config,
        }
    }
}

fn build_chat_provider(
    config: &ServerConfig,
    providers: &ProviderConfig,
) -> Result<Arc<dyn ChatProvider>, SetupError> {
    let Some(api_key) = providers.chat_api_key.as_deref() else {
        let error = SetupError("کلید API (GAPGPT_API_KEY) یافت نشد.".to_string());
        warn!("GAPGPT_API_KEY is not set, /reply will answer with a setup error");
        return Err(error);
    };

    match OpenAiCompatClient::new(
        api_key,
        &providers.chat_base_url,
        &providers.chat_model,
        config.llm_timeout(),
    ) {
        Ok(client) => {
            info!(
                "Chat client initialized: base_url={}, model={}",
                providers.chat_base_url, providers.chat_model
            );
            Ok(Arc::new(client))
        }
        Err(e) => {
            warn!("Failed to initialize chat client: {e:#}");
            Err(SetupError(format!("خطا در تنظیمات اولیه مدل: {e:#}")))
        }
    }
}

fn build_gemini_client(
    config: &ServerConfig,
    providers: &ProviderConfig,
) -> Result<Arc<GeminiClient>, SetupError> {
    let Some(api_key) = providers.gemini_api_key.as_deref() else {
        warn!("GEMINI_API_KEY is not set, /tts and /summarize are disabled");
        return Err(SetupError(
            "کلید API (GEMINI_API_KEY) در فایل‌های محیطی (مثل .env) یافت نشد.".to_string(),
        ));
    };

    match GeminiClient::new(
        api_key,
        &providers.gemini_base_url,
        &providers.gemini_tts_model,
        &providers.gemini_text_model,
        config.llm_timeout(),
    ) {
        Ok(client) => {
            info!(
                "Gemini client initialized: tts_model={}, text_model={}",
                providers.gemini_tts_model, providers.gemini_text_model
            );
            Ok(Arc::new(client))
        }
        Err(e) => {
            warn!("Failed to initialize Gemini client: {e:#}");
            Err(SetupError(format!("خطا در تنظیمات اولیه مدل: {e:#}")))
        }
    }
}

fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    let Some(allowed_origins) = allowed_origins else {
        warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins");
        return base.allow_origin(Any);
    };

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        warn!("CORS_ALLOWED_ORIGINS is empty, falling back to permissive CORS");
        base.allow_origin(Any)
    } else {
        info!("CORS configured for {} origin(s)", origins.len());
        base.allow_origin(AllowOrigin::list(origins))
    }
}

// Request ID middleware for tracing
async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let header = HeaderValue::from_str(&request_id).ok();
    if let Some(value) = header.clone() {
        request.headers_mut().insert("x-request-id", value);
    }
    let mut response = next.run(request).await;
    if let Some(value) = header {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

pub fn create_app(state: AppState) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.router_timeout()))
        .layer(cors_layer(state.config.cors_allowed_origins.as_deref()))
        .into_inner();

    let frontend = ServeDir::new(&state.config.frontend_dir);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/reply", post(handlers::reply))
        .route("/tts", post(handlers::tts))
        .route("/summarize", post(handlers::summarize))
        .nest_service("/static_files", frontend)
        .layer(axum::middleware::from_fn(add_request_id))
        .layer(middleware_stack)
        .with_state(state)
}
