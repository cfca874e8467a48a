use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use llm_core::assistant::{provider_error_reply, setup_error_reply};
use llm_core::prompt::{summary_prompt, tehran_now};
use llm_core::{reply_to_student, TextGeneration};

use crate::error::ApiError;
use crate::validation::{validate_summarize_request, validate_tts_request};
use crate::AppState;

/// Returned with status 200 when the model refuses to summarize.
pub const SAFETY_REFUSAL: &str =
    "⚠️ به دلیل خط‌مشی‌های ایمنی، امکان خلاصه‌سازی این متن وجود ندارد.";

#[derive(Deserialize)]
pub struct ReplyRequest {
    user_message: String,
}

#[derive(Serialize)]
pub struct ReplyResponse {
    response: String,
}

#[derive(Deserialize)]
pub struct TtsRequest {
    text: String,
    #[serde(default = "default_voice")]
    voice: String,
}

fn default_voice() -> String {
    tts_core::DEFAULT_VOICE.to_string()
}

#[derive(Deserialize)]
pub struct SummarizeRequest {
    text_to_summarize: String,
}

#[derive(Serialize)]
pub struct SummarizeResponse {
    summary: String,
}

fn timed_out(limit: Duration) -> String {
    format!("request timed out after {}s", limit.as_secs())
}

pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let path = state.config.frontend_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            warn!("Could not read {}: {e}", path.display());
            Err(ApiError::FrontendMissing)
        }
    }
}

/// Chat reply. Always answers 200; failures are embedded in `response`.
pub async fn reply(
    State(state): State<AppState>,
    Json(req): Json<ReplyRequest>,
) -> Json<ReplyResponse> {
    info!("Reply request received: message length={}", req.user_message.len());

    let response = match &state.chat {
        Ok(chat) => {
            let llm_timeout = state.config.llm_timeout();
            let now = tehran_now();
            let reply = reply_to_student(chat.as_ref(), &req.user_message, &now);
            match tokio::time::timeout(llm_timeout, reply).await {
                Ok(reply) => reply,
                Err(_) => {
                    error!("Chat request timed out after {}s", llm_timeout.as_secs());
                    provider_error_reply(&timed_out(llm_timeout))
                }
            }
        }
        Err(setup) => setup_error_reply(&setup.0),
    };

    Json(ReplyResponse { response })
}

/// Streamed speech as `audio/wav` over chunked transfer.
pub async fn tts(
    State(state): State<AppState>,
    Json(req): Json<TtsRequest>,
) -> Result<Response, ApiError> {
    let tts = state
        .tts
        .as_ref()
        .map_err(|setup| ApiError::Setup(setup.0.clone()))?;
    validate_tts_request(&req.text, &req.voice)?;

    let llm_timeout = state.config.llm_timeout();
    let audio = match tokio::time::timeout(llm_timeout, tts.synthesize_stream(&req.text, &req.voice)).await {
        Ok(Ok(audio)) => audio,
        Ok(Err(e)) => return Err(ApiError::Upstream(format!("TTS Stream failed: {e:#}"))),
        Err(_) => {
            return Err(ApiError::Upstream(format!(
                "TTS Stream failed: {}",
                timed_out(llm_timeout)
            )))
        }
    };

    // An error after the first byte cannot change the status any more; the
    // body ends with an error and the connection is dropped.
    let audio = audio.inspect_err(|e| error!("TTS stream aborted: {e:#}"));

    Ok((
        [(header::CONTENT_TYPE, "audio/wav")],
        Body::from_stream(audio),
    )
        .into_response())
}

pub async fn summarize(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let generator = state
        .summarizer
        .as_ref()
        .map_err(|setup| ApiError::Setup(format!("Summarization model setup failed: {setup}")))?;
    validate_summarize_request(&req.text_to_summarize)?;

    let prompt = summary_prompt(&req.text_to_summarize);
    let llm_timeout = state.config.llm_timeout();
    let outcome = tokio::time::timeout(llm_timeout, generator.generate_text(&prompt))
        .await
        .unwrap_or_else(|_| Err(anyhow::anyhow!(timed_out(llm_timeout))));

    match outcome {
        Ok(TextGeneration::Text(text)) => Ok(Json(SummarizeResponse {
            summary: text.trim().to_string(),
        })),
        Ok(TextGeneration::Blocked { reason }) => {
            warn!("Summarization blocked by provider: {reason}");
            Ok(Json(SummarizeResponse {
                summary: SAFETY_REFUSAL.to_string(),
            }))
        }
        Err(e) => Err(ApiError::Upstream(format!("Summarization failed: {e:#}"))),
    }
}
