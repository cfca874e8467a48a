//! Common utilities for integration tests
#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use llm_core::{
    ChatMessage, ChatProvider, GenerateContentResponse, SamplingParams, SpeechProvider,
    SpeechStream, TextGeneration, TextGenerator,
};
use server::{config::ServerConfig, create_app, error::SetupError, AppState};
use tower::ServiceExt;
use tts_core::TtsManager;

pub const PCM_MIME: &str = "audio/L16;codec=pcm;rate=24000";

pub fn b64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

pub fn audio_chunk(bytes: &[u8]) -> GenerateContentResponse {
    GenerateContentResponse::audio(PCM_MIME, &b64(bytes))
}

/// Chat provider answering from a script and recording what it was sent.
pub struct StubChat {
    answer: Result<Option<String>, String>,
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl StubChat {
    pub fn answering(reply: &str) -> Self {
        Self { answer: Ok(Some(reply.to_string())), calls: Mutex::new(Vec::new()) }
    }

    pub fn empty() -> Self {
        Self { answer: Ok(None), calls: Mutex::new(Vec::new()) }
    }

    pub fn failing(error: &str) -> Self {
        Self { answer: Err(error.to_string()), calls: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl ChatProvider for StubChat {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _params: SamplingParams,
    ) -> anyhow::Result<Option<String>> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.answer.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

/// Speech provider replaying a fixed list of envelopes.
pub struct StubSpeech {
    script: Result<Vec<Result<GenerateContentResponse, String>>, String>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl StubSpeech {
    pub fn streaming(items: Vec<Result<GenerateContentResponse, String>>) -> Self {
        Self { script: Ok(items), calls: Mutex::new(Vec::new()) }
    }

    pub fn failing(error: &str) -> Self {
        Self { script: Err(error.to_string()), calls: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl SpeechProvider for StubSpeech {
    async fn stream_speech(&self, text: &str, voice: &str) -> anyhow::Result<SpeechStream> {
        self.calls.lock().unwrap().push((text.to_string(), voice.to_string()));
        let items = self.script.clone().map_err(|e| anyhow::anyhow!(e))?;
        let items: Vec<anyhow::Result<GenerateContentResponse>> = items
            .into_iter()
            .map(|item| item.map_err(|e| anyhow::anyhow!(e)))
            .collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

/// Text generator with a fixed outcome.
pub struct StubSummarizer {
    outcome: Result<TextGeneration, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubSummarizer {
    pub fn text(text: &str) -> Self {
        Self { outcome: Ok(TextGeneration::Text(text.to_string())), prompts: Mutex::new(Vec::new()) }
    }

    pub fn blocked() -> Self {
        Self {
            outcome: Ok(TextGeneration::Blocked { reason: "SAFETY".to_string() }),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self { outcome: Err(error.to_string()), prompts: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl TextGenerator for StubSummarizer {
    async fn generate_text(&self, prompt: &str) -> anyhow::Result<TextGeneration> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.outcome.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

/// Provider that answers only after `0` has elapsed.
pub struct Slow(pub Duration);

#[async_trait]
impl ChatProvider for Slow {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _params: SamplingParams,
    ) -> anyhow::Result<Option<String>> {
        tokio::time::sleep(self.0).await;
        Ok(Some("too late".to_string()))
    }
}

#[async_trait]
impl SpeechProvider for Slow {
    async fn stream_speech(&self, _text: &str, _voice: &str) -> anyhow::Result<SpeechStream> {
        tokio::time::sleep(self.0).await;
        Ok(Box::pin(futures::stream::empty::<anyhow::Result<GenerateContentResponse>>()))
    }
}

#[async_trait]
impl TextGenerator for Slow {
    async fn generate_text(&self, _prompt: &str) -> anyhow::Result<TextGeneration> {
        tokio::time::sleep(self.0).await;
        Ok(TextGeneration::Text("too late".to_string()))
    }
}

pub fn test_config(frontend_dir: &Path) -> ServerConfig {
    ServerConfig {
        frontend_dir: frontend_dir.to_path_buf(),
        ..ServerConfig::default()
    }
}

pub fn setup_error(message: &str) -> SetupError {
    SetupError(message.to_string())
}

/// Builder for an [`AppState`] whose providers default to setup errors.
pub struct TestState {
    state: AppState,
}

impl TestState {
    pub fn new(frontend_dir: &Path) -> Self {
        Self {
            state: AppState {
                chat: Err(setup_error("chat not configured")),
                tts: Err(setup_error("tts not configured")),
                summarizer: Err(setup_error("summarizer not configured")),
                config: test_config(frontend_dir),
            },
        }
    }

    pub fn chat(mut self, chat: Arc<dyn ChatProvider>) -> Self {
        self.state.chat = Ok(chat);
        self
    }

    pub fn chat_error(mut self, error: &str) -> Self {
        self.state.chat = Err(setup_error(error));
        self
    }

    pub fn speech(mut self, speech: Arc<dyn SpeechProvider>) -> Self {
        self.state.tts = Ok(Arc::new(TtsManager::new(speech)));
        self
    }

    pub fn summarizer(mut self, summarizer: Arc<dyn TextGenerator>) -> Self {
        self.state.summarizer = Ok(summarizer);
        self
    }

    pub fn timeouts(mut self, llm_secs: u64, request_secs: u64) -> Self {
        self.state.config.llm_timeout_secs = llm_secs;
        self.state.config.request_timeout_secs = request_secs;
        self
    }

    pub fn app(self) -> Router {
        create_app(self.state)
    }
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body)
}

pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, HeaderMap, Bytes) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}
