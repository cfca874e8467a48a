use anyhow::{Context, Result};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::sse::SseDecoder;

/// One `GenerateContentResponse` as returned by `generateContent`, or one
/// SSE event of `streamGenerateContent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

/// Base64 payload attached to a part, e.g. `audio/L16;codec=pcm;rate=24000`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Envelope carrying a single inline-data part, as the TTS model streams it.
    pub fn audio(mime_type: &str, data_base64: &str) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".into()),
                    parts: vec![Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: mime_type.into(),
                            data: data_base64.into(),
                        }),
                    }],
                }),
                finish_reason: None,
            }],
            prompt_feedback: None,
        }
    }

    pub fn first_part(&self) -> Option<&Part> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.first())
    }

    /// The reason the provider refused to answer, if it did.
    pub fn block_reason(&self) -> Option<&str> {
        match self.candidates.first() {
            Some(candidate) => candidate
                .finish_reason
                .as_deref()
                .filter(|reason| *reason == "SAFETY"),
            None => self
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.as_deref()),
        }
    }

    /// Concatenated text of the first candidate's parts.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Outcome of a unary text generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextGeneration {
    Text(String),
    Blocked { reason: String },
}

pub type SpeechStream = BoxStream<'static, Result<GenerateContentResponse>>;

/// Audio generation: text plus a prebuilt voice name in, envelopes out.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    async fn stream_speech(&self, text: &str, voice: &str) -> Result<SpeechStream>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<TextGeneration>;
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    tts_model: String,
    text_model: String,
    timeout: Duration,
    client: Client,
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        base_url: &str,
        tts_model: &str,
        text_model: &str,
        timeout: Duration,
    ) -> Result<Self> {
        // No overall timeout on the client: speech streams stay open as long as
        // audio keeps arriving. Unary calls set one per request.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tts_model: tts_model.to_string(),
            text_model: text_model.to_string(),
            timeout,
            client,
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }
}

fn speech_request_body(text: &str, voice: &str) -> serde_json::Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": text }] }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice }
                }
            }
        }
    })
}

fn parse_event(event: &str) -> Result<GenerateContentResponse> {
    serde_json::from_str(event).context("malformed streamGenerateContent event")
}

#[async_trait]
impl SpeechProvider for GeminiClient {
    async fn stream_speech(&self, text: &str, voice: &str) -> Result<SpeechStream> {
        let url = format!("{}?alt=sse", self.model_url(&self.tts_model, "streamGenerateContent"));
        debug!(model = %self.tts_model, voice, text_len = text.len(), "Starting TTS stream");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&speech_request_body(text, voice))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini TTS error {status}: {body}");
        }

        let mut body = response.bytes_stream();
        let stream = try_stream! {
            let mut decoder = SseDecoder::new();
            while let Some(chunk) = body.next().await {
                let chunk = chunk.context("TTS stream interrupted")?;
                for event in decoder.push(&chunk) {
                    yield parse_event(&event)?;
                }
            }
            if let Some(event) = decoder.finish() {
                yield parse_event(&event)?;
            }
        };
        Ok(Box::pin(stream))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<TextGeneration> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(self.model_url(&self.text_model, "generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error {status}: {body}");
        }

        let response = response
            .json::<GenerateContentResponse>()
            .await
            .context("malformed generateContent response")?;

        if let Some(reason) = response.block_reason() {
            return Ok(TextGeneration::Blocked { reason: reason.to_string() });
        }
        response
            .text()
            .map(TextGeneration::Text)
            .context("response contained no text")
    }
}
