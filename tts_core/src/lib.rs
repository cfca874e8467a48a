pub mod stream;
pub mod wav;

use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use llm_core::SpeechProvider;
use tracing::info;

pub use stream::{relay, AudioEnvelope};
pub use wav::{pcm_to_wav, streaming_header, wav_header, AudioFormat, DataSize, STREAMING_DATA_SIZE};

/// A WAV body ready to hand to the HTTP layer.
pub type WavStream = Pin<Box<dyn Stream<Item = anyhow::Result<Bytes>> + Send>>;

/// Default prebuilt voice.
pub const DEFAULT_VOICE: &str = "Kore";

/// Longest text, in characters, forwarded to the speech model.
pub const MAX_TEXT_CHARS: usize = 300;

/// Keep the first `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Turns text into a streamed WAV body through a speech provider.
#[derive(Clone)]
pub struct TtsManager {
    provider: Arc<dyn SpeechProvider>,
    format: AudioFormat,
}

impl std::fmt::Debug for TtsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtsManager")
            .field("provider", &"<SpeechProvider>")
            .field("format", &self.format)
            .finish()
    }
}

impl TtsManager {
    pub fn new(provider: Arc<dyn SpeechProvider>) -> Self {
        Self::with_format(provider, AudioFormat::GEMINI_TTS)
    }

    pub fn with_format(provider: Arc<dyn SpeechProvider>, format: AudioFormat) -> Self {
        Self { provider, format }
    }

    /// Start a speech stream and wrap it as WAV.
    ///
    /// Fails only if the provider call itself fails; errors after the first
    /// byte surface as an item of the returned stream.
    pub async fn synthesize_stream(&self, text: &str, voice: &str) -> anyhow::Result<WavStream> {
        let text = truncate_chars(text, MAX_TEXT_CHARS);
        info!(chars = text.chars().count(), voice, "Opening speech stream");
        let source = self.provider.stream_speech(text, voice).await?;
        Ok(Box::pin(relay(source, self.format)))
    }
}
