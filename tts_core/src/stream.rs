//! Streaming WAV relay.
//!
//! Turns the envelopes of a streamed speech call into one WAV byte stream
//! suitable for chunked transfer. The header goes out exactly once, in front
//! of the first PCM byte, declaring a placeholder length because the real one
//! is only known when the provider stops sending. Nothing is patched up at
//! the end; chunked HTTP cannot seek back.
//!
//! The relay is pull-driven: one envelope is decoded and forwarded per poll,
//! so a slow client slows the upstream read instead of growing a buffer, and
//! dropping the stream drops the upstream response with it.

use anyhow::Context;
use async_stream::try_stream;
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use futures::{pin_mut, Stream, StreamExt};
use llm_core::GenerateContentResponse;
use tracing::debug;

use crate::wav::{streaming_header, AudioFormat};

/// A provider envelope that may or may not carry base64 audio.
pub trait AudioEnvelope {
    fn audio_base64(&self) -> Option<&str>;
}

impl AudioEnvelope for GenerateContentResponse {
    fn audio_base64(&self) -> Option<&str> {
        self.first_part()
            .and_then(|part| part.inline_data.as_ref())
            .map(|inline| inline.data.as_str())
            .filter(|data| !data.is_empty())
    }
}

/// Relay `source` as a WAV stream in `format`.
///
/// Envelopes without audio are skipped. An empty or audio-less source
/// produces an empty stream with no header. The first error, from the
/// source or from base64 decoding, is yielded and ends the stream.
pub fn relay<S, E>(source: S, format: AudioFormat) -> impl Stream<Item = anyhow::Result<Bytes>>
where
    S: Stream<Item = anyhow::Result<E>>,
    E: AudioEnvelope,
{
    try_stream! {
        pin_mut!(source);
        let mut header_sent = false;
        let mut chunks = 0usize;

        while let Some(envelope) = source.next().await {
            let envelope = envelope?;
            let Some(payload) = envelope.audio_base64() else {
                continue;
            };
            let pcm = general_purpose::STANDARD
                .decode(payload)
                .context("audio chunk is not valid base64")?;

            if !header_sent {
                header_sent = true;
                yield streaming_header(format);
            }
            chunks += 1;
            yield Bytes::from(pcm);
        }

        debug!(chunks, "Audio relay finished");
    }
}
