//! Provider clients for the student assistant.
//!
//! The chat model speaks the OpenAI chat-completions dialect; speech and
//! summaries come from Gemini. Each provider sits behind a small trait so the
//! HTTP layer can be driven by stubs.

pub mod assistant;
pub mod chat;
pub mod gemini;
pub mod prompt;
pub mod sse;

pub use assistant::reply_to_student;
pub use chat::{ChatMessage, ChatProvider, OpenAiCompatClient, SamplingParams};
pub use gemini::{
    GeminiClient, GenerateContentResponse, SpeechProvider, SpeechStream, TextGeneration,
    TextGenerator,
};
