use crate::error::ApiError;

/// Longest voice name accepted; prebuilt Gemini voices are short single words.
const MAX_VOICE_LENGTH: usize = 32;

/// Validate TTS request
///
/// Length is not capped here: the text is truncated before it reaches the
/// speech model.
pub fn validate_tts_request(text: &str, voice: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::InvalidInput("Text cannot be empty".to_string()));
    }
    if !is_valid_voice_name(voice) {
        return Err(ApiError::InvalidInput(format!(
            "Invalid voice name: {}. Expected a prebuilt voice such as Kore",
            voice
        )));
    }
    Ok(())
}

/// Validate summarize request
pub fn validate_summarize_request(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::InvalidInput(
            "Text to summarize cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Voice names are ASCII letters, optionally with `-` or `_` (e.g. Kore, Puck).
fn is_valid_voice_name(voice: &str) -> bool {
    !voice.is_empty()
        && voice.len() <= MAX_VOICE_LENGTH
        && voice.starts_with(|c: char| c.is_ascii_alphabetic())
        && voice
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
