use chrono::{DateTime, FixedOffset};
use tracing::{error, info};

use crate::chat::{ChatProvider, SamplingParams};
use crate::prompt::build_messages;

pub const NO_ANSWER_MESSAGE: &str = "😔 متاسفم، نتوانستم پاسخ مناسبی پیدا کنم.";

pub fn setup_error_reply(setup_error: &str) -> String {
    format!("⚠️ خطای داخلی سیستم: {setup_error}")
}

pub fn provider_error_reply(error: &str) -> String {
    format!("⚠️ ببخشید، در حال حاضر در ارتباط با سرور مشکل دارم. خطا: {error}")
}

/// Ask the chat model to answer a student.
///
/// Never fails: provider errors and empty answers are turned into a
/// message the frontend can show as-is.
pub async fn reply_to_student(
    provider: &dyn ChatProvider,
    user_text: &str,
    now: &DateTime<FixedOffset>,
) -> String {
    let messages = build_messages(user_text, now);
    match provider.complete(&messages, SamplingParams::default()).await {
        Ok(Some(reply)) => {
            info!("Chat reply received, length={}", reply.len());
            reply
        }
        Ok(None) => NO_ANSWER_MESSAGE.to_string(),
        Err(e) => {
            let error = format!("{e:#}");
            error!("Chat API error: {error}");
            provider_error_reply(&error)
        }
    }
}
