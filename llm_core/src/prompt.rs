//! Prompt text for the student assistant and the summarizer.

use chrono::{DateTime, Datelike, FixedOffset, Utc};

use crate::chat::ChatMessage;

pub const SYSTEM_INSTRUCTION: &str = "تو یک دستیار هوشمند، فوق‌العاده فان، دلسوز و خوش‌مشرب دانشجویان هستی که به زبان فارسی محاوره‌ای و دوستانه پاسخ می‌دهی.
خودت را یک دستیار پرانرژی و مشتاق فرض کن که عاشق کمک به دانشجوهاست و حتی اگر سوال سخت بود، با شوخ‌طبعی و لحنی دوستانه و صمیمی جواب بده.
سازنده و توسعه دهنده اصلی تو محمدرضا فاضلی و محمد ابراهیم تاجیک هستند. اگر کسی درباره سازنده یا توسعه دهنده پرسید، نام آن‌ها را بگو.
وظیفه اصلی تو پاسخ دادن به سوالات درسی، پروژه‌ای، برنامه‌نویسی و ارائه خلاصه، اطلاعات یا توضیحات مرتبط با زندگی آکادمیک است.
";

const DATETIME_HINT: &str =
    "اگر کاربر درباره تاریخ، ساعت، روز یا زمان پرسید، از اطلاعات بالا استفاده کن و دقیق جواب بده.";

/// Monday first, matching `Weekday::num_days_from_monday`.
const PERSIAN_WEEKDAYS: [&str; 7] = [
    "دوشنبه",
    "سه‌شنبه",
    "چهارشنبه",
    "پنج‌شنبه",
    "جمعه",
    "شنبه",
    "یکشنبه",
];

/// Iran has observed a fixed UTC+03:30 since daylight saving was abolished in 2022.
const TEHRAN_OFFSET: FixedOffset = match FixedOffset::east_opt(3 * 3600 + 30 * 60) {
    Some(offset) => offset,
    None => panic!("UTC+03:30 is out of range"),
};

pub fn tehran_offset() -> FixedOffset {
    TEHRAN_OFFSET
}

pub fn tehran_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&tehran_offset())
}

pub fn persian_weekday(now: &DateTime<FixedOffset>) -> &'static str {
    PERSIAN_WEEKDAYS[now.weekday().num_days_from_monday() as usize]
}

pub fn datetime_block(now: &DateTime<FixedOffset>) -> String {
    format!(
        "\nتاریخ و زمان فعلی:\n- روز: {}\n- تاریخ میلادی: {}\n- ساعت (وقت تهران): {}\n",
        persian_weekday(now),
        now.format("%Y/%m/%d"),
        now.format("%H:%M:%S"),
    )
}

/// System instruction plus the clock, followed by the student's message.
pub fn build_messages(user_text: &str, now: &DateTime<FixedOffset>) -> Vec<ChatMessage> {
    let system = format!(
        "{}\n\n{}\n\n{}",
        SYSTEM_INSTRUCTION,
        datetime_block(now),
        DATETIME_HINT
    );
    vec![ChatMessage::system(system), ChatMessage::user(user_text)]
}

pub fn summary_prompt(text: &str) -> String {
    format!(
        "متن زیر را به صورت مختصر و در حد یک پاراگراف، به زبان فارسی خلاصه کن:\n\nمتن: \"{}\"",
        text
    )
}
