use std::fmt::Display;

use chrono::{Local, TimeZone, Utc};

const LIST_DATE_FORMAT: &str = "%d/%m/%Y %I:%M %P";
const HEADER_DATE_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Short local date for list rows.
pub fn list_date(epoch_ms: i64) -> String {
    format_epoch_ms(epoch_ms, &Local, LIST_DATE_FORMAT)
}

/// Full local date and time for the header of an open email.
pub fn header_date(epoch_ms: i64) -> String {
    format_epoch_ms(epoch_ms, &Local, HEADER_DATE_FORMAT)
}

/// Timestamps chrono cannot represent are printed as the raw number.
fn format_epoch_ms<Tz>(epoch_ms: i64, tz: &Tz, fmt: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match Utc.timestamp_millis_opt(epoch_ms).single() {
        Some(utc) => utc.with_timezone(tz).format(fmt).to_string(),
        None => {
            log::debug!("Date {epoch_ms} out of range");
            epoch_ms.to_string()
        }
    }
}

/// Render an HTML body as wrapped plain text for terminal output.
pub fn body_to_text(html: &str, width: usize) -> String {
    match html2text::from_read(html.as_bytes(), width) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Could not render body as text: {e}");
            html.to_string()
        }
    }
}

/// Collapse whitespace and cut to `max_chars`.
pub fn normalize_snippet(s: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for word in s.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
        if out.chars().count() >= max_chars {
            break;
        }
    }
    out.chars().take(max_chars).collect()
}
