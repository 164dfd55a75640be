//! Display helpers for document metadata.

use std::fmt::Display;

use chrono::{DateTime, Locale, TimeZone};

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Binary (1024-based) size with at most two decimals, e.g. `1536 -> "1.5 KB"`.
/// Anything past the gigabyte range stays in GB.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut exponent = 0;
    while exponent + 1 < UNITS.len() && bytes >= 1024u64.pow(exponent as u32 + 1) {
        exponent += 1;
    }

    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[exponent])
}

/// Upload time as shown in the document table, laid out the way the locale
/// writes dates: `Mar 5, 2024, 02:30 PM` for en_US, `05.03.2024, 14:30` for de_DE.
pub fn format_timestamp<Tz>(timestamp: &DateTime<Tz>, locale: Locale) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp
        .format_localized(timestamp_pattern(locale), locale)
        .to_string()
}

/// Other locales use their own `d_fmt` and `t_fmt` from the locale database.
fn timestamp_pattern(locale: Locale) -> &'static str {
    match locale {
        Locale::en_US => "%b %-d, %Y, %I:%M %p",
        Locale::en_GB | Locale::en_AU | Locale::en_IE => "%-d %b %Y, %H:%M",
        Locale::de_DE | Locale::de_AT | Locale::de_CH => "%d.%m.%Y, %H:%M",
        Locale::fr_FR | Locale::es_ES | Locale::it_IT => "%d/%m/%Y %H:%M",
        Locale::nl_NL => "%d-%m-%Y %H:%M",
        Locale::ja_JP | Locale::zh_CN => "%Y/%m/%d %H:%M",
        _ => "%x %X",
    }
}
