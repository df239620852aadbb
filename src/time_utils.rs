use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

/// Naive layouts the price service emits, tried in order.
const NAIVE_FORMATS: [&str; 4] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

/// Parse a service timestamp into Unix seconds.
///
/// Accepts a decimal Unix-seconds string, RFC 3339, or a naive
/// `YYYY-MM-DD HH:MM:SS[.fraction]` read in `offset`. Fractions are truncated.
pub fn parse_timestamp(raw: &str, offset: &FixedOffset) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse().ok();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|dt| dt.timestamp())
}

/// Offset from minutes east of UTC; out-of-range values fall back to UTC.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(utc_offset)
}

pub fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Current offset of the viewer's local time zone.
#[cfg(target_arch = "wasm32")]
pub fn local_offset() -> FixedOffset {
    // `getTimezoneOffset` counts minutes west of UTC.
    let west = js_sys::Date::new_0().get_timezone_offset();
    offset_from_minutes(-(west.round() as i32))
}

/// Current offset of the viewer's local time zone.
#[cfg(not(target_arch = "wasm32"))]
pub fn local_offset() -> FixedOffset {
    chrono::Local::now().offset().fix()
}

/// Time-of-day axis label `HH:MM` in the display offset.
pub fn format_time_label(timestamp: i64, offset: &FixedOffset) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.with_timezone(offset).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Price axis label with two decimals.
pub fn format_price_label(price: f64) -> String {
    format!("{:.2}", price)
}
