use crate::domain::logging::{LogEntry, LogLevel, Logger, TimeProvider, get_time_provider};
use crate::domain::market_data::Timestamp;

/// Browser console implementation of the domain logger
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    pub fn new_development() -> Self {
        Self::new(LogLevel::Debug)
    }

    pub fn new_production() -> Self {
        Self::new(LogLevel::Info)
    }
}

/// `[time] LEVEL component: message | key=value ...`
pub fn format_entry(entry: &LogEntry, time_provider: &dyn TimeProvider) -> String {
    let line = format!(
        "[{}] {} {}: {}",
        time_provider.format_timestamp(entry.timestamp_ms),
        entry.level,
        entry.component,
        entry.message
    );
    match entry.fields_line() {
        Some(fields) => format!("{line} | {fields}"),
        None => line,
    }
}

impl Logger for ConsoleLogger {
    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn log(&self, entry: LogEntry) {
        if !self.enabled(entry.level) {
            return;
        }
        let line = wasm_bindgen::JsValue::from(format_entry(&entry, get_time_provider()));
        match entry.level {
            LogLevel::Error => web_sys::console::error_1(&line),
            LogLevel::Warn => web_sys::console::warn_1(&line),
            LogLevel::Info => web_sys::console::info_1(&line),
            LogLevel::Debug | LogLevel::Trace => web_sys::console::log_1(&line),
        }
    }
}

/// Wall clock backed by `Date.now()`
pub struct BrowserTimeProvider;

impl BrowserTimeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BrowserTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for BrowserTimeProvider {
    fn now(&self) -> Timestamp {
        Timestamp::from_secs((self.current_millis() / 1000) as i64)
    }

    fn current_millis(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn format_timestamp(&self, timestamp_ms: u64) -> String {
        let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp_ms as f64));
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            date.get_hours(),
            date.get_minutes(),
            date.get_seconds(),
            date.get_milliseconds()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::logging::{FixedClock, LogComponent};

    #[test]
    fn entry_format_includes_fields() {
        let entry = LogEntry {
            timestamp_ms: 1_500,
            level: LogLevel::Warn,
            component: LogComponent::Infrastructure("PriceApi"),
            message: "slow".into(),
            fields: vec![("ms", "900".into())],
        };
        let clock = FixedClock(Timestamp::from_secs(0));
        assert_eq!(format_entry(&entry, &clock), "[001500]  WARN INF:PriceApi: slow | ms=900");
    }

    #[test]
    fn level_threshold() {
        let logger = ConsoleLogger::new_production();
        assert!(!logger.enabled(LogLevel::Debug));
        assert!(logger.enabled(LogLevel::Error));
    }
}
