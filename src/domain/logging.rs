//! Structured logging and the shared clock.
//!
//! Both are process-wide and installed once at startup. Until then log calls
//! are dropped and `now()` reads the system clock.

use crate::domain::market_data::Timestamp;
use derive_more::Display;
use once_cell::sync::OnceCell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum LogLevel {
    #[display(fmt = "TRACE")]
    Trace = 0,
    #[display(fmt = "DEBUG")]
    Debug = 1,
    #[display(fmt = " INFO")]
    Info = 2,
    #[display(fmt = " WARN")]
    Warn = 3,
    #[display(fmt = "ERROR")]
    Error = 4,
}

/// Layer and unit a message comes from.
#[derive(Debug, Clone, Display)]
pub enum LogComponent {
    #[display(fmt = "DOM:{}", _0)]
    Domain(&'static str),
    #[display(fmt = "APP:{}", _0)]
    Application(&'static str),
    #[display(fmt = "INF:{}", _0)]
    Infrastructure(&'static str),
    #[display(fmt = "PRE:{}", _0)]
    Presentation(&'static str),
}

/// One log record; `fields` are rendered as `key=value` after the message.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub component: LogComponent,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, component: LogComponent, message: impl Into<String>) -> Self {
        Self {
            timestamp_ms: get_time_provider().current_millis(),
            level,
            component,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    pub fn fields_line(&self) -> Option<String> {
        if self.fields.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self.fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
        Some(pairs.join(" "))
    }
}

/// Clock shared by logging and the refresh pipeline.
///
/// `now` feeds the window filter, so tests install a fixed clock instead of
/// reading the wall clock.
pub trait TimeProvider: Send + Sync {
    fn now(&self) -> Timestamp;

    fn current_millis(&self) -> u64 {
        (self.now().value().max(0) as u64) * 1000
    }

    fn format_timestamp(&self, timestamp_ms: u64) -> String;
}

/// Sink for structured log entries
pub trait Logger: Send + Sync {
    fn log(&self, entry: LogEntry);

    /// Whether entries at `level` would be kept.
    fn enabled(&self, _level: LogLevel) -> bool {
        true
    }

    fn emit(&self, level: LogLevel, component: LogComponent, message: &str) {
        if self.enabled(level) {
            self.log(LogEntry::new(level, component, message));
        }
    }

    fn trace(&self, component: LogComponent, message: &str) {
        self.emit(LogLevel::Trace, component, message);
    }

    fn debug(&self, component: LogComponent, message: &str) {
        self.emit(LogLevel::Debug, component, message);
    }

    fn info(&self, component: LogComponent, message: &str) {
        self.emit(LogLevel::Info, component, message);
    }

    fn warn(&self, component: LogComponent, message: &str) {
        self.emit(LogLevel::Warn, component, message);
    }

    fn error(&self, component: LogComponent, message: &str) {
        self.emit(LogLevel::Error, component, message);
    }
}

static GLOBAL_LOGGER: OnceCell<Box<dyn Logger>> = OnceCell::new();
static GLOBAL_TIME_PROVIDER: OnceCell<Box<dyn TimeProvider>> = OnceCell::new();

/// Install the global logger. Later calls are ignored.
pub fn init_logger(logger: Box<dyn Logger>) {
    let _ = GLOBAL_LOGGER.set(logger);
}

/// Install the global clock. Later calls are ignored.
pub fn init_time_provider(time_provider: Box<dyn TimeProvider>) {
    let _ = GLOBAL_TIME_PROVIDER.set(time_provider);
}

pub fn get_logger() -> &'static dyn Logger {
    GLOBAL_LOGGER
        .get()
        .map(|logger| logger.as_ref())
        .unwrap_or(&NoOpLogger)
}

pub fn get_time_provider() -> &'static dyn TimeProvider {
    GLOBAL_TIME_PROVIDER
        .get()
        .map(|provider| provider.as_ref())
        .unwrap_or(&UtcClock)
}

/// No-op logger fallback
struct NoOpLogger;
impl Logger for NoOpLogger {
    fn log(&self, _entry: LogEntry) {}
}

/// Wall clock fallback used until a provider is installed.
pub struct UtcClock;

impl TimeProvider for UtcClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_secs(chrono::Utc::now().timestamp())
    }

    fn current_millis(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }

    fn format_timestamp(&self, timestamp_ms: u64) -> String {
        chrono::DateTime::from_timestamp_millis(timestamp_ms as i64)
            .map(|dt| dt.format("%H:%M:%S%.3f").to_string())
            .unwrap_or_else(|| format!("{:06}", timestamp_ms))
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl TimeProvider for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }

    fn format_timestamp(&self, timestamp_ms: u64) -> String {
        format!("{:06}", timestamp_ms)
    }
}

/// Log a formatted message, skipping the formatting when `level` is filtered out.
#[macro_export]
macro_rules! log_at {
    ($level:expr, $component:expr, $($arg:tt)*) => {{
        let logger = $crate::domain::logging::get_logger();
        if logger.enabled($level) {
            logger.log($crate::domain::logging::LogEntry::new($level, $component, format!($($arg)*)));
        }
    }};
}

/// Compiled out of release builds.
#[macro_export]
macro_rules! log_trace {
    ($component:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::log_at!($crate::domain::logging::LogLevel::Trace, $component, $($arg)*);
        }
    };
}

/// Compiled out of release builds.
#[macro_export]
macro_rules! log_debug {
    ($component:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::log_at!($crate::domain::logging::LogLevel::Debug, $component, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($component:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::domain::logging::LogLevel::Info, $component, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($component:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::domain::logging::LogLevel::Warn, $component, $($arg)*)
    };
}
