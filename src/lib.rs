use wasm_bindgen::prelude::*;

use crate::domain::logging::LogComponent;
use crate::infrastructure::{BrowserTimeProvider, ConsoleLogger};

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod time_utils;

pub use application::{ChartController, ChartSession, RefreshTimer};
pub use config::AppConfig;
pub use domain::errors::{ChartError, ChartResult};
pub use presentation::PriceChart;

/// Install the browser logger, clock and panic hook.
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let logger = if cfg!(debug_assertions) { ConsoleLogger::new_development() } else { ConsoleLogger::new_production() };
    domain::logging::init_logger(Box::new(logger));
    domain::logging::init_time_provider(Box::new(BrowserTimeProvider::new()));

    crate::log_info!(
        LogComponent::Presentation("Initialize"),
        "🚀 Price chart engine {} initialized",
        env!("CARGO_PKG_VERSION")
    );
}
