use crate::application::{ChartSession, RefreshTimer, RefreshTrigger, interval_ticks};
use crate::config::AppConfig;
use crate::domain::errors::ChartError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{SeriesId, ViewWindow};
use crate::infrastructure::{CanvasRenderer, HourRange, PriceApiClient};
use gloo::utils::format::JsValueSerdeExt;
use js_sys::Promise;
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

type BrowserSession = ChartSession<PriceApiClient, CanvasRenderer>;

fn to_js(error: ChartError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Row of [`PriceChart::series`] as seen from JavaScript.
#[derive(Serialize)]
struct SeriesInfo {
    id: u32,
    label: String,
    symbol: String,
    color: String,
    selected: bool,
}

/// JavaScript facade over one chart session.
///
/// Async operations return promises that resolve once the chart has been
/// redrawn, or reject with the error message.
#[wasm_bindgen]
pub struct PriceChart {
    session: Rc<BrowserSession>,
    timer: Option<RefreshTimer>,
}

#[wasm_bindgen]
impl PriceChart {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: String, config: JsValue) -> Result<PriceChart, JsValue> {
        let config = AppConfig::from_js(&config).map_err(|e| to_js(e.into()))?;
        get_logger().info(
            LogComponent::Presentation("PriceChart"),
            &format!("🚀 Chart on #{canvas_id} against {}", config.base_url()),
        );
        let session = ChartSession::new(PriceApiClient::from_config(&config), CanvasRenderer::new(canvas_id), config);
        Ok(Self { session: Rc::new(session), timer: None })
    }

    #[wasm_bindgen(js_name = loadSeries)]
    pub fn load_series(&self) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            session.load_series().await.map_err(to_js)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = toggleSeries)]
    pub fn toggle_series(&self, id: u32) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            session.toggle_series(SeriesId::new(id)).await.map_err(to_js)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = toggleAll)]
    pub fn toggle_all(&self) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            session.toggle_all().await.map_err(to_js)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = setWindowHours)]
    pub fn set_window_hours(&self, hours: i32) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            session.set_window_hours(i64::from(hours)).await.map_err(to_js)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    pub fn refresh(&self) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            session.refresh(RefreshTrigger::Manual).await.map_err(to_js)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Refresh on the configured interval until stopped or dropped.
    #[wasm_bindgen(js_name = startAutoRefresh)]
    pub fn start_auto_refresh(&mut self) {
        let session = self.session.clone();
        let period = session.config().refresh_interval();
        let (timer, task) = RefreshTimer::new(interval_ticks(period), move || {
            let session = session.clone();
            async move {
                if let Err(e) = session.refresh(RefreshTrigger::Timer).await {
                    get_logger().warn(LogComponent::Presentation("PriceChart"), &format!("Timed refresh: {e}"));
                }
            }
        });
        // Replacing the handle drops, and so aborts, any previous loop.
        self.timer = Some(timer);
        spawn_local(task);
    }

    #[wasm_bindgen(js_name = stopAutoRefresh)]
    pub fn stop_auto_refresh(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    #[wasm_bindgen(js_name = dismissError)]
    pub fn dismiss_error(&self) -> Result<(), JsValue> {
        self.session.dismiss_error().map_err(to_js)
    }

    pub fn status(&self) -> String {
        self.session.status().to_string()
    }

    #[wasm_bindgen(js_name = errorMessage)]
    pub fn error_message(&self) -> Option<String> {
        self.session.overlay().map(|overlay| overlay.message)
    }

    #[wasm_bindgen(js_name = trendEquation)]
    pub fn trend_equation(&self) -> Option<String> {
        self.session.trend_equation()
    }

    /// Known series with color and selection state.
    pub fn series(&self) -> Result<JsValue, JsValue> {
        let controller = self.session.controller();
        let registry = controller.registry();
        let rows: Vec<SeriesInfo> = registry
            .known()
            .iter()
            .map(|s| SeriesInfo {
                id: s.id.value(),
                label: s.label.clone(),
                symbol: s.symbol.to_string(),
                color: s.color.to_css(),
                selected: registry.is_selected(s.id),
            })
            .collect();
        JsValue::from_serde(&rows).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = currentPrices)]
    pub fn current_prices(&self) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let prices = session
                .repository()
                .current_prices()
                .await
                .map_err(|e| to_js(e.into()))?;
            JsValue::from_serde(&prices).map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    /// Trend computed by the price service, for comparison with the local fit.
    #[wasm_bindgen(js_name = remoteTrend)]
    pub fn remote_trend(&self, id: u32, start_hour: u8, end_hour: u8) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let remote = session
                .repository()
                .regression(SeriesId::new(id), HourRange { start: start_hour, end: end_hour })
                .await
                .map_err(|e| to_js(e.into()))?;
            JsValue::from_serde(&remote).map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    /// Histories of several assets restricted to an hour-of-day range.
    pub fn compare(&self, ids: Vec<u32>, start_hour: u8, end_hour: u8) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let ids: Vec<SeriesId> = ids.into_iter().map(SeriesId::new).collect();
            let histories = session
                .repository()
                .compare(&ids, HourRange { start: start_hour, end: end_hour })
                .await
                .map_err(|e| to_js(e.into()))?;
            JsValue::from_serde(&histories).map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    /// Trailing histories of every asset in one request.
    #[wasm_bindgen(js_name = allHistories)]
    pub fn all_histories(&self, hours: i32) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let window = ViewWindow::new(i64::from(hours)).map_err(|e| to_js(e.into()))?;
            let histories = session.repository().all_cryptos(window).await.map_err(|e| to_js(e.into()))?;
            JsValue::from_serde(&histories).map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }
}
