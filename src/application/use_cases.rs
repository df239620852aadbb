use super::controller::{ChartController, RefreshOutcome, RefreshRequest};
use crate::config::AppConfig;
use crate::domain::chart::{
    ChartConfig, ChartFrame, Color, CoordinateMapper, LegendEntry, PixelPoint, SeriesLine, TrendLine,
};
use crate::domain::errors::{ChartError, ChartResult};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{
    PriceRepository, RegressionEstimator, Series, Timestamp, TrendBasis, ViewWindow, WindowFilter,
};
use crate::time_utils::utc_offset;
use chrono::FixedOffset;
use futures::future::join_all;
use std::cell::RefCell;

/// Layout knobs for [`ChartFrameBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOptions {
    pub x_ticks: usize,
    pub y_ticks: usize,
    pub trend_basis: TrendBasis,
    pub display_offset: FixedOffset,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self { x_ticks: 6, y_ticks: 5, trend_basis: TrendBasis::Timestamp, display_offset: utc_offset() }
    }
}

impl From<&AppConfig> for FrameOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            x_ticks: config.x_ticks,
            y_ticks: config.y_ticks,
            trend_basis: config.trend_basis,
            display_offset: config.display_offset(),
        }
    }
}

/// Use Case: turn series into renderer-ready geometry
pub struct ChartFrameBuilder;

impl ChartFrameBuilder {
    /// Filter every series to `window`, map them over one shared domain and
    /// fit a trend when exactly one series is shown.
    pub fn build<'a, I>(
        series: I,
        window: ViewWindow,
        now: Timestamp,
        config: &ChartConfig,
        options: &FrameOptions,
    ) -> ChartFrame
    where
        I: IntoIterator<Item = &'a Series>,
    {
        let filtered: Vec<Series> = series.into_iter().map(|s| WindowFilter::filter(s, window, now)).collect();

        let mut frame = ChartFrame::empty(*config);
        frame.legend = filtered
            .iter()
            .map(|s| LegendEntry {
                label: s.label.clone(),
                color: s.color,
                last_price: s.points.last().map(|p| p.price),
            })
            .collect();

        let Some((time, price)) = CoordinateMapper::shared_domain(&filtered) else {
            frame.lines = filtered.iter().map(|s| Self::line(s, Vec::new())).collect();
            return frame;
        };

        frame.time_domain = Some(time);
        frame.price_domain = Some(price);
        frame.lines = filtered
            .iter()
            .map(|s| {
                let points = s
                    .points
                    .iter()
                    .map(|p| CoordinateMapper::map_point(p, time, price, config))
                    .collect();
                Self::line(s, points)
            })
            .collect();
        frame.x_ticks = CoordinateMapper::time_ticks(time, options.x_ticks, config, &options.display_offset);
        frame.y_ticks = CoordinateMapper::price_ticks(price, options.y_ticks, config);

        if let [single] = filtered.as_slice() {
            let fitted = RegressionEstimator::fit_series(&single.points, options.trend_basis);
            match (fitted, single.points.first(), single.points.last()) {
                (Ok(result), Some(first), Some(last)) => {
                    let (x_start, x_end) = match options.trend_basis {
                        TrendBasis::Timestamp => (0.0, first.timestamp.seconds_until(last.timestamp) as f64),
                        TrendBasis::SampleIndex => (0.0, (single.points.len() - 1) as f64),
                    };
                    let project = |t: Timestamp, x: f64| {
                        PixelPoint::new(
                            CoordinateMapper::map_time(t.as_f64(), time, config),
                            CoordinateMapper::map_price(result.predict(x), price, config),
                        )
                    };
                    frame.trend = Some(TrendLine {
                        start: project(first.timestamp, x_start),
                        end: project(last.timestamp, x_end),
                        result,
                        equation: result.equation(),
                        color: Color::TREND,
                    });
                }
                (Ok(_), _, _) => {}
                (Err(error), _, _) => {
                    get_logger().debug(
                        LogComponent::Application("ChartFrameBuilder"),
                        &format!("Trend omitted for {}: {error}", single.label),
                    );
                    frame.trend_unavailable = Some(error);
                }
            }
        }

        frame
    }

    fn line(series: &Series, points: Vec<PixelPoint>) -> SeriesLine {
        SeriesLine { id: series.id, label: series.label.clone(), color: series.color, points }
    }
}

/// Use Case: issue one fetch per selected series and join them.
///
/// Individual failures are kept per id; the join itself never fails.
pub async fn fetch_series<R: PriceRepository>(repository: &R, request: &RefreshRequest) -> RefreshOutcome {
    let fetches = request.selected.iter().map(|&id| async move {
        let result = repository.price_history(id, request.window).await;
        (id, result)
    });
    RefreshOutcome { sequence: request.sequence, window: request.window, results: join_all(fetches).await }
}

/// Use Case: fetch and apply one request.
///
/// The controller is borrowed only after the fetches resolve. A superseded
/// outcome comes back as [`ChartError::StaleResponse`].
pub async fn run_refresh<R: PriceRepository>(
    controller: &RefCell<ChartController>,
    repository: &R,
    request: RefreshRequest,
) -> ChartResult<()> {
    let outcome = fetch_series(repository, &request).await;
    controller.borrow_mut().apply(outcome)
}

/// Use Case: populate the registry from the service's asset list.
pub async fn load_assets<R: PriceRepository>(
    controller: &RefCell<ChartController>,
    repository: &R,
) -> ChartResult<usize> {
    let assets = repository.list_assets().await.map_err(ChartError::from)?;
    get_logger().info(
        LogComponent::Application("LoadAssets"),
        &format!("📥 Service lists {} assets", assets.len()),
    );
    Ok(controller.borrow_mut().register_assets(&assets))
}
