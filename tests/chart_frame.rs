use crypto_chart_wasm::application::{ChartFrameBuilder, FrameOptions};
use crypto_chart_wasm::config::AppConfig;
use crypto_chart_wasm::domain::chart::{AxisTick, ChartConfig, ChartFrame, CoordinateMapper, Domain, PALETTE};
use crypto_chart_wasm::domain::errors::RegressionError;
use crypto_chart_wasm::domain::market_data::{PricePoint, Series, SeriesId, Timestamp, ViewWindow};

const NOW: i64 = 1_700_000_000;

fn series(id: u32, label: &str, points: &[(i64, f64)]) -> Series {
    Series::new(
        SeriesId::new(id),
        label,
        PALETTE[id as usize - 1],
        points.iter().map(|&(t, p)| PricePoint::new(Timestamp::from_secs(NOW - t), p)).collect(),
    )
}

fn config() -> ChartConfig {
    ChartConfig::new(500.0, 300.0, 20.0, 20.0, 40.0, 60.0).unwrap()
}

fn build(series: &[Series], hours: i64) -> ChartFrame {
    ChartFrameBuilder::build(
        series,
        ViewWindow::new(hours).unwrap(),
        Timestamp::from_secs(NOW),
        &config(),
        &FrameOptions { x_ticks: 3, y_ticks: 3, ..FrameOptions::default() },
    )
}

fn ticks(ticks: &[AxisTick]) -> String {
    ticks.iter().map(|t| format!("{}@{:.1}", t.label, t.position)).collect::<Vec<_>>().join(" ")
}

fn describe(frame: &ChartFrame) -> String {
    let mut out = Vec::new();
    if let (Some(time), Some(price)) = (frame.time_domain, frame.price_domain) {
        out.push(format!("time {time}"));
        out.push(format!("price {price}"));
    }
    for line in &frame.lines {
        let points: Vec<String> = line.points.iter().map(|p| format!("({:.1}, {:.1})", p.x, p.y)).collect();
        out.push(format!("line {} {}: {}", line.label, line.color.to_css(), points.join(" ")));
    }
    out.push(format!("x {}", ticks(&frame.x_ticks)));
    out.push(format!("y {}", ticks(&frame.y_ticks)));
    if let Some(trend) = &frame.trend {
        out.push(format!(
            "trend {} r2={:.4} ({:.1}, {:.1}) -> ({:.1}, {:.1})",
            trend.equation,
            trend.result.r_squared.unwrap_or(f64::NAN),
            trend.start.x,
            trend.start.y,
            trend.end.x,
            trend.end.y
        ));
    }
    for entry in &frame.legend {
        let price = entry.last_price.map(|p| format!("{p:.2}")).unwrap_or_else(|| "-".to_string());
        out.push(format!("legend {} {} {}", entry.label, entry.color.to_css(), price));
    }
    out.join("\n")
}

#[test]
fn single_series_frame() {
    let btc = series(1, "Bitcoin", &[(3 * 3600, 500.0), (7200, 100.0), (3600, 110.0), (0, 120.0)]);

    let frame = build(&[btc], 2);

    insta::assert_snapshot!("single_series_frame", describe(&frame));
}

#[test]
fn time_labels_use_the_display_offset() {
    let app = AppConfig::from_json(r#"{"server_utc_offset_minutes":60,"display_utc_offset_minutes":-300}"#).unwrap();
    let options = FrameOptions { x_ticks: 3, ..FrameOptions::from(&app) };
    let btc = series(1, "Bitcoin", &[(7200, 100.0), (0, 120.0)]);

    let frame = ChartFrameBuilder::build(
        &[btc],
        ViewWindow::new(2).unwrap(),
        Timestamp::from_secs(NOW),
        &config(),
        &options,
    );

    let labels: Vec<&str> = frame.x_ticks.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["15:13", "16:13", "17:13"]);
}

#[test]
fn overlaid_series_share_one_scale_and_skip_trend() {
    let btc = series(1, "Bitcoin", &[(3600, 30_000.0), (0, 31_000.0)]);
    let eth = series(2, "Ethereum", &[(1800, 1_800.0), (0, 1_900.0)]);

    let frame = build(&[btc, eth], 24);

    let price = Domain::new(1_800.0, 31_000.0);
    assert_eq!(frame.price_domain, Some(price));
    assert_eq!(frame.lines.len(), 2);
    assert_eq!(frame.lines[1].points[1].y, CoordinateMapper::map_price(1_900.0, price, &config()));
    assert_eq!(frame.lines[0].points[0].x, 60.0);
    assert!(frame.trend.is_none());
    assert!(frame.trend_unavailable.is_none());
}

#[test]
fn single_point_has_no_trend() {
    let frame = build(&[series(1, "Bitcoin", &[(60, 100.0)])], 1);

    assert_eq!(frame.trend_unavailable, Some(RegressionError::InsufficientData { count: 1 }));
    assert!(frame.trend.is_none());
    let point = frame.lines[0].points[0];
    assert_eq!(point.x, 60.0 + 420.0 / 2.0);
    assert_eq!(point.y, 20.0 + 240.0 / 2.0);
}

#[test]
fn nothing_inside_window_yields_empty_frame() {
    let frame = build(&[series(1, "Bitcoin", &[(5 * 3600, 100.0)])], 1);

    assert!(frame.is_empty());
    assert!(frame.time_domain.is_none());
    assert!(frame.x_ticks.is_empty());
    assert_eq!(frame.legend[0].last_price, None);
}
