use super::entities::Series;
use super::value_objects::{PricePoint, Timestamp, ViewWindow};

/// Domain service - trims a series to a trailing time window
pub struct WindowFilter;

impl WindowFilter {
    /// Keep every point with `now - t <= window`.
    ///
    /// Points must already be sorted ascending; order is preserved and the
    /// input is left untouched.
    pub fn filter(series: &Series, window: ViewWindow, now: Timestamp) -> Series {
        series.with_points(Self::retain(&series.points, window, now))
    }

    pub fn retain(points: &[PricePoint], window: ViewWindow, now: Timestamp) -> Vec<PricePoint> {
        let limit = window.seconds();
        points
            .iter()
            .filter(|p| p.timestamp.seconds_until(now) <= limit)
            .copied()
            .collect()
    }
}
