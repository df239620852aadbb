use super::value_objects::{AxisTick, ChartConfig, Domain, PixelPoint};
use crate::domain::market_data::{PricePoint, Series};
use crate::time_utils::{format_price_label, format_time_label};
use chrono::FixedOffset;

/// Domain service - projects (time, price) into the inner chart rectangle
pub struct CoordinateMapper;

impl CoordinateMapper {
    /// Horizontal position; a degenerate domain maps to the vertical midline.
    pub fn map_time(t: f64, domain: Domain, config: &ChartConfig) -> f64 {
        if domain.is_degenerate() {
            return config.padding_left + config.inner_width() / 2.0;
        }
        config.padding_left + (t - domain.min) / domain.span() * config.inner_width()
    }

    /// Vertical position, inverted so higher prices sit nearer the top.
    pub fn map_price(p: f64, domain: Domain, config: &ChartConfig) -> f64 {
        if domain.is_degenerate() {
            return config.padding_top + config.inner_height() / 2.0;
        }
        config.padding_top + (1.0 - (p - domain.min) / domain.span()) * config.inner_height()
    }

    pub fn map_point(point: &PricePoint, time: Domain, price: Domain, config: &ChartConfig) -> PixelPoint {
        PixelPoint::new(
            Self::map_time(point.timestamp.as_f64(), time, config),
            Self::map_price(point.price, price, config),
        )
    }

    /// `count` values evenly spaced over `[min, max]`, both ends included.
    ///
    /// One tick lands on the midpoint; a degenerate domain yields a single
    /// tick whatever the count.
    pub fn ticks(domain: Domain, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            _ if domain.is_degenerate() => vec![domain.min],
            1 => vec![domain.min + domain.span() / 2.0],
            _ => {
                let step = domain.span() / (count - 1) as f64;
                (0..count)
                    .map(|i| if i == count - 1 { domain.max } else { domain.min + step * i as f64 })
                    .collect()
            }
        }
    }

    pub fn time_ticks(domain: Domain, count: usize, config: &ChartConfig, offset: &FixedOffset) -> Vec<AxisTick> {
        Self::ticks(domain, count)
            .into_iter()
            .map(|value| AxisTick {
                value,
                position: Self::map_time(value, domain, config),
                label: format_time_label(value.round() as i64, offset),
            })
            .collect()
    }

    pub fn price_ticks(domain: Domain, count: usize, config: &ChartConfig) -> Vec<AxisTick> {
        Self::ticks(domain, count)
            .into_iter()
            .map(|value| AxisTick {
                value,
                position: Self::map_price(value, domain, config),
                label: format_price_label(value),
            })
            .collect()
    }

    /// Union of time and price ranges across every non-empty series.
    ///
    /// Computed before any series is mapped so overlays share one scale.
    pub fn shared_domain<'a, I>(series: I) -> Option<(Domain, Domain)>
    where
        I: IntoIterator<Item = &'a Series>,
    {
        series.into_iter().filter(|s| !s.is_empty()).fold(None, |acc, s| {
            let time = Domain::from_values(s.points.iter().map(|p| p.timestamp.as_f64()));
            let price = Domain::from_values(s.points.iter().map(|p| p.price));
            match (acc, time, price) {
                (None, Some(t), Some(p)) => Some((t, p)),
                (Some((at, ap)), Some(t), Some(p)) => Some((at.union(&t), ap.union(&p))),
                (acc, _, _) => acc,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_domains_map_to_midlines() {
        let config = ChartConfig::default();
        let flat = Domain::new(5.0, 5.0);
        assert_eq!(CoordinateMapper::map_time(5.0, flat, &config), 70.0 + 355.0);
        assert_eq!(CoordinateMapper::map_price(5.0, flat, &config), 20.0 + 195.0);
    }

    #[test]
    fn tick_counts() {
        let d = Domain::new(0.0, 10.0);
        assert!(CoordinateMapper::ticks(d, 0).is_empty());
        assert_eq!(CoordinateMapper::ticks(d, 1), vec![5.0]);
        assert_eq!(CoordinateMapper::ticks(d, 3), vec![0.0, 5.0, 10.0]);
        assert_eq!(CoordinateMapper::ticks(Domain::new(2.0, 2.0), 4), vec![2.0]);
    }
}
