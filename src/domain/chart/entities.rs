use super::value_objects::{AxisTick, ChartConfig, Color, Domain, PALETTE, PixelPoint};
use crate::domain::errors::{RegressionError, RenderingError, ValidationError};
use crate::domain::market_data::{CryptoAsset, RegressionResult, SeriesId, Symbol};
use derive_more::Display;
use std::collections::BTreeSet;

/// One entry of the known-series list.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownSeries {
    pub id: SeriesId,
    pub label: String,
    pub symbol: Symbol,
    pub color: Color,
}

/// Domain entity - known series plus the selected subset
///
/// Colors follow the position in the known list, so toggling never recolors
/// a line.
#[derive(Debug, Clone, Default)]
pub struct SeriesRegistry {
    known: Vec<KnownSeries>,
    selected: BTreeSet<SeriesId>,
}

impl SeriesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a series; returns `false` if the id is already known.
    pub fn register(&mut self, id: SeriesId, label: impl Into<String>, symbol: Symbol) -> bool {
        if self.contains(id) {
            return false;
        }
        let color = PALETTE[self.known.len() % PALETTE.len()];
        self.known.push(KnownSeries { id, label: label.into(), symbol, color });
        true
    }

    /// Register assets in service order, skipping duplicates.
    pub fn register_assets(&mut self, assets: &[CryptoAsset]) -> usize {
        assets
            .iter()
            .filter(|asset| self.register(asset.id, asset.name.clone(), asset.symbol.clone()))
            .count()
    }

    pub fn known(&self) -> &[KnownSeries] {
        &self.known
    }

    pub fn get(&self, id: SeriesId) -> Option<&KnownSeries> {
        self.known.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: SeriesId) -> bool {
        self.get(id).is_some()
    }

    pub fn color_of(&self, id: SeriesId) -> Option<Color> {
        self.get(id).map(|s| s.color)
    }

    pub fn is_selected(&self, id: SeriesId) -> bool {
        self.selected.contains(&id)
    }

    /// Selected ids in known-list order.
    pub fn selected_ids(&self) -> Vec<SeriesId> {
        self.known
            .iter()
            .filter(|s| self.selected.contains(&s.id))
            .map(|s| s.id)
            .collect()
    }

    pub fn selection_count(&self) -> usize {
        self.selected.len()
    }

    pub fn all_selected(&self) -> bool {
        !self.known.is_empty() && self.selected.len() == self.known.len()
    }

    pub fn select(&mut self, id: SeriesId) -> Result<(), ValidationError> {
        self.ensure_known(id)?;
        self.selected.insert(id);
        Ok(())
    }

    /// Flip one series; returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: SeriesId) -> Result<bool, ValidationError> {
        self.ensure_known(id)?;
        if self.selected.remove(&id) {
            Ok(false)
        } else {
            self.selected.insert(id);
            Ok(true)
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.known.iter().map(|s| s.id).collect();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// Deselect everything when all are selected, otherwise select all.
    /// Returns whether everything is selected afterwards.
    pub fn toggle_all(&mut self) -> bool {
        if self.all_selected() {
            self.deselect_all();
            false
        } else {
            self.select_all();
            true
        }
    }

    /// Select the first `count` known series.
    pub fn select_first(&mut self, count: usize) {
        self.selected = self.known.iter().take(count).map(|s| s.id).collect();
    }

    fn ensure_known(&self, id: SeriesId) -> Result<(), ValidationError> {
        if self.contains(id) { Ok(()) } else { Err(ValidationError::UnknownSeries(id)) }
    }
}

/// Mapped polyline for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesLine {
    pub id: SeriesId,
    pub label: String,
    pub color: Color,
    pub points: Vec<PixelPoint>,
}

/// Fitted trend drawn over a single selected series.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    pub start: PixelPoint,
    pub end: PixelPoint,
    pub result: RegressionResult,
    pub equation: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub last_price: Option<f64>,
}

/// Renderer-ready geometry for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub config: ChartConfig,
    pub time_domain: Option<Domain>,
    pub price_domain: Option<Domain>,
    pub lines: Vec<SeriesLine>,
    pub trend: Option<TrendLine>,
    /// Why the trend was omitted, when a single series was eligible for one.
    pub trend_unavailable: Option<RegressionError>,
    pub x_ticks: Vec<AxisTick>,
    pub y_ticks: Vec<AxisTick>,
    pub legend: Vec<LegendEntry>,
}

impl ChartFrame {
    pub fn empty(config: ChartConfig) -> Self {
        Self {
            config,
            time_domain: None,
            price_domain: None,
            lines: Vec::new(),
            trend: None,
            trend_unavailable: None,
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
            legend: Vec::new(),
        }
    }

    /// No line has a single point to draw.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.points.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Severity {
    #[display(fmt = "warning")]
    Warning,
    #[display(fmt = "error")]
    Error,
}

/// Dismissible notice drawn over the last good chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorOverlay {
    pub severity: Severity,
    pub message: String,
    /// Series the notice is scoped to; empty for request-wide failures.
    pub series: Vec<SeriesId>,
}

/// Port implemented by concrete drawing backends.
pub trait ChartRenderer {
    fn render(&self, frame: &ChartFrame, overlay: Option<&ErrorOverlay>) -> Result<(), RenderingError>;
}
