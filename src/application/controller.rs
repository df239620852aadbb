//! Refresh state machine.
//!
//! Every trigger bumps a monotonic sequence number and yields a
//! [`RefreshRequest`]. Outcomes are applied only while their sequence is
//! still the latest one issued, so an older response that resolves late can
//! never overwrite newer data.

use super::use_cases::{ChartFrameBuilder, FrameOptions};
use crate::domain::chart::{ChartConfig, ChartFrame, ErrorOverlay, SeriesRegistry, Severity};
use crate::domain::errors::{ChartError, ChartResult, NetworkError, ValidationError};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{CryptoAsset, PriceHistory, Series, SeriesId, Timestamp, ViewWindow};
use derive_more::Display;
use strum::{AsRefStr, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumIter)]
pub enum RefreshTrigger {
    #[display(fmt = "selection changed")]
    SelectionChanged,
    #[display(fmt = "window changed")]
    WindowChanged,
    #[display(fmt = "manual refresh")]
    Manual,
    #[display(fmt = "timer")]
    Timer,
}

/// One refresh cycle: fetch `selected` over `window`.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshRequest {
    pub sequence: u64,
    pub selected: Vec<SeriesId>,
    pub window: ViewWindow,
    pub trigger: RefreshTrigger,
}

/// Joined results of every fetch issued for one request.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub sequence: u64,
    pub window: ViewWindow,
    pub results: Vec<(SeriesId, Result<PriceHistory, NetworkError>)>,
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum ChartStatus {
    #[display(fmt = "Idle")]
    Idle,
    #[display(fmt = "Loading #{}", sequence)]
    Loading { sequence: u64 },
    #[display(fmt = "Ready #{}", sequence)]
    Ready { sequence: u64 },
    #[display(fmt = "Error #{}: {}", sequence, error)]
    Error { sequence: u64, error: ChartError },
}

/// Last successfully applied data set.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub sequence: u64,
    pub window: ViewWindow,
    pub series: Vec<Series>,
}

pub struct ChartController {
    registry: SeriesRegistry,
    window: ViewWindow,
    latest_sequence: u64,
    applied_sequence: Option<u64>,
    status: ChartStatus,
    snapshot: Option<Snapshot>,
    overlay: Option<ErrorOverlay>,
}

impl ChartController {
    pub fn new(window: ViewWindow) -> Self {
        Self {
            registry: SeriesRegistry::new(),
            window,
            latest_sequence: 0,
            applied_sequence: None,
            status: ChartStatus::Idle,
            snapshot: None,
            overlay: None,
        }
    }

    pub fn with_registry(registry: SeriesRegistry, window: ViewWindow) -> Self {
        Self { registry, ..Self::new(window) }
    }

    pub fn registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    pub fn window(&self) -> ViewWindow {
        self.window
    }

    pub fn status(&self) -> &ChartStatus {
        &self.status
    }

    pub fn latest_sequence(&self) -> u64 {
        self.latest_sequence
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn overlay(&self) -> Option<&ErrorOverlay> {
        self.overlay.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.overlay = None;
    }

    pub fn register_assets(&mut self, assets: &[CryptoAsset]) -> usize {
        let added = self.registry.register_assets(assets);
        get_logger().info(
            LogComponent::Application("ChartController"),
            &format!("📋 Registered {added} of {} assets", assets.len()),
        );
        added
    }

    /// Pre-select series without issuing a request.
    pub fn select_initial(&mut self, count: usize) {
        self.registry.select_first(count);
    }

    /// Flip one series and request data for the new selection.
    ///
    /// A change that would leave nothing selected is rejected and the
    /// previous selection stays in place.
    pub fn toggle_series(&mut self, id: SeriesId) -> ChartResult<RefreshRequest> {
        self.change_selection(|registry| registry.toggle(id).map(|_| ()))
    }

    pub fn select_all(&mut self) -> ChartResult<RefreshRequest> {
        self.change_selection(|registry| {
            registry.select_all();
            Ok(())
        })
    }

    pub fn deselect_all(&mut self) -> ChartResult<RefreshRequest> {
        self.change_selection(|registry| {
            registry.deselect_all();
            Ok(())
        })
    }

    pub fn toggle_all(&mut self) -> ChartResult<RefreshRequest> {
        self.change_selection(|registry| {
            registry.toggle_all();
            Ok(())
        })
    }

    /// Change the trailing window; out-of-range values leave it untouched.
    pub fn set_window_hours(&mut self, hours: i64) -> ChartResult<RefreshRequest> {
        let window = self.guard(|_| ViewWindow::new(hours))?;
        self.window = window;
        self.refresh(RefreshTrigger::WindowChanged)
    }

    /// Issue a new request for the current selection and window.
    pub fn refresh(&mut self, trigger: RefreshTrigger) -> ChartResult<RefreshRequest> {
        let selected = self.registry.selected_ids();
        if selected.is_empty() {
            self.guard(|_| Err::<(), _>(ValidationError::EmptySelection))?;
        }

        self.latest_sequence += 1;
        self.status = ChartStatus::Loading { sequence: self.latest_sequence };
        get_logger().debug(
            LogComponent::Application("ChartController"),
            &format!(
                "🔄 Request #{} ({trigger}): {} series over {}",
                self.latest_sequence,
                selected.len(),
                self.window
            ),
        );

        Ok(RefreshRequest { sequence: self.latest_sequence, selected, window: self.window, trigger })
    }

    /// Merge the results of a request into the controller.
    ///
    /// Superseded outcomes are dropped with [`ChartError::StaleResponse`] and
    /// leave every piece of state untouched. When every fetch failed the
    /// previous snapshot stays in place.
    pub fn apply(&mut self, outcome: RefreshOutcome) -> ChartResult<()> {
        if outcome.sequence != self.latest_sequence || self.applied_sequence == Some(outcome.sequence) {
            get_logger().debug(
                LogComponent::Application("ChartController"),
                &format!("⏭️ Dropping stale response #{} (latest #{})", outcome.sequence, self.latest_sequence),
            );
            return Err(ChartError::StaleResponse { sequence: outcome.sequence, latest: self.latest_sequence });
        }
        self.applied_sequence = Some(outcome.sequence);

        let mut series = Vec::new();
        let mut failed = Vec::new();
        for (id, result) in outcome.results {
            match result {
                Ok(history) => match self.to_series(id, history) {
                    Some(s) => series.push(s),
                    None => get_logger().warn(
                        LogComponent::Application("ChartController"),
                        &format!("Ignoring data for unregistered series {id}"),
                    ),
                },
                Err(error) => {
                    get_logger().warn(
                        LogComponent::Application("ChartController"),
                        &format!("⚠️ Series {id} failed: {error}"),
                    );
                    failed.push((id, error));
                }
            }
        }

        if series.is_empty() && !failed.is_empty() {
            let error = ChartError::from(NetworkError::AllRequestsFailed { failed: failed.len() });
            get_logger().error(
                LogComponent::Application("ChartController"),
                &format!("❌ Request #{} failed: {error}", outcome.sequence),
            );
            self.overlay = Some(ErrorOverlay {
                severity: Severity::Error,
                message: match failed.as_slice() {
                    [(_, only)] => format!("Could not load prices: {only}"),
                    _ => format!("Could not load prices for {} series", failed.len()),
                },
                series: failed.iter().map(|(id, _)| *id).collect(),
            });
            self.status = ChartStatus::Error { sequence: outcome.sequence, error: error.clone() };
            return Err(error);
        }

        self.overlay = (!failed.is_empty()).then(|| ErrorOverlay {
            severity: Severity::Warning,
            message: format!(
                "No data for {}",
                failed
                    .iter()
                    .map(|(id, _)| self.label_of(*id))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            series: failed.iter().map(|(id, _)| *id).collect(),
        });
        get_logger().info(
            LogComponent::Application("ChartController"),
            &format!("✅ Applied #{}: {} series, {} failed", outcome.sequence, series.len(), failed.len()),
        );
        self.snapshot = Some(Snapshot { sequence: outcome.sequence, window: outcome.window, series });
        self.status = ChartStatus::Ready { sequence: outcome.sequence };
        Ok(())
    }

    /// Series from the last snapshot that are still selected.
    pub fn visible_series(&self) -> Vec<&Series> {
        self.snapshot
            .iter()
            .flat_map(|snapshot| snapshot.series.iter())
            .filter(|s| self.registry.is_selected(s.id))
            .collect()
    }

    /// Geometry for the last good snapshot trimmed to the current window.
    pub fn frame(&self, config: &ChartConfig, now: Timestamp, options: &FrameOptions) -> ChartFrame {
        ChartFrameBuilder::build(self.visible_series(), self.window, now, config, options)
    }

    fn to_series(&self, id: SeriesId, history: PriceHistory) -> Option<Series> {
        let known = self.registry.get(id)?;
        Some(Series::new(id, known.label.clone(), known.color, history.points))
    }

    fn label_of(&self, id: SeriesId) -> String {
        self.registry.get(id).map(|s| s.label.clone()).unwrap_or_else(|| id.to_string())
    }

    /// Apply a selection change to a copy of the registry and commit it only
    /// when at least one series remains selected.
    fn change_selection(
        &mut self,
        change: impl FnOnce(&mut SeriesRegistry) -> Result<(), ValidationError>,
    ) -> ChartResult<RefreshRequest> {
        let registry = self.guard(|this| {
            let mut next = this.registry.clone();
            change(&mut next)?;
            if next.selection_count() == 0 {
                return Err(ValidationError::EmptySelection);
            }
            Ok(next)
        })?;
        self.registry = registry;
        self.refresh(RefreshTrigger::SelectionChanged)
    }

    /// Run a validation step; failures are shown in the overlay and returned.
    fn guard<T>(&mut self, step: impl FnOnce(&mut Self) -> Result<T, ValidationError>) -> ChartResult<T> {
        step(self).map_err(|error| {
            get_logger().warn(LogComponent::Application("ChartController"), &format!("Rejected: {error}"));
            self.overlay = Some(ErrorOverlay {
                severity: Severity::Warning,
                message: error.to_string(),
                series: match error {
                    ValidationError::UnknownSeries(id) => vec![id],
                    _ => Vec::new(),
                },
            });
            ChartError::from(error)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::{PricePoint, Symbol};

    fn controller() -> ChartController {
        let mut controller = ChartController::new(ViewWindow::default());
        controller.register_assets(&[
            CryptoAsset { id: SeriesId::new(1), symbol: Symbol::from("BTC"), name: "Bitcoin".into() },
            CryptoAsset { id: SeriesId::new(2), symbol: Symbol::from("ETH"), name: "Ethereum".into() },
        ]);
        controller
    }

    fn history(id: u32) -> PriceHistory {
        PriceHistory {
            id: SeriesId::new(id),
            symbol: Symbol::from("X"),
            name: "X".into(),
            points: vec![PricePoint::new(Timestamp::from_secs(100), 1.0)],
        }
    }

    #[test]
    fn empty_selection_does_not_consume_a_sequence() {
        let mut controller = controller();
        let err = controller.refresh(RefreshTrigger::Manual).unwrap_err();
        assert_eq!(err, ChartError::Validation(ValidationError::EmptySelection));
        assert_eq!(controller.latest_sequence(), 0);
        assert_eq!(controller.status(), &ChartStatus::Idle);
        assert!(controller.overlay().is_some());
    }

    #[test]
    fn emptying_the_selection_keeps_the_chart() {
        let mut controller = controller();
        let request = controller.toggle_series(SeriesId::new(1)).unwrap();
        controller
            .apply(RefreshOutcome {
                sequence: request.sequence,
                window: request.window,
                results: vec![(SeriesId::new(1), Ok(history(1)))],
            })
            .unwrap();

        let err = controller.deselect_all().unwrap_err();

        assert_eq!(err, ChartError::Validation(ValidationError::EmptySelection));
        assert_eq!(controller.registry().selected_ids(), vec![SeriesId::new(1)]);
        assert_eq!(controller.visible_series().len(), 1);
        assert_eq!(controller.latest_sequence(), 1);
        assert_eq!(controller.status(), &ChartStatus::Ready { sequence: 1 });
        assert!(controller.toggle_series(SeriesId::new(1)).is_err());
        assert_eq!(controller.registry().selection_count(), 1);
    }

    #[test]
    fn same_outcome_is_applied_once() {
        let mut controller = controller();
        let request = controller.toggle_series(SeriesId::new(1)).unwrap();
        let outcome = RefreshOutcome {
            sequence: request.sequence,
            window: request.window,
            results: vec![(SeriesId::new(1), Ok(history(1)))],
        };
        controller.apply(outcome.clone()).unwrap();
        assert!(controller.apply(outcome).unwrap_err().is_stale());
    }

    #[test]
    fn invalid_window_keeps_previous_value() {
        let mut controller = controller();
        controller.toggle_series(SeriesId::new(2)).unwrap();
        assert!(controller.set_window_hours(0).is_err());
        assert_eq!(controller.window().hours(), 24);
        assert_eq!(controller.latest_sequence(), 1);
    }
}
