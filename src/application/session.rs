use super::controller::{ChartController, ChartStatus, RefreshRequest, RefreshTrigger};
use super::use_cases::{FrameOptions, load_assets, run_refresh};
use crate::config::AppConfig;
use crate::domain::chart::{ChartFrame, ChartRenderer, ErrorOverlay};
use crate::domain::errors::ChartResult;
use crate::domain::logging::{LogComponent, get_logger, get_time_provider};
use crate::domain::market_data::{PriceRepository, SeriesId};
use std::cell::{Ref, RefCell};

/// Series selected when the asset list first loads.
pub const INITIAL_SELECTION: usize = 2;

/// Controller, data source and renderer wired together.
///
/// Every operation issues its request, awaits the fetches, applies the
/// outcome and redraws. Outcomes superseded in the meantime are dropped
/// without redrawing.
pub struct ChartSession<R, V> {
    controller: RefCell<ChartController>,
    repository: R,
    renderer: V,
    config: AppConfig,
    frame_options: FrameOptions,
    last_frame: RefCell<Option<ChartFrame>>,
}

impl<R: PriceRepository, V: ChartRenderer> ChartSession<R, V> {
    pub fn new(repository: R, renderer: V, config: AppConfig) -> Self {
        Self {
            controller: RefCell::new(ChartController::new(config.default_window())),
            frame_options: FrameOptions::from(&config),
            repository,
            renderer,
            config,
            last_frame: RefCell::new(None),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn controller(&self) -> Ref<'_, ChartController> {
        self.controller.borrow()
    }

    pub fn status(&self) -> ChartStatus {
        self.controller.borrow().status().clone()
    }

    pub fn overlay(&self) -> Option<ErrorOverlay> {
        self.controller.borrow().overlay().cloned()
    }

    pub fn last_frame(&self) -> Option<ChartFrame> {
        self.last_frame.borrow().clone()
    }

    pub fn trend_equation(&self) -> Option<String> {
        self.last_frame
            .borrow()
            .as_ref()
            .and_then(|frame| frame.trend.as_ref())
            .map(|trend| trend.equation.clone())
    }

    /// Fetch the asset list, pick the initial selection and load it.
    pub async fn load_series(&self) -> ChartResult<()> {
        load_assets(&self.controller, &self.repository).await?;
        {
            let mut controller = self.controller.borrow_mut();
            if controller.registry().selection_count() == 0 {
                controller.select_initial(INITIAL_SELECTION);
            }
        }
        self.refresh(RefreshTrigger::Manual).await
    }

    pub async fn toggle_series(&self, id: SeriesId) -> ChartResult<()> {
        let request = self.controller.borrow_mut().toggle_series(id);
        self.dispatch(request).await
    }

    pub async fn toggle_all(&self) -> ChartResult<()> {
        let request = self.controller.borrow_mut().toggle_all();
        self.dispatch(request).await
    }

    pub async fn set_window_hours(&self, hours: i64) -> ChartResult<()> {
        let request = self.controller.borrow_mut().set_window_hours(hours);
        self.dispatch(request).await
    }

    pub async fn refresh(&self, trigger: RefreshTrigger) -> ChartResult<()> {
        let request = self.controller.borrow_mut().refresh(trigger);
        self.dispatch(request).await
    }

    pub fn dismiss_error(&self) -> ChartResult<()> {
        self.controller.borrow_mut().dismiss_error();
        self.redraw()
    }

    /// Build a frame from the current snapshot and hand it to the renderer.
    pub fn redraw(&self) -> ChartResult<()> {
        let (frame, overlay) = {
            let controller = self.controller.borrow();
            let frame = controller.frame(&self.config.chart, get_time_provider().now(), &self.frame_options);
            (frame, controller.overlay().cloned())
        };
        let rendered = self.renderer.render(&frame, overlay.as_ref());
        *self.last_frame.borrow_mut() = Some(frame);
        rendered.map_err(Into::into)
    }

    async fn dispatch(&self, request: ChartResult<RefreshRequest>) -> ChartResult<()> {
        let request = match request {
            Ok(request) => request,
            Err(error) => {
                // Validation failures only change the overlay.
                self.redraw()?;
                return Err(error);
            }
        };

        let sequence = request.sequence;
        match run_refresh(&self.controller, &self.repository, request).await {
            Err(error) if error.is_stale() => {
                get_logger().debug(
                    LogComponent::Application("ChartSession"),
                    &format!("Request #{sequence} superseded, skipping redraw"),
                );
                Ok(())
            }
            result => {
                self.redraw()?;
                result
            }
        }
    }
}
