use crypto_chart_wasm::application::{
    ChartController, ChartSession, ChartStatus, RefreshOutcome, RefreshTrigger,
};
use crypto_chart_wasm::config::AppConfig;
use crypto_chart_wasm::domain::chart::{ChartFrame, ChartRenderer, ErrorOverlay, Severity};
use crypto_chart_wasm::domain::errors::{ChartError, ChartResult, NetworkError, RenderingError, ValidationError};
use crypto_chart_wasm::domain::logging::{FixedClock, init_time_provider};
use crypto_chart_wasm::domain::market_data::{
    CryptoAsset, PriceHistory, PricePoint, PriceRepository, SeriesId, Symbol, Timestamp, ViewWindow,
};
use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::future::RemoteHandle;
use futures::task::LocalSpawnExt;
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

const NOW: i64 = 1_700_000_000;
const BTC: SeriesId = SeriesId::new(1);
const ETH: SeriesId = SeriesId::new(2);

type Reply = Result<PriceHistory, NetworkError>;

fn assets() -> Vec<CryptoAsset> {
    vec![
        CryptoAsset { id: BTC, symbol: Symbol::from("BTC"), name: "Bitcoin".into() },
        CryptoAsset { id: ETH, symbol: Symbol::from("ETH"), name: "Ethereum".into() },
    ]
}

fn history(id: SeriesId, base: f64) -> PriceHistory {
    PriceHistory {
        id,
        symbol: Symbol::from("X"),
        name: "X".into(),
        points: (0..4)
            .map(|i| PricePoint::new(Timestamp::from_secs(NOW - (3 - i) * 600), base + i as f64))
            .collect(),
    }
}

/// Every history fetch parks until the test answers it by call index.
#[derive(Clone, Default)]
struct ScriptedRepository {
    calls: Rc<RefCell<Vec<(SeriesId, Option<oneshot::Sender<Reply>>)>>>,
}

impl ScriptedRepository {
    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn requested(&self, call: usize) -> SeriesId {
        self.calls.borrow()[call].0
    }

    fn answer(&self, call: usize, reply: Reply) {
        let sender = self.calls.borrow_mut()[call].1.take().expect("call answered twice");
        sender.send(reply).expect("fetch was dropped");
    }
}

impl PriceRepository for ScriptedRepository {
    async fn list_assets(&self) -> Result<Vec<CryptoAsset>, NetworkError> {
        Ok(assets())
    }

    async fn price_history(&self, id: SeriesId, _window: ViewWindow) -> Result<PriceHistory, NetworkError> {
        let (tx, rx) = oneshot::channel();
        self.calls.borrow_mut().push((id, Some(tx)));
        rx.await.unwrap_or_else(|_| Err(NetworkError::HttpRequestFailed("cancelled".into())))
    }
}

#[derive(Clone, Default)]
struct RecordingRenderer {
    frames: Rc<RefCell<Vec<(ChartFrame, Option<ErrorOverlay>)>>>,
}

impl RecordingRenderer {
    fn count(&self) -> usize {
        self.frames.borrow().len()
    }

    fn last(&self) -> (ChartFrame, Option<ErrorOverlay>) {
        self.frames.borrow().last().cloned().expect("nothing rendered")
    }
}

impl ChartRenderer for RecordingRenderer {
    fn render(&self, frame: &ChartFrame, overlay: Option<&ErrorOverlay>) -> Result<(), RenderingError> {
        self.frames.borrow_mut().push((frame.clone(), overlay.cloned()));
        Ok(())
    }
}

type TestSession = ChartSession<ScriptedRepository, RecordingRenderer>;

struct Harness {
    pool: LocalPool,
    repository: ScriptedRepository,
    renderer: RecordingRenderer,
    session: Rc<TestSession>,
}

impl Harness {
    fn new() -> Self {
        init_time_provider(Box::new(FixedClock(Timestamp::from_secs(NOW))));
        let repository = ScriptedRepository::default();
        let renderer = RecordingRenderer::default();
        let session = Rc::new(ChartSession::new(repository.clone(), renderer.clone(), AppConfig::default()));
        Self { pool: LocalPool::new(), repository, renderer, session }
    }

    fn spawn<F, Fut>(&mut self, operation: F) -> RemoteHandle<ChartResult<()>>
    where
        F: FnOnce(Rc<TestSession>) -> Fut,
        Fut: Future<Output = ChartResult<()>> + 'static,
    {
        let handle = self.pool.spawner().spawn_local_with_handle(operation(self.session.clone())).unwrap();
        self.pool.run_until_stalled();
        handle
    }

    fn settle(&mut self, handle: RemoteHandle<ChartResult<()>>) -> ChartResult<()> {
        self.pool.run_until(handle)
    }

    /// Load the asset list and answer the initial fetches with `replies`.
    fn load(&mut self, replies: Vec<Reply>) -> ChartResult<()> {
        let handle = self.spawn(|s| async move { s.load_series().await });
        let first = self.repository.call_count() - replies.len();
        for (offset, reply) in replies.into_iter().enumerate() {
            self.repository.answer(first + offset, reply);
        }
        self.settle(handle)
    }
}

fn last_prices(frame: &ChartFrame) -> Vec<Option<f64>> {
    frame.legend.iter().map(|entry| entry.last_price).collect()
}

#[test]
fn late_response_is_ignored_by_controller() {
    let mut controller = ChartController::new(ViewWindow::default());
    controller.register_assets(&assets());

    let first = controller.toggle_series(BTC).unwrap();
    let second = controller.toggle_series(ETH).unwrap();
    assert_eq!(first.selected, vec![BTC]);
    assert_eq!(second.selected, vec![BTC, ETH]);

    controller
        .apply(RefreshOutcome {
            sequence: second.sequence,
            window: second.window,
            results: vec![(BTC, Ok(history(BTC, 200.0))), (ETH, Ok(history(ETH, 20.0)))],
        })
        .unwrap();
    let late = controller.apply(RefreshOutcome {
        sequence: first.sequence,
        window: first.window,
        results: vec![(BTC, Ok(history(BTC, 100.0)))],
    });

    assert_eq!(late, Err(ChartError::StaleResponse { sequence: 1, latest: 2 }));
    let snapshot = controller.snapshot().unwrap();
    assert_eq!(snapshot.sequence, 2);
    assert_eq!(snapshot.series.len(), 2);
    assert_eq!(snapshot.series[0].points[0].price, 200.0);
    assert_eq!(controller.status(), &ChartStatus::Ready { sequence: 2 });
}

#[test]
fn outcome_arriving_before_newer_request_is_still_stale() {
    let mut controller = ChartController::new(ViewWindow::default());
    controller.register_assets(&assets());
    let first = controller.toggle_series(BTC).unwrap();
    controller.set_window_hours(6).unwrap();

    let result = controller.apply(RefreshOutcome {
        sequence: first.sequence,
        window: first.window,
        results: vec![(BTC, Ok(history(BTC, 1.0)))],
    });

    assert!(result.unwrap_err().is_stale());
    assert!(controller.snapshot().is_none());
    assert_eq!(controller.status(), &ChartStatus::Loading { sequence: 2 });
}

#[test]
fn session_loads_initial_selection() {
    let mut harness = Harness::new();

    let handle = harness.spawn(|s| async move { s.load_series().await });
    assert_eq!(harness.session.status(), ChartStatus::Loading { sequence: 1 });
    assert_eq!(harness.repository.call_count(), 2);
    assert_eq!(harness.renderer.count(), 0);

    harness.repository.answer(0, Ok(history(BTC, 100.0)));
    harness.repository.answer(1, Ok(history(ETH, 10.0)));
    assert_eq!(harness.settle(handle), Ok(()));

    let (frame, overlay) = harness.renderer.last();
    assert_eq!(frame.lines.len(), 2);
    assert_eq!(last_prices(&frame), vec![Some(103.0), Some(13.0)]);
    assert!(frame.trend.is_none());
    assert!(overlay.is_none());
    assert_eq!(harness.session.status(), ChartStatus::Ready { sequence: 1 });
}

#[test]
fn session_drops_superseded_response_without_redraw() {
    let mut harness = Harness::new();
    harness.load(vec![Ok(history(BTC, 100.0)), Ok(history(ETH, 10.0))]).unwrap();
    let rendered = harness.renderer.count();

    // #2 fetches BTC only, #3 fetches BTC and ETH again.
    let older = harness.spawn(|s| async move { s.toggle_series(ETH).await });
    let newer = harness.spawn(|s| async move { s.toggle_series(ETH).await });
    assert_eq!(harness.repository.call_count(), 5);
    assert_eq!(harness.repository.requested(2), BTC);
    assert_eq!(harness.repository.requested(3), BTC);
    assert_eq!(harness.repository.requested(4), ETH);

    harness.repository.answer(3, Ok(history(BTC, 300.0)));
    harness.repository.answer(4, Ok(history(ETH, 30.0)));
    assert_eq!(harness.settle(newer), Ok(()));
    assert_eq!(harness.renderer.count(), rendered + 1);

    harness.repository.answer(2, Ok(history(BTC, 999.0)));
    assert_eq!(harness.settle(older), Ok(()));

    assert_eq!(harness.renderer.count(), rendered + 1);
    let (frame, _) = harness.renderer.last();
    assert_eq!(last_prices(&frame), vec![Some(303.0), Some(33.0)]);
    assert_eq!(harness.session.status(), ChartStatus::Ready { sequence: 3 });
    assert_eq!(harness.session.controller().snapshot().unwrap().sequence, 3);
}

#[test]
fn partial_failure_keeps_successful_series() {
    let mut harness = Harness::new();

    let result = harness.load(vec![
        Ok(history(BTC, 100.0)),
        Err(NetworkError::HttpStatus { status: 500, status_text: "Internal Server Error".into() }),
    ]);

    assert_eq!(result, Ok(()));
    let (frame, overlay) = harness.renderer.last();
    assert_eq!(frame.lines.len(), 1);
    assert!(frame.trend.is_some());
    assert!(harness.session.trend_equation().is_some());
    let overlay = overlay.unwrap();
    assert_eq!(overlay.severity, Severity::Warning);
    assert_eq!(overlay.message, "No data for Ethereum");
    assert_eq!(overlay.series, vec![ETH]);
}

#[test]
fn total_failure_keeps_previous_chart() {
    let mut harness = Harness::new();
    harness.load(vec![Ok(history(BTC, 100.0)), Ok(history(ETH, 10.0))]).unwrap();

    let handle = harness.spawn(|s| async move { s.refresh(RefreshTrigger::Manual).await });
    harness.repository.answer(2, Err(NetworkError::HttpRequestFailed("offline".into())));
    harness.repository.answer(3, Err(NetworkError::HttpRequestFailed("offline".into())));
    let result = harness.settle(handle);

    let expected = ChartError::Network(NetworkError::AllRequestsFailed { failed: 2 });
    assert_eq!(result, Err(expected.clone()));
    assert_eq!(harness.session.status(), ChartStatus::Error { sequence: 2, error: expected });
    let (frame, overlay) = harness.renderer.last();
    assert_eq!(last_prices(&frame), vec![Some(103.0), Some(13.0)]);
    assert_eq!(overlay.map(|o| o.severity), Some(Severity::Error));
    assert_eq!(harness.session.controller().snapshot().unwrap().sequence, 1);

    harness.session.dismiss_error().unwrap();
    assert!(harness.renderer.last().1.is_none());
}

#[test]
fn emptying_the_selection_is_rejected_and_keeps_the_chart() {
    let mut harness = Harness::new();
    harness.load(vec![Ok(history(BTC, 100.0)), Ok(history(ETH, 10.0))]).unwrap();

    let handle = harness.spawn(|s| async move { s.toggle_series(BTC).await });
    harness.repository.answer(2, Ok(history(ETH, 11.0)));
    harness.settle(handle).unwrap();
    let calls = harness.repository.call_count();

    let handle = harness.spawn(|s| async move { s.toggle_series(ETH).await });
    let result = harness.settle(handle);

    assert_eq!(result, Err(ChartError::Validation(ValidationError::EmptySelection)));
    assert_eq!(harness.repository.call_count(), calls);
    let (frame, overlay) = harness.renderer.last();
    assert_eq!(frame.lines.len(), 1);
    assert_eq!(frame.lines[0].label, "Ethereum");
    assert_eq!(overlay.map(|o| o.severity), Some(Severity::Warning));
    assert_eq!(harness.session.controller().latest_sequence(), 2);
    assert_eq!(harness.session.controller().registry().selected_ids(), vec![ETH]);
}

#[test]
fn invalid_window_is_reported_and_ignored() {
    let mut harness = Harness::new();
    harness.load(vec![Ok(history(BTC, 100.0)), Ok(history(ETH, 10.0))]).unwrap();

    let handle = harness.spawn(|s| async move { s.set_window_hours(48).await });

    assert_eq!(
        harness.settle(handle),
        Err(ChartError::Validation(ValidationError::WindowOutOfRange(48)))
    );
    assert_eq!(harness.session.controller().window().hours(), 24);
    assert_eq!(harness.repository.call_count(), 2);
}
