use leptos::html::Canvas;
use leptos::*;
use std::rc::Rc;
use wasm_bindgen::JsValue;

use crate::{
    application::{ChartSession, RefreshTimer, RefreshTrigger, interval_ticks},
    config::AppConfig,
    domain::{
        errors::ChartResult,
        logging::{LogComponent, get_logger},
        market_data::SeriesId,
    },
    infrastructure::{CanvasRenderer, PriceApiClient},
};

const CANVAS_ID: &str = "price-chart-canvas";

type BrowserSession = ChartSession<PriceApiClient, CanvasRenderer>;

/// Button state for one known series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesButton {
    pub id: SeriesId,
    pub label: String,
    pub color: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Load,
    Toggle(SeriesId),
    ToggleAll,
    Window(i64),
    Refresh(RefreshTrigger),
}

async fn perform(session: &BrowserSession, action: Action) -> ChartResult<()> {
    match action {
        Action::Load => session.load_series().await,
        Action::Toggle(id) => session.toggle_series(id).await,
        Action::ToggleAll => session.toggle_all().await,
        Action::Window(hours) => session.set_window_hours(hours).await,
        Action::Refresh(trigger) => session.refresh(trigger).await,
    }
}

/// Multi-series price chart with selection, window and refresh controls
#[component]
pub fn PriceChartApp(#[prop(optional)] config: Option<AppConfig>) -> impl IntoView {
    let config = config.unwrap_or_default();
    let refresh_period = config.refresh_interval();
    let (width, height) = (config.chart.width, config.chart.height);
    let initial_hours = config.default_window_hours;

    let session = Rc::new(ChartSession::new(
        PriceApiClient::from_config(&config),
        CanvasRenderer::new(CANVAS_ID),
        config,
    ));
    let session = store_value(session);

    let (buttons, set_buttons) = create_signal(Vec::<SeriesButton>::new());
    let (all_selected, set_all_selected) = create_signal(false);
    let (status, set_status) = create_signal(String::from("Idle"));
    let (overlay, set_overlay) = create_signal(None::<String>);
    let (equation, set_equation) = create_signal(None::<String>);
    let (hours, set_hours) = create_signal(initial_hours);

    // Copy the session state into signals after every operation.
    let sync = move || {
        session.with_value(|session| {
            let controller = session.controller();
            let registry = controller.registry();
            set_buttons.set(
                registry
                    .known()
                    .iter()
                    .map(|s| SeriesButton {
                        id: s.id,
                        label: s.label.clone(),
                        color: s.color.to_css(),
                        selected: registry.is_selected(s.id),
                    })
                    .collect(),
            );
            set_all_selected.set(registry.all_selected());
            set_status.set(controller.status().to_string());
            set_overlay.set(controller.overlay().map(|o| o.message.clone()));
            set_hours.set(i64::from(controller.window().hours()));
            drop(controller);
            set_equation.set(session.trend_equation());
        });
    };

    let run = move |action: Action| {
        let session = session.get_value();
        spawn_local(async move {
            if let Err(e) = perform(&session, action).await {
                get_logger().warn(LogComponent::Presentation("PriceChartApp"), &format!("{action:?}: {e}"));
            }
            sync();
        });
    };

    let (timer, task) = RefreshTimer::new(interval_ticks(refresh_period), move || {
        let session = session.get_value();
        async move {
            if let Err(e) = session.refresh(RefreshTrigger::Timer).await {
                get_logger().warn(LogComponent::Presentation("PriceChartApp"), &format!("Timed refresh: {e}"));
            }
            sync();
        }
    });
    spawn_local(task);
    on_cleanup(move || timer.cancel());

    let canvas_ref = create_node_ref::<Canvas>();
    canvas_ref.on_load(move |_| run(Action::Load));

    let dismiss = move |_: ev::MouseEvent| {
        session.with_value(|session| {
            if let Err(e) = session.dismiss_error() {
                get_logger().warn(LogComponent::Presentation("PriceChartApp"), &e.to_string());
            }
        });
        sync();
    };

    let on_hours_change = move |ev: ev::Event| match event_target_value(&ev).trim().parse::<i64>() {
        Ok(h) => run(Action::Window(h)),
        Err(_) => sync(),
    };

    view! {
        <style>
            {r#"
            .price-chart-app { font-family: sans-serif; max-width: 840px; margin: 0 auto; }
            .series-buttons { display: flex; flex-wrap: wrap; gap: 6px; margin-bottom: 8px; }
            .series-buttons button { border: 2px solid; border-radius: 4px; background: white; padding: 4px 8px; }
            .series-buttons button.selected { color: white; }
            .controls { display: flex; gap: 12px; align-items: center; margin-bottom: 8px; }
            .error-overlay { background: #fdecea; color: #c62828; padding: 6px 10px; border-radius: 4px; }
            .status { color: #666; font-size: 12px; }
            "#}
        </style>
        <div class="price-chart-app">
            <div class="series-buttons">
                <For
                    each=move || buttons.get()
                    key=|b| (b.id, b.selected)
                    children=move |b| {
                        let id = b.id;
                        let style = if b.selected {
                            format!("border-color: {0}; background: {0}", b.color)
                        } else {
                            format!("border-color: {}", b.color)
                        };
                        view! {
                            <button class:selected=b.selected style=style on:click=move |_| run(Action::Toggle(id))>
                                {b.label}
                            </button>
                        }
                    }
                />
                <button prop:disabled=move || all_selected.get() on:click=move |_| run(Action::ToggleAll)>
                    "Select all"
                </button>
            </div>
            <div class="controls">
                <label>
                    "Hours: "
                    <input
                        type="number"
                        min="1"
                        max="24"
                        prop:value=move || hours.get().to_string()
                        on:change=on_hours_change
                    />
                </label>
                <button on:click=move |_| run(Action::Refresh(RefreshTrigger::Manual))>"Refresh"</button>
                <span class="status">{move || status.get()}</span>
            </div>
            <Show when=move || overlay.get().is_some()>
                <div class="error-overlay">
                    {move || overlay.get().unwrap_or_default()}
                    " "
                    <button on:click=dismiss>"Dismiss"</button>
                </div>
            </Show>
            <canvas id=CANVAS_ID node_ref=canvas_ref width=width height=height></canvas>
            <p class="status">{move || equation.get().unwrap_or_default()}</p>
        </div>
    }
}

/// Mount [`PriceChartApp`] on the page body.
#[wasm_bindgen::prelude::wasm_bindgen(js_name = mountPriceChartApp)]
pub fn mount_price_chart_app(config: JsValue) -> Result<(), JsValue> {
    let config = AppConfig::from_js(&config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    mount_to_body(move || view! { <PriceChartApp config=config/> });
    Ok(())
}
