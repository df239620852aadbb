use crate::domain::chart::{ChartFrame, ChartRenderer, Color, ErrorOverlay, Severity};
use crate::domain::errors::RenderingError;
use crate::domain::logging::LogComponent;
use crate::log_trace;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const FONT: &str = "12px sans-serif";
const LEGEND_ROW: f64 = 16.0;

/// Canvas 2D renderer for charts - Infrastructure implementation
pub struct CanvasRenderer {
    canvas_id: String,
}

impl CanvasRenderer {
    pub fn new(canvas_id: impl Into<String>) -> Self {
        Self { canvas_id: canvas_id.into() }
    }

    pub fn canvas_id(&self) -> &str {
        &self.canvas_id
    }

    /// Get canvas element and context
    fn get_canvas_context(&self) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), RenderingError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| RenderingError::ContextUnavailable("no document".to_string()))?;
        let canvas = document
            .get_element_by_id(&self.canvas_id)
            .ok_or_else(|| RenderingError::CanvasNotFound(self.canvas_id.clone()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| RenderingError::CanvasNotFound(self.canvas_id.clone()))?;

        let context = canvas
            .get_context("2d")
            .map_err(|e| RenderingError::ContextUnavailable(format!("{e:?}")))?
            .ok_or_else(|| RenderingError::ContextUnavailable("2d context is null".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderingError::ContextUnavailable("not a 2D context".to_string()))?;

        Ok((canvas, context))
    }

    fn draw_axes(&self, ctx: &CanvasRenderingContext2d, frame: &ChartFrame) -> Result<(), RenderingError> {
        let c = &frame.config;
        ctx.set_line_width(1.0);
        ctx.set_font(FONT);

        ctx.set_stroke_style_str(&Color::GRID.to_css());
        ctx.set_fill_style_str(&Color::AXIS.to_css());
        ctx.set_text_align("center");
        ctx.set_text_baseline("top");
        for tick in &frame.x_ticks {
            ctx.begin_path();
            ctx.move_to(tick.position, c.padding_top);
            ctx.line_to(tick.position, c.inner_bottom());
            ctx.stroke();
            ctx.fill_text(&tick.label, tick.position, c.inner_bottom() + 6.0).map_err(draw_failed)?;
        }

        ctx.set_text_align("right");
        ctx.set_text_baseline("middle");
        for tick in &frame.y_ticks {
            ctx.begin_path();
            ctx.move_to(c.padding_left, tick.position);
            ctx.line_to(c.inner_right(), tick.position);
            ctx.stroke();
            ctx.fill_text(&tick.label, c.padding_left - 6.0, tick.position).map_err(draw_failed)?;
        }

        ctx.set_stroke_style_str(&Color::AXIS.to_css());
        ctx.begin_path();
        ctx.move_to(c.padding_left, c.padding_top);
        ctx.line_to(c.padding_left, c.inner_bottom());
        ctx.line_to(c.inner_right(), c.inner_bottom());
        ctx.stroke();
        Ok(())
    }

    fn draw_series(&self, ctx: &CanvasRenderingContext2d, frame: &ChartFrame) -> Result<(), RenderingError> {
        let c = &frame.config;
        ctx.save();
        ctx.begin_path();
        ctx.rect(c.padding_left, c.padding_top, c.inner_width(), c.inner_height());
        ctx.clip();

        ctx.set_line_width(2.0);
        for line in &frame.lines {
            let Some((first, rest)) = line.points.split_first() else {
                continue;
            };
            ctx.set_stroke_style_str(&line.color.to_css());
            ctx.begin_path();
            ctx.move_to(first.x, first.y);
            for p in rest {
                ctx.line_to(p.x, p.y);
            }
            ctx.stroke();
        }

        if let Some(trend) = &frame.trend {
            let dash = js_sys::Array::of2(&JsValue::from_f64(6.0), &JsValue::from_f64(4.0));
            ctx.set_line_dash(&dash).map_err(draw_failed)?;
            ctx.set_stroke_style_str(&trend.color.to_css());
            ctx.begin_path();
            ctx.move_to(trend.start.x, trend.start.y);
            ctx.line_to(trend.end.x, trend.end.y);
            ctx.stroke();
            ctx.set_line_dash(&js_sys::Array::new()).map_err(draw_failed)?;
        }

        ctx.restore();
        Ok(())
    }

    fn draw_legend(&self, ctx: &CanvasRenderingContext2d, frame: &ChartFrame) -> Result<(), RenderingError> {
        let c = &frame.config;
        let x = c.padding_left + 8.0;
        ctx.set_font(FONT);
        ctx.set_text_align("left");
        ctx.set_text_baseline("middle");

        let mut y = c.padding_top + 10.0;
        for entry in &frame.legend {
            ctx.set_fill_style_str(&entry.color.to_css());
            ctx.fill_rect(x, y - 4.0, 8.0, 8.0);
            let text = match entry.last_price {
                Some(price) => format!("{} {:.2}", entry.label, price),
                None => entry.label.clone(),
            };
            ctx.set_fill_style_str(&Color::AXIS.to_css());
            ctx.fill_text(&text, x + 14.0, y).map_err(draw_failed)?;
            y += LEGEND_ROW;
        }

        let note = match (&frame.trend, &frame.trend_unavailable) {
            (Some(trend), _) => Some(trend.equation.clone()),
            (None, Some(reason)) => Some(reason.user_message().to_string()),
            (None, None) => None,
        };
        if let Some(note) = note {
            ctx.set_fill_style_str(&Color::TREND.to_css());
            ctx.fill_text(&note, x, y).map_err(draw_failed)?;
        }
        Ok(())
    }

    fn draw_message(
        &self,
        ctx: &CanvasRenderingContext2d,
        frame: &ChartFrame,
        text: &str,
    ) -> Result<(), RenderingError> {
        let c = &frame.config;
        ctx.set_font("14px sans-serif");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_fill_style_str(&Color::AXIS.to_css());
        ctx.fill_text(text, c.padding_left + c.inner_width() / 2.0, c.padding_top + c.inner_height() / 2.0)
            .map_err(draw_failed)
    }

    fn draw_overlay(
        &self,
        ctx: &CanvasRenderingContext2d,
        frame: &ChartFrame,
        overlay: &ErrorOverlay,
    ) -> Result<(), RenderingError> {
        let c = &frame.config;
        let color = match overlay.severity {
            Severity::Warning => Color::WARNING,
            Severity::Error => Color::ERROR,
        };
        let height = 24.0;
        let top = c.inner_bottom() - height;
        ctx.set_fill_style_str(&color.with_alpha(0.85).to_css());
        ctx.fill_rect(c.padding_left, top, c.inner_width(), height);
        ctx.set_font(FONT);
        ctx.set_text_align("left");
        ctx.set_text_baseline("middle");
        ctx.set_fill_style_str(&Color::WHITE.to_css());
        ctx.fill_text(&overlay.message, c.padding_left + 8.0, top + height / 2.0).map_err(draw_failed)
    }
}

fn draw_failed(error: JsValue) -> RenderingError {
    RenderingError::DrawFailed(format!("{error:?}"))
}

impl ChartRenderer for CanvasRenderer {
    fn render(&self, frame: &ChartFrame, overlay: Option<&ErrorOverlay>) -> Result<(), RenderingError> {
        let (canvas, ctx) = self.get_canvas_context()?;
        let c = &frame.config;
        canvas.set_width(c.width as u32);
        canvas.set_height(c.height as u32);

        ctx.clear_rect(0.0, 0.0, c.width, c.height);
        ctx.set_fill_style_str(&Color::WHITE.to_css());
        ctx.fill_rect(0.0, 0.0, c.width, c.height);

        if frame.is_empty() {
            self.draw_message(&ctx, frame, "No data for the selected window")?;
        } else {
            self.draw_axes(&ctx, frame)?;
            self.draw_series(&ctx, frame)?;
            self.draw_legend(&ctx, frame)?;
        }
        if let Some(overlay) = overlay {
            self.draw_overlay(&ctx, frame, overlay)?;
        }

        log_trace!(
            LogComponent::Infrastructure("CanvasRenderer"),
            "🎨 Rendered {} lines, trend: {}",
            frame.lines.len(),
            frame.trend.is_some()
        );
        Ok(())
    }
}
