use crate::domain::errors::ValidationError;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Value Object - Rendering rectangle with padding, fixed per render call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub padding_top: f64,
    pub padding_right: f64,
    pub padding_bottom: f64,
    pub padding_left: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 450.0,
            padding_top: 20.0,
            padding_right: 20.0,
            padding_bottom: 40.0,
            padding_left: 70.0,
        }
    }
}

impl ChartConfig {
    pub fn new(
        width: f64,
        height: f64,
        padding_top: f64,
        padding_right: f64,
        padding_bottom: f64,
        padding_left: f64,
    ) -> Result<Self, ValidationError> {
        let config = Self { width, height, padding_top, padding_right, padding_bottom, padding_left };
        config.validate()?;
        Ok(config)
    }

    /// Same padding as the default layout at a different size.
    pub fn sized(width: f64, height: f64) -> Result<Self, ValidationError> {
        let base = Self::default();
        Self::new(width, height, base.padding_top, base.padding_right, base.padding_bottom, base.padding_left)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let values = [
            self.width,
            self.height,
            self.padding_top,
            self.padding_right,
            self.padding_bottom,
            self.padding_left,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ValidationError::InvalidDimensions(
                "sizes must be finite and non-negative".to_string(),
            ));
        }
        if self.inner_width() <= 0.0 || self.inner_height() <= 0.0 {
            return Err(ValidationError::InvalidDimensions(format!(
                "inner area {}x{} is empty",
                self.inner_width(),
                self.inner_height()
            )));
        }
        Ok(())
    }

    pub fn inner_width(&self) -> f64 {
        self.width - self.padding_left - self.padding_right
    }

    pub fn inner_height(&self) -> f64 {
        self.height - self.padding_top - self.padding_bottom
    }

    pub fn inner_right(&self) -> f64 {
        self.padding_left + self.inner_width()
    }

    pub fn inner_bottom(&self) -> f64 {
        self.padding_top + self.inner_height()
    }
}

/// Value Object - Screen position inside the chart rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Value Object - Closed value range mapped onto one screen axis
#[derive(Debug, Clone, Copy, PartialEq, Display, Serialize)]
#[display(fmt = "[{}, {}]", min, max)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max { Self { min, max } } else { Self { min: max, max: min } }
    }

    /// Smallest domain covering every value, `None` for empty input.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values.into_iter().fold(None, |acc: Option<Domain>, v| {
            Some(match acc {
                None => Domain { min: v, max: v },
                Some(d) => Domain { min: d.min.min(v), max: d.max.max(v) },
            })
        })
    }

    pub fn union(&self, other: &Domain) -> Domain {
        Domain { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.span() == 0.0
    }
}

/// Value Object - One labelled axis position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub value: f64,
    pub position: f64,
    pub label: String,
}

/// Value Object - Color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub const fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn to_hex(&self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self { a: alpha, ..*self }
    }

    /// CSS color string for canvas styles.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:06x}", self.to_hex())
        } else {
            let hex = self.to_hex();
            format!(
                "rgba({}, {}, {}, {:.2})",
                (hex >> 16) & 0xFF,
                (hex >> 8) & 0xFF,
                hex & 0xFF,
                self.a.clamp(0.0, 1.0)
            )
        }
    }

    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const GRID: Color = Color::from_hex(0xE0E0E0);
    pub const AXIS: Color = Color::from_hex(0x666666);
    pub const WARNING: Color = Color::from_hex(0xB26A00);
    pub const ERROR: Color = Color::from_hex(0xC62828);
    pub const TREND: Color = Color::from_hex(0xE53935);
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

/// Series colors, assigned by position in the known-series list.
pub const PALETTE: [Color; 10] = [
    Color::from_hex(0x3366CC),
    Color::from_hex(0xDC3912),
    Color::from_hex(0xFF9900),
    Color::from_hex(0x109618),
    Color::from_hex(0x990099),
    Color::from_hex(0x0099C6),
    Color::from_hex(0xDD4477),
    Color::from_hex(0x66AA00),
    Color::from_hex(0xB82E2E),
    Color::from_hex(0x316395),
];
