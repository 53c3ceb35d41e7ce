//! Preview settings: user options overlaid onto built-in defaults.
//!
//! Options come from the config file and the command line as a sparse
//! [`PreviewOptions`]; [`Settings::resolve`] turns them into the immutable
//! [`Settings`] the preview controller runs with.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_MIN_HEIGHT: f64 = 500.0;
pub const DEFAULT_SPEED_MS: u64 = 350;
pub const DEFAULT_EASING: &str = "ease";
/// Below this viewport width the full-image region is hidden.
pub const DEFAULT_COMPACT_WIDTH: f64 = 830.0;

/// Errors raised while resolving user options.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingsError {
    #[error("unknown easing `{0}` (expected linear, ease, ease-in, ease-out, ease-in-out or cubic-bezier(x1, y1, x2, y2))")]
    UnknownEasing(String),

    #[error("invalid cubic-bezier `{0}`: x control points must lie within [0, 1]")]
    InvalidBezier(String),

    #[error("min_height must be a finite, non-negative number of pixels (got {0})")]
    InvalidMinHeight(f64),

    #[error("compact_width must be a finite, non-negative number of pixels (got {0})")]
    InvalidCompactWidth(f64),
}

// ───────────────────────────────────────── easing ────────────

/// A CSS-style cubic Bézier timing curve through (0,0) and (1,1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn coefficients(p1: f64, p2: f64) -> (f64, f64, f64) {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        let a = 1.0 - c - b;
        (a, b, c)
    }

    fn sample(p1: f64, p2: f64, t: f64) -> f64 {
        let (a, b, c) = Self::coefficients(p1, p2);
        ((a * t + b) * t + c) * t
    }

    fn sample_derivative(p1: f64, p2: f64, t: f64) -> f64 {
        let (a, b, c) = Self::coefficients(p1, p2);
        (3.0 * a * t + 2.0 * b) * t + c
    }

    /// Find the curve parameter whose x coordinate is `x`.
    fn solve_t(&self, x: f64) -> f64 {
        const EPSILON: f64 = 1e-7;

        // Newton's method converges quickly for well-behaved curves.
        let mut t = x;
        for _ in 0..8 {
            let err = Self::sample(self.x1, self.x2, t) - x;
            if err.abs() < EPSILON {
                return t;
            }
            let d = Self::sample_derivative(self.x1, self.x2, t);
            if d.abs() < 1e-6 {
                break;
            }
            t -= err / d;
        }

        // Fall back to bisection.
        let (mut lo, mut hi) = (0.0, 1.0);
        t = x;
        while lo < hi {
            let v = Self::sample(self.x1, self.x2, t);
            if (v - x).abs() < EPSILON {
                break;
            }
            if x > v {
                lo = t;
            } else {
                hi = t;
            }
            let next = (lo + hi) / 2.0;
            if (next - t).abs() < EPSILON {
                break;
            }
            t = next;
        }
        t
    }

    /// Eased progress for linear progress `x` in `[0, 1]`.
    pub fn at(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        Self::sample(self.y1, self.y2, self.solve_t(x))
    }
}

/// Timing curve applied to height transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    Curve(CubicBezier),
}

impl Easing {
    pub const EASE: Easing = Easing::Curve(CubicBezier::new(0.25, 0.1, 0.25, 1.0));
    pub const EASE_IN: Easing = Easing::Curve(CubicBezier::new(0.42, 0.0, 1.0, 1.0));
    pub const EASE_OUT: Easing = Easing::Curve(CubicBezier::new(0.0, 0.0, 0.58, 1.0));
    pub const EASE_IN_OUT: Easing = Easing::Curve(CubicBezier::new(0.42, 0.0, 0.58, 1.0));

    /// Parse a CSS timing-function name.
    pub fn parse(s: &str) -> Result<Self, SettingsError> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "linear" => Ok(Easing::Linear),
            "ease" => Ok(Easing::EASE),
            "ease-in" => Ok(Easing::EASE_IN),
            "ease-out" => Ok(Easing::EASE_OUT),
            "ease-in-out" => Ok(Easing::EASE_IN_OUT),
            _ => Self::parse_bezier(&name).ok_or_else(|| SettingsError::UnknownEasing(s.to_string()))?,
        }
    }

    fn parse_bezier(name: &str) -> Option<Result<Self, SettingsError>> {
        let args = name.strip_prefix("cubic-bezier(")?.strip_suffix(')')?;
        let values: Vec<f64> = args
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;
        let [x1, y1, x2, y2] = values[..] else {
            return None;
        };
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) || !y1.is_finite() || !y2.is_finite() {
            return Some(Err(SettingsError::InvalidBezier(name.to_string())));
        }
        Some(Ok(Easing::Curve(CubicBezier::new(x1, y1, x2, y2))))
    }

    /// Eased progress for linear progress `x` (clamped to `[0, 1]`).
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Easing::Linear => x.clamp(0.0, 1.0),
            Easing::Curve(curve) => curve.at(x),
        }
    }
}

// ───────────────────────────────────────── options ───────────

/// Sparse user options.  `None` fields fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PreviewOptions {
    #[serde(default)]
    pub min_height: Option<f64>,
    #[serde(default)]
    pub speed_ms: Option<u64>,
    #[serde(default)]
    pub easing: Option<String>,
    #[serde(default)]
    pub show_visit_button: Option<bool>,
    #[serde(default)]
    pub compact_width: Option<f64>,
    #[serde(default)]
    pub transitions: Option<bool>,
}

impl PreviewOptions {
    /// Layer `top` over `self`: every field set in `top` wins.
    pub fn overlay(self, top: PreviewOptions) -> PreviewOptions {
        PreviewOptions {
            min_height: top.min_height.or(self.min_height),
            speed_ms: top.speed_ms.or(self.speed_ms),
            easing: top.easing.or(self.easing),
            show_visit_button: top.show_visit_button.or(self.show_visit_button),
            compact_width: top.compact_width.or(self.compact_width),
            transitions: top.transitions.or(self.transitions),
        }
    }
}

// ───────────────────────────────────────── settings ──────────

/// Resolved, immutable preview settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Floor for the preview panel height, in pixels.
    pub min_height: f64,
    /// Duration of the open/close height transitions.
    pub speed: Duration,
    pub easing: Easing,
    /// Render the "Visit website" link when an item has a URL.
    pub show_visit_button: bool,
    /// Viewport width (px) below which the full image is hidden.
    pub compact_width: f64,
    /// When `false`, heights jump and close completion runs synchronously.
    pub transitions: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_height: DEFAULT_MIN_HEIGHT,
            speed: Duration::from_millis(DEFAULT_SPEED_MS),
            easing: Easing::EASE,
            show_visit_button: true,
            compact_width: DEFAULT_COMPACT_WIDTH,
            transitions: true,
        }
    }
}

impl Settings {
    /// Overlay `options` onto the defaults.
    pub fn resolve(options: &PreviewOptions) -> Result<Self, SettingsError> {
        let defaults = Settings::default();

        let min_height = options.min_height.unwrap_or(defaults.min_height);
        if !min_height.is_finite() || min_height < 0.0 {
            return Err(SettingsError::InvalidMinHeight(min_height));
        }
        let compact_width = options.compact_width.unwrap_or(defaults.compact_width);
        if !compact_width.is_finite() || compact_width < 0.0 {
            return Err(SettingsError::InvalidCompactWidth(compact_width));
        }
        let easing = match options.easing.as_deref() {
            Some(name) => Easing::parse(name)?,
            None => defaults.easing,
        };

        Ok(Self {
            min_height,
            speed: options.speed_ms.map(Duration::from_millis).unwrap_or(defaults.speed),
            easing,
            show_visit_button: options.show_visit_button.unwrap_or(defaults.show_visit_button),
            compact_width,
            transitions: options.transitions.unwrap_or(defaults.transitions),
        })
    }

    /// Whether height changes animate (transition support available).
    pub fn animates(&self) -> bool {
        self.transitions && !self.speed.is_zero()
    }
}
