//! Tunable viewer settings.
//!
//! Every field has a serde default so a partial JSON object (or `{}`) is a
//! valid configuration.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, ViewerError};
use crate::geometry::ScaleRange;

/// Settings for one viewer instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Smallest allowed zoom multiplier
    pub min_scale: f32,
    /// Largest allowed zoom multiplier
    pub max_scale: f32,
    /// Zoom used on open, fit and reset
    pub initial_scale: f32,
    /// Wheel zoom divisor; larger is slower
    pub wheel_sensitivity: f32,
    /// Minimum finger separation change (px) for a pinch update
    pub pinch_noise_px: f32,
    /// Release speed (px/ms) needed to start momentum
    pub momentum_start_velocity: f32,
    /// Speed (px/ms) where momentum stops
    pub momentum_stop_velocity: f32,
    /// Per-frame velocity multiplier, in (0, 1)
    pub friction: f32,
    /// Velocity multiplier on an axis that hit an edge, in [0, 1]
    pub edge_damping: f32,
    /// Nominal frame interval (ms)
    pub frame_interval_ms: f32,
    /// Velocity -> per-frame pixel gain
    pub velocity_gain: f32,
    /// Max gap (ms) between two taps of a double tap
    pub double_tap_window_ms: f64,
    /// Double tap resets zoom above `initial_scale * double_tap_reset_factor`
    pub double_tap_reset_factor: f32,
    /// Preview pinch ratio deviation that opens the overlay
    pub preview_pinch_threshold: f32,
    /// Extra zoom applied when seeding the overlay from a preview pinch
    pub preview_seed_boost: f32,
    /// Fraction of the pinch-center offset used to seed the translate
    pub preview_seed_pull: f32,
    /// Factor for +/- buttons and keys
    pub button_zoom_step: f32,
    /// Factor for the zoom-to-max button
    pub zoom_max_step: f32,
    /// Slider distance moved by its -/+ buttons
    pub slider_nudge: f32,
    /// Whether closing the overlay resets the transform (minimize always does)
    pub reset_on_close: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            initial_scale: INITIAL_SCALE,
            wheel_sensitivity: WHEEL_SENSITIVITY,
            pinch_noise_px: PINCH_NOISE_PX,
            momentum_start_velocity: MOMENTUM_START_VELOCITY,
            momentum_stop_velocity: MOMENTUM_STOP_VELOCITY,
            friction: MOMENTUM_FRICTION,
            edge_damping: EDGE_DAMPING,
            frame_interval_ms: FRAME_INTERVAL_MS,
            velocity_gain: VELOCITY_GAIN,
            double_tap_window_ms: DOUBLE_TAP_WINDOW_MS,
            double_tap_reset_factor: DOUBLE_TAP_RESET_FACTOR,
            preview_pinch_threshold: PREVIEW_PINCH_THRESHOLD,
            preview_seed_boost: PREVIEW_SEED_BOOST,
            preview_seed_pull: PREVIEW_SEED_PULL,
            button_zoom_step: BUTTON_ZOOM_STEP,
            zoom_max_step: ZOOM_MAX_STEP,
            slider_nudge: SLIDER_NUDGE,
            reset_on_close: true,
        }
    }
}

impl ViewerConfig {
    pub fn scale_range(&self) -> ScaleRange {
        ScaleRange::new(self.min_scale, self.max_scale)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ViewerError::InvalidConfig(msg));

        if !(self.min_scale.is_finite() && self.min_scale > 0.0) {
            return invalid(format!("min_scale must be positive, got {}", self.min_scale));
        }
        if !(self.max_scale.is_finite() && self.max_scale > self.min_scale) {
            return invalid(format!(
                "max_scale ({}) must be greater than min_scale ({})",
                self.max_scale, self.min_scale
            ));
        }
        if !(self.min_scale..=self.max_scale).contains(&self.initial_scale) {
            return invalid(format!(
                "initial_scale {} outside [{}, {}]",
                self.initial_scale, self.min_scale, self.max_scale
            ));
        }
        if !(self.wheel_sensitivity > 0.0) {
            return invalid("wheel_sensitivity must be positive".to_string());
        }
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return invalid(format!("friction must be in (0, 1), got {}", self.friction));
        }
        if !(0.0..=1.0).contains(&self.edge_damping) {
            return invalid(format!("edge_damping must be in [0, 1], got {}", self.edge_damping));
        }
        if !(self.momentum_stop_velocity > 0.0) {
            return invalid("momentum_stop_velocity must be positive".to_string());
        }
        if self.momentum_start_velocity < self.momentum_stop_velocity {
            return invalid("momentum_start_velocity must not be below momentum_stop_velocity".to_string());
        }
        if !(self.button_zoom_step > 1.0 && self.zoom_max_step > 1.0) {
            return invalid("zoom steps must be greater than 1".to_string());
        }
        if self.pinch_noise_px < 0.0 || self.double_tap_window_ms < 0.0 {
            return invalid("thresholds must not be negative".to_string());
        }
        Ok(())
    }
}
