//! Centralized constants for folio_viewer
//!
//! These are the defaults behind [`ViewerConfig`](crate::ViewerConfig). Code
//! that needs a tunable reads it from the config; the constants exist so the
//! defaults live in one place.

// =============================================================================
// Scale range
// =============================================================================

/// Smallest zoom multiplier (10%)
pub const MIN_SCALE: f32 = 0.1;

/// Largest zoom multiplier (3000%)
pub const MAX_SCALE: f32 = 30.0;

/// Zoom multiplier used on open, fit, minimize and close.
/// At 1.0 the image exactly fits the viewer window.
pub const INITIAL_SCALE: f32 = 1.0;

/// Displayed zoom percentage is `scale * ZOOM_DISPLAY_UNIT`
pub const ZOOM_DISPLAY_UNIT: f32 = 100.0;

// =============================================================================
// Wheel & pinch
// =============================================================================

/// Divisor for the exponential wheel zoom: factor = exp(-delta_y / sensitivity)
pub const WHEEL_SENSITIVITY: f32 = 300.0;

/// Finger separation change (px) below which a pinch move is ignored
pub const PINCH_NOISE_PX: f32 = 2.0;

// =============================================================================
// Momentum
// =============================================================================

/// Release velocity (px/ms) required to start momentum
pub const MOMENTUM_START_VELOCITY: f32 = 0.002;

/// Velocity magnitude (px/ms) at which momentum stops
pub const MOMENTUM_STOP_VELOCITY: f32 = 0.0005;

/// Per-frame velocity multiplier
pub const MOMENTUM_FRICTION: f32 = 0.95;

/// Velocity multiplier applied to an axis that hit the image edge
pub const EDGE_DAMPING: f32 = 0.6;

/// Nominal frame interval (ms) used to advance momentum
pub const FRAME_INTERVAL_MS: f32 = 16.0;

/// Gain converting px/ms velocity into visible per-frame movement
pub const VELOCITY_GAIN: f32 = 20.0;

// =============================================================================
// Taps
// =============================================================================

/// Two pointer-downs closer than this (ms) count as a double tap
pub const DOUBLE_TAP_WINDOW_MS: f64 = 350.0;

/// Above `INITIAL_SCALE * DOUBLE_TAP_RESET_FACTOR` a double tap resets zoom
pub const DOUBLE_TAP_RESET_FACTOR: f32 = 1.15;

// =============================================================================
// Preview pane
// =============================================================================

/// Deviation of the preview pinch ratio from 1.0 that opens the overlay
pub const PREVIEW_PINCH_THRESHOLD: f32 = 0.06;

/// Extra zoom applied to the preview pinch ratio when seeding the overlay
pub const PREVIEW_SEED_BOOST: f32 = 1.2;

/// Fraction of the pinch-center offset used to seed the overlay translate
pub const PREVIEW_SEED_PULL: f32 = 0.15;

// =============================================================================
// Controls
// =============================================================================

/// Zoom factor for the +/- buttons and keyboard shortcuts
pub const BUTTON_ZOOM_STEP: f32 = 1.25;

/// Zoom factor for the zoom-to-max title bar button
pub const ZOOM_MAX_STEP: f32 = 1.5;

/// Slider (0-100) distance moved by the slider's own -/+ buttons
pub const SLIDER_NUDGE: f32 = 6.0;

/// Slider position range
pub const SLIDER_MAX: f32 = 100.0;
