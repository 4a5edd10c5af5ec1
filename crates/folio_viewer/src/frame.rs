//! Per-frame commit batching.
//!
//! Input handlers never write to the rendered surface. They mark slots in
//! [`FrameRequests`]; the host requests one animation frame while any slot is
//! set and calls the viewer's `on_frame`, which drains every slot into a
//! single [`FrameOutput`]. Clearing a slot is how a scheduled write gets
//! cancelled: a frame that fires after the clear finds nothing to do.

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::constants::ZOOM_DISPLAY_UNIT;
use crate::geometry::ScaleRange;
use crate::transform::ViewTransform;

/// Millisecond clock shared by event timestamps and frame callbacks.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds since the clock was created.
    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Pending work for the next animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameRequests {
    /// Live transform changed and must be written to the surface
    pub surface: bool,
    /// Readouts (zoom %, slider) must be reconciled
    pub display: bool,
    /// Momentum wants another step
    pub momentum: bool,
    /// A scroll event is waiting to be reported
    pub scroll: bool,
    /// A preload outcome is waiting to be applied
    pub source: bool,
}

impl FrameRequests {
    pub fn any(&self) -> bool {
        self.surface || self.display || self.momentum || self.scroll || self.source
    }

    /// Live transform and readouts both need a commit.
    pub fn request_commit(&mut self) {
        self.surface = true;
        self.display = true;
    }

    /// Drop scheduled gesture-side work (momentum and pending commits).
    pub fn cancel_gesture_work(&mut self) {
        self.momentum = false;
        self.surface = false;
        self.display = false;
    }

    pub fn cancel_all(&mut self) {
        *self = Self::default();
    }

    /// Take the current requests, leaving none behind.
    pub fn take(&mut self) -> FrameRequests {
        std::mem::take(self)
    }
}

/// Heavier UI read-model, reconciled at most once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    pub is_open: bool,
    /// `round(scale * 100)`
    pub zoom_percent: u32,
    /// Slider position, 0-100
    pub slider_position: f32,
}

impl DisplayState {
    pub fn from_transform(is_open: bool, transform: &ViewTransform, range: &ScaleRange) -> Self {
        Self {
            is_open,
            zoom_percent: zoom_percent(transform.scale),
            slider_position: range.slider_position(transform.scale),
        }
    }
}

/// Displayed zoom percentage for a scale.
pub fn zoom_percent(scale: f32) -> u32 {
    (scale * ZOOM_DISPLAY_UNIT).round().max(0.0) as u32
}

/// Everything one animation frame commits.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameOutput {
    /// Transform to write to the overlay image
    pub transform: Option<ViewTransform>,
    /// New readouts, when they changed
    pub display: Option<DisplayState>,
    /// Image URL to swap into the overlay
    pub source: Option<String>,
    /// Preview scroll position to report
    pub scroll_percent: Option<u8>,
}

impl FrameOutput {
    pub fn is_empty(&self) -> bool {
        self.transform.is_none()
            && self.display.is_none()
            && self.source.is_none()
            && self.scroll_percent.is_none()
    }
}
