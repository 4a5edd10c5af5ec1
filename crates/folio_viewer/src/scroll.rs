//! Preview frame scroll position reporting.

use serde::{Deserialize, Serialize};

/// Scroll metrics of the preview frame element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f32,
    pub scroll_height: f32,
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f32, scroll_height: f32, client_height: f32) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// `round(100 * scroll_top / max(1, scroll_height - client_height))`, within 0-100.
    pub fn percent(&self) -> u8 {
        let range = (self.scroll_height - self.client_height).max(1.0);
        let percent = (100.0 * self.scroll_top / range).round();
        percent.clamp(0.0, 100.0) as u8
    }
}

/// Coalesces scroll events into one report per animation frame.
///
/// Events store the latest metrics; [`ScrollReporter::flush`] computes the
/// percent from whatever arrived last.
#[derive(Debug, Clone, Default)]
pub struct ScrollReporter {
    pending: Option<ScrollMetrics>,
    last_reported: Option<u8>,
}

impl ScrollReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scroll event. Returns true when this is the first event since
    /// the last flush, i.e. a frame needs to be requested.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        let first = self.pending.is_none();
        self.pending = Some(metrics);
        first
    }

    /// Percent for the latest pending metrics, if any.
    pub fn flush(&mut self) -> Option<u8> {
        let percent = self.pending.take()?.percent();
        self.last_reported = Some(percent);
        Some(percent)
    }

    /// Report `metrics` immediately, dropping anything pending.
    pub fn report_now(&mut self, metrics: ScrollMetrics) -> u8 {
        self.pending = None;
        let percent = metrics.percent();
        self.last_reported = Some(percent);
        percent
    }

    pub fn last_reported(&self) -> Option<u8> {
        self.last_reported
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
