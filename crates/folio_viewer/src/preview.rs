//! Two-finger pinch detection on the preview pane.
//!
//! The preview only recognizes one gesture: a pinch whose ratio deviates from
//! 1.0 past a threshold. That opens the overlay seeded from the pinch, after
//! which the overlay's own router takes over.

use std::collections::BTreeMap;

use crate::config::ViewerConfig;
use crate::event::{PointerEvent, PointerId};
use crate::geometry::{distance, Point, ScaleRange, Size};

/// Initial overlay transform derived from a preview pinch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySeed {
    pub scale: f32,
    pub translate: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreviewOutput {
    /// Not a pinch (yet); let the page handle the event normally
    PassThrough,
    /// Pinch in progress below the threshold; suppress native handling
    Tracking,
    /// Threshold crossed; open the overlay with this seed
    Open(OverlaySeed),
}

#[derive(Debug, Clone)]
pub struct PreviewRouter {
    pointers: BTreeMap<PointerId, Point>,
    pinch_start: Option<f32>,
    threshold: f32,
    seed_boost: f32,
    seed_pull: f32,
    initial_scale: f32,
    range: ScaleRange,
}

impl PreviewRouter {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            pointers: BTreeMap::new(),
            pinch_start: None,
            threshold: config.preview_pinch_threshold,
            seed_boost: config.preview_seed_boost,
            seed_pull: config.preview_seed_pull,
            initial_scale: config.initial_scale,
            range: config.scale_range(),
        }
    }

    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    pub fn pointer_down(&mut self, event: &PointerEvent) -> PreviewOutput {
        self.pointers.insert(event.id, event.position);
        self.pinch_start = self.pair().map(|(a, b)| distance(a, b));
        if self.pinch_start.is_some() {
            PreviewOutput::Tracking
        } else {
            PreviewOutput::PassThrough
        }
    }

    /// `viewport` is the page viewport the pinch center is measured against.
    pub fn pointer_move(&mut self, event: &PointerEvent, viewport: Size) -> PreviewOutput {
        let Some(slot) = self.pointers.get_mut(&event.id) else {
            return PreviewOutput::PassThrough;
        };
        *slot = event.position;

        let (Some(start), Some((a, b))) = (self.pinch_start, self.pair()) else {
            return PreviewOutput::PassThrough;
        };
        if start <= 0.0 {
            return PreviewOutput::Tracking;
        }

        let ratio = distance(a, b) / start;
        if (ratio - 1.0).abs() <= self.threshold {
            return PreviewOutput::Tracking;
        }

        let center = a.midpoint(b);
        let offset = center - Point::new(viewport.width / 2.0, viewport.height / 2.0);
        let seed = OverlaySeed {
            scale: self
                .range
                .clamp(self.initial_scale * ratio * self.seed_boost),
            translate: -offset * self.seed_pull,
        };
        log::debug!("Preview pinch ratio {:.3} opens overlay with {:?}", ratio, seed);

        self.reset();
        PreviewOutput::Open(seed)
    }

    /// Handle pointer-up and pointer-cancel alike.
    pub fn pointer_up(&mut self, event: &PointerEvent) {
        self.pointers.remove(&event.id);
        if self.pointers.len() != 2 {
            self.pinch_start = None;
        }
    }

    pub fn reset(&mut self) {
        self.pointers.clear();
        self.pinch_start = None;
    }

    fn pair(&self) -> Option<(Point, Point)> {
        if self.pointers.len() != 2 {
            return None;
        }
        let mut it = self.pointers.values();
        Some((*it.next()?, *it.next()?))
    }
}
