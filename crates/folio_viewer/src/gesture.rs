//! Pointer gesture classification for the overlay surface.
//!
//! The number of tracked contacts decides the gesture: one contact pans, two
//! contacts pinch, anything else is ignored until the count changes again.
//! Double tap detection runs alongside and only looks at pointer-downs that
//! start from zero contacts.

use std::collections::BTreeMap;

use crate::bounds::ImageGeometry;
use crate::config::ViewerConfig;
use crate::event::{PointerEvent, PointerId};
use crate::geometry::{distance, Point, Rect};
use crate::transform::TransformState;

/// What the router needs to dispatch into the transform.
pub struct GestureContext<'a> {
    pub transform: &'a mut TransformState,
    pub geometry: ImageGeometry,
    /// Viewer window rectangle in client coordinates
    pub frame: Rect,
}

/// Result of feeding one pointer event to the router.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutput {
    /// Nothing visible changed
    Unchanged,
    /// The transform was updated
    Transformed,
    /// The last contact lifted; `fling` carries a velocity worth animating
    Released { fling: Option<Point> },
}

/// Current interpretation of the contact set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum GestureMode {
    #[default]
    Idle,
    /// One contact; `anchor` is pointer-at-start minus translate-at-start
    Panning { anchor: Point },
    /// Two contacts; `baseline` is the last measured finger separation
    Pinching { baseline: f32 },
    /// Three or more contacts
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    position: Point,
    timestamp_ms: f64,
}

/// Tracks active pointers and turns them into pan/pinch/double-tap updates.
#[derive(Debug, Clone)]
pub struct GestureRouter {
    pointers: BTreeMap<PointerId, Point>,
    mode: GestureMode,
    last_sample: Option<Sample>,
    velocity: Point,
    last_tap_ms: Option<f64>,
    pinch_noise_px: f32,
    double_tap_window_ms: f64,
    momentum_start_velocity: f32,
}

impl GestureRouter {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            pointers: BTreeMap::new(),
            mode: GestureMode::Idle,
            last_sample: None,
            velocity: Point::ZERO,
            last_tap_ms: None,
            pinch_noise_px: config.pinch_noise_px,
            double_tap_window_ms: config.double_tap_window_ms,
            momentum_start_velocity: config.momentum_start_velocity,
        }
    }

    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.mode, GestureMode::Panning { .. })
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.mode, GestureMode::Pinching { .. })
    }

    /// Last estimated pan velocity in px/ms.
    pub fn velocity(&self) -> Point {
        self.velocity
    }

    /// Current pinch baseline, if two contacts are down.
    pub fn pinch_baseline(&self) -> Option<f32> {
        match self.mode {
            GestureMode::Pinching { baseline } => Some(baseline),
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, event: &PointerEvent, ctx: GestureContext<'_>) -> GestureOutput {
        let first_contact = self.pointers.is_empty();
        self.pointers.insert(event.id, event.position);
        self.velocity = Point::ZERO;

        let mut output = GestureOutput::Unchanged;
        if first_contact {
            if self.is_double_tap(event.timestamp_ms) {
                log::debug!("Double tap at {:?}", event.position);
                let point = ctx.frame.offset_from_center(event.position);
                ctx.transform.double_tap_toggle(point, &ctx.geometry);
                self.last_tap_ms = None;
                output = GestureOutput::Transformed;
            } else {
                self.last_tap_ms = Some(event.timestamp_ms);
            }
        }

        self.reclassify(event.timestamp_ms, ctx.transform);
        output
    }

    pub fn pointer_move(&mut self, event: &PointerEvent, ctx: GestureContext<'_>) -> GestureOutput {
        let Some(slot) = self.pointers.get_mut(&event.id) else {
            return GestureOutput::Unchanged;
        };
        *slot = event.position;

        match self.mode {
            GestureMode::Panning { anchor } => {
                ctx.transform.pan(event.position, anchor, &ctx.geometry);
                if let Some(last) = self.last_sample {
                    let dt = (event.timestamp_ms - last.timestamp_ms).max(1.0) as f32;
                    self.velocity = (event.position - last.position) * (1.0 / dt);
                }
                self.last_sample = Some(Sample {
                    position: event.position,
                    timestamp_ms: event.timestamp_ms,
                });
                GestureOutput::Transformed
            }
            GestureMode::Pinching { baseline } => {
                let Some((a, b)) = self.pair() else {
                    return GestureOutput::Unchanged;
                };
                let current = distance(a, b);
                if (current - baseline).abs() <= self.pinch_noise_px {
                    return GestureOutput::Unchanged;
                }
                self.mode = GestureMode::Pinching { baseline: current };
                if baseline <= 0.0 {
                    return GestureOutput::Unchanged;
                }
                let midpoint = ctx.frame.offset_from_center(a.midpoint(b));
                ctx.transform
                    .pinch_zoom(midpoint, current / baseline, &ctx.geometry);
                GestureOutput::Transformed
            }
            GestureMode::Idle | GestureMode::Ignored => GestureOutput::Unchanged,
        }
    }

    /// Handle pointer-up and pointer-cancel alike.
    pub fn pointer_up(&mut self, event: &PointerEvent, transform: &TransformState) -> GestureOutput {
        if self.pointers.remove(&event.id).is_none() {
            return GestureOutput::Unchanged;
        }

        if self.pointers.is_empty() {
            self.mode = GestureMode::Idle;
            self.last_sample = None;
            let velocity = std::mem::replace(&mut self.velocity, Point::ZERO);
            let fling = (velocity.length() > self.momentum_start_velocity).then_some(velocity);
            log::debug!("Gesture released, fling: {:?}", fling);
            return GestureOutput::Released { fling };
        }

        self.reclassify(event.timestamp_ms, transform);
        GestureOutput::Unchanged
    }

    /// Drop every tracked contact, e.g. when the overlay closes mid-gesture.
    pub fn reset(&mut self) {
        self.pointers.clear();
        self.mode = GestureMode::Idle;
        self.last_sample = None;
        self.velocity = Point::ZERO;
        self.last_tap_ms = None;
    }

    fn is_double_tap(&self, now_ms: f64) -> bool {
        self.last_tap_ms
            .is_some_and(|last| now_ms - last < self.double_tap_window_ms)
    }

    fn pair(&self) -> Option<(Point, Point)> {
        let mut it = self.pointers.values();
        Some((*it.next()?, *it.next()?))
    }

    /// Pick the gesture for the current contact count.
    fn reclassify(&mut self, now_ms: f64, transform: &TransformState) {
        self.mode = match self.pointers.len() {
            0 => GestureMode::Idle,
            1 => {
                let Some(&position) = self.pointers.values().next() else {
                    return;
                };
                self.last_sample = Some(Sample {
                    position,
                    timestamp_ms: now_ms,
                });
                self.velocity = Point::ZERO;
                GestureMode::Panning {
                    anchor: transform.pan_anchor(position),
                }
            }
            2 => {
                self.velocity = Point::ZERO;
                self.last_sample = None;
                match self.pair() {
                    Some((a, b)) => GestureMode::Pinching {
                        baseline: distance(a, b),
                    },
                    None => GestureMode::Idle,
                }
            }
            _ => GestureMode::Ignored,
        };
    }
}
