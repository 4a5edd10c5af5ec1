//! Zoom/pan transform and the operations that mutate it.
//!
//! Anchor points are offsets from the viewer center in screen pixels. Every
//! operation except [`TransformState::fit`] runs its result through
//! [`ImageGeometry::constrain`] before committing, so the committed translate
//! is always inside the pan limits for the committed scale.

use serde::{Deserialize, Serialize};

use crate::bounds::ImageGeometry;
use crate::config::ViewerConfig;
use crate::geometry::{Point, ScaleRange};

/// Scale plus translate, applied as `translate(t) scale(s)` about the center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f32,
    pub translate: Point,
}

impl ViewTransform {
    pub fn new(scale: f32, translate: Point) -> Self {
        Self { scale, translate }
    }

    /// Re-anchor for a new scale so the content under `anchor` stays put.
    ///
    /// The content point under the anchor is `(anchor - translate) / scale`;
    /// after zooming it must land on the same screen offset.
    pub fn zoom_about(&self, new_scale: f32, anchor: Point) -> ViewTransform {
        let ratio = new_scale / self.scale;
        let rel = anchor - self.translate;
        ViewTransform {
            scale: new_scale,
            translate: self.translate - rel * (ratio - 1.0),
        }
    }

    /// CSS transform string for the rendered surface.
    pub fn to_css(self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate.x, self.translate.y, self.scale
        )
    }
}

/// Owner of the live transform.
#[derive(Debug, Clone)]
pub struct TransformState {
    current: ViewTransform,
    range: ScaleRange,
    initial_scale: f32,
    wheel_sensitivity: f32,
    double_tap_reset_factor: f32,
}

impl TransformState {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            current: ViewTransform::new(config.initial_scale, Point::ZERO),
            range: config.scale_range(),
            initial_scale: config.initial_scale,
            wheel_sensitivity: config.wheel_sensitivity,
            double_tap_reset_factor: config.double_tap_reset_factor,
        }
    }

    pub fn current(&self) -> ViewTransform {
        self.current
    }

    pub fn scale(&self) -> f32 {
        self.current.scale
    }

    pub fn translate(&self) -> Point {
        self.current.translate
    }

    pub fn range(&self) -> ScaleRange {
        self.range
    }

    pub fn initial_scale(&self) -> f32 {
        self.initial_scale
    }

    fn commit(&mut self, candidate: ViewTransform, geometry: &ImageGeometry) -> ViewTransform {
        self.current = ViewTransform {
            scale: candidate.scale,
            translate: geometry.constrain(candidate.translate, candidate.scale),
        };
        self.current
    }

    fn zoom_to(&mut self, target: f32, anchor: Point, geometry: &ImageGeometry) -> ViewTransform {
        let target = self.range.clamp(target);
        let candidate = self.current.zoom_about(target, anchor);
        self.commit(candidate, geometry)
    }

    /// Exponential wheel zoom about the cursor.
    pub fn wheel_zoom(
        &mut self,
        cursor: Point,
        delta_y: f32,
        geometry: &ImageGeometry,
    ) -> ViewTransform {
        let factor = (-delta_y / self.wheel_sensitivity).exp();
        self.zoom_to(self.current.scale * factor, cursor, geometry)
    }

    /// Pinch zoom about the finger midpoint by `distance_ratio`.
    pub fn pinch_zoom(
        &mut self,
        midpoint: Point,
        distance_ratio: f32,
        geometry: &ImageGeometry,
    ) -> ViewTransform {
        self.zoom_to(self.current.scale * distance_ratio, midpoint, geometry)
    }

    /// Drag-pan: `translate = pointer - anchor`.
    ///
    /// `anchor` is `pointer_at_start - translate_at_start`, see [`Self::pan_anchor`].
    pub fn pan(&mut self, pointer: Point, anchor: Point, geometry: &ImageGeometry) -> ViewTransform {
        let candidate = ViewTransform::new(self.current.scale, pointer - anchor);
        self.commit(candidate, geometry)
    }

    /// Anchor to capture when a pan starts at `pointer`.
    pub fn pan_anchor(&self, pointer: Point) -> Point {
        pointer - self.current.translate
    }

    /// Offset the translate directly (momentum, keyboard nudges).
    pub fn translate_by(&mut self, delta: Point, geometry: &ImageGeometry) -> ViewTransform {
        let candidate = ViewTransform::new(self.current.scale, self.current.translate + delta);
        self.commit(candidate, geometry)
    }

    /// Zoom back to the initial scale when zoomed in, otherwise double.
    pub fn double_tap_toggle(&mut self, point: Point, geometry: &ImageGeometry) -> ViewTransform {
        let target = if self.current.scale > self.initial_scale * self.double_tap_reset_factor {
            self.initial_scale
        } else {
            self.current.scale * 2.0
        };
        self.zoom_to(target, point, geometry)
    }

    /// Initial scale, centered. Always a legal state.
    pub fn fit(&mut self) -> ViewTransform {
        self.current = ViewTransform::new(self.initial_scale, Point::ZERO);
        self.current
    }

    /// Alias of [`Self::fit`].
    pub fn reset(&mut self) -> ViewTransform {
        self.fit()
    }

    /// Explicit scale from the slider or buttons; translate is only re-clamped.
    pub fn set_scale(&mut self, scale: f32, geometry: &ImageGeometry) -> ViewTransform {
        let candidate = ViewTransform::new(self.range.clamp(scale), self.current.translate);
        self.commit(candidate, geometry)
    }

    /// Multiply the scale by `factor` about the center translate.
    pub fn zoom_by(&mut self, factor: f32, geometry: &ImageGeometry) -> ViewTransform {
        self.set_scale(self.current.scale * factor, geometry)
    }

    /// Set scale and translate together, e.g. when seeding from the preview.
    pub fn seed(&mut self, scale: f32, translate: Point, geometry: &ImageGeometry) -> ViewTransform {
        let candidate = ViewTransform::new(self.range.clamp(scale), translate);
        self.commit(candidate, geometry)
    }

    /// Re-clamp after the image or container changed size.
    pub fn reconstrain(&mut self, geometry: &ImageGeometry) -> ViewTransform {
        self.commit(self.current, geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn state() -> TransformState {
        TransformState::new(&ViewerConfig::default())
    }

    fn square() -> ImageGeometry {
        ImageGeometry::new(Size::new(400.0, 400.0), Size::new(400.0, 400.0))
    }

    fn assert_within_bounds(t: ViewTransform, g: &ImageGeometry) {
        assert_eq!(g.constrain(t.translate, t.scale), t.translate);
    }

    #[test]
    fn test_zoom_about_center_keeps_translate() {
        let t = ViewTransform::new(1.0, Point::ZERO);
        let z = t.zoom_about(2.0, Point::ZERO);
        assert_eq!(z.scale, 2.0);
        assert_eq!(z.translate, Point::ZERO);
    }

    #[test]
    fn test_zoom_about_preserves_content_under_anchor() {
        let t = ViewTransform::new(1.5, Point::new(50.0, 30.0));
        let anchor = Point::new(80.0, -40.0);
        let before = (anchor - t.translate) * (1.0 / t.scale);

        let z = t.zoom_about(4.0, anchor);
        let after = (anchor - z.translate) * (1.0 / z.scale);

        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
    }

    #[test]
    fn test_pinch_at_center_leaves_translate_zero() {
        let mut s = state();
        let t = s.pinch_zoom(Point::ZERO, 2.0, &square());
        assert!(approx_eq(t.scale, 2.0));
        assert_eq!(t.translate, Point::ZERO);
    }

    #[test]
    fn test_wheel_zoom_round_trip() {
        let mut s = state();
        let g = square();
        let cursor = Point::new(100.0, 50.0);

        let zoomed = s.wheel_zoom(cursor, -300.0, &g);
        assert!(approx_eq(zoomed.scale, std::f32::consts::E));
        assert_within_bounds(zoomed, &g);

        let back = s.wheel_zoom(cursor, 300.0, &g);
        assert!(approx_eq(back.scale, 1.0));
        assert!(approx_eq(back.translate.x, 0.0));
        assert!(approx_eq(back.translate.y, 0.0));
    }

    #[test]
    fn test_wheel_zoom_clamps_scale() {
        let mut s = state();
        let g = square();
        let t = s.wheel_zoom(Point::ZERO, -100_000.0, &g);
        assert_eq!(t.scale, 30.0);
        let t = s.wheel_zoom(Point::ZERO, 100_000.0, &g);
        assert!(approx_eq(t.scale, 0.1));
        assert_eq!(t.translate, Point::ZERO);
    }

    #[test]
    fn test_double_tap_toggle() {
        let mut s = state();
        let g = square();

        let t = s.double_tap_toggle(Point::new(30.0, 30.0), &g);
        assert!(approx_eq(t.scale, 2.0));
        assert_within_bounds(t, &g);

        let t = s.double_tap_toggle(Point::new(30.0, 30.0), &g);
        assert!(approx_eq(t.scale, 1.0));
        assert_eq!(t.translate, Point::ZERO);
    }

    #[test]
    fn test_double_tap_toggle_clamps_at_max() {
        let config = ViewerConfig {
            initial_scale: 20.0,
            ..Default::default()
        };
        let mut s = TransformState::new(&config);
        let t = s.double_tap_toggle(Point::ZERO, &square());
        assert_eq!(t.scale, 30.0);
    }

    #[test]
    fn test_pan_clamps_at_edge() {
        let mut s = state();
        let g = square();
        s.set_scale(2.0, &g);

        let anchor = s.pan_anchor(Point::new(0.0, 0.0));
        let t = s.pan(Point::new(1000.0, 1000.0), anchor, &g);
        assert_eq!(t.translate, Point::new(200.0, 200.0));
    }

    #[test]
    fn test_pan_follows_pointer_from_anchor() {
        let mut s = state();
        let g = square();
        s.set_scale(3.0, &g);
        s.translate_by(Point::new(20.0, -10.0), &g);

        let anchor = s.pan_anchor(Point::new(150.0, 150.0));
        let t = s.pan(Point::new(160.0, 145.0), anchor, &g);
        assert_eq!(t.translate, Point::new(30.0, -15.0));
    }

    #[test]
    fn test_set_scale_reclamps_translate() {
        let mut s = state();
        let g = square();
        s.set_scale(4.0, &g);
        s.translate_by(Point::new(600.0, 0.0), &g);
        assert_eq!(s.translate(), Point::new(600.0, 0.0));

        let t = s.set_scale(2.0, &g);
        assert_eq!(t.translate, Point::new(200.0, 0.0));

        let t = s.set_scale(99.0, &g);
        assert_eq!(t.scale, 30.0);
    }

    #[test]
    fn test_fit_resets() {
        let mut s = state();
        let g = square();
        s.set_scale(5.0, &g);
        s.translate_by(Point::new(100.0, 100.0), &g);
        let t = s.fit();
        assert_eq!(t, ViewTransform::new(1.0, Point::ZERO));
    }

    #[test]
    fn test_to_css() {
        let t = ViewTransform::new(2.5, Point::new(-10.0, 4.5));
        assert_eq!(t.to_css(), "translate(-10px, 4.5px) scale(2.5)");
    }
}
