//! Pan limits for a scaled, centered image.
//!
//! The rendered image is first fit into the container (letterboxed or
//! pillarboxed), then scaled about the container center. A translate is legal
//! while no empty space would show past the image's edge on an axis where the
//! image is larger than the container.

use serde::{Deserialize, Serialize};

use crate::geometry::{clamp, Point, Size};

/// Image and container dimensions needed to compute pan limits.
///
/// Built fresh whenever limits are needed so a resize is picked up immediately.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageGeometry {
    /// Intrinsic size of the loaded media
    pub natural: Size,
    /// Size of the viewer frame
    pub container: Size,
}

impl ImageGeometry {
    pub fn new(natural: Size, container: Size) -> Self {
        Self { natural, container }
    }

    /// Geometry with nothing known yet. Constraining against it is a no-op.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// True once both the image and the container have real dimensions.
    pub fn is_known(&self) -> bool {
        self.natural.is_positive() && self.container.is_positive()
    }

    /// Largest rectangle with the image's aspect ratio that fits the container.
    pub fn fit_size(&self) -> Option<Size> {
        if !self.is_known() {
            return None;
        }
        let image_aspect = self.natural.aspect();
        let container_aspect = self.container.aspect();
        let size = if image_aspect > container_aspect {
            // Wider than the container: full width, letterboxed
            Size::new(self.container.width, self.container.width / image_aspect)
        } else {
            Size::new(self.container.height * image_aspect, self.container.height)
        };
        Some(size)
    }

    /// Maximum absolute translate per axis at `scale`.
    ///
    /// Returns `None` when geometry is unknown, meaning "unbounded".
    pub fn max_offset(&self, scale: f32) -> Option<Point> {
        let fit = self.fit_size()?;
        if scale <= 1.0 {
            // The fitted image never exceeds the container at or below 1x
            return Some(Point::ZERO);
        }
        let scaled = fit.scaled(scale);
        Some(Point::new(
            ((scaled.width - self.container.width) / 2.0).max(0.0),
            ((scaled.height - self.container.height) / 2.0).max(0.0),
        ))
    }

    /// Clamp a candidate translate so the image at `scale` covers its bounds.
    pub fn constrain(&self, translate: Point, scale: f32) -> Point {
        match self.max_offset(scale) {
            Some(max) => Point::new(
                clamp(translate.x, -max.x, max.x),
                clamp(translate.y, -max.y, max.y),
            ),
            None => translate,
        }
    }
}
