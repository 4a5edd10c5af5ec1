//! Scenario tests driving [`crate::ImageViewer`] end to end.
//!
//! These replay input sequences the way a host would and check the state the
//! viewer hands back between frames.

mod bounds_tests;
mod frame_tests;
mod lifecycle_tests;

use crate::{FrameOutput, ImageSources, ImageViewer, Rect, Size, ViewerConfig};

/// Open-ready viewer over a 400x400 window showing a 400x400 image.
fn square_viewer() -> ImageViewer {
    let mut viewer = ImageViewer::new(ImageSources::new("photo.jpg"), ViewerConfig::default())
        .expect("default config is valid");
    viewer.set_window_rect(Rect::new(0.0, 0.0, 400.0, 400.0));
    viewer.set_natural_size(Size::new(400.0, 400.0));
    viewer.set_viewport(Size::new(1280.0, 800.0));
    viewer
}

/// Run frames until the viewer stops asking for them.
fn run_frames<L: crate::DocumentListeners>(viewer: &mut ImageViewer<L>) -> Vec<FrameOutput> {
    let mut frames = Vec::new();
    while viewer.needs_frame() {
        frames.push(viewer.on_frame());
        assert!(frames.len() < 10_000, "frames never settled");
    }
    frames
}
