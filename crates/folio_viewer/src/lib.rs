//! folio_viewer - A zoomable image viewer engine for touch, mouse and trackpad
//!
//! The crate holds no DOM or rendering code. A host feeds it pointer, wheel,
//! keyboard and scroll input, then commits the [`FrameOutput`] returned from
//! [`ImageViewer::on_frame`] once per animation frame.

mod bounds;
mod config;
pub mod constants;
mod error;
mod event;
mod frame;
mod geometry;
mod gesture;
mod momentum;
mod overlay;
mod preview;
mod scroll;
mod source;
mod transform;
mod viewer;

#[cfg(test)]
mod tests;

pub use bounds::ImageGeometry;
pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use event::{Key, Modifiers, PointerEvent, PointerId, WheelEvent};
pub use frame::{zoom_percent, DisplayState, FrameOutput, FrameRequests, MonotonicClock};
pub use geometry::{
    clamp, distance, scale_to_slider_position, slider_position_to_scale, Point, Rect, ScaleRange,
    Size,
};
pub use gesture::{GestureContext, GestureOutput, GestureRouter};
pub use momentum::{MomentumDriver, MomentumPhase, MomentumStep};
pub use overlay::{DetachedListeners, DocumentListeners, OverlayLifecycle, OverlayPhase};
pub use preview::{OverlaySeed, PreviewOutput, PreviewRouter};
pub use scroll::{ScrollMetrics, ScrollReporter};
pub use source::{HiResStatus, ImageSources, PreloadResult, SourceState};
pub use transform::{TransformState, ViewTransform};
pub use viewer::{ImageViewer, ScrollCallback, ViewerState};
