//! The image viewer: preview pane, modal overlay and everything between.
//!
//! [`ImageViewer`] is host-agnostic. The host forwards input events, keeps the
//! window rectangle and image size current, and drives frames:
//!
//! ```
//! use folio_viewer::{ImageSources, ImageViewer, PointerEvent, Rect, Size, ViewerConfig};
//!
//! let mut viewer = ImageViewer::new(ImageSources::new("hero.jpg"), ViewerConfig::default()).unwrap();
//! viewer.set_window_rect(Rect::new(0.0, 0.0, 800.0, 600.0));
//! viewer.set_natural_size(Size::new(1600.0, 1200.0));
//! viewer.open();
//!
//! viewer.pointer_down(&PointerEvent::new(1, 400.0, 300.0, 0.0));
//! while viewer.needs_frame() {
//!     let out = viewer.on_frame();
//!     if let Some(t) = out.transform {
//!         // write t.to_css() to the overlay image
//!         let _ = t;
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::bounds::ImageGeometry;
use crate::config::ViewerConfig;
use crate::constants::SLIDER_MAX;
use crate::error::Result;
use crate::event::{Key, Modifiers, PointerEvent, WheelEvent};
use crate::frame::{DisplayState, FrameOutput, FrameRequests};
use crate::geometry::{clamp, Point, Rect, Size};
use crate::gesture::{GestureContext, GestureOutput, GestureRouter};
use crate::momentum::{MomentumDriver, MomentumStep};
use crate::overlay::{DetachedListeners, DocumentListeners, OverlayLifecycle};
use crate::preview::{OverlaySeed, PreviewOutput, PreviewRouter};
use crate::scroll::{ScrollMetrics, ScrollReporter};
use crate::source::{HiResStatus, ImageSources, PreloadResult, SourceState};
use crate::transform::{TransformState, ViewTransform};

/// Snapshot of the viewer's observable state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewerState {
    pub is_open: bool,
    pub scale: f32,
    pub translate: Point,
    pub is_panning: bool,
    /// Pan velocity while dragging, momentum velocity while coasting
    pub velocity: Point,
}

/// Scroll-percent callback.
pub type ScrollCallback = Box<dyn FnMut(u8)>;

pub struct ImageViewer<L: DocumentListeners = DetachedListeners> {
    config: ViewerConfig,
    lifecycle: OverlayLifecycle<L>,
    transform: TransformState,
    router: GestureRouter,
    preview: PreviewRouter,
    momentum: MomentumDriver,
    scroll: ScrollReporter,
    source: SourceState,
    requests: FrameRequests,
    /// Overlay window rectangle in client coordinates
    window: Rect,
    /// Page viewport, used to seed the overlay from a preview pinch
    viewport: Size,
    natural: Size,
    /// Last close kept the transform, so the next plain open resumes it
    resume_on_open: bool,
    /// Transform last handed to the host
    committed: Option<ViewTransform>,
    /// Readouts last handed to the host
    display: Option<DisplayState>,
    on_scroll_percent: Option<ScrollCallback>,
}

impl ImageViewer<DetachedListeners> {
    /// Viewer without document listeners.
    pub fn new(sources: ImageSources, config: ViewerConfig) -> Result<Self> {
        Self::with_listeners(sources, config, DetachedListeners)
    }
}

impl<L: DocumentListeners> ImageViewer<L> {
    pub fn with_listeners(sources: ImageSources, config: ViewerConfig, listeners: L) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            lifecycle: OverlayLifecycle::new(listeners),
            transform: TransformState::new(&config),
            router: GestureRouter::new(&config),
            preview: PreviewRouter::new(&config),
            momentum: MomentumDriver::new(&config),
            scroll: ScrollReporter::new(),
            source: SourceState::new(sources),
            requests: FrameRequests::default(),
            window: Rect::default(),
            viewport: Size::ZERO,
            natural: Size::ZERO,
            resume_on_open: false,
            committed: None,
            display: None,
            on_scroll_percent: None,
            config,
        })
    }

    /// Register the scroll-percent callback.
    pub fn on_scroll_percent<F>(mut self, f: F) -> Self
    where
        F: FnMut(u8) + 'static,
    {
        self.on_scroll_percent = Some(Box::new(f));
        self
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn listeners(&self) -> &L {
        self.lifecycle.listeners()
    }

    pub fn state(&self) -> ViewerState {
        let velocity = if self.momentum.is_running() {
            self.momentum.velocity()
        } else {
            self.router.velocity()
        };
        ViewerState {
            is_open: self.lifecycle.is_open(),
            scale: self.transform.scale(),
            translate: self.transform.translate(),
            is_panning: self.router.is_panning(),
            velocity,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform.current()
    }

    pub fn is_open(&self) -> bool {
        self.lifecycle.is_open()
    }

    pub fn is_momentum_running(&self) -> bool {
        self.momentum.is_running()
    }

    /// Geometry for the current image and window; rebuilt on every call.
    pub fn geometry(&self) -> ImageGeometry {
        ImageGeometry::new(self.natural, self.window.size)
    }

    pub fn sources(&self) -> &ImageSources {
        self.source.sources()
    }

    /// URL the overlay image should show right now.
    pub fn current_source(&self) -> &str {
        self.source.current()
    }

    pub fn hi_res_status(&self) -> &HiResStatus {
        self.source.status()
    }

    // -------------------------------------------------------------------------
    // Layout
    // -------------------------------------------------------------------------

    pub fn set_window_rect(&mut self, rect: Rect) {
        self.window = rect;
        self.reconstrain();
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Intrinsic size of the media currently shown in the overlay.
    pub fn set_natural_size(&mut self, size: Size) {
        self.natural = size;
        self.reconstrain();
    }

    fn reconstrain(&mut self) {
        let geometry = self.geometry();
        self.transform.reconstrain(&geometry);
        self.requests.request_commit();
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Open at the initial scale, centered, or where the last close left off
    /// when that close did not reset.
    pub fn open(&mut self) {
        let resume = self.resume_on_open;
        self.begin_open();
        if resume {
            let geometry = self.geometry();
            self.transform.reconstrain(&geometry);
        } else {
            self.transform.fit();
        }
        self.requests.request_commit();
    }

    /// Open with a transform seeded from a preview pinch.
    pub fn open_seeded(&mut self, seed: OverlaySeed) {
        self.begin_open();
        let geometry = self.geometry();
        self.transform.seed(seed.scale, seed.translate, &geometry);
        self.requests.request_commit();
    }

    fn begin_open(&mut self) {
        self.resume_on_open = false;
        // Anything still scheduled from the previous cycle must not land
        self.stop_gesture_work();
        self.preview.reset();
        self.lifecycle.open();
    }

    /// Close via Escape, backdrop or the close button.
    pub fn close(&mut self) {
        self.close_with_reset(self.config.reset_on_close);
    }

    /// Close and always return to the initial transform.
    pub fn minimize(&mut self) {
        self.close_with_reset(true);
    }

    fn close_with_reset(&mut self, reset: bool) {
        if !self.lifecycle.close() {
            return;
        }
        self.stop_gesture_work();
        if reset {
            self.transform.reset();
        }
        self.resume_on_open = !reset;
        self.requests.request_commit();
    }

    /// Release everything before the host drops the viewer.
    pub fn teardown(&mut self) {
        self.lifecycle.close();
        self.resume_on_open = false;
        self.stop_gesture_work();
        self.preview.reset();
        self.scroll.cancel();
        self.source.cancel_parked();
        self.requests.cancel_all();
    }

    fn stop_gesture_work(&mut self) {
        self.momentum.cancel();
        self.router.reset();
        self.requests.cancel_gesture_work();
    }

    // -------------------------------------------------------------------------
    // Overlay controls
    // -------------------------------------------------------------------------

    pub fn fit(&mut self) {
        self.momentum.cancel();
        self.transform.fit();
        self.requests.request_commit();
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(self.config.button_zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / self.config.button_zoom_step);
    }

    /// Title bar zoom button.
    pub fn zoom_max(&mut self) {
        self.zoom_by(self.config.zoom_max_step);
    }

    fn zoom_by(&mut self, factor: f32) {
        let geometry = self.geometry();
        self.transform.zoom_by(factor, &geometry);
        self.requests.request_commit();
    }

    /// Explicit scale, clamped to the configured range.
    pub fn set_scale(&mut self, scale: f32) {
        let geometry = self.geometry();
        self.transform.set_scale(scale, &geometry);
        self.requests.request_commit();
    }

    /// Slider input (0-100, logarithmic).
    pub fn set_slider_position(&mut self, position: f32) {
        let scale = self.transform.range().scale_at(position);
        self.set_scale(scale);
    }

    pub fn slider_position(&self) -> f32 {
        self.transform.range().slider_position(self.transform.scale())
    }

    /// The slider's own -/+ buttons; `steps` is usually -1 or 1.
    pub fn nudge_slider(&mut self, steps: f32) {
        let position = clamp(self.slider_position() + steps * self.config.slider_nudge, 0.0, SLIDER_MAX);
        self.set_slider_position(position);
    }

    /// Keyboard shortcuts while open. Returns whether the key was handled.
    pub fn key_down(&mut self, key: Key) -> bool {
        if !self.is_open() {
            return false;
        }
        match key {
            Key::Escape => self.close(),
            Key::Char('+') | Key::Char('=') => self.zoom_in(),
            Key::Char('-') => self.zoom_out(),
            Key::Char('0') => self.fit(),
            _ => return false,
        }
        true
    }

    /// Pointer-down on the backdrop outside the window.
    pub fn backdrop_pointer_down(&mut self) {
        self.close();
    }

    pub fn blocks_wheel(&self, modifiers: Modifiers) -> bool {
        self.lifecycle.blocks_wheel(modifiers)
    }

    pub fn blocks_touch(&self, touch_count: u32) -> bool {
        self.lifecycle.blocks_touch(touch_count)
    }

    // -------------------------------------------------------------------------
    // Overlay input
    // -------------------------------------------------------------------------

    /// Returns whether the event was consumed.
    pub fn pointer_down(&mut self, event: &PointerEvent) -> bool {
        if !self.is_open() {
            return false;
        }
        // A new contact takes over from any coasting or scheduled write
        self.momentum.cancel();
        self.requests.cancel_gesture_work();

        let ctx = GestureContext {
            transform: &mut self.transform,
            geometry: ImageGeometry::new(self.natural, self.window.size),
            frame: self.window,
        };
        self.router.pointer_down(event, ctx);
        self.requests.request_commit();
        true
    }

    pub fn pointer_move(&mut self, event: &PointerEvent) -> bool {
        if !self.is_open() {
            return false;
        }
        let ctx = GestureContext {
            transform: &mut self.transform,
            geometry: ImageGeometry::new(self.natural, self.window.size),
            frame: self.window,
        };
        match self.router.pointer_move(event, ctx) {
            GestureOutput::Transformed => {
                self.requests.request_commit();
                true
            }
            _ => false,
        }
    }

    /// Pointer-up or pointer-cancel.
    pub fn pointer_up(&mut self, event: &PointerEvent) -> bool {
        match self.router.pointer_up(event, &self.transform) {
            GestureOutput::Released { fling } => {
                if let Some(velocity) = fling {
                    if self.is_open() && self.momentum.start(velocity) {
                        self.requests.momentum = true;
                    }
                }
                self.requests.display = true;
                true
            }
            _ => false,
        }
    }

    /// Wheel over the overlay. Returns whether default handling must be prevented.
    pub fn wheel(&mut self, event: &WheelEvent) -> bool {
        if !self.is_open() {
            return false;
        }
        if self.router.active_pointers() == 0 {
            let geometry = self.geometry();
            let cursor = self.window.offset_from_center(event.position);
            self.transform.wheel_zoom(cursor, event.delta_y, &geometry);
            self.requests.request_commit();
        }
        true
    }

    // -------------------------------------------------------------------------
    // Preview input
    // -------------------------------------------------------------------------

    pub fn preview_pointer_down(&mut self, event: &PointerEvent) -> PreviewOutput {
        self.preview.pointer_down(event)
    }

    pub fn preview_pointer_move(&mut self, event: &PointerEvent) -> PreviewOutput {
        let output = self.preview.pointer_move(event, self.viewport);
        if let PreviewOutput::Open(seed) = output {
            if !self.is_open() {
                self.open_seeded(seed);
            }
        }
        output
    }

    pub fn preview_pointer_up(&mut self, event: &PointerEvent) {
        self.preview.pointer_up(event);
    }

    /// Preview frame mounted: its scroll position is reported right away.
    pub fn attach_preview(&mut self, metrics: ScrollMetrics) -> u8 {
        self.requests.scroll = false;
        let percent = self.scroll.report_now(metrics);
        if let Some(callback) = self.on_scroll_percent.as_mut() {
            callback(percent);
        }
        percent
    }

    /// Preview frame scrolled; reported on the next frame.
    pub fn preview_scrolled(&mut self, metrics: ScrollMetrics) {
        if self.scroll.on_scroll(metrics) {
            self.requests.scroll = true;
        }
    }

    // -------------------------------------------------------------------------
    // High-resolution source
    // -------------------------------------------------------------------------

    /// URL the host should start preloading, handed out once.
    pub fn take_preload_request(&mut self) -> Option<String> {
        self.source.take_preload_request()
    }

    /// Preload finished; applied on the next frame.
    pub fn preload_finished(&mut self, result: PreloadResult) {
        if self.source.park(result) {
            self.requests.source = true;
        }
    }

    // -------------------------------------------------------------------------
    // Frames
    // -------------------------------------------------------------------------

    /// True while anything is waiting for an animation frame.
    pub fn needs_frame(&self) -> bool {
        self.requests.any()
    }

    /// Run one animation frame and return what the host must commit.
    pub fn on_frame(&mut self) -> FrameOutput {
        let requests = self.requests.take();
        let mut out = FrameOutput::default();

        if requests.momentum && self.is_open() {
            let geometry = self.geometry();
            if self.momentum.step(&mut self.transform, &geometry) == MomentumStep::Continue {
                self.requests.momentum = true;
            }
        }

        if requests.source {
            if let Some((url, size)) = self.source.apply_parked() {
                self.natural = size;
                let geometry = self.geometry();
                self.transform.reconstrain(&geometry);
                out.source = Some(url);
            }
        }

        if requests.scroll {
            if let Some(percent) = self.scroll.flush() {
                if let Some(callback) = self.on_scroll_percent.as_mut() {
                    callback(percent);
                }
                out.scroll_percent = Some(percent);
            }
        }

        let current = self.transform.current();
        if self.committed != Some(current) {
            self.committed = Some(current);
            out.transform = Some(current);
        }

        let display =
            DisplayState::from_transform(self.is_open(), &current, &self.transform.range());
        if self.display != Some(display) {
            self.display = Some(display);
            out.display = Some(display);
        }

        out
    }
}
