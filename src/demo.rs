//! Scripted viewer sessions.
//!
//! A [`Session`] plays a list of [`Step`]s into an [`ImageViewer`] and records
//! every committed frame. Tests run on a simulated clock; the native binary can
//! also replay in real time, stamping events from a [`MonotonicClock`].

use std::time::Duration;

use folio_viewer::{
    DocumentListeners, FrameOutput, ImageViewer, Key, Modifiers, MonotonicClock, Point,
    PointerEvent, PointerId, Rect, ScrollMetrics, Size, ViewerState, WheelEvent,
};

use crate::constants::{
    DEMO_FRAME_MS, DEMO_INPUT_INTERVAL_MS, DEMO_PREVIEW_METRICS, DEMO_VIEWPORT_SIZE,
    DEMO_WINDOW_SIZE, MAX_SETTLE_FRAMES,
};

/// One scripted input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Open,
    Close,
    Wheel { x: f32, y: f32, delta_y: f32 },
    Down { id: PointerId, x: f32, y: f32 },
    Move { id: PointerId, x: f32, y: f32 },
    Up { id: PointerId, x: f32, y: f32 },
    PreviewDown { id: PointerId, x: f32, y: f32 },
    PreviewMove { id: PointerId, x: f32, y: f32 },
    PreviewUp { id: PointerId, x: f32, y: f32 },
    Key(Key),
    /// Preview frame scrolled to this `scroll_top`
    Scroll(f32),
    /// Run up to this many animation frames
    Frames(u32),
    /// Let simulated time pass without input
    Pause(f64),
}

/// What a finished session committed.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub frames: usize,
    pub surface_writes: usize,
    pub source_swaps: Vec<String>,
    pub scroll_percents: Vec<u8>,
    pub final_state: ViewerState,
}

/// Time source for event timestamps.
#[derive(Debug, Clone, Copy)]
enum SessionClock {
    /// Advances only when the script says so
    Simulated(f64),
    /// Wall clock; advancing sleeps
    Realtime(MonotonicClock),
}

impl SessionClock {
    fn now_ms(&self) -> f64 {
        match self {
            SessionClock::Simulated(now) => *now,
            SessionClock::Realtime(clock) => clock.now_ms(),
        }
    }

    fn advance(&mut self, ms: f64) {
        match self {
            SessionClock::Simulated(now) => *now += ms,
            SessionClock::Realtime(_) => std::thread::sleep(Duration::from_secs_f64(ms / 1000.0)),
        }
    }
}

pub struct Session<L: DocumentListeners> {
    viewer: ImageViewer<L>,
    clock: SessionClock,
    outputs: Vec<FrameOutput>,
}

impl<L: DocumentListeners> Session<L> {
    /// Lay the viewer out in the demo window and attach the preview frame.
    pub fn new(viewer: ImageViewer<L>) -> Self {
        Self::with_clock(viewer, SessionClock::Simulated(0.0))
    }

    /// Like [`Session::new`], but paced and stamped by the wall clock.
    pub fn realtime(viewer: ImageViewer<L>) -> Self {
        Self::with_clock(viewer, SessionClock::Realtime(MonotonicClock::new()))
    }

    fn with_clock(mut viewer: ImageViewer<L>, clock: SessionClock) -> Self {
        let (width, height) = DEMO_WINDOW_SIZE;
        viewer.set_window_rect(Rect::new(0.0, 0.0, width, height));
        let (vw, vh) = DEMO_VIEWPORT_SIZE;
        viewer.set_viewport(Size::new(vw, vh));
        viewer.attach_preview(preview_metrics(0.0));
        Self {
            viewer,
            clock,
            outputs: Vec::new(),
        }
    }

    /// Current session time in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    pub fn viewer(&self) -> &ImageViewer<L> {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut ImageViewer<L> {
        &mut self.viewer
    }

    pub fn play(&mut self, steps: &[Step]) {
        for step in steps {
            self.apply(*step);
        }
    }

    fn apply(&mut self, step: Step) {
        log::trace!("t={:.0}ms {:?}", self.now_ms(), step);
        match step {
            Step::Open => self.viewer.open(),
            Step::Close => self.viewer.close(),
            Step::Wheel { x, y, delta_y } => {
                self.viewer.wheel(&WheelEvent {
                    position: Point::new(x, y),
                    delta_y,
                    modifiers: Modifiers::default(),
                });
            }
            Step::Down { id, x, y } => {
                self.viewer.pointer_down(&self.event(id, x, y));
            }
            Step::Move { id, x, y } => {
                self.viewer.pointer_move(&self.event(id, x, y));
            }
            Step::Up { id, x, y } => {
                self.viewer.pointer_up(&self.event(id, x, y));
            }
            Step::PreviewDown { id, x, y } => {
                self.viewer.preview_pointer_down(&self.event(id, x, y));
            }
            Step::PreviewMove { id, x, y } => {
                self.viewer.preview_pointer_move(&self.event(id, x, y));
            }
            Step::PreviewUp { id, x, y } => {
                self.viewer.preview_pointer_up(&self.event(id, x, y));
            }
            Step::Key(key) => {
                self.viewer.key_down(key);
            }
            Step::Scroll(top) => self.viewer.preview_scrolled(preview_metrics(top)),
            Step::Frames(count) => {
                for _ in 0..count {
                    if !self.frame() {
                        break;
                    }
                }
                return;
            }
            Step::Pause(ms) => {
                self.clock.advance(ms);
                return;
            }
        }
        self.clock.advance(DEMO_INPUT_INTERVAL_MS);
    }

    fn event(&self, id: PointerId, x: f32, y: f32) -> PointerEvent {
        PointerEvent::new(id, x, y, self.now_ms())
    }

    /// Run one frame if one is wanted. Returns whether it ran.
    fn frame(&mut self) -> bool {
        if !self.viewer.needs_frame() {
            return false;
        }
        self.clock.advance(DEMO_FRAME_MS);
        let out = self.viewer.on_frame();
        if let Some(t) = out.transform {
            log::debug!("frame {}: {}", self.outputs.len(), t.to_css());
        }
        if let Some(display) = out.display {
            log::debug!(
                "frame {}: zoom {}% slider {:.1}",
                self.outputs.len(),
                display.zoom_percent,
                display.slider_position
            );
        }
        if let Some(url) = &out.source {
            log::info!("Overlay now showing {}", url);
        }
        self.outputs.push(out);
        true
    }

    /// Run frames until nothing is scheduled.
    pub fn settle(&mut self) {
        for _ in 0..MAX_SETTLE_FRAMES {
            if !self.frame() {
                return;
            }
        }
        log::warn!("Session still animating after {} frames", MAX_SETTLE_FRAMES);
    }

    pub fn outputs(&self) -> &[FrameOutput] {
        &self.outputs
    }

    pub fn finish(mut self) -> SessionReport {
        self.settle();
        self.viewer.teardown();
        SessionReport {
            frames: self.outputs.len(),
            surface_writes: self.outputs.iter().filter(|o| o.transform.is_some()).count(),
            source_swaps: self.outputs.iter().filter_map(|o| o.source.clone()).collect(),
            scroll_percents: self
                .outputs
                .iter()
                .filter_map(|o| o.scroll_percent)
                .collect(),
            final_state: self.viewer.state(),
        }
    }
}

fn preview_metrics(scroll_top: f32) -> ScrollMetrics {
    let (scroll_height, client_height) = DEMO_PREVIEW_METRICS;
    ScrollMetrics::new(scroll_top, scroll_height, client_height)
}

/// The session the native binary replays.
pub fn demo_script() -> Vec<Step> {
    let (width, height) = DEMO_WINDOW_SIZE;
    let (cx, cy) = (width / 2.0, height / 2.0);
    let mut steps = vec![
        // Read down the preview first
        Step::Scroll(700.0),
        Step::Scroll(1400.0),
        Step::Frames(1),
        Step::Scroll(2880.0),
        Step::Frames(1),
        Step::Open,
        // Wheel in towards the upper left
        Step::Wheel { x: cx - 200.0, y: cy - 150.0, delta_y: -240.0 },
        Step::Wheel { x: cx - 200.0, y: cy - 150.0, delta_y: -240.0 },
        Step::Frames(1),
        // Fast drag right, released mid-motion
        Step::Down { id: 1, x: cx, y: cy },
    ];
    for i in 1..=6 {
        steps.push(Step::Move { id: 1, x: cx + 30.0 * i as f32, y: cy + 5.0 * i as f32 });
    }
    steps.extend([
        Step::Up { id: 1, x: cx + 180.0, y: cy + 30.0 },
        Step::Frames(200),
        // Two-finger pinch out around the center
        Step::Down { id: 2, x: cx - 50.0, y: cy },
        Step::Down { id: 3, x: cx + 50.0, y: cy },
        Step::Move { id: 2, x: cx - 90.0, y: cy },
        Step::Move { id: 3, x: cx + 90.0, y: cy },
        Step::Frames(1),
        Step::Up { id: 3, x: cx + 90.0, y: cy },
        Step::Up { id: 2, x: cx - 90.0, y: cy },
        Step::Frames(1),
        Step::Pause(500.0),
        // Double tap resets the zoom
        Step::Down { id: 4, x: cx, y: cy },
        Step::Up { id: 4, x: cx, y: cy },
        Step::Down { id: 4, x: cx, y: cy },
        Step::Up { id: 4, x: cx, y: cy },
        Step::Frames(1),
        Step::Key(Key::Char('+')),
        Step::Key(Key::Char('+')),
        Step::Frames(1),
        Step::Key(Key::Escape),
    ]);
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_viewer::{DetachedListeners, ImageSources, ViewerConfig};

    fn session() -> Session<DetachedListeners> {
        let mut viewer = ImageViewer::new(ImageSources::new("hero.jpg"), ViewerConfig::default())
            .expect("default config is valid");
        viewer.set_natural_size(Size::new(1200.0, 3600.0));
        Session::new(viewer)
    }

    #[test]
    fn test_demo_script_ends_closed_and_reset() {
        let mut session = session();
        session.play(&demo_script());
        let report = session.finish();

        assert!(!report.final_state.is_open);
        assert_eq!(report.final_state.scale, 1.0);
        assert_eq!(report.final_state.translate, Point::ZERO);
        assert!(report.surface_writes > 3);
        assert_eq!(report.scroll_percents, vec![49, 100]);
    }

    #[test]
    fn test_wheel_then_fling_moves_image() {
        let mut session = session();
        let (cx, cy) = (DEMO_WINDOW_SIZE.0 / 2.0, DEMO_WINDOW_SIZE.1 / 2.0);
        session.play(&[
            Step::Open,
            Step::Wheel { x: cx, y: cy, delta_y: -600.0 },
            Step::Frames(1),
            Step::Down { id: 1, x: cx, y: cy },
            Step::Move { id: 1, x: cx + 40.0, y: cy },
            Step::Up { id: 1, x: cx + 40.0, y: cy },
        ]);
        assert!(session.viewer().is_momentum_running());
        let drag_end = session.viewer().transform().translate.x;

        session.settle();
        assert!(!session.viewer().is_momentum_running());
        assert!(session.viewer().transform().translate.x > drag_end);
    }

    #[test]
    fn test_realtime_session_stamps_from_wall_clock() {
        let mut viewer = ImageViewer::new(ImageSources::new("hero.jpg"), ViewerConfig::default())
            .expect("default config is valid");
        viewer.set_natural_size(Size::new(1200.0, 3600.0));
        let mut session = Session::realtime(viewer);

        let start = session.now_ms();
        session.play(&[Step::Pause(20.0), Step::Open]);
        // Pause sleeps 20ms and Open another input interval
        assert!(session.now_ms() - start >= 20.0 + DEMO_INPUT_INTERVAL_MS);
        assert!(session.viewer().is_open());
    }

    #[test]
    fn test_simulated_clock_counts_script_time() {
        let mut session = session();
        session.play(&[Step::Pause(500.0), Step::Open, Step::Frames(1)]);
        assert_eq!(session.now_ms(), 500.0 + DEMO_INPUT_INTERVAL_MS + DEMO_FRAME_MS);
    }

    #[test]
    fn test_preview_pinch_opens_overlay() {
        let mut session = session();
        session.play(&[
            Step::PreviewDown { id: 1, x: 600.0, y: 400.0 },
            Step::PreviewDown { id: 2, x: 700.0, y: 400.0 },
            Step::PreviewMove { id: 2, x: 760.0, y: 400.0 },
        ]);
        assert!(session.viewer().is_open());
        assert!(session.viewer().transform().scale > 1.0);
    }
}
