//! Global constants for the folio site

/// Window rectangle the headless demo lays the overlay out in
pub const DEMO_WINDOW_SIZE: (f32, f32) = (960.0, 720.0);

/// Page viewport used to seed the overlay from a preview pinch
pub const DEMO_VIEWPORT_SIZE: (f32, f32) = (1280.0, 800.0);

/// Natural size assumed for a remote hero until a local copy is probed
pub const DEFAULT_HERO_SIZE: (f32, f32) = (1200.0, 3600.0);

/// Preview frame scroll height and client height in the demo
pub const DEMO_PREVIEW_METRICS: (f32, f32) = (3600.0, 720.0);

/// Simulated time between two scripted input events
pub const DEMO_INPUT_INTERVAL_MS: f64 = 8.0;

/// Simulated animation frame length
pub const DEMO_FRAME_MS: f64 = 16.0;

/// Upper bound on frames run while settling a session
pub const MAX_SETTLE_FRAMES: usize = 2_000;

/// How long the native binary waits for the high-resolution probe
pub const PRELOAD_TIMEOUT_MS: u64 = 2_000;
