//! Post-release inertia for pan gestures.
//!
//! Each frame advances the translate by the current velocity, re-clamps it,
//! damps any axis that hit an edge, then applies friction. Friction is a
//! fixed ratio below one, so any finite velocity falls under the stop
//! threshold after a bounded number of frames.

use crate::bounds::ImageGeometry;
use crate::config::ViewerConfig;
use crate::geometry::Point;
use crate::transform::TransformState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MomentumPhase {
    #[default]
    Idle,
    Running,
}

/// Outcome of one animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MomentumStep {
    /// Driver was idle; nothing happened
    Idle,
    /// Translate moved and another frame is needed
    Continue,
    /// Translate moved and the driver went idle
    Finished,
}

#[derive(Debug, Clone)]
pub struct MomentumDriver {
    phase: MomentumPhase,
    velocity: Point,
    start_velocity: f32,
    stop_velocity: f32,
    friction: f32,
    edge_damping: f32,
    frame_interval_ms: f32,
    velocity_gain: f32,
}

impl MomentumDriver {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            phase: MomentumPhase::Idle,
            velocity: Point::ZERO,
            start_velocity: config.momentum_start_velocity,
            stop_velocity: config.momentum_stop_velocity,
            friction: config.friction,
            edge_damping: config.edge_damping,
            frame_interval_ms: config.frame_interval_ms,
            velocity_gain: config.velocity_gain,
        }
    }

    pub fn phase(&self) -> MomentumPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == MomentumPhase::Running
    }

    pub fn velocity(&self) -> Point {
        self.velocity
    }

    /// Start coasting with `velocity` (px/ms). Returns whether it is running.
    ///
    /// Velocities at or below the start threshold leave the driver idle.
    pub fn start(&mut self, velocity: Point) -> bool {
        if velocity.x.is_finite() && velocity.y.is_finite() && velocity.length() > self.start_velocity {
            self.phase = MomentumPhase::Running;
            self.velocity = velocity;
            log::debug!("Momentum started at {:?} px/ms", velocity);
        } else {
            self.cancel();
        }
        self.is_running()
    }

    /// Stop immediately and discard the remaining velocity.
    pub fn cancel(&mut self) {
        self.phase = MomentumPhase::Idle;
        self.velocity = Point::ZERO;
    }

    /// Advance one frame.
    pub fn step(&mut self, transform: &mut TransformState, geometry: &ImageGeometry) -> MomentumStep {
        if !self.is_running() {
            return MomentumStep::Idle;
        }

        let delta = self.velocity * (self.frame_interval_ms * self.velocity_gain);
        let candidate = transform.translate() + delta;
        let limited = transform.translate_by(delta, geometry).translate;

        if limited.x != candidate.x {
            self.velocity.x *= self.edge_damping;
        }
        if limited.y != candidate.y {
            self.velocity.y *= self.edge_damping;
        }

        self.velocity = self.velocity * self.friction;

        if self.velocity.length() < self.stop_velocity {
            self.cancel();
            return MomentumStep::Finished;
        }
        MomentumStep::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn rig() -> (MomentumDriver, TransformState, ImageGeometry) {
        let config = ViewerConfig::default();
        let geometry = ImageGeometry::new(Size::new(400.0, 400.0), Size::new(400.0, 400.0));
        let mut transform = TransformState::new(&config);
        transform.set_scale(20.0, &geometry);
        (MomentumDriver::new(&config), transform, geometry)
    }

    fn run_to_idle(
        driver: &mut MomentumDriver,
        transform: &mut TransformState,
        geometry: &ImageGeometry,
    ) -> usize {
        let mut frames = 0;
        while driver.step(transform, geometry) == MomentumStep::Continue {
            frames += 1;
            assert!(frames < 10_000, "momentum did not terminate");
        }
        frames + 1
    }

    #[test]
    fn test_below_threshold_does_not_start() {
        let (mut driver, _, _) = rig();
        assert!(!driver.start(Point::new(0.001, 0.001)));
        assert_eq!(driver.phase(), MomentumPhase::Idle);
        assert_eq!(driver.velocity(), Point::ZERO);
    }

    #[test]
    fn test_first_frame_moves_by_gain() {
        let (mut driver, mut transform, geometry) = rig();
        driver.start(Point::new(0.5, 0.0));
        assert_eq!(driver.step(&mut transform, &geometry), MomentumStep::Continue);

        // 0.5 px/ms * 16 ms * 20 gain
        assert_eq!(transform.translate(), Point::new(160.0, 0.0));
        assert!((driver.velocity().x - 0.475).abs() < 1e-6);
    }

    #[test]
    fn test_momentum_terminates_for_large_velocity() {
        let (mut driver, mut transform, geometry) = rig();
        driver.start(Point::new(1.0e6, -3.0e5));
        let frames = run_to_idle(&mut driver, &mut transform, &geometry);
        assert!(frames > 1);
        assert_eq!(driver.phase(), MomentumPhase::Idle);
        assert_eq!(driver.velocity(), Point::ZERO);
    }

    #[test]
    fn test_momentum_never_leaves_bounds() {
        let (mut driver, mut transform, geometry) = rig();
        driver.start(Point::new(3.0, 2.0));
        loop {
            let step = driver.step(&mut transform, &geometry);
            let t = transform.current();
            assert_eq!(geometry.constrain(t.translate, t.scale), t.translate);
            if step != MomentumStep::Continue {
                break;
            }
        }
    }

    #[test]
    fn test_edge_hit_damps_only_that_axis() {
        let (mut driver, mut transform, geometry) = rig();
        // Park at the right edge
        transform.translate_by(Point::new(1.0e6, 0.0), &geometry);
        driver.start(Point::new(0.5, 0.1));
        driver.step(&mut transform, &geometry);

        let v = driver.velocity();
        assert!((v.x - 0.5 * 0.6 * 0.95).abs() < 1e-6);
        assert!((v.y - 0.1 * 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_cancel_discards_velocity() {
        let (mut driver, mut transform, geometry) = rig();
        driver.start(Point::new(1.0, 1.0));
        driver.cancel();
        assert_eq!(driver.phase(), MomentumPhase::Idle);
        assert_eq!(driver.velocity(), Point::ZERO);

        let before = transform.translate();
        assert_eq!(driver.step(&mut transform, &geometry), MomentumStep::Idle);
        assert_eq!(transform.translate(), before);
    }
}
