//! Per-frame batching of surface writes, readouts and reports.

use super::{run_frames, square_viewer};
use crate::{
    ImageSources, ImageViewer, Modifiers, Point, PointerEvent, ScrollMetrics, ViewerConfig,
    WheelEvent,
};

fn wheel(y: f32) -> WheelEvent {
    WheelEvent {
        position: Point::new(200.0, 200.0),
        delta_y: y,
        modifiers: Modifiers::default(),
    }
}

#[test]
fn test_wheel_burst_commits_once_with_final_value() {
    let mut viewer = square_viewer();
    viewer.open();
    run_frames(&mut viewer);

    for _ in 0..10 {
        viewer.wheel(&wheel(-30.0));
    }
    let frames = run_frames(&mut viewer);
    assert_eq!(frames.len(), 1);

    // Ten steps of exp(0.1) compose to e
    let written = frames[0].transform.expect("transform written");
    assert!((written.scale - std::f32::consts::E).abs() < 1e-3);
    assert_eq!(frames[0].display.map(|d| d.zoom_percent), Some(272));
}

#[test]
fn test_pan_frame_skips_unchanged_readouts() {
    let mut viewer = square_viewer();
    viewer.open();
    viewer.set_scale(4.0);
    run_frames(&mut viewer);

    viewer.pointer_down(&PointerEvent::new(1, 200.0, 200.0, 0.0));
    viewer.pointer_move(&PointerEvent::new(1, 240.0, 200.0, 100.0));
    let out = viewer.on_frame();
    assert_eq!(out.transform.map(|t| t.translate), Some(Point::new(40.0, 0.0)));
    assert_eq!(out.display, None);
}

#[test]
fn test_momentum_writes_every_frame_until_idle() {
    let mut viewer = square_viewer();
    viewer.open();
    viewer.set_scale(30.0);
    run_frames(&mut viewer);

    viewer.pointer_down(&PointerEvent::new(1, 200.0, 200.0, 0.0));
    viewer.pointer_move(&PointerEvent::new(1, 205.0, 200.0, 16.0));
    viewer.pointer_up(&PointerEvent::new(1, 205.0, 200.0, 17.0));
    assert!(viewer.is_momentum_running());

    let frames = run_frames(&mut viewer);
    assert!(frames.len() > 10);
    let moving = frames.iter().filter(|f| f.transform.is_some()).count();
    assert_eq!(moving, frames.len());
    assert!(!viewer.needs_frame());
    assert_eq!(viewer.state().velocity, Point::ZERO);
}

#[test]
fn test_closed_viewer_has_nothing_scheduled() {
    let mut viewer = square_viewer();
    run_frames(&mut viewer);
    viewer.wheel(&wheel(-300.0));
    viewer.pointer_down(&PointerEvent::new(1, 10.0, 10.0, 0.0));
    assert!(!viewer.needs_frame());
}

#[test]
fn test_scroll_and_transform_share_a_frame() {
    let mut viewer = square_viewer();
    viewer.open();
    run_frames(&mut viewer);

    viewer.wheel(&wheel(-300.0));
    viewer.preview_scrolled(ScrollMetrics::new(250.0, 1000.0, 500.0));
    let out = viewer.on_frame();
    assert!(out.transform.is_some());
    assert_eq!(out.scroll_percent, Some(50));
    assert!(!viewer.needs_frame());
}

#[test]
fn test_failed_preload_never_swaps() {
    let mut viewer = ImageViewer::new(
        ImageSources::new("small.jpg").with_hi_res("missing.jpg"),
        ViewerConfig::default(),
    )
    .expect("default config is valid");
    let url = viewer.take_preload_request().expect("hi-res requested");
    viewer.preload_finished(Err(crate::ViewerError::Preload {
        url,
        message: "network error".to_string(),
    }));
    let frames = run_frames(&mut viewer);
    assert!(frames.iter().all(|f| f.source.is_none()));
    assert_eq!(viewer.current_source(), "small.jpg");
    assert_eq!(*viewer.hi_res_status(), crate::HiResStatus::Failed);
}
