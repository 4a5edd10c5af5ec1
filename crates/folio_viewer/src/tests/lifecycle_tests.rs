//! Open/close cycles and the document listeners scoped to them.

use super::run_frames;
use crate::overlay::tests::CountingListeners;
use crate::{
    ImageSources, ImageViewer, Key, Point, PointerEvent, Rect, Size, ViewTransform, ViewerConfig,
};

fn counted_viewer(listeners: CountingListeners) -> ImageViewer<CountingListeners> {
    let mut viewer =
        ImageViewer::with_listeners(ImageSources::new("photo.jpg"), ViewerConfig::default(), listeners)
            .expect("default config is valid");
    viewer.set_window_rect(Rect::new(0.0, 0.0, 400.0, 400.0));
    viewer.set_natural_size(Size::new(400.0, 400.0));
    viewer
}

/// Pan fast enough to leave momentum running.
fn fling(viewer: &mut ImageViewer<CountingListeners>, t: f64) {
    viewer.set_scale(8.0);
    viewer.pointer_down(&PointerEvent::new(1, 200.0, 200.0, t));
    viewer.pointer_move(&PointerEvent::new(1, 260.0, 220.0, t + 16.0));
    viewer.pointer_up(&PointerEvent::new(1, 260.0, 220.0, t + 17.0));
}

#[test]
fn test_rapid_open_close_pairs_listeners() {
    let listeners = CountingListeners::default();
    let (installs, removes) = (listeners.installs.clone(), listeners.removes.clone());
    let mut viewer = counted_viewer(listeners);

    for i in 0..50 {
        viewer.open();
        fling(&mut viewer, i as f64 * 1000.0);
        assert!(viewer.is_momentum_running());
        viewer.close();
        assert!(!viewer.is_momentum_running());
    }
    assert_eq!(installs.get(), 50);
    assert_eq!(removes.get(), 50);

    // Only the reset commit is left; no stale momentum frames
    let frames = run_frames(&mut viewer);
    assert_eq!(frames.len(), 1);
    assert_eq!(viewer.transform(), ViewTransform::new(1.0, Point::ZERO));
}

#[test]
fn test_drop_while_open_removes_listeners() {
    let listeners = CountingListeners::default();
    let removes = listeners.removes.clone();
    {
        let mut viewer = counted_viewer(listeners);
        viewer.open();
        fling(&mut viewer, 0.0);
    }
    assert_eq!(removes.get(), 1);
}

#[test]
fn test_escape_only_handled_while_open() {
    let mut viewer = counted_viewer(CountingListeners::default());
    assert!(!viewer.key_down(Key::Escape));

    viewer.open();
    assert!(viewer.key_down(Key::Escape));
    assert!(!viewer.is_open());
    assert!(!viewer.key_down(Key::Escape));
}

#[test]
fn test_close_mid_gesture_drops_contacts() {
    let mut viewer = counted_viewer(CountingListeners::default());
    viewer.open();
    viewer.set_scale(4.0);
    viewer.pointer_down(&PointerEvent::new(1, 200.0, 200.0, 0.0));
    viewer.pointer_move(&PointerEvent::new(1, 300.0, 200.0, 10.0));
    assert!(viewer.state().is_panning);

    viewer.close();
    assert!(!viewer.state().is_panning);
    // The lifted finger belongs to a closed session
    assert!(!viewer.pointer_up(&PointerEvent::new(1, 300.0, 200.0, 11.0)));
    assert!(!viewer.is_momentum_running());
}

#[test]
fn test_minimize_resets_regardless_of_close_policy() {
    let config = ViewerConfig {
        reset_on_close: false,
        ..Default::default()
    };
    let mut viewer =
        ImageViewer::with_listeners(ImageSources::new("photo.jpg"), config, CountingListeners::default())
            .expect("valid config");
    viewer.set_window_rect(Rect::new(0.0, 0.0, 400.0, 400.0));
    viewer.set_natural_size(Size::new(400.0, 400.0));

    viewer.open();
    viewer.zoom_max();
    assert!((viewer.transform().scale - 1.5).abs() < 1e-6);
    viewer.close();
    assert!((viewer.transform().scale - 1.5).abs() < 1e-6);

    // Reopening resumes the kept zoom
    viewer.open();
    assert!((viewer.transform().scale - 1.5).abs() < 1e-6);
    viewer.zoom_in();
    viewer.minimize();
    assert_eq!(viewer.transform(), ViewTransform::new(1.0, Point::ZERO));

    // After a minimize the next open starts fitted
    viewer.open();
    assert_eq!(viewer.transform(), ViewTransform::new(1.0, Point::ZERO));
}

#[test]
fn test_resumed_open_stays_inside_new_window() {
    let config = ViewerConfig {
        reset_on_close: false,
        ..Default::default()
    };
    let mut viewer = ImageViewer::new(ImageSources::new("photo.jpg"), config).expect("valid config");
    viewer.set_window_rect(Rect::new(0.0, 0.0, 400.0, 400.0));
    viewer.set_natural_size(Size::new(400.0, 400.0));

    viewer.open();
    viewer.set_scale(3.0);
    viewer.pointer_down(&PointerEvent::new(1, 200.0, 200.0, 0.0));
    viewer.pointer_move(&PointerEvent::new(1, 600.0, 600.0, 500.0));
    viewer.pointer_up(&PointerEvent::new(1, 600.0, 600.0, 2000.0));
    assert_eq!(viewer.transform().translate, Point::new(400.0, 400.0));
    viewer.close();

    // Smaller window: the image fits at 200px, so the slack is (600 - 200) / 2
    viewer.set_window_rect(Rect::new(0.0, 0.0, 200.0, 200.0));
    viewer.open();
    assert_eq!(viewer.transform().scale, 3.0);
    assert_eq!(viewer.transform().translate, Point::new(200.0, 200.0));
}

#[test]
fn test_failed_listener_install_still_opens() {
    let listeners = CountingListeners {
        fail: true,
        ..Default::default()
    };
    let removes = listeners.removes.clone();
    let mut viewer = counted_viewer(listeners);
    viewer.open();
    assert!(viewer.is_open());
    assert!(viewer.blocks_touch(2));
    viewer.close();
    assert_eq!(removes.get(), 0);
}
