//! The committed translate stays inside the pan limits after every operation.

use super::{run_frames, square_viewer};
use crate::{ImageViewer, Key, Modifiers, Point, PointerEvent, Rect, Size, WheelEvent};

fn assert_in_bounds(viewer: &ImageViewer, context: &str) {
    let t = viewer.transform();
    let range = viewer.config().scale_range();
    assert!(
        t.scale >= range.min && t.scale <= range.max,
        "{context}: scale {} out of range",
        t.scale
    );
    assert_eq!(
        viewer.geometry().constrain(t.translate, t.scale),
        t.translate,
        "{context}: translate escaped the pan limits"
    );
}

/// Small deterministic generator so the sequence is reproducible.
struct Lcg(u32);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.0 >> 8
    }

    fn unit(&mut self) -> f32 {
        (self.next() % 10_000) as f32 / 10_000.0
    }
}

#[test]
fn test_mixed_operations_respect_bounds() {
    let mut viewer = square_viewer();
    viewer.set_natural_size(Size::new(1600.0, 900.0));
    viewer.open();

    let mut rng = Lcg(7);
    let mut t = 0.0_f64;
    for step in 0..2_000 {
        t += 40.0;
        let x = rng.unit() * 400.0;
        let y = rng.unit() * 400.0;
        match rng.next() % 11 {
            0 => {
                viewer.wheel(&WheelEvent {
                    position: Point::new(x, y),
                    delta_y: (rng.unit() - 0.5) * 800.0,
                    modifiers: Modifiers::default(),
                });
            }
            1 => {
                viewer.pointer_down(&PointerEvent::new(1, x, y, t));
            }
            2 => {
                viewer.pointer_move(&PointerEvent::new(1, x, y, t));
            }
            3 => {
                viewer.pointer_up(&PointerEvent::new(1, x, y, t));
            }
            4 => {
                viewer.pointer_down(&PointerEvent::new(2, x, y, t));
            }
            5 => {
                viewer.pointer_move(&PointerEvent::new(2, x, y, t));
            }
            6 => {
                viewer.pointer_up(&PointerEvent::new(2, x, y, t));
            }
            7 => viewer.set_slider_position(rng.unit() * 100.0),
            8 => {
                let key = ['+', '-', '0', '='][(rng.next() % 4) as usize];
                viewer.key_down(Key::Char(key));
            }
            9 => viewer.zoom_max(),
            _ => {
                viewer.on_frame();
            }
        }
        assert_in_bounds(&viewer, &format!("step {step}"));
    }

    run_frames(&mut viewer);
    assert_in_bounds(&viewer, "after settling");
}

#[test]
fn test_window_resize_reclamps_translate() {
    let mut viewer = square_viewer();
    viewer.open();
    viewer.set_scale(4.0);
    viewer.pointer_down(&PointerEvent::new(1, 200.0, 200.0, 0.0));
    viewer.pointer_move(&PointerEvent::new(1, 900.0, 900.0, 500.0));
    viewer.pointer_up(&PointerEvent::new(1, 900.0, 900.0, 2000.0));
    assert_eq!(viewer.transform().translate, Point::new(600.0, 600.0));

    // Narrower window: the fitted image shrinks and both limits tighten
    viewer.set_window_rect(Rect::new(0.0, 0.0, 200.0, 400.0));
    assert_in_bounds(&viewer, "after resize");
    assert_eq!(viewer.transform().translate, Point::new(300.0, 200.0));
}

#[test]
fn test_hi_res_swap_with_new_aspect_reclamps() {
    let mut viewer = ImageViewer::new(
        crate::ImageSources::new("small.jpg").with_hi_res("large.jpg"),
        crate::ViewerConfig::default(),
    )
    .expect("default config is valid");
    viewer.set_window_rect(Rect::new(0.0, 0.0, 400.0, 400.0));
    viewer.set_natural_size(Size::new(400.0, 400.0));
    viewer.open();
    viewer.set_scale(2.0);
    viewer.pointer_down(&PointerEvent::new(1, 200.0, 200.0, 0.0));
    viewer.pointer_move(&PointerEvent::new(1, 200.0, 600.0, 500.0));
    viewer.pointer_up(&PointerEvent::new(1, 200.0, 600.0, 2000.0));
    assert_eq!(viewer.transform().translate.y, 200.0);

    viewer.take_preload_request();
    // Wide image: fitted height halves, so at 2x it no longer overflows vertically
    viewer.preload_finished(Ok(Size::new(2000.0, 1000.0)));
    run_frames(&mut viewer);
    assert_eq!(viewer.transform().translate.y, 0.0);
    assert_in_bounds(&viewer, "after swap");
}
