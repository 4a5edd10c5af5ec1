//! Browser binding for the image viewer.
//!
//! `FolioViewer` wires an [`ImageViewer`] to four page elements: the preview
//! frame, the overlay backdrop, the overlay window and the overlay image.
//! Input listeners feed the engine, one `requestAnimationFrame` callback at a
//! time drains it, and every listener is detached on `destroy` or drop.

use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

use folio_viewer::{
    DocumentListeners, FrameOutput, ImageSources, ImageViewer, Key, Modifiers, Point,
    PointerEvent as ContactEvent, PreviewOutput, Rect, ScrollMetrics, Size, ViewerError,
    WheelEvent as ZoomEvent,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Event, EventListenerOptions, EventTarget, HtmlElement,
    HtmlImageElement, KeyboardEvent, PointerEvent, TouchEvent, WheelEvent,
};

use crate::config::AppConfig;

type Shared = Rc<RefCell<Binding>>;
type WeakShared = Weak<RefCell<Binding>>;
type Handler = Closure<dyn FnMut(Event)>;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Trace) {
        web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
    }
    let config = AppConfig::load_or_init_local_storage();
    log::set_max_level(config.log_level.to_level_filter());
    log::info!("{} viewer ready", config.site_name);
}

// =============================================================================
// Listeners
// =============================================================================

/// One event listener, detachable with the options it was attached with.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    capture: bool,
    passive: bool,
    closure: Handler,
}

impl Listener {
    fn new<F>(target: &EventTarget, kind: &'static str, capture: bool, passive: bool, f: F) -> Self
    where
        F: FnMut(Event) + 'static,
    {
        Self {
            target: target.clone(),
            kind,
            capture,
            passive,
            closure: Closure::new(f),
        }
    }

    fn attach(&self) -> Result<(), JsValue> {
        let options = AddEventListenerOptions::new();
        options.set_capture(self.capture);
        options.set_passive(self.passive);
        self.target
            .add_event_listener_with_callback_and_add_event_listener_options(
                self.kind,
                self.closure.as_ref().unchecked_ref(),
                &options,
            )
    }

    fn detach(&self) {
        let options = EventListenerOptions::new();
        options.set_capture(self.capture);
        if let Err(e) = self
            .target
            .remove_event_listener_with_callback_and_event_listener_options(
                self.kind,
                self.closure.as_ref().unchecked_ref(),
                &options,
            )
        {
            log::warn!("Failed to remove {} listener: {:?}", self.kind, e);
        }
    }
}

fn attach_all(listeners: &[Listener]) -> Result<(), JsValue> {
    for (i, listener) in listeners.iter().enumerate() {
        if let Err(e) = listener.attach() {
            listeners[..i].iter().for_each(Listener::detach);
            return Err(e);
        }
    }
    Ok(())
}

/// Document-wide blockers that exist only while the overlay is open.
///
/// The closures live as long as this value; `install`/`remove` only attach and
/// detach them, so a handler may close the overlay from inside itself.
pub struct DomListeners {
    listeners: Vec<Listener>,
}

impl DomListeners {
    fn new(document: &EventTarget, slot: Rc<OnceCell<WeakShared>>) -> Self {
        let keys = slot.clone();
        let keydown = Listener::new(document, "keydown", false, false, move |event: Event| {
            let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = Key::from_dom(&key_event.key());
            if let Some(weak) = keys.get() {
                dispatch(weak, |b| {
                    if b.viewer.key_down(key) {
                        event.prevent_default();
                    }
                });
            }
        });

        let wheels = slot.clone();
        let wheel = Listener::new(document, "wheel", true, false, move |event: Event| {
            let Some(wheel_event) = event.dyn_ref::<WheelEvent>() else {
                return;
            };
            let modifiers = modifiers(wheel_event);
            if wheels.get().is_some_and(|weak| query(weak, |b| b.viewer.blocks_wheel(modifiers))) {
                event.prevent_default();
            }
        });

        // Multi-touch must be stopped at touchstart too, or the page starts zooming
        let [touchstart, touchmove] = ["touchstart", "touchmove"].map(|kind| {
            let touches = slot.clone();
            Listener::new(document, kind, false, false, move |event: Event| {
                let Some(touch_event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                let count = touch_event.touches().length();
                if touches.get().is_some_and(|weak| query(weak, |b| b.viewer.blocks_touch(count))) {
                    event.prevent_default();
                }
            })
        });

        // Safari's proprietary pinch events
        let gesturestart = Listener::new(document, "gesturestart", false, false, |event: Event| {
            event.prevent_default();
        });

        Self {
            listeners: vec![keydown, wheel, touchstart, touchmove, gesturestart],
        }
    }
}

impl DocumentListeners for DomListeners {
    fn install(&mut self) -> folio_viewer::Result<()> {
        attach_all(&self.listeners).map_err(|e| ViewerError::Listeners(format!("{:?}", e)))
    }

    fn remove(&mut self) {
        self.listeners.iter().for_each(Listener::detach);
    }
}

// =============================================================================
// Binding
// =============================================================================

#[derive(Clone)]
struct Elements {
    window: web_sys::Window,
    preview: HtmlElement,
    overlay: HtmlElement,
    frame: HtmlElement,
    image: HtmlImageElement,
    /// The long image inside the preview frame, if it has one
    preview_image: Option<HtmlElement>,
}

/// Keep the browser from claiming pointer input on `element` for its own
/// panning, text selection or image drag.
fn suppress_native_drag(element: &HtmlElement) {
    let style = element.style();
    for (property, value) in [("touch-action", "none"), ("user-select", "none")] {
        if let Err(e) = style.set_property(property, value) {
            log::warn!("Failed to set {}: {:?}", property, e);
        }
    }
    element.set_draggable(false);
}

/// Detached image used to preload the high-resolution source.
struct HiResLoader {
    image: HtmlImageElement,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

impl HiResLoader {
    fn start(weak: WeakShared, url: String) -> Result<Self, JsValue> {
        let image = HtmlImageElement::new()?;

        let loaded = image.clone();
        let on_loaded = weak.clone();
        let onload = Closure::<dyn FnMut()>::new(move || {
            let size = Size::new(loaded.natural_width() as f32, loaded.natural_height() as f32);
            dispatch(&on_loaded, |b| b.viewer.preload_finished(Ok(size)));
        });

        let failed_url = url.clone();
        let onerror = Closure::<dyn FnMut()>::new(move || {
            let error = ViewerError::Preload {
                url: failed_url.clone(),
                message: "image failed to load".to_string(),
            };
            dispatch(&weak, |b| b.viewer.preload_finished(Err(error)));
        });

        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        image.set_src(&url);
        log::debug!("Preloading {}", url);

        Ok(Self {
            image,
            _onload: onload,
            _onerror: onerror,
        })
    }

    fn cancel(&self) {
        self.image.set_onload(None);
        self.image.set_onerror(None);
    }
}

struct Binding {
    viewer: ImageViewer<DomListeners>,
    elements: Elements,
    listeners: Vec<Listener>,
    frame_callback: Option<Closure<dyn FnMut(f64)>>,
    frame_id: Option<i32>,
    preload: Option<HiResLoader>,
    on_display: Option<js_sys::Function>,
}

impl Binding {
    /// Re-read the window rectangle and page viewport.
    fn refresh_layout(&mut self) {
        let r = self.elements.frame.get_bounding_client_rect();
        self.viewer.set_window_rect(Rect::new(
            r.left() as f32,
            r.top() as f32,
            r.width() as f32,
            r.height() as f32,
        ));

        let window = &self.elements.window;
        let dimension = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let width = dimension(window.inner_width());
        let height = dimension(window.inner_height());
        self.viewer.set_viewport(Size::new(width as f32, height as f32));
    }

    fn preview_metrics(&self) -> ScrollMetrics {
        let preview = &self.elements.preview;
        ScrollMetrics::new(
            preview.scroll_top() as f32,
            preview.scroll_height() as f32,
            preview.client_height() as f32,
        )
    }

    fn commit(&mut self, out: &FrameOutput) {
        if let Some(transform) = out.transform {
            let style = self.elements.image.style();
            if let Err(e) = style.set_property("transform", &transform.to_css()) {
                log::warn!("Failed to write transform: {:?}", e);
            }
        }

        if let Some(url) = &out.source {
            self.elements.image.set_src(url);
        }

        if let Some(display) = out.display {
            let open = if display.is_open { "true" } else { "false" };
            if let Err(e) = self.elements.overlay.set_attribute("data-open", open) {
                log::warn!("Failed to toggle overlay: {:?}", e);
            }
            if display.is_open {
                self.refresh_layout();
            }
            if let Some(callback) = &self.on_display {
                let result = callback.call3(
                    &JsValue::NULL,
                    &JsValue::from_bool(display.is_open),
                    &JsValue::from(display.zoom_percent),
                    &JsValue::from(display.slider_position),
                );
                if let Err(e) = result {
                    log::warn!("Display callback failed: {:?}", e);
                }
            }
        }
    }

    /// Release the frame callback, preload and listeners. Idempotent.
    fn teardown(&mut self) {
        if let Some(id) = self.frame_id.take() {
            if let Err(e) = self.elements.window.cancel_animation_frame(id) {
                log::debug!("cancelAnimationFrame failed: {:?}", e);
            }
        }
        self.viewer.teardown();
        self.listeners.iter().for_each(Listener::detach);
        self.listeners.clear();
        if let Some(loader) = self.preload.take() {
            loader.cancel();
        }
        self.frame_callback = None;
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Run `f` against the binding, then make sure a frame is requested.
fn dispatch<F>(weak: &WeakShared, f: F)
where
    F: FnOnce(&mut Binding),
{
    let Some(shared) = weak.upgrade() else {
        return;
    };
    match shared.try_borrow_mut() {
        Ok(mut binding) => f(&mut binding),
        Err(_) => {
            log::debug!("Viewer busy, dropping event");
            return;
        }
    }
    schedule(&shared);
}

fn query<F>(weak: &WeakShared, f: F) -> bool
where
    F: FnOnce(&Binding) -> bool,
{
    let Some(shared) = weak.upgrade() else {
        return false;
    };
    let Ok(binding) = shared.try_borrow() else {
        return false;
    };
    f(&binding)
}

/// Request one animation frame if the viewer wants one and none is pending.
fn schedule(shared: &Shared) {
    let Ok(mut guard) = shared.try_borrow_mut() else {
        return;
    };
    let binding = &mut *guard;
    if binding.frame_id.is_some() || !binding.viewer.needs_frame() {
        return;
    }
    let Some(callback) = &binding.frame_callback else {
        return;
    };
    match binding
        .elements
        .window
        .request_animation_frame(callback.as_ref().unchecked_ref())
    {
        Ok(id) => binding.frame_id = Some(id),
        Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
    }
}

fn frame_callback(weak: WeakShared) -> Closure<dyn FnMut(f64)> {
    Closure::new(move |_timestamp: f64| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        if let Ok(mut binding) = shared.try_borrow_mut() {
            binding.frame_id = None;
            let out = binding.viewer.on_frame();
            binding.commit(&out);
        }
        schedule(&shared);
    })
}

fn contact(event: &Event) -> Option<ContactEvent> {
    let e = event.dyn_ref::<PointerEvent>()?;
    Some(ContactEvent::new(
        e.pointer_id(),
        e.client_x() as f32,
        e.client_y() as f32,
        event.time_stamp(),
    ))
}

fn modifiers(e: &WheelEvent) -> Modifiers {
    Modifiers {
        shift: e.shift_key(),
        ctrl: e.ctrl_key(),
        alt: e.alt_key(),
        meta: e.meta_key(),
    }
}

/// Listeners on the page elements, attached for the binding's whole life.
fn element_listeners(weak: &WeakShared, elements: &Elements) -> Vec<Listener> {
    let frame: &EventTarget = elements.frame.as_ref();
    let overlay: &EventTarget = elements.overlay.as_ref();
    let preview: &EventTarget = elements.preview.as_ref();
    let image: &EventTarget = elements.image.as_ref();
    let mut listeners = Vec::new();

    let w = weak.clone();
    let capture_target = elements.frame.clone();
    listeners.push(Listener::new(frame, "pointerdown", false, false, move |event: Event| {
        let Some(e) = contact(&event) else { return };
        dispatch(&w, |b| {
            b.refresh_layout();
            if b.viewer.pointer_down(&e) {
                event.prevent_default();
                event.stop_propagation();
                if capture_target.set_pointer_capture(e.id).is_err() {
                    log::debug!("{}", ViewerError::PointerCapture(e.id));
                }
            }
        });
    }));

    let w = weak.clone();
    listeners.push(Listener::new(frame, "pointermove", false, false, move |event: Event| {
        let Some(e) = contact(&event) else { return };
        dispatch(&w, |b| {
            if b.viewer.pointer_move(&e) {
                event.prevent_default();
            }
        });
    }));

    for kind in ["pointerup", "pointercancel"] {
        let w = weak.clone();
        let capture_target = elements.frame.clone();
        listeners.push(Listener::new(frame, kind, false, false, move |event: Event| {
            let Some(e) = contact(&event) else { return };
            dispatch(&w, |b| {
                b.viewer.pointer_up(&e);
            });
            if capture_target.has_pointer_capture(e.id) {
                // Already released if the pointer left the document
                let _ = capture_target.release_pointer_capture(e.id);
            }
        }));
    }

    let w = weak.clone();
    listeners.push(Listener::new(frame, "wheel", false, false, move |event: Event| {
        let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
            return;
        };
        let e = ZoomEvent {
            position: Point::new(wheel.client_x() as f32, wheel.client_y() as f32),
            delta_y: wheel.delta_y() as f32,
            modifiers: modifiers(wheel),
        };
        dispatch(&w, |b| {
            if b.viewer.wheel(&e) {
                event.prevent_default();
            }
        });
    }));

    let w = weak.clone();
    let backdrop = overlay.clone();
    listeners.push(Listener::new(overlay, "pointerdown", false, true, move |event: Event| {
        if event.target().as_ref() == Some(&backdrop) {
            dispatch(&w, |b| b.viewer.backdrop_pointer_down());
        }
    }));

    let w = weak.clone();
    listeners.push(Listener::new(preview, "pointerdown", false, false, move |event: Event| {
        let Some(e) = contact(&event) else { return };
        dispatch(&w, |b| {
            b.refresh_layout();
            if b.viewer.preview_pointer_down(&e) != PreviewOutput::PassThrough {
                event.prevent_default();
            }
        });
    }));

    let w = weak.clone();
    listeners.push(Listener::new(preview, "pointermove", false, false, move |event: Event| {
        let Some(e) = contact(&event) else { return };
        dispatch(&w, |b| {
            if b.viewer.preview_pointer_move(&e) != PreviewOutput::PassThrough {
                event.prevent_default();
            }
        });
    }));

    for kind in ["pointerup", "pointercancel"] {
        let w = weak.clone();
        listeners.push(Listener::new(preview, kind, false, true, move |event: Event| {
            let Some(e) = contact(&event) else { return };
            dispatch(&w, |b| b.viewer.preview_pointer_up(&e));
        }));
    }

    let w = weak.clone();
    listeners.push(Listener::new(preview, "scroll", false, true, move |_event: Event| {
        dispatch(&w, |b| {
            let metrics = b.preview_metrics();
            b.viewer.preview_scrolled(metrics);
        });
    }));

    let image_element: &HtmlElement = elements.image.as_ref();
    for target in std::iter::once(image_element).chain(elements.preview_image.as_ref()) {
        listeners.push(Listener::new(target.as_ref(), "dragstart", false, false, |event: Event| {
            event.prevent_default();
        }));
    }

    let w = weak.clone();
    let loaded = elements.image.clone();
    listeners.push(Listener::new(image, "load", false, true, move |_event: Event| {
        let size = Size::new(loaded.natural_width() as f32, loaded.natural_height() as f32);
        dispatch(&w, |b| b.viewer.set_natural_size(size));
    }));

    listeners
}

// =============================================================================
// JS API
// =============================================================================

#[wasm_bindgen]
pub struct FolioViewer {
    shared: Shared,
}

impl FolioViewer {
    fn run<F>(&self, f: F)
    where
        F: FnOnce(&mut Binding),
    {
        dispatch(&Rc::downgrade(&self.shared), f);
    }
}

#[wasm_bindgen]
impl FolioViewer {
    /// Bind a viewer to its page elements.
    ///
    /// `on_scroll` receives the preview scroll percent (0-100), once right away
    /// and then at most once per frame.
    #[wasm_bindgen(constructor)]
    pub fn new(
        preview: HtmlElement,
        overlay: HtmlElement,
        frame: HtmlElement,
        image: HtmlImageElement,
        primary: String,
        hi_res: Option<String>,
        on_scroll: Option<js_sys::Function>,
    ) -> Result<FolioViewer, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object"))?;
        let config = AppConfig::load_from_local_storage().unwrap_or_default();

        let alt = image.alt();
        let mut sources = ImageSources::new(primary).with_alt(alt);
        if let Some(url) = hi_res {
            sources = sources.with_hi_res(url);
        }

        let slot = Rc::new(OnceCell::new());
        let listeners = DomListeners::new(document.as_ref(), slot.clone());
        let mut viewer = ImageViewer::with_listeners(sources, config.viewer, listeners)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        if let Some(callback) = on_scroll {
            viewer = viewer.on_scroll_percent(move |percent| {
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from(percent)) {
                    log::warn!("Scroll callback failed: {:?}", e);
                }
            });
        }

        let preview_image = preview
            .query_selector("img")
            .ok()
            .flatten()
            .and_then(|e| e.dyn_into::<HtmlElement>().ok());
        suppress_native_drag(&image);
        if let Some(preview_image) = &preview_image {
            suppress_native_drag(preview_image);
        }

        let elements = Elements {
            window,
            preview,
            overlay,
            frame,
            image,
            preview_image,
        };
        let preload_url = viewer.take_preload_request();
        let shared = Rc::new(RefCell::new(Binding {
            viewer,
            elements: elements.clone(),
            listeners: Vec::new(),
            frame_callback: None,
            frame_id: None,
            preload: None,
            on_display: None,
        }));
        let weak = Rc::downgrade(&shared);
        let _ = slot.set(weak.clone());

        let listeners = element_listeners(&weak, &elements);
        attach_all(&listeners)?;

        let preload = match preload_url {
            Some(url) => match HiResLoader::start(weak.clone(), url) {
                Ok(loader) => Some(loader),
                Err(e) => {
                    log::warn!("Failed to start high-resolution preload: {:?}", e);
                    None
                }
            },
            None => None,
        };

        {
            let mut binding = shared.borrow_mut();
            binding.listeners = listeners;
            binding.frame_callback = Some(frame_callback(weak));
            binding.preload = preload;
            binding.refresh_layout();
            if elements.image.complete() && elements.image.natural_width() > 0 {
                binding.viewer.set_natural_size(Size::new(
                    elements.image.natural_width() as f32,
                    elements.image.natural_height() as f32,
                ));
            }
            let metrics = binding.preview_metrics();
            binding.viewer.attach_preview(metrics);
        }
        schedule(&shared);

        log::info!("Image viewer bound");
        Ok(FolioViewer { shared })
    }

    /// `callback(isOpen, zoomPercent, sliderPosition)` after each readout change.
    #[wasm_bindgen(js_name = onDisplay)]
    pub fn on_display(&self, callback: js_sys::Function) {
        self.run(|b| b.on_display = Some(callback));
    }

    pub fn open(&self) {
        self.run(|b| {
            b.refresh_layout();
            b.viewer.open();
        });
    }

    pub fn close(&self) {
        self.run(|b| b.viewer.close());
    }

    pub fn minimize(&self) {
        self.run(|b| b.viewer.minimize());
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&self) {
        self.run(|b| b.viewer.zoom_in());
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&self) {
        self.run(|b| b.viewer.zoom_out());
    }

    #[wasm_bindgen(js_name = zoomMax)]
    pub fn zoom_max(&self) {
        self.run(|b| b.viewer.zoom_max());
    }

    pub fn fit(&self) {
        self.run(|b| b.viewer.fit());
    }

    #[wasm_bindgen(js_name = setSlider)]
    pub fn set_slider(&self, position: f32) {
        self.run(|b| b.viewer.set_slider_position(position));
    }

    #[wasm_bindgen(js_name = nudgeSlider)]
    pub fn nudge_slider(&self, steps: f32) {
        self.run(|b| b.viewer.nudge_slider(steps));
    }

    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        query(&Rc::downgrade(&self.shared), |b| b.viewer.is_open())
    }

    /// Detach everything. The viewer is inert afterwards.
    pub fn destroy(&self) {
        match self.shared.try_borrow_mut() {
            Ok(mut binding) => binding.teardown(),
            Err(_) => log::warn!("destroy() called from inside a viewer callback"),
        }
        log::info!("Image viewer destroyed");
    }
}
