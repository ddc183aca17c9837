//! Browser host (wasm32 only)
//!
//! Binds the simulators to the DOM: a Canvas2D [`Surface`], a
//! `requestAnimationFrame` [`FrameSource`] and scoped event listeners.
//! Every `mount_*` call returns a handle that owns its frame loop and
//! listeners; unmounting (or dropping) the handle releases both.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, HtmlElement, KeyboardEvent,
    PointerEvent, TouchEvent, Window,
};

use crate::arcade::{ArcadeSession, ArcadeView};
use crate::frame::{
    FrameCallback, FrameSource, LoopHandle, Mounted, RequestId, run_every_frame,
};
use crate::parallax::{ElementRect, Parallax, Tilt, Viewport};
use crate::particles::ParticleField;
use crate::scroll::ScrollFilter;
use crate::settings::Settings;
use crate::surface::{Color, Surface, css_color};
use crate::transform::StyleDirective;

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn element_by_id<T: JsCast>(id: &str) -> Result<T, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id '{}'", id)))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element '{}' has the wrong type", id)))
}

fn viewport(window: &Window) -> Viewport {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    Viewport {
        width: dim(window.inner_width()),
        height: dim(window.inner_height()),
    }
}

fn element_rect(el: &HtmlElement) -> ElementRect {
    let r = el.get_bounding_client_rect();
    ElementRect::new(
        r.left() as f32,
        r.top() as f32,
        r.width() as f32,
        r.height() as f32,
    )
}

fn apply_style(el: &HtmlElement, directive: &StyleDirective) {
    let style = el.style();
    let _ = style.set_property("transition", directive.transition_css());
    let _ = style.set_property("transform", &directive.transform_css());
}

fn session_seed() -> u64 {
    js_sys::Date::now() as u64
}

/// Store effect settings (JSON, missing fields default). Applies to
/// effects mounted afterwards.
#[wasm_bindgen]
pub fn configure(settings_json: &str) -> Result<(), JsValue> {
    let settings =
        Settings::from_json(settings_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    settings.save();
    Ok(())
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

type PendingFrames = RefCell<HashMap<RequestId, (i32, Closure<dyn FnMut(f64)>)>>;

/// `requestAnimationFrame`-backed frame source.
///
/// Closures stay alive in `pending` until they fire or are cancelled.
pub struct BrowserFrames {
    window: Window,
    next_id: Cell<RequestId>,
    pending: Rc<PendingFrames>,
}

impl BrowserFrames {
    pub fn new() -> Result<Rc<Self>, JsValue> {
        Ok(Rc::new(Self {
            window: window()?,
            next_id: Cell::new(0),
            pending: Rc::new(RefCell::new(HashMap::new())),
        }))
    }
}

impl FrameSource for BrowserFrames {
    fn request_frame(&self, callback: FrameCallback) -> Option<RequestId> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let pending = Rc::clone(&self.pending);
        let closure = Closure::once(move |time: f64| {
            // Release the map borrow before the callback schedules again
            let entry = pending.borrow_mut().remove(&id);
            callback(time);
            drop(entry);
        });

        match self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
        {
            Ok(handle) => {
                self.pending.borrow_mut().insert(id, (handle, closure));
                Some(id)
            }
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_frame(&self, id: RequestId) {
        let entry = self.pending.borrow_mut().remove(&id);
        if let Some((handle, _closure)) = entry {
            let _ = self.window.cancel_animation_frame(handle);
        }
    }
}

// ---------------------------------------------------------------------------
// Canvas surface
// ---------------------------------------------------------------------------

/// [`Surface`] over a `<canvas>` 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    /// Match the backing store to the element's CSS size. Returns true if
    /// the size changed.
    pub fn fit_to_client(&self) -> bool {
        let w = self.canvas.client_width().max(0) as u32;
        let h = self.canvas.client_height().max(0) as u32;
        if w == self.canvas.width() && h == self.canvas.height() {
            return false;
        }
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        true
    }

    fn set_fill(&self, color: Color) {
        self.ctx.set_fill_style_str(&css_color(color));
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Vec2 {
        Vec2::new(self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn begin_frame(&mut self) {
        self.fit_to_client();
    }

    fn clear(&mut self, color: Color) {
        let size = self.size();
        self.set_fill(color);
        self.ctx.fill_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        self.set_fill(color);
        self.ctx
            .fill_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color) {
        let (cx, cy) = (center.x as f64, center.y as f64);
        let Ok(gradient) = self.ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, radius as f64)
        else {
            return;
        };
        let _ = gradient.add_color_stop(0.0, &css_color(inner));
        let _ = gradient.add_color_stop(1.0, &css_color(outer));
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        let size = self.size();
        self.ctx.fill_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.set_fill(color);
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius as f64,
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.fill();
    }

    fn fill_wedge(&mut self, center: Vec2, radius: f32, start: f32, end: f32, color: Color) {
        self.set_fill(color);
        self.ctx.begin_path();
        self.ctx.move_to(center.x as f64, center.y as f64);
        let _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius as f64,
            start as f64,
            end as f64,
        );
        self.ctx.close_path();
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.ctx.set_stroke_style_str(&css_color(color));
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }
}

/// Canvas surface for `canvas`, or `None` (logged) when no 2D context is
/// available. Simulators skip frames without a surface.
fn canvas_surface(canvas: HtmlCanvasElement, what: &str) -> Option<CanvasSurface> {
    match CanvasSurface::new(canvas) {
        Ok(surface) => {
            surface.fit_to_client();
            Some(surface)
        }
        Err(e) => {
            log::warn!("{}: no drawing surface ({:?}), rendering disabled", what, e);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Listeners and mounts
// ---------------------------------------------------------------------------

/// An event listener that is removed when the guard drops
pub struct ListenerGuard {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl ListenerGuard {
    pub fn new<E, F>(
        target: &EventTarget,
        event: &'static str,
        mut handler: F,
    ) -> Result<Self, JsValue>
    where
        E: JsCast + 'static,
        F: FnMut(E) + 'static,
    {
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Ok(event) = event.dyn_into::<E>() {
                handler(event);
            }
        });
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// A mounted effect as seen from JS
#[wasm_bindgen(js_name = Mounted)]
pub struct MountHandle {
    inner: Mounted,
}

impl MountHandle {
    fn new(
        name: &'static str,
        frame_loop: Option<LoopHandle>,
        listeners: Vec<ListenerGuard>,
    ) -> Self {
        let mut inner = Mounted::new(name, frame_loop);
        for listener in listeners {
            inner.hold(listener);
        }
        Self { inner }
    }
}

#[wasm_bindgen(js_class = Mounted)]
impl MountHandle {
    /// Stop the loop and remove every listener. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        self.inner.unmount();
    }

    #[wasm_bindgen(getter)]
    pub fn is_mounted(&self) -> bool {
        self.inner.is_mounted()
    }
}

/// Animated particle background on the canvas with id `canvas_id`
#[wasm_bindgen]
pub fn mount_particle_field(canvas_id: &str) -> Result<MountHandle, JsValue> {
    let win = window()?;
    let canvas: HtmlCanvasElement = element_by_id(canvas_id)?;
    let settings = Settings::load();

    let surface = Rc::new(RefCell::new(canvas_surface(canvas, "Particle field")));
    let size = surface
        .borrow()
        .as_ref()
        .map(Surface::size)
        .unwrap_or(Vec2::ZERO);
    let field = Rc::new(RefCell::new(ParticleField::new(
        size.x,
        size.y,
        &settings,
        session_seed(),
    )));

    let on_resize = {
        let surface = Rc::clone(&surface);
        let field = Rc::clone(&field);
        ListenerGuard::new(&win, "resize", move |_: Event| {
            if let Some(s) = surface.borrow().as_ref() {
                s.fit_to_client();
                let size = s.size();
                field.borrow_mut().resize(size.x, size.y);
            }
        })?
    };

    let frame_loop = run_every_frame(BrowserFrames::new()?, move |_time| {
        let mut surface = surface.borrow_mut();
        field
            .borrow_mut()
            .frame(surface.as_mut().map(|s| s as &mut dyn Surface));
    });

    Ok(MountHandle::new("Particle field", Some(frame_loop), vec![on_resize]))
}

/// Scroll-velocity skew on the content wrapper with id `element_id`
#[wasm_bindgen]
pub fn mount_scroll_skew(element_id: &str) -> Result<MountHandle, JsValue> {
    let win = window()?;
    let el: HtmlElement = element_by_id(element_id)?;
    let settings = Settings::load();
    let mut filter = ScrollFilter::new(win.scroll_y()? as f32, &settings);

    let frame_loop = run_every_frame(BrowserFrames::new()?, move |_time| {
        let offset = win.scroll_y().unwrap_or(0.0) as f32;
        let before = filter.skew();
        filter.tick(offset);
        if filter.skew() != before {
            apply_style(&el, &filter.directive());
        }
    });

    Ok(MountHandle::new("Scroll skew", Some(frame_loop), Vec::new()))
}

/// Scroll parallax on the element with id `element_id`
#[wasm_bindgen]
pub fn mount_parallax(
    element_id: &str,
    speed: f32,
    rotation_factor: f32,
) -> Result<MountHandle, JsValue> {
    let win = window()?;
    let el: HtmlElement = element_by_id(element_id)?;
    let parallax = Parallax::new(speed, rotation_factor, &Settings::load());

    let update = {
        let win = win.clone();
        move || {
            if let Some(directive) = parallax.on_scroll(&element_rect(&el), viewport(&win)) {
                apply_style(&el, &directive);
            }
        }
    };
    update();

    let on_scroll = ListenerGuard::new(&win, "scroll", move |_: Event| update())?;
    Ok(MountHandle::new("Parallax", None, vec![on_scroll]))
}

/// Pointer tilt on the element with id `element_id`. Uses the configured
/// intensity when `intensity` is not given.
#[wasm_bindgen]
pub fn mount_tilt(element_id: &str, intensity: Option<f32>) -> Result<MountHandle, JsValue> {
    let el: HtmlElement = element_by_id(element_id)?;
    let settings = Settings::load();
    let tilt = Rc::new(RefCell::new(Tilt::new(
        intensity.unwrap_or(settings.tilt_intensity),
        &settings,
    )));

    let on_move = {
        let tilt = Rc::clone(&tilt);
        let el_cb = el.clone();
        ListenerGuard::new(&el, "pointermove", move |event: PointerEvent| {
            let pointer = Vec2::new(event.client_x() as f32, event.client_y() as f32);
            let directive = tilt.borrow_mut().on_pointer_move(&element_rect(&el_cb), pointer);
            apply_style(&el_cb, &directive);
        })?
    };
    let on_leave = {
        let el_cb = el.clone();
        ListenerGuard::new(&el, "pointerleave", move |_: PointerEvent| {
            let directive = tilt.borrow_mut().on_pointer_leave();
            apply_style(&el_cb, &directive);
        })?
    };

    Ok(MountHandle::new("Tilt", None, vec![on_move, on_leave]))
}

/// A running arcade game with its shell controls. Every method takes
/// `&self`, so JS may call back in from `onGameClose`.
#[wasm_bindgen(js_name = ArcadeView)]
pub struct ArcadeHandle {
    view: Rc<ArcadeView>,
}

#[wasm_bindgen(js_class = ArcadeView)]
impl ArcadeHandle {
    pub fn restart(&self) {
        self.view.restart();
    }

    /// Close the game if it has been won
    pub fn claim_victory(&self) -> bool {
        self.view.claim_victory()
    }

    /// HUD status as JSON (`{"score":..,"lives":..,"level":..,"phase":..}`)
    pub fn status(&self) -> Result<String, JsValue> {
        self.view
            .status_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn unmount(&self) {
        self.view.unmount();
    }

    #[wasm_bindgen(getter)]
    pub fn is_mounted(&self) -> bool {
        self.view.is_mounted()
    }
}

fn touch_point(event: &TouchEvent) -> Option<Vec2> {
    event
        .touches()
        .get(0)
        .map(|t| Vec2::new(t.client_x() as f32, t.client_y() as f32))
}

/// Start the arcade on the canvas with id `canvas_id`. `on_close` runs
/// once when the player exits or claims victory, after the game loop and
/// listeners are gone; `on_status` receives the HUD status JSON whenever
/// it changes.
#[wasm_bindgen]
pub fn mount_arcade(
    canvas_id: &str,
    on_close: js_sys::Function,
    on_status: Option<js_sys::Function>,
) -> Result<ArcadeHandle, JsValue> {
    let win = window()?;
    let canvas: HtmlCanvasElement = element_by_id(canvas_id)?;
    let settings = Settings::load();

    let session = ArcadeSession::from_settings(&settings, session_seed(), move || {
        if let Err(e) = on_close.call0(&JsValue::NULL) {
            log::warn!("onGameClose failed: {:?}", e);
        }
    });
    let view = ArcadeView::new(session);
    view.run(
        BrowserFrames::new()?,
        canvas_surface(canvas.clone(), "Arcade"),
        move |status| {
            let Some(callback) = &on_status else {
                return;
            };
            if let Ok(json) = serde_json::to_string(&status) {
                let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(&json));
            }
        },
    );

    // Listeners hold the view weakly; the view holds the listeners
    let weak = Rc::downgrade(&view);
    view.hold(ListenerGuard::new(&win, "keydown", {
        let view = weak.clone();
        move |event: KeyboardEvent| {
            if view.upgrade().is_some_and(|view| view.handle_key(&event.key())) {
                event.prevent_default();
            }
        }
    })?);
    view.hold(ListenerGuard::new(&canvas, "touchstart", {
        let view = weak.clone();
        move |event: TouchEvent| {
            event.prevent_default();
            if let (Some(view), Some(p)) = (view.upgrade(), touch_point(&event)) {
                view.touch_start(p);
            }
        }
    })?);
    view.hold(ListenerGuard::new(&canvas, "touchmove", {
        let view = weak.clone();
        move |event: TouchEvent| {
            event.prevent_default();
            if let (Some(view), Some(p)) = (view.upgrade(), touch_point(&event)) {
                view.touch_move(p);
            }
        }
    })?);
    view.hold(ListenerGuard::new(&canvas, "touchend", move |_: TouchEvent| {
        if let Some(view) = weak.upgrade() {
            view.touch_end();
        }
    })?);

    Ok(ArcadeHandle { view })
}
