// app.rs - DOM wiring and the animation loop
//
// Boundary glue only: canvas setup, event listeners, the self-perpetuating
// requestAnimationFrame loop, and the single catch-all error path that swaps
// the container content for a plain unsupported-browser note.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, HtmlElement, MouseEvent, WebGlRenderingContext as GL};

use crate::render::Renderer;
use crate::sim::{self, Simulation};
use crate::{console_error, console_log};

const UNSUPPORTED_MESSAGE: &str = "\
<p>
  Sorry! Your browser doesn't seem to support webgl<br/>
  Please try again in different browsers
</p>";

type FrameClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// The demo: a container div holding the canvas, the simulation behind it,
/// and the flag the frame loop checks before re-registering itself.
#[wasm_bindgen]
pub struct App {
    el: HtmlElement,
    canvas: HtmlCanvasElement,
    simulation: Rc<RefCell<Simulation>>,
    running: Rc<Cell<bool>>,
}

#[wasm_bindgen]
impl App {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<App, JsValue> {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        let document = web_sys::window()
            .ok_or_else(|| JsValue::from_str("no window"))?
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let el: HtmlElement = document.create_element("div")?.dyn_into()?;
        el.set_class_name("app");

        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        canvas.set_class_name("canvas");
        el.append_child(&canvas)?;

        Ok(App {
            el,
            canvas,
            simulation: Rc::new(RefCell::new(Simulation::new())),
            running: Rc::new(Cell::new(false)),
        })
    }

    /// Container element for the host page to adopt.
    pub fn element(&self) -> HtmlElement {
        self.el.clone()
    }

    /// Drop a burst of particles at the center of the screen.
    pub fn seed(&self, count: usize) {
        self.simulation.borrow_mut().seed(count);
    }

    /// Acquire WebGL, set up the shader program, wire the events and start
    /// the frame loop. Whatever goes wrong during this pass is reported once
    /// as the generic unsupported-browser message.
    pub fn start(&self) {
        match self.initialize() {
            Ok(()) => console_log!("splash-engine running"),
            Err(error) => {
                console_error!("initialization failed: {error:?}");
                self.el.set_inner_html(UNSUPPORTED_MESSAGE);
            }
        }
    }

    /// Ask the loop to halt; it stops re-registering after the current
    /// frame. The events stay wired, so `start` brings it back.
    pub fn stop(&self) {
        self.running.set(false);
    }
}

impl App {
    fn initialize(&self) -> Result<(), JsValue> {
        let gl = self.webgl_context()?;
        let renderer =
            Rc::new(Renderer::new(gl).map_err(|e| JsValue::from_str(&e.to_string()))?);

        self.apply_size(&renderer)?;
        self.register_resize(renderer.clone())?;
        self.register_mouseup()?;
        self.run_loop(renderer);
        Ok(())
    }

    fn webgl_context(&self) -> Result<GL, JsValue> {
        let context = match self.canvas.get_context("webgl")? {
            Some(context) => context,
            None => self
                .canvas
                .get_context("experimental-webgl")?
                .ok_or_else(|| JsValue::from_str("webgl context unavailable"))?,
        };
        Ok(context.dyn_into()?)
    }

    /// Match the canvas backing store and GL viewport to the current CSS
    /// size. Must run before the next `step`, which derives the on-screen
    /// particle radius from the backing height.
    fn apply_size(&self, renderer: &Renderer) -> Result<(), JsValue> {
        let (css_w, css_h) = computed_css_size(&self.canvas)?;
        let (w, h) = sim::backing_size(css_w, css_h, device_pixel_ratio());
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        renderer.set_viewport(w, h);
        Ok(())
    }

    fn register_resize(&self, renderer: Rc<Renderer>) -> Result<(), JsValue> {
        let canvas = self.canvas.clone();
        let closure = Closure::wrap(Box::new(move || {
            if let Ok((css_w, css_h)) = computed_css_size(&canvas) {
                let (w, h) = sim::backing_size(css_w, css_h, device_pixel_ratio());
                canvas.set_width(w);
                canvas.set_height(h);
                renderer.set_viewport(w, h);
            }
        }) as Box<dyn FnMut()>);

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        window.add_event_listener_with_callback(
            "DOMContentLoaded",
            closure.as_ref().unchecked_ref(),
        )?;
        closure.forget();
        Ok(())
    }

    fn register_mouseup(&self) -> Result<(), JsValue> {
        let canvas = self.canvas.clone();
        let simulation = self.simulation.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            if let Ok((css_w, css_h)) = computed_css_size(&canvas) {
                let point =
                    sim::to_ndc(event.client_x() as f64, event.client_y() as f64, css_w, css_h);
                simulation.borrow_mut().spawn_at(point.x, point.y);
            }
        }) as Box<dyn FnMut(_)>);

        self.canvas
            .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn run_loop(&self, renderer: Rc<Renderer>) {
        let simulation = self.simulation.clone();
        let canvas = self.canvas.clone();
        let running = self.running.clone();
        running.set(true);

        // The closure re-registers itself each frame, so it holds a handle
        // to its own slot.
        let slot: FrameClosure = Rc::new(RefCell::new(None));
        let first = slot.clone();

        *first.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if !running.get() {
                return;
            }

            {
                let mut sim = simulation.borrow_mut();
                sim.step(canvas.height() as f64, device_pixel_ratio());
                if let Some(positions) = sim.packed_positions() {
                    renderer.upload_positions(&positions);
                    renderer.draw_points(sim.len());
                }
            }

            request_frame(&slot);
        }) as Box<dyn FnMut()>));

        request_frame(&first);
    }
}

fn request_frame(slot: &FrameClosure) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Some(closure) = slot.borrow().as_ref() {
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    }
}

fn device_pixel_ratio() -> f64 {
    web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0)
}

/// CSS dimensions of the canvas from its computed style, in CSS pixels.
fn computed_css_size(canvas: &HtmlCanvasElement) -> Result<(f64, f64), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let style = window
        .get_computed_style(canvas)?
        .ok_or_else(|| JsValue::from_str("no computed style"))?;
    Ok((
        parse_px(&style.get_property_value("width")?),
        parse_px(&style.get_property_value("height")?),
    ))
}

/// Parse a `"123px"`-style computed value. A canvas that is not laid out yet
/// yields zero, which the caller treats as a degenerate-but-harmless size.
fn parse_px(value: &str) -> f64 {
    value.trim_end_matches("px").parse().unwrap_or(0.0)
}
