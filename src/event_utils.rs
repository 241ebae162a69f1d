use crate::application::ResizeDebouncer;
use crate::domain::chart::SurfaceSize;
use crate::infrastructure::services::now_ms;
use gloo_timers::future::TimeoutFuture;
use js_sys::Array;
use leptos::ev::EventDescriptor;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Event, ResizeObserver};

#[derive(Clone, Debug)]
pub struct EventOptions {
    pub passive: bool,
    pub capture: bool,
    pub once: bool,
}

impl Default for EventOptions {
    fn default() -> Self {
        Self { passive: true, capture: false, once: false }
    }
}

pub struct WindowEventListenerHandle {
    event_name: String,
    callback: Closure<dyn FnMut(Event)>,
    capture: bool,
}

impl WindowEventListenerHandle {
    pub fn remove(self) {
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback_and_bool(
                &self.event_name,
                self.callback.as_ref().unchecked_ref(),
                self.capture,
            );
        }
    }
}

pub fn window_event_listener_with_options<E>(
    event: E,
    options: &EventOptions,
    mut cb: impl FnMut(E::EventType) + 'static,
) -> WindowEventListenerHandle
where
    E: EventDescriptor + 'static,
    E::EventType: JsCast,
{
    let opts = AddEventListenerOptions::new();
    opts.set_passive(options.passive);
    opts.set_capture(options.capture);
    opts.set_once(options.once);

    let event_name = event.name().into_owned();
    let callback = Closure::wrap(Box::new(move |ev: Event| {
        cb(ev.unchecked_into::<E::EventType>());
    }) as Box<dyn FnMut(Event)>);

    if let Some(window) = web_sys::window() {
        let _ = window.add_event_listener_with_callback_and_add_event_listener_options(
            &event_name,
            callback.as_ref().unchecked_ref(),
            &opts,
        );
    }

    WindowEventListenerHandle { event_name, callback, capture: options.capture }
}

/// Client size of the canvas's container, or of the canvas itself when it has no parent.
pub fn container_size(canvas_id: &str) -> Option<SurfaceSize> {
    let canvas = web_sys::window()?.document()?.get_element_by_id(canvas_id)?;
    let element = canvas.parent_element().unwrap_or(canvas);
    let (width, height) = (element.client_width(), element.client_height());
    Some(SurfaceSize::new(width.max(0) as u32, height.max(0) as u32))
}

/// Live subscription to a container's size. `stop` detaches it.
pub enum ContainerWatch {
    Observer {
        observer: ResizeObserver,
        _callback: Closure<dyn FnMut(Array)>,
    },
    Window(WindowEventListenerHandle),
}

impl ContainerWatch {
    pub fn stop(self) {
        match self {
            Self::Observer { observer, .. } => observer.disconnect(),
            Self::Window(handle) => handle.remove(),
        }
    }
}

/// Calls `on_settled` once the canvas container has stopped resizing for the debounce delay.
///
/// The container is watched with a `ResizeObserver`, so layout-driven size changes reflow
/// too. Without one (or without a parent element) window resizes are followed instead.
/// `on_settled` returns `false` when the chart is busy; the size is then retried after another
/// delay.
pub fn watch_container_resize(
    canvas_id: &str,
    debounce_ms: u32,
    on_settled: impl Fn(SurfaceSize) -> bool + 'static,
) -> ContainerWatch {
    let debouncer = Rc::new(RefCell::new(ResizeDebouncer::new(debounce_ms)));
    let on_settled: Rc<dyn Fn(SurfaceSize) -> bool> = Rc::new(on_settled);
    let id = canvas_id.to_string();
    let notify = move || {
        if let Some(size) = container_size(&id) {
            settle_later(Rc::clone(&debouncer), Rc::clone(&on_settled), size, debounce_ms);
        }
    };

    let container = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(canvas_id))
        .and_then(|canvas| canvas.parent_element());
    if let Some(container) = container {
        let observed = notify.clone();
        let callback = Closure::wrap(Box::new(move |_entries: Array| observed())
            as Box<dyn FnMut(Array)>);
        if let Ok(observer) = ResizeObserver::new(callback.as_ref().unchecked_ref()) {
            observer.observe(&container);
            return ContainerWatch::Observer { observer, _callback: callback };
        }
    }

    ContainerWatch::Window(window_event_listener_with_options(
        leptos::ev::resize,
        &EventOptions::default(),
        move |_| notify(),
    ))
}

/// Records `size` and hands it to `on_settled` once the debouncer's deadline has passed
/// without a newer size.
fn settle_later(
    debouncer: Rc<RefCell<ResizeDebouncer>>,
    on_settled: Rc<dyn Fn(SurfaceSize) -> bool>,
    size: SurfaceSize,
    retry_ms: u32,
) {
    debouncer.borrow_mut().observe(size, now_ms());
    wasm_bindgen_futures::spawn_local(async move {
        loop {
            let remaining = debouncer.borrow().remaining_ms(now_ms());
            match remaining {
                Some(ms) if ms > 0.0 => TimeoutFuture::new(ms.ceil() as u32).await,
                _ => break,
            }
        }
        let ready = debouncer.borrow_mut().take_ready(now_ms());
        let Some(size) = ready else {
            return;
        };
        while !on_settled(size) {
            TimeoutFuture::new(retry_ms).await;
        }
    });
}
