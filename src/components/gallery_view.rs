use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlElement, KeyboardEvent, MouseEvent, TouchEvent};
use yew::prelude::*;

use crate::dom::{ActivationQueue, DomScene, ScrollLock};
use crate::error::GalleryError;
use crate::frame::FrameLoop;
use crate::gallery::{Gallery, Navigator};
use crate::model::{GallerySettings, ProjectCatalog, Size};
use crate::scene::Activation;
use crate::state::PointerPoint;
use crate::tween::Tweener;
use crate::util::{cwarn, now_ms};

#[derive(Properties, PartialEq, Clone)]
pub struct GalleryViewProps {
    pub catalog: Rc<ProjectCatalog>,
    pub settings: Rc<GallerySettings>,
    pub on_navigate: Callback<String>,
}

type DomGallery = Gallery<DomScene, Tweener>;

/// Navigation requests raised mid-frame; emitted once the gallery borrow is released.
struct PendingNavigation(Rc<RefCell<Vec<String>>>);

impl Navigator for PendingNavigation {
    fn navigate_to_project(&mut self, id: &str) {
        self.0.borrow_mut().push(id.to_string());
    }
}

/// Everything a mounted gallery holds on to. Dropping it unmounts.
struct MountedGallery {
    gallery: Rc<RefCell<DomGallery>>,
    _listeners: Vec<EventListener>,
    _frames: FrameLoop,
    _scroll_lock: ScrollLock,
}

impl Drop for MountedGallery {
    fn drop(&mut self) {
        if let Ok(mut gallery) = self.gallery.try_borrow_mut() {
            gallery.teardown();
        }
    }
}

fn viewport_size(window: &web_sys::Window) -> Size {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Size::new(dim(window.inner_width()), dim(window.inner_height()))
}

fn mouse_point(e: &MouseEvent) -> PointerPoint {
    PointerPoint::new(e.client_x() as f64, e.client_y() as f64, now_ms())
}

fn touch_point(e: &TouchEvent) -> Option<PointerPoint> {
    e.touches()
        .item(0)
        .map(|t| PointerPoint::new(t.client_x() as f64, t.client_y() as f64, now_ms()))
}

fn mount(
    container: HtmlElement,
    canvas: HtmlElement,
    catalog: Rc<ProjectCatalog>,
    settings: &GallerySettings,
    on_navigate: Callback<String>,
) -> Result<MountedGallery, GalleryError> {
    let window = web_sys::window().ok_or(GalleryError::Dom("window"))?;
    let scroll_lock = ScrollLock::acquire()?;
    let activations: ActivationQueue = Rc::default();
    let navigations: Rc<RefCell<Vec<String>>> = Rc::default();
    let scene = DomScene::new(container.clone(), canvas, activations.clone())?;
    let started_at = window.performance().map(|p| p.now()).unwrap_or(0.0);
    let gallery = Rc::new(RefCell::new(Gallery::mount(
        settings.clone(),
        catalog,
        viewport_size(&window),
        scene,
        Tweener::new(),
        Box::new(PendingNavigation(navigations.clone())),
        started_at,
    )));

    let mut listeners = Vec::new();
    let blocking = EventListenerOptions::enable_prevent_default();

    // Mouse: press on the gallery, track and release anywhere on the page.
    {
        let gallery = gallery.clone();
        listeners.push(EventListener::new(&container, "mousedown", move |e| {
            if let Some(e) = e.dyn_ref::<MouseEvent>() {
                if e.button() == 0 {
                    gallery.borrow_mut().pointer_down(mouse_point(e));
                }
            }
        }));
    }
    {
        let gallery = gallery.clone();
        listeners.push(EventListener::new(&window, "mousemove", move |e| {
            if let Some(e) = e.dyn_ref::<MouseEvent>() {
                gallery.borrow_mut().pointer_move(mouse_point(e));
            }
        }));
    }
    {
        let gallery = gallery.clone();
        listeners.push(EventListener::new(&window, "mouseup", move |_| {
            gallery.borrow_mut().pointer_up();
        }));
    }

    // Touch
    {
        let gallery = gallery.clone();
        listeners.push(EventListener::new(&container, "touchstart", move |e| {
            if let Some(point) = e.dyn_ref::<TouchEvent>().and_then(touch_point) {
                gallery.borrow_mut().pointer_down(point);
            }
        }));
    }
    {
        let gallery = gallery.clone();
        listeners.push(EventListener::new_with_options(&window, "touchmove", blocking, move |e| {
            let mut g = gallery.borrow_mut();
            if !g.is_dragging() {
                return;
            }
            if let Some(point) = e.dyn_ref::<TouchEvent>().and_then(touch_point) {
                g.pointer_move(point);
            }
            e.prevent_default();
        }));
    }
    for kind in ["touchend", "touchcancel"] {
        let gallery = gallery.clone();
        listeners.push(EventListener::new(&window, kind, move |_| {
            gallery.borrow_mut().pointer_up();
        }));
    }

    listeners.push(EventListener::new_with_options(&window, "wheel", blocking, |e| {
        e.prevent_default();
    }));
    {
        let gallery = gallery.clone();
        let window_resize = window.clone();
        listeners.push(EventListener::new(&window, "resize", move |_| {
            gallery.borrow_mut().resize(viewport_size(&window_resize));
        }));
    }
    {
        let gallery = gallery.clone();
        listeners.push(EventListener::new(&window, "keydown", move |e| {
            if e.dyn_ref::<KeyboardEvent>().is_some_and(|k| k.key() == "Escape") {
                gallery.borrow_mut().close();
            }
        }));
    }

    let frames = {
        let gallery = gallery.clone();
        let mut cursor = "";
        FrameLoop::start(move |timestamp| {
            {
                let mut g = gallery.borrow_mut();
                let pending: Vec<Activation> = activations.borrow_mut().drain(..).collect();
                for activation in pending {
                    g.activate(activation);
                }
                g.frame(timestamp);

                let wanted = match (g.can_drag(), g.is_dragging()) {
                    (false, _) => "auto",
                    (true, true) => "grabbing",
                    (true, false) => "grab",
                };
                if wanted != cursor {
                    let _ = container.style().set_property("cursor", wanted);
                    cursor = wanted;
                }
            }
            let targets: Vec<String> = navigations.borrow_mut().drain(..).collect();
            for id in targets {
                on_navigate.emit(id);
            }
        })?
    };

    Ok(MountedGallery {
        gallery,
        _listeners: listeners,
        _frames: frames,
        _scroll_lock: scroll_lock,
    })
}

#[function_component(GalleryView)]
pub fn gallery_view(props: &GalleryViewProps) -> Html {
    let container_ref = use_node_ref();
    let canvas_ref = use_node_ref();

    {
        let container_ref = container_ref.clone();
        let canvas_ref = canvas_ref.clone();
        let on_navigate = props.on_navigate.clone();
        use_effect_with(
            (props.catalog.clone(), props.settings.clone()),
            move |(catalog, settings)| {
                let container = container_ref.cast::<HtmlElement>();
                let canvas = canvas_ref.cast::<HtmlElement>();
                let mounted = match (container, canvas) {
                    (Some(container), Some(canvas)) => {
                        match mount(container, canvas, catalog.clone(), settings, on_navigate) {
                            Ok(mounted) => Some(mounted),
                            Err(err) => {
                                cwarn(&format!("gallery failed to mount: {err}"));
                                None
                            }
                        }
                    }
                    _ => {
                        cwarn("gallery container not rendered");
                        None
                    }
                };
                move || drop(mounted)
            },
        );
    }

    html! {
        <div
            ref={container_ref}
            class="gallery-container"
            style="position:fixed; inset:0; overflow:hidden; background:#0b0b0b; touch-action:none; user-select:none; cursor:grab;"
        >
            <div
                ref={canvas_ref}
                class="gallery-canvas"
                style="position:absolute; left:0; top:0; will-change:transform;"
            ></div>
        </div>
    }
}
