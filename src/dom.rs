//! DOM-backed [`Scene`]: tiles are absolutely positioned divs inside a
//! translated canvas div; the overlay and the floating copy sit on the fixed
//! container above it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gloo::events::EventListener;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, HtmlImageElement};

use crate::error::GalleryError;
use crate::grid::TileContent;
use crate::model::{Rect, Size, Vec2};
use crate::scene::{Activation, ElementId, ElementSpec, Scene};
use crate::util::cwarn;

/// Activations collected by click listeners, drained once per frame.
pub type ActivationQueue = Rc<RefCell<Vec<Activation>>>;

const TILE_STYLE: &str = "position:absolute; overflow:hidden; user-select:none; cursor:pointer; transition:transform 0.2s;";
const IMAGE_BOX_STYLE: &str = "width:100%; height:calc(100% - 40px); overflow:hidden; background:#161616;";
const IMAGE_STYLE: &str = "width:100%; height:100%; object-fit:cover; display:block; pointer-events:none;";
const CAPTION_STYLE: &str = "height:40px; display:flex; justify-content:space-between; align-items:center; font-size:13px; color:#e6e6e6; letter-spacing:0.02em;";
const OVERLAY_STYLE: &str = "position:absolute; inset:0; background:#000; opacity:0; pointer-events:none; z-index:10;";
const FLOATING_STYLE: &str = "position:absolute; overflow:hidden; z-index:20; cursor:pointer;";

struct DomElement {
    el: HtmlElement,
    _click: Option<EventListener>,
}

pub struct DomScene {
    document: Document,
    container: HtmlElement,
    canvas: HtmlElement,
    next_id: u64,
    elements: HashMap<ElementId, DomElement>,
    queue: ActivationQueue,
}

impl DomScene {
    pub fn new(container: HtmlElement, canvas: HtmlElement, queue: ActivationQueue) -> Result<Self, GalleryError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(GalleryError::Dom("document"))?;
        Ok(Self {
            document,
            container,
            canvas,
            next_id: 0,
            elements: HashMap::new(),
            queue,
        })
    }

    fn div(&self, class: &str, style: &str) -> Result<HtmlElement, JsValue> {
        let el: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        el.set_class_name(class);
        el.set_attribute("style", style)?;
        Ok(el)
    }

    fn img(&self, src: &str, alt: &str) -> Result<HtmlImageElement, JsValue> {
        let img: HtmlImageElement = self.document.create_element("img")?.dyn_into()?;
        img.set_src(src);
        img.set_alt(alt);
        img.set_draggable(false);
        img.set_attribute("style", IMAGE_STYLE)?;
        Ok(img)
    }

    fn build_tile(&self, content: &TileContent) -> Result<HtmlElement, JsValue> {
        let item = self.div("gallery-item", TILE_STYLE)?;
        item.set_id(&content.coord.to_string());
        let image_box = self.div("gallery-item-image-container", IMAGE_BOX_STYLE)?;
        let img = self.img(&content.image_url, &content.title)?;
        image_box.append_child(&img)?;
        item.append_child(&image_box)?;

        let caption = self.div("gallery-item-caption", CAPTION_STYLE)?;
        let name = self.div("gallery-item-name", "")?;
        name.set_text_content(Some(&content.title));
        let number = self.div("gallery-item-number", "opacity:0.6;")?;
        number.set_text_content(Some(&content.caption));
        caption.append_child(&name)?;
        caption.append_child(&number)?;
        item.append_child(&caption)?;

        self.canvas.append_child(&item)?;
        Ok(item)
    }

    fn build(&self, spec: &ElementSpec) -> Result<HtmlElement, JsValue> {
        match spec {
            ElementSpec::Tile(content) => self.build_tile(content),
            ElementSpec::Overlay => {
                let overlay = self.div("gallery-overlay", OVERLAY_STYLE)?;
                self.container.append_child(&overlay)?;
                Ok(overlay)
            }
            ElementSpec::Floating { image_url, .. } => {
                let floating = self.div("gallery-expanded-item", FLOATING_STYLE)?;
                let img = self.img(image_url, "")?;
                floating.append_child(&img)?;
                self.container.append_child(&floating)?;
                Ok(floating)
            }
        }
    }

    fn style(&self, id: ElementId, props: &[(&str, String)]) {
        let Some(entry) = self.elements.get(&id) else {
            return;
        };
        let style = entry.el.style();
        for (name, value) in props {
            let _ = style.set_property(name, value);
        }
    }
}

impl Scene for DomScene {
    fn create(&mut self, spec: ElementSpec) -> ElementId {
        self.next_id += 1;
        let id = ElementId(self.next_id);
        match self.build(&spec) {
            Ok(el) => {
                self.elements.insert(id, DomElement { el, _click: None });
                match &spec {
                    ElementSpec::Tile(content) => {
                        self.set_position(id, content.position);
                        self.set_size(id, content.size);
                    }
                    ElementSpec::Floating { rect, .. } => {
                        self.set_position(id, Vec2::new(rect.x, rect.y));
                        self.set_size(id, Size::new(rect.width, rect.height));
                    }
                    ElementSpec::Overlay => {}
                }
            }
            Err(err) => cwarn(&format!("gallery element creation failed: {err:?}")),
        }
        id
    }

    fn set_position(&mut self, id: ElementId, position: Vec2) {
        self.style(id, &[
            ("left", format!("{}px", position.x)),
            ("top", format!("{}px", position.y)),
        ]);
    }

    fn set_size(&mut self, id: ElementId, size: Size) {
        self.style(id, &[
            ("width", format!("{}px", size.width)),
            ("height", format!("{}px", size.height)),
        ]);
    }

    fn set_opacity(&mut self, id: ElementId, opacity: f64) {
        // Only a visible overlay may swallow clicks.
        let pointer_events = if opacity > 0.01 { "auto" } else { "none" };
        let is_overlay = self
            .elements
            .get(&id)
            .is_some_and(|e| e.el.class_name() == "gallery-overlay");
        let mut props = vec![("opacity", opacity.to_string())];
        if is_overlay {
            props.push(("pointer-events", pointer_events.to_string()));
        }
        self.style(id, &props);
    }

    fn destroy(&mut self, id: ElementId) {
        if let Some(entry) = self.elements.remove(&id) {
            entry.el.remove();
        }
    }

    fn on_activate(&mut self, id: ElementId, activation: Activation) {
        let Some(entry) = self.elements.get_mut(&id) else {
            return;
        };
        let queue = self.queue.clone();
        entry._click = Some(EventListener::new(&entry.el, "click", move |_| {
            queue.borrow_mut().push(activation);
        }));
    }

    fn screen_rect(&self, id: ElementId) -> Rect {
        self.elements.get(&id).map_or_else(Rect::default, |entry| {
            let r = entry.el.get_bounding_client_rect();
            Rect::new(r.left(), r.top(), r.width(), r.height())
        })
    }

    fn set_canvas_offset(&mut self, offset: Vec2) {
        let _ = self
            .canvas
            .style()
            .set_property("transform", &format!("translate({}px, {}px)", offset.x, offset.y));
    }
}

/// Hides native page scrolling while alive; restores the previous values on drop.
pub struct ScrollLock {
    saved: Vec<(HtmlElement, String)>,
}

impl ScrollLock {
    pub fn acquire() -> Result<Self, GalleryError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(GalleryError::Dom("document"))?;
        let body = document.body().ok_or(GalleryError::Dom("body"))?;
        let root: HtmlElement = document
            .document_element()
            .and_then(|el| el.dyn_into().ok())
            .ok_or(GalleryError::Dom("documentElement"))?;
        let mut saved = Vec::with_capacity(2);
        for el in [body, root] {
            let style = el.style();
            let previous = style.get_property_value("overflow").unwrap_or_default();
            let _ = style.set_property("overflow", "hidden");
            saved.push((el, previous));
        }
        Ok(Self { saved })
    }
}

impl Drop for ScrollLock {
    fn drop(&mut self) {
        for (el, previous) in &self.saved {
            let _ = el.style().set_property("overflow", previous);
        }
    }
}
