use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::error::GalleryError;

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Self-rescheduling `requestAnimationFrame` loop. Dropping it cancels the
/// pending frame and breaks the closure's reference to itself.
pub struct FrameLoop {
    window: web_sys::Window,
    raf_id: Rc<Cell<Option<i32>>>,
    closure: Rc<RefCell<Option<FrameCallback>>>,
}

impl FrameLoop {
    pub fn start(mut on_frame: impl FnMut(f64) + 'static) -> Result<Self, GalleryError> {
        let window = web_sys::window().ok_or(GalleryError::Dom("window"))?;
        let raf_id = Rc::new(Cell::new(None));
        let closure: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        {
            let raf_id = raf_id.clone();
            let closure_loop = closure.clone();
            let window_loop = window.clone();
            *closure.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
                on_frame(timestamp);
                if let Some(cb) = closure_loop.borrow().as_ref() {
                    raf_id.set(window_loop.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
                }
            }) as Box<dyn FnMut(f64)>));
        }
        let first = closure
            .borrow()
            .as_ref()
            .map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()));
        match first {
            Some(Ok(id)) => raf_id.set(Some(id)),
            _ => return Err(GalleryError::Dom("requestAnimationFrame")),
        }
        Ok(Self {
            window,
            raf_id,
            closure,
        })
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if let Some(id) = self.raf_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        self.closure.borrow_mut().take();
    }
}
