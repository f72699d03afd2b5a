pub mod drag;
pub mod viewport;

pub use drag::{DragController, DragTuning, PointerPoint};
pub use viewport::ViewportState;
