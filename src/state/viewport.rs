use crate::model::Vec2;

// Scroll state of the gallery canvas.
// `current_offset` is written only by the render loop; `target_offset`,
// `velocity`, `is_dragging` and `last_drag_time` only by the drag controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportState {
    pub current_offset: Vec2,
    pub target_offset: Vec2,
    /// Pixels per millisecond, from the last drag sample.
    pub velocity: Vec2,
    pub is_dragging: bool,
    pub last_drag_time: f64,
}
