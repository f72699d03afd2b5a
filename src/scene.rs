//! Rendering and animation seams.
//!
//! The gallery core never touches a concrete rendering technology. It talks to a
//! [`Scene`] through opaque [`ElementId`] handles and drives motion through an
//! [`Animator`]. The DOM implementation lives in `dom.rs`; tests use a mock.

use crate::grid::{TileContent, TileCoord};
use crate::model::{Rect, Size, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(pub u64);

/// What to build. Tiles live on the translated canvas layer; the overlay and
/// the floating copy live on the fixed viewport layer.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementSpec {
    Tile(TileContent),
    Overlay,
    Floating { image_url: String, rect: Rect },
}

/// Element activations delivered back to the gallery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    Tile(TileCoord),
    Overlay,
    Floating,
}

pub trait Scene {
    fn create(&mut self, spec: ElementSpec) -> ElementId;
    fn set_position(&mut self, id: ElementId, position: Vec2);
    fn set_size(&mut self, id: ElementId, size: Size);
    fn set_opacity(&mut self, id: ElementId, opacity: f64);
    fn destroy(&mut self, id: ElementId);
    /// Route clicks on `id` back to the gallery as `activation`.
    fn on_activate(&mut self, id: ElementId, activation: Activation);
    /// Current on-screen rectangle, in viewport pixels.
    fn screen_rect(&self, id: ElementId) -> Rect;
    /// Translate the whole tile layer.
    fn set_canvas_offset(&mut self, offset: Vec2);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    Linear,
    Power2InOut,
    Power2Out,
    /// cubic-bezier(0.9, 0, 0.1, 1): slow start, fast middle, slow landing.
    Hop,
}

/// Animatable properties. Only fields set on both ends of a tween interpolate;
/// a field set only on the destination is applied when the tween finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Props {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub opacity: Option<f64>,
}

impl Props {
    pub fn rect(rect: Rect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            opacity: None,
        }
    }

    pub fn opacity(opacity: f64) -> Self {
        Self {
            opacity: Some(opacity),
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub target: ElementId,
    pub from: Props,
    pub to: Props,
    pub duration_ms: f64,
    pub delay_ms: f64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(target: ElementId, from: Props, to: Props, duration_ms: f64, easing: Easing) -> Self {
        Self {
            target,
            from,
            to,
            duration_ms,
            delay_ms: 0.0,
            easing,
        }
    }

    pub fn delayed(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// Asynchronous property animation. Completion is reported by id from
/// [`Animator::advance`]; cancelled animations never complete.
pub trait Animator {
    fn animate(&mut self, tween: Tween) -> AnimationId;
    fn cancel(&mut self, id: AnimationId);
    fn cancel_all(&mut self);
    /// Apply the state of every running tween at `now_ms` and return the ids
    /// that finished during this step.
    fn advance(&mut self, now_ms: f64, scene: &mut dyn Scene) -> Vec<AnimationId>;
}
