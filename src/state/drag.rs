use crate::model::{GallerySettings, Vec2};
use crate::state::ViewportState;

/// One pointer or touch sample, already converted to client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPoint {
    pub x: f64,
    pub y: f64,
    pub time_ms: f64,
}

impl PointerPoint {
    pub fn new(x: f64, y: f64, time_ms: f64) -> Self {
        Self { x, y, time_ms }
    }

    fn pos(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

// Single-pointer drag session, shared by mouse and touch input.
#[derive(Debug, Clone, Copy)]
struct PointerSession {
    origin: Vec2,
    last: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragTuning {
    pub tap_threshold_px: f64,
    pub min_dt_ms: f64,
    pub momentum_threshold: f64,
    pub momentum_factor: f64,
}

impl DragTuning {
    pub fn from_settings(settings: &GallerySettings) -> Self {
        Self {
            tap_threshold_px: settings.tap_threshold_px,
            min_dt_ms: settings.min_drag_dt_ms,
            momentum_threshold: settings.momentum_threshold,
            momentum_factor: settings.momentum_factor,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DragController {
    tuning: DragTuning,
    session: Option<PointerSession>,
    moved: bool,
    enabled: bool,
}

impl DragController {
    pub fn new(tuning: DragTuning) -> Self {
        Self {
            tuning,
            session: None,
            moved: false,
            enabled: true,
        }
    }

    pub fn can_drag(&self) -> bool {
        self.enabled
    }

    /// Disabling also drops any session in flight, without a fling.
    pub fn set_enabled(&mut self, enabled: bool, vp: &mut ViewportState) {
        self.enabled = enabled;
        if !enabled {
            self.session = None;
            vp.is_dragging = false;
            vp.velocity = Vec2::ZERO;
        }
    }

    /// True while the gallery should swallow touch scrolling.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// A click right after a real drag is not a tap.
    pub fn suppresses_tap(&self, vp: &ViewportState) -> bool {
        self.moved || vp.is_dragging
    }

    pub fn start(&mut self, point: PointerPoint, vp: &mut ViewportState) {
        if !self.enabled {
            return;
        }
        self.session = Some(PointerSession {
            origin: point.pos(),
            last: point.pos(),
        });
        self.moved = false;
        vp.is_dragging = true;
        vp.velocity = Vec2::ZERO;
        vp.last_drag_time = point.time_ms;
    }

    pub fn move_to(&mut self, point: PointerPoint, vp: &mut ViewportState) {
        if !self.enabled {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let pos = point.pos();
        let delta = pos - session.last;
        let travelled = pos - session.origin;
        if travelled.x.abs() > self.tuning.tap_threshold_px
            || travelled.y.abs() > self.tuning.tap_threshold_px
        {
            self.moved = true;
        }
        let dt = (point.time_ms - vp.last_drag_time).max(self.tuning.min_dt_ms);
        vp.last_drag_time = point.time_ms;
        vp.velocity = Vec2::new(delta.x / dt, delta.y / dt);
        vp.target_offset += delta;
        session.last = pos;
    }

    /// Ends the session; a fast enough release adds one momentum impulse.
    pub fn end(&mut self, vp: &mut ViewportState) {
        if self.session.take().is_none() {
            return;
        }
        vp.is_dragging = false;
        if !self.enabled {
            return;
        }
        let v = vp.velocity;
        if v.x.abs() > self.tuning.momentum_threshold || v.y.abs() > self.tuning.momentum_threshold {
            vp.target_offset += v * self.tuning.momentum_factor;
        }
        vp.velocity = Vec2::ZERO;
    }
}
