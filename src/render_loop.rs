//! Per-frame easing of the canvas offset and virtualization throttling.

use crate::model::{GallerySettings, Vec2};
use crate::state::ViewportState;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    pub offset: Vec2,
    /// The visible range should be recomputed this frame.
    pub virtualize: bool,
}

#[derive(Debug, Clone)]
pub struct RenderLoop {
    ease: f64,
    distance_px: f64,
    interval_ms: f64,
    last_offset: Vec2,
    last_run_ms: f64,
}

impl RenderLoop {
    pub fn new(settings: &GallerySettings) -> Self {
        Self {
            ease: settings.drag_ease,
            distance_px: settings.virtualize_distance_px,
            interval_ms: settings.virtualize_interval_ms,
            last_offset: Vec2::ZERO,
            last_run_ms: 0.0,
        }
    }

    /// Exponential smoothing of `current_offset` toward `target_offset`.
    /// The grid holds still while dragging is disabled (a tile is expanded),
    /// so the expanded tile's captured rectangle stays valid for the collapse.
    pub fn tick(&mut self, now_ms: f64, vp: &mut ViewportState, can_drag: bool) -> Option<FrameTick> {
        if !can_drag {
            return None;
        }
        vp.current_offset += (vp.target_offset - vp.current_offset) * self.ease;
        let moved = (vp.current_offset - self.last_offset).length();
        let virtualize = moved > self.distance_px || now_ms - self.last_run_ms > self.interval_ms;
        if virtualize {
            self.mark_virtualized(now_ms, vp.current_offset);
        }
        Some(FrameTick {
            offset: vp.current_offset,
            virtualize,
        })
    }

    /// Reset both throttle counters after an out-of-band virtualization pass.
    pub fn mark_virtualized(&mut self, now_ms: f64, offset: Vec2) {
        self.last_offset = offset;
        self.last_run_ms = now_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_eases_toward_target() {
        let mut rl = RenderLoop::new(&GallerySettings::default());
        let mut vp = ViewportState {
            target_offset: Vec2::new(1000.0, -200.0),
            ..Default::default()
        };
        let tick = rl.tick(0.0, &mut vp, true).expect("running");
        assert_eq!(tick.offset, Vec2::new(75.0, -15.0));
        for i in 1..400 {
            rl.tick(i as f64 * 16.0, &mut vp, true);
        }
        assert!((vp.current_offset - vp.target_offset).length() < 0.01);
        assert_eq!(vp.target_offset, Vec2::new(1000.0, -200.0));
    }

    #[test]
    fn virtualization_is_throttled_by_distance_and_time() {
        let mut rl = RenderLoop::new(&GallerySettings::default());
        rl.mark_virtualized(1000.0, Vec2::ZERO);
        let mut vp = ViewportState::default();
        assert_eq!(rl.tick(1016.0, &mut vp, true).map(|t| t.virtualize), Some(false));
        assert_eq!(rl.tick(1121.0, &mut vp, true).map(|t| t.virtualize), Some(true));
        assert_eq!(rl.tick(1130.0, &mut vp, true).map(|t| t.virtualize), Some(false));

        vp.target_offset = Vec2::new(0.0, 4000.0);
        assert_eq!(rl.tick(1140.0, &mut vp, true).map(|t| t.virtualize), Some(true));
    }

    #[test]
    fn frozen_while_drag_disabled() {
        let mut rl = RenderLoop::new(&GallerySettings::default());
        let mut vp = ViewportState {
            target_offset: Vec2::new(500.0, 0.0),
            ..Default::default()
        };
        assert!(rl.tick(0.0, &mut vp, false).is_none());
        assert_eq!(vp.current_offset, Vec2::ZERO);
    }
}
