//! Frame-stepped tween engine, the default [`Animator`].
//!
//! Tweens start on the first `advance` after they are registered, so creating
//! one between frames never skips its opening values.

use crate::model::{Size, Vec2};
use crate::scene::{AnimationId, Animator, Easing, Props, Scene, Tween};

#[derive(Debug)]
struct Running {
    id: AnimationId,
    tween: Tween,
    started_at: Option<f64>,
}

#[derive(Debug, Default)]
pub struct Tweener {
    next_id: u64,
    running: Vec<Running>,
}

impl Tweener {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }
}

impl Animator for Tweener {
    fn animate(&mut self, tween: Tween) -> AnimationId {
        self.next_id += 1;
        let id = AnimationId(self.next_id);
        self.running.push(Running {
            id,
            tween,
            started_at: None,
        });
        id
    }

    fn cancel(&mut self, id: AnimationId) {
        self.running.retain(|r| r.id != id);
    }

    fn cancel_all(&mut self) {
        self.running.clear();
    }

    fn advance(&mut self, now_ms: f64, scene: &mut dyn Scene) -> Vec<AnimationId> {
        let mut finished = Vec::new();
        self.running.retain_mut(|r| {
            let start = *r.started_at.get_or_insert(now_ms);
            let elapsed = now_ms - start - r.tween.delay_ms;
            if elapsed < 0.0 {
                return true;
            }
            let t = if r.tween.duration_ms > 0.0 {
                (elapsed / r.tween.duration_ms).min(1.0)
            } else {
                1.0
            };
            let done = t >= 1.0;
            apply(&mut *scene, &r.tween, ease(r.tween.easing, t), done);
            if done {
                finished.push(r.id);
            }
            !done
        });
        finished
    }
}

fn apply(scene: &mut dyn Scene, tween: &Tween, k: f64, done: bool) {
    let lerp = |from: Option<f64>, to: Option<f64>| match (from, to) {
        (Some(a), Some(b)) => Some(if done { b } else { a + (b - a) * k }),
        (None, Some(b)) if done => Some(b),
        _ => None,
    };
    let Props { x, y, width, height, opacity } = tween.to;
    let from = tween.from;
    if let (Some(x), Some(y)) = (lerp(from.x, x), lerp(from.y, y)) {
        scene.set_position(tween.target, Vec2::new(x, y));
    }
    if let (Some(w), Some(h)) = (lerp(from.width, width), lerp(from.height, height)) {
        scene.set_size(tween.target, Size::new(w, h));
    }
    if let Some(o) = lerp(from.opacity, opacity) {
        scene.set_opacity(tween.target, o);
    }
}

pub fn ease(easing: Easing, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    match easing {
        Easing::Linear => t,
        Easing::Power2Out => 1.0 - (1.0 - t).powi(3),
        Easing::Power2InOut => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
            }
        }
        Easing::Hop => cubic_bezier(0.9, 0.0, 0.1, 1.0, t),
    }
}

/// CSS-style cubic-bezier timing function through (0,0), (x1,y1), (x2,y2), (1,1).
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, t: f64) -> f64 {
    let curve = |a: f64, b: f64, s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * a + 3.0 * inv * s * s * b + s * s * s
    };
    // Bisection on x; the curve is monotonic in x for control points in [0, 1].
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    let mut s = t;
    for _ in 0..40 {
        let x = curve(x1, x2, s);
        if (x - t).abs() < 1e-7 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    curve(y1, y2, s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ElementId;
    use crate::testing::MockScene;

    #[test]
    fn easings_hit_their_endpoints() {
        for easing in [Easing::Linear, Easing::Power2InOut, Easing::Power2Out, Easing::Hop] {
            assert!(ease(easing, 0.0).abs() < 1e-6, "{easing:?}");
            assert!((ease(easing, 1.0) - 1.0).abs() < 1e-6, "{easing:?}");
        }
        assert!((ease(Easing::Hop, 0.5) - 0.5).abs() < 1e-3);
        assert!(ease(Easing::Hop, 0.2) < 0.05);
        assert!(ease(Easing::Power2InOut, 0.25) < 0.25);
    }

    #[test]
    fn tween_interpolates_and_completes_once() {
        let mut scene = MockScene::default();
        let el = ElementId(1);
        let mut tweener = Tweener::new();
        let id = tweener.animate(Tween::new(
            el,
            Props::opacity(0.0),
            Props::opacity(1.0),
            100.0,
            Easing::Linear,
        ));
        assert!(tweener.advance(1000.0, &mut scene).is_empty());
        assert_eq!(scene.opacity(el), Some(0.0));
        assert!(tweener.advance(1050.0, &mut scene).is_empty());
        assert_eq!(scene.opacity(el), Some(0.5));
        assert_eq!(tweener.advance(1100.0, &mut scene), vec![id]);
        assert_eq!(scene.opacity(el), Some(1.0));
        assert!(tweener.advance(1200.0, &mut scene).is_empty());
        assert!(tweener.is_idle());
    }

    #[test]
    fn delayed_and_cancelled_tweens() {
        let mut scene = MockScene::default();
        let el = ElementId(7);
        let mut tweener = Tweener::new();
        let delayed = tweener.animate(
            Tween::new(el, Props::opacity(0.0), Props::opacity(1.0), 100.0, Easing::Linear)
                .delayed(50.0),
        );
        let cancelled = tweener.animate(Tween::new(
            ElementId(8),
            Props::opacity(1.0),
            Props::opacity(0.0),
            10.0,
            Easing::Linear,
        ));
        tweener.cancel(cancelled);
        tweener.advance(0.0, &mut scene);
        assert_eq!(scene.opacity(el), None);
        assert!(tweener.advance(100.0, &mut scene).is_empty());
        assert_eq!(scene.opacity(el), Some(0.5));
        assert_eq!(tweener.advance(150.0, &mut scene), vec![delayed]);
        assert_eq!(scene.opacity(ElementId(8)), None);
    }
}
