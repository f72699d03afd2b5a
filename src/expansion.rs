//! Tile expand/collapse state machine.
//!
//! `Idle -> Expanding -> Expanded -> Collapsing -> Idle`, with
//! `Expanded -> NavigatingAway` as the exit towards a project page. Every
//! phase change is driven by animation completions, never by timers.

use crate::grid::TileCoord;
use crate::model::{GallerySettings, Rect, Size};
use crate::scene::{
    Activation, AnimationId, Animator, Easing, ElementId, ElementSpec, Props, Scene, Tween,
};
use crate::util::clog;
use crate::virtualizer::Materialized;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpansionPhase {
    Expanding,
    Expanded,
    Collapsing,
    NavigatingAway,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpansionState {
    pub tile: TileCoord,
    pub project_id: String,
    pub original_rect: Rect,
    pub target_rect: Rect,
    /// Height over width of the source tile.
    pub aspect: f64,
    pub phase: ExpansionPhase,
    pub floating: ElementId,
    // Animations the current phase waits for.
    pending: Vec<AnimationId>,
    // Tween currently moving the floating copy, if any.
    zoom: Option<AnimationId>,
}

/// What the owner has to act on after an animation completes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpansionEvent {
    Expanded,
    Collapsed,
    Navigate(String),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpansionTiming {
    pub expanded_scale: f64,
    pub overlay_opacity: f64,
    pub overlay_ease_ms: f64,
    pub zoom_ms: f64,
    pub sibling_restore_delay_ms: f64,
    pub resize_ms: f64,
    pub navigate_fade_ms: f64,
}

impl ExpansionTiming {
    pub fn from_settings(settings: &GallerySettings) -> Self {
        Self {
            expanded_scale: settings.expanded_scale,
            overlay_opacity: settings.overlay_opacity,
            overlay_ease_ms: settings.overlay_ease_ms,
            zoom_ms: settings.zoom_ms,
            sibling_restore_delay_ms: settings.sibling_restore_delay_ms,
            resize_ms: settings.resize_ms,
            navigate_fade_ms: settings.navigate_fade_ms,
        }
    }
}

/// Borrowed view of everything a transition touches.
pub struct Stage<'a> {
    pub scene: &'a mut dyn Scene,
    pub animator: &'a mut dyn Animator,
    pub overlay: ElementId,
    /// Every materialized tile except the expanded one.
    pub siblings: &'a [ElementId],
    pub viewport: Size,
}

#[derive(Debug)]
pub struct ExpansionMachine {
    timing: ExpansionTiming,
    state: Option<ExpansionState>,
}

impl ExpansionMachine {
    pub fn new(timing: ExpansionTiming) -> Self {
        Self {
            timing,
            state: None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> Option<&ExpansionState> {
        self.state.as_ref()
    }

    #[cfg(test)]
    pub fn phase(&self) -> Option<ExpansionPhase> {
        self.state.as_ref().map(|s| s.phase)
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_none()
    }

    /// Tile the virtualizer must keep alive.
    pub fn pinned(&self) -> Option<TileCoord> {
        self.state.as_ref().map(|s| s.tile)
    }

    fn target_rect(&self, viewport: Size, aspect: f64) -> Rect {
        Rect::centered(viewport, viewport.width * self.timing.expanded_scale, aspect)
    }

    /// Idle -> Expanding. Returns false (and does nothing) unless idle.
    pub fn activate(&mut self, tile: &Materialized, stage: Stage<'_>) -> bool {
        if self.state.is_some() {
            return false;
        }
        let t = self.timing;
        let content = &tile.content;
        let aspect = content.aspect();
        let original_rect = stage.scene.screen_rect(tile.element);
        let target_rect = self.target_rect(stage.viewport, aspect);

        let mut pending = Vec::with_capacity(stage.siblings.len() + 2);
        pending.push(stage.animator.animate(Tween::new(
            stage.overlay,
            Props::opacity(0.0),
            Props::opacity(t.overlay_opacity),
            t.overlay_ease_ms,
            Easing::Power2InOut,
        )));
        for &sibling in stage.siblings {
            pending.push(stage.animator.animate(Tween::new(
                sibling,
                Props::opacity(1.0),
                Props::opacity(0.0),
                t.overlay_ease_ms,
                Easing::Power2InOut,
            )));
        }
        let floating = stage.scene.create(ElementSpec::Floating {
            image_url: content.image_url.clone(),
            rect: original_rect,
        });
        stage.scene.on_activate(floating, Activation::Floating);
        let zoom = stage.animator.animate(Tween::new(
            floating,
            Props::rect(original_rect),
            Props::rect(target_rect),
            t.zoom_ms,
            Easing::Hop,
        ));
        pending.push(zoom);

        clog(&format!("expand tile {} ({})", content.coord, content.project_id));
        self.state = Some(ExpansionState {
            tile: content.coord,
            project_id: content.project_id.clone(),
            original_rect,
            target_rect,
            aspect,
            phase: ExpansionPhase::Expanding,
            floating,
            pending,
            zoom: Some(zoom),
        });
        true
    }

    /// Expanded -> Collapsing (overlay click or close key).
    pub fn close(&mut self, stage: Stage<'_>) -> bool {
        let t = self.timing;
        let Some(state) = self.state.as_mut().filter(|s| s.phase == ExpansionPhase::Expanded) else {
            return false;
        };
        if let Some(zoom) = state.zoom.take() {
            stage.animator.cancel(zoom);
        }
        let from = stage.scene.screen_rect(state.floating);
        let mut pending = Vec::with_capacity(stage.siblings.len() + 2);
        pending.push(stage.animator.animate(Tween::new(
            stage.overlay,
            Props::opacity(t.overlay_opacity),
            Props::opacity(0.0),
            t.overlay_ease_ms,
            Easing::Power2InOut,
        )));
        for &sibling in stage.siblings {
            pending.push(stage.animator.animate(
                Tween::new(
                    sibling,
                    Props::opacity(0.0),
                    Props::opacity(1.0),
                    t.overlay_ease_ms,
                    Easing::Power2InOut,
                )
                .delayed(t.sibling_restore_delay_ms),
            ));
        }
        let zoom = stage.animator.animate(Tween::new(
            state.floating,
            Props::rect(from),
            Props::rect(state.original_rect),
            t.zoom_ms,
            Easing::Hop,
        ));
        pending.push(zoom);
        state.zoom = Some(zoom);
        state.pending = pending;
        state.phase = ExpansionPhase::Collapsing;
        clog(&format!("collapse tile {}", state.tile));
        true
    }

    /// Expanded -> NavigatingAway (click on the floating image).
    pub fn open_project(&mut self, stage: Stage<'_>) -> bool {
        let t = self.timing;
        let Some(state) = self.state.as_mut().filter(|s| s.phase == ExpansionPhase::Expanded) else {
            return false;
        };
        if let Some(zoom) = state.zoom.take() {
            stage.animator.cancel(zoom);
        }
        state.pending = vec![
            stage.animator.animate(Tween::new(
                stage.overlay,
                Props::opacity(t.overlay_opacity),
                Props::opacity(0.0),
                t.navigate_fade_ms,
                Easing::Linear,
            )),
            stage.animator.animate(Tween::new(
                state.floating,
                Props::opacity(1.0),
                Props::opacity(0.0),
                t.navigate_fade_ms,
                Easing::Linear,
            )),
        ];
        state.phase = ExpansionPhase::NavigatingAway;
        true
    }

    /// Viewport changed: retarget the floating copy in place.
    pub fn resize(&mut self, stage: Stage<'_>) {
        let t = self.timing;
        let target_rect = self.target_rect(stage.viewport, self.state.as_ref().map_or(1.0, |s| s.aspect));
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if !matches!(state.phase, ExpansionPhase::Expanding | ExpansionPhase::Expanded)
            || state.target_rect == target_rect
        {
            return;
        }
        if let Some(zoom) = state.zoom.take() {
            stage.animator.cancel(zoom);
            state.pending.retain(|id| *id != zoom);
        }
        let from = stage.scene.screen_rect(state.floating);
        let zoom = stage.animator.animate(Tween::new(
            state.floating,
            Props::rect(from),
            Props::rect(target_rect),
            t.resize_ms,
            Easing::Power2Out,
        ));
        if state.phase == ExpansionPhase::Expanding {
            state.pending.push(zoom);
        }
        state.zoom = Some(zoom);
        state.target_rect = target_rect;
    }

    /// Feed one finished animation; returns an event when a phase completes.
    pub fn on_complete(&mut self, id: AnimationId, stage: Stage<'_>) -> Option<ExpansionEvent> {
        let state = self.state.as_mut()?;
        if state.zoom == Some(id) {
            state.zoom = None;
        }
        let before = state.pending.len();
        state.pending.retain(|p| *p != id);
        if state.pending.len() == before || !state.pending.is_empty() {
            return None;
        }
        match state.phase {
            ExpansionPhase::Expanding => {
                state.phase = ExpansionPhase::Expanded;
                Some(ExpansionEvent::Expanded)
            }
            ExpansionPhase::Expanded => None,
            ExpansionPhase::Collapsing => {
                stage.scene.destroy(state.floating);
                self.state = None;
                Some(ExpansionEvent::Collapsed)
            }
            ExpansionPhase::NavigatingAway => {
                // Siblings stay hidden so the grid does not flash back before the page changes.
                let project_id = state.project_id.clone();
                stage.scene.destroy(state.floating);
                self.state = None;
                clog(&format!("navigate to project {project_id}"));
                Some(ExpansionEvent::Navigate(project_id))
            }
        }
    }

    /// Forced teardown: cancel whatever is in flight and leave no elements behind.
    pub fn teardown(&mut self, stage: Stage<'_>) {
        let Some(state) = self.state.take() else {
            return;
        };
        for id in state.pending.iter().chain(state.zoom.iter()) {
            stage.animator.cancel(*id);
        }
        stage.scene.destroy(state.floating);
        stage.scene.set_opacity(stage.overlay, 0.0);
        for &sibling in stage.siblings {
            stage.scene.set_opacity(sibling, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridLayout, TileContent};
    use crate::model::{ProjectCatalog, ProjectRecord, Vec2};
    use crate::testing::MockScene;
    use crate::tween::Tweener;

    struct Rig {
        scene: MockScene,
        tweener: Tweener,
        overlay: ElementId,
        tile: Materialized,
        siblings: Vec<ElementId>,
        viewport: Size,
        machine: ExpansionMachine,
        clock: f64,
    }

    macro_rules! stage {
        ($rig:expr) => {
            Stage {
                scene: &mut $rig.scene,
                animator: &mut $rig.tweener,
                overlay: $rig.overlay,
                siblings: &$rig.siblings,
                viewport: $rig.viewport,
            }
        };
    }

    impl Rig {
        fn new() -> Self {
            let settings = GallerySettings::default();
            let layout = GridLayout::from_settings(&settings);
            let catalog = ProjectCatalog::new(vec![ProjectRecord {
                id: "project-001".into(),
                title: "One".into(),
                images: vec!["/img/project-001.jpg".into()],
                ..Default::default()
            }]);
            let mut scene = MockScene::default();
            let overlay = scene.create(ElementSpec::Overlay);
            let mut make = |col| {
                let content = TileContent::resolve(TileCoord::new(col, 0), &layout, &catalog)
                    .expect("tile content");
                let element = scene.create(ElementSpec::Tile(content.clone()));
                Materialized { element, content }
            };
            let tile = make(1);
            let siblings = vec![make(0).element, make(2).element];
            Self {
                scene,
                tweener: Tweener::new(),
                overlay,
                tile,
                siblings,
                viewport: Size::new(1000.0, 800.0),
                machine: ExpansionMachine::new(ExpansionTiming::from_settings(&settings)),
                clock: 0.0,
            }
        }

        fn activate(&mut self) -> bool {
            self.machine.activate(&self.tile, stage!(self))
        }

        /// Step frames of 16ms for `ms`, collecting machine events.
        fn run_for(&mut self, ms: f64) -> Vec<ExpansionEvent> {
            let mut events = Vec::new();
            let end = self.clock + ms;
            while self.clock <= end {
                let done = self.tweener.advance(self.clock, &mut self.scene);
                for id in done {
                    events.extend(self.machine.on_complete(id, stage!(self)));
                }
                self.clock += 16.0;
            }
            events
        }
    }

    #[test]
    fn expand_then_collapse_restores_the_grid() {
        let mut rig = Rig::new();
        rig.scene.set_canvas_offset(Vec2::new(-100.0, 20.0));
        assert!(rig.activate());
        let state = rig.machine.state().cloned().expect("expanding");
        assert_eq!(state.phase, ExpansionPhase::Expanding);
        assert_eq!(state.original_rect, Rect::new(365.0, 20.0, 400.0, 500.0));
        assert_eq!(state.target_rect, Rect::new(250.0, 87.5, 500.0, 625.0));
        assert_eq!(rig.machine.pinned(), Some(TileCoord::new(1, 0)));

        assert_eq!(rig.run_for(900.0), vec![ExpansionEvent::Expanded]);
        assert_eq!(rig.scene.opacity(rig.siblings[0]), Some(0.0));
        assert_eq!(rig.scene.opacity(rig.overlay), Some(0.9));
        let floating = rig.scene.floating().expect("floating copy");
        assert_eq!(rig.scene.screen_rect(floating), state.target_rect);

        assert!(rig.machine.close(stage!(rig)));
        assert_eq!(rig.machine.phase(), Some(ExpansionPhase::Collapsing));
        assert_eq!(rig.run_for(1200.0), vec![ExpansionEvent::Collapsed]);
        assert!(rig.machine.is_idle());
        assert!(rig.scene.floating().is_none());
        for sibling in &rig.siblings {
            assert_eq!(rig.scene.opacity(*sibling), Some(1.0));
        }
        assert_eq!(rig.scene.opacity(rig.overlay), Some(0.0));
    }

    #[test]
    fn second_activation_is_rejected() {
        let mut rig = Rig::new();
        assert!(rig.activate());
        assert!(!rig.activate());
        assert_eq!(rig.scene.tiles().len(), 3);
        rig.run_for(900.0);
        assert!(!rig.activate());
    }

    #[test]
    fn close_and_open_require_expanded() {
        let mut rig = Rig::new();
        assert!(!rig.machine.close(stage!(rig)));
        assert!(rig.activate());
        assert!(!rig.machine.close(stage!(rig)));
        assert!(!rig.machine.open_project(stage!(rig)));
        assert_eq!(rig.machine.phase(), Some(ExpansionPhase::Expanding));
    }

    #[test]
    fn open_project_navigates_after_teardown() {
        let mut rig = Rig::new();
        rig.activate();
        rig.run_for(900.0);
        assert!(rig.machine.open_project(stage!(rig)));
        assert_eq!(rig.machine.phase(), Some(ExpansionPhase::NavigatingAway));
        let events = rig.run_for(300.0);
        assert_eq!(events, vec![ExpansionEvent::Navigate("project-001".into())]);
        assert!(rig.scene.floating().is_none());
        assert_eq!(rig.scene.opacity(rig.overlay), Some(0.0));
        for &sibling in &rig.siblings {
            assert_eq!(rig.scene.opacity(sibling), Some(0.0));
        }
    }

    #[test]
    fn resize_while_expanded_retargets() {
        let mut rig = Rig::new();
        rig.activate();
        rig.run_for(900.0);
        rig.viewport = Size::new(600.0, 800.0);
        rig.machine.resize(stage!(rig));
        let state = rig.machine.state().cloned().expect("still expanded");
        assert_eq!(state.phase, ExpansionPhase::Expanded);
        assert_eq!(state.target_rect, Rect::new(150.0, 212.5, 300.0, 375.0));
        assert!(rig.run_for(400.0).is_empty());
        let floating = rig.scene.floating().expect("floating copy");
        assert_eq!(rig.scene.screen_rect(floating), state.target_rect);
    }

    #[test]
    fn resize_to_the_same_viewport_is_ignored() {
        let mut rig = Rig::new();
        rig.activate();
        rig.run_for(900.0);
        assert!(rig.tweener.is_idle());
        rig.machine.resize(stage!(rig));
        assert!(rig.tweener.is_idle());
    }

    #[test]
    fn resize_mid_expansion_keeps_the_sequence() {
        let mut rig = Rig::new();
        rig.activate();
        rig.run_for(100.0);
        rig.viewport = Size::new(800.0, 800.0);
        rig.machine.resize(stage!(rig));
        assert_eq!(rig.machine.phase(), Some(ExpansionPhase::Expanding));
        assert_eq!(rig.run_for(900.0), vec![ExpansionEvent::Expanded]);
    }

    #[test]
    fn teardown_mid_transition_leaves_nothing() {
        let mut rig = Rig::new();
        rig.activate();
        rig.run_for(200.0);
        rig.machine.teardown(stage!(rig));
        assert!(rig.machine.is_idle());
        assert!(rig.scene.floating().is_none());
        assert!(rig.tweener.is_idle());
    }
}
