//! The infinite tile gallery: single owner of all gallery state.
//!
//! Field ownership doubles as the locking discipline: `ViewportState` offsets
//! are split between the drag controller (target) and the render loop
//! (current), the materialized set belongs to the virtualizer, and the
//! expansion state to its machine. Input handlers only ever write state;
//! visible effects happen in [`Gallery::frame`].

use std::rc::Rc;

#[cfg(test)]
use crate::expansion::ExpansionPhase;
use crate::expansion::{ExpansionEvent, ExpansionMachine, ExpansionTiming, Stage};
use crate::grid::{GridLayout, TileCoord};
use crate::model::{GallerySettings, ProjectCatalog, Size};
use crate::render_loop::RenderLoop;
use crate::scene::{Activation, AnimationId, Animator, ElementId, ElementSpec, Scene};
use crate::state::{DragController, DragTuning, PointerPoint, ViewportState};
use crate::util::clog;
use crate::virtualizer::{ReconcileStats, Virtualizer, visible_range};

/// Receives the project id once the expanded tile has been fully torn down.
pub trait Navigator {
    fn navigate_to_project(&mut self, id: &str);
}

pub struct Gallery<S: Scene, A: Animator> {
    settings: GallerySettings,
    layout: GridLayout,
    catalog: Rc<ProjectCatalog>,
    viewport_size: Size,
    viewport: ViewportState,
    drag: DragController,
    virtualizer: Virtualizer,
    render: RenderLoop,
    expansion: ExpansionMachine,
    scene: S,
    animator: A,
    overlay: ElementId,
    navigator: Box<dyn Navigator>,
    torn_down: bool,
}

impl<S: Scene, A: Animator> Gallery<S, A> {
    pub fn mount(
        settings: GallerySettings,
        catalog: Rc<ProjectCatalog>,
        viewport_size: Size,
        mut scene: S,
        animator: A,
        navigator: Box<dyn Navigator>,
        now_ms: f64,
    ) -> Self {
        let overlay = scene.create(ElementSpec::Overlay);
        scene.set_opacity(overlay, 0.0);
        scene.on_activate(overlay, Activation::Overlay);

        let mut viewport = ViewportState::default();
        let mut drag = DragController::new(DragTuning::from_settings(&settings));
        if catalog.is_empty() {
            drag.set_enabled(false, &mut viewport);
        }
        let mut gallery = Self {
            layout: GridLayout::from_settings(&settings),
            render: RenderLoop::new(&settings),
            expansion: ExpansionMachine::new(ExpansionTiming::from_settings(&settings)),
            settings,
            catalog,
            viewport_size,
            viewport,
            drag,
            virtualizer: Virtualizer::new(),
            scene,
            animator,
            overlay,
            navigator,
            torn_down: false,
        };
        gallery.virtualize();
        gallery.render.mark_virtualized(now_ms, gallery.viewport.current_offset);
        clog(&format!(
            "gallery mounted: {} projects, {} tiles",
            gallery.catalog.len(),
            gallery.virtualizer.len()
        ));
        gallery
    }

    #[cfg(test)]
    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn can_drag(&self) -> bool {
        self.drag.can_drag()
    }

    /// A pointer session is in progress; touch scrolling must be suppressed.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    #[cfg(test)]
    pub fn expansion_phase(&self) -> Option<ExpansionPhase> {
        self.expansion.phase()
    }

    #[cfg(test)]
    pub fn expansion(&self) -> &ExpansionMachine {
        &self.expansion
    }

    #[cfg(test)]
    pub fn materialized(&self) -> &Virtualizer {
        &self.virtualizer
    }

    #[cfg(test)]
    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn pointer_down(&mut self, point: PointerPoint) {
        self.drag.start(point, &mut self.viewport);
    }

    pub fn pointer_move(&mut self, point: PointerPoint) {
        self.drag.move_to(point, &mut self.viewport);
    }

    pub fn pointer_up(&mut self) {
        self.drag.end(&mut self.viewport);
    }

    fn siblings(&self) -> Vec<ElementId> {
        let pinned = self.expansion.pinned();
        match pinned.and_then(|coord| self.virtualizer.get(coord)) {
            Some(active) => self
                .virtualizer
                .elements()
                .filter(|e| *e != active.element)
                .collect(),
            None => self.virtualizer.elements().collect(),
        }
    }

    pub fn activate(&mut self, activation: Activation) {
        if self.torn_down {
            return;
        }
        match activation {
            Activation::Tile(coord) => self.activate_tile(coord),
            Activation::Overlay => self.close(),
            Activation::Floating => {
                let siblings = self.siblings();
                self.expansion.open_project(Stage {
                    scene: &mut self.scene,
                    animator: &mut self.animator,
                    overlay: self.overlay,
                    siblings: &siblings,
                    viewport: self.viewport_size,
                });
            }
        }
    }

    fn activate_tile(&mut self, coord: TileCoord) {
        if self.drag.suppresses_tap(&self.viewport) || !self.expansion.is_idle() {
            return;
        }
        let Some(tile) = self.virtualizer.get(coord) else {
            return;
        };
        let siblings: Vec<ElementId> = self
            .virtualizer
            .elements()
            .filter(|e| *e != tile.element)
            .collect();
        let started = self.expansion.activate(tile, Stage {
            scene: &mut self.scene,
            animator: &mut self.animator,
            overlay: self.overlay,
            siblings: &siblings,
            viewport: self.viewport_size,
        });
        if started {
            self.drag.set_enabled(false, &mut self.viewport);
        }
    }

    /// Designated close action (overlay click, Escape).
    pub fn close(&mut self) {
        let siblings = self.siblings();
        self.expansion.close(Stage {
            scene: &mut self.scene,
            animator: &mut self.animator,
            overlay: self.overlay,
            siblings: &siblings,
            viewport: self.viewport_size,
        });
    }

    pub fn resize(&mut self, viewport_size: Size) {
        if self.torn_down {
            return;
        }
        self.viewport_size = viewport_size;
        if self.expansion.is_idle() {
            self.virtualize();
            return;
        }
        let siblings = self.siblings();
        self.expansion.resize(Stage {
            scene: &mut self.scene,
            animator: &mut self.animator,
            overlay: self.overlay,
            siblings: &siblings,
            viewport: viewport_size,
        });
    }

    /// One display refresh: finish animations, ease the canvas, virtualize if due.
    pub fn frame(&mut self, now_ms: f64) {
        if self.torn_down {
            return;
        }
        let finished = self.animator.advance(now_ms, &mut self.scene);
        for id in finished {
            self.animation_finished(id);
        }
        if let Some(tick) = self.render.tick(now_ms, &mut self.viewport, self.drag.can_drag()) {
            self.scene.set_canvas_offset(tick.offset);
            if tick.virtualize {
                self.virtualize();
            }
        }
    }

    fn animation_finished(&mut self, id: AnimationId) {
        let siblings = self.siblings();
        let event = self.expansion.on_complete(id, Stage {
            scene: &mut self.scene,
            animator: &mut self.animator,
            overlay: self.overlay,
            siblings: &siblings,
            viewport: self.viewport_size,
        });
        match event {
            Some(ExpansionEvent::Expanded) | None => {}
            Some(ExpansionEvent::Collapsed) => {
                self.drag.set_enabled(true, &mut self.viewport);
            }
            Some(ExpansionEvent::Navigate(project_id)) => {
                self.drag.set_enabled(true, &mut self.viewport);
                self.navigator.navigate_to_project(&project_id);
            }
        }
    }

    /// Reconcile the materialized tiles against one snapshot of the viewport.
    pub fn virtualize(&mut self) -> ReconcileStats {
        let range = visible_range(
            self.viewport.current_offset,
            self.viewport_size,
            self.layout.cell,
            self.settings.buffer_zone,
            self.settings.look_ahead,
        );
        self.virtualizer.reconcile(
            range,
            &self.layout,
            &self.catalog,
            self.expansion.pinned(),
            &mut self.scene,
        )
    }

    /// Cancel everything in flight and remove every element. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        let siblings = self.siblings();
        self.expansion.teardown(Stage {
            scene: &mut self.scene,
            animator: &mut self.animator,
            overlay: self.overlay,
            siblings: &siblings,
            viewport: self.viewport_size,
        });
        self.animator.cancel_all();
        self.virtualizer.clear(&mut self.scene);
        self.scene.destroy(self.overlay);
        self.torn_down = true;
        clog("gallery torn down");
    }
}
