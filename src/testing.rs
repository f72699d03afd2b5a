//! Test doubles for the scene and navigation seams.

use std::collections::{BTreeMap, HashMap};

use crate::gallery::Navigator;
use crate::grid::TileCoord;
use crate::model::{Rect, Size, Vec2};
use crate::scene::{Activation, ElementId, ElementSpec, Scene};

/// In-memory scene that records what the gallery asked for.
#[derive(Debug, Default)]
pub struct MockScene {
    next_id: u64,
    live: BTreeMap<ElementId, ElementSpec>,
    positions: HashMap<ElementId, Vec2>,
    sizes: HashMap<ElementId, Size>,
    opacities: HashMap<ElementId, f64>,
    activations: HashMap<ElementId, Activation>,
    pub canvas_offset: Vec2,
}

impl MockScene {
    pub fn opacity(&self, id: ElementId) -> Option<f64> {
        self.opacities.get(&id).copied()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn tiles(&self) -> Vec<(ElementId, TileCoord)> {
        self.live
            .iter()
            .filter_map(|(id, spec)| match spec {
                ElementSpec::Tile(content) => Some((*id, content.coord)),
                _ => None,
            })
            .collect()
    }

    pub fn floating(&self) -> Option<ElementId> {
        self.live
            .iter()
            .find_map(|(id, spec)| matches!(spec, ElementSpec::Floating { .. }).then_some(*id))
    }

    pub fn activation_of(&self, id: ElementId) -> Option<Activation> {
        self.activations.get(&id).copied()
    }
}

impl Scene for MockScene {
    fn create(&mut self, spec: ElementSpec) -> ElementId {
        self.next_id += 1;
        let id = ElementId(self.next_id);
        match &spec {
            ElementSpec::Tile(content) => {
                self.positions.insert(id, content.position);
                self.sizes.insert(id, content.size);
            }
            ElementSpec::Floating { rect, .. } => {
                self.positions.insert(id, Vec2::new(rect.x, rect.y));
                self.sizes.insert(id, Size::new(rect.width, rect.height));
            }
            ElementSpec::Overlay => {}
        }
        self.live.insert(id, spec);
        id
    }

    fn set_position(&mut self, id: ElementId, position: Vec2) {
        self.positions.insert(id, position);
    }

    fn set_size(&mut self, id: ElementId, size: Size) {
        self.sizes.insert(id, size);
    }

    fn set_opacity(&mut self, id: ElementId, opacity: f64) {
        self.opacities.insert(id, opacity);
    }

    fn destroy(&mut self, id: ElementId) {
        self.live.remove(&id);
        self.activations.remove(&id);
    }

    fn on_activate(&mut self, id: ElementId, activation: Activation) {
        self.activations.insert(id, activation);
    }

    fn screen_rect(&self, id: ElementId) -> Rect {
        let position = self.positions.get(&id).copied().unwrap_or_default();
        let size = self.sizes.get(&id).copied().unwrap_or_default();
        let origin = match self.live.get(&id) {
            Some(ElementSpec::Tile(_)) => position + self.canvas_offset,
            _ => position,
        };
        Rect::new(origin.x, origin.y, size.width, size.height)
    }

    fn set_canvas_offset(&mut self, offset: Vec2) {
        self.canvas_offset = offset;
    }
}

/// Navigator that remembers every project it was sent to.
#[derive(Clone, Debug, Default)]
pub struct RecordingNavigator {
    pub visited: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
}

impl Navigator for RecordingNavigator {
    fn navigate_to_project(&mut self, id: &str) {
        self.visited.borrow_mut().push(id.to_string());
    }
}
