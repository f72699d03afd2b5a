//! Viewport virtualization: only tiles on or near the screen exist as elements.

use std::collections::{HashMap, HashSet};

use crate::grid::{GridLayout, TileContent, TileCoord};
use crate::model::{ProjectCatalog, Size, Vec2};
use crate::scene::{Activation, ElementId, ElementSpec, Scene};

/// Inclusive column/row range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRange {
    pub start_col: i64,
    pub end_col: i64,
    pub start_row: i64,
    pub end_row: i64,
}

impl TileRange {
    #[cfg(test)]
    pub fn contains(&self, coord: TileCoord) -> bool {
        (self.start_col..=self.end_col).contains(&coord.col)
            && (self.start_row..=self.end_row).contains(&coord.row)
    }

    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (self.start_row..=self.end_row)
            .flat_map(move |row| (self.start_col..=self.end_col).map(move |col| TileCoord::new(col, row)))
    }
}

/// Range covering `viewport * (1 + buffer)` around the scroll position, stretched
/// by `look_ahead` on the trailing side so fast drags do not show pop-in.
pub fn visible_range(offset: Vec2, viewport: Size, cell: Size, buffer: f64, look_ahead: f64) -> TileRange {
    let view_w = viewport.width * (1.0 + buffer);
    let view_h = viewport.height * (1.0 + buffer);
    TileRange {
        start_col: ((-offset.x - view_w / 2.0) / cell.width).floor() as i64,
        end_col: ((-offset.x + view_w * look_ahead) / cell.width).ceil() as i64,
        start_row: ((-offset.y - view_h / 2.0) / cell.height).floor() as i64,
        end_row: ((-offset.y + view_h * look_ahead) / cell.height).ceil() as i64,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Materialized {
    pub element: ElementId,
    pub content: TileContent,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub created: usize,
    pub destroyed: usize,
}

/// Owns the materialized-tile set. Nothing else adds or removes tile elements.
#[derive(Debug, Default)]
pub struct Virtualizer {
    tiles: HashMap<TileCoord, Materialized>,
}

impl Virtualizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, coord: TileCoord) -> Option<&Materialized> {
        self.tiles.get(&coord)
    }

    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.tiles.values().map(|m| m.element)
    }

    /// Bring the materialized set in line with `range`. `pinned` (the expanded
    /// tile) is never evicted.
    pub fn reconcile(
        &mut self,
        range: TileRange,
        layout: &GridLayout,
        catalog: &ProjectCatalog,
        pinned: Option<TileCoord>,
        scene: &mut dyn Scene,
    ) -> ReconcileStats {
        if catalog.is_empty() {
            return ReconcileStats {
                created: 0,
                destroyed: self.clear(scene),
            };
        }
        let mut stats = ReconcileStats::default();
        let wanted: HashSet<TileCoord> = range.coords().collect();
        for &coord in &wanted {
            if self.tiles.contains_key(&coord) {
                continue;
            }
            let Some(content) = TileContent::resolve(coord, layout, catalog) else {
                continue;
            };
            let element = scene.create(ElementSpec::Tile(content.clone()));
            scene.on_activate(element, Activation::Tile(coord));
            self.tiles.insert(coord, Materialized { element, content });
            stats.created += 1;
        }
        let stale: Vec<TileCoord> = self
            .tiles
            .keys()
            .copied()
            .filter(|coord| !wanted.contains(coord) && Some(*coord) != pinned)
            .collect();
        for coord in stale {
            if let Some(m) = self.tiles.remove(&coord) {
                scene.destroy(m.element);
                stats.destroyed += 1;
            }
        }
        stats
    }

    /// Destroy every tile element; returns how many were removed.
    pub fn clear(&mut self, scene: &mut dyn Scene) -> usize {
        let count = self.tiles.len();
        for (_, m) in self.tiles.drain() {
            scene.destroy(m.element);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GallerySettings, ProjectRecord};
    use crate::testing::MockScene;

    fn catalog(n: usize) -> ProjectCatalog {
        ProjectCatalog::new(
            (0..n)
                .map(|i| ProjectRecord {
                    id: format!("project-{i:03}"),
                    title: format!("P{i}"),
                    images: vec![format!("/img/p{i}.jpg")],
                    ..Default::default()
                })
                .collect(),
        )
    }

    fn range(start_col: i64, end_col: i64, start_row: i64, end_row: i64) -> TileRange {
        TileRange {
            start_col,
            end_col,
            start_row,
            end_row,
        }
    }

    #[test]
    fn visible_range_extends_ahead_of_the_viewport() {
        let r = visible_range(
            Vec2::ZERO,
            Size::new(1000.0, 800.0),
            Size::new(465.0, 565.0),
            3.0,
            1.5,
        );
        assert_eq!(r, range(-5, 13, -3, 9));
        let moved = visible_range(
            Vec2::new(-930.0, 0.0),
            Size::new(1000.0, 800.0),
            Size::new(465.0, 565.0),
            3.0,
            1.5,
        );
        assert_eq!(moved.start_col, r.start_col + 2);
        assert!(moved.contains(TileCoord::new(15, 0)));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let layout = GridLayout::from_settings(&GallerySettings::default());
        let catalog = catalog(3);
        let mut scene = MockScene::default();
        let mut v = Virtualizer::new();
        let first = v.reconcile(range(-1, 2, 0, 1), &layout, &catalog, None, &mut scene);
        assert_eq!(first, ReconcileStats { created: 8, destroyed: 0 });
        let second = v.reconcile(range(-1, 2, 0, 1), &layout, &catalog, None, &mut scene);
        assert_eq!(second, ReconcileStats::default());
        assert_eq!(scene.live_count(), 8);
    }

    #[test]
    fn scrolled_out_tiles_are_destroyed_and_recreated_identically() {
        let layout = GridLayout::from_settings(&GallerySettings::default());
        let catalog = catalog(5);
        let mut scene = MockScene::default();
        let mut v = Virtualizer::new();
        let coord = TileCoord::new(0, 0);
        v.reconcile(range(0, 1, 0, 0), &layout, &catalog, None, &mut scene);
        let before = v.get(coord).map(|m| m.content.clone());

        let stats = v.reconcile(range(5, 6, 0, 0), &layout, &catalog, None, &mut scene);
        assert_eq!(stats, ReconcileStats { created: 2, destroyed: 2 });
        assert!(v.get(coord).is_none());

        v.reconcile(range(0, 1, 0, 0), &layout, &catalog, None, &mut scene);
        let after = v.get(coord).map(|m| m.content.clone());
        assert!(before.is_some());
        assert_eq!(before, after);
        let element = v.get(coord).map(|m| m.element);
        assert_eq!(
            element.and_then(|e| scene.activation_of(e)),
            Some(Activation::Tile(coord))
        );
    }

    #[test]
    fn pinned_tile_survives_eviction() {
        let layout = GridLayout::from_settings(&GallerySettings::default());
        let catalog = catalog(2);
        let mut scene = MockScene::default();
        let mut v = Virtualizer::new();
        let pinned = TileCoord::new(0, 0);
        v.reconcile(range(0, 1, 0, 0), &layout, &catalog, None, &mut scene);
        let stats = v.reconcile(range(10, 10, 10, 10), &layout, &catalog, Some(pinned), &mut scene);
        assert_eq!(stats, ReconcileStats { created: 1, destroyed: 1 });
        assert!(v.get(pinned).is_some());
    }

    #[test]
    fn empty_catalog_renders_nothing() {
        let layout = GridLayout::from_settings(&GallerySettings::default());
        let mut scene = MockScene::default();
        let mut v = Virtualizer::new();
        v.reconcile(range(0, 1, 0, 1), &layout, &catalog(2), None, &mut scene);
        assert_eq!(v.len(), 4);
        let stats = v.reconcile(range(0, 1, 0, 1), &layout, &catalog(0), None, &mut scene);
        assert_eq!(stats, ReconcileStats { created: 0, destroyed: 4 });
        assert!(v.is_empty());
        assert_eq!(scene.live_count(), 0);
    }
}
