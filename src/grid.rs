//! Grid indexing: integer tile coordinates to canvas pixels and project records.
//!
//! The grid is unbounded in every direction. Everything here is a pure function
//! of the coordinate and the current catalogue, so a tile evicted by the
//! virtualizer and later recreated shows exactly the same content.

use std::fmt;

use crate::model::{GallerySettings, ProjectCatalog, Size, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub col: i64,
    pub row: i64,
}

impl TileCoord {
    pub fn new(col: i64, row: i64) -> Self {
        Self { col, row }
    }
}

/// Tile ids are `"col,row"`, which is also the DOM id of the tile element.
impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.col, self.row)
    }
}

pub fn cell_position(col: i64, row: i64, cell_width: f64, cell_height: f64) -> Vec2 {
    Vec2::new(col as f64 * cell_width, row as f64 * cell_height)
}

/// Brick pattern: `|(row * columns + col) % len|`. `None` for an empty palette.
pub fn tile_size(row: i64, col: i64, columns: i64, palette: &[Size]) -> Option<Size> {
    if palette.is_empty() {
        return None;
    }
    let linear = row as i128 * columns as i128 + col as i128;
    let index = (linear % palette.len() as i128).unsigned_abs() as usize;
    palette.get(index).copied()
}

/// Wrap-around project index, always in `[0, total)`. `None` when there are no projects.
pub fn resolve_project_index(row: i64, col: i64, columns: i64, total: usize) -> Option<usize> {
    if total == 0 {
        return None;
    }
    let linear = row as i128 * columns as i128 + col as i128;
    Some(linear.rem_euclid(total as i128) as usize)
}

/// Fixed geometry of the grid, derived once from the settings.
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayout {
    pub columns: i64,
    pub cell: Size,
    pub palette: Vec<Size>,
}

impl GridLayout {
    pub fn from_settings(settings: &GallerySettings) -> Self {
        Self {
            columns: settings.columns,
            cell: settings.cell_size(),
            palette: settings.size_palette(),
        }
    }
}

/// Everything a tile displays, resolved from its coordinate.
#[derive(Clone, Debug, PartialEq)]
pub struct TileContent {
    pub coord: TileCoord,
    pub position: Vec2,
    pub size: Size,
    pub project_index: usize,
    pub project_id: String,
    pub title: String,
    pub image_url: String,
    pub caption: String,
}

impl TileContent {
    pub fn resolve(coord: TileCoord, layout: &GridLayout, catalog: &ProjectCatalog) -> Option<Self> {
        let TileCoord { col, row } = coord;
        let project_index = resolve_project_index(row, col, layout.columns, catalog.len())?;
        let project = catalog.get(project_index)?;
        let size = tile_size(row, col, layout.columns, &layout.palette)?;
        let image_url = project.cover_image().to_string();
        Some(Self {
            coord,
            position: cell_position(col, row, layout.cell.width, layout.cell.height),
            size,
            project_index,
            project_id: project.id.clone(),
            title: project.title.clone(),
            caption: catalog.caption(project_index, &image_url),
            image_url,
        })
    }

    /// Height over width, used to keep the expanded copy in proportion.
    pub fn aspect(&self) -> f64 {
        if self.size.width > 0.0 {
            self.size.height / self.size.width
        } else {
            1.0
        }
    }
}
