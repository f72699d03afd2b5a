//! Core data models for the tile gallery.
//! Project records come from the content source; the gallery only reads them.

use serde::{Deserialize, Serialize};

use crate::error::GalleryError;

/// One entry of the project catalogue as served by `projects.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "string_or_number")]
    pub year: String,
    #[serde(rename = "projectImages", alias = "images")]
    pub images: Vec<String>,
    pub description: String,
}

/// `year` shows up both as `"2024"` and as `2024` in content files.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

impl ProjectRecord {
    pub fn cover_image(&self) -> &str {
        self.images.first().map(String::as_str).unwrap_or("")
    }
}

/// Ordered, read-only view over the project records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectCatalog {
    projects: Vec<ProjectRecord>,
    /// Width used when a caption number has to be synthesized.
    pad_len: usize,
}

impl ProjectCatalog {
    /// Sorts newest first, by the last run of digits in each id.
    pub fn new(mut projects: Vec<ProjectRecord>) -> Self {
        projects.sort_by(|a, b| project_order(&b.id).cmp(&project_order(&a.id)));
        let pad_len = projects
            .iter()
            .filter_map(|p| last_digit_run(&p.id))
            .map(str::len)
            .max()
            .unwrap_or(1)
            .max(1);
        Self { projects, pad_len }
    }

    pub fn from_json(raw: &str) -> Result<Self, GalleryError> {
        let records: Vec<ProjectRecord> = serde_json::from_str(raw)?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProjectRecord> {
        self.projects.get(index)
    }

    /// Catalogue position and record for `id`.
    pub fn find(&self, id: &str) -> Option<(usize, &ProjectRecord)> {
        self.projects.iter().enumerate().find(|(_, p)| p.id == id)
    }

    /// Caption shown under a tile: `#003` from an image named `project-003`,
    /// otherwise the 1-based catalogue position padded to the id width.
    pub fn caption(&self, index: usize, image_url: &str) -> String {
        match image_number(image_url) {
            Some(n) => format!("#{n}"),
            None => format!("#{:0width$}", index + 1, width = self.pad_len),
        }
    }
}

/// Numeric value of the last digit run, as a sortable key of any length.
/// Ids without digits order like 0.
fn project_order(id: &str) -> (usize, &str) {
    let digits = last_digit_run(id).unwrap_or("").trim_start_matches('0');
    (digits.len(), digits)
}

fn last_digit_run(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let end = bytes.iter().rposition(u8::is_ascii_digit)? + 1;
    let start = bytes[..end]
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);
    Some(&s[start..end])
}

/// Extracts the digits following `project-` or `project_` (any case).
fn image_number(url: &str) -> Option<&str> {
    let lower = url.to_ascii_lowercase();
    let mut from = 0;
    while let Some(pos) = lower[from..].find("project") {
        let sep = from + pos + "project".len();
        let rest = &url[sep..];
        if rest.starts_with(['-', '_']) {
            let digits = &rest[1..];
            let len = digits.bytes().take_while(u8::is_ascii_digit).count();
            if len > 0 {
                return Some(&digits[..len]);
            }
        }
        from = sep;
    }
    None
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, k: f64) -> Vec2 {
        Vec2::new(self.x * k, self.y * k)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in viewport pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of `width`, keeping `aspect` (height / width), centered in `viewport`.
    pub fn centered(viewport: Size, width: f64, aspect: f64) -> Self {
        let height = width * aspect;
        Self::new(
            (viewport.width - width) / 2.0,
            (viewport.height - height) / 2.0,
            width,
            height,
        )
    }
}

/// Every tunable of the gallery. Missing JSON fields fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GallerySettings {
    pub base_width: f64,
    pub small_height: f64,
    pub large_height: f64,
    pub item_gap: f64,
    pub columns: i64,
    /// Expanded image width as a fraction of the viewport width.
    pub expanded_scale: f64,
    pub drag_ease: f64,
    pub momentum_factor: f64,
    pub buffer_zone: f64,
    pub look_ahead: f64,
    pub tap_threshold_px: f64,
    pub min_drag_dt_ms: f64,
    pub momentum_threshold: f64,
    pub virtualize_distance_px: f64,
    pub virtualize_interval_ms: f64,
    pub overlay_opacity: f64,
    pub overlay_ease_ms: f64,
    pub zoom_ms: f64,
    pub sibling_restore_delay_ms: f64,
    pub resize_ms: f64,
    pub navigate_fade_ms: f64,
    pub content_url: String,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            base_width: 400.0,
            small_height: 330.0,
            large_height: 500.0,
            item_gap: 65.0,
            columns: 4,
            expanded_scale: 0.5,
            drag_ease: 0.075,
            momentum_factor: 200.0,
            buffer_zone: 3.0,
            look_ahead: 1.5,
            tap_threshold_px: 5.0,
            min_drag_dt_ms: 10.0,
            momentum_threshold: 0.1,
            virtualize_distance_px: 100.0,
            virtualize_interval_ms: 120.0,
            overlay_opacity: 0.9,
            overlay_ease_ms: 800.0,
            zoom_ms: 600.0,
            sibling_restore_delay_ms: 300.0,
            resize_ms: 300.0,
            navigate_fade_ms: 200.0,
            content_url: "projects.json".to_string(),
        }
    }
}

// Bounds on how many tiles one visible range may cover.
const MAX_BUFFER_ZONE: f64 = 8.0;
const MAX_LOOK_AHEAD: f64 = 8.0;
const MIN_CELL_PX: f64 = 32.0;

impl GallerySettings {
    /// Rejects values that would break the layout or make the visible range
    /// empty or unbounded.
    pub fn validate(&self) -> Result<(), GalleryError> {
        let positive = [
            (self.base_width, "base_width"),
            (self.small_height, "small_height"),
            (self.large_height, "large_height"),
            (self.expanded_scale, "expanded_scale"),
            (self.drag_ease, "drag_ease"),
            (self.min_drag_dt_ms, "min_drag_dt_ms"),
            (self.look_ahead, "look_ahead"),
        ];
        for (value, name) in positive {
            if !(value > 0.0) {
                return Err(GalleryError::InvalidSettings(name));
            }
        }
        let non_negative = [
            (self.item_gap, "item_gap"),
            (self.buffer_zone, "buffer_zone"),
            (self.momentum_factor, "momentum_factor"),
            (self.tap_threshold_px, "tap_threshold_px"),
            (self.momentum_threshold, "momentum_threshold"),
            (self.virtualize_distance_px, "virtualize_distance_px"),
            (self.virtualize_interval_ms, "virtualize_interval_ms"),
            (self.overlay_ease_ms, "overlay_ease_ms"),
            (self.zoom_ms, "zoom_ms"),
            (self.sibling_restore_delay_ms, "sibling_restore_delay_ms"),
            (self.resize_ms, "resize_ms"),
            (self.navigate_fade_ms, "navigate_fade_ms"),
        ];
        for (value, name) in non_negative {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(GalleryError::InvalidSettings(name));
            }
        }
        let unit = [
            (self.drag_ease, "drag_ease"),
            (self.expanded_scale, "expanded_scale"),
            (self.overlay_opacity, "overlay_opacity"),
        ];
        for (value, name) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(GalleryError::InvalidSettings(name));
            }
        }
        if self.columns <= 0 {
            return Err(GalleryError::InvalidSettings("columns"));
        }
        if self.buffer_zone > MAX_BUFFER_ZONE {
            return Err(GalleryError::InvalidSettings("buffer_zone"));
        }
        if self.look_ahead > MAX_LOOK_AHEAD {
            return Err(GalleryError::InvalidSettings("look_ahead"));
        }
        let cell = self.cell_size();
        if cell.width < MIN_CELL_PX || cell.height < MIN_CELL_PX {
            return Err(GalleryError::InvalidSettings("cell size"));
        }
        Ok(())
    }

    /// Parses a JSON override; anything invalid falls back to the defaults.
    pub fn from_override(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        let parsed = serde_json::from_str::<GallerySettings>(raw)
            .map_err(GalleryError::from)
            .and_then(|s| s.validate().map(|()| s));
        match parsed {
            Ok(settings) => settings,
            Err(err) => {
                crate::util::cwarn(&format!("gallery settings override ignored: {err}"));
                Self::default()
            }
        }
    }

    pub fn cell_size(&self) -> Size {
        Size::new(
            self.base_width + self.item_gap,
            self.small_height.max(self.large_height) + self.item_gap,
        )
    }

    pub fn size_palette(&self) -> Vec<Size> {
        vec![
            Size::new(self.base_width, self.small_height),
            Size::new(self.base_width, self.large_height),
        ]
    }
}
