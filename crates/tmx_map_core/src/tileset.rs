//! Tilesets and the tiles they slice out of an atlas image

use crate::collision::CollisionShape;
use crate::color::Color;
use crate::properties::Properties;
use crate::wang::Wangset;
use serde::Serialize;

/// Pixel rectangle inside a tileset image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A single tile of a tileset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    /// Local id, equal to the index in the tileset
    pub id: u32,
    /// Where the tile sits in the tileset image
    pub rect: PixelRect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collision: Vec<CollisionShape>,
}

impl Tile {
    pub fn has_collision(&self) -> bool {
        !self.collision.is_empty()
    }

    /// Whether any collision shape of this tile overlaps `shape`. Tile shapes
    /// are in tile-local pixels, so `shape` must be too.
    pub fn collides_with(&self, shape: &CollisionShape) -> bool {
        self.collision.iter().any(|own| own.overlaps(shape))
    }
}

/// The atlas image a tileset is cut from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TilesetImage {
    /// Path relative to the file that declared the tileset
    pub source: String,
    /// Color keyed out as fully transparent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trans: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl TilesetImage {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            trans: None,
            width: None,
            height: None,
        }
    }

    pub fn with_trans(mut self, trans: Option<Color>) -> Self {
        self.trans = trans;
        self
    }

    pub fn with_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Tileset configuration with its tiles
///
/// `tile_count` does not have to equal `columns * rows`; the last row may be
/// partial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tileset {
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub spacing: u32,
    pub margin: u32,
    pub image: TilesetImage,
    /// Drawing offset applied to every tile, in pixels
    pub tile_offset: (i32, i32),
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub wangsets: Vec<Wangset>,
    tiles: Vec<Tile>,
}

fn step(margin: u32, index: u32, size: u32, spacing: u32) -> u32 {
    margin.saturating_add(index.saturating_mul(size.saturating_add(spacing)))
}

impl Tileset {
    /// Create a tileset with `tile_count` plain tiles laid out in `columns`
    pub fn new(
        name: impl Into<String>,
        tile_width: u32,
        tile_height: u32,
        columns: u32,
        tile_count: u32,
        image: TilesetImage,
    ) -> Self {
        let mut tileset = Self {
            name: name.into(),
            tile_width,
            tile_height,
            columns: columns.max(1),
            spacing: 0,
            margin: 0,
            image,
            tile_offset: (0, 0),
            properties: None,
            wangsets: Vec::new(),
            tiles: Vec::new(),
        };
        tileset.tiles = (0..tile_count)
            .map(|id| Tile {
                id,
                rect: tileset.tile_rect(id),
                tile_type: None,
                properties: None,
                collision: Vec::new(),
            })
            .collect();
        tileset
    }

    /// Set the gap between tiles and recompute tile rectangles
    pub fn with_spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self.relayout();
        self
    }

    /// Set the border around the tiles and recompute tile rectangles
    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self.relayout();
        self
    }

    pub fn with_tile_offset(mut self, x: i32, y: i32) -> Self {
        self.tile_offset = (x, y);
        self
    }

    pub fn with_properties(mut self, properties: Option<Properties>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_wangsets(mut self, wangsets: Vec<Wangset>) -> Self {
        self.wangsets = wangsets;
        self
    }

    fn relayout(&mut self) {
        for i in 0..self.tiles.len() {
            let rect = self.tile_rect(self.tiles[i].id);
            self.tiles[i].rect = rect;
        }
    }

    /// Pixel rectangle of tile `id`: `margin + col * (size + spacing)` on each axis
    pub fn tile_rect(&self, id: u32) -> PixelRect {
        let col = id % self.columns;
        let row = id / self.columns;
        // Saturates for layouts that do not fit in u32; loaders reject those
        PixelRect {
            x: step(self.margin, col, self.tile_width, self.spacing),
            y: step(self.margin, row, self.tile_height, self.spacing),
            width: self.tile_width,
            height: self.tile_height,
        }
    }

    /// Pixel extent `(right, bottom)` of a layout, or `None` if any tile
    /// rectangle would overflow u32
    pub fn layout_extent(
        tile_width: u32,
        tile_height: u32,
        columns: u32,
        tile_count: u32,
        spacing: u32,
        margin: u32,
    ) -> Option<(u32, u32)> {
        let columns = columns.max(1);
        if tile_count == 0 {
            return Some((margin, margin));
        }
        let last_col = columns.min(tile_count) - 1;
        let last_row = (tile_count - 1) / columns;
        let extent = |index: u32, size: u32| {
            size.checked_add(spacing)?
                .checked_mul(index)?
                .checked_add(margin)?
                .checked_add(size)
        };
        Some((extent(last_col, tile_width)?, extent(last_row, tile_height)?))
    }

    pub fn tile_count(&self) -> u32 {
        self.tiles.len() as u32
    }

    /// Number of rows, counting a partial last row
    pub fn rows(&self) -> u32 {
        self.tile_count().div_ceil(self.columns)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: u32) -> Option<&Tile> {
        self.tiles.get(id as usize)
    }

    /// Mutable access while the tileset is being assembled
    pub fn tile_mut(&mut self, id: u32) -> Option<&mut Tile> {
        self.tiles.get_mut(id as usize)
    }

    pub fn wangset(&self, name: &str) -> Option<&Wangset> {
        self.wangsets.iter().find(|w| w.name == name)
    }

    /// Tiles carrying `tile_type`
    pub fn tiles_of_type<'a>(&'a self, tile_type: &'a str) -> impl Iterator<Item = &'a Tile> {
        self.tiles
            .iter()
            .filter(move |t| t.tile_type.as_deref() == Some(tile_type))
    }
}
