//! The map document model and gid resolution

use crate::color::Color;
use crate::error::ResolveError;
use crate::flip::{bare_gid, FlipState};
use crate::layer::{Layer, LayerData, LayerGroup, LayerTile};
use crate::properties::Properties;
use crate::tileset::{Tile, Tileset};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Map projection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Orthogonal,
    Isometric,
    Staggered,
    Hexagonal,
}

impl Orientation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "orthogonal" => Some(Orientation::Orthogonal),
            "isometric" => Some(Orientation::Isometric),
            "staggered" => Some(Orientation::Staggered),
            "hexagonal" => Some(Orientation::Hexagonal),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Orientation::Orthogonal => "orthogonal",
            Orientation::Isometric => "isometric",
            Orientation::Staggered => "staggered",
            Orientation::Hexagonal => "hexagonal",
        }
    }

    /// Whether stagger axis and index are required
    pub fn is_staggered(&self) -> bool {
        matches!(self, Orientation::Staggered | Orientation::Hexagonal)
    }
}

/// Order in which tiles are drawn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RenderOrder {
    #[default]
    RightDown,
    RightUp,
    LeftDown,
    LeftUp,
}

impl RenderOrder {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "right-down" => Some(RenderOrder::RightDown),
            "right-up" => Some(RenderOrder::RightUp),
            "left-down" => Some(RenderOrder::LeftDown),
            "left-up" => Some(RenderOrder::LeftUp),
            _ => None,
        }
    }
}

/// Axis along which staggered rows or columns shift
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StaggerAxis {
    X,
    Y,
}

/// Which rows or columns are shifted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StaggerIndex {
    Odd,
    Even,
}

/// Stagger settings of staggered and hexagonal maps
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Stagger {
    pub axis: StaggerAxis,
    pub index: StaggerIndex,
    /// Length of the flat hex side in pixels, hexagonal maps only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex_side_length: Option<f32>,
}

/// A tileset and the first gid it answers to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TilesetEntry {
    pub first_gid: u32,
    /// External file the tileset was loaded from, relative to the map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub tileset: Arc<Tileset>,
}

impl TilesetEntry {
    pub fn new(first_gid: u32, tileset: Arc<Tileset>) -> Self {
        Self {
            first_gid,
            source: None,
            tileset,
        }
    }

    /// Whether the bare gid falls in `[first_gid, first_gid + tile_count)`
    pub fn contains(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid - self.first_gid < self.tileset.tile_count()
    }
}

/// Locate a raw gid among tileset entries.
///
/// Returns `Ok(None)` for gid 0. Flip bits are decoded into the returned
/// reference; the first entry whose range holds the bare gid wins.
pub fn locate_gid(entries: &[TilesetEntry], gid: u32) -> Result<Option<LayerTile>, ResolveError> {
    if gid == 0 {
        return Ok(None);
    }
    let bare = bare_gid(gid);
    entries
        .iter()
        .enumerate()
        .find(|(_, entry)| entry.contains(bare))
        .map(|(tileset, entry)| {
            Some(LayerTile {
                tileset,
                id: bare - entry.first_gid,
                flip: FlipState::from_gid(gid),
            })
        })
        .ok_or(ResolveError::UnknownGid(bare))
}

/// A fully resolved map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFile {
    pub version: String,
    pub orientation: Orientation,
    pub render_order: RenderOrder,
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stagger: Option<Stagger>,
    pub background_color: Color,
    pub tilesets: Vec<TilesetEntry>,
    /// Root group holding the top-level layers
    pub root: Layer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

impl MapFile {
    /// Create an empty orthogonal map
    pub fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Self {
        Self {
            version: String::new(),
            orientation: Orientation::Orthogonal,
            render_order: RenderOrder::RightDown,
            width,
            height,
            tile_width,
            tile_height,
            stagger: None,
            background_color: Color::TRANSPARENT,
            tilesets: Vec::new(),
            root: Layer::new(-1, "root", LayerData::Group(LayerGroup::default())),
            properties: None,
        }
    }

    /// Resolve a raw gid to its tile. gid 0 is the empty tile.
    pub fn resolve(&self, gid: u32) -> Result<Option<&Tile>, ResolveError> {
        Ok(locate_gid(&self.tilesets, gid)?.and_then(|tile| self.tile(tile)))
    }

    /// Decode a raw gid into a tile reference with its flip state
    pub fn locate(&self, gid: u32) -> Result<Option<LayerTile>, ResolveError> {
        locate_gid(&self.tilesets, gid)
    }

    /// Encode a tile reference back into a raw gid with flip bits
    pub fn gid_of(&self, tile: LayerTile) -> Option<u32> {
        let entry = self.tilesets.get(tile.tileset)?;
        Some((entry.first_gid + tile.id) | tile.flip.to_bits())
    }

    pub fn tile(&self, tile: LayerTile) -> Option<&Tile> {
        self.tilesets.get(tile.tileset)?.tileset.tile(tile.id)
    }

    pub fn tileset_of(&self, tile: LayerTile) -> Option<&Tileset> {
        self.tilesets.get(tile.tileset).map(|e| e.tileset.as_ref())
    }

    /// First tileset entry whose tileset is named `name`
    pub fn tileset_by_name(&self, name: &str) -> Result<&TilesetEntry, ResolveError> {
        self.tilesets
            .iter()
            .find(|e| e.tileset.name == name)
            .ok_or_else(|| ResolveError::TilesetNotFound(name.to_string()))
    }

    pub fn root_group(&self) -> &LayerGroup {
        static EMPTY: LayerGroup = LayerGroup { layers: Vec::new() };
        self.root.as_group().unwrap_or(&EMPTY)
    }

    pub fn root_group_mut(&mut self) -> Option<&mut LayerGroup> {
        self.root.as_group_mut()
    }

    /// Top-level layers
    pub fn layers(&self) -> &[Layer] {
        &self.root_group().layers
    }

    /// First top-level layer named `name`
    pub fn layer_by_name(&self, name: &str) -> Result<&Layer, ResolveError> {
        self.root_group().layer_by_name(name)
    }

    /// First layer named `name` anywhere in the tree
    pub fn find_layer(&self, name: &str) -> Result<&Layer, ResolveError> {
        self.root_group().find_layer(name)
    }

    /// Width in pixels. Widened so huge maps cannot overflow.
    pub fn pixel_width(&self) -> u64 {
        u64::from(self.width) * u64::from(self.tile_width)
    }

    pub fn pixel_height(&self) -> u64 {
        u64::from(self.height) * u64::from(self.tile_height)
    }
}
