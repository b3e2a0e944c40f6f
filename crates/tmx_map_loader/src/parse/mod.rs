//! Builders that turn the element tree into model types
//!
//! Tilesets never see the map they belong to. Layers and objects only need
//! the tileset entries collected before them, which `LayerContext` carries.

mod layer;
mod map;
mod object;
mod properties;
mod tileset;
mod wang;

pub(crate) use map::{load_tileset_file, parse_map};
pub(crate) use tileset::parse_tileset;

use crate::error::LoadError;
use crate::xml::XmlElement;
use tmx_map_core::{locate_gid, FlipState, LayerTile, TilesetEntry};

/// What layer and object builders need from the enclosing map
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayerContext<'a> {
    pub tilesets: &'a [TilesetEntry],
    /// Reject flip bits, as hexagonal maps do unless configured otherwise
    pub forbid_flips: bool,
}

impl LayerContext<'_> {
    /// Resolve a raw gid read from `element`
    pub fn locate(&self, element: &XmlElement, gid: u32) -> Result<Option<LayerTile>, LoadError> {
        let tile = locate_gid(self.tilesets, gid).map_err(|source| LoadError::Unresolved {
            path: element.path().to_string(),
            source,
        })?;

        if self.forbid_flips && tile.is_some_and(|t| t.flip != FlipState::Normal) {
            return Err(LoadError::unsupported(
                element.path(),
                format!("flipped tile (gid {gid:#010x}) on a hexagonal map"),
            ));
        }
        Ok(tile)
    }
}
