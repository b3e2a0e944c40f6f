//! Core data structures for tmx_map
//!
//! This crate provides the in-memory model of a TMX tile map:
//! - `MapFile` - A resolved map with tileset entries and a layer tree
//! - `Layer` - Tile, object, image or group layer
//! - `Tileset` - Tile atlas with per-tile collision, type and properties
//! - `MapObject` - Shape, text or tile objects
//! - `CollisionShape` - Box, circle and rotated rectangle with overlap tests
//! - `Wangset` - Edge and corner colors decoded from packed wang ids
//! - `Properties` - Typed custom property bag

mod collision;
mod color;
mod error;
mod flip;
mod layer;
mod map;
mod object;
mod properties;
mod tileset;
mod wang;

pub use collision::{Bounds, CollisionBox, CollisionCircle, CollisionRotatedRect, CollisionShape};
pub use color::Color;
pub use error::{ColorParseError, ErrorKind, GeometryError, PropertyError, ResolveError, WangError};
pub use flip::{
    bare_gid, FlipState, FLIPPED_DIAGONALLY, FLIPPED_HORIZONTALLY, FLIPPED_VERTICALLY, FLIP_MASK,
};
pub use layer::{
    FlatLayer, ImageLayer, Layer, LayerData, LayerGroup, LayerTile, LayerType, ObjectLayer,
    TileLayer,
};
pub use map::{
    locate_gid, MapFile, Orientation, RenderOrder, Stagger, StaggerAxis, StaggerIndex,
    TilesetEntry,
};
pub use object::{
    HAlign, MapObject, ObjectData, ObjectKind, ShapeKind, ShapeObject, TextObject, VAlign,
};
pub use properties::{Properties, PropertyType, PropertyValue};
pub use tileset::{PixelRect, Tile, Tileset, TilesetImage};
pub use wang::{decode_wang_id, SideType, WangColor, WangId, WangSide, WangTile, Wangset, WangsetBuilder};

pub use glam::Vec2;
