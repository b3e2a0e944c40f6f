//! Layer tree: tile, object, image and group layers

use crate::color::Color;
use crate::error::ResolveError;
use crate::flip::FlipState;
use crate::object::MapObject;
use crate::properties::Properties;
use glam::Vec2;
use serde::Serialize;

/// A resolved tile reference: which tileset entry, which local tile, and how
/// the tile is flipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LayerTile {
    /// Index into the map's tileset entries
    pub tileset: usize,
    /// Local tile id inside that tileset
    pub id: u32,
    pub flip: FlipState,
}

/// A layer of any type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub id: i32,
    pub name: String,
    pub visible: bool,
    /// Pixel offset relative to the parent group
    pub offset: Vec2,
    /// Opacity in [0, 1], multiplied with the parent group's
    pub opacity: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    pub data: LayerData,
}

impl Layer {
    /// Create a visible, fully opaque layer without offset
    pub fn new(id: i32, name: impl Into<String>, data: LayerData) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            offset: Vec2::ZERO,
            opacity: 1.0,
            properties: None,
            data,
        }
    }

    /// Which variant `data` holds
    pub fn layer_type(&self) -> LayerType {
        match &self.data {
            LayerData::Tiles(_) => LayerType::Tiles,
            LayerData::Objects(_) => LayerType::Objects,
            LayerData::Image(_) => LayerType::Image,
            LayerData::Group(_) => LayerType::Group,
        }
    }

    /// Set the opacity, clamped to [0, 1]
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn as_tiles(&self) -> Option<&TileLayer> {
        match &self.data {
            LayerData::Tiles(tiles) => Some(tiles),
            _ => None,
        }
    }

    pub fn as_objects(&self) -> Option<&ObjectLayer> {
        match &self.data {
            LayerData::Objects(objects) => Some(objects),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageLayer> {
        match &self.data {
            LayerData::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&LayerGroup> {
        match &self.data {
            LayerData::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut LayerGroup> {
        match &mut self.data {
            LayerData::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Find an object by name in this object layer
    pub fn object_by_name(&self, name: &str) -> Result<&MapObject, ResolveError> {
        self.as_objects()
            .and_then(|objects| objects.objects.iter().find(|o| o.name == name))
            .ok_or_else(|| ResolveError::ObjectNotFound {
                name: name.to_string(),
                layer: self.name.clone(),
            })
    }
}

/// Discriminant of `LayerData`, for filtering without matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayerType {
    Tiles,
    Objects,
    Image,
    Group,
}

impl LayerType {
    pub fn name(&self) -> &'static str {
        match self {
            LayerType::Tiles => "Tiles",
            LayerType::Objects => "Objects",
            LayerType::Image => "Image",
            LayerType::Group => "Group",
        }
    }
}

/// Variant payload: tiles, objects, an image or nested layers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LayerData {
    Tiles(TileLayer),
    Objects(ObjectLayer),
    Image(ImageLayer),
    Group(LayerGroup),
}

/// Grid of optional tile references, row-major
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub width: u32,
    pub height: u32,
    cells: Vec<Option<LayerTile>>,
}

impl TileLayer {
    /// Create an empty grid
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; (width * height) as usize],
        }
    }

    /// Build from row-major cells. Returns `None` when the cell count is not
    /// `width * height`.
    pub fn from_cells(width: u32, height: u32, cells: Vec<Option<LayerTile>>) -> Option<Self> {
        if cells.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    /// Tile at column `x`, row `y`
    pub fn tile(&self, x: u32, y: u32) -> Option<LayerTile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[(x + y * self.width) as usize]
    }

    pub fn cells(&self) -> &[Option<LayerTile>] {
        &self.cells
    }

    /// Non-empty cells with their grid position
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, LayerTile)> + '_ {
        let width = self.width.max(1);
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|tile| (i as u32 % width, i as u32 / width, tile))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

/// Objects drawn in document order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ObjectLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    pub objects: Vec<MapObject>,
}

impl ObjectLayer {
    pub fn new(objects: Vec<MapObject>) -> Self {
        Self {
            color: None,
            objects,
        }
    }

    pub fn objects_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MapObject> {
        self.objects.iter().filter(move |o| o.name == name)
    }

    pub fn objects_by_type<'a>(
        &'a self,
        object_type: &'a str,
    ) -> impl Iterator<Item = &'a MapObject> {
        self.objects
            .iter()
            .filter(move |o| o.object_type == object_type)
    }

    pub fn object_by_id(&self, id: u32) -> Option<&MapObject> {
        self.objects.iter().find(|o| o.id == id)
    }
}

/// Image referenced by an image layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageLayer {
    /// Path relative to the map file
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trans: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// A layer seen through its ancestors: offsets add up, opacities multiply and
/// a hidden ancestor hides everything below it
#[derive(Debug, Clone, Copy)]
pub struct FlatLayer<'a> {
    pub layer: &'a Layer,
    pub offset: Vec2,
    pub opacity: f32,
    pub visible: bool,
    /// Nesting level, 0 for direct children of the root
    pub depth: usize,
}

/// Ordered child layers
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LayerGroup {
    pub layers: Vec<Layer>,
}

impl LayerGroup {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// First direct child named `name`
    pub fn layer_by_name(&self, name: &str) -> Result<&Layer, ResolveError> {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| ResolveError::LayerNotFound {
                name: name.to_string(),
                searched: self.layers.iter().map(|l| l.name.clone()).collect(),
            })
    }

    /// Every direct child named `name`
    pub fn layers_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Layer> {
        self.layers.iter().filter(move |l| l.name == name)
    }

    /// First layer named `name` in depth-first order, groups included
    pub fn find_layer(&self, name: &str) -> Result<&Layer, ResolveError> {
        let mut all = Vec::new();
        self.walk(&mut |layer| all.push(layer));
        all.iter()
            .copied()
            .find(|l| l.name == name)
            .ok_or_else(|| ResolveError::LayerNotFound {
                name: name.to_string(),
                searched: all.iter().map(|l| l.name.clone()).collect(),
            })
    }

    /// Every layer named `name` in depth-first order
    pub fn find_layers(&self, name: &str) -> Vec<&Layer> {
        let mut found = Vec::new();
        self.walk(&mut |layer| {
            if layer.name == name {
                found.push(layer);
            }
        });
        found
    }

    pub fn find_layer_by_id(&self, id: i32) -> Option<&Layer> {
        let mut found = None;
        self.walk(&mut |layer| {
            if found.is_none() && layer.id == id {
                found = Some(layer);
            }
        });
        found
    }

    /// Visit every layer depth-first, a group before its children
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Layer)) {
        for layer in &self.layers {
            visit(layer);
            if let LayerData::Group(group) = &layer.data {
                group.walk(visit);
            }
        }
    }

    /// Non-group layers in draw order with offsets, opacity and visibility
    /// composed through their ancestors
    pub fn flatten(&self) -> Vec<FlatLayer<'_>> {
        let mut out = Vec::new();
        self.flatten_into(Vec2::ZERO, 1.0, true, 0, &mut out);
        out
    }

    fn flatten_into<'a>(
        &'a self,
        offset: Vec2,
        opacity: f32,
        visible: bool,
        depth: usize,
        out: &mut Vec<FlatLayer<'a>>,
    ) {
        for layer in &self.layers {
            let offset = offset + layer.offset;
            let opacity = opacity * layer.opacity;
            let visible = visible && layer.visible;
            match &layer.data {
                LayerData::Group(group) => {
                    group.flatten_into(offset, opacity, visible, depth + 1, out)
                }
                _ => out.push(FlatLayer {
                    layer,
                    offset,
                    opacity,
                    visible,
                    depth,
                }),
            }
        }
    }
}
