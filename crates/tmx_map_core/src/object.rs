//! Objects placed on object layers

use crate::color::Color;
use crate::error::GeometryError;
use crate::layer::LayerTile;
use crate::properties::Properties;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An object on an object layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapObject {
    pub id: u32,
    pub name: String,
    pub object_type: String,
    /// Pixel position. Tile objects anchor at their bottom-left corner.
    pub position: Vec2,
    pub size: Vec2,
    /// Degrees clockwise around `position`
    pub rotation: f32,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    pub data: ObjectData,
}

impl MapObject {
    /// Create a visible, unrotated object with empty name and type
    pub fn new(id: u32, position: Vec2, size: Vec2, data: ObjectData) -> Self {
        Self {
            id,
            name: String::new(),
            object_type: String::new(),
            position,
            size,
            rotation: 0.0,
            visible: true,
            properties: None,
            data,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = object_type.into();
        self
    }

    pub fn kind(&self) -> ObjectKind {
        match &self.data {
            ObjectData::Shape(_) => ObjectKind::Shape,
            ObjectData::Text(_) => ObjectKind::Text,
            ObjectData::Tile(_) => ObjectKind::Tile,
        }
    }

    pub fn as_shape(&self) -> Option<&ShapeObject> {
        match &self.data {
            ObjectData::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextObject> {
        match &self.data {
            ObjectData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_tile(&self) -> Option<LayerTile> {
        match &self.data {
            ObjectData::Tile(tile) => Some(*tile),
            _ => None,
        }
    }
}

/// The kind of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Shape,
    Text,
    Tile,
}

/// Variant data of an object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ObjectData {
    Shape(ShapeObject),
    Text(TextObject),
    Tile(LayerTile),
}

/// Geometric kind of a shape object
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ShapeKind {
    #[default]
    Rect,
    Ellipse,
    Point,
    Polygon,
    Polyline,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rect => "Rect",
            ShapeKind::Ellipse => "Ellipse",
            ShapeKind::Point => "Point",
            ShapeKind::Polygon => "Polygon",
            ShapeKind::Polyline => "Polyline",
        }
    }
}

/// A rectangle, ellipse, point or point list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeObject {
    pub kind: ShapeKind,
    /// Vertices relative to the object position, first one at the origin.
    /// Empty for rectangles, ellipses and points.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Vec2>,
}

impl ShapeObject {
    pub fn rect() -> Self {
        Self {
            kind: ShapeKind::Rect,
            points: Vec::new(),
        }
    }

    pub fn ellipse() -> Self {
        Self {
            kind: ShapeKind::Ellipse,
            points: Vec::new(),
        }
    }

    pub fn point() -> Self {
        Self {
            kind: ShapeKind::Point,
            points: Vec::new(),
        }
    }

    /// Closed polygon. Needs at least 3 points.
    pub fn polygon(points: Vec<Vec2>) -> Result<Self, GeometryError> {
        Self::outline(ShapeKind::Polygon, "polygon", 3, points)
    }

    /// Open chain of segments. Needs at least 2 points.
    pub fn polyline(points: Vec<Vec2>) -> Result<Self, GeometryError> {
        Self::outline(ShapeKind::Polyline, "polyline", 2, points)
    }

    fn outline(kind: ShapeKind, shape: &'static str, min: usize, points: Vec<Vec2>) -> Result<Self, GeometryError> {
        if points.len() < min {
            return Err(GeometryError::TooFewPoints {
                shape,
                min,
                count: points.len(),
            });
        }
        Ok(Self { kind, points })
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl HAlign {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(HAlign::Left),
            "center" => Some(HAlign::Center),
            "right" => Some(HAlign::Right),
            "justify" => Some(HAlign::Justify),
            _ => None,
        }
    }
}

/// Vertical text alignment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum VAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

impl VAlign {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "top" => Some(VAlign::Top),
            "center" => Some(VAlign::Center),
            "bottom" => Some(VAlign::Bottom),
            _ => None,
        }
    }
}

/// A block of text with its font settings. Layout is left to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextObject {
    pub text: String,
    pub font_family: String,
    pub pixel_size: u32,
    pub wrap: bool,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    pub kerning: bool,
    pub halign: HAlign,
    pub valign: VAlign,
}

impl Default for TextObject {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "sans-serif".to_string(),
            pixel_size: 16,
            wrap: false,
            color: Color::BLACK,
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            kerning: true,
            halign: HAlign::Left,
            valign: VAlign::Top,
        }
    }
}

impl TextObject {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Font size in points, assuming 96 pixels per inch
    pub fn point_size(&self) -> f32 {
        self.pixel_size as f32 * 72.0 / 96.0
    }
}
