//! Wang sets: edge and corner colors assigned to tiles
//!
//! The eight positions around a tile are numbered from the top edge going
//! clockwise, so edges land on even numbers and corners on odd ones. A
//! `WangSide` converts to and from that number with `index` and `from_index`.
//!
//! A wang id packs one 4-bit color id per position, position 0 in the lowest
//! nibble. Color ids start at 1 and count separately for edge and corner
//! colors, so nibble 0 always means "no color".

use crate::color::Color;
use crate::error::WangError;
use crate::properties::Properties;
use serde::{Deserialize, Serialize};

/// Whether a position is an edge or a corner
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SideType {
    Edge,
    Corner,
}

impl SideType {
    pub fn name(&self) -> &'static str {
        match self {
            SideType::Edge => "Edge",
            SideType::Corner => "Corner",
        }
    }
}

/// One of the 8 positions around a tile
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WangSide {
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,
}

impl WangSide {
    pub const ALL: [WangSide; 8] = [
        WangSide::Top,
        WangSide::TopRight,
        WangSide::Right,
        WangSide::BottomRight,
        WangSide::Bottom,
        WangSide::BottomLeft,
        WangSide::Left,
        WangSide::TopLeft,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Position for an index, wrapping around
    pub fn from_index(i: usize) -> Self {
        Self::ALL[i % 8]
    }

    /// The neighbouring position one step clockwise
    pub fn clockwise(self) -> Self {
        self.rotated_clockwise(1)
    }

    /// One step back, the inverse of `clockwise`
    pub fn counter_clockwise(self) -> Self {
        self.rotated_clockwise(7)
    }

    pub fn rotated_clockwise(self, steps: usize) -> Self {
        Self::from_index(self.index() + steps % 8)
    }

    /// Position on the neighbor that faces this one
    pub fn opposite(self) -> Self {
        self.rotated_clockwise(4)
    }

    pub fn side_type(self) -> SideType {
        if self.index() % 2 == 1 {
            SideType::Corner
        } else {
            SideType::Edge
        }
    }

    pub fn is_corner(self) -> bool {
        self.side_type() == SideType::Corner
    }

    /// Grid step towards the neighbor on this side, y pointing down
    pub fn offset(self) -> (i32, i32) {
        match self {
            WangSide::Top => (0, -1),
            WangSide::TopRight => (1, -1),
            WangSide::Right => (1, 0),
            WangSide::BottomRight => (1, 1),
            WangSide::Bottom => (0, 1),
            WangSide::BottomLeft => (-1, 1),
            WangSide::Left => (-1, 0),
            WangSide::TopLeft => (-1, -1),
        }
    }
}

/// A named color that can sit on edges or corners
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WangColor {
    /// 1-based, unique among colors of the same side type
    pub id: u32,
    pub name: String,
    pub side_type: SideType,
    pub color: Color,
    /// Representative tile, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<u32>,
    #[serde(default = "default_probability")]
    pub probability: f32,
}

fn default_probability() -> f32 {
    1.0
}

/// Colors at each of the 8 positions, as indices into a wangset's color list
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WangId {
    pub colors: [Option<usize>; 8],
}

impl WangId {
    pub fn color_index(&self, side: WangSide) -> Option<usize> {
        self.colors[side.index()]
    }

    /// Positions that carry a color, with the color index
    pub fn sides(&self) -> impl Iterator<Item = (WangSide, usize)> + '_ {
        WangSide::ALL
            .into_iter()
            .filter_map(|side| self.color_index(side).map(|i| (side, i)))
    }

    /// Number of positions that carry a color
    pub fn len(&self) -> usize {
        self.colors.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decode a packed wang id against an ordered color list.
///
/// Nibble `i` belongs to the position `i` steps clockwise from the top and
/// must name a color of that position's side type.
pub fn decode_wang_id(packed: u32, colors: &[WangColor]) -> Result<WangId, WangError> {
    let mut wang_id = WangId::default();

    for i in 0..8 {
        let color_id = (packed >> (4 * i)) & 0xF;
        if color_id == 0 {
            continue;
        }

        let side = WangSide::Top.rotated_clockwise(i);
        let index = colors
            .iter()
            .position(|c| c.id == color_id && c.side_type == side.side_type())
            .ok_or(WangError::InvalidColor { side, color_id })?;
        wang_id.colors[side.index()] = Some(index);
    }

    Ok(wang_id)
}

/// A tile with colors on some of its positions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WangTile {
    pub tile_id: u32,
    pub wang_id: WangId,
}

/// A set of wang colors and the tiles they are painted on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wangset {
    pub name: String,
    /// Representative tile, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<u32>,
    pub colors: Vec<WangColor>,
    pub tiles: Vec<WangTile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

impl Wangset {
    /// Look up a color by side type and 1-based id
    pub fn color(&self, side_type: SideType, id: u32) -> Option<&WangColor> {
        self.colors
            .iter()
            .find(|c| c.side_type == side_type && c.id == id)
    }

    pub fn edge_colors(&self) -> impl Iterator<Item = &WangColor> {
        self.colors.iter().filter(|c| c.side_type == SideType::Edge)
    }

    pub fn corner_colors(&self) -> impl Iterator<Item = &WangColor> {
        self.colors.iter().filter(|c| c.side_type == SideType::Corner)
    }

    pub fn wang_tile(&self, tile_id: u32) -> Option<&WangTile> {
        self.tiles.iter().find(|t| t.tile_id == tile_id)
    }

    /// Color on `side` of `tile`
    pub fn color_at(&self, tile: &WangTile, side: WangSide) -> Option<&WangColor> {
        tile.wang_id
            .color_index(side)
            .and_then(|i| self.colors.get(i))
    }
}

/// Builds a [`Wangset`], numbering edge and corner colors independently in
/// the order they are added
#[derive(Debug, Clone)]
pub struct WangsetBuilder {
    wangset: Wangset,
    next_edge_id: u32,
    next_corner_id: u32,
}

impl WangsetBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            wangset: Wangset {
                name: name.into(),
                tile: None,
                colors: Vec::new(),
                tiles: Vec::new(),
                properties: None,
            },
            next_edge_id: 1,
            next_corner_id: 1,
        }
    }

    pub fn with_tile(mut self, tile: Option<u32>) -> Self {
        self.wangset.tile = tile;
        self
    }

    pub fn with_properties(mut self, properties: Option<Properties>) -> Self {
        self.wangset.properties = properties;
        self
    }

    /// Add a color and return the id it was given
    pub fn add_color(
        &mut self,
        side_type: SideType,
        name: impl Into<String>,
        color: Color,
        tile: Option<u32>,
        probability: f32,
    ) -> u32 {
        let counter = match side_type {
            SideType::Edge => &mut self.next_edge_id,
            SideType::Corner => &mut self.next_corner_id,
        };
        let id = *counter;
        *counter += 1;

        self.wangset.colors.push(WangColor {
            id,
            name: name.into(),
            side_type,
            color,
            tile,
            probability,
        });
        id
    }

    /// Decode `packed` against the colors added so far and add the tile
    pub fn add_tile(&mut self, tile_id: u32, packed: u32) -> Result<(), WangError> {
        let wang_id = decode_wang_id(packed, &self.wangset.colors)?;
        self.wangset.tiles.push(WangTile { tile_id, wang_id });
        Ok(())
    }

    pub fn build(self) -> Wangset {
        self.wangset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alternating() -> WangsetBuilder {
        let mut builder = WangsetBuilder::new("terrain");
        builder.add_color(SideType::Corner, "white", Color::WHITE, None, 1.0);
        builder.add_color(SideType::Corner, "black", Color::BLACK, None, 1.0);
        builder.add_color(SideType::Edge, "red", Color::rgb(255, 0, 0), None, 1.0);
        builder.add_color(SideType::Edge, "blue", Color::rgb(0, 0, 255), None, 1.0);
        builder
    }

    fn color_name<'a>(set: &'a Wangset, tile: &WangTile, side: WangSide) -> Option<&'a str> {
        set.color_at(tile, side).map(|c| c.name.as_str())
    }

    #[test]
    fn test_side_navigation() {
        assert_eq!(WangSide::Top.clockwise(), WangSide::TopRight);
        assert_eq!(WangSide::Top.counter_clockwise(), WangSide::TopLeft);
        assert_eq!(WangSide::TopLeft.clockwise(), WangSide::Top);
        assert_eq!(WangSide::Right.opposite(), WangSide::Left);
        assert_eq!(WangSide::BottomLeft.opposite(), WangSide::TopRight);
        assert_eq!(WangSide::Top.offset(), (0, -1));
        assert!(WangSide::TopRight.is_corner());
        assert_eq!(WangSide::Bottom.side_type(), SideType::Edge);
        for side in WangSide::ALL {
            assert_eq!(side.clockwise().counter_clockwise(), side);
            let (dx, dy) = side.offset();
            assert_eq!(side.opposite().offset(), (-dx, -dy));
        }
    }

    #[test]
    fn test_ids_count_per_side_type() {
        let set = alternating().build();
        let ids: Vec<_> = set.colors.iter().map(|c| (c.side_type, c.id)).collect();
        assert_eq!(
            ids,
            vec![
                (SideType::Corner, 1),
                (SideType::Corner, 2),
                (SideType::Edge, 1),
                (SideType::Edge, 2),
            ]
        );
        assert_eq!(set.color(SideType::Edge, 2).map(|c| c.name.as_str()), Some("blue"));
    }

    #[test]
    fn test_decode_all_sides() {
        let mut builder = alternating();
        builder.add_tile(0, 0x1111_1111).unwrap();
        let set = builder.build();
        let tile = &set.tiles[0];

        assert_eq!(tile.wang_id.len(), 8);
        for side in WangSide::ALL {
            let expected = if side.is_corner() { "white" } else { "red" };
            assert_eq!(color_name(&set, tile, side), Some(expected), "{side:?}");
        }
    }

    #[test]
    fn test_decode_partial() {
        let mut builder = alternating();
        builder.add_tile(3, 0x0211_0021).unwrap();
        let set = builder.build();
        let tile = set.wang_tile(3).unwrap();

        assert_eq!(tile.wang_id.len(), 5);
        assert_eq!(color_name(&set, tile, WangSide::Top), Some("red"));
        assert_eq!(color_name(&set, tile, WangSide::TopRight), Some("black"));
        assert_eq!(color_name(&set, tile, WangSide::Right), None);
        assert_eq!(color_name(&set, tile, WangSide::BottomRight), None);
        assert_eq!(color_name(&set, tile, WangSide::Bottom), Some("red"));
        assert_eq!(color_name(&set, tile, WangSide::BottomLeft), Some("white"));
        assert_eq!(color_name(&set, tile, WangSide::Left), Some("blue"));
        assert_eq!(color_name(&set, tile, WangSide::TopLeft), None);
    }

    #[test]
    fn test_decode_unknown_color() {
        let mut builder = alternating();
        // Third corner color on TopRight does not exist
        let err = builder.add_tile(0, 0x0000_0030).unwrap_err();
        assert_eq!(
            err,
            WangError::InvalidColor {
                side: WangSide::TopRight,
                color_id: 3
            }
        );
    }

    #[test]
    fn test_decode_empty() {
        let wang_id = decode_wang_id(0, &[]).unwrap();
        assert!(wang_id.is_empty());
    }
}
