//! Tile flip flags packed into the high bits of a gid
//!
//! Tile layers store each cell as a gid whose top three bits flag a
//! horizontal, vertical and diagonal (anti-diagonal transpose) flip. The three
//! bits describe one of the eight symmetries of a square, held as a
//! [`FlipState`]: a horizontal mirror followed by a clockwise rotation.

use serde::{Deserialize, Serialize};

pub const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
pub const FLIPPED_VERTICALLY: u32 = 0x4000_0000;
pub const FLIPPED_DIAGONALLY: u32 = 0x2000_0000;
/// All flip bits
pub const FLIP_MASK: u32 = FLIPPED_HORIZONTALLY | FLIPPED_VERTICALLY | FLIPPED_DIAGONALLY;

/// Strip the flip bits from a raw gid
pub fn bare_gid(gid: u32) -> u32 {
    gid & !FLIP_MASK
}

/// One of the 8 dihedral transforms of a tile
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum FlipState {
    #[default]
    Normal,
    Rotate90,
    Rotate180,
    Rotate270,
    FlipHorizontal,
    FlipHorizontalRotate90,
    FlipHorizontalRotate180,
    FlipHorizontalRotate270,
}

impl FlipState {
    pub const ALL: [FlipState; 8] = [
        FlipState::Normal,
        FlipState::Rotate90,
        FlipState::Rotate180,
        FlipState::Rotate270,
        FlipState::FlipHorizontal,
        FlipState::FlipHorizontalRotate90,
        FlipState::FlipHorizontalRotate180,
        FlipState::FlipHorizontalRotate270,
    ];

    /// Decode the flip bits of a raw gid.
    ///
    /// The diagonal flip is applied first, then the horizontal, then the
    /// vertical one. Composing those mirrors gives the table below.
    pub fn from_gid(gid: u32) -> Self {
        let h = gid & FLIPPED_HORIZONTALLY != 0;
        let v = gid & FLIPPED_VERTICALLY != 0;
        let d = gid & FLIPPED_DIAGONALLY != 0;
        match (d, h, v) {
            (false, false, false) => FlipState::Normal,
            (false, true, false) => FlipState::FlipHorizontal,
            (false, false, true) => FlipState::FlipHorizontalRotate180,
            (false, true, true) => FlipState::Rotate180,
            (true, false, false) => FlipState::FlipHorizontalRotate270,
            (true, true, false) => FlipState::Rotate90,
            (true, false, true) => FlipState::Rotate270,
            (true, true, true) => FlipState::FlipHorizontalRotate90,
        }
    }

    /// Encode back into flip bits
    pub fn to_bits(self) -> u32 {
        match self {
            FlipState::Normal => 0,
            FlipState::FlipHorizontal => FLIPPED_HORIZONTALLY,
            FlipState::FlipHorizontalRotate180 => FLIPPED_VERTICALLY,
            FlipState::Rotate180 => FLIPPED_HORIZONTALLY | FLIPPED_VERTICALLY,
            FlipState::FlipHorizontalRotate270 => FLIPPED_DIAGONALLY,
            FlipState::Rotate90 => FLIPPED_DIAGONALLY | FLIPPED_HORIZONTALLY,
            FlipState::Rotate270 => FLIPPED_DIAGONALLY | FLIPPED_VERTICALLY,
            FlipState::FlipHorizontalRotate90 => FLIP_MASK,
        }
    }

    /// Whether the tile is mirrored before rotating
    pub fn is_mirrored(self) -> bool {
        matches!(
            self,
            FlipState::FlipHorizontal
                | FlipState::FlipHorizontalRotate90
                | FlipState::FlipHorizontalRotate180
                | FlipState::FlipHorizontalRotate270
        )
    }

    /// Clockwise rotation in quarter turns, applied after the mirror
    pub fn quarter_turns(self) -> u32 {
        match self {
            FlipState::Normal | FlipState::FlipHorizontal => 0,
            FlipState::Rotate90 | FlipState::FlipHorizontalRotate90 => 1,
            FlipState::Rotate180 | FlipState::FlipHorizontalRotate180 => 2,
            FlipState::Rotate270 | FlipState::FlipHorizontalRotate270 => 3,
        }
    }

    /// Whether width and height trade places
    pub fn swaps_axes(self) -> bool {
        self.quarter_turns() % 2 == 1
    }

    /// Map a point relative to the tile center, y pointing down
    pub fn transform(self, x: f32, y: f32) -> (f32, f32) {
        let (mut x, mut y) = if self.is_mirrored() { (-x, y) } else { (x, y) };
        for _ in 0..self.quarter_turns() {
            (x, y) = (-y, x);
        }
        (x, y)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FlipState::Normal => "Normal",
            FlipState::Rotate90 => "Rotate 90",
            FlipState::Rotate180 => "Rotate 180",
            FlipState::Rotate270 => "Rotate 270",
            FlipState::FlipHorizontal => "Flip Horizontal",
            FlipState::FlipHorizontalRotate90 => "Flip Horizontal, Rotate 90",
            FlipState::FlipHorizontalRotate180 => "Flip Horizontal, Rotate 180",
            FlipState::FlipHorizontalRotate270 => "Flip Horizontal, Rotate 270",
        }
    }
}
