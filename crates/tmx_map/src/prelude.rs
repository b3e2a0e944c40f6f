pub use tmx_map_core::{
    CollisionBox, CollisionCircle, CollisionRotatedRect, CollisionShape, Color, ErrorKind,
    FlipState, Layer, LayerData, LayerGroup, LayerTile, MapFile, MapObject, ObjectData,
    Properties, Tile, Tileset, TilesetEntry, Vec2, WangSide, Wangset,
};

#[cfg(feature = "loader")]
pub use tmx_map_loader::{FsResourceLoader, LoadError, LoaderConfig, ResourceLoader, TmxLoader};
