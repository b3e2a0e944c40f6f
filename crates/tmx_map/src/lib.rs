//! TMX tile maps
//!
//! Re-exports the model from `tmx_map_core` and, with the default `loader`
//! feature, the document loader from `tmx_map_loader`.
//!
//! ```rust,ignore
//! use std::path::Path;
//! use tmx_map::prelude::*;
//!
//! let loader = TmxLoader::new(FsResourceLoader::new());
//! let map = loader.load_map("level1.tmx", Path::new("assets/maps"))?;
//! let tile = map.resolve(42)?;
//! ```

pub mod prelude;

pub use tmx_map_core as model;
pub use tmx_map_core::*;

#[cfg(feature = "loader")]
pub use tmx_map_loader as loader;

#[cfg(feature = "loader")]
pub use tmx_map_loader::{
    parse_map_from_str, render_map, render_region, FsResourceLoader, LoadError, LoaderConfig,
    MemoryResourceLoader, ResourceLoader, TmxLoader,
};

#[cfg(all(test, feature = "loader"))]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_prelude_loads_inline_map() {
        let map = crate::parse_map_from_str(
            r#"<map version="1.2" orientation="orthogonal" width="1" height="1" tilewidth="8" tileheight="8">
  <tileset firstgid="1" name="t" tilewidth="8" tileheight="8" tilecount="1" columns="1"><image source="t.png"/></tileset>
  <layer id="1" name="only" width="1" height="1"><data encoding="csv">1</data></layer>
</map>"#,
        )
        .unwrap();
        let tile: Option<&Tile> = map.resolve(1).unwrap();
        assert_eq!(tile.map(|t| t.id), Some(0));
        assert!(matches!(map.layers()[0].data, LayerData::Tiles(_)));
    }
}
