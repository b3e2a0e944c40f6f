//! TMX/TSX loading for tmx_map
//!
//! This crate turns Tiled 1.2 XML documents into the `tmx_map_core` model:
//! - `TmxLoader` - Entry point tying a resource backend to a `LoaderConfig`
//! - `ResourceLoader` - Capability for opening files and handling images,
//!   with `FsResourceLoader` and `MemoryResourceLoader` backends
//! - `render_map` - Draws orthogonal maps through a resource backend
//!
//! # Example
//!
//! ```rust,ignore
//! use std::path::Path;
//! use tmx_map_loader::{FsResourceLoader, TmxLoader};
//!
//! let loader = TmxLoader::new(FsResourceLoader::new());
//! let map = loader.load_map("level1.tmx", Path::new("assets/maps"))?;
//! let walls = map.find_layer("walls")?;
//! ```

mod attr;
mod config;
mod error;
mod parse;
mod render;
mod resource;
mod xml;

pub use attr::{parse_bool, parse_points, parse_u32_hex_or_dec};
pub use config::LoaderConfig;
pub use error::LoadError;
pub use render::{render_map, render_region};
pub use resource::{
    compose_rgba, decode_rgba, flip_rgba, resolve_path, slice_rgba, FsResourceLoader,
    ImageTransform, MemoryResourceLoader, ResourceLoader,
};
pub use xml::XmlElement;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tmx_map_core::{MapFile, PixelRect, Tileset};

/// Loads maps and tilesets through a resource backend
#[derive(Debug, Default)]
pub struct TmxLoader<R: ResourceLoader = FsResourceLoader> {
    loader: R,
    config: LoaderConfig,
}

impl<R: ResourceLoader> TmxLoader<R> {
    pub fn new(loader: R) -> Self {
        Self::with_config(loader, LoaderConfig::default())
    }

    pub fn with_config(loader: R, config: LoaderConfig) -> Self {
        Self { loader, config }
    }

    /// The resource backend
    pub fn loader(&self) -> &R {
        &self.loader
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Open and parse a `.tmx` file. Tilesets and images it references are
    /// resolved against the file's own directory.
    pub fn load_map(&self, filename: &str, base_dir: &Path) -> Result<MapFile, LoadError> {
        log::debug!("Loading map '{filename}'");
        let bytes = self.loader.open(filename, base_dir)?;
        let source = String::from_utf8(bytes).map_err(|e| LoadError::Xml {
            file: filename.to_string(),
            message: e.to_string(),
        })?;
        let root = XmlElement::parse(&source, filename)?;
        let map = parse::parse_map(&root, &self.loader, &self.config, &map_dir(filename, base_dir))?;

        log::debug!(
            "Loaded map '{filename}': {} tilesets, {} top-level layers",
            map.tilesets.len(),
            map.layers().len()
        );
        Ok(map)
    }

    /// Parse a map held in memory, resolving references against `base_dir`
    pub fn parse_map_str(&self, source: &str, base_dir: &Path) -> Result<MapFile, LoadError> {
        let root = XmlElement::parse(source, "<memory>")?;
        parse::parse_map(&root, &self.loader, &self.config, base_dir)
    }

    /// Open and parse a standalone `.tsx` file
    pub fn load_tileset(&self, filename: &str, base_dir: &Path) -> Result<Arc<Tileset>, LoadError> {
        parse::load_tileset_file(filename, &self.loader, &self.config, base_dir)
    }

    /// Parse a tileset held in memory
    pub fn parse_tileset_str(&self, source: &str) -> Result<Tileset, LoadError> {
        parse::parse_tileset(&XmlElement::parse(source, "<memory>")?)
    }

    /// Render a map loaded from `map_dir`
    pub fn render(&self, map: &MapFile, map_dir: &Path) -> Result<R::Image, LoadError> {
        render_map(map, &self.loader, map_dir, &self.config)
    }

    pub fn render_region(&self, map: &MapFile, map_dir: &Path, region: PixelRect) -> Result<R::Image, LoadError> {
        render_region(map, &self.loader, map_dir, &self.config, region)
    }
}

/// Directory that references inside `filename` resolve against
pub fn map_dir(filename: &str, base_dir: &Path) -> PathBuf {
    resolve_path(filename, base_dir)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// Parse a self-contained map (inline tilesets only) with default settings
pub fn parse_map_from_str(source: &str) -> Result<MapFile, LoadError> {
    TmxLoader::new(MemoryResourceLoader::new()).parse_map_str(source, Path::new(""))
}
