//! Draw a map into a single image through a [`ResourceLoader`]
//!
//! Only orthogonal maps are drawn. Tiles are bottom-aligned in their cell
//! and shifted by their tileset's tile offset. Tile objects anchor at their
//! bottom-left corner and are drawn unscaled and unrotated.

use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::resource::{ImageTransform, ResourceLoader};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tmx_map_core::{
    FlatLayer, LayerData, LayerTile, MapFile, Orientation, PixelRect, RenderOrder, TilesetEntry,
};

/// Render the whole map
pub fn render_map<R: ResourceLoader>(
    map: &MapFile,
    loader: &R,
    base_dir: &Path,
    config: &LoaderConfig,
) -> Result<R::Image, LoadError> {
    let canvas_side = |pixels: u64, field: &str| {
        u32::try_from(pixels).map_err(|_| {
            LoadError::unsupported("map[0]", format!("rendering a map {pixels} pixels in {field}"))
        })
    };
    let region = PixelRect {
        x: 0,
        y: 0,
        width: canvas_side(map.pixel_width(), "width")?,
        height: canvas_side(map.pixel_height(), "height")?,
    };
    render_region(map, loader, base_dir, config, region)
}

/// Render the pixels of `region`. The result is `region.width` by
/// `region.height`; anything drawn outside is clipped.
pub fn render_region<R: ResourceLoader>(
    map: &MapFile,
    loader: &R,
    base_dir: &Path,
    config: &LoaderConfig,
    region: PixelRect,
) -> Result<R::Image, LoadError> {
    if map.orientation != Orientation::Orthogonal {
        return Err(LoadError::unsupported(
            "map[0]",
            format!("rendering {} maps", map.orientation.name()),
        ));
    }

    let bytes = u64::from(region.width)
        .checked_mul(u64::from(region.height))
        .and_then(|pixels| pixels.checked_mul(4));
    if !bytes.is_some_and(|bytes| usize::try_from(bytes).is_ok_and(|b| b <= isize::MAX as usize)) {
        return Err(LoadError::unsupported(
            "map[0]",
            format!("rendering a {}x{} canvas", region.width, region.height),
        ));
    }

    log::debug!(
        "Rendering {}x{} region at ({}, {})",
        region.width,
        region.height,
        region.x,
        region.y
    );

    let mut renderer = Renderer {
        map,
        loader,
        base_dir,
        config,
        origin: (region.x as i32, region.y as i32),
        sheets: HashMap::new(),
        tiles: HashMap::new(),
    };
    let mut canvas = loader.blank_image(region.width, region.height);

    for flat in map.root_group().flatten() {
        if !flat.visible || flat.opacity <= 0.0 {
            continue;
        }
        renderer.draw_layer(&mut canvas, &flat)?;
    }
    Ok(canvas)
}

struct Renderer<'a, R: ResourceLoader> {
    map: &'a MapFile,
    loader: &'a R,
    base_dir: &'a Path,
    config: &'a LoaderConfig,
    origin: (i32, i32),
    /// Tileset images by entry index
    sheets: HashMap<usize, R::Image>,
    /// Sliced tiles by (entry index, local id)
    tiles: HashMap<(usize, u32), R::Image>,
}

impl<R: ResourceLoader> Renderer<'_, R> {
    fn draw_layer(&mut self, canvas: &mut R::Image, flat: &FlatLayer) -> Result<(), LoadError> {
        let (offset_x, offset_y) = (flat.offset.x.round() as i32, flat.offset.y.round() as i32);

        match &flat.layer.data {
            LayerData::Tiles(tiles) => {
                let (tw, th) = (self.map.tile_width as i32, self.map.tile_height as i32);
                for (x, y) in cell_order(self.map.render_order, tiles.width, tiles.height) {
                    let Some(tile) = tiles.tile(x, y) else {
                        continue;
                    };
                    let cell_x = x as i32 * tw + offset_x;
                    let cell_bottom = (y as i32 + 1) * th + offset_y;
                    self.draw_tile(canvas, tile, cell_x, cell_bottom, flat.opacity)?;
                }
            }
            LayerData::Image(image) => {
                let picture = self
                    .loader
                    .load_image(&image.source, self.base_dir, image.trans, self.config.use_cache)?;
                let transform = self.at(offset_x, offset_y).with_opacity(flat.opacity);
                self.loader.compose(canvas, &picture, transform);
            }
            LayerData::Objects(objects) => {
                for object in objects.objects.iter().filter(|o| o.visible) {
                    if let Some(tile) = object.as_tile() {
                        let x = object.position.x.round() as i32 + offset_x;
                        let bottom = object.position.y.round() as i32 + offset_y;
                        self.draw_tile(canvas, tile, x, bottom, flat.opacity)?;
                    }
                }
            }
            LayerData::Group(_) => {}
        }

        log::trace!("Drew layer '{}'", flat.layer.name);
        Ok(())
    }

    /// Draw a tile whose bottom-left corner sits at (x, bottom)
    fn draw_tile(
        &mut self,
        canvas: &mut R::Image,
        tile: LayerTile,
        x: i32,
        bottom: i32,
        opacity: f32,
    ) -> Result<(), LoadError> {
        let Some(entry) = self.map.tilesets.get(tile.tileset) else {
            return Ok(());
        };
        let (dx, dy) = entry.tileset.tile_offset;
        let height = entry.tileset.tile_height as i32;

        let image = self.tile_image(tile)?;
        let transform = self
            .at(x + dx, bottom - height + dy)
            .with_opacity(opacity)
            .with_flip(tile.flip);
        self.loader.compose(canvas, &image, transform);
        Ok(())
    }

    fn tile_image(&mut self, tile: LayerTile) -> Result<R::Image, LoadError> {
        if let Some(image) = self.tiles.get(&(tile.tileset, tile.id)) {
            return Ok(image.clone());
        }

        let map = self.map;
        let Some(entry) = map.tilesets.get(tile.tileset) else {
            return Err(LoadError::structure("map[0]", format!("no tileset entry {}", tile.tileset)));
        };
        if !self.sheets.contains_key(&tile.tileset) {
            let dir = image_dir(entry, self.base_dir);
            let image = &entry.tileset.image;
            let sheet = self
                .loader
                .load_image(&image.source, &dir, image.trans, self.config.use_cache)?;
            self.sheets.insert(tile.tileset, sheet);
        }

        let Some(sheet) = self.sheets.get(&tile.tileset) else {
            return Err(LoadError::structure("map[0]", "tileset image was not loaded"));
        };
        let image = self.loader.slice_image(sheet, entry.tileset.tile_rect(tile.id));
        self.tiles.insert((tile.tileset, tile.id), image.clone());
        Ok(image)
    }

    fn at(&self, x: i32, y: i32) -> ImageTransform {
        ImageTransform::at(x - self.origin.0, y - self.origin.1)
    }
}

/// Directory tileset image paths are relative to: the map directory for
/// inline tilesets, the `.tsx` file's directory otherwise
fn image_dir(entry: &TilesetEntry, base_dir: &Path) -> PathBuf {
    match entry.source.as_deref().and_then(|s| Path::new(s).parent()) {
        Some(parent) => base_dir.join(parent),
        None => base_dir.to_path_buf(),
    }
}

/// Cell visiting order for a render order
fn cell_order(order: RenderOrder, width: u32, height: u32) -> Vec<(u32, u32)> {
    let rows: Vec<u32> = match order {
        RenderOrder::RightDown | RenderOrder::LeftDown => (0..height).collect(),
        RenderOrder::RightUp | RenderOrder::LeftUp => (0..height).rev().collect(),
    };
    let columns: Vec<u32> = match order {
        RenderOrder::RightDown | RenderOrder::RightUp => (0..width).collect(),
        RenderOrder::LeftDown | RenderOrder::LeftUp => (0..width).rev().collect(),
    };
    rows.iter()
        .flat_map(|&y| columns.iter().map(move |&x| (x, y)))
        .collect()
}
