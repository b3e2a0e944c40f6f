//! Resource access for the loader: opening files, decoding and compositing
//! images, and caching tilesets and images between loads
//!
//! - `ResourceLoader` - Capability trait the builders and renderer go through
//! - `FsResourceLoader` - Reads from the file system
//! - `MemoryResourceLoader` - Serves in-memory files, handy for tests and
//!   embedded assets
//!
//! Both bundled backends decode to `image::RgbaImage`. Caches are keyed by
//! `(filename, base directory)` and assume a populated entry is still valid.

use crate::error::LoadError;
use image::{imageops, Rgba, RgbaImage};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tmx_map_core::{Color, FlipState, PixelRect, Tileset};

/// Where and how to draw an image onto another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageTransform {
    pub x: i32,
    pub y: i32,
    /// Multiplied into the source alpha, in [0, 1]
    pub opacity: f32,
    pub flip: FlipState,
}

impl ImageTransform {
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            opacity: 1.0,
            flip: FlipState::Normal,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_flip(mut self, flip: FlipState) -> Self {
        self.flip = flip;
        self
    }
}

/// Capability the loader needs from its environment
pub trait ResourceLoader {
    type Image: Clone;

    /// Read `filename`, resolved against `base_dir`
    fn open(&self, filename: &str, base_dir: &Path) -> Result<Vec<u8>, LoadError>;

    /// Decode image bytes, keying out `trans` when given
    fn decode_image(&self, bytes: &[u8], name: &str, trans: Option<Color>) -> Result<Self::Image, LoadError>;

    /// Copy a sub-rectangle
    fn slice_image(&self, image: &Self::Image, rect: PixelRect) -> Self::Image;

    /// Fully transparent image
    fn blank_image(&self, width: u32, height: u32) -> Self::Image;

    /// Draw `image` onto `base`
    fn compose(&self, base: &mut Self::Image, image: &Self::Image, transform: ImageTransform);

    fn image_size(&self, image: &Self::Image) -> (u32, u32);

    fn cached_tileset(&self, _filename: &str, _base_dir: &Path) -> Option<Arc<Tileset>> {
        None
    }

    fn cache_tileset(&self, _filename: &str, _base_dir: &Path, _tileset: Arc<Tileset>) {}

    fn cached_image(&self, _filename: &str, _base_dir: &Path) -> Option<Self::Image> {
        None
    }

    fn cache_image(&self, _filename: &str, _base_dir: &Path, _image: Self::Image) {}

    /// Open and decode an image, going through the image cache when `use_cache`
    fn load_image(
        &self,
        filename: &str,
        base_dir: &Path,
        trans: Option<Color>,
        use_cache: bool,
    ) -> Result<Self::Image, LoadError> {
        if use_cache {
            if let Some(image) = self.cached_image(filename, base_dir) {
                log::debug!("Image cache hit for '{filename}'");
                return Ok(image);
            }
        }

        let bytes = self.open(filename, base_dir)?;
        let image = self.decode_image(&bytes, filename, trans)?;
        if use_cache {
            self.cache_image(filename, base_dir, image.clone());
        }
        Ok(image)
    }
}

/// Resolve `filename` against `base_dir`, folding `.` and `..` lexically
pub fn resolve_path(filename: &str, base_dir: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in base_dir.join(filename).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

type CacheKey = (String, PathBuf);

/// Tileset and image caches shared by the bundled backends
#[derive(Debug, Default)]
struct ResourceCache {
    tilesets: Mutex<HashMap<CacheKey, Arc<Tileset>>>,
    images: Mutex<HashMap<CacheKey, RgbaImage>>,
}

impl ResourceCache {
    fn key(filename: &str, base_dir: &Path) -> CacheKey {
        (filename.to_string(), base_dir.to_path_buf())
    }

    fn tileset(&self, filename: &str, base_dir: &Path) -> Option<Arc<Tileset>> {
        let cache = self.tilesets.lock().ok()?;
        cache.get(&Self::key(filename, base_dir)).cloned()
    }

    fn put_tileset(&self, filename: &str, base_dir: &Path, tileset: Arc<Tileset>) {
        if let Ok(mut cache) = self.tilesets.lock() {
            cache.insert(Self::key(filename, base_dir), tileset);
        }
    }

    fn image(&self, filename: &str, base_dir: &Path) -> Option<RgbaImage> {
        let cache = self.images.lock().ok()?;
        cache.get(&Self::key(filename, base_dir)).cloned()
    }

    fn put_image(&self, filename: &str, base_dir: &Path, image: RgbaImage) {
        if let Ok(mut cache) = self.images.lock() {
            cache.insert(Self::key(filename, base_dir), image);
        }
    }

    fn len(&self) -> (usize, usize) {
        let tilesets = self.tilesets.lock().map(|c| c.len()).unwrap_or(0);
        let images = self.images.lock().map(|c| c.len()).unwrap_or(0);
        (tilesets, images)
    }
}

/// Decode to RGBA and key out the transparent color
pub fn decode_rgba(bytes: &[u8], name: &str, trans: Option<Color>) -> Result<RgbaImage, LoadError> {
    let mut image = image::load_from_memory(bytes)
        .map_err(|e| LoadError::Image {
            file: name.to_string(),
            message: e.to_string(),
        })?
        .to_rgba8();

    if let Some(key) = trans {
        for pixel in image.pixels_mut() {
            let [r, g, b, _] = pixel.0;
            if key.same_rgb(&Color::rgb(r, g, b)) {
                pixel.0[3] = 0;
            }
        }
    }
    Ok(image)
}

/// Copy a sub-rectangle, clipped to the image
pub fn slice_rgba(image: &RgbaImage, rect: PixelRect) -> RgbaImage {
    imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image()
}

/// Apply a flip state: mirror horizontally, then rotate clockwise
pub fn flip_rgba(image: &RgbaImage, flip: FlipState) -> RgbaImage {
    let mirrored = if flip.is_mirrored() {
        imageops::flip_horizontal(image)
    } else {
        image.clone()
    };
    match flip.quarter_turns() {
        1 => imageops::rotate90(&mirrored),
        2 => imageops::rotate180(&mirrored),
        3 => imageops::rotate270(&mirrored),
        _ => mirrored,
    }
}

/// Alpha-blend `image` onto `base` with the transform, clipping at the edges
pub fn compose_rgba(base: &mut RgbaImage, image: &RgbaImage, transform: ImageTransform) {
    let source = flip_rgba(image, transform.flip);
    let opacity = transform.opacity.clamp(0.0, 1.0);

    for (sx, sy, pixel) in source.enumerate_pixels() {
        let x = transform.x + sx as i32;
        let y = transform.y + sy as i32;
        if x < 0 || y < 0 || x as u32 >= base.width() || y as u32 >= base.height() {
            continue;
        }
        let dst = base.get_pixel_mut(x as u32, y as u32);
        *dst = blend(*dst, *pixel, opacity);
    }
}

/// Source-over blend in straight alpha
fn blend(dst: Rgba<u8>, src: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let sa = src.0[3] as f32 / 255.0 * opacity;
    if sa <= 0.0 {
        return dst;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src.0[i] as f32 * sa + dst.0[i] as f32 * da * (1.0 - sa)) / out_a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    Rgba(out)
}

macro_rules! rgba_image_ops {
    () => {
        type Image = RgbaImage;

        fn decode_image(&self, bytes: &[u8], name: &str, trans: Option<Color>) -> Result<RgbaImage, LoadError> {
            decode_rgba(bytes, name, trans)
        }

        fn slice_image(&self, image: &RgbaImage, rect: PixelRect) -> RgbaImage {
            slice_rgba(image, rect)
        }

        fn blank_image(&self, width: u32, height: u32) -> RgbaImage {
            RgbaImage::new(width, height)
        }

        fn compose(&self, base: &mut RgbaImage, image: &RgbaImage, transform: ImageTransform) {
            compose_rgba(base, image, transform)
        }

        fn image_size(&self, image: &RgbaImage) -> (u32, u32) {
            image.dimensions()
        }

        fn cached_tileset(&self, filename: &str, base_dir: &Path) -> Option<Arc<Tileset>> {
            self.cache.tileset(filename, base_dir)
        }

        fn cache_tileset(&self, filename: &str, base_dir: &Path, tileset: Arc<Tileset>) {
            self.cache.put_tileset(filename, base_dir, tileset)
        }

        fn cached_image(&self, filename: &str, base_dir: &Path) -> Option<RgbaImage> {
            self.cache.image(filename, base_dir)
        }

        fn cache_image(&self, filename: &str, base_dir: &Path, image: RgbaImage) {
            self.cache.put_image(filename, base_dir, image)
        }
    };
}

/// Reads resources from the file system
#[derive(Debug, Default)]
pub struct FsResourceLoader {
    cache: ResourceCache,
}

impl FsResourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached tilesets and images
    pub fn cache_len(&self) -> (usize, usize) {
        self.cache.len()
    }
}

impl ResourceLoader for FsResourceLoader {
    rgba_image_ops!();

    fn open(&self, filename: &str, base_dir: &Path) -> Result<Vec<u8>, LoadError> {
        let path = resolve_path(filename, base_dir);
        log::trace!("Reading {}", path.display());
        std::fs::read(&path).map_err(|source| LoadError::Io {
            file: path.display().to_string(),
            source,
        })
    }
}

/// Serves resources from memory, keyed by their resolved path
#[derive(Debug, Default)]
pub struct MemoryResourceLoader {
    files: HashMap<PathBuf, Vec<u8>>,
    cache: ResourceCache,
}

impl MemoryResourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file. `path` is resolved the same way lookups are.
    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.files.insert(resolve_path(path, Path::new("")), bytes.into());
    }

    pub fn with_file(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    /// Number of cached tilesets and images
    pub fn cache_len(&self) -> (usize, usize) {
        self.cache.len()
    }
}

impl ResourceLoader for MemoryResourceLoader {
    rgba_image_ops!();

    fn open(&self, filename: &str, base_dir: &Path) -> Result<Vec<u8>, LoadError> {
        let path = resolve_path(filename, base_dir);
        self.files.get(&path).cloned().ok_or_else(|| LoadError::Io {
            file: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such in-memory file"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png(image: &RgbaImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    fn quadrants() -> RgbaImage {
        // 2x2: red, green / blue, white
        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        image.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        image.put_pixel(1, 1, Rgba([255, 255, 255, 255]));
        image
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path("tiles.tsx", Path::new("maps")), PathBuf::from("maps/tiles.tsx"));
        assert_eq!(
            resolve_path("../art/./a.png", Path::new("maps/level1")),
            PathBuf::from("maps/art/a.png")
        );
        assert_eq!(resolve_path("a.png", Path::new("")), PathBuf::from("a.png"));
    }

    #[test]
    fn test_memory_open() {
        let loader = MemoryResourceLoader::new().with_file("maps/a.tsx", "<tileset/>");
        assert_eq!(loader.open("a.tsx", Path::new("maps")).unwrap(), b"<tileset/>");
        let err = loader.open("b.tsx", Path::new("maps")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_decode_with_trans() {
        let bytes = png(&quadrants());
        let image = decode_rgba(&bytes, "q.png", Some(Color::WHITE)).unwrap();
        assert_eq!(image.get_pixel(1, 1).0[3], 0);
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode_rgba(b"not an image", "x.png", None).unwrap_err();
        assert!(matches!(err, LoadError::Image { .. }));
    }

    #[test]
    fn test_flip_matches_point_transform() {
        let image = quadrants();
        for flip in FlipState::ALL {
            let flipped = flip_rgba(&image, flip);
            for (x, y, pixel) in image.enumerate_pixels() {
                // Pixel centers relative to the image center
                let (fx, fy) = flip.transform(x as f32 - 0.5, y as f32 - 0.5);
                let (nx, ny) = ((fx + 0.5) as u32, (fy + 0.5) as u32);
                assert_eq!(flipped.get_pixel(nx, ny), pixel, "{flip:?} at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_compose_opacity_and_clipping() {
        let mut base = RgbaImage::new(2, 2);
        let src = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 255]));
        compose_rgba(&mut base, &src, ImageTransform::at(1, 1).with_opacity(0.5));

        assert_eq!(base.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(base.get_pixel(1, 1).0, [200, 100, 50, 128]);
    }

    #[test]
    fn test_load_image_uses_cache() {
        let loader = MemoryResourceLoader::new().with_file("q.png", png(&quadrants()));
        let first = loader.load_image("q.png", Path::new(""), None, true).unwrap();
        assert_eq!(loader.cache_len(), (0, 1));
        let second = loader.load_image("q.png", Path::new(""), None, true).unwrap();
        assert_eq!(first, second);

        let uncached = MemoryResourceLoader::new().with_file("q.png", png(&quadrants()));
        uncached.load_image("q.png", Path::new(""), None, false).unwrap();
        assert_eq!(uncached.cache_len(), (0, 0));
    }

    #[test]
    fn test_slice() {
        let image = quadrants();
        let piece = slice_rgba(
            &image,
            PixelRect {
                x: 1,
                y: 0,
                width: 1,
                height: 2,
            },
        );
        assert_eq!(piece.dimensions(), (1, 2));
        assert_eq!(piece.get_pixel(0, 1).0, [255, 255, 255, 255]);
    }
}
