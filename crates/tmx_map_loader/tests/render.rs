use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use tmx_map_core::{ErrorKind, PixelRect};
use tmx_map_loader::{FsResourceLoader, MemoryResourceLoader, TmxLoader};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn png(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// Two 2x2 tiles: solid red, then blue with a green top-left pixel
fn sheet() -> Vec<u8> {
    let mut image = RgbaImage::new(4, 2);
    for (x, _, pixel) in image.enumerate_pixels_mut() {
        *pixel = Rgba(if x < 2 { RED } else { BLUE });
    }
    image.put_pixel(2, 0, Rgba(GREEN));
    png(&image)
}

fn map_source(layers: &str) -> String {
    format!(
        r#"<map version="1.2" orientation="orthogonal" width="2" height="1" tilewidth="2" tileheight="2">
 <tileset firstgid="1" name="sheet" tilewidth="2" tileheight="2" tilecount="2" columns="2">
  <image source="sheet.png" width="4" height="2"/>
 </tileset>
 {layers}
</map>"#
    )
}

fn memory_loader() -> TmxLoader<MemoryResourceLoader> {
    let backend = MemoryResourceLoader::new()
        .with_file("maps/sheet.png", sheet())
        .with_file("maps/sky.png", png(&RgbaImage::from_pixel(1, 1, Rgba(GREEN))));
    TmxLoader::new(backend)
}

fn render(layers: &str) -> RgbaImage {
    let loader = memory_loader();
    let map = loader.parse_map_str(&map_source(layers), Path::new("maps")).unwrap();
    loader.render(&map, Path::new("maps")).unwrap()
}

#[test]
fn render_tiles_with_flip() {
    let canvas = render(
        r#"<layer id="1" name="tiles" width="2" height="1"><data encoding="csv">1,2147483650</data></layer>"#,
    );
    assert_eq!(canvas.dimensions(), (4, 2));
    assert_eq!(canvas.get_pixel(0, 0).0, RED);
    assert_eq!(canvas.get_pixel(1, 1).0, RED);
    // Mirrored: the green pixel moves to the right edge of its cell
    assert_eq!(canvas.get_pixel(2, 0).0, BLUE);
    assert_eq!(canvas.get_pixel(3, 0).0, GREEN);
}

#[test]
fn render_skips_empty_and_hidden() {
    let canvas = render(
        r#"<layer id="1" width="2" height="1"><data encoding="csv">0,1</data></layer>
 <layer id="2" width="2" height="1" visible="0"><data encoding="csv">2,2</data></layer>"#,
    );
    assert_eq!(canvas.get_pixel(0, 0).0, CLEAR);
    assert_eq!(canvas.get_pixel(2, 0).0, RED);
}

#[test]
fn render_group_opacity_and_offset() {
    let canvas = render(
        r#"<group id="1" opacity="0.5" offsetx="2">
  <layer id="2" width="2" height="1"><data encoding="csv">1,0</data></layer>
 </group>"#,
    );
    assert_eq!(canvas.get_pixel(0, 0).0, CLEAR);
    assert_eq!(canvas.get_pixel(2, 0).0, [255, 0, 0, 128]);
}

#[test]
fn render_image_layer_and_tile_object() {
    let canvas = render(
        r#"<imagelayer id="1" offsetx="1" offsety="1"><image source="sky.png"/></imagelayer>
 <objectgroup id="2"><object id="1" gid="2" x="2" y="2" width="2" height="2"/></objectgroup>"#,
    );
    assert_eq!(canvas.get_pixel(1, 1).0, GREEN);
    assert_eq!(canvas.get_pixel(0, 0).0, CLEAR);
    // Tile objects hang above their anchor
    assert_eq!(canvas.get_pixel(2, 0).0, GREEN);
    assert_eq!(canvas.get_pixel(3, 1).0, BLUE);
}

#[test]
fn render_region_shifts_origin() {
    let loader = memory_loader();
    let source = map_source(
        r#"<layer id="1" width="2" height="1"><data encoding="csv">1,2</data></layer>"#,
    );
    let map = loader.parse_map_str(&source, Path::new("maps")).unwrap();
    let region = PixelRect {
        x: 2,
        y: 0,
        width: 2,
        height: 2,
    };
    let canvas = loader.render_region(&map, Path::new("maps"), region).unwrap();
    assert_eq!(canvas.dimensions(), (2, 2));
    assert_eq!(canvas.get_pixel(0, 0).0, GREEN);
    assert_eq!(canvas.get_pixel(1, 1).0, BLUE);
}

#[test]
fn render_isometric_unsupported() {
    let loader = memory_loader();
    let source = map_source("").replace("orthogonal", "isometric");
    let map = loader.parse_map_str(&source, Path::new("maps")).unwrap();
    let err = loader.render(&map, Path::new("maps")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFeature);
}

#[test]
fn render_oversized_map_fails() {
    let loader = memory_loader();
    let source = map_source("").replace(
        r#"width="2" height="1" tilewidth="2""#,
        r#"width="70000" height="1" tilewidth="70000""#,
    );
    let map = loader.parse_map_str(&source, Path::new("maps")).unwrap();
    assert_eq!(map.pixel_width(), 4_900_000_000);
    let err = loader.render(&map, Path::new("maps")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFeature);
}

#[test]
fn render_from_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let maps = tmp.path().join("maps");
    let tilesets = tmp.path().join("tilesets");
    std::fs::create_dir_all(&maps).unwrap();
    std::fs::create_dir_all(&tilesets).unwrap();

    std::fs::write(tilesets.join("sheet.png"), sheet()).unwrap();
    std::fs::write(
        tilesets.join("sheet.tsx"),
        r#"<tileset name="sheet" tilewidth="2" tileheight="2" tilecount="2" columns="2">
 <image source="sheet.png" trans="0000ff" width="4" height="2"/>
</tileset>"#,
    )
    .unwrap();
    std::fs::write(
        maps.join("level.tmx"),
        r#"<map version="1.2" orientation="orthogonal" width="2" height="1" tilewidth="2" tileheight="2">
 <tileset firstgid="1" source="../tilesets/sheet.tsx"/>
 <layer id="1" width="2" height="1"><data encoding="csv">1,2</data></layer>
</map>"#,
    )
    .unwrap();

    let loader = TmxLoader::new(FsResourceLoader::new());
    let map = loader.load_map("maps/level.tmx", tmp.path()).unwrap();
    let canvas = loader.render(&map, &maps).unwrap();

    assert_eq!(canvas.get_pixel(0, 0).0, RED);
    // Blue is the transparent key of this tileset
    assert_eq!(canvas.get_pixel(3, 1).0[3], 0);
    assert_eq!(canvas.get_pixel(2, 0).0, GREEN);
    assert_eq!(loader.loader().cache_len(), (1, 1));
}
