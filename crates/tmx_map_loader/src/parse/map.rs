use super::layer::{is_layer_element, parse_layer};
use super::properties::parse_properties;
use super::tileset::parse_tileset;
use super::LayerContext;
use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::resource::ResourceLoader;
use crate::xml::XmlElement;
use std::path::Path;
use std::sync::Arc;
use tmx_map_core::{
    Color, Layer, LayerData, LayerGroup, MapFile, Orientation, RenderOrder, Stagger, StaggerAxis,
    StaggerIndex, Tileset, TilesetEntry,
};

/// Build a map from its `<map>` root element.
///
/// Tilesets are collected in document order and must all come before the
/// first layer. External tilesets are opened through `loader` relative to
/// `base_dir`.
pub(crate) fn parse_map<R: ResourceLoader>(
    root: &XmlElement,
    loader: &R,
    config: &LoaderConfig,
    base_dir: &Path,
) -> Result<MapFile, LoadError> {
    if root.name() != "map" {
        return Err(LoadError::structure(
            root.path(),
            format!("expected a <map> document, found <{}>", root.name()),
        ));
    }

    let version = root.required_str("version")?;
    if version != config.supported_version {
        return Err(LoadError::unsupported(
            root.path(),
            format!("map version '{version}' (expected '{}')", config.supported_version),
        ));
    }
    if root.bool_or("infinite", false)? {
        return Err(LoadError::unsupported(root.path(), "infinite maps"));
    }

    let orientation = root.required_enum(
        "orientation",
        "orthogonal, isometric, staggered or hexagonal",
        Orientation::from_name,
    )?;
    let mut map = MapFile::new(
        root.required_u32("width")?,
        root.required_u32("height")?,
        root.required_positive("tilewidth")?,
        root.required_positive("tileheight")?,
    );
    map.version = version.to_string();
    map.orientation = orientation;
    map.render_order = root.enum_or(
        "renderorder",
        "right-down, right-up, left-down or left-up",
        RenderOrder::RightDown,
        RenderOrder::from_name,
    )?;
    map.stagger = parse_stagger(root, orientation)?;
    map.background_color = root.color_or("backgroundcolor", Color::TRANSPARENT)?;
    map.properties = parse_properties(root)?;

    let forbid_flips = orientation == Orientation::Hexagonal && !config.allow_flipped_hexagonal;
    let mut layers: Vec<Layer> = Vec::new();

    for child in root.children() {
        match child.name() {
            "tileset" => {
                if !layers.is_empty() {
                    return Err(LoadError::structure(
                        child.path(),
                        "tileset declared after the first layer",
                    ));
                }
                let entry = parse_tileset_entry(child, loader, config, base_dir)?;
                map.tilesets.push(entry);
            }
            name if is_layer_element(name) => {
                let ctx = LayerContext {
                    tilesets: &map.tilesets,
                    forbid_flips,
                };
                layers.push(parse_layer(child, &ctx)?);
            }
            "properties" | "editorsettings" => {}
            other => {
                return Err(LoadError::structure(
                    child.path(),
                    format!("unexpected <{other}> in <map>"),
                ))
            }
        }
    }

    map.root = Layer::new(-1, "root", LayerData::Group(LayerGroup::new(layers)));
    Ok(map)
}

fn parse_stagger(root: &XmlElement, orientation: Orientation) -> Result<Option<Stagger>, LoadError> {
    if !orientation.is_staggered() {
        return Ok(None);
    }

    let axis = root.required_enum("staggeraxis", "x or y", |s| match s {
        "x" => Some(StaggerAxis::X),
        "y" => Some(StaggerAxis::Y),
        _ => None,
    })?;
    let index = root.required_enum("staggerindex", "odd or even", |s| match s {
        "odd" => Some(StaggerIndex::Odd),
        "even" => Some(StaggerIndex::Even),
        _ => None,
    })?;
    let hex_side_length = match orientation {
        Orientation::Hexagonal => Some(root.required_float("hexsidelength")?),
        _ => None,
    };

    Ok(Some(Stagger {
        axis,
        index,
        hex_side_length,
    }))
}

fn parse_tileset_entry<R: ResourceLoader>(
    element: &XmlElement,
    loader: &R,
    config: &LoaderConfig,
    base_dir: &Path,
) -> Result<TilesetEntry, LoadError> {
    let first_gid = element.required_positive("firstgid")?;
    match element.attr("source") {
        Some(source) => {
            let tileset = load_tileset_file(source, loader, config, base_dir)?;
            let mut entry = TilesetEntry::new(first_gid, tileset);
            entry.source = Some(source.to_string());
            Ok(entry)
        }
        None => Ok(TilesetEntry::new(first_gid, Arc::new(parse_tileset(element)?))),
    }
}

/// Open and parse a `.tsx` file, going through the tileset cache when the
/// config enables it
pub(crate) fn load_tileset_file<R: ResourceLoader>(
    filename: &str,
    loader: &R,
    config: &LoaderConfig,
    base_dir: &Path,
) -> Result<Arc<Tileset>, LoadError> {
    if config.use_cache {
        if let Some(tileset) = loader.cached_tileset(filename, base_dir) {
            log::debug!("Tileset cache hit for '{filename}'");
            return Ok(tileset);
        }
        log::debug!("Tileset cache miss for '{filename}'");
    }

    let bytes = loader.open(filename, base_dir)?;
    let source = String::from_utf8(bytes).map_err(|e| LoadError::Xml {
        file: filename.to_string(),
        message: e.to_string(),
    })?;
    let root = XmlElement::parse(&source, filename)?;
    if root.name() != "tileset" {
        return Err(LoadError::structure(
            root.path(),
            format!("expected a <tileset> document in '{filename}', found <{}>", root.name()),
        ));
    }

    let tileset = Arc::new(parse_tileset(&root)?);
    if config.use_cache {
        loader.cache_tileset(filename, base_dir, tileset.clone());
    }
    Ok(tileset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::MemoryResourceLoader;
    use tmx_map_core::ErrorKind;

    const TSX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset name="ext" tilewidth="8" tileheight="8" tilecount="4" columns="2">
  <image source="ext.png" width="16" height="16"/>
</tileset>"#;

    fn parse(source: &str) -> Result<MapFile, LoadError> {
        parse_with(source, &LoaderConfig::default())
    }

    fn parse_with(source: &str, config: &LoaderConfig) -> Result<MapFile, LoadError> {
        let loader = MemoryResourceLoader::new().with_file("maps/ext.tsx", TSX);
        let root = XmlElement::parse(source, "test.tmx").unwrap();
        parse_map(&root, &loader, config, Path::new("maps"))
    }

    #[test]
    fn test_minimal_map() {
        let map = parse(
            r##"<map version="1.2" orientation="orthogonal" width="2" height="1" tilewidth="8" tileheight="8" backgroundcolor="#112233">
  <tileset firstgid="1" source="ext.tsx"/>
  <layer id="1" name="a" width="2" height="1"><data encoding="csv">1,4</data></layer>
</map>"##,
        )
        .unwrap();

        assert_eq!(map.version, "1.2");
        assert_eq!(map.render_order, RenderOrder::RightDown);
        assert_eq!(map.background_color, Color::rgb(0x11, 0x22, 0x33));
        assert_eq!(map.tilesets[0].source.as_deref(), Some("ext.tsx"));
        assert_eq!(map.tilesets[0].tileset.name, "ext");
        assert_eq!(map.root.id, -1);
        assert_eq!(map.root.name, "root");
        assert_eq!(map.layers().len(), 1);
        assert_eq!(map.resolve(4).unwrap().unwrap().id, 3);
        assert!(map.stagger.is_none());
    }

    #[test]
    fn test_wrong_version() {
        let err = parse(r#"<map version="1.0" orientation="orthogonal" width="1" height="1" tilewidth="8" tileheight="8"/>"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFeature);

        let config = LoaderConfig {
            supported_version: "1.0".to_string(),
            ..Default::default()
        };
        assert!(parse_with(
            r#"<map version="1.0" orientation="orthogonal" width="1" height="1" tilewidth="8" tileheight="8"/>"#,
            &config
        )
        .is_ok());
    }

    #[test]
    fn test_bad_orientation_and_render_order() {
        let err = parse(r#"<map version="1.2" orientation="round" width="1" height="1" tilewidth="8" tileheight="8"/>"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedField);

        let err = parse(
            r#"<map version="1.2" orientation="orthogonal" renderorder="up" width="1" height="1" tilewidth="8" tileheight="8"/>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedField);

        let err = parse(r#"<map version="1.2" width="1" height="1" tilewidth="8" tileheight="8"/>"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);
    }

    #[test]
    fn test_hexagonal_needs_stagger() {
        let err = parse(
            r#"<map version="1.2" orientation="hexagonal" staggeraxis="y" staggerindex="odd" width="1" height="1" tilewidth="8" tileheight="8"/>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);

        let map = parse(
            r#"<map version="1.2" orientation="hexagonal" staggeraxis="y" staggerindex="odd" hexsidelength="4" width="1" height="1" tilewidth="8" tileheight="8"/>"#,
        )
        .unwrap();
        let stagger = map.stagger.unwrap();
        assert_eq!(stagger.axis, StaggerAxis::Y);
        assert_eq!(stagger.hex_side_length, Some(4.0));

        let err = parse(
            r#"<map version="1.2" orientation="staggered" staggeraxis="y" width="1" height="1" tilewidth="8" tileheight="8"/>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);
    }

    #[test]
    fn test_hexagonal_flips() {
        let source = r#"<map version="1.2" orientation="hexagonal" staggeraxis="y" staggerindex="odd" hexsidelength="4" width="1" height="1" tilewidth="8" tileheight="8">
  <tileset firstgid="1" source="ext.tsx"/>
  <layer id="1" width="1" height="1"><data encoding="csv">2147483649</data></layer>
</map>"#;
        assert_eq!(parse(source).unwrap_err().kind(), ErrorKind::UnsupportedFeature);

        let config = LoaderConfig {
            allow_flipped_hexagonal: true,
            ..Default::default()
        };
        assert!(parse_with(source, &config).is_ok());
    }

    #[test]
    fn test_tileset_after_layer() {
        let err = parse(
            r#"<map version="1.2" orientation="orthogonal" width="1" height="1" tilewidth="8" tileheight="8">
  <layer id="1" width="1" height="1"><data encoding="csv">0</data></layer>
  <tileset firstgid="1" source="ext.tsx"/>
</map>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuralViolation);
    }

    #[test]
    fn test_unknown_element() {
        let err = parse(
            r#"<map version="1.2" orientation="orthogonal" width="1" height="1" tilewidth="8" tileheight="8"><spline/></map>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuralViolation);
    }

    #[test]
    fn test_infinite_unsupported() {
        let err = parse(
            r#"<map version="1.2" orientation="orthogonal" infinite="1" width="1" height="1" tilewidth="8" tileheight="8"/>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFeature);
    }

    #[test]
    fn test_missing_external_tileset() {
        let err = parse(
            r#"<map version="1.2" orientation="orthogonal" width="1" height="1" tilewidth="8" tileheight="8">
  <tileset firstgid="1" source="nope.tsx"/>
</map>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvableReference);
    }

    #[test]
    fn test_external_tileset_cache() {
        let loader = MemoryResourceLoader::new().with_file("maps/ext.tsx", TSX);
        let config = LoaderConfig::default();
        let a = load_tileset_file("ext.tsx", &loader, &config, Path::new("maps")).unwrap();
        let b = load_tileset_file("ext.tsx", &loader, &config, Path::new("maps")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loader.cache_len(), (1, 0));

        let uncached = config.with_cache(false);
        let c = load_tileset_file("ext.tsx", &loader, &uncached, Path::new("maps")).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(*a, *c);
    }
}
