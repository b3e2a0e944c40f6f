use super::properties::parse_properties;
use super::wang::parse_wangsets;
use crate::error::LoadError;
use crate::xml::XmlElement;
use tmx_map_core::{CollisionShape, Tileset, TilesetImage};

/// Largest tile count a tileset may declare
const MAX_TILE_COUNT: u32 = 1 << 20;

/// Build a tileset from a `<tileset>` element, either inline in a map or the
/// root of a `.tsx` file
pub(crate) fn parse_tileset(element: &XmlElement) -> Result<Tileset, LoadError> {
    let name = element.string_or("name", "");
    let tile_width = element.required_positive("tilewidth")?;
    let tile_height = element.required_positive("tileheight")?;
    let columns = element.required_positive("columns")?;
    let tile_count = element.required_positive("tilecount")?;
    let spacing = element.u32_or("spacing", 0)?;
    let margin = element.u32_or("margin", 0)?;

    if tile_count > MAX_TILE_COUNT {
        return Err(LoadError::malformed(
            element.path(),
            "attribute 'tilecount'",
            tile_count.to_string(),
            format!("at most {MAX_TILE_COUNT} tiles"),
        ));
    }
    if Tileset::layout_extent(tile_width, tile_height, columns, tile_count, spacing, margin).is_none() {
        return Err(LoadError::malformed(
            element.path(),
            "tile layout",
            format!("{columns} columns of {tile_width}x{tile_height} tiles, spacing {spacing}, margin {margin}"),
            "tile rectangles within 32-bit pixel coordinates",
        ));
    }

    let image = parse_tileset_image(element.required_child("image")?)?;
    let (offset_x, offset_y) = match element.child("tileoffset") {
        Some(offset) => (offset.int_or("x", 0)?, offset.int_or("y", 0)?),
        None => (0, 0),
    };

    let mut tileset = Tileset::new(name, tile_width, tile_height, columns, tile_count, image)
        .with_spacing(spacing)
        .with_margin(margin)
        .with_tile_offset(offset_x, offset_y)
        .with_properties(parse_properties(element)?);

    for tile in element.children_named("tile") {
        parse_tile(tile, &mut tileset)?;
    }

    if let Some(wangsets) = element.child("wangsets") {
        tileset = tileset.with_wangsets(parse_wangsets(wangsets, tile_count)?);
    }

    log::trace!(
        "Tileset '{}': {} tiles, {} wangsets",
        tileset.name,
        tileset.tile_count(),
        tileset.wangsets.len()
    );
    Ok(tileset)
}

fn parse_tileset_image(image: &XmlElement) -> Result<TilesetImage, LoadError> {
    Ok(TilesetImage::new(image.required_str("source")?)
        .with_trans(image.optional_color("trans")?)
        .with_size(image.optional_u32("width")?, image.optional_u32("height")?))
}

fn parse_tile(element: &XmlElement, tileset: &mut Tileset) -> Result<(), LoadError> {
    let id = element.required_u32("id")?;
    let tile_count = tileset.tile_count();
    let Some(tile) = tileset.tile_mut(id) else {
        return Err(LoadError::malformed(
            element.path(),
            "attribute 'id'",
            id.to_string(),
            format!("a tile id below {tile_count}"),
        ));
    };

    tile.tile_type = element
        .attr("type")
        .or_else(|| element.attr("class"))
        .map(str::to_string);
    tile.properties = parse_properties(element)?;

    if let Some(group) = element.child("objectgroup") {
        for object in group.children_named("object") {
            tile.collision.push(parse_collision_shape(object)?);
        }
    }
    Ok(())
}

/// Collision shape for one object in a tile's `<objectgroup>`. Rotation
/// pivots on the object's top-left corner.
fn parse_collision_shape(object: &XmlElement) -> Result<CollisionShape, LoadError> {
    if object.has_attr("template") {
        return Err(LoadError::unsupported(object.path(), "object templates"));
    }
    for outline in ["polygon", "polyline", "point"] {
        if object.child(outline).is_some() {
            return Err(LoadError::unsupported(
                object.path(),
                format!("{outline} collision shapes"),
            ));
        }
    }

    let x = object.required_float("x")?;
    let y = object.required_float("y")?;
    let width = object.non_negative_float_or("width", 0.0)?;
    let height = object.non_negative_float_or("height", 0.0)?;
    let rotation = object.float_or("rotation", 0.0)?;

    let shape = if object.child("ellipse").is_some() {
        CollisionShape::from_ellipse(x, y, width, height, rotation)
    } else {
        CollisionShape::from_rect(x, y, width, height, rotation)
    };
    shape.map_err(|source| LoadError::Geometry {
        path: object.path().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmx_map_core::{Color, ErrorKind, Vec2};

    fn tileset(source: &str) -> Result<Tileset, LoadError> {
        parse_tileset(&XmlElement::parse(source, "test.tsx").unwrap())
    }

    const TILESET: &str = r##"<tileset name="terrain" tilewidth="16" tileheight="16" spacing="1" margin="2" tilecount="6" columns="3">
  <tileoffset x="0" y="4"/>
  <properties><property name="biome" value="forest"/></properties>
  <image source="terrain.png" trans="ff00ff" width="53" height="36"/>
  <tile id="1" type="wall">
    <objectgroup draworder="index">
      <object id="1" x="0" y="0" width="16" height="8"/>
      <object id="2" x="4" y="4" width="8" height="8"><ellipse/></object>
      <object id="3" x="0" y="0" width="10" height="10" rotation="45"/>
    </objectgroup>
  </tile>
  <tile id="4" class="water">
    <properties><property name="depth" type="int" value="3"/></properties>
  </tile>
</tileset>"##;

    #[test]
    fn test_parse_tileset() {
        let tileset = tileset(TILESET).unwrap();
        assert_eq!(tileset.name, "terrain");
        assert_eq!(tileset.tile_count(), 6);
        assert_eq!(tileset.rows(), 2);
        assert_eq!(tileset.tile_offset, (0, 4));
        assert_eq!(tileset.image.trans, Some(Color::rgb(255, 0, 255)));
        assert_eq!(tileset.properties.as_ref().unwrap().get_string("biome"), Ok("forest"));

        // margin + col * (size + spacing)
        let rect = tileset.tile(4).unwrap().rect;
        assert_eq!((rect.x, rect.y), (19, 19));
    }

    #[test]
    fn test_tile_collision() {
        let tileset = tileset(TILESET).unwrap();
        let wall = tileset.tile(1).unwrap();
        assert_eq!(wall.tile_type.as_deref(), Some("wall"));

        let names: Vec<_> = wall.collision.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Box", "Circle", "RotatedRect"]);
        let CollisionShape::Circle(circle) = &wall.collision[1] else {
            panic!("expected a circle");
        };
        assert_eq!(circle.center(), Vec2::new(8.0, 8.0));
        assert_eq!(circle.radius(), 4.0);

        let water = tileset.tile(4).unwrap();
        assert_eq!(water.tile_type.as_deref(), Some("water"));
        assert!(!water.has_collision());
        assert_eq!(water.properties.as_ref().unwrap().get_int("depth"), Ok(3));
        assert!(tileset.tile(0).unwrap().properties.is_none());
    }

    #[test]
    fn test_tile_id_out_of_range() {
        let err = tileset(
            r#"<tileset tilewidth="8" tileheight="8" tilecount="2" columns="2">
  <image source="a.png"/>
  <tile id="2"/>
</tileset>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedField);
        assert!(err.to_string().starts_with("tileset[0]:tile[0]:"));
    }

    #[test]
    fn test_missing_image() {
        let err = tileset(r#"<tileset tilewidth="8" tileheight="8" tilecount="2" columns="2"/>"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);
    }

    #[test]
    fn test_zero_columns() {
        let err = tileset(
            r#"<tileset tilewidth="8" tileheight="8" tilecount="2" columns="0"><image source="a.png"/></tileset>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedField);
    }

    #[test]
    fn test_layout_overflow() {
        let err = tileset(
            r#"<tileset tilewidth="3000000000" tileheight="8" spacing="2000000000" tilecount="4" columns="2"><image source="a.png"/></tileset>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedField);
        assert!(err.to_string().contains("tile layout"), "{err}");

        let err = tileset(
            r#"<tileset tilewidth="1" tileheight="1" tilecount="4000000000" columns="65536"><image source="a.png"/></tileset>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedField);
        assert!(err.to_string().contains("tilecount"), "{err}");
    }

    #[test]
    fn test_polygon_collision_unsupported() {
        let err = tileset(
            r#"<tileset tilewidth="8" tileheight="8" tilecount="1" columns="1">
  <image source="a.png"/>
  <tile id="0"><objectgroup><object id="1" x="0" y="0"><polygon points="0,0 4,0 4,4"/></object></objectgroup></tile>
</tileset>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFeature);
    }

    #[test]
    fn test_oval_collision_rejected() {
        let err = tileset(
            r#"<tileset tilewidth="8" tileheight="8" tilecount="1" columns="1">
  <image source="a.png"/>
  <tile id="0"><objectgroup><object id="1" x="0" y="0" width="4" height="6"><ellipse/></object></objectgroup></tile>
</tileset>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuralViolation);
    }
}
