use super::properties::parse_properties;
use crate::error::LoadError;
use crate::xml::XmlElement;
use tmx_map_core::{Color, SideType, Wangset, WangsetBuilder};

/// Read every `<wangset>` under `<wangsets>`. Wang tiles must name one of the
/// `tile_count` tiles of the owning tileset.
pub(crate) fn parse_wangsets(element: &XmlElement, tile_count: u32) -> Result<Vec<Wangset>, LoadError> {
    element
        .children_named("wangset")
        .map(|wangset| parse_wangset(wangset, tile_count))
        .collect()
}

/// Optional tile reference where a negative id means "none"
fn tile_ref(element: &XmlElement) -> Result<Option<u32>, LoadError> {
    Ok(element
        .optional_int("tile")?
        .and_then(|tile| u32::try_from(tile).ok()))
}

fn parse_wangset(element: &XmlElement, tile_count: u32) -> Result<Wangset, LoadError> {
    let name = element.required_str("name")?;
    let mut builder = WangsetBuilder::new(name)
        .with_tile(tile_ref(element)?)
        .with_properties(parse_properties(element)?);

    // Colors first so tiles may reference any of them
    for child in element.children() {
        match child.name() {
            "wangcornercolor" => add_color(&mut builder, child, SideType::Corner)?,
            "wangedgecolor" => add_color(&mut builder, child, SideType::Edge)?,
            "wangcornercolors" => {
                for color in child.children_named("wangcornercolor") {
                    add_color(&mut builder, color, SideType::Corner)?;
                }
            }
            "wangedgecolors" => {
                for color in child.children_named("wangedgecolor") {
                    add_color(&mut builder, color, SideType::Edge)?;
                }
            }
            "wangcolor" => {
                return Err(LoadError::unsupported(
                    child.path(),
                    "<wangcolor> (mixed wangsets need corner and edge colors)",
                ))
            }
            "wangtile" | "properties" => {}
            other => {
                return Err(LoadError::structure(
                    child.path(),
                    format!("unexpected <{other}> in <wangset>"),
                ))
            }
        }
    }

    for tile in element.children_named("wangtile") {
        let tile_id = tile.required_u32("tileid")?;
        if tile_id >= tile_count {
            return Err(LoadError::malformed(
                tile.path(),
                "attribute 'tileid'",
                tile_id.to_string(),
                format!("a tile id below {tile_count}"),
            ));
        }
        let packed = tile.required_hex_or_dec("wangid")?;
        builder.add_tile(tile_id, packed).map_err(|source| LoadError::Wang {
            path: tile.path().to_string(),
            source,
        })?;
    }

    let wangset = builder.build();
    log::trace!(
        "Wangset '{}': {} colors, {} tiles",
        wangset.name,
        wangset.colors.len(),
        wangset.tiles.len()
    );
    Ok(wangset)
}

fn add_color(builder: &mut WangsetBuilder, element: &XmlElement, side_type: SideType) -> Result<(), LoadError> {
    let name = element.string_or("name", "");
    let color = element.color_or("color", Color::BLACK)?;
    let probability = element.non_negative_float_or("probability", 1.0)?;
    builder.add_color(side_type, name, color, tile_ref(element)?, probability);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmx_map_core::{ErrorKind, WangSide};

    fn wangsets(source: &str) -> Result<Vec<Wangset>, LoadError> {
        parse_wangsets(&XmlElement::parse(source, "test.tsx").unwrap(), 8)
    }

    #[test]
    fn test_alternating_colors() {
        let sets = wangsets(
            r##"<wangsets>
  <wangset name="Ground" tile="-1">
    <wangcornercolor name="Grass" color="#00ff00" tile="-1" probability="1"/>
    <wangedgecolor name="Road" color="#ff0000" tile="3" probability="0.5"/>
    <wangtile tileid="0" wangid="0x11111111"/>
  </wangset>
</wangsets>"##,
        )
        .unwrap();

        let set = &sets[0];
        assert_eq!(set.tile, None);
        assert_eq!(set.colors[1].tile, Some(3));
        let tile = set.wang_tile(0).unwrap();
        assert_eq!(tile.wang_id.len(), 8);
        assert_eq!(set.color_at(tile, WangSide::Top).unwrap().name, "Road");
        assert_eq!(set.color_at(tile, WangSide::TopRight).unwrap().name, "Grass");
    }

    #[test]
    fn test_ids_count_per_side_type() {
        let sets = wangsets(
            r##"<wangsets>
  <wangset name="Mixed">
    <wangedgecolor name="E1" color="#000001"/>
    <wangcornercolor name="C1" color="#000002"/>
    <wangedgecolor name="E2" color="#000003"/>
    <wangtile tileid="5" wangid="0x00000002"/>
  </wangset>
</wangsets>"##,
        )
        .unwrap();

        let set = &sets[0];
        let ids: Vec<_> = set.colors.iter().map(|c| (c.name.as_str(), c.id)).collect();
        assert_eq!(ids, vec![("E1", 1), ("C1", 1), ("E2", 2)]);
        let tile = set.wang_tile(5).unwrap();
        assert_eq!(set.color_at(tile, WangSide::Top).unwrap().name, "E2");
    }

    #[test]
    fn test_nested_color_lists() {
        let sets = wangsets(
            r##"<wangsets>
  <wangset name="Nested">
    <wangcornercolors><wangcornercolor name="C" color="#ffffff"/></wangcornercolors>
    <wangtile tileid="1" wangid="0x00000010"/>
  </wangset>
</wangsets>"##,
        )
        .unwrap();
        assert_eq!(sets[0].corner_colors().count(), 1);
        assert_eq!(sets[0].wang_tile(1).unwrap().wang_id.len(), 1);
    }

    #[test]
    fn test_invalid_color() {
        let err = wangsets(
            r##"<wangsets>
  <wangset name="Bad">
    <wangedgecolor name="E" color="#000000"/>
    <wangtile tileid="0" wangid="0x00000010"/>
  </wangset>
</wangsets>"##,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvableReference);
        assert!(err.to_string().contains("wangtile[0]"));
    }

    #[test]
    fn test_wangtile_outside_tileset() {
        let err = wangsets(
            r##"<wangsets>
  <wangset name="Far">
    <wangcornercolor name="C" color="#ffffff"/>
    <wangtile tileid="999" wangid="0x10101010"/>
  </wangset>
</wangsets>"##,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedField);
        assert!(err.to_string().contains("wangtile[0]"), "{err}");
        assert!(err.to_string().contains("999"), "{err}");
    }

    #[test]
    fn test_unexpected_child() {
        let err = wangsets(r#"<wangsets><wangset name="x"><tile/></wangset></wangsets>"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuralViolation);
    }
}
