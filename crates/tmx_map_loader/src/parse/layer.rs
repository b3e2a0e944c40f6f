use super::object::parse_object;
use super::properties::parse_properties;
use super::LayerContext;
use crate::error::LoadError;
use crate::xml::XmlElement;
use tmx_map_core::{ImageLayer, Layer, LayerData, LayerGroup, ObjectLayer, TileLayer, Vec2};

/// Whether `name` is one of the layer elements
pub(crate) fn is_layer_element(name: &str) -> bool {
    matches!(name, "layer" | "objectgroup" | "imagelayer" | "group")
}

/// Build any layer element, recursing into groups
pub(crate) fn parse_layer(element: &XmlElement, ctx: &LayerContext) -> Result<Layer, LoadError> {
    let data = match element.name() {
        "layer" => LayerData::Tiles(parse_tile_layer(element, ctx)?),
        "objectgroup" => LayerData::Objects(parse_object_layer(element, ctx)?),
        "imagelayer" => LayerData::Image(parse_image_layer(element)?),
        "group" => LayerData::Group(LayerGroup::new(parse_group_children(element, ctx)?)),
        other => {
            return Err(LoadError::structure(
                element.path(),
                format!("<{other}> is not a layer"),
            ))
        }
    };

    let mut layer = Layer::new(element.required_int("id")?, element.string_or("name", ""), data);
    read_common(element, &mut layer)?;
    log::trace!("Parsed {} layer '{}' ({})", layer.layer_type().name(), layer.name, element.path());
    Ok(layer)
}

/// Visibility, offset, opacity and properties shared by every layer, the
/// root group included
pub(crate) fn read_common(element: &XmlElement, layer: &mut Layer) -> Result<(), LoadError> {
    layer.visible = element.bool_or("visible", true)?;
    layer.offset = Vec2::new(element.float_or("offsetx", 0.0)?, element.float_or("offsety", 0.0)?);

    let opacity = element.float_or("opacity", 1.0)?;
    if !(0.0..=1.0).contains(&opacity) {
        return Err(LoadError::malformed(
            element.path(),
            "attribute 'opacity'",
            opacity.to_string(),
            "a number between 0 and 1",
        ));
    }
    layer.opacity = opacity;
    layer.properties = parse_properties(element)?;
    Ok(())
}

fn parse_group_children(element: &XmlElement, ctx: &LayerContext) -> Result<Vec<Layer>, LoadError> {
    let mut layers = Vec::new();
    for child in element.children() {
        match child.name() {
            "properties" => {}
            "tileset" => {
                return Err(LoadError::structure(
                    child.path(),
                    "tilesets must come before every layer, outside groups",
                ))
            }
            name if is_layer_element(name) => layers.push(parse_layer(child, ctx)?),
            other => {
                return Err(LoadError::structure(
                    child.path(),
                    format!("unexpected <{other}> in <group>"),
                ))
            }
        }
    }
    Ok(layers)
}

fn parse_tile_layer(element: &XmlElement, ctx: &LayerContext) -> Result<TileLayer, LoadError> {
    let width = element.required_u32("width")?;
    let height = element.required_u32("height")?;
    let data = element.required_child("data")?;

    let encoding = data.attr("encoding").unwrap_or("xml");
    if encoding != "csv" {
        return Err(LoadError::unsupported(
            data.path(),
            format!("'{encoding}' tile data encoding"),
        ));
    }
    if let Some(compression) = data.attr("compression") {
        return Err(LoadError::unsupported(
            data.path(),
            format!("'{compression}' tile data compression"),
        ));
    }
    if data.child("chunk").is_some() {
        return Err(LoadError::unsupported(data.path(), "chunked tile data"));
    }

    let cells = data
        .text()
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            let gid = token.parse().map_err(|_| {
                LoadError::malformed(data.path(), "tile gid", token, "an unsigned integer")
            })?;
            ctx.locate(data, gid)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let expected = width as usize * height as usize;
    if cells.len() != expected {
        return Err(LoadError::malformed(
            data.path(),
            "tile data",
            format!("{} cells", cells.len()),
            format!("{expected} cells for a {width}x{height} layer"),
        ));
    }
    TileLayer::from_cells(width, height, cells)
        .ok_or_else(|| LoadError::structure(data.path(), "tile data does not fill the layer"))
}

fn parse_object_layer(element: &XmlElement, ctx: &LayerContext) -> Result<ObjectLayer, LoadError> {
    let draw_order = element.attr("draworder").unwrap_or("index");
    if draw_order != "index" {
        return Err(LoadError::unsupported(
            element.path(),
            format!("'{draw_order}' object draw order"),
        ));
    }

    let objects = element
        .children_named("object")
        .map(|object| parse_object(object, ctx))
        .collect::<Result<Vec<_>, _>>()?;

    let mut layer = ObjectLayer::new(objects);
    layer.color = element.optional_color("color")?;
    Ok(layer)
}

fn parse_image_layer(element: &XmlElement) -> Result<ImageLayer, LoadError> {
    let image = element.required_child("image")?;
    Ok(ImageLayer {
        source: image.required_str("source")?.to_string(),
        format: image.attr("format").map(str::to_string),
        trans: image.optional_color("trans")?,
        width: image.optional_u32("width")?,
        height: image.optional_u32("height")?,
    })
}
