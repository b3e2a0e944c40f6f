use super::properties::parse_properties;
use super::LayerContext;
use crate::attr::parse_points;
use crate::error::LoadError;
use crate::xml::XmlElement;
use tmx_map_core::{HAlign, MapObject, ObjectData, ShapeObject, TextObject, VAlign, Vec2};

/// Build one `<object>` of an object layer.
///
/// A `gid` makes a tile object, a `<text>` child a text object and anything
/// else a shape. Polygon and polyline points are shifted so the first one
/// sits on the object position.
pub(crate) fn parse_object(element: &XmlElement, ctx: &LayerContext) -> Result<MapObject, LoadError> {
    if element.has_attr("template") {
        return Err(LoadError::unsupported(element.path(), "object templates"));
    }

    let id = element.required_u32("id")?;
    let mut position = Vec2::new(element.float_or("x", 0.0)?, element.float_or("y", 0.0)?);
    let size = Vec2::new(
        element.non_negative_float_or("width", 0.0)?,
        element.non_negative_float_or("height", 0.0)?,
    );

    let data = if let Some(gid) = element.optional_u32("gid")? {
        let tile = ctx.locate(element, gid)?.ok_or_else(|| {
            LoadError::malformed(element.path(), "attribute 'gid'", "0", "a non-empty tile gid")
        })?;
        ObjectData::Tile(tile)
    } else if let Some(text) = element.child("text") {
        ObjectData::Text(parse_text(text)?)
    } else {
        ObjectData::Shape(parse_shape(element, &mut position)?)
    };

    let mut object = MapObject::new(id, position, size, data)
        .with_name(element.string_or("name", ""))
        .with_type(element.attr("type").or_else(|| element.attr("class")).unwrap_or(""));
    object.rotation = element.float_or("rotation", 0.0)?;
    object.visible = element.bool_or("visible", true)?;
    object.properties = parse_properties(element)?;
    Ok(object)
}

fn parse_shape(element: &XmlElement, position: &mut Vec2) -> Result<ShapeObject, LoadError> {
    if element.child("ellipse").is_some() {
        return Ok(ShapeObject::ellipse());
    }
    if element.child("point").is_some() {
        return Ok(ShapeObject::point());
    }
    if let Some(polygon) = element.child("polygon") {
        let points = parse_outline(polygon, position)?;
        return ShapeObject::polygon(points).map_err(|source| LoadError::Geometry {
            path: polygon.path().to_string(),
            source,
        });
    }
    if let Some(polyline) = element.child("polyline") {
        let points = parse_outline(polyline, position)?;
        return ShapeObject::polyline(points).map_err(|source| LoadError::Geometry {
            path: polyline.path().to_string(),
            source,
        });
    }
    Ok(ShapeObject::rect())
}

fn parse_outline(outline: &XmlElement, position: &mut Vec2) -> Result<Vec<Vec2>, LoadError> {
    let raw = outline.required_str("points")?;
    let mut points = parse_points(raw).ok_or_else(|| {
        LoadError::malformed(outline.path(), "attribute 'points'", raw, "space separated x,y pairs")
    })?;

    if let Some(&first) = points.first() {
        *position += first;
        for point in &mut points {
            *point -= first;
        }
    }
    Ok(points)
}

fn parse_text(element: &XmlElement) -> Result<TextObject, LoadError> {
    let defaults = TextObject::default();
    Ok(TextObject {
        text: element.text().to_string(),
        font_family: element.string_or("fontfamily", &defaults.font_family),
        pixel_size: element.u32_or("pixelsize", defaults.pixel_size)?,
        wrap: element.bool_or("wrap", defaults.wrap)?,
        color: element.color_or("color", defaults.color)?,
        bold: element.bool_or("bold", defaults.bold)?,
        italic: element.bool_or("italic", defaults.italic)?,
        underline: element.bool_or("underline", defaults.underline)?,
        strikeout: element.bool_or("strikeout", defaults.strikeout)?,
        kerning: element.bool_or("kerning", defaults.kerning)?,
        halign: element.enum_or(
            "halign",
            "left, center, right or justify",
            defaults.halign,
            HAlign::from_name,
        )?,
        valign: element.enum_or("valign", "top, center or bottom", defaults.valign, VAlign::from_name)?,
    })
}
