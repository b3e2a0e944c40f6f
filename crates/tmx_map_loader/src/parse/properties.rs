use crate::attr::parse_bool;
use crate::error::LoadError;
use crate::xml::XmlElement;
use tmx_map_core::{Color, Properties};

const PROPERTY_TYPES: &str = "one of string, int, float, bool, color, file, object";

/// Read the `<properties>` child of `parent`, if there is one.
///
/// `file` values are kept as strings and `object` references as ints. A
/// property without a `value` attribute takes its text content, which is how
/// multi-line strings are written.
pub(crate) fn parse_properties(parent: &XmlElement) -> Result<Option<Properties>, LoadError> {
    let Some(element) = parent.child("properties") else {
        return Ok(None);
    };

    let mut properties = Properties::new();
    for property in element.children() {
        if property.name() != "property" {
            return Err(LoadError::structure(
                property.path(),
                format!("unexpected <{}> in <properties>", property.name()),
            ));
        }

        let name = property.required_str("name")?;
        let kind = property.attr("type").unwrap_or("string");
        let raw = property.attr("value").unwrap_or_else(|| property.text());
        let malformed = |expected: &str| {
            LoadError::malformed(property.path(), format!("{kind} property '{name}'"), raw, expected)
        };

        match kind {
            "string" | "file" => properties.set_string(name, raw),
            "int" | "object" => {
                let value = raw.trim().parse().map_err(|_| malformed("an integer"))?;
                properties.set_int(name, value);
            }
            "float" => {
                let value = raw.trim().parse().map_err(|_| malformed("a number"))?;
                properties.set_float(name, value);
            }
            "bool" => {
                let value = parse_bool(raw.trim()).ok_or_else(|| malformed("true or false"))?;
                properties.set_bool(name, value);
            }
            "color" => {
                let value: Color = raw.trim().parse().map_err(|_| malformed("#RRGGBB or #RRGGBBAA"))?;
                properties.set_color(name, value);
            }
            other => {
                return Err(LoadError::malformed(
                    property.path(),
                    format!("type of property '{name}'"),
                    other,
                    PROPERTY_TYPES,
                ))
            }
        }
    }

    Ok(Some(properties))
}
