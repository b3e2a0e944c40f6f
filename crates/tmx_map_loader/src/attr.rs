//! Attribute decoders
//!
//! Every decoder tells a missing attribute apart from a malformed one and
//! reports the element path with the failure. The `_or` variants only fall
//! back to the default when the attribute is absent; a present but malformed
//! value is still an error.

use crate::error::LoadError;
use crate::xml::XmlElement;
use tmx_map_core::{Color, Vec2};

/// Parse `1`/`0`/`true`/`false`
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Parse a `0x`-prefixed hexadecimal or a plain decimal u32
pub fn parse_u32_hex_or_dec(value: &str) -> Option<u32> {
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

/// Parse a point list written as `x,y x,y ...`
pub fn parse_points(value: &str) -> Option<Vec<Vec2>> {
    value
        .split_whitespace()
        .map(|pair| {
            let (x, y) = pair.split_once(',')?;
            Some(Vec2::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
        })
        .collect()
}

impl XmlElement {
    fn decode<T>(
        &self,
        name: &str,
        expected: &str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<Option<T>, LoadError> {
        match self.attr(name) {
            None => Ok(None),
            Some(raw) => parse(raw.trim())
                .map(Some)
                .ok_or_else(|| LoadError::malformed(self.path(), format!("attribute '{name}'"), raw, expected)),
        }
    }

    fn require<T>(&self, name: &str, value: Option<T>) -> Result<T, LoadError> {
        value.ok_or_else(|| LoadError::missing(self.path(), format!("attribute '{name}'")))
    }

    pub fn required_str(&self, name: &str) -> Result<&str, LoadError> {
        self.require(name, self.attr(name))
    }

    pub fn string_or(&self, name: &str, default: &str) -> String {
        self.attr(name).unwrap_or(default).to_string()
    }

    pub fn optional_int(&self, name: &str) -> Result<Option<i32>, LoadError> {
        self.decode(name, "an integer", |s| s.parse().ok())
    }

    pub fn required_int(&self, name: &str) -> Result<i32, LoadError> {
        let value = self.optional_int(name)?;
        self.require(name, value)
    }

    pub fn int_or(&self, name: &str, default: i32) -> Result<i32, LoadError> {
        Ok(self.optional_int(name)?.unwrap_or(default))
    }

    pub fn optional_u32(&self, name: &str) -> Result<Option<u32>, LoadError> {
        self.decode(name, "a non-negative integer", |s| s.parse().ok())
    }

    pub fn required_u32(&self, name: &str) -> Result<u32, LoadError> {
        let value = self.optional_u32(name)?;
        self.require(name, value)
    }

    pub fn u32_or(&self, name: &str, default: u32) -> Result<u32, LoadError> {
        Ok(self.optional_u32(name)?.unwrap_or(default))
    }

    /// Required integer that must be greater than zero
    pub fn required_positive(&self, name: &str) -> Result<u32, LoadError> {
        let value = self.required_u32(name)?;
        if value == 0 {
            return Err(LoadError::malformed(
                self.path(),
                format!("attribute '{name}'"),
                "0",
                "a positive integer",
            ));
        }
        Ok(value)
    }

    pub fn optional_float(&self, name: &str) -> Result<Option<f32>, LoadError> {
        self.decode(name, "a number", |s| s.parse::<f32>().ok().filter(|f| f.is_finite()))
    }

    pub fn required_float(&self, name: &str) -> Result<f32, LoadError> {
        let value = self.optional_float(name)?;
        self.require(name, value)
    }

    pub fn float_or(&self, name: &str, default: f32) -> Result<f32, LoadError> {
        Ok(self.optional_float(name)?.unwrap_or(default))
    }

    /// Float that must not be negative, `default` when absent
    pub fn non_negative_float_or(&self, name: &str, default: f32) -> Result<f32, LoadError> {
        self.decode(name, "a non-negative number", |s| {
            s.parse::<f32>().ok().filter(|f| f.is_finite() && *f >= 0.0)
        })
        .map(|v| v.unwrap_or(default))
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, LoadError> {
        Ok(self.decode(name, "0, 1, true or false", parse_bool)?.unwrap_or(default))
    }

    pub fn optional_color(&self, name: &str) -> Result<Option<Color>, LoadError> {
        self.decode(name, "#RRGGBB or #RRGGBBAA", |s| s.parse().ok())
    }

    pub fn color_or(&self, name: &str, default: Color) -> Result<Color, LoadError> {
        Ok(self.optional_color(name)?.unwrap_or(default))
    }

    /// Required u32 written in hex (`0x` prefix) or decimal
    pub fn required_hex_or_dec(&self, name: &str) -> Result<u32, LoadError> {
        let value = self.decode(name, "a hexadecimal or decimal integer", parse_u32_hex_or_dec)?;
        self.require(name, value)
    }

    /// Map an enumerated attribute through `parse`, `default` when absent
    pub fn enum_or<T>(
        &self,
        name: &str,
        expected: &str,
        default: T,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<T, LoadError> {
        Ok(self.decode(name, expected, parse)?.unwrap_or(default))
    }

    /// Required enumerated attribute
    pub fn required_enum<T>(
        &self,
        name: &str,
        expected: &str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<T, LoadError> {
        let value = self.decode(name, expected, parse)?;
        self.require(name, value)
    }

    /// Required child element
    pub fn required_child(&self, name: &str) -> Result<&XmlElement, LoadError> {
        self.child(name)
            .ok_or_else(|| LoadError::missing(self.path(), format!("element <{name}>")))
    }
}
