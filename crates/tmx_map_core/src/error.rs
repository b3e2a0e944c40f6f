//! Error types shared by the map model
//!
//! Every error maps onto one of the [`ErrorKind`] categories so callers can
//! branch on the failure class without matching individual variants.

use crate::wang::WangSide;
use thiserror::Error;

/// Failure categories for map loading and model queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required attribute or element is absent
    MissingField,
    /// A value is present but cannot be decoded or is out of range
    MalformedField,
    /// The document uses a feature this crate does not handle
    UnsupportedFeature,
    /// A gid, wang color, layer or object reference cannot be resolved
    UnresolvableReference,
    /// The document or a shape breaks a structural rule
    StructuralViolation,
    /// A property was read with the wrong type
    TypeMismatch,
}

impl ErrorKind {
    /// Get the display name of this error kind
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::MissingField => "missing field",
            ErrorKind::MalformedField => "malformed field",
            ErrorKind::UnsupportedFeature => "unsupported feature",
            ErrorKind::UnresolvableReference => "unresolvable reference",
            ErrorKind::StructuralViolation => "structural violation",
            ErrorKind::TypeMismatch => "type mismatch",
        }
    }
}

/// Errors raised by typed property access
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("'{name}' property not found")]
    NotFound { name: String },
    #[error("'{name}' property accessed as {expected}, but is {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl PropertyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PropertyError::NotFound { .. } => ErrorKind::UnresolvableReference,
            PropertyError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
        }
    }
}

/// Shape contract violations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("{what} must not be negative, got {value}")]
    NegativeDimension { what: &'static str, value: f32 },
    #[error("{what} must be finite, got {value}")]
    NonFinite { what: &'static str, value: f32 },
    #[error("rotated rectangle needs a non-zero rotation, use a box instead")]
    ZeroRotation,
    #[error("circle needs equal width and height, got {width}x{height}")]
    NotCircular { width: f32, height: f32 },
    #[error("{shape} needs at least {min} points, got {count}")]
    TooFewPoints {
        shape: &'static str,
        min: usize,
        count: usize,
    },
}

impl GeometryError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::StructuralViolation
    }
}

/// Wang id decoding failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WangError {
    #[error("invalid wang color {color_id} on side {side:?}")]
    InvalidColor { side: WangSide, color_id: u32 },
}

impl WangError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::UnresolvableReference
    }
}

/// Lookup failures for gids, layers, objects and tilesets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Unknown tile gid {0}")]
    UnknownGid(u32),
    #[error("layer '{name}' not found, searched [{}]", .searched.join(", "))]
    LayerNotFound { name: String, searched: Vec<String> },
    #[error("object '{name}' not found in layer '{layer}'")]
    ObjectNotFound { name: String, layer: String },
    #[error("tileset '{0}' not found")]
    TilesetNotFound(String),
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::UnresolvableReference
    }
}

/// A color string that is not `#RRGGBB` or `#RRGGBBAA`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color '{0}', expected #RRGGBB or #RRGGBBAA")]
pub struct ColorParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message() {
        let err = PropertyError::TypeMismatch {
            name: "speed".to_string(),
            expected: "int",
            actual: "string",
        };
        assert_eq!(
            err.to_string(),
            "'speed' property accessed as int, but is string"
        );
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_layer_not_found_lists_names() {
        let err = ResolveError::LayerNotFound {
            name: "Walls".to_string(),
            searched: vec!["Ground".to_string(), "Decor".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "layer 'Walls' not found, searched [Ground, Decor]"
        );
    }
}
