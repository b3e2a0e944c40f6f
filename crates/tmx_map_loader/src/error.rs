//! Load failures with document location

use thiserror::Error;
use tmx_map_core::{ErrorKind, GeometryError, PropertyError, ResolveError, WangError};

/// Error type for map and tileset loading failures.
///
/// `path` fields hold the element path inside the document, such as
/// `map[0]:tileset[1]:tile[3]`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read '{file}': {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse XML in '{file}': {message}")]
    Xml { file: String, message: String },
    #[error("{path}: missing required {field}")]
    MissingField { path: String, field: String },
    #[error("{path}: malformed {field} '{value}', expected {expected}")]
    MalformedField {
        path: String,
        field: String,
        value: String,
        expected: String,
    },
    #[error("{path}: unsupported {feature}")]
    Unsupported { path: String, feature: String },
    #[error("{path}: {source}")]
    Unresolved {
        path: String,
        #[source]
        source: ResolveError,
    },
    #[error("{path}: {source}")]
    Wang {
        path: String,
        #[source]
        source: WangError,
    },
    #[error("{path}: {source}")]
    Geometry {
        path: String,
        #[source]
        source: GeometryError,
    },
    #[error("{path}: {message}")]
    Structure { path: String, message: String },
    #[error("Failed to decode image '{file}': {message}")]
    Image { file: String, message: String },
    #[error(transparent)]
    Property(#[from] PropertyError),
    #[error("Invalid loader config: {0}")]
    Config(#[from] toml::de::Error),
}

impl LoadError {
    /// Failure category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Io { .. } => ErrorKind::UnresolvableReference,
            LoadError::Xml { .. } => ErrorKind::MalformedField,
            LoadError::MissingField { .. } => ErrorKind::MissingField,
            LoadError::MalformedField { .. } => ErrorKind::MalformedField,
            LoadError::Unsupported { .. } => ErrorKind::UnsupportedFeature,
            LoadError::Unresolved { source, .. } => source.kind(),
            LoadError::Wang { source, .. } => source.kind(),
            LoadError::Geometry { source, .. } => source.kind(),
            LoadError::Structure { .. } => ErrorKind::StructuralViolation,
            LoadError::Image { .. } => ErrorKind::MalformedField,
            LoadError::Property(err) => err.kind(),
            LoadError::Config(_) => ErrorKind::MalformedField,
        }
    }

    pub(crate) fn missing(path: &str, field: impl Into<String>) -> Self {
        LoadError::MissingField {
            path: path.to_string(),
            field: field.into(),
        }
    }

    pub(crate) fn malformed(
        path: &str,
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        LoadError::MalformedField {
            path: path.to_string(),
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    pub(crate) fn unsupported(path: &str, feature: impl Into<String>) -> Self {
        LoadError::Unsupported {
            path: path.to_string(),
            feature: feature.into(),
        }
    }

    pub(crate) fn structure(path: &str, message: impl Into<String>) -> Self {
        LoadError::Structure {
            path: path.to_string(),
            message: message.into(),
        }
    }
}
