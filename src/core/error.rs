// Copyright @yucwang 2026

use std::fmt;

use crate::io::obj_utils::ObjLoadError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The file could not be read or is not valid OBJ.
    ParseFailed(String),
    /// Parsing succeeded but no triangle survived.
    EmptyMesh,
}

impl From<ObjLoadError> for LoadError {
    fn from(err: ObjLoadError) -> Self {
        LoadError::ParseFailed(err.to_string())
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::ParseFailed(message) => write!(f, "failed to parse mesh: {}", message),
            LoadError::EmptyMesh => write!(f, "mesh has no vertices"),
        }
    }
}

impl std::error::Error for LoadError {}
