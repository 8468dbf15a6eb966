//! Project references accepted by the upstream API.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A project addressed either by numeric id or by full path
/// (`group/subgroup/project`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectRef {
    Id(u64),
    Path(String),
}

impl ProjectRef {
    /// Presence validation for untrusted caller input.
    pub fn validate(&self) -> Result<(), EngineError> {
        match self {
            ProjectRef::Id(0) => Err(EngineError::Configuration(
                "project id must be non-zero".to_string(),
            )),
            ProjectRef::Path(path) if path.trim().is_empty() => Err(EngineError::Configuration(
                "project path must not be empty".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// URL path segment form: ids verbatim, paths percent-encoded so the
    /// slashes survive routing.
    pub fn as_path_segment(&self) -> String {
        match self {
            ProjectRef::Id(id) => id.to_string(),
            ProjectRef::Path(path) => urlencoding::encode(path).into_owned(),
        }
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectRef::Id(id) => write!(f, "{}", id),
            ProjectRef::Path(path) => f.write_str(path),
        }
    }
}
