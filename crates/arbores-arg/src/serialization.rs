use arbores_core::errors::{ArgError, ErrorInfo};

use crate::path::PathState;

/// Serializes a path to pretty JSON.
pub fn path_to_json(path: &PathState) -> Result<String, ArgError> {
    serde_json::to_string_pretty(path)
        .map_err(|err| ArgError::Serde(ErrorInfo::new("serialize-path", err.to_string())))
}

/// Serializes a path to a single JSON line, for append-only logs.
pub fn path_to_json_line(path: &PathState) -> Result<String, ArgError> {
    serde_json::to_string(path)
        .map_err(|err| ArgError::Serde(ErrorInfo::new("serialize-path", err.to_string())))
}

/// Restores a path from JSON. Structural checks are left to the caller.
pub fn path_from_json(json: &str) -> Result<PathState, ArgError> {
    serde_json::from_str(json).map_err(|err| {
        ArgError::Path(
            ErrorInfo::new("deserialize-path", err.to_string())
                .with_hint("initial paths are JSON documents written by the sampler"),
        )
    })
}
