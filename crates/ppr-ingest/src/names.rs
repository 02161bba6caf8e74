//! Coalition display names and ground-truth overrides.

use std::path::Path;

use ppr_model::GroundTruth;
use ppr_frame::Table;

use crate::error::{IngestError, Result};
use crate::extract::read_sheet_csv;

/// Load the coalition display-name lookup (`State`, `CoalitionName`).
pub fn load_coalition_names(path: &Path) -> Result<Table> {
    let table = read_sheet_csv(path)?;
    for column in ["State", "CoalitionName"] {
        if !table.has_column(column) {
            return Err(IngestError::MissingColumn {
                sheet: path.display().to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(table)
}

/// Load a ground-truth override artifact, falling back to the built-in
/// roster when no path is given.
pub fn load_ground_truth(path: Option<&Path>) -> Result<GroundTruth> {
    let Some(path) = path else {
        return Ok(GroundTruth::builtin_coalitions());
    };
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|error| IngestError::InvalidManifest {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}
