use std::path::Path;

use crate::{fs::LoadError, probe::AlignmentProbe};

/// Reads an [`AlignmentProbe`] from a JSON file. Missing fields keep their
/// default values.
pub fn load_probe_config(path: &Path) -> Result<AlignmentProbe, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let probe = serde_json::from_str(&text)?;
    tracing::debug!(path = %path.display(), ?probe, "loaded probe configuration");
    Ok(probe)
}
