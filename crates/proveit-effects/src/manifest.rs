//! Manifest file loading

use proveit_core::{Manifest, ProveitError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File name of the manifest inside an import directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Location of the manifest inside `import_dir`
pub fn manifest_path(import_dir: &Path) -> PathBuf {
    import_dir.join(MANIFEST_FILE)
}

/// Read and check `<import_dir>/manifest.json`
pub async fn load_manifest(import_dir: &Path) -> Result<Manifest, ProveitError> {
    let path = manifest_path(import_dir);
    let content = fs::read_to_string(&path)
        .await
        .map_err(|e| ProveitError::ManifestUnreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let manifest = Manifest::from_json_str(&content)?;
    debug!(
        "Loaded manifest from {}: total={}, baseUri={}",
        path.display(),
        manifest.total,
        manifest.base_uri
    );
    Ok(manifest)
}
