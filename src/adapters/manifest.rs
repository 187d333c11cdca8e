use crate::domain::{DigestReport, HashAlgorithm, Manifest};
use crate::error::DigestError;
use anyhow::Result;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Reads and writes JSON manifests of file digests.
pub struct ManifestAdapter;

impl ManifestAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, manifest_path: &Path) -> Result<Option<Manifest>> {
        if !manifest_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(manifest_path)?;
        let manifest: Manifest = serde_json::from_str(&contents)?;
        if !self.is_compatible(&manifest) {
            return Err(DigestError::Manifest(format!(
                "{} was written by version {}, expected {}.x",
                manifest_path.display(),
                manifest.version,
                major(env!("CARGO_PKG_VERSION"))
            ))
            .into());
        }
        if let Some(bad) = manifest
            .files
            .iter()
            .find(|f| f.digest.len() != f.algorithm.hex_len())
        {
            return Err(DigestError::Manifest(format!(
                "{}: entry {} has a malformed {} digest",
                manifest_path.display(),
                bad.path.display(),
                bad.algorithm
            ))
            .into());
        }
        Ok(Some(manifest))
    }

    pub fn save(&self, manifest_path: &Path, manifest: &Manifest) -> Result<()> {
        if let Some(parent) = manifest_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(manifest)?;
        fs::write(manifest_path, contents)?;
        tracing::info!(path = %manifest_path.display(), files = manifest.files.len(), "manifest written");
        Ok(())
    }

    pub fn is_compatible(&self, manifest: &Manifest) -> bool {
        major(&manifest.version) == major(env!("CARGO_PKG_VERSION"))
    }

    pub fn create_manifest(&self, report: &DigestReport, algorithm: HashAlgorithm) -> Manifest {
        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Manifest::new(algorithm, report.files.clone(), created)
    }
}

impl Default for ManifestAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}
