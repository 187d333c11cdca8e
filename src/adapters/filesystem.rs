use crate::domain::{FileEntry, ScanConfig};
use crate::ports::FileSystemPort;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::fs;

pub struct FileSystemAdapter;

impl FileSystemAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystemPort for FileSystemAdapter {
    fn scan_files(&self, config: &ScanConfig) -> Result<Vec<FileEntry>> {
        let files: Result<Vec<FileEntry>> = config
            .paths
            .par_iter()
            .map(|path| -> Result<Vec<FileEntry>> {
                fs::metadata(path).with_context(|| format!("cannot access {}", path.display()))?;

                let mut builder = WalkBuilder::new(path);
                // Simulation trees are hashed in full; VCS ignore rules do not apply.
                builder.standard_filters(false);
                builder.max_depth(config.max_depth);
                builder.follow_links(config.follow_symlinks);

                let entries: Vec<FileEntry> = builder
                    .build()
                    .filter_map(|entry| {
                        let entry = match entry {
                            Ok(entry) => entry,
                            Err(e) => {
                                tracing::warn!(error = %e, "skipping unreadable entry");
                                return None;
                            }
                        };
                        let path = entry.path();
                        if !path.is_file() {
                            return None;
                        }

                        let metadata = fs::metadata(path).ok()?;
                        Some(FileEntry::new(path.to_path_buf(), metadata.len()))
                    })
                    .collect();

                Ok(entries)
            })
            .collect::<Result<Vec<Vec<FileEntry>>>>()
            .map(|vecs| vecs.into_iter().flatten().collect());

        files
    }
}
