use crate::adapters::LogProgressAdapter;
use crate::domain::{
    DigestConfig, DigestReport, FileDigest, FileFailure, Manifest, ScanConfig, VerifyEntry,
    VerifyOutcome,
};
use crate::error::DigestError;
use crate::ports::{FileSystemPort, HashingPort, ProgressPort, ScanProgressPort};
use crate::services::StreamingDigestComputer;
use anyhow::Result;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Hashes sets of files in parallel and checks them against manifests.
pub struct BatchDigestService<F, H, P> {
    filesystem: F,
    hasher: H,
    progress: P,
    cancel: Option<Arc<AtomicBool>>,
}

impl<F, H, P> BatchDigestService<F, H, P>
where
    F: FileSystemPort + Sync,
    H: HashingPort + Clone + Send + Sync,
    P: ScanProgressPort + Send + Sync,
{
    pub fn new(filesystem: F, hasher: H, progress: P) -> Self {
        Self {
            filesystem,
            hasher,
            progress,
            cancel: None,
        }
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Digest one file, using its on-disk length as the expected size.
    pub fn digest_file(
        &self,
        path: &Path,
        config: &DigestConfig,
        on_progress: Option<&mut dyn ProgressPort>,
    ) -> Result<FileDigest, DigestError> {
        let mut file = File::open(path)?;
        let size = file.metadata()?.len();
        // An empty file has no meaningful percentage; report it as unknown.
        let expected_size = (size > 0).then_some(size);

        let result = self.computer(config).compute(&mut file, expected_size, on_progress)?;
        if result.size() != size {
            tracing::warn!(path = %path.display(), expected = size, actual = result.size(), "file changed while hashing");
        }
        Ok(FileDigest::from_result(path.to_path_buf(), result))
    }

    pub fn digest_files(&self, config: &ScanConfig) -> Result<DigestReport> {
        let files = self.filesystem.scan_files(config)?;
        tracing::info!(files = files.len(), algorithm = %config.digest.algorithm, "hashing files");

        self.progress.start(files.len() as u64);
        let counter = AtomicUsize::new(0);
        let results: Vec<_> = run_in_pool(config.thread_count, || {
            files
                .par_iter()
                .map(|entry| {
                    let mut sink = LogProgressAdapter::new(entry.path.display().to_string());
                    let outcome = self.digest_file(&entry.path, &config.digest, Some(&mut sink));
                    let count = counter.fetch_add(1, Ordering::SeqCst);
                    self.progress.update(count as u64 + 1);
                    outcome.map_err(|e| (entry.path.clone(), e))
                })
                .collect()
        })?;
        self.progress.finish();

        let mut digests = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(digest) => digests.push(digest),
                Err((_, e @ DigestError::Cancelled { .. })) => return Err(e.into()),
                Err((path, e)) => {
                    // Skip files that can't be hashed
                    tracing::warn!(path = %path.display(), error = %e, "skipping file");
                    failures.push(FileFailure {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(DigestReport::new(digests, failures))
    }

    /// Recompute every manifest entry with the algorithm recorded for it. Order follows the manifest.
    pub fn verify(&self, manifest: &Manifest, config: &ScanConfig) -> Result<Vec<VerifyEntry>> {
        self.progress.start(manifest.files.len() as u64);
        let counter = AtomicUsize::new(0);
        let results: Vec<Result<VerifyEntry, DigestError>> = run_in_pool(config.thread_count, || {
            manifest
                .files
                .par_iter()
                .map(|recorded| {
                    let digest_config = config.digest.clone().with_algorithm(recorded.algorithm);
                    let outcome = self.check(recorded, &digest_config);
                    let count = counter.fetch_add(1, Ordering::SeqCst);
                    self.progress.update(count as u64 + 1);
                    outcome.map(|outcome| VerifyEntry {
                        path: recorded.path.clone(),
                        outcome,
                    })
                })
                .collect()
        })?;
        self.progress.finish();

        let entries = results.into_iter().collect::<Result<Vec<_>, DigestError>>()?;
        let failed = entries.iter().filter(|e| !e.outcome.is_ok()).count();
        tracing::info!(checked = entries.len(), failed, "verification finished");
        Ok(entries)
    }

    fn check(&self, recorded: &FileDigest, config: &DigestConfig) -> Result<VerifyOutcome, DigestError> {
        let size = match fs::metadata(&recorded.path) {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(VerifyOutcome::Missing),
            Err(e) => return Ok(VerifyOutcome::Unreadable { error: e.to_string() }),
        };
        if size != recorded.size {
            return Ok(VerifyOutcome::SizeMismatch {
                expected: recorded.size,
                actual: size,
            });
        }

        let mut sink = LogProgressAdapter::new(recorded.path.display().to_string());
        match self.digest_file(&recorded.path, config, Some(&mut sink)) {
            Ok(actual) if actual.size != recorded.size => Ok(VerifyOutcome::SizeMismatch {
                expected: recorded.size,
                actual: actual.size,
            }),
            Ok(actual) if actual.digest != recorded.digest => Ok(VerifyOutcome::Mismatch {
                expected: recorded.digest.clone(),
                actual: actual.digest,
            }),
            Ok(_) => Ok(VerifyOutcome::Match),
            Err(e @ DigestError::Cancelled { .. }) => Err(e),
            Err(e) => Ok(VerifyOutcome::Unreadable { error: e.to_string() }),
        }
    }

    fn computer(&self, config: &DigestConfig) -> StreamingDigestComputer<H> {
        let computer = StreamingDigestComputer::with_hasher(config.clone(), self.hasher.clone());
        match &self.cancel {
            Some(flag) => computer.with_cancel_flag(flag.clone()),
            None => computer,
        }
    }
}

fn run_in_pool<T, OP>(threads: Option<usize>, op: OP) -> Result<T>
where
    T: Send,
    OP: FnOnce() -> T + Send,
{
    match threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to configure thread pool: {}", e))?;
            Ok(pool.install(op))
        }
        None => Ok(op()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FileSystemAdapter, MultiAlgorithmHasher, ProgressBarAdapter};
    use crate::domain::HashAlgorithm;

    fn service() -> BatchDigestService<FileSystemAdapter, MultiAlgorithmHasher, ProgressBarAdapter> {
        BatchDigestService::new(
            FileSystemAdapter::new(),
            MultiAlgorithmHasher::new(),
            ProgressBarAdapter::new_quiet(),
        )
    }

    #[test]
    fn digest_file_reports_percentages_from_file_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trajectory.xyz");
        fs::write(&path, vec![b'x'; 30_720]).unwrap();

        let mut calls = Vec::new();
        let mut sink = |percent: f64| -> anyhow::Result<()> {
            calls.push(percent);
            Ok(())
        };
        let digest = service()
            .digest_file(&path, &DigestConfig::default(), Some(&mut sink))
            .unwrap();

        assert_eq!(digest.size, 30_720);
        assert_eq!(digest.digest, format!("{:x}", md5::compute(vec![b'x'; 30_720])));
        assert_eq!(calls.len(), 4);
        assert_eq!(calls.last(), Some(&100.0));
        assert!(calls[0] > 33.0 && calls[0] < 34.0);
    }

    #[test]
    fn empty_file_is_hashed_without_expected_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.log");
        fs::write(&path, b"").unwrap();

        let mut calls = Vec::new();
        let mut sink = |percent: f64| -> anyhow::Result<()> {
            calls.push(percent);
            Ok(())
        };
        let digest = service()
            .digest_file(&path, &DigestConfig::default(), Some(&mut sink))
            .unwrap();

        assert_eq!(digest.digest, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(calls, vec![-1.0, 100.0]);
    }

    #[test]
    fn cancelled_batch_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.dat"), b"abc").unwrap();

        let flag = Arc::new(AtomicBool::new(true));
        let config = ScanConfig::new().with_paths(vec![dir.path().to_path_buf()]);
        let err = service()
            .with_cancel_flag(flag)
            .digest_files(&config)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DigestError>(),
            Some(DigestError::Cancelled { .. })
        ));
    }

    #[test]
    fn verify_uses_each_entry_algorithm() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.nml");
        let output = dir.path().join("output.csv");
        fs::write(&input, b"&params dt=0.01 /").unwrap();
        fs::write(&output, b"t,E\n0,1.0\n").unwrap();

        let md5 = service().digest_file(&input, &DigestConfig::default(), None).unwrap();
        let blake = service()
            .digest_file(&output, &DigestConfig::default().with_algorithm(HashAlgorithm::Blake3), None)
            .unwrap();
        let manifest = Manifest::new(HashAlgorithm::Md5, vec![md5, blake], 0);

        let entries = service().verify(&manifest, &ScanConfig::new()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.outcome == VerifyOutcome::Match));
    }

    #[test]
    fn verify_uses_manifest_algorithm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        fs::write(&path, b"{\"steps\": 1000}").unwrap();

        let sha = DigestConfig::default().with_algorithm(HashAlgorithm::Sha256);
        let recorded = service().digest_file(&path, &sha, None).unwrap();
        let manifest = Manifest::new(HashAlgorithm::Sha256, vec![recorded], 0);

        // Scan config asks for md5; the manifest wins.
        let entries = service().verify(&manifest, &ScanConfig::new()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome, VerifyOutcome::Match);
    }
}
