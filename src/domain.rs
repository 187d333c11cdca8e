use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Read granularity used when streaming a source through a hasher.
pub const DOWNLOAD_CHUNK_SIZE: usize = 10_240;

/// Largest read buffer a computation will allocate.
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Percentage a computation with a known size must exceed before progress is reported.
pub const PROGRESS_THRESHOLD_PERCENT: f64 = 10.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha1,
    Sha256,
    Blake3,
    XxHash3,
    XxHash64,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::XxHash3 => "xxhash3",
            HashAlgorithm::XxHash64 => "xxhash64",
        }
    }

    /// Length of the hex encoded digest.
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 | HashAlgorithm::Blake3 => 64,
            HashAlgorithm::XxHash3 => 32,
            HashAlgorithm::XxHash64 => 16,
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single progress notification.
///
/// Sinks receive the raw percentage; `Indeterminate` travels as `-1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    Indeterminate,
    Percent(f64),
}

impl Progress {
    pub const INDETERMINATE: f64 = -1.0;

    pub fn as_percent(self) -> f64 {
        match self {
            Progress::Indeterminate => Self::INDETERMINATE,
            Progress::Percent(percent) => percent,
        }
    }

    pub fn from_percent(percent: f64) -> Self {
        if percent < 0.0 {
            Progress::Indeterminate
        } else {
            Progress::Percent(percent)
        }
    }
}

/// Hex digest plus the number of bytes that went into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestResult {
    algorithm: HashAlgorithm,
    digest: String,
    size: u64,
}

impl DigestResult {
    pub(crate) fn new(algorithm: HashAlgorithm, digest: String, size: u64) -> Self {
        Self {
            algorithm,
            digest,
            size,
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn into_parts(self) -> (String, u64) {
        (self.digest, self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestConfig {
    pub chunk_size: usize,
    pub algorithm: HashAlgorithm,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            chunk_size: DOWNLOAD_CHUNK_SIZE,
            algorithm: HashAlgorithm::Md5,
        }
    }
}

impl DigestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// A regular file discovered while walking the inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
}

impl FileEntry {
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Checksum metadata stored alongside a simulation file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    pub path: PathBuf,
    pub algorithm: HashAlgorithm,
    pub digest: String,
    pub size: u64,
}

impl FileDigest {
    pub fn from_result(path: PathBuf, result: DigestResult) -> Self {
        let algorithm = result.algorithm();
        let (digest, size) = result.into_parts();
        Self {
            path,
            algorithm,
            digest,
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DigestReport {
    pub files: Vec<FileDigest>,
    pub failures: Vec<FileFailure>,
    pub total_size: u64,
}

impl DigestReport {
    pub fn new(mut files: Vec<FileDigest>, mut failures: Vec<FileFailure>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        failures.sort_by(|a, b| a.path.cmp(&b.path));
        let total_size = files.iter().map(|f| f.size).sum();
        Self {
            files,
            failures,
            total_size,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub algorithm: HashAlgorithm,
    /// Seconds since the unix epoch.
    pub created: u64,
    pub files: Vec<FileDigest>,
}

impl Manifest {
    pub fn new(algorithm: HashAlgorithm, files: Vec<FileDigest>, created: u64) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            algorithm,
            created,
            files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyOutcome {
    Match,
    Mismatch { expected: String, actual: String },
    SizeMismatch { expected: u64, actual: u64 },
    Missing,
    Unreadable { error: String },
}

impl VerifyOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, VerifyOutcome::Match)
    }

    pub fn label(&self) -> &'static str {
        match self {
            VerifyOutcome::Match => "OK",
            VerifyOutcome::Mismatch { .. } => "FAILED",
            VerifyOutcome::SizeMismatch { .. } => "SIZE",
            VerifyOutcome::Missing => "MISSING",
            VerifyOutcome::Unreadable { .. } => "UNREADABLE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyEntry {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: VerifyOutcome,
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub paths: Vec<PathBuf>,
    pub follow_symlinks: bool,
    pub max_depth: Option<usize>,
    pub thread_count: Option<usize>,
    pub digest: DigestConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from(".")],
            follow_symlinks: false,
            max_depth: None,
            thread_count: None,
            digest: DigestConfig::default(),
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_thread_count(mut self, threads: usize) -> Self {
        self.thread_count = Some(threads);
        self
    }

    pub fn with_digest(mut self, digest: DigestConfig) -> Self {
        self.digest = digest;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_sentinel_round_trips_through_raw_percent() {
        assert_eq!(Progress::Indeterminate.as_percent(), -1.0);
        assert_eq!(Progress::from_percent(-1.0), Progress::Indeterminate);
        assert_eq!(Progress::from_percent(42.5), Progress::Percent(42.5));
    }

    #[test]
    fn report_sorts_files_and_sums_sizes() {
        let files = vec![
            FileDigest {
                path: PathBuf::from("b.dat"),
                algorithm: HashAlgorithm::Md5,
                digest: "x".into(),
                size: 3,
            },
            FileDigest {
                path: PathBuf::from("a.dat"),
                algorithm: HashAlgorithm::Md5,
                digest: "y".into(),
                size: 4,
            },
        ];
        let report = DigestReport::new(files, vec![]);
        assert_eq!(report.files[0].path, PathBuf::from("a.dat"));
        assert_eq!(report.total_size, 7);
        assert!(report.is_complete());
    }

    #[test]
    fn verify_outcome_serializes_with_status_tag() {
        let entry = VerifyEntry {
            path: PathBuf::from("run/output.h5"),
            outcome: VerifyOutcome::SizeMismatch {
                expected: 10,
                actual: 12,
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["status"], "size_mismatch");
        assert_eq!(json["expected"], 10);
    }

    #[test]
    fn algorithm_names_match_serde_names() {
        for algorithm in [
            HashAlgorithm::Md5,
            HashAlgorithm::Sha1,
            HashAlgorithm::Sha256,
            HashAlgorithm::Blake3,
            HashAlgorithm::XxHash3,
            HashAlgorithm::XxHash64,
        ] {
            let json = serde_json::to_string(&algorithm).unwrap();
            assert_eq!(json, format!("\"{}\"", algorithm.as_str()));
        }
    }
}
