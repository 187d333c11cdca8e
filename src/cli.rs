use crate::domain::{DOWNLOAD_CHUNK_SIZE, DigestConfig, HashAlgorithm, MAX_CHUNK_SIZE, ScanConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, ValueEnum)]
pub enum HashAlgorithmChoice {
    #[value(help = "Legacy default, matches stored checksums")]
    Md5,
    #[value(help = "Legacy hash")]
    Sha1,
    #[value(help = "Cryptographic hash")]
    Sha256,
    #[value(help = "Fast cryptographic hash")]
    Blake3,
    #[value(help = "Fast non-cryptographic hash")]
    Xxhash3,
    #[value(help = "Fast non-cryptographic hash")]
    Xxhash64,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl From<HashAlgorithmChoice> for HashAlgorithm {
    fn from(choice: HashAlgorithmChoice) -> Self {
        match choice {
            HashAlgorithmChoice::Md5 => HashAlgorithm::Md5,
            HashAlgorithmChoice::Sha1 => HashAlgorithm::Sha1,
            HashAlgorithmChoice::Sha256 => HashAlgorithm::Sha256,
            HashAlgorithmChoice::Blake3 => HashAlgorithm::Blake3,
            HashAlgorithmChoice::Xxhash3 => HashAlgorithm::XxHash3,
            HashAlgorithmChoice::Xxhash64 => HashAlgorithm::XxHash64,
        }
    }
}

#[derive(Parser)]
#[command(name = "simdigest")]
#[command(about = "Checksums and sizes for simulation files")]
#[command(version)]
pub struct Cli {
    #[arg(help = "Files or directories to hash")]
    pub paths: Vec<PathBuf>,

    #[arg(
        short = 'a',
        long = "algorithm",
        help = "Hash algorithm to use",
        value_enum,
        default_value = "md5"
    )]
    pub hash_algorithm: HashAlgorithmChoice,

    #[arg(
        long = "chunk-size",
        help = "Bytes read per chunk",
        default_value_t = DOWNLOAD_CHUNK_SIZE,
        value_parser = parse_chunk_size
    )]
    pub chunk_size: usize,

    #[arg(
        short = 'd',
        long = "max-depth",
        help = "Maximum directory depth to scan"
    )]
    pub max_depth: Option<usize>,

    #[arg(
        short = 'L',
        long = "follow-symlinks",
        help = "Follow symbolic links"
    )]
    pub follow_symlinks: bool,

    #[arg(
        short = 'j',
        long = "threads",
        help = "Number of threads to use for hashing"
    )]
    pub threads: Option<usize>,

    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress progress output"
    )]
    pub quiet: bool,

    #[arg(
        long = "summary-only",
        help = "Print only totals instead of one line per file"
    )]
    pub summary_only: bool,

    #[arg(
        short = 'f',
        long = "format",
        help = "Output format",
        value_enum,
        default_value = "text"
    )]
    pub output_format: OutputFormat,

    #[arg(
        short = 'o',
        long = "output",
        help = "Output file path (stdout if not specified)"
    )]
    pub output_file: Option<PathBuf>,

    #[arg(
        short = 'w',
        long = "write-manifest",
        help = "Store the computed digests in a JSON manifest",
        conflicts_with = "check"
    )]
    pub write_manifest: Option<PathBuf>,

    #[arg(
        short = 'c',
        long = "check",
        help = "Verify files against a previously written manifest"
    )]
    pub check: Option<PathBuf>,
}

fn parse_chunk_size(value: &str) -> Result<usize, String> {
    let size: usize = value.parse().map_err(|e| format!("{}", e))?;
    if (1..=MAX_CHUNK_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(format!("must be between 1 and {}", MAX_CHUNK_SIZE))
    }
}

impl Cli {
    pub fn to_scan_config(&self) -> ScanConfig {
        let paths = if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        };

        let digest = DigestConfig::new()
            .with_algorithm(self.hash_algorithm.clone().into())
            .with_chunk_size(self.chunk_size);

        let mut config = ScanConfig::new()
            .with_paths(paths)
            .with_follow_symlinks(self.follow_symlinks)
            .with_digest(digest);

        if let Some(max_depth) = self.max_depth {
            config = config.with_max_depth(max_depth);
        }
        if let Some(threads) = self.threads {
            config = config.with_thread_count(threads);
        }

        config
    }
}
