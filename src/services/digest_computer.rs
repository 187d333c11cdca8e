//! Chunked digest computation with progress reporting.
//!
//! A source is read in `chunk_size` pieces and every chunk is fed to the
//! hasher in read order while the byte count is accumulated. Progress is
//! reported synchronously:
//!
//! - unknown size: `-1` once before the first read,
//! - known size: the cumulative percentage after every chunk once it exceeds 10%,
//!   capped at 100 when the source outgrows the expected size,
//! - end of stream: `100.0`, always.

use crate::adapters::MultiAlgorithmHasher;
use crate::domain::{
    DigestConfig, DigestResult, HashAlgorithm, MAX_CHUNK_SIZE, PROGRESS_THRESHOLD_PERCENT,
    Progress,
};
use crate::error::{DigestError, Result};
use crate::ports::{DataSource, HashingPort, ProgressPort};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

pub struct StreamingDigestComputer<H = MultiAlgorithmHasher> {
    config: DigestConfig,
    hasher: H,
    cancel: Option<Arc<AtomicBool>>,
}

impl StreamingDigestComputer<MultiAlgorithmHasher> {
    pub fn new() -> Self {
        Self::with_hasher(DigestConfig::default(), MultiAlgorithmHasher::new())
    }

    pub fn with_config(config: DigestConfig) -> Self {
        Self::with_hasher(config, MultiAlgorithmHasher::new())
    }
}

impl Default for StreamingDigestComputer<MultiAlgorithmHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HashingPort> StreamingDigestComputer<H> {
    pub fn with_hasher(config: DigestConfig, hasher: H) -> Self {
        Self {
            config,
            hasher,
            cancel: None,
        }
    }

    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.config.algorithm = algorithm;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    /// Checked between chunk reads. Once set, `compute` stops with
    /// [`DigestError::Cancelled`] carrying the digest of what was read.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn compute<S>(
        &self,
        source: &mut S,
        expected_size: Option<u64>,
        mut on_progress: Option<&mut dyn ProgressPort>,
    ) -> Result<DigestResult>
    where
        S: DataSource + ?Sized,
    {
        if expected_size == Some(0) {
            return Err(DigestError::InvalidArgument(
                "expected size must be greater than zero".to_string(),
            ));
        }
        if !(1..=MAX_CHUNK_SIZE).contains(&self.config.chunk_size) {
            return Err(DigestError::InvalidArgument(format!(
                "chunk size must be between 1 and {} bytes, got {}",
                MAX_CHUNK_SIZE, self.config.chunk_size
            )));
        }

        let mut hasher = self.hasher.new_hasher(self.config.algorithm);
        let algorithm = hasher.algorithm();
        debug!(%algorithm, ?expected_size, chunk_size = self.config.chunk_size, "starting digest");

        let mut buffer = vec![0u8; self.config.chunk_size];
        let mut bytes_processed = 0u64;

        if expected_size.is_none() {
            report(&mut on_progress, Progress::Indeterminate)?;
        }

        loop {
            if self.is_cancelled() {
                debug!(bytes_processed, "digest cancelled");
                return Err(DigestError::Cancelled {
                    partial: DigestResult::new(algorithm, hasher.finalize(), bytes_processed),
                });
            }

            let bytes_read = match source.read_chunk(&mut buffer) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if bytes_read == 0 {
                break;
            }

            hasher.update(&buffer[..bytes_read]);
            bytes_processed += bytes_read as u64;
            trace!(bytes_read, bytes_processed, "chunk hashed");

            if let Some(expected) = expected_size {
                let percent = bytes_processed as f64 / expected as f64 * 100.0;
                if percent > PROGRESS_THRESHOLD_PERCENT {
                    report(&mut on_progress, Progress::Percent(percent.min(100.0)))?;
                }
            }
        }

        report(&mut on_progress, Progress::Percent(100.0))?;

        let result = DigestResult::new(algorithm, hasher.finalize(), bytes_processed);
        debug!(digest = result.digest(), size = result.size(), "digest complete");
        Ok(result)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

fn report(sink: &mut Option<&mut dyn ProgressPort>, progress: Progress) -> Result<()> {
    if let Some(sink) = sink.as_deref_mut() {
        sink.report(progress.as_percent())
            .map_err(|e| DigestError::Progress(e.into()))?;
    }
    Ok(())
}

/// Digest `source` with the default configuration: MD5 over 10,240 byte chunks.
pub fn digest_and_size<S>(
    source: &mut S,
    expected_size: Option<u64>,
    on_progress: Option<&mut dyn ProgressPort>,
) -> Result<DigestResult>
where
    S: DataSource + ?Sized,
{
    StreamingDigestComputer::new().compute(source, expected_size, on_progress)
}
