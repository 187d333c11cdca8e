use crate::domain::{DigestReport, FileEntry, HashAlgorithm, ScanConfig, VerifyEntry};
use anyhow::Result;
use std::io::{self, Read};

/// A byte stream read in bounded chunks. A read of zero bytes means end of stream.
pub trait DataSource {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<R: Read + ?Sized> DataSource for R {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }
}

/// Receives completion percentages while a source is being digested.
///
/// `-1.0` means the total size is unknown. Returning an error aborts the computation.
pub trait ProgressPort {
    fn report(&mut self, percent: f64) -> Result<()>;
}

impl<F> ProgressPort for F
where
    F: FnMut(f64) -> Result<()>,
{
    fn report(&mut self, percent: f64) -> Result<()> {
        self(percent)
    }
}

/// Running digest over bytes fed in order.
pub trait StreamingHasher: Send {
    fn algorithm(&self) -> HashAlgorithm;
    fn update(&mut self, data: &[u8]);
    /// Lowercase hex of the digest over everything passed to `update`.
    fn finalize(self: Box<Self>) -> String;
}

pub trait HashingPort {
    fn new_hasher(&self, algorithm: HashAlgorithm) -> Box<dyn StreamingHasher>;
}

pub trait FileSystemPort {
    fn scan_files(&self, config: &ScanConfig) -> Result<Vec<FileEntry>>;
}

pub trait OutputPort {
    fn write_report(&self, report: &DigestReport) -> Result<()>;
    fn write_verification(&self, entries: &[VerifyEntry]) -> Result<()>;
}

pub trait ScanProgressPort {
    fn start(&self, total: u64);
    fn update(&self, processed: u64);
    fn finish(&self);
}
