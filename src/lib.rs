//! Streaming checksums for simulation input and output files.
//!
//! The core is [`StreamingDigestComputer`]: it reads any [`std::io::Read`] in
//! fixed-size chunks, feeds a running digest (MD5 unless configured otherwise)
//! and reports progress to an optional [`ProgressPort`]. The remaining modules
//! build a small checksum tool around it: parallel hashing of directory trees,
//! JSON manifests and verification against them.
//!
//! ```
//! use simdigest::digest_and_size;
//!
//! let mut source = &b"hello world"[..];
//! let result = digest_and_size(&mut source, None, None).unwrap();
//! assert_eq!(result.digest(), "5eb63bbbe01eeed093cb22bb8f5acdc3");
//! assert_eq!(result.size(), 11);
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use domain::{DOWNLOAD_CHUNK_SIZE, DigestConfig, DigestResult, HashAlgorithm, Progress};
pub use error::{DigestError, Result};
pub use ports::{DataSource, ProgressPort, StreamingHasher};
pub use services::{StreamingDigestComputer, digest_and_size};
