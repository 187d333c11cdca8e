use crate::domain::HashAlgorithm;
use crate::ports::{HashingPort, StreamingHasher};
use blake3::Hasher as Blake3Hasher;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use xxhash_rust::xxh3::Xxh3;
use xxhash_rust::xxh64::Xxh64;

/// Hands out streaming hashers for every supported algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiAlgorithmHasher;

impl MultiAlgorithmHasher {
    pub fn new() -> Self {
        Self
    }
}

impl HashingPort for MultiAlgorithmHasher {
    fn new_hasher(&self, algorithm: HashAlgorithm) -> Box<dyn StreamingHasher> {
        Box::new(AlgorithmHasher::new(algorithm))
    }
}

pub enum AlgorithmHasher {
    Md5(md5::Context),
    Sha1(Sha1),
    Sha256(Sha256),
    Blake3(Box<Blake3Hasher>),
    XxHash3(Box<Xxh3>),
    XxHash64(Xxh64),
}

impl AlgorithmHasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => Self::Md5(md5::Context::new()),
            HashAlgorithm::Sha1 => Self::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(Blake3Hasher::new())),
            HashAlgorithm::XxHash3 => Self::XxHash3(Box::new(Xxh3::new())),
            HashAlgorithm::XxHash64 => Self::XxHash64(Xxh64::new(0)),
        }
    }
}

impl StreamingHasher for AlgorithmHasher {
    fn algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Md5(_) => HashAlgorithm::Md5,
            Self::Sha1(_) => HashAlgorithm::Sha1,
            Self::Sha256(_) => HashAlgorithm::Sha256,
            Self::Blake3(_) => HashAlgorithm::Blake3,
            Self::XxHash3(_) => HashAlgorithm::XxHash3,
            Self::XxHash64(_) => HashAlgorithm::XxHash64,
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(h) => h.consume(data),
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Blake3(h) => {
                h.update(data);
            }
            Self::XxHash3(h) => h.update(data),
            Self::XxHash64(h) => h.update(data),
        }
    }

    fn finalize(self: Box<Self>) -> String {
        match *self {
            Self::Md5(h) => format!("{:x}", h.compute()),
            Self::Sha1(h) => format!("{:x}", h.finalize()),
            Self::Sha256(h) => format!("{:x}", h.finalize()),
            Self::Blake3(h) => h.finalize().to_hex().to_string(),
            Self::XxHash3(h) => format!("{:032x}", h.digest128()),
            Self::XxHash64(h) => format!("{:016x}", h.digest()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(algorithm: HashAlgorithm, parts: &[&[u8]]) -> String {
        let mut hasher = MultiAlgorithmHasher::new().new_hasher(algorithm);
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize()
    }

    #[test]
    fn md5_matches_known_vectors() {
        assert_eq!(hash(HashAlgorithm::Md5, &[]), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            hash(HashAlgorithm::Md5, &[b"hello ", b"world"]),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn sha256_matches_known_vector() {
        assert_eq!(
            hash(HashAlgorithm::Sha256, &[b"hello world"]),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn sha1_matches_known_vector() {
        assert_eq!(
            hash(HashAlgorithm::Sha1, &[b"hello", b" world"]),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
    }

    #[test]
    fn blake3_matches_reference_crate() {
        let expected = blake3::hash(b"simulation output").to_hex().to_string();
        assert_eq!(hash(HashAlgorithm::Blake3, &[b"simulation", b" output"]), expected);
    }

    #[test]
    fn every_algorithm_reports_itself_and_expected_hex_length() {
        for algorithm in [
            HashAlgorithm::Md5,
            HashAlgorithm::Sha1,
            HashAlgorithm::Sha256,
            HashAlgorithm::Blake3,
            HashAlgorithm::XxHash3,
            HashAlgorithm::XxHash64,
        ] {
            let hasher = MultiAlgorithmHasher::new().new_hasher(algorithm);
            assert_eq!(hasher.algorithm(), algorithm);
            assert_eq!(hasher.finalize().len(), algorithm.hex_len());
        }
    }
}
