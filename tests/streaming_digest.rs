use proptest::prelude::*;
use simdigest::{DigestError, HashAlgorithm, StreamingDigestComputer, digest_and_size};
use std::io::{self, Cursor, Read};
use std::thread;

/// Hands out at most `step` bytes per read, to vary chunk boundaries.
struct Stepped {
    inner: Cursor<Vec<u8>>,
    step: usize,
}

impl Read for Stepped {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len());
        self.inner.read(&mut buf[..n])
    }
}

fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

proptest! {
    #[test]
    fn size_and_digest_match_input(data in prop::collection::vec(any::<u8>(), 0..20_000)) {
        let result = digest_and_size(&mut Cursor::new(&data), None, None).unwrap();
        prop_assert_eq!(result.size(), data.len() as u64);
        prop_assert_eq!(result.digest(), md5_hex(&data));
    }

    #[test]
    fn read_boundaries_are_transparent(
        data in prop::collection::vec(any::<u8>(), 0..20_000),
        step in 1usize..12_000,
        chunk_size in 1usize..12_000,
    ) {
        let mut source = Stepped { inner: Cursor::new(data.clone()), step };
        let stepped = StreamingDigestComputer::new()
            .with_chunk_size(chunk_size)
            .compute(&mut source, None, None)
            .unwrap();
        let whole = digest_and_size(&mut Cursor::new(&data), None, None).unwrap();
        prop_assert_eq!(stepped, whole);
    }

    #[test]
    fn reported_progress_never_decreases(
        len in 1usize..50_000,
        step in 1usize..11_000,
    ) {
        let mut source = Stepped { inner: Cursor::new(vec![0u8; len]), step };
        let mut calls = Vec::new();
        let mut sink = |percent: f64| -> anyhow::Result<()> {
            calls.push(percent);
            Ok(())
        };
        digest_and_size(&mut source, Some(len as u64), Some(&mut sink)).unwrap();

        prop_assert!(calls.iter().all(|p| *p > 10.0));
        prop_assert!(calls.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(calls.last().copied(), Some(100.0));
    }
}

#[test]
fn one_byte_and_default_reads_agree() {
    let data: Vec<u8> = (0..25_000u32).map(|i| (i * 7 % 256) as u8).collect();
    let mut one_byte = Stepped {
        inner: Cursor::new(data.clone()),
        step: 1,
    };
    let slow = digest_and_size(&mut one_byte, None, None).unwrap();
    let fast = digest_and_size(&mut Cursor::new(&data), None, None).unwrap();

    assert_eq!(slow.digest(), fast.digest());
    assert_eq!(slow.size(), 25_000);
}

#[test]
fn fifty_bytes_in_ten_byte_reads() {
    let mut source = Stepped {
        inner: Cursor::new(vec![b'a'; 50]),
        step: 10,
    };
    let mut calls = Vec::new();
    let mut sink = |percent: f64| -> anyhow::Result<()> {
        calls.push(percent);
        Ok(())
    };
    let result = digest_and_size(&mut source, Some(50), Some(&mut sink)).unwrap();

    assert_eq!(result.size(), 50);
    assert!(!calls.contains(&-1.0));
    assert_eq!(calls, vec![20.0, 40.0, 60.0, 80.0, 100.0, 100.0]);
}

#[test]
fn zero_expected_size_fails_fast() {
    let err = digest_and_size(&mut Cursor::new(b"data"), Some(0), None).unwrap_err();
    assert!(matches!(err, DigestError::InvalidArgument(_)));
}

#[test]
fn independent_computations_run_concurrently() {
    let handles: Vec<_> = (0..8u8)
        .map(|seed| {
            thread::spawn(move || {
                let data: Vec<u8> = (0..100_000u32).map(|i| (i as u8) ^ seed).collect();
                let computer = StreamingDigestComputer::new().with_algorithm(if seed % 2 == 0 {
                    HashAlgorithm::Md5
                } else {
                    HashAlgorithm::Sha256
                });
                let result = computer.compute(&mut Cursor::new(&data), Some(100_000), None).unwrap();
                (seed, data, result)
            })
        })
        .collect();

    for handle in handles {
        let (seed, data, result) = handle.join().unwrap();
        assert_eq!(result.size(), 100_000);
        if seed % 2 == 0 {
            assert_eq!(result.digest(), md5_hex(&data));
        } else {
            use sha2::{Digest, Sha256};
            assert_eq!(result.digest(), format!("{:x}", Sha256::digest(&data)));
        }
    }
}

#[test]
fn shared_computer_serves_many_threads() {
    let computer = StreamingDigestComputer::new();
    thread::scope(|scope| {
        for n in 1..6usize {
            let computer = &computer;
            scope.spawn(move || {
                let data = vec![n as u8; n * 9_999];
                let result = computer.compute(&mut Cursor::new(&data), None, None).unwrap();
                assert_eq!(result.digest(), md5_hex(&data));
            });
        }
    });
}
