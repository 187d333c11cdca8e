pub mod batch;
pub mod digest_computer;

pub use batch::BatchDigestService;
pub use digest_computer::{StreamingDigestComputer, digest_and_size};
