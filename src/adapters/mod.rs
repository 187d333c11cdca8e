pub mod filesystem;
pub mod manifest;
pub mod multi_hasher;
pub mod output;
pub mod progress;

pub use filesystem::FileSystemAdapter;
pub use manifest::ManifestAdapter;
pub use multi_hasher::{AlgorithmHasher, MultiAlgorithmHasher};
pub use output::{ConsoleOutputAdapter, CsvOutputAdapter, JsonOutputAdapter};
pub use progress::{LogProgressAdapter, PercentBarAdapter, ProgressBarAdapter};
