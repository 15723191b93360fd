pub mod normalizer;

pub use normalizer::{NormalizeError, NormalizedBatch, OrderNormalizer};
