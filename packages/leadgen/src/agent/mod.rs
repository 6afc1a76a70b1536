//! Agent implementations.

pub mod wavelet;

pub use wavelet::WaveletAgent;
