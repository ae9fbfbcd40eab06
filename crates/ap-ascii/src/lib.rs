/// ASCII conversion engine for asciiparser.
///
/// Samples source images into gradient-character grids and persists them as
/// plain-text artifacts.
pub mod artifact;
pub mod sampler;

pub use sampler::{AsciiSampler, SampleProgress};
