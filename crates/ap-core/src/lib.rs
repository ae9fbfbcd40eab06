/// Configuration, types, and shared structures for asciiparser.
///
/// This crate contains all shared types, traits, and configuration logic
/// used across the asciiparser workspace.

pub mod charset;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod grid;
pub mod traits;

pub use charset::{GradientLut, RENDER_CHAR_MAP};
pub use color::Rgb;
pub use config::PipelineConfig;
pub use error::{CoreError, CoreResult};
pub use frame::{AsciiArt, AsciiCell, Canvas, ColorBuffer, GlyphBitmap, SourceImage};
pub use grid::SamplingGrid;
pub use traits::GlyphFont;
