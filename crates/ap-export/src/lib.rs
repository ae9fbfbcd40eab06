/// Glyph rasterization and PNG export for asciiparser.
///
/// Turns a sampled text grid back into pixels: font adapters, the glyph
/// compositor, and the PNG encoder.
pub mod builtin;
pub mod compositor;
pub mod encode;
pub mod font;

pub use builtin::BuiltinFont;
pub use compositor::GlyphCompositor;
pub use encode::{render_to_file, save_png};
pub use font::{AbGlyphFont, load_font};
