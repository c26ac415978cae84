//! On-screen coordinate decoding.
//!
//! The HUD renders coordinates in a fixed bitmap font. The decoder locates the text by
//! its first run of pure-white pixels, derives the UI scale from that run, then samples
//! one 7-row column per character cell and maps it through [`font`].
pub mod buffer;
pub mod decoder;
pub mod font;
pub mod synth;

pub use buffer::{PixelView, Region, LIT};
pub use decoder::{decode, DecoderConfig, GlyphDecoder, TextAnchor};
pub use font::Glyph;
pub use synth::SyntheticHud;
