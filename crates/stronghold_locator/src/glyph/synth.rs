//! Synthetic HUD captures rendered with the decoder's own font, for tests,
//! benchmarks and host calibration.
use crate::error::Result;
use crate::glyph::buffer::{PixelView, LIT};
use crate::glyph::decoder::DecoderConfig;
use crate::glyph::font::{Glyph, GLYPH_ROWS};

/// Background color of rendered captures (opaque black).
pub const BACKGROUND: u32 = 0xFF00_0000;

/// An owned, tightly packed pixel buffer showing one coordinate line.
#[derive(Clone, Debug)]
pub struct SyntheticHud {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
    anchor: (usize, usize),
}

impl SyntheticHud {
    /// Renders `text` (digits, `-`, and `/` or space as separators) at `scale`.
    ///
    /// The label is drawn as a single bar `min_run * scale` pixels long, and the
    /// glyphs follow `label_advance * scale` pixels after its start.
    pub fn render(text: &str, scale: usize, config: &DecoderConfig) -> Self {
        let scale = scale.max(1);
        let x0 = config.scan_offset_x + 1;
        let y0 = config.scan_offset_y + 1;
        let glyphs: Vec<Glyph> = text.chars().map(Glyph::from_char).collect();

        let width =
            x0 + (config.label_advance + config.glyph_advance * (glyphs.len() + 1)) * scale + 1;
        let height = y0 + GLYPH_ROWS * scale + 1;
        let mut hud = Self {
            pixels: vec![BACKGROUND; width * height],
            width,
            height,
            anchor: (x0, y0),
        };

        hud.fill(x0, y0, config.min_run * scale, 1);
        for (i, glyph) in glyphs.iter().enumerate() {
            let column = x0 + (config.label_advance + i * config.glyph_advance) * scale;
            let mask = glyph.mask();
            for dy in 0..GLYPH_ROWS {
                if mask & (1 << (GLYPH_ROWS - 1 - dy)) != 0 {
                    hud.fill(column, y0 + dy * scale, scale, scale);
                }
            }
        }
        hud
    }

    fn fill(&mut self, x: usize, y: usize, w: usize, h: usize) {
        for yy in y..(y + h).min(self.height) {
            for xx in x..(x + w).min(self.width) {
                self.pixels[yy * self.width + xx] = LIT;
            }
        }
    }

    pub fn view(&self) -> Result<PixelView<'_>> {
        PixelView::packed(&self.pixels, self.width, self.height)
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Top-left pixel of the label bar.
    pub fn anchor(&self) -> (usize, usize) {
        self.anchor
    }
}
