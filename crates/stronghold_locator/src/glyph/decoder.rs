//! Decoding of the on-screen coordinate line into an `(x, y, z)` triple.
use glam::IVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::glyph::buffer::{PixelView, Region};
use crate::glyph::font::{Glyph, GLYPH_ROWS};

/// Layout parameters of the HUD text, in font units (multiplied by the detected scale).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Columns skipped at the left of the region before scanning.
    pub scan_offset_x: usize,
    /// Rows skipped at the top of the region before scanning.
    pub scan_offset_y: usize,
    /// Lit pixels in a row that mark the start of the text at scale 1.
    pub min_run: usize,
    /// Distance from the start of the text to the first coordinate glyph.
    pub label_advance: usize,
    /// Width of one character cell.
    pub glyph_advance: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            scan_offset_x: 8,
            scan_offset_y: 30,
            min_run: 4,
            label_advance: 44,
            glyph_advance: 6,
        }
    }
}

impl DecoderConfig {
    pub fn with_scan_offset(mut self, x: usize, y: usize) -> Self {
        self.scan_offset_x = x;
        self.scan_offset_y = y;
        self
    }

    pub fn with_label_advance(mut self, label_advance: usize) -> Self {
        self.label_advance = label_advance;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_run == 0 {
            return Err(Error::InvalidConfig("min_run must be > 0".into()));
        }
        if self.glyph_advance == 0 {
            return Err(Error::InvalidConfig("glyph_advance must be > 0".into()));
        }
        Ok(())
    }
}

/// Where the text starts and how large it is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextAnchor {
    pub x: usize,
    pub y: usize,
    pub scale: usize,
}

/// Fixed-font column decoder for the coordinate HUD line.
#[derive(Clone, Debug, Default)]
pub struct GlyphDecoder {
    config: DecoderConfig,
}

impl GlyphDecoder {
    pub fn new(config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Finds the first row, scanning top to bottom, holding a run of at least
    /// `min_run` lit pixels. The run's full length sets the scale.
    pub fn locate_text(&self, view: &PixelView<'_>, region: Region) -> Option<TextAnchor> {
        let region = region.clip_to(view)?;
        let top = region.y.saturating_add(self.config.scan_offset_y);
        let left = region.x.saturating_add(self.config.scan_offset_x);

        for y in top..region.bottom() {
            let mut run = 0usize;
            let mut run_start = left;
            for x in left..region.right() {
                if view.is_lit(x, y) {
                    if run == 0 {
                        run_start = x;
                    }
                    run += 1;
                } else if run >= self.config.min_run {
                    break;
                } else {
                    run = 0;
                }
            }
            if run >= self.config.min_run {
                return Some(TextAnchor {
                    x: run_start,
                    y,
                    scale: (run / self.config.min_run).max(1),
                });
            }
        }
        None
    }

    /// Samples the 7-row column at `x`, top sample in the most significant bit.
    fn column_mask(&self, view: &PixelView<'_>, region: &Region, x: usize, anchor: &TextAnchor) -> u8 {
        let mut mask = 0u8;
        for dy in 0..GLYPH_ROWS {
            mask <<= 1;
            let y = anchor.y.saturating_add(dy.saturating_mul(anchor.scale));
            if y < region.bottom() && view.is_lit(x, y) {
                mask |= 1;
            }
        }
        mask
    }

    /// Decodes the coordinate triple shown inside `region`.
    ///
    /// Fails with [`Error::DecodeFailed`] when no text start is visible or a component
    /// overflows `i32`, and with [`Error::MalformedInput`] when `region` lies outside
    /// the view.
    pub fn decode(&self, view: &PixelView<'_>, region: Region) -> Result<IVec3> {
        let clipped = region.clip_to(view).ok_or_else(|| {
            Error::MalformedInput(format!("region {region:?} does not overlap the pixel view"))
        })?;
        let anchor = self
            .locate_text(view, clipped)
            .ok_or_else(|| Error::decode_failed("no run of lit pixels in the scan area"))?;
        debug!(
            "HUD text found at ({}, {}) with scale {}.",
            anchor.x, anchor.y, anchor.scale
        );

        let mut coords = [0i32; 3];
        let mut index = 0usize;
        let mut negative = false;
        let step = self.config.glyph_advance.saturating_mul(anchor.scale);
        let mut x = anchor
            .x
            .saturating_add(self.config.label_advance.saturating_mul(anchor.scale));

        while x < clipped.right() && index < coords.len() {
            match Glyph::from_mask(self.column_mask(view, &clipped, x, &anchor)) {
                Glyph::Digit(d) => {
                    coords[index] = coords[index]
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(d as i32))
                        .ok_or_else(|| {
                            Error::decode_failed(format!("component {index} overflows"))
                        })?;
                }
                Glyph::Sign => negative = true,
                Glyph::Separator => {
                    if negative {
                        coords[index] = -coords[index];
                    }
                    negative = false;
                    index += 1;
                }
                Glyph::Unknown => {}
            }
            x = x.saturating_add(step);
        }

        if negative && index < coords.len() {
            coords[index] = -coords[index];
        }

        Ok(IVec3::new(coords[0], coords[1], coords[2]))
    }
}

/// Decodes with the default HUD layout.
pub fn decode(view: &PixelView<'_>, region: Region) -> Result<IVec3> {
    GlyphDecoder::default().decode(view, region)
}
