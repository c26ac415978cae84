//! Bounds-checked view over a packed 32-bit pixel buffer.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The only color counted as lit: opaque pure white.
pub const LIT: u32 = 0xFFFF_FFFF;

/// Row-major view of one 32-bit color per pixel, with an explicit row stride.
#[derive(Clone, Copy, Debug)]
pub struct PixelView<'a> {
    pixels: &'a [u32],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a> PixelView<'a> {
    /// Wraps `pixels`, checking that every addressed pixel is inside the slice.
    pub fn new(pixels: &'a [u32], width: usize, height: usize, stride: usize) -> Result<Self> {
        if stride < width {
            return Err(Error::MalformedInput(format!(
                "stride {stride} is smaller than width {width}"
            )));
        }
        let required = if height == 0 || width == 0 {
            0
        } else {
            stride
                .checked_mul(height - 1)
                .and_then(|rows| rows.checked_add(width))
                .ok_or_else(|| {
                    Error::MalformedInput(format!(
                        "{width}x{height} with stride {stride} overflows the address space"
                    ))
                })?
        };
        if pixels.len() < required {
            return Err(Error::MalformedInput(format!(
                "pixel buffer holds {} pixels, {width}x{height} with stride {stride} needs {required}",
                pixels.len()
            )));
        }
        Ok(Self {
            pixels,
            width,
            height,
            stride,
        })
    }

    /// Tightly packed view (`stride == width`).
    pub fn packed(pixels: &'a [u32], width: usize, height: usize) -> Result<Self> {
        Self::new(pixels, width, height, width)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn full_region(&self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }

    /// Pixel at `(x, y)`, or `None` outside the view.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.stride + x).copied()
    }

    /// Whether `(x, y)` is exactly [`LIT`]. Out-of-bounds pixels are unlit.
    #[inline]
    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == Some(LIT)
    }
}

/// Sub-rectangle of a [`PixelView`] to scan.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The HUD search window used for a full client capture: the top third of the
    /// frame, and the left third but at least 125 pixels wide.
    pub fn hud_search_area(frame_width: usize, frame_height: usize) -> Self {
        let width = (frame_width / 3).max(125.min(frame_width));
        Self::new(0, 0, width, frame_height / 3)
    }

    /// Exclusive right edge, saturating at `usize::MAX`.
    pub fn right(&self) -> usize {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `usize::MAX`.
    pub fn bottom(&self) -> usize {
        self.y.saturating_add(self.height)
    }

    /// Intersection with `view`, or `None` when nothing remains.
    pub fn clip_to(&self, view: &PixelView<'_>) -> Option<Region> {
        let right = self.right().min(view.width());
        let bottom = self.bottom().min(view.height());
        if self.x >= right || self.y >= bottom {
            return None;
        }
        Some(Region::new(self.x, self.y, right - self.x, bottom - self.y))
    }
}
