//! Column signatures of the HUD font.
//!
//! Each character is identified by a single 7-sample column taken at the start of its
//! cell, packed top sample first into the low 7 bits of a `u8`.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rows sampled per column.
pub const GLYPH_ROWS: usize = 7;

/// Column mask of each digit, indexed by the digit value.
pub const DIGIT_MASKS: [u8; 10] = [
    0b0111110, 0b0000001, 0b0100011, 0b0100010, 0b0001100, 0b1110010, 0b0011110, 0b1100000,
    0b0110110, 0b0110000,
];

/// Column mask of the minus sign.
pub const SIGN_MASK: u8 = 0b0001000;

/// Column mask of the separator between components.
pub const SEPARATOR_MASK: u8 = 0b0000011;

/// What one sampled column stands for.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyph {
    Digit(u8),
    Sign,
    Separator,
    Unknown,
}

impl Glyph {
    pub fn from_mask(mask: u8) -> Self {
        match mask {
            SIGN_MASK => Glyph::Sign,
            SEPARATOR_MASK => Glyph::Separator,
            m => DIGIT_MASKS
                .iter()
                .position(|&d| d == m)
                .map_or(Glyph::Unknown, |d| Glyph::Digit(d as u8)),
        }
    }

    /// Column mask that renders this glyph; `Unknown` renders blank.
    pub fn mask(self) -> u8 {
        match self {
            Glyph::Digit(d) => DIGIT_MASKS.get(d as usize).copied().unwrap_or(0),
            Glyph::Sign => SIGN_MASK,
            Glyph::Separator => SEPARATOR_MASK,
            Glyph::Unknown => 0,
        }
    }

    /// Glyph for a character of a coordinate string (`'-'`, `'/'` or `' '` as separator).
    pub fn from_char(c: char) -> Self {
        match c {
            '0'..='9' => Glyph::Digit(c as u8 - b'0'),
            '-' => Glyph::Sign,
            '/' | ' ' => Glyph::Separator,
            _ => Glyph::Unknown,
        }
    }
}
