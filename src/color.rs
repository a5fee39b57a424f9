//! Monochrome pixel colors
//!
//! The panel stores 1 bit per pixel, 8 horizontal pixels per byte, MSB
//! first. A set bit is a white (unset) pixel, a cleared bit is black.
//!
//! | Color | Bit | Fill byte |
//! |-------|-----|-----------|
//! | Black | 0   | 0x00      |
//! | White | 1   | 0xFF      |
//!
//! ## Example
//!
//! ```
//! use epd2in13v4::Color;
//!
//! assert_eq!(Color::White.fill_byte(), 0xFF);
//! assert_eq!(Color::Black.fill_byte(), 0x00);
//! ```

/// Colors supported by the monochrome panel
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub enum Color {
    /// Black pixels
    Black,
    /// White pixels
    #[default]
    White,
}

impl Color {
    /// Byte that fills 8 pixels with this color
    pub fn fill_byte(self) -> u8 {
        match self {
            Self::Black => 0x00,
            Self::White => 0xFF,
        }
    }
}
