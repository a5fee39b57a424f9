//! Waveshare 2.13" V4 E-Paper Display Driver
//!
//! A driver for the 122x250 monochrome e-paper panel built on the SSD1680
//! controller.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - Full, fast and partial refresh
//! - Explicit panel lifecycle: refreshes are rejected unless the matching
//!   initialization ran first
//! - Optional deadline on the busy wait
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use epd2in13v4::{Builder, Display, Interface};
//!
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let spi = MockSpi;
//! # let dc = MockPin;
//! # let rst = MockPin;
//! # let busy = MockPin;
//! # let mut delay = MockDelay;
//! let interface = Interface::new(spi, dc, rst, busy);
//! let mut display = Display::new(interface, Builder::new().build());
//!
//! let frame = [0xFFu8; 16 * 250];
//! let _ = display.init(&mut delay);
//! let _ = display.display_base(&frame, &mut delay);
//! let _ = display.display_partial(&frame, &mut delay);
//! let _ = display.sleep(&mut delay);
//! ```

#![no_std]

#[cfg(test)]
extern crate alloc;

/// Monochrome pixel colors
pub mod color;
/// Controller command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Hardware interface abstraction
pub mod interface;

pub use color::Color;
pub use config::{
    Builder, Config, Dimensions, HEIGHT, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS, WIDTH,
};
pub use display::{Display, PanelState, RefreshMode};
pub use error::{BuilderError, Error};
pub use interface::InterfaceError;
pub use interface::{DEFAULT_BUSY_POLL_US, DisplayInterface, Interface};
