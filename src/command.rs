//! SSD1680 command definitions
//!
//! Register codes used to drive the 2.13" V4 panel controller. Commands are
//! sent with the DC pin low, their parameter bytes with DC high.
//!
//! ## Command Structure
//!
//! Every byte on the wire is its own chip-select framed transaction:
//! 1. Set DC low (command) or high (data)
//! 2. Assert CS
//! 3. Send one byte
//! 4. Deassert CS
//!
//! ## Example
//!
//! ```rust,no_run
//! use epd2in13v4::{command, DisplayInterface, Interface};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::{InputPin, OutputPin};
//! # use embedded_hal::spi::{Operation, SpiDevice};
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
//! # let mut interface = Interface::new(MockSpi, MockPin, MockPin, MockPin);
//! # let pixel_data = [0xFFu8; 16];
//! // Soft reset
//! let _ = interface.send_command(command::SOFT_RESET);
//!
//! // Write one row to the current-frame RAM
//! let _ = interface.send_command(command::WRITE_RAM_BW);
//! let _ = interface.send_data(&pixel_data);
//! ```

// System control commands

/// Driver output control command (0x01)
///
/// Sets the number of gate lines and the scanning direction.
/// Requires 3 bytes: [rows-1 (LSB), rows-1 (MSB), scanning mode]
pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;

/// Deep sleep command (0x10)
///
/// Enters ultra-low power mode. Only a hardware reset can wake the panel.
/// Requires 1 byte: 0x01 = deep sleep mode 1 (RAM retained)
pub const DEEP_SLEEP: u8 = 0x10;

/// Data entry mode command (0x11)
///
/// Controls the address counter auto-increment direction.
/// Requires 1 byte:
/// - Bit 0 (ID0): X direction (0=decrement, 1=increment)
/// - Bit 1 (ID1): Y direction (0=decrement, 1=increment)
/// - Bit 2 (AM): Address counter direction (0=X, 1=Y)
pub const DATA_ENTRY_MODE: u8 = 0x11;

/// Soft reset command (0x12)
///
/// Resets the controller registers to defaults. Must wait for BUSY low after issuing.
pub const SOFT_RESET: u8 = 0x12;

/// Temperature sensor control command (0x18)
///
/// Selects the temperature sensor. Requires 1 byte: 0x80 = internal
pub const TEMP_SENSOR_CONTROL: u8 = 0x18;

/// Write temperature register command (0x1A)
///
/// Overrides the temperature value used for waveform selection.
/// Requires 2 bytes.
pub const WRITE_TEMP: u8 = 0x1A;

// Display update commands

/// Master activation command (0x20)
///
/// Runs the sequence selected by [`DISPLAY_UPDATE_CTRL2`]. BUSY goes high
/// until the sequence completes.
pub const MASTER_ACTIVATION: u8 = 0x20;

/// Display update control 1 command (0x21)
///
/// RAM content options for the update. Requires 2 bytes.
pub const DISPLAY_UPDATE_CTRL1: u8 = 0x21;

/// Display update control 2 command (0x22)
///
/// Selects the sequence run by [`MASTER_ACTIVATION`]. Requires 1 byte.
/// Values used by this panel:
/// - 0xF7: full refresh
/// - 0xC7: fast refresh
/// - 0xFF: partial refresh
/// - 0xB1 / 0x91: load temperature value (fast init)
pub const DISPLAY_UPDATE_CTRL2: u8 = 0x22;

// RAM commands

/// Write to BW RAM (current frame) command (0x24)
///
/// Bit=0: Black, Bit=1: White
pub const WRITE_RAM_BW: u8 = 0x24;

/// Write to the previous-frame RAM command (0x26)
///
/// The controller diffs this bank against BW RAM during partial refresh.
pub const WRITE_RAM_PREVIOUS: u8 = 0x26;

/// Border waveform control command (0x3C)
///
/// Requires 1 byte of data.
pub const BORDER_WAVEFORM: u8 = 0x3C;

/// Set RAM X address range command (0x44)
///
/// Requires 2 bytes in byte units: [start >> 3, end >> 3]
pub const SET_RAM_X_RANGE: u8 = 0x44;

/// Set RAM Y address range command (0x45)
///
/// Requires 4 bytes: [start_LSB, start_MSB, end_LSB, end_MSB]
pub const SET_RAM_Y_RANGE: u8 = 0x45;

/// Set RAM X address counter command (0x4E)
///
/// Requires 1 byte.
pub const SET_RAM_X_COUNTER: u8 = 0x4E;

/// Set RAM Y address counter command (0x4F)
///
/// Requires 2 bytes: [address_LSB, address_MSB]
pub const SET_RAM_Y_COUNTER: u8 = 0x4F;
