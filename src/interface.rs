//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`Interface`] struct
//! for talking to the panel controller over SPI.
//!
//! ## Hardware Requirements
//!
//! The 2.13" V4 panel requires:
//! - SPI bus (MOSI + SCK), mode 0, a few MHz; CS is driven by the [`SpiDevice`]
//! - 3 GPIO pins:
//!   - **DC**: Data/Command select (output)
//!   - **RST**: Reset (output, active low)
//!   - **BUSY**: Busy status (input, active high)
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use epd2in13v4::{DisplayInterface, Interface};
//! # use core::convert::Infallible;
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
//! # let mut delay = MockDelay;
//! // Create interface with SPI and GPIO pins
//! let mut interface = Interface::new(MockSpi, MockPin, MockPin, MockPin);
//!
//! // Bound the busy wait to 5 seconds instead of blocking forever
//! interface.set_busy_timeout(Some(5_000));
//!
//! // Send command
//! let _ = interface.send_command(0x12); // Soft reset
//!
//! // Wait for display ready
//! let _ = interface.busy_wait(&mut delay);
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Trait for hardware interface to the panel controller
///
/// This trait abstracts over different hardware implementations,
/// allowing the [`Display`](crate::display::Display) to work with any
/// SPI + GPIO implementation that satisfies embedded-hal traits.
///
/// ## Implementing
///
/// For most cases, use the provided [`Interface`] struct. Implement this
/// trait yourself when the panel sits behind something other than plain
/// embedded-hal pins (an I/O expander, a test recorder, ...).
pub trait DisplayInterface {
    /// Error type for interface operations
    type Error: Debug;

    /// Send a command byte to the controller
    ///
    /// The implementation must:
    /// 1. Set DC pin low (command mode)
    /// 2. Send the byte in its own CS-framed transaction
    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error>;

    /// Send data bytes to the controller
    ///
    /// The implementation must:
    /// 1. Set DC pin high (data mode)
    /// 2. Send every byte in its own CS-framed transaction
    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Perform the power-on hardware reset
    ///
    /// The implementation must drive RST high for 20ms, low for 2ms, then
    /// high again and hold it for 20ms.
    fn reset<D: DelayNs>(&mut self, delay: &mut D) -> InterfaceResult<(), Self::Error>;

    /// Short reset pulse used to re-arm the controller before a partial refresh
    ///
    /// RST low for 1ms, then high. No extended hold.
    fn pulse_reset<D: DelayNs>(&mut self, delay: &mut D) -> InterfaceResult<(), Self::Error>;

    /// Wait for the busy pin to report ready
    ///
    /// Polls BUSY until it reads ready, then waits one more poll interval
    /// before returning.
    ///
    /// # Errors
    ///
    /// Returns [`InterfaceError::Timeout`] if a deadline is configured and
    /// BUSY doesn't clear within it.
    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D) -> InterfaceResult<(), Self::Error>;
}

/// Errors that can occur at the interface level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
    /// Timeout waiting for busy pin
    Timeout,
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
            Self::Timeout => write!(f, "Timeout waiting for display"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Default busy pin poll interval in microseconds
///
/// Also used as the settle delay after BUSY clears.
pub const DEFAULT_BUSY_POLL_US: u32 = 10_000;

/// Hardware interface implementation for the 2.13" V4 panel
///
/// Implements [`DisplayInterface`] for embedded-hal v1.0 SPI and GPIO traits.
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`] (owns CS)
/// * `DC` - Data/Command pin implementing [`OutputPin`]
/// * `RST` - Reset pin implementing [`OutputPin`]
/// * `BUSY` - Busy pin implementing [`InputPin`]
pub struct Interface<SPI, DC, RST, BUSY> {
    /// SPI device for communication
    spi: SPI,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    /// Reset pin (active low)
    rst: RST,
    /// Busy pin (active high)
    busy: BUSY,
    /// Delay between busy polls, in microseconds
    busy_poll_us: u32,
    /// Optional deadline for busy-wait in milliseconds
    busy_timeout_ms: Option<u32>,
    /// Busy pin polarity (true = active high, false = active low)
    busy_active_high: bool,
}

impl<SPI, DC, RST, BUSY> Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
{
    /// Create a new Interface
    ///
    /// The pins must already be configured (direction, pull) and the SPI
    /// device opened by the HAL. Busy-wait defaults: 10ms poll interval,
    /// no deadline, BUSY active high.
    ///
    /// # Arguments
    ///
    /// * `spi` - SPI device (must implement [`SpiDevice`])
    /// * `dc` - Data/Command pin (output, low=command, high=data)
    /// * `rst` - Reset pin (output, active low)
    /// * `busy` - Busy pin (input, active high)
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            busy_poll_us: DEFAULT_BUSY_POLL_US,
            busy_timeout_ms: None,
            busy_active_high: true,
        }
    }

    /// Set the busy-wait deadline in milliseconds
    ///
    /// `None` (the default) waits indefinitely, which is the panel vendor's
    /// contract: a panel that never clears BUSY hangs the caller.
    pub fn set_busy_timeout(&mut self, timeout_ms: Option<u32>) -> &mut Self {
        self.busy_timeout_ms = timeout_ms;
        self
    }

    /// Get the current busy-wait deadline in milliseconds
    pub fn busy_timeout(&self) -> Option<u32> {
        self.busy_timeout_ms
    }

    /// Set the busy pin poll interval in microseconds (minimum 1)
    pub fn set_busy_poll_us(&mut self, poll_us: u32) -> &mut Self {
        self.busy_poll_us = poll_us.max(1);
        self
    }

    /// Get the busy pin poll interval in microseconds
    pub fn busy_poll_us(&self) -> u32 {
        self.busy_poll_us
    }

    /// Set busy pin polarity
    ///
    /// Default is active-high. Set to false for active-low panels.
    pub fn set_busy_active_high(&mut self, active_high: bool) -> &mut Self {
        self.busy_active_high = active_high;
        self
    }

    /// Get busy pin polarity (true = active high)
    pub fn busy_active_high(&self) -> bool {
        self.busy_active_high
    }

    /// Consume the interface and hand back the SPI device and pins
    pub fn release(self) -> (SPI, DC, RST, BUSY) {
        (self.spi, self.dc, self.rst, self.busy)
    }
}

impl<SPI, DC, RST, BUSY, PinErr> DisplayInterface for Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error> {
        log::trace!("command 0x{command:02X}");
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.spi.write(&[command]).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        // One transaction per byte, so CS is released between bytes
        for byte in data {
            self.spi
                .write(core::slice::from_ref(byte))
                .map_err(InterfaceError::Spi)?;
        }
        Ok(())
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D) -> InterfaceResult<(), Self::Error> {
        // HIGH 20ms -> LOW 2ms -> HIGH 20ms
        self.rst.set_high().map_err(InterfaceError::Pin)?;
        delay.delay_ms(20);
        self.rst.set_low().map_err(InterfaceError::Pin)?;
        delay.delay_ms(2);
        self.rst.set_high().map_err(InterfaceError::Pin)?;
        delay.delay_ms(20);
        Ok(())
    }

    fn pulse_reset<D: DelayNs>(&mut self, delay: &mut D) -> InterfaceResult<(), Self::Error> {
        self.rst.set_low().map_err(InterfaceError::Pin)?;
        delay.delay_ms(1);
        self.rst.set_high().map_err(InterfaceError::Pin)?;
        Ok(())
    }

    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D) -> InterfaceResult<(), Self::Error> {
        log::debug!("panel busy");
        let deadline_us = self.busy_timeout_ms.map(|ms| u64::from(ms) * 1_000);
        let mut waited_us = 0u64;

        loop {
            let is_busy = if self.busy_active_high {
                self.busy.is_high()
            } else {
                self.busy.is_low()
            };

            if !is_busy.map_err(InterfaceError::Pin)? {
                break;
            }

            if deadline_us.is_some_and(|deadline| waited_us >= deadline) {
                log::warn!("panel still busy after {waited_us}us, giving up");
                return Err(InterfaceError::Timeout);
            }

            delay.delay_us(self.busy_poll_us);
            waited_us += u64::from(self.busy_poll_us);
        }

        delay.delay_us(self.busy_poll_us);
        log::debug!("panel busy released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use embedded_hal::spi::{ErrorKind as SpiErrorKind, ErrorType, Operation};
    use embedded_hal_mock::eh1::MockError;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
    use std::io::ErrorKind as IoErrorKind;

    /// Records every delay in nanoseconds.
    #[derive(Default)]
    struct RecordingDelay {
        delays_ns: Vec<u32>,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.delays_ns.push(ns);
        }
    }

    type MockInterface = Interface<SpiMock<u8>, PinMock, PinMock, PinMock>;

    fn framed(byte: u8) -> [SpiTransaction<u8>; 3] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![byte]),
            SpiTransaction::transaction_end(),
        ]
    }

    /// Interface whose BUSY pin yields `busy_levels` (true = high) in order.
    fn busy_interface(busy_levels: &[bool]) -> MockInterface {
        let reads: Vec<PinTransaction> = busy_levels
            .iter()
            .map(|high| {
                PinTransaction::get(if *high { PinState::High } else { PinState::Low })
            })
            .collect();
        Interface::new(
            SpiMock::new(&[]),
            PinMock::new(&[]),
            PinMock::new(&[]),
            PinMock::new(&reads),
        )
    }

    fn pin_fault() -> MockError {
        MockError::Io(IoErrorKind::NotConnected)
    }

    /// SPI device that accepts `writes_left` writes, then fails every one after.
    #[derive(Default)]
    struct FailingSpi {
        writes_left: usize,
        written: Vec<u8>,
    }

    impl ErrorType for FailingSpi {
        type Error = SpiErrorKind;
    }

    impl SpiDevice for FailingSpi {
        fn transaction(
            &mut self,
            operations: &mut [Operation<'_, u8>],
        ) -> Result<(), Self::Error> {
            for operation in operations {
                if let Operation::Write(bytes) = operation {
                    if self.writes_left == 0 {
                        return Err(SpiErrorKind::Other);
                    }
                    self.writes_left -= 1;
                    self.written.extend_from_slice(bytes);
                }
            }
            Ok(())
        }
    }

    fn finish(interface: MockInterface) {
        let (mut spi, mut dc, mut rst, mut busy) = interface.release();
        spi.done();
        dc.done();
        rst.done();
        busy.done();
    }

    #[test]
    fn test_defaults() {
        let interface = busy_interface(&[]);
        assert_eq!(interface.busy_poll_us(), DEFAULT_BUSY_POLL_US);
        assert_eq!(interface.busy_timeout(), None);
        assert!(interface.busy_active_high());
        finish(interface);
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let mut interface = busy_interface(&[]);
        interface.set_busy_poll_us(0);
        assert_eq!(interface.busy_poll_us(), 1);
        finish(interface);
    }

    #[test]
    fn test_send_command_frames_single_byte() {
        let spi = SpiMock::new(&framed(0x12));
        let dc = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let mut interface = Interface::new(spi, dc, PinMock::new(&[]), PinMock::new(&[]));

        interface.send_command(0x12).unwrap();
        finish(interface);
    }

    #[test]
    fn test_send_data_frames_each_byte_separately() {
        let mut expectations = Vec::new();
        for byte in [0xAA, 0x55, 0x0F] {
            expectations.extend(framed(byte));
        }
        let spi = SpiMock::new(&expectations);
        let dc = PinMock::new(&[PinTransaction::set(PinState::High)]);
        let mut interface = Interface::new(spi, dc, PinMock::new(&[]), PinMock::new(&[]));

        interface.send_data(&[0xAA, 0x55, 0x0F]).unwrap();
        finish(interface);
    }

    #[test]
    fn test_reset_pulse_levels_and_timing() {
        let rst = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let mut interface =
            Interface::new(SpiMock::new(&[]), PinMock::new(&[]), rst, PinMock::new(&[]));
        let mut delay = RecordingDelay::default();

        interface.reset(&mut delay).unwrap();

        assert_eq!(delay.delays_ns, vec![20_000_000, 2_000_000, 20_000_000]);
        finish(interface);
    }

    #[test]
    fn test_pulse_reset_is_short() {
        let rst = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let mut interface =
            Interface::new(SpiMock::new(&[]), PinMock::new(&[]), rst, PinMock::new(&[]));
        let mut delay = RecordingDelay::default();

        interface.pulse_reset(&mut delay).unwrap();

        assert_eq!(delay.delays_ns, vec![1_000_000]);
        finish(interface);
    }

    #[test]
    fn test_busy_wait_polls_until_ready_then_settles_once() {
        let mut interface = busy_interface(&[true, true, false]);
        interface.set_busy_poll_us(10);
        let mut delay = RecordingDelay::default();

        interface.busy_wait(&mut delay).unwrap();

        // two polls while busy, one settle after release
        assert_eq!(delay.delays_ns, vec![10_000, 10_000, 10_000]);
        finish(interface);
    }

    #[test]
    fn test_busy_wait_when_already_ready_returns_after_settle() {
        let mut interface = busy_interface(&[false, false]);
        let mut delay = RecordingDelay::default();

        interface.busy_wait(&mut delay).unwrap();
        interface.busy_wait(&mut delay).unwrap();

        assert_eq!(delay.delays_ns.len(), 2);
        finish(interface);
    }

    #[test]
    fn test_busy_wait_active_low_polarity() {
        let mut interface = busy_interface(&[false, true]);
        interface.set_busy_active_high(false);
        let mut delay = RecordingDelay::default();

        interface.busy_wait(&mut delay).unwrap();

        assert_eq!(delay.delays_ns.len(), 2);
        finish(interface);
    }

    #[test]
    fn test_busy_wait_times_out_when_deadline_set() {
        let mut interface = busy_interface(&[true, true, true]);
        interface.set_busy_poll_us(500).set_busy_timeout(Some(1));
        let mut delay = RecordingDelay::default();

        let result = interface.busy_wait(&mut delay);

        assert!(matches!(result, Err(InterfaceError::Timeout)));
        assert_eq!(delay.delays_ns, vec![500_000, 500_000]);
        finish(interface);
    }

    #[test]
    fn test_busy_wait_propagates_pin_read_error() {
        let busy = PinMock::new(&[PinTransaction::get(PinState::High).with_error(pin_fault())]);
        let mut interface =
            Interface::new(SpiMock::new(&[]), PinMock::new(&[]), PinMock::new(&[]), busy);
        let mut delay = RecordingDelay::default();

        let result = interface.busy_wait(&mut delay);

        assert!(matches!(
            result,
            Err(InterfaceError::Pin(MockError::Io(IoErrorKind::NotConnected)))
        ));
        assert!(delay.delays_ns.is_empty());
        finish(interface);
    }

    #[test]
    fn test_send_command_propagates_dc_error_before_writing() {
        let dc = PinMock::new(&[PinTransaction::set(PinState::Low).with_error(pin_fault())]);
        let mut interface =
            Interface::new(SpiMock::new(&[]), dc, PinMock::new(&[]), PinMock::new(&[]));

        let result = interface.send_command(0x12);

        assert!(matches!(result, Err(InterfaceError::Pin(_))));
        finish(interface);
    }

    #[test]
    fn test_reset_propagates_rst_error() {
        let rst = PinMock::new(&[PinTransaction::set(PinState::High).with_error(pin_fault())]);
        let mut interface =
            Interface::new(SpiMock::new(&[]), PinMock::new(&[]), rst, PinMock::new(&[]));
        let mut delay = RecordingDelay::default();

        let result = interface.reset(&mut delay);

        assert!(matches!(result, Err(InterfaceError::Pin(_))));
        assert!(delay.delays_ns.is_empty());
        finish(interface);
    }

    #[test]
    fn test_send_data_stops_at_failing_spi_write() {
        let spi = FailingSpi {
            writes_left: 1,
            ..FailingSpi::default()
        };
        let dc = PinMock::new(&[PinTransaction::set(PinState::High)]);
        let mut interface = Interface::new(spi, dc, PinMock::new(&[]), PinMock::new(&[]));

        let result = interface.send_data(&[0xAA, 0x55, 0x0F]);

        assert!(matches!(result, Err(InterfaceError::Spi(SpiErrorKind::Other))));
        let (spi, mut dc, mut rst, mut busy) = interface.release();
        assert_eq!(spi.written, vec![0xAA]);
        dc.done();
        rst.done();
        busy.done();
    }

    #[test]
    fn test_send_command_propagates_spi_error() {
        let dc = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let mut interface = Interface::new(
            FailingSpi::default(),
            dc,
            PinMock::new(&[]),
            PinMock::new(&[]),
        );

        let result = interface.send_command(0x12);

        assert!(matches!(result, Err(InterfaceError::Spi(SpiErrorKind::Other))));
        let (spi, mut dc, mut rst, mut busy) = interface.release();
        assert!(spi.written.is_empty());
        dc.done();
        rst.done();
        busy.done();
    }

    #[test]
    fn test_interface_error_display() {
        let err: InterfaceError<(), ()> = InterfaceError::Timeout;
        assert_eq!(alloc::format!("{err}"), "Timeout waiting for display");
    }
}
