//! Core display operations
//!
//! [`Display`] owns the interface and tracks the panel lifecycle explicitly:
//!
//! ```text
//! Unpowered --reset--> Resetting --init------> Initialized(Full)
//!                                --init_fast-> Initialized(Fast)
//! Initialized(any) --display_partial--> Initialized(Partial)
//! Initialized(any) --sleep--> Sleeping
//! any --reset/init/init_fast--> ...
//! ```
//!
//! Each refresh requires its matching initialization and fails with
//! [`Error::InvalidState`] otherwise, before anything is sent to the panel.

use embedded_hal::delay::DelayNs;

use crate::color::Color;
use crate::command::{
    BORDER_WAVEFORM, DATA_ENTRY_MODE, DEEP_SLEEP, DISPLAY_UPDATE_CTRL1, DISPLAY_UPDATE_CTRL2,
    DRIVER_OUTPUT_CONTROL, MASTER_ACTIVATION, SET_RAM_X_COUNTER, SET_RAM_X_RANGE,
    SET_RAM_Y_COUNTER, SET_RAM_Y_RANGE, SOFT_RESET, TEMP_SENSOR_CONTROL, WRITE_RAM_BW,
    WRITE_RAM_PREVIOUS, WRITE_TEMP,
};
use crate::config::{Config, Dimensions, MAX_SOURCE_OUTPUTS};
use crate::error::Error;
use crate::interface::DisplayInterface;

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Bytes in the longest packed row the controller can address
const MAX_ROW_BYTES: usize = (MAX_SOURCE_OUTPUTS as usize).div_ceil(8);

/// Refresh mode for display updates
///
/// Different refresh modes trade off speed vs quality.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RefreshMode {
    /// Full refresh (slowest, best quality, no ghosting)
    ///
    /// Requires [`Display::init`].
    #[default]
    Full,
    /// Fast full-screen refresh
    ///
    /// Requires [`Display::init_fast`].
    Fast,
    /// Partial refresh against the previous frame
    ///
    /// Seed the previous frame with [`Display::display_base`] first.
    Partial,
}

/// Panel lifecycle state tracked by the driver
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PanelState {
    /// No reset has been issued yet
    #[default]
    Unpowered,
    /// Hardware reset done, controller not configured
    Resetting,
    /// Configured for the given refresh mode
    Initialized(RefreshMode),
    /// Deep sleep; only a reset or re-initialization is accepted
    Sleeping,
}

/// Core display driver for the 2.13" V4 panel
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Lifecycle state
    state: PanelState,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    ///
    /// Nothing is sent to the panel until [`reset`](Self::reset) or one of
    /// the init methods is called.
    pub fn new(interface: I, config: Config) -> Self {
        Self {
            interface,
            config,
            state: PanelState::Unpowered,
        }
    }

    /// Perform the hardware reset pulse
    ///
    /// Valid from any state. The panel must be initialized again afterwards.
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.interface.reset(delay).map_err(Error::Interface)?;
        self.state = PanelState::Resetting;
        log::debug!("panel reset");
        Ok(())
    }

    /// Reset and initialize the controller for full and base refresh
    ///
    /// Must run before [`display`](Self::display), [`display_base`](Self::display_base)
    /// or [`clear`](Self::clear).
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.reset(delay)?;

        self.busy_wait(delay)?;
        self.send_command(SOFT_RESET)?;
        self.busy_wait(delay)?;

        self.send_command(DRIVER_OUTPUT_CONTROL)?;
        let driver_output = self.config.driver_output_control();
        self.send_data(&driver_output)?;

        self.send_command(DATA_ENTRY_MODE)?;
        self.send_data(&[self.config.data_entry_mode])?;

        self.set_full_window()?;

        self.send_command(BORDER_WAVEFORM)?;
        self.send_data(&[self.config.border_waveform])?;

        let ctrl1 = self.config.display_update_ctrl1;
        self.send_command(DISPLAY_UPDATE_CTRL1)?;
        self.send_data(&ctrl1)?;

        // Load the built-in temperature sensor reading
        self.send_command(TEMP_SENSOR_CONTROL)?;
        self.send_data(&[self.config.temp_sensor_control])?;
        self.busy_wait(delay)?;

        self.state = PanelState::Initialized(RefreshMode::Full);
        log::debug!("panel initialized for full refresh");
        Ok(())
    }

    /// Reset and initialize the controller for fast refresh
    ///
    /// Loads the temperature twice with a forced register value in between,
    /// which selects the fast waveform. Must run before
    /// [`display_fast`](Self::display_fast).
    pub fn init_fast<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.reset(delay)?;

        self.send_command(SOFT_RESET)?;
        self.busy_wait(delay)?;

        self.send_command(TEMP_SENSOR_CONTROL)?;
        self.send_data(&[self.config.temp_sensor_control])?;

        self.send_command(DATA_ENTRY_MODE)?;
        self.send_data(&[self.config.data_entry_mode])?;

        self.set_full_window()?;

        let [first_load, second_load] = self.config.fast_temp_load;
        self.activate(first_load, delay)?;

        let temperature = self.config.fast_temp_value;
        self.send_command(WRITE_TEMP)?;
        self.send_data(&temperature)?;

        self.activate(second_load, delay)?;

        self.state = PanelState::Initialized(RefreshMode::Fast);
        log::debug!("panel initialized for fast refresh");
        Ok(())
    }

    /// Write a frame and run a full refresh
    ///
    /// # Arguments
    ///
    /// * `buffer` - Packed frame, `dimensions.buffer_size()` bytes (extra bytes are ignored)
    /// * `delay` - Delay implementation
    pub fn display<D: DelayNs>(&mut self, buffer: &[u8], delay: &mut D) -> DisplayResult<I> {
        self.require("display a full refresh", |state| {
            state == PanelState::Initialized(RefreshMode::Full)
        })?;
        let frame = self.frame(buffer)?;

        self.write_ram(WRITE_RAM_BW, frame)?;
        self.turn_on(RefreshMode::Full, delay)
    }

    /// Write a frame to both RAM banks and run a full refresh
    ///
    /// Seeds the previous-frame bank so subsequent
    /// [`display_partial`](Self::display_partial) calls diff against this image.
    pub fn display_base<D: DelayNs>(&mut self, buffer: &[u8], delay: &mut D) -> DisplayResult<I> {
        self.require("display a base frame", |state| {
            state == PanelState::Initialized(RefreshMode::Full)
        })?;
        let frame = self.frame(buffer)?;

        self.write_ram(WRITE_RAM_BW, frame)?;
        self.write_ram(WRITE_RAM_PREVIOUS, frame)?;
        self.turn_on(RefreshMode::Full, delay)
    }

    /// Write a frame and run a fast refresh
    pub fn display_fast<D: DelayNs>(&mut self, buffer: &[u8], delay: &mut D) -> DisplayResult<I> {
        self.require("display a fast refresh", |state| {
            state == PanelState::Initialized(RefreshMode::Fast)
        })?;
        let frame = self.frame(buffer)?;

        self.write_ram(WRITE_RAM_BW, frame)?;
        self.turn_on(RefreshMode::Fast, delay)
    }

    /// Re-arm the controller, write a frame and run a partial refresh
    ///
    /// The controller forgets the partial configuration after every refresh,
    /// so the re-arm sequence runs on every call.
    pub fn display_partial<D: DelayNs>(
        &mut self,
        buffer: &[u8],
        delay: &mut D,
    ) -> DisplayResult<I> {
        self.require("display a partial refresh", |state| {
            matches!(state, PanelState::Initialized(_))
        })?;
        let frame = self.frame(buffer)?;

        self.arm_partial(delay)?;
        self.write_ram(WRITE_RAM_BW, frame)?;
        self.turn_on(RefreshMode::Partial, delay)
    }

    /// Write a frame using the given refresh mode
    pub fn display_with_mode<D: DelayNs>(
        &mut self,
        buffer: &[u8],
        mode: RefreshMode,
        delay: &mut D,
    ) -> DisplayResult<I> {
        match mode {
            RefreshMode::Full => self.display(buffer, delay),
            RefreshMode::Fast => self.display_fast(buffer, delay),
            RefreshMode::Partial => self.display_partial(buffer, delay),
        }
    }

    /// Fill the frame with a single color and run a full refresh
    ///
    /// Valid after [`init`](Self::init) or [`init_fast`](Self::init_fast).
    pub fn clear<D: DelayNs>(&mut self, color: Color, delay: &mut D) -> DisplayResult<I> {
        self.require("clear", |state| {
            matches!(
                state,
                PanelState::Initialized(RefreshMode::Full | RefreshMode::Fast)
            )
        })?;

        self.send_command(WRITE_RAM_BW)?;
        let fill = [color.fill_byte(); MAX_ROW_BYTES];
        let mut remaining = self.config.dimensions.buffer_size();
        while remaining > 0 {
            let chunk = remaining.min(MAX_ROW_BYTES);
            self.send_data(&fill[..chunk])?;
            remaining -= chunk;
        }

        self.turn_on(RefreshMode::Full, delay)
    }

    /// Clear the panel to white
    pub fn clear_white<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.clear(Color::White, delay)
    }

    /// Clear the panel to black
    pub fn clear_black<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.clear(Color::Black, delay)
    }

    /// Enter deep sleep
    ///
    /// The panel keeps showing the last image. Any further refresh needs
    /// [`init`](Self::init) or [`init_fast`](Self::init_fast) first.
    pub fn sleep<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.require("enter deep sleep", |state| {
            matches!(state, PanelState::Initialized(_))
        })?;

        self.send_command(DEEP_SLEEP)?;
        self.send_data(&[self.config.deep_sleep_mode])?;
        delay.delay_ms(self.config.sleep_settle_ms);

        self.state = PanelState::Sleeping;
        log::debug!("panel asleep");
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> &Dimensions {
        &self.config.dimensions
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access to the interface, e.g. to tune busy-wait settings
    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Consume the display and hand back the interface
    pub fn release(self) -> I {
        self.interface
    }

    /// Partial refresh re-arm: short reset pulse, then border, driver output,
    /// data entry and full window again
    fn arm_partial<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.interface.pulse_reset(delay).map_err(Error::Interface)?;

        self.send_command(BORDER_WAVEFORM)?;
        self.send_data(&[self.config.border_waveform_partial])?;

        self.send_command(DRIVER_OUTPUT_CONTROL)?;
        let driver_output = self.config.driver_output_control();
        self.send_data(&driver_output)?;

        self.send_command(DATA_ENTRY_MODE)?;
        self.send_data(&[self.config.data_entry_mode])?;

        self.set_full_window()?;

        self.state = PanelState::Initialized(RefreshMode::Partial);
        Ok(())
    }

    /// Run the update sequence for `mode` and wait for it to finish
    fn turn_on<D: DelayNs>(&mut self, mode: RefreshMode, delay: &mut D) -> DisplayResult<I> {
        let ctrl2 = match mode {
            RefreshMode::Full => self.config.display_update_ctrl2_full,
            RefreshMode::Fast => self.config.display_update_ctrl2_fast,
            RefreshMode::Partial => self.config.display_update_ctrl2_partial,
        };
        log::debug!("{mode:?} refresh");
        self.activate(ctrl2, delay)
    }

    fn activate<D: DelayNs>(&mut self, ctrl2: u8, delay: &mut D) -> DisplayResult<I> {
        self.send_command(DISPLAY_UPDATE_CTRL2)?;
        self.send_data(&[ctrl2])?;
        self.send_command(MASTER_ACTIVATION)?;
        self.busy_wait(delay)
    }

    /// Window and cursor covering the whole panel
    fn set_full_window(&mut self) -> DisplayResult<I> {
        let Dimensions { rows, cols } = self.config.dimensions;
        self.set_window(0, 0, cols.saturating_sub(1), rows.saturating_sub(1))?;
        self.set_cursor(0, 0)
    }

    /// Set the RAM window. X is in pixels and sent in byte units, Y in rows.
    fn set_window(
        &mut self,
        x_start: u16,
        y_start: u16,
        x_end: u16,
        y_end: u16,
    ) -> DisplayResult<I> {
        self.send_command(SET_RAM_X_RANGE)?;
        self.send_data(&[
            ((x_start >> 3) & 0xFF) as u8,
            ((x_end >> 3) & 0xFF) as u8,
        ])?;

        self.send_command(SET_RAM_Y_RANGE)?;
        self.send_data(&[
            (y_start & 0xFF) as u8,
            (y_start >> 8) as u8,
            (y_end & 0xFF) as u8,
            (y_end >> 8) as u8,
        ])
    }

    /// Set the RAM address counters
    fn set_cursor(&mut self, x: u16, y: u16) -> DisplayResult<I> {
        self.send_command(SET_RAM_X_COUNTER)?;
        self.send_data(&[(x & 0xFF) as u8])?;

        self.send_command(SET_RAM_Y_COUNTER)?;
        self.send_data(&[(y & 0xFF) as u8, (y >> 8) as u8])
    }

    /// Stream a frame under `command`, row-major as packed by the caller
    fn write_ram(&mut self, command: u8, frame: &[u8]) -> DisplayResult<I> {
        self.send_command(command)?;
        self.send_data(frame)
    }

    /// Borrow exactly one frame's worth of bytes from `buffer`
    fn frame<'b>(&self, buffer: &'b [u8]) -> Result<&'b [u8], Error<I>> {
        let required = self.config.dimensions.buffer_size();
        buffer.get(..required).ok_or(Error::BufferTooSmall {
            required,
            provided: buffer.len(),
        })
    }

    fn require(
        &self,
        operation: &'static str,
        allowed: impl FnOnce(PanelState) -> bool,
    ) -> DisplayResult<I> {
        if allowed(self.state) {
            Ok(())
        } else {
            log::warn!("cannot {operation} while panel is {:?}", self.state);
            Err(Error::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.interface.busy_wait(delay).map_err(Error::Interface)
    }

    /// Send a command to the display controller
    fn send_command(&mut self, cmd: u8) -> DisplayResult<I> {
        self.interface.send_command(cmd).map_err(Error::Interface)
    }

    /// Send data to the display controller
    fn send_data(&mut self, data: &[u8]) -> DisplayResult<I> {
        self.interface.send_data(data).map_err(Error::Interface)
    }
}
