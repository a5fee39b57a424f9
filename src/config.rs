//! Display configuration types and builder
//!
//! Defaults describe the Waveshare 2.13" V4 panel (122 x 250). Every
//! register value the init and refresh sequences send lives here so that
//! panel variants on the same controller can be driven by overriding them.

pub use crate::error::{BuilderError, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS};

/// Panel height in pixels (gate lines)
pub const HEIGHT: u16 = 250;

/// Panel width in pixels (source lines)
pub const WIDTH: u16 = 122;

/// Display dimensions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Number of rows (height in pixels, corresponds to gate outputs)
    pub rows: u16,
    /// Number of columns (width in pixels, corresponds to source outputs)
    pub cols: u16,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            rows: HEIGHT,
            cols: WIDTH,
        }
    }
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// Columns need not be byte-aligned; each row is padded to a whole byte.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if:
    /// - rows == 0 or rows > MAX_GATE_OUTPUTS
    /// - cols == 0 or cols > MAX_SOURCE_OUTPUTS
    pub fn new(rows: u16, cols: u16) -> Result<Self, BuilderError> {
        if rows == 0 || rows > MAX_GATE_OUTPUTS {
            return Err(BuilderError::InvalidDimensions { rows, cols });
        }
        if cols == 0 || cols > MAX_SOURCE_OUTPUTS {
            return Err(BuilderError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Bytes per packed row, `ceil(cols / 8)`
    pub fn bytes_per_row(&self) -> usize {
        usize::from(self.cols).div_ceil(8)
    }

    /// Calculate required buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        self.bytes_per_row() * usize::from(self.rows)
    }
}

/// Display configuration
///
/// This struct holds the register values sent during initialization and
/// refresh. Use `Builder` to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Display dimensions
    pub dimensions: Dimensions,
    /// Gate scanning direction byte (third byte of driver output control)
    pub gate_scanning: u8,
    /// Data entry mode byte
    pub data_entry_mode: u8,
    /// Border waveform used by full and base initialization
    pub border_waveform: u8,
    /// Border waveform used when re-arming for partial refresh
    pub border_waveform_partial: u8,
    /// Display Update Control 1 bytes
    pub display_update_ctrl1: [u8; 2],
    /// Display Update Control 2 value for full refresh
    pub display_update_ctrl2_full: u8,
    /// Display Update Control 2 value for fast refresh
    pub display_update_ctrl2_fast: u8,
    /// Display Update Control 2 value for partial refresh
    pub display_update_ctrl2_partial: u8,
    /// Temperature sensor control
    pub temp_sensor_control: u8,
    /// Display Update Control 2 values that load the temperature during fast init
    pub fast_temp_load: [u8; 2],
    /// Temperature register value written between the two fast-init loads
    pub fast_temp_value: [u8; 2],
    /// Deep sleep mode byte
    pub deep_sleep_mode: u8,
    /// Settle time after entering deep sleep, in milliseconds
    pub sleep_settle_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dimensions: Dimensions::default(),
            gate_scanning: 0x00,
            // X increment, then Y increment
            data_entry_mode: 0x03,
            border_waveform: 0x05,
            border_waveform_partial: 0x80,
            display_update_ctrl1: [0x00, 0x80],
            display_update_ctrl2_full: 0xF7,
            display_update_ctrl2_fast: 0xC7,
            display_update_ctrl2_partial: 0xFF,
            // Internal temperature sensor
            temp_sensor_control: 0x80,
            fast_temp_load: [0xB1, 0x91],
            fast_temp_value: [0x64, 0x00],
            deep_sleep_mode: 0x01,
            sleep_settle_ms: 100,
        }
    }
}

impl Config {
    /// Driver output control payload: `[rows-1 LSB, rows-1 MSB, gate scanning]`
    pub fn driver_output_control(&self) -> [u8; 3] {
        let last_row = self.dimensions.rows.saturating_sub(1);
        [
            (last_row & 0xFF) as u8,
            (last_row >> 8) as u8,
            self.gate_scanning,
        ]
    }
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```rust,no_run
/// use epd2in13v4::{Builder, Dimensions};
///
/// let dims = match Dimensions::new(250, 122) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let config = Builder::new().dimensions(dims).border_waveform(0x05).build();
/// let _ = config;
/// ```
#[must_use]
#[derive(Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    /// Create a new Builder with the 2.13" V4 defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set display dimensions
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.config.dimensions = dims;
        self
    }

    /// Set gate scanning direction
    pub fn gate_scanning(mut self, value: u8) -> Self {
        self.config.gate_scanning = value;
        self
    }

    /// Set data entry mode
    pub fn data_entry_mode(mut self, value: u8) -> Self {
        self.config.data_entry_mode = value;
        self
    }

    /// Set border waveform for full initialization
    pub fn border_waveform(mut self, value: u8) -> Self {
        self.config.border_waveform = value;
        self
    }

    /// Set border waveform for partial refresh
    pub fn border_waveform_partial(mut self, value: u8) -> Self {
        self.config.border_waveform_partial = value;
        self
    }

    /// Set Display Update Control 1 bytes
    pub fn display_update_ctrl1(mut self, value: [u8; 2]) -> Self {
        self.config.display_update_ctrl1 = value;
        self
    }

    /// Set Display Update Control 2 value for full refresh
    pub fn display_update_ctrl2_full(mut self, value: u8) -> Self {
        self.config.display_update_ctrl2_full = value;
        self
    }

    /// Set Display Update Control 2 value for fast refresh
    pub fn display_update_ctrl2_fast(mut self, value: u8) -> Self {
        self.config.display_update_ctrl2_fast = value;
        self
    }

    /// Set Display Update Control 2 value for partial refresh
    pub fn display_update_ctrl2_partial(mut self, value: u8) -> Self {
        self.config.display_update_ctrl2_partial = value;
        self
    }

    /// Set temperature sensor control
    pub fn temp_sensor_control(mut self, value: u8) -> Self {
        self.config.temp_sensor_control = value;
        self
    }

    /// Set the two temperature load activations used by fast init
    pub fn fast_temp_load(mut self, value: [u8; 2]) -> Self {
        self.config.fast_temp_load = value;
        self
    }

    /// Set the temperature register value written during fast init
    pub fn fast_temp_value(mut self, value: [u8; 2]) -> Self {
        self.config.fast_temp_value = value;
        self
    }

    /// Set deep sleep mode byte
    pub fn deep_sleep_mode(mut self, value: u8) -> Self {
        self.config.deep_sleep_mode = value;
        self
    }

    /// Set settle time after entering deep sleep
    pub fn sleep_settle_ms(mut self, value: u32) -> Self {
        self.config.sleep_settle_ms = value;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dimensions_match_panel() {
        let dims = Dimensions::default();
        assert_eq!(dims.rows, 250);
        assert_eq!(dims.cols, 122);
    }

    #[test]
    fn test_bytes_per_row_rounds_up() {
        assert_eq!(Dimensions::new(250, 122).unwrap().bytes_per_row(), 16);
        assert_eq!(Dimensions::new(1, 8).unwrap().bytes_per_row(), 1);
        assert_eq!(Dimensions::new(1, 9).unwrap().bytes_per_row(), 2);
        assert_eq!(Dimensions::new(1, 1).unwrap().bytes_per_row(), 1);
    }

    #[test]
    fn test_buffer_size() {
        assert_eq!(Dimensions::default().buffer_size(), 16 * 250);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            Dimensions::new(0, 122),
            Err(BuilderError::InvalidDimensions { rows: 0, cols: 122 })
        ));
        assert!(Dimensions::new(297, 122).is_err());
        assert!(Dimensions::new(250, 0).is_err());
        assert!(Dimensions::new(250, 177).is_err());
        assert!(Dimensions::new(MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS).is_ok());
    }

    #[test]
    fn test_driver_output_control_for_250_rows() {
        let config = Config::default();
        assert_eq!(config.driver_output_control(), [0xF9, 0x00, 0x00]);
    }

    #[test]
    fn test_driver_output_control_high_byte() {
        let config = Builder::new()
            .dimensions(Dimensions::new(296, 128).unwrap())
            .gate_scanning(0x02)
            .build();
        assert_eq!(config.driver_output_control(), [0x27, 0x01, 0x02]);
    }

    #[test]
    fn test_driver_output_control_zero_rows_does_not_underflow() {
        let mut config = Config::default();
        config.dimensions = Dimensions { rows: 0, cols: 122 };
        assert_eq!(config.driver_output_control(), [0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_builder_overrides() {
        let config = Builder::new()
            .display_update_ctrl2_fast(0x0C)
            .sleep_settle_ms(5)
            .build();
        assert_eq!(config.display_update_ctrl2_fast, 0x0C);
        assert_eq!(config.sleep_settle_ms, 5);
        assert_eq!(config.display_update_ctrl2_full, 0xF7);
        assert_eq!(config.display_update_ctrl2_partial, 0xFF);
    }
}
