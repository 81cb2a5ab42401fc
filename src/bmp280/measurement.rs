//! Raw and compensated readings exchanged between acquisition and compensation.

use crate::bmp280::registers::RAW_SAMPLE_LEN;

/// Uncompensated 20-bit ADC counts from one forced measurement cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub temperature: i32,
    pub pressure: i32,
}

impl RawSample {
    /// Reassembles a MSB/LSB/XLSB burst and drops the unused low nibble.
    ///
    /// The result is an unsigned 20-bit magnitude, always in `0..=0xFFFFF`.
    ///
    /// ```rust
    /// use esp32s3_baro::bmp280::measurement::RawSample;
    /// assert_eq!(RawSample::decode([0x12, 0x34, 0x56]), 0x12345);
    /// ```
    pub const fn decode(bytes: [u8; RAW_SAMPLE_LEN]) -> i32 {
        i32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 4
    }
}

/// Intermediate `t_fine` of the temperature formula, consumed by the pressure formula.
///
/// Only the temperature compensation hands these out, so a pressure value can
/// never be computed without a temperature from the same cycle.
///
/// ```rust
/// use esp32s3_baro::bmp280::calibration::Bmp280Calib;
/// let calib = Bmp280Calib::FACTORY_DEFAULT;
/// let (_, t_fine) = calib.compensate_temperature(519888);
/// assert_eq!(calib.compensate_pressure(415148, t_fine), 402613);
/// ```
///
/// ```compile_fail
/// use esp32s3_baro::bmp280::{calibration::Bmp280Calib, measurement::FineTemperature};
/// Bmp280Calib::FACTORY_DEFAULT.compensate_pressure(415148, FineTemperature::default());
/// ```
///
/// ```compile_fail
/// use esp32s3_baro::bmp280::{calibration::Bmp280Calib, measurement::FineTemperature};
/// Bmp280Calib::FACTORY_DEFAULT.compensate_pressure(415148, FineTemperature(128422));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FineTemperature(i32);

impl FineTemperature {
    pub(crate) const fn new(t_fine: i32) -> Self {
        Self(t_fine)
    }

    pub const fn value(self) -> i32 {
        self.0
    }
}

/// Calibrated reading.
///
/// **Units:** temperature in 0.1 °C (`251` = 25.1 °C), pressure in 0.25 Pa
/// (`402613` = 100653.25 Pa).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompensatedReading {
    pub temperature: i16,
    pub pressure: u32,
    pub fine_temperature: FineTemperature,
}

impl Default for CompensatedReading {
    fn default() -> Self {
        Self {
            temperature: 0,
            pressure: 0,
            fine_temperature: FineTemperature::new(0),
        }
    }
}

impl CompensatedReading {
    /// Splits the temperature into whole degrees and tenths, e.g. `(25, 1)`.
    ///
    /// Both parts carry the sign of the reading: -3.5 °C is `(-3, -5)` and
    /// -0.5 °C is `(0, -5)`, so check the sign of the fraction (or of
    /// `temperature`) before printing `whole.fraction`.
    pub fn temperature_split(&self) -> (i16, i16) {
        (self.temperature / 10, self.temperature % 10)
    }

    /// Splits the pressure into whole pascals and hundredths, e.g. `(100653, 25)`.
    pub fn pressure_split(&self) -> (u32, u32) {
        (self.pressure / 4, (self.pressure % 4) * 25)
    }
}
