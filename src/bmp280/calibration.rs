//! BMP280 calibration coefficients and compensation functions.
//!
//! This module handles loading the factory-trimmed compensation coefficients
//! (registers 0x88–0xA1) and applying them, as described in the Bosch BMP280 datasheet
//! (BST-BMP280-DS001 rev 1.26, section 3.11 "Compensation formula" and Appendix 8.2).
//!
//! Coefficients come from a [`CalibrationSource`]: [`DeviceCalibration`] reads them
//! from the sensor, [`FactoryCalibration`] supplies the datasheet example set for
//! hosts without a bus.

use embedded_hal::i2c::I2c;

use crate::bmp280::{
    Bmp280Error,
    measurement::{CompensatedReading, FineTemperature, RawSample},
    registers::{Bmp280Register, CALIB_LEN},
};

/// Factory-trimmed calibration coefficients (dig_T* and dig_P*) for temperature
/// and pressure compensation.
///
/// Loaded from registers 0x88–0xA1 (26 bytes, little-endian), immutable afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bmp280Calib {
    /// Temperature coefficient 1 (unsigned, typical ~27000–28000)
    pub dig_t1: u16,
    /// Temperature coefficient 2 (signed)
    pub dig_t2: i16,
    /// Temperature coefficient 3 (signed)
    pub dig_t3: i16,
    /// Pressure coefficient 1 (unsigned, typical ~30000–37000)
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
    /// Reserved word at 0xA0–0xA1, unused by the formulas
    pub reserved: u16,
}

impl Bmp280Calib {
    /// Datasheet example coefficients, used when no sensor is attached.
    pub const FACTORY_DEFAULT: Self = Self {
        dig_t1: 27504,
        dig_t2: 26435,
        dig_t3: -1000,
        dig_p1: 36477,
        dig_p2: -10685,
        dig_p3: 3024,
        dig_p4: 2855,
        dig_p5: 140,
        dig_p6: -7,
        dig_p7: 15500,
        dig_p8: -14600,
        dig_p9: 6000,
        reserved: 0,
    };

    /// Interprets the calibration burst as little-endian words in register order.
    pub fn from_bytes(buffer: &[u8; CALIB_LEN]) -> Self {
        let u = |i: usize| u16::from_le_bytes([buffer[i], buffer[i + 1]]);
        let s = |i: usize| i16::from_le_bytes([buffer[i], buffer[i + 1]]);
        Self {
            dig_t1: u(0),
            dig_t2: s(2),
            dig_t3: s(4),
            dig_p1: u(6),
            dig_p2: s(8),
            dig_p3: s(10),
            dig_p4: s(12),
            dig_p5: s(14),
            dig_p6: s(16),
            dig_p7: s(18),
            dig_p8: s(20),
            dig_p9: s(22),
            reserved: u(24),
        }
    }

    /// Compensates a raw 20-bit temperature ADC value (adc_T).
    ///
    /// Returns the temperature in 0.1 °C (e.g. 251 = 25.1 °C) together with
    /// `t_fine`, which [`Self::compensate_pressure`] requires.
    ///
    /// Arithmetic wraps like the reference 32-bit formula; inputs outside the
    /// calibrated range give implausible values, never a panic.
    pub fn compensate_temperature(&self, adc_t: i32) -> (i16, FineTemperature) {
        let t1 = self.dig_t1 as i32;
        let var1 = (adc_t >> 3)
            .wrapping_sub(t1 << 1)
            .wrapping_mul(self.dig_t2 as i32)
            >> 11;
        let delta = (adc_t >> 4).wrapping_sub(t1);
        let var2 = ((delta.wrapping_mul(delta) >> 12).wrapping_mul(self.dig_t3 as i32)) >> 14;

        let t_fine = var1.wrapping_add(var2);
        let temperature = (t_fine.wrapping_add(256) >> 9) as i16;
        (temperature, FineTemperature::new(t_fine))
    }

    /// Compensates a raw 20-bit pressure ADC value (adc_P) with the 64-bit formula.
    ///
    /// Returns pressure in 0.25 Pa (e.g. 402613 = 100653.25 Pa), or 0 when the
    /// coefficients make the divisor vanish.
    pub fn compensate_pressure(&self, adc_p: i32, t_fine: FineTemperature) -> u32 {
        let mut var1 = t_fine.value() as i64 - 128000;
        let mut var2 = var1.wrapping_mul(var1).wrapping_mul(self.dig_p6 as i64);
        var2 = var2.wrapping_add(var1.wrapping_mul(self.dig_p5 as i64) << 17);
        var2 = var2.wrapping_add((self.dig_p4 as i64) << 35);
        var1 = (var1.wrapping_mul(var1).wrapping_mul(self.dig_p3 as i64) >> 8)
            .wrapping_add(var1.wrapping_mul(self.dig_p2 as i64) << 12);
        var1 = (1i64 << 47).wrapping_add(var1).wrapping_mul(self.dig_p1 as i64) >> 33;

        if var1 == 0 {
            return 0; // avoid division by zero
        }

        let mut p = 1_048_576 - adc_p as i64;
        p = (p << 31)
            .wrapping_sub(var2)
            .wrapping_mul(3125)
            .wrapping_div(var1);
        var1 = (self.dig_p9 as i64)
            .wrapping_mul(p >> 13)
            .wrapping_mul(p >> 13)
            >> 25;
        var2 = (self.dig_p8 as i64).wrapping_mul(p) >> 19;
        p = (p.wrapping_add(var1).wrapping_add(var2) >> 8).wrapping_add((self.dig_p7 as i64) << 4);

        // Q24.8 Pa -> 0.25 Pa, rounded
        (p.wrapping_add(32) >> 6) as u32
    }

    /// Temperature first, then pressure with the resulting `t_fine`.
    pub fn compensate(&self, raw: RawSample) -> CompensatedReading {
        let (temperature, fine_temperature) = self.compensate_temperature(raw.temperature);
        let pressure = self.compensate_pressure(raw.pressure, fine_temperature);
        CompensatedReading {
            temperature,
            pressure,
            fine_temperature,
        }
    }
}

/// Where a driver instance gets its coefficients from.
pub trait CalibrationSource {
    fn load<I2C: I2c>(&self, i2c: &mut I2C, haddr: u8) -> Result<Bmp280Calib, Bmp280Error>;
}

/// Reads the 26-byte calibration block from the sensor. No retries.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeviceCalibration;

impl CalibrationSource for DeviceCalibration {
    fn load<I2C: I2c>(&self, i2c: &mut I2C, haddr: u8) -> Result<Bmp280Calib, Bmp280Error> {
        let mut buffer = [0u8; CALIB_LEN];
        i2c.write_read(haddr, &[Bmp280Register::CalibStart.addr()], &mut buffer)
            .map_err(|_| {
                warn!("Failed to read calibration data");
                Bmp280Error::Bus {
                    register: Bmp280Register::CalibStart.addr(),
                }
            })?;
        Ok(Bmp280Calib::from_bytes(&buffer))
    }
}

/// Returns [`Bmp280Calib::FACTORY_DEFAULT`] without touching the bus.
#[derive(Clone, Copy, Debug, Default)]
pub struct FactoryCalibration;

impl CalibrationSource for FactoryCalibration {
    fn load<I2C: I2c>(&self, _i2c: &mut I2C, _haddr: u8) -> Result<Bmp280Calib, Bmp280Error> {
        debug!("Using factory default calibration");
        Ok(Bmp280Calib::FACTORY_DEFAULT)
    }
}
