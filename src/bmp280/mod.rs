pub mod acquisition;
pub mod calibration;
pub mod config;
pub mod measurement;
pub mod registers;

#[cfg(test)]
pub(crate) mod testutil;

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::bmp280::{
    calibration::{Bmp280Calib, CalibrationSource, DeviceCalibration},
    config::{Bmp280Config, RegValType},
    measurement::{CompensatedReading, RawSample},
    registers::{BMP280_ADDR_SDO_GND, BMP280_ADDR_SDO_VDD, BMP280_CHIP_ID, Bmp280Register},
};

/// Time the sensor needs after a soft reset before it answers again.
pub const RESET_DELAY_MS: u32 = 10;

/// Errors reported by the BMP280 driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bmp280Error {
    /// I²C transfer failed while accessing `register`
    Bus { register: u8 },
    /// Conversion still flagged busy after the whole poll budget;
    /// the acquisition may be retried
    Timeout,
    /// Chip ID register did not read 0x58
    IdentityMismatch { found: u8 },
    /// No calibration coefficients loaded yet
    NotCalibrated,
}

/// BMP280 driver instance (blocking I²C, forced mode).
///
/// Owns the I²C bus handle and delay provider, plus the state of the last
/// acquisition. Callers sharing a bus must serialize access themselves.
pub struct Bmp280<I2C, D> {
    i2c: I2C,
    delay: D,
    /// BMP280 I²C slave address (0x76 or 0x77)
    haddr: u8,
    config: Bmp280Config,
    calib: Option<Bmp280Calib>,
    raw: RawSample,
    reading: CompensatedReading,
    last_error: Option<Bmp280Error>,
}

impl<I2C, D> Bmp280<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Creates a new BMP280 driver instance.
    ///
    /// # Arguments
    /// * `i2c` - blocking I²C bus
    /// * `delay` - delay provider used for reset and conversion waits
    /// * `sdo_gnd` - `true` if SDO pin is connected to GND (address 0x76), `false` otherwise (0x77)
    pub fn new(i2c: I2C, delay: D, sdo_gnd: bool) -> Self {
        Self {
            i2c,
            delay,
            haddr: if sdo_gnd {
                BMP280_ADDR_SDO_GND
            } else {
                BMP280_ADDR_SDO_VDD
            },
            config: Bmp280Config::default(),
            calib: None,
            raw: RawSample::default(),
            reading: CompensatedReading::default(),
            last_error: None,
        }
    }

    /// Gives back the bus and the delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    pub fn address(&self) -> u8 {
        self.haddr
    }

    /// Measurement settings used by subsequent triggers.
    pub fn with_config(&mut self, config: Bmp280Config) {
        self.config = config;
    }

    pub fn config(&self) -> Bmp280Config {
        self.config
    }

    pub fn calibration(&self) -> Option<Bmp280Calib> {
        self.calib
    }

    /// Raw counts of the last successful acquisition.
    pub fn last_raw(&self) -> RawSample {
        self.raw
    }

    /// Result of the last successful acquisition.
    pub fn last_reading(&self) -> CompensatedReading {
        self.reading
    }

    /// Error of the last failed operation, cleared by the next one that succeeds.
    pub fn last_error(&self) -> Option<Bmp280Error> {
        self.last_error
    }

    /// Initializes the BMP280 sensor.
    ///
    /// Sequence:
    /// 1. Soft reset (0xE0 ← 0xB6)
    /// 2. Wait 10 ms
    /// 3. Verify chip ID (0xD0 == 0x58)
    /// 4. Read calibration coefficients from the device
    ///
    /// # Errors
    /// `Bus` on any I²C failure, `IdentityMismatch` if another chip answers.
    pub fn init(&mut self) -> Result<(), Bmp280Error> {
        self.soft_reset()?;
        self.verify_id()?;
        self.load_calibration(&DeviceCalibration)
    }

    /// Writes the reset command and waits for the power-on-reset procedure.
    pub fn soft_reset(&mut self) -> Result<(), Bmp280Error> {
        let reset_cmd = self.config.make_reg_val(RegValType::Reset);
        self.write_reg(reset_cmd)?;
        self.delay.delay_ms(RESET_DELAY_MS);
        self.last_error = None;
        Ok(())
    }

    pub fn chip_id(&mut self) -> Result<u8, Bmp280Error> {
        let mut chip_id = [0u8];
        self.read_regs(Bmp280Register::Id, &mut chip_id)?;
        Ok(chip_id[0])
    }

    /// `true` if a BMP280 answers at the configured address.
    ///
    /// A bus failure or a foreign chip ID yields `false`; the cause is kept in
    /// [`Self::last_error`].
    pub fn check_id(&mut self) -> bool {
        self.verify_id().is_ok()
    }

    fn verify_id(&mut self) -> Result<(), Bmp280Error> {
        let found = self.chip_id()?;
        if found != BMP280_CHIP_ID {
            warn!("Chip ID mismatch: {:#x}", found);
            return Err(self.fail(Bmp280Error::IdentityMismatch { found }));
        }
        self.last_error = None;
        Ok(())
    }

    /// Replaces the coefficients with the ones provided by `source`.
    pub fn load_calibration<S: CalibrationSource>(&mut self, source: &S) -> Result<(), Bmp280Error> {
        match source.load(&mut self.i2c, self.haddr) {
            Ok(calib) => {
                self.calib = Some(calib);
                self.last_error = None;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn write_reg(&mut self, reg_val: [u8; 2]) -> Result<(), Bmp280Error> {
        if self.i2c.write(self.haddr, &reg_val).is_err() {
            warn!("Write to register {:#x} failed", reg_val[0]);
            return Err(self.fail(Bmp280Error::Bus {
                register: reg_val[0],
            }));
        }
        Ok(())
    }

    fn read_regs(&mut self, start: Bmp280Register, buffer: &mut [u8]) -> Result<(), Bmp280Error> {
        if self
            .i2c
            .write_read(self.haddr, &[start.addr()], buffer)
            .is_err()
        {
            warn!("Read from register {:#x} failed", start.addr());
            return Err(self.fail(Bmp280Error::Bus {
                register: start.addr(),
            }));
        }
        Ok(())
    }

    fn fail(&mut self, error: Bmp280Error) -> Bmp280Error {
        self.last_error = Some(error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmp280::calibration::FactoryCalibration;
    use crate::bmp280::testutil::{RecordingDelay, calib_burst};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x77;

    #[test]
    fn address_follows_sdo_strap() {
        let dev = Bmp280::new(I2cMock::new(&[]), RecordingDelay::default(), true);
        assert_eq!(dev.address(), 0x76);
        let (mut i2c, _) = dev.release();
        i2c.done();

        let dev = Bmp280::new(I2cMock::new(&[]), RecordingDelay::default(), false);
        assert_eq!(dev.address(), 0x77);
        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn init_resets_checks_id_and_loads_calibration() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0xE0, 0xB6]),
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x58]),
            I2cTransaction::write_read(
                ADDR,
                vec![0x88],
                calib_burst(&Bmp280Calib::FACTORY_DEFAULT),
            ),
        ]);
        let mut dev = Bmp280::new(i2c, RecordingDelay::default(), false);

        dev.init().unwrap();
        assert_eq!(dev.calibration(), Some(Bmp280Calib::FACTORY_DEFAULT));
        assert_eq!(dev.last_error(), None);

        let (mut i2c, delay) = dev.release();
        assert_eq!(delay.ms, vec![RESET_DELAY_MS]);
        i2c.done();
    }

    #[test]
    fn init_rejects_foreign_chip() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0xE0, 0xB6]),
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x60]),
        ]);
        let mut dev = Bmp280::new(i2c, RecordingDelay::default(), false);

        assert_eq!(
            dev.init(),
            Err(Bmp280Error::IdentityMismatch { found: 0x60 })
        );
        assert_eq!(
            dev.last_error(),
            Some(Bmp280Error::IdentityMismatch { found: 0x60 })
        );
        assert_eq!(dev.calibration(), None);

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn init_stops_on_failed_reset() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0xE0, 0xB6]).with_error(ErrorKind::Other)
        ]);
        let mut dev = Bmp280::new(i2c, RecordingDelay::default(), false);

        assert_eq!(dev.init(), Err(Bmp280Error::Bus { register: 0xE0 }));

        let (mut i2c, delay) = dev.release();
        assert!(delay.ms.is_empty());
        i2c.done();
    }

    #[test]
    fn check_id_reports_presence() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x58]),
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x55]),
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x00]).with_error(ErrorKind::Other),
        ]);
        let mut dev = Bmp280::new(i2c, RecordingDelay::default(), false);

        assert!(dev.check_id());
        assert!(!dev.check_id());
        assert_eq!(
            dev.last_error(),
            Some(Bmp280Error::IdentityMismatch { found: 0x55 })
        );
        assert!(!dev.check_id());
        assert_eq!(dev.last_error(), Some(Bmp280Error::Bus { register: 0xD0 }));

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn check_id_success_clears_previous_error() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x00]).with_error(ErrorKind::Other),
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x58]),
        ]);
        let mut dev = Bmp280::new(i2c, RecordingDelay::default(), false);

        assert!(!dev.check_id());
        assert_eq!(dev.last_error(), Some(Bmp280Error::Bus { register: 0xD0 }));
        assert!(dev.check_id());
        assert_eq!(dev.last_error(), None);

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn init_retry_clears_previous_error() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0xE0, 0xB6]),
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x60]),
            I2cTransaction::write(ADDR, vec![0xE0, 0xB6]),
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x58]),
            I2cTransaction::write_read(
                ADDR,
                vec![0x88],
                calib_burst(&Bmp280Calib::FACTORY_DEFAULT),
            ),
        ]);
        let mut dev = Bmp280::new(i2c, RecordingDelay::default(), false);

        assert!(dev.init().is_err());
        assert!(dev.last_error().is_some());
        dev.init().unwrap();
        assert_eq!(dev.last_error(), None);

        let (mut i2c, delay) = dev.release();
        assert_eq!(delay.ms, vec![RESET_DELAY_MS, RESET_DELAY_MS]);
        i2c.done();
    }

    #[test]
    fn soft_reset_and_calibration_clear_previous_error() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0xE0, 0xB6]).with_error(ErrorKind::Other),
            I2cTransaction::write(ADDR, vec![0xE0, 0xB6]),
            I2cTransaction::write_read(ADDR, vec![0x88], vec![0; 26]).with_error(ErrorKind::Other),
        ]);
        let mut dev = Bmp280::new(i2c, RecordingDelay::default(), false);

        assert!(dev.soft_reset().is_err());
        dev.soft_reset().unwrap();
        assert_eq!(dev.last_error(), None);

        assert!(dev.load_calibration(&DeviceCalibration).is_err());
        dev.load_calibration(&FactoryCalibration).unwrap();
        assert_eq!(dev.last_error(), None);

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn factory_calibration_needs_no_bus() {
        let mut dev = Bmp280::new(I2cMock::new(&[]), RecordingDelay::default(), false);
        dev.load_calibration(&FactoryCalibration).unwrap();
        assert_eq!(dev.calibration(), Some(Bmp280Calib::FACTORY_DEFAULT));

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn failed_calibration_read_keeps_previous_set() {
        let i2c = I2cMock::new(&[I2cTransaction::write_read(
            ADDR,
            vec![0x88],
            vec![0; 26],
        )
        .with_error(ErrorKind::Other)]);
        let mut dev = Bmp280::new(i2c, RecordingDelay::default(), false);
        dev.load_calibration(&FactoryCalibration).unwrap();

        assert_eq!(
            dev.load_calibration(&DeviceCalibration),
            Err(Bmp280Error::Bus { register: 0x88 })
        );
        assert_eq!(dev.calibration(), Some(Bmp280Calib::FACTORY_DEFAULT));
        assert_eq!(dev.last_error(), Some(Bmp280Error::Bus { register: 0x88 }));

        let (mut i2c, _) = dev.release();
        i2c.done();
    }
}
