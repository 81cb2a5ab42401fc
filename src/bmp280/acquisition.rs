//! Forced-mode acquisition: trigger, wait for the conversion, read the results.
//!
//! ```text
//! Idle -> Triggered -> Polling { 0..20 } -> Done(RawSample)
//!   \         \              \
//!    +---------+--------------+----------> Faulted(Bmp280Error)
//! ```
//!
//! The conversion takes tens of milliseconds, so the sequencer sleeps once for
//! [`SETTLE_MS`] before looking at the status register, then polls it at most
//! [`MAX_POLLS`] times, [`POLL_INTERVAL_MS`] apart.

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::bmp280::{
    Bmp280, Bmp280Error,
    config::RegValType,
    measurement::{CompensatedReading, RawSample},
    registers::{Bmp280Register, RAW_SAMPLE_LEN, STATUS_BUSY_MASK},
};

/// Wait after triggering, before the first status poll.
pub const SETTLE_MS: u32 = 30;
/// Wait between two status polls that still report busy.
pub const POLL_INTERVAL_MS: u32 = 1;
/// Status reads allowed before the acquisition gives up with `Timeout`.
pub const MAX_POLLS: u8 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcquisitionState {
    Idle,
    /// CONFIG and CTRL_MEAS written, conversion running
    Triggered,
    /// `attempt` status reads have reported busy so far
    Polling { attempt: u8 },
    Done(RawSample),
    Faulted(Bmp280Error),
}

impl AcquisitionState {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, AcquisitionState::Done(_) | AcquisitionState::Faulted(_))
    }
}

impl<I2C, D> Bmp280<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Performs one transition. Terminal states are returned unchanged.
    pub fn step(&mut self, state: AcquisitionState) -> AcquisitionState {
        match state {
            AcquisitionState::Idle => match self.trigger() {
                Ok(()) => AcquisitionState::Triggered,
                Err(e) => AcquisitionState::Faulted(e),
            },
            AcquisitionState::Triggered => {
                self.delay.delay_ms(SETTLE_MS);
                AcquisitionState::Polling { attempt: 0 }
            }
            AcquisitionState::Polling { attempt } if attempt >= MAX_POLLS => {
                warn!("Conversion still busy after {} polls", attempt);
                AcquisitionState::Faulted(self.fail(Bmp280Error::Timeout))
            }
            AcquisitionState::Polling { attempt } => match self.is_busy() {
                Ok(true) => {
                    self.delay.delay_ms(POLL_INTERVAL_MS);
                    AcquisitionState::Polling {
                        attempt: attempt + 1,
                    }
                }
                Ok(false) => match self.read_sample() {
                    Ok(raw) => AcquisitionState::Done(raw),
                    Err(e) => AcquisitionState::Faulted(e),
                },
                Err(e) => AcquisitionState::Faulted(e),
            },
            terminal => terminal,
        }
    }

    /// Runs a complete forced measurement and returns the raw ADC counts.
    ///
    /// # Errors
    /// `Bus` as soon as any transfer fails, `Timeout` if the sensor stays busy
    /// for the whole poll budget.
    pub fn read_raw(&mut self) -> Result<RawSample, Bmp280Error> {
        let mut state = AcquisitionState::Idle;
        loop {
            state = match self.step(state) {
                AcquisitionState::Done(raw) => {
                    self.raw = raw;
                    self.last_error = None;
                    return Ok(raw);
                }
                AcquisitionState::Faulted(e) => return Err(e),
                next => next,
            };
        }
    }

    /// Acquires and compensates one reading.
    ///
    /// Fails with `NotCalibrated`, without touching the bus, if no calibration
    /// has been loaded.
    pub fn acquire(&mut self) -> Result<CompensatedReading, Bmp280Error> {
        let Some(calib) = self.calib else {
            return Err(self.fail(Bmp280Error::NotCalibrated));
        };
        let raw = self.read_raw()?;
        let reading = calib.compensate(raw);
        trace!(
            "adc_T={} adc_P={} -> T={} P={}",
            raw.temperature,
            raw.pressure,
            reading.temperature,
            reading.pressure
        );
        self.reading = reading;
        self.last_error = None;
        Ok(reading)
    }

    fn trigger(&mut self) -> Result<(), Bmp280Error> {
        let config = self.config;
        self.write_reg(config.make_reg_val(RegValType::Config))?;
        self.write_reg(config.make_reg_val(RegValType::Measurement))
    }

    fn is_busy(&mut self) -> Result<bool, Bmp280Error> {
        let mut status = [0u8];
        self.read_regs(Bmp280Register::Status, &mut status)?;
        Ok(status[0] & STATUS_BUSY_MASK != 0)
    }

    fn read_sample(&mut self) -> Result<RawSample, Bmp280Error> {
        let mut burst = [0u8; RAW_SAMPLE_LEN];
        self.read_regs(Bmp280Register::TempMsb, &mut burst)?;
        let temperature = RawSample::decode(burst);
        self.read_regs(Bmp280Register::PressMsb, &mut burst)?;
        let pressure = RawSample::decode(burst);
        Ok(RawSample {
            temperature,
            pressure,
        })
    }
}
