use crate::bmp280::registers::{BMP280_RESET_REG_VALUE, Bmp280Register};

/// Oversampling setting for pressure (osrs_p[2:0] in ctrl_meas 0xF4, bits 4:2).
///
/// | Variant     | osrs_p | Bits | Resolution | RMS Noise (typ) | Conversion time (typ) |
/// |-------------|--------|------|------------|-----------------|-----------------------|
/// | Px1UL       | 001    | 0x04 | 16 bit     | ~3.3 Pa         | ~5–6 ms               |
/// | Px2L        | 010    | 0x08 | 17 bit     | ~2.6 Pa         | ~10 ms                |
/// | Px4STD      | 011    | 0x0C | 18 bit     | ~2.1 Pa         | ~18 ms                |
/// | Px8H        | 100    | 0x10 | 19 bit     | ~1.6 Pa         | ~34 ms                |
/// | Px16UH      | 101    | 0x14 | 20 bit     | ~1.3 Pa         | ~66 ms                |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PressOversampling {
    Px1UL = 0x04,
    Px2L = 0x08,
    Px4STD = 0x0C,
    Px8H = 0x10,
    Px16UH = 0x14,
}

/// Oversampling setting for temperature (osrs_t[2:0] in ctrl_meas 0xF4, bits 7:5).
///
/// | Variant     | osrs_t | Bits  | Resolution | RMS Noise (typ) |
/// |-------------|--------|-------|------------|-----------------|
/// | Tx1UL       | 001    | 0x20  | 16 bit     | ~0.0050 °C      |
/// | Tx2L        | 010    | 0x40  | 17 bit     | ~0.0025 °C      |
/// | Tx4STD      | 011    | 0x60  | 18 bit     | ~0.0012 °C      |
/// | Tx8H        | 100    | 0x80  | 19 bit     | ~0.0006 °C      |
/// | Tx16UH      | 101    | 0xA0  | 20 bit     | ~0.0003 °C      |
///
/// Temperature is always converted before pressure within one measurement cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TempOversampling {
    Tx1UL = 0x20,
    Tx2L = 0x40,
    Tx4STD = 0x60,
    Tx8H = 0x80,
    Tx16UH = 0xA0,
}

/// IIR filter coefficient (filter[2:0] in config 0xF5, bits 4:2).
///
/// The filter state persists across forced cycles, so anything other than
/// `IIROff` makes a reading depend on the previous ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IIRFilter {
    IIROff = 0x0,
    IIRx2 = 0x04,
    IIRx4 = 0x08,
    IIRx8 = 0x0C,
    IIRx16 = 0x10,
}

/// mode[1:0] = 01: run one measurement cycle, then return to sleep.
pub const FORCED_MODE: u8 = 0x01;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegValType {
    Config,
    Measurement,
    Reset,
}

/// Forced-mode measurement settings written on every trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bmp280Config {
    pub tovrs: TempOversampling,
    pub povrs: PressOversampling,
    pub iir: IIRFilter,
}

impl Bmp280Config {
    pub const fn new(tovrs: TempOversampling, povrs: PressOversampling, iir: IIRFilter) -> Self {
        Self { tovrs, povrs, iir }
    }

    /// Temperature ×2, pressure ×16, no IIR filtering, 3-wire SPI disabled.
    ///
    /// Renders CONFIG = `0x00` and CTRL_MEAS = `0x55`.
    pub const fn forced() -> Self {
        Self {
            tovrs: TempOversampling::Tx2L,
            povrs: PressOversampling::Px16UH,
            iir: IIRFilter::IIROff,
        }
    }

    pub fn with_povrs(mut self, povrs: PressOversampling) -> Self {
        self.povrs = povrs;
        self
    }

    pub fn with_tovrs(mut self, tovrs: TempOversampling) -> Self {
        self.tovrs = tovrs;
        self
    }

    pub fn with_filter(mut self, iir: IIRFilter) -> Self {
        self.iir = iir;
        self
    }

    /// Generates a register address + value pair ready for an I²C write.
    ///
    /// - `RegValType::Config`      → `0xF5` (filter; standby and 3-wire SPI bits cleared)
    /// - `RegValType::Measurement` → `0xF4` (osrs_t + osrs_p + forced mode)
    /// - `RegValType::Reset`       → `0xE0` ← `0xB6`
    pub const fn make_reg_val(&self, reg_val_type: RegValType) -> [u8; 2] {
        match reg_val_type {
            RegValType::Config => [Bmp280Register::Config as u8, self.iir as u8],
            RegValType::Measurement => [
                Bmp280Register::CtrlMeas as u8,
                self.tovrs as u8 | self.povrs as u8 | FORCED_MODE,
            ],
            RegValType::Reset => [Bmp280Register::Reset as u8, BMP280_RESET_REG_VALUE],
        }
    }
}

impl Default for Bmp280Config {
    fn default() -> Self {
        Self::forced()
    }
}
