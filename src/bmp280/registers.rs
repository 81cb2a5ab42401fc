/// BMP280 register map (Bosch Sensortec BMP280 datasheet, revision 1.26).
///
/// Only the registers used by the forced-mode acquisition are listed.
///
/// Key groups:
/// - **Measurement results** - 0xF7–0xFC (6 bytes): pressure (20-bit) + temperature (20-bit),
///   each stored big-endian as MSB, LSB, XLSB with the low nibble of XLSB unused
/// - **Control registers** - 0xF4 (oversampling + power mode), 0xF5 (IIR filter + 3-wire SPI)
/// - **Status** - 0xF3 (measuring / updating bits)
/// - **Reset & ID** - 0xE0 (soft reset), 0xD0 (chip ID)
/// - **Calibration** - 0x88–0xA1 (26 bytes, read-only, factory trimmed)
///
/// Usage example:
/// ```rust
/// use esp32s3_baro::bmp280::registers::Bmp280Register;
/// let reg_addr = Bmp280Register::CtrlMeas as u8;
/// assert_eq!(reg_addr, 0xF4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Bmp280Register {
    TempXlsb = 0xFC,
    TempLsb = 0xFB,
    TempMsb = 0xFA,
    PressXlsb = 0xF9,
    PressLsb = 0xF8,
    PressMsb = 0xF7,
    Config = 0xF5,
    CtrlMeas = 0xF4,
    // bit 3 - conversion running, bit 0 - NVM data being copied
    Status = 0xF3,
    // If 0xB6 is written to the register,
    // the device is reset using the complete power-on-reset procedure
    Reset = 0xE0,
    // Chip identification number
    // Must be 0x58 after start up
    Id = 0xD0,
    // Calibration values start address
    CalibStart = 0x88,
}

impl Bmp280Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

pub const BMP280_RESET_REG_VALUE: u8 = 0xB6;
pub const BMP280_CHIP_ID: u8 = 0x58;

/// I²C address with the SDO pin tied to GND.
pub const BMP280_ADDR_SDO_GND: u8 = 0x76;
/// I²C address with the SDO pin tied to VDDIO.
pub const BMP280_ADDR_SDO_VDD: u8 = 0x77;

/// Status bits that are set while a conversion is running (bit 3) or while
/// the NVM contents are being copied into the image registers (bit 0).
pub const STATUS_BUSY_MASK: u8 = 0b0000_1001;

/// Eleven little-endian calibration words followed by one reserved word.
pub const CALIB_LEN: usize = 26;

/// Length of a single raw result burst (MSB, LSB, XLSB).
pub const RAW_SAMPLE_LEN: usize = 3;
