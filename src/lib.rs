//! BMP280 barometric pressure/temperature sensor support for the ESP32-S3 board.
//!
//! The [`bmp280`] module is a blocking, `no_std` driver written against the
//! `embedded-hal` 1.0 I²C and delay traits. It runs forced-mode measurement
//! cycles and compensates the raw ADC counts with the vendor's fixed-point
//! formulas, producing temperature in 0.1 °C and pressure in 0.25 Pa.
#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod bmp280;
