//! Test doubles shared by the driver tests.

use embedded_hal::delay::DelayNs;

use crate::bmp280::calibration::Bmp280Calib;

/// Delay provider that records every requested wait in milliseconds.
#[derive(Default)]
pub struct RecordingDelay {
    pub ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.ms.push(ms);
    }
}

/// Calibration set serialized the way the sensor stores it at 0x88.
pub fn calib_burst(calib: &Bmp280Calib) -> Vec<u8> {
    let words = [
        calib.dig_t1,
        calib.dig_t2 as u16,
        calib.dig_t3 as u16,
        calib.dig_p1,
        calib.dig_p2 as u16,
        calib.dig_p3 as u16,
        calib.dig_p4 as u16,
        calib.dig_p5 as u16,
        calib.dig_p6 as u16,
        calib.dig_p7 as u16,
        calib.dig_p8 as u16,
        calib.dig_p9 as u16,
        calib.reserved,
    ];
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}
