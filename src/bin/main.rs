#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_time::Timer;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::gpio::AnyPin;
use esp_hal::i2c::master::{AnyI2c, Config, I2c};
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use esp32s3_baro::bmp280::{Bmp280, Bmp280Error};

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

esp_bootloader_esp_idf::esp_app_desc!();

/// Seconds between two forced measurements.
const READ_INTERVAL_SECS: u64 = 3;

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized!");

    spawner
        .spawn(read_temp_press(
            peripherals.GPIO21.into(),
            peripherals.GPIO20.into(),
            peripherals.I2C0.into(),
            true,
        ))
        .ok();

    loop {
        Timer::after_secs(1).await;
    }
}

#[embassy_executor::task]
async fn read_temp_press(
    sda_pin: AnyPin<'static>,
    scl_pin: AnyPin<'static>,
    i2c: AnyI2c<'static>,
    sdo_gnd: bool,
) {
    info!("'read_temp_press' has been started");
    let cfg = Config::default().with_frequency(Rate::from_khz(100));
    let bus = match I2c::new(i2c, cfg) {
        Ok(bus) => bus.with_sda(sda_pin).with_scl(scl_pin),
        Err(_) => {
            warn!("I2C configuration rejected");
            return;
        }
    };
    let mut device = Bmp280::new(bus, Delay::new(), sdo_gnd);

    // Initialization
    while let Err(e) = device.init() {
        warn!("BMP280 initialization failed: {:?}", e);
        Timer::after_secs(READ_INTERVAL_SECS).await;
    }
    info!("BMP280 has been initialized");

    loop {
        Timer::after_secs(READ_INTERVAL_SECS).await;
        match device.acquire() {
            Ok(reading) => {
                let (pa, centi) = reading.pressure_split();
                info!(
                    "T={} x0.1 C, P={} Pa (+{}/100)",
                    reading.temperature, pa, centi
                );
            }
            Err(Bmp280Error::Timeout) => info!("Conversion timed out, retrying"),
            Err(e) => warn!("Acquisition failed: {:?}", e),
        }
    }
}
