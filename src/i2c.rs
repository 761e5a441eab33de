use embassy_sync::{blocking_mutex::raw::NoopRawMutex, mutex::Mutex};
use esp_hal::{
    gpio::AnyPin,
    i2c::master::{Config, I2c},
    peripherals::I2C0,
    Async,
};
use fugit::HertzU32;
use static_cell::StaticCell;

pub type I2cBus = Mutex<NoopRawMutex, I2c<'static, Async>>;

static I2C_BUS: StaticCell<I2cBus> = StaticCell::new();

/// Brings up I2C0 and parks it behind a mutex so the IMU and the EEPROM can
/// both hold an `I2cDevice` on it.
pub fn init(i2c: I2C0, sda: AnyPin, scl: AnyPin, frequency: HertzU32) -> &'static I2cBus {
    let config = Config {
        frequency,
        ..Config::default()
    };

    let i2c = I2c::new(i2c, config)
        .with_sda(sda)
        .with_scl(scl)
        .into_async();

    I2C_BUS.init(Mutex::new(i2c))
}
