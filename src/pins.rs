use esp_hal::{
    gpio::{AnyPin, Pin},
    peripherals::{Peripherals, I2C0, RADIO_CLK, RNG, TIMG0, TIMG1, USB_DEVICE, WIFI},
};

use crate::config::CONFIG;

// The pin table below is hand-wired; keep it in step with the config.
const _: () = assert!(CONFIG.sda_pin == 4 && CONFIG.scl_pin == 3);

pub struct BoardPins {
    pub i2c_sda: AnyPin,
    pub i2c_scl: AnyPin,

    pub i2c: I2C0,
    pub timg0: TIMG0,
    pub timg1: TIMG1,
    pub rng: RNG,
    pub radio_clk: RADIO_CLK,
    pub wifi: WIFI,
    pub usb: USB_DEVICE,
}

pub fn get_pins_mini_c3(p: Peripherals) -> BoardPins {
    BoardPins {
        i2c_sda: p.GPIO4.degrade(),
        i2c_scl: p.GPIO3.degrade(),

        i2c: p.I2C0,
        timg0: p.TIMG0,
        timg1: p.TIMG1,
        rng: p.RNG,
        radio_clk: p.RADIO_CLK,
        wifi: p.WIFI,
        usb: p.USB_DEVICE,
    }
}
