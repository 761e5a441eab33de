#![deny(unsafe_code)]
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

pub mod app;
pub mod calibration;
pub mod config;
pub mod error;
pub mod frame;
pub mod net;
pub mod orientation;
pub mod sensor;
pub mod serial;
pub mod state;
pub mod storage;

#[cfg(feature = "esp32c3")]
pub mod i2c;
#[cfg(feature = "esp32c3")]
pub mod imu;
#[cfg(feature = "esp32c3")]
pub mod pins;
#[cfg(feature = "esp32c3")]
pub mod wifi;

#[cfg(test)]
mod mock;

pub use app::Station;
pub use config::{Config, CONFIG};
pub use error::Error;
pub use state::Phase;
