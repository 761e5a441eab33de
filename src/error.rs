use core::fmt;

use crate::config::ConfigError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Sensor did not answer at the configured address, or reported a wrong chip id
    SensorNotFound,
    /// Sensor transaction failed after a successful init
    Sensor,
    /// EEPROM read or write failed
    Storage,
    /// UDP socket refused the datagram
    Network,
    /// Serial write failed
    Serial,
    InvalidConfig(ConfigError),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::InvalidConfig(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SensorNotFound => write!(f, "no BNO055 detected"),
            Error::Sensor => write!(f, "sensor transaction failed"),
            Error::Storage => write!(f, "EEPROM access failed"),
            Error::Network => write!(f, "UDP send failed"),
            Error::Serial => write!(f, "serial write failed"),
            Error::InvalidConfig(err) => write!(f, "invalid configuration: {}", err),
        }
    }
}
