use core::fmt;
use core::net::Ipv4Addr;

use fugit::HertzU32;

use crate::frame::Layout;
use crate::net;

/// BNO055 address with ADR tied to GND
pub const BNO055_ADDRESS_A: u8 = 0x28;
/// BNO055 address with ADR tied to VCC
pub const BNO055_ADDRESS_B: u8 = 0x29;

/// AT24C256 with A0..A2 tied to GND
pub const AT24C256_ADDRESS: u8 = 0x50;

pub const MAX_SSID_LEN: usize = 32;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 63;

/// Everything the firmware needs to know, fixed at build time.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// I2C data pin (GPIO number)
    pub sda_pin: u8,
    /// I2C clock pin (GPIO number)
    pub scl_pin: u8,
    pub i2c_address: u8,
    pub i2c_frequency: HertzU32,

    /// Calibration status poll period
    pub calib_interval_ms: u32,
    /// Delay between two broadcast samples
    pub measure_interval_ms: u32,

    /// Ignore the stored calibration and recalibrate on boot
    pub re_calib: bool,
    /// Don't wait for the magnetometer during calibration
    pub skip_mag_calib: bool,
    /// Mirror every frame on the serial console
    pub use_serial: bool,
    /// Read quaternions instead of the sensor's own Euler angles
    pub use_quat: bool,
    /// Convert quaternions to Euler angles before sending. Only used with `use_quat`
    pub quat2euler: bool,
    /// Clock the sensor from the board's 32 kHz crystal
    pub external_crystal: bool,

    pub ssid: &'static str,
    /// Empty for an open network
    pub password: &'static str,
    pub udp_port: u16,
    pub local_ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub subnet: Ipv4Addr,

    pub eeprom_address: u8,
    /// Byte offset of the calibration record inside the EEPROM
    pub calib_eeprom_offset: u16,
}

pub const CONFIG: Config = Config {
    sda_pin: 4,
    scl_pin: 3,
    i2c_address: BNO055_ADDRESS_A,
    i2c_frequency: HertzU32::kHz(400),

    calib_interval_ms: 100, // 10 Hz
    measure_interval_ms: 200, // 5 Hz

    re_calib: false,
    skip_mag_calib: false,
    use_serial: true,
    use_quat: true,
    quat2euler: false,
    external_crystal: true,

    ssid: "bno055",
    password: "",
    udp_port: 5555,
    local_ip: Ipv4Addr::new(192, 168, 1, 1),
    gateway: Ipv4Addr::new(192, 168, 1, 0),
    subnet: Ipv4Addr::new(255, 255, 255, 0),

    eeprom_address: AT24C256_ADDRESS,
    calib_eeprom_offset: 0,
};

impl Default for Config {
    fn default() -> Self {
        CONFIG
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.is_empty() || self.ssid.len() > MAX_SSID_LEN {
            return Err(ConfigError::SsidLength);
        }

        let pwd = self.password.len();
        if pwd != 0 && !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&pwd) {
            return Err(ConfigError::PasswordLength);
        }

        if self.i2c_address != BNO055_ADDRESS_A && self.i2c_address != BNO055_ADDRESS_B {
            return Err(ConfigError::SensorAddress);
        }

        if self.calib_interval_ms == 0 || self.measure_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        if net::prefix_len(self.subnet).is_none() {
            return Err(ConfigError::SubnetMask);
        }

        if !net::same_subnet(self.local_ip, self.gateway, self.subnet) {
            return Err(ConfigError::GatewayOutsideSubnet);
        }

        Ok(())
    }

    /// Destination of every UDP datagram.
    pub fn broadcast_ip(&self) -> Ipv4Addr {
        net::broadcast_address(self.local_ip, self.subnet)
    }

    /// Frame layout produced by the measurement loop.
    pub fn layout(&self) -> Layout {
        if self.use_quat && !self.quat2euler {
            Layout::Quaternion
        } else {
            Layout::Euler
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    SsidLength,
    PasswordLength,
    SensorAddress,
    ZeroInterval,
    SubnetMask,
    GatewayOutsideSubnet,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::SsidLength => "SSID must be 1 to 32 bytes",
            ConfigError::PasswordLength => "password must be empty or 8 to 63 bytes",
            ConfigError::SensorAddress => "BNO055 address must be 0x28 or 0x29",
            ConfigError::ZeroInterval => "sample intervals must be non-zero",
            ConfigError::SubnetMask => "subnet mask is not contiguous",
            ConfigError::GatewayOutsideSubnet => "gateway is outside the local subnet",
        };
        f.write_str(msg)
    }
}
