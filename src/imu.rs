use bno055::{BNO055Calibration, BNO055OperationMode, Bno055, BNO055_CALIB_SIZE};
use embassy_time::{Delay, Timer};
use embedded_hal_async::i2c::I2c;

use crate::calibration::{CalibrationProfile, CalibrationStatus, PROFILE_SIZE};
use crate::config::{Config, BNO055_ADDRESS_B};
use crate::error::{Error, Result};
use crate::orientation::{EulerAngles, Quaternion};
use crate::sensor::OrientationSensor;

const _: () = assert!(BNO055_CALIB_SIZE == PROFILE_SIZE);

// Time the chip needs after power-on before it answers on the bus.
const BOOT_MS: u64 = 650;

/// `OrientationSensor` backed by the `bno055` driver.
pub struct Bno055Sensor<I> {
    imu: Bno055<I>,
    external_crystal: bool,
}

impl<I: I2c> Bno055Sensor<I> {
    pub fn new(i2c: I, config: &Config) -> Self {
        let imu = Bno055::new(i2c);
        let imu = if config.i2c_address == BNO055_ADDRESS_B {
            imu.with_alternative_address()
        } else {
            imu
        };

        Self {
            imu,
            external_crystal: config.external_crystal,
        }
    }
}

impl<I: I2c> OrientationSensor for Bno055Sensor<I> {
    async fn init(&mut self) -> Result<()> {
        Timer::after_millis(BOOT_MS).await;

        self.imu
            .init(&mut Delay)
            .await
            .map_err(|_| Error::SensorNotFound)?;

        if self.external_crystal {
            self.imu
                .set_external_crystal(true, &mut Delay)
                .await
                .map_err(|_| Error::Sensor)?;
        }

        self.imu
            .set_mode(BNO055OperationMode::NDOF, &mut Delay)
            .await
            .map_err(|_| Error::Sensor)
    }

    async fn calibration_status(&mut self) -> Result<CalibrationStatus> {
        let status = self
            .imu
            .get_calibration_status()
            .await
            .map_err(|_| Error::Sensor)?;

        Ok(CalibrationStatus {
            sys: status.sys,
            gyro: status.gyr,
            accel: status.acc,
            mag: status.mag,
        })
    }

    async fn profile(&mut self) -> Result<CalibrationProfile> {
        let calib = self
            .imu
            .calibration_profile(&mut Delay)
            .await
            .map_err(|_| Error::Sensor)?;

        let mut bytes = [0u8; PROFILE_SIZE];
        bytes.copy_from_slice(calib.as_bytes());
        Ok(CalibrationProfile(bytes))
    }

    async fn apply_profile(&mut self, profile: &CalibrationProfile) -> Result<()> {
        let calib = BNO055Calibration::from_buf(profile.as_bytes());

        self.imu
            .set_calibration_profile(calib, &mut Delay)
            .await
            .map_err(|_| Error::Sensor)
    }

    async fn quaternion(&mut self) -> Result<Quaternion> {
        let q = self.imu.quaternion().await.map_err(|_| Error::Sensor)?;
        Ok(Quaternion::new(q.s, q.v.x, q.v.y, q.v.z))
    }

    async fn euler(&mut self) -> Result<EulerAngles> {
        // a = roll, b = pitch, c = heading
        let e = self.imu.euler_angles().await.map_err(|_| Error::Sensor)?;
        Ok(EulerAngles {
            yaw: e.c,
            pitch: e.b,
            roll: e.a,
        })
    }
}
