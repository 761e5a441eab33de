use crate::calibration::{CalibrationProfile, CalibrationStatus};
use crate::config::Config;
use crate::error::Result;
use crate::orientation::{quat_to_euler, EulerAngles, Quaternion, Sample};

/// The fused-orientation side of a BNO055 driver.
#[allow(async_fn_in_trait)]
pub trait OrientationSensor {
    /// Resets the chip and brings it into NDOF fusion mode.
    ///
    /// Returns `Error::SensorNotFound` when nothing answers at the configured address.
    async fn init(&mut self) -> Result<()>;

    async fn calibration_status(&mut self) -> Result<CalibrationStatus>;

    /// Reads the current offsets and radii.
    async fn profile(&mut self) -> Result<CalibrationProfile>;

    async fn apply_profile(&mut self, profile: &CalibrationProfile) -> Result<()>;

    async fn quaternion(&mut self) -> Result<Quaternion>;

    /// Euler angles as computed by the sensor itself, in degrees.
    async fn euler(&mut self) -> Result<EulerAngles>;
}

/// Reads one sample in the representation the config asks for.
pub async fn read_sample<S: OrientationSensor>(sensor: &mut S, config: &Config) -> Result<Sample> {
    if !config.use_quat {
        return Ok(Sample::Euler(sensor.euler().await?));
    }

    let quat = sensor.quaternion().await?;
    if config.quat2euler {
        Ok(Sample::Euler(quat_to_euler(&quat)))
    } else {
        Ok(Sample::Quaternion(quat))
    }
}
