//! The control routine: startup, calibration and the broadcast loop.

use embedded_hal_async::delay::DelayNs;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::frame::{self, Frame, FrameSink};
use crate::sensor::{self, OrientationSensor};
use crate::state::Phase;
use crate::storage::CalibrationStore;

const HALT_REPORT_MS: u32 = 1_000;

/// Owns the sensor, the calibration store and the delay for the whole process lifetime.
pub struct Station<'c, S, C, D> {
    config: &'c Config,
    sensor: S,
    store: C,
    delay: D,
    phase: Phase,
}

impl<'c, S, C, D> Station<'c, S, C, D>
where
    S: OrientationSensor,
    C: CalibrationStore,
    D: DelayNs,
{
    pub fn new(config: &'c Config, sensor: S, store: C, delay: D) -> Self {
        Self {
            config,
            sensor,
            store,
            delay,
            phase: Phase::Init,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Initializes the sensor and restores stored calibration when allowed.
    pub async fn startup(&mut self) -> Phase {
        if self.phase != Phase::Init {
            return self.phase;
        }

        info!("Initializing BNO055 at {=u8:#x}", self.config.i2c_address);

        if let Err(e) = self.sensor.init().await {
            error!("Sensor init failed: {:?}", e);
            self.phase = Phase::Fatal;
            return self.phase;
        }

        self.phase = if self.config.re_calib {
            info!("Recalibration forced");
            Phase::Calibrating
        } else if self.restore_calibration().await {
            Phase::Running
        } else {
            Phase::Calibrating
        };

        self.phase
    }

    async fn restore_calibration(&mut self) -> bool {
        let profile = match self.store.load().await {
            Ok(Some(profile)) => profile,
            Ok(None) => return false,
            Err(e) => {
                warn!("Reading stored calibration failed: {:?}", e);
                return false;
            }
        };

        match self.sensor.apply_profile(&profile).await {
            Ok(()) => {
                info!("Stored calibration applied");
                true
            }
            Err(e) => {
                warn!("Applying stored calibration failed: {:?}", e);
                false
            }
        }
    }

    /// One look at the calibration registers. Returns true once the station is running.
    pub async fn poll_calibration(&mut self) -> bool {
        if self.phase != Phase::Calibrating {
            return self.phase == Phase::Running;
        }

        let status = match self.sensor.calibration_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!("Reading calibration status failed: {:?}", e);
                return false;
            }
        };

        info!(
            "Calibration sys={} gyro={} accel={} mag={}",
            status.sys, status.gyro, status.accel, status.mag
        );

        if !status.is_complete(self.config.skip_mag_calib) {
            return false;
        }

        self.persist_calibration().await;
        self.phase = Phase::Running;
        true
    }

    async fn persist_calibration(&mut self) {
        let profile = match self.sensor.profile().await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Reading calibration profile failed: {:?}", e);
                return;
            }
        };

        if let Err(e) = self.store.store(&profile).await {
            warn!("Storing calibration failed: {:?}", e);
        }
    }

    /// Waits, without timeout, until the sensor reports full calibration.
    pub async fn calibrate(&mut self) {
        info!("Calibrating, move the sensor until all levels reach 3");

        while !self.poll_calibration().await {
            self.delay.delay_ms(self.config.calib_interval_ms).await;
        }

        info!("Calibration complete");
    }

    /// Startup plus calibration. Never returns when the sensor is missing.
    pub async fn bring_up(&mut self) {
        match self.startup().await {
            Phase::Fatal => self.halt().await,
            Phase::Calibrating => self.calibrate().await,
            Phase::Init | Phase::Running => {}
        }
    }

    /// Reads one sample and pushes its frame to the sinks. Send failures are dropped.
    pub async fn measure<U, T>(&mut self, udp: &mut U, serial: Option<&mut T>) -> Result<Frame>
    where
        U: FrameSink,
        T: FrameSink,
    {
        let sample = sensor::read_sample(&mut self.sensor, self.config).await?;
        let frame = frame::encode(&sample).ok_or(Error::Sensor)?;

        if let Err(e) = udp.send(frame.as_bytes()).await {
            debug!("UDP send dropped: {:?}", e);
        }

        if self.config.use_serial {
            if let Some(serial) = serial {
                if let Err(e) = serial.send(frame.as_bytes()).await {
                    debug!("Serial write dropped: {:?}", e);
                }
            }
        }

        Ok(frame)
    }

    /// The steady-state loop: sample, send, sleep.
    pub async fn run<U, T>(&mut self, udp: &mut U, mut serial: Option<&mut T>) -> !
    where
        U: FrameSink,
        T: FrameSink,
    {
        info!(
            "Broadcasting {:?} frames every {} ms on port {}",
            self.config.layout(),
            self.config.measure_interval_ms,
            self.config.udp_port
        );

        loop {
            if let Err(e) = self.measure(udp, serial.as_deref_mut()).await {
                warn!("Skipping sample: {:?}", e);
            }
            self.delay.delay_ms(self.config.measure_interval_ms).await;
        }
    }

    /// Absorbing failure state. Keeps reporting and touches nothing else.
    pub async fn halt(&mut self) -> ! {
        self.phase = Phase::Fatal;
        loop {
            error!("No BNO055 detected at {=u8:#x}, check wiring or I2C address", self.config.i2c_address);
            self.delay.delay_ms(HALT_REPORT_MS).await;
        }
    }
}
