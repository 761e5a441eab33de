use crc16::{State, CCITT_FALSE};
use serde::{Deserialize, Serialize};

/// Accel, mag and gyro offsets followed by accel and mag radius, as the BNO055 lays them out.
pub const PROFILE_SIZE: usize = 22;

/// Bytes reserved in EEPROM for one record.
pub const RECORD_CAPACITY: usize = 48;

const RECORD_MAGIC: u32 = 0xB055_CA11;
const RECORD_VERSION: u8 = 1;

/// Identifier written alongside the offsets so a record from another setup is not applied.
pub const SENSOR_ID: u8 = 55;

/// Highest level a calibration subsystem reports.
pub const FULLY_CALIBRATED: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationStatus {
    pub sys: u8,   // System calibration (0-3)
    pub gyro: u8,  // Gyroscope calibration (0-3)
    pub accel: u8, // Accelerometer calibration (0-3)
    pub mag: u8,   // Magnetometer calibration (0-3)
}

impl CalibrationStatus {
    pub fn is_complete(&self, skip_mag: bool) -> bool {
        self.sys == FULLY_CALIBRATED
            && self.gyro == FULLY_CALIBRATED
            && self.accel == FULLY_CALIBRATED
            && (skip_mag || self.mag == FULLY_CALIBRATED)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationProfile(pub [u8; PROFILE_SIZE]);

impl CalibrationProfile {
    pub fn as_bytes(&self) -> &[u8; PROFILE_SIZE] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Nothing was ever written there
    Erased,
    /// Length or checksum mismatch
    Corrupt,
    /// Checksum fine, contents not a calibration record
    Format,
    ForeignSensor,
}

#[derive(Serialize, Deserialize)]
struct Record {
    magic: u32,
    version: u8,
    sensor_id: u8,
    profile: CalibrationProfile,
}

/// Serializes a profile into the EEPROM image: `len | postcard body | crc16 (LE)`.
pub fn encode_record(profile: &CalibrationProfile) -> Option<heapless::Vec<u8, RECORD_CAPACITY>> {
    let record = Record {
        magic: RECORD_MAGIC,
        version: RECORD_VERSION,
        sensor_id: SENSOR_ID,
        profile: *profile,
    };

    let mut buf = [0u8; RECORD_CAPACITY];
    let body_len = postcard::to_slice(&record, &mut buf[1..RECORD_CAPACITY - 2])
        .ok()?
        .len();
    buf[0] = body_len as u8;

    let crc = State::<CCITT_FALSE>::calculate(&buf[..1 + body_len]);
    buf[1 + body_len..3 + body_len].copy_from_slice(&crc.to_le_bytes());

    heapless::Vec::from_slice(&buf[..3 + body_len]).ok()
}

pub fn decode_record(image: &[u8]) -> Result<CalibrationProfile, RecordError> {
    let Some(&len) = image.first() else {
        return Err(RecordError::Corrupt);
    };
    if image.iter().all(|b| *b == 0xFF) {
        return Err(RecordError::Erased);
    }

    let body_len = len as usize;
    if 3 + body_len > image.len() {
        return Err(RecordError::Corrupt);
    }

    let stored = u16::from_le_bytes([image[1 + body_len], image[2 + body_len]]);
    if State::<CCITT_FALSE>::calculate(&image[..1 + body_len]) != stored {
        return Err(RecordError::Corrupt);
    }

    let record: Record =
        postcard::from_bytes(&image[1..1 + body_len]).map_err(|_| RecordError::Format)?;
    if record.magic != RECORD_MAGIC || record.version != RECORD_VERSION {
        return Err(RecordError::Format);
    }
    if record.sensor_id != SENSOR_ID {
        return Err(RecordError::ForeignSensor);
    }

    Ok(record.profile)
}
