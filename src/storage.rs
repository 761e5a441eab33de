//! Calibration persistence on an AT24C256 I2C EEPROM.

use embedded_hal_async::{delay::DelayNs, i2c::I2c};

use crate::calibration::{self, CalibrationProfile, RECORD_CAPACITY};
use crate::error::{Error, Result};

/// 256 kbit
pub const AT24C256_CAPACITY: usize = 32 * 1024;
pub const AT24C256_PAGE_SIZE: usize = 64;
/// Max internal write cycle time (tWR)
const WRITE_CYCLE_MS: u32 = 5;

/// Where calibration offsets survive a reboot.
#[allow(async_fn_in_trait)]
pub trait CalibrationStore {
    /// `Ok(None)` when no usable record is stored.
    async fn load(&mut self) -> Result<Option<CalibrationProfile>>;

    async fn store(&mut self, profile: &CalibrationProfile) -> Result<()>;
}

pub struct At24c256<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    offset: u16,
}

impl<I: I2c, D: DelayNs> At24c256<I, D> {
    /// `offset` is the memory address of the calibration record.
    pub fn new(i2c: I, delay: D, address: u8, offset: u16) -> Self {
        Self {
            i2c,
            delay,
            address,
            offset,
        }
    }

    pub async fn read(&mut self, mem: u16, buf: &mut [u8]) -> Result<()> {
        check_range(mem, buf.len())?;

        self.i2c
            .write_read(self.address, &mem.to_be_bytes(), buf)
            .await
            .map_err(|_| Error::Storage)
    }

    /// Writes `data` page by page, waiting out the write cycle after each page.
    pub async fn write(&mut self, mem: u16, data: &[u8]) -> Result<()> {
        check_range(mem, data.len())?;

        let mut mem = mem as usize;
        let mut rest = data;
        let mut buf = [0u8; 2 + AT24C256_PAGE_SIZE];

        while !rest.is_empty() {
            let room = AT24C256_PAGE_SIZE - mem % AT24C256_PAGE_SIZE;
            let (chunk, tail) = rest.split_at(room.min(rest.len()));

            buf[..2].copy_from_slice(&(mem as u16).to_be_bytes());
            buf[2..2 + chunk.len()].copy_from_slice(chunk);

            self.i2c
                .write(self.address, &buf[..2 + chunk.len()])
                .await
                .map_err(|_| Error::Storage)?;
            self.delay.delay_ms(WRITE_CYCLE_MS).await;

            mem += chunk.len();
            rest = tail;
        }

        Ok(())
    }

    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }
}

fn check_range(mem: u16, len: usize) -> Result<()> {
    if mem as usize + len > AT24C256_CAPACITY {
        return Err(Error::Storage);
    }
    Ok(())
}

impl<I: I2c, D: DelayNs> CalibrationStore for At24c256<I, D> {
    async fn load(&mut self) -> Result<Option<CalibrationProfile>> {
        let mut image = [0u8; RECORD_CAPACITY];
        self.read(self.offset, &mut image).await?;

        match calibration::decode_record(&image) {
            Ok(profile) => Ok(Some(profile)),
            Err(err) => {
                info!("No usable calibration in EEPROM: {:?}", err);
                Ok(None)
            }
        }
    }

    async fn store(&mut self, profile: &CalibrationProfile) -> Result<()> {
        let image = calibration::encode_record(profile).ok_or(Error::Storage)?;
        self.write(self.offset, &image).await?;
        info!("Calibration stored at EEPROM offset {}", self.offset);
        Ok(())
    }
}
