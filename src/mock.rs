//! Test doubles for the hardware collaborators.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use crate::calibration::{CalibrationProfile, CalibrationStatus, FULLY_CALIBRATED, PROFILE_SIZE};
use crate::error::{Error, Result};
use crate::frame::FrameSink;
use crate::orientation::{EulerAngles, Quaternion};
use crate::sensor::OrientationSensor;
use crate::storage::{CalibrationStore, AT24C256_CAPACITY, AT24C256_PAGE_SIZE};

/// Simulated monotonic time in nanoseconds, shared between mocks.
#[derive(Debug, Clone, Default)]
pub struct Clock(Rc<Cell<u64>>);

impl Clock {
    pub fn now_ms(&self) -> u64 {
        self.0.get() / 1_000_000
    }

    fn advance(&self, ns: u64) {
        self.0.set(self.0.get() + ns);
    }
}

/// Advances the clock instead of sleeping. With a limit, the call after the
/// last allowed one never completes, which freezes an endless loop for inspection.
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    clock: Clock,
    calls: Rc<Cell<usize>>,
    limit: Option<usize>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn clock(&self) -> Clock {
        self.clock.clone()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    async fn advance(&mut self, ns: u64) {
        if let Some(limit) = self.limit {
            if self.calls.get() >= limit {
                core::future::pending::<()>().await;
            }
        }
        self.calls.set(self.calls.get() + 1);
        self.clock.advance(ns);
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.advance(ns as u64).await
    }

    async fn delay_us(&mut self, us: u32) {
        self.advance(us as u64 * 1_000).await
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.advance(ms as u64 * 1_000_000).await
    }
}

#[derive(Debug)]
struct SensorState {
    present: bool,
    fail_reads: bool,
    statuses: VecDeque<CalibrationStatus>,
    last_status: CalibrationStatus,
    quaternion: Quaternion,
    euler: EulerAngles,
    profile: CalibrationProfile,
    applied: Option<CalibrationProfile>,
    init_calls: usize,
    status_reads: usize,
    quaternion_reads: usize,
    euler_reads: usize,
}

impl Default for SensorState {
    fn default() -> Self {
        let mut profile = [0u8; PROFILE_SIZE];
        for (i, b) in profile.iter_mut().enumerate() {
            *b = i as u8 + 1;
        }

        Self {
            present: true,
            fail_reads: false,
            statuses: VecDeque::new(),
            last_status: CalibrationStatus::default(),
            quaternion: Quaternion::IDENTITY,
            euler: EulerAngles::default(),
            profile: CalibrationProfile(profile),
            applied: None,
            init_calls: 0,
            status_reads: 0,
            quaternion_reads: 0,
            euler_reads: 0,
        }
    }
}

/// Scripted BNO055. Clones share state so a test can inspect what the station did.
#[derive(Debug, Clone, Default)]
pub struct MockSensor(Rc<RefCell<SensorState>>);

impl MockSensor {
    /// Reports level 3 everywhere.
    pub fn calibrated() -> Self {
        Self::with_statuses(&[CalibrationStatus {
            sys: FULLY_CALIBRATED,
            gyro: FULLY_CALIBRATED,
            accel: FULLY_CALIBRATED,
            mag: FULLY_CALIBRATED,
        }])
    }

    /// Reports level 0 forever.
    pub fn uncalibrated() -> Self {
        Self::default()
    }

    pub fn missing() -> Self {
        let sensor = Self::default();
        sensor.0.borrow_mut().present = false;
        sensor
    }

    /// Returns the statuses in order, then repeats the last one.
    pub fn with_statuses(statuses: &[CalibrationStatus]) -> Self {
        let sensor = Self::default();
        sensor.0.borrow_mut().statuses = statuses.iter().copied().collect();
        sensor
    }

    pub fn set_quaternion(&self, q: Quaternion) {
        self.0.borrow_mut().quaternion = q;
    }

    pub fn set_euler(&self, e: EulerAngles) {
        self.0.borrow_mut().euler = e;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.0.borrow_mut().fail_reads = fail;
    }

    pub fn profile_value(&self) -> CalibrationProfile {
        self.0.borrow().profile
    }

    pub fn applied(&self) -> Option<CalibrationProfile> {
        self.0.borrow().applied
    }

    pub fn init_calls(&self) -> usize {
        self.0.borrow().init_calls
    }

    pub fn status_reads(&self) -> usize {
        self.0.borrow().status_reads
    }

    pub fn quaternion_reads(&self) -> usize {
        self.0.borrow().quaternion_reads
    }

    pub fn euler_reads(&self) -> usize {
        self.0.borrow().euler_reads
    }
}

impl OrientationSensor for MockSensor {
    async fn init(&mut self) -> Result<()> {
        let mut s = self.0.borrow_mut();
        s.init_calls += 1;
        if s.present {
            Ok(())
        } else {
            Err(Error::SensorNotFound)
        }
    }

    async fn calibration_status(&mut self) -> Result<CalibrationStatus> {
        let mut s = self.0.borrow_mut();
        s.status_reads += 1;
        if let Some(next) = s.statuses.pop_front() {
            s.last_status = next;
        }
        Ok(s.last_status)
    }

    async fn profile(&mut self) -> Result<CalibrationProfile> {
        Ok(self.0.borrow().profile)
    }

    async fn apply_profile(&mut self, profile: &CalibrationProfile) -> Result<()> {
        self.0.borrow_mut().applied = Some(*profile);
        Ok(())
    }

    async fn quaternion(&mut self) -> Result<Quaternion> {
        let mut s = self.0.borrow_mut();
        s.quaternion_reads += 1;
        if s.fail_reads {
            return Err(Error::Sensor);
        }
        Ok(s.quaternion)
    }

    async fn euler(&mut self) -> Result<EulerAngles> {
        let mut s = self.0.borrow_mut();
        s.euler_reads += 1;
        if s.fail_reads {
            return Err(Error::Sensor);
        }
        Ok(s.euler)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    stored: Option<CalibrationProfile>,
    failing: bool,
    loads: usize,
    stores: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MockStore(Rc<RefCell<StoreState>>);

impl MockStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(profile: CalibrationProfile) -> Self {
        let store = Self::default();
        store.0.borrow_mut().stored = Some(profile);
        store
    }

    /// Every access fails like a missing EEPROM would.
    pub fn failing() -> Self {
        let store = Self::default();
        store.0.borrow_mut().failing = true;
        store
    }

    pub fn stored(&self) -> Option<CalibrationProfile> {
        self.0.borrow().stored
    }

    pub fn loads(&self) -> usize {
        self.0.borrow().loads
    }

    pub fn stores(&self) -> usize {
        self.0.borrow().stores
    }
}

impl CalibrationStore for MockStore {
    async fn load(&mut self) -> Result<Option<CalibrationProfile>> {
        let mut s = self.0.borrow_mut();
        s.loads += 1;
        if s.failing {
            return Err(Error::Storage);
        }
        Ok(s.stored)
    }

    async fn store(&mut self, profile: &CalibrationProfile) -> Result<()> {
        let mut s = self.0.borrow_mut();
        s.stores += 1;
        if s.failing {
            return Err(Error::Storage);
        }
        s.stored = Some(*profile);
        Ok(())
    }
}

/// Collects frames, stamped with the simulated time when a clock is attached.
#[derive(Debug, Default)]
pub struct RecordingSink {
    clock: Option<Clock>,
    failing: bool,
    sent: Vec<(u64, String)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            clock: Some(clock),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn frames(&self) -> Vec<String> {
        self.sent.iter().map(|(_, f)| f.clone()).collect()
    }

    pub fn timestamps_ms(&self) -> Vec<u64> {
        self.sent.iter().map(|(t, _)| *t).collect()
    }
}

impl FrameSink for RecordingSink {
    async fn send(&mut self, frame: &[u8]) -> Result<()> {
        if self.failing {
            return Err(Error::Network);
        }
        let at = self.clock.as_ref().map_or(0, Clock::now_ms);
        self.sent
            .push((at, String::from_utf8_lossy(frame).into_owned()));
        Ok(())
    }
}

/// AT24C256 model: 16-bit big-endian pointer, page-wrapping writes.
#[derive(Debug)]
pub struct MockEeprom {
    address: u8,
    memory: Vec<u8>,
    pointer: usize,
    writes: Vec<Vec<u8>>,
    fail_next: bool,
}

impl MockEeprom {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            memory: vec![0xFF; AT24C256_CAPACITY],
            pointer: 0,
            writes: Vec::new(),
            fail_next: false,
        }
    }

    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    /// Every data-carrying write, address bytes included.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }
}

impl ErrorType for MockEeprom {
    type Error = ErrorKind;
}

impl I2c for MockEeprom {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> core::result::Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        if self.fail_next {
            self.fail_next = false;
            return Err(ErrorKind::Bus);
        }

        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    if bytes.len() < 2 {
                        return Err(ErrorKind::Other);
                    }
                    self.pointer = u16::from_be_bytes([bytes[0], bytes[1]]) as usize % AT24C256_CAPACITY;
                    if bytes.len() > 2 {
                        self.writes.push(bytes.to_vec());
                        let page = self.pointer - self.pointer % AT24C256_PAGE_SIZE;
                        for b in &bytes[2..] {
                            self.memory[self.pointer] = *b;
                            self.pointer = page + (self.pointer + 1 - page) % AT24C256_PAGE_SIZE;
                        }
                    }
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.memory[self.pointer];
                        self.pointer = (self.pointer + 1) % AT24C256_CAPACITY;
                    }
                }
            }
        }

        Ok(())
    }
}
