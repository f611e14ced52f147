//! Recording fakes for host tests
//!
//! A `Rig` owns the shared state (clock, event log, button levels) and
//! hands out device parts that borrow it, so a test can drive the device
//! and inspect what happened without any allocation.

use core::cell::{Cell, RefCell};

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use matrixweather_display::{DisplayError, Frame, MatrixBackend};

use crate::device::DeviceContext;
use crate::traits::{Button, Clock, Indicator};

pub const LOG_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Brightness(f32),
    Blank(u8),
    Present,
    Indicator { on: bool, at_ms: u64 },
}

pub struct Rig {
    ns: Cell<u64>,
    log: RefCell<Vec<Event, LOG_CAPACITY>>,
    pub up: Cell<bool>,
    pub down: Cell<bool>,
    pub fail_blank: Cell<bool>,
    pub fail_present: Cell<bool>,
    last_frame: RefCell<Option<Frame>>,
}

pub type TestDevice<'a> =
    DeviceContext<RecordingDisplay<'a>, RecordingIndicator<'a>, FakeButton<'a>, FakeClock<'a>>;

impl Rig {
    pub fn new() -> Self {
        Self {
            ns: Cell::new(0),
            log: RefCell::new(Vec::new()),
            up: Cell::new(false),
            down: Cell::new(false),
            fail_blank: Cell::new(false),
            fail_present: Cell::new(false),
            last_frame: RefCell::new(None),
        }
    }

    pub fn device(&self) -> TestDevice<'_> {
        DeviceContext::new(
            RecordingDisplay {
                rig: self,
                brightness: 1.0,
            },
            RecordingIndicator { rig: self, on: false },
            FakeButton { level: &self.up },
            FakeButton { level: &self.down },
            FakeClock { ns: &self.ns },
        )
    }

    pub fn delay(&self) -> FakeDelay<'_> {
        FakeDelay { ns: &self.ns }
    }

    pub fn now_ms(&self) -> u64 {
        self.ns.get() / 1_000_000
    }

    pub fn advance_ms(&self, ms: u64) {
        self.ns.set(self.ns.get() + ms * 1_000_000);
    }

    pub fn events(&self) -> Vec<Event, LOG_CAPACITY> {
        self.log.borrow().clone()
    }

    pub fn clear_events(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.last_frame.borrow().clone()
    }

    /// Position of the first event matching `f`
    pub fn position(&self, f: impl Fn(&Event) -> bool) -> Option<usize> {
        self.log.borrow().iter().position(f)
    }

    fn record(&self, event: Event) {
        let _ = self.log.borrow_mut().push(event);
    }
}

pub struct FakeClock<'a> {
    ns: &'a Cell<u64>,
}

impl Clock for FakeClock<'_> {
    fn now_ms(&self) -> u64 {
        self.ns.get() / 1_000_000
    }
}

/// Delay that advances the rig clock instead of waiting
pub struct FakeDelay<'a> {
    ns: &'a Cell<u64>,
}

impl DelayNs for FakeDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.ns.set(self.ns.get() + ns as u64);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.ns.set(self.ns.get() + ms as u64 * 1_000_000);
    }
}

pub struct RecordingDisplay<'a> {
    rig: &'a Rig,
    brightness: f32,
}

impl MatrixBackend for RecordingDisplay<'_> {
    fn blank(&mut self, bit_depth: u8) -> Result<(), DisplayError> {
        if self.rig.fail_blank.get() {
            return Err(DisplayError::Communication);
        }
        self.rig.record(Event::Blank(bit_depth));
        Ok(())
    }

    fn set_brightness(&mut self, level: f32) -> Result<(), DisplayError> {
        self.brightness = level.clamp(0.0, 1.0);
        self.rig.record(Event::Brightness(self.brightness));
        Ok(())
    }

    fn brightness(&self) -> f32 {
        self.brightness
    }

    fn present(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        if self.rig.fail_present.get() {
            return Err(DisplayError::Communication);
        }
        self.rig.record(Event::Present);
        *self.rig.last_frame.borrow_mut() = Some(frame.clone());
        Ok(())
    }
}

pub struct RecordingIndicator<'a> {
    rig: &'a Rig,
    on: bool,
}

impl Indicator for RecordingIndicator<'_> {
    fn set_on(&mut self, on: bool) {
        self.on = on;
        self.rig.record(Event::Indicator {
            on,
            at_ms: self.rig.now_ms(),
        });
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

pub struct FakeButton<'a> {
    level: &'a Cell<bool>,
}

impl Button for FakeButton<'_> {
    fn is_pressed(&mut self) -> bool {
        self.level.get()
    }
}
