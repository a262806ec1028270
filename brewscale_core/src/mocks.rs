//! Test and helper mocks for brewscale_core.

use brewscale_traits::{Buzzer, DisplaySink, Frame, LoadCell};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Load cell that replays a scripted units sequence, holding the last value
/// once the script runs out. Raw counts are derived as units x 1000.
pub struct ScriptedCell {
    units: Vec<f32>,
    idx: usize,
    offset_g: f32,
    not_ready_every: Option<usize>,
    polls: usize,
}

impl ScriptedCell {
    pub fn new(units: impl Into<Vec<f32>>) -> Self {
        Self {
            units: units.into(),
            idx: 0,
            offset_g: 0.0,
            not_ready_every: None,
            polls: 0,
        }
    }

    /// Report not-ready on every n-th readiness poll.
    pub fn with_not_ready_every(mut self, n: usize) -> Self {
        self.not_ready_every = Some(n.max(1));
        self
    }

    fn current(&self) -> f32 {
        match self.units.get(self.idx) {
            Some(v) => *v,
            None => self.units.last().copied().unwrap_or(0.0),
        }
    }
}

impl LoadCell for ScriptedCell {
    fn is_ready(&mut self) -> bool {
        self.polls += 1;
        match self.not_ready_every {
            Some(n) => !self.polls.is_multiple_of(n),
            None => true,
        }
    }

    fn read_raw(&mut self) -> Result<i32, BoxError> {
        Ok((self.current() * 1000.0) as i32)
    }

    fn read_units(&mut self, _samples: u8) -> Result<f32, BoxError> {
        let v = self.current() - self.offset_g;
        if self.idx < self.units.len() {
            self.idx += 1;
        }
        Ok(v)
    }

    fn tare(&mut self) -> Result<(), BoxError> {
        self.offset_g = self.current();
        Ok(())
    }
}

/// A load cell that always errors on read; readiness still reports true so
/// the error paths get exercised.
pub struct ErrCell;

impl LoadCell for ErrCell {
    fn is_ready(&mut self) -> bool {
        true
    }
    fn read_raw(&mut self) -> Result<i32, BoxError> {
        Err(Box::new(std::io::Error::other("err cell")))
    }
    fn read_units(&mut self, _samples: u8) -> Result<f32, BoxError> {
        Err(Box::new(std::io::Error::other("err cell")))
    }
    fn tare(&mut self) -> Result<(), BoxError> {
        Err(Box::new(std::io::Error::other("err cell")))
    }
}

/// Display that accepts everything and shows nothing.
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn splash(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
    fn render(&mut self, _frame: &Frame) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Display whose render always fails; splash optionally fails too.
pub struct FailingDisplay {
    pub fail_splash: bool,
}

impl DisplaySink for FailingDisplay {
    fn splash(&mut self) -> Result<(), BoxError> {
        if self.fail_splash {
            Err(Box::new(std::io::Error::other("splash failed")))
        } else {
            Ok(())
        }
    }
    fn render(&mut self, _frame: &Frame) -> Result<(), BoxError> {
        Err(Box::new(std::io::Error::other("render failed")))
    }
}

/// Buzzer that silently succeeds. Default when the builder gets no buzzer.
pub struct NullBuzzer;

impl Buzzer for NullBuzzer {
    fn beep_ms(&mut self, _ms: u32) -> Result<(), BoxError> {
        Ok(())
    }
}
