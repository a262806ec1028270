//! The polling control loop (`ScaleCore`).
//!
//! Each tick reads the load cell (or carries the previous sample forward when
//! the sensor is not ready), runs the signal pipeline, advances the brew
//! timer, and renders one frame. Tick pacing, tare debounce, and elapsed time
//! all go through the injected `Clock`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use brewscale_traits::clock::Clock;
use brewscale_traits::{Buzzer, DisplaySink, Frame, LoadCell};
use eyre::WrapErr;

use crate::config::LoopCfg;
use crate::error::{Result, ScaleError};
use crate::hw_error::map_hw_error;
use crate::pipeline::WeightPipeline;
use crate::timer::BrewTimer;
use crate::util::tick_period;

/// Long startup beep.
pub const BOOT_BEEP_MS: u32 = 100;
/// Short beep once the initial tare is done and the loop is live.
pub const READY_BEEP_MS: u32 = 60;
/// Acknowledge a tare request.
pub const TARE_BEEP_MS: u32 = 40;

/// Unified core for both dynamic (boxed) and generic (static dispatch)
/// variants.
pub struct ScaleCore<C: LoadCell, D: DisplaySink, B: Buzzer> {
    pub(crate) cell: C,
    pub(crate) display: D,
    pub(crate) buzzer: B,
    pub(crate) pipeline: WeightPipeline,
    pub(crate) timer: BrewTimer,
    pub(crate) pacing: LoopCfg,
    pub(crate) tare_input: Option<Box<dyn Fn() -> bool>>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,

    pub(crate) last_raw: i32,
    pub(crate) last_units: f32,
    pub(crate) period: Duration,
    pub(crate) debounce: Duration,
}

impl<C: LoadCell, D: DisplaySink, B: Buzzer> core::fmt::Debug for ScaleCore<C, D, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScaleCore")
            .field("last_units", &self.last_units)
            .field("filtered_g", &self.pipeline.filtered())
            .field("timer_running", &self.timer.is_running())
            .finish()
    }
}

impl<C: LoadCell, D: DisplaySink, B: Buzzer> ScaleCore<C, D, B> {
    /// Boot sequence: splash, boot beep, initial tare, ready beep.
    ///
    /// A display that cannot even show the splash is a fatal fault; sensor
    /// problems during the initial tare are not, the loop starts with a
    /// zero baseline and recovers once readings come in.
    pub fn start(&mut self) -> Result<()> {
        self.display
            .splash()
            .map_err(|e| eyre::Report::new(ScaleError::Display(e.to_string())))
            .wrap_err("display splash")?;
        self.beep(BOOT_BEEP_MS);
        self.epoch = self.clock.now();
        self.apply_tare();
        self.beep(READY_BEEP_MS);
        tracing::info!("scale ready");
        Ok(())
    }

    /// One iteration of the control loop: tare poll, sample, pipeline, timer,
    /// render, pace. Returns the frame that was rendered.
    pub fn tick(&mut self) -> Result<Frame> {
        self.poll_tare();

        if self.cell.is_ready() {
            match self.cell.read_raw() {
                Ok(raw) => self.last_raw = raw,
                Err(e) => {
                    tracing::warn!(error = %map_hw_error(&*e), "raw read failed, carrying last sample")
                }
            }
            match self.cell.read_units(self.pacing.sample_average) {
                Ok(units) => self.last_units = units,
                Err(e) => {
                    tracing::warn!(error = %map_hw_error(&*e), "units read failed, carrying last sample")
                }
            }
        }

        let stable_g = self.pipeline.update(self.last_units);
        let now_ms = self.clock.ms_since(self.epoch);
        self.timer.update(stable_g, now_ms);

        let frame = Frame {
            raw: self.last_raw,
            units: self.last_units,
            stable_g,
            elapsed_s: self.timer.elapsed_secs(now_ms),
            running: self.timer.is_running(),
        };

        self.display
            .render(&frame)
            .map_err(|e| eyre::Report::new(ScaleError::Display(e.to_string())))
            .wrap_err("display render")?;

        self.clock.sleep(self.period);
        Ok(frame)
    }

    /// Run the loop until `shutdown` is set or `max_ticks` frames have been
    /// rendered. `start()` is part of the run.
    pub fn run(&mut self, shutdown: &AtomicBool, max_ticks: Option<u64>) -> Result<()> {
        self.start()?;
        let mut ticks: u64 = 0;
        while !shutdown.load(Ordering::SeqCst) {
            if let Some(max) = max_ticks
                && ticks >= max
            {
                break;
            }
            self.tick()?;
            ticks = ticks.saturating_add(1);
        }
        tracing::info!(ticks, "control loop stopped");
        Ok(())
    }

    /// Tare everything: sensor offset, filter state, timer latch. A sensor
    /// that fails to tare is logged and the software baseline still resets.
    pub fn apply_tare(&mut self) {
        if let Err(e) = self.cell.tare() {
            tracing::warn!(error = %map_hw_error(&*e), "sensor tare failed");
        }
        self.pipeline.tare();
        self.timer.reset();
        self.last_units = 0.0;
    }

    /// Last raw units sample the loop saw (pre-pipeline).
    pub fn last_units(&self) -> f32 {
        self.last_units
    }

    /// Current filter output, before display conditioning.
    pub fn filtered(&self) -> f32 {
        self.pipeline.filtered()
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    // ── Private ──────────────────────────────────────────────────────────────

    fn tare_requested(&self) -> bool {
        self.tare_input.as_ref().is_some_and(|check| check())
    }

    /// Debounced tare input poll: confirm after a short delay, apply, then
    /// wait for release so one press produces one tare.
    fn poll_tare(&mut self) {
        if !self.tare_requested() {
            return;
        }
        self.clock.sleep(self.debounce);
        if !self.tare_requested() {
            return;
        }
        tracing::info!("tare requested");
        self.apply_tare();
        self.beep(TARE_BEEP_MS);
        while self.tare_requested() {
            self.clock.sleep(self.debounce);
        }
    }

    /// Best-effort beep; a dead buzzer never takes the loop down.
    fn beep(&mut self, ms: u32) {
        if let Err(e) = self.buzzer.beep_ms(ms) {
            tracing::warn!(error = %e, "buzzer beep failed");
        }
    }
}

/// Tick period for a pacing config, clamped to at least 1 ms.
pub(crate) fn loop_period(pacing: &LoopCfg) -> Duration {
    tick_period(pacing.tick_ms)
}
