//! Type-state builder for `Scale` and generic `build_scale` constructor.
//!
//! The builder enforces at compile time that a load cell and a display are
//! provided before `build()` is available. `try_build()` is always available
//! for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use brewscale_traits::clock::{Clock, MonotonicClock};
use brewscale_traits::{Buzzer, DisplaySink, Frame, LoadCell};

use crate::config::{DisplayCfg, FilterCfg, LoopCfg, TimerCfg};
use crate::engine::{ScaleCore, loop_period};
use crate::error::{BuildError, Result};
use crate::mocks::NullBuzzer;
use crate::pipeline::WeightPipeline;
use crate::timer::BrewTimer;

// ── Public dynamic-dispatch wrapper ──────────────────────────────────────────

/// Public dynamic (boxed) scale that preserves the trait-object API via
/// composition.
pub struct Scale {
    pub(crate) inner:
        ScaleCore<Box<dyn LoadCell>, Box<dyn DisplaySink>, Box<dyn Buzzer>>,
}

impl core::fmt::Debug for Scale {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scale")
            .field("last_units", &self.inner.last_units)
            .field("timer_running", &self.inner.timer.is_running())
            .finish()
    }
}

impl Scale {
    /// Start building a Scale.
    pub fn builder() -> ScaleBuilder<Missing, Missing> {
        ScaleBuilder::default()
    }

    /// Boot sequence: splash, beeps, initial tare.
    pub fn start(&mut self) -> Result<()> {
        self.inner.start()
    }

    /// One iteration of the control loop.
    pub fn tick(&mut self) -> Result<Frame> {
        self.inner.tick()
    }

    /// Run until shutdown or the optional tick cap.
    pub fn run(
        &mut self,
        shutdown: &std::sync::atomic::AtomicBool,
        max_ticks: Option<u64>,
    ) -> Result<()> {
        self.inner.run(shutdown, max_ticks)
    }

    /// Tare the sensor and reset filter and timer state.
    pub fn apply_tare(&mut self) {
        self.inner.apply_tare();
    }

    /// Last raw units sample (pre-pipeline).
    pub fn last_units(&self) -> f32 {
        self.inner.last_units()
    }

    /// Current filter output, before display conditioning.
    pub fn filtered(&self) -> f32 {
        self.inner.filtered()
    }

    pub fn timer_running(&self) -> bool {
        self.inner.timer_running()
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Scale`. All config is validated on `build()`.
pub struct ScaleBuilder<C, D> {
    cell: Option<Box<dyn LoadCell>>,
    display: Option<Box<dyn DisplaySink>>,
    buzzer: Option<Box<dyn Buzzer>>,
    filter: Option<FilterCfg>,
    conditioning: Option<DisplayCfg>,
    timer: Option<TimerCfg>,
    pacing: Option<LoopCfg>,
    tare_input: Option<Box<dyn Fn() -> bool>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _c: PhantomData<C>,
    _d: PhantomData<D>,
}

impl Default for ScaleBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            cell: None,
            display: None,
            buzzer: None,
            filter: None,
            conditioning: None,
            timer: None,
            pacing: None,
            tare_input: None,
            clock: None,
            _c: PhantomData,
            _d: PhantomData,
        }
    }
}

/// Validate configuration and construct a `ScaleCore`.
///
/// This is the single source of truth for validation and construction,
/// used by both `ScaleBuilder::try_build()` and `build_scale()`.
fn validate_and_build<C: LoadCell, D: DisplaySink, B: Buzzer>(
    cell: C,
    display: D,
    buzzer: B,
    filter: FilterCfg,
    conditioning: DisplayCfg,
    timer: TimerCfg,
    pacing: LoopCfg,
    tare_input: Option<Box<dyn Fn() -> bool>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<ScaleCore<C, D, B>> {
    // ── Validation ───────────────────────────────────────────────────────────
    if !(filter.snap_g > filter.fast_g && filter.fast_g > filter.medium_g && filter.medium_g > 0.0)
    {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "filter bands must satisfy snap_g > fast_g > medium_g > 0",
        )));
    }
    for alpha in [filter.fast_alpha, filter.medium_alpha, filter.settle_alpha] {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "filter alphas must be in (0, 1]",
            )));
        }
    }
    if conditioning.hysteresis_g.is_sign_negative() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "hysteresis_g must be >= 0",
        )));
    }
    if conditioning.zero_band_neg_g.is_sign_negative()
        || conditioning.zero_band_pos_g.is_sign_negative()
    {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "zero clamp bands must be >= 0",
        )));
    }
    if !(conditioning.resolution_g > 0.0) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "resolution_g must be > 0",
        )));
    }
    if !(timer.start_g > 0.0) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "timer start_g must be > 0",
        )));
    }
    if !(timer.min_flow_g > 0.0) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "timer min_flow_g must be > 0",
        )));
    }
    if timer.min_flow_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "timer min_flow_ms must be >= 1",
        )));
    }
    if pacing.tick_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "tick_ms must be >= 1",
        )));
    }
    if pacing.sample_average == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "sample_average must be >= 1",
        )));
    }

    // ── Construct ────────────────────────────────────────────────────────────
    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };
    let epoch = clock.now();
    let period = loop_period(&pacing);
    let debounce = Duration::from_millis(pacing.debounce_ms.max(1));

    Ok(ScaleCore {
        cell,
        display,
        buzzer,
        pipeline: WeightPipeline::new(filter, conditioning),
        timer: BrewTimer::new(timer),
        pacing,
        tare_input,
        clock,
        epoch,
        last_raw: 0,
        last_units: 0.0,
        period,
        debounce,
    })
}

impl<C, D> ScaleBuilder<C, D> {
    /// Fallible build available in any type-state; returns a detailed error
    /// for missing pieces.
    pub fn try_build(self) -> Result<Scale> {
        let cell = self
            .cell
            .ok_or_else(|| eyre::Report::new(BuildError::MissingLoadCell))?;
        let display = self
            .display
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDisplay))?;
        let buzzer = self
            .buzzer
            .unwrap_or_else(|| Box::new(NullBuzzer) as Box<dyn Buzzer>);

        let inner = validate_and_build(
            cell,
            display,
            buzzer,
            self.filter.unwrap_or_default(),
            self.conditioning.unwrap_or_default(),
            self.timer.unwrap_or_default(),
            self.pacing.unwrap_or_default(),
            self.tare_input,
            self.clock,
        )?;

        Ok(Scale { inner })
    }
}

/// Chainable setters that do not affect type-state.
impl<C, D> ScaleBuilder<C, D> {
    pub fn with_buzzer(mut self, buzzer: impl Buzzer + 'static) -> Self {
        self.buzzer = Some(Box::new(buzzer));
        self
    }
    pub fn with_filter(mut self, filter: FilterCfg) -> Self {
        self.filter = Some(filter);
        self
    }
    pub fn with_conditioning(mut self, conditioning: DisplayCfg) -> Self {
        self.conditioning = Some(conditioning);
        self
    }
    pub fn with_timer(mut self, timer: TimerCfg) -> Self {
        self.timer = Some(timer);
        self
    }
    pub fn with_pacing(mut self, pacing: LoopCfg) -> Self {
        self.pacing = Some(pacing);
        self
    }
    /// Polled once per tick; a true reading (after debounce) tares the scale.
    pub fn with_tare_input<F>(mut self, f: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.tare_input = Some(Box::new(f));
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock`
    /// when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<D> ScaleBuilder<Missing, D> {
    pub fn with_load_cell(self, cell: impl LoadCell + 'static) -> ScaleBuilder<Set, D> {
        ScaleBuilder {
            cell: Some(Box::new(cell)),
            display: self.display,
            buzzer: self.buzzer,
            filter: self.filter,
            conditioning: self.conditioning,
            timer: self.timer,
            pacing: self.pacing,
            tare_input: self.tare_input,
            clock: self.clock,
            _c: PhantomData,
            _d: PhantomData,
        }
    }
}

impl<C> ScaleBuilder<C, Missing> {
    pub fn with_display(self, display: impl DisplaySink + 'static) -> ScaleBuilder<C, Set> {
        ScaleBuilder {
            cell: self.cell,
            display: Some(Box::new(display)),
            buzzer: self.buzzer,
            filter: self.filter,
            conditioning: self.conditioning,
            timer: self.timer,
            pacing: self.pacing,
            tare_input: self.tare_input,
            clock: self.clock,
            _c: PhantomData,
            _d: PhantomData,
        }
    }
}

impl ScaleBuilder<Set, Set> {
    /// Validate and build the Scale. Only available when both the load cell
    /// and the display are set.
    pub fn build(self) -> Result<Scale> {
        self.try_build()
    }
}

/// Generic, statically-dispatched alias using the unified core.
pub type ScaleG<C, D, B> = ScaleCore<C, D, B>;

/// Build a generic, statically-dispatched `ScaleG` from concrete parts.
///
/// Delegates to the shared `validate_and_build`, so validation logic is not
/// duplicated.
#[allow(clippy::too_many_arguments)]
pub fn build_scale<C, D, B>(
    cell: C,
    display: D,
    buzzer: B,
    filter: Option<FilterCfg>,
    conditioning: Option<DisplayCfg>,
    timer: Option<TimerCfg>,
    pacing: Option<LoopCfg>,
    tare_input: Option<Box<dyn Fn() -> bool>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<ScaleG<C, D, B>>
where
    C: LoadCell + 'static,
    D: DisplaySink + 'static,
    B: Buzzer + 'static,
{
    validate_and_build(
        cell,
        display,
        buzzer,
        filter.unwrap_or_default(),
        conditioning.unwrap_or_default(),
        timer.unwrap_or_default(),
        pacing.unwrap_or_default(),
        tare_input,
        clock,
    )
}
