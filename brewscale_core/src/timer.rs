//! Flow-gated brew timer: starts on a weight threshold, stops after
//! sustained flow stasis.

use crate::config::TimerCfg;
use crate::util::ms_to_secs_f32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
}

/// Elapsed-time state machine driven once per tick by the stable weight.
///
/// The `armed` latch is the one-shot guard: once a brew ends, the timer
/// holds its final reading and will not restart until a tare re-arms it.
#[derive(Debug, Clone)]
pub struct BrewTimer {
    cfg: TimerCfg,
    state: TimerState,
    armed: bool,
    start_ms: u64,
    /// Final elapsed seconds, held after the timer stops.
    held_s: f32,
    /// Wall-clock timestamp of the first stalled tick, while flow is stalled.
    stall_since_ms: Option<u64>,
    /// Previous tick's stable weight; updated unconditionally every tick.
    prev_g: f32,
}

impl BrewTimer {
    pub fn new(cfg: TimerCfg) -> Self {
        Self {
            cfg,
            state: TimerState::Idle,
            armed: true,
            start_ms: 0,
            held_s: 0.0,
            stall_since_ms: None,
            prev_g: 0.0,
        }
    }

    /// Advance the state machine one tick. `now_ms` is monotonic wall-clock
    /// time, so elapsed time is immune to tick cadence jitter.
    pub fn update(&mut self, stable_g: f32, now_ms: u64) {
        match self.state {
            TimerState::Idle => {
                if self.armed && stable_g > self.cfg.start_g {
                    self.state = TimerState::Running;
                    self.start_ms = now_ms;
                    self.stall_since_ms = None;
                    tracing::debug!(stable_g, "brew timer started");
                }
            }
            TimerState::Running => {
                let delta = stable_g - self.prev_g;
                // A negative delta is below min_flow_g too: removing weight
                // ends the brew just like a plateau does.
                if delta < self.cfg.min_flow_g {
                    let since = *self.stall_since_ms.get_or_insert(now_ms);
                    if now_ms.saturating_sub(since) >= self.cfg.min_flow_ms {
                        self.held_s = ms_to_secs_f32(now_ms.saturating_sub(self.start_ms));
                        self.state = TimerState::Idle;
                        self.armed = false;
                        self.stall_since_ms = None;
                        tracing::debug!(held_s = self.held_s, "brew timer stopped");
                    }
                } else {
                    self.stall_since_ms = None;
                }
            }
        }
        self.prev_g = stable_g;
    }

    /// Elapsed seconds to display: live while running, the held final value
    /// after a stop, zero when armed and idle.
    pub fn elapsed_secs(&self, now_ms: u64) -> f32 {
        match self.state {
            TimerState::Running => ms_to_secs_f32(now_ms.saturating_sub(self.start_ms)),
            TimerState::Idle if !self.armed => self.held_s,
            TimerState::Idle => 0.0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Tare semantics: back to idle, latch re-armed, elapsed and stall
    /// tracking cleared.
    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.armed = true;
        self.start_ms = 0;
        self.held_s = 0.0;
        self.stall_since_ms = None;
        self.prev_g = 0.0;
    }
}
