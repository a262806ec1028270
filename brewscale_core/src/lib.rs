#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core scale logic (hardware-agnostic).
//!
//! This crate provides the hardware-independent controller for a brew scale.
//! All hardware interactions go through the `brewscale_traits::LoadCell`,
//! `DisplaySink`, and `Buzzer` traits.
//!
//! ## Architecture
//!
//! - **Filtering**: Adaptive EMA with magnitude bands (`filter` module)
//! - **Display conditioning**: Hysteresis gate, zero clamp, quantizer
//!   (`display` module), chained in `pipeline`
//! - **Timing**: Flow-gated brew timer (`timer` module)
//! - **Control**: The polling tick loop (`engine` module)
//! - **Construction**: Type-state builder and generic constructor (`builder`)

pub mod builder;
pub mod config;
pub mod conversions;
pub mod display;
pub mod engine;
pub mod error;
pub mod filter;
pub mod hw_error;
pub mod mocks;
pub mod pipeline;
pub mod timer;
pub mod util;

pub use brewscale_traits::Frame;

pub use builder::{Scale, ScaleBuilder, ScaleG, build_scale};
pub use config::{DisplayCfg, FilterCfg, LoopCfg, TimerCfg};
pub use display::{HysteresisGate, quantize, zero_clamp};
pub use engine::{BOOT_BEEP_MS, READY_BEEP_MS, ScaleCore, TARE_BEEP_MS};
pub use error::{BuildError, Result, ScaleError};
pub use filter::AdaptiveFilter;
pub use pipeline::WeightPipeline;
pub use timer::{BrewTimer, TimerState};
