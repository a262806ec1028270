//! Collaborator assembly and the run/self-check commands.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use brewscale_config::Config;
use brewscale_core::error::Result;
use brewscale_core::{Scale, ScaleError};
use brewscale_hardware::{ConsoleBuzzer, ConsoleDisplay, SimulatedLoadCell};
use brewscale_traits::Frame;

/// Scripted session for --sim: cup placed, a steady pour, then a tail long
/// enough for the timer to stop on its own.
fn sim_cell() -> SimulatedLoadCell {
    SimulatedLoadCell::pour(18.0, 0.3, 60, 60)
}

fn assemble(cfg: &Config, sim: bool) -> Result<Scale> {
    let filter: brewscale_core::FilterCfg = (&cfg.filter).into();
    let conditioning: brewscale_core::DisplayCfg = (&cfg.display).into();
    let timer: brewscale_core::TimerCfg = (&cfg.timer).into();
    let pacing: brewscale_core::LoopCfg = (&cfg.pacing).into();

    if sim {
        return Scale::builder()
            .with_load_cell(sim_cell())
            .with_display(ConsoleDisplay::new())
            .with_buzzer(ConsoleBuzzer)
            .with_filter(filter)
            .with_conditioning(conditioning)
            .with_timer(timer)
            .with_pacing(pacing)
            .build();
    }

    #[cfg(feature = "hardware")]
    {
        let cell = brewscale_hardware::HardwareLoadCell::new(
            cfg.pins.hx711_dt,
            cfg.pins.hx711_sck,
            cfg.calibration.scale_factor,
            Duration::from_millis(cfg.pacing.sensor_timeout_ms),
        )
        .map_err(|e| eyre::Report::new(ScaleError::HardwareFault(e.to_string())))?;

        let mut builder = Scale::builder()
            .with_load_cell(cell)
            .with_display(ConsoleDisplay::new())
            .with_filter(filter)
            .with_conditioning(conditioning)
            .with_timer(timer)
            .with_pacing(pacing);

        builder = match cfg.pins.buzzer {
            Some(pin) => match brewscale_hardware::GpioBuzzer::new(pin) {
                Ok(b) => builder.with_buzzer(b),
                Err(e) => {
                    tracing::warn!(error = %e, pin, "buzzer init failed; using console buzzer");
                    builder.with_buzzer(ConsoleBuzzer)
                }
            },
            None => builder.with_buzzer(ConsoleBuzzer),
        };

        if let Some(pin) = cfg.pins.tare_button {
            // Button to ground with the internal pull-up, so pressed = low.
            match brewscale_hardware::make_tare_button_checker(pin, true) {
                Ok(check) => {
                    tracing::info!(pin, "tare button enabled");
                    builder = builder.with_tare_input(move || check());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to init tare button; continuing without it");
                }
            }
        }

        builder.build()
    }
    #[cfg(not(feature = "hardware"))]
    {
        eyre::bail!("built without the `hardware` feature; use --sim")
    }
}

/// Run the control loop until Ctrl-C or the optional tick cap.
///
/// A display fault is fail-stop for the device: log it, then park until the
/// operator interrupts, so a headless unit does not busy-restart against a
/// dead panel.
pub fn run(cfg: &Config, sim: bool, ticks: Option<u64>) -> Result<()> {
    let mut scale = assemble(cfg, sim)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| eyre::eyre!("failed to install ctrl-c handler: {e}"))?;

    match scale.run(&shutdown, ticks) {
        Err(err) if is_display_fault(&err) => {
            tracing::error!(error = %err, "display fault; halting until interrupt");
            while !shutdown.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(err)
        }
        other => other,
    }
}

/// Construct the collaborators, boot, take one frame.
pub fn self_check(cfg: &Config, sim: bool) -> Result<Frame> {
    let mut scale = assemble(cfg, sim)?;
    scale.start()?;
    let frame = scale.tick()?;
    tracing::info!(raw = frame.raw, units = frame.units, "self-check passed");
    Ok(frame)
}

fn is_display_fault(err: &eyre::Report) -> bool {
    matches!(err.downcast_ref::<ScaleError>(), Some(ScaleError::Display(_)))
}
