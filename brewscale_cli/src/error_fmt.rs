//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes and
/// fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use brewscale_core::error::{BuildError, ScaleError};

    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingLoadCell => {
                "What happened: No load cell was provided to the scale engine.\nLikely causes: HX711 failed to initialize or was not wired into the builder.\nHow to fix: Ensure the load cell is created successfully and passed via with_load_cell(...).".to_string()
            }
            BuildError::MissingDisplay => {
                "What happened: No display was provided to the scale engine.\nLikely causes: Display init failed or was not wired into the builder.\nHow to fix: Ensure the display is created successfully and passed via with_display(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See README for a sample."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<ScaleError>() {
        return match se {
            ScaleError::Timeout => {
                "What happened: Load cell read timed out.\nLikely causes: HX711 not wired correctly, no power/ground, or timeout too low.\nHow to fix: Verify DT/SCK pins and power, and consider increasing loop.sensor_timeout_ms in the config.".to_string()
            }
            ScaleError::Display(msg) => format!(
                "What happened: Display fault ({msg}).\nLikely causes: Display disconnected or bus failure.\nHow to fix: Check the display wiring, then power-cycle the scale."
            ),
            other => format!(
                "What happened: Hardware problem ({other}).\nHow to fix: Check wiring and power, re-run with --log-level=debug for details."
            ),
        };
    }

    // Generic fallback with the closest cause we can find
    let msg = format!("{err}");
    let mut cause = String::new();
    if let Some(src) = err.chain().nth(1) {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: display faults 3, sensor timeouts 4, everything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    use brewscale_core::error::ScaleError;
    match err.downcast_ref::<ScaleError>() {
        Some(ScaleError::Display(_)) => 3,
        Some(ScaleError::Timeout) => 4,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "ok": false,
        "error": humanize(err),
        "detail": format!("{err:#}"),
        "exit_code": exit_code_for_error(err),
    })
    .to_string()
}
