//! Maps `Box<dyn Error>` from trait boundaries to typed `ScaleError`.
//!
//! The traits in `brewscale_traits` use `Box<dyn Error + Send + Sync>` for
//! maximum flexibility; this module converts those to our typed error enum,
//! with an optional feature-gated path for `brewscale_hardware::HwError`
//! downcasting.

use crate::error::ScaleError;

/// Map a trait-boundary error to a typed `ScaleError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> ScaleError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<brewscale_hardware::error::HwError>() {
            return match hw {
                brewscale_hardware::error::HwError::Timeout => ScaleError::Timeout,
                brewscale_hardware::error::HwError::DataReadyTimeout => ScaleError::Timeout,
                brewscale_hardware::error::HwError::Display(msg) => {
                    ScaleError::Display(msg.clone())
                }
                other => ScaleError::HardwareFault(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        ScaleError::Timeout
    } else {
        ScaleError::Hardware(s)
    }
}
