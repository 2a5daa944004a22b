//! Isosurface level generation.

use sidecar_common::{SidecarError, SidecarResult};

/// Most levels a single range may produce.
pub const MAX_LEVELS: usize = 10_000;

/// Evenly spaced levels from `lowest` to `highest`, both included.
///
/// The last level is `highest` only when it lies on the step; levels never
/// exceed `highest`.
///
/// ```
/// use sidecar_metadata::levels::inclusive_range;
///
/// let levels = inclusive_range(280.0, 300.0, 5.0).unwrap();
/// assert_eq!(levels, vec![280.0, 285.0, 290.0, 295.0, 300.0]);
/// ```
pub fn inclusive_range(lowest: f64, highest: f64, step: f64) -> SidecarResult<Vec<f64>> {
    if !(lowest.is_finite() && highest.is_finite() && step.is_finite()) {
        return Err(SidecarError::invalid_parameter(
            "levels",
            "bounds and step must be finite",
        ));
    }
    if step <= 0.0 {
        return Err(SidecarError::invalid_parameter(
            "step",
            format!("must be positive, got {}", step),
        ));
    }
    if lowest > highest {
        return Err(SidecarError::invalid_parameter(
            "levels",
            format!("lowest level {} is above highest level {}", lowest, highest),
        ));
    }

    let last = ((highest - lowest) / step + 1e-9).floor();
    if !(last < MAX_LEVELS as f64) {
        return Err(SidecarError::invalid_parameter(
            "step",
            format!(
                "{} from {} to {} gives more than {} levels",
                step, lowest, highest, MAX_LEVELS
            ),
        ));
    }
    let count = last as usize + 1;
    // Multiply rather than accumulate so float error does not build up
    Ok((0..count).map(|i| lowest + i as f64 * step).collect())
}
