//! Day-over-day return series.

use crate::types::ValueSnapshot;
use crate::{Error, Result};

/// Build simple returns from an ordered series of portfolio values.
///
/// Produces one return per adjacent pair, so the output is one shorter than
/// the input. Fewer than two values yield an empty series.
///
/// # Errors
///
/// Returns `Error::InvalidValue` if a value is not finite, or if a value
/// that starts a pair is zero (the return would be undefined).
pub fn build_returns(values: &[f64]) -> Result<Vec<f64>> {
    if values.len() < 2 {
        tracing::debug!("Return series needs two values, got {}", values.len());
        return Ok(Vec::new());
    }

    ensure_finite(values)?;

    values
        .windows(2)
        .enumerate()
        .map(|(idx, pair)| {
            let (prev, curr) = (pair[0], pair[1]);
            if prev == 0.0 {
                return Err(Error::InvalidValue(format!(
                    "zero value at index {} leaves the next return undefined",
                    idx
                )));
            }
            Ok((curr - prev) / prev)
        })
        .collect()
}

/// Reject series containing NaN or infinite values.
pub fn ensure_finite(values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(Error::InvalidValue(format!(
            "value at index {} is not finite",
            idx
        ))),
        None => Ok(()),
    }
}

/// Extract snapshot values as `f64`, preserving order.
pub fn snapshot_values(snapshots: &[ValueSnapshot]) -> Result<Vec<f64>> {
    snapshots.iter().map(ValueSnapshot::value_f64).collect()
}
