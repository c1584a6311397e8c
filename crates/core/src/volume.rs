//! Participant volume parsing
//!
//! Raw volumes arrive from form fields and JSON payloads. Two entry points:
//! `parse_volume` for callers that must reject bad input, and the clamping
//! helpers for live previews that must never fail.

use crate::error::{Error, Result, VolumeProblem};

/// Parse a participant count from user-entered text.
///
/// Accepts surrounding whitespace and `,`/`_` digit separators
/// (`"1,000"`). Whole-valued decimals such as `"250.0"` are accepted.
pub fn parse_volume(raw: &str) -> Result<u64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    let reject = |reason| Error::InvalidVolume {
        input: raw.to_string(),
        reason,
    };

    if cleaned.is_empty() {
        return Err(reject(VolumeProblem::Empty));
    }

    if let Ok(whole) = cleaned.parse::<u64>() {
        return Ok(whole);
    }

    let value: f64 = cleaned
        .parse()
        .map_err(|_| reject(VolumeProblem::NotANumber))?;

    if !value.is_finite() {
        return Err(reject(VolumeProblem::NotFinite));
    }
    if value < 0.0 {
        return Err(reject(VolumeProblem::Negative));
    }
    if value.fract() != 0.0 {
        return Err(reject(VolumeProblem::NotWhole));
    }

    Ok(value as u64)
}

/// Clamp a numeric volume to a usable participant count.
///
/// Negative, NaN and infinite values become 0; fractions are floored.
pub fn sanitize_volume(raw: f64) -> u64 {
    if !raw.is_finite() || raw < 0.0 {
        tracing::warn!(raw, "Clamping malformed volume to 0");
        return 0;
    }
    raw.floor() as u64
}

/// Parse for live previews: any rejected input is logged and treated as 0.
pub fn volume_or_zero(raw: &str) -> u64 {
    match parse_volume(raw) {
        Ok(volume) => volume,
        Err(Error::InvalidVolume {
            reason: VolumeProblem::NotWhole,
            ..
        }) => raw
            .trim()
            .replace([',', '_'], "")
            .parse::<f64>()
            .map(sanitize_volume)
            .unwrap_or(0),
        Err(e) => {
            tracing::warn!("{}, using 0", e);
            0
        }
    }
}
