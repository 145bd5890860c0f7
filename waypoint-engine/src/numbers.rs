//! Numeric conversion and formatting helpers centralizing lossy casts.

use num_traits::cast::cast;

/// Convert a count to f64, allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Milliseconds to seconds.
#[must_use]
pub fn ms_to_seconds(ms: f64) -> f64 {
    ms / 1000.0
}

/// Render a millisecond duration as seconds with three decimals, e.g. `4.900s`.
#[must_use]
pub fn format_seconds(ms: f64) -> String {
    let seconds = if ms.is_finite() { ms_to_seconds(ms) } else { 0.0 };
    format!("{seconds:.3}s")
}

/// Share of `part` in `whole` as a 0..=100 percentage; 0 when `whole` is not positive.
#[must_use]
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole.is_nan() || whole <= 0.0 || !part.is_finite() {
        return 0.0;
    }
    ((part / whole) * 100.0).clamp(0.0, 100.0)
}
