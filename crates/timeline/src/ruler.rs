use crate::Seconds;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulerTick {
    pub second: u32,
    pub major: bool,
    pub label: Option<String>,
}

/// Longest span the ruler draws ticks for (one day).
pub const MAX_RULER_SECONDS: u32 = 86_400;

/// One tick per second up to `ceil(total) + 5`; every fifth tick is labelled.
/// Totals beyond [`MAX_RULER_SECONDS`] (or non-finite ones) are clamped.
pub fn time_ruler(total_duration: Seconds) -> Vec<RulerTick> {
    let span = total_duration.max(0.0).min(MAX_RULER_SECONDS as f64).ceil() as u32;
    let count = span.saturating_add(5);
    (0..count)
        .map(|second| {
            let major = second % 5 == 0;
            RulerTick {
                second,
                major,
                label: major.then(|| format!("{second}s")),
            }
        })
        .collect()
}

/// Transport readout, e.g. `"3.50s / 12.00s"`.
pub fn format_clock(current: Seconds, total: Seconds) -> String {
    format!("{current:.2}s / {total:.2}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ruler_has_headroom_and_major_ticks() {
        let ticks = time_ruler(7.2);
        assert_eq!(ticks.len(), 13);
        assert_eq!(ticks[0].label.as_deref(), Some("0s"));
        assert_eq!(ticks[5].label.as_deref(), Some("5s"));
        assert!(ticks[3].label.is_none());
        assert!(!ticks[3].major);
    }

    #[test]
    fn huge_or_non_finite_totals_are_clamped() {
        let ticks = time_ruler(5e9);
        assert_eq!(ticks.len(), MAX_RULER_SECONDS as usize + 5);
        assert_eq!(ticks.last().map(|t| t.second), Some(MAX_RULER_SECONDS + 4));
        assert_eq!(time_ruler(f64::INFINITY).len(), MAX_RULER_SECONDS as usize + 5);
        assert_eq!(time_ruler(f64::NAN).len(), 5);
        assert_eq!(time_ruler(-3.0).len(), 5);
    }

    #[test]
    fn clock_uses_two_decimals() {
        assert_eq!(format_clock(3.5, 12.0), "3.50s / 12.00s");
    }
}
