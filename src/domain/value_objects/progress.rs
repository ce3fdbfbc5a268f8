//! Progress value object
//!
//! Stored as the raw percentage so that recomputing it from the same
//! milestone set always yields the same value. Rounding only happens when
//! it is displayed.

use serde::{Deserialize, Serialize};

/// Completion percentage in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progress(f64);

impl Progress {
    pub const ZERO: Progress = Progress(0.0);
    pub const COMPLETE: Progress = Progress(100.0);

    /// Clamp into `[0, 100]`; NaN collapses to zero
    pub fn new(percent: f64) -> Self {
        if percent.is_nan() {
            return Self::ZERO;
        }
        Self(percent.clamp(0.0, 100.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Nearest whole percent, for presentation
    pub fn rounded(self) -> u8 {
        self.0.round() as u8
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.rounded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_out_of_range_values() {
        assert_eq!(Progress::new(-5.0), Progress::ZERO);
        assert_eq!(Progress::new(140.0), Progress::COMPLETE);
        assert_eq!(Progress::new(f64::NAN), Progress::ZERO);
    }

    #[test]
    fn rounded_uses_nearest_integer() {
        assert_eq!(Progress::new(100.0 / 3.0).rounded(), 33);
        assert_eq!(Progress::new(200.0 / 3.0).rounded(), 67);
        assert_eq!(Progress::new(12.5).rounded(), 13);
    }

    #[test]
    fn display_shows_rounded_percent() {
        assert_eq!(Progress::new(100.0 / 3.0).to_string(), "33%");
    }
}
