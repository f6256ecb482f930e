//! Job-level progress.
//!
//! Archive creation fills [0.0, 0.8], confirmations fill [0.8, 1.0]. Every
//! value handed out is at least the previous one.

/// Share of the progress bar taken by archive creation.
pub const ARCHIVE_WEIGHT: f64 = 0.8;

/// Share of the progress bar taken by confirmations.
pub const CONFIRM_WEIGHT: f64 = 1.0 - ARCHIVE_WEIGHT;

/// Folds phase-local progress into one non-decreasing value.
#[derive(Debug, Clone, Default)]
pub struct ProgressAggregator {
    current: f64,
}

impl ProgressAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value handed out.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Archive producer reported `fraction` of its work done.
    ///
    /// Out-of-range fractions are clamped; NaN leaves progress unchanged.
    pub fn archive(&mut self, fraction: f64) -> f64 {
        if fraction.is_nan() {
            return self.current;
        }
        self.advance(ARCHIVE_WEIGHT * fraction.clamp(0.0, 1.0))
    }

    /// `resolved` of `total` confirmations have come back.
    pub fn confirmations(&mut self, resolved: usize, total: usize) -> f64 {
        if resolved >= total {
            return self.finish();
        }
        let ratio = resolved as f64 / total as f64;
        self.advance(ARCHIVE_WEIGHT + CONFIRM_WEIGHT * ratio)
    }

    /// Jumps to 1.0.
    pub fn finish(&mut self) -> f64 {
        self.advance(1.0)
    }

    fn advance(&mut self, value: f64) -> f64 {
        if value > self.current {
            self.current = value.min(1.0);
        }
        self.current
    }
}
