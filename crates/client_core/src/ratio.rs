/// Target ratio the calculator opens with.
pub const DEFAULT_TARGET_RATIO: f64 = 16.0;

/// Water needed for a dose at a target `1:ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioCalculator {
    pub ratio: f64,
    pub dose: f64,
}

impl RatioCalculator {
    pub fn new(ratio: f64, dose: f64) -> Self {
        Self { ratio, dose }
    }

    /// Parses raw inputs by their leading number, so `"18g"` reads as 18.
    /// Input without one, or with a non-finite one, counts as zero.
    pub fn from_inputs(ratio_raw: &str, dose_raw: &str) -> Self {
        Self::new(lenient(ratio_raw), lenient(dose_raw))
    }

    /// Opens the calculator seeded with a dose taken from the recipe form.
    pub fn seeded(dose_raw: &str) -> Self {
        Self::new(DEFAULT_TARGET_RATIO, lenient(dose_raw))
    }

    pub fn water(&self) -> f64 {
        (self.dose * self.ratio).round()
    }
}

fn lenient(raw: &str) -> f64 {
    let raw = raw.trim_start();
    raw.char_indices()
        .map(|(start, ch)| start + ch.len_utf8())
        .rev()
        .find_map(|end| raw[..end].parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}
