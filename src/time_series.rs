/// One per-second sample of the live scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub wpm: f64,
    pub raw: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, wpm: f64, raw: f64) -> Self {
        Self { t, wpm, raw }
    }

    pub fn wpm_coord(&self) -> (f64, f64) {
        (self.t, self.wpm)
    }

    pub fn raw_coord(&self) -> (f64, f64) {
        (self.t, self.raw)
    }
}

/// Population standard deviation of the net wpm samples; 0 for fewer than two.
pub fn consistency(samples: &[TimeSeriesPoint]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }

    let count = samples.len() as f64;
    let mean = samples.iter().map(|p| p.wpm).sum::<f64>() / count;
    let variance = samples
        .iter()
        .map(|p| {
            let diff = p.wpm - mean;
            diff * diff
        })
        .sum::<f64>()
        / count;

    variance.sqrt()
}
