use typetest::time_series::TimeSeriesPoint;

/// X (seconds) and Y (wpm) bounds for the results chart, covering both the
/// net and raw series.
pub fn compute_chart_params(samples: &[TimeSeriesPoint], fallback_secs: Option<u32>) -> (f64, f64) {
    let highest_wpm = samples
        .iter()
        .map(|p| p.wpm.max(p.raw))
        .fold(0.0_f64, f64::max);

    let overall_duration = samples
        .last()
        .map(|p| p.t)
        .or(fallback_secs.map(f64::from))
        .unwrap_or(1.0)
        .max(1.0);

    (overall_duration, highest_wpm.round())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
