//! Rounding and formatting helpers for presenting metrics. Aggregation keeps
//! full precision; these are applied only when values leave the pipeline.

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

pub fn round4(value: f64) -> f64 {
    round_to(value, 4)
}

pub fn round3(value: f64) -> f64 {
    round_to(value, 3)
}

/// Table cells: four decimals, em dash for non-finite values.
pub fn format_metric(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.4}")
    } else {
        "—".to_string()
    }
}

/// Bar annotations.
pub fn format_bar_value(value: f64) -> String {
    format!("{value:.2}")
}
