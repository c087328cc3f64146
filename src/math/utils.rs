// src/math/utils.rs

/// Mathematische Konstanten
pub mod constants {
    pub const EPSILON: f64 = 1e-9;
    pub const EPSILON_SQUARED: f64 = EPSILON * EPSILON; // Für Vergleiche mit Längen
    pub const TAU: f64 = std::f64::consts::TAU;
}

/// Statistische Hilfsfunktionen
pub mod statistics {
    /// Percentile with linear interpolation between order statistics
    /// (the "linear" method: rank = p / 100 * (n - 1)).
    ///
    /// Returns `None` for an empty slice or a percentile outside [0, 100].
    pub fn percentile_linear(values: &[f64], percentile: f64) -> Option<f64> {
        if values.is_empty() || !(0.0..=100.0).contains(&percentile) {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let rank = percentile / 100.0 * (sorted.len() - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        let fraction = rank - lower as f64;

        Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
    }
}
