// src/range/config.rs
use crate::math::{
    algorithms::{AggregatorConfig, BufferConfig, SmoothingConfig},
    error::{MathError, MathResult},
    point_distribution::CellRepresentative,
};
use serde::{Deserialize, Serialize};

/// Parameter eines Laufs. Alle Werte werden vor jeder Geometrieberechnung geprüft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    /// Zellgröße des Ausdünnungsgitters, 0 = nicht ausdünnen
    pub min_search_distance: f64,
    pub buffer_distance: f64,
    pub percentile: f64,
    pub modifier: f64,
    pub cell_representative: CellRepresentative,
    pub buffer: BufferConfig,
    pub smoothing: SmoothingConfig,
    pub aggregator: AggregatorConfig,
    /// Bezeichner des Koordinatensystems, wird unverändert ins Ergebnis übernommen
    pub spatial_reference: Option<String>,
    /// Zwischenergebnisse aller Stufen im Ergebnis behalten
    pub keep_intermediates: bool,
}

impl RangeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_search_distance(mut self, distance: f64) -> Self {
        self.min_search_distance = distance;
        self
    }

    pub fn with_buffer_distance(mut self, distance: f64) -> Self {
        self.buffer_distance = distance;
        self
    }

    pub fn with_percentile(mut self, percentile: f64) -> Self {
        self.percentile = percentile;
        self
    }

    pub fn with_modifier(mut self, modifier: f64) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn with_cell_representative(mut self, representative: CellRepresentative) -> Self {
        self.cell_representative = representative;
        self
    }

    pub fn with_smoothing(mut self, smoothing: SmoothingConfig) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn with_buffer(mut self, buffer: BufferConfig) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_aggregator(mut self, aggregator: AggregatorConfig) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn with_spatial_reference(mut self, spatial_reference: impl Into<String>) -> Self {
        self.spatial_reference = Some(spatial_reference.into());
        self
    }

    pub fn keep_intermediates(mut self, keep: bool) -> Self {
        self.keep_intermediates = keep;
        self
    }

    pub fn validate(&self) -> MathResult<()> {
        if !self.min_search_distance.is_finite() || self.min_search_distance < 0.0 {
            return Err(MathError::invalid(
                "min_search_distance",
                format!("must be a finite value >= 0, got {}", self.min_search_distance),
            ));
        }

        if !self.buffer_distance.is_finite() || self.buffer_distance < 0.0 {
            return Err(MathError::invalid(
                "buffer_distance",
                format!("must be a finite value >= 0, got {}", self.buffer_distance),
            ));
        }

        if !(0.0..=100.0).contains(&self.percentile) {
            return Err(MathError::invalid(
                "percentile",
                format!("must lie within [0, 100], got {}", self.percentile),
            ));
        }

        if !self.modifier.is_finite() || self.modifier < 0.0 {
            return Err(MathError::invalid(
                "modifier",
                format!("must be a finite value >= 0, got {}", self.modifier),
            ));
        }

        self.buffer.validate()?;
        self.smoothing.validate()?;
        self.aggregator.validate()
    }
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            min_search_distance: 0.0,
            buffer_distance: 0.0,
            percentile: 90.0,
            modifier: 1.0,
            cell_representative: CellRepresentative::default(),
            buffer: BufferConfig::default(),
            smoothing: SmoothingConfig::default(),
            aggregator: AggregatorConfig::default(),
            spatial_reference: None,
            keep_intermediates: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RangeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.percentile, 90.0);
        assert_eq!(config.modifier, 1.0);
    }

    #[test]
    fn test_invalid_values_are_named() {
        let cases = [
            (RangeConfig::new().with_percentile(120.0), "percentile"),
            (RangeConfig::new().with_percentile(f64::NAN), "percentile"),
            (RangeConfig::new().with_buffer_distance(-2.0), "buffer_distance"),
            (RangeConfig::new().with_min_search_distance(f64::INFINITY), "min_search_distance"),
            (RangeConfig::new().with_modifier(-0.5), "modifier"),
            (
                RangeConfig::new().with_buffer(BufferConfig::new().with_arc_segments(2)),
                "arc_segments",
            ),
            (
                RangeConfig::new().with_smoothing(SmoothingConfig::new().with_tolerance(-1.0)),
                "smoothing_tolerance",
            ),
        ];
        for (config, expected) in cases {
            match config.validate() {
                Err(MathError::InvalidParameter { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected InvalidParameter for {}, got {:?}", expected, other),
            }
        }
    }
}
