use serde::{Deserialize, Serialize};

use crate::board_metrics::BoardMetrics;

/// Coefficients of the linear heuristic, one per [`BoardMetrics`] field.
///
/// Missing fields deserialize to the [`Self::RECOMMENDED`] value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicWeights {
    pub height: f32,
    pub lines: f32,
    pub holes: f32,
    pub bumpiness: f32,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self::RECOMMENDED
    }
}

impl HeuristicWeights {
    /// Weights tuned by a genetic search for the 20×10 game.
    pub const RECOMMENDED: Self = Self {
        height: -0.510_066,
        lines: 0.760_666,
        holes: -0.356_63,
        bumpiness: -0.184_483,
    };

    /// Weighted sum of the metrics.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn apply(&self, metrics: &BoardMetrics) -> f32 {
        self.height * metrics.aggregate_height as f32
            + self.lines * metrics.complete_lines as f32
            + self.holes * metrics.holes as f32
            + self.bumpiness * metrics.bumpiness as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_is_linear() {
        let weights = HeuristicWeights {
            height: -1.0,
            lines: 10.0,
            holes: -2.0,
            bumpiness: -0.5,
        };
        let metrics = BoardMetrics {
            aggregate_height: 12,
            complete_lines: 1,
            holes: 3,
            bumpiness: 4,
        };
        assert!((weights.apply(&metrics) - (-12.0 + 10.0 - 6.0 - 2.0)).abs() < 1e-6);
        assert!(weights.apply(&BoardMetrics::default()).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_json_falls_back_to_recommended() {
        let weights: HeuristicWeights = serde_json::from_str(r#"{"holes": -1.5}"#).unwrap();
        assert!((weights.holes + 1.5).abs() < f32::EPSILON);
        assert!((weights.height - HeuristicWeights::RECOMMENDED.height).abs() < f32::EPSILON);
        assert!((weights.lines - HeuristicWeights::RECOMMENDED.lines).abs() < f32::EPSILON);
    }
}
