use serde::Serialize;

/// Per-request dimension weights; always sum to 1.0 after `normalize`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    pub content: f64,
    pub popularity: f64,
    pub style: f64,
    pub functional: f64,
    pub price: f64,
    pub collaborative: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            content: 0.40,
            popularity: 0.10,
            style: 0.20,
            functional: 0.20,
            price: 0.10,
            collaborative: 0.0,
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.content + self.popularity + self.style + self.functional + self.price + self.collaborative
    }

    fn values_mut(&mut self) -> [&mut f64; 6] {
        [
            &mut self.content,
            &mut self.popularity,
            &mut self.style,
            &mut self.functional,
            &mut self.price,
            &mut self.collaborative,
        ]
    }

    /// Floors negatives at zero, then rescales so the weights sum to 1.0
    fn normalize(&mut self) {
        for weight in self.values_mut() {
            *weight = weight.max(0.0);
        }
        let total = self.sum();
        if total <= f64::EPSILON {
            *self = Self::default();
            return;
        }
        for weight in self.values_mut() {
            *weight /= total;
        }
    }
}

/// Request shape that drives weight adjustments
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightSignals {
    pub has_collaborative_data: bool,
    pub has_keywords: bool,
    pub style_count: usize,
    pub has_room_context: bool,
    pub functional_count: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WeightCalculator;

impl WeightCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Base weights adjusted in a fixed order, renormalizing after each step
    pub fn calculate(&self, signals: &WeightSignals) -> ScoreWeights {
        let mut weights = ScoreWeights::default();

        if signals.has_collaborative_data {
            weights.collaborative = 0.20;
            weights.content *= 0.8;
            weights.popularity *= 0.8;
            weights.style *= 0.8;
            weights.normalize();
        }

        if signals.has_keywords {
            weights.content += 0.15;
            weights.popularity -= 0.10;
            weights.style -= 0.05;
            weights.normalize();
        }

        if signals.style_count > 1 {
            weights.style += 0.10;
            weights.content -= 0.05;
            weights.popularity -= 0.05;
            weights.normalize();
        }

        if signals.has_room_context && signals.functional_count > 2 {
            weights.functional += 0.10;
            weights.popularity -= 0.10;
            weights.normalize();
        }

        weights.normalize();
        weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sums_to_one(weights: &ScoreWeights) {
        assert!((weights.sum() - 1.0).abs() < 1e-9, "sum was {}", weights.sum());
    }

    #[test]
    fn test_base_weights() {
        let weights = WeightCalculator::new().calculate(&WeightSignals::default());
        assert_sums_to_one(&weights);
        assert!((weights.content - 0.40).abs() < 1e-9);
        assert_eq!(weights.collaborative, 0.0);
    }

    #[test]
    fn test_keywords_boost_content() {
        let weights = WeightCalculator::new().calculate(&WeightSignals {
            has_keywords: true,
            ..Default::default()
        });
        assert_sums_to_one(&weights);
        assert!((weights.content - 0.55).abs() < 1e-9);
        assert!(weights.popularity.abs() < 1e-9);
        assert!((weights.style - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_collaborative_gets_weight_only_with_data() {
        let calculator = WeightCalculator::new();
        let without = calculator.calculate(&WeightSignals::default());
        let with = calculator.calculate(&WeightSignals {
            has_collaborative_data: true,
            ..Default::default()
        });
        assert_eq!(without.collaborative, 0.0);
        assert!(with.collaborative > 0.18);
        assert_sums_to_one(&with);
    }

    #[test]
    fn test_weights_never_negative() {
        let weights = WeightCalculator::new().calculate(&WeightSignals {
            has_collaborative_data: true,
            has_keywords: true,
            style_count: 3,
            has_room_context: true,
            functional_count: 4,
        });
        assert_sums_to_one(&weights);
        assert!([
            weights.content,
            weights.popularity,
            weights.style,
            weights.functional,
            weights.price,
            weights.collaborative
        ]
        .iter()
        .all(|w| *w >= 0.0));
    }

    #[test]
    fn test_every_signal_combination_sums_to_one() {
        let calculator = WeightCalculator::new();
        for mask in 0..16u8 {
            let signals = WeightSignals {
                has_collaborative_data: mask & 1 != 0,
                has_keywords: mask & 2 != 0,
                style_count: if mask & 4 != 0 { 2 } else { 1 },
                has_room_context: mask & 8 != 0,
                functional_count: 3,
            };
            assert_sums_to_one(&calculator.calculate(&signals));
        }
    }

    #[test]
    fn test_functional_boost_needs_room_and_requirements() {
        let calculator = WeightCalculator::new();
        let only_room = calculator.calculate(&WeightSignals {
            has_room_context: true,
            functional_count: 2,
            ..Default::default()
        });
        assert!((only_room.functional - 0.20).abs() < 1e-9);

        let boosted = calculator.calculate(&WeightSignals {
            has_room_context: true,
            functional_count: 3,
            ..Default::default()
        });
        assert!((boosted.functional - 0.30).abs() < 1e-9);
    }
}
