use crate::models::BudgetRange;

/// Position of the ideal price inside the budget range
pub const OPTIMAL_POSITION: f64 = 0.6;

/// Neutral score for enquiry-priced items
pub const UNPRICED_SCORE: f64 = 0.5;

/// How well a price sits inside the shopper's budget
///
/// Without a budget every product scores 1.0, so price never gates results on
/// its own. Inside a closed range the score peaks at 60% of the range and falls
/// off linearly with distance, floored at 0.0. Prices outside the range score 0.0.
/// With only a lower bound, every price at or above it scores 1.0.
pub fn price_fit(price: Option<f64>, budget: Option<&BudgetRange>) -> f64 {
    let Some(budget) = budget.filter(|b| !b.is_unbounded()) else {
        return 1.0;
    };
    let Some(price) = price else {
        return UNPRICED_SCORE;
    };
    if !budget.contains(price) {
        return 0.0;
    }

    let min = budget.min.unwrap_or(0.0);
    let Some(max) = budget.max else {
        return 1.0;
    };

    let range = max - min;
    if range <= 0.0 {
        return 1.0;
    }

    let optimal = min + range * OPTIMAL_POSITION;
    (1.0 - (price - optimal).abs() / range).clamp(0.0, 1.0)
}
