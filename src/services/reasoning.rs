use crate::models::ProductScore;

pub const FALLBACK_REASON: &str = "Recommended based on overall compatibility";

/// Request facts the templates can mention
#[derive(Debug, Clone, Default)]
pub struct ReasoningContext {
    pub primary_style: Option<String>,
    pub room: Option<String>,
    pub has_budget: bool,
    pub has_keywords: bool,
}

/// Turns dimension scores into short explanations
///
/// Deterministic: the same scores and context always yield the same strings, and
/// the output is never empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReasoningGenerator;

impl ReasoningGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, scores: &ProductScore, ctx: &ReasoningContext) -> Vec<String> {
        let mut reasons = Vec::new();

        if scores.content > 0.8 {
            reasons.push(if ctx.has_keywords {
                "Strong match for your search".to_string()
            } else {
                "Strong match for your preferences".to_string()
            });
        } else if scores.content >= 0.6 {
            reasons.push("Matches your preferences".to_string());
        }

        if ctx.primary_style.is_some() || scores.style != 0.5 {
            if scores.style > 0.7 {
                reasons.push(match &ctx.primary_style {
                    Some(style) => format!("Excellent {} style match", style),
                    None => "Excellent style match".to_string(),
                });
            } else if scores.style >= 0.5 {
                reasons.push("Good style compatibility".to_string());
            }
        }

        let room = ctx.room.as_deref().unwrap_or("living room");
        if scores.functional > 0.8 {
            reasons.push(format!("Perfect fit for your {}", room));
        } else if scores.functional >= 0.6 {
            reasons.push(format!("Works well in a {}", room));
        }

        if ctx.has_budget {
            if scores.price > 0.8 {
                reasons.push("Great value within your budget".to_string());
            } else if scores.price >= 0.5 {
                reasons.push("Within your budget range".to_string());
            }
        }

        if reasons.is_empty() {
            reasons.push(FALLBACK_REASON.to_string());
        }
        reasons
    }
}
