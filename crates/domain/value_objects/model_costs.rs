use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::entities::model_costs::UpsertModelCostEntity;

/// Per-model pricing in currency units per 1000 tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertModelCostModel {
    pub model: String,
    pub display_name: Option<String>,
    pub input_cost_per_1k: f64,
    pub output_cost_per_1k: f64,
}

impl UpsertModelCostModel {
    /// Trims names and rejects an empty model or a negative or non-finite cost.
    pub fn into_entity(self, now: DateTime<Utc>) -> Result<UpsertModelCostEntity, String> {
        let model = self.model.trim().to_string();
        if model.is_empty() {
            return Err("model must not be empty".to_string());
        }

        for (field, cost) in [
            ("input_cost_per_1k", self.input_cost_per_1k),
            ("output_cost_per_1k", self.output_cost_per_1k),
        ] {
            if !cost.is_finite() || cost < 0.0 {
                return Err(format!("{field} must be a non-negative number"));
            }
        }

        let display_name = self
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(UpsertModelCostEntity {
            model,
            display_name,
            input_cost_per_1k: self.input_cost_per_1k,
            output_cost_per_1k: self.output_cost_per_1k,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str, input: f64, output: f64) -> UpsertModelCostModel {
        UpsertModelCostModel {
            model: name.to_string(),
            display_name: Some("  ".to_string()),
            input_cost_per_1k: input,
            output_cost_per_1k: output,
        }
    }

    #[test]
    fn valid_cost_is_normalized() {
        let entity = model(" meta/llama-3.2-90b ", 0.0004, 0.0012)
            .into_entity(Utc::now())
            .unwrap();

        assert_eq!(entity.model, "meta/llama-3.2-90b");
        assert_eq!(entity.display_name, None);
    }

    #[test]
    fn invalid_costs_are_rejected() {
        assert!(model("", 0.1, 0.1).into_entity(Utc::now()).is_err());
        assert!(model("m", -0.1, 0.1).into_entity(Utc::now()).is_err());
        assert!(model("m", 0.1, f64::NAN).into_entity(Utc::now()).is_err());
        assert!(model("m", f64::INFINITY, 0.1).into_entity(Utc::now()).is_err());
    }
}
