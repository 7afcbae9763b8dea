//! Improvement suggestions for a finished calculation.
//!
//! An optional external adapter is tried first; the built-in rule set is
//! the fallback and always produces an answer.

use crate::calculate::CalculationResult;
use crate::model::ImpactCategory;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upper bound on suggestions returned by [`advise`].
pub const MAX_SUGGESTIONS: usize = 5;

const HIGH_CLIMATE_CHANGE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
const LOW_RECYCLED_CONTENT: Decimal = Decimal::from_parts(30, 0, 0, false, 0);
const LOW_RECOVERY_RATE: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    EnergyEfficiency,
    MaterialSubstitution,
    EndOfLife,
    ProcessOptimization,
    Other,
}

impl SuggestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionType::EnergyEfficiency => "energy_efficiency",
            SuggestionType::MaterialSubstitution => "material_substitution",
            SuggestionType::EndOfLife => "end_of_life",
            SuggestionType::ProcessOptimization => "process_optimization",
            SuggestionType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub suggestion_type: SuggestionType,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub potential_savings: String,
    pub implementation: String,
}

impl Suggestion {
    fn is_well_formed(&self) -> bool {
        !self.title.trim().is_empty() && !self.description.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterFailure {
    #[error("recommendation service unavailable")]
    Unavailable,

    #[error("recommendation service failed: {0}")]
    Failed(String),

    #[error("malformed recommendation output: {0}")]
    Malformed(String),
}

/// External suggestion source, e.g. a trained model behind a service.
pub trait RecommendationAdapter: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, result: &CalculationResult) -> Result<Vec<Suggestion>, AdapterFailure>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceSource {
    Adapter,
    Rules,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub source: AdviceSource,
    pub suggestions: Vec<Suggestion>,
    /// Why the adapter was not used, when one was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Suggestions for `result`, from the adapter when it yields usable output.
pub fn advise(result: &CalculationResult, adapter: Option<&dyn RecommendationAdapter>) -> Advice {
    let Some(adapter) = adapter else {
        return Advice {
            source: AdviceSource::Rules,
            suggestions: rule_based_suggestions(result),
            fallback_reason: None,
        };
    };

    let failure = match adapter.generate(result) {
        Ok(suggestions) => match suggestions.iter().position(|s| !s.is_well_formed()) {
            None => {
                tracing::debug!(adapter = adapter.name(), count = suggestions.len(), "adapter suggestions accepted");
                let mut suggestions = suggestions;
                suggestions.truncate(MAX_SUGGESTIONS);
                return Advice {
                    source: AdviceSource::Adapter,
                    suggestions,
                    fallback_reason: None,
                };
            }
            Some(index) => AdapterFailure::Malformed(format!(
                "suggestion {} has an empty title or description",
                index
            )),
        },
        Err(e) => e,
    };

    tracing::warn!(
        adapter = adapter.name(),
        reason = %failure,
        "falling back to rule-based suggestions"
    );

    Advice {
        source: AdviceSource::Rules,
        suggestions: rule_based_suggestions(result),
        fallback_reason: Some(format!("{}: {}", adapter.name(), failure)),
    }
}

/// Fixed threshold rules over climate change and circularity.
pub fn rule_based_suggestions(result: &CalculationResult) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    if result.total_impacts.get(ImpactCategory::ClimateChange) > HIGH_CLIMATE_CHANGE {
        suggestions.push(Suggestion {
            suggestion_type: SuggestionType::EnergyEfficiency,
            priority: Priority::High,
            title: "Reduce Energy Consumption".into(),
            description:
                "Consider switching to renewable energy sources or improving energy efficiency."
                    .into(),
            potential_savings: "15-25% CO2 reduction".into(),
            implementation: "Switch to renewable electricity, optimize processes".into(),
        });
    }

    let circularity = &result.circularity_metrics;
    if circularity.recycled_content_percentage < LOW_RECYCLED_CONTENT {
        suggestions.push(Suggestion {
            suggestion_type: SuggestionType::MaterialSubstitution,
            priority: Priority::Medium,
            title: "Increase Recycled Content".into(),
            description: "Replace primary materials with recycled alternatives.".into(),
            potential_savings: "10-20% environmental impact reduction".into(),
            implementation: "Source recycled materials, adjust specifications".into(),
        });
    }

    if circularity.recovery_rate < LOW_RECOVERY_RATE {
        suggestions.push(Suggestion {
            suggestion_type: SuggestionType::EndOfLife,
            priority: Priority::Medium,
            title: "Improve End-of-Life Management".into(),
            description: "Enhance recycling and recovery processes.".into(),
            potential_savings: "5-15% environmental impact reduction".into(),
            implementation: "Design for recyclability, partner with recyclers".into(),
        });
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CircularityMetrics, ImpactVector};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn result(cc: Decimal, recycled: Decimal, recovery: Decimal) -> CalculationResult {
        let mut total_impacts = ImpactVector::zero();
        total_impacts.checked_add(ImpactCategory::ClimateChange, cc).unwrap();
        CalculationResult {
            total_impacts,
            process_breakdown: BTreeMap::new(),
            step_order: vec![],
            functional_unit: "1 kg".into(),
            system_boundary: "cradle-to-gate".into(),
            circularity_metrics: CircularityMetrics {
                recycled_content_percentage: recycled,
                recovery_rate: recovery,
                material_efficiency: dec!(0),
                overall_score: dec!(0),
            },
            calculation_time: Duration::ZERO,
            diagnostics: vec![],
        }
    }

    struct Fixed(Result<Vec<Suggestion>, AdapterFailure>);

    impl RecommendationAdapter for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn generate(&self, _: &CalculationResult) -> Result<Vec<Suggestion>, AdapterFailure> {
            self.0.clone()
        }
    }

    fn custom(title: &str) -> Suggestion {
        Suggestion {
            suggestion_type: SuggestionType::ProcessOptimization,
            priority: Priority::Low,
            title: title.into(),
            description: "Tune furnace schedule.".into(),
            potential_savings: "3%".into(),
            implementation: "Batch melts".into(),
        }
    }

    #[test]
    fn test_rules_all_triggered() {
        let s = rule_based_suggestions(&result(dec!(220), dec!(10), dec!(0)));
        let types: Vec<_> = s.iter().map(|s| s.suggestion_type).collect();
        assert_eq!(
            types,
            vec![
                SuggestionType::EnergyEfficiency,
                SuggestionType::MaterialSubstitution,
                SuggestionType::EndOfLife
            ]
        );
        assert_eq!(s[0].priority, Priority::High);
    }

    #[test]
    fn test_thresholds_are_strict() {
        // Exactly at the thresholds nothing fires.
        let s = rule_based_suggestions(&result(dec!(10), dec!(30), dec!(60)));
        assert!(s.is_empty());
    }

    #[test]
    fn test_no_adapter_uses_rules() {
        let advice = advise(&result(dec!(50), dec!(80), dec!(90)), None);
        assert_eq!(advice.source, AdviceSource::Rules);
        assert_eq!(advice.suggestions.len(), 1);
        assert!(advice.fallback_reason.is_none());
    }

    #[test]
    fn test_adapter_output_used_and_capped() {
        let adapter = Fixed(Ok((0..7).map(|i| custom(&format!("idea {i}"))).collect()));
        let advice = advise(&result(dec!(50), dec!(0), dec!(0)), Some(&adapter));
        assert_eq!(advice.source, AdviceSource::Adapter);
        assert_eq!(advice.suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(advice.suggestions[0].title, "idea 0");
    }

    #[test]
    fn test_failing_adapter_falls_back() {
        let adapter = Fixed(Err(AdapterFailure::Unavailable));
        let advice = advise(&result(dec!(50), dec!(0), dec!(0)), Some(&adapter));
        assert_eq!(advice.source, AdviceSource::Rules);
        assert_eq!(advice.suggestions.len(), 3);
        assert!(advice.fallback_reason.unwrap().contains("unavailable"));
    }

    #[test]
    fn test_malformed_adapter_output_falls_back() {
        let adapter = Fixed(Ok(vec![custom("ok"), custom("  ")]));
        let advice = advise(&result(dec!(1), dec!(50), dec!(90)), Some(&adapter));
        assert_eq!(advice.source, AdviceSource::Rules);
        assert!(advice.suggestions.is_empty());
        assert!(advice.fallback_reason.unwrap().contains("suggestion 1"));
    }

    #[test]
    fn test_suggestion_json_uses_type_key() {
        let json = serde_json::to_value(custom("x")).unwrap();
        assert_eq!(json["type"], "process_optimization");
        assert_eq!(json["priority"], "low");
    }
}
