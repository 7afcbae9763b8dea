use crate::analysis::relative_change;
use crate::calculate::LcaEngine;
use crate::error::LcaError;
use crate::model::{ImpactCategory, ProcessStep};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One candidate value of a parameter, as a ready-to-run step set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variation {
    pub label: String,
    pub steps: Vec<ProcessStep>,
}

/// A parameter and the step sets produced by varying it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityParameter {
    pub name: String,
    pub variations: Vec<Variation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationOutcome {
    pub variation: String,
    /// Relative change of climate_change versus baseline, in percent.
    pub impact_change: Decimal,
    /// climate_change total of the variation.
    pub absolute_impact: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSensitivity {
    pub parameter: String,
    pub outcomes: Vec<VariationOutcome>,
    /// Largest absolute relative change over all variations (0 without variations).
    pub max_change: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivityRank {
    pub parameter: String,
    pub max_change: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub baseline_climate_change: Decimal,
    /// Per parameter, in input order.
    pub results: Vec<ParameterSensitivity>,
    /// Parameters by descending `max_change`.
    pub ranking: Vec<SensitivityRank>,
}

impl LcaEngine<'_> {
    /// Sensitivity sweep on climate_change.
    ///
    /// Variations are independent and run on the rayon pool; results keep
    /// input order. The first failing run aborts the sweep.
    pub fn sensitivity(
        &self,
        baseline: &[ProcessStep],
        parameters: &[SensitivityParameter],
        functional_unit: &str,
        system_boundary: &str,
    ) -> Result<SensitivityReport, LcaError> {
        let base = self.calculate(baseline, functional_unit, system_boundary)?;
        let base_value = base.total_impacts.get(ImpactCategory::ClimateChange);

        let results: Vec<ParameterSensitivity> = parameters
            .par_iter()
            .map(|param| -> Result<ParameterSensitivity, LcaError> {
                let outcomes = param
                    .variations
                    .par_iter()
                    .map(|variation| -> Result<VariationOutcome, LcaError> {
                        let result =
                            self.calculate(&variation.steps, functional_unit, system_boundary)?;
                        let value = result.total_impacts.get(ImpactCategory::ClimateChange);
                        Ok(VariationOutcome {
                            variation: variation.label.clone(),
                            impact_change: relative_change(base_value, value),
                            absolute_impact: value,
                        })
                    })
                    .collect::<Result<Vec<_>, LcaError>>()?;

                let max_change = outcomes
                    .iter()
                    .map(|o| o.impact_change.abs())
                    .max()
                    .unwrap_or_default();

                Ok(ParameterSensitivity {
                    parameter: param.name.clone(),
                    outcomes,
                    max_change,
                })
            })
            .collect::<Result<_, _>>()?;

        let mut ranking: Vec<SensitivityRank> = results
            .iter()
            .map(|r| SensitivityRank {
                parameter: r.parameter.clone(),
                max_change: r.max_change,
            })
            .collect();
        // Stable: equal sensitivities keep input order.
        ranking.sort_by(|a, b| b.max_change.cmp(&a.max_change));

        tracing::info!(
            parameters = results.len(),
            most_sensitive = ranking.first().map(|r| r.parameter.as_str()).unwrap_or("none"),
            "sensitivity analysis completed"
        );

        Ok(SensitivityReport {
            baseline_climate_change: base_value,
            results,
            ranking,
        })
    }
}
