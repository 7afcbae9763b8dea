use crate::analysis::Change;
use crate::calculate::{CalculationResult, LcaEngine};
use crate::error::LcaError;
use crate::model::{CircularityMetric, ImpactCategory, ProcessStep};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Impact reductions at or beyond this relative change count as improvements.
const IMPACT_IMPROVEMENT_PCT: Decimal = Decimal::from_parts(5, 0, 0, true, 0);
/// Circularity gains at or beyond this relative change count as improvements.
const CIRCULARITY_IMPROVEMENT_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatIfReport {
    pub baseline: CalculationResult,
    pub scenario: CalculationResult,
    pub impact_changes: BTreeMap<ImpactCategory, Change>,
    pub circularity_changes: BTreeMap<CircularityMetric, Change>,
    /// Readable list of notable improvements, impacts first.
    pub improvements: Vec<String>,
}

impl LcaEngine<'_> {
    /// Compare a scenario step set against a baseline step set.
    pub fn what_if(
        &self,
        baseline: &[ProcessStep],
        scenario: &[ProcessStep],
        functional_unit: &str,
        system_boundary: &str,
    ) -> Result<WhatIfReport, LcaError> {
        let (baseline, scenario) = rayon::join(
            || self.calculate(baseline, functional_unit, system_boundary),
            || self.calculate(scenario, functional_unit, system_boundary),
        );
        let (baseline, scenario) = (baseline?, scenario?);
        compare(baseline, scenario)
    }
}

/// Build the comparison of two finished calculations.
pub fn compare(
    baseline: CalculationResult,
    scenario: CalculationResult,
) -> Result<WhatIfReport, LcaError> {
    let impact_changes = ImpactCategory::ALL
        .into_iter()
        .map(|c| {
            let change =
                Change::between(baseline.total_impacts.get(c), scenario.total_impacts.get(c))?;
            Ok((c, change))
        })
        .collect::<Result<BTreeMap<_, _>, LcaError>>()?;

    let circularity_changes = CircularityMetric::ALL
        .into_iter()
        .map(|m| {
            let change = Change::between(
                baseline.circularity_metrics.get(m),
                scenario.circularity_metrics.get(m),
            )?;
            Ok((m, change))
        })
        .collect::<Result<BTreeMap<_, _>, LcaError>>()?;

    let improvements = identify_improvements(&impact_changes, &circularity_changes);

    Ok(WhatIfReport {
        baseline,
        scenario,
        impact_changes,
        circularity_changes,
        improvements,
    })
}

fn identify_improvements(
    impacts: &BTreeMap<ImpactCategory, Change>,
    circularity: &BTreeMap<CircularityMetric, Change>,
) -> Vec<String> {
    let mut improvements = Vec::new();

    for (category, change) in impacts {
        if change.relative_change <= IMPACT_IMPROVEMENT_PCT {
            improvements.push(format!(
                "Reduced {} by {:.1}%",
                category,
                change.relative_change.abs().round_dp(1)
            ));
        }
    }

    for (metric, change) in circularity {
        if change.relative_change >= CIRCULARITY_IMPROVEMENT_PCT {
            improvements.push(format!(
                "Improved {} by {:.1}%",
                metric,
                change.relative_change.round_dp(1)
            ));
        }
    }

    improvements
}
