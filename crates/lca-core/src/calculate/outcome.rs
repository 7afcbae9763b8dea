use crate::model::{CircularityMetrics, ImpactVector};
use crate::resolve::ProcessFactors;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Kind of reference data that was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissKind {
    Material,
    Process,
    ProcessCategory,
    EnergyType,
    Substance,
}

/// A lookup that fell back to a default. Not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceMiss {
    /// Step whose data triggered the lookup.
    pub step_id: String,
    pub kind: MissKind,
    /// Name as given in the step (material, process, carrier or substance).
    pub name: String,
    /// Human-readable description of the default that was applied.
    pub fallback: String,
}

/// Detailed result for a single step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepImpacts {
    /// Sum of material, energy and emission contributions.
    pub impacts: ImpactVector,
    /// Whole-step intensity factors. Informational, not part of `impacts`.
    pub base_factors: ProcessFactors,
    /// Lookups resolved by a default.
    pub misses: Vec<ReferenceMiss>,
}

/// Output of one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Per-category sum over all steps.
    pub total_impacts: ImpactVector,
    /// Step id -> impacts of that step.
    pub process_breakdown: BTreeMap<String, ImpactVector>,
    /// Step ids in the order they were processed.
    pub step_order: Vec<String>,
    pub functional_unit: String,
    pub system_boundary: String,
    pub circularity_metrics: CircularityMetrics,
    /// Wall-clock duration of the run.
    pub calculation_time: Duration,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<ReferenceMiss>,
}
