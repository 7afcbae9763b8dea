pub mod analysis;
pub mod calculate;
pub mod error;
pub mod factors;
pub mod input;
pub mod model;
pub mod recommend;
pub mod reference;
pub mod resolve;

use analysis::{SensitivityReport, StepChange, SweepDef, WhatIfReport};
use calculate::{CalculationResult, LcaEngine};
use error::LcaError;
use factors::schema::FactorTables;
use input::CalculationInput;
use reference::ReferenceData;

/// Main API entry point: aggregate impacts and circularity for one input.
///
/// Missing reference data never fails the run; each default applied is
/// listed in the result's diagnostics.
pub fn calculate(
    input: &CalculationInput,
    reference: &ReferenceData,
    tables: &FactorTables,
) -> Result<CalculationResult, LcaError> {
    LcaEngine::new(tables, reference).calculate(
        &input.steps,
        &input.functional_unit,
        &input.system_boundary,
    )
}

/// Compare the input against a copy modified by `changes`.
pub fn what_if(
    input: &CalculationInput,
    changes: &[StepChange],
    reference: &ReferenceData,
    tables: &FactorTables,
) -> Result<WhatIfReport, LcaError> {
    let scenario = analysis::apply_changes(&input.steps, changes)?;
    LcaEngine::new(tables, reference).what_if(
        &input.steps,
        &scenario,
        &input.functional_unit,
        &input.system_boundary,
    )
}

/// Run every variation of `sweep` against the input as baseline.
pub fn sensitivity(
    input: &CalculationInput,
    sweep: &SweepDef,
    reference: &ReferenceData,
    tables: &FactorTables,
) -> Result<SensitivityReport, LcaError> {
    let parameters = sweep.build(&input.steps)?;
    LcaEngine::new(tables, reference).sensitivity(
        &input.steps,
        &parameters,
        &input.functional_unit,
        &input.system_boundary,
    )
}
