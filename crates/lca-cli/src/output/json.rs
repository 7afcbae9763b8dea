use lca_core::analysis::{SensitivityReport, WhatIfReport};
use lca_core::calculate::CalculationResult;
use lca_core::error::LcaError;
use lca_core::recommend::Advice;

pub fn print_calculation(result: &CalculationResult, advice: Option<&Advice>) -> Result<(), LcaError> {
    let mut value = serde_json::to_value(result)?;
    if let Some(advice) = advice {
        value["advice"] = serde_json::to_value(advice)?;
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

pub fn print_what_if(report: &WhatIfReport) -> Result<(), LcaError> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

pub fn print_sensitivity(report: &SensitivityReport) -> Result<(), LcaError> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}
