use lca_core::analysis::SweepDef;
use lca_core::error::LcaError;
use std::path::Path;

use crate::commands::load_data;
use crate::output;
use crate::DataArgs;

pub fn run(input_file: &Path, sweep_file: &Path, data: &DataArgs) -> Result<(), LcaError> {
    let input = lca_core::input::load_input(input_file)?;

    let content = std::fs::read_to_string(sweep_file)?;
    let sweep: SweepDef = serde_json::from_str(&content)
        .map_err(|e| LcaError::InvalidChange(format!("{}: {}", sweep_file.display(), e)))?;

    let loaded = load_data(data)?;
    let report = lca_core::sensitivity(&input, &sweep, &loaded.reference, &loaded.tables)?;

    match data.output.as_str() {
        "json" => output::json::print_sensitivity(&report)?,
        _ => output::table::print_sensitivity(&report),
    }

    Ok(())
}
