use lca_core::analysis::scenario::ScenarioDef;
use lca_core::analysis::apply_changes;
use lca_core::calculate::LcaEngine;
use lca_core::error::LcaError;
use std::path::Path;

use crate::commands::load_data;
use crate::output;
use crate::DataArgs;

pub fn run(
    baseline_file: &Path,
    scenario_file: Option<&Path>,
    changes_file: Option<&Path>,
    data: &DataArgs,
) -> Result<(), LcaError> {
    let baseline = lca_core::input::load_input(baseline_file)?;

    let (label, scenario_steps) = match (scenario_file, changes_file) {
        (Some(path), _) => {
            let scenario = lca_core::input::load_input(path)?;
            (path.display().to_string(), scenario.steps)
        }
        (None, Some(path)) => {
            let content = std::fs::read_to_string(path)?;
            let def: ScenarioDef = serde_json::from_str(&content)
                .map_err(|e| LcaError::InvalidChange(format!("{}: {}", path.display(), e)))?;
            let steps = apply_changes(&baseline.steps, &def.changes)?;
            (def.name.unwrap_or_else(|| path.display().to_string()), steps)
        }
        (None, None) => {
            return Err(LcaError::InvalidChange(
                "either --scenario or --changes is required".into(),
            ))
        }
    };

    let loaded = load_data(data)?;
    let engine = LcaEngine::new(&loaded.tables, &loaded.reference);
    let report = engine.what_if(
        &baseline.steps,
        &scenario_steps,
        &baseline.functional_unit,
        &baseline.system_boundary,
    )?;

    match data.output.as_str() {
        "json" => output::json::print_what_if(&report)?,
        _ => output::table::print_what_if(&label, &report),
    }

    Ok(())
}
