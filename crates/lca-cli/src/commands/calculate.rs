use lca_core::error::LcaError;
use lca_core::recommend;
use std::path::Path;

use crate::commands::load_data;
use crate::output;
use crate::DataArgs;

pub fn run(input_file: &Path, data: &DataArgs, verbose: bool, advise: bool) -> Result<(), LcaError> {
    let input = lca_core::input::load_input(input_file)?;
    let loaded = load_data(data)?;

    let result = lca_core::calculate(&input, &loaded.reference, &loaded.tables)?;

    // No external recommendation service is wired into the CLI.
    let advice = advise.then(|| recommend::advise(&result, None));

    match data.output.as_str() {
        "json" => output::json::print_calculation(&result, advice.as_ref())?,
        _ => output::table::print_calculation(&result, advice.as_ref(), verbose),
    }

    Ok(())
}
