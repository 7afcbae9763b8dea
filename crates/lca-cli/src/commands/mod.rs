pub mod calculate;
pub mod factors;
pub mod sensitivity;
pub mod what_if;

use crate::DataArgs;
use lca_core::error::LcaError;
use lca_core::factors::schema::FactorTables;
use lca_core::reference::ReferenceData;

/// Reference data and factor tables selected on the command line.
pub struct LoadedData {
    pub reference: ReferenceData,
    pub tables: FactorTables,
}

pub fn load_data(args: &DataArgs) -> Result<LoadedData, LcaError> {
    let reference = match &args.reference {
        Some(path) => lca_core::reference::load_reference_data(path)?,
        None => ReferenceData::default(),
    };
    let tables = match &args.factors {
        Some(path) => lca_core::factors::load_factor_tables(path)?,
        None => lca_core::factors::builtin::default_tables().clone(),
    };
    Ok(LoadedData { reference, tables })
}
