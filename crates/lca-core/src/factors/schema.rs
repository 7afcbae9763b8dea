use crate::model::{EnergyType, ImpactCategory, ProcessCategory};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-unit factors keyed by impact category. Missing categories count as zero.
pub type FactorMap = BTreeMap<ImpactCategory, Decimal>;

/// Default factor data consulted whenever stored reference data is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorTables {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Whole-step intensity defaults per lifecycle stage.
    pub process_defaults: BTreeMap<ProcessCategory, FactorMap>,
    /// Per-kg material defaults, matched by substring in this order.
    pub material_families: Vec<MaterialFamily>,
    /// Family used when no family name occurs in the material name.
    pub generic_family: String,
    /// Per-kWh factors per energy carrier.
    pub energy: BTreeMap<EnergyType, FactorMap>,
    /// Characterization factors per emitted substance (per kg).
    pub characterization: BTreeMap<String, FactorMap>,
}

impl FactorTables {
    pub fn family(&self, name: &str) -> Option<&MaterialFamily> {
        self.material_families.iter().find(|f| f.name == name)
    }
}

/// A material family with its default per-kg factors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialFamily {
    /// Lowercase substring looked for in material names (e.g. "steel").
    pub name: String,
    pub factors: FactorMap,
    #[serde(default)]
    pub note: Option<String>,
}
