//! Reference records owned by the surrounding application: registered
//! materials with their properties, and registered processes.
//!
//! None of these are required to exist. Lookups return `None` and the
//! resolver substitutes a default.

use crate::error::LcaError;
use crate::model::ImpactCategory;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Physical,
    Chemical,
    Mechanical,
    Thermal,
    Environmental,
    Economic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialProperty {
    pub property_name: String,
    pub property_type: PropertyType,
    pub value: Decimal,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub name: String,
    /// Alternative names the material is also found under.
    #[serde(default)]
    pub common_names: Vec<String>,
    #[serde(default)]
    pub properties: Vec<MaterialProperty>,
}

impl MaterialRecord {
    /// Case-insensitive match on the name or any common name.
    pub fn is_named(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.name.to_lowercase() == name
            || self.common_names.iter().any(|n| n.to_lowercase() == name)
    }

    /// Stored per-kg factor for a category, if the material carries one.
    pub fn environmental_factor(&self, category: ImpactCategory) -> Option<Decimal> {
        let wanted = category.property_name();
        self.properties
            .iter()
            .find(|p| p.property_type == PropertyType::Environmental && p.property_name == wanted)
            .map(|p| p.value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub name: String,
    #[serde(default)]
    pub impact_factors: BTreeMap<ImpactCategory, Decimal>,
}

/// Snapshot of registered materials and processes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub materials: Vec<MaterialRecord>,
    #[serde(default)]
    pub processes: Vec<ProcessRecord>,
}

impl ReferenceData {
    /// Case-insensitive exact match. Primary names win over common names.
    pub fn find_material(&self, name: &str) -> Option<&MaterialRecord> {
        let name = name.trim().to_lowercase();
        self.materials
            .iter()
            .find(|m| m.name.to_lowercase() == name)
            .or_else(|| self.materials.iter().find(|m| m.is_named(&name)))
    }

    /// Case-insensitive exact name match.
    pub fn find_process(&self, name: &str) -> Option<&ProcessRecord> {
        let name = name.trim().to_lowercase();
        self.processes
            .iter()
            .find(|p| p.name.to_lowercase() == name)
    }
}

/// Load reference data from a JSON file.
pub fn load_reference_data(path: &Path) -> Result<ReferenceData, LcaError> {
    let content = std::fs::read_to_string(path).map_err(|e| LcaError::ReferenceLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| LcaError::ReferenceLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reference() -> ReferenceData {
        serde_json::from_str(
            r#"{
                "materials": [
                    {
                        "name": "Recycled PET",
                        "common_names": ["rPET", "PET flakes"],
                        "properties": [
                            { "property_name": "climate_change_factor", "property_type": "environmental", "value": "1.1", "unit": "kg CO2-eq/kg" },
                            { "property_name": "acidification_factor", "property_type": "chemical", "value": "9" }
                        ]
                    }
                ],
                "processes": [
                    { "name": "Injection Moulding", "impact_factors": { "climate_change": "0.9" } }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_find_material_ignores_case() {
        let data = reference();
        assert!(data.find_material("recycled pet").is_some());
        assert!(data.find_material("PET").is_none());
    }

    #[test]
    fn test_find_material_by_common_name() {
        let data = reference();
        let by_alias = data.find_material(" rpet ").unwrap();
        assert_eq!(by_alias.name, "Recycled PET");
        assert!(data.find_material("pet flakes").is_some());
        assert!(data.find_material("flakes").is_none());
    }

    #[test]
    fn test_only_environmental_properties_count() {
        let data = reference();
        let pet = data.find_material("Recycled PET").unwrap();
        assert_eq!(
            pet.environmental_factor(ImpactCategory::ClimateChange),
            Some(dec!(1.1))
        );
        assert_eq!(pet.environmental_factor(ImpactCategory::Acidification), None);
    }

    #[test]
    fn test_find_process_ignores_case() {
        let data = reference();
        let p = data.find_process("injection moulding").unwrap();
        assert_eq!(p.impact_factors[&ImpactCategory::ClimateChange], dec!(0.9));
    }

    #[test]
    fn test_load_reference_data_missing_file() {
        let err = load_reference_data(Path::new("/nonexistent/reference.json")).unwrap_err();
        assert!(matches!(err, LcaError::ReferenceLoad { .. }));
    }
}
