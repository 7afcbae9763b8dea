pub mod builtin;
pub mod schema;

use crate::error::LcaError;
use crate::model::{EnergyType, ProcessCategory};
use schema::FactorTables;
use std::collections::HashSet;
use std::path::Path;

/// Load factor tables from a JSON file.
pub fn load_factor_tables(path: &Path) -> Result<FactorTables, LcaError> {
    let content = std::fs::read_to_string(path).map_err(|e| LcaError::FactorTableLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_factor_tables(&content, path)
}

/// Parse factor tables from a JSON string.
pub fn parse_factor_tables(json: &str, source: &Path) -> Result<FactorTables, LcaError> {
    let tables: FactorTables =
        serde_json::from_str(json).map_err(|e| LcaError::FactorTableLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_factor_tables(&tables)?;
    Ok(tables)
}

/// Parse factor tables from a JSON string (no file path context).
pub fn parse_factor_tables_str(json: &str) -> Result<FactorTables, LcaError> {
    let tables: FactorTables = serde_json::from_str(json).map_err(LcaError::Json)?;
    validate_factor_tables(&tables)?;
    Ok(tables)
}

/// Validate that factor tables cover every fallback the resolver relies on.
pub fn validate_factor_tables(tables: &FactorTables) -> Result<(), LcaError> {
    for category in ProcessCategory::ALL {
        if !tables.process_defaults.contains_key(&category) {
            return Err(LcaError::FactorTableInvalid(format!(
                "process_defaults is missing category '{}'",
                category
            )));
        }
    }

    if !tables.energy.contains_key(&EnergyType::ElectricityGrid) {
        return Err(LcaError::FactorTableInvalid(
            "energy table must contain 'electricity_grid' (fallback for unknown carriers)".into(),
        ));
    }

    if tables.material_families.is_empty() {
        return Err(LcaError::FactorTableInvalid(
            "material_families must not be empty".into(),
        ));
    }

    let mut seen = HashSet::new();
    for family in &tables.material_families {
        if family.name.trim().is_empty() {
            return Err(LcaError::FactorTableInvalid(
                "material family name must not be empty".into(),
            ));
        }
        if family.name != family.name.to_lowercase() {
            return Err(LcaError::FactorTableInvalid(format!(
                "material family '{}' must be lowercase",
                family.name
            )));
        }
        if !seen.insert(family.name.as_str()) {
            return Err(LcaError::FactorTableInvalid(format!(
                "duplicate material family '{}'",
                family.name
            )));
        }
    }

    if tables.family(&tables.generic_family).is_none() {
        return Err(LcaError::FactorTableInvalid(format!(
            "generic_family '{}' is not one of the material families",
            tables.generic_family
        )));
    }

    if tables.characterization.keys().any(|s| s.trim().is_empty()) {
        return Err(LcaError::FactorTableInvalid(
            "substance name must not be empty".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn minimal(generic: &str) -> String {
        format!(
            r#"{{
                "name": "Test",
                "version": "1.0",
                "process_defaults": {{
                    "extraction": {{}}, "processing": {{}}, "manufacturing": {{}},
                    "transport": {{}}, "end_of_life": {{}}, "recycling": {{}}
                }},
                "material_families": [
                    {{ "name": "wood", "factors": {{ "climate_change": "0.4" }} }}
                ],
                "generic_family": "{generic}",
                "energy": {{ "electricity_grid": {{ "climate_change": "0.3" }} }},
                "characterization": {{ "CO2": {{ "climate_change": "1" }} }}
            }}"#
        )
    }

    #[test]
    fn test_parse_valid_tables() {
        let tables = parse_factor_tables_str(&minimal("wood")).unwrap();
        assert_eq!(tables.name, "Test");
        assert_eq!(tables.material_families.len(), 1);
    }

    #[test]
    fn test_unknown_generic_family_rejected() {
        let err = parse_factor_tables_str(&minimal("steel")).unwrap_err();
        assert!(matches!(err, LcaError::FactorTableInvalid(_)));
    }

    #[test]
    fn test_missing_process_category_rejected() {
        let json = minimal("wood").replace(r#""recycling": {}"#, r#""transport_2": {}"#);
        assert!(parse_factor_tables_str(&json).is_err());
    }

    #[test]
    fn test_missing_grid_rejected() {
        let json = minimal("wood").replace("electricity_grid", "coal");
        let err = parse_factor_tables_str(&json).unwrap_err();
        assert!(err.to_string().contains("electricity_grid"));
    }

    #[test]
    fn test_unknown_impact_category_rejected() {
        let json = minimal("wood").replace(r#""climate_change": "0.4""#, r#""radiation": "0.4""#);
        assert!(parse_factor_tables_str(&json).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(minimal("wood").as_bytes()).unwrap();
        let tables = load_factor_tables(file.path()).unwrap();
        assert_eq!(tables.generic_family, "wood");
    }

    #[test]
    fn test_load_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        match load_factor_tables(file.path()).unwrap_err() {
            LcaError::FactorTableLoad { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
