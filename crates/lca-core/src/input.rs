use crate::error::LcaError;
use crate::model::ProcessStep;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A calculation request: the step sequence plus reporting labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    #[serde(default = "default_functional_unit")]
    pub functional_unit: String,
    #[serde(default = "default_system_boundary")]
    pub system_boundary: String,
    pub steps: Vec<ProcessStep>,
}

fn default_functional_unit() -> String {
    "1 unit".into()
}

fn default_system_boundary() -> String {
    "cradle-to-grave".into()
}

/// Load a calculation input from a JSON file.
pub fn load_input(path: &Path) -> Result<CalculationInput, LcaError> {
    let content = std::fs::read_to_string(path)?;
    parse_input(&content, path)
}

/// Parse and validate a calculation input, naming `source` in parse errors.
pub fn parse_input(json: &str, source: &Path) -> Result<CalculationInput, LcaError> {
    let input: CalculationInput = serde_json::from_str(json)
        .map_err(|e| LcaError::InputParse(format!("{}: {}", source.display(), e)))?;
    validate_steps(&input.steps)?;
    Ok(input)
}

pub fn parse_input_str(json: &str) -> Result<CalculationInput, LcaError> {
    let input: CalculationInput =
        serde_json::from_str(json).map_err(|e| LcaError::InputParse(e.to_string()))?;
    validate_steps(&input.steps)?;
    Ok(input)
}

/// Check value ranges the engine assumes but does not enforce.
///
/// Emptiness and duplicate ids are left to the engine.
pub fn validate_steps(steps: &[ProcessStep]) -> Result<(), LcaError> {
    for step in steps {
        let invalid = |reason: String| LcaError::InvalidStep {
            step_id: step.id.clone(),
            reason,
        };

        if step.id.trim().is_empty() {
            return Err(invalid("step id must not be empty".into()));
        }

        for input in &step.input_materials {
            if input.quantity < Decimal::ZERO {
                return Err(invalid(format!(
                    "negative quantity {} for material '{}'",
                    input.quantity, input.material
                )));
            }
            if !is_percentage(input.recycled_content) {
                return Err(invalid(format!(
                    "recycled_content {} for material '{}' is outside 0-100",
                    input.recycled_content, input.material
                )));
            }
        }

        for output in &step.output_materials {
            if output.quantity < Decimal::ZERO {
                return Err(invalid(format!(
                    "negative output quantity {} for '{}'",
                    output.quantity, output.material
                )));
            }
        }

        for energy in &step.energy_inputs {
            if energy.amount < Decimal::ZERO {
                return Err(invalid(format!(
                    "negative energy amount {} ({})",
                    energy.amount, energy.energy_type
                )));
            }
        }

        for (substance, amount) in &step.emissions {
            if *amount < Decimal::ZERO {
                return Err(invalid(format!(
                    "negative emission {} of '{}'",
                    amount, substance
                )));
            }
        }

        for waste in &step.waste_outputs {
            if waste.quantity < Decimal::ZERO {
                return Err(invalid(format!("negative waste quantity {}", waste.quantity)));
            }
            if !is_percentage(waste.recovery_rate) {
                return Err(invalid(format!(
                    "recovery_rate {} is outside 0-100",
                    waste.recovery_rate
                )));
            }
        }
    }
    Ok(())
}

fn is_percentage(value: Decimal) -> bool {
    (Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const INPUT: &str = r#"{
        "functional_unit": "1 bracket",
        "system_boundary": "cradle-to-gate",
        "steps": [
            {
                "id": "cut",
                "order": 1,
                "name": "Cutting",
                "category": "manufacturing",
                "input_materials": [
                    { "material": "steel", "quantity": "2.5", "recycled_content": "40" }
                ],
                "energy_inputs": [ { "type": "electricity_grid", "amount": "3" } ],
                "emissions": { "CO2": "0.2" }
            }
        ]
    }"#;

    #[test]
    fn test_parse_input() {
        let input = parse_input_str(INPUT).unwrap();
        assert_eq!(input.functional_unit, "1 bracket");
        assert_eq!(input.steps.len(), 1);
        let step = &input.steps[0];
        assert_eq!(step.input_materials[0].quantity, dec!(2.5));
        assert_eq!(step.emissions["CO2"], dec!(0.2));
        assert!(step.waste_outputs.is_empty());
    }

    #[test]
    fn test_parse_numeric_quantities() {
        let json = r#"{
            "steps": [
                {
                    "id": "cast",
                    "order": 1,
                    "name": "Casting",
                    "category": "processing",
                    "input_materials": [ { "material": "steel", "quantity": 100, "recycled_content": 25 } ],
                    "energy_inputs": [ { "type": "natural_gas", "amount": 2.5 } ],
                    "emissions": { "CO2": 0.75, "CH4": "0.01" },
                    "waste_outputs": [ { "quantity": 4, "recovery_rate": 50.5 } ]
                }
            ]
        }"#;
        let input = parse_input_str(json).unwrap();
        let step = &input.steps[0];
        assert_eq!(step.input_materials[0].quantity, dec!(100));
        assert_eq!(step.input_materials[0].recycled_content, dec!(25));
        assert_eq!(step.energy_inputs[0].amount, dec!(2.5));
        assert_eq!(step.emissions["CO2"], dec!(0.75));
        assert_eq!(step.emissions["CH4"], dec!(0.01));
        assert_eq!(step.waste_outputs[0].recovery_rate, dec!(50.5));

        let negative = json.replace(r#""quantity": 100"#, r#""quantity": -100"#);
        assert!(matches!(
            parse_input_str(&negative),
            Err(LcaError::InvalidStep { .. })
        ));
    }

    #[test]
    fn test_labels_default() {
        let input = parse_input_str(r#"{ "steps": [] }"#).unwrap();
        assert_eq!(input.functional_unit, "1 unit");
        assert_eq!(input.system_boundary, "cradle-to-grave");
    }

    #[test]
    fn test_missing_quantity_is_parse_error() {
        let json = r#"{ "steps": [ { "id": "a", "order": 1, "name": "A", "category": "processing",
            "input_materials": [ { "material": "steel" } ] } ] }"#;
        let err = parse_input_str(json).unwrap_err();
        assert!(matches!(err, LcaError::InputParse(_)));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let json = INPUT.replace(r#""recycled_content": "40""#, r#""recycled_content": "140""#);
        let err = parse_input_str(&json).unwrap_err();
        match err {
            LcaError::InvalidStep { step_id, reason } => {
                assert_eq!(step_id, "cut");
                assert!(reason.contains("recycled_content"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let json = INPUT.replace(r#""amount": "3""#, r#""amount": "-3""#);
        assert!(matches!(
            parse_input_str(&json),
            Err(LcaError::InvalidStep { .. })
        ));
    }

    #[test]
    fn test_load_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(INPUT.as_bytes()).unwrap();
        let input = load_input(file.path()).unwrap();
        assert_eq!(input.steps[0].id, "cut");

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        bad.write_all(b"{ not json").unwrap();
        let err = load_input(bad.path()).unwrap_err();
        assert!(err.to_string().contains(&bad.path().display().to_string()));
    }
}
