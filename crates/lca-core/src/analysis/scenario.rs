//! Step-set transformations used to build what-if scenarios and
//! sensitivity variations from a baseline.

use crate::analysis::sensitivity::{SensitivityParameter, Variation};
use crate::error::LcaError;
use crate::model::{lenient_decimal, EnergyType, ProcessStep};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One edit applied to a copy of a step set.
///
/// `step` restricts the edit to one step id; omitted, it applies to all steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StepChange {
    /// Switch energy inputs to another carrier, optionally only those of carrier `from`.
    SetEnergyType {
        step: Option<String>,
        from: Option<String>,
        to: String,
    },
    ScaleEnergy {
        step: Option<String>,
        #[serde(deserialize_with = "lenient_decimal::deserialize")]
        factor: Decimal,
    },
    /// Multiply input quantities, optionally of one material only.
    ScaleMaterial {
        step: Option<String>,
        material: Option<String>,
        #[serde(deserialize_with = "lenient_decimal::deserialize")]
        factor: Decimal,
    },
    ReplaceMaterial {
        step: Option<String>,
        from: String,
        to: String,
    },
    SetRecycledContent {
        step: Option<String>,
        material: Option<String>,
        #[serde(deserialize_with = "lenient_decimal::deserialize")]
        value: Decimal,
    },
    /// Set the recovery rate of all waste outputs.
    SetRecoveryRate {
        step: Option<String>,
        #[serde(deserialize_with = "lenient_decimal::deserialize")]
        value: Decimal,
    },
    SetEmission {
        step: Option<String>,
        substance: String,
        #[serde(deserialize_with = "lenient_decimal::deserialize")]
        amount: Decimal,
    },
    ScaleEmissions {
        step: Option<String>,
        #[serde(deserialize_with = "lenient_decimal::deserialize")]
        factor: Decimal,
    },
}

impl StepChange {
    fn target(&self) -> Option<&str> {
        match self {
            StepChange::SetEnergyType { step, .. }
            | StepChange::ScaleEnergy { step, .. }
            | StepChange::ScaleMaterial { step, .. }
            | StepChange::ReplaceMaterial { step, .. }
            | StepChange::SetRecycledContent { step, .. }
            | StepChange::SetRecoveryRate { step, .. }
            | StepChange::SetEmission { step, .. }
            | StepChange::ScaleEmissions { step, .. } => step.as_deref(),
        }
    }

    fn validate(&self) -> Result<(), LcaError> {
        match self {
            StepChange::SetEnergyType { from, to, .. } => {
                parse_carrier(to)?;
                if let Some(from) = from {
                    parse_carrier(from)?;
                }
                Ok(())
            }
            StepChange::ScaleEnergy { factor, .. }
            | StepChange::ScaleMaterial { factor, .. }
            | StepChange::ScaleEmissions { factor, .. } => {
                if *factor < Decimal::ZERO {
                    return Err(LcaError::InvalidChange(format!(
                        "scale factor must not be negative, got {}",
                        factor
                    )));
                }
                Ok(())
            }
            StepChange::ReplaceMaterial { to, .. } => {
                if to.trim().is_empty() {
                    return Err(LcaError::InvalidChange(
                        "replacement material name must not be empty".into(),
                    ));
                }
                Ok(())
            }
            StepChange::SetRecycledContent { value, .. } | StepChange::SetRecoveryRate { value, .. } => {
                check_percentage(*value)
            }
            StepChange::SetEmission {
                substance, amount, ..
            } => {
                if substance.trim().is_empty() {
                    return Err(LcaError::InvalidChange(
                        "substance name must not be empty".into(),
                    ));
                }
                if *amount < Decimal::ZERO {
                    return Err(LcaError::InvalidChange(format!(
                        "emission amount must not be negative, got {}",
                        amount
                    )));
                }
                Ok(())
            }
        }
    }

    /// Apply to one step; returns the number of entries touched.
    fn apply(&self, step: &mut ProcessStep) -> Result<usize, LcaError> {
        let mut touched = 0;
        match self {
            StepChange::SetEnergyType { from, to, .. } => {
                let from = from.as_deref().and_then(EnergyType::from_str_loose);
                let to = EnergyType::from_str_loose(to).unwrap_or(EnergyType::ElectricityGrid);
                for input in &mut step.energy_inputs {
                    let current = input.carrier().unwrap_or(EnergyType::ElectricityGrid);
                    if from.is_none_or(|f| f == current) {
                        input.energy_type = to.as_str().to_string();
                        touched += 1;
                    }
                }
            }
            StepChange::ScaleEnergy { factor, .. } => {
                for input in &mut step.energy_inputs {
                    input.amount = scale(input.amount, *factor, &step.id)?;
                    touched += 1;
                }
            }
            StepChange::ScaleMaterial {
                material, factor, ..
            } => {
                for input in &mut step.input_materials {
                    if matches_material(material.as_deref(), &input.material) {
                        input.quantity = scale(input.quantity, *factor, &step.id)?;
                        touched += 1;
                    }
                }
            }
            StepChange::ReplaceMaterial { from, to, .. } => {
                for input in &mut step.input_materials {
                    if input.material.eq_ignore_ascii_case(from) {
                        input.material = to.clone();
                        touched += 1;
                    }
                }
            }
            StepChange::SetRecycledContent {
                material, value, ..
            } => {
                for input in &mut step.input_materials {
                    if matches_material(material.as_deref(), &input.material) {
                        input.recycled_content = *value;
                        touched += 1;
                    }
                }
            }
            StepChange::SetRecoveryRate { value, .. } => {
                for waste in &mut step.waste_outputs {
                    waste.recovery_rate = *value;
                    touched += 1;
                }
            }
            StepChange::SetEmission {
                substance, amount, ..
            } => {
                step.emissions.insert(substance.clone(), *amount);
                touched += 1;
            }
            StepChange::ScaleEmissions { factor, .. } => {
                for amount in step.emissions.values_mut() {
                    *amount = scale(*amount, *factor, &step.id)?;
                    touched += 1;
                }
            }
        }
        Ok(touched)
    }
}

fn scale(value: Decimal, factor: Decimal, step_id: &str) -> Result<Decimal, LcaError> {
    value.checked_mul(factor).ok_or_else(|| {
        LcaError::Overflow(format!("scaling {} by {} in step '{}'", value, factor, step_id))
    })
}

fn parse_carrier(s: &str) -> Result<EnergyType, LcaError> {
    EnergyType::from_str_loose(s).ok_or_else(|| {
        LcaError::InvalidChange(format!(
            "unknown energy type '{}'. Available: {}",
            s,
            EnergyType::ALL.map(|e| e.as_str()).join(", ")
        ))
    })
}

fn check_percentage(value: Decimal) -> Result<(), LcaError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(LcaError::InvalidChange(format!(
            "percentage must be within 0-100, got {}",
            value
        )));
    }
    Ok(())
}

fn matches_material(filter: Option<&str>, material: &str) -> bool {
    filter.is_none_or(|f| f.eq_ignore_ascii_case(material))
}

/// Apply changes in order to a copy of `steps`.
///
/// The result passes the same range checks as parsed input.
pub fn apply_changes(
    steps: &[ProcessStep],
    changes: &[StepChange],
) -> Result<Vec<ProcessStep>, LcaError> {
    let mut modified = steps.to_vec();

    for change in changes {
        change.validate()?;
        let touched = match change.target() {
            Some(id) => {
                let step = modified.iter_mut().find(|s| s.id == id).ok_or_else(|| {
                    LcaError::InvalidChange(format!("no process step with id '{}'", id))
                })?;
                change.apply(step)?
            }
            None => modified
                .iter_mut()
                .map(|s| change.apply(s))
                .sum::<Result<usize, LcaError>>()?,
        };
        if touched == 0 {
            tracing::warn!(?change, "scenario change matched nothing");
        }
    }

    crate::input::validate_steps(&modified)?;
    Ok(modified)
}

/// A named set of changes forming one what-if scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDef {
    #[serde(default)]
    pub name: Option<String>,
    pub changes: Vec<StepChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepVariationDef {
    pub label: String,
    pub changes: Vec<StepChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepParameterDef {
    pub name: String,
    pub variations: Vec<SweepVariationDef>,
}

/// Sensitivity sweep described as change lists against a baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepDef {
    pub parameters: Vec<SweepParameterDef>,
}

impl SweepDef {
    /// Materialize every variation as a step set derived from `baseline`.
    pub fn build(&self, baseline: &[ProcessStep]) -> Result<Vec<SensitivityParameter>, LcaError> {
        self.parameters
            .iter()
            .map(|p| {
                let variations = p
                    .variations
                    .iter()
                    .map(|v| {
                        Ok(Variation {
                            label: v.label.clone(),
                            steps: apply_changes(baseline, &v.changes)?,
                        })
                    })
                    .collect::<Result<Vec<_>, LcaError>>()?;
                Ok(SensitivityParameter {
                    name: p.name.clone(),
                    variations,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnergyInput, MaterialInput, WasteOutput};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn baseline() -> Vec<ProcessStep> {
        vec![
            ProcessStep {
                id: "melt".into(),
                order: 1,
                name: "Melting".into(),
                category: "processing".into(),
                input_materials: vec![
                    MaterialInput {
                        material: "Steel".into(),
                        quantity: dec!(100),
                        recycled_content: dec!(10),
                    },
                    MaterialInput {
                        material: "copper".into(),
                        quantity: dec!(5),
                        recycled_content: dec!(0),
                    },
                ],
                output_materials: vec![],
                energy_inputs: vec![
                    EnergyInput {
                        energy_type: "electricity_grid".into(),
                        amount: dec!(50),
                    },
                    EnergyInput {
                        energy_type: "natural_gas".into(),
                        amount: dec!(20),
                    },
                ],
                emissions: BTreeMap::from([("CO2".to_string(), dec!(4))]),
                waste_outputs: vec![],
            },
            ProcessStep {
                id: "eol".into(),
                order: 2,
                name: "Disposal".into(),
                category: "end_of_life".into(),
                input_materials: vec![],
                output_materials: vec![],
                energy_inputs: vec![EnergyInput {
                    energy_type: "electricity_grid".into(),
                    amount: dec!(5),
                }],
                emissions: BTreeMap::new(),
                waste_outputs: vec![WasteOutput {
                    quantity: dec!(100),
                    recovery_rate: dec!(30),
                }],
            },
        ]
    }

    #[test]
    fn test_set_energy_type_with_from_filter() {
        let changes = vec![StepChange::SetEnergyType {
            step: None,
            from: Some("electricity_grid".into()),
            to: "electricity_renewable".into(),
        }];
        let out = apply_changes(&baseline(), &changes).unwrap();
        assert_eq!(out[0].energy_inputs[0].energy_type, "electricity_renewable");
        assert_eq!(out[0].energy_inputs[1].energy_type, "natural_gas");
        assert_eq!(out[1].energy_inputs[0].energy_type, "electricity_renewable");
    }

    #[test]
    fn test_baseline_is_not_mutated() {
        let base = baseline();
        let changes = vec![StepChange::ScaleEnergy {
            step: Some("melt".into()),
            factor: dec!(2),
        }];
        let out = apply_changes(&base, &changes).unwrap();
        assert_eq!(out[0].energy_inputs[0].amount, dec!(100));
        assert_eq!(out[1].energy_inputs[0].amount, dec!(5));
        assert_eq!(base[0].energy_inputs[0].amount, dec!(50));
    }

    #[test]
    fn test_material_edits_match_case_insensitively() {
        let changes = vec![
            StepChange::ScaleMaterial {
                step: None,
                material: Some("steel".into()),
                factor: dec!(0.5),
            },
            StepChange::SetRecycledContent {
                step: Some("melt".into()),
                material: Some("STEEL".into()),
                value: dec!(60),
            },
            StepChange::ReplaceMaterial {
                step: None,
                from: "COPPER".into(),
                to: "aluminum".into(),
            },
        ];
        let out = apply_changes(&baseline(), &changes).unwrap();
        assert_eq!(out[0].input_materials[0].quantity, dec!(50));
        assert_eq!(out[0].input_materials[0].recycled_content, dec!(60));
        assert_eq!(out[0].input_materials[1].quantity, dec!(5));
        assert_eq!(out[0].input_materials[1].material, "aluminum");
    }

    #[test]
    fn test_emission_and_recovery_edits() {
        let changes = vec![
            StepChange::SetEmission {
                step: Some("melt".into()),
                substance: "CH4".into(),
                amount: dec!(1),
            },
            StepChange::ScaleEmissions {
                step: None,
                factor: dec!(0),
            },
            StepChange::SetRecoveryRate {
                step: Some("eol".into()),
                value: dec!(90),
            },
        ];
        let out = apply_changes(&baseline(), &changes).unwrap();
        assert!(out[0].emissions.values().all(|v| v.is_zero()));
        assert_eq!(out[0].emissions.len(), 2);
        assert_eq!(out[1].waste_outputs[0].recovery_rate, dec!(90));
    }

    #[test]
    fn test_invalid_changes_rejected() {
        let unknown_step = vec![StepChange::ScaleEnergy {
            step: Some("nope".into()),
            factor: dec!(1),
        }];
        assert!(matches!(
            apply_changes(&baseline(), &unknown_step),
            Err(LcaError::InvalidChange(_))
        ));

        let bad_carrier = vec![StepChange::SetEnergyType {
            step: None,
            from: None,
            to: "hydrogen".into(),
        }];
        assert!(apply_changes(&baseline(), &bad_carrier).is_err());

        let bad_pct = vec![StepChange::SetRecoveryRate {
            step: None,
            value: dec!(120),
        }];
        assert!(apply_changes(&baseline(), &bad_pct).is_err());

        let negative = vec![StepChange::ScaleMaterial {
            step: None,
            material: None,
            factor: dec!(-1),
        }];
        assert!(apply_changes(&baseline(), &negative).is_err());
    }

    #[test]
    fn test_negative_emission_rejected() {
        let changes = vec![StepChange::SetEmission {
            step: Some("melt".into()),
            substance: "CO2".into(),
            amount: dec!(-5),
        }];
        let err = apply_changes(&baseline(), &changes).unwrap_err();
        assert!(matches!(err, LcaError::InvalidChange(_)));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_modified_steps_are_revalidated() {
        let mut base = baseline();
        base[1].waste_outputs[0].quantity = dec!(-1);
        let changes = vec![StepChange::ScaleEnergy {
            step: None,
            factor: dec!(1),
        }];
        assert!(matches!(
            apply_changes(&base, &changes),
            Err(LcaError::InvalidStep { ref step_id, .. }) if step_id == "eol"
        ));
    }

    #[test]
    fn test_scaling_out_of_range_is_an_error() {
        let mut base = baseline();
        base[0].input_materials[0].quantity = Decimal::MAX;
        let changes = vec![StepChange::ScaleMaterial {
            step: Some("melt".into()),
            material: Some("steel".into()),
            factor: dec!(2),
        }];
        assert!(matches!(
            apply_changes(&base, &changes),
            Err(LcaError::Overflow(_))
        ));
    }

    #[test]
    fn test_change_json_format() {
        let json = r#"[
            { "op": "set_energy_type", "to": "coal" },
            { "op": "scale_material", "material": "steel", "factor": "1.1" },
            { "op": "scale_energy", "step": "eol", "factor": 2 }
        ]"#;
        let changes: Vec<StepChange> = serde_json::from_str(json).unwrap();
        assert_eq!(
            changes[0],
            StepChange::SetEnergyType {
                step: None,
                from: None,
                to: "coal".into()
            }
        );
        let out = apply_changes(&baseline(), &changes).unwrap();
        assert!(out[0].energy_inputs.iter().all(|e| e.energy_type == "coal"));
        assert_eq!(out[0].input_materials[0].quantity, dec!(110));
        assert_eq!(out[1].energy_inputs[0].amount, dec!(10));
    }

    #[test]
    fn test_sweep_builds_variations() {
        let sweep: SweepDef = serde_json::from_str(
            r#"{
                "parameters": [
                    {
                        "name": "energy_type",
                        "variations": [
                            { "label": "renewable", "changes": [ { "op": "set_energy_type", "to": "electricity_renewable" } ] },
                            { "label": "coal", "changes": [ { "op": "set_energy_type", "to": "coal" } ] }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();
        let params = sweep.build(&baseline()).unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].variations.len(), 2);
        assert_eq!(
            params[0].variations[1].steps[1].energy_inputs[0].energy_type,
            "coal"
        );
    }
}
