use crate::calculate::circularity;
use crate::calculate::outcome::CalculationResult;
use crate::calculate::step::StepCalculator;
use crate::error::LcaError;
use crate::factors::schema::FactorTables;
use crate::model::{ImpactVector, ProcessStep};
use crate::reference::ReferenceData;
use crate::resolve::ImpactResolver;
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

/// Aggregates step impacts and circularity for a sequence of process steps.
///
/// Stateless apart from its borrowed tables; `calculate` can run from
/// several threads at once.
#[derive(Debug, Clone, Copy)]
pub struct LcaEngine<'a> {
    resolver: ImpactResolver<'a>,
}

impl<'a> LcaEngine<'a> {
    pub fn new(tables: &'a FactorTables, reference: &'a ReferenceData) -> Self {
        Self {
            resolver: ImpactResolver::new(tables, reference),
        }
    }

    /// Run one aggregation pass.
    ///
    /// Steps are processed in ascending `order` (input order for ties).
    /// Fails on an empty sequence, duplicate step ids or arithmetic overflow;
    /// every reference miss is resolved by a default and reported in `diagnostics`.
    pub fn calculate(
        &self,
        steps: &[ProcessStep],
        functional_unit: &str,
        system_boundary: &str,
    ) -> Result<CalculationResult, LcaError> {
        let start = Instant::now();

        if steps.is_empty() {
            return Err(LcaError::EmptySteps);
        }

        let mut ordered: Vec<&ProcessStep> = steps.iter().collect();
        ordered.sort_by_key(|s| s.order);

        let mut seen = HashSet::new();
        for step in &ordered {
            if !seen.insert(step.id.as_str()) {
                return Err(LcaError::DuplicateStepId {
                    id: step.id.clone(),
                });
            }
        }

        let calculator = StepCalculator::new(self.resolver);
        let mut total_impacts = ImpactVector::zero();
        let mut process_breakdown = BTreeMap::new();
        let mut step_order = Vec::with_capacity(ordered.len());
        let mut diagnostics = Vec::new();

        for step in ordered {
            let detail = calculator.compute_detailed(step)?;
            total_impacts
                .checked_accumulate(&detail.impacts)
                .ok_or_else(|| LcaError::Overflow(format!("total impacts at step '{}'", step.id)))?;
            process_breakdown.insert(step.id.clone(), detail.impacts);
            step_order.push(step.id.clone());
            diagnostics.extend(detail.misses);
        }

        let circularity_metrics = circularity::compute(steps)?;
        let calculation_time = start.elapsed();

        tracing::info!(
            steps = step_order.len(),
            defaults_applied = diagnostics.len(),
            elapsed_us = calculation_time.as_micros() as u64,
            "LCA calculation completed"
        );

        Ok(CalculationResult {
            total_impacts,
            process_breakdown,
            step_order,
            functional_unit: functional_unit.to_string(),
            system_boundary: system_boundary.to_string(),
            circularity_metrics,
            calculation_time,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::builtin::default_tables;
    use crate::model::{EnergyInput, ImpactCategory, MaterialInput};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn step(id: &str, order: i64, category: &str, material: &str, qty: i64) -> ProcessStep {
        ProcessStep {
            id: id.into(),
            order,
            name: format!("{id} process"),
            category: category.into(),
            input_materials: vec![MaterialInput {
                material: material.into(),
                quantity: qty.into(),
                recycled_content: dec!(0),
            }],
            output_materials: vec![],
            energy_inputs: vec![EnergyInput {
                energy_type: "natural_gas".into(),
                amount: dec!(10),
            }],
            emissions: BTreeMap::new(),
            waste_outputs: vec![],
        }
    }

    #[test]
    fn test_empty_steps_rejected() {
        let reference = ReferenceData::default();
        let engine = LcaEngine::new(default_tables(), &reference);
        let err = engine.calculate(&[], "1 kg", "cradle-to-gate").unwrap_err();
        assert!(matches!(err, LcaError::EmptySteps));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let reference = ReferenceData::default();
        let engine = LcaEngine::new(default_tables(), &reference);
        let steps = vec![
            step("a", 1, "processing", "steel", 1),
            step("a", 2, "processing", "steel", 1),
        ];
        let err = engine.calculate(&steps, "1 kg", "gate").unwrap_err();
        assert!(matches!(err, LcaError::DuplicateStepId { .. }));
    }

    #[test]
    fn test_steps_processed_in_order() {
        let reference = ReferenceData::default();
        let engine = LcaEngine::new(default_tables(), &reference);
        let steps = vec![
            step("late", 3, "transport", "steel", 1),
            step("early", 1, "extraction", "copper ore", 1),
            step("middle", 2, "processing", "plastic pellets", 1),
        ];
        let result = engine.calculate(&steps, "1 unit", "cradle-to-grave").unwrap();
        assert_eq!(result.step_order, vec!["early", "middle", "late"]);
        assert_eq!(result.functional_unit, "1 unit");
        assert_eq!(result.system_boundary, "cradle-to-grave");
    }

    #[test]
    fn test_total_is_sum_of_breakdown() {
        let reference = ReferenceData::default();
        let engine = LcaEngine::new(default_tables(), &reference);
        let steps = vec![
            step("a", 1, "extraction", "aluminum", 10),
            step("b", 2, "recycling", "copper", 4),
            step("c", 3, "end_of_life", "plastic", 7),
        ];
        let result = engine.calculate(&steps, "1 kg", "gate").unwrap();
        let mut sum = ImpactVector::zero();
        for v in result.process_breakdown.values() {
            sum.checked_accumulate(v).unwrap();
        }
        assert_eq!(sum, result.total_impacts);
        // 10*8.2 + 4*3.2 + 7*1.8 + 3 * 10 * 0.2
        assert_eq!(
            result.total_impacts.get(ImpactCategory::ClimateChange),
            dec!(113.4)
        );
    }

    #[test]
    fn test_defaults_reported_in_diagnostics() {
        let reference = ReferenceData::default();
        let engine = LcaEngine::new(default_tables(), &reference);
        let result = engine
            .calculate(&[step("a", 1, "processing", "granite", 5)], "1 kg", "gate")
            .unwrap();
        assert!(result
            .diagnostics
            .iter()
            .any(|m| m.name == "granite" && m.fallback.contains("steel")));
    }

    #[test]
    fn test_overflowing_quantity_fails_instead_of_panicking() {
        let reference = ReferenceData::default();
        let engine = LcaEngine::new(default_tables(), &reference);
        let mut huge = step("a", 1, "processing", "steel", 1);
        huge.input_materials[0].quantity = Decimal::MAX;
        let err = engine.calculate(&[huge], "1 kg", "gate").unwrap_err();
        assert!(matches!(err, LcaError::Overflow(_)));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_overflowing_total_across_steps_fails() {
        let reference = ReferenceData::default();
        let engine = LcaEngine::new(default_tables(), &reference);
        // Each step stays in range on its own; their sum does not.
        // water_depletion: 8.0 * MAX / 10 per step.
        let tenth = Decimal::MAX / dec!(10);
        let mut a = step("a", 1, "processing", "steel", 1);
        a.input_materials[0].quantity = tenth;
        let mut b = step("b", 2, "processing", "steel", 1);
        b.input_materials[0].quantity = tenth;
        let err = engine.calculate(&[a, b], "1 kg", "gate").unwrap_err();
        assert!(err.to_string().contains("total impacts at step 'b'"));
    }
}
