use crate::calculate::outcome::{MissKind, ReferenceMiss, StepImpacts};
use crate::error::LcaError;
use crate::model::{ImpactCategory, ImpactVector, MaterialInput, ProcessStep};
use crate::resolve::{FactorSource, ImpactResolver};
use rust_decimal::Decimal;

/// Computes the impact vector of one process step.
///
/// Materials contribute to all eleven categories, energy to the categories
/// its table lists, emissions to the categories their substance maps to.
/// Ranges are not validated here; only arithmetic overflow fails.
#[derive(Debug, Clone, Copy)]
pub struct StepCalculator<'a> {
    resolver: ImpactResolver<'a>,
}

impl<'a> StepCalculator<'a> {
    pub fn new(resolver: ImpactResolver<'a>) -> Self {
        Self { resolver }
    }

    pub fn compute(&self, step: &ProcessStep) -> Result<ImpactVector, LcaError> {
        Ok(self.compute_detailed(step)?.impacts)
    }

    /// Impacts together with the step's base factors and every default that was applied.
    pub fn compute_detailed(&self, step: &ProcessStep) -> Result<StepImpacts, LcaError> {
        let mut impacts = ImpactVector::zero();
        let mut misses = Vec::new();

        let base_factors = self.resolver.process_factors(&step.name, &step.category);
        if let FactorSource::CategoryDefault { category } = &base_factors.source {
            if step.process_category().is_none() {
                misses.push(ReferenceMiss {
                    step_id: step.id.clone(),
                    kind: MissKind::ProcessCategory,
                    name: step.category.clone(),
                    fallback: format!("treated as '{}'", category),
                });
            }
            misses.push(ReferenceMiss {
                step_id: step.id.clone(),
                kind: MissKind::Process,
                name: step.name.clone(),
                fallback: format!("'{}' category defaults", category),
            });
        }

        for input in &step.input_materials {
            if let Some(miss) = self.add_material(step, input, &mut impacts)? {
                misses.push(miss);
            }
        }

        for energy in &step.energy_inputs {
            let mut fallback = false;
            for category in ImpactCategory::ALL {
                let res = self.resolver.energy_factor(&energy.energy_type, category);
                fallback |= res.source == FactorSource::GridFallback;
                add_product(&mut impacts, category, energy.amount, res.value, step)?;
            }
            if fallback {
                misses.push(ReferenceMiss {
                    step_id: step.id.clone(),
                    kind: MissKind::EnergyType,
                    name: energy.energy_type.clone(),
                    fallback: "electricity_grid factors".into(),
                });
            }
        }

        for (substance, amount) in &step.emissions {
            for category in ImpactCategory::ALL {
                let res = self.resolver.emission_factor(substance, category);
                add_product(&mut impacts, category, *amount, res.value, step)?;
            }
            if !self.resolver.is_registered_substance(substance) {
                misses.push(ReferenceMiss {
                    step_id: step.id.clone(),
                    kind: MissKind::Substance,
                    name: substance.clone(),
                    fallback: "no characterization factor, contributes zero".into(),
                });
            }
        }

        for miss in &misses {
            tracing::warn!(
                step = %miss.step_id,
                kind = ?miss.kind,
                name = %miss.name,
                "reference data missing, using {}",
                miss.fallback
            );
        }

        Ok(StepImpacts {
            impacts,
            base_factors,
            misses,
        })
    }

    fn add_material(
        &self,
        step: &ProcessStep,
        input: &MaterialInput,
        impacts: &mut ImpactVector,
    ) -> Result<Option<ReferenceMiss>, LcaError> {
        let mut defaulted = Vec::new();
        let mut default_source = None;

        for category in ImpactCategory::ALL {
            let res = self.resolver.material_factor(&input.material, category);
            add_product(impacts, category, input.quantity, res.value, step)?;
            if res.source != FactorSource::StoredProperty {
                defaulted.push(category.as_str());
                default_source.get_or_insert(res.source);
            }
        }

        let Some(source) = default_source else {
            return Ok(None);
        };
        let fallback = match source {
            FactorSource::MaterialFamily { family } => format!("'{}' family defaults", family),
            FactorSource::GenericFamily { family } => {
                format!("generic '{}' defaults", family)
            }
            _ => "zero".to_string(),
        };
        let registered = self.resolver.reference().find_material(&input.material).is_some();
        Ok(Some(ReferenceMiss {
            step_id: step.id.clone(),
            kind: MissKind::Material,
            name: input.material.clone(),
            fallback: if registered {
                format!("{} for {}", fallback, defaulted.join(", "))
            } else {
                fallback
            },
        }))
    }
}

fn add_product(
    impacts: &mut ImpactVector,
    category: ImpactCategory,
    amount: Decimal,
    factor: Decimal,
    step: &ProcessStep,
) -> Result<(), LcaError> {
    amount
        .checked_mul(factor)
        .and_then(|v| impacts.checked_add(category, v))
        .ok_or_else(|| LcaError::Overflow(format!("{} of step '{}'", category, step.id)))
}
