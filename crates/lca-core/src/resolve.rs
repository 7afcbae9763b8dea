//! Factor resolution: stored reference data first, factor tables second.
//!
//! Every lookup answers with a value. A miss degrades to a documented
//! default and the returned [`FactorSource`] says which one was used.

use crate::factors::schema::{FactorMap, FactorTables};
use crate::model::{EnergyType, ImpactCategory, ImpactVector, ProcessCategory};
use crate::reference::ReferenceData;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where a resolved factor came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FactorSource {
    /// Environmental property stored on the registered material.
    StoredProperty,
    /// Family default, family name found inside the material name.
    MaterialFamily { family: String },
    /// Generic family default, nothing else matched.
    GenericFamily { family: String },
    /// Energy table entry for a recognized carrier.
    EnergyTable { carrier: EnergyType },
    /// Carrier not recognized, grid electricity used instead.
    GridFallback,
    /// Registered characterization factor.
    Characterization,
    /// Substance/category pair not registered, contributes zero.
    Unregistered,
    /// Impact factors of a registered process.
    RegisteredProcess,
    /// Category default for an unregistered process.
    CategoryDefault { category: ProcessCategory },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub value: Decimal,
    pub source: FactorSource,
}

/// Base factor set of a process step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessFactors {
    pub factors: ImpactVector,
    pub source: FactorSource,
}

/// One link of the material fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialStrategy {
    StoredProperty,
    FamilySubstring,
    GenericFamily,
}

/// Material strategies in the order they are tried. First hit wins.
pub const MATERIAL_STRATEGIES: [MaterialStrategy; 3] = [
    MaterialStrategy::StoredProperty,
    MaterialStrategy::FamilySubstring,
    MaterialStrategy::GenericFamily,
];

impl MaterialStrategy {
    fn try_resolve(
        self,
        resolver: &ImpactResolver<'_>,
        material: &str,
        category: ImpactCategory,
    ) -> Option<Resolution> {
        match self {
            MaterialStrategy::StoredProperty => resolver
                .reference
                .find_material(material)
                .and_then(|m| m.environmental_factor(category))
                .map(|value| Resolution {
                    value,
                    source: FactorSource::StoredProperty,
                }),
            MaterialStrategy::FamilySubstring => {
                // Substring, not equality: "stainless steel sheet" matches "steel".
                let lower = material.to_lowercase();
                resolver
                    .tables
                    .material_families
                    .iter()
                    .find(|f| lower.contains(&f.name))
                    .map(|f| Resolution {
                        value: factor_or_zero(&f.factors, category),
                        source: FactorSource::MaterialFamily {
                            family: f.name.clone(),
                        },
                    })
            }
            MaterialStrategy::GenericFamily => {
                let tables = resolver.tables;
                tables.family(&tables.generic_family).map(|f| Resolution {
                    value: factor_or_zero(&f.factors, category),
                    source: FactorSource::GenericFamily {
                        family: f.name.clone(),
                    },
                })
            }
        }
    }
}

fn factor_or_zero(factors: &FactorMap, category: ImpactCategory) -> Decimal {
    factors.get(&category).copied().unwrap_or_default()
}

/// Resolves per-unit factors against reference data and factor tables.
///
/// Holds only shared borrows, so one resolver can serve concurrent calculations.
#[derive(Debug, Clone, Copy)]
pub struct ImpactResolver<'a> {
    tables: &'a FactorTables,
    reference: &'a ReferenceData,
}

impl<'a> ImpactResolver<'a> {
    pub fn new(tables: &'a FactorTables, reference: &'a ReferenceData) -> Self {
        Self { tables, reference }
    }

    pub fn tables(&self) -> &'a FactorTables {
        self.tables
    }

    pub fn reference(&self) -> &'a ReferenceData {
        self.reference
    }

    /// Per-kg factor of a material for one category.
    pub fn material_factor(&self, material: &str, category: ImpactCategory) -> Resolution {
        MATERIAL_STRATEGIES
            .iter()
            .find_map(|s| s.try_resolve(self, material, category))
            .unwrap_or_else(|| {
                tracing::debug!(material, %category, "no material factor resolved, using zero");
                Resolution {
                    value: Decimal::ZERO,
                    source: FactorSource::Unregistered,
                }
            })
    }

    /// Per-kWh factor of an energy carrier for one category.
    ///
    /// Unrecognized carriers use the grid electricity entry. Categories the
    /// table does not list contribute zero.
    pub fn energy_factor(&self, energy_type: &str, category: ImpactCategory) -> Resolution {
        let (carrier, source) = match EnergyType::from_str_loose(energy_type) {
            Some(carrier) if self.tables.energy.contains_key(&carrier) => {
                (carrier, FactorSource::EnergyTable { carrier })
            }
            _ => (EnergyType::ElectricityGrid, FactorSource::GridFallback),
        };
        let value = self
            .tables
            .energy
            .get(&carrier)
            .map(|f| factor_or_zero(f, category))
            .unwrap_or_default();
        Resolution { value, source }
    }

    /// Characterization factor of a substance for one category; zero if unregistered.
    pub fn emission_factor(&self, substance: &str, category: ImpactCategory) -> Resolution {
        match self
            .tables
            .characterization
            .get(substance)
            .and_then(|f| f.get(&category))
        {
            Some(&value) => Resolution {
                value,
                source: FactorSource::Characterization,
            },
            None => Resolution {
                value: Decimal::ZERO,
                source: FactorSource::Unregistered,
            },
        }
    }

    /// True if the substance has at least one registered characterization factor.
    pub fn is_registered_substance(&self, substance: &str) -> bool {
        self.tables.characterization.contains_key(substance)
    }

    /// Base factor set of a step: registered process factors, or the category
    /// default (processing when the category is not recognized).
    pub fn process_factors(&self, name: &str, category: &str) -> ProcessFactors {
        if let Some(process) = self
            .reference
            .find_process(name)
            .filter(|p| !p.impact_factors.is_empty())
        {
            return ProcessFactors {
                factors: ImpactVector::from(process.impact_factors.clone()),
                source: FactorSource::RegisteredProcess,
            };
        }

        let category =
            ProcessCategory::from_str_loose(category).unwrap_or(ProcessCategory::Processing);
        tracing::debug!(process = name, %category, "process not registered, using category defaults");
        let factors = self
            .tables
            .process_defaults
            .get(&category)
            .cloned()
            .map(ImpactVector::from)
            .unwrap_or_default();
        ProcessFactors {
            factors,
            source: FactorSource::CategoryDefault { category },
        }
    }
}
