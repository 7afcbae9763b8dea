use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The eleven impact categories every impact vector carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactCategory {
    ClimateChange,
    FossilDepletion,
    MetalDepletion,
    WaterDepletion,
    Acidification,
    Eutrophication,
    OzoneDepletion,
    LandUse,
    ParticulateMatter,
    ToxicityHuman,
    ToxicityEco,
}

impl ImpactCategory {
    pub const ALL: [ImpactCategory; 11] = [
        ImpactCategory::ClimateChange,
        ImpactCategory::FossilDepletion,
        ImpactCategory::MetalDepletion,
        ImpactCategory::WaterDepletion,
        ImpactCategory::Acidification,
        ImpactCategory::Eutrophication,
        ImpactCategory::OzoneDepletion,
        ImpactCategory::LandUse,
        ImpactCategory::ParticulateMatter,
        ImpactCategory::ToxicityHuman,
        ImpactCategory::ToxicityEco,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactCategory::ClimateChange => "climate_change",
            ImpactCategory::FossilDepletion => "fossil_depletion",
            ImpactCategory::MetalDepletion => "metal_depletion",
            ImpactCategory::WaterDepletion => "water_depletion",
            ImpactCategory::Acidification => "acidification",
            ImpactCategory::Eutrophication => "eutrophication",
            ImpactCategory::OzoneDepletion => "ozone_depletion",
            ImpactCategory::LandUse => "land_use",
            ImpactCategory::ParticulateMatter => "particulate_matter",
            ImpactCategory::ToxicityHuman => "toxicity_human",
            ImpactCategory::ToxicityEco => "toxicity_eco",
        }
    }

    /// Name of the material property holding the per-kg factor for this category.
    pub fn property_name(&self) -> String {
        format!("{}_factor", self.as_str())
    }

    /// Reporting unit, used for display only.
    pub fn unit(&self) -> &'static str {
        match self {
            ImpactCategory::ClimateChange => "kg CO2-eq",
            ImpactCategory::FossilDepletion => "kg oil-eq",
            ImpactCategory::MetalDepletion => "kg Fe-eq",
            ImpactCategory::WaterDepletion => "m3",
            ImpactCategory::Acidification => "kg SO2-eq",
            ImpactCategory::Eutrophication => "kg P-eq",
            ImpactCategory::OzoneDepletion => "kg CFC-11-eq",
            ImpactCategory::LandUse => "m2a",
            ImpactCategory::ParticulateMatter => "kg PM2.5-eq",
            ImpactCategory::ToxicityHuman => "kg 1,4-DB-eq",
            ImpactCategory::ToxicityEco => "kg 1,4-DB-eq",
        }
    }
}

impl fmt::Display for ImpactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle stage of a process step. Drives default-factor fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessCategory {
    Extraction,
    Processing,
    Manufacturing,
    Transport,
    EndOfLife,
    Recycling,
}

impl ProcessCategory {
    pub const ALL: [ProcessCategory; 6] = [
        ProcessCategory::Extraction,
        ProcessCategory::Processing,
        ProcessCategory::Manufacturing,
        ProcessCategory::Transport,
        ProcessCategory::EndOfLife,
        ProcessCategory::Recycling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessCategory::Extraction => "extraction",
            ProcessCategory::Processing => "processing",
            ProcessCategory::Manufacturing => "manufacturing",
            ProcessCategory::Transport => "transport",
            ProcessCategory::EndOfLife => "end_of_life",
            ProcessCategory::Recycling => "recycling",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<ProcessCategory> {
        let key = normalize_key(s);
        ProcessCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
    }
}

impl fmt::Display for ProcessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Energy carrier of an energy input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyType {
    ElectricityGrid,
    ElectricityRenewable,
    NaturalGas,
    Coal,
}

impl EnergyType {
    pub const ALL: [EnergyType; 4] = [
        EnergyType::ElectricityGrid,
        EnergyType::ElectricityRenewable,
        EnergyType::NaturalGas,
        EnergyType::Coal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyType::ElectricityGrid => "electricity_grid",
            EnergyType::ElectricityRenewable => "electricity_renewable",
            EnergyType::NaturalGas => "natural_gas",
            EnergyType::Coal => "coal",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<EnergyType> {
        let key = normalize_key(s);
        EnergyType::ALL.into_iter().find(|e| e.as_str() == key)
    }
}

impl fmt::Display for EnergyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_key(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', ' '], "_")
}

/// Deserializers for caller-supplied amounts. Accept JSON numbers as well
/// as decimal strings; serialization stays string-based.
pub(crate) mod lenient_decimal {
    use rust_decimal::Decimal;
    use serde::de::{self, Deserializer, Unexpected, Visitor};
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use std::fmt;
    use std::str::FromStr;

    struct DecimalVisitor;

    impl Visitor<'_> for DecimalVisitor {
        type Value = Decimal;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or a decimal string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
            let trimmed = v.trim();
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        // Goes through the shortest round-trip text so 2.5 stays exactly 2.5.
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
            if !v.is_finite() {
                return Err(E::invalid_value(Unexpected::Float(v), &self));
            }
            Decimal::from_str(&v.to_string())
                .map_err(|_| E::invalid_value(Unexpected::Float(v), &self))
        }
    }

    struct Lenient(Decimal);

    impl<'de> Deserialize<'de> for Lenient {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            deserialize(d).map(Lenient)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
        d.deserialize_any(DecimalVisitor)
    }

    pub fn deserialize_map<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<BTreeMap<String, Decimal>, D::Error> {
        let map = BTreeMap::<String, Lenient>::deserialize(d)?;
        Ok(map.into_iter().map(|(k, Lenient(v))| (k, v)).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialInput {
    pub material: String,
    /// Mass in kg.
    #[serde(deserialize_with = "lenient_decimal::deserialize")]
    pub quantity: Decimal,
    /// Share of recycled material, 0-100.
    #[serde(default, deserialize_with = "lenient_decimal::deserialize")]
    pub recycled_content: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialOutput {
    pub material: String,
    #[serde(deserialize_with = "lenient_decimal::deserialize")]
    pub quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyInput {
    /// Energy carrier as given by the caller; unrecognized values count as grid electricity.
    #[serde(rename = "type", default = "default_energy_type")]
    pub energy_type: String,
    /// Energy in kWh.
    #[serde(deserialize_with = "lenient_decimal::deserialize")]
    pub amount: Decimal,
}

fn default_energy_type() -> String {
    EnergyType::ElectricityGrid.as_str().to_string()
}

impl EnergyInput {
    pub fn carrier(&self) -> Option<EnergyType> {
        EnergyType::from_str_loose(&self.energy_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteOutput {
    #[serde(deserialize_with = "lenient_decimal::deserialize")]
    pub quantity: Decimal,
    /// Recovered share, 0-100.
    #[serde(default, deserialize_with = "lenient_decimal::deserialize")]
    pub recovery_rate: Decimal,
}

/// One stage of a product lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessStep {
    pub id: String,
    pub order: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub input_materials: Vec<MaterialInput>,
    #[serde(default)]
    pub output_materials: Vec<MaterialOutput>,
    #[serde(default)]
    pub energy_inputs: Vec<EnergyInput>,
    /// Substance -> emitted mass in kg.
    #[serde(default, deserialize_with = "lenient_decimal::deserialize_map")]
    pub emissions: BTreeMap<String, Decimal>,
    /// Only counted for end-of-life steps.
    #[serde(default)]
    pub waste_outputs: Vec<WasteOutput>,
}

impl ProcessStep {
    pub fn process_category(&self) -> Option<ProcessCategory> {
        ProcessCategory::from_str_loose(&self.category)
    }

    pub fn is_end_of_life(&self) -> bool {
        self.process_category() == Some(ProcessCategory::EndOfLife)
    }
}

/// Accumulated impacts over all eleven categories.
///
/// Every category is always present; categories without a contribution hold zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<ImpactCategory, Decimal>",
    into = "BTreeMap<ImpactCategory, Decimal>"
)]
pub struct ImpactVector {
    values: BTreeMap<ImpactCategory, Decimal>,
}

impl ImpactVector {
    pub fn zero() -> Self {
        Self {
            values: ImpactCategory::ALL
                .into_iter()
                .map(|c| (c, Decimal::ZERO))
                .collect(),
        }
    }

    pub fn get(&self, category: ImpactCategory) -> Decimal {
        self.values.get(&category).copied().unwrap_or_default()
    }

    /// Add to one category. `None` on overflow.
    pub fn checked_add(&mut self, category: ImpactCategory, value: Decimal) -> Option<()> {
        let entry = self.values.entry(category).or_default();
        *entry = entry.checked_add(value)?;
        Some(())
    }

    /// Per-category addition of another vector. `None` on overflow.
    pub fn checked_accumulate(&mut self, other: &ImpactVector) -> Option<()> {
        for (category, value) in other.iter() {
            self.checked_add(category, value)?;
        }
        Some(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ImpactCategory, Decimal)> + '_ {
        self.values.iter().map(|(c, v)| (*c, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for ImpactVector {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<BTreeMap<ImpactCategory, Decimal>> for ImpactVector {
    fn from(map: BTreeMap<ImpactCategory, Decimal>) -> Self {
        let mut vector = ImpactVector::zero();
        vector.values.extend(map);
        vector
    }
}

impl From<ImpactVector> for BTreeMap<ImpactCategory, Decimal> {
    fn from(vector: ImpactVector) -> Self {
        vector.values
    }
}

/// Keys of [`CircularityMetrics`], used when comparing two results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircularityMetric {
    RecycledContentPercentage,
    RecoveryRate,
    MaterialEfficiency,
    OverallScore,
}

impl CircularityMetric {
    pub const ALL: [CircularityMetric; 4] = [
        CircularityMetric::RecycledContentPercentage,
        CircularityMetric::RecoveryRate,
        CircularityMetric::MaterialEfficiency,
        CircularityMetric::OverallScore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CircularityMetric::RecycledContentPercentage => "recycled_content_percentage",
            CircularityMetric::RecoveryRate => "recovery_rate",
            CircularityMetric::MaterialEfficiency => "material_efficiency",
            CircularityMetric::OverallScore => "overall_score",
        }
    }
}

impl fmt::Display for CircularityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Circularity indicators, all in percent (0 when undefined).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircularityMetrics {
    pub recycled_content_percentage: Decimal,
    pub recovery_rate: Decimal,
    pub material_efficiency: Decimal,
    pub overall_score: Decimal,
}

impl CircularityMetrics {
    pub fn get(&self, metric: CircularityMetric) -> Decimal {
        match metric {
            CircularityMetric::RecycledContentPercentage => self.recycled_content_percentage,
            CircularityMetric::RecoveryRate => self.recovery_rate,
            CircularityMetric::MaterialEfficiency => self.material_efficiency,
            CircularityMetric::OverallScore => self.overall_score,
        }
    }
}
