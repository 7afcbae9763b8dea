use super::schema::FactorTables;
use std::sync::LazyLock;

const DEFAULT_FACTORS_JSON: &str = include_str!("../../../../factors/default-factors.json");

static DEFAULT_TABLES: LazyLock<FactorTables> = LazyLock::new(|| {
    serde_json::from_str(DEFAULT_FACTORS_JSON).expect("embedded default-factors.json is valid")
});

/// The factor tables shipped with the crate.
pub fn default_tables() -> &'static FactorTables {
    &DEFAULT_TABLES
}
