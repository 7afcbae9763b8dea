use lca_core::error::LcaError;
use lca_core::factors::builtin;
use lca_core::factors::schema::FactorMap;
use lca_core::model::{EnergyType, ProcessCategory};
use std::path::Path;

const SECTIONS: [&str; 4] = [
    "process_defaults",
    "material_families",
    "energy",
    "characterization",
];

pub fn list() -> Result<(), LcaError> {
    let tables = builtin::default_tables();

    println!("{} (v{})\n", tables.name, tables.version);
    if let Some(ref desc) = tables.description {
        println!("{}\n", desc);
    }

    println!(
        "  {:<18} {} lifecycle stages",
        "process_defaults",
        tables.process_defaults.len()
    );
    println!(
        "  {:<18} {} (generic: {})",
        "material_families",
        tables
            .material_families
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        tables.generic_family
    );
    println!(
        "  {:<18} {}",
        "energy",
        tables
            .energy
            .keys()
            .map(|e| e.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  {:<18} {} substances",
        "characterization",
        tables.characterization.len()
    );
    println!();
    println!("Run `lca factors explain <section>` for the full values.");

    Ok(())
}

pub fn explain(section: &str) -> Result<(), LcaError> {
    let tables = builtin::default_tables();

    match section {
        "process_defaults" => {
            println!("Process defaults (per step, applied when no registered process matches)\n");
            for category in ProcessCategory::ALL {
                if let Some(factors) = tables.process_defaults.get(&category) {
                    print_factor_row(category.as_str(), factors);
                }
            }
            println!();
            println!("Unrecognized step categories use the 'processing' defaults.");
        }
        "material_families" => {
            println!("Material families (per kg, matched by substring in this order)\n");
            for family in &tables.material_families {
                print_factor_row(&family.name, &family.factors);
                if let Some(ref note) = family.note {
                    println!("    {}", note);
                }
            }
            println!();
            println!(
                "Materials matching no family use '{}'.",
                tables.generic_family
            );
        }
        "energy" => {
            println!("Energy carriers (per kWh)\n");
            for carrier in EnergyType::ALL {
                if let Some(factors) = tables.energy.get(&carrier) {
                    print_factor_row(carrier.as_str(), factors);
                }
            }
            println!();
            println!("Unrecognized carriers use 'electricity_grid'.");
        }
        "characterization" => {
            println!("Characterization factors (per kg emitted)\n");
            for (substance, factors) in &tables.characterization {
                print_factor_row(substance, factors);
            }
            println!();
            println!("Substance names match exactly; other substances contribute nothing.");
        }
        other => {
            return Err(LcaError::FactorTableInvalid(format!(
                "unknown section '{}'. Available: {}",
                other,
                SECTIONS.join(", ")
            )))
        }
    }

    Ok(())
}

fn print_factor_row(name: &str, factors: &FactorMap) {
    let values: Vec<String> = factors
        .iter()
        .map(|(category, value)| format!("{}={}", category, value))
        .collect();
    println!("  {:<22} {}", name, values.join("  "));
}

pub fn schema() -> Result<(), LcaError> {
    print!(
        r#"JSON Factor Table Schema
========================

A factor table file supplies the default factors used whenever reference
data is missing. Pass it with `--factors <FILE>`; without it the built-in
tables are used.

Top-level fields:
  name               (string, required)  Human-readable name
  description        (string, optional)  What the tables are for
  version            (string, required)  Version identifier (e.g., "1.0")
  process_defaults   (object, required)  Lifecycle stage -> factor map.
                                         All six stages are required:
                                         extraction, processing, manufacturing,
                                         transport, end_of_life, recycling.
  material_families  (array, required)   Ordered list of families (see below).
                                         The first family whose name occurs in
                                         a lowercased material name wins.
  generic_family     (string, required)  Family used when nothing matches.
  energy             (object, required)  Carrier -> per-kWh factor map.
                                         electricity_grid is required.
  characterization   (object, required)  Substance -> per-kg factor map.

Each material family:
  name               (string, required)  Lowercase, unique
  factors            (object, required)  Per-kg factor map
  note               (string, optional)  Source or explanation

A factor map is keyed by impact category: climate_change, fossil_depletion,
metal_depletion, water_depletion, acidification, eutrophication,
ozone_depletion, land_use, particulate_matter, toxicity_human, toxicity_eco.
Missing categories count as zero.

Example:
{{
  "name": "Site factors",
  "version": "1.0",
  "process_defaults": {{
    "extraction": {{ "climate_change": "2.5" }},
    "processing": {{ "climate_change": "1.5" }},
    "manufacturing": {{ "climate_change": "1.0" }},
    "transport": {{ "climate_change": "0.5" }},
    "end_of_life": {{ "climate_change": "0.3" }},
    "recycling": {{ "climate_change": "-1.0" }}
  }},
  "material_families": [
    {{ "name": "steel", "factors": {{ "climate_change": "1.9" }} }}
  ],
  "generic_family": "steel",
  "energy": {{
    "electricity_grid": {{ "climate_change": "0.3" }}
  }},
  "characterization": {{
    "CO2": {{ "climate_change": "1.0" }}
  }}
}}

Note: factor values must be quoted strings, not bare numbers,
to preserve exact decimal precision (e.g., "0.25" not 0.25).

Run `lca factors explain <section>` to see the built-in values.
"#
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), LcaError> {
    let tables = lca_core::factors::load_factor_tables(file)?;

    println!("Factor tables '{}' (v{}) are valid.", tables.name, tables.version);
    println!(
        "  Material families: {}",
        tables
            .material_families
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Energy carriers: {}", tables.energy.len());
    println!("  Substances: {}", tables.characterization.len());

    let mut warnings = Vec::new();
    for carrier in EnergyType::ALL {
        if !tables.energy.contains_key(&carrier) {
            warnings.push(format!(
                "carrier '{}' has no factors and will use electricity_grid",
                carrier
            ));
        }
    }
    for family in &tables.material_families {
        if family.factors.is_empty() {
            warnings.push(format!("material family '{}' has no factors", family.name));
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}
