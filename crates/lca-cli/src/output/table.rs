use lca_core::analysis::{SensitivityReport, WhatIfReport};
use lca_core::calculate::CalculationResult;
use lca_core::model::{CircularityMetric, ImpactCategory};
use lca_core::recommend::Advice;
use rust_decimal::Decimal;

const DISPLAY_DP: u32 = 4;

fn fmt_value(value: Decimal) -> String {
    value.round_dp(DISPLAY_DP).normalize().to_string()
}

fn fmt_pct(value: Decimal) -> String {
    format!("{:+.1}%", value.round_dp(1))
}

pub fn print_calculation(result: &CalculationResult, advice: Option<&Advice>, verbose: bool) {
    println!(
        "=== {} ({}) ===\n",
        result.functional_unit, result.system_boundary
    );

    println!("  {:<20}  {:>14}  Unit", "Impact category", "Total");
    println!("  {}", "-".repeat(50));
    for category in ImpactCategory::ALL {
        println!(
            "  {:<20}  {:>14}  {}",
            category.as_str(),
            fmt_value(result.total_impacts.get(category)),
            category.unit()
        );
    }
    println!();

    let m = &result.circularity_metrics;
    println!("  Circularity:");
    println!("    Recycled content     {:>8}%", fmt_value(m.recycled_content_percentage));
    println!("    Recovery rate        {:>8}%", fmt_value(m.recovery_rate));
    println!("    Material efficiency  {:>8}%", fmt_value(m.material_efficiency));
    println!("    Overall score        {:>8}", fmt_value(m.overall_score));
    println!();

    if verbose {
        println!("  Per-step climate change:");
        let max_id = result
            .step_order
            .iter()
            .map(|id| id.len())
            .max()
            .unwrap_or(10);
        for id in &result.step_order {
            if let Some(impacts) = result.process_breakdown.get(id) {
                println!(
                    "    {:<width$}  {:>14} {}",
                    id,
                    fmt_value(impacts.get(ImpactCategory::ClimateChange)),
                    ImpactCategory::ClimateChange.unit(),
                    width = max_id
                );
            }
        }
        println!();

        if !result.diagnostics.is_empty() {
            println!("  Defaults applied:");
            for miss in &result.diagnostics {
                println!("    [{}] {} -> {}", miss.step_id, miss.name, miss.fallback);
            }
            println!();
        }

        println!(
            "  Calculated in {:.3} ms\n",
            result.calculation_time.as_secs_f64() * 1000.0
        );
    } else if !result.diagnostics.is_empty() {
        println!(
            "  {} default(s) applied for missing reference data (use --verbose to list)\n",
            result.diagnostics.len()
        );
    }

    if let Some(advice) = advice {
        print_advice(advice);
    }
}

fn print_advice(advice: &Advice) {
    if advice.suggestions.is_empty() {
        println!("  No improvement suggestions.\n");
        return;
    }

    println!("  Suggestions:");
    for s in &advice.suggestions {
        println!("    [{}] {}", s.priority.as_str(), s.title);
        println!("      {}", s.description);
        println!(
            "      Potential savings: {}. How: {}",
            s.potential_savings, s.implementation
        );
    }
    if let Some(ref reason) = advice.fallback_reason {
        println!("    (rule-based fallback: {})", reason);
    }
    println!();
}

pub fn print_what_if(label: &str, report: &WhatIfReport) {
    println!("=== What-if: {} ===\n", label);

    println!(
        "  {:<28}  {:>14}  {:>14}  {:>9}",
        "Indicator", "Baseline", "Scenario", "Change"
    );
    println!("  {}", "-".repeat(71));
    for (category, change) in &report.impact_changes {
        if change.baseline.is_zero() && change.scenario.is_zero() {
            continue;
        }
        println!(
            "  {:<28}  {:>14}  {:>14}  {:>9}",
            category.as_str(),
            fmt_value(change.baseline),
            fmt_value(change.scenario),
            fmt_pct(change.relative_change)
        );
    }
    for metric in CircularityMetric::ALL {
        if let Some(change) = report.circularity_changes.get(&metric) {
            println!(
                "  {:<28}  {:>14}  {:>14}  {:>9}",
                metric.as_str(),
                fmt_value(change.baseline),
                fmt_value(change.scenario),
                fmt_pct(change.relative_change)
            );
        }
    }
    println!();

    if report.improvements.is_empty() {
        println!("  No notable improvements.\n");
    } else {
        println!("  Improvements:");
        for line in &report.improvements {
            println!("    {}", line);
        }
        println!();
    }
}

pub fn print_sensitivity(report: &SensitivityReport) {
    println!(
        "=== Sensitivity (climate change, baseline {} {}) ===\n",
        fmt_value(report.baseline_climate_change),
        ImpactCategory::ClimateChange.unit()
    );

    for (rank, entry) in report.ranking.iter().enumerate() {
        println!(
            "  {}. {:<24} max {}",
            rank + 1,
            entry.parameter,
            fmt_pct(entry.max_change)
        );
        if let Some(result) = report.results.iter().find(|r| r.parameter == entry.parameter) {
            for outcome in &result.outcomes {
                println!(
                    "       {:<22} {:>14}  {:>9}",
                    outcome.variation,
                    fmt_value(outcome.absolute_impact),
                    fmt_pct(outcome.impact_change)
                );
            }
        }
    }
    println!();
}
