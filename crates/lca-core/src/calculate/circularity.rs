use crate::error::LcaError;
use crate::model::{CircularityMetrics, ProcessStep};
use rust_decimal::Decimal;

const RECYCLED_CONTENT_WEIGHT: Decimal = Decimal::from_parts(3, 0, 0, false, 1);
const RECOVERY_RATE_WEIGHT: Decimal = Decimal::from_parts(4, 0, 0, false, 1);
const MATERIAL_EFFICIENCY_WEIGHT: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

/// Circularity indicators over all steps of a calculation.
///
/// Ratios with a zero denominator are 0, never undefined.
pub fn compute(steps: &[ProcessStep]) -> Result<CircularityMetrics, LcaError> {
    let mut total_material_input = Decimal::ZERO;
    let mut recycled_material_input = Decimal::ZERO;
    let mut total_output = Decimal::ZERO;
    let mut total_waste = Decimal::ZERO;
    let mut recovered_waste = Decimal::ZERO;

    for step in steps {
        let overflow = || LcaError::Overflow(format!("circularity of step '{}'", step.id));

        for input in &step.input_materials {
            total_material_input = total_material_input
                .checked_add(input.quantity)
                .ok_or_else(overflow)?;
            recycled_material_input = share(input.quantity, input.recycled_content)
                .and_then(|r| recycled_material_input.checked_add(r))
                .ok_or_else(overflow)?;
        }

        for output in &step.output_materials {
            total_output = total_output.checked_add(output.quantity).ok_or_else(overflow)?;
        }

        // Waste recovery only counts at end of life.
        if step.is_end_of_life() {
            for waste in &step.waste_outputs {
                total_waste = total_waste.checked_add(waste.quantity).ok_or_else(overflow)?;
                recovered_waste = share(waste.quantity, waste.recovery_rate)
                    .and_then(|r| recovered_waste.checked_add(r))
                    .ok_or_else(overflow)?;
            }
        }
    }

    let overflow = |what: &str| LcaError::Overflow(what.to_string());
    let recycled_content_percentage = percent(recycled_material_input, total_material_input)
        .ok_or_else(|| overflow("recycled_content_percentage"))?;
    let recovery_rate =
        percent(recovered_waste, total_waste).ok_or_else(|| overflow("recovery_rate"))?;
    let material_efficiency = percent(total_output, total_material_input)
        .ok_or_else(|| overflow("material_efficiency"))?;

    Ok(CircularityMetrics {
        overall_score: overall_score(recycled_content_percentage, recovery_rate, material_efficiency)
            .ok_or_else(|| overflow("overall_score"))?,
        recycled_content_percentage,
        recovery_rate,
        material_efficiency,
    })
}

/// Weighted circularity score: 30% recycled content, 40% recovery, 30% efficiency.
pub fn overall_score(
    recycled_content_percentage: Decimal,
    recovery_rate: Decimal,
    material_efficiency: Decimal,
) -> Option<Decimal> {
    RECYCLED_CONTENT_WEIGHT
        .checked_mul(recycled_content_percentage)?
        .checked_add(RECOVERY_RATE_WEIGHT.checked_mul(recovery_rate)?)?
        .checked_add(MATERIAL_EFFICIENCY_WEIGHT.checked_mul(material_efficiency)?)
}

/// `quantity * pct / 100`.
fn share(quantity: Decimal, pct: Decimal) -> Option<Decimal> {
    quantity.checked_mul(pct)?.checked_div(Decimal::ONE_HUNDRED)
}

fn percent(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        Some(Decimal::ZERO)
    } else {
        part.checked_div(whole)?.checked_mul(Decimal::ONE_HUNDRED)
    }
}
