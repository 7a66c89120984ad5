//! Dose ⇄ rate conversion.
//!
//! Both directions pass through the same base quantity: un-weighted amount
//! per hour, in mcg for mass units and in the native unit for U and mEq.
//! The inverse applies the forward steps' reciprocals, so a round trip
//! reproduces the dose up to floating-point error.

use tracing::trace;

use super::{ConversionContext, Dose, Rate};
use crate::models::{DoseUnit, DoseUnitParts, QuantityKind, WeightBasis};

/// Infusion rate in mL/h that delivers `dose`.
///
/// Returns `None` when the concentration is unusable or of another family
/// than the dose unit, the dose value is not finite, or the unit is per-kg
/// and no positive weight is available.
pub fn dose_to_rate(dose: &Dose, ctx: &ConversionContext) -> Option<Rate> {
    if !dose.value.is_finite() {
        trace!(unit = %dose.unit, "dose value not finite");
        return None;
    }
    let concentration = usable_concentration(dose.unit, ctx)?;
    let parts = dose.unit.decompose();
    let weight = weight_factor(dose.unit, parts, ctx)?;

    let per_hour_base = dose.value
        * parts.time_basis.per_hour_factor()
        * mass_factor(parts.quantity_kind)
        * weight;

    Some(Rate::new(per_hour_base / concentration))
}

/// Dose in `target_unit` delivered by `rate`.
///
/// Same guards as [`dose_to_rate`], applied to the target unit.
pub fn rate_to_dose(rate: &Rate, target_unit: DoseUnit, ctx: &ConversionContext) -> Option<Dose> {
    if !rate.ml_per_hour.is_finite() {
        trace!(unit = %target_unit, "rate not finite");
        return None;
    }
    let concentration = usable_concentration(target_unit, ctx)?;
    let parts = target_unit.decompose();
    let weight = weight_factor(target_unit, parts, ctx)?;

    let per_hour_base = rate.ml_per_hour * concentration;
    let value = per_hour_base
        / weight
        / parts.time_basis.per_hour_factor()
        / mass_factor(parts.quantity_kind);

    Some(Dose::new(value, target_unit))
}

fn usable_concentration(unit: DoseUnit, ctx: &ConversionContext) -> Option<f64> {
    let concentration = &ctx.concentration;
    if !concentration.is_usable() {
        trace!(
            value_per_ml = concentration.value_per_ml,
            "concentration unusable"
        );
        return None;
    }
    match concentration.unit {
        Some(conc_unit) if unit.is_compatible_with(conc_unit) => Some(concentration.value_per_ml),
        other => {
            trace!(
                dose_unit = %unit,
                concentration_unit = other.map(|u| u.label()).unwrap_or(""),
                "dose unit and concentration belong to different families"
            );
            None
        }
    }
}

/// Weight multiplier: the patient weight for per-kg units, 1 otherwise.
fn weight_factor(unit: DoseUnit, parts: DoseUnitParts, ctx: &ConversionContext) -> Option<f64> {
    match parts.weight_basis {
        WeightBasis::Absolute => Some(1.0),
        WeightBasis::PerKg => {
            let weight = ctx.usable_weight();
            if weight.is_none() {
                trace!(unit = %unit, weight_kg = ?ctx.weight_kg, "per-kg unit without usable weight");
            }
            weight
        }
    }
}

fn mass_factor(kind: QuantityKind) -> f64 {
    match kind {
        QuantityKind::Mass(mass) => mass.mcg_factor(),
        QuantityKind::Count(_) => 1.0,
    }
}
