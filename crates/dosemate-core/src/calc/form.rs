//! Calculator form state.
//!
//! The presentation layer keeps the raw text of each field in a
//! [`CalculatorInput`] snapshot and calls [`CalculatorInput::derive`] on
//! every change. Nothing is accumulated between calls.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    dose_to_rate, format_number, parse_numeric_input, rate_to_dose, resolve_concentration,
    ConversionContext, Dose, Rate, CONCENTRATION_DIGITS, DOSE_DIGITS, RATE_DIGITS,
};
use crate::models::{
    AmountUnit, ConcentrationInput, DoseUnit, DrugConcentration, DrugRecord, Locale,
    ResolvedConcentration, Settings,
};

/// Raw calculator fields, as typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorInput {
    pub drug_slug: Option<String>,
    pub amount: String,
    pub amount_unit: AmountUnit,
    pub volume_ml: String,
    pub weight_kg: String,
    pub dose: String,
    pub dose_unit: DoseUnit,
    /// mL/h typed into the inverse calculation
    pub rate_ml_per_hour: String,
    /// The concentration fields are being edited rather than taken from the dataset
    pub custom_concentration: bool,
    pub locale: Locale,
}

/// Everything the calculator displays, derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorOutput {
    pub concentration: ResolvedConcentration,
    /// e.g. "16 mcg/mL"; empty when the concentration cannot be resolved
    pub concentration_display: String,
    pub rate: Option<Rate>,
    pub rate_display: String,
    /// Dose delivered by the typed rate, in the selected dose unit
    pub dose: Option<Dose>,
    pub dose_display: String,
}

impl Default for CalculatorInput {
    fn default() -> Self {
        let (dose_unit, dose) = DoseUnit::default_for(AmountUnit::Mg);
        Self {
            drug_slug: None,
            amount: String::new(),
            amount_unit: AmountUnit::Mg,
            volume_ml: String::new(),
            weight_kg: Settings::default().default_weight_kg.to_string(),
            dose: dose.to_string(),
            dose_unit,
            rate_ml_per_hour: String::new(),
            custom_concentration: false,
            locale: Locale::default(),
        }
    }
}

impl CalculatorInput {
    /// Seed the form for a drug: its preparation, the default weight, and
    /// the starting dose for the preparation's unit.
    pub fn for_drug(drug: &DrugRecord, settings: &Settings) -> Self {
        let mut input = Self {
            drug_slug: Some(drug.slug.clone()),
            weight_kg: settings.default_weight_kg.to_string(),
            custom_concentration: !settings.use_default_concentration,
            locale: settings.locale,
            ..Self::default()
        };

        if let Some(conc) = preferred_concentration(drug, settings) {
            let (dose_unit, dose) = DoseUnit::default_for(conc.drug_unit);
            input.amount = conc.drug_amount.to_string();
            input.amount_unit = conc.drug_unit;
            input.volume_ml = conc.total_volume.to_string();
            input.dose_unit = dose_unit;
            input.dose = dose.to_string();
        }

        debug!(
            slug = %drug.slug,
            amount = %input.amount,
            unit = %input.amount_unit,
            volume_ml = %input.volume_ml,
            "calculator seeded"
        );
        input
    }

    /// Parsed concentration fields, if both amount and volume are numbers.
    pub fn concentration_input(&self) -> Option<ConcentrationInput> {
        Some(ConcentrationInput::new(
            parse_numeric_input(&self.amount)?,
            self.amount_unit,
            parse_numeric_input(&self.volume_ml)?,
        ))
    }

    pub fn context(&self) -> ConversionContext {
        let concentration = self
            .concentration_input()
            .map(|input| resolve_concentration(&input))
            .unwrap_or(ResolvedConcentration::DEGENERATE);
        ConversionContext::new(parse_numeric_input(&self.weight_kg), concentration)
    }

    /// Compute every displayed value from this snapshot.
    pub fn derive(&self) -> CalculatorOutput {
        let ctx = self.context();

        let rate = parse_numeric_input(&self.dose)
            .and_then(|value| dose_to_rate(&Dose::new(value, self.dose_unit), &ctx));
        let dose = parse_numeric_input(&self.rate_ml_per_hour)
            .and_then(|ml_per_hour| rate_to_dose(&Rate::new(ml_per_hour), self.dose_unit, &ctx));

        let concentration_display = if ctx.concentration.unit.is_some() {
            format!(
                "{} {}",
                format_number(
                    Some(ctx.concentration.value_per_ml),
                    CONCENTRATION_DIGITS,
                    self.locale
                ),
                ctx.concentration.unit_label()
            )
        } else {
            String::new()
        };

        CalculatorOutput {
            concentration: ctx.concentration,
            concentration_display,
            rate_display: format_number(rate.map(|r| r.ml_per_hour), RATE_DIGITS, self.locale),
            rate,
            dose_display: format_number(dose.map(|d| d.value), DOSE_DIGITS, self.locale),
            dose,
        }
    }
}

/// Preparation to start from. For potassium chloride, the one matching the
/// user's preferred mEq/mL strength when the dataset has it.
fn preferred_concentration<'a>(
    drug: &'a DrugRecord,
    settings: &Settings,
) -> Option<&'a DrugConcentration> {
    if drug.is_potassium_chloride() {
        let wanted = settings.kcl_concentration.meq_per_ml();
        let matching = drug.concentrations.iter().find(|c| {
            let per_ml = c
                .meq_per_ml
                .unwrap_or_else(|| resolve_concentration(&c.to_input()).value_per_ml);
            c.drug_unit == AmountUnit::MEq && (per_ml - wanted).abs() < 1e-9
        });
        if matching.is_some() {
            return matching;
        }
    }
    drug.default_concentration()
}
