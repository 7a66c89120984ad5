//! Property tests for the conversion engine.

use dosemate_core::calc::{dose_to_rate, format_number, rate_to_dose, resolve_concentration};
use dosemate_core::models::{
    AmountUnit, ConcentrationFamily, ConcentrationInput, CountUnit, DoseUnit, Locale, QuantityKind,
    ResolvedConcentration,
};
use dosemate_core::{ConversionContext, Dose};
use proptest::prelude::*;

fn dose_unit() -> impl Strategy<Value = DoseUnit> {
    prop::sample::select(DoseUnit::ALL.to_vec())
}

fn amount_unit() -> impl Strategy<Value = AmountUnit> {
    prop::sample::select(AmountUnit::ALL.to_vec())
}

/// The stock unit a dose unit's solution is prepared in.
fn matching_amount_unit(unit: DoseUnit, mass_unit: AmountUnit) -> AmountUnit {
    match unit.decompose().quantity_kind {
        QuantityKind::Mass(_) => mass_unit,
        QuantityKind::Count(CountUnit::Unit) => AmountUnit::U,
        QuantityKind::Count(CountUnit::Milliequivalent) => AmountUnit::MEq,
    }
}

proptest! {
    #[test]
    fn round_trip_reproduces_dose(
        unit in dose_unit(),
        mass_unit in prop::sample::select(vec![AmountUnit::Mcg, AmountUnit::Mg, AmountUnit::G]),
        value in 0.001f64..10_000.0,
        weight in 0.5f64..250.0,
        amount in 0.01f64..100_000.0,
        volume in 1.0f64..1_000.0,
    ) {
        let input = ConcentrationInput::new(amount, matching_amount_unit(unit, mass_unit), volume);
        let ctx = ConversionContext::new(Some(weight), resolve_concentration(&input));

        let rate = dose_to_rate(&Dose::new(value, unit), &ctx).unwrap();
        let back = rate_to_dose(&rate, unit, &ctx).unwrap();

        prop_assert_eq!(back.unit, unit);
        prop_assert!(
            (back.value - value).abs() <= 1e-6 * value.abs(),
            "{} {}: got {}", value, unit, back.value
        );
    }

    #[test]
    fn count_concentrations_are_never_scaled(
        unit in prop::sample::select(vec![AmountUnit::U, AmountUnit::MEq]),
        amount in 0.0f64..100_000.0,
        volume in 0.1f64..1_000.0,
    ) {
        let conc = resolve_concentration(&ConcentrationInput::new(amount, unit, volume));
        prop_assert_eq!(conc.value_per_ml, amount / volume);
        prop_assert_eq!(conc.family(), Some(ConcentrationFamily::Count));
    }

    #[test]
    fn family_follows_amount_unit(
        unit in amount_unit(),
        amount in 0.0f64..1_000.0,
        volume in 0.1f64..1_000.0,
    ) {
        let conc = resolve_concentration(&ConcentrationInput::new(amount, unit, volume));
        prop_assert_eq!(conc.family(), Some(unit.family()));
    }

    #[test]
    fn zero_volume_is_always_degenerate(unit in amount_unit(), amount in 0.0f64..1_000.0) {
        let conc = resolve_concentration(&ConcentrationInput::new(amount, unit, 0.0));
        prop_assert_eq!(conc, ResolvedConcentration::DEGENERATE);
    }

    #[test]
    fn per_kg_units_need_weight(
        unit in dose_unit(),
        value in 0.001f64..1_000.0,
    ) {
        let input = ConcentrationInput::new(100.0, matching_amount_unit(unit, AmountUnit::Mg), 100.0);
        let ctx = ConversionContext::new(None, resolve_concentration(&input));
        let rate = dose_to_rate(&Dose::new(value, unit), &ctx);
        prop_assert_eq!(rate.is_none(), unit.is_per_kg());
    }

    #[test]
    fn mismatched_families_convert_to_nothing(
        unit in dose_unit(),
        stock in amount_unit(),
        value in 0.001f64..1_000.0,
    ) {
        let conc = resolve_concentration(&ConcentrationInput::new(50.0, stock, 10.0));
        let ctx = ConversionContext::new(Some(70.0), conc);
        let compatible = conc.unit.map(|u| unit.is_compatible_with(u)).unwrap_or(false);
        prop_assert_eq!(dose_to_rate(&Dose::new(value, unit), &ctx).is_some(), compatible);
    }

    #[test]
    fn formatting_never_panics(value in any::<f64>(), digits in 0usize..4) {
        for locale in [Locale::En, Locale::Es, Locale::Pt] {
            let text = format_number(Some(value), digits, locale);
            prop_assert_eq!(text.is_empty(), !value.is_finite());
        }
    }
}
