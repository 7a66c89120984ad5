//! Golden tests for the dose/rate converter.
//!
//! Each case runs a dose forward to mL/h and the expected rate back to the
//! same unit.

use dosemate_core::calc::{dose_to_rate, rate_to_dose, resolve_concentration};
use dosemate_core::models::{AmountUnit, ConcentrationInput, DoseUnit};
use dosemate_core::{ConversionContext, Dose, Rate};

/// Test case from golden file.
struct GoldenCase {
    id: &'static str,
    amount: f64,
    amount_unit: AmountUnit,
    volume_ml: f64,
    weight_kg: Option<f64>,
    dose: f64,
    dose_unit: DoseUnit,
    expected_conc_per_ml: f64,
    expected_conc_label: &'static str,
    expected_ml_per_hour: Option<f64>,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "noradrenaline-mcg-kg-min",
            amount: 4.0,
            amount_unit: AmountUnit::Mg,
            volume_ml: 250.0,
            weight_kg: Some(70.0),
            dose: 5.0,
            dose_unit: DoseUnit::McgPerKgPerMin,
            expected_conc_per_ml: 16.0,
            expected_conc_label: "mcg/mL",
            expected_ml_per_hour: Some(1312.5),
        },
        GoldenCase {
            id: "noradrenaline-low-dose",
            amount: 4.0,
            amount_unit: AmountUnit::Mg,
            volume_ml: 250.0,
            weight_kg: Some(80.0),
            dose: 0.1,
            dose_unit: DoseUnit::McgPerKgPerMin,
            expected_conc_per_ml: 16.0,
            expected_conc_label: "mcg/mL",
            expected_ml_per_hour: Some(30.0),
        },
        GoldenCase {
            id: "dobutamine-gram-bag",
            amount: 1.0,
            amount_unit: AmountUnit::G,
            volume_ml: 250.0,
            weight_kg: Some(50.0),
            dose: 10.0,
            dose_unit: DoseUnit::McgPerKgPerMin,
            expected_conc_per_ml: 4000.0,
            expected_conc_label: "mcg/mL",
            expected_ml_per_hour: Some(7.5),
        },
        GoldenCase {
            id: "fentanyl-mcg-per-hour",
            amount: 2500.0,
            amount_unit: AmountUnit::Mcg,
            volume_ml: 250.0,
            weight_kg: None,
            dose: 50.0,
            dose_unit: DoseUnit::McgPerHour,
            expected_conc_per_ml: 10.0,
            expected_conc_label: "mcg/mL",
            expected_ml_per_hour: Some(5.0),
        },
        GoldenCase {
            id: "furosemide-mg-per-hour",
            amount: 100.0,
            amount_unit: AmountUnit::Mg,
            volume_ml: 100.0,
            weight_kg: None,
            dose: 10.0,
            dose_unit: DoseUnit::MgPerHour,
            expected_conc_per_ml: 1000.0,
            expected_conc_label: "mcg/mL",
            expected_ml_per_hour: Some(10.0),
        },
        GoldenCase {
            id: "heparin-units-per-hour",
            amount: 20000.0,
            amount_unit: AmountUnit::U,
            volume_ml: 500.0,
            weight_kg: None,
            dose: 10.0,
            dose_unit: DoseUnit::UnitsPerHour,
            expected_conc_per_ml: 40.0,
            expected_conc_label: "U/mL",
            expected_ml_per_hour: Some(0.25),
        },
        GoldenCase {
            id: "heparin-units-per-kg-per-hour",
            amount: 25000.0,
            amount_unit: AmountUnit::U,
            volume_ml: 250.0,
            weight_kg: Some(80.0),
            dose: 18.0,
            dose_unit: DoseUnit::UnitsPerKgPerHour,
            expected_conc_per_ml: 100.0,
            expected_conc_label: "U/mL",
            expected_ml_per_hour: Some(14.4),
        },
        GoldenCase {
            id: "kcl-meq-per-hour",
            amount: 20.0,
            amount_unit: AmountUnit::MEq,
            volume_ml: 100.0,
            weight_kg: None,
            dose: 10.0,
            dose_unit: DoseUnit::MeqPerHour,
            expected_conc_per_ml: 0.2,
            expected_conc_label: "mEq/mL",
            expected_ml_per_hour: Some(50.0),
        },
        GoldenCase {
            id: "per-kg-without-weight",
            amount: 4.0,
            amount_unit: AmountUnit::Mg,
            volume_ml: 250.0,
            weight_kg: Some(0.0),
            dose: 5.0,
            dose_unit: DoseUnit::McgPerKgPerMin,
            expected_conc_per_ml: 16.0,
            expected_conc_label: "mcg/mL",
            expected_ml_per_hour: None,
        },
        GoldenCase {
            id: "absolute-unit-zero-weight",
            amount: 25.0,
            amount_unit: AmountUnit::Mg,
            volume_ml: 250.0,
            weight_kg: Some(0.0),
            dose: 5.0,
            dose_unit: DoseUnit::McgPerMin,
            expected_conc_per_ml: 100.0,
            expected_conc_label: "mcg/mL",
            expected_ml_per_hour: Some(3.0),
        },
        GoldenCase {
            id: "zero-volume",
            amount: 5.0,
            amount_unit: AmountUnit::Mg,
            volume_ml: 0.0,
            weight_kg: Some(70.0),
            dose: 5.0,
            dose_unit: DoseUnit::McgPerKgPerMin,
            expected_conc_per_ml: 0.0,
            expected_conc_label: "",
            expected_ml_per_hour: None,
        },
        GoldenCase {
            id: "mass-dose-count-solution",
            amount: 20.0,
            amount_unit: AmountUnit::MEq,
            volume_ml: 100.0,
            weight_kg: Some(70.0),
            dose: 5.0,
            dose_unit: DoseUnit::McgPerKgPerMin,
            expected_conc_per_ml: 0.2,
            expected_conc_label: "mEq/mL",
            expected_ml_per_hour: None,
        },
    ]
}

/// Set `RUST_LOG=dosemate_core=trace` to see why a case yielded nothing.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= 1e-9 * expected.abs().max(1.0)
}

#[test]
fn test_golden_cases() {
    init_tracing();
    let cases = get_golden_cases();
    let mut failures = Vec::new();

    for case in &cases {
        let conc = resolve_concentration(&ConcentrationInput::new(
            case.amount,
            case.amount_unit,
            case.volume_ml,
        ));
        let ctx = ConversionContext::new(case.weight_kg, conc);

        if !close(conc.value_per_ml, case.expected_conc_per_ml) {
            failures.push(format!(
                "{}: concentration expected {}, got {}",
                case.id, case.expected_conc_per_ml, conc.value_per_ml
            ));
        }
        if conc.unit_label() != case.expected_conc_label {
            failures.push(format!(
                "{}: label expected '{}', got '{}'",
                case.id,
                case.expected_conc_label,
                conc.unit_label()
            ));
        }

        let rate = dose_to_rate(&Dose::new(case.dose, case.dose_unit), &ctx);
        match (rate, case.expected_ml_per_hour) {
            (Some(rate), Some(expected)) => {
                if !close(rate.ml_per_hour, expected) {
                    failures.push(format!(
                        "{}: rate expected {}, got {}",
                        case.id, expected, rate.ml_per_hour
                    ));
                }
                let back = rate_to_dose(&Rate::new(expected), case.dose_unit, &ctx);
                match back {
                    Some(dose) if close(dose.value, case.dose) => {}
                    other => failures.push(format!(
                        "{}: inverse expected {}, got {:?}",
                        case.id, case.dose, other
                    )),
                }
            }
            (None, None) => {
                if rate_to_dose(&Rate::new(1.0), case.dose_unit, &ctx).is_some() {
                    failures.push(format!("{}: inverse should be empty", case.id));
                }
            }
            (actual, expected) => failures.push(format!(
                "{}: rate expected {:?}, got {:?}",
                case.id, expected, actual
            )),
        }
    }

    assert!(
        failures.is_empty(),
        "Golden test failures:\n{}",
        failures.join("\n")
    );
}

#[test]
fn test_every_unit_converts_to_mcg_per_kg_per_min_equivalent() {
    init_tracing();
    // 1 mcg/kg/min for a 60 kg patient is 3600 mcg/h.
    let conc = resolve_concentration(&ConcentrationInput::new(3.6, AmountUnit::Mg, 100.0));
    let ctx = ConversionContext::new(Some(60.0), conc);
    let rate = dose_to_rate(&Dose::new(1.0, DoseUnit::McgPerKgPerMin), &ctx).unwrap();
    assert!(close(rate.ml_per_hour, 100.0));

    let expected = [
        (DoseUnit::McgPerKgPerMin, 1.0),
        (DoseUnit::McgPerKgPerHour, 60.0),
        (DoseUnit::MgPerKgPerMin, 0.001),
        (DoseUnit::MgPerKgPerHour, 0.06),
        (DoseUnit::McgPerMin, 60.0),
        (DoseUnit::MgPerMin, 0.06),
        (DoseUnit::McgPerHour, 3600.0),
        (DoseUnit::MgPerHour, 3.6),
    ];
    for (unit, value) in expected {
        let dose = rate_to_dose(&rate, unit, &ctx).unwrap();
        assert!(close(dose.value, value), "{unit}: expected {value}, got {}", dose.value);
    }
}
