//! Settings store integration tests against an on-disk database.

use dosemate_core::db::Database;
use dosemate_core::models::{KclConcentration, Locale, Settings};
use dosemate_core::{CalculatorInput, DrugCatalog};

#[test]
fn test_settings_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dosemate.db");

    let settings = Settings {
        default_weight_kg: 65.0,
        use_default_concentration: true,
        kcl_concentration: KclConcentration::FourMeqPerMl,
        locale: Locale::Pt,
    };

    {
        let db = Database::open(&path).unwrap();
        assert_eq!(db.load_settings().unwrap(), Settings::default());
        db.save_settings(&settings).unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.load_settings().unwrap(), settings);
}

#[test]
fn test_saved_settings_seed_calculator() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("dosemate.db")).unwrap();
    db.save_settings(&Settings {
        default_weight_kg: 65.0,
        kcl_concentration: KclConcentration::FourMeqPerMl,
        locale: Locale::Es,
        ..Settings::default()
    })
    .unwrap();

    let settings = db.load_settings().unwrap();
    let catalog = DrugCatalog::bundled().unwrap();

    let kcl = catalog.get("potassium_chloride").unwrap();
    let mut input = CalculatorInput::for_drug(kcl, &settings);
    assert_eq!(input.amount, "40");
    assert_eq!(input.weight_kg, "65");

    // 10 mEq/h at 4 mEq/mL
    let out = input.derive();
    assert_eq!(out.rate_display, "2,5");
    assert_eq!(out.concentration_display, "4 mEq/mL");

    input.rate_ml_per_hour = "5".into();
    assert_eq!(input.derive().dose_display, "20,000");
}

#[test]
fn test_corrupt_settings_surface_as_error() {
    let db = Database::open_in_memory().unwrap();
    db.conn()
        .execute(
            "INSERT INTO settings (key, value, updated_at) VALUES ('user_settings', 'not json', '')",
            [],
        )
        .unwrap();
    assert!(db.load_settings().is_err());
}
