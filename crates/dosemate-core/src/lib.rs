//! DoseMate Core Library
//!
//! Continuous-infusion reference and dose/rate conversion for clinical use.
//!
//! # Architecture
//!
//! ```text
//!   Drug catalog ──► default preparation ──► ConcentrationInput
//!                                                   │
//!                                         resolve_concentration
//!                                                   │
//!                                       ResolvedConcentration (mcg/mL | U/mL | mEq/mL)
//!                                                   │
//!              weight ──────────────────► ConversionContext
//!                                                   │
//!                              ┌────────────────────┴────────────────────┐
//!                              ▼                                         ▼
//!                    dose_to_rate (Dose → mL/h)            rate_to_dose (mL/h → Dose)
//!                              │                                         │
//!                              └──────────► format_number ◄──────────────┘
//! ```
//!
//! # Core Principle
//!
//! **Incomplete input is a normal state.** Every conversion is a pure
//! function that answers `None` for a cleared field, a zero volume, or a
//! per-kg unit without a weight. Nothing in the conversion path returns an
//! error or panics.
//!
//! # Modules
//!
//! - [`calc`]: Concentration resolver, dose/rate converter, formatting, calculator form
//! - [`models`]: Domain types (DoseUnit, DrugRecord, IncompatibilityMatrix, Settings, etc.)
//! - [`reference`]: Drug catalog and incompatibility matrix loading
//! - [`db`]: SQLite store for device-local settings

pub mod calc;
pub mod db;
pub mod models;
pub mod reference;

// Re-export commonly used types
pub use calc::{
    dose_to_rate, format_number, parse_numeric_input, rate_to_dose, resolve_concentration,
    CalculatorInput, CalculatorOutput, ConversionContext, Dose, Rate,
};
pub use db::Database;
pub use models::{
    AmountUnit, Capabilities, CompatibilityCode, ConcentrationInput, DoseUnit, DrugRecord,
    IncompatibilityMatrix, Locale, ResolvedConcentration, Settings,
};
pub use reference::{DrugCatalog, MatrixView};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use tracing::warn;

use models::{KclConcentration, MatrixCell};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum DoseMateError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Reference data error: {0}")]
    DataError(String),
}

impl From<db::DbError> for DoseMateError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::Constraint(msg) => DoseMateError::InvalidInput(msg),
            other => DoseMateError::DatabaseError(other.to_string()),
        }
    }
}

impl From<reference::DataError> for DoseMateError {
    fn from(e: reference::DataError) -> Self {
        DoseMateError::DataError(e.to_string())
    }
}

impl From<models::UnknownDoseUnit> for DoseMateError {
    fn from(e: models::UnknownDoseUnit) -> Self {
        DoseMateError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for DoseMateError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        DoseMateError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn parse_amount_unit(symbol: &str) -> Result<AmountUnit, DoseMateError> {
    AmountUnit::parse(symbol)
        .ok_or_else(|| DoseMateError::InvalidInput(format!("Unsupported amount unit: {}", symbol)))
}

fn parse_dose_unit(label: &str) -> Result<DoseUnit, DoseMateError> {
    Ok(label.parse::<DoseUnit>()?)
}

// =========================================================================
// Pure conversion functions (exported to FFI)
// =========================================================================

/// Resolve a drug amount in a diluent volume to an amount per mL.
#[uniffi::export]
pub fn ffi_resolve_concentration(
    input: FfiConcentrationInput,
) -> Result<FfiResolvedConcentration, DoseMateError> {
    let input = ConcentrationInput::try_from(input)?;
    Ok(resolve_concentration(&input).into())
}

/// Infusion rate (mL/h) for a dose, or `None` when inputs are incomplete.
#[uniffi::export]
pub fn ffi_dose_to_rate(
    dose_value: f64,
    dose_unit: String,
    weight_kg: Option<f64>,
    concentration: FfiConcentrationInput,
) -> Result<Option<f64>, DoseMateError> {
    let unit = parse_dose_unit(&dose_unit)?;
    let ctx = ConversionContext::new(
        weight_kg,
        resolve_concentration(&ConcentrationInput::try_from(concentration)?),
    );
    Ok(dose_to_rate(&Dose::new(dose_value, unit), &ctx).map(|r| r.ml_per_hour))
}

/// Dose in `target_unit` for an infusion rate, or `None` when inputs are incomplete.
#[uniffi::export]
pub fn ffi_rate_to_dose(
    ml_per_hour: f64,
    target_unit: String,
    weight_kg: Option<f64>,
    concentration: FfiConcentrationInput,
) -> Result<Option<f64>, DoseMateError> {
    let unit = parse_dose_unit(&target_unit)?;
    let ctx = ConversionContext::new(
        weight_kg,
        resolve_concentration(&ConcentrationInput::try_from(concentration)?),
    );
    Ok(rate_to_dose(&Rate::new(ml_per_hour), unit, &ctx).map(|d| d.value))
}

/// Format a number for display in the given language tag. `digits` is capped
/// at [`calc::MAX_DIGITS`].
#[uniffi::export]
pub fn ffi_format_number(value: Option<f64>, digits: u32, locale: String) -> String {
    let digits = (digits as usize).min(calc::MAX_DIGITS);
    format_number(value, digits, Locale::from_tag(&locale))
}

/// Parse a numeric text field (comma or point decimal).
#[uniffi::export]
pub fn ffi_parse_numeric_input(text: String) -> Option<f64> {
    parse_numeric_input(&text)
}

/// Supported dose unit labels, in presentation order.
#[uniffi::export]
pub fn ffi_dose_units() -> Vec<String> {
    DoseUnit::ALL.iter().map(|u| u.label().to_string()).collect()
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create the settings database at the given path, with the bundled
/// reference data.
#[uniffi::export]
pub fn open_database(
    path: String,
    capabilities: FfiCapabilities,
) -> Result<Arc<DoseMateCore>, DoseMateError> {
    let db = Database::open(&path)?;
    DoseMateCore::with_bundled_data(db, capabilities.into())
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory(
    capabilities: FfiCapabilities,
) -> Result<Arc<DoseMateCore>, DoseMateError> {
    let db = Database::open_in_memory()?;
    DoseMateCore::with_bundled_data(db, capabilities.into())
}

/// Open the settings database with caller-supplied reference data.
#[uniffi::export]
pub fn open_database_with_data(
    path: String,
    drugs_json: String,
    matrix_json: String,
    capabilities: FfiCapabilities,
) -> Result<Arc<DoseMateCore>, DoseMateError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(DoseMateCore {
        db: Arc::new(Mutex::new(db)),
        catalog: DrugCatalog::from_json(&drugs_json)?,
        matrix: IncompatibilityMatrix::from_json(&matrix_json)?,
        capabilities: capabilities.into(),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Session handle for FFI: settings store, reference data and capabilities.
#[derive(uniffi::Object)]
pub struct DoseMateCore {
    db: Arc<Mutex<Database>>,
    catalog: DrugCatalog,
    matrix: IncompatibilityMatrix,
    capabilities: Capabilities,
}

impl DoseMateCore {
    fn with_bundled_data(
        db: Database,
        capabilities: Capabilities,
    ) -> Result<Arc<Self>, DoseMateError> {
        Ok(Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            catalog: DrugCatalog::bundled()?,
            matrix: IncompatibilityMatrix::bundled()?,
            capabilities,
        }))
    }

    fn drug(&self, slug: &str) -> Result<&DrugRecord, DoseMateError> {
        self.catalog
            .get(slug)
            .ok_or_else(|| DoseMateError::NotFound(format!("drug {}", slug)))
    }
}

#[uniffi::export]
impl DoseMateCore {
    // =========================================================================
    // Capabilities
    // =========================================================================

    /// Premium features flag, as injected when the session was opened.
    pub fn is_premium_enabled(&self) -> bool {
        self.capabilities.is_premium_enabled
    }

    // =========================================================================
    // Drug Catalog
    // =========================================================================

    /// All drugs, alphabetical.
    pub fn list_drugs(&self) -> Vec<FfiDrugSummary> {
        self.catalog.sorted().into_iter().map(Into::into).collect()
    }

    /// Drugs whose name contains the query, alphabetical.
    pub fn search_drugs(&self, query: String) -> Vec<FfiDrugSummary> {
        self.catalog
            .search(&query)
            .into_iter()
            .map(Into::into)
            .collect()
    }

    /// Full record for a drug detail page. Unreadable settings fall back to
    /// the default locale.
    pub fn get_drug(&self, slug: String) -> Result<Option<FfiDrugDetail>, DoseMateError> {
        let locale = match self.db.lock()?.load_settings() {
            Ok(settings) => settings.locale,
            Err(e) => {
                warn!(error = %e, "settings unreadable, formatting drug detail in default locale");
                Locale::default()
            }
        };
        Ok(self
            .catalog
            .get(&slug)
            .map(|d| FfiDrugDetail::from_record(d, locale)))
    }

    // =========================================================================
    // Calculator
    // =========================================================================

    /// Calculator fields seeded for a drug and the saved settings.
    pub fn calculator_for_drug(&self, slug: String) -> Result<FfiCalculatorInput, DoseMateError> {
        let settings = self.db.lock()?.load_settings()?;
        let drug = self.drug(&slug)?;
        Ok(CalculatorInput::for_drug(drug, &settings).into())
    }

    /// Derive every displayed value from the current field snapshot.
    pub fn derive_calculator(
        &self,
        input: FfiCalculatorInput,
    ) -> Result<FfiCalculatorOutput, DoseMateError> {
        let input = CalculatorInput::try_from(input)?;
        Ok(input.derive().into())
    }

    // =========================================================================
    // Incompatibility Matrix
    // =========================================================================

    /// Matrix headers in display order.
    pub fn matrix_keys(&self) -> Vec<FfiMatrixKey> {
        MatrixView::new(&self.matrix, &self.catalog)
            .keys()
            .iter()
            .map(|k| FfiMatrixKey {
                slug: k.slug.clone(),
                name: k.name.clone(),
                linkable: k.linkable,
            })
            .collect()
    }

    /// Matrix cell codes in display order; "self" marks the diagonal.
    pub fn matrix_rows(&self) -> Vec<Vec<String>> {
        MatrixView::new(&self.matrix, &self.catalog)
            .rows()
            .into_iter()
            .map(|row| row.into_iter().map(cell_code).collect())
            .collect()
    }

    /// Symmetric lookup of one drug pair.
    pub fn lookup_compatibility(&self, row: String, col: String) -> FfiCompatibility {
        let code = self.matrix.lookup(&row, &col);
        FfiCompatibility {
            code: code.code().to_string(),
            description: self.matrix.definition(code).map(str::to_string),
        }
    }

    /// Code definitions for the legend.
    pub fn matrix_legend(&self) -> Vec<FfiCompatibility> {
        self.matrix
            .legend()
            .into_iter()
            .map(|(code, description)| FfiCompatibility {
                code: code.code().to_string(),
                description: Some(description.to_string()),
            })
            .collect()
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn get_settings(&self) -> Result<FfiSettings, DoseMateError> {
        let db = self.db.lock()?;
        Ok(db.load_settings()?.into())
    }

    pub fn save_settings(&self, settings: FfiSettings) -> Result<(), DoseMateError> {
        let settings = Settings::try_from(settings)?;
        let db = self.db.lock()?;
        db.save_settings(&settings)?;
        Ok(())
    }

    pub fn reset_settings(&self) -> Result<(), DoseMateError> {
        let db = self.db.lock()?;
        db.reset_settings()?;
        Ok(())
    }
}

fn cell_code(cell: MatrixCell) -> String {
    match cell {
        MatrixCell::SelfPair => "self".to_string(),
        MatrixCell::Code(code) => code.code().to_string(),
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe session capabilities.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCapabilities {
    pub is_premium_enabled: bool,
}

impl From<FfiCapabilities> for Capabilities {
    fn from(caps: FfiCapabilities) -> Self {
        Capabilities {
            is_premium_enabled: caps.is_premium_enabled,
        }
    }
}

/// FFI-safe concentration input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiConcentrationInput {
    pub amount: f64,
    /// mcg, mg, g, U or mEq
    pub amount_unit: String,
    pub volume_ml: f64,
}

impl TryFrom<FfiConcentrationInput> for ConcentrationInput {
    type Error = DoseMateError;

    fn try_from(input: FfiConcentrationInput) -> Result<Self, Self::Error> {
        Ok(ConcentrationInput::new(
            input.amount,
            parse_amount_unit(&input.amount_unit)?,
            input.volume_ml,
        ))
    }
}

/// FFI-safe resolved concentration.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiResolvedConcentration {
    pub value_per_ml: f64,
    /// "mass", "count", or None when degenerate
    pub family: Option<String>,
    /// "mcg/mL", "U/mL", "mEq/mL", or empty when degenerate
    pub unit_label: String,
}

impl From<ResolvedConcentration> for FfiResolvedConcentration {
    fn from(conc: ResolvedConcentration) -> Self {
        Self {
            value_per_ml: conc.value_per_ml,
            family: conc.family().map(|f| match f {
                models::ConcentrationFamily::Mass => "mass".to_string(),
                models::ConcentrationFamily::Count => "count".to_string(),
            }),
            unit_label: conc.unit_label().to_string(),
        }
    }
}

/// FFI-safe drug list entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrugSummary {
    pub slug: String,
    pub name: String,
    pub category: Option<String>,
}

impl From<&DrugRecord> for FfiDrugSummary {
    fn from(drug: &DrugRecord) -> Self {
        Self {
            slug: drug.slug.clone(),
            name: drug.drug.clone(),
            category: drug.category.clone(),
        }
    }
}

/// FFI-safe preparation line for drug detail.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiConcentrationLine {
    pub label: String,
    pub diluent: Option<String>,
    pub per_ml: Option<String>,
    pub is_default: bool,
}

/// FFI-safe Y-site incompatibility entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiYSiteIncompatibility {
    pub medication_key: String,
    pub type_key: String,
    pub observation_key: Option<String>,
}

/// FFI-safe drug detail.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrugDetail {
    pub slug: String,
    pub name: String,
    pub generic_name: Option<String>,
    pub category: Option<String>,
    pub concentrations: Vec<FfiConcentrationLine>,
    pub dose_range: Option<String>,
    pub diluent_compatibility: Option<String>,
    pub site_compatibility: Option<String>,
    pub stability: Option<String>,
    pub monitoring: Option<String>,
    pub safety_notes: Option<String>,
    pub incompatibilities: Vec<FfiYSiteIncompatibility>,
}

impl FfiDrugDetail {
    fn from_record(drug: &DrugRecord, locale: Locale) -> Self {
        Self {
            slug: drug.slug.clone(),
            name: drug.drug.clone(),
            generic_name: drug.generic_name.clone(),
            category: drug.category().map(|c| c.key().to_string()),
            concentrations: drug
                .concentrations
                .iter()
                .map(|c| FfiConcentrationLine {
                    label: reference::concentration_label(c, locale),
                    diluent: c.diluent.clone(),
                    per_ml: reference::per_ml_label(c, locale),
                    is_default: c.is_default,
                })
                .collect(),
            dose_range: drug.dose_range.clone(),
            diluent_compatibility: drug.diluent_compatibility.clone(),
            site_compatibility: drug.site_compatibility.clone(),
            stability: drug.stability.clone(),
            monitoring: drug.monitoring.clone(),
            safety_notes: drug.safety_notes.clone(),
            incompatibilities: drug
                .incompatibilities
                .iter()
                .map(|i| FfiYSiteIncompatibility {
                    medication_key: i.medication_key.clone(),
                    type_key: i.type_key.clone(),
                    observation_key: i.observation_key.clone(),
                })
                .collect(),
        }
    }
}

/// FFI-safe calculator fields.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCalculatorInput {
    pub drug_slug: Option<String>,
    pub amount: String,
    pub amount_unit: String,
    pub volume_ml: String,
    pub weight_kg: String,
    pub dose: String,
    pub dose_unit: String,
    pub rate_ml_per_hour: String,
    pub custom_concentration: bool,
    pub locale: String,
}

impl From<CalculatorInput> for FfiCalculatorInput {
    fn from(input: CalculatorInput) -> Self {
        Self {
            drug_slug: input.drug_slug,
            amount: input.amount,
            amount_unit: input.amount_unit.symbol().to_string(),
            volume_ml: input.volume_ml,
            weight_kg: input.weight_kg,
            dose: input.dose,
            dose_unit: input.dose_unit.label().to_string(),
            rate_ml_per_hour: input.rate_ml_per_hour,
            custom_concentration: input.custom_concentration,
            locale: input.locale.tag().to_string(),
        }
    }
}

impl TryFrom<FfiCalculatorInput> for CalculatorInput {
    type Error = DoseMateError;

    fn try_from(input: FfiCalculatorInput) -> Result<Self, Self::Error> {
        Ok(CalculatorInput {
            drug_slug: input.drug_slug,
            amount: input.amount,
            amount_unit: parse_amount_unit(&input.amount_unit)?,
            volume_ml: input.volume_ml,
            weight_kg: input.weight_kg,
            dose: input.dose,
            dose_unit: parse_dose_unit(&input.dose_unit)?,
            rate_ml_per_hour: input.rate_ml_per_hour,
            custom_concentration: input.custom_concentration,
            locale: Locale::from_tag(&input.locale),
        })
    }
}

/// FFI-safe calculator output.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCalculatorOutput {
    pub concentration: FfiResolvedConcentration,
    pub concentration_display: String,
    pub ml_per_hour: Option<f64>,
    pub rate_display: String,
    pub dose_value: Option<f64>,
    pub dose_display: String,
}

impl From<CalculatorOutput> for FfiCalculatorOutput {
    fn from(out: CalculatorOutput) -> Self {
        Self {
            concentration: out.concentration.into(),
            concentration_display: out.concentration_display,
            ml_per_hour: out.rate.map(|r| r.ml_per_hour),
            rate_display: out.rate_display,
            dose_value: out.dose.map(|d| d.value),
            dose_display: out.dose_display,
        }
    }
}

/// FFI-safe matrix header.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMatrixKey {
    pub slug: String,
    pub name: String,
    pub linkable: bool,
}

/// FFI-safe compatibility code with its description.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCompatibility {
    pub code: String,
    pub description: Option<String>,
}

/// FFI-safe settings.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSettings {
    pub default_weight_kg: f64,
    pub use_default_concentration: bool,
    /// "2_meq_per_ml" or "4_meq_per_ml"
    pub kcl_concentration: String,
    pub locale: String,
}

impl From<Settings> for FfiSettings {
    fn from(settings: Settings) -> Self {
        Self {
            default_weight_kg: settings.default_weight_kg,
            use_default_concentration: settings.use_default_concentration,
            kcl_concentration: settings.kcl_concentration.key().to_string(),
            locale: settings.locale.tag().to_string(),
        }
    }
}

impl TryFrom<FfiSettings> for Settings {
    type Error = DoseMateError;

    fn try_from(settings: FfiSettings) -> Result<Self, Self::Error> {
        let kcl_concentration =
            KclConcentration::parse(&settings.kcl_concentration).ok_or_else(|| {
                DoseMateError::InvalidInput(format!(
                    "Unsupported KCl concentration: {}",
                    settings.kcl_concentration
                ))
            })?;
        Ok(Settings {
            default_weight_kg: settings.default_weight_kg,
            use_default_concentration: settings.use_default_concentration,
            kcl_concentration,
            locale: Locale::from_tag(&settings.locale),
        })
    }
}
