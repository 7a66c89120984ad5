//! Drug catalog lookup and search.

use std::collections::HashSet;

use tracing::info;

use super::{DataError, DataResult};
use crate::calc::{format_number, AMOUNT_DIGITS, MEQ_PER_ML_DIGITS, PER_ML_DIGITS, VOLUME_DIGITS};
use crate::models::{ConcentrationUnit, DrugConcentration, DrugRecord, Locale};

const BUNDLED_DRUGS: &str = include_str!("../../data/drug_database.json");

/// The static drug dataset.
#[derive(Debug, Clone, Default)]
pub struct DrugCatalog {
    drugs: Vec<DrugRecord>,
}

impl DrugCatalog {
    /// Build a catalog, rejecting duplicate slugs and preparations with a
    /// non-positive or non-finite volume or a negative amount.
    pub fn new(drugs: Vec<DrugRecord>) -> DataResult<Self> {
        let mut seen = HashSet::new();
        for drug in &drugs {
            if !seen.insert(drug.slug.as_str()) {
                return Err(DataError::DuplicateSlug(drug.slug.clone()));
            }
            for conc in &drug.concentrations {
                validate_concentration(&drug.slug, conc)?;
            }
        }
        Ok(Self { drugs })
    }

    /// Parse the dataset from its JSON array form.
    pub fn from_json(json: &str) -> DataResult<Self> {
        let drugs: Vec<DrugRecord> = serde_json::from_str(json)?;
        let catalog = Self::new(drugs)?;
        info!(drugs = catalog.len(), "drug catalog loaded");
        Ok(catalog)
    }

    /// The dataset shipped with the library.
    pub fn bundled() -> DataResult<Self> {
        Self::from_json(BUNDLED_DRUGS)
    }

    pub fn len(&self) -> usize {
        self.drugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&DrugRecord> {
        self.drugs.iter().find(|d| d.slug == slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.get(slug).is_some()
    }

    /// All drugs, alphabetical by display name.
    pub fn sorted(&self) -> Vec<&DrugRecord> {
        let mut drugs: Vec<&DrugRecord> = self.drugs.iter().collect();
        drugs.sort_by(|a, b| a.drug.cmp(&b.drug));
        drugs
    }

    /// Drugs whose display name contains `query`, case-insensitively,
    /// alphabetical. A blank query returns everything.
    pub fn search(&self, query: &str) -> Vec<&DrugRecord> {
        let query = query.trim().to_lowercase();
        self.sorted()
            .into_iter()
            .filter(|d| d.name_matches(&query))
            .collect()
    }

    /// Slug → display name pairs.
    pub fn display_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.drugs.iter().map(|d| (d.slug.as_str(), d.drug.as_str()))
    }
}

fn validate_concentration(slug: &str, conc: &DrugConcentration) -> DataResult<()> {
    let invalid = |reason: String| DataError::InvalidConcentration {
        slug: slug.to_string(),
        reason,
    };
    if !conc.total_volume.is_finite() || conc.total_volume <= 0.0 {
        return Err(invalid(format!("total_volume {}", conc.total_volume)));
    }
    if !conc.drug_amount.is_finite() || conc.drug_amount < 0.0 {
        return Err(invalid(format!("drug_amount {}", conc.drug_amount)));
    }
    Ok(())
}

/// Label for a preparation: the dataset's own label, else
/// "`amount` `unit` in `volume` mL".
pub fn concentration_label(conc: &DrugConcentration, locale: Locale) -> String {
    if let Some(label) = conc.label.as_deref().filter(|l| !l.is_empty()) {
        return label.to_string();
    }
    format!(
        "{} {} in {} mL",
        format_number(Some(conc.drug_amount), AMOUNT_DIGITS, locale),
        conc.drug_unit,
        format_number(Some(conc.total_volume), VOLUME_DIGITS, locale)
    )
}

/// Per-mL figure for drug detail, e.g. "2,00 mEq/mL" or "16 mcg/mL".
pub fn per_ml_label(conc: &DrugConcentration, locale: Locale) -> Option<String> {
    let (value, unit) = conc.per_ml_summary()?;
    let digits = match unit {
        ConcentrationUnit::MeqPerMl => MEQ_PER_ML_DIGITS,
        ConcentrationUnit::UnitsPerMl | ConcentrationUnit::McgPerMl => PER_ML_DIGITS,
    };
    Some(format!(
        "{} {}",
        format_number(Some(value), digits, locale),
        unit.label()
    ))
}
