//! Drug reference records.

use serde::{Deserialize, Serialize};

use super::{AmountUnit, ConcentrationInput, ConcentrationUnit};

/// A drug in the reference dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugRecord {
    /// Unique key, also used in routes and the incompatibility matrix
    pub slug: String,
    /// Display name
    pub drug: String,
    #[serde(default)]
    pub generic_name: Option<String>,
    /// Clinical category (vasoactive, snc, cardio, ...)
    #[serde(default)]
    pub category: Option<String>,
    /// Standard preparations
    #[serde(default)]
    pub concentrations: Vec<DrugConcentration>,
    #[serde(default)]
    pub dose_range: Option<String>,
    #[serde(default)]
    pub diluent_compatibility: Option<String>,
    #[serde(default)]
    pub site_compatibility: Option<String>,
    #[serde(default)]
    pub stability: Option<String>,
    #[serde(default)]
    pub monitoring: Option<String>,
    #[serde(default)]
    pub safety_notes: Option<String>,
    /// Y-site incompatibilities (translation keys)
    #[serde(default)]
    pub incompatibilities: Vec<YSiteIncompatibility>,
}

/// One standard preparation of a drug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugConcentration {
    pub drug_amount: f64,
    pub drug_unit: AmountUnit,
    /// Total solution volume in mL
    pub total_volume: f64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    /// Diluent translation key (e.g. "SG5%")
    #[serde(default)]
    pub diluent: Option<String>,
    #[serde(rename = "mEq_per_ml", default)]
    pub meq_per_ml: Option<f64>,
    #[serde(default)]
    pub mcg_per_ml: Option<f64>,
    #[serde(rename = "U_per_ml", alias = "U_per_mL", default)]
    pub units_per_ml: Option<f64>,
}

/// Y-site incompatibility entry on a drug record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YSiteIncompatibility {
    pub medication_key: String,
    pub type_key: String,
    #[serde(default)]
    pub observation_key: Option<String>,
}

/// Clinical category used for styling cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrugCategory {
    Vasoactive,
    Snc,
    Cardio,
    Electrolytes,
    Antibiotic,
    Other,
}

impl DrugCategory {
    pub fn key(self) -> &'static str {
        match self {
            DrugCategory::Vasoactive => "vasoactive",
            DrugCategory::Snc => "snc",
            DrugCategory::Cardio => "cardio",
            DrugCategory::Electrolytes => "electrolytes",
            DrugCategory::Antibiotic => "antibiotic",
            DrugCategory::Other => "other",
        }
    }

    /// Parse a category name, case-insensitively.
    pub fn parse(name: &str) -> Option<DrugCategory> {
        match name.trim().to_lowercase().as_str() {
            "vasoactive" => Some(DrugCategory::Vasoactive),
            "snc" => Some(DrugCategory::Snc),
            "cardio" => Some(DrugCategory::Cardio),
            "electrolytes" => Some(DrugCategory::Electrolytes),
            "antibiotic" => Some(DrugCategory::Antibiotic),
            "other" => Some(DrugCategory::Other),
            _ => None,
        }
    }
}

impl DrugRecord {
    /// The preparation flagged as default, else the first one.
    pub fn default_concentration(&self) -> Option<&DrugConcentration> {
        self.concentrations
            .iter()
            .find(|c| c.is_default)
            .or_else(|| self.concentrations.first())
    }

    pub fn category(&self) -> Option<DrugCategory> {
        self.category.as_deref().and_then(DrugCategory::parse)
    }

    /// Whether the display name contains `query` (already lowercased).
    pub(crate) fn name_matches(&self, query_lower: &str) -> bool {
        self.drug.to_lowercase().contains(query_lower)
    }

    pub fn is_potassium_chloride(&self) -> bool {
        let slug = self.slug.to_lowercase();
        slug == "kcl"
            || slug == "potassium_chloride"
            || slug == "potassium-chloride"
            || self.drug.to_lowercase().starts_with("potassium chloride")
    }
}

impl DrugConcentration {
    pub fn to_input(&self) -> ConcentrationInput {
        ConcentrationInput::new(self.drug_amount, self.drug_unit, self.total_volume)
    }

    /// Precomputed per-mL figure carried by the dataset, if any.
    ///
    /// mEq/mL wins over U/mL, which wins over mcg/mL; only positive
    /// figures count.
    pub fn per_ml_summary(&self) -> Option<(f64, ConcentrationUnit)> {
        let positive = |v: Option<f64>| v.filter(|x| *x > 0.0);
        positive(self.meq_per_ml)
            .map(|v| (v, ConcentrationUnit::MeqPerMl))
            .or_else(|| positive(self.units_per_ml).map(|v| (v, ConcentrationUnit::UnitsPerMl)))
            .or_else(|| positive(self.mcg_per_ml).map(|v| (v, ConcentrationUnit::McgPerMl)))
    }
}
