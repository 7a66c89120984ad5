//! User settings and session capabilities.

use serde::{Deserialize, Serialize};

/// Display locale. Only affects number formatting in the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
    Pt,
}

impl Locale {
    /// Parse a language tag such as `pt`, `pt-BR` or `es_ES`. Unsupported
    /// languages fall back to English.
    pub fn from_tag(tag: &str) -> Locale {
        let lang = tag
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        match lang.as_str() {
            "es" => Locale::Es,
            "pt" => Locale::Pt,
            _ => Locale::En,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
            Locale::Pt => "pt",
        }
    }

    pub fn decimal_separator(self) -> char {
        match self {
            Locale::En => '.',
            Locale::Es | Locale::Pt => ',',
        }
    }
}

/// Potassium chloride stock strength preferred by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KclConcentration {
    #[default]
    #[serde(rename = "2_meq_per_ml")]
    TwoMeqPerMl,
    #[serde(rename = "4_meq_per_ml")]
    FourMeqPerMl,
}

impl KclConcentration {
    pub fn meq_per_ml(self) -> f64 {
        match self {
            KclConcentration::TwoMeqPerMl => 2.0,
            KclConcentration::FourMeqPerMl => 4.0,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            KclConcentration::TwoMeqPerMl => "2_meq_per_ml",
            KclConcentration::FourMeqPerMl => "4_meq_per_ml",
        }
    }

    pub fn parse(key: &str) -> Option<KclConcentration> {
        match key {
            "2_meq_per_ml" => Some(KclConcentration::TwoMeqPerMl),
            "4_meq_per_ml" => Some(KclConcentration::FourMeqPerMl),
            _ => None,
        }
    }
}

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Patient weight the calculator starts with
    pub default_weight_kg: f64,
    /// Start the calculator from the drug's default preparation
    pub use_default_concentration: bool,
    pub kcl_concentration: KclConcentration,
    pub locale: Locale,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_weight_kg: 70.0,
            use_default_concentration: true,
            kcl_concentration: KclConcentration::default(),
            locale: Locale::default(),
        }
    }
}

impl Settings {
    /// Check values a user could have entered out of range.
    pub fn validate(&self) -> Result<(), String> {
        if !self.default_weight_kg.is_finite() || self.default_weight_kg <= 0.0 {
            return Err(format!(
                "default weight must be a positive number of kg, got {}",
                self.default_weight_kg
            ));
        }
        Ok(())
    }
}

/// Session capabilities computed outside the core.
///
/// The licensing collaborator decides `is_premium_enabled` once per
/// session; the core only carries the value to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub is_premium_enabled: bool,
}
