//! Solution concentration models.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::CountUnit;

/// Unit a drug amount is stocked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmountUnit {
    #[serde(rename = "mcg", alias = "µg", alias = "μg")]
    Mcg,
    #[serde(rename = "mg")]
    Mg,
    #[serde(rename = "g")]
    G,
    #[serde(rename = "U")]
    U,
    #[serde(rename = "mEq")]
    MEq,
}

impl AmountUnit {
    pub const ALL: [AmountUnit; 5] = [
        AmountUnit::Mcg,
        AmountUnit::Mg,
        AmountUnit::G,
        AmountUnit::U,
        AmountUnit::MEq,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            AmountUnit::Mcg => "mcg",
            AmountUnit::Mg => "mg",
            AmountUnit::G => "g",
            AmountUnit::U => "U",
            AmountUnit::MEq => "mEq",
        }
    }

    /// Parse a unit symbol. The micro sign spellings are accepted for mcg.
    pub fn parse(symbol: &str) -> Option<AmountUnit> {
        match symbol.trim() {
            "mcg" | "µg" | "μg" => Some(AmountUnit::Mcg),
            "mg" => Some(AmountUnit::Mg),
            "g" => Some(AmountUnit::G),
            "U" => Some(AmountUnit::U),
            "mEq" => Some(AmountUnit::MEq),
            _ => None,
        }
    }

    /// Multiplier to micrograms, or `None` for count units.
    pub fn mcg_factor(self) -> Option<f64> {
        match self {
            AmountUnit::G => Some(1_000_000.0),
            AmountUnit::Mg => Some(1_000.0),
            AmountUnit::Mcg => Some(1.0),
            AmountUnit::U | AmountUnit::MEq => None,
        }
    }

    /// Count unit for U and mEq, `None` for mass units.
    pub fn count_unit(self) -> Option<CountUnit> {
        match self {
            AmountUnit::U => Some(CountUnit::Unit),
            AmountUnit::MEq => Some(CountUnit::Milliequivalent),
            AmountUnit::Mcg | AmountUnit::Mg | AmountUnit::G => None,
        }
    }

    pub fn family(self) -> ConcentrationFamily {
        match self {
            AmountUnit::Mcg | AmountUnit::Mg | AmountUnit::G => ConcentrationFamily::Mass,
            AmountUnit::U | AmountUnit::MEq => ConcentrationFamily::Count,
        }
    }
}

impl fmt::Display for AmountUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Dimension of a resolved concentration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcentrationFamily {
    Mass,
    Count,
}

/// Amount-per-volume unit of a resolved concentration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcentrationUnit {
    #[serde(rename = "mcg/mL")]
    McgPerMl,
    #[serde(rename = "U/mL")]
    UnitsPerMl,
    #[serde(rename = "mEq/mL")]
    MeqPerMl,
}

impl ConcentrationUnit {
    pub fn label(self) -> &'static str {
        match self {
            ConcentrationUnit::McgPerMl => "mcg/mL",
            ConcentrationUnit::UnitsPerMl => "U/mL",
            ConcentrationUnit::MeqPerMl => "mEq/mL",
        }
    }

    pub fn family(self) -> ConcentrationFamily {
        match self {
            ConcentrationUnit::McgPerMl => ConcentrationFamily::Mass,
            ConcentrationUnit::UnitsPerMl | ConcentrationUnit::MeqPerMl => {
                ConcentrationFamily::Count
            }
        }
    }

    pub(crate) fn for_count(unit: CountUnit) -> Self {
        match unit {
            CountUnit::Unit => ConcentrationUnit::UnitsPerMl,
            CountUnit::Milliequivalent => ConcentrationUnit::MeqPerMl,
        }
    }
}

/// A drug amount dissolved in a diluent volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationInput {
    /// Drug amount in `amount_unit`
    pub amount: f64,
    pub amount_unit: AmountUnit,
    /// Total solution volume in mL
    pub volume_ml: f64,
}

impl ConcentrationInput {
    pub fn new(amount: f64, amount_unit: AmountUnit, volume_ml: f64) -> Self {
        Self {
            amount,
            amount_unit,
            volume_ml,
        }
    }
}

/// Normalized amount per mL.
///
/// Mass concentrations are always in mcg/mL. Count concentrations stay in
/// their native unit. A concentration with no unit is degenerate: it could
/// not be resolved and every conversion against it yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConcentration {
    pub value_per_ml: f64,
    pub unit: Option<ConcentrationUnit>,
}

impl ResolvedConcentration {
    pub const DEGENERATE: ResolvedConcentration = ResolvedConcentration {
        value_per_ml: 0.0,
        unit: None,
    };

    pub fn new(value_per_ml: f64, unit: ConcentrationUnit) -> Self {
        Self {
            value_per_ml,
            unit: Some(unit),
        }
    }

    pub fn family(&self) -> Option<ConcentrationFamily> {
        self.unit.map(ConcentrationUnit::family)
    }

    /// `mcg/mL`, `U/mL`, `mEq/mL`, or empty when degenerate.
    pub fn unit_label(&self) -> &'static str {
        self.unit.map(ConcentrationUnit::label).unwrap_or("")
    }

    /// Whether conversions can use this concentration.
    pub fn is_usable(&self) -> bool {
        self.unit.is_some() && self.value_per_ml.is_finite() && self.value_per_ml != 0.0
    }
}
