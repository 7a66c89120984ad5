//! Compound dose units used for continuous infusions.
//!
//! A [`DoseUnit`] is one of a closed set of clinical labels (`mcg/kg/min`,
//! `U/h`, ...). Arithmetic never looks at the label: each unit is decoded
//! once into [`DoseUnitParts`] and the converter branches on those tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{AmountUnit, ConcentrationUnit};

/// Mass scale of a mass-family dose unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MassUnit {
    Mcg,
    Mg,
}

impl MassUnit {
    /// Multiplier that takes this scale to micrograms.
    pub fn mcg_factor(self) -> f64 {
        match self {
            MassUnit::Mcg => 1.0,
            MassUnit::Mg => 1000.0,
        }
    }
}

/// Count-based quantity. Never converted to or from mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountUnit {
    /// Potency unit "U" (insulin, heparin, vasopressin)
    Unit,
    /// Milliequivalent "mEq" (electrolytes)
    Milliequivalent,
}

impl CountUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            CountUnit::Unit => "U",
            CountUnit::Milliequivalent => "mEq",
        }
    }
}

/// What a dose counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityKind {
    Mass(MassUnit),
    Count(CountUnit),
}

/// Whether a dose is normalized to patient body weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightBasis {
    PerKg,
    Absolute,
}

/// Time base of a dose rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeBasis {
    PerMinute,
    PerHour,
}

impl TimeBasis {
    /// Multiplier that takes this time base to per-hour.
    pub fn per_hour_factor(self) -> f64 {
        match self {
            TimeBasis::PerMinute => 60.0,
            TimeBasis::PerHour => 1.0,
        }
    }
}

/// The three independent axes of a compound dose unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoseUnitParts {
    pub quantity_kind: QuantityKind,
    pub weight_basis: WeightBasis,
    pub time_basis: TimeBasis,
}

/// Supported dose units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoseUnit {
    #[serde(rename = "mcg/kg/min")]
    McgPerKgPerMin,
    #[serde(rename = "mcg/kg/h")]
    McgPerKgPerHour,
    #[serde(rename = "mg/kg/min")]
    MgPerKgPerMin,
    #[serde(rename = "mg/kg/h")]
    MgPerKgPerHour,
    #[serde(rename = "mcg/min")]
    McgPerMin,
    #[serde(rename = "mg/min")]
    MgPerMin,
    #[serde(rename = "mcg/h")]
    McgPerHour,
    #[serde(rename = "mg/h")]
    MgPerHour,
    #[serde(rename = "U/kg/min")]
    UnitsPerKgPerMin,
    #[serde(rename = "U/kg/h")]
    UnitsPerKgPerHour,
    #[serde(rename = "U/min")]
    UnitsPerMin,
    #[serde(rename = "U/h")]
    UnitsPerHour,
    #[serde(rename = "mEq/kg/min")]
    MeqPerKgPerMin,
    #[serde(rename = "mEq/kg/h")]
    MeqPerKgPerHour,
    #[serde(rename = "mEq/min")]
    MeqPerMin,
    #[serde(rename = "mEq/h")]
    MeqPerHour,
}

impl DoseUnit {
    /// All units, in the order the calculator offers them.
    pub const ALL: [DoseUnit; 16] = [
        DoseUnit::McgPerKgPerMin,
        DoseUnit::McgPerKgPerHour,
        DoseUnit::MgPerKgPerMin,
        DoseUnit::MgPerKgPerHour,
        DoseUnit::McgPerMin,
        DoseUnit::MgPerMin,
        DoseUnit::McgPerHour,
        DoseUnit::MgPerHour,
        DoseUnit::UnitsPerKgPerMin,
        DoseUnit::UnitsPerKgPerHour,
        DoseUnit::UnitsPerMin,
        DoseUnit::UnitsPerHour,
        DoseUnit::MeqPerKgPerMin,
        DoseUnit::MeqPerKgPerHour,
        DoseUnit::MeqPerMin,
        DoseUnit::MeqPerHour,
    ];

    /// Clinical label, e.g. `mcg/kg/min`.
    pub fn label(self) -> &'static str {
        match self {
            DoseUnit::McgPerKgPerMin => "mcg/kg/min",
            DoseUnit::McgPerKgPerHour => "mcg/kg/h",
            DoseUnit::MgPerKgPerMin => "mg/kg/min",
            DoseUnit::MgPerKgPerHour => "mg/kg/h",
            DoseUnit::McgPerMin => "mcg/min",
            DoseUnit::MgPerMin => "mg/min",
            DoseUnit::McgPerHour => "mcg/h",
            DoseUnit::MgPerHour => "mg/h",
            DoseUnit::UnitsPerKgPerMin => "U/kg/min",
            DoseUnit::UnitsPerKgPerHour => "U/kg/h",
            DoseUnit::UnitsPerMin => "U/min",
            DoseUnit::UnitsPerHour => "U/h",
            DoseUnit::MeqPerKgPerMin => "mEq/kg/min",
            DoseUnit::MeqPerKgPerHour => "mEq/kg/h",
            DoseUnit::MeqPerMin => "mEq/min",
            DoseUnit::MeqPerHour => "mEq/h",
        }
    }

    /// Parse a clinical label. Exact match only.
    pub fn parse(label: &str) -> Option<DoseUnit> {
        Self::ALL.into_iter().find(|u| u.label() == label)
    }

    /// Decode the unit into its quantity, weight and time axes.
    pub fn decompose(self) -> DoseUnitParts {
        use CountUnit::*;
        use MassUnit::*;
        use QuantityKind::*;
        use TimeBasis::*;
        use WeightBasis::*;

        let (quantity_kind, weight_basis, time_basis) = match self {
            DoseUnit::McgPerKgPerMin => (Mass(Mcg), PerKg, PerMinute),
            DoseUnit::McgPerKgPerHour => (Mass(Mcg), PerKg, PerHour),
            DoseUnit::MgPerKgPerMin => (Mass(Mg), PerKg, PerMinute),
            DoseUnit::MgPerKgPerHour => (Mass(Mg), PerKg, PerHour),
            DoseUnit::McgPerMin => (Mass(Mcg), Absolute, PerMinute),
            DoseUnit::MgPerMin => (Mass(Mg), Absolute, PerMinute),
            DoseUnit::McgPerHour => (Mass(Mcg), Absolute, PerHour),
            DoseUnit::MgPerHour => (Mass(Mg), Absolute, PerHour),
            DoseUnit::UnitsPerKgPerMin => (Count(Unit), PerKg, PerMinute),
            DoseUnit::UnitsPerKgPerHour => (Count(Unit), PerKg, PerHour),
            DoseUnit::UnitsPerMin => (Count(Unit), Absolute, PerMinute),
            DoseUnit::UnitsPerHour => (Count(Unit), Absolute, PerHour),
            DoseUnit::MeqPerKgPerMin => (Count(Milliequivalent), PerKg, PerMinute),
            DoseUnit::MeqPerKgPerHour => (Count(Milliequivalent), PerKg, PerHour),
            DoseUnit::MeqPerMin => (Count(Milliequivalent), Absolute, PerMinute),
            DoseUnit::MeqPerHour => (Count(Milliequivalent), Absolute, PerHour),
        };

        DoseUnitParts {
            quantity_kind,
            weight_basis,
            time_basis,
        }
    }

    pub fn is_per_kg(self) -> bool {
        self.decompose().weight_basis == WeightBasis::PerKg
    }

    /// Whether a dose in this unit can be delivered from a solution in `unit`.
    ///
    /// Mass doses need mcg/mL; U and mEq doses need their own count unit.
    pub fn is_compatible_with(self, unit: ConcentrationUnit) -> bool {
        matches!(
            (self.decompose().quantity_kind, unit),
            (QuantityKind::Mass(_), ConcentrationUnit::McgPerMl)
                | (QuantityKind::Count(CountUnit::Unit), ConcentrationUnit::UnitsPerMl)
                | (
                    QuantityKind::Count(CountUnit::Milliequivalent),
                    ConcentrationUnit::MeqPerMl
                )
        )
    }

    /// Starting dose unit and value when a drug stocked in `amount_unit` is selected.
    pub fn default_for(amount_unit: AmountUnit) -> (DoseUnit, f64) {
        match amount_unit {
            AmountUnit::U => (DoseUnit::UnitsPerHour, 10.0),
            AmountUnit::MEq => (DoseUnit::MeqPerHour, 10.0),
            AmountUnit::Mcg | AmountUnit::Mg | AmountUnit::G => (DoseUnit::McgPerKgPerMin, 0.05),
        }
    }
}

impl fmt::Display for DoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a dose unit label is not in the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported dose unit: {0}")]
pub struct UnknownDoseUnit(pub String);

impl FromStr for DoseUnit {
    type Err = UnknownDoseUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DoseUnit::parse(s).ok_or_else(|| UnknownDoseUnit(s.to_string()))
    }
}
