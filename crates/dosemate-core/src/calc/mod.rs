//! Dose/rate conversion engine.
//!
//! Pipeline: ConcentrationInput → resolve → ConversionContext → dose ⇄ rate
//!
//! Every operation here is a pure function of its inputs. Incomplete or
//! invalid input (cleared field, zero volume, per-kg unit without weight)
//! produces `None`, never an error.

mod concentration;
mod converter;
mod form;
mod format;

pub use concentration::*;
pub use converter::*;
pub use form::*;
pub use format::*;

use serde::{Deserialize, Serialize};

use crate::models::{DoseUnit, ResolvedConcentration};

/// A dose expressed in a compound clinical unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dose {
    pub value: f64,
    pub unit: DoseUnit,
}

impl Dose {
    pub fn new(value: f64, unit: DoseUnit) -> Self {
        Self { value, unit }
    }
}

/// Volumetric infusion rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub ml_per_hour: f64,
}

impl Rate {
    pub fn new(ml_per_hour: f64) -> Self {
        Self { ml_per_hour }
    }
}

/// Patient weight and solution concentration a conversion runs against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionContext {
    /// Only read for per-kg units
    pub weight_kg: Option<f64>,
    pub concentration: ResolvedConcentration,
}

impl ConversionContext {
    pub fn new(weight_kg: Option<f64>, concentration: ResolvedConcentration) -> Self {
        Self {
            weight_kg,
            concentration,
        }
    }

    /// Weight usable for per-kg scaling: present, finite and positive.
    pub fn usable_weight(&self) -> Option<f64> {
        self.weight_kg.filter(|w| w.is_finite() && *w > 0.0)
    }
}
