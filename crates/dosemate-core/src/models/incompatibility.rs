//! Drug-drug incompatibility matrix.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Y-site compatibility code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompatibilityCode {
    /// Precipitation
    P,
    /// Degradation
    D,
    /// Acute kidney injury risk
    #[serde(rename = "AKI")]
    Aki,
    /// Y-site contraindication
    #[serde(rename = "CI")]
    Ci,
    /// Compatible
    C,
    /// Not recommended / no data
    X,
}

impl CompatibilityCode {
    pub const ALL: [CompatibilityCode; 6] = [
        CompatibilityCode::P,
        CompatibilityCode::D,
        CompatibilityCode::Aki,
        CompatibilityCode::Ci,
        CompatibilityCode::C,
        CompatibilityCode::X,
    ];

    pub fn code(self) -> &'static str {
        match self {
            CompatibilityCode::P => "P",
            CompatibilityCode::D => "D",
            CompatibilityCode::Aki => "AKI",
            CompatibilityCode::Ci => "CI",
            CompatibilityCode::C => "C",
            CompatibilityCode::X => "X",
        }
    }

    pub fn parse(code: &str) -> Option<CompatibilityCode> {
        Self::ALL.into_iter().find(|c| c.code() == code.trim())
    }
}

impl fmt::Display for CompatibilityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single cell of the rendered matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixCell {
    /// Drug against itself
    SelfPair,
    Code(CompatibilityCode),
}

/// The precomputed matrix as shipped in the reference data.
///
/// Only one triangle needs to be populated: lookups are symmetric.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IncompatibilityMatrix {
    pub drug_keys: Vec<String>,
    #[serde(default)]
    pub matrix: HashMap<String, HashMap<String, String>>,
    #[serde(default)]
    pub key_definitions: BTreeMap<String, String>,
}

impl IncompatibilityMatrix {
    /// Symmetric lookup: `matrix[row][col]`, then `matrix[col][row]`, else X.
    ///
    /// Codes outside the known set are reported as X.
    pub fn lookup(&self, row: &str, col: &str) -> CompatibilityCode {
        self.raw(row, col)
            .or_else(|| self.raw(col, row))
            .and_then(CompatibilityCode::parse)
            .unwrap_or(CompatibilityCode::X)
    }

    /// Cell for display, distinguishing the diagonal.
    pub fn cell(&self, row: &str, col: &str) -> MatrixCell {
        if row == col {
            MatrixCell::SelfPair
        } else {
            MatrixCell::Code(self.lookup(row, col))
        }
    }

    /// Description of a code from `key_definitions`.
    pub fn definition(&self, code: CompatibilityCode) -> Option<&str> {
        self.key_definitions.get(code.code()).map(String::as_str)
    }

    /// Codes with a definition, in severity order.
    pub fn legend(&self) -> Vec<(CompatibilityCode, &str)> {
        CompatibilityCode::ALL
            .into_iter()
            .filter_map(|code| self.definition(code).map(|d| (code, d)))
            .collect()
    }

    fn raw(&self, row: &str, col: &str) -> Option<&str> {
        self.matrix
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IncompatibilityMatrix {
        serde_json::from_str(
            r#"{
                "drug_keys": ["noradrenaline", "furosemide", "heparin"],
                "matrix": {
                    "noradrenaline": { "furosemide": "P", "heparin": "C" },
                    "heparin": { "furosemide": "??" }
                },
                "key_definitions": { "P": "Precipitation", "C": "Compatible", "X": "No data" }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_is_symmetric() {
        let m = sample();
        assert_eq!(m.lookup("noradrenaline", "furosemide"), CompatibilityCode::P);
        assert_eq!(m.lookup("furosemide", "noradrenaline"), CompatibilityCode::P);
        assert_eq!(m.lookup("heparin", "noradrenaline"), CompatibilityCode::C);
    }

    #[test]
    fn test_lookup_defaults_to_x() {
        let m = sample();
        assert_eq!(m.lookup("noradrenaline", "insulin"), CompatibilityCode::X);
        // unknown code
        assert_eq!(m.lookup("heparin", "furosemide"), CompatibilityCode::X);
    }

    #[test]
    fn test_self_pair() {
        let m = sample();
        assert_eq!(m.cell("heparin", "heparin"), MatrixCell::SelfPair);
        assert_eq!(
            m.cell("noradrenaline", "heparin"),
            MatrixCell::Code(CompatibilityCode::C)
        );
    }

    #[test]
    fn test_legend_order() {
        let m = sample();
        let legend: Vec<_> = m.legend().into_iter().map(|(c, _)| c).collect();
        assert_eq!(
            legend,
            vec![CompatibilityCode::P, CompatibilityCode::C, CompatibilityCode::X]
        );
        assert_eq!(m.definition(CompatibilityCode::Aki), None);
    }
}
