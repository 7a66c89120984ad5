//! Incompatibility matrix presentation helpers.

use std::collections::HashMap;

use tracing::info;

use super::{DataResult, DrugCatalog};
use crate::models::{IncompatibilityMatrix, MatrixCell};

const BUNDLED_MATRIX: &str = include_str!("../../data/incompatibilities.json");

/// Display names for matrix keys that have no entry in the drug catalog.
pub const EXTERNAL_DRUG_NAMES: &[(&str, &str)] = &[
    ("epinephrine", "Epinephrine (Adrenaline)"),
    ("albumin", "Albumin"),
    ("aminoglycosides", "Aminoglycosides"),
    ("amphotericin_b", "Amphotericin B"),
    ("calcium_chloride", "Calcium Chloride"),
    ("isosorbide_dinitrate", "Isosorbide Dinitrate"),
    ("magnesium_sulfate", "Magnesium Sulfate"),
    ("metronidazole", "Metronidazole"),
    ("phenytoin", "Phenytoin"),
    ("quinolones", "Quinolones"),
];

impl IncompatibilityMatrix {
    pub fn from_json(json: &str) -> DataResult<Self> {
        let matrix: IncompatibilityMatrix = serde_json::from_str(json)?;
        info!(drugs = matrix.drug_keys.len(), "incompatibility matrix loaded");
        Ok(matrix)
    }

    /// The matrix shipped with the library.
    pub fn bundled() -> DataResult<Self> {
        Self::from_json(BUNDLED_MATRIX)
    }
}

/// One row/column header of the rendered matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixKey {
    pub slug: String,
    pub name: String,
    /// The drug has a detail page in the catalog
    pub linkable: bool,
}

/// The matrix joined with catalog names, ready to render.
#[derive(Debug, Clone)]
pub struct MatrixView<'a> {
    matrix: &'a IncompatibilityMatrix,
    keys: Vec<MatrixKey>,
}

impl<'a> MatrixView<'a> {
    /// Order the matrix keys by display name. Catalog names take precedence
    /// over the external table; unknown keys display as their slug.
    pub fn new(matrix: &'a IncompatibilityMatrix, catalog: &DrugCatalog) -> Self {
        let mut names: HashMap<&str, &str> = EXTERNAL_DRUG_NAMES.iter().copied().collect();
        names.extend(catalog.display_names());

        let mut keys: Vec<MatrixKey> = matrix
            .drug_keys
            .iter()
            .map(|slug| MatrixKey {
                slug: slug.clone(),
                name: names.get(slug.as_str()).copied().unwrap_or(slug.as_str()).to_string(),
                linkable: catalog.contains(slug),
            })
            .collect();
        keys.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        Self { matrix, keys }
    }

    pub fn keys(&self) -> &[MatrixKey] {
        &self.keys
    }

    /// Cells in display order, one `Vec` per row.
    pub fn rows(&self) -> Vec<Vec<MatrixCell>> {
        self.keys
            .iter()
            .map(|row| {
                self.keys
                    .iter()
                    .map(|col| self.matrix.cell(&row.slug, &col.slug))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompatibilityCode;

    #[test]
    fn test_bundled_view_sorted_by_name() {
        let catalog = DrugCatalog::bundled().unwrap();
        let matrix = IncompatibilityMatrix::bundled().unwrap();
        let view = MatrixView::new(&matrix, &catalog);

        let names: Vec<&str> = view.keys().iter().map(|k| k.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Albumin",
                "Dobutamine",
                "Furosemide",
                "Heparin",
                "Noradrenaline",
                "Phenytoin",
                "Potassium Chloride",
            ]
        );
    }

    #[test]
    fn test_external_drugs_not_linkable() {
        let catalog = DrugCatalog::bundled().unwrap();
        let matrix = IncompatibilityMatrix::bundled().unwrap();
        let view = MatrixView::new(&matrix, &catalog);

        let albumin = view.keys().iter().find(|k| k.slug == "albumin").unwrap();
        assert!(!albumin.linkable);
        let heparin = view.keys().iter().find(|k| k.slug == "heparin").unwrap();
        assert!(heparin.linkable);
    }

    #[test]
    fn test_rows_diagonal_and_symmetry() {
        let catalog = DrugCatalog::bundled().unwrap();
        let matrix = IncompatibilityMatrix::bundled().unwrap();
        let view = MatrixView::new(&matrix, &catalog);
        let rows = view.rows();
        let n = view.keys().len();

        assert_eq!(rows.len(), n);
        for i in 0..n {
            assert_eq!(rows[i][i], MatrixCell::SelfPair);
            for j in 0..n {
                assert_eq!(rows[i][j] == MatrixCell::SelfPair, i == j);
                assert_eq!(rows[i][j], rows[j][i]);
            }
        }

        assert_eq!(
            matrix.lookup("potassium_chloride", "phenytoin"),
            CompatibilityCode::Ci
        );
        assert_eq!(matrix.lookup("albumin", "dobutamine"), CompatibilityCode::X);
    }

    #[test]
    fn test_unknown_key_displays_slug() {
        let matrix: IncompatibilityMatrix =
            serde_json::from_str(r#"{ "drug_keys": ["mystery_drug"] }"#).unwrap();
        let view = MatrixView::new(&matrix, &DrugCatalog::default());
        assert_eq!(view.keys()[0].name, "mystery_drug");
    }
}
