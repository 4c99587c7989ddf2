//! Workbook data model and structural signature.
//!
//! A workbook is opaque to this client beyond its shape: an ordered list of
//! named sheets, each a 2-D grid of cell values. The signature fingerprints
//! that shape (sheet count plus ordered sheet names) and is the key that
//! saved templates are matched against when a workbook is re-uploaded.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single sheet: display name plus a row-major cell grid.
///
/// Sheet names are not guaranteed unique within a workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

/// An uploaded workbook, as returned by the engine's upload endpoint.
///
/// Owned by the session for its duration and replaced wholesale on each
/// new upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Ordered sheet names, for display.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }
}

/// Compute the structural signature of a workbook.
///
/// Format: `{sheet_count}:{name1}|{name2}|...|{nameN}`, names joined in
/// their given order. Two workbooks with the same sheet count and the same
/// ordered names share a signature regardless of cell contents. Equality is
/// order-, case- and whitespace-sensitive. Used only as a lookup key.
pub fn signature(workbook: Option<&Workbook>) -> Option<String> {
    let workbook = workbook?;
    let names = workbook
        .sheets
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join("|");
    Some(format!("{}:{}", workbook.sheets.len(), names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn workbook(names: &[&str]) -> Workbook {
        Workbook {
            sheets: names
                .iter()
                .map(|n| Sheet {
                    name: n.to_string(),
                    rows: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn no_workbook_has_no_signature() {
        assert_eq!(signature(None), None);
    }

    #[test]
    fn signature_format() {
        let wb = workbook(&["Sales", "Costs"]);
        assert_eq!(signature(Some(&wb)), Some("2:Sales|Costs".to_string()));
    }

    #[test]
    fn signature_ignores_cell_contents() {
        let mut a = workbook(&["Sales", "Costs"]);
        let b = workbook(&["Sales", "Costs"]);
        a.sheets[0].rows = vec![vec![json!("Region"), json!(42)]];
        assert_eq!(signature(Some(&a)), signature(Some(&b)));
    }

    #[test]
    fn signature_is_order_sensitive() {
        let a = workbook(&["Sales", "Costs"]);
        let b = workbook(&["Costs", "Sales"]);
        assert_ne!(signature(Some(&a)), signature(Some(&b)));
    }

    #[test]
    fn signature_is_case_and_whitespace_sensitive() {
        let a = workbook(&["Sales"]);
        let b = workbook(&["sales"]);
        let c = workbook(&["Sales "]);
        assert_ne!(signature(Some(&a)), signature(Some(&b)));
        assert_ne!(signature(Some(&a)), signature(Some(&c)));
    }

    #[test]
    fn empty_workbook_still_fingerprints() {
        let wb = workbook(&[]);
        assert_eq!(signature(Some(&wb)), Some("0:".to_string()));
    }

    #[test]
    fn duplicate_sheet_names_are_allowed() {
        let wb = workbook(&["Data", "Data"]);
        assert_eq!(signature(Some(&wb)), Some("2:Data|Data".to_string()));
    }

    #[test]
    fn workbook_round_trips_through_json() {
        let mut wb = workbook(&["Sales"]);
        wb.sheets[0].rows = vec![vec![json!("Region"), json!("Revenue")], vec![json!("EU"), json!(1200.5)]];
        let raw = serde_json::to_string(&wb).unwrap();
        let back: Workbook = serde_json::from_str(&raw).unwrap();
        assert_eq!(wb, back);
    }

    proptest! {
        #[test]
        fn equal_name_sequences_yield_equal_signatures(names in proptest::collection::vec("[A-Za-z0-9 ]{0,12}", 0..6)) {
            let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
            let mut a = workbook(&name_refs);
            let b = workbook(&name_refs);
            // Cell contents must not influence the fingerprint.
            if let Some(sheet) = a.sheets.first_mut() {
                sheet.rows = vec![vec![json!(1), json!(2)]];
            }
            prop_assert_eq!(signature(Some(&a)), signature(Some(&b)));
        }

        #[test]
        fn differing_sheet_counts_yield_differing_signatures(names in proptest::collection::vec("[A-Za-z]{1,8}", 1..5)) {
            let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
            let a = workbook(&name_refs);
            let b = workbook(&name_refs[..name_refs.len() - 1]);
            prop_assert_ne!(signature(Some(&a)), signature(Some(&b)));
        }
    }
}
