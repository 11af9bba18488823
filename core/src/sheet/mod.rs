//! Measurement sheet input.
//!
//! Turns a comma-delimited sheet export into [`TreeRow`] / [`StemRow`]
//! values. Only layout problems are reported here; species labels and
//! diameter values are checked by the pipelines so that bad rows can be
//! skipped individually.
//!
//! # Example
//!
//! ```
//! use treecarbon_compute::sheet::parse_tree_sheet;
//!
//! let text = "Team,Species,Year,Diameter 1,Diameter 2\n\
//!             North Ridge,Pine,2024,7.5,7.9\n\
//!             Creekside,Spruce,2024,6.1,\n";
//! let rows = parse_tree_sheet(text).expect("sheet should parse");
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[1].diameter2_in, None);
//! ```

pub mod parser;

pub use parser::{parse_records, SheetRecord};

use serde::{Deserialize, Serialize};

use crate::error::CarbonError;
use crate::models::{StemRow, TreeRow};

/// Header names looked up in the first row. Matching ignores case and
/// surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetColumns {
    pub team: String,
    pub species: String,
    pub year: String,
    /// Optional stem identifier column (plot sheets).
    pub stem: String,
    pub diameter1: String,
    /// Optional; a sheet without it is treated as time-1 only.
    pub diameter2: String,
}

impl Default for SheetColumns {
    fn default() -> Self {
        Self {
            team: "Team".to_string(),
            species: "Species".to_string(),
            year: "Year".to_string(),
            stem: "Stem".to_string(),
            diameter1: "Diameter 1".to_string(),
            diameter2: "Diameter 2".to_string(),
        }
    }
}

struct ColumnIndex {
    team: usize,
    species: usize,
    year: usize,
    stem: Option<usize>,
    diameter1: usize,
    diameter2: Option<usize>,
}

impl ColumnIndex {
    fn resolve(header: &[String], columns: &SheetColumns) -> Result<Self, CarbonError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
        };
        let require =
            |name: &str| find(name).ok_or_else(|| CarbonError::MissingColumn(name.to_string()));

        Ok(ColumnIndex {
            team: require(&columns.team)?,
            species: require(&columns.species)?,
            year: require(&columns.year)?,
            stem: find(&columns.stem),
            diameter1: require(&columns.diameter1)?,
            diameter2: find(&columns.diameter2),
        })
    }
}

fn field(record: &SheetRecord, idx: usize) -> &str {
    record.fields.get(idx).map(|s| s.as_str()).unwrap_or("")
}

fn parse_year(record: &SheetRecord, idx: usize) -> Result<i32, CarbonError> {
    let raw = field(record, idx);
    raw.parse().map_err(|_| CarbonError::SheetParse {
        line: record.line,
        message: format!("invalid year '{}'", raw),
    })
}

fn parse_diameter(record: &SheetRecord, idx: Option<usize>) -> Result<Option<f64>, CarbonError> {
    let Some(idx) = idx else {
        return Ok(None);
    };
    let raw = field(record, idx);
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| CarbonError::SheetParse {
        line: record.line,
        message: format!("invalid diameter '{}'", raw),
    })
}

fn split_header(text: &str) -> Result<(Vec<String>, Vec<SheetRecord>), CarbonError> {
    let mut records = parse_records(text)?.into_iter();
    let header = records.next().ok_or_else(|| CarbonError::SheetParse {
        line: 1,
        message: "sheet is empty".to_string(),
    })?;
    Ok((header.fields, records.collect()))
}

/// Parse a single-tree sheet using the default header names.
pub fn parse_tree_sheet(text: &str) -> Result<Vec<TreeRow>, CarbonError> {
    parse_tree_sheet_with(text, &SheetColumns::default())
}

pub fn parse_tree_sheet_with(
    text: &str,
    columns: &SheetColumns,
) -> Result<Vec<TreeRow>, CarbonError> {
    let (header, records) = split_header(text)?;
    let idx = ColumnIndex::resolve(&header, columns)?;

    records
        .iter()
        .map(|record| {
            Ok(TreeRow {
                team: field(record, idx.team).to_string(),
                species: field(record, idx.species).to_string(),
                year: parse_year(record, idx.year)?,
                diameter1_in: parse_diameter(record, Some(idx.diameter1))?,
                diameter2_in: parse_diameter(record, idx.diameter2)?,
            })
        })
        .collect()
}

/// Parse a woodland plot sheet using the default header names.
pub fn parse_stem_sheet(text: &str) -> Result<Vec<StemRow>, CarbonError> {
    parse_stem_sheet_with(text, &SheetColumns::default())
}

pub fn parse_stem_sheet_with(
    text: &str,
    columns: &SheetColumns,
) -> Result<Vec<StemRow>, CarbonError> {
    let (header, records) = split_header(text)?;
    let idx = ColumnIndex::resolve(&header, columns)?;

    records
        .iter()
        .map(|record| {
            let stem_id = idx
                .stem
                .map(|i| field(record, i).to_string())
                .filter(|s| !s.is_empty());
            Ok(StemRow {
                team: field(record, idx.team).to_string(),
                year: parse_year(record, idx.year)?,
                stem_id,
                species: field(record, idx.species).to_string(),
                diameter1_in: parse_diameter(record, Some(idx.diameter1))?,
                diameter2_in: parse_diameter(record, idx.diameter2)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE_SHEET: &str = "\
Team,Species,Year,Diameter 1,Diameter 2
Oak Street,Maple-oak-hickory-beech,2024,10.5,11.0
Riverside,Pine,2024,7.26,
\"Smith, Jones\",Spruce,2023,4.0,4.4
";

    #[test]
    fn test_parse_tree_sheet() {
        let rows = parse_tree_sheet(TREE_SHEET).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].team, "Oak Street");
        assert_eq!(rows[0].species, "Maple-oak-hickory-beech");
        assert_eq!(rows[0].diameter1_in, Some(10.5));
        assert_eq!(rows[0].diameter2_in, Some(11.0));
        assert_eq!(rows[1].diameter2_in, None);
        assert_eq!(rows[2].team, "Smith, Jones");
        assert_eq!(rows[2].year, 2023);
    }

    #[test]
    fn test_header_matching_ignores_case_and_order() {
        let text = "diameter 1, YEAR ,species,team\n3.5,2022,Aspen,Pond\n";
        let rows = parse_tree_sheet(text).unwrap();
        assert_eq!(rows[0].team, "Pond");
        assert_eq!(rows[0].species, "Aspen");
        assert_eq!(rows[0].diameter1_in, Some(3.5));
        assert_eq!(rows[0].diameter2_in, None);
    }

    #[test]
    fn test_custom_column_names() {
        let columns = SheetColumns {
            diameter1: "DBH 2023".to_string(),
            diameter2: "DBH 2024".to_string(),
            ..SheetColumns::default()
        };
        let text = "Team,Species,Year,DBH 2023,DBH 2024\nPond,Aspen,2024,3.5,3.9\n";
        let rows = parse_tree_sheet_with(text, &columns).unwrap();
        assert_eq!(rows[0].diameter2_in, Some(3.9));
    }

    #[test]
    fn test_missing_required_column() {
        let err = parse_tree_sheet("Team,Species,Diameter 1\nA,Pine,3\n").unwrap_err();
        assert_eq!(err, CarbonError::MissingColumn("Year".to_string()));
    }

    #[test]
    fn test_bad_numbers_report_line() {
        let err = parse_tree_sheet("Team,Species,Year,Diameter 1\nA,Pine,2024,3\nB,Pine,2024,abc\n")
            .unwrap_err();
        assert_eq!(
            err,
            CarbonError::SheetParse {
                line: 3,
                message: "invalid diameter 'abc'".to_string()
            }
        );

        let err = parse_tree_sheet("Team,Species,Year,Diameter 1\nA,Pine,,3\n").unwrap_err();
        assert!(matches!(err, CarbonError::SheetParse { line: 2, .. }));
    }

    #[test]
    fn test_empty_sheet() {
        assert!(matches!(
            parse_tree_sheet("\n\n"),
            Err(CarbonError::SheetParse { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_stem_sheet() {
        let text = "\
Team,Year,Stem,Species,Diameter 1,Diameter 2
Birch Hill,2024,1,Soft-maple-birch,6.0,6.4
Birch Hill,2024,,Aspen,4.0,
";
        let rows = parse_stem_sheet(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stem_id.as_deref(), Some("1"));
        assert_eq!(rows[1].stem_id, None);
        assert_eq!(rows[1].diameter2_in, None);
    }

    #[test]
    fn test_negative_diameter_passes_through() {
        let rows = parse_tree_sheet("Team,Species,Year,Diameter 1\nA,Pine,2024,-3\n").unwrap();
        assert_eq!(rows[0].diameter1_in, Some(-3.0));
    }
}
