//! Named-field projection and sequestration ranking.
//!
//! Records are read through [`Projectable`], so a table only ever shows the
//! fields it asks for by name. Projection copies values; it never rounds or
//! rewrites them.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::CarbonError;
use crate::models::{PlotAggregate, TreeRecord};

/// Every field a presentation table can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Team,
    Year,
    Species,
    Diameter1,
    Diameter2,
    Carbon1,
    Carbon2,
    CarbonSequestered,
    Co2e1,
    Co2e2,
    Co2eSequestered,
    StemCount1,
    StemCount2,
    CarbonPerAcre1,
    CarbonPerAcre2,
    Co2ePerAcre1,
    Co2ePerAcre2,
    TonsPerAcre1,
    TonsPerAcre2,
    TonsSequestered,
}

impl Column {
    pub fn key(&self) -> &'static str {
        match self {
            Column::Team => "team",
            Column::Year => "year",
            Column::Species => "species",
            Column::Diameter1 => "diameter1",
            Column::Diameter2 => "diameter2",
            Column::Carbon1 => "carbon1",
            Column::Carbon2 => "carbon2",
            Column::CarbonSequestered => "carbon_sequestered",
            Column::Co2e1 => "co2e1",
            Column::Co2e2 => "co2e2",
            Column::Co2eSequestered => "co2e_sequestered",
            Column::StemCount1 => "stem_count1",
            Column::StemCount2 => "stem_count2",
            Column::CarbonPerAcre1 => "carbon_per_acre1",
            Column::CarbonPerAcre2 => "carbon_per_acre2",
            Column::Co2ePerAcre1 => "co2e_per_acre1",
            Column::Co2ePerAcre2 => "co2e_per_acre2",
            Column::TonsPerAcre1 => "tons_per_acre1",
            Column::TonsPerAcre2 => "tons_per_acre2",
            Column::TonsSequestered => "tons_sequestered",
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            Column::Team => "Team",
            Column::Year => "Year",
            Column::Species => "Species Group",
            Column::Diameter1 => "Diameter 1 (in)",
            Column::Diameter2 => "Diameter 2 (in)",
            Column::Carbon1 => "Carbon 1 (lb)",
            Column::Carbon2 => "Carbon 2 (lb)",
            Column::CarbonSequestered => "Carbon Sequestered (lb)",
            Column::Co2e1 => "CO2e 1 (lb)",
            Column::Co2e2 => "CO2e 2 (lb)",
            Column::Co2eSequestered => "CO2e Sequestered (lb)",
            Column::StemCount1 => "Stems 1",
            Column::StemCount2 => "Stems 2",
            Column::CarbonPerAcre1 => "Carbon 1 (lb/acre)",
            Column::CarbonPerAcre2 => "Carbon 2 (lb/acre)",
            Column::Co2ePerAcre1 => "CO2e 1 (lb/acre)",
            Column::Co2ePerAcre2 => "CO2e 2 (lb/acre)",
            Column::TonsPerAcre1 => "Carbon 1 (tons/acre)",
            Column::TonsPerAcre2 => "Carbon 2 (tons/acre)",
            Column::TonsSequestered => "Carbon Sequestered (tons/acre)",
        }
    }
}

/// One projected value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Enum)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    fn from_optional(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Empty)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Number(n) => Some(*n),
            Cell::Text(_) | Cell::Empty => None,
        }
    }

    fn compare(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
        }
    }
}

/// Field access by column for computed records.
pub trait Projectable {
    fn cell(&self, column: Column) -> Result<Cell, CarbonError>;
    fn team(&self) -> &str;
    fn year(&self) -> i32;

    /// Data-quality flag that can keep a record out of rankings.
    fn needs_review(&self) -> bool {
        false
    }
}

fn unsupported(column: Column, record: &str) -> CarbonError {
    CarbonError::UnsupportedColumn {
        column: column.key().to_string(),
        record: record.to_string(),
    }
}

impl Projectable for TreeRecord {
    fn cell(&self, column: Column) -> Result<Cell, CarbonError> {
        Ok(match column {
            Column::Team => Cell::Text(self.team.clone()),
            Column::Year => Cell::Integer(self.year as i64),
            Column::Species => Cell::Text(self.species.label().to_string()),
            Column::Diameter1 => Cell::Number(self.diameter1_in),
            Column::Diameter2 => Cell::from_optional(self.diameter2_in),
            Column::Carbon1 => Cell::Number(self.carbon1_lb),
            Column::Carbon2 => Cell::from_optional(self.carbon2_lb),
            Column::CarbonSequestered => Cell::from_optional(self.carbon_sequestered_lb),
            Column::Co2e1 => Cell::Number(self.co2e1_lb),
            Column::Co2e2 => Cell::from_optional(self.co2e2_lb),
            Column::Co2eSequestered => Cell::from_optional(self.co2e_sequestered_lb),
            other => return Err(unsupported(other, "tree")),
        })
    }

    fn team(&self) -> &str {
        &self.team
    }

    fn year(&self) -> i32 {
        self.year
    }
}

impl Projectable for PlotAggregate {
    fn cell(&self, column: Column) -> Result<Cell, CarbonError> {
        Ok(match column {
            Column::Team => Cell::Text(self.team.clone()),
            Column::Year => Cell::Integer(self.year as i64),
            Column::StemCount1 => Cell::Integer(self.stem_count1 as i64),
            Column::StemCount2 => Cell::Integer(self.stem_count2 as i64),
            Column::CarbonPerAcre1 => Cell::Number(self.carbon_per_acre1_lb),
            Column::CarbonPerAcre2 => Cell::from_optional(self.carbon_per_acre2_lb),
            Column::Co2ePerAcre1 => Cell::Number(self.co2e_per_acre1_lb),
            Column::Co2ePerAcre2 => Cell::from_optional(self.co2e_per_acre2_lb),
            Column::TonsPerAcre1 => Cell::Number(self.tons_per_acre1),
            Column::TonsPerAcre2 => Cell::from_optional(self.tons_per_acre2),
            Column::TonsSequestered => Cell::from_optional(self.tons_sequestered),
            other => return Err(unsupported(other, "plot")),
        })
    }

    fn team(&self) -> &str {
        &self.team
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn needs_review(&self) -> bool {
        self.stem_count_mismatch
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct ColumnSpec {
    pub column: Column,
    /// Header override; the column's default label is used when absent.
    #[serde(default)]
    pub label: Option<String>,
}

impl ColumnSpec {
    pub fn header(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.column.default_label().to_string())
    }
}

impl From<Column> for ColumnSpec {
    fn from(column: Column) -> Self {
        ColumnSpec {
            column,
            label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, uniffi::Record)]
pub struct ProjectedRow {
    pub team: String,
    pub cells: Vec<Cell>,
}

/// Labeled rows ready for a table or chart renderer.
#[derive(Debug, Clone, PartialEq, Serialize, uniffi::Record)]
pub struct ProjectedTable {
    pub columns: Vec<Column>,
    pub headers: Vec<String>,
    pub rows: Vec<ProjectedRow>,
}

impl ProjectedTable {
    pub fn get(&self, row: usize, column: Column) -> Option<&Cell> {
        let idx = self.columns.iter().position(|c| *c == column)?;
        self.rows.get(row).and_then(|r| r.cells.get(idx))
    }

    pub fn teams(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.team.as_str()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct RankingProjector {
    columns: Vec<ColumnSpec>,
    sort_key: Column,
    descending: bool,
    row_cap: usize,
    excluded_teams: BTreeSet<String>,
    exclude_needs_review: bool,
}

impl RankingProjector {
    pub fn new(
        columns: Vec<ColumnSpec>,
        sort_key: Column,
        descending: bool,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            columns,
            sort_key,
            descending,
            row_cap: config.row_cap as usize,
            excluded_teams: config.excluded_team_set(),
            exclude_needs_review: !config.rank_partial_remeasurements,
        }
    }

    /// Trees ranked by pounds of carbon sequestered.
    pub fn tree_ranking(config: &PipelineConfig) -> Self {
        let columns = [
            Column::Team,
            Column::Species,
            Column::Diameter1,
            Column::Diameter2,
            Column::Carbon1,
            Column::Carbon2,
            Column::CarbonSequestered,
            Column::Co2eSequestered,
        ];
        Self::new(
            columns.into_iter().map(ColumnSpec::from).collect(),
            Column::CarbonSequestered,
            true,
            config,
        )
    }

    /// Time-1 values for every tree, including rows never remeasured.
    pub fn tree_listing(config: &PipelineConfig) -> Self {
        let columns = [
            Column::Team,
            Column::Species,
            Column::Diameter1,
            Column::Carbon1,
            Column::Co2e1,
        ];
        Self::new(
            columns.into_iter().map(ColumnSpec::from).collect(),
            Column::Carbon1,
            true,
            config,
        )
    }

    /// Plots ranked by tons of carbon per acre sequestered.
    pub fn plot_ranking(config: &PipelineConfig) -> Self {
        let columns = [
            Column::Team,
            Column::TonsPerAcre1,
            Column::TonsPerAcre2,
            Column::TonsSequestered,
        ];
        Self::new(
            columns.into_iter().map(ColumnSpec::from).collect(),
            Column::TonsSequestered,
            true,
            config,
        )
    }

    pub fn plot_listing(config: &PipelineConfig) -> Self {
        let columns = [
            Column::Team,
            Column::StemCount1,
            Column::CarbonPerAcre1,
            Column::Co2ePerAcre1,
            Column::TonsPerAcre1,
        ];
        Self::new(
            columns.into_iter().map(ColumnSpec::from).collect(),
            Column::TonsPerAcre1,
            true,
            config,
        )
    }

    /// Ranked table: excluded teams, flagged records and records with no
    /// sort value are dropped; ties keep input order; at most `row_cap` rows.
    pub fn rank<R: Projectable>(&self, records: &[R]) -> Result<ProjectedTable, CarbonError> {
        let mut keyed = Vec::with_capacity(records.len());
        for record in records {
            if self.excluded_teams.contains(record.team().trim()) {
                continue;
            }
            if self.exclude_needs_review && record.needs_review() {
                continue;
            }
            let key = record.cell(self.sort_key)?;
            if key.is_empty() {
                continue;
            }
            keyed.push((key, record));
        }

        // sort_by is stable, so equal keys keep their input order either way.
        if self.descending {
            keyed.sort_by(|(a, _), (b, _)| b.compare(a));
        } else {
            keyed.sort_by(|(a, _), (b, _)| a.compare(b));
        }
        keyed.truncate(self.row_cap);

        let ranked: Vec<&R> = keyed.into_iter().map(|(_, r)| r).collect();
        self.project(ranked)
    }

    /// Unranked table of every record in input order.
    pub fn listing<R: Projectable>(&self, records: &[R]) -> Result<ProjectedTable, CarbonError> {
        self.project(records.iter().collect())
    }

    fn project<R: Projectable>(&self, records: Vec<&R>) -> Result<ProjectedTable, CarbonError> {
        let rows = records
            .into_iter()
            .map(|record| {
                let cells = self
                    .columns
                    .iter()
                    .map(|spec| record.cell(spec.column))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ProjectedRow {
                    team: record.team().to_string(),
                    cells,
                })
            })
            .collect::<Result<Vec<_>, CarbonError>>()?;

        Ok(ProjectedTable {
            columns: self.columns.iter().map(|s| s.column).collect(),
            headers: self.columns.iter().map(ColumnSpec::header).collect(),
            rows,
        })
    }
}
