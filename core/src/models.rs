use serde::{Deserialize, Serialize};

use crate::error::CarbonError;
use crate::species::SpeciesGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "snake_case")]
pub enum TimePoint {
    Before,
    After,
}

impl TimePoint {
    pub fn label(&self) -> &'static str {
        match self {
            TimePoint::Before => "Time 1",
            TimePoint::After => "Time 2",
        }
    }
}

/// One validated diameter reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct Measurement {
    pub species: SpeciesGroup,
    pub diameter_in: f64,
    pub time_point: TimePoint,
}

/// A single-tree sheet row as supplied by the input feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct TreeRow {
    pub team: String,
    /// Raw species label, resolved during computation.
    pub species: String,
    pub year: i32,
    pub diameter1_in: Option<f64>,
    pub diameter2_in: Option<f64>,
}

/// One stem in a woodland plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct StemRow {
    /// Team owning the plot; stems are grouped by team and year.
    pub team: String,
    /// Reporting year.
    pub year: i32,
    /// Tag from the sheet, if any. Not used in computation.
    pub stem_id: Option<String>,
    /// Raw species label, resolved during computation.
    pub species: String,
    /// Diameter at the first survey (in). `None` for ingrowth.
    pub diameter1_in: Option<f64>,
    /// Diameter at the remeasurement (in). `None` if not remeasured.
    pub diameter2_in: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct TreeRecord {
    /// Position of the source row in the input.
    pub row_index: u32,
    pub team: String,
    pub year: i32,
    pub species: SpeciesGroup,
    /// Rounded to 0.1 in.
    pub diameter1_in: f64,
    pub diameter2_in: Option<f64>,
    /// Rounded to whole pounds.
    pub carbon1_lb: f64,
    pub carbon2_lb: Option<f64>,
    pub carbon_sequestered_lb: Option<f64>,
    pub co2e1_lb: f64,
    pub co2e2_lb: Option<f64>,
    pub co2e_sequestered_lb: Option<f64>,
}

impl TreeRecord {
    pub fn has_both_time_points(&self) -> bool {
        self.carbon2_lb.is_some()
    }
}

/// Per-acre carbon for one team's plot in one reporting year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct PlotAggregate {
    pub team: String,
    pub year: i32,
    /// Stems with a time-1 diameter.
    pub stem_count1: u32,
    /// Stems with a time-2 diameter.
    pub stem_count2: u32,
    /// Time-1 stem carbon (lb) times the expansion factor. 0 when no stem
    /// was measured at time 1.
    pub carbon_per_acre1_lb: f64,
    /// Time-2 carbon (lb/acre); `None` when no stem was remeasured.
    pub carbon_per_acre2_lb: Option<f64>,
    /// CO2e (lb/acre) at time 1.
    pub co2e_per_acre1_lb: f64,
    /// CO2e (lb/acre) at time 2.
    pub co2e_per_acre2_lb: Option<f64>,
    /// Carbon (short tons/acre) at time 1.
    pub tons_per_acre1: f64,
    /// Carbon (short tons/acre) at time 2.
    pub tons_per_acre2: Option<f64>,
    /// Tons/acre at time 2 minus time 1; needs stems at both time points.
    pub tons_sequestered: Option<f64>,
    /// The plot was remeasured, but the two time points were summed over
    /// different numbers of stems.
    pub stem_count_mismatch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnknownSpecies,
    InvalidMeasurement,
}

/// A row that could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct RowIssue {
    pub row_index: u32,
    pub team: String,
    pub kind: IssueKind,
    pub message: String,
}

/// Zero-based input position as carried on records and issues.
pub(crate) fn row_position(index: usize) -> Result<u32, CarbonError> {
    u32::try_from(index).map_err(|_| {
        CarbonError::InvalidConfig(format!(
            "batch has more than {} rows; split it before computing",
            u32::MAX
        ))
    })
}

impl RowIssue {
    pub fn new(row_index: u32, team: &str, error: &CarbonError) -> Self {
        let kind = match error {
            CarbonError::UnknownSpecies { .. } => IssueKind::UnknownSpecies,
            _ => IssueKind::InvalidMeasurement,
        };
        Self {
            row_index,
            team: team.to_string(),
            kind,
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Tree row has no time-2 diameter.
    MissingTimeTwo,
    /// No stem in the plot has a time-2 diameter.
    PlotNotRemeasured,
    /// The plot's time-1 and time-2 stem counts differ.
    StemCountMismatch,
}

/// Non-fatal incomplete time series notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct SeriesWarning {
    pub team: String,
    pub year: i32,
    /// Source row for tree warnings; `None` for plot-level warnings.
    pub row_index: Option<u32>,
    pub kind: WarningKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct TreeReport {
    pub records: Vec<TreeRecord>,
    pub issues: Vec<RowIssue>,
    pub warnings: Vec<SeriesWarning>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct PlotReport {
    pub aggregates: Vec<PlotAggregate>,
    pub issues: Vec<RowIssue>,
    pub warnings: Vec<SeriesWarning>,
}
