//! Paired before/after chart series.
//!
//! Reshapes wide records (one row holding both time points) into long
//! points (one row per time point), the shape chart renderers consume.

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::CarbonError;
use crate::models::{PlotAggregate, TimePoint, TreeRecord};
use crate::ranking::{Column, Projectable};

/// One chart point: a record's value at one time point.
#[derive(Debug, Clone, PartialEq, Serialize, uniffi::Record)]
pub struct SeriesPoint {
    pub team: String,
    pub year: i32,
    pub time_point: TimePoint,
    pub value: f64,
}

/// Long-form points for `before`/`after` columns. A record contributes
/// either both points or none: excluded teams, records without both
/// values, and flagged records (when partial remeasurements are not
/// rankable) are left out.
pub fn paired_series<R: Projectable>(
    records: &[R],
    before: Column,
    after: Column,
    config: &PipelineConfig,
) -> Result<Vec<SeriesPoint>, CarbonError> {
    let excluded = config.excluded_team_set();
    let mut points = Vec::with_capacity(records.len() * 2);

    for record in records {
        if excluded.contains(record.team().trim()) {
            continue;
        }
        if !config.rank_partial_remeasurements && record.needs_review() {
            continue;
        }
        let (Some(v1), Some(v2)) = (record.cell(before)?.as_f64(), record.cell(after)?.as_f64())
        else {
            continue;
        };
        for (time_point, value) in [(TimePoint::Before, v1), (TimePoint::After, v2)] {
            points.push(SeriesPoint {
                team: record.team().to_string(),
                year: record.year(),
                time_point,
                value,
            });
        }
    }

    Ok(points)
}

/// Carbon (lb) per tree at both time points.
pub fn tree_carbon_series(
    records: &[TreeRecord],
    config: &PipelineConfig,
) -> Result<Vec<SeriesPoint>, CarbonError> {
    paired_series(records, Column::Carbon1, Column::Carbon2, config)
}

/// Carbon (tons/acre) per plot at both time points.
pub fn plot_tons_series(
    records: &[PlotAggregate],
    config: &PipelineConfig,
) -> Result<Vec<SeriesPoint>, CarbonError> {
    paired_series(records, Column::TonsPerAcre1, Column::TonsPerAcre2, config)
}
