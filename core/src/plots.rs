//! Woodland plot pipeline.
//!
//! Stems are computed individually, grouped by `(team, year)` and summed,
//! then expanded from the subplot to a full acre. Groups keep the order in
//! which they first appear in the input.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::allometry::validate_diameter;
use crate::config::{ConversionFactors, PipelineConfig, RowErrorPolicy};
use crate::error::CarbonError;
use crate::metrics::{derive_co2e, BiomassResult};
use crate::models::{
    row_position, Measurement, PlotAggregate, PlotReport, RowIssue, SeriesWarning, StemRow, TimePoint,
    WarningKind,
};
use crate::species::SpeciesGroup;

/// Unrounded carbon for one stem at each time point it was measured. A stem
/// that grew into the plot after the first survey has no time-1 value.
#[derive(Debug, Clone, PartialEq)]
pub struct StemCarbon {
    pub row_index: u32,
    pub team: String,
    pub year: i32,
    pub carbon1_lb: Option<f64>,
    pub carbon2_lb: Option<f64>,
}

fn stem_carbon(
    species: SpeciesGroup,
    field: &str,
    diameter_in: Option<f64>,
    time_point: TimePoint,
    factors: &ConversionFactors,
) -> Result<Option<f64>, CarbonError> {
    let Some(d) = diameter_in else {
        return Ok(None);
    };
    let measurement = Measurement {
        species,
        diameter_in: validate_diameter(field, Some(d))?,
        time_point,
    };
    Ok(Some(BiomassResult::compute(measurement, factors)?.carbon_lb))
}

impl StemCarbon {
    /// Fails when the species is unknown, a present diameter is invalid, or
    /// the stem has no diameter at either time point.
    pub fn compute(
        row_index: u32,
        row: &StemRow,
        factors: &ConversionFactors,
    ) -> Result<Self, CarbonError> {
        let species = SpeciesGroup::from_label(&row.species)?;
        if row.diameter1_in.is_none() && row.diameter2_in.is_none() {
            return Err(CarbonError::MissingDiameter {
                field: "diameter 1 and diameter 2".to_string(),
            });
        }
        let carbon1_lb = stem_carbon(
            species,
            "diameter 1",
            row.diameter1_in,
            TimePoint::Before,
            factors,
        )?;
        let carbon2_lb = stem_carbon(
            species,
            "diameter 2",
            row.diameter2_in,
            TimePoint::After,
            factors,
        )?;

        Ok(StemCarbon {
            row_index,
            team: row.team.trim().to_string(),
            year: row.year,
            carbon1_lb,
            carbon2_lb,
        })
    }
}

#[derive(Default)]
struct PlotSums {
    carbon1_lb: f64,
    carbon2_lb: f64,
    stem_count1: u32,
    stem_count2: u32,
}

/// Sum stem carbon per `(team, year)` and scale to a per-acre basis. Each
/// time point sums only the stems measured at it; sequestration needs at
/// least one stem at both.
pub fn aggregate_plots(stems: &[StemCarbon], factors: &ConversionFactors) -> Vec<PlotAggregate> {
    let mut order: Vec<(String, i32)> = Vec::new();
    let mut sums: HashMap<(String, i32), PlotSums> = HashMap::new();

    for stem in stems {
        let key = (stem.team.clone(), stem.year);
        let entry = sums.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            PlotSums::default()
        });
        if let Some(c1) = stem.carbon1_lb {
            entry.carbon1_lb += c1;
            entry.stem_count1 += 1;
        }
        if let Some(c2) = stem.carbon2_lb {
            entry.carbon2_lb += c2;
            entry.stem_count2 += 1;
        }
    }

    order
        .into_iter()
        .filter_map(|key| sums.remove(&key).map(|s| (key, s)))
        .map(|((team, year), s)| {
            let carbon_per_acre1_lb = s.carbon1_lb * factors.plot_expansion_factor;
            let tons_per_acre1 = carbon_per_acre1_lb / factors.lb_per_ton;

            let carbon_per_acre2_lb =
                (s.stem_count2 > 0).then(|| s.carbon2_lb * factors.plot_expansion_factor);
            let tons_per_acre2 = carbon_per_acre2_lb.map(|c| c / factors.lb_per_ton);

            PlotAggregate {
                team,
                year,
                stem_count1: s.stem_count1,
                stem_count2: s.stem_count2,
                carbon_per_acre1_lb,
                carbon_per_acre2_lb,
                co2e_per_acre1_lb: derive_co2e(carbon_per_acre1_lb, factors),
                co2e_per_acre2_lb: carbon_per_acre2_lb.map(|c| derive_co2e(c, factors)),
                tons_per_acre1,
                tons_per_acre2,
                tons_sequestered: tons_per_acre2
                    .filter(|_| s.stem_count1 > 0)
                    .map(|t2| t2 - tons_per_acre1),
                stem_count_mismatch: s.stem_count2 > 0 && s.stem_count2 != s.stem_count1,
            }
        })
        .collect()
}

/// Run the woodland pipeline: per-stem carbon, then per-plot aggregation.
pub fn compute_plot_report(
    rows: &[StemRow],
    config: &PipelineConfig,
) -> Result<PlotReport, CarbonError> {
    config.validate()?;
    let mut report = PlotReport::default();
    let mut stems = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let row_index = row_position(i)?;
        match StemCarbon::compute(row_index, row, &config.factors) {
            Ok(stem) => stems.push(stem),
            Err(err) => match config.row_error_policy {
                RowErrorPolicy::SkipAndReport => {
                    warn!(row = row_index, team = %row.team, error = %err, "skipping stem row");
                    report.issues.push(RowIssue::new(row_index, row.team.trim(), &err));
                }
                RowErrorPolicy::Abort => {
                    return Err(CarbonError::RowRejected {
                        row_index,
                        team: row.team.trim().to_string(),
                        reason: err.to_string(),
                    });
                }
            },
        }
    }

    report.aggregates = aggregate_plots(&stems, &config.factors);

    for plot in &report.aggregates {
        debug!(
            team = %plot.team,
            year = plot.year,
            stems = plot.stem_count1,
            tons_per_acre1 = plot.tons_per_acre1,
            tons_per_acre2 = ?plot.tons_per_acre2,
            "aggregated plot"
        );
        let kind = if plot.stem_count2 == 0 {
            Some(WarningKind::PlotNotRemeasured)
        } else if plot.stem_count_mismatch {
            warn!(
                team = %plot.team,
                year = plot.year,
                measured = plot.stem_count1,
                remeasured = plot.stem_count2,
                "stem counts differ between time points"
            );
            Some(WarningKind::StemCountMismatch)
        } else {
            None
        };
        if let Some(kind) = kind {
            report.warnings.push(SeriesWarning {
                team: plot.team.clone(),
                year: plot.year,
                row_index: None,
                kind,
            });
        }
    }

    info!(
        rows = rows.len(),
        stems = stems.len(),
        plots = report.aggregates.len(),
        issues = report.issues.len(),
        "plot pipeline finished"
    );
    Ok(report)
}
