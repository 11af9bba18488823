//! Single-tree pipeline: one sheet row in, one [`TreeRecord`] out.

use tracing::{debug, info, warn};

use crate::allometry::validate_diameter;
use crate::config::{ConversionFactors, PipelineConfig, RowErrorPolicy};
use crate::error::CarbonError;
use crate::metrics::{round_to, BiomassResult};
use crate::models::{
    row_position, Measurement, RowIssue, SeriesWarning, TimePoint, TreeRecord, TreeReport, TreeRow,
    WarningKind,
};
use crate::species::SpeciesGroup;

impl TreeRecord {
    /// Compute a record from one row. Time-2 fields stay `None` when the
    /// row carries no second diameter.
    pub fn compute(
        row_index: u32,
        row: &TreeRow,
        factors: &ConversionFactors,
    ) -> Result<Self, CarbonError> {
        let species = SpeciesGroup::from_label(&row.species)?;
        let diameter1_in = validate_diameter("diameter 1", row.diameter1_in)?;
        let diameter2_in = match row.diameter2_in {
            Some(d) => Some(validate_diameter("diameter 2", Some(d))?),
            None => None,
        };

        let before = BiomassResult::compute(
            Measurement {
                species,
                diameter_in: diameter1_in,
                time_point: TimePoint::Before,
            },
            factors,
        )?;
        let after = diameter2_in
            .map(|d| {
                BiomassResult::compute(
                    Measurement {
                        species,
                        diameter_in: d,
                        time_point: TimePoint::After,
                    },
                    factors,
                )
            })
            .transpose()?;

        // Sequestration is taken from the displayed values so the table adds up.
        let carbon1_lb = round_to(before.carbon_lb, 0);
        let co2e1_lb = round_to(before.co2e_lb, 0);
        let carbon2_lb = after.as_ref().map(|a| round_to(a.carbon_lb, 0));
        let co2e2_lb = after.as_ref().map(|a| round_to(a.co2e_lb, 0));

        Ok(TreeRecord {
            row_index,
            team: row.team.trim().to_string(),
            year: row.year,
            species,
            diameter1_in: round_to(diameter1_in, 1),
            diameter2_in: diameter2_in.map(|d| round_to(d, 1)),
            carbon1_lb,
            carbon2_lb,
            carbon_sequestered_lb: carbon2_lb.map(|c| c - carbon1_lb),
            co2e1_lb,
            co2e2_lb,
            co2e_sequestered_lb: co2e2_lb.map(|c| c - co2e1_lb),
        })
    }
}

/// Run the single-tree pipeline over every row.
///
/// Row failures are handled per `config.row_error_policy`.
pub fn compute_tree_report(
    rows: &[TreeRow],
    config: &PipelineConfig,
) -> Result<TreeReport, CarbonError> {
    config.validate()?;
    let mut report = TreeReport::default();

    for (i, row) in rows.iter().enumerate() {
        let row_index = row_position(i)?;
        match TreeRecord::compute(row_index, row, &config.factors) {
            Ok(record) => {
                debug!(
                    row = row_index,
                    team = %record.team,
                    species = %record.species,
                    carbon1_lb = record.carbon1_lb,
                    carbon2_lb = ?record.carbon2_lb,
                    "computed tree record"
                );
                if !record.has_both_time_points() {
                    report.warnings.push(SeriesWarning {
                        team: record.team.clone(),
                        year: record.year,
                        row_index: Some(row_index),
                        kind: WarningKind::MissingTimeTwo,
                    });
                }
                report.records.push(record);
            }
            Err(err) => match config.row_error_policy {
                RowErrorPolicy::SkipAndReport => {
                    warn!(row = row_index, team = %row.team, error = %err, "skipping tree row");
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

    info!(
        rows = rows.len(),
        records = report.records.len(),
        issues = report.issues.len(),
        incomplete = report.warnings.len(),
        "tree pipeline finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allometry::biomass_lb;
    use crate::models::IssueKind;

    fn tree_row(team: &str, species: &str, d1: Option<f64>, d2: Option<f64>) -> TreeRow {
        TreeRow {
            team: team.to_string(),
            species: species.to_string(),
            year: 2024,
            diameter1_in: d1,
            diameter2_in: d2,
        }
    }

    fn create_test_rows() -> Vec<TreeRow> {
        vec![
            tree_row("Oak Street", "Maple-oak-hickory-beech", Some(10.5), Some(11.04)),
            tree_row("Riverside", "Pine", Some(7.26), None),
            tree_row("Hill Crew", "Redwood", Some(9.0), Some(9.4)),
            tree_row("Lakeview", "Spruce", Some(0.0), Some(2.0)),
            tree_row("Creekside", "Soft-maple-birch", Some(4.0), Some(4.6)),
        ]
    }

    #[test]
    fn test_record_values() {
        let factors = ConversionFactors::default();
        let row = tree_row("Oak Street", "Maple-oak-hickory-beech", Some(10.5), Some(11.04));
        let record = TreeRecord::compute(0, &row, &factors).unwrap();

        let b1 = biomass_lb(SpeciesGroup::MapleOakHickoryBeech, 10.5, &factors).unwrap();
        let b2 = biomass_lb(SpeciesGroup::MapleOakHickoryBeech, 11.04, &factors).unwrap();

        assert_eq!(record.diameter1_in, 10.5);
        assert_eq!(record.diameter2_in, Some(11.0));
        assert_eq!(record.carbon1_lb, (b1 * 0.5).round());
        assert_eq!(record.carbon2_lb, Some((b2 * 0.5).round()));
        assert_eq!(
            record.carbon_sequestered_lb,
            Some((b2 * 0.5).round() - (b1 * 0.5).round())
        );
        assert_eq!(record.co2e1_lb, (b1 * 0.5 * 3.667).round());
        assert!(record.carbon_sequestered_lb.unwrap() > 0.0);
        assert!(record.co2e_sequestered_lb.unwrap() > 0.0);
    }

    #[test]
    fn test_missing_time_two_leaves_sequestration_empty() {
        let factors = ConversionFactors::default();
        let row = tree_row("Riverside", "Pine", Some(7.26), None);
        let record = TreeRecord::compute(1, &row, &factors).unwrap();

        assert_eq!(record.diameter1_in, 7.3);
        assert!(record.carbon1_lb > 0.0);
        assert_eq!(record.carbon2_lb, None);
        assert_eq!(record.carbon_sequestered_lb, None);
        assert_eq!(record.co2e_sequestered_lb, None);
        assert!(!record.has_both_time_points());
    }

    #[test]
    fn test_report_collects_issues_and_warnings() {
        let report = compute_tree_report(&create_test_rows(), &PipelineConfig::default()).unwrap();

        assert_eq!(report.records.len(), 3);
        assert_eq!(
            report.records.iter().map(|r| r.row_index).collect::<Vec<_>>(),
            vec![0, 1, 4]
        );

        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.issues[0].row_index, 2);
        assert_eq!(report.issues[0].kind, IssueKind::UnknownSpecies);
        assert_eq!(report.issues[1].row_index, 3);
        assert_eq!(report.issues[1].kind, IssueKind::InvalidMeasurement);

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].team, "Riverside");
        assert_eq!(report.warnings[0].kind, WarningKind::MissingTimeTwo);
    }

    #[test]
    fn test_abort_policy_fails_batch() {
        let config = PipelineConfig {
            row_error_policy: RowErrorPolicy::Abort,
            ..PipelineConfig::default()
        };
        let err = compute_tree_report(&create_test_rows(), &config).unwrap_err();
        match err {
            CarbonError::RowRejected {
                row_index, team, ..
            } => {
                assert_eq!(row_index, 2);
                assert_eq!(team, "Hill Crew");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let rows = create_test_rows();
        let config = PipelineConfig::default();
        let first = compute_tree_report(&rows, &config).unwrap();
        let second = compute_tree_report(&rows, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_time_one_is_rejected() {
        let factors = ConversionFactors::default();
        let row = tree_row("Riverside", "Pine", None, Some(8.0));
        assert_eq!(
            TreeRecord::compute(0, &row, &factors),
            Err(CarbonError::MissingDiameter {
                field: "diameter 1".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_config_is_rejected_up_front() {
        let config = PipelineConfig {
            row_cap: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            compute_tree_report(&create_test_rows(), &config),
            Err(CarbonError::InvalidConfig(_))
        ));
    }
}
