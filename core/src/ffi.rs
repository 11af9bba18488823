//! Functions exported to foreign hosts through uniffi.

use crate::allometry::biomass_lb;
use crate::config::{ConversionFactors, PipelineConfig};
use crate::error::CarbonError;
use crate::metrics::BiomassResult;
use crate::models::{
    Measurement, PlotAggregate, PlotReport, StemRow, TimePoint, TreeRecord, TreeReport, TreeRow,
};
use crate::ranking::{Column, ColumnSpec, ProjectedTable, RankingProjector};
use crate::series::SeriesPoint;
use crate::species::{AllometricCoefficients, SpeciesGroup};
use crate::{plots, series, sheet, trees};

/// Canonical species labels accepted in measurement sheets.
#[uniffi::export]
pub fn supported_species() -> Vec<String> {
    SpeciesGroup::ALL
        .iter()
        .map(|g| g.label().to_string())
        .collect()
}

#[uniffi::export]
pub fn species_coefficients(label: String) -> Result<AllometricCoefficients, CarbonError> {
    Ok(SpeciesGroup::from_label(&label)?.coefficients())
}

/// Biomass, carbon and CO2e for a single diameter reading.
#[uniffi::export]
pub fn compute_biomass(
    label: String,
    diameter_in: f64,
    time_point: TimePoint,
    factors: ConversionFactors,
) -> Result<BiomassResult, CarbonError> {
    factors.validate()?;
    let species = SpeciesGroup::from_label(&label)?;
    BiomassResult::compute(
        Measurement {
            species,
            diameter_in,
            time_point,
        },
        &factors,
    )
}

/// Biomass in pounds only.
#[uniffi::export]
pub fn compute_biomass_lb(
    label: String,
    diameter_in: f64,
    factors: ConversionFactors,
) -> Result<f64, CarbonError> {
    factors.validate()?;
    biomass_lb(SpeciesGroup::from_label(&label)?, diameter_in, &factors)
}

#[uniffi::export]
pub fn default_config() -> PipelineConfig {
    PipelineConfig::default()
}

#[uniffi::export]
pub fn config_from_json(json: String) -> Result<PipelineConfig, CarbonError> {
    PipelineConfig::from_json_str(&json)
}

#[uniffi::export]
pub fn tree_report(rows: Vec<TreeRow>, config: PipelineConfig) -> Result<TreeReport, CarbonError> {
    trees::compute_tree_report(&rows, &config)
}

#[uniffi::export]
pub fn plot_report(rows: Vec<StemRow>, config: PipelineConfig) -> Result<PlotReport, CarbonError> {
    plots::compute_plot_report(&rows, &config)
}

#[uniffi::export]
pub fn parse_tree_sheet(text: String) -> Result<Vec<TreeRow>, CarbonError> {
    sheet::parse_tree_sheet(&text)
}

#[uniffi::export]
pub fn parse_stem_sheet(text: String) -> Result<Vec<StemRow>, CarbonError> {
    sheet::parse_stem_sheet(&text)
}

/// Trees ranked by carbon sequestered, capped at `config.row_cap`.
#[uniffi::export]
pub fn rank_trees(
    records: Vec<TreeRecord>,
    config: PipelineConfig,
) -> Result<ProjectedTable, CarbonError> {
    RankingProjector::tree_ranking(&config).rank(&records)
}

/// Plots ranked by tons per acre sequestered, capped at `config.row_cap`.
#[uniffi::export]
pub fn rank_plots(
    records: Vec<PlotAggregate>,
    config: PipelineConfig,
) -> Result<ProjectedTable, CarbonError> {
    RankingProjector::plot_ranking(&config).rank(&records)
}

/// Time-1 values for every tree in input order.
#[uniffi::export]
pub fn tree_listing(
    records: Vec<TreeRecord>,
    config: PipelineConfig,
) -> Result<ProjectedTable, CarbonError> {
    RankingProjector::tree_listing(&config).listing(&records)
}

/// Time-1 values for every plot in input order.
#[uniffi::export]
pub fn plot_listing(
    records: Vec<PlotAggregate>,
    config: PipelineConfig,
) -> Result<ProjectedTable, CarbonError> {
    RankingProjector::plot_listing(&config).listing(&records)
}

/// Ranking over caller-chosen columns and sort key.
#[uniffi::export]
pub fn rank_trees_by(
    records: Vec<TreeRecord>,
    columns: Vec<ColumnSpec>,
    sort_key: Column,
    descending: bool,
    config: PipelineConfig,
) -> Result<ProjectedTable, CarbonError> {
    RankingProjector::new(columns, sort_key, descending, &config).rank(&records)
}

#[uniffi::export]
pub fn rank_plots_by(
    records: Vec<PlotAggregate>,
    columns: Vec<ColumnSpec>,
    sort_key: Column,
    descending: bool,
    config: PipelineConfig,
) -> Result<ProjectedTable, CarbonError> {
    RankingProjector::new(columns, sort_key, descending, &config).rank(&records)
}

#[uniffi::export]
pub fn tree_series(
    records: Vec<TreeRecord>,
    config: PipelineConfig,
) -> Result<Vec<SeriesPoint>, CarbonError> {
    series::tree_carbon_series(&records, &config)
}

#[uniffi::export]
pub fn plot_series(
    records: Vec<PlotAggregate>,
    config: PipelineConfig,
) -> Result<Vec<SeriesPoint>, CarbonError> {
    series::plot_tons_series(&records, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::Cell;

    #[test]
    fn test_supported_species() {
        let labels = supported_species();
        assert_eq!(labels.len(), 8);
        assert_eq!(labels[0], "Aspen");
        assert!(labels.contains(&"True-fir-hemlock".to_string()));
    }

    #[test]
    fn test_species_coefficients() {
        let c = species_coefficients("Maple-oak-hickory-beech".to_string()).unwrap();
        assert_eq!((c.b1, c.b2), (-2.0127, 2.4342));
        assert!(species_coefficients("Oak".to_string()).is_err());
    }

    #[test]
    fn test_compute_biomass_validates_factors() {
        let factors = ConversionFactors {
            lb_per_kg: 0.0,
            ..ConversionFactors::default()
        };
        let err = compute_biomass_lb("Pine".to_string(), 10.0, factors).unwrap_err();
        assert!(matches!(err, CarbonError::InvalidConfig(_)));

        let result = compute_biomass(
            "Pine".to_string(),
            10.0,
            TimePoint::After,
            ConversionFactors::default(),
        )
        .unwrap();
        assert_eq!(result.measurement.time_point, TimePoint::After);
        assert_eq!(result.carbon_lb, result.aboveground_biomass_lb * 0.5);
    }

    #[test]
    fn test_sheet_to_report() {
        let text = "Team,Species,Year,Diameter 1,Diameter 2\nA,Pine,2024,8,8.5\nB,Elm,2024,8,9\n";
        let rows = parse_tree_sheet(text.to_string()).unwrap();
        let report = tree_report(rows, default_config()).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].team, "B");
    }

    const TREE_SHEET: &str = "\
Team,Species,Year,Diameter 1,Diameter 2
Small Gain,Pine,2024,6,6.2
Big Gain,Pine,2024,6,7.5
No Remeasure,Spruce,2024,9,
Withdrawn,Aspen,2024,4,12
";

    #[test]
    fn test_rank_trees_through_ffi() {
        let rows = parse_tree_sheet(TREE_SHEET.to_string()).unwrap();
        let config = PipelineConfig {
            excluded_teams: vec!["Withdrawn".to_string()],
            ..default_config()
        };
        let report = tree_report(rows, config.clone()).unwrap();
        assert_eq!(report.records.len(), 4);

        let table = rank_trees(report.records.clone(), config.clone()).unwrap();
        assert_eq!(table.teams(), vec!["Big Gain", "Small Gain"]);
        assert_eq!(table.headers[0], "Team");

        let listing = tree_listing(report.records.clone(), config.clone()).unwrap();
        assert_eq!(listing.rows.len(), 4);

        let points = tree_series(report.records, config).unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].team, "Small Gain");
        assert_eq!(points[1].time_point, TimePoint::After);
    }

    #[test]
    fn test_rank_trees_by_custom_columns() {
        let rows = parse_tree_sheet(TREE_SHEET.to_string()).unwrap();
        let report = tree_report(rows, default_config()).unwrap();
        let config = PipelineConfig {
            row_cap: 2,
            ..default_config()
        };
        let table = rank_trees_by(
            report.records,
            vec![ColumnSpec::from(Column::Team), ColumnSpec::from(Column::Carbon1)],
            Column::Carbon1,
            true,
            config,
        )
        .unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.teams()[0], "No Remeasure");
        assert!(matches!(table.get(0, Column::Carbon1), Some(Cell::Number(_))));
    }

    #[test]
    fn test_plot_ranking_and_series_through_ffi() {
        let text = "\
Team,Year,Stem,Species,Diameter 1,Diameter 2
Birch Hill,2024,1,Soft-maple-birch,6.0,6.4
Birch Hill,2024,2,Aspen,4.0,4.3
Fern Gully,2024,1,Pine,9.0,
";
        let rows = parse_stem_sheet(text.to_string()).unwrap();
        let report = plot_report(rows, default_config()).unwrap();

        let table = rank_plots(report.aggregates.clone(), default_config()).unwrap();
        assert_eq!(table.teams(), vec!["Birch Hill"]);

        let listing = plot_listing(report.aggregates.clone(), default_config()).unwrap();
        assert_eq!(listing.teams(), vec!["Birch Hill", "Fern Gully"]);

        let points = plot_series(report.aggregates, default_config()).unwrap();
        assert_eq!(points.len(), 2);
        assert!(points[1].value > points[0].value);
    }
}
