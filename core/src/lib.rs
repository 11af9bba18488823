//! Aboveground biomass and carbon storage for trees and woodland plots.
//!
//! ```
//! use treecarbon_compute::{biomass_lb, ConversionFactors, SpeciesGroup};
//!
//! let factors = ConversionFactors::default();
//! let lb = biomass_lb(SpeciesGroup::Pine, 12.0, &factors).expect("valid diameter");
//! assert!(lb > 0.0);
//! ```

pub mod allometry;
pub mod config;
pub mod constants;
pub mod error;
pub mod ffi;
pub mod metrics;
pub mod models;
pub mod plots;
pub mod ranking;
pub mod series;
pub mod sheet;
pub mod species;
pub mod trees;

uniffi::setup_scaffolding!();

pub use allometry::{biomass_lb, biomass_lb_for_label};
pub use config::{ConversionFactors, PipelineConfig, RowErrorPolicy};
pub use error::CarbonError;
pub use metrics::{derive_carbon, derive_co2e, BiomassResult};
pub use models::{
    IssueKind, Measurement, PlotAggregate, PlotReport, RowIssue, SeriesWarning, StemRow,
    TimePoint, TreeRecord, TreeReport, TreeRow, WarningKind,
};
pub use plots::{aggregate_plots, compute_plot_report, StemCarbon};
pub use ranking::{Cell, Column, ColumnSpec, ProjectedTable, Projectable, RankingProjector};
pub use series::{paired_series, plot_tons_series, tree_carbon_series, SeriesPoint};
pub use species::{AllometricCoefficients, SpeciesGroup};
pub use trees::compute_tree_report;
