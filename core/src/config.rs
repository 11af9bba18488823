//! Run configuration: conversion factors, team exclusions, ranking cap and
//! the row failure policy.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CARBON_FRACTION, CM_PER_INCH, CO2_PER_CARBON, DEFAULT_ROW_CAP, LB_PER_KG, LB_PER_TON,
    PLOT_EXPANSION_FACTOR,
};
use crate::error::CarbonError;

/// Unit conversion and scaling factors used by every computation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct ConversionFactors {
    /// Carbon mass per unit of dry biomass.
    ///
    /// Default: 0.5
    pub carbon_fraction: f64,

    /// CO2 mass per unit of carbon mass.
    ///
    /// Default: 3.667
    pub co2_per_carbon: f64,

    /// Default: 2.54
    pub cm_per_inch: f64,

    /// Default: 2.20462
    pub lb_per_kg: f64,

    /// Multiplier from a plot sum to a per-acre value.
    ///
    /// Default: 10 (1/10-acre plots)
    pub plot_expansion_factor: f64,

    /// Default: 2000
    pub lb_per_ton: f64,
}

impl Default for ConversionFactors {
    fn default() -> Self {
        Self {
            carbon_fraction: CARBON_FRACTION,
            co2_per_carbon: CO2_PER_CARBON,
            cm_per_inch: CM_PER_INCH,
            lb_per_kg: LB_PER_KG,
            plot_expansion_factor: PLOT_EXPANSION_FACTOR,
            lb_per_ton: LB_PER_TON,
        }
    }
}

impl ConversionFactors {
    /// Reject factors that would make any derived value non-finite or signless.
    pub fn validate(&self) -> Result<(), CarbonError> {
        let named = [
            ("carbon_fraction", self.carbon_fraction),
            ("co2_per_carbon", self.co2_per_carbon),
            ("cm_per_inch", self.cm_per_inch),
            ("lb_per_kg", self.lb_per_kg),
            ("plot_expansion_factor", self.plot_expansion_factor),
            ("lb_per_ton", self.lb_per_ton),
        ];
        for (name, value) in named {
            if !value.is_finite() || value <= 0.0 {
                return Err(CarbonError::InvalidConfig(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// What to do when a single input row cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorPolicy {
    /// Record the failure as a row issue and keep going.
    #[default]
    SkipAndReport,
    /// Fail the whole batch on the first bad row.
    Abort,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct PipelineConfig {
    pub factors: ConversionFactors,
    /// Teams withdrawn from ranked output and paired charts.
    pub excluded_teams: Vec<String>,
    /// Maximum ranked rows.
    pub row_cap: u32,
    pub row_error_policy: RowErrorPolicy,
    /// Whether plots with fewer remeasured stems than original stems may be ranked.
    pub rank_partial_remeasurements: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            factors: ConversionFactors::default(),
            excluded_teams: Vec::new(),
            row_cap: DEFAULT_ROW_CAP,
            row_error_policy: RowErrorPolicy::default(),
            rank_partial_remeasurements: true,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, CarbonError> {
        let config: PipelineConfig =
            serde_json::from_str(json).map_err(|e| CarbonError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CarbonError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            CarbonError::ConfigParse(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), CarbonError> {
        self.factors.validate()?;
        if self.row_cap == 0 {
            return Err(CarbonError::InvalidConfig(
                "row_cap must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Excluded team names as a set. Names are compared after trimming.
    pub fn excluded_team_set(&self) -> BTreeSet<String> {
        self.excluded_teams
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn is_excluded(&self, team: &str) -> bool {
        let team = team.trim();
        self.excluded_teams.iter().any(|t| t.trim() == team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_factors_match_constants() {
        let factors = ConversionFactors::default();
        assert_eq!(factors.carbon_fraction, 0.5);
        assert_eq!(factors.co2_per_carbon, 3.667);
        assert_eq!(factors.cm_per_inch, 2.54);
        assert_eq!(factors.lb_per_kg, 2.20462);
        assert_eq!(factors.plot_expansion_factor, 10.0);
        assert_eq!(factors.lb_per_ton, 2000.0);
        assert!(factors.validate().is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.row_cap, 40);
        assert!(config.excluded_teams.is_empty());
        assert_eq!(config.row_error_policy, RowErrorPolicy::SkipAndReport);
        assert!(config.rank_partial_remeasurements);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial_overrides() {
        let json = r#"{
            "factors": { "plot_expansion_factor": 20.0 },
            "excluded_teams": ["Team Withdrawn", "Late Entry"],
            "row_cap": 10,
            "row_error_policy": "abort"
        }"#;
        let config = PipelineConfig::from_json_str(json).unwrap();
        assert_eq!(config.factors.plot_expansion_factor, 20.0);
        assert_eq!(config.factors.carbon_fraction, 0.5);
        assert_eq!(config.row_cap, 10);
        assert_eq!(config.row_error_policy, RowErrorPolicy::Abort);
        assert!(config.is_excluded("Late Entry"));
        assert!(config.is_excluded("  Team Withdrawn "));
        assert!(!config.is_excluded("Team"));
        assert_eq!(config.excluded_team_set().len(), 2);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        let err = PipelineConfig::from_json_str(r#"{"row_cap": 0}"#).unwrap_err();
        assert!(matches!(err, CarbonError::InvalidConfig(_)));

        let err =
            PipelineConfig::from_json_str(r#"{"factors": {"carbon_fraction": -0.5}}"#).unwrap_err();
        assert!(matches!(err, CarbonError::InvalidConfig(_)));

        let err = PipelineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, CarbonError::ConfigParse(_)));
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = PipelineConfig::from_json_file("/path/that/does/not/exist.json").unwrap_err();
        assert!(matches!(err, CarbonError::ConfigParse(_)));
    }
}
