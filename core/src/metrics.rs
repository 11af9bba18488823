//! Carbon and CO2-equivalent derived from biomass.
//!
//! Pure functions; every input is plain data and nothing is cached.

use serde::{Deserialize, Serialize};

use crate::allometry::biomass_lb;
use crate::config::ConversionFactors;
use crate::error::CarbonError;
use crate::models::Measurement;

/// Carbon mass held in `biomass_lb` of dry biomass.
pub fn derive_carbon(biomass_lb: f64, factors: &ConversionFactors) -> f64 {
    biomass_lb * factors.carbon_fraction
}

/// CO2 mass equivalent to `carbon_lb` of stored carbon.
pub fn derive_co2e(carbon_lb: f64, factors: &ConversionFactors) -> f64 {
    carbon_lb * factors.co2_per_carbon
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Biomass, carbon and CO2e computed for one measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct BiomassResult {
    pub measurement: Measurement,
    pub aboveground_biomass_lb: f64,
    pub carbon_lb: f64,
    pub co2e_lb: f64,
}

impl BiomassResult {
    pub fn compute(
        measurement: Measurement,
        factors: &ConversionFactors,
    ) -> Result<Self, CarbonError> {
        let aboveground_biomass_lb =
            biomass_lb(measurement.species, measurement.diameter_in, factors)?;
        let carbon_lb = derive_carbon(aboveground_biomass_lb, factors);
        let co2e_lb = derive_co2e(carbon_lb, factors);
        Ok(BiomassResult {
            measurement,
            aboveground_biomass_lb,
            carbon_lb,
            co2e_lb,
        })
    }
}
