//! Aboveground biomass from diameter at breast height.
//!
//! Implements the Jenkins et al. (2003) national-scale power-law equations:
//!
//! ```text
//! biomass_kg = exp(b1 + b2 * ln(dbh_cm))
//! ```
//!
//! Diameters come in as inches and biomass goes out as pounds; both unit
//! conversions are read from [`ConversionFactors`].

use crate::config::ConversionFactors;
use crate::error::CarbonError;
use crate::species::SpeciesGroup;

/// Check that a diameter reading can be fed to the log-linear model.
///
/// `field` names the reading in error messages ("diameter 1", ...).
pub fn validate_diameter(field: &str, diameter_in: Option<f64>) -> Result<f64, CarbonError> {
    match diameter_in {
        None => Err(CarbonError::MissingDiameter {
            field: field.to_string(),
        }),
        Some(d) if !d.is_finite() || d <= 0.0 => Err(CarbonError::InvalidDiameter {
            field: field.to_string(),
            value: d,
        }),
        Some(d) => Ok(d),
    }
}

/// Aboveground biomass in pounds for one stem.
pub fn biomass_lb(
    species: SpeciesGroup,
    diameter_in: f64,
    factors: &ConversionFactors,
) -> Result<f64, CarbonError> {
    let diameter_in = validate_diameter("diameter", Some(diameter_in))?;
    let c = species.coefficients();
    let dbh_cm = diameter_in * factors.cm_per_inch;
    let biomass_kg = (c.b1 + c.b2 * dbh_cm.ln()).exp();
    Ok(biomass_kg * factors.lb_per_kg)
}

/// Same as [`biomass_lb`], resolving the species from its sheet label first.
pub fn biomass_lb_for_label(
    label: &str,
    diameter_in: f64,
    factors: &ConversionFactors,
) -> Result<f64, CarbonError> {
    let species = SpeciesGroup::from_label(label)?;
    biomass_lb(species, diameter_in, factors)
}
