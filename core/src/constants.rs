//! Default conversion constants.
//!
//! These are the published defaults; every pipeline reads the values through
//! [`ConversionFactors`](crate::config::ConversionFactors) so they can be
//! overridden per run.

// ============================================================================
// Mass and Length Conversions
// ============================================================================

/// Centimetres per inch. The Jenkins regressions are fit on DBH in cm.
pub const CM_PER_INCH: f64 = 2.54;

/// Pounds per kilogram. The regressions return kilograms of dry biomass.
pub const LB_PER_KG: f64 = 2.20462;

/// Pounds per short ton.
pub const LB_PER_TON: f64 = 2000.0;

// ============================================================================
// Carbon Accounting
// ============================================================================

/// Fraction of dry aboveground biomass that is carbon.
pub const CARBON_FRACTION: f64 = 0.5;

/// Molar mass ratio of CO2 to C (44.01 / 12.01).
pub const CO2_PER_CARBON: f64 = 3.667;

// ============================================================================
// Plot Sampling
// ============================================================================

/// Woodland plots are 1/10-acre subsamples.
pub const PLOT_EXPANSION_FACTOR: f64 = 10.0;

// ============================================================================
// Presentation
// ============================================================================

/// Maximum number of ranked rows handed to the presentation sink.
pub const DEFAULT_ROW_CAP: u32 = 40;
