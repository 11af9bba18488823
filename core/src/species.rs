//! Species groups and their Jenkins et al. (2003) regression coefficients.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CarbonError;

/// The eight species groups with published national-scale biomass equations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, uniffi::Enum,
)]
pub enum SpeciesGroup {
    #[serde(rename = "Aspen")]
    Aspen,
    #[serde(rename = "Cedar/larch")]
    CedarLarch,
    #[serde(rename = "Maple-oak-hickory-beech")]
    MapleOakHickoryBeech,
    #[serde(rename = "Mixed-hardwood")]
    MixedHardwood,
    #[serde(rename = "Pine")]
    Pine,
    #[serde(rename = "Soft-maple-birch")]
    SoftMapleBirch,
    #[serde(rename = "Spruce")]
    Spruce,
    #[serde(rename = "True-fir-hemlock")]
    TrueFirHemlock,
}

/// Regression coefficients for `ln(biomass_kg) = b1 + b2 * ln(dbh_cm)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct AllometricCoefficients {
    pub b1: f64,
    pub b2: f64,
}

impl SpeciesGroup {
    pub const COUNT: usize = 8;

    pub const ALL: [SpeciesGroup; Self::COUNT] = [
        SpeciesGroup::Aspen,
        SpeciesGroup::CedarLarch,
        SpeciesGroup::MapleOakHickoryBeech,
        SpeciesGroup::MixedHardwood,
        SpeciesGroup::Pine,
        SpeciesGroup::SoftMapleBirch,
        SpeciesGroup::Spruce,
        SpeciesGroup::TrueFirHemlock,
    ];

    /// Canonical label as it appears in measurement sheets.
    pub fn label(&self) -> &'static str {
        match self {
            SpeciesGroup::Aspen => "Aspen",
            SpeciesGroup::CedarLarch => "Cedar/larch",
            SpeciesGroup::MapleOakHickoryBeech => "Maple-oak-hickory-beech",
            SpeciesGroup::MixedHardwood => "Mixed-hardwood",
            SpeciesGroup::Pine => "Pine",
            SpeciesGroup::SoftMapleBirch => "Soft-maple-birch",
            SpeciesGroup::Spruce => "Spruce",
            SpeciesGroup::TrueFirHemlock => "True-fir-hemlock",
        }
    }

    /// Parse a sheet label. Surrounding whitespace is ignored; anything else
    /// must match a canonical label exactly.
    pub fn from_label(label: &str) -> Result<Self, CarbonError> {
        let trimmed = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|group| group.label() == trimmed)
            .ok_or_else(|| CarbonError::UnknownSpecies {
                label: label.to_string(),
            })
    }

    pub fn coefficients(&self) -> AllometricCoefficients {
        let (b1, b2) = match self {
            SpeciesGroup::Aspen => (-2.2094, 2.3867),
            SpeciesGroup::CedarLarch => (-2.0336, 2.2592),
            SpeciesGroup::MapleOakHickoryBeech => (-2.0127, 2.4342),
            SpeciesGroup::MixedHardwood => (-2.4800, 2.4835),
            SpeciesGroup::Pine => (-2.5356, 2.4349),
            SpeciesGroup::SoftMapleBirch => (-1.9123, 2.3651),
            SpeciesGroup::Spruce => (-2.0773, 2.3323),
            SpeciesGroup::TrueFirHemlock => (-2.5384, 2.4814),
        };
        AllometricCoefficients { b1, b2 }
    }
}

impl fmt::Display for SpeciesGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SpeciesGroup {
    type Err = CarbonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}
