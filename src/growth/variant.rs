use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::coefficients::{SiteCurve, SpeciesCoefficients, NWO, SMC, SWO};
use crate::error::ForestError;
use crate::models::{SiteQuality, Species, Stand};

/// Growth model variant: selects the coefficient table and the variant-wide
/// constants the growth equations are fitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelVariant {
    /// Northwest Oregon.
    #[serde(rename = "NWO", alias = "nwo")]
    Nwo,
    /// Stand management cooperative (intensively managed plantations).
    #[serde(rename = "SMC", alias = "smc")]
    Smc,
    /// Southwest Oregon.
    #[serde(rename = "SWO", alias = "swo")]
    Swo,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 3] = [ModelVariant::Nwo, ModelVariant::Smc, ModelVariant::Swo];

    fn table(self) -> &'static [(Species, SpeciesCoefficients)] {
        match self {
            ModelVariant::Nwo => NWO,
            ModelVariant::Smc => SMC,
            ModelVariant::Swo => SWO,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ModelVariant::Nwo => "NWO",
            ModelVariant::Smc => "SMC",
            ModelVariant::Swo => "SWO",
        }
    }

    /// Years covered by one growth period.
    pub fn period_length_years(self) -> f64 {
        5.0
    }

    /// Growth-effective age past which primary-species height growth is
    /// extrapolated beyond the fitting data.
    pub fn old_tree_age(self) -> f64 {
        match self {
            ModelVariant::Nwo | ModelVariant::Smc => 120.0,
            ModelVariant::Swo => 500.0,
        }
    }

    pub fn supports(self, species: Species) -> bool {
        self.table().iter().any(|(s, _)| *s == species)
    }

    pub fn supported_species(self) -> Vec<Species> {
        self.table().iter().map(|(s, _)| *s).collect()
    }

    pub fn coefficients(self, species: Species) -> Result<&'static SpeciesCoefficients, ForestError> {
        self.table()
            .iter()
            .find(|(s, _)| *s == species)
            .map(|(_, c)| c)
            .ok_or_else(|| {
                ForestError::StructuralInput(format!(
                    "{species} is not supported by the {self} variant"
                ))
            })
    }

    /// Species grown on the potential-height-growth path.
    pub fn is_primary(self, species: Species) -> bool {
        self.coefficients(species)
            .map(|c| c.height_growth.is_some())
            .unwrap_or(false)
    }

    /// Genetic gain and Swiss needle cast only modify Douglas-fir in the
    /// northern variants.
    pub fn has_douglas_fir_modifiers(self, species: Species) -> bool {
        species == Species::DouglasFir && matches!(self, ModelVariant::Nwo | ModelVariant::Smc)
    }

    pub fn site_index(self, coefficients: &SpeciesCoefficients, site: &SiteQuality) -> f64 {
        match coefficients.site_curve {
            SiteCurve::Primary => site.primary_site_index,
            SiteCurve::Secondary => site.secondary_site_index,
        }
    }

    /// Structural checks on a stand before it is grown under this variant.
    pub fn validate_stand(self, stand: &Stand) -> Result<(), ForestError> {
        stand.validate()?;
        for cohort in stand.cohorts() {
            self.coefficients(cohort.species())?;
        }
        Ok(())
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ModelVariant {
    type Err = ForestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NWO" => Ok(ModelVariant::Nwo),
            "SMC" => Ok(ModelVariant::Smc),
            "SWO" => Ok(ModelVariant::Swo),
            other => Err(ForestError::ParseError(format!(
                "unknown model variant '{other}', expected NWO, SMC or SWO"
            ))),
        }
    }
}
