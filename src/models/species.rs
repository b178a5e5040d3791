use serde::{Deserialize, Serialize};

/// Tree species recognised by the growth models.
///
/// Declaration order is the species ordinal used to order cohorts within a
/// stand and to break diameter ties during harvest selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    #[serde(rename = "DF")]
    DouglasFir,
    #[serde(rename = "GF")]
    GrandFir,
    #[serde(rename = "WF")]
    WhiteFir,
    #[serde(rename = "PP")]
    PonderosaPine,
    #[serde(rename = "SP")]
    SugarPine,
    #[serde(rename = "IC")]
    IncenseCedar,
    #[serde(rename = "WH")]
    WesternHemlock,
    #[serde(rename = "RC")]
    WesternRedcedar,
    #[serde(rename = "PM")]
    PacificMadrone,
    #[serde(rename = "BM")]
    BigleafMaple,
    #[serde(rename = "RA")]
    RedAlder,
}

impl Species {
    pub const ALL: [Species; 11] = [
        Species::DouglasFir,
        Species::GrandFir,
        Species::WhiteFir,
        Species::PonderosaPine,
        Species::SugarPine,
        Species::IncenseCedar,
        Species::WesternHemlock,
        Species::WesternRedcedar,
        Species::PacificMadrone,
        Species::BigleafMaple,
        Species::RedAlder,
    ];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Two-letter species code (e.g., "DF").
    pub fn code(self) -> &'static str {
        match self {
            Species::DouglasFir => "DF",
            Species::GrandFir => "GF",
            Species::WhiteFir => "WF",
            Species::PonderosaPine => "PP",
            Species::SugarPine => "SP",
            Species::IncenseCedar => "IC",
            Species::WesternHemlock => "WH",
            Species::WesternRedcedar => "RC",
            Species::PacificMadrone => "PM",
            Species::BigleafMaple => "BM",
            Species::RedAlder => "RA",
        }
    }

    /// FIA numeric species code.
    pub fn fia_code(self) -> u16 {
        match self {
            Species::DouglasFir => 202,
            Species::GrandFir => 17,
            Species::WhiteFir => 15,
            Species::PonderosaPine => 122,
            Species::SugarPine => 117,
            Species::IncenseCedar => 81,
            Species::WesternHemlock => 263,
            Species::WesternRedcedar => 242,
            Species::PacificMadrone => 361,
            Species::BigleafMaple => 312,
            Species::RedAlder => 351,
        }
    }

    pub fn common_name(self) -> &'static str {
        match self {
            Species::DouglasFir => "Douglas-fir",
            Species::GrandFir => "Grand Fir",
            Species::WhiteFir => "White Fir",
            Species::PonderosaPine => "Ponderosa Pine",
            Species::SugarPine => "Sugar Pine",
            Species::IncenseCedar => "Incense Cedar",
            Species::WesternHemlock => "Western Hemlock",
            Species::WesternRedcedar => "Western Redcedar",
            Species::PacificMadrone => "Pacific Madrone",
            Species::BigleafMaple => "Bigleaf Maple",
            Species::RedAlder => "Red Alder",
        }
    }

    pub fn is_hardwood(self) -> bool {
        matches!(
            self,
            Species::PacificMadrone | Species::BigleafMaple | Species::RedAlder
        )
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.common_name(), self.code())
    }
}

impl std::str::FromStr for Species {
    type Err = crate::error::ForestError;

    /// Accepts the two-letter code or the FIA number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(fia) = trimmed.parse::<u16>() {
            return Species::ALL
                .into_iter()
                .find(|sp| sp.fia_code() == fia)
                .ok_or_else(|| {
                    crate::error::ForestError::ParseError(format!("Unknown FIA code: '{s}'"))
                });
        }
        let upper = trimmed.to_uppercase();
        Species::ALL
            .into_iter()
            .find(|sp| sp.code() == upper)
            .ok_or_else(|| crate::error::ForestError::ParseError(format!("Unknown species: '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_display() {
        assert_eq!(Species::DouglasFir.to_string(), "Douglas-fir (DF)");
        assert_eq!(Species::RedAlder.to_string(), "Red Alder (RA)");
    }

    #[test]
    fn test_ordinal_follows_declaration_order() {
        for (i, sp) in Species::ALL.iter().enumerate() {
            assert_eq!(sp.ordinal(), i);
        }
        assert!(Species::DouglasFir < Species::WesternHemlock);
    }

    #[test]
    fn test_parse_codes_case_insensitive() {
        assert_eq!("df".parse::<Species>().unwrap(), Species::DouglasFir);
        assert_eq!("WH".parse::<Species>().unwrap(), Species::WesternHemlock);
        assert_eq!(" rc ".parse::<Species>().unwrap(), Species::WesternRedcedar);
    }

    #[test]
    fn test_parse_fia_codes() {
        assert_eq!("202".parse::<Species>().unwrap(), Species::DouglasFir);
        assert_eq!("351".parse::<Species>().unwrap(), Species::RedAlder);
    }

    #[test]
    fn test_parse_invalid() {
        assert!("XX".parse::<Species>().is_err());
        assert!("999".parse::<Species>().is_err());
        assert!("".parse::<Species>().is_err());
    }

    #[test]
    fn test_hardwood_flag() {
        assert!(Species::RedAlder.is_hardwood());
        assert!(!Species::DouglasFir.is_hardwood());
    }

    #[test]
    fn test_species_json_uses_code() {
        let json = serde_json::to_string(&Species::GrandFir).unwrap();
        assert_eq!(json, "\"GF\"");
        let parsed: Species = serde_json::from_str("\"PP\"").unwrap();
        assert_eq!(parsed, Species::PonderosaPine);
    }
}
