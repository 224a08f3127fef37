use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum of the ratio sub-score.
pub const RATIO_SCORE_MAX: f64 = 40.0;
/// Maximum of the temperature sub-score.
pub const TEMP_SCORE_MAX: f64 = 30.0;
/// Maximum of the brew-time sub-score.
pub const TIME_SCORE_MAX: f64 = 30.0;
/// Upper bound of every flavor axis.
pub const FLAVOR_SCALE_MAX: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub i64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrewMethod {
    V60,
    Espresso,
    Aeropress,
    FrenchPress,
    ColdBrew,
}

impl BrewMethod {
    pub const ALL: [BrewMethod; 5] = [
        BrewMethod::V60,
        BrewMethod::Espresso,
        BrewMethod::Aeropress,
        BrewMethod::FrenchPress,
        BrewMethod::ColdBrew,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BrewMethod::V60 => "v60",
            BrewMethod::Espresso => "espresso",
            BrewMethod::Aeropress => "aeropress",
            BrewMethod::FrenchPress => "frenchpress",
            BrewMethod::ColdBrew => "coldbrew",
        }
    }

    /// Upper-case name shown in history lists and shared recipes.
    pub fn label(self) -> String {
        self.as_str().to_ascii_uppercase()
    }

    pub fn defaults(self) -> MethodDefaults {
        match self {
            BrewMethod::V60 => MethodDefaults {
                coffee_dose: 15.0,
                water_yield: 250.0,
                temperature: 93.0,
                brew_time: 180,
                grind_size: "medium-fine",
                roast_level: "light",
            },
            BrewMethod::Espresso => MethodDefaults {
                coffee_dose: 18.0,
                water_yield: 36.0,
                temperature: 92.0,
                brew_time: 30,
                grind_size: "fine",
                roast_level: "medium",
            },
            BrewMethod::Aeropress => MethodDefaults {
                coffee_dose: 15.0,
                water_yield: 200.0,
                temperature: 85.0,
                brew_time: 120,
                grind_size: "medium",
                roast_level: "light",
            },
            BrewMethod::FrenchPress => MethodDefaults {
                coffee_dose: 20.0,
                water_yield: 300.0,
                temperature: 94.0,
                brew_time: 270,
                grind_size: "coarse",
                roast_level: "medium",
            },
            BrewMethod::ColdBrew => MethodDefaults {
                coffee_dose: 50.0,
                water_yield: 500.0,
                temperature: 20.0,
                brew_time: 57_600,
                grind_size: "coarse",
                roast_level: "dark",
            },
        }
    }
}

impl Default for BrewMethod {
    fn default() -> Self {
        BrewMethod::V60
    }
}

impl fmt::Display for BrewMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrewMethod {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        BrewMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownMethod {
                raw: raw.to_string(),
            })
    }
}

/// Starting values a form is filled with when a method is selected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodDefaults {
    pub coffee_dose: f64,
    pub water_yield: f64,
    pub temperature: f64,
    pub brew_time: u32,
    pub grind_size: &'static str,
    pub roast_level: &'static str,
}
