//! Named financial model presets.

use std::fmt;
use std::str::FromStr;

use super::error::AccrueError;
use super::parameters::ParameterSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Preset {
    Conservative,
    #[default]
    Moderate,
    Optimistic,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Conservative, Preset::Moderate, Preset::Optimistic];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Conservative => "Conservative",
            Preset::Moderate => "Moderate",
            Preset::Optimistic => "Optimistic",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Conservative => "Lower margins, higher costs & taxes",
            Preset::Moderate => "Balanced assumptions (default)",
            Preset::Optimistic => "Higher margins, lower costs & taxes",
        }
    }

    /// Parameter set for this preset. Only the model rates differ between
    /// presets; growth, premium and spot conversion keep their defaults.
    pub fn parameters(&self) -> ParameterSet {
        let base = ParameterSet::default();
        match self {
            Preset::Conservative => ParameterSet {
                margin_per_unit: 0.60,
                operating_expense_ratio: 0.50,
                brokerage_rate: 0.0025,
                storage_cost_ratio: 0.0015,
                insurance_cost_ratio: 0.00075,
                effective_tax_rate: 0.30,
                ..base
            },
            Preset::Moderate => base,
            Preset::Optimistic => ParameterSet {
                margin_per_unit: 1.20,
                operating_expense_ratio: 0.20,
                brokerage_rate: 0.001,
                storage_cost_ratio: 0.00075,
                insurance_cost_ratio: 0.00025,
                effective_tax_rate: 0.1667,
                ..base
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name().to_lowercase())
    }
}

impl FromStr for Preset {
    type Err = AccrueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(Preset::Conservative),
            "moderate" => Ok(Preset::Moderate),
            "optimistic" => Ok(Preset::Optimistic),
            _ => Err(AccrueError::UnknownPreset {
                name: s.to_string(),
            }),
        }
    }
}
