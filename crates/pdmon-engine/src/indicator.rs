use pdmon_core::SeverityLevels;
use serde::{Deserialize, Serialize};

/// Freeze level at or above which the indicator reports a freeze.
pub const DEFAULT_FREEZE_THRESHOLD: u8 = 40;

/// Dominant symptom of one window, shown on two indicator lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomIndicator {
    Freeze,
    Tremor,
    Dyskinesia,
}

/// State of the two indicator lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndicatorLights {
    /// Lit for dyskinesia.
    pub light1: bool,
    /// Lit for tremor.
    pub light2: bool,
}

impl SymptomIndicator {
    /// Freeze wins over everything once it reaches `freeze_threshold`;
    /// otherwise tremor wins ties against dyskinesia.
    pub fn from_levels(levels: &SeverityLevels, freeze_threshold: u8) -> Self {
        if levels.freeze >= freeze_threshold {
            Self::Freeze
        } else if levels.tremor >= levels.dyskinesia {
            Self::Tremor
        } else {
            Self::Dyskinesia
        }
    }

    pub fn lights(&self) -> IndicatorLights {
        match self {
            Self::Freeze => IndicatorLights::default(),
            Self::Tremor => IndicatorLights {
                light1: false,
                light2: true,
            },
            Self::Dyskinesia => IndicatorLights {
                light1: true,
                light2: false,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Freeze => "freeze",
            Self::Tremor => "tremor",
            Self::Dyskinesia => "dyskinesia",
        }
    }
}
