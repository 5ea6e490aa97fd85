use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur during zone lookups
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ZoneError {
    #[error("Unknown intensity zone: {0}")]
    UnknownZone(String),
}

/// Named training-intensity zones, expressed as a share of VDOT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntensityZone {
    Easy,
    Marathon,
    Threshold,
    Interval,
    Repetition,
}

/// Effort range of a zone in percent of VDOT
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneRange {
    pub min: f64,
    pub max: f64,
}

impl IntensityZone {
    /// All zones, easiest first
    pub const ALL: [IntensityZone; 5] = [
        IntensityZone::Easy,
        IntensityZone::Marathon,
        IntensityZone::Threshold,
        IntensityZone::Interval,
        IntensityZone::Repetition,
    ];

    /// Zone boundaries in percent of VDOT
    ///
    /// - Easy: 59-74%
    /// - Marathon: 75-84%
    /// - Threshold: 83-88%
    /// - Interval: 95-100%
    /// - Repetition: 105-110%
    pub const fn range(self) -> ZoneRange {
        match self {
            IntensityZone::Easy => ZoneRange { min: 59.0, max: 74.0 },
            IntensityZone::Marathon => ZoneRange { min: 75.0, max: 84.0 },
            IntensityZone::Threshold => ZoneRange { min: 83.0, max: 88.0 },
            IntensityZone::Interval => ZoneRange { min: 95.0, max: 100.0 },
            IntensityZone::Repetition => ZoneRange { min: 105.0, max: 110.0 },
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            IntensityZone::Easy => "Easy",
            IntensityZone::Marathon => "Marathon",
            IntensityZone::Threshold => "Threshold",
            IntensityZone::Interval => "Interval",
            IntensityZone::Repetition => "Repetition",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|zone| zone.name()).collect()
    }
}

impl fmt::Display for IntensityZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Exact, case-sensitive match on the zone name
impl FromStr for IntensityZone {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|zone| zone.name() == s)
            .ok_or_else(|| ZoneError::UnknownZone(s.to_string()))
    }
}

/// A common interval distance with the zone it is usually run in
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntervalPreset {
    pub name: &'static str,
    pub distance_m: f64,
    pub zone: IntensityZone,
}

/// Typical interval sessions, used for the reference target table
pub const COMMON_INTERVALS: &[IntervalPreset] = &[
    IntervalPreset { name: "200m Repetition", distance_m: 200.0, zone: IntensityZone::Repetition },
    IntervalPreset { name: "400m Repetition", distance_m: 400.0, zone: IntensityZone::Repetition },
    IntervalPreset { name: "400m Interval", distance_m: 400.0, zone: IntensityZone::Interval },
    IntervalPreset { name: "800m Interval", distance_m: 800.0, zone: IntensityZone::Interval },
    IntervalPreset { name: "1000m Interval", distance_m: 1000.0, zone: IntensityZone::Interval },
    IntervalPreset { name: "1000m Threshold", distance_m: 1000.0, zone: IntensityZone::Threshold },
    IntervalPreset { name: "1600m Interval", distance_m: 1600.0, zone: IntensityZone::Interval },
    IntervalPreset { name: "1600m Threshold", distance_m: 1600.0, zone: IntensityZone::Threshold },
];

/// Zone lookup utilities
pub struct ZoneCalculator;

impl ZoneCalculator {
    /// Look up a zone's range by name; unknown names are an error, never a default
    pub fn lookup(name: &str) -> Result<ZoneRange, ZoneError> {
        name.parse::<IntensityZone>().map(IntensityZone::range)
    }

    /// Intensity used for prescribed paces: the top of the zone
    pub fn target_intensity(zone: IntensityZone) -> f64 {
        zone.range().max
    }
}
