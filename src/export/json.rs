use super::ExportError;
use serde::Serialize;

use crate::zones::{IntensityZone, COMMON_INTERVALS};

/// Serialize any result structure to pretty JSON
pub fn to_json<T: Serialize>(data: &T) -> Result<String, ExportError> {
    serde_json::to_string_pretty(data).map_err(|e| ExportError::SerializationError(e.to_string()))
}

#[derive(Serialize)]
struct ZoneEntry {
    zone: IntensityZone,
    min: f64,
    max: f64,
}

/// Zone table and interval presets as JSON
pub fn zones_json() -> Result<String, ExportError> {
    let zones: Vec<ZoneEntry> = IntensityZone::ALL
        .iter()
        .map(|&zone| ZoneEntry {
            zone,
            min: zone.range().min,
            max: zone.range().max,
        })
        .collect();

    to_json(&serde_json::json!({
        "zones": zones,
        "common_intervals": COMMON_INTERVALS,
    }))
}
