use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::planner::PlanResponse;
use crate::report::{PaceCalculation, VdotReport};

pub mod csv;
pub mod json;
pub mod text;

/// Output format types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        };
        f.write_str(name)
    }
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}

/// Render plans for every group
pub fn render_plans(response: &PlanResponse, format: OutputFormat) -> Result<String, ExportError> {
    match format {
        OutputFormat::Text => Ok(text::render_plans(response)),
        OutputFormat::Json => json::to_json(response),
        OutputFormat::Csv => csv::render_plans(response),
    }
}

/// Render a full VDOT report
pub fn render_report(report: &VdotReport, format: OutputFormat) -> Result<String, ExportError> {
    match format {
        OutputFormat::Text => Ok(text::render_report(report)),
        OutputFormat::Json => json::to_json(report),
        OutputFormat::Csv => csv::render_report(report),
    }
}

/// Render a single pace calculation
pub fn render_pace(pace: &PaceCalculation, format: OutputFormat) -> Result<String, ExportError> {
    match format {
        OutputFormat::Text => Ok(text::render_pace(pace)),
        OutputFormat::Json => json::to_json(pace),
        OutputFormat::Csv => csv::render_pace(pace),
    }
}

/// Render the zone table and interval presets
pub fn render_zones(format: OutputFormat) -> Result<String, ExportError> {
    match format {
        OutputFormat::Text => Ok(text::render_zones()),
        OutputFormat::Json => json::zones_json(),
        OutputFormat::Csv => csv::render_zones(),
    }
}

/// Write rendered output to a file
pub fn write_output<P: AsRef<Path>>(content: &str, output_path: P) -> Result<(), ExportError> {
    let mut file = std::fs::File::create(output_path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!(matches!(
            "html".parse::<OutputFormat>(),
            Err(ExportError::UnsupportedFormat(_))
        ));
        assert_eq!(OutputFormat::default().to_string(), "text");
    }

    #[test]
    fn test_write_output() {
        let file = NamedTempFile::new().unwrap();
        write_output("zones", file.path()).unwrap();
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "zones");
    }
}
