use crate::domain::model::ColumnSpec;
use crate::utils::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};

/// Optional TOML config describing where the test data lives and what
/// its columns are called. Every field is optional; anything missing
/// keeps the built-in spreadsheet contract.
///
/// ```toml
/// [source]
/// path = "field-data/blowdown.xlsx"
/// sheet = "Examples"
/// header_row = 1
///
/// [columns]
/// release = "Released Gas [MCF]"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub source: Option<SourceSection>,
    pub columns: Option<ColumnsSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSection {
    pub path: Option<String>,
    pub sheet: Option<String>,
    pub header_row: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnsSection {
    pub volume_type: Option<String>,
    pub valve_size: Option<String>,
    pub duration: Option<String>,
    pub release: Option<String>,
}

impl FileConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| AdvisorError::ConfigError {
            message: format!("Failed to parse config file '{}': {}", path, e),
        })
    }
}

impl ColumnsSection {
    /// Overlay the named columns onto the defaults.
    pub fn apply(self, base: &mut ColumnSpec) {
        if let Some(volume_type) = self.volume_type {
            base.volume_type = volume_type;
        }
        if let Some(valve_size) = self.valve_size {
            base.valve_size = valve_size;
        }
        if let Some(duration) = self.duration {
            base.duration = duration;
        }
        if let Some(release) = self.release {
            base.release = release;
        }
    }
}
