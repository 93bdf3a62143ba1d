#[cfg(feature = "cli")]
pub mod cli;
pub mod file;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::ColumnSpec;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_INPUT_PATH: &str = "Blowdown Gas Volumes.xlsx";
pub const DEFAULT_SHEET_NAME: &str = "Examples";
pub const DEFAULT_HEADER_ROW: usize = 1;

#[cfg(feature = "cli")]
const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsb", "ods", "csv"];

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, clap::Parser)]
#[command(name = "blowdown-advisor")]
#[command(about = "Recommends the smallest blowdown valve size meeting a target gas release")]
pub struct CliConfig {
    /// Spreadsheet with the blowdown test data (xlsx, xls, xlsb, ods or csv)
    #[arg(long, default_value = DEFAULT_INPUT_PATH)]
    pub input_path: String,

    /// Worksheet holding the test records (ignored for CSV input)
    #[arg(long, default_value = DEFAULT_SHEET_NAME)]
    pub sheet_name: String,

    /// Zero-based row index of the column headers
    #[arg(long, default_value_t = DEFAULT_HEADER_ROW)]
    pub header_row: usize,

    /// Volume type to query; omit to browse interactively
    #[arg(long)]
    pub volume_type: Option<String>,

    /// Target release volume in MCF; defaults to the smallest release
    /// measured for the chosen volume type
    #[arg(long, allow_hyphen_values = true)]
    pub target_release: Option<f64>,

    /// List the available volume types and exit
    #[arg(long)]
    pub list_types: bool,

    /// Print the filtered, sorted records under the recommendation
    #[arg(long)]
    pub show_table: bool,

    /// TOML file overriding the source location and column names
    #[arg(long)]
    pub config: Option<String>,

    /// Log process CPU/memory usage during the load
    #[arg(long)]
    pub monitor: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(skip)]
    #[serde(default)]
    pub columns: ColumnSpec,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Fold a TOML file config underneath the CLI flags: flags still at
    /// their built-in defaults take the file's values, explicit flags win.
    pub fn apply_file(&mut self, file: file::FileConfig) {
        if let Some(source) = file.source {
            if self.input_path == DEFAULT_INPUT_PATH {
                if let Some(path) = source.path {
                    self.input_path = path;
                }
            }
            if self.sheet_name == DEFAULT_SHEET_NAME {
                if let Some(sheet) = source.sheet {
                    self.sheet_name = sheet;
                }
            }
            if self.header_row == DEFAULT_HEADER_ROW {
                if let Some(header_row) = source.header_row {
                    self.header_row = header_row;
                }
            }
        }
        if let Some(columns) = file.columns {
            columns.apply(&mut self.columns);
        }
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    fn header_row(&self) -> usize {
        self.header_row
    }

    fn columns(&self) -> &ColumnSpec {
        &self.columns
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input_path", &self.input_path)?;
        validation::validate_file_extension("input_path", &self.input_path, SUPPORTED_EXTENSIONS)?;
        validation::validate_non_empty_string("sheet_name", &self.sheet_name)?;

        if let Some(volume_type) = &self.volume_type {
            validation::validate_non_empty_string("volume_type", volume_type)?;
        }
        if let Some(target) = self.target_release {
            validation::validate_finite_non_negative("target_release", target)?;
        }

        validation::validate_non_empty_string("columns.volume_type", &self.columns.volume_type)?;
        validation::validate_non_empty_string("columns.valve_size", &self.columns.valve_size)?;
        validation::validate_non_empty_string("columns.duration", &self.columns.duration)?;
        validation::validate_non_empty_string("columns.release", &self.columns.release)?;

        Ok(())
    }
}
