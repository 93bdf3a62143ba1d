use crate::core::{ConfigProvider, Measurement, MeasurementTable, Pipeline, Record, Storage, TransformResult};
use crate::utils::error::{AdvisorError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// Loads the blowdown test sheet into an immutable measurement table.
///
/// Extract reads the raw rows from a workbook or CSV file, transform
/// coerces and cleans them, load freezes the survivors into the table.
pub struct SpreadsheetPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

enum SourceFormat {
    /// xlsx/xls/xlsb/ods, auto-detected by calamine from the byte buffer.
    Workbook,
    Csv,
}

impl<S: Storage, C: ConfigProvider> SpreadsheetPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn source_format(&self) -> SourceFormat {
        let is_csv = Path::new(self.config.input_path())
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            SourceFormat::Csv
        } else {
            SourceFormat::Workbook
        }
    }

    fn extract_workbook(&self, bytes: Vec<u8>) -> Result<Vec<Record>> {
        let sheet_name = self.config.sheet_name();
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

        if !workbook
            .sheet_names()
            .iter()
            .any(|s| s.as_str() == sheet_name)
        {
            return Err(AdvisorError::ProcessingError {
                message: format!(
                    "Sheet '{}' not found. Available sheets: {}",
                    sheet_name,
                    workbook.sheet_names().join(", ")
                ),
            });
        }

        let range = workbook.worksheet_range(sheet_name)?;
        let mut rows = range.rows();

        let headers: Vec<String> = rows
            .nth(self.config.header_row())
            .ok_or_else(|| AdvisorError::ProcessingError {
                message: format!(
                    "Header row {} is past the end of sheet '{}'",
                    self.config.header_row(),
                    sheet_name
                ),
            })?
            .iter()
            .map(header_cell_to_string)
            .collect();

        let mut records = Vec::new();
        for row in rows {
            let mut data = HashMap::new();
            for (header, cell) in headers.iter().zip(row) {
                if header.is_empty() {
                    continue;
                }
                if let Some(value) = cell_to_value(cell) {
                    data.insert(header.clone(), value);
                }
            }
            if !data.is_empty() {
                records.push(Record { data });
            }
        }

        Ok(records)
    }

    fn extract_csv(&self, bytes: Vec<u8>) -> Result<Vec<Record>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let mut rows = Vec::new();
        for row in reader.records() {
            rows.push(row?);
        }

        let headers: Vec<String> = rows
            .get(self.config.header_row())
            .ok_or_else(|| AdvisorError::ProcessingError {
                message: format!(
                    "Header row {} is past the end of the CSV file",
                    self.config.header_row()
                ),
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for row in rows.iter().skip(self.config.header_row() + 1) {
            let mut data = HashMap::new();
            for (header, field) in headers.iter().zip(row.iter()) {
                let field = field.trim();
                if header.is_empty() || field.is_empty() {
                    continue;
                }
                data.insert(header.clone(), Value::String(field.to_string()));
            }
            if !data.is_empty() {
                records.push(Record { data });
            }
        }

        Ok(records)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SpreadsheetPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let path = self.config.input_path();
        tracing::debug!("Reading input file: {}", path);
        let bytes = self.storage.read_file(path).await?;
        tracing::debug!("Read {} bytes", bytes.len());

        match self.source_format() {
            SourceFormat::Workbook => self.extract_workbook(bytes),
            SourceFormat::Csv => self.extract_csv(bytes),
        }
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        let columns = self.config.columns();

        let mut measurements = Vec::new();
        let mut dropped_missing = 0;
        let mut dropped_non_numeric = 0;
        let mut dropped_out_of_domain = 0;

        for record in data {
            let cells = (
                record.data.get(&columns.volume_type),
                record.data.get(&columns.valve_size),
                record.data.get(&columns.duration),
                record.data.get(&columns.release),
            );
            let (Some(volume_type), Some(valve_size), Some(duration), Some(release)) = cells
            else {
                dropped_missing += 1;
                continue;
            };

            let Some(volume_type) = as_text(volume_type) else {
                dropped_missing += 1;
                continue;
            };

            let (Some(valve_size_in), Some(duration_s), Some(release_mcf)) =
                (as_f64(valve_size), as_f64(duration), as_f64(release))
            else {
                dropped_non_numeric += 1;
                continue;
            };

            // Data model: valve size and duration positive, release
            // non-negative, everything finite.
            let finite =
                valve_size_in.is_finite() && duration_s.is_finite() && release_mcf.is_finite();
            if !finite || valve_size_in <= 0.0 || duration_s <= 0.0 || release_mcf < 0.0 {
                dropped_out_of_domain += 1;
                continue;
            }

            measurements.push(Measurement {
                volume_type,
                valve_size_in,
                duration_s,
                release_mcf,
            });
        }

        let result = TransformResult {
            measurements,
            dropped_missing,
            dropped_non_numeric,
            dropped_out_of_domain,
        };

        if result.dropped_total() > 0 {
            tracing::warn!(
                "Dropped {} rows ({} missing fields, {} non-numeric, {} out of domain)",
                result.dropped_total(),
                result.dropped_missing,
                result.dropped_non_numeric,
                result.dropped_out_of_domain
            );
        }

        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<MeasurementTable> {
        if result.measurements.is_empty() {
            return Err(AdvisorError::ProcessingError {
                message: format!(
                    "No usable measurements in '{}' after cleaning",
                    self.config.input_path()
                ),
            });
        }

        let table = MeasurementTable::new(result.measurements);
        tracing::debug!(
            "Loaded {} measurements across {} volume types",
            table.len(),
            table.volume_types().len()
        );
        Ok(table)
    }
}

fn header_cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Cell -> JSON value. Empty cells and cell errors are missing; Excel
/// date-times coerce through their serial number.
fn cell_to_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(Value::String(s.to_string()))
            }
        }
        Data::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number),
        Data::Int(i) => Some(Value::Number((*i).into())),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => serde_json::Number::from_f64(dt.as_f64()).map(Value::Number),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric coercion: JSON numbers and numeric strings qualify, anything
/// else is treated as missing.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
