use super::domain::RawPolicyRecord;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

const ENVELOPE_KEYS: &[&str] = &["data", "policies"];

#[derive(Debug, thiserror::Error)]
pub enum PolicyImportError {
    #[error("failed to read policy export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid policy JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid policy CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported policy export format '{0}' (expected .json or .csv)")]
    UnsupportedFormat(String),
    #[error("policy JSON carries no record array (expected a list or a data/policies field)")]
    MissingRecords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    pub fn from_path(path: &Path) -> Result<Self, PolicyImportError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(PolicyImportError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }
}

/// Loads record sets saved from the policy backend.
pub struct PolicyImporter;

impl PolicyImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawPolicyRecord>, PolicyImportError> {
        let path = path.as_ref();
        let format = ImportFormat::from_path(path)?;
        let file = std::fs::File::open(path)?;
        let records = Self::from_reader(file, format)?;
        info!(path = %path.display(), records = records.len(), "loaded policy export");
        Ok(records)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        format: ImportFormat,
    ) -> Result<Vec<RawPolicyRecord>, PolicyImportError> {
        match format {
            ImportFormat::Json => Self::from_json_reader(reader),
            ImportFormat::Csv => Self::from_csv_reader(reader),
        }
    }

    /// Accepts a bare array or an object wrapping it under `data` or `policies`.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Vec<RawPolicyRecord>, PolicyImportError> {
        let document: Value = serde_json::from_reader(reader)?;
        Self::from_json_value(document)
    }

    pub fn from_json_value(document: Value) -> Result<Vec<RawPolicyRecord>, PolicyImportError> {
        let records = match document {
            Value::Array(items) => items,
            Value::Object(mut fields) => ENVELOPE_KEYS
                .iter()
                .find_map(|key| match fields.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                })
                .ok_or(PolicyImportError::MissingRecords)?,
            _ => return Err(PolicyImportError::MissingRecords),
        };

        records
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(PolicyImportError::from))
            .collect()
    }

    /// Reads a CSV export whose header row uses the backend's field names.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Vec<RawPolicyRecord>, PolicyImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for row in csv_reader.deserialize::<HashMap<String, String>>() {
            let fields: Map<String, Value> = row?
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            records.push(serde_json::from_value(Value::Object(fields))?);
        }

        Ok(records)
    }
}
