//! File codecs for personnel records.
//!
//! # Responsibility
//! - Encode/decode `Personal` lists to CSV, XML and JSON.
//! - Guard file reads/writes with existence, emptiness and extension checks.
//!
//! # Invariants
//! - Decoding is all-or-nothing: any bad record fails the whole file.
//! - Encoding is deterministic and keeps input order.
//! - A write with the wrong extension has no filesystem side effect.

use crate::error::{PersonalError, PersonalResult};
use crate::model::personal::Personal;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

mod csv_storage;
pub mod dto;
mod json_storage;
mod xml_storage;

pub use csv_storage::CsvStorage;
pub use json_storage::JsonStorage;
pub use xml_storage::XmlStorage;

/// Base name of files written by exports.
pub const DEFAULT_FILE_STEM: &str = "personal";

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileFormat {
    Csv,
    Xml,
    Json,
}

impl FileFormat {
    pub const ALL: [FileFormat; 3] = [Self::Csv, Self::Xml, Self::Json];

    /// Expected file extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }

    /// Canonical file name used by imports and exports (`personal.<ext>`).
    pub fn default_file_name(self) -> String {
        format!("{DEFAULT_FILE_STEM}.{}", self.extension())
    }

    /// Returns whether `path` ends with this format's extension, ignoring case.
    pub fn matches_extension(self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension()))
    }
}

impl Display for FileFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Csv => "CSV",
            Self::Xml => "XML",
            Self::Json => "JSON",
        })
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xml" => Ok(Self::Xml),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unsupported file format `{other}`; expected csv|xml|json"
            )),
        }
    }
}

/// Codec contract shared by every file format.
pub trait PersonalStorage: Send + Sync {
    fn format(&self) -> FileFormat;

    /// Decodes a full file body.
    fn decode(&self, bytes: &[u8]) -> PersonalResult<Vec<Personal>>;

    /// Encodes records in the given order.
    fn encode(&self, records: &[Personal]) -> PersonalResult<Vec<u8>>;

    /// Reads and decodes a file after validating path, size and extension.
    fn read_from_file(&self, path: &Path) -> PersonalResult<Vec<Personal>> {
        let format = self.format();
        let started_at = Instant::now();
        debug!(
            "event=storage_read module=storage status=start format={} path={}",
            format.extension(),
            path.display()
        );

        let result = read_checked(format, path).and_then(|bytes| self.decode(&bytes));
        match &result {
            Ok(records) => info!(
                "event=storage_read module=storage status=ok format={} records={} duration_ms={}",
                format.extension(),
                records.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=storage_read module=storage status=error format={} duration_ms={} error_code={} error={}",
                format.extension(),
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }
        result
    }

    /// Encodes and writes records, creating parent directories as needed.
    fn write_to_file(&self, path: &Path, records: &[Personal]) -> PersonalResult<()> {
        let format = self.format();
        let started_at = Instant::now();

        let result = self
            .encode(records)
            .and_then(|bytes| write_checked(format, path, &bytes));
        match &result {
            Ok(()) => info!(
                "event=storage_write module=storage status=ok format={} records={} duration_ms={}",
                format.extension(),
                records.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=storage_write module=storage status=error format={} duration_ms={} error_code={} error={}",
                format.extension(),
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }
        result
    }
}

/// Returns the codec for `format`.
pub fn storage_for(format: FileFormat) -> &'static dyn PersonalStorage {
    match format {
        FileFormat::Csv => &CsvStorage,
        FileFormat::Xml => &XmlStorage,
        FileFormat::Json => &JsonStorage,
    }
}

fn read_checked(format: FileFormat, path: &Path) -> PersonalResult<Vec<u8>> {
    let metadata = fs::metadata(path)
        .map_err(|err| PersonalError::storage(path, format!("file does not exist: {err}")))?;
    if !metadata.is_file() {
        return Err(PersonalError::storage(path, "not a regular file"));
    }
    if !format.matches_extension(path) {
        return Err(PersonalError::storage(
            path,
            format!("expected a .{} file", format.extension()),
        ));
    }
    if metadata.len() == 0 {
        return Err(PersonalError::storage(path, "file is empty"));
    }

    fs::read(path).map_err(|err| PersonalError::storage(path, format!("cannot read file: {err}")))
}

fn write_checked(format: FileFormat, path: &Path, bytes: &[u8]) -> PersonalResult<()> {
    // Checked before touching the filesystem so a mismatch never creates or
    // truncates anything.
    if !format.matches_extension(path) {
        return Err(PersonalError::storage(
            path,
            format!("expected a .{} file", format.extension()),
        ));
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            PersonalError::storage(path, format!("cannot create parent directory: {err}"))
        })?;
    }

    fs::write(path, bytes)
        .map_err(|err| PersonalError::storage(path, format!("cannot write file: {err}")))
}
