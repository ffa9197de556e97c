//! Format-dispatching IO for [`EventLog`]
//!
//! Supported formats are `xes`, `xes.gz` and `json` (serde serialization of [`EventLog`]).

use std::io::{BufReader, Read, Write};
use std::path::Path;

use thiserror::Error;

use super::export_xes::export_xes_event_log;
use super::import_xes::{import_xes, XESImportOptions, XESParseError};
use super::EventLog;

/// Trait for importing types from a file path or reader
pub trait Importable: Sized {
    /// The error type returned by import operations
    type Error: std::error::Error + Send + Sync + 'static + From<std::io::Error>;

    /// Import from a reader, specifying the format.
    fn import_from_reader<R: Read>(reader: R, format: &str) -> Result<Self, Self::Error>;

    /// Import from a file path, inferring the format from the file extension.
    fn import_from_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error> {
        let path = path.as_ref();
        let format = infer_format(path).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Could not infer format from path",
            )
        })?;

        let file = std::fs::File::open(path)?;
        Self::import_from_reader(BufReader::new(file), &format)
    }

    /// Import from a byte slice, specifying the format.
    fn import_from_bytes(bytes: &[u8], format: &str) -> Result<Self, Self::Error> {
        Self::import_from_reader(std::io::Cursor::new(bytes), format)
    }
}

/// Trait for exporting types to a file path or writer
pub trait Exportable {
    /// The error type returned by export operations
    type Error: std::error::Error + Send + Sync + 'static + From<std::io::Error>;

    /// Export to a writer, specifying the format.
    fn export_to_writer<W: Write>(&self, writer: W, format: &str) -> Result<(), Self::Error>;

    /// Export to a file path, inferring the format from the file extension.
    fn export_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Self::Error> {
        let path = path.as_ref();
        let format = infer_format(path).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Could not infer format from path",
            )
        })?;

        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        self.export_to_writer(&mut writer, &format)?;
        writer.flush()?;
        Ok(())
    }
}

///
/// Infer format from path (e.g., `xes`, `xes.gz` or `json`)
///
/// The result is lowercase.
///
pub fn infer_format(path: &Path) -> Option<String> {
    let path_str = path.to_string_lossy().to_lowercase();
    if path_str.ends_with(".xes.gz") {
        return Some("xes.gz".to_string());
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
}

/// Error type for [`EventLog`] IO operations
#[derive(Debug, Error)]
pub enum EventLogIOError {
    /// IO Error
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// XES Parsing Error
    #[error("XES Error: {0}")]
    Xes(#[from] XESParseError),
    /// JSON Parsing Error
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    /// XML Error (while writing XES)
    #[error("XML Error: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Unsupported Format
    #[error("Unsupported Format: {0}")]
    UnsupportedFormat(String),
}

impl Importable for EventLog {
    type Error = EventLogIOError;

    fn import_from_reader<R: Read>(reader: R, format: &str) -> Result<Self, Self::Error> {
        match format {
            "json" => Ok(serde_json::from_reader(reader)?),
            "xes" => Ok(import_xes(
                BufReader::new(reader),
                XESImportOptions::default(),
            )?),
            "xes.gz" => {
                let gz = flate2::read::GzDecoder::new(reader);
                Ok(import_xes(BufReader::new(gz), XESImportOptions::default())?)
            }
            _ => Err(EventLogIOError::UnsupportedFormat(format.to_string())),
        }
    }
}

impl Exportable for EventLog {
    type Error = EventLogIOError;

    fn export_to_writer<W: Write>(&self, writer: W, format: &str) -> Result<(), Self::Error> {
        match format {
            "json" => {
                serde_json::to_writer(writer, self)?;
                Ok(())
            }
            "xes" => {
                export_xes_event_log(writer, self)?;
                Ok(())
            }
            "xes.gz" => {
                let mut encoder =
                    flate2::write::GzEncoder::new(writer, flate2::Compression::default());
                export_xes_event_log(&mut encoder, self)?;
                encoder.finish()?;
                Ok(())
            }
            _ => Err(EventLogIOError::UnsupportedFormat(format.to_string())),
        }
    }
}
