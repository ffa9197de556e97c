use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use flate2::bufread::GzDecoder;
use quick_xml::Error as QuickXMLError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::event_log_struct::{EventLog, Trace};
use super::stream_xes::{boxed_xml_reader, is_gz_path, XESParsingTraceStream};

///
/// Error encountered while parsing XES
///
#[derive(Debug, Clone, Error)]
pub enum XESParseError {
    /// An Attribute was encountered outside an open `<log>` tag
    #[error("attribute encountered outside of an open <log> tag")]
    AttributeOutsideLog,
    /// There is not top-level `<log>`
    #[error("no top-level <log> element found")]
    NoTopLevelLog,
    /// Parsing error: Expected to have a previously constructed event available
    #[error("expected an open event")]
    MissingLastEvent,
    /// Parsing error: Expected to have a previously constructed trace available
    #[error("expected an open trace")]
    MissingLastTrace,
    /// Parsing error: Expected to be in a different parsing mode than the current state suggests
    #[error("invalid parsing mode")]
    InvalidMode,
    /// IO error
    #[error("IO error: {0}")]
    IOError(#[source] Arc<std::io::Error>),
    /// XML error (e.g., incorrect XML format)
    #[error("XML error: {0}")]
    XMLParsingError(#[from] QuickXMLError),
    /// Invalid value of XML attribute with key (with key included)
    #[error("invalid value for XML attribute {0:?}")]
    InvalidKeyValue(&'static str),
    /// Parsing Transformation Error: Expected that `XESOuterLogData` would be emitted first
    #[error("expected log data before the first trace")]
    ExpectedLogData,
    /// Parsing Transformation Error: Expected that Trace would be emitted now
    #[error("expected trace data")]
    ExpectedTraceData,
}

impl From<std::io::Error> for XESParseError {
    fn from(e: std::io::Error) -> Self {
        Self::IOError(Arc::new(e))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
///
/// Options for XES Import
///
/// See also [`build_ignore_attributes`] for easy construction of attributes set to not ignore
pub struct XESImportOptions {
    /// If Some: Ignore all top-level log attributes, except attributes with keys in the provided allowlist
    pub ignore_log_attributes_except: Option<HashSet<String>>,
    /// If Some: Ignore all trace attributes, except attributes with keys in the provided allowlist
    ///
    /// Does not effect global trace attributes
    pub ignore_trace_attributes_except: Option<HashSet<String>>,
    /// If Some: Ignore all event attributes except, attributes with keys in the provided allowlist
    ///
    /// Does not effect global event attributes
    pub ignore_event_attributes_except: Option<HashSet<String>>,
    /// Optional date format to use when parsing `DateTimes` (first trying [`chrono::DateTime`] then falling back to [`chrono::NaiveDateTime`] with UTC timezone).
    ///
    /// See <https://docs.rs/chrono/latest/chrono/format/strftime/index.html> for all available Specifiers.
    ///
    /// Will fall back to default formats (e.g., rfc3339) if parsing fails using passed `date_format`
    pub date_format: Option<String>,
    /// Sort events via timestamp key directly when parsing:
    /// * If None: No sorting (i.e., events of traces are included in order of occurence in event log)
    /// * If Some(key):
    ///   * Sort events via the timestamp provided by key before emitting the trace
    ///   * If no value is present or it is invalid, the global default event attribute value with the provided key will be used (if it exists)
    ///   * if no valid timestamp is available from the event or the global default, it will be sorted before all other events (in stable ordering)
    pub sort_events_with_timestamp_key: Option<String>,
}

///
/// Construct a `HashSet<String>` from a _collection_ of String, &str, ...
///
/// Example usage: `build_ignore_attributes(vec!["concept:name"])`
///
pub fn build_ignore_attributes<I, S: AsRef<str>>(keys: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
{
    keys.into_iter().map(|s| s.as_ref().to_string()).collect()
}

/// Parse XES from the given reader
pub fn import_xes<'a, T>(reader: T, options: XESImportOptions) -> Result<EventLog, XESParseError>
where
    T: BufRead + 'a,
{
    let (mut trace_stream, log_data) =
        XESParsingTraceStream::try_new(boxed_xml_reader(reader), options)?;

    let traces: Vec<Trace> = trace_stream.by_ref().collect();

    if let Some(e) = trace_stream.error {
        return Err(e);
    }
    log::debug!("Parsed XES with {} traces", traces.len());

    Ok(EventLog::from_traces_and_log_data(traces, log_data))
}

///
/// Import a XES [`EventLog`] from a file path
///
/// Files ending in `.gz` are decompressed while reading.
///
pub fn import_xes_file<P: AsRef<Path>>(
    path: P,
    options: XESImportOptions,
) -> Result<EventLog, XESParseError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    if is_gz_path(path) {
        let dec = GzDecoder::new(BufReader::new(file));
        import_xes(BufReader::new(dec), options)
    } else {
        import_xes(BufReader::new(file), options)
    }
}

///
/// Import a XES [`EventLog`] directly from a string
///
pub fn import_xes_str(xes_str: &str, options: XESImportOptions) -> Result<EventLog, XESParseError> {
    import_xes(xes_str.as_bytes(), options)
}

///
/// Import a XES [`EventLog`] from a byte slice (&\[u8\])
///
/// * `is_compressed_gz`: Parse the passed `xes_data` as a compressed .gz archive
///
pub fn import_xes_slice(
    xes_data: &[u8],
    is_compressed_gz: bool,
    options: XESImportOptions,
) -> Result<EventLog, XESParseError> {
    if is_compressed_gz {
        let gz: GzDecoder<&[u8]> = GzDecoder::new(xes_data);
        return import_xes(BufReader::new(gz), options);
    }
    import_xes(xes_data, options)
}
