#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]

#![doc = include_str!("../README.md")]

pub use chrono;

///
/// Event Logs ([`EventLog`] and its XES serialization)
///
pub mod event_log {
    /// Constants
    pub mod constants;
    /// [`EventLog`] struct and sub-structs
    pub mod event_log_struct;
    /// XES Export
    pub mod export_xes;
    /// XES Import
    pub mod import_xes;
    /// Format-dispatching import/export of [`EventLog`]s
    pub mod io;
    /// Macros for the creation of [`Attribute`]s and [`Event`]s
    pub mod macros;
    /// Summary statistics over event logs
    pub mod stats;
    /// Streaming XES Import
    pub mod stream_xes;
    /// Validation of global attribute declarations
    pub mod validate;

    pub use event_log_struct::{
        Attribute, AttributeValue, Attributes, Event, EventLog, Trace, XESEditableAttribute,
    };
    #[cfg(test)]
    mod tests;
}

/// Util module with smaller helper functions, structs or enums
pub mod utils;

#[doc(inline)]
pub use event_log::import_xes::import_xes_file;

#[doc(inline)]
pub use event_log::import_xes::import_xes_slice;

#[doc(inline)]
pub use event_log::import_xes::import_xes_str;

#[doc(inline)]
pub use event_log::import_xes::XESImportOptions;

#[doc(inline)]
pub use event_log::import_xes::XESParseError;

#[doc(inline)]
pub use event_log::stream_xes::stream_xes_from_path;

#[doc(inline)]
pub use event_log::stream_xes::stream_xes_slice;

#[doc(inline)]
pub use event_log::stream_xes::stream_xes_slice_gz;

#[doc(inline)]
pub use event_log::stream_xes::stream_xes_file;

#[doc(inline)]
pub use event_log::stream_xes::stream_xes_file_gz;

#[doc(inline)]
pub use event_log::stream_xes::XESOuterLogData;

#[doc(inline)]
pub use event_log::stream_xes::StreamingXESParser;

#[doc(inline)]
pub use event_log::export_xes::export_xes_trace_stream_to_file;

#[doc(inline)]
pub use event_log::export_xes::export_xes_event_log_to_file_path;

#[doc(inline)]
pub use event_log::export_xes::export_xes_event_log_to_file;

#[doc(inline)]
pub use event_log::export_xes::export_xes_event_log;

#[doc(inline)]
pub use event_log::io::{EventLogIOError, Exportable, Importable};

#[doc(inline)]
pub use event_log::stats::EventLogStats;

#[doc(inline)]
pub use event_log::validate::{validate_globals, ValidationError};

#[doc(inline)]
pub use event_log::event_log_struct::EventLog;

///
/// Serialize an [`EventLog`] as a JSON [`String`]
///
pub fn event_log_to_json(log: &EventLog) -> Result<String, serde_json::Error> {
    serde_json::to_string(log)
}

///
/// Deserialize an [`EventLog`] from a JSON [`String`]
///
pub fn json_to_event_log(log_json: &str) -> Result<EventLog, serde_json::Error> {
    serde_json::from_str(log_json)
}
