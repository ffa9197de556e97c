/// Helper utils regarding XML import/export
pub mod xml_utils;
/// Parsing of timestamps in the formats found in XES files
pub mod timestamp_utils;
