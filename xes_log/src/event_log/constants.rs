/// Common identifying field for event identities (i.e., activities)
///
/// _Note_: While the concept XES extension is the de-facto standard for identifying activity names,
/// some XES files might not use `concept:name` or have events without a `concept:name` attribute.
///
/// __Usage Generally Discouraged__: _Instead, try to use event log classifiers, which utilize information present in the event log itself and handle fall-backs individually_
pub const ACTIVITY_NAME: &str = "concept:name";
/// Timestamp field defined by the time XES extension
pub const TIMESTAMP_NAME: &str = "time:timestamp";
/// Prefix prepended to attribute keys when flattening event log to events only
pub const TRACE_PREFIX: &str = "case:";
/// Common identifying field for trace identities (i.e., trace IDs)
///
/// See also [`ACTIVITY_NAME`]
pub const TRACE_ID_NAME: &str = "concept:name";
/// Constructed combination of [`TRACE_PREFIX`] and [`TRACE_ID_NAME`]
pub const PREFIXED_TRACE_ID_NAME: &str = "case:concept:name";
/// XES version written on export
pub const XES_VERSION: &str = "2.0";
/// XML namespace of XES documents
pub const XES_NAMESPACE: &str = "http://www.xes-standard.org/";
