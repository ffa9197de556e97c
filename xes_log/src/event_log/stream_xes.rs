use std::{
    fs::File,
    io::{BufRead, BufReader},
    iter::FusedIterator,
    path::Path,
    str::FromStr,
};

use flate2::read::GzDecoder;
use quick_xml::{escape::unescape, events::BytesStart, Reader};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::timestamp_utils::parse_timestamp;

use super::{
    event_log_struct::{EventLogClassifier, EventLogExtension},
    import_xes::{XESImportOptions, XESParseError},
    Attribute, AttributeValue, Attributes, Event, Trace, XESEditableAttribute,
};

/// (Global) log data parsed during streaming
///
/// According to the state machine flow in XES standard (<https://xes-standard.org/_media/xes/xesstandarddefinition-2.0.pdf#page=11>) those must occur before the first trace
///
/// Thus, __for XES-compliant logs it is guaranteed that this data is already complete once the first trace is parsed__.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XESOuterLogData {
    /// Declared XES extensions
    pub extensions: Vec<EventLogExtension>,
    /// Declared event classifiers
    pub classifiers: Vec<EventLogClassifier>,
    /// Top-level log attributes
    pub log_attributes: Attributes,
    /// Global trace attributes (defaults)
    pub global_trace_attrs: Attributes,
    /// Global event attributes (defaults)
    pub global_event_attrs: Attributes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
///
/// Current Parsing Mode (i.e., which tag is currently open / being parsed)
///
pub enum Mode {
    /// Inside a `<trace>`
    Trace,
    /// Inside an `<event>`
    Event,
    /// Inside a (nested) attribute
    Attribute,
    /// Inside `<global scope="trace">`
    GlobalTraceAttributes,
    /// Inside `<global scope="event">`
    GlobalEventAttributes,
    /// Inside `<log>`, outside of any trace
    Log,
    /// Outside of `<log>`
    None,
}

#[derive(Debug)]
///
/// Enum of possible data streamed by [`StreamingXESParser`]
pub enum XESNextStreamElement {
    /// A fully parsed trace
    Trace(Trace),
    /// A parsing error; ends the stream
    Error(XESParseError),
    /// Log data, emitted once before the first trace
    LogData(XESOuterLogData),
}

/// Parsing state, kept apart from the XML reader and its buffer
#[derive(Debug)]
struct ParserState {
    current_mode: Mode,
    /// Currently active (=open) trace in current XML parsing position
    current_trace: Option<Trace>,
    /// Mode active before the outermost currently open attribute
    last_mode_before_attr: Mode,
    /// Stack of open attributes with child elements
    current_nested_attributes: Vec<Attribute>,
    options: XESImportOptions,
    /// Whether a (top-level) log tag was encountered yet
    encountered_log: bool,
    log_data: XESOuterLogData,
    log_data_emitted: bool,
    /// A `<trace/>` was read before the log data could be emitted
    pending_trace: bool,
    /// Depth of skipped elements (ignored attributes and their children)
    skip_depth: usize,
    /// Whether the parsing was terminated (either by encountering an error or reaching the Eof)
    finished: bool,
}

///
/// Streaming XES Parser over [`Trace`]s
///
/// Can be initiated using any of the streaming functions (e.g. [`stream_xes_from_path`], [`stream_xes_slice`], ...)
pub struct StreamingXESParser<'a> {
    /// Boxed [`quick_xml::reader::Reader`] to read XML from
    ///
    /// Boxed twice so that plain and gz readers share one type
    reader: Box<Reader<Box<dyn BufRead + 'a>>>,
    /// Buffer to read xml into
    buf: Vec<u8>,
    state: ParserState,
}

impl std::fmt::Debug for StreamingXESParser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingXESParser")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<'a> StreamingXESParser<'a> {
    /// Create a new parser reading from the given XML reader
    pub fn new(mut reader: Box<Reader<Box<dyn BufRead + 'a>>>, options: XESImportOptions) -> Self {
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            state: ParserState {
                current_mode: Mode::None,
                current_trace: None,
                last_mode_before_attr: Mode::Log,
                current_nested_attributes: Vec::new(),
                options,
                encountered_log: false,
                log_data: XESOuterLogData::default(),
                log_data_emitted: false,
                pending_trace: false,
                skip_depth: 0,
                finished: false,
            },
        }
    }

    /// Try to parse a next [`XESNextStreamElement`] from the current position
    ///
    /// Returns [`None`] if it encountered an error previously or there are no more traces left
    ///
    /// * `XESNextStreamElement::LogData` will be emitted exactly once at the beginning (before the first trace)
    /// * `XESNextStreamElement::Trace` will be emitted for every trace found in the underlying XES
    /// * `XESNextStreamElement::Error` will be emitted at most once and will end the iterator (i.e., it will only return None afterwards)
    pub fn next_trace(&mut self) -> Option<XESNextStreamElement> {
        if self.state.finished {
            return None;
        }
        if self.state.pending_trace && self.state.log_data_emitted {
            self.state.pending_trace = false;
            return self.state.emit_trace_data();
        }

        loop {
            self.buf.clear();
            let state = &mut self.state;
            let emitted = match self.reader.read_event_into(&mut self.buf) {
                Ok(quick_xml::events::Event::Start(t)) => state.on_start(&t),
                Ok(quick_xml::events::Event::Empty(t)) => state.on_empty(&t),
                Ok(quick_xml::events::Event::End(t)) => state.on_end(t.name().as_ref()),
                Ok(quick_xml::events::Event::Eof) => return state.on_eof(),
                Ok(_) => None,
                Err(e) => state.terminate_with_error(XESParseError::XMLParsingError(e)),
            };
            if emitted.is_some() {
                return emitted;
            }
        }
    }

    /// Currently used import options
    pub fn options(&self) -> &XESImportOptions {
        &self.state.options
    }

    /// Set or update the import options used for the remaining input
    pub fn set_options(&mut self, options: XESImportOptions) {
        self.state.options = options;
    }
}

impl ParserState {
    fn terminate_with_error(&mut self, error: XESParseError) -> Option<XESNextStreamElement> {
        self.finished = true;
        Some(XESNextStreamElement::Error(error))
    }

    fn emit_log_data(&mut self) -> Option<XESNextStreamElement> {
        self.log_data_emitted = true;
        Some(XESNextStreamElement::LogData(self.log_data.clone()))
    }

    fn emit_trace_data(&mut self) -> Option<XESNextStreamElement> {
        let Some(mut trace) = self.current_trace.take() else {
            return self.terminate_with_error(XESParseError::MissingLastTrace);
        };
        if let Some(timestamp_key) = &self.options.sort_events_with_timestamp_key {
            let global_default = self
                .log_data
                .global_event_attrs
                .get_by_key(timestamp_key)
                .and_then(|a| a.value.try_as_date())
                .copied();
            trace.events.sort_by_key(|e| {
                e.attributes
                    .get_by_key(timestamp_key)
                    .and_then(|a| a.value.try_as_date())
                    .copied()
                    .or(global_default)
            });
        }
        trace.events.shrink_to_fit();
        trace.attributes.shrink_to_fit();
        trace
            .events
            .iter_mut()
            .for_each(|e| e.attributes.shrink_to_fit());
        Some(XESNextStreamElement::Trace(trace))
    }

    fn on_start(&mut self, t: &BytesStart<'_>) -> Option<XESNextStreamElement> {
        if self.skip_depth > 0 {
            self.skip_depth += 1;
            return None;
        }
        match t.name().as_ref() {
            b"log" => {
                self.encountered_log = true;
                self.current_mode = Mode::Log;
            }
            b"trace" => {
                if !self.encountered_log {
                    return self.terminate_with_error(XESParseError::NoTopLevelLog);
                }
                self.current_mode = Mode::Trace;
                self.current_trace = Some(Trace {
                    attributes: Attributes::with_capacity(10),
                    events: Vec::with_capacity(10),
                });
                if !self.log_data_emitted {
                    return self.emit_log_data();
                }
            }
            b"event" => {
                if !self.encountered_log {
                    return self.terminate_with_error(XESParseError::NoTopLevelLog);
                }
                match &mut self.current_trace {
                    Some(trace) => {
                        self.current_mode = Mode::Event;
                        trace.events.push(Event {
                            attributes: Attributes::with_capacity(10),
                        });
                    }
                    None => {
                        log::warn!("Ignoring event outside of a trace");
                        self.skip_depth = 1;
                    }
                }
            }
            b"global" => {
                if !self.encountered_log {
                    return self.terminate_with_error(XESParseError::NoTopLevelLog);
                }
                match get_attribute_string(t, "scope").as_deref() {
                    Some("trace") => self.current_mode = Mode::GlobalTraceAttributes,
                    // Scope defaults to event according to the XES standard
                    Some("event") | None => self.current_mode = Mode::GlobalEventAttributes,
                    Some(_) => {
                        return self.terminate_with_error(XESParseError::InvalidKeyValue("scope"))
                    }
                }
            }
            b"extension" | b"classifier" => return self.on_empty(t),
            // Wrapper around list items in IEEE 1849-2016 style lists
            b"values" => {}
            _ => {
                if !self.encountered_log {
                    return self.terminate_with_error(XESParseError::NoTopLevelLog);
                }
                let Some(key) = get_attribute_string(t, "key") else {
                    log::warn!(
                        "Skipping element <{}> without key",
                        String::from_utf8_lossy(t.name().as_ref())
                    );
                    self.skip_depth = 1;
                    return None;
                };
                if matches!(self.current_mode, Mode::None) {
                    return self.terminate_with_error(XESParseError::AttributeOutsideLog);
                }
                if self.is_ignored(&key) {
                    self.skip_depth = 1;
                    return None;
                }
                let value = parse_attribute_value_from_tag(t, self.current_mode, &self.options);
                if !matches!(self.current_mode, Mode::Attribute) {
                    self.last_mode_before_attr = self.current_mode;
                }
                self.current_nested_attributes
                    .push(Attribute::new(key, value));
                self.current_mode = Mode::Attribute;
            }
        }
        None
    }

    fn on_empty(&mut self, t: &BytesStart<'_>) -> Option<XESNextStreamElement> {
        if self.skip_depth > 0 {
            return None;
        }
        match t.name().as_ref() {
            b"extension" => {
                self.log_data.extensions.push(EventLogExtension {
                    name: attribute_or_empty(t, "name"),
                    prefix: attribute_or_empty(t, "prefix"),
                    uri: attribute_or_empty(t, "uri"),
                });
            }
            b"classifier" => {
                self.log_data.classifiers.push(EventLogClassifier {
                    name: attribute_or_empty(t, "name"),
                    keys: parse_classifier_key(&attribute_or_empty(t, "keys")),
                });
            }
            b"log" => {
                // Empty log, but still a log
                self.encountered_log = true;
                self.current_mode = Mode::None;
                if !self.log_data_emitted {
                    return self.emit_log_data();
                }
            }
            b"trace" => {
                if !self.encountered_log {
                    return self.terminate_with_error(XESParseError::NoTopLevelLog);
                }
                self.current_trace = Some(Trace::default());
                if !self.log_data_emitted {
                    self.pending_trace = true;
                    return self.emit_log_data();
                }
                return self.emit_trace_data();
            }
            b"event" => match &mut self.current_trace {
                Some(trace) => trace.events.push(Event::default()),
                None => log::warn!("Ignoring event outside of a trace"),
            },
            b"global" | b"values" => {}
            _ => {
                if !self.encountered_log {
                    return self.terminate_with_error(XESParseError::NoTopLevelLog);
                }
                if !self.add_attribute_from_tag(t) {
                    return self.terminate_with_error(XESParseError::AttributeOutsideLog);
                }
            }
        }
        None
    }

    fn on_end(&mut self, name: &[u8]) -> Option<XESNextStreamElement> {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return None;
        }
        match name {
            b"event" => self.current_mode = Mode::Trace,
            b"trace" => {
                self.current_mode = Mode::Log;
                return self.emit_trace_data();
            }
            b"log" => self.current_mode = Mode::None,
            b"global" => self.current_mode = Mode::Log,
            b"values" | b"extension" | b"classifier" => {}
            _ => {
                if !matches!(self.current_mode, Mode::Attribute) {
                    return None;
                }
                let Some(attr) = self.current_nested_attributes.pop() else {
                    log::warn!("Attribute mode but no open nested attributes");
                    self.current_mode = self.last_mode_before_attr;
                    return None;
                };
                if let Some(parent) = self.current_nested_attributes.last_mut() {
                    add_child_attribute(parent, attr);
                    return None;
                }
                self.current_mode = self.last_mode_before_attr;
                if let Err(e) = self.add_attribute_to_current(attr) {
                    return self.terminate_with_error(e);
                }
            }
        }
        None
    }

    fn on_eof(&mut self) -> Option<XESNextStreamElement> {
        if !self.encountered_log {
            // If there was no (top-level) log tag, this was not a valid XES file!
            return self.terminate_with_error(XESParseError::NoTopLevelLog);
        }
        if !self.log_data_emitted {
            return self.emit_log_data();
        }
        self.finished = true;
        None
    }

    /// Whether an attribute with the given key should be ignored in the current mode
    fn is_ignored(&self, key: &str) -> bool {
        let allowlist = match self.current_mode {
            Mode::Event => &self.options.ignore_event_attributes_except,
            Mode::Trace => &self.options.ignore_trace_attributes_except,
            Mode::Log => &self.options.ignore_log_attributes_except,
            _ => return false,
        };
        allowlist
            .as_ref()
            .is_some_and(|not_ignored| !not_ignored.contains(key))
    }

    ///
    /// Add XES attribute from (empty) tag to the currently active element (indicated by `current_mode`)
    ///
    /// Returns `false` if there is no element the attribute could belong to
    ///
    fn add_attribute_from_tag(&mut self, t: &BytesStart<'_>) -> bool {
        if matches!(self.current_mode, Mode::None) {
            return false;
        }
        let Some(key) = get_attribute_string(t, "key") else {
            log::warn!(
                "Skipping element <{}> without key",
                String::from_utf8_lossy(t.name().as_ref())
            );
            return true;
        };
        if self.is_ignored(&key) {
            return true;
        }
        let value = parse_attribute_value_from_tag(t, self.current_mode, &self.options);
        let attr = Attribute::new(key, value);
        if matches!(self.current_mode, Mode::Attribute) {
            return match self.current_nested_attributes.last_mut() {
                Some(parent) => {
                    add_child_attribute(parent, attr);
                    true
                }
                None => false,
            };
        }
        if let Err(e) = self.add_attribute_to_current(attr) {
            log::warn!("{e}");
        }
        true
    }

    /// Add a (completed) attribute to the element indicated by `current_mode`
    fn add_attribute_to_current(&mut self, attr: Attribute) -> Result<(), XESParseError> {
        match self.current_mode {
            Mode::Trace => match &mut self.current_trace {
                Some(trace) => trace.attributes.add_attribute(attr),
                None => return Err(XESParseError::MissingLastTrace),
            },
            Mode::Event => match &mut self.current_trace {
                Some(trace) => match trace.events.last_mut() {
                    Some(event) => event.attributes.add_attribute(attr),
                    None => return Err(XESParseError::MissingLastEvent),
                },
                None => return Err(XESParseError::MissingLastTrace),
            },
            Mode::Log => self.log_data.log_attributes.add_attribute(attr),
            Mode::GlobalTraceAttributes => self.log_data.global_trace_attrs.add_attribute(attr),
            Mode::GlobalEventAttributes => self.log_data.global_event_attrs.add_attribute(attr),
            Mode::Attribute | Mode::None => return Err(XESParseError::InvalidMode),
        }
        Ok(())
    }
}

/// Attach `child` to `parent`: as list item, container entry or nested attribute
fn add_child_attribute(parent: &mut Attribute, child: Attribute) {
    match &mut parent.value {
        AttributeValue::List(items) => items.push(child),
        AttributeValue::Container(entries) => entries.add_attribute(child),
        _ => parent
            .own_attributes
            .get_or_insert_with(Attributes::new)
            .add_attribute(child),
    }
}

/// Iterator over the [`Trace`]s of an XES file
///
/// Errors end the iteration and are kept in [`XESParsingTraceStream::check_for_errors`].
#[derive(Debug)]
pub struct XESParsingTraceStream<'a> {
    inner: StreamingXESParser<'a>,
    /// First error encountered while parsing (if any)
    pub error: Option<XESParseError>,
}

/// Trace stream together with the [`XESOuterLogData`] parsed before the first trace
pub type XESParsingStreamAndLogData<'a> = (XESParsingTraceStream<'a>, XESOuterLogData);

impl Iterator for XESParsingTraceStream<'_> {
    type Item = Trace;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error.is_some() {
            return None;
        }
        match self.inner.next_trace() {
            Some(XESNextStreamElement::Trace(t)) => Some(t),
            Some(XESNextStreamElement::Error(e)) => {
                self.error = Some(e);
                None
            }
            Some(XESNextStreamElement::LogData(_)) => {
                self.error = Some(XESParseError::ExpectedTraceData);
                None
            }
            None => None,
        }
    }
}

impl FusedIterator for XESParsingTraceStream<'_> {}

impl<'a> XESParsingTraceStream<'a> {
    /// Check if any errors occured
    pub fn check_for_errors(&self) -> Option<XESParseError> {
        self.error.clone()
    }

    /// Set or update parsing options
    pub fn set_options(&mut self, options: XESImportOptions) {
        self.inner.set_options(options);
    }

    /// Get the currently used parsing options
    pub fn get_options(&self) -> &XESImportOptions {
        self.inner.options()
    }

    ///
    /// Try to construct a new [`XESParsingTraceStream`] and directly try to parse until the first trace
    ///
    /// As all log attributes must occur before the first trace, this already returns the parsed [`XESOuterLogData`]
    ///
    pub fn try_new(
        reader: Box<Reader<Box<dyn BufRead + 'a>>>,
        options: XESImportOptions,
    ) -> Result<XESParsingStreamAndLogData<'a>, XESParseError> {
        let mut parser = StreamingXESParser::new(reader, options);
        match parser.next_trace() {
            Some(XESNextStreamElement::LogData(d)) => Ok((
                Self {
                    inner: parser,
                    error: None,
                },
                d,
            )),
            Some(XESNextStreamElement::Error(e)) => Err(e),
            Some(XESNextStreamElement::Trace(_)) | None => Err(XESParseError::ExpectedLogData),
        }
    }
}

/// Box a [`BufRead`] into the XML reader type used by [`StreamingXESParser`]
pub(crate) fn boxed_xml_reader<'a, R: BufRead + 'a>(
    reader: R,
) -> Box<Reader<Box<dyn BufRead + 'a>>> {
    let reader: Box<dyn BufRead + 'a> = Box::new(reader);
    Box::new(Reader::from_reader(reader))
}

///
/// Stream XES [`Trace`]s from byte slice
///
/// The returned [`XESParsingStreamAndLogData`] contains the [`XESOuterLogData`] and can be used to iterate over [`Trace`]s
///
pub fn stream_xes_slice(
    xes_data: &[u8],
    options: XESImportOptions,
) -> Result<XESParsingStreamAndLogData<'_>, XESParseError> {
    XESParsingTraceStream::try_new(boxed_xml_reader(BufReader::new(xes_data)), options)
}

///
/// Stream XES [`Trace`]s from gzipped byte slice
///
/// The returned [`XESParsingStreamAndLogData`] contains the [`XESOuterLogData`] and can be used to iterate over [`Trace`]s
///
pub fn stream_xes_slice_gz(
    xes_data: &[u8],
    options: XESImportOptions,
) -> Result<XESParsingStreamAndLogData<'_>, XESParseError> {
    let gz: GzDecoder<&[u8]> = GzDecoder::new(xes_data);
    XESParsingTraceStream::try_new(boxed_xml_reader(BufReader::new(gz)), options)
}

///
/// Stream XES [`Trace`]s from a file
///
/// The returned [`XESParsingStreamAndLogData`] contains the [`XESOuterLogData`] and can be used to iterate over [`Trace`]s
///
pub fn stream_xes_file<'a>(
    file: File,
    options: XESImportOptions,
) -> Result<XESParsingStreamAndLogData<'a>, XESParseError> {
    XESParsingTraceStream::try_new(boxed_xml_reader(BufReader::new(file)), options)
}

///
/// Stream XES [`Trace`]s from a gzipped file
///
/// The returned [`XESParsingStreamAndLogData`] contains the [`XESOuterLogData`] and can be used to iterate over [`Trace`]s
///
pub fn stream_xes_file_gz<'a>(
    file: File,
    options: XESImportOptions,
) -> Result<XESParsingStreamAndLogData<'a>, XESParseError> {
    let dec = GzDecoder::new(BufReader::new(file));
    XESParsingTraceStream::try_new(boxed_xml_reader(BufReader::new(dec)), options)
}

///
/// Stream XES [`Trace`]s from path (auto-detecting gz compression from file extension)
///
/// The returned [`XESParsingStreamAndLogData`] contains the [`XESOuterLogData`] and can be used to iterate over [`Trace`]s
///
pub fn stream_xes_from_path<'a, P: AsRef<Path>>(
    path: P,
    options: XESImportOptions,
) -> Result<XESParsingStreamAndLogData<'a>, XESParseError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    if is_gz_path(path) {
        stream_xes_file_gz(file, options)
    } else {
        stream_xes_file(file, options)
    }
}

/// Whether the path has a `.gz` extension (case-insensitive), i.e., should be read or written gzip-compressed
pub fn is_gz_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

fn get_attribute_string(t: &BytesStart<'_>, key: &'static str) -> Option<String> {
    let attr = t.try_get_attribute(key).ok().flatten()?;
    let raw = String::from_utf8_lossy(&attr.value);
    let unescaped = unescape(&raw).map(|v| v.into_owned()).ok();
    Some(unescaped.unwrap_or_else(|| raw.into_owned()))
}

fn attribute_or_empty(t: &BytesStart<'_>, key: &'static str) -> String {
    get_attribute_string(t, key).unwrap_or_else(|| {
        log::debug!(
            "Did not find expected XML attribute {key} on <{}>. Will assume empty string as value.",
            String::from_utf8_lossy(t.name().as_ref())
        );
        String::new()
    })
}

///
/// Parse the value of an XES attribute element (e.g., `<int key="..." value="42"/>`)
///
/// Values which can not be parsed are logged and replaced by the default of their type
/// (or [`AttributeValue::None`] for dates and unknown types).
///
pub fn parse_attribute_value_from_tag(
    t: &BytesStart<'_>,
    mode: Mode,
    options: &XESImportOptions,
) -> AttributeValue {
    let tag = t.name();
    let tag = tag.as_ref();
    if tag == b"list" {
        return AttributeValue::List(Vec::new());
    }
    if tag == b"container" {
        return AttributeValue::Container(Attributes::new());
    }
    let value = attribute_or_empty(t, "value");
    match tag {
        b"string" => AttributeValue::String(value),
        b"date" => match parse_timestamp(&value, options.date_format.as_deref()) {
            Some(dt) => AttributeValue::Date(dt),
            None => {
                log::warn!("Failed to parse date from {value:?}");
                AttributeValue::None()
            }
        },
        b"int" => AttributeValue::Int(value.trim().parse::<i64>().unwrap_or_else(|e| {
            log::warn!("Could not parse integer {value:?}: Error {e}");
            i64::default()
        })),
        b"float" => AttributeValue::Float(value.trim().parse::<f64>().unwrap_or_else(|e| {
            log::warn!("Could not parse float {value:?}: Error {e}");
            f64::default()
        })),
        b"boolean" => AttributeValue::Boolean(parse_bool(&value).unwrap_or_else(|| {
            log::warn!("Could not parse boolean {value:?}");
            bool::default()
        })),
        b"id" => AttributeValue::ID(Uuid::from_str(value.trim()).unwrap_or_else(|e| {
            log::warn!("Could not parse UUID {value:?}: Error {e}");
            Uuid::default()
        })),
        other => {
            log::warn!(
                "Attribute type not implemented '{}' in mode {:?}",
                String::from_utf8_lossy(other),
                mode
            );
            AttributeValue::None()
        }
    }
}

/// XML schema booleans also allow `1` and `0`
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

///
/// Parse the `keys` attribute of an XES classifier
///
/// Keys are separated by whitespace. Keys containing whitespace are enclosed in single quotes
/// (e.g., `'Activity code' lifecycle:transition`). Inside quotes, a backslash escapes the next
/// character (`'it\'s'`).
///
pub fn parse_classifier_key(keys: &str) -> Vec<String> {
    let mut ret = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = keys.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '\'' if in_quotes => {
                in_quotes = false;
                ret.push(std::mem::take(&mut current));
            }
            '\'' if current.is_empty() => in_quotes = true,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    ret.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        ret.push(current);
    }
    ret
}

#[cfg(test)]
mod stream_test {
    use std::collections::HashSet;

    use crate::{
        event_log::{
            import_xes::build_ignore_attributes,
            stream_xes::{parse_classifier_key, stream_xes_slice},
            AttributeValue, XESEditableAttribute,
        },
        XESImportOptions, XESParseError,
    };

    #[test]
    fn test_xes_stream() {
        let x = include_bytes!("tests/test_data/running-example.xes");
        let (mut stream, log_data) = stream_xes_slice(x, XESImportOptions::default()).unwrap();
        assert_eq!(log_data.extensions.len(), 4);
        assert_eq!(log_data.classifiers.len(), 2);
        let num_traces = stream.by_ref().count();
        assert_eq!(num_traces, 6);
        assert!(stream.check_for_errors().is_none());
    }

    #[test]
    fn test_streaming_variants() {
        let x = include_bytes!("tests/test_data/running-example.xes");
        let (mut stream, log_data) = stream_xes_slice(x, XESImportOptions::default()).unwrap();
        let classifier = log_data
            .classifiers
            .iter()
            .find(|c| c.name == "Activity")
            .unwrap();
        stream.set_options(XESImportOptions {
            ignore_event_attributes_except: Some(build_ignore_attributes(&classifier.keys)),
            ignore_trace_attributes_except: Some(build_ignore_attributes(Vec::<&str>::new())),
            ..XESImportOptions::default()
        });
        let traces: Vec<_> = stream.by_ref().collect();
        assert!(traces.iter().all(|t| t.attributes.is_empty()));
        assert!(traces
            .iter()
            .flat_map(|t| t.events.iter())
            .all(|e| e.attributes.len() == 1));
        let trace_variants: HashSet<Vec<String>> = traces
            .iter()
            .map(|t| {
                t.events
                    .iter()
                    .map(|ev| classifier.get_class_identity(ev))
                    .collect()
            })
            .collect();
        assert_eq!(trace_variants.len(), 5);
        let example_variant: Vec<String> = vec![
            "register request",
            "examine casually",
            "check ticket",
            "decide",
            "reinitiate request",
            "examine thoroughly",
            "check ticket",
            "decide",
            "pay compensation",
        ]
        .into_iter()
        .map(|s| s.to_string())
        .collect();
        assert!(trace_variants.contains(&example_variant));
    }

    #[test]
    fn test_empty_trace_before_log_data_consumed() {
        let xes = r#"<?xml version="1.0" encoding="UTF-8"?>
            <log xes.version="2.0">
                <string key="concept:name" value="tiny"/>
                <trace/>
                <trace><event><string key="concept:name" value="a"/></event></trace>
            </log>"#;
        let (mut stream, log_data) =
            stream_xes_slice(xes.as_bytes(), XESImportOptions::default()).unwrap();
        assert_eq!(log_data.log_attributes.len(), 1);
        let traces: Vec<_> = stream.by_ref().collect();
        assert!(stream.check_for_errors().is_none());
        assert_eq!(traces.len(), 2);
        assert!(traces[0].events.is_empty());
        assert_eq!(traces[1].events.len(), 1);
    }

    #[test]
    fn test_nested_list_and_container() {
        let xes = r#"<log>
            <trace>
                <list key="items">
                    <values>
                        <int key="item" value="1"/>
                        <int key="item" value="2"/>
                    </values>
                </list>
                <container key="meta">
                    <string key="a" value="x"/>
                    <list key="inner">
                        <boolean key="flag" value="true"/>
                    </list>
                </container>
                <string key="with children" value="parent">
                    <string key="child" value="c"/>
                </string>
            </trace>
        </log>"#;
        let (mut stream, _) =
            stream_xes_slice(xes.as_bytes(), XESImportOptions::default()).unwrap();
        let trace = stream.next().unwrap();
        assert!(stream.check_for_errors().is_none());
        let items = trace.attributes.get_by_key("items").unwrap();
        assert_eq!(
            items.value.try_as_list().map(|l| l.len()),
            Some(2),
            "{items:?}"
        );
        let meta = trace
            .attributes
            .get_by_key("meta")
            .and_then(|a| a.value.try_as_container())
            .unwrap();
        assert_eq!(meta.len(), 2);
        assert_eq!(
            meta.get_by_key("inner")
                .and_then(|a| a.value.try_as_list())
                .map(|l| l[0].value.clone()),
            Some(AttributeValue::Boolean(true))
        );
        let parent = trace.attributes.get_by_key("with children").unwrap();
        assert_eq!(parent.own_attributes.as_ref().map(|a| a.len()), Some(1));
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let xes = r#"<log><trace><event>
            <int key="i" value="not a number"/>
            <date key="d" value="yesterday"/>
            <boolean key="b" value="1"/>
        </event></trace></log>"#;
        let (mut stream, _) =
            stream_xes_slice(xes.as_bytes(), XESImportOptions::default()).unwrap();
        let trace = stream.next().unwrap();
        let ev = &trace.events[0];
        assert_eq!(ev.attributes[0].value, AttributeValue::Int(0));
        assert_eq!(ev.attributes[1].value, AttributeValue::None());
        assert_eq!(ev.attributes[2].value, AttributeValue::Boolean(true));
    }

    #[test]
    fn test_sort_events_by_timestamp() {
        let xes = r#"<log>
            <global scope="event"><date key="time:timestamp" value="1970-01-01T00:00:00+00:00"/></global>
            <trace>
                <event><string key="concept:name" value="b"/><date key="time:timestamp" value="2020-01-02T00:00:00+00:00"/></event>
                <event><string key="concept:name" value="a"/><date key="time:timestamp" value="2020-01-01T00:00:00+00:00"/></event>
                <event><string key="concept:name" value="start"/></event>
            </trace>
        </log>"#;
        let (mut stream, _) = stream_xes_slice(
            xes.as_bytes(),
            XESImportOptions {
                sort_events_with_timestamp_key: Some("time:timestamp".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        let trace = stream.next().unwrap();
        let activities: Vec<String> = trace
            .events
            .iter()
            .map(|e| e.attributes.get_by_key("concept:name").unwrap().value.to_string())
            .collect();
        assert_eq!(activities, vec!["start", "a", "b"]);
    }

    #[test]
    fn test_unbalanced_xml_is_error() {
        let xes = r#"<log><trace><event></trace></log>"#;
        let (mut stream, _) =
            stream_xes_slice(xes.as_bytes(), XESImportOptions::default()).unwrap();
        assert_eq!(stream.by_ref().count(), 0);
        assert!(matches!(
            stream.check_for_errors(),
            Some(XESParseError::XMLParsingError(_))
        ));
    }

    #[test]
    fn test_elements_without_key_are_skipped() {
        let xes = r#"<log><trace><event>
            <string value="x"/>
            <string key="a" value="y"/>
            <container><string key="inner" value="z"/></container>
        </event></trace></log>"#;
        let log = crate::import_xes_str(xes, XESImportOptions::default()).unwrap();
        let keys: Vec<&str> = log.traces[0].events[0]
            .attributes
            .iter()
            .map(|a| a.key.as_str())
            .collect();
        assert_eq!(keys, vec!["a"]);
    }

    #[test]
    fn test_attribute_after_log_is_error() {
        for xes in [
            r#"<log></log><string key="a" value="x"/>"#,
            r#"<log></log><string key="a" value="x"></string>"#,
        ] {
            let err = stream_xes_slice(xes.as_bytes(), XESImportOptions::default()).unwrap_err();
            assert!(matches!(err, XESParseError::AttributeOutsideLog), "{xes}: {err:?}");
        }
    }

    #[test]
    fn test_parse_classifier_key() {
        assert_eq!(
            parse_classifier_key("concept:name lifecycle:transition"),
            vec!["concept:name", "lifecycle:transition"]
        );
        assert_eq!(
            parse_classifier_key("'Activity code'  lifecycle:transition 'a b c'"),
            vec!["Activity code", "lifecycle:transition", "a b c"]
        );
        assert_eq!(parse_classifier_key("o'clock"), vec!["o'clock"]);
        assert_eq!(
            parse_classifier_key(r"'it\'s x' 'a\\b'"),
            vec!["it's x", r"a\b"]
        );
        assert!(parse_classifier_key("   ").is_empty());
    }
}
