use super::{
    constants::{XES_NAMESPACE, XES_VERSION},
    event_log_struct::{EventLogClassifier, EventLogExtension},
    stream_xes::{is_gz_path, XESOuterLogData},
    Attribute, AttributeValue, Attributes, Trace,
};
use crate::{utils::xml_utils::XMLWriterWrapper, EventLog};
use flate2::{write::GzEncoder, Compression};
use quick_xml::{events::BytesDecl, Writer};
use std::{
    borrow::Borrow,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
const OK: Result<(), std::io::Error> = Ok(());

///
/// Export XES (from log data and an iterator over traces) to a XML writer
///
#[allow(clippy::too_many_arguments)]
pub fn export_xes<'a, W, T: Borrow<Trace>, I>(
    writer: impl Into<XMLWriterWrapper<'a, W>>,
    log_extensions: Option<&[EventLogExtension]>,
    log_global_trace_attrs: Option<&Attributes>,
    log_global_event_attrs: Option<&Attributes>,
    log_classifiers: Option<&[EventLogClassifier]>,
    log_attributes: &Attributes,
    traces: I,
) -> Result<(), quick_xml::Error>
where
    I: Iterator<Item = T>,
    W: Write + 'a,
{
    let mut xml_writer = writer.into();
    let writer: &mut Writer<_> = xml_writer.to_xml_writer();
    writer.write_event(quick_xml::events::Event::Decl(BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        None,
    )))?;
    let mut num_traces = 0_usize;
    writer
        .create_element("log")
        .with_attributes(vec![
            ("xes.version", XES_VERSION),
            // nested-attributes are not always present, but they might be so let's just say we use them
            ("xes.features", "nested-attributes"),
            ("xmlns", XES_NAMESPACE),
        ])
        .write_inner_content(|w| {
            for ext in log_extensions.unwrap_or_default() {
                w.create_element("extension")
                    .with_attributes(vec![
                        ("name", ext.name.as_str()),
                        ("prefix", ext.prefix.as_str()),
                        ("uri", ext.uri.as_str()),
                    ])
                    .write_empty()?;
            }
            write_global(w, "trace", log_global_trace_attrs)?;
            write_global(w, "event", log_global_event_attrs)?;
            for cl in log_classifiers.unwrap_or_default() {
                w.create_element("classifier")
                    .with_attributes(vec![
                        ("name", cl.name.as_str()),
                        ("keys", &serialize_classifier(&cl.keys)),
                    ])
                    .write_empty()?;
            }
            for a in log_attributes {
                write_xes_attribute(w, a)?;
            }
            for t in traces {
                let t = t.borrow();
                w.create_element("trace").write_inner_content(|w| {
                    for a in &t.attributes {
                        write_xes_attribute(w, a)?;
                    }
                    for e in &t.events {
                        w.create_element("event").write_inner_content(|w| {
                            for a in &e.attributes {
                                write_xes_attribute(w, a)?;
                            }
                            OK
                        })?;
                    }
                    OK
                })?;
                num_traces += 1;
            }
            OK
        })?;
    writer.get_mut().flush()?;
    log::debug!("Exported XES with {num_traces} traces");
    Ok(())
}

/// Write a `<global>` section, skipping it if there are no global attributes
fn write_global<W: Write>(
    w: &mut Writer<W>,
    scope: &str,
    attrs: Option<&Attributes>,
) -> Result<(), std::io::Error> {
    let Some(attrs) = attrs.filter(|attrs| !attrs.is_empty()) else {
        return OK;
    };
    w.create_element("global")
        .with_attribute(("scope", scope))
        .write_inner_content(|w| {
            for a in attrs {
                write_xes_attribute(w, a)?;
            }
            OK
        })?;
    OK
}

fn write_xes_attribute<T>(w: &mut Writer<T>, a: &Attribute) -> Result<(), std::io::Error>
where
    T: Write,
{
    let value: Option<String> = match &a.value {
        AttributeValue::String(s) => Some(s.clone()),
        AttributeValue::Date(d) => Some(d.to_rfc3339()),
        AttributeValue::Int(i) => Some(i.to_string()),
        AttributeValue::Float(f) => Some(f.to_string()),
        AttributeValue::Boolean(b) => Some(b.to_string()),
        AttributeValue::ID(id) => Some(id.to_string()),
        AttributeValue::List(_) | AttributeValue::Container(_) | AttributeValue::None() => None,
    };
    let e = match &value {
        Some(value) => w
            .create_element(a.value.type_name())
            .with_attributes(vec![("key", a.key.as_str()), ("value", value.as_str())]),
        None => w
            .create_element(a.value.type_name())
            .with_attribute(("key", a.key.as_str())),
    };
    let children = match &a.value {
        AttributeValue::List(c) | AttributeValue::Container(c) => Some(c),
        _ => a.own_attributes.as_ref(),
    };
    match children {
        Some(children) => {
            e.write_inner_content(|inner_w| {
                for attr in children {
                    write_xes_attribute(inner_w, attr)?;
                }
                OK
            })?;
        }
        None => {
            e.write_empty()?;
        }
    }
    OK
}

///
/// Export an [`EventLog`] to a writer
///
/// Both [`quick_xml::Writer`] as well as [`std::io::Write`] are accepted
///
pub fn export_xes_event_log<'a, W>(
    writer: impl Into<XMLWriterWrapper<'a, W>>,
    log: &EventLog,
) -> Result<(), quick_xml::Error>
where
    W: Write + 'a,
{
    export_xes(
        writer,
        log.extensions.as_deref(),
        log.global_trace_attrs.as_ref(),
        log.global_event_attrs.as_ref(),
        log.classifiers.as_deref(),
        &log.attributes,
        log.traces.iter(),
    )
}

/// Flush the buffered gz encoder and write the gzip trailer
fn finish_gz<W: Write>(writer: BufWriter<GzEncoder<W>>) -> Result<(), std::io::Error> {
    let encoder = writer.into_inner().map_err(|e| e.into_error())?;
    encoder.finish()?.flush()
}

/// Export an [`EventLog`] to a [`File`]
///
/// If `compress_gz` is `true`, the XES will be gzip-compressed
pub fn export_xes_event_log_to_file(
    log: &EventLog,
    file: File,
    compress_gz: bool,
) -> Result<(), quick_xml::Error> {
    if compress_gz {
        let encoder = GzEncoder::new(BufWriter::new(file), Compression::fast());
        let mut writer = Writer::new(BufWriter::new(encoder));
        export_xes_event_log(&mut writer, log)?;
        finish_gz(writer.into_inner())?;
        return Ok(());
    }
    export_xes_event_log(&mut Writer::new(BufWriter::new(file)), log)
}

/// Export an [`EventLog`] to a filepath
///
/// Automatically selects gz-compression if filepath ends with `.gz`
///
/// See also [`export_xes_event_log_to_file`], which accepts a [`File`] and boolean flag for gz-compression.
pub fn export_xes_event_log_to_file_path<P: AsRef<Path>>(
    log: &EventLog,
    path: P,
) -> Result<(), quick_xml::Error> {
    let path = path.as_ref();
    let file = File::create(path)?;
    export_xes_event_log_to_file(log, file, is_gz_path(path))
}

/// Export a trace stream (i.e., [`Iterator`] over [`Trace`]) and [`XESOuterLogData`] to a XML [`Writer`]
pub fn export_xes_trace_stream<'a, W, T: Borrow<Trace>, I>(
    writer: impl Into<XMLWriterWrapper<'a, W>>,
    trace_stream: I,
    log_data: XESOuterLogData,
) -> Result<(), quick_xml::Error>
where
    W: Write + 'a,
    I: Iterator<Item = T>,
{
    export_xes(
        writer,
        Some(log_data.extensions.as_slice()),
        Some(&log_data.global_trace_attrs),
        Some(&log_data.global_event_attrs),
        Some(log_data.classifiers.as_slice()),
        &log_data.log_attributes,
        trace_stream,
    )
}

/// Export a trace stream (i.e., [`Iterator`] over [`Trace`]) and [`XESOuterLogData`] to a [`File`]
///
/// If `compress_gz` is `true`, the XES will be compressed to a `.xes.gz` file before writing to file
pub fn export_xes_trace_stream_to_file<T: Borrow<Trace>, I>(
    trace_stream: I,
    log_data: XESOuterLogData,
    file: File,
    compress_gz: bool,
) -> Result<(), quick_xml::Error>
where
    I: Iterator<Item = T>,
{
    if compress_gz {
        let encoder = GzEncoder::new(BufWriter::new(file), Compression::fast());
        let mut writer = Writer::new(BufWriter::new(encoder));
        export_xes_trace_stream(&mut writer, trace_stream, log_data)?;
        finish_gz(writer.into_inner())?;
        return Ok(());
    }
    export_xes_trace_stream(
        &mut Writer::new(BufWriter::new(file)),
        trace_stream,
        log_data,
    )
}

fn needs_quotes(key: &str) -> bool {
    key.is_empty() || key.contains('\'') || key.chars().any(char::is_whitespace)
}

///
/// Join classifier keys with spaces, quoting all keys if any of them needs quotes
///
/// Inside quotes, `'` and `\` are escaped with a backslash (reversed by [`super::stream_xes::parse_classifier_key`]).
///
fn serialize_classifier(classifier_keys: &[String]) -> String {
    if !classifier_keys.iter().any(|k| needs_quotes(k)) {
        return classifier_keys.join(" ");
    }
    classifier_keys
        .iter()
        .map(|k| format!("'{}'", k.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod export_xes_tests {
    use std::{collections::HashSet, fs::File, io::BufWriter};

    use quick_xml::Writer;

    use crate::{
        event_log::{
            event_log_struct::{EventLogClassifier, EventLogExtension},
            export_xes::{export_xes_event_log, serialize_classifier},
            stream_xes::parse_classifier_key,
            AttributeValue, XESEditableAttribute,
        },
        export_xes_event_log_to_file_path, import_xes_file, import_xes_slice,
        stream_xes_from_path,
        utils::test_utils::get_test_data_path,
        XESImportOptions,
    };

    use super::export_xes_trace_stream_to_file;

    #[test]
    fn test_xes_export_std_writer() {
        let path = get_test_data_path().join("running-example.xes");
        let log = import_xes_file(&path, XESImportOptions::default()).unwrap();
        let mut buf_writer = BufWriter::new(Vec::new());
        export_xes_event_log(&mut buf_writer, &log).unwrap();
        let data = buf_writer.into_inner().unwrap();
        let log2 = import_xes_slice(&data, false, XESImportOptions::default()).unwrap();
        assert_eq!(log.traces.len(), log2.traces.len());
        assert_eq!(log.attributes.len(), log2.attributes.len());
        assert_eq!(
            log.extensions
                .as_ref()
                .unwrap()
                .iter()
                .collect::<HashSet<&EventLogExtension>>(),
            log2.extensions
                .as_ref()
                .unwrap()
                .iter()
                .collect::<HashSet<&EventLogExtension>>()
        );

        // The below assumes that also all orders of events, traces, log attributes, extensions etc. must be the same
        assert!(log2 == log);
    }

    #[test]
    fn test_xes_export_xml_writer() {
        let path = get_test_data_path().join("running-example.xes");
        let log = import_xes_file(&path, XESImportOptions::default()).unwrap();
        let mut writer = Writer::new(Vec::new());
        export_xes_event_log(&mut writer, &log).unwrap();
        let data = writer.into_inner();
        let text = String::from_utf8(data.clone()).unwrap();
        assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(text.contains(r#"xes.features="nested-attributes""#));
        // Escaped on export, unescaped again on import
        assert!(text.contains("Wil &amp; Co"));
        let log2 = import_xes_slice(&data, false, XESImportOptions::default()).unwrap();
        assert_eq!(log2, log);
    }

    #[test]
    fn test_export_gz_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let log = import_xes_file(
            get_test_data_path().join("running-example.xes"),
            XESImportOptions::default(),
        )
        .unwrap();
        let out = dir.path().join("out.xes.gz");
        export_xes_event_log_to_file_path(&log, &out).unwrap();
        let bytes = std::fs::read(&out).unwrap();
        // gzip magic number
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
        let log2 = import_xes_file(&out, XESImportOptions::default()).unwrap();
        assert_eq!(log2, log);
    }

    #[test]
    fn test_stream_from_plain_to_gz() {
        let dir = tempfile::tempdir().unwrap();
        let path = get_test_data_path().join("running-example.xes");
        let (mut stream, mut log_data) =
            stream_xes_from_path(&path, XESImportOptions::default()).unwrap();
        let export_path = dir.path().join("streaming-export.xes.gz");

        let traces = stream.by_ref().map(|mut t| {
            for e in t.events.iter_mut() {
                for a in e.attributes.iter_mut() {
                    a.key = a.key.to_uppercase();
                }
            }
            t
        });
        for a in log_data.global_event_attrs.iter_mut() {
            a.key = a.key.to_uppercase();
        }
        for c in log_data.classifiers.iter_mut() {
            for k in c.keys.iter_mut() {
                *k = k.to_uppercase();
            }
        }

        export_xes_trace_stream_to_file(
            traces,
            log_data,
            File::create(&export_path).unwrap(),
            true,
        )
        .unwrap();
        assert!(stream.check_for_errors().is_none());

        let log = import_xes_file(&export_path, XESImportOptions::default()).unwrap();
        assert_eq!(log.traces.len(), 6);
        assert_eq!(log.num_events(), 42);
        assert!(log.traces[0].events[0]
            .attributes
            .get_by_key("CONCEPT:NAME")
            .is_some());
        let classifier = log.get_classifier_by_name("Activity").unwrap();
        assert_eq!(classifier.keys, vec!["CONCEPT:NAME"]);
        assert_eq!(
            log.global_event_attrs
                .as_ref()
                .and_then(|g| g.get_by_key("LIFECYCLE:TRANSITION"))
                .map(|a| &a.value),
            Some(&AttributeValue::String("complete".to_string()))
        );
    }

    #[test]
    fn test_export_classifier_keys_with_quotes_and_tabs() {
        let mut log = crate::event_log!(["a", "b"]);
        log.classifiers = Some(vec![
            EventLogClassifier {
                name: "tab".to_string(),
                keys: vec!["a\tb".to_string()],
            },
            EventLogClassifier {
                name: "quote".to_string(),
                keys: vec!["it's x".to_string(), "concept:name".to_string()],
            },
        ]);
        let mut data = Vec::new();
        export_xes_event_log(&mut data, &log).unwrap();
        let log2 = import_xes_slice(&data, false, XESImportOptions::default()).unwrap();
        assert_eq!(log2.classifiers, log.classifiers);
    }

    #[test]
    fn test_classifier_serialization() {
        // Basic tests
        assert_eq!(
            serialize_classifier(
                &["testing", "123"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
            ),
            "testing 123".to_string()
        );
        assert_eq!(
            serialize_classifier(
                &["testing 123"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
            ),
            "'testing 123'".to_string()
        );
        assert_eq!(
            serialize_classifier(&["it's".to_string(), r"a\b".to_string()]),
            r"'it\'s' 'a\\b'".to_string()
        );

        // Round-trip test (together with parse_classifier_key)
        let test_keys: Vec<Vec<String>> = vec![
            vec!["test", "key", "without", "quotes"]
                .into_iter()
                .map(|s| s.to_string())
                .collect(),
            vec!["test", "key", "with some", "quotes"]
                .into_iter()
                .map(|s| s.to_string())
                .collect(),
            parse_classifier_key("'testing 123' test key single test koo naa aaa bbb"),
            vec!["a\tb".to_string()],
            vec!["it's x".to_string(), "plain".to_string()],
            vec![r"back\slash".to_string(), "new\nline".to_string()],
            vec![String::new(), "concept:name".to_string()],
        ];
        for keys in test_keys {
            assert_eq!(keys, parse_classifier_key(&serialize_classifier(&keys)));
        }
    }
}
