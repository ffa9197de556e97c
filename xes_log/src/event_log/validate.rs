use std::fmt;

use rayon::prelude::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use thiserror::Error;

use super::{
    event_log_struct::EventLogExtension, Attribute, Attributes, EventLog, Trace,
    XESEditableAttribute,
};

/// Position of a trace (and optionally an event in it) in a log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Index of the trace
    pub trace: usize,
    /// Index of the event inside the trace (`None` for trace attributes)
    pub event: Option<usize>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.event {
            Some(event) => write!(f, "trace {}, event {}", self.trace, event),
            None => write!(f, "trace {}", self.trace),
        }
    }
}

/// Violation of a global attribute declaration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A globally declared attribute is missing
    #[error("{location}: couldn't find an attribute with key {key:?}")]
    MissingAttribute {
        /// Where the attribute is missing
        location: Location,
        /// Key of the global attribute
        key: String,
    },
    /// An attribute has a different type than its global declaration
    #[error("{location}: expected {key:?} to be of type {expected} but got {actual} instead")]
    WrongType {
        /// Where the attribute was found
        location: Location,
        /// Key of the global attribute
        key: String,
        /// XES type of the global attribute
        expected: &'static str,
        /// XES type of the found attribute
        actual: &'static str,
    },
    /// An attribute defined by a declared extension has a different type than the extension defines
    #[error(
        "{location}: {extension} extension expects {key:?} to be of type {expected} but got {actual} instead"
    )]
    ExtensionType {
        /// Where the attribute was found
        location: Location,
        /// Name of the extension
        extension: &'static str,
        /// Key of the attribute
        key: String,
        /// XES type defined by the extension
        expected: &'static str,
        /// XES type of the found attribute
        actual: &'static str,
    },
}

///
/// Standard XES extension with checked attribute semantics
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownExtension {
    /// `concept` (names and instances)
    Concept,
    /// `time` (timestamps)
    Time,
    /// `org` (resources, roles and groups)
    Organizational,
}

impl KnownExtension {
    /// Extension declared with the given prefix, if supported
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "concept" => Some(Self::Concept),
            "time" => Some(Self::Time),
            "org" => Some(Self::Organizational),
            _ => None,
        }
    }

    /// Name of the extension
    pub fn name(self) -> &'static str {
        match self {
            Self::Concept => "Concept",
            Self::Time => "Time",
            Self::Organizational => "Organizational",
        }
    }

    fn trace_keys(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Concept => &[("concept:name", "string")],
            Self::Time | Self::Organizational => &[],
        }
    }

    fn event_keys(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Concept => &[("concept:name", "string"), ("concept:instance", "string")],
            Self::Time => &[("time:timestamp", "date")],
            Self::Organizational => &[
                ("org:resource", "string"),
                ("org:role", "string"),
                ("org:group", "string"),
            ],
        }
    }
}

///
/// Resolve declared extensions to the ones whose semantics can be checked
///
/// Unsupported extensions are logged and skipped.
///
pub fn known_extensions(extensions: &[EventLogExtension]) -> Vec<KnownExtension> {
    let mut known = Vec::new();
    for ext in extensions {
        match KnownExtension::from_prefix(&ext.prefix) {
            Some(k) if !known.contains(&k) => known.push(k),
            Some(_) => {}
            None => log::warn!(
                "{:?} extension is not supported and therefore not validated",
                ext.name
            ),
        }
    }
    known
}

fn check_extension_attributes(
    location: Location,
    attributes: &Attributes,
    extension: KnownExtension,
    keys: &[(&'static str, &'static str)],
    errors: &mut Vec<ValidationError>,
) {
    for &(key, expected) in keys {
        if let Some(attr) = attributes.get_by_key(key) {
            let actual = attr.value.type_name();
            if actual != expected {
                errors.push(ValidationError::ExtensionType {
                    location,
                    extension: extension.name(),
                    key: key.to_string(),
                    expected,
                    actual,
                });
            }
        }
    }
}

fn check_attributes(
    location: Location,
    attributes: &Attributes,
    globals: &[Attribute],
    errors: &mut Vec<ValidationError>,
) {
    for global in globals {
        match attributes.get_by_key(&global.key) {
            None => errors.push(ValidationError::MissingAttribute {
                location,
                key: global.key.clone(),
            }),
            Some(attr) if attr.value.type_name() != global.value.type_name() => {
                errors.push(ValidationError::WrongType {
                    location,
                    key: global.key.clone(),
                    expected: global.value.type_name(),
                    actual: attr.value.type_name(),
                })
            }
            Some(_) => {}
        }
    }
}

///
/// Check a single trace (and its events) against global trace and event attributes
/// and the attribute types defined by the declared `extensions`
///
/// Used for streamed traces, where no complete [`EventLog`] is available.
///
pub fn validate_trace(
    trace_index: usize,
    trace: &Trace,
    global_trace_attrs: &[Attribute],
    global_event_attrs: &[Attribute],
    extensions: &[KnownExtension],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let location = Location {
        trace: trace_index,
        event: None,
    };
    check_attributes(location, &trace.attributes, global_trace_attrs, &mut errors);
    for &ext in extensions {
        check_extension_attributes(
            location,
            &trace.attributes,
            ext,
            ext.trace_keys(),
            &mut errors,
        );
    }
    for (event_index, event) in trace.events.iter().enumerate() {
        let location = Location {
            trace: trace_index,
            event: Some(event_index),
        };
        check_attributes(location, &event.attributes, global_event_attrs, &mut errors);
        for &ext in extensions {
            check_extension_attributes(
                location,
                &event.attributes,
                ext,
                ext.event_keys(),
                &mut errors,
            );
        }
    }
    errors
}

///
/// Validate that all traces and events carry the attributes declared as global,
/// with the type of the global default value
///
/// Attributes of the declared `concept`, `time` and `org` extensions are also checked
/// for the types these extensions define.
///
/// Returns all violations, ordered by trace and event.
///
pub fn validate_globals(log: &EventLog) -> Result<(), Vec<ValidationError>> {
    let global_trace_attrs = log.global_trace_attrs.as_deref().unwrap_or_default();
    let global_event_attrs = log.global_event_attrs.as_deref().unwrap_or_default();
    let extensions = known_extensions(log.extensions.as_deref().unwrap_or_default());
    if global_trace_attrs.is_empty() && global_event_attrs.is_empty() && extensions.is_empty() {
        return Ok(());
    }
    let errors: Vec<ValidationError> = log
        .traces
        .par_iter()
        .enumerate()
        .flat_map_iter(|(i, trace)| {
            validate_trace(
                i,
                trace,
                global_trace_attrs,
                global_event_attrs,
                &extensions,
            )
        })
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        event_log::AttributeValue, import_xes_file, import_xes_str,
        utils::test_utils::get_test_data_path, XESImportOptions,
    };

    #[test]
    fn test_running_example_is_valid() {
        let log = import_xes_file(
            get_test_data_path().join("running-example.xes"),
            XESImportOptions::default(),
        )
        .unwrap();
        assert_eq!(validate_globals(&log), Ok(()));
    }

    #[test]
    fn test_globals_violations() {
        let mut log = crate::event_log!(
            ["a"; {"org:resource" => "Pete"}, "b"; {"org:resource" => 5_i64}],
            ["c"],
        );
        log.global_event_attrs = Some(crate::attributes!("org:resource" => "UNKNOWN"));
        log.global_trace_attrs = Some(crate::attributes!("concept:name" => "__INVALID__"));

        let errors = validate_globals(&log).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::WrongType {
                    location: Location {
                        trace: 0,
                        event: Some(1)
                    },
                    key: "org:resource".to_string(),
                    expected: "string",
                    actual: "int",
                },
                ValidationError::MissingAttribute {
                    location: Location {
                        trace: 1,
                        event: Some(0)
                    },
                    key: "org:resource".to_string(),
                },
            ]
        );
        assert_eq!(
            errors[0].to_string(),
            r#"trace 0, event 1: expected "org:resource" to be of type string but got int instead"#
        );
        assert_eq!(
            errors[1].to_string(),
            r#"trace 1, event 0: couldn't find an attribute with key "org:resource""#
        );
    }

    #[test]
    fn test_missing_trace_attribute() {
        let trace = crate::trace!("a");
        let globals = vec![Attribute::new(
            "concept:name".to_string(),
            AttributeValue::String("__INVALID__".to_string()),
        )];
        let errors = validate_trace(3, &trace, &globals, &[], &[]);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            r#"trace 3: couldn't find an attribute with key "concept:name""#
        );
    }

    #[test]
    fn test_extension_attribute_types() {
        let log = import_xes_str(
            r#"<log>
                <extension name="Time" prefix="time" uri="http://www.xes-standard.org/time.xesext"/>
                <extension name="Lifecycle" prefix="lifecycle" uri="http://www.xes-standard.org/lifecycle.xesext"/>
                <trace>
                    <int key="concept:name" value="1"/>
                    <event><string key="time:timestamp" value="monday"/></event>
                    <event><date key="time:timestamp" value="2020-01-01T00:00:00+00:00"/></event>
                </trace>
            </log>"#,
            XESImportOptions::default(),
        )
        .unwrap();
        // The concept extension is not declared, so the int trace name is fine
        assert_eq!(
            validate_globals(&log).unwrap_err(),
            vec![ValidationError::ExtensionType {
                location: Location {
                    trace: 0,
                    event: Some(0)
                },
                extension: "Time",
                key: "time:timestamp".to_string(),
                expected: "date",
                actual: "string",
            }]
        );
    }

    #[test]
    fn test_known_extensions() {
        let ext = |prefix: &str| EventLogExtension {
            name: prefix.to_string(),
            prefix: prefix.to_string(),
            uri: String::new(),
        };
        assert_eq!(
            known_extensions(&[ext("org"), ext("lifecycle"), ext("concept"), ext("org")]),
            vec![KnownExtension::Organizational, KnownExtension::Concept]
        );
        let trace = crate::trace!("a"; {"org:resource" => 1_i64});
        let errors = validate_trace(0, &trace, &[], &[], &[KnownExtension::Organizational]);
        assert_eq!(
            errors[0].to_string(),
            r#"trace 0, event 0: Organizational extension expects "org:resource" to be of type string but got int instead"#
        );
    }
}
