use std::fmt::Display;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::constants::ACTIVITY_NAME;
use super::stream_xes::XESOuterLogData;

///
/// Possible attribute values according to the XES Standard
///
/// Tip: If you know the expected `AttributeValue` type, make use of the `try_as_xxx` functions (e.g., [`AttributeValue::try_as_string`])
///
/// ```rust
/// use xes_log::event_log::AttributeValue;
/// let v = AttributeValue::Float(42.0);
///
/// let f = v.try_as_float().unwrap();
/// assert_eq!(*f,42.0);
/// ```
///
/// [`AttributeValue`] implements [`Display`] and thus `to_string()`.
/// For container/list attribute values, a debug representation String is returned.
/// For None attribute values, the String `"None"` is returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "content")]
pub enum AttributeValue {
    /// String values
    String(String),
    /// `DateTime` values (the UTC offset found in the XES file is kept)
    Date(DateTime<FixedOffset>),
    /// Integer values
    Int(i64),
    /// Float values
    Float(f64),
    /// Boolean values
    Boolean(bool),
    /// IDs (UUIDs)
    ID(Uuid),
    /// List of other Attributes (where order matters; might contain multiple child attributes with the same key)
    ///
    /// _Note_: Lists should _not_ have nested attributes in the `own_attributes` field, but ONLY in the inner [`Vec<Attribute>`]
    List(Vec<Attribute>),
    /// Container of other Attributes (where order does not matter)
    ///
    /// _Note_: Containers should _not_ have nested attributes in the `own_attributes` field, but ONLY in the inner [`Attributes`]
    Container(Attributes),
    /// Used to represent invalid values (e.g., `DateTime` which could not be parsed)
    None(),
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::String(s) => write!(f, "{s}"),
            AttributeValue::Date(date_time) => write!(f, "{}", date_time.to_rfc3339()),
            AttributeValue::Int(i) => write!(f, "{i}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::Boolean(b) => write!(f, "{b}"),
            AttributeValue::ID(uuid) => write!(f, "{uuid}"),
            AttributeValue::List(attributes) => write!(f, "{attributes:?}"),
            AttributeValue::Container(attributes) => write!(f, "{attributes:?}"),
            AttributeValue::None() => write!(f, "None"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T> From<DateTime<T>> for AttributeValue
where
    T: chrono::TimeZone,
{
    fn from(value: DateTime<T>) -> Self {
        Self::Date(value.fixed_offset())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Uuid> for AttributeValue {
    fn from(value: Uuid) -> Self {
        Self::ID(value)
    }
}

impl From<Vec<Attribute>> for AttributeValue {
    fn from(value: Vec<Attribute>) -> Self {
        Self::List(value)
    }
}

impl AttributeValue {
    ///
    /// Name of the XES element used for this value (e.g., `string` or `date`)
    ///
    /// [`AttributeValue::None`] is written as `string`.
    ///
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::String(_) | AttributeValue::None() => "string",
            AttributeValue::Date(_) => "date",
            AttributeValue::Int(_) => "int",
            AttributeValue::Float(_) => "float",
            AttributeValue::Boolean(_) => "boolean",
            AttributeValue::ID(_) => "id",
            AttributeValue::List(_) => "list",
            AttributeValue::Container(_) => "container",
        }
    }

    ///
    /// Try to get attribute value as String
    ///
    /// Returns `Some()` of inner value if value is of variant [`AttributeValue::String`] and `None` otherwise
    ///
    pub fn try_as_string(&self) -> Option<&String> {
        match self {
            AttributeValue::String(v) => Some(v),
            _ => None,
        }
    }
    ///
    /// Try to get attribute value as date
    ///
    /// Returns `Some()` of inner value if value is of variant [`AttributeValue::Date`] and `None` otherwise
    ///
    pub fn try_as_date(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            AttributeValue::Date(v) => Some(v),
            _ => None,
        }
    }
    ///
    /// Try to get attribute value as int
    ///
    /// Returns `Some()` of inner value if value is of variant [`AttributeValue::Int`] and `None` otherwise
    ///
    pub fn try_as_int(&self) -> Option<&i64> {
        match self {
            AttributeValue::Int(v) => Some(v),
            _ => None,
        }
    }
    ///
    /// Try to get attribute value as float
    ///
    /// Returns `Some()` of inner value if value is of variant [`AttributeValue::Float`] and `None` otherwise
    ///
    pub fn try_as_float(&self) -> Option<&f64> {
        match self {
            AttributeValue::Float(v) => Some(v),
            _ => None,
        }
    }
    ///
    /// Try to get attribute value as bool
    ///
    /// Returns `Some()` of inner value if value is of variant [`AttributeValue::Boolean`] and `None` otherwise
    ///
    pub fn try_as_bool(&self) -> Option<&bool> {
        match self {
            AttributeValue::Boolean(v) => Some(v),
            _ => None,
        }
    }
    ///
    /// Try to get attribute value as [`Uuid`]
    ///
    /// Returns `Some()` of inner value if value is of variant [`AttributeValue::ID`] and `None` otherwise
    ///
    pub fn try_as_uuid(&self) -> Option<&Uuid> {
        match self {
            AttributeValue::ID(v) => Some(v),
            _ => None,
        }
    }
    ///
    /// Try to get attribute value as list (i.e., nested XES attribute list)
    ///
    /// Returns `Some()` of inner value if value is of variant [`AttributeValue::List`] and `None` otherwise
    ///
    pub fn try_as_list(&self) -> Option<&Vec<Attribute>> {
        match self {
            AttributeValue::List(v) => Some(v),
            _ => None,
        }
    }
    ///
    /// Try to get attribute value as container (i.e., nested XES attributes)
    ///
    /// Returns `Some()` of inner value if value is of variant [`AttributeValue::Container`] and `None` otherwise
    ///
    pub fn try_as_container(&self) -> Option<&Vec<Attribute>> {
        match self {
            AttributeValue::Container(v) => Some(v),
            _ => None,
        }
    }
}

///
/// Attribute made up of the key and value
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attribute {
    /// Attribute key
    pub key: String,
    /// Attribute value
    pub value: AttributeValue,
    /// Child attributes (nested)
    pub own_attributes: Option<Attributes>,
}

impl Attribute {
    ///
    /// Helper to create a new attribute
    ///
    pub fn new(key: String, attribute_val: AttributeValue) -> Self {
        Self {
            key,
            value: attribute_val,
            own_attributes: None,
        }
    }
}

///
/// Attributes are [`Vec`]s of [`Attribute`]s
///
/// The order of attributes is kept exactly as read from (and written to) XES.
/// See the [`XESEditableAttribute`] trait for convenient functions to add, edit or remove attribute by keys.
///
/// ```rust
/// use xes_log::event_log::{Attribute, AttributeValue, XESEditableAttribute};
/// let attrs = vec![Attribute::new("key".to_string(), AttributeValue::Float(42.0))];
///
/// let f = attrs.get_by_key("key").and_then(|a| a.value.try_as_float()).unwrap();
/// assert_eq!(*f,42.0);
/// ```
pub type Attributes = Vec<Attribute>;

///
/// Trait to easily add and update attributes
///
pub trait XESEditableAttribute {
    ///
    /// Add a new attribute (with key and value)
    ///
    /// Note: Does _not_ check if attribute was already present and does _not_ sort attributes wrt. key.
    ///
    fn add_to_attributes(&mut self, key: String, value: AttributeValue);
    ///
    /// Add a new attribute
    ///
    fn add_attribute(&mut self, attr: Attribute);
    ///
    /// Get an attribute by key
    ///
    /// _Complexity_: Does linear lookup (i.e., in O(n)).
    fn get_by_key(&self, key: &str) -> Option<&Attribute>;
    ///
    /// Get an attribute as mutable by key
    ///
    /// _Complexity_: Does linear lookup (i.e., in O(n)).
    fn get_by_key_mut(&mut self, key: &str) -> Option<&mut Attribute>;
    ///
    /// Get an attribute by key or the default value (e.g., provided by global event or trace attributes)
    ///
    /// _Complexity_: Does linear lookup (i.e., in O(n)).
    fn get_by_key_or_global<'a>(
        &'a self,
        key: &str,
        global_attrs: &'a Option<Attributes>,
    ) -> Option<&'a Attribute>;
    ///
    /// Remove attribute with given key
    ///
    /// Returns `true` if the attribute was present and `false` otherwise
    ///
    fn remove_with_key(&mut self, key: &str) -> bool;
}

impl XESEditableAttribute for Attributes {
    fn add_to_attributes(&mut self, key: String, value: AttributeValue) {
        self.push(Attribute::new(key, value));
    }

    fn add_attribute(&mut self, a: Attribute) {
        self.push(a);
    }

    fn get_by_key(&self, key: &str) -> Option<&Attribute> {
        self.iter().find(|attr| attr.key == key)
    }

    fn get_by_key_mut(&mut self, key: &str) -> Option<&mut Attribute> {
        self.iter_mut().find(|attr| attr.key == key)
    }

    fn get_by_key_or_global<'a>(
        &'a self,
        key: &str,
        global_attrs: &'a Option<Attributes>,
    ) -> Option<&'a Attribute> {
        self.get_by_key(key).or_else(|| {
            global_attrs
                .as_ref()
                .and_then(|global_attrs| global_attrs.get_by_key(key))
        })
    }

    fn remove_with_key(&mut self, key: &str) -> bool {
        if let Some(index) = self.iter().position(|a| a.key == key) {
            self.remove(index);
            return true;
        }
        false
    }
}

///
/// An event consists of multiple (event) attributes ([Attributes])
///
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Event attributes
    pub attributes: Attributes,
}

impl Event {
    /// Create a new event with the provided activity
    ///
    /// Implicitly assumes usage of the concept XES extension (i.e., uses [`ACTIVITY_NAME`] as key)
    pub fn new(activity: String) -> Self {
        Event {
            attributes: vec![Attribute::new(
                ACTIVITY_NAME.to_string(),
                AttributeValue::String(activity),
            )],
        }
    }
}

///
/// A trace consists of a list of events and trace attributes (See also [`Event`] and [`Attributes`])
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Trace {
    /// Trace-level attributes
    pub attributes: Attributes,
    /// Events contained in trace
    pub events: Vec<Event>,
}

impl Trace {
    /// Initializes a new trace with no attributes and events
    pub fn new() -> Self {
        Self::default()
    }
}

///
/// Event log consisting of a list of [`Trace`]s and log [`Attributes`]
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EventLog {
    /// Top-level attributes
    pub attributes: Attributes,
    /// Traces contained in log
    pub traces: Vec<Trace>,
    /// XES Extensions
    pub extensions: Option<Vec<EventLogExtension>>,
    /// XES Event classifiers
    pub classifiers: Option<Vec<EventLogClassifier>>,
    /// Global trace attributes
    pub global_trace_attrs: Option<Attributes>,
    ///  Global event attributes
    pub global_event_attrs: Option<Attributes>,
}

impl EventLog {
    /// Initializes a new, empty event log
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of events over all traces
    pub fn num_events(&self) -> usize {
        self.traces.iter().map(|t| t.events.len()).sum()
    }

    ///
    /// Try to get the [`EventLogClassifier`] with the associated name
    ///
    pub fn get_classifier_by_name<S>(&self, name: S) -> Option<EventLogClassifier>
    where
        std::string::String: PartialEq<S>,
    {
        self.classifiers
            .as_ref()
            .and_then(|classifiers| classifiers.iter().find(|c| c.name == name).cloned())
    }

    ///
    /// Get a trace attribute value using a key
    ///
    /// Uses global trace attributes of the event log (if any) as fallback
    ///
    pub fn get_trace_attribute<'a>(&'a self, trace: &'a Trace, key: &str) -> Option<&'a Attribute> {
        trace
            .attributes
            .get_by_key_or_global(key, &self.global_trace_attrs)
    }

    ///
    /// Get an event attribute value using a key
    ///
    /// Uses global event attributes of the event log (if any) as fallback
    ///
    pub fn get_event_attribute<'a>(&'a self, event: &'a Event, key: &str) -> Option<&'a Attribute> {
        event
            .attributes
            .get_by_key_or_global(key, &self.global_event_attrs)
    }

    ///
    /// Construct an [`EventLog`] from list of [`Trace`]s and [`XESOuterLogData`]
    ///
    /// This is useful in combination with streaming XES import when traces are filtered/pre-processed directly
    ///
    pub fn from_traces_and_log_data(traces: Vec<Trace>, log_data: XESOuterLogData) -> Self {
        EventLog {
            attributes: log_data.log_attributes,
            traces,
            extensions: Some(log_data.extensions),
            classifiers: Some(log_data.classifiers),
            // Only put global_trace_attrs / global_event_attrs to log data if it is not empty
            global_trace_attrs: if log_data.global_trace_attrs.is_empty() {
                None
            } else {
                Some(log_data.global_trace_attrs)
            },
            global_event_attrs: if log_data.global_event_attrs.is_empty() {
                None
            } else {
                Some(log_data.global_event_attrs)
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// An XES Extension
pub struct EventLogExtension {
    /// Extension name
    pub name: String,
    /// Prefix of attributes defined by the extension
    pub prefix: String,
    /// URI pointing to XESEXT of the XES extension
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Event classifier
///
/// Enables classifying events by a set of attributes to consider for the _class identity_
pub struct EventLogClassifier {
    /// Name of the classifier
    pub name: String,
    /// List of attribute keys to consider for the _class identity_
    pub keys: Vec<String>,
}

impl Default for EventLogClassifier {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            keys: vec![ACTIVITY_NAME.to_string()],
        }
    }
}

impl EventLogClassifier {
    /// Delimiter for combining the values defined by the classifer to form a single class identity string
    pub const DELIMITER: &'static str = "+";
    ///
    /// Get the class identity (joined with [`EventLogClassifier::DELIMITER`])
    ///
    /// Missing attributes and attributes with a type different than [`AttributeValue::String`] are represented by an empty String.
    ///
    pub fn get_class_identity(&self, ev: &Event) -> String {
        self.get_class_identity_with_globals(ev, &None)
    }
    ///
    /// Get the class identity (joined with [`EventLogClassifier::DELIMITER`]) using the global event attributes for default values
    ///
    /// Missing attributes and attributes with a type different than [`AttributeValue::String`] are represented by an empty String.
    ///
    pub fn get_class_identity_with_globals(
        &self,
        ev: &Event,
        global_attrs: &Option<Attributes>,
    ) -> String {
        self.keys
            .iter()
            .map(|k| {
                ev.attributes
                    .get_by_key_or_global(k, global_attrs)
                    .and_then(|at| at.value.try_as_string())
                    .map(String::as_str)
                    .unwrap_or_default()
            })
            .collect::<Vec<&str>>()
            .join(EventLogClassifier::DELIMITER)
    }
}
