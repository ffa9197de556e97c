/// Create an [`Attribute`].
///
/// An attribute is denoted by a `key => value` mapping.
///
/// # Examples
///
/// ```rust
/// use xes_log::{attribute, chrono::Utc};
///
/// let attr_1 = attribute!("concept:name" => "Approve");
/// let attr_2 = attribute!("time:timestamp" => Utc::now());
/// let attr_3 = attribute!("cost" => 2500.00);
/// ```
///
/// [`Attribute`]: crate::event_log::Attribute
#[macro_export]
macro_rules! attribute {
    ($key:expr => $val:expr) => {
        $crate::event_log::Attribute::new(
            $key.into(),
            $crate::event_log::AttributeValue::from($val),
        )
    };
}

/// Create an [`Attributes`] instance.
///
/// Attributes are denoted by a comma-separated list of `key => value` mappings.
///
/// ```rust
/// use xes_log::attributes;
///
/// let attrs = attributes!("concept:name" => "Approve", "cost" => 2500.00);
/// assert_eq!(attrs.len(), 2);
/// ```
///
/// [`Attributes`]: crate::event_log::Attributes
#[macro_export]
macro_rules! attributes {
    ($($key:expr => $value:expr),* $(,)?) => {
        vec![
            $(
                $crate::attribute!($key => $value)
            ),*
        ]
    };
}

/// Create an [`Event`] from an activity and optional attributes
/// (`{key => value, ...}`, separated from the activity by a semicolon).
///
/// ```rust
/// use xes_log::{chrono::DateTime, event};
///
/// let event_1 = event!("a");
/// let event_2 = event!("a"; {
///     "time:timestamp" => DateTime::UNIX_EPOCH,
///     "org:resource" => "John",
///     "approved" => true
/// });
/// assert_eq!(event_2.attributes.len(), 4);
/// ```
///
/// [`Event`]: crate::event_log::Event
#[macro_export]
macro_rules! event {
    ($name:expr $(; { $($key:expr => $value:expr),* $(,)? })?) => {
        $crate::event_log::Event {
            attributes: vec![
                $crate::attribute!($crate::event_log::constants::ACTIVITY_NAME => $name),
                $(
                    $(
                        $crate::attribute!($key => $value)
                    ),*
                )?
            ]
        }
    };
}

/// Create a [`Trace`].
///
/// Events use the syntax of the [`event`] macro. Events without a `time:timestamp`
/// get the unix epoch plus one hour per position in the trace.
///
/// Trace-level attributes can optionally be provided first, separated from the
/// events with a semicolon.
///
/// ```rust
/// use xes_log::trace;
///
/// let trace_1 = trace!("a", "b", "c");
/// let trace_2 = trace!({"org:resource" => "John"}; "a", "b"; {"cost" => 2500.00});
/// assert_eq!(trace_2.events.len(), 2);
/// ```
///
/// [`Trace`]: crate::event_log::Trace
/// [`event`]: crate::event
#[macro_export]
macro_rules! trace {
    (
        { $($key:expr => $value:expr),* $(,)? };
        $(
            $activity:expr $(; { $($keys:expr => $values:expr),* $(,)?})?
        ),*
    ) => {{
        use $crate::event_log::XESEditableAttribute;

        let mut trace = $crate::event_log::Trace {
            attributes: $crate::attributes!($($key => $value),*),
            events: vec![
                $(
                    $crate::event!($activity; {
                        $(
                            $(
                                $keys => $values
                            ),*
                        )?
                    })
                ),*
            ],
        };
        for (i, evt) in trace.events.iter_mut().enumerate() {
            if evt
                .attributes
                .get_by_key($crate::event_log::constants::TIMESTAMP_NAME)
                .is_none()
            {
                let hours = i64::try_from(i).unwrap_or(i64::MAX);
                evt.attributes.add_attribute($crate::attribute!(
                    $crate::event_log::constants::TIMESTAMP_NAME =>
                        $crate::chrono::DateTime::UNIX_EPOCH + $crate::chrono::TimeDelta::hours(hours)
                ));
            }
        }
        trace
    }};
    ($($content:tt)*) => {
        $crate::trace!({}; $($content)*)
    }
}

/// Create an [`EventLog`].
///
/// Each trace is denoted by square brackets containing events (see [`trace`]),
/// optionally followed by trace attributes. Log-level attributes may be given first.
/// Traces without `concept:name` get their index as trace id.
///
/// ```rust
/// use xes_log::event_log;
///
/// let log = event_log!(
///     {"source" => "doc"};
///     ["a", "b", "c"] {"cost" => 2500.00},
///     ["a", "c", "b"],
/// );
/// assert_eq!(log.traces.len(), 2);
/// ```
///
/// [`EventLog`]: crate::event_log::EventLog
/// [`trace`]: crate::trace
#[macro_export]
macro_rules! event_log {
    (
        $({ $($key:expr => $value:expr),* $(,)? }$(;)?)?
        $(
            [$($events:tt)*] $({ $($keys:expr => $vals:expr),* $(,)? })?
        ),* $(,)?
     ) => {{
        use $crate::event_log::XESEditableAttribute;

        let mut log = $crate::event_log::EventLog {
            attributes: $crate::attributes!($($($key => $value),*)?),
            traces: vec![
                $(
                    $crate::trace!(
                        { $($($keys => $vals),*)? };
                        $($events)*
                    )
                ),*
            ],
            ..$crate::event_log::EventLog::default()
        };
        for (idx, trace) in log.traces.iter_mut().enumerate() {
            if trace
                .attributes
                .get_by_key($crate::event_log::constants::TRACE_ID_NAME)
                .is_none()
            {
                trace.attributes.add_attribute($crate::attribute!(
                    $crate::event_log::constants::TRACE_ID_NAME => idx.to_string()
                ));
            }
        }
        log
    }};
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeDelta};
    use uuid::Uuid;

    use crate::event_log::{Attribute, AttributeValue, XESEditableAttribute};

    #[test]
    fn test_attribute_macro() {
        assert_eq!(
            attribute!("string_attr" => String::from("Wee")),
            Attribute::new(
                "string_attr".to_string(),
                AttributeValue::String(String::from("Wee"))
            )
        );
        assert_eq!(
            attribute!("date_attr" => DateTime::UNIX_EPOCH),
            Attribute::new(
                "date_attr".to_string(),
                AttributeValue::Date(DateTime::UNIX_EPOCH.fixed_offset())
            )
        );
        assert_eq!(
            attribute!("int_attr" => 5_i64),
            Attribute::new("int_attr".to_string(), AttributeValue::Int(5))
        );
        assert_eq!(
            attribute!("bool_attr".to_string() => true),
            Attribute::new("bool_attr".to_string(), AttributeValue::Boolean(true))
        );
        let id = Uuid::new_v4();
        assert_eq!(
            attribute!("id" => id),
            Attribute::new("id".to_string(), AttributeValue::ID(id))
        );
        assert_eq!(
            attribute!("list" => vec![attribute!("x" => 1.5)]),
            Attribute::new(
                "list".to_string(),
                AttributeValue::List(vec![Attribute::new(
                    "x".to_string(),
                    AttributeValue::Float(1.5)
                )])
            )
        );
    }

    #[test]
    fn test_trace_macro_fills_timestamps() {
        let t = trace!(
            {"outcome" => "approved"};
            "a"; {"time:timestamp" => DateTime::UNIX_EPOCH + TimeDelta::days(1)},
            "b",
            "c"; {"approved" => true}
        );
        assert_eq!(t.attributes.len(), 1);
        let timestamps: Vec<_> = t
            .events
            .iter()
            .map(|e| {
                *e.attributes
                    .get_by_key("time:timestamp")
                    .and_then(|a| a.value.try_as_date())
                    .unwrap()
            })
            .collect();
        assert_eq!(timestamps[0], (DateTime::UNIX_EPOCH + TimeDelta::days(1)).fixed_offset());
        assert_eq!(timestamps[1], (DateTime::UNIX_EPOCH + TimeDelta::hours(1)).fixed_offset());
        assert_eq!(timestamps[2], (DateTime::UNIX_EPOCH + TimeDelta::hours(2)).fixed_offset());
    }

    #[test]
    fn test_event_log_macro_trace_ids() {
        let log = event_log!(
            ["a", "b"] {"concept:name" => "custom"},
            ["a"],
        );
        let ids: Vec<String> = log
            .traces
            .iter()
            .map(|t| t.attributes.get_by_key("concept:name").unwrap().value.to_string())
            .collect();
        assert_eq!(ids, vec!["custom", "1"]);
        assert_eq!(log.num_events(), 3);
    }
}
