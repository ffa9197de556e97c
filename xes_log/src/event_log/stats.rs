use std::collections::HashSet;
use std::fmt;

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use super::{
    constants::ACTIVITY_NAME, stream_xes::XESOuterLogData, EventLog, Trace, XESEditableAttribute,
};

///
/// Element counts of an [`EventLog`]
///
/// Can be computed from a complete log ([`EventLogStats::from_log`]) or accumulated while streaming
/// (see [`EventLogStats::from_log_data`] and [`EventLogStats::observe_trace`]).
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLogStats {
    /// Number of declared extensions
    pub extensions: usize,
    /// Number of declared classifiers
    pub classifiers: usize,
    /// Number of top-level log attributes
    pub log_attributes: usize,
    /// Number of global trace attributes
    pub global_trace_attrs: usize,
    /// Number of global event attributes
    pub global_event_attrs: usize,
    /// Number of traces
    pub traces: usize,
    /// Number of events (over all traces)
    pub events: usize,
    /// Number of distinct activities (`concept:name` values of events)
    pub activities: usize,
    activity_names: HashSet<String>,
}

impl EventLogStats {
    /// Compute statistics of a complete [`EventLog`]
    ///
    /// Traces are processed in parallel.
    pub fn from_log(log: &EventLog) -> Self {
        let (events, activity_names) = log
            .traces
            .par_iter()
            .map(|t| (t.events.len(), trace_activities(t)))
            .reduce(
                || (0, HashSet::new()),
                |(n1, mut acts1), (n2, acts2)| {
                    acts1.extend(acts2);
                    (n1 + n2, acts1)
                },
            );
        Self {
            extensions: log.extensions.as_ref().map_or(0, Vec::len),
            classifiers: log.classifiers.as_ref().map_or(0, Vec::len),
            log_attributes: log.attributes.len(),
            global_trace_attrs: log.global_trace_attrs.as_ref().map_or(0, Vec::len),
            global_event_attrs: log.global_event_attrs.as_ref().map_or(0, Vec::len),
            traces: log.traces.len(),
            events,
            activities: activity_names.len(),
            activity_names,
        }
    }

    /// Start statistics for a streamed log from its [`XESOuterLogData`]
    pub fn from_log_data(log_data: &XESOuterLogData) -> Self {
        Self {
            extensions: log_data.extensions.len(),
            classifiers: log_data.classifiers.len(),
            log_attributes: log_data.log_attributes.len(),
            global_trace_attrs: log_data.global_trace_attrs.len(),
            global_event_attrs: log_data.global_event_attrs.len(),
            ..Self::default()
        }
    }

    /// Count a (streamed) trace
    pub fn observe_trace(&mut self, trace: &Trace) {
        self.traces += 1;
        self.events += trace.events.len();
        self.activity_names.extend(trace_activities(trace));
        self.activities = self.activity_names.len();
    }
}

fn trace_activities(trace: &Trace) -> HashSet<String> {
    trace
        .events
        .iter()
        .filter_map(|e| {
            e.attributes
                .get_by_key(ACTIVITY_NAME)
                .and_then(|a| a.value.try_as_string())
                .cloned()
        })
        .collect()
}

impl fmt::Display for EventLogStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "EventLogStats")?;
        writeln!(f, "   extensions:         {}", self.extensions)?;
        writeln!(f, "   classifiers:        {}", self.classifiers)?;
        writeln!(f, "   log attributes:     {}", self.log_attributes)?;
        writeln!(f, "   global trace attrs: {}", self.global_trace_attrs)?;
        writeln!(f, "   global event attrs: {}", self.global_event_attrs)?;
        writeln!(f, "   traces:             {}", self.traces)?;
        writeln!(f, "   events:             {}", self.events)?;
        write!(f, "   activities:         {}", self.activities)
    }
}
