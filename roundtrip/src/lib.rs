//! Timed read/write round trip of XES event logs
//!
//! Reads an XES log, writes it back out and reports how long each of the two steps took.

use std::{
    fmt,
    fs::File,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use xes_log::{
    event_log::{
        stream_xes::is_gz_path,
        validate::{known_extensions, validate_trace, ValidationError},
    },
    export_xes_event_log_to_file, export_xes_trace_stream_to_file, import_xes_file,
    stream_xes_from_path, validate_globals, EventLogStats, XESImportOptions,
};

/// How the log is moved from input to output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundtripMode {
    /// Import the complete [`xes_log::EventLog`], then export it
    #[default]
    Materialized,
    /// Parse and write trace by trace, without holding the whole log in memory
    Streaming,
}

/// Settings of a single round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundtripConfig {
    /// XES file to read (`.xes` or `.xes.gz`)
    pub input: PathBuf,
    /// File to write (gzip-compressed if it ends in `.gz`)
    pub output: PathBuf,
    /// See [`RoundtripMode`]
    pub mode: RoundtripMode,
    /// Collect [`EventLogStats`] of the log
    pub stats: bool,
    /// Check traces and events against the global attribute declarations
    pub validate: bool,
}

/// Durations (and optional statistics) of a finished round trip
#[derive(Debug, Clone, PartialEq)]
pub struct RoundtripReport {
    /// Time spent reading
    ///
    /// In streaming mode only the log header is read up front, so this is the time until the
    /// log data before the first trace was parsed.
    pub read: Duration,
    /// Time spent writing (in streaming mode this includes parsing the traces)
    pub write: Duration,
    /// Statistics, if requested
    pub stats: Option<EventLogStats>,
    /// Number of global attribute violations found, if validation was requested
    pub violations: usize,
}

impl fmt::Display for RoundtripReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read in {:.3}s, wrote in {:.3}s",
            self.read.as_secs_f64(),
            self.write.as_secs_f64()
        )
    }
}

fn report_violations(errors: &[ValidationError]) {
    for e in errors {
        log::warn!("Global attribute violation: {e}");
    }
}

///
/// Temporary file next to `output`, so that [`persist`] is a rename on the same file system
///
/// Dropping it without persisting removes it, so failed runs never leave a partial log behind.
///
fn staging_file(output: &Path) -> Result<(NamedTempFile, File)> {
    let dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create a temporary file in {}", dir.display()))?;
    let file = staged
        .as_file()
        .try_clone()
        .with_context(|| format!("Failed to open {}", staged.path().display()))?;
    Ok((staged, file))
}

fn persist(staged: NamedTempFile, output: &Path) -> Result<()> {
    staged
        .persist(output)
        .with_context(|| format!("Failed to move written XES to {}", output.display()))?;
    Ok(())
}

/// Read `config.input` and write it to `config.output`, timing both steps
///
/// `config.output` is only created (or replaced) if both steps succeed.
pub fn run(config: &RoundtripConfig) -> Result<RoundtripReport> {
    log::debug!("Running {config:?}");
    match config.mode {
        RoundtripMode::Materialized => run_materialized(config),
        RoundtripMode::Streaming => run_streaming(config),
    }
}

fn run_materialized(config: &RoundtripConfig) -> Result<RoundtripReport> {
    let now = Instant::now();
    let event_log = import_xes_file(&config.input, XESImportOptions::default())
        .with_context(|| format!("Failed to read XES from {}", config.input.display()))?;
    let read = now.elapsed();
    log::info!(
        "Imported {} traces with {} events",
        event_log.traces.len(),
        event_log.num_events()
    );

    let stats = config.stats.then(|| EventLogStats::from_log(&event_log));
    let mut violations = 0;
    if config.validate {
        if let Err(errors) = validate_globals(&event_log) {
            report_violations(&errors);
            violations = errors.len();
        }
    }

    let now = Instant::now();
    let (staged, file) = staging_file(&config.output)?;
    export_xes_event_log_to_file(&event_log, file, is_gz_path(&config.output))
        .with_context(|| format!("Failed to write XES to {}", config.output.display()))?;
    persist(staged, &config.output)?;
    let write = now.elapsed();

    Ok(RoundtripReport {
        read,
        write,
        stats,
        violations,
    })
}

fn run_streaming(config: &RoundtripConfig) -> Result<RoundtripReport> {
    let now = Instant::now();
    let (mut stream, log_data) = stream_xes_from_path(&config.input, XESImportOptions::default())
        .with_context(|| format!("Failed to read XES from {}", config.input.display()))?;
    let read = now.elapsed();

    let mut stats = config
        .stats
        .then(|| EventLogStats::from_log_data(&log_data));
    let global_trace_attrs = log_data.global_trace_attrs.clone();
    let global_event_attrs = log_data.global_event_attrs.clone();
    let extensions = if config.validate {
        known_extensions(&log_data.extensions)
    } else {
        Vec::new()
    };
    let mut violations = 0;

    let now = Instant::now();
    let (staged, file) = staging_file(&config.output)?;
    let traces = stream.by_ref().enumerate().map(|(i, trace)| {
        if let Some(stats) = stats.as_mut() {
            stats.observe_trace(&trace);
        }
        if config.validate {
            let errors = validate_trace(
                i,
                &trace,
                &global_trace_attrs,
                &global_event_attrs,
                &extensions,
            );
            report_violations(&errors);
            violations += errors.len();
        }
        trace
    });
    export_xes_trace_stream_to_file(traces, log_data, file, is_gz_path(&config.output))
        .with_context(|| format!("Failed to write XES to {}", config.output.display()))?;
    if let Some(e) = stream.check_for_errors() {
        return Err(e)
            .with_context(|| format!("Failed to read XES from {}", config.input.display()));
    }
    persist(staged, &config.output)?;
    let write = now.elapsed();

    Ok(RoundtripReport {
        read,
        write,
        stats,
        violations,
    })
}
