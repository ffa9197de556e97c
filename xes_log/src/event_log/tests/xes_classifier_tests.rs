use std::collections::HashSet;

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::event_log::import_xes::{import_xes_slice, XESImportOptions};

#[test]
pub fn test_get_class_identity() {
    let log_bytes = include_bytes!("test_data/running-example.xes");
    let log = import_xes_slice(log_bytes, false, XESImportOptions::default()).unwrap();
    let classifier = log.get_classifier_by_name("Resource and activity").unwrap();
    assert_eq!(classifier.keys, vec!["org:resource", "concept:name"]);

    let trace_variants: HashSet<Vec<String>> = log
        .traces
        .iter()
        .map(|t| {
            t.events
                .par_iter()
                .map(|e| classifier.get_class_identity(e))
                .collect()
        })
        .collect();
    // All cases differ once resources are taken into account
    assert_eq!(trace_variants.len(), 6);

    let example_variant: Vec<String> = vec![
        "Pete+register request",
        "Sue+examine thoroughly",
        "Mike+check ticket",
        "Sara+decide",
        "Pete+reject request",
    ]
    .into_iter()
    .map(|s| s.to_string())
    .collect();
    assert!(trace_variants.contains(&example_variant));
}

#[test]
pub fn test_unknown_classifier() {
    let log_bytes = include_bytes!("test_data/running-example.xes");
    let log = import_xes_slice(log_bytes, false, XESImportOptions::default()).unwrap();
    assert!(log.get_classifier_by_name("Event Name").is_none());
}
