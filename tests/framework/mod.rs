#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;

use syncval_attrib::{AccessRecordRef, HazardKind, HazardResult, Location, ReportSink, SyncValidator, ValidatorBuilder};

/// Sink that keeps every report so tests can inspect them.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub reports: Arc<Mutex<Vec<(HazardKind, String)>>>,
}

impl ReportSink for CollectingSink {
    fn report(&self, kind: HazardKind, message: &str) {
        self.reports.lock().unwrap().push((kind, message.to_owned()));
    }
}

/// Creates a validator with no optional capabilities, ready for automated tests
pub fn make_validator() -> Result<SyncValidator> {
    make_validator_with_settings(|builder| builder)
}

/// Create a validator, letting the caller adjust the settings first
pub fn make_validator_with_settings<F: FnOnce(ValidatorBuilder) -> ValidatorBuilder>(callback: F) -> Result<SyncValidator> {
    let _ = pretty_env_logger::try_init();
    let builder = ValidatorBuilder::new().name("syncval test framework");
    Ok(SyncValidator::new(callback(builder).build()))
}

/// Create a validator that sends its reports to a [`CollectingSink`]
pub fn make_validator_with_sink() -> Result<(SyncValidator, CollectingSink)> {
    let sink = CollectingSink::default();
    let validator = make_validator_with_settings(|builder| builder.sink(sink.clone()))?;
    Ok((validator, sink))
}

/// Resolve where a single access happened, by attributing a hazard of the access against itself
pub fn locate(validator: &SyncValidator, access: AccessRecordRef) -> Result<Location> {
    let attribution = validator.attribute(&HazardResult {
        kind: HazardKind::ReadAfterWrite,
        current: access,
        prior: access,
    })?;
    Ok(attribution.current)
}

/// Label path an access resolves to
pub fn label_of(validator: &SyncValidator, access: AccessRecordRef) -> Result<String> {
    Ok(locate(validator, access)?.label)
}
