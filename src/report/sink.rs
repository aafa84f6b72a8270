//! Destinations for formatted hazard reports.

use crate::sync::hazard::HazardKind;

/// Receives every formatted hazard report.
pub trait ReportSink {
    /// Called once per reported hazard.
    fn report(&self, kind: HazardKind, message: &str);
}

/// Forwards reports to the [`log`] facade. Hazards against a prior read are logged as warnings,
/// all others as errors.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&self, kind: HazardKind, message: &str) {
        if kind.prior_is_read() {
            warn!("[SYNC-HAZARD-{}]: {}", kind, message);
        } else {
            error!("[SYNC-HAZARD-{}]: {}", kind, message);
        }
    }
}

impl<F: Fn(HazardKind, &str)> ReportSink for F {
    fn report(&self, kind: HazardKind, message: &str) {
        self(kind, message)
    }
}
