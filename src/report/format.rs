//! Assembles hazard messages.

use crate::report::attributor::Location;
use crate::sync::hazard::HazardKind;

/// Stateless formatter for hazard messages.
///
/// A message has the form
/// ```text
/// WRITE_AFTER_READ hazard detected. Current access in A::B: <summary> (<name>). Prior access in no label region: <summary> (<name>).
/// ```
/// The object name is left out when the object has no debug name, and the summary when the prior access could no
/// longer be found.
#[derive(Debug, Default, Copy, Clone)]
pub struct ReportFormatter;

impl ReportFormatter {
    /// Format a full hazard message.
    pub fn format(kind: HazardKind, prior: &Location, current: &Location) -> String {
        format!(
            "{} hazard detected. Current access {}. Prior access {}.",
            kind,
            Self::location(current),
            Self::location(prior)
        )
    }

    /// Format a single location.
    pub fn location(location: &Location) -> String {
        let mut out = format!("in {}", location.label);
        if let Some(access) = &location.access {
            out.push_str(": ");
            out.push_str(access);
        }
        if !location.object_name.is_empty() {
            out.push_str(&format!(" ({})", location.object_name));
        }
        out
    }
}
