//! The mode-aware anomaly dispatcher.

use log::warn;
use qwk_types::{
    options::ValidationMode,
    report::{Anomaly, ValidationReport},
};

use crate::error::QwkError;

/// Accumulates anomalies and decides, per mode, whether one aborts.
///
/// Warnings are recorded in every mode. Errors are recorded in every mode
/// and additionally raised in strict mode. Fatal anomalies are recorded and
/// always raised.
#[derive(Debug)]
pub struct ValidationContext {
    mode: ValidationMode,
    report: ValidationReport,
}

impl ValidationContext {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            report: ValidationReport::new(),
        }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn into_report(self) -> ValidationReport {
        self.report
    }

    /// Takes the accumulated report, leaving an empty one behind.
    pub fn take_report(&mut self) -> ValidationReport {
        std::mem::take(&mut self.report)
    }

    /// Appends another report.
    pub fn merge(&mut self, other: ValidationReport) {
        self.report.merge(other);
    }

    /// Records a warning.
    pub fn warn(&mut self, anomaly: Anomaly) {
        warn!("{anomaly}");
        self.report.record_warning(anomaly);
    }

    /// Records an error; raises it in strict mode.
    pub fn error(&mut self, anomaly: Anomaly) -> Result<(), QwkError> {
        warn!("{anomaly}");
        self.report.record_error(anomaly.clone());

        match self.mode {
            ValidationMode::Strict => Err(QwkError::Validation(anomaly)),
            ValidationMode::Lenient | ValidationMode::Salvage => Ok(()),
        }
    }

    /// Records an error and returns it for raising, regardless of mode.
    #[must_use]
    pub fn fatal(&mut self, anomaly: Anomaly) -> QwkError {
        warn!("{anomaly}");
        self.report.record_error(anomaly.clone());

        QwkError::Validation(anomaly)
    }
}
