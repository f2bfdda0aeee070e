//! Handler layer: repository lookup, capability checks, single generator call.

use chrono::NaiveDate;
use report_core::{
    Capabilities, Capability, PatientRecord, PatientRepository, ReportConfig, ReportError,
};
use serde::Serialize;

use crate::encounters::malformed_dates;
use crate::generation::{generate_report, generate_summary, TextGenerator};
use crate::report_file_name;

/// Generated report plus its conventional download name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportFile {
    pub file_name: String,
    pub content: String,
}

pub struct ReportService<R, G> {
    repository: R,
    generator: G,
    config: ReportConfig,
}

impl<R: PatientRepository, G: TextGenerator> ReportService<R, G> {
    pub fn new(repository: R, generator: G, config: ReportConfig) -> Self {
        Self {
            repository,
            generator,
            config,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn summary(&self, caps: &Capabilities, patient_id: &str) -> Result<String, ReportError> {
        caps.require(Capability::GenerateReports)?;
        let record = self.load(patient_id)?;

        generate_summary(&self.generator, &record).inspect_err(|err| {
            tracing::error!(patient_id, error = %err, "summary generation failed");
        })
    }

    /// Billing is only handed to the generator when the caller may see it.
    pub fn report(
        &self,
        caps: &Capabilities,
        patient_id: &str,
        on: NaiveDate,
    ) -> Result<ReportFile, ReportError> {
        caps.require(Capability::GenerateReports)?;
        let mut record = self.load(patient_id)?;
        if !caps.allows(Capability::ViewBilling) {
            record.billing = None;
        }

        let content = generate_report(&self.generator, &record, &self.config).inspect_err(|err| {
            tracing::error!(patient_id, error = %err, "report generation failed");
        })?;

        Ok(ReportFile {
            file_name: report_file_name(&record.personal, on),
            content,
        })
    }

    fn load(&self, patient_id: &str) -> Result<PatientRecord, ReportError> {
        let record = self
            .repository
            .get(patient_id)?
            .ok_or_else(|| ReportError::NotFound(patient_id.to_string()))?;

        if !record.has_encounters() {
            tracing::info!(patient_id, "patient has no encounters; prompt uses sentinel text");
        }
        for encounter in malformed_dates(&record.encounters) {
            tracing::warn!(
                patient_id,
                encounter_id = %encounter.id,
                raw_date = %encounter.date,
                "encounter date could not be parsed; rendering raw value"
            );
        }

        Ok(record)
    }
}
