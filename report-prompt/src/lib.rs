//! Patient record to prompt document pipeline (summary and full report).

mod document;
mod encounters;
mod generation;
mod service;

pub use document::{
    build_report_prompt, build_summary_prompt, PromptDocument, PromptInput, PromptKind,
    PromptSection, SectionFn, BILLING_HEADING, CONCLUSIONS_HEADING, CONCLUSION_PLACEHOLDER,
    NOT_RECORDED, NO_BACKGROUND, PATIENT_HEADING, REPORT_SECTIONS, SUMMARY_SECTIONS,
};
pub use encounters::{
    format_encounters, long_spanish_date, malformed_dates, sort_encounters, EncounterStyle,
};
pub use generation::{
    extract_output, generate_document, generate_report, generate_summary, GenerationRequest,
    TextGenerator,
};
pub use service::{ReportFile, ReportService};

use chrono::NaiveDate;
use report_core::{PatientRecord, PersonalDetails, ReportConfig, ReportError};
use serde::Deserialize;
use serde_json::Value;

/// Parse a patient record from a JSON string.
pub fn record_from_str(record_json: &str) -> Result<PatientRecord, ReportError> {
    let value: Value =
        serde_json::from_str(record_json).map_err(|err| ReportError::Parse(err.to_string()))?;
    record_from_value(&value)
}

/// Parse a patient record from a `serde_json::Value`.
pub fn record_from_value(record: &Value) -> Result<PatientRecord, ReportError> {
    if !record.is_object() || record.get("personal").is_none() {
        return Err(ReportError::MissingData);
    }
    PatientRecord::deserialize(record).map_err(|err| ReportError::Parse(err.to_string()))
}

pub fn summary_prompt_for(record: &PatientRecord) -> PromptDocument {
    build_summary_prompt(
        &record.personal,
        record.background.as_ref(),
        &record.encounters,
    )
}

pub fn report_prompt_for(record: &PatientRecord, config: &ReportConfig) -> PromptDocument {
    build_report_prompt(
        &record.personal,
        record.billing.as_ref(),
        record.background.as_ref(),
        &record.encounters,
        config,
    )
}

/// `Informe_<Full_Name>_<YYYY-MM-DD>.md`
pub fn report_file_name(personal: &PersonalDetails, on: NaiveDate) -> String {
    let name = personal
        .full_name()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("Informe_{name}_{}.md", on.format("%Y-%m-%d"))
}
