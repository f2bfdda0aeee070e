//! Boundary with the external text-generation service.

use report_core::{PatientRecord, ReportConfig, ReportError};
use serde::Serialize;
use serde_json::{json, Value};

use crate::document::{build_report_prompt, build_summary_prompt, PromptDocument};

/// What the generator receives: the rendered prompt plus the output schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub output_field: &'static str,
    pub schema: Value,
}

impl GenerationRequest {
    pub fn from_document(document: &PromptDocument) -> Self {
        let field = document.output_field();
        Self {
            prompt: document.render(),
            output_field: field,
            schema: json!({
                "type": "object",
                "properties": { field: { "type": "string" } },
                "required": [field],
            }),
        }
    }
}

/// Text-generation collaborator (allows mocking).
pub trait TextGenerator {
    /// Returns a JSON object expected to carry `request.output_field`.
    fn generate(&self, request: &GenerationRequest) -> Result<Value, ReportError>;
}

/// Calls the generator once and pulls the named string field out of its answer.
pub fn generate_document<G: TextGenerator + ?Sized>(
    generator: &G,
    document: &PromptDocument,
) -> Result<String, ReportError> {
    let request = GenerationRequest::from_document(document);
    let response = generator
        .generate(&request)
        .map_err(|err| match err {
            ReportError::Generation(message) => ReportError::Generation(message),
            other => ReportError::Generation(other.to_string()),
        })?;
    extract_output(&response, request.output_field)
}

pub fn extract_output(response: &Value, field: &str) -> Result<String, ReportError> {
    response
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ReportError::Generation(format!("Response has no string field `{field}`"))
        })
}

pub fn generate_summary<G: TextGenerator + ?Sized>(
    generator: &G,
    record: &PatientRecord,
) -> Result<String, ReportError> {
    let document = build_summary_prompt(
        &record.personal,
        record.background.as_ref(),
        &record.encounters,
    );
    generate_document(generator, &document)
}

pub fn generate_report<G: TextGenerator + ?Sized>(
    generator: &G,
    record: &PatientRecord,
    config: &ReportConfig,
) -> Result<String, ReportError> {
    let document = build_report_prompt(
        &record.personal,
        record.billing.as_ref(),
        record.background.as_ref(),
        &record.encounters,
        config,
    );
    generate_document(generator, &document)
}
