//! Bridge WASM <-> JavaScript trung lập framework cho pipeline báo cáo.

use chrono::NaiveDate;
use report_core::{ReportConfig, ReportError};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsReportConfig {
    #[serde(default)]
    conclusion_headings: Option<Vec<String>>,
    #[serde(default)]
    author: Option<String>,
}

impl From<JsReportConfig> for ReportConfig {
    fn from(cfg: JsReportConfig) -> Self {
        let mut base = ReportConfig::default();
        if let Some(headings) = cfg.conclusion_headings {
            base.conclusion_headings = headings;
        }
        if let Some(author) = cfg.author {
            base.author = Some(author);
        }
        base
    }
}

fn read_record(input_record: JsValue) -> Result<report_core::PatientRecord, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let record_value = from_value::<serde_json::Value>(input_record)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON hồ sơ: {err}")))?;

    report_prompt::record_from_value(&record_value)
        .map_err(|err| JsValue::from_str(&format_report_error(err)))
}

fn read_config(config: Option<JsValue>) -> Result<ReportConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsReportConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            Ok(ReportConfig::from(cfg))
        }
        _ => Ok(ReportConfig::default()),
    }
}

/// Trả về văn bản prompt tóm tắt.
#[wasm_bindgen(js_name = buildSummaryPrompt)]
pub fn build_summary_prompt(input_record: JsValue) -> Result<String, JsValue> {
    let record = read_record(input_record)?;
    Ok(report_prompt::summary_prompt_for(&record).render())
}

/// Trả về văn bản prompt báo cáo đầy đủ (Markdown).
#[wasm_bindgen(js_name = buildReportPrompt)]
pub fn build_report_prompt(
    input_record: JsValue,
    config: Option<JsValue>,
) -> Result<String, JsValue> {
    let record = read_record(input_record)?;
    let cfg = read_config(config)?;
    Ok(report_prompt::report_prompt_for(&record, &cfg).render())
}

/// Yêu cầu gửi sang dịch vụ sinh văn bản (prompt + schema đầu ra).
#[wasm_bindgen(js_name = buildGenerationRequest)]
pub fn build_generation_request(
    input_record: JsValue,
    kind: &str,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    let record = read_record(input_record)?;
    let document = match kind {
        "summary" => report_prompt::summary_prompt_for(&record),
        "report" => report_prompt::report_prompt_for(&record, &read_config(config)?),
        other => {
            return Err(JsValue::from_str(&format!(
                "Loại prompt không hợp lệ: {other}"
            )))
        }
    };

    let request = report_prompt::GenerationRequest::from_document(&document);
    to_value(&request).map_err(|err| JsValue::from_str(&format!("Không serialize request: {err}")))
}

/// Tên file tải về, `iso_date` dạng `YYYY-MM-DD`.
#[wasm_bindgen(js_name = reportFileName)]
pub fn report_file_name(input_record: JsValue, iso_date: &str) -> Result<String, JsValue> {
    let record = read_record(input_record)?;
    let on = NaiveDate::parse_from_str(iso_date, "%Y-%m-%d")
        .map_err(|err| JsValue::from_str(&format!("Ngày không hợp lệ {iso_date}: {err}")))?;
    Ok(report_prompt::report_file_name(&record.personal, on))
}

/// Trích trường văn bản từ phản hồi của dịch vụ sinh văn bản.
#[wasm_bindgen(js_name = extractGeneratedText)]
pub fn extract_generated_text(response: JsValue, field: &str) -> Result<String, JsValue> {
    let value = from_value::<serde_json::Value>(response)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được phản hồi: {err}")))?;
    report_prompt::extract_output(&value, field)
        .map_err(|err| JsValue::from_str(&format_report_error(err)))
}

fn format_report_error(err: ReportError) -> String {
    format!("Report error: {err}")
}
