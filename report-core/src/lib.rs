//! Mô hình dữ liệu lõi của hồ sơ bệnh nhân dùng để dựng báo cáo.

mod access;
mod repository;

pub use access::{Capabilities, Capability, Role};
pub use repository::{InMemoryPatientRepository, PatientRepository};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cấu hình điều chỉnh nội dung báo cáo đầy đủ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    /// Các mục kết luận để trống cho bác sĩ tự điền.
    pub conclusion_headings: Vec<String>,
    /// Người lập báo cáo, nếu có sẽ in ở cuối văn bản.
    pub author: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            conclusion_headings: vec![
                "Diagnóstico".to_string(),
                "Plan de tratamiento".to_string(),
                "Recomendaciones".to_string(),
            ],
            author: None,
        }
    }
}

/// Thông tin định danh của bệnh nhân.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub given_name: String,
    pub family_name: String,
    #[serde(default)]
    pub national_id: Option<String>,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub mobile_phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl PersonalDetails {
    /// Họ tên đầy đủ: tên + họ, nối bằng đúng một khoảng trắng.
    pub fn full_name(&self) -> String {
        [self.given_name.trim(), self.family_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Thông tin xuất hoá đơn, có thể vắng mặt hoàn toàn.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillingDetails {
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub fiscal_address: Option<String>,
    #[serde(default)]
    pub billing_phone: Option<String>,
    #[serde(default)]
    pub billing_email: Option<String>,
}

impl BillingDetails {
    /// Chỉ coi là có mã số thuế khi chuỗi không rỗng sau khi cắt khoảng trắng.
    pub fn has_tax_id(&self) -> bool {
        self.tax_id
            .as_deref()
            .is_some_and(|tax_id| !tax_id.trim().is_empty())
    }
}

/// Tiền sử, dị ứng và thuốc dùng thường xuyên.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundInformation {
    #[serde(default)]
    pub personal_history: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub medication: String,
}

/// Một lần khám, ngày lưu nguyên dạng chuỗi như khi nhập.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicalEncounter {
    #[serde(default)]
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub details: String,
}

impl MedicalEncounter {
    pub fn new(
        id: impl Into<String>,
        date: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            details: details.into(),
        }
    }

    /// Thời điểm khám nếu đọc được, `None` khi chuỗi ngày sai định dạng.
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        parse_encounter_date(&self.date)
    }

    /// Ngày khám theo múi giờ ghi trong chuỗi gốc (không quy đổi sang UTC).
    pub fn local_date(&self) -> Option<NaiveDate> {
        parse_encounter_timestamp(&self.date).map(|dt| dt.date_naive())
    }
}

/// Hồ sơ bệnh nhân, đơn vị dữ liệu duy nhất đưa vào pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    #[serde(default)]
    pub id: String,
    pub personal: PersonalDetails,
    #[serde(default)]
    pub billing: Option<BillingDetails>,
    #[serde(default)]
    pub background: Option<BackgroundInformation>,
    #[serde(default)]
    pub encounters: Vec<MedicalEncounter>,
}

impl PatientRecord {
    pub fn new(personal: PersonalDetails) -> Self {
        Self {
            id: String::new(),
            personal,
            billing: None,
            background: None,
            encounters: Vec::new(),
        }
    }

    /// Dùng để khoá nút "tạo báo cáo" khi chưa có lần khám nào.
    pub fn has_encounters(&self) -> bool {
        !self.encounters.is_empty()
    }
}

/// Lỗi chung của hồ sơ và pipeline báo cáo.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Dữ liệu đầu vào thiếu thông tin tối thiểu")]
    MissingData,
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Không tìm thấy hồ sơ: {0}")]
    NotFound(String),
    #[error("Hồ sơ đã tồn tại: {0}")]
    Conflict(String),
    #[error("Không có quyền: {0:?}")]
    Forbidden(Capability),
    #[error("Dịch vụ sinh văn bản thất bại: {0}")]
    Generation(String),
    #[error("Lỗi khác: {0}")]
    Other(String),
}

/// Đọc ngày khám theo các định dạng thường gặp, không bao giờ panic.
pub fn parse_encounter_date(value: &str) -> Option<DateTime<Utc>> {
    parse_encounter_timestamp(value).map(|dt| dt.with_timezone(&Utc))
}

/// Giữ nguyên độ lệch múi giờ của chuỗi gốc; chuỗi không có múi giờ coi là UTC.
pub fn parse_encounter_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }

    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    Some(naive.and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn maria() -> PersonalDetails {
        PersonalDetails {
            given_name: "Maria".to_string(),
            family_name: "Gonzalez Perez".to_string(),
            national_id: None,
            birth_date: NaiveDate::from_ymd_opt(1985, 5, 15).unwrap(),
            phone: None,
            mobile_phone: None,
            email: None,
        }
    }

    #[test]
    fn full_name_joins_with_single_space() {
        assert_eq!(maria().full_name(), "Maria Gonzalez Perez");

        let mut padded = maria();
        padded.given_name = "  Maria ".to_string();
        padded.family_name = " Gonzalez Perez  ".to_string();
        assert_eq!(padded.full_name(), "Maria Gonzalez Perez");

        let mut no_given = maria();
        no_given.given_name = String::new();
        assert_eq!(no_given.full_name(), "Gonzalez Perez");
    }

    #[test]
    fn blank_tax_id_is_not_a_tax_id() {
        let mut billing = BillingDetails::default();
        assert!(!billing.has_tax_id());
        billing.tax_id = Some("   ".to_string());
        assert!(!billing.has_tax_id());
        billing.tax_id = Some("1234567890001".to_string());
        assert!(billing.has_tax_id());
    }

    #[test]
    fn parses_common_date_shapes() {
        let date_only = parse_encounter_date("2024-03-01").unwrap();
        assert_eq!((date_only.year(), date_only.month(), date_only.day()), (2024, 3, 1));

        let rfc = parse_encounter_date("2024-03-01T10:30:00-05:00").unwrap();
        assert_eq!(rfc.hour(), 15);

        let naive = parse_encounter_date("2024-03-01T10:30:00").unwrap();
        assert_eq!(naive.minute(), 30);

        let spaced = parse_encounter_date("2024-03-01 08:00:00").unwrap();
        assert_eq!(spaced.hour(), 8);
    }

    #[test]
    fn offset_timestamps_keep_their_own_calendar_day() {
        let evening = MedicalEncounter::new("e1", "2024-03-01T22:00:00-05:00", "Nota");
        assert_eq!(evening.local_date(), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(
            evening.occurred_at().map(|dt| dt.date_naive()),
            NaiveDate::from_ymd_opt(2024, 3, 2)
        );

        let plain = MedicalEncounter::new("e2", "2024-03-01", "Nota");
        assert_eq!(plain.local_date(), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(MedicalEncounter::new("e3", "sin fecha", "x").local_date().is_none());
    }

    #[test]
    fn malformed_dates_are_none() {
        assert!(parse_encounter_date("").is_none());
        assert!(parse_encounter_date("ayer por la tarde").is_none());
        assert!(parse_encounter_date("2024-13-45").is_none());
        assert!(MedicalEncounter::new("e1", "31/02/2024", "x")
            .occurred_at()
            .is_none());
    }

    #[test]
    fn record_reads_camel_case_json() {
        let json = r#"{
            "personal": {
                "givenName": "Maria",
                "familyName": "Gonzalez Perez",
                "birthDate": "1985-05-15"
            },
            "billing": { "taxId": "" },
            "encounters": [{ "date": "2024-01-01", "details": "Control" }]
        }"#;

        let record: PatientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.personal.full_name(), "Maria Gonzalez Perez");
        assert!(record.background.is_none());
        assert!(!record.billing.unwrap().has_tax_id());
        assert!(record.encounters[0].id.is_empty());
    }

    #[test]
    fn default_config_has_three_conclusions() {
        let config = ReportConfig::default();
        assert_eq!(config.conclusion_headings.len(), 3);
        assert!(config.author.is_none());

        let partial: ReportConfig = serde_json::from_str(r#"{"author":"Dra. Vega"}"#).unwrap();
        assert_eq!(partial.author.as_deref(), Some("Dra. Vega"));
        assert_eq!(partial.conclusion_headings.len(), 3);
    }
}
