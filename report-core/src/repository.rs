//! Kho hồ sơ bệnh nhân được inject vào handler thay cho danh sách toàn cục.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::{MedicalEncounter, PatientRecord, ReportError};

/// Các thao tác CRUD trên hồ sơ. Mọi kết quả đọc đều là bản sao.
pub trait PatientRepository: Send + Sync {
    fn insert(&self, record: PatientRecord) -> Result<PatientRecord, ReportError>;
    fn get(&self, id: &str) -> Result<Option<PatientRecord>, ReportError>;
    fn list(&self) -> Result<Vec<PatientRecord>, ReportError>;
    fn update(&self, record: PatientRecord) -> Result<PatientRecord, ReportError>;
    fn delete(&self, id: &str) -> Result<(), ReportError>;
    fn add_encounter(
        &self,
        patient_id: &str,
        encounter: MedicalEncounter,
    ) -> Result<MedicalEncounter, ReportError>;
}

/// Kho trong bộ nhớ, giữ nguyên thứ tự thêm vào.
#[derive(Debug, Default)]
pub struct InMemoryPatientRepository {
    records: RwLock<Vec<PatientRecord>>,
}

impl InMemoryPatientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Khởi tạo sẵn dữ liệu (dùng cho mock/testing).
    pub fn with_records(records: Vec<PatientRecord>) -> Result<Self, ReportError> {
        let repository = Self::new();
        for record in records {
            repository.insert(record)?;
        }
        Ok(repository)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<PatientRecord>>, ReportError> {
        self.records
            .read()
            .map_err(|_| ReportError::Other("Kho hồ sơ bị khoá hỏng".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<PatientRecord>>, ReportError> {
        self.records
            .write()
            .map_err(|_| ReportError::Other("Kho hồ sơ bị khoá hỏng".to_string()))
    }
}

fn assign_id(id: &mut String) {
    if id.trim().is_empty() {
        *id = Uuid::new_v4().to_string();
    }
}

impl PatientRepository for InMemoryPatientRepository {
    fn insert(&self, mut record: PatientRecord) -> Result<PatientRecord, ReportError> {
        assign_id(&mut record.id);
        for encounter in &mut record.encounters {
            assign_id(&mut encounter.id);
        }

        let mut records = self.write()?;
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(ReportError::Conflict(record.id));
        }

        tracing::debug!(patient_id = %record.id, "inserted patient record");
        records.push(record.clone());
        Ok(record)
    }

    fn get(&self, id: &str) -> Result<Option<PatientRecord>, ReportError> {
        Ok(self.read()?.iter().find(|record| record.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<PatientRecord>, ReportError> {
        Ok(self.read()?.clone())
    }

    fn update(&self, mut record: PatientRecord) -> Result<PatientRecord, ReportError> {
        for encounter in &mut record.encounters {
            assign_id(&mut encounter.id);
        }

        let mut records = self.write()?;
        let slot = records
            .iter_mut()
            .find(|existing| existing.id == record.id)
            .ok_or_else(|| ReportError::NotFound(record.id.clone()))?;

        *slot = record.clone();
        tracing::debug!(patient_id = %record.id, "updated patient record");
        Ok(record)
    }

    fn delete(&self, id: &str) -> Result<(), ReportError> {
        let mut records = self.write()?;
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Err(ReportError::NotFound(id.to_string()));
        }
        tracing::debug!(patient_id = %id, "deleted patient record");
        Ok(())
    }

    fn add_encounter(
        &self,
        patient_id: &str,
        mut encounter: MedicalEncounter,
    ) -> Result<MedicalEncounter, ReportError> {
        assign_id(&mut encounter.id);

        let mut records = self.write()?;
        let record = records
            .iter_mut()
            .find(|record| record.id == patient_id)
            .ok_or_else(|| ReportError::NotFound(patient_id.to_string()))?;

        record.encounters.push(encounter.clone());
        tracing::debug!(patient_id = %patient_id, encounter_id = %encounter.id, "added encounter");
        Ok(encounter)
    }
}
