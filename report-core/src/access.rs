//! Quyền thao tác được truyền tường minh vào từng handler.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ReportError;

/// Một thao tác cụ thể cần được cấp quyền.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewPatients,
    EditPatients,
    ViewClinicalNotes,
    EditClinicalNotes,
    ViewBilling,
    GenerateReports,
}

impl Capability {
    pub fn all() -> &'static [Capability] {
        &[
            Self::ViewPatients,
            Self::EditPatients,
            Self::ViewClinicalNotes,
            Self::EditClinicalNotes,
            Self::ViewBilling,
            Self::GenerateReports,
        ]
    }
}

/// Vai trò người dùng, chỉ dùng để dựng tập quyền mặc định.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Doctor,
    Receptionist,
}

/// Tập quyền của phiên làm việc hiện tại.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capabilities {
    granted: BTreeSet<Capability>,
}

impl Capabilities {
    /// Không có quyền nào.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.granted.insert(capability);
        self
    }

    pub fn for_role(role: Role) -> Self {
        let granted: &[Capability] = match role {
            Role::Admin => Capability::all(),
            Role::Doctor => &[
                Capability::ViewPatients,
                Capability::EditPatients,
                Capability::ViewClinicalNotes,
                Capability::EditClinicalNotes,
                Capability::GenerateReports,
            ],
            Role::Receptionist => &[
                Capability::ViewPatients,
                Capability::EditPatients,
                Capability::ViewBilling,
            ],
        };
        Self {
            granted: granted.iter().copied().collect(),
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.granted.contains(&capability)
    }

    /// Trả về `ReportError::Forbidden` nếu thiếu quyền.
    pub fn require(&self, capability: Capability) -> Result<(), ReportError> {
        if self.allows(capability) {
            Ok(())
        } else {
            Err(ReportError::Forbidden(capability))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_everything() {
        let caps = Capabilities::for_role(Role::Admin);
        assert!(Capability::all().iter().all(|cap| caps.allows(*cap)));
    }

    #[test]
    fn doctor_cannot_see_billing() {
        let caps = Capabilities::for_role(Role::Doctor);
        assert!(caps.allows(Capability::GenerateReports));
        assert!(matches!(
            caps.require(Capability::ViewBilling),
            Err(ReportError::Forbidden(Capability::ViewBilling))
        ));
    }

    #[test]
    fn receptionist_cannot_generate_reports() {
        let caps = Capabilities::for_role(Role::Receptionist);
        assert!(caps.require(Capability::ViewBilling).is_ok());
        assert!(caps.require(Capability::GenerateReports).is_err());
    }

    #[test]
    fn explicit_grants_compose() {
        let caps = Capabilities::none()
            .with(Capability::GenerateReports)
            .with(Capability::ViewBilling);
        assert!(caps.allows(Capability::ViewBilling));
        assert!(!caps.allows(Capability::EditPatients));
    }
}
