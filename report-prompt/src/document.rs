//! Section builder for the summary and report prompt documents.

use std::fmt;

use report_core::{
    BackgroundInformation, BillingDetails, MedicalEncounter, PersonalDetails, ReportConfig,
};
use serde::Serialize;

use crate::encounters::{format_encounters, EncounterStyle};

/// Fallback for any optional field that has no value.
pub const NOT_RECORDED: &str = "No registrado";
pub const NO_BACKGROUND: &str = "No se ha proporcionado información de antecedentes.";
pub const CONCLUSION_PLACEHOLDER: &str = "[Pendiente de completar por el médico]";

pub const PATIENT_HEADING: &str = "DATOS DEL PACIENTE";
pub const BILLING_HEADING: &str = "DATOS DE FACTURACIÓN";
pub const CONCLUSIONS_HEADING: &str = "CONCLUSIONES";

const SUMMARY_INSTRUCTIONS: &str = "Eres un asistente médico. Elabora un resumen clínico breve y claro del siguiente paciente, destacando diagnósticos relevantes, tratamientos y evolución. Responde en español.";
const REPORT_INSTRUCTIONS: &str = "Eres un asistente médico. Redacta un informe médico completo en formato Markdown a partir de los datos siguientes. Conserva los encabezados de sección, presenta el historial desde la consulta más reciente y deja la sección de conclusiones para que el médico la complete. Responde en español.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Summary,
    Report,
}

impl PromptKind {
    /// Name of the single string field the collaborator must return.
    pub fn output_field(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Report => "report",
        }
    }

    pub fn encounter_style(self) -> EncounterStyle {
        match self {
            Self::Summary => EncounterStyle::Summary,
            Self::Report => EncounterStyle::Report,
        }
    }

    fn background_heading(self) -> &'static str {
        match self {
            Self::Summary => "ANTECEDENTES",
            Self::Report => "ANTECEDENTES Y MEDICACIÓN",
        }
    }

    fn encounters_heading(self) -> &'static str {
        match self {
            Self::Summary => "HISTORIAL DE CONSULTAS",
            Self::Report => "HISTORIAL DE CONSULTAS (MÁS RECIENTE PRIMERO)",
        }
    }

    fn field_line(self, label: &str, value: &str) -> String {
        match self {
            Self::Summary => format!("{label}: {value}"),
            Self::Report => format!("- **{label}:** {value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptSection {
    pub heading: Option<String>,
    pub body: String,
}

impl PromptSection {
    pub fn headed(heading: &str, body: String) -> Self {
        Self {
            heading: Some(heading.to_string()),
            body,
        }
    }

    pub fn plain(body: impl Into<String>) -> Self {
        Self {
            heading: None,
            body: body.into(),
        }
    }

    fn render(&self, kind: PromptKind) -> String {
        match (&self.heading, kind) {
            (None, _) => self.body.clone(),
            (Some(heading), PromptKind::Summary) => format!("{heading}:\n{}", self.body),
            (Some(heading), PromptKind::Report) => format!("## {heading}\n\n{}", self.body),
        }
    }
}

/// Typed view of everything a section may draw from.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub kind: PromptKind,
    pub personal: &'a PersonalDetails,
    pub billing: Option<&'a BillingDetails>,
    pub background: Option<&'a BackgroundInformation>,
    pub encounters: &'a [MedicalEncounter],
    pub config: &'a ReportConfig,
}

/// Produces one section, or `None` to leave it out of the document.
pub type SectionFn = fn(&PromptInput<'_>) -> Option<PromptSection>;

pub const SUMMARY_SECTIONS: &[SectionFn] = &[
    instructions_section,
    patient_section,
    background_section,
    encounters_section,
];

pub const REPORT_SECTIONS: &[SectionFn] = &[
    instructions_section,
    patient_section,
    billing_section,
    background_section,
    encounters_section,
    conclusions_section,
    author_section,
];

/// Assembled prompt, ready to hand to the text generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptDocument {
    pub kind: PromptKind,
    pub sections: Vec<PromptSection>,
}

impl PromptDocument {
    pub fn assemble(input: &PromptInput<'_>, builders: &[SectionFn]) -> Self {
        Self {
            kind: input.kind,
            sections: builders.iter().filter_map(|build| build(input)).collect(),
        }
    }

    pub fn output_field(&self) -> &'static str {
        self.kind.output_field()
    }

    pub fn section(&self, heading: &str) -> Option<&PromptSection> {
        self.sections
            .iter()
            .find(|section| section.heading.as_deref() == Some(heading))
    }

    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|section| section.render(self.kind))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl fmt::Display for PromptDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn or_not_recorded(value: Option<&str>) -> &str {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(NOT_RECORDED)
}

fn instructions_section(input: &PromptInput<'_>) -> Option<PromptSection> {
    Some(PromptSection::plain(match input.kind {
        PromptKind::Summary => SUMMARY_INSTRUCTIONS,
        PromptKind::Report => REPORT_INSTRUCTIONS,
    }))
}

fn patient_section(input: &PromptInput<'_>) -> Option<PromptSection> {
    let kind = input.kind;
    let personal = input.personal;
    let full_name = personal.full_name();
    let birth_date = kind.encounter_style().date_label(personal.birth_date);

    let lines = [
        kind.field_line("Nombre completo", or_not_recorded(Some(full_name.as_str()))),
        kind.field_line("Fecha de nacimiento", &birth_date),
        kind.field_line(
            "Cédula de identidad",
            or_not_recorded(personal.national_id.as_deref()),
        ),
        kind.field_line("Teléfono", or_not_recorded(personal.phone.as_deref())),
        kind.field_line(
            "Teléfono móvil",
            or_not_recorded(personal.mobile_phone.as_deref()),
        ),
        kind.field_line(
            "Correo electrónico",
            or_not_recorded(personal.email.as_deref()),
        ),
    ];

    Some(PromptSection::headed(PATIENT_HEADING, lines.join("\n")))
}

fn billing_section(input: &PromptInput<'_>) -> Option<PromptSection> {
    let billing = input.billing.filter(|billing| billing.has_tax_id())?;
    let kind = input.kind;

    let lines = [
        kind.field_line(
            "RUC / Identificación fiscal",
            or_not_recorded(billing.tax_id.as_deref()),
        ),
        kind.field_line(
            "Dirección fiscal",
            or_not_recorded(billing.fiscal_address.as_deref()),
        ),
        kind.field_line(
            "Teléfono de facturación",
            or_not_recorded(billing.billing_phone.as_deref()),
        ),
        kind.field_line(
            "Correo de facturación",
            or_not_recorded(billing.billing_email.as_deref()),
        ),
    ];

    Some(PromptSection::headed(BILLING_HEADING, lines.join("\n")))
}

fn background_section(input: &PromptInput<'_>) -> Option<PromptSection> {
    let kind = input.kind;
    let body = match input.background {
        Some(background) => [
            kind.field_line(
                "Antecedentes personales",
                or_not_recorded(Some(background.personal_history.as_str())),
            ),
            kind.field_line("Alergias", or_not_recorded(Some(background.allergies.as_str()))),
            kind.field_line(
                "Medicación habitual",
                or_not_recorded(Some(background.medication.as_str())),
            ),
        ]
        .join("\n"),
        None => NO_BACKGROUND.to_string(),
    };

    Some(PromptSection::headed(kind.background_heading(), body))
}

fn encounters_section(input: &PromptInput<'_>) -> Option<PromptSection> {
    let kind = input.kind;
    Some(PromptSection::headed(
        kind.encounters_heading(),
        format_encounters(input.encounters, kind.encounter_style()),
    ))
}

fn conclusions_section(input: &PromptInput<'_>) -> Option<PromptSection> {
    if input.kind != PromptKind::Report {
        return None;
    }

    let headings = &input.config.conclusion_headings;
    let body = if headings.is_empty() {
        CONCLUSION_PLACEHOLDER.to_string()
    } else {
        headings
            .iter()
            .map(|heading| input.kind.field_line(heading.trim(), CONCLUSION_PLACEHOLDER))
            .collect::<Vec<_>>()
            .join("\n")
    };

    Some(PromptSection::headed(CONCLUSIONS_HEADING, body))
}

fn author_section(input: &PromptInput<'_>) -> Option<PromptSection> {
    let author = input.config.author.as_deref().map(str::trim)?;
    if author.is_empty() {
        return None;
    }
    Some(PromptSection::plain(format!("Elaborado por: {author}")))
}

/// Concise summary prompt.
pub fn build_summary_prompt(
    personal: &PersonalDetails,
    background: Option<&BackgroundInformation>,
    encounters: &[MedicalEncounter],
) -> PromptDocument {
    let config = ReportConfig::default();
    let input = PromptInput {
        kind: PromptKind::Summary,
        personal,
        billing: None,
        background,
        encounters,
        config: &config,
    };
    PromptDocument::assemble(&input, SUMMARY_SECTIONS)
}

/// Full Markdown report prompt. Billing is rendered only with a tax ID.
pub fn build_report_prompt(
    personal: &PersonalDetails,
    billing: Option<&BillingDetails>,
    background: Option<&BackgroundInformation>,
    encounters: &[MedicalEncounter],
    config: &ReportConfig,
) -> PromptDocument {
    let input = PromptInput {
        kind: PromptKind::Report,
        personal,
        billing,
        background,
        encounters,
        config,
    };
    PromptDocument::assemble(&input, REPORT_SECTIONS)
}
