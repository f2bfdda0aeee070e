//! Chronological encounter digest shared by the summary and report prompts.

use std::cmp::Reverse;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use report_core::MedicalEncounter;

const SPANISH_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Rendering variant of the encounter digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterStyle {
    Summary,
    Report,
}

impl EncounterStyle {
    pub fn separator(self) -> &'static str {
        match self {
            Self::Summary => "\n\n---\n\n",
            Self::Report => "\n------------------------------------\n",
        }
    }

    pub fn empty_sentinel(self) -> &'static str {
        match self {
            Self::Summary => "No hay consultas registradas.",
            Self::Report => "No se han registrado consultas médicas para este paciente.",
        }
    }

    /// Label for a calendar date in this style.
    pub fn date_label(self, date: NaiveDate) -> String {
        match self {
            Self::Summary => date.format("%d/%m/%Y").to_string(),
            Self::Report => long_spanish_date(date),
        }
    }

    fn encounter_label(self, encounter: &MedicalEncounter) -> String {
        match encounter.local_date() {
            Some(local_date) => self.date_label(local_date),
            None => encounter.date.clone(),
        }
    }
}

/// `1 de marzo de 2024`.
pub fn long_spanish_date(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        SPANISH_MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Most recent first. Ties keep input order; unreadable dates go last.
pub fn sort_encounters(encounters: &[MedicalEncounter]) -> Vec<&MedicalEncounter> {
    let mut sorted: Vec<(Option<DateTime<Utc>>, &MedicalEncounter)> = encounters
        .iter()
        .map(|encounter| (encounter.occurred_at(), encounter))
        .collect();
    sorted.sort_by_key(|(occurred_at, _)| Reverse(*occurred_at));
    sorted.into_iter().map(|(_, encounter)| encounter).collect()
}

/// Encounters whose stored date could not be parsed.
pub fn malformed_dates(encounters: &[MedicalEncounter]) -> Vec<&MedicalEncounter> {
    encounters
        .iter()
        .filter(|encounter| encounter.occurred_at().is_none())
        .collect()
}

pub fn format_encounters(encounters: &[MedicalEncounter], style: EncounterStyle) -> String {
    if encounters.is_empty() {
        return style.empty_sentinel().to_string();
    }

    sort_encounters(encounters)
        .into_iter()
        .map(|encounter| render_block(encounter, style))
        .collect::<Vec<_>>()
        .join(style.separator())
}

fn render_block(encounter: &MedicalEncounter, style: EncounterStyle) -> String {
    let details = encounter.details.trim();
    let details = if details.is_empty() {
        "Sin detalles registrados."
    } else {
        details
    };
    format!("Fecha: {}\n{details}", style.encounter_label(encounter))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encounter(id: &str, date: &str, details: &str) -> MedicalEncounter {
        MedicalEncounter::new(id, date, details)
    }

    fn ids(sorted: Vec<&MedicalEncounter>) -> Vec<&str> {
        sorted.into_iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn empty_sentinels_differ() {
        let summary = format_encounters(&[], EncounterStyle::Summary);
        let report = format_encounters(&[], EncounterStyle::Report);
        assert_eq!(summary, "No hay consultas registradas.");
        assert_eq!(
            report,
            "No se han registrado consultas médicas para este paciente."
        );
        assert_ne!(summary, report);
    }

    #[test]
    fn newest_first_with_stable_ties() {
        let encounters = vec![
            encounter("a", "2024-01-01", "A"),
            encounter("b", "2024-03-01", "B"),
            encounter("c", "2024-01-01", "C"),
            encounter("d", "2024-02-15T09:00:00Z", "D"),
            encounter("e", "2024-03-01", "E"),
        ];
        assert_eq!(ids(sort_encounters(&encounters)), ["b", "e", "d", "a", "c"]);
    }

    #[test]
    fn unreadable_dates_sort_last_in_input_order() {
        let encounters = vec![
            encounter("bad1", "sin fecha", "x"),
            encounter("ok", "2020-01-01", "y"),
            encounter("bad2", "", "z"),
        ];
        assert_eq!(ids(sort_encounters(&encounters)), ["ok", "bad1", "bad2"]);
        assert_eq!(ids(malformed_dates(&encounters)), ["bad1", "bad2"]);
    }

    #[test]
    fn one_block_per_encounter() {
        let encounters = vec![
            encounter("a", "2024-01-01", "Primera"),
            encounter("b", "2024-03-01", "Segunda"),
            encounter("c", "2023-07-20", "Tercera"),
        ];
        for style in [EncounterStyle::Summary, EncounterStyle::Report] {
            let digest = format_encounters(&encounters, style);
            let blocks: Vec<_> = digest.split(style.separator()).collect();
            assert_eq!(blocks.len(), encounters.len());
            assert!(blocks[0].ends_with("Segunda"));
            assert!(blocks[1].ends_with("Primera"));
            assert!(blocks[2].ends_with("Tercera"));
        }
    }

    #[test]
    fn summary_style_uses_short_dates() {
        let digest = format_encounters(
            &[
                encounter("a", "2024-01-01", "Control anual"),
                encounter("b", "2024-03-01", "Dolor lumbar"),
            ],
            EncounterStyle::Summary,
        );
        assert_eq!(
            digest,
            "Fecha: 01/03/2024\nDolor lumbar\n\n---\n\nFecha: 01/01/2024\nControl anual"
        );
    }

    #[test]
    fn report_style_uses_long_dates() {
        let digest = format_encounters(
            &[
                encounter("a", "2024-01-01", "Control anual"),
                encounter("b", "2024-03-01", "Dolor lumbar"),
            ],
            EncounterStyle::Report,
        );
        assert_eq!(
            digest,
            "Fecha: 1 de marzo de 2024\nDolor lumbar\n------------------------------------\nFecha: 1 de enero de 2024\nControl anual"
        );
    }

    #[test]
    fn malformed_date_falls_back_to_raw_text() {
        let digest = format_encounters(
            &[encounter("a", "15 del mes pasado", "Revisión")],
            EncounterStyle::Report,
        );
        assert_eq!(digest, "Fecha: 15 del mes pasado\nRevisión");
    }

    #[test]
    fn late_evening_offset_keeps_recorded_day() {
        let encounters = [encounter("a", "2024-03-01T22:00:00-05:00", "Nota")];
        assert_eq!(
            format_encounters(&encounters, EncounterStyle::Summary),
            "Fecha: 01/03/2024\nNota"
        );
        assert_eq!(
            format_encounters(&encounters, EncounterStyle::Report),
            "Fecha: 1 de marzo de 2024\nNota"
        );
    }

    #[test]
    fn offset_timestamps_sort_by_instant() {
        let encounters = vec![
            encounter("quito", "2024-03-01T22:00:00-05:00", "x"),
            encounter("utc", "2024-03-02T01:00:00Z", "y"),
        ];
        assert_eq!(ids(sort_encounters(&encounters)), ["quito", "utc"]);
    }

    #[test]
    fn blank_details_get_sentinel() {
        let digest = format_encounters(
            &[encounter("a", "2024-12-24", "   ")],
            EncounterStyle::Summary,
        );
        assert_eq!(digest, "Fecha: 24/12/2024\nSin detalles registrados.");
    }

    #[test]
    fn long_dates_name_every_month() {
        let date = NaiveDate::from_ymd_opt(2023, 9, 5).unwrap();
        assert_eq!(long_spanish_date(date), "5 de septiembre de 2023");
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(long_spanish_date(date), "31 de diciembre de 2023");
    }
}
