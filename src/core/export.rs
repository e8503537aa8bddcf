use crate::domain::model::{Discipline, ResultRecord};
use crate::utils::error::{Result, ScrapeError};
use serde::Serialize;
use std::collections::BTreeMap;

pub const RESULT_HEADERS: [&str; 9] = [
    "Competitor profile URL",
    "Competitor Name",
    "Discipline",
    "Time",
    "Size",
    "Species",
    "Event Date",
    "Event Name",
    "Special Markers",
];

pub const SUMMARY_HEADERS: [&str; 4] = ["Competitor Name", "Discipline", "Best Time", "Events"];

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    profile_url: &'a str,
    name: &'a str,
    discipline: &'static str,
    time: &'a str,
    size_mm: Option<u32>,
    species: Option<&'a str>,
    event_date: &'a str,
    event_name: &'a str,
    markers: String,
}

impl<'a> From<&'a ResultRecord> for ExportRow<'a> {
    fn from(record: &'a ResultRecord) -> Self {
        Self {
            profile_url: &record.athlete_profile_url,
            name: &record.athlete_name,
            discipline: record.discipline.code(),
            time: &record.time_text,
            size_mm: record.wood_size_mm,
            species: record.wood_species.as_deref(),
            event_date: &record.event_date,
            event_name: &record.event_name,
            markers: record.markers.join(", "),
        }
    }
}

/// Best time and number of results per competitor and discipline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthleteSummary {
    pub name: String,
    pub discipline: &'static str,
    pub best_time: String,
    pub events: usize,
}

fn writer(delimiter: u8) -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ScrapeError::ProcessingError {
            message: format!("flushing CSV output: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| ScrapeError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

/// Renders records with the fixed result columns. The header is written even
/// when there are no records.
pub fn render_records<'a, I>(records: I, delimiter: u8) -> Result<String>
where
    I: IntoIterator<Item = &'a ResultRecord>,
{
    let mut wtr = writer(delimiter);
    wtr.write_record(RESULT_HEADERS)?;
    for record in records {
        wtr.serialize(ExportRow::from(record))?;
    }
    finish(wtr)
}

pub fn render_discipline(records: &[ResultRecord], discipline: Discipline) -> Result<String> {
    render_records(
        records.iter().filter(|r| r.discipline == discipline),
        b',',
    )
}

/// Groups by competitor and discipline code, ordered by name. The best time is
/// the lowest numeric time; rows without a numeric time only count as events.
pub fn summarize(records: &[ResultRecord]) -> Vec<AthleteSummary> {
    let mut groups: BTreeMap<(String, &'static str), (Option<(f64, String)>, usize)> =
        BTreeMap::new();

    for record in records {
        let key = (record.athlete_name.clone(), record.discipline.code());
        let (best, events) = groups.entry(key).or_insert((None, 0));
        *events += 1;
        if let Some(seconds) = record.time_seconds() {
            if best.as_ref().map_or(true, |(current, _)| seconds < *current) {
                *best = Some((seconds, record.time_text.trim().to_string()));
            }
        }
    }

    groups
        .into_iter()
        .map(|((name, discipline), (best, events))| AthleteSummary {
            name,
            discipline,
            best_time: best.map(|(_, text)| text).unwrap_or_default(),
            events,
        })
        .collect()
}

pub fn render_summary(summary: &[AthleteSummary]) -> Result<String> {
    let mut wtr = writer(b',');
    wtr.write_record(SUMMARY_HEADERS)?;
    for row in summary {
        wtr.serialize(row)?;
    }
    finish(wtr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, discipline: Discipline, time: &str, event: &str) -> ResultRecord {
        ResultRecord {
            athlete_name: name.to_string(),
            athlete_profile_url: format!("https://results.test/Athlete/{}", name.len()),
            discipline,
            time_text: time.to_string(),
            wood_size_mm: Some(320),
            wood_species: Some("WhitePine".to_string()),
            event_date: "01.06.2024".to_string(),
            event_name: event.to_string(),
            markers: vec![],
        }
    }

    #[test]
    fn test_render_records_csv_and_tsv() {
        let mut jane = record("Jane Roe", Discipline::UnderhandChop, "17.64", "Vienna Cup");
        jane.markers = vec!["WR".to_string(), "PB".to_string()];
        let mut john = record("John Doe", Discipline::StandingBlockChop, "19.02", "Vienna Cup");
        john.wood_size_mm = None;
        john.wood_species = None;
        let records = vec![jane, john];

        let csv = render_records(&records, b',').unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], RESULT_HEADERS.join(","));
        assert_eq!(
            lines[1],
            "https://results.test/Athlete/8,Jane Roe,UH,17.64,320,WhitePine,01.06.2024,Vienna Cup,\"WR, PB\""
        );
        assert_eq!(
            lines[2],
            "https://results.test/Athlete/8,John Doe,SB,19.02,,,01.06.2024,Vienna Cup,"
        );

        let tsv = render_records(&records, b'\t').unwrap();
        assert!(tsv.lines().next().unwrap().starts_with("Competitor profile URL\tCompetitor Name"));
        assert!(tsv.contains("Jane Roe\tUH\t17.64\t320"));
    }

    #[test]
    fn test_render_empty_keeps_header() {
        let csv = render_records(&Vec::<ResultRecord>::new(), b',').unwrap();
        assert_eq!(csv.trim_end(), RESULT_HEADERS.join(","));
    }

    #[test]
    fn test_render_discipline_filters() {
        let records = vec![
            record("Jane Roe", Discipline::UnderhandChop, "17.64", "A"),
            record("Jane Roe", Discipline::StandingBlockChop, "14.10", "A"),
        ];
        let uh = render_discipline(&records, Discipline::UnderhandChop).unwrap();
        assert_eq!(uh.lines().count(), 2);
        assert!(uh.contains(",UH,"));
        assert!(!uh.contains(",SB,"));
    }

    #[test]
    fn test_summarize_best_time_and_count() {
        let records = vec![
            record("Jane Roe", Discipline::UnderhandChop, "17.64", "A"),
            record("Jane Roe", Discipline::UnderhandChop, "16.90", "B"),
            record("Jane Roe", Discipline::UnderhandChop, "DSQ", "C"),
            record("Jane Roe", Discipline::StandingBlockChop, "", "A"),
            record("Ann Four", Discipline::UnderhandChop, "21.00", "A"),
        ];

        let summary = summarize(&records);

        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].name, "Ann Four");
        assert_eq!(summary[1].name, "Jane Roe");
        assert_eq!(summary[1].discipline, "SB");
        assert_eq!(summary[1].best_time, "");
        assert_eq!(summary[2].discipline, "UH");
        assert_eq!(summary[2].best_time, "16.90");
        assert_eq!(summary[2].events, 3);

        let csv = render_summary(&summary).unwrap();
        assert!(csv.starts_with("Competitor Name,Discipline,Best Time,Events"));
        assert!(csv.contains("Jane Roe,UH,16.90,3"));
    }
}
