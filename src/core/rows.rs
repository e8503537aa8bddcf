use crate::core::html::{first_link, text_of, CELL, LEVEL_LABEL, ROW};
use crate::core::site::SiteUrls;
use crate::domain::model::{Discipline, ResultRecord, WoodSpec};
use scraper::ElementRef;

/// Fewer cells than this marks a summary or malformed row.
pub const MIN_CELLS: usize = 4;

/// Everything read from one results row. Rank, level, nation and points are
/// not part of [`ResultRecord`] yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedRow {
    #[allow(dead_code)]
    pub rank: String,
    pub athlete_name: String,
    pub athlete_profile_url: String,
    #[allow(dead_code)]
    pub level: Option<String>,
    #[allow(dead_code)]
    pub nation: String,
    #[allow(dead_code)]
    pub points: String,
    pub time_text: String,
    pub markers: Vec<String>,
}

/// Values shared by every row of one discipline table.
#[derive(Debug, Clone, Copy)]
pub struct SectionContext<'a> {
    pub discipline: Discipline,
    pub wood: &'a WoodSpec,
    pub event_name: &'a str,
    pub event_date: &'a str,
}

impl ParsedRow {
    pub(crate) fn into_record(self, ctx: &SectionContext<'_>) -> ResultRecord {
        ResultRecord {
            athlete_name: self.athlete_name,
            athlete_profile_url: self.athlete_profile_url,
            discipline: ctx.discipline,
            time_text: self.time_text,
            wood_size_mm: ctx.wood.size_mm,
            wood_species: ctx.wood.species.clone(),
            event_date: ctx.event_date.to_string(),
            event_name: ctx.event_name.to_string(),
            markers: self.markers,
        }
    }
}

pub(crate) fn parse_row(row: ElementRef<'_>, site: &SiteUrls) -> Option<ParsedRow> {
    let cells: Vec<_> = row.select(&CELL).collect();
    if cells.len() < MIN_CELLS {
        return None;
    }

    let name_cell = cells[1];
    let (athlete_name, athlete_profile_url) = match first_link(name_cell) {
        Some((name, href)) => (name, site.resolve(href).unwrap_or_default()),
        None => (text_of(name_cell), String::new()),
    };
    let level = name_cell.select(&LEVEL_LABEL).next().map(text_of);

    let cell_text = |i: usize| cells.get(i).map(|c| text_of(*c)).unwrap_or_default();

    Some(ParsedRow {
        rank: cell_text(0),
        athlete_name,
        athlete_profile_url,
        level,
        nation: cell_text(2),
        points: cell_text(3),
        time_text: cell_text(4),
        markers: parse_markers(&cell_text(5)),
    })
}

/// Splits a marker cell ("WR, PB") on commas into its tags, keeping
/// first-seen order. A tag may contain spaces ("World Record").
pub fn parse_markers(text: &str) -> Vec<String> {
    let mut markers: Vec<String> = Vec::new();
    for tag in text
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
    {
        if !markers.iter().any(|m| m == tag) {
            markers.push(tag.to_string());
        }
    }
    markers
}

/// Parses every data row of a discipline table. The first row is the header
/// and is always skipped.
pub fn parse_results_table(
    table: ElementRef<'_>,
    ctx: &SectionContext<'_>,
    site: &SiteUrls,
) -> Vec<ResultRecord> {
    table
        .select(&ROW)
        .skip(1)
        .filter_map(|row| parse_row(row, site))
        .map(|row| row.into_record(ctx))
        .collect()
}
