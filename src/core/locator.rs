use crate::core::html::{text_of, DEFINITION_TERM};
use crate::domain::model::{Discipline, EventDetail, WoodSpec};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Qualifying rounds vary per event; the anchor ids are tried in this order.
pub const ROUNDS: [u8; 3] = [1, 2, 3];

pub const WOOD_MARKER: &str = "Competition Wood:";

static ANCHOR_WITH_ID: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[id]").expect("anchor selector"));

static WOOD_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"{}\s*(?:\*\*([^*]+)\*\*|([^\n]+))", regex::escape(WOOD_MARKER));
    Regex::new(&pattern).expect("wood description pattern")
});
static WOOD_SIZE_CM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*cm").expect("wood size pattern"));
static WOOD_SPECIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z]+)\s*\(").expect("wood species pattern"));

/// The part of an event page that belongs to one discipline.
#[derive(Debug, Clone)]
pub struct DisciplineSection<'a> {
    pub discipline: Discipline,
    pub anchor_id: String,
    pub wood_text: Option<String>,
    pub wood: WoodSpec,
    pub table: Option<ElementRef<'a>>,
}

pub fn anchor_candidates(discipline: Discipline) -> impl Iterator<Item = String> {
    ROUNDS
        .into_iter()
        .map(move |round| format!("Round{}{}", round, discipline.anchor_name()))
}

/// Finds the section of `discipline`, or `None` when the event did not
/// contest it.
pub fn locate(html: &Html, discipline: Discipline) -> Option<DisciplineSection<'_>> {
    let (anchor_id, anchor) = anchor_candidates(discipline)
        .find_map(|id| find_anchor(html, &id).map(|anchor| (id, anchor)))?;

    let mut wood_text = None;
    let mut table = None;
    for element in elements_after(html, anchor) {
        match element.value().name() {
            "table" => {
                table = Some(element);
                break;
            }
            "p" if wood_text.is_none() => wood_text = wood_description(&text_of(element)),
            _ => {}
        }
    }

    let wood = wood_text.as_deref().map(parse_wood).unwrap_or_default();
    tracing::debug!(
        "{} anchored at #{} (wood: {:?}, table: {})",
        discipline,
        anchor_id,
        wood_text,
        table.is_some()
    );

    Some(DisciplineSection {
        discipline,
        anchor_id,
        wood_text,
        wood,
        table,
    })
}

fn find_anchor<'a>(html: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    html.select(&ANCHOR_WITH_ID)
        .find(|a| a.value().id() == Some(id))
}

/// Elements following `anchor` in document order.
fn elements_after<'a>(html: &'a Html, anchor: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    let anchor_id = anchor.id();
    html.tree
        .root()
        .descendants()
        .skip_while(move |node| node.id() != anchor_id)
        .skip(1)
        .filter_map(ElementRef::wrap)
}

/// Text after the wood marker of a paragraph, without emphasis markup.
pub fn wood_description(paragraph: &str) -> Option<String> {
    let caps = WOOD_DESCRIPTION.captures(paragraph)?;
    let text = caps.get(1).or_else(|| caps.get(2))?.as_str();
    let text = text.trim().trim_matches('*').trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Two independent best-effort extractions; either may miss.
pub fn parse_wood(text: &str) -> WoodSpec {
    let size_mm = WOOD_SIZE_CM
        .captures(text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .and_then(|cm| cm.checked_mul(10));
    let species = WOOD_SPECIES
        .captures(text)
        .map(|caps| caps[1].to_string());

    WoodSpec { size_mm, species }
}

pub fn parse_event_detail(html: &Html, name: &str) -> EventDetail {
    let date = definition(html, "Date")
        .and_then(|text| text.lines().next().map(|line| line.trim().to_string()))
        .unwrap_or_default();
    let location = definition(html, "Location").unwrap_or_default();

    EventDetail {
        name: name.to_string(),
        date,
        location,
    }
}

/// Text of the `dd` that follows the `dt` containing `term`.
fn definition(html: &Html, term: &str) -> Option<String> {
    let dt = html
        .select(&DEFINITION_TERM)
        .find(|dt| text_of(*dt).contains(term))?;
    dt.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "dd")
        .map(text_of)
}
