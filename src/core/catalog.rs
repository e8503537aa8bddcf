use crate::core::html::{text_of, CELL, LINK, ROW};
use crate::core::site::SiteUrls;
use crate::domain::model::{EventRef, SeasonSelection};
use crate::domain::ports::{Document, PageSource};
use regex::Regex;
use std::sync::LazyLock;

static EVENT_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Event/\d+").expect("event href pattern"));

/// Parses a results listing page into event references, in row order.
///
/// Listing pages mix event rows with other content; rows without an event
/// link are skipped. `cap` stops the scan once that many events were found.
pub fn parse_listing(doc: &Document, site: &SiteUrls, cap: Option<usize>) -> Vec<EventRef> {
    let html = doc.html();
    let mut events = Vec::new();

    for row in html.select(&ROW) {
        if cap.is_some_and(|cap| events.len() >= cap) {
            break;
        }

        let Some(link) = row.select(&LINK).find(|a| {
            a.value()
                .attr("href")
                .is_some_and(|href| EVENT_HREF.is_match(href))
        }) else {
            continue;
        };
        let Some(url) = link.value().attr("href").and_then(|href| site.resolve(href)) else {
            continue;
        };

        let cells: Vec<_> = row.select(&CELL).collect();
        let (date_location_text, nation_text) = match cells.as_slice() {
            [first, second, ..] => (text_of(*first), text_of(*second)),
            _ => (String::new(), String::new()),
        };

        events.push(EventRef {
            name: text_of(link),
            url,
            date_location_text,
            nation_text,
        });
    }

    events
}

pub struct EventCatalog<'a, P: PageSource> {
    source: &'a P,
    site: &'a SiteUrls,
}

impl<'a, P: PageSource> EventCatalog<'a, P> {
    pub fn new(source: &'a P, site: &'a SiteUrls) -> Self {
        Self { source, site }
    }

    pub async fn list_events(&self, season: Option<&str>, cap: Option<usize>) -> Vec<EventRef> {
        let url = self.site.listing_url(season);
        match self.source.fetch(&url).await {
            Ok(doc) => {
                let events = parse_listing(&doc, self.site, cap);
                tracing::debug!(
                    "Found {} events for season {}",
                    events.len(),
                    season.unwrap_or("all")
                );
                events
            }
            Err(e) => {
                tracing::warn!("Listing unavailable, no events taken from it: {}", e);
                Vec::new()
            }
        }
    }

    /// One listing per season, concatenated in season order. `limit` applies
    /// to the combined list.
    pub async fn list_events_for_seasons(
        &self,
        seasons: &[String],
        limit: Option<usize>,
    ) -> Vec<EventRef> {
        let mut events = Vec::new();
        for season in seasons {
            events.extend(self.list_events(Some(season), None).await);
        }
        if let Some(limit) = limit {
            events.truncate(limit);
        }
        events
    }

    /// Probes each year from `end_year` down to `start_year`; one request per
    /// year. Returns the years that list at least one event, descending.
    pub async fn detect_available_seasons(&self, start_year: i32, end_year: i32) -> Vec<String> {
        let mut seasons = Vec::new();
        for year in (start_year..=end_year).rev() {
            let season = year.to_string();
            if !self.list_events(Some(&season), Some(1)).await.is_empty() {
                seasons.push(season);
            }
        }
        tracing::info!(
            "Detected {} seasons between {} and {}",
            seasons.len(),
            start_year,
            end_year
        );
        seasons
    }

    pub async fn events_for(
        &self,
        selection: &SeasonSelection,
        limit: Option<usize>,
    ) -> Vec<EventRef> {
        match selection {
            SeasonSelection::All => {
                let mut events = self.list_events(None, None).await;
                if let Some(limit) = limit {
                    events.truncate(limit);
                }
                events
            }
            SeasonSelection::Explicit(seasons) => {
                self.list_events_for_seasons(seasons, limit).await
            }
            SeasonSelection::Detect {
                start_year,
                end_year,
            } => {
                let seasons = self.detect_available_seasons(*start_year, *end_year).await;
                self.list_events_for_seasons(&seasons, limit).await
            }
        }
    }
}
