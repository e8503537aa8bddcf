//! Athlete identity resolution and cross-season aggregation.
//!
//! A name query binds to the first athlete link whose text contains the query,
//! scanning recent events newest first. There is no ranking: a query that is a
//! substring of several competitors' names binds to whichever is seen first.

use crate::core::catalog::EventCatalog;
use crate::core::event_page::scrape_event;
use crate::core::html::{first_link, text_of, CELL, LINK, ROW};
use crate::core::site::SiteUrls;
use crate::domain::model::{
    AthleteIdentity, AthleteQuery, BestResult, Discipline, EventRef, ResultRecord,
};
use crate::domain::ports::{Document, PageSource};
use chrono::Datelike;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

pub const DEFAULT_SEARCH_SEASONS: usize = 3;
pub const DEFAULT_SEARCH_EVENTS_PER_SEASON: usize = 5;
pub const DEFAULT_HISTORY_YEARS: usize = 10;

static ATHLETE_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Athlete/\d+").expect("athlete href pattern"));
static HEADINGS: LazyLock<[Selector; 2]> = LazyLock::new(|| {
    ["h2", "h1"].map(|css| Selector::parse(css).expect("heading selector"))
});
static SUB_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3").expect("h3 selector"));

const BEST_RESULTS_HEADING: &str = "Best Discipline Results";

#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub search_seasons: usize,
    pub search_events_per_season: usize,
    pub history_years: usize,
    pub current_year: i32,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            search_seasons: DEFAULT_SEARCH_SEASONS,
            search_events_per_season: DEFAULT_SEARCH_EVENTS_PER_SEASON,
            history_years: DEFAULT_HISTORY_YEARS,
            current_year: chrono::Local::now().year(),
        }
    }
}

/// Outcome of one athlete query. `identity` is `None` when nobody matched;
/// `records` is then empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AthleteResults {
    pub identity: Option<AthleteIdentity>,
    pub records: Vec<ResultRecord>,
}

/// `count` seasons ending at `current_year`, newest first.
pub fn recent_seasons(current_year: i32, count: usize) -> Vec<String> {
    (0..count)
        .map(|offset| (current_year - offset as i32).to_string())
        .collect()
}

pub fn name_matches(candidate: &str, query: &str) -> bool {
    candidate.to_lowercase().contains(&query.to_lowercase())
}

/// Collapses records with the same event, discipline and time, keeping the
/// first occurrence.
pub fn dedup_records(records: Vec<ResultRecord>) -> Vec<ResultRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.dedup_key()))
        .collect()
}

/// First athlete-profile link on the page whose text contains `query`.
pub fn find_athlete_link(doc: &Document, query: &str, site: &SiteUrls) -> Option<AthleteIdentity> {
    let html = doc.html();
    let found = html
        .select(&LINK)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            ATHLETE_HREF.is_match(href).then(|| (text_of(a), href))
        })
        .find(|(name, _)| name_matches(name, query))
        .and_then(|(display_name, href)| {
            site.resolve(href).map(|profile_url| AthleteIdentity {
                display_name,
                profile_url,
            })
        });
    found
}

/// Display name from the athlete page heading.
pub fn read_display_name(doc: &Document) -> Option<String> {
    let html = doc.html();
    let name = HEADINGS
        .iter()
        .find_map(|selector| html.select(selector).map(text_of).find(|t| !t.is_empty()));
    name
}

/// Rows of the "Best Discipline Results" table, restricted to the two
/// tracked disciplines.
pub fn parse_best_results(doc: &Document, athlete: &str) -> Vec<BestResult> {
    let html = doc.html();
    let Some(heading) = html
        .select(&SUB_HEADING)
        .find(|h| text_of(*h).contains(BEST_RESULTS_HEADING))
    else {
        return Vec::new();
    };

    let heading_id = heading.id();
    let table = html
        .tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != heading_id)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table");
    let Some(table) = table else {
        return Vec::new();
    };

    let results = table
        .select(&ROW)
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<_> = row.select(&CELL).collect();
            if cells.len() < 3 {
                return None;
            }
            let label = first_link(cells[0])
                .map(|(text, _)| text)
                .unwrap_or_else(|| text_of(cells[0]));
            let discipline = Discipline::mentioned_in(&label)?;
            let event = first_link(cells[2])
                .map(|(text, _)| text)
                .unwrap_or_else(|| text_of(cells[2]));
            Some(BestResult {
                athlete: athlete.to_string(),
                discipline,
                best_time: text_of(cells[1]),
                event,
                marker: cells.get(3).map(|c| text_of(*c)).unwrap_or_default(),
            })
        })
        .collect();
    results
}

pub struct AthleteResolver<'a, P: PageSource> {
    source: &'a P,
    site: &'a SiteUrls,
    catalog: EventCatalog<'a, P>,
    options: ResolverOptions,
}

impl<'a, P: PageSource> AthleteResolver<'a, P> {
    pub fn new(source: &'a P, site: &'a SiteUrls) -> Self {
        Self::with_options(source, site, ResolverOptions::default())
    }

    pub fn with_options(source: &'a P, site: &'a SiteUrls, options: ResolverOptions) -> Self {
        Self {
            source,
            site,
            catalog: EventCatalog::new(source, site),
            options,
        }
    }

    /// Identify, scan the target seasons, deduplicate.
    pub async fn resolve(&self, query: &AthleteQuery, seasons: &[String]) -> AthleteResults {
        let Some(identity) = self.identify(query).await else {
            tracing::info!("No athlete found for {:?}", query);
            return AthleteResults::default();
        };
        tracing::info!(
            "Resolved athlete {} ({})",
            identity.display_name,
            identity.profile_url
        );

        let seasons = self.target_seasons(seasons);
        let records = self.scan(&identity, &seasons).await;
        let before = records.len();
        let records = dedup_records(records);
        tracing::info!(
            "{} results for {} across {} seasons ({} duplicates dropped)",
            records.len(),
            identity.display_name,
            seasons.len(),
            before - records.len()
        );

        AthleteResults {
            identity: Some(identity),
            records,
        }
    }

    pub async fn identify(&self, query: &AthleteQuery) -> Option<AthleteIdentity> {
        match query {
            AthleteQuery::Profile(reference) => self.identify_profile(reference).await,
            AthleteQuery::Name(name) => self.search_by_name(name).await,
        }
    }

    async fn identify_profile(&self, reference: &str) -> Option<AthleteIdentity> {
        let profile_url = self.site.resolve(reference)?;
        match self.source.fetch(&profile_url).await {
            Ok(doc) => read_display_name(&doc).map(|display_name| AthleteIdentity {
                display_name,
                profile_url,
            }),
            Err(e) => {
                tracing::warn!("Athlete profile unavailable: {}", e);
                None
            }
        }
    }

    async fn search_by_name(&self, name: &str) -> Option<AthleteIdentity> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let seasons = recent_seasons(self.options.current_year, self.options.search_seasons);
        for season in &seasons {
            let events = self
                .catalog
                .list_events(Some(season), Some(self.options.search_events_per_season))
                .await;
            for event in &events {
                tracing::debug!("Searching {} for '{}'", event.name, name);
                let found = match self.source.fetch(&event.url).await {
                    Ok(doc) => find_athlete_link(&doc, name, self.site),
                    Err(e) => {
                        tracing::warn!("Skipping event {} during search: {}", event.name, e);
                        None
                    }
                };
                if found.is_some() {
                    return found;
                }
            }
        }
        None
    }

    pub fn target_seasons(&self, explicit: &[String]) -> Vec<String> {
        if explicit.is_empty() {
            recent_seasons(self.options.current_year, self.options.history_years)
        } else {
            explicit.to_vec()
        }
    }

    /// Every row naming the athlete, across all events of `seasons`, before
    /// deduplication.
    pub async fn scan(&self, identity: &AthleteIdentity, seasons: &[String]) -> Vec<ResultRecord> {
        let mut records = Vec::new();
        for season in seasons {
            let events = self.catalog.list_events(Some(season), None).await;
            tracing::info!("Season {}: scanning {} events", season, events.len());
            for event in &events {
                self.collect_event(event, identity, &mut records).await;
            }
        }
        records
    }

    async fn collect_event(
        &self,
        event: &EventRef,
        identity: &AthleteIdentity,
        records: &mut Vec<ResultRecord>,
    ) {
        let Some(results) = scrape_event(self.source, self.site, event).await else {
            return;
        };
        records.extend(
            results
                .records
                .into_iter()
                .filter(|r| name_matches(&r.athlete_name, &identity.display_name)),
        );
    }

    pub async fn best_results(&self, identity: &AthleteIdentity) -> Vec<BestResult> {
        if identity.profile_url.is_empty() {
            return Vec::new();
        }
        match self.source.fetch(&identity.profile_url).await {
            Ok(doc) => parse_best_results(&doc, &identity.display_name),
            Err(e) => {
                tracing::warn!("Best results unavailable: {}", e);
                Vec::new()
            }
        }
    }
}
