use crate::core::locator::{locate, parse_event_detail};
use crate::core::rows::{parse_results_table, SectionContext};
use crate::core::site::SiteUrls;
use crate::domain::model::{Discipline, EventDetail, EventRef, ResultRecord};
use crate::domain::ports::{Document, PageSource};

/// Everything taken from one event page.
#[derive(Debug, Clone, Default)]
pub struct EventResults {
    pub detail: EventDetail,
    pub contested: Vec<Discipline>,
    pub records: Vec<ResultRecord>,
}

/// Extracts both disciplines from a fetched event page. A discipline without
/// an anchor was not contested and contributes nothing.
pub fn extract_event(doc: &Document, event: &EventRef, site: &SiteUrls) -> EventResults {
    let html = doc.html();
    let detail = parse_event_detail(&html, &event.name);
    let mut results = EventResults {
        detail,
        ..Default::default()
    };

    for discipline in Discipline::ALL {
        let Some(section) = locate(&html, discipline) else {
            tracing::debug!("{} not contested at {}", discipline, event.name);
            continue;
        };
        results.contested.push(discipline);

        let Some(table) = section.table else {
            tracing::warn!("{} at {} has no results table", discipline, event.name);
            continue;
        };
        let ctx = SectionContext {
            discipline,
            wood: &section.wood,
            event_name: &event.name,
            event_date: &results.detail.date,
        };
        let records = parse_results_table(table, &ctx, site);
        results.records.extend(records);
    }

    results
}

/// Fetches and extracts one event. A failed fetch yields `None`.
pub async fn scrape_event<P: PageSource>(
    source: &P,
    site: &SiteUrls,
    event: &EventRef,
) -> Option<EventResults> {
    match source.fetch(&event.url).await {
        Ok(doc) => Some(extract_event(&doc, event, site)),
        Err(e) => {
            tracing::warn!("Skipping event {}: {}", event.name, e);
            None
        }
    }
}
