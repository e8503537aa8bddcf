use crate::adapters::http::HttpPageFetcher;
use crate::core::athlete::{name_matches, AthleteResolver, ResolverOptions};
use crate::core::catalog::EventCatalog;
use crate::core::event_page::scrape_event;
use crate::core::export::{render_discipline, render_records, render_summary, summarize};
use crate::core::site::SiteUrls;
use crate::core::{ConfigProvider, PageSource, Pipeline, Storage};
use crate::domain::model::{
    AthleteIdentity, BestResult, Discipline, Extraction, ScrapePlan, TransformResult,
};
use crate::utils::error::Result;
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const ARCHIVE_NAME: &str = "timbersports_results.zip";

#[derive(Serialize)]
struct AthleteReport<'a> {
    identity: &'a AthleteIdentity,
    best_results: &'a [BestResult],
}

pub struct ScrapePipeline<S: Storage, C: ConfigProvider, P: PageSource = HttpPageFetcher> {
    storage: S,
    config: C,
    source: P,
    site: SiteUrls,
    resolver_options: ResolverOptions,
}

impl<S: Storage, C: ConfigProvider> ScrapePipeline<S, C, HttpPageFetcher> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let source = HttpPageFetcher::from_config(&config)?;
        Self::with_source(storage, config, source)
    }
}

impl<S: Storage, C: ConfigProvider, P: PageSource> ScrapePipeline<S, C, P> {
    pub fn with_source(storage: S, config: C, source: P) -> Result<Self> {
        let site = SiteUrls::new(config.base_url())?;
        Ok(Self {
            storage,
            config,
            source,
            site,
            resolver_options: ResolverOptions::default(),
        })
    }

    pub fn with_resolver_options(mut self, options: ResolverOptions) -> Self {
        self.resolver_options = options;
        self
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, P: PageSource> Pipeline for ScrapePipeline<S, C, P> {
    async fn extract(&self) -> Result<Extraction> {
        match self.config.scrape_plan() {
            ScrapePlan::Events {
                seasons,
                limit,
                athlete_filter,
            } => {
                let catalog = EventCatalog::new(&self.source, &self.site);
                let events = catalog.events_for(&seasons, limit).await;
                tracing::info!("Scraping {} events", events.len());

                let mut records = Vec::new();
                for event in &events {
                    tracing::info!("Scraping: {}", event.name);
                    if let Some(results) = scrape_event(&self.source, &self.site, event).await {
                        records.extend(results.records);
                    }
                }

                if let Some(filter) = athlete_filter.as_deref() {
                    records.retain(|r| name_matches(&r.athlete_name, filter));
                    tracing::info!("{} results match athlete filter '{}'", records.len(), filter);
                }

                Ok(Extraction {
                    records,
                    ..Default::default()
                })
            }
            ScrapePlan::Athlete { query, seasons } => {
                let resolver = AthleteResolver::with_options(
                    &self.source,
                    &self.site,
                    self.resolver_options.clone(),
                );
                let results = resolver.resolve(&query, &seasons).await;
                let best_results = match &results.identity {
                    Some(identity) => resolver.best_results(identity).await,
                    None => Vec::new(),
                };

                Ok(Extraction {
                    records: results.records,
                    athlete: results.identity,
                    best_results,
                })
            }
        }
    }

    async fn transform(&self, data: Extraction) -> Result<TransformResult> {
        let csv_output = render_records(&data.records, b',')?;
        let tsv_output = render_records(&data.records, b'\t')?;

        let mut discipline_outputs = Vec::new();
        for discipline in Discipline::ALL {
            if data.records.iter().any(|r| r.discipline == discipline) {
                discipline_outputs.push((discipline, render_discipline(&data.records, discipline)?));
            }
        }

        let summary_output = render_summary(&summarize(&data.records))?;

        let athlete_json = match &data.athlete {
            Some(identity) => Some(serde_json::to_string_pretty(&AthleteReport {
                identity,
                best_results: &data.best_results,
            })?),
            None => None,
        };

        Ok(TransformResult {
            records: data.records,
            csv_output,
            tsv_output,
            discipline_outputs,
            summary_output,
            athlete_json,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = format!("{}/{}", self.config.output_path(), ARCHIVE_NAME);

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>("results.csv", FileOptions::default())?;
            zip.write_all(result.csv_output.as_bytes())?;

            zip.start_file::<_, ()>("results.tsv", FileOptions::default())?;
            zip.write_all(result.tsv_output.as_bytes())?;

            for (discipline, csv) in &result.discipline_outputs {
                zip.start_file::<_, ()>(
                    format!("{}_results.csv", discipline.code()),
                    FileOptions::default(),
                )?;
                zip.write_all(csv.as_bytes())?;
            }

            zip.start_file::<_, ()>("athlete_summary.csv", FileOptions::default())?;
            zip.write_all(result.summary_output.as_bytes())?;

            if let Some(json) = &result.athlete_json {
                zip.start_file::<_, ()>("athlete.json", FileOptions::default())?;
                zip.write_all(json.as_bytes())?;
            }

            zip.finish()?.into_inner()
        };

        tracing::debug!(
            "Writing {} ({} bytes, {} records)",
            ARCHIVE_NAME,
            zip_data.len(),
            result.records.len()
        );
        self.storage.write_file(ARCHIVE_NAME, &zip_data).await?;

        Ok(output_path)
    }
}
