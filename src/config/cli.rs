use super::DEFAULT_START_YEAR;
use crate::core::site::DEFAULT_BASE_URL;
use crate::core::ConfigProvider;
use crate::domain::model::{AthleteQuery, ScrapePlan, SeasonSelection};
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::{self, Validate};
use chrono::Datelike;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "timber-etl")]
#[command(about = "Scrape STIHL TIMBERSPORTS chopping results into CSV/TSV archives")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Seasons to scrape, e.g. --season 2024,2023. Empty means the unfiltered listing.
    #[arg(long, value_delimiter = ',')]
    pub season: Vec<String>,

    /// Probe every year between --start-year and --end-year for events
    #[arg(long, conflicts_with = "season")]
    pub detect_seasons: bool,

    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    pub start_year: i32,

    /// Defaults to the current year
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Maximum number of events to scrape
    #[arg(long)]
    pub limit: Option<usize>,

    /// Athlete name. Filters event results, or is the search query with --athlete-mode
    #[arg(long)]
    pub athlete: Option<String>,

    /// Athlete profile URL; implies athlete mode
    #[arg(long)]
    pub athlete_url: Option<String>,

    #[arg(long, help = "Collect one athlete's results across seasons")]
    pub athlete_mode: bool,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Seconds to wait before each request
    #[arg(long, default_value_t = 1.0)]
    pub delay: f64,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn end_year(&self) -> i32 {
        self.end_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    fn season_selection(&self) -> SeasonSelection {
        if self.detect_seasons {
            SeasonSelection::Detect {
                start_year: self.start_year,
                end_year: self.end_year(),
            }
        } else if self.season.is_empty() {
            SeasonSelection::All
        } else {
            SeasonSelection::Explicit(self.season.clone())
        }
    }
}

impl ConfigProvider for CliConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay.max(0.0))
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    fn scrape_plan(&self) -> ScrapePlan {
        if let Some(url) = &self.athlete_url {
            return ScrapePlan::Athlete {
                query: AthleteQuery::Profile(url.clone()),
                seasons: self.season.clone(),
            };
        }
        if self.athlete_mode {
            if let Some(name) = &self.athlete {
                return ScrapePlan::Athlete {
                    query: AthleteQuery::Name(name.clone()),
                    seasons: self.season.clone(),
                };
            }
        }
        ScrapePlan::Events {
            seasons: self.season_selection(),
            limit: self.limit,
            athlete_filter: self.athlete.clone(),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_path("output_path", &self.output_path)?;

        for season in &self.season {
            validation::validate_season("season", season)?;
        }

        if self.detect_seasons {
            validation::validate_year_range(self.start_year, self.end_year())?;
        }

        if let Some(limit) = self.limit {
            validation::validate_positive_number("limit", limit, 1)?;
        }

        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(ScrapeError::InvalidConfigValueError {
                field: "delay".to_string(),
                value: self.delay.to_string(),
                reason: "Delay must be a non-negative number of seconds".to_string(),
            });
        }
        validation::validate_positive_number("timeout", self.timeout as usize, 1)?;

        if let Some(name) = &self.athlete {
            validation::validate_non_empty_string("athlete", name)?;
        }
        if let Some(url) = &self.athlete_url {
            validation::validate_non_empty_string("athlete_url", url)?;
        }
        if self.athlete_mode && self.athlete.is_none() && self.athlete_url.is_none() {
            return Err(ScrapeError::MissingConfigError {
                field: "athlete".to_string(),
            });
        }

        Ok(())
    }
}
