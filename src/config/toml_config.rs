use crate::core::site::DEFAULT_BASE_URL;
use crate::core::ConfigProvider;
use crate::domain::model::{AthleteQuery, ScrapePlan, SeasonSelection};
use crate::domain::ports::DEFAULT_USER_AGENT;
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::{self, Validate};
use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    pub athlete: Option<AthleteConfig>,
    pub load: LoadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub delay_seconds: Option<f64>,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            delay_seconds: None,
            timeout_seconds: None,
            user_agent: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeConfig {
    #[serde(default)]
    pub seasons: Vec<String>,
    pub detect_seasons: Option<bool>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub limit: Option<usize>,
    pub athlete_filter: Option<String>,
}

/// Presence of this section switches the run to athlete mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteConfig {
    pub name: Option<String>,
    pub profile_url: Option<String>,
    #[serde(default)]
    pub seasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ScrapeError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left
    /// as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn delay_seconds(&self) -> f64 {
        self.source.delay_seconds.unwrap_or(1.0)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(30)
    }

    pub fn detect_seasons(&self) -> bool {
        self.scrape.detect_seasons.unwrap_or(false)
    }

    pub fn end_year(&self) -> i32 {
        self.scrape
            .end_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    pub fn start_year(&self) -> i32 {
        self.scrape
            .start_year
            .unwrap_or(super::DEFAULT_START_YEAR)
    }

    pub fn verbose(&self) -> bool {
        self.logging.verbose.unwrap_or(false)
    }

    pub fn log_json(&self) -> bool {
        self.logging.json.unwrap_or(false)
    }

    fn athlete_query(athlete: &AthleteConfig) -> Option<AthleteQuery> {
        match (&athlete.profile_url, &athlete.name) {
            (Some(url), _) => Some(AthleteQuery::Profile(url.clone())),
            (None, Some(name)) => Some(AthleteQuery::Name(name.clone())),
            (None, None) => None,
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.base_url", &self.source.base_url)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;

        if let Some(delay) = self.source.delay_seconds {
            if !delay.is_finite() || delay < 0.0 {
                return Err(ScrapeError::InvalidConfigValueError {
                    field: "source.delay_seconds".to_string(),
                    value: delay.to_string(),
                    reason: "Delay must be a non-negative number of seconds".to_string(),
                });
            }
        }
        validation::validate_positive_number(
            "source.timeout_seconds",
            self.timeout_seconds() as usize,
            1,
        )?;

        for season in &self.scrape.seasons {
            validation::validate_season("scrape.seasons", season)?;
        }
        if self.detect_seasons() {
            validation::validate_year_range(self.start_year(), self.end_year())?;
        }
        if let Some(limit) = self.scrape.limit {
            validation::validate_positive_number("scrape.limit", limit, 1)?;
        }

        if let Some(athlete) = &self.athlete {
            if Self::athlete_query(athlete).is_none() {
                return Err(ScrapeError::MissingConfigError {
                    field: "athlete.name".to_string(),
                });
            }
            for season in &athlete.seasons {
                validation::validate_season("athlete.seasons", season)?;
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        &self.source.base_url
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_seconds().max(0.0))
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds())
    }

    fn scrape_plan(&self) -> ScrapePlan {
        if let Some(athlete) = &self.athlete {
            if let Some(query) = Self::athlete_query(athlete) {
                return ScrapePlan::Athlete {
                    query,
                    seasons: athlete.seasons.clone(),
                };
            }
        }

        let seasons = if self.detect_seasons() {
            SeasonSelection::Detect {
                start_year: self.start_year(),
                end_year: self.end_year(),
            }
        } else if self.scrape.seasons.is_empty() {
            SeasonSelection::All
        } else {
            SeasonSelection::Explicit(self.scrape.seasons.clone())
        };

        ScrapePlan::Events {
            seasons,
            limit: self.scrape.limit,
            athlete_filter: self.scrape.athlete_filter.clone(),
        }
    }

    fn user_agent(&self) -> &str {
        self.source.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
