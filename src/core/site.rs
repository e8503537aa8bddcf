use crate::utils::error::{Result, ScrapeError};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://data.stihl-timbersports.com";

/// Addresses on the results site, all resolved against one origin.
#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: Url,
}

impl SiteUrls {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| ScrapeError::InvalidConfigValueError {
            field: "base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { base })
    }

    pub fn listing_url(&self, season: Option<&str>) -> String {
        let mut url = self.join_or_base("/Results");
        if let Some(season) = season {
            url.query_pairs_mut().append_pair("season", season);
        }
        url.into()
    }

    /// Resolves a link target from a page on this site. Absolute targets are
    /// kept as they are, so the origin is never prefixed twice.
    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        self.base.join(href).ok().map(String::from)
    }

    fn join_or_base(&self, path: &str) -> Url {
        self.base.join(path).unwrap_or_else(|_| self.base.clone())
    }
}
