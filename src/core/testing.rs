//! In-memory page source for unit tests.

use crate::domain::ports::{Document, PageSource};
use crate::utils::error::FetchError;
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) const BASE: &str = "https://results.test";

#[derive(Default)]
pub(crate) struct StaticPages {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticPages {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a page under a path relative to [`BASE`].
    pub(crate) fn with_page(mut self, path: &str, body: impl Into<String>) -> Self {
        self.pages.insert(format!("{BASE}{path}"), body.into());
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PageSource for StaticPages {
    async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .map(|body| Document::new(url, body.clone()))
            .ok_or_else(|| FetchError::Missing {
                url: url.to_string(),
            })
    }
}

pub(crate) fn listing_page(rows: &[(&str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(id, name)| {
            format!(
                r#"<tr><td>01.06.2024 Vienna</td><td>AUT</td><td><a href="/Event/{id}">{name}</a></td></tr>"#
            )
        })
        .collect();
    format!("<html><body><table><tr><th>Date</th><th>Nation</th><th>Event</th></tr>{rows}</table></body></html>")
}

/// `(athlete href, athlete name, time)`
pub(crate) type Row<'a> = (&'a str, &'a str, &'a str);

/// An event page with one discipline section per `(anchor id, wood text, rows)`.
pub(crate) fn event_page(sections: &[(&str, &str, &[Row<'_>])]) -> String {
    let mut body = String::from(
        "<html><body><h1>Test Event</h1><dl><dt>Date</dt><dd>01.06.2024\nSaturday</dd><dt>Location</dt><dd>Vienna</dd></dl>",
    );
    for (anchor, wood, rows) in sections {
        body.push_str(&format!(
            r#"<h3><a id="{anchor}"></a>{anchor}</h3><p>Competition Wood: **{wood}**</p><table><tr><th>Rank</th><th>Name</th><th>Nation</th><th>Points</th><th>Time</th><th></th></tr>"#
        ));
        for (i, (href, name, time)) in rows.iter().enumerate() {
            body.push_str(&format!(
                r#"<tr><td>{}</td><td><a href="{href}">{name}</a></td><td>AUT</td><td>10</td><td>{time}</td><td></td></tr>"#,
                i + 1
            ));
        }
        body.push_str("</table>");
    }
    body.push_str("</body></html>");
    body
}
