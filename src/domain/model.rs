use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of a results listing page. Identified by `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRef {
    pub name: String,
    pub url: String,
    pub date_location_text: String,
    pub nation_text: String,
}

/// Best-effort header data of an event page; both text fields may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetail {
    pub name: String,
    pub date: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Discipline {
    UnderhandChop,
    StandingBlockChop,
}

impl Discipline {
    pub const ALL: [Discipline; 2] = [Discipline::UnderhandChop, Discipline::StandingBlockChop];

    pub fn label(self) -> &'static str {
        match self {
            Discipline::UnderhandChop => "Underhand Chop",
            Discipline::StandingBlockChop => "Standing Block Chop",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Discipline::UnderhandChop => "UH",
            Discipline::StandingBlockChop => "SB",
        }
    }

    /// Name used inside the round anchor ids, e.g. `Round2StandingBlockChop`.
    pub fn anchor_name(self) -> &'static str {
        match self {
            Discipline::UnderhandChop => "UnderhandChop",
            Discipline::StandingBlockChop => "StandingBlockChop",
        }
    }

    /// Matches a label as printed on the site. Only the two tracked labels
    /// map, and only when the trimmed text is exactly that label.
    pub fn from_label(label: &str) -> Option<Discipline> {
        let label = label.trim();
        Discipline::ALL.into_iter().find(|d| label == d.label())
    }

    /// First tracked discipline whose label appears anywhere in `text`.
    pub fn mentioned_in(text: &str) -> Option<Discipline> {
        Discipline::ALL.into_iter().find(|d| text.contains(d.label()))
    }

    pub fn code_for_label(label: &str) -> Option<&'static str> {
        Discipline::from_label(label).map(Discipline::code)
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Competition timber of one discipline section. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WoodSpec {
    pub size_mm: Option<u32>,
    pub species: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub athlete_name: String,
    pub athlete_profile_url: String,
    pub discipline: Discipline,
    pub time_text: String,
    pub wood_size_mm: Option<u32>,
    pub wood_species: Option<String>,
    pub event_date: String,
    pub event_name: String,
    pub markers: Vec<String>,
}

impl ResultRecord {
    /// Key under which repeated sightings of the same result collapse.
    pub fn dedup_key(&self) -> (String, Discipline, String) {
        (
            self.event_name.clone(),
            self.discipline,
            self.time_text.clone(),
        )
    }

    pub fn time_seconds(&self) -> Option<f64> {
        self.time_text.trim().parse::<f64>().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AthleteIdentity {
    pub display_name: String,
    pub profile_url: String,
}

/// A row of the "Best Discipline Results" table on an athlete page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestResult {
    pub athlete: String,
    pub discipline: Discipline,
    pub best_time: String,
    pub event: String,
    pub marker: String,
}

/// How an athlete query identifies the athlete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AthleteQuery {
    /// Case-insensitive substring of the display name.
    Name(String),
    /// Profile page reference, absolute or relative to the site origin.
    Profile(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonSelection {
    /// The unfiltered listing page.
    All,
    Explicit(Vec<String>),
    /// Probe every year in the range and keep the ones with events.
    Detect { start_year: i32, end_year: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrapePlan {
    Events {
        seasons: SeasonSelection,
        limit: Option<usize>,
        athlete_filter: Option<String>,
    },
    Athlete {
        query: AthleteQuery,
        /// Empty means the ten most recent seasons.
        seasons: Vec<String>,
    },
}

/// What `Pipeline::extract` hands to `transform`.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<ResultRecord>,
    pub athlete: Option<AthleteIdentity>,
    pub best_results: Vec<BestResult>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<ResultRecord>,
    pub csv_output: String,
    pub tsv_output: String,
    pub discipline_outputs: Vec<(Discipline, String)>,
    pub summary_output: String,
    pub athlete_json: Option<String>,
}
