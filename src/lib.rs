pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{HttpPageFetcher, LocalStorage};
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use core::{etl::EtlEngine, pipeline::ScrapePipeline};
pub use utils::error::{Result, ScrapeError};
