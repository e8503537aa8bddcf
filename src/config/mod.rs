#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

/// First year probed by season detection unless configured otherwise.
pub const DEFAULT_START_YEAR: i32 = 2010;
