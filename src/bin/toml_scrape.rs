use anyhow::Context;
use clap::Parser;
use timber_etl::core::athlete::{recent_seasons, ResolverOptions};
use timber_etl::core::site::SiteUrls;
use timber_etl::core::ConfigProvider;
use timber_etl::domain::model::{AthleteQuery, ScrapePlan, SeasonSelection};
use timber_etl::utils::error::ErrorSeverity;
use timber_etl::utils::{logger, validation::Validate};
use timber_etl::{EtlEngine, LocalStorage, ScrapePipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-scrape")]
#[command(about = "Results scraper driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "timber-scrape.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the listing pages that would be requested, without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure the file exists and is valid TOML");
            std::process::exit(1);
        }
    };

    logger::init(args.verbose || config.verbose(), config.log_json());
    tracing::info!("Loaded configuration from {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    if args.dry_run {
        perform_dry_run(&config)?;
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ScrapePipeline::new(storage, config)?;
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(Some(output_path)) => println!("Output saved to: {}", output_path),
        Ok(None) => println!("No results found"),
        Err(e) => {
            tracing::error!(
                "Scrape failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn load_config(path: &str) -> anyhow::Result<TomlConfig> {
    TomlConfig::from_file(path).with_context(|| format!("reading '{}'", path))
}

fn display_config_summary(config: &TomlConfig) {
    println!("Configuration Summary:");
    println!("  Source: {}", config.base_url());
    println!("  Output: {}", config.output_path());
    println!(
        "  Delay: {:.1}s, timeout: {}s",
        config.delay_seconds(),
        config.timeout_seconds()
    );
    match config.scrape_plan() {
        ScrapePlan::Events { limit, athlete_filter, .. } => {
            println!("  Mode: events");
            if let Some(limit) = limit {
                println!("  Max events: {}", limit);
            }
            if let Some(filter) = athlete_filter {
                println!("  Athlete filter: {}", filter);
            }
        }
        ScrapePlan::Athlete { query, .. } => println!("  Mode: athlete ({:?})", query),
    }
    println!();
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    let site = SiteUrls::new(config.base_url()).context("parsing source.base_url")?;
    let options = ResolverOptions::default();

    println!("Dry run, planned listing requests:");
    match config.scrape_plan() {
        ScrapePlan::Events { seasons, .. } => match seasons {
            SeasonSelection::All => println!("  {}", site.listing_url(None)),
            SeasonSelection::Explicit(seasons) => {
                for season in &seasons {
                    println!("  {}", site.listing_url(Some(season)));
                }
            }
            SeasonSelection::Detect {
                start_year,
                end_year,
            } => {
                println!("  probing {} seasons:", (start_year..=end_year).count());
                for year in (start_year..=end_year).rev() {
                    println!("  {}", site.listing_url(Some(&year.to_string())));
                }
            }
        },
        ScrapePlan::Athlete { query, seasons } => {
            match &query {
                AthleteQuery::Profile(reference) => {
                    let profile = site
                        .resolve(reference)
                        .with_context(|| format!("resolving profile '{}'", reference))?;
                    println!("  profile: {}", profile);
                }
                AthleteQuery::Name(name) => {
                    println!("  search for '{}':", name);
                    for season in recent_seasons(options.current_year, options.search_seasons) {
                        println!("  {}", site.listing_url(Some(&season)));
                    }
                }
            }
            let seasons = if seasons.is_empty() {
                recent_seasons(options.current_year, options.history_years)
            } else {
                seasons
            };
            println!("  scan:");
            for season in &seasons {
                println!("  {}", site.listing_url(Some(season)));
            }
        }
    }

    Ok(())
}
