use httpmock::prelude::*;
use std::io::Read;
use std::time::Duration;
use tempfile::TempDir;
use timber_etl::core::athlete::{AthleteResolver, ResolverOptions};
use timber_etl::core::catalog::EventCatalog;
use timber_etl::core::event_page::scrape_event;
use timber_etl::core::site::SiteUrls;
use timber_etl::domain::model::{AthleteQuery, Discipline, EventRef};
use timber_etl::domain::ports::DEFAULT_USER_AGENT;
use timber_etl::{CliConfig, EtlEngine, HttpPageFetcher, LocalStorage, ScrapePipeline};

fn fetcher() -> HttpPageFetcher {
    HttpPageFetcher::new(Duration::ZERO, Duration::from_secs(5), DEFAULT_USER_AGENT).unwrap()
}

fn listing(events: &[(&str, &str)]) -> String {
    let rows: String = events
        .iter()
        .map(|(id, name)| {
            format!(
                r#"<tr><td>01.06.2024 Vienna</td><td>AUT</td><td><a href="/Event/{id}">{name}</a></td></tr>"#
            )
        })
        .collect();
    format!("<html><body><table><tr><th>Date</th><th>Nation</th><th>Event</th></tr>{rows}</table></body></html>")
}

/// `(anchor id, competition wood, [(athlete id, athlete name, time, markers)])`
fn event_html(date: &str, sections: &[(&str, &str, Vec<(u32, &str, &str, &str)>)]) -> String {
    let mut body = format!(
        "<html><body><dl><dt>Date</dt><dd>{date}\nSaturday</dd><dt>Location</dt><dd>Vienna</dd></dl>"
    );
    for (anchor, wood, rows) in sections {
        body.push_str(&format!(
            r#"<h3><a name="{anchor}" id="{anchor}"></a>Section</h3><p>Competition Wood: **{wood}**</p><table><tr><th>#</th><th>Athlete</th><th>Nation</th><th>Pts</th><th>Time</th><th></th></tr>"#
        ));
        for (i, (id, name, time, markers)) in rows.iter().enumerate() {
            body.push_str(&format!(
                r#"<tr><td>{}</td><td><a href="/Athlete/{id}">{name}</a><span class="label">Pro</span></td><td>AUT</td><td>12</td><td>{time}</td><td>{markers}</td></tr>"#,
                i + 1
            ));
        }
        body.push_str("<tr><td colspan=\"6\">Results are provisional</td></tr></table>");
    }
    body.push_str("</body></html>");
    body
}

fn cli_config(base_url: String, output_path: String) -> CliConfig {
    CliConfig {
        base_url,
        season: vec!["2024".to_string()],
        detect_seasons: false,
        start_year: 2020,
        end_year: None,
        limit: None,
        athlete: None,
        athlete_url: None,
        athlete_mode: false,
        output_path,
        delay: 0.0,
        timeout: 5,
        verbose: false,
        log_json: false,
    }
}

fn read_entry(archive: &mut zip::ZipArchive<std::io::Cursor<Vec<u8>>>, name: &str) -> String {
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

#[tokio::test]
async fn test_listing_keeps_only_linked_rows() {
    let server = MockServer::start();
    let listing_mock = server.mock(|when, then| {
        when.method(GET).path("/Results").query_param("season", "2024");
        then.status(200).body(
            r#"<table>
            <tr><td>01.06.2024 Vienna</td><td>AUT</td><td><a href="/Event/1">Vienna Cup</a></td></tr>
            <tr><td>Season break</td><td></td><td></td></tr>
            <tr><td>15.06.2024 Prague</td><td>CZE</td><td><a href="/Event/2">Prague Open</a></td></tr>
            </table>"#,
        );
    });

    let source = fetcher();
    let site = SiteUrls::new(&server.base_url()).unwrap();
    let catalog = EventCatalog::new(&source, &site);

    let events = catalog.list_events(Some("2024"), None).await;

    listing_mock.assert();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].url, server.url("/Event/1"));
    assert_eq!(events[1].name, "Prague Open");
    assert_eq!(events[1].nation_text, "CZE");
}

#[tokio::test]
async fn test_detect_seasons_over_http() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/Results").query_param("season", "2024");
        then.status(200).body(listing(&[("1", "Vienna Cup")]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Results").query_param("season", "2023");
        then.status(200).body(listing(&[]));
    });
    let failing = server.mock(|when, then| {
        when.method(GET).path("/Results").query_param("season", "2022");
        then.status(503);
    });

    let source = fetcher();
    let site = SiteUrls::new(&server.base_url()).unwrap();
    let catalog = EventCatalog::new(&source, &site);

    let seasons = catalog.detect_available_seasons(2022, 2024).await;

    failing.assert();
    assert_eq!(seasons, vec!["2024".to_string()]);
}

#[tokio::test]
async fn test_event_with_round2_anchor_and_failed_event() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/Event/5");
        then.status(200).body(event_html(
            "12.05.2023",
            &[(
                "Round2UnderhandChop",
                "Aspen (30 cm diameter)",
                vec![(1, "Jane Roe", "17.64", "WR, PB"), (2, "John Doe", "19.02", "")],
            )],
        ));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Event/6");
        then.status(500);
    });

    let source = fetcher();
    let site = SiteUrls::new(&server.base_url()).unwrap();
    let event = |id: u32, name: &str| EventRef {
        name: name.to_string(),
        url: server.url(format!("/Event/{id}")),
        date_location_text: String::new(),
        nation_text: String::new(),
    };

    let results = scrape_event(&source, &site, &event(5, "Spring Cup"))
        .await
        .unwrap();

    assert_eq!(results.contested, vec![Discipline::UnderhandChop]);
    assert_eq!(results.records.len(), 2);
    let jane = &results.records[0];
    assert_eq!(jane.athlete_name, "Jane Roe");
    assert_eq!(jane.athlete_profile_url, server.url("/Athlete/1"));
    assert_eq!(jane.wood_size_mm, Some(300));
    assert_eq!(jane.wood_species.as_deref(), Some("Aspen"));
    assert_eq!(jane.event_date, "12.05.2023");
    assert_eq!(jane.markers, vec!["WR".to_string(), "PB".to_string()]);

    assert!(scrape_event(&source, &site, &event(6, "Broken Cup"))
        .await
        .is_none());
}

#[tokio::test]
async fn test_athlete_across_two_seasons_deduplicates() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/Results").query_param("season", "2023");
        then.status(200)
            .body(listing(&[("23", "Cup 2023"), ("23", "Cup 2023")]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Results").query_param("season", "2022");
        then.status(200).body(listing(&[("22", "Cup 2022")]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Event/23");
        then.status(200).body(event_html(
            "01.06.2023",
            &[
                ("Round1UnderhandChop", "WhitePine (32 cm)", vec![(1, "Jane Roe", "17.64", "")]),
                ("Round1StandingBlockChop", "Poplar (27 cm)", vec![(1, "Jane Roe", "15.10", "")]),
            ],
        ));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Event/22");
        then.status(200).body(event_html(
            "01.06.2022",
            &[("Round3UnderhandChop", "WhitePine (32 cm)", vec![(1, "Jane Roe", "18.20", "")])],
        ));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Athlete/1");
        then.status(200).body("<h1>STIHL TIMBERSPORTS</h1><h2>Jane Roe</h2>");
    });

    let source = fetcher();
    let site = SiteUrls::new(&server.base_url()).unwrap();
    let resolver = AthleteResolver::with_options(
        &source,
        &site,
        ResolverOptions {
            current_year: 2023,
            ..ResolverOptions::default()
        },
    );

    let seasons = vec!["2023".to_string(), "2022".to_string()];
    let results = resolver
        .resolve(&AthleteQuery::Name("jane roe".to_string()), &seasons)
        .await;

    assert_eq!(results.identity.unwrap().profile_url, server.url("/Athlete/1"));
    assert_eq!(results.records.len(), 3);
    assert_eq!(results.records[0].discipline, Discipline::UnderhandChop);
    assert_eq!(results.records[1].discipline, Discipline::StandingBlockChop);
    assert_eq!(results.records[2].event_name, "Cup 2022");
}

#[tokio::test]
async fn test_end_to_end_archive() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let listing_mock = server.mock(|when, then| {
        when.method(GET).path("/Results").query_param("season", "2024");
        then.status(200)
            .body(listing(&[("1", "Vienna Cup"), ("2", "Missing Cup")]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Event/1");
        then.status(200).body(event_html(
            "01.06.2024",
            &[
                (
                    "Round1UnderhandChop",
                    "WhitePine (32 cm diameter)",
                    vec![(1, "Jane Roe", "17.64", "PB"), (2, "John Doe", "19.02", "")],
                ),
                ("Round2StandingBlockChop", "Aspen (30 cm)", vec![(2, "John Doe", "14.50", "")]),
            ],
        ));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Event/2");
        then.status(404);
    });

    let config = cli_config(server.base_url(), output_path.clone());
    let storage = LocalStorage::new(output_path.clone());
    let pipeline = ScrapePipeline::new(storage, config).unwrap();
    let engine = EtlEngine::new(pipeline);

    let result = engine.run().await.unwrap();

    listing_mock.assert();
    let output_file_path = result.unwrap();
    assert!(output_file_path.ends_with("timbersports_results.zip"));

    let full_path = std::path::Path::new(&output_path).join("timbersports_results.zip");
    let zip_data = std::fs::read(&full_path).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();

    let csv = read_entry(&mut archive, "results.csv");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "Competitor profile URL,Competitor Name,Discipline,Time,Size,Species,Event Date,Event Name,Special Markers"
    );
    assert_eq!(
        lines[1],
        format!(
            "{},Jane Roe,UH,17.64,320,WhitePine,01.06.2024,Vienna Cup,PB",
            server.url("/Athlete/1")
        )
    );

    let tsv = read_entry(&mut archive, "results.tsv");
    assert!(tsv.contains("John Doe\tSB\t14.50\t300\tAspen"));

    let sb = read_entry(&mut archive, "SB_results.csv");
    assert_eq!(sb.lines().count(), 2);

    let summary = read_entry(&mut archive, "athlete_summary.csv");
    assert!(summary.contains("John Doe,SB,14.50,1"));
    assert!(summary.contains("John Doe,UH,19.02,1"));

    assert!(archive.by_name("athlete.json").is_err());
}

#[tokio::test]
async fn test_no_results_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/Results").query_param("season", "2024");
        then.status(200).body(listing(&[("9", "Gone Cup")]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Event/9");
        then.status(500);
    });

    let config = cli_config(server.base_url(), output_path.clone());
    let pipeline = ScrapePipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();

    let result = EtlEngine::new(pipeline).run().await.unwrap();

    assert_eq!(result, None);
    assert!(!std::path::Path::new(&output_path)
        .join("timbersports_results.zip")
        .exists());
}
