//! Integration tests for the enrichment run
//!
//! These tests use wiremock to stand up a mock registry and mock websites
//! and drive the full lookup, crawl and persist cycle end-to-end.

use std::sync::Arc;
use std::time::Duration;
use sumi_scout::config::{
    Config, CrawlerConfig, EmailConfig, InputConfig, NetworkConfig, OutputConfig, RegistryConfig,
    UserAgentConfig,
};
use sumi_scout::crawler::{
    build_http_client, ConnectivityProbe, CrawlPlanner, HttpFetcher, PageFetcher, RetrySettings,
    TcpProbe,
};
use sumi_scout::email::EmailPolicy;
use sumi_scout::input::read_entities;
use sumi_scout::registry::HttpRegistryLookup;
use sumi_scout::storage::{CsvResultStore, ResultStore};
use sumi_scout::{CrawlController, Entity, FetchOutcome, FoundStatus, Runner};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HEADER: &str =
    "Index,Charity Name,Website Status,Website URL,Contact Email Status,Contact Email";

/// Creates a test configuration against the given registry server
fn create_test_config(registry: &MockServer, results_path: &str) -> Config {
    Config {
        input: InputConfig {
            path: "unused.csv".to_string(),
            name_column: "Charity Name".to_string(),
        },
        output: OutputConfig {
            results_path: results_path.to_string(),
        },
        registry: RegistryConfig {
            search_url: format!("{}/search?Keyword=", registry.uri()),
            website_selector: "span.website a[target='_blank']".to_string(),
        },
        crawler: CrawlerConfig {
            max_pages: 4,
            request_timeout_secs: 5,
            contact_paths: vec!["contact".to_string(), "about".to_string()],
            accept_invalid_certs: true,
        },
        email: EmailConfig::default(),
        network: NetworkConfig {
            retry_delay_ms: 10,
            max_retry_delay_ms: 20,
            max_connection_retries: 1,
            max_consecutive_outages: 2,
            // the registry server is always up, so it doubles as the probe target
            probe_address: registry.address().to_string(),
            probe_timeout_ms: 500,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestScout".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "test@example.com".to_string(),
        },
    }
}

/// Wires the production collaborators the same way the binary does
fn create_runner(config: &Config) -> Runner<CsvResultStore> {
    let probe: Arc<dyn ConnectivityProbe> =
        Arc::new(TcpProbe::from_config(&config.network).expect("probe address"));
    let client = build_http_client(&config.user_agent, &config.crawler).expect("http client");
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(client, probe.clone()));

    let lookup = HttpRegistryLookup::from_config(config, fetcher.clone(), probe.clone())
        .expect("registry lookup");
    let controller = CrawlController::from_config(config, fetcher, probe);
    let store = CsvResultStore::open(&config.output.results_path).expect("result store");

    Runner::new(Box::new(lookup), controller, store)
}

/// A controller that only visits the homepage and what it links to
fn homepage_controller(config: &Config) -> CrawlController {
    let probe: Arc<dyn ConnectivityProbe> =
        Arc::new(TcpProbe::from_config(&config.network).expect("probe address"));
    let client = build_http_client(&config.user_agent, &config.crawler).expect("http client");

    CrawlController::new(
        Arc::new(HttpFetcher::new(client, probe.clone())),
        probe,
        CrawlPlanner::new(Vec::new(), 5),
        EmailPolicy::default(),
        RetrySettings::from_config(&config.network),
        Duration::from_secs(5),
    )
}

/// Registers a registry search result pointing `name` at `website`
async fn mount_registry_entry(registry: &MockServer, name: &str, website: &str) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("Keyword", name))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    r#"<html><body><div class="charitydetailrow">
                    <span class="website"><a href="{}" target="_blank">Website</a></span>
                    </div></body></html>"#,
                    website
                ))
                .insert_header("content-type", "text/html"),
        )
        .mount(registry)
        .await;
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn entities(names: &[&str]) -> Vec<Entity> {
    let data = std::iter::once("Charity Name".to_string())
        .chain(names.iter().map(|n| format!("\"{}\"", n)))
        .collect::<Vec<_>>()
        .join("\n");
    read_entities(data.as_bytes(), "Charity Name").expect("entities")
}

#[tokio::test]
async fn test_single_entity_end_to_end() {
    let registry = MockServer::start().await;
    let site = MockServer::start().await;

    mount_registry_entry(&registry, "Example Charity A", &site.uri()).await;
    mount_page(
        &site,
        "/",
        "<html><body><p>Write to us: hello@example.org</p></body></html>",
    )
    .await;

    let dir = TempDir::new().expect("temp dir");
    let results = dir.path().join("results.csv");
    let config = create_test_config(&registry, results.to_str().unwrap());

    let mut runner = create_runner(&config);
    let summary = runner
        .run(&entities(&["Example Charity A"]), std::future::pending())
        .await
        .expect("run");

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.emails_found, 1);

    let content = std::fs::read_to_string(&results).unwrap();
    assert_eq!(
        content,
        format!(
            "{}\n0,Example Charity A,Found,{},Found,hello@example.org\n",
            HEADER,
            site.uri()
        )
    );
}

#[tokio::test]
async fn test_contact_page_found_after_missing_homepage() {
    let registry = MockServer::start().await;
    let site = MockServer::start().await;

    mount_registry_entry(&registry, "Harbour Trust", &site.uri()).await;
    // "/" is not mounted, so it answers 404
    mount_page(
        &site,
        "/contact",
        "<p>sales@harbour.org</p><p>enquiries@harbour.org</p>",
    )
    .await;

    let dir = TempDir::new().unwrap();
    let results = dir.path().join("results.csv");
    let config = create_test_config(&registry, results.to_str().unwrap());

    let mut runner = create_runner(&config);
    runner
        .run(&entities(&["Harbour Trust"]), std::future::pending())
        .await
        .unwrap();

    let rows = runner.store().load_results().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].website_status, FoundStatus::Found);
    assert_eq!(rows[0].email.as_deref(), Some("enquiries@harbour.org"));
}

#[tokio::test]
async fn test_unlisted_and_unreachable_websites() {
    let registry = MockServer::start().await;

    // nothing listens on port 1, so the connect is refused while the probe succeeds
    mount_registry_entry(&registry, "Closed Society", "http://127.0.0.1:1").await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>No results</p></body></html>")
                .insert_header("content-type", "text/html"),
        )
        .with_priority(10)
        .mount(&registry)
        .await;

    let dir = TempDir::new().unwrap();
    let results = dir.path().join("results.csv");
    let config = create_test_config(&registry, results.to_str().unwrap());

    let mut runner = create_runner(&config);
    let summary = runner
        .run(
            &entities(&["Closed Society", "Nobody Listed"]),
            std::future::pending(),
        )
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.websites_found, 0);

    let content = std::fs::read_to_string(&results).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[1],
        "0,Closed Society,Not Found,http://127.0.0.1:1,Not Found,"
    );
    assert_eq!(lines[2], "1,Nobody Listed,Not Found,,Not Found,");
}

#[tokio::test]
async fn test_second_run_resumes_without_duplicates() {
    let registry = MockServer::start().await;
    let site = MockServer::start().await;

    for name in ["Alpha Trust", "Beta Fund", "Gamma Society"] {
        mount_registry_entry(&registry, name, &site.uri()).await;
    }
    mount_page(&site, "/", "<p>info@example.org</p>").await;

    let dir = TempDir::new().unwrap();
    let results = dir.path().join("results.csv");
    let config = create_test_config(&registry, results.to_str().unwrap());

    {
        let mut runner = create_runner(&config);
        let first = runner
            .run(&entities(&["Alpha Trust", "Beta Fund"]), std::future::pending())
            .await
            .unwrap();
        assert_eq!(first.processed, 2);
    }

    // simulate a crash in the middle of writing the next row
    let mut content = std::fs::read_to_string(&results).unwrap();
    content.push_str("2,Gamma Soc");
    std::fs::write(&results, content).unwrap();

    let mut runner = create_runner(&config);
    let second = runner
        .run(
            &entities(&["Alpha Trust", "Beta Fund", "Gamma Society"]),
            std::future::pending(),
        )
        .await
        .unwrap();

    assert_eq!(second.resumed_from, 2);
    assert_eq!(second.processed, 1);

    let rows = runner.store().load_results().unwrap();
    let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(rows[2].name, "Gamma Society");
    assert_eq!(rows[2].email.as_deref(), Some("info@example.org"));
}

#[tokio::test]
async fn test_crawl_stays_within_page_ceiling() {
    let registry = MockServer::start().await;
    let site = MockServer::start().await;

    mount_registry_entry(&registry, "Busy Charity", &site.uri()).await;
    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/news/{}">News {}</a>"#, i, i))
        .collect();
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("<html><body>{}</body></html>", links))
                .insert_header("content-type", "text/html"),
        )
        .expect(4)
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let results = dir.path().join("results.csv");
    let config = create_test_config(&registry, results.to_str().unwrap());

    let mut runner = create_runner(&config);
    let summary = runner
        .run(&entities(&["Busy Charity"]), std::future::pending())
        .await
        .unwrap();

    assert_eq!(summary.websites_found, 1);
    assert_eq!(summary.emails_found, 0);
    // dropping the server verifies the `expect(4)` above
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let registry = MockServer::start().await;
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>late@example.org</p>")
                .insert_header("content-type", "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&site)
        .await;

    let config = create_test_config(&registry, "unused-results.csv");
    let probe: Arc<dyn ConnectivityProbe> =
        Arc::new(TcpProbe::from_config(&config.network).unwrap());
    let client = build_http_client(&config.user_agent, &config.crawler).unwrap();
    let fetcher = HttpFetcher::new(client, probe);

    let url = Url::parse(&format!("{}/slow", site.uri())).unwrap();
    let outcome = fetcher.fetch(&url, Duration::from_secs(1)).await;
    assert_eq!(outcome, FetchOutcome::Timeout);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let registry = MockServer::start().await;
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&site)
        .await;

    let config = create_test_config(&registry, "unused-results.csv");
    let mut controller = homepage_controller(&config);

    let report = controller
        .crawl(&Url::parse(&site.uri()).unwrap())
        .await
        .unwrap();
    assert_eq!(report.fetch_attempts, 1);
    assert!(!report.website_reachable);
    assert!(report.email.is_none());
    // dropping the server verifies the `expect(1)` above
}

#[tokio::test]
async fn test_links_follow_redirected_homepage() {
    let registry = MockServer::start().await;
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/home/"))
        .mount(&site)
        .await;
    mount_page(&site, "/home/", r#"<a href="team">Meet the team</a>"#).await;
    mount_page(&site, "/home/team", "<p>people@example.org</p>").await;

    let config = create_test_config(&registry, "unused-results.csv");
    let mut controller = homepage_controller(&config);

    let report = controller
        .crawl(&Url::parse(&site.uri()).unwrap())
        .await
        .unwrap();
    assert_eq!(report.email.unwrap().address, "people@example.org");
}
