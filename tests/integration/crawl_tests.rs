//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the warnings site and test
//! the full crawl cycle end-to-end, down to the JSON files on disk.

use fma_warnings::config::Config;
use fma_warnings::crawler::{crawl, Coordinator, HttpFetcher};
use fma_warnings::output::{derive_id, JsonFileSink, WarningRecord};
use fma_warnings::CrawlError;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Results per list page on the mock site
const PAGE_SIZE: u32 = 2;

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output: &Path, pages: Option<u32>) -> Config {
    let host = url::Url::parse(base_url)
        .expect("Failed to parse base URL")
        .host_str()
        .expect("Failed to extract host")
        .to_string();

    let mut config = Config::default();
    config.crawler.list_url = format!("{}/warnings/?start={{start}}", base_url);
    config.crawler.allowed_domains = vec![host];
    config.crawler.page_size = PAGE_SIZE;
    config.crawler.pages = pages;
    config.crawler.download_delay_ms = 0; // No politeness delay against the mock
    config.output.data_directory = output.display().to_string();
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

fn list_page(summary: Option<&str>, hrefs: &[&str]) -> String {
    let summary = summary
        .map(|s| format!(r#"<div class="search-summary"><p class="numResults">{}</p></div>"#, s))
        .unwrap_or_default();
    let items: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<div class="result"><h3><a class="result_path_link" href="{}">Warning</a></h3></div>"#,
                href
            )
        })
        .collect();
    format!(
        "<html><head><title>Warnings and alerts</title></head><body>{}{}</body></html>",
        summary, items
    )
}

fn detail_page(title: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
    format!(
        r#"<html><head><title>{}</title></head><body>
        <div class="standard_content highlightable">{}<div class="aside"><p>Share this page</p></div></div>
        </body></html>"#,
        title, body
    )
}

/// Mounts list page `page`, served at the offset of its first result
async fn mount_list(server: &MockServer, page: u32, body: String, expected_calls: u64) {
    let start = (page - 1) * PAGE_SIZE + 1;

    Mock::given(method("GET"))
        .and(path("/warnings/"))
        .and(query_param("start", start.to_string()))
        .respond_with(html(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, slug: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/warnings/{}/", slug)))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn read_record(dir: &Path, url: &str) -> WarningRecord {
    let file = dir.join(format!("{}.json", derive_id(url)));
    let content = std::fs::read_to_string(&file)
        .unwrap_or_else(|e| panic!("Missing record {}: {}", file.display(), e));
    serde_json::from_str(&content).expect("Record is not valid JSON")
}

#[tokio::test]
async fn test_full_crawl_writes_one_file_per_warning() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let output = TempDir::new().unwrap();

    // 3 results at 2 per page: two list pages
    mount_list(
        &server,
        1,
        list_page(Some("3 results"), &["/warnings/acme-ltd/", "/warnings/beta-corp/"]),
        1,
    )
    .await;
    mount_list(&server, 2, list_page(None, &["/warnings/gamma-scam/"]), 1).await;

    mount_detail(
        &server,
        "acme-ltd",
        detail_page("Acme Ltd", &["Acme is not registered.", "Do not deal with Acme."]),
    )
    .await;
    mount_detail(&server, "beta-corp", detail_page("Beta Corp", &["Beta warning."])).await;
    mount_detail(&server, "gamma-scam", detail_page("Gamma", &[])).await;

    let data_dir = output.path().join("data_scraped");
    let config = create_test_config(&base_url, &data_dir, None);

    let report = crawl(config, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_planned, 2);
    assert_eq!(report.list_pages_fetched, 2);
    assert_eq!(report.records_written, 3);
    assert_eq!(report.empty_bodies, 1);
    assert_eq!(report.total_failures(), 0);

    let files = std::fs::read_dir(&data_dir).unwrap().count();
    assert_eq!(files, 3);

    let acme_url = format!("{}/warnings/acme-ltd/", base_url);
    let acme = read_record(&data_dir, &acme_url);
    assert_eq!(acme.url, acme_url);
    assert_eq!(acme.identifier, derive_id(&acme_url));
    assert_eq!(acme.title.as_deref(), Some("Acme Ltd"));
    // Nested paragraphs inside the container are not part of the body
    assert_eq!(acme.content, "Acme is not registered.\r\nDo not deal with Acme.");

    let gamma = read_record(&data_dir, &format!("{}/warnings/gamma-scam/", base_url));
    assert_eq!(gamma.content, "");
}

#[tokio::test]
async fn test_failed_detail_pages_do_not_stop_the_crawl() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let output = TempDir::new().unwrap();

    mount_list(
        &server,
        1,
        list_page(
            Some("2 results"),
            &["/warnings/missing/", "/warnings/template-changed/"],
        ),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/warnings/missing/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    mount_detail(
        &server,
        "template-changed",
        "<html><body><div class=\"content\"><p>Moved</p></div></body></html>".to_string(),
    )
    .await;

    let config = create_test_config(&base_url, output.path(), None);
    let report = crawl(config, CancellationToken::new()).await.unwrap();

    assert_eq!(report.detail_pages_failed, 1);
    assert_eq!(report.fetch_failures.get("not_found"), Some(&1));
    assert_eq!(report.structural_failures, 1);
    assert_eq!(report.records_written, 0);
}

#[tokio::test]
async fn test_non_html_and_off_domain_links() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let output = TempDir::new().unwrap();

    let port = url::Url::parse(&base_url).unwrap().port().unwrap();
    let off_domain = format!("http://localhost:{}/warnings/elsewhere/", port);

    mount_list(
        &server,
        1,
        list_page(
            Some("2 results"),
            &["/warnings/notice.pdf", off_domain.as_str()],
        ),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/warnings/notice.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;

    let config = create_test_config(&base_url, output.path(), None);
    let report = crawl(config, CancellationToken::new()).await.unwrap();

    assert_eq!(report.links_found, 1);
    assert_eq!(report.links_rejected, 1);
    assert_eq!(report.fetch_failures.get("content_mismatch"), Some(&1));
    assert_eq!(report.records_written, 0);
}

#[tokio::test]
async fn test_first_page_error_is_fatal() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/warnings/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), output.path(), None);
    let err = crawl(config, CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, CrawlError::FirstPage { .. }));
}

#[tokio::test]
async fn test_page_override_ignores_result_summary() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let output = TempDir::new().unwrap();

    // No summary at all: only acceptable because the page count is given
    mount_list(&server, 1, list_page(None, &["/warnings/only/"]), 1).await;
    mount_list(&server, 2, list_page(None, &[]), 0).await;
    mount_detail(&server, "only", detail_page("Only", &["Body."])).await;

    let config = create_test_config(&base_url, output.path(), Some(1));
    let fetcher = HttpFetcher::from_config(&config).unwrap();
    let sink = JsonFileSink::new(output.path());

    let report = Coordinator::new(config, fetcher, sink).run().await.unwrap();

    assert_eq!(report.pages_planned, 1);
    assert_eq!(report.records_written, 1);
}
