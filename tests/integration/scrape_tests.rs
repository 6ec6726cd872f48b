use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};
use yc_founders::collector::{
    build_http_client, fetch_company_list, fetch_detail, run_collection, Coordinator, Outcome,
    RateLimiter, RetryPolicy,
};
use yc_founders::config::{validate, Config};
use yc_founders::records::SkipReason;
use yc_founders::{FetchResult, ScrapeError};

const LIST_PATH: &str = "/api/companies/all.json";

const ACME_PAGE: &str = r#"<html><body>
    <h1>Acme</h1>
    <div class="founder"><span>Jane Doe</span><a href="https://www.linkedin.com/in/janedoe">LinkedIn</a></div>
    <div class="founder"><span>John Roe</span></div>
</body></html>"#;

const STEALTH_PAGE: &str = "<html><body><h1>Beta</h1><p>Stealth.</p></body></html>";

/// Creates a configuration pointed at the mock server, tuned to run fast
fn create_test_config(server: &MockServer, limit: usize, output: &Path) -> Config {
    let mut config = Config::default();
    config.scraper.limit = limit;
    config.scraper.concurrency = 4;
    config.scraper.requests_per_second = 1_000.0;
    config.scraper.base_delay_ms = 1;
    config.scraper.max_delay_ms = 5;
    config.scraper.jitter = false;
    config.scraper.request_timeout_secs = 5;
    config.source.list_url = format!("{}{}", server.uri(), LIST_PATH);
    config.source.base_url = server.uri();
    config.user_agent.name = "TestCollector".to_string();
    config.user_agent.version = "1.0".to_string();
    config.output.path = Some(output.display().to_string());
    config
}

fn company(slug: &str, name: &str, batch: &str, one_liner: &str) -> Value {
    json!({ "slug": slug, "name": name, "batch": batch, "one_liner": one_liner })
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_listing(server: &MockServer, entries: Value) {
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries))
        .mount(server)
        .await;
}

fn fast_limiter(max_attempts: u32) -> RateLimiter {
    RateLimiter::new(
        1_000.0,
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            jitter: false,
        },
    )
}

#[tokio::test]
async fn test_full_run_writes_csv() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(
        &server,
        json!([
            company("acme", "Acme", "W21", "Anvils for everyone"),
            company("beta", "Beta, Inc.", "S22", "Stealth"),
            company("gamma", "Gamma", "W23", "Always down"),
            company("acme-inc", "Acme Inc", "S19", "Gone"),
            company("delta", "Delta", "W24", "Beyond the limit"),
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/companies/acme"))
        .respond_with(html(ACME_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies/beta"))
        .respond_with(html(STEALTH_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies/gamma"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies/acme-inc"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies/delta"))
        .respond_with(html(ACME_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, 4, &dir.path().join("out"));
    validate(&config).unwrap();

    let report = run_collection(config).await.unwrap();

    let output = dir.path().join("out.csv");
    assert_eq!(report.output_path.as_deref(), Some(output.as_path()));

    let content = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "company_name,batch,short_description,founder_name,founder_linkedin_url",
            "Acme,W21,Anvils for everyone,Jane Doe,https://www.linkedin.com/in/janedoe",
            "Acme,W21,Anvils for everyone,John Roe,",
            "\"Beta, Inc.\",S22,Stealth,,",
            "Acme Inc,S19,Gone,,",
        ]
    );

    assert_eq!(report.requested, 4);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.parse_anomalies, 1);
    assert_eq!(report.rows_written, 4);
    assert_eq!(report.total_founders, 2);
    assert_eq!(report.founders_with_profile, 1);
    // listing + acme + beta + 3 x gamma + acme-inc
    assert_eq!(report.requests, 7);
    assert_eq!(report.retries, 2);
}

#[tokio::test]
async fn test_insufficient_data_writes_no_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(
        &server,
        json!([
            company("a", "A", "W21", "First"),
            company("b", "B", "W21", "Second"),
            company("a", "A again", "W21", "Duplicate"),
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path_regex("^/companies/"))
        .respond_with(html(ACME_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let output = dir.path().join("out.csv");
    let config = create_test_config(&server, 3, &output);

    let err = run_collection(config).await.unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::InsufficientData {
            requested: 3,
            available: 2
        }
    ));
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let output = dir.path().join("out.csv");
    let err = run_collection(create_test_config(&server, 1, &output))
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::Listing { .. }));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_listing_must_be_an_array() {
    let server = MockServer::start().await;
    mount_listing(&server, json!({ "companies": [] })).await;

    let client = reqwest::Client::new();
    let limiter = fast_limiter(3);
    let url = format!("{}{}", server.uri(), LIST_PATH);

    let err = fetch_company_list(&client, &limiter, &url, 1)
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::Listing { .. }));
}

#[tokio::test]
async fn test_listing_skips_malformed_entries() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        json!([
            company("a", "A", "W21", "First"),
            { "name": "No slug here" },
            { "slug": "b", "name": "B", "batch": null },
        ]),
    )
    .await;

    let client = reqwest::Client::new();
    let limiter = fast_limiter(1);
    let url = format!("{}{}", server.uri(), LIST_PATH);

    let companies = fetch_company_list(&client, &limiter, &url, 2).await.unwrap();

    assert_eq!(companies.len(), 2);
    assert_eq!(companies[1].slug, "b");
    assert_eq!(companies[1].batch, "");
    assert_eq!(companies[1].description, "");
}

#[tokio::test]
async fn test_not_found_is_skipped_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies/acme-inc"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let limiter = fast_limiter(3);

    let result = fetch_detail(&client, &limiter, &server.uri(), "acme-inc").await;

    assert_eq!(result, FetchResult::Skipped(SkipReason::NotFound));
    assert_eq!(limiter.stats().retries, 0);
}

#[tokio::test]
async fn test_forbidden_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies/acme"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let limiter = fast_limiter(5);

    match fetch_detail(&client, &limiter, &server.uri(), "acme").await {
        FetchResult::Failure(failure) => {
            assert!(failure.permanent);
            assert_eq!(failure.attempts, 1);
            assert!(failure.reason.contains("403"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_transient_errors_are_retried_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies/acme"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies/acme"))
        .respond_with(html(ACME_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let limiter = fast_limiter(3);

    let result = fetch_detail(&client, &limiter, &server.uri(), "acme").await;

    assert!(result.is_success());
    assert_eq!(limiter.stats().requests, 3);
    assert_eq!(limiter.stats().retries, 2);
}

#[tokio::test]
async fn test_rate_limited_response_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies/acme"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let limiter = fast_limiter(2);

    match fetch_detail(&client, &limiter, &server.uri(), "acme").await {
        FetchResult::Failure(failure) => {
            assert!(!failure.permanent);
            assert_eq!(failure.attempts, 2);
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_requests_carry_user_agent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, 1, &dir.path().join("out.csv"));

    Mock::given(method("GET"))
        .and(path("/companies/acme"))
        .and(header("user-agent", "TestCollector/1.0"))
        .respond_with(html(ACME_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_http_client(&config.scraper, &config.user_agent).unwrap();
    let limiter = fast_limiter(1);

    let result = fetch_detail(&client, &limiter, &server.uri(), "acme").await;
    assert!(result.is_success());
}

#[tokio::test]
async fn test_fan_out_respects_request_rate() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let entries: Vec<Value> = (0..10)
        .map(|i| company(&format!("c{}", i), &format!("C{}", i), "W21", "Thing"))
        .collect();
    mount_listing(&server, Value::Array(entries)).await;

    Mock::given(method("GET"))
        .and(path_regex("^/companies/c[0-9]$"))
        .respond_with(html(ACME_PAGE))
        .expect(10)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, 10, &dir.path().join("out.csv"));
    config.scraper.concurrency = 10;
    config.scraper.requests_per_second = 20.0;

    let coordinator = Coordinator::new(config).unwrap();
    let started = Instant::now();

    let companies = coordinator.fetch_companies().await.unwrap();
    let outcomes = coordinator.collect_founders(&companies).await;

    // 11 requests spaced 50ms apart
    assert!(started.elapsed() >= Duration::from_millis(450));
    assert_eq!(outcomes.len(), 10);
    for (company, outcome) in companies.iter().zip(&outcomes) {
        assert_eq!(company.slug, outcome.slug);
        assert_eq!(outcome.outcome, Outcome::Parsed { anomaly: false });
        assert_eq!(outcome.founders.len(), 2);
    }
}

/// Serves a detail page after `delay`, recording when each request arrived
struct TimedPage {
    arrivals: Arc<Mutex<Vec<Instant>>>,
    delay: Duration,
}

impl Respond for TimedPage {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        html(ACME_PAGE).set_delay(self.delay)
    }
}

/// Most requests that arrived within `window` of one another
fn peak_in_flight(arrivals: &[Instant], window: Duration) -> usize {
    let mut sorted = arrivals.to_vec();
    sorted.sort();
    (0..sorted.len())
        .map(|i| {
            sorted[..=i]
                .iter()
                .filter(|earlier| sorted[i].duration_since(**earlier) < window)
                .count()
        })
        .max()
        .unwrap_or(0)
}

fn numbered_companies(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| company(&format!("c{}", i), &format!("C{}", i), "W21", "Thing"))
            .collect(),
    )
}

#[tokio::test]
async fn test_fan_out_respects_concurrency_bound() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let arrivals = Arc::new(Mutex::new(Vec::new()));
    let delay = Duration::from_millis(150);

    mount_listing(&server, numbered_companies(9)).await;
    Mock::given(method("GET"))
        .and(path_regex("^/companies/c[0-9]$"))
        .respond_with(TimedPage {
            arrivals: arrivals.clone(),
            delay,
        })
        .expect(9)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, 9, &dir.path().join("out.csv"));
    config.scraper.concurrency = 3;

    let report = run_collection(config).await.unwrap();
    assert_eq!(report.succeeded, 9);

    // A worker's next request starts only after its previous response, which
    // takes at least `delay`, so at most 3 arrivals fit in any such window
    let arrivals = arrivals.lock().unwrap().clone();
    assert_eq!(arrivals.len(), 9);
    let peak = peak_in_flight(&arrivals, delay);
    assert!(peak <= 3, "{} detail fetches in flight", peak);
    assert!(peak >= 2, "fetches never overlapped");
}

#[tokio::test]
async fn test_export_failure_leaves_no_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(&server, json!([company("acme", "Acme", "W21", "Anvils")])).await;
    Mock::given(method("GET"))
        .and(path("/companies/acme"))
        .respond_with(html(ACME_PAGE))
        .mount(&server)
        .await;

    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "regular file").unwrap();
    let output = blocker.join("out.csv");
    let config = create_test_config(&server, 1, &output);

    let err = run_collection(config).await.unwrap_err();

    assert!(matches!(err, ScrapeError::Export(_)));
    assert!(!output.exists());
    assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "regular file");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_cancelled_run_writes_no_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(&server, numbered_companies(4)).await;
    Mock::given(method("GET"))
        .and(path_regex("^/companies/c[0-9]$"))
        .respond_with(html(ACME_PAGE).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let output = dir.path().join("out.csv");
    let mut config = create_test_config(&server, 4, &output);
    config.scraper.concurrency = 1;

    let result = tokio::time::timeout(Duration::from_millis(250), run_collection(config)).await;
    assert!(result.is_err(), "run should still be fetching detail pages");

    // Listing plus the single in-flight detail fetch
    let requests_at_cancel = server.received_requests().await.unwrap().len();
    assert_eq!(requests_at_cancel, 2);

    // Aborted workers issue nothing further
    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), requests_at_cancel);

    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
