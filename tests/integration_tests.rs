//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: Reddit API → dataset → validation → files

use reddit_etl::batch::BatchExtractor;
use reddit_etl::http::HttpClientConfig;
use reddit_etl::output::StoreSink;
use reddit_etl::pipeline::{Pipeline, RunParams, RunState};
use reddit_etl::source::{RedditSource, SourceClient};
use reddit_etl::transform::{Transformer, DERIVED_COLUMNS};
use reddit_etl::validate::{Validator, ValidatorConfig};
use reddit_etl::{Error, ExportFormat, SortMode, TimeFilter};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header_exists, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Fixtures
// ============================================================================

fn post(id: &str, subreddit: &str, score: i64, comments: i64) -> Value {
    json!({
        "kind": "t3",
        "data": {
            "id": id,
            "subreddit": subreddit,
            "title": format!("{subreddit} post {id}"),
            "selftext": "Body text here",
            "score": score,
            "num_comments": comments,
            "author": {"name": format!("user_{id}")},
            "created_utc": 1_700_000_000.0,
            "upvote_ratio": 0.87,
            "url": format!("https://example.com/{id}"),
            "permalink": format!("/r/{subreddit}/comments/{id}/"),
            "is_self": true,
            "over_18": false,
            "stickied": false,
            "distinguished": null,
            "gilded": 0
        }
    })
}

fn listing(children: Vec<Value>, after: Option<&str>) -> Value {
    json!({
        "kind": "Listing",
        "data": {"children": children, "after": after}
    })
}

async fn mock_reddit() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "mock-token",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/rust/top"))
        .and(query_param("t", "week"))
        .and(query_param_is_missing("after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            vec![post("r1", "rust", 1500, 40), post("r2", "rust", 55, 3)],
            Some("t3_r2"),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/rust/top"))
        .and(query_param("after", "t3_r2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            vec![post("r3", "rust", 7, 0)],
            None,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/golang/top"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            vec![post("g1", "golang", 12, 2), post("r1", "rust", 1500, 40)],
            None,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/private/top"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    server
}

fn pipeline(server: &MockServer, config: ValidatorConfig, sink: StoreSink) -> Pipeline {
    let http = HttpClientConfig::builder()
        .base_url(server.uri())
        .max_retries(0)
        .no_rate_limit()
        .build();
    let source = RedditSource::with_credentials(
        http,
        format!("{}/api/v1/access_token", server.uri()),
        "client",
        "secret",
    )
    .unwrap();

    Pipeline::new(
        BatchExtractor::new(SourceClient::new(source)),
        Transformer::new(),
        Validator::new(config),
        sink,
    )
}

fn params(partitions: &[&str]) -> RunParams {
    RunParams::new(partitions.iter().copied())
        .sort(SortMode::Top)
        .time_filter(TimeFilter::Week)
        .limit(50)
        .output_name("reddit_it")
}

fn sink(dir: &TempDir, format: ExportFormat) -> StoreSink {
    StoreSink::from_url(dir.path().to_str().unwrap(), format).unwrap()
}

// ============================================================================
// End-to-End Runs
// ============================================================================

#[tokio::test]
async fn test_pipeline_writes_csv() {
    let server = mock_reddit().await;
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&server, ValidatorConfig::new(true), sink(&dir, ExportFormat::Csv));

    let report = pipeline
        .run_with_report(&params(&["rust", "private", "golang"]))
        .await
        .unwrap();

    assert_eq!(report.batch_stats.partitions_attempted, 3);
    assert_eq!(report.batch_stats.partitions_failed, 1);
    assert_eq!(report.batch_stats.failures[0].partition, "private");
    assert_eq!(report.rows_extracted, 5);
    assert_eq!(report.rows_persisted, 4);
    assert_eq!(report.states.last(), Some(&RunState::Done));

    let csv = std::fs::read_to_string(dir.path().join("reddit_it.csv")).unwrap();
    let mut lines = csv.lines();
    let header: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(header[0], "id");
    for column in DERIVED_COLUMNS {
        assert!(header.contains(&column), "missing column {column}");
    }
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].starts_with("r1,rust,rust post r1,"));
    assert!(rows[0].contains("user_r1"));
    assert!(rows[0].contains("2023-11-14 22:13:20"));
    assert!(rows[0].ends_with(",Viral"));
}

#[tokio::test]
async fn test_pipeline_writes_json_records() {
    let server = mock_reddit().await;
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&server, ValidatorConfig::new(true), sink(&dir, ExportFormat::Json));

    let location = pipeline.run(&params(&["rust"])).await.unwrap();
    assert!(location.ends_with("reddit_it.json"));

    let records: Vec<Value> =
        serde_json::from_slice(&std::fs::read(dir.path().join("reddit_it.json")).unwrap()).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["id"], "r1");
    assert_eq!(records[0]["engagement_score"], 1580);
    assert_eq!(records[0]["created_utc"], "2023-11-14T22:13:20Z");
    assert_eq!(records[2]["popularity_category"], "Low");
}

#[tokio::test]
async fn test_pipeline_validation_failure_writes_nothing() {
    let server = mock_reddit().await;
    let dir = TempDir::new().unwrap();
    let config = ValidatorConfig::new(true).with_min_rows(100);
    let pipeline = pipeline(&server, config, sink(&dir, ExportFormat::Csv));

    let err = pipeline.run(&params(&["rust"])).await.unwrap_err();

    assert_eq!(err.stage(), Some(RunState::Validating));
    assert!(err.to_string().contains("minimum required is 100"));
    assert!(!dir.path().join("reddit_it.csv").exists());
}

#[tokio::test]
async fn test_pipeline_all_partitions_unavailable() {
    let server = mock_reddit().await;
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&server, ValidatorConfig::new(true), sink(&dir, ExportFormat::Csv));

    let err = pipeline
        .run(&params(&["private", "missing"]))
        .await
        .unwrap_err();

    match err {
        Error::Pipeline { stage, source } => {
            assert_eq!(stage, RunState::Extracting);
            assert!(matches!(*source, Error::EmptyBatch));
        }
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_pipeline_partitioned_parquet() {
    let server = mock_reddit().await;
    let dir = TempDir::new().unwrap();
    let sink = sink(&dir, ExportFormat::Parquet)
        .partition_by_date(true)
        .with_partition_date(chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    let pipeline = pipeline(&server, ValidatorConfig::new(true), sink);

    let location = pipeline.run(&params(&["rust", "golang"])).await.unwrap();

    let file = dir.path().join("dt=2024-01-15/reddit_it.parquet");
    assert_eq!(location, file.to_str().unwrap());
    let bytes = std::fs::read(&file).unwrap();
    assert_eq!(&bytes[..4], b"PAR1");
}
