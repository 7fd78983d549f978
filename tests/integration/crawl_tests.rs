//! Integration tests for the crawler
//!
//! These tests use wiremock to serve mock websites (and a mock Elasticsearch
//! cluster) and run the full crawl cycle end-to-end.

use serde_json::json;
use site_indexer::config::{Config, IndexBackend};
use site_indexer::crawler::Coordinator;
use site_indexer::index::{Indexer, SearchQuery, SqliteIndexer};
use site_indexer::{document_id, CrawlError};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_partial_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IDLE: Duration = Duration::from_millis(500);

/// Creates a test configuration writing into a SQLite database at `db_path`
fn create_test_config(db_path: &Path, workers: u32, max_depth: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_workers = workers;
    config.crawler.max_depth = max_depth;
    config.crawler.connect_timeout_secs = 2;
    config.index.backend = IndexBackend::Sqlite;
    config.index.sqlite.database_path = db_path.display().to_string();
    config
}

/// Mounts an HTML page at `route`, expecting exactly `times` fetches
async fn mount_page(server: &MockServer, route: &str, title: &str, links: &[&str], times: u64) {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    let body = format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, anchors
    );

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

async fn run(config: &Config, seed: &str) -> Result<site_indexer::CrawlStatistics, CrawlError> {
    Coordinator::new(config, seed)?.idle_timeout(IDLE).run().await
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", "Home", &["/a", "/b"], 1).await;
    mount_page(&server, "/a", "Page A", &["/c", "/"], 1).await;
    mount_page(&server, "/b", "Page B", &["/c"], 1).await;
    mount_page(&server, "/c", "Page C", &[], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("pages.db");
    let config = create_test_config(&db_path, 3, 2);

    let stats = run(&config, &format!("{}/", base)).await.unwrap();
    assert_eq!(stats.pages_indexed, 4);
    assert_eq!(stats.fetch_failures, 0);
    assert_eq!(stats.schema_rejections, 0);
    assert_eq!(stats.depth_exceeded, 0);
    // "/" from /a and the second "/c" are duplicates
    assert_eq!(stats.already_visited, 2);
    assert_eq!(stats.links_enqueued, 5);

    let indexer = SqliteIndexer::open(&db_path, "pages").unwrap();
    assert_eq!(indexer.count_documents().unwrap(), 4);

    let doc = indexer
        .get_document(&document_id(&format!("{}/a", base)))
        .await
        .unwrap()
        .expect("page A should be indexed");
    assert_eq!(doc.title, "Page A");
    assert_eq!(doc.url, format!("{}/a", base));
    assert!(doc.content.contains("href=\"/c\""));

    let hits = indexer
        .search(&SearchQuery::new().title("page"))
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn test_depth_bound() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Root", &["/one"], 1).await;
    mount_page(&server, "/one", "One", &["/two"], 1).await;
    mount_page(&server, "/two", "Two", &["/three"], 0).await;
    mount_page(&server, "/three", "Three", &[], 0).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&dir.path().join("pages.db"), 2, 1);

    let stats = run(&config, &format!("{}/", server.uri())).await.unwrap();
    assert_eq!(stats.pages_indexed, 2);
    assert_eq!(stats.depth_exceeded, 1);
}

#[tokio::test]
async fn test_depth_zero_indexes_only_seed() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Root", &["/one", "/two"], 1).await;
    mount_page(&server, "/one", "One", &[], 0).await;
    mount_page(&server, "/two", "Two", &[], 0).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&dir.path().join("pages.db"), 4, 0);

    let stats = run(&config, &format!("{}/", server.uri())).await.unwrap();
    assert_eq!(stats.pages_indexed, 1);
    assert_eq!(stats.depth_exceeded, 2);
}

#[tokio::test]
async fn test_each_url_fetched_at_most_once() {
    let server = MockServer::start().await;
    let all = ["/", "/p1", "/p2", "/p3", "/p4", "/p5"];

    // Every page links to every page
    for route in all {
        mount_page(&server, route, route, &all, 1).await;
    }

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("pages.db");
    let config = create_test_config(&db_path, 10, 3);

    let stats = run(&config, &format!("{}/", server.uri())).await.unwrap();
    assert_eq!(stats.pages_indexed, 6);
    assert_eq!(stats.links_enqueued, 36);
    assert_eq!(stats.already_visited, 31);

    let indexer = SqliteIndexer::open(&db_path, "pages").unwrap();
    assert_eq!(indexer.count_documents().unwrap(), 6);
}

#[tokio::test]
async fn test_query_and_fragment_variants_collapse() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        "Root",
        &["/d?x=1", "/d?x=2#frag", "/d#top", "/d"],
        1,
    )
    .await;
    mount_page(&server, "/d", "D", &[], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("pages.db");
    let config = create_test_config(&db_path, 2, 2);

    let stats = run(&config, &format!("{}/", base)).await.unwrap();
    assert_eq!(stats.pages_indexed, 2);
    assert_eq!(stats.already_visited, 3);

    let indexer = SqliteIndexer::open(&db_path, "pages").unwrap();
    let hits = indexer
        .search(&SearchQuery::new().title("d"))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].url, format!("{}/d", base));
}

#[tokio::test]
async fn test_external_and_relative_links_ignored() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        "Root",
        &[
            "http://other.example/c",
            "//other.example/d",
            "relative.html",
            "mailto:someone@example.com",
            "/inside",
        ],
        1,
    )
    .await;
    mount_page(&server, "/inside", "Inside", &[], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&dir.path().join("pages.db"), 2, 2);

    let stats = run(&config, &format!("{}/", server.uri())).await.unwrap();
    assert_eq!(stats.pages_indexed, 2);
    assert_eq!(stats.links_enqueued, 1);
    assert_eq!(stats.fetch_failures, 0);
}

#[tokio::test]
async fn test_fetch_failure_is_isolated() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Root", &["/broken", "/ok"], 1).await;
    mount_page(&server, "/ok", "Ok", &[], 1).await;

    // Claims gzip but is not, so reading the body fails
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_bytes(b"definitely not gzip".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&dir.path().join("pages.db"), 2, 2);

    let stats = run(&config, &format!("{}/", server.uri())).await.unwrap();
    assert_eq!(stats.fetch_failures, 1);
    assert_eq!(stats.pages_indexed, 2);
}

#[tokio::test]
async fn test_error_status_pages_are_indexed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", "Root", &["/gone"], 1).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("<html><head><title>Not Found</title></head></html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("pages.db");
    let config = create_test_config(&db_path, 1, 2);

    let stats = run(&config, &format!("{}/", base)).await.unwrap();
    assert_eq!(stats.pages_indexed, 2);

    let indexer = SqliteIndexer::open(&db_path, "pages").unwrap();
    let doc = indexer
        .get_document(&document_id(&format!("{}/gone", base)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.title, "Not Found");
}

#[tokio::test]
async fn test_leaf_seed_terminates_within_idle_window() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Leaf", &[], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&dir.path().join("pages.db"), 4, 2);

    let start = Instant::now();
    let stats = tokio::time::timeout(
        Duration::from_secs(10),
        run(&config, &format!("{}/", server.uri())),
    )
    .await
    .expect("crawl should terminate on its own")
    .unwrap();

    assert_eq!(stats.pages_indexed, 1);
    assert!(start.elapsed() >= IDLE);
    assert!(start.elapsed() < IDLE * 6);
}

#[tokio::test]
async fn test_recrawl_is_idempotent() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Root", &["/a"], 2).await;
    mount_page(&server, "/a", "A", &[], 2).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("pages.db");
    let config = create_test_config(&db_path, 2, 2);
    let seed = format!("{}/", server.uri());

    let first = run(&config, &seed).await.unwrap();
    let second = run(&config, &seed).await.unwrap();
    assert_eq!(first.pages_indexed, 2);
    assert_eq!(second.pages_indexed, 2);

    // Schema bootstrap ran twice, documents were upserted in place
    let indexer = SqliteIndexer::open(&db_path, "pages").unwrap();
    assert_eq!(indexer.count_documents().unwrap(), 2);
}

#[tokio::test]
async fn test_shared_indexer_sees_crawl() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Shared", &["/x"], 1).await;
    mount_page(&server, "/x", "X", &[], 1).await;

    let indexer = Arc::new(SqliteIndexer::open_in_memory("pages").unwrap());
    let mut config = Config::default();
    config.crawler.max_workers = 2;

    let coordinator = Coordinator::with_indexer(
        &config,
        &format!("{}/", server.uri()),
        indexer.clone(),
    )
    .unwrap()
    .idle_timeout(IDLE);

    let stats = coordinator.run().await.unwrap();
    assert_eq!(stats.pages_indexed, 2);
    assert_eq!(coordinator.visited_count(), 2);
    assert_eq!(indexer.count_documents().unwrap(), 2);
}

#[tokio::test]
async fn test_invalid_seed_is_a_crawl_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&dir.path().join("pages.db"), 2, 2);

    let result = run(&config, "/not/absolute").await;
    assert!(matches!(result, Err(CrawlError::InvalidSeed { .. })));
}

#[tokio::test]
async fn test_crawl_into_elasticsearch() {
    let site = MockServer::start().await;
    let cluster = MockServer::start().await;
    let seed = format!("{}/", site.uri());

    mount_page(&site, "/", "Home", &["/about"], 1).await;
    mount_page(&site, "/about", "About", &[], 1).await;

    Mock::given(method("HEAD"))
        .and(path("/pages"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&cluster)
        .await;
    Mock::given(method("PUT"))
        .and(path("/pages"))
        .and(body_partial_json(json!({
            "mappings": { "properties": { "content": { "analyzer": "html_stripper" } } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&cluster)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/pages/_doc/{}", document_id(&seed))))
        .and(body_partial_json(json!({ "title": "Home", "url": seed })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&cluster)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/pages/_doc/[0-9a-f]{64}$"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&cluster)
        .await;

    let cluster_addr = cluster.address();
    let mut config = Config::default();
    config.crawler.max_workers = 2;
    config.crawler.connect_timeout_secs = 2;
    config.index.backend = IndexBackend::Elasticsearch;
    config.index.elasticsearch.host = cluster_addr.ip().to_string();
    config.index.elasticsearch.port = cluster_addr.port();
    config.index.elasticsearch.username = String::new();

    let stats = run(&config, &seed).await.unwrap();
    assert_eq!(stats.pages_indexed, 2);
}

#[tokio::test]
async fn test_elasticsearch_rejection_counted() {
    let site = MockServer::start().await;
    let cluster = MockServer::start().await;

    mount_page(&site, "/", "Home", &["/bad"], 1).await;
    mount_page(&site, "/bad", "Bad", &[], 1).await;

    Mock::given(method("HEAD"))
        .and(path("/pages"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&cluster)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/pages/_doc/"))
        .and(body_partial_json(json!({ "title": "Bad" })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "type": "mapper_parsing_exception" },
            "status": 400
        })))
        .mount(&cluster)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/pages/_doc/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&cluster)
        .await;

    let cluster_addr = cluster.address();
    let mut config = Config::default();
    config.crawler.max_workers = 1;
    config.index.elasticsearch.host = cluster_addr.ip().to_string();
    config.index.elasticsearch.port = cluster_addr.port();

    let stats = run(&config, &format!("{}/", site.uri())).await.unwrap();
    assert_eq!(stats.pages_indexed, 1);
    assert_eq!(stats.schema_rejections, 1);
}

#[tokio::test]
async fn test_elasticsearch_outage_does_not_stop_crawl() {
    let site = MockServer::start().await;
    let cluster = MockServer::start().await;

    mount_page(&site, "/", "Home", &["/next"], 1).await;
    mount_page(&site, "/next", "Next", &[], 1).await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&cluster)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&cluster)
        .await;

    let cluster_addr = cluster.address();
    let mut config = Config::default();
    config.crawler.max_workers = 2;
    config.index.elasticsearch.host = cluster_addr.ip().to_string();
    config.index.elasticsearch.port = cluster_addr.port();

    // Both pages are still crawled, but neither counts as indexed
    let stats = run(&config, &format!("{}/", site.uri())).await.unwrap();
    assert_eq!(stats.pages_indexed, 0);
    assert_eq!(stats.index_failures, 2);
    assert_eq!(stats.schema_rejections, 0);
    assert_eq!(stats.links_enqueued, 1);
}

#[tokio::test]
async fn test_stalled_cluster_does_not_block_termination() {
    let site = MockServer::start().await;
    let cluster = MockServer::start().await;

    mount_page(&site, "/", "Home", &[], 1).await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&cluster)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(120)))
        .mount(&cluster)
        .await;

    let cluster_addr = cluster.address();
    let mut config = Config::default();
    config.crawler.max_workers = 2;
    config.index.elasticsearch.host = cluster_addr.ip().to_string();
    config.index.elasticsearch.port = cluster_addr.port();
    config.index.elasticsearch.request_timeout_secs = 1;

    let stats = tokio::time::timeout(
        Duration::from_secs(15),
        run(&config, &format!("{}/", site.uri())),
    )
    .await
    .expect("crawl should finish once the index request times out")
    .unwrap();

    assert_eq!(stats.pages_indexed, 0);
    assert_eq!(stats.index_failures, 1);
}
