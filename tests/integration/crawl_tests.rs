//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the full
//! discover / fetch / checkpoint cycle end-to-end, plus in-process parsers
//! for properties that need exact control over fetch results.

use async_trait::async_trait;
use reqwest::Client;
use shelf_crawler::catalog::{CatalogEntry, CrawlState, ProductRecord};
use shelf_crawler::config::Config;
use shelf_crawler::crawler::Coordinator;
use shelf_crawler::output::RunSummary;
use shelf_crawler::sites::{OkalaParser, SiteParser, SnappParser};
use shelf_crawler::storage::{CheckpointStore, JsonCheckpointStore, MemoryCheckpointStore};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing under `root`
fn create_test_config(site: &str, root: &Path, workers: usize) -> Config {
    let mut config = Config::default();
    config.run.site = site.to_string();
    config.run.run_id = 1;
    config.crawler.workers = workers;
    config.output.root = root.to_path_buf();
    config.http.timeout_secs = 5;
    config
}

fn okala_page(title: &str, images: &[&str]) -> String {
    let gallery: String = images
        .iter()
        .map(|src| format!(r#"<img data-zoom-image="{}">"#, src))
        .collect();
    format!(
        r#"<html><body>
          <ol class="breadcrumb"><li><a href="/">Home</a></li><li>{title}</li></ol>
          <h1 class="h4 line-height-sm font-weight-bold">{title}</h1>
          <div class="gallery-top">{gallery}</div>
        </body></html>"#
    )
}

fn urlset(locations: &[String]) -> String {
    let urls: String = locations
        .iter()
        .map(|loc| format!("<url><loc>{}</loc></url>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        urls
    )
}

async fn mount_get(server: &MockServer, at: &str, response: ResponseTemplate, hits: u64) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(response)
        .expect(hits)
        .mount(server)
        .await;
}

/// Serves a four-product okala.com catalog; product 104 is broken
async fn mount_okala_site(server: &MockServer) {
    let base = server.uri();
    let sitemap = urlset(&[
        format!("{}/101", base),
        format!("{}/about", base),
        format!("{}/102", base),
        format!("{}/103", base),
        format!("{}/104", base),
    ]);

    mount_get(server, "/sitemap.xml", ResponseTemplate::new(200).set_body_string(sitemap), 1).await;
    mount_get(
        server,
        "/101",
        ResponseTemplate::new(200).set_body_string(okala_page("Milk", &[])),
        1,
    )
    .await;
    mount_get(
        server,
        "/102",
        ResponseTemplate::new(200).set_body_string(okala_page("Bread", &["/img/bread.png"])),
        1,
    )
    .await;
    mount_get(
        server,
        "/103",
        ResponseTemplate::new(200).set_body_string(okala_page(
            "Cheese",
            &["/img/cheese-1.jpg", "/img/missing.jpg", "/img/cheese-2.jpg"],
        )),
        1,
    )
    .await;
    mount_get(server, "/104", ResponseTemplate::new(500), 1).await;

    mount_get(
        server,
        "/img/bread.png",
        ResponseTemplate::new(200)
            .insert_header("content-type", "image/png")
            .set_body_bytes(vec![1, 2, 3]),
        1,
    )
    .await;
    mount_get(
        server,
        "/img/cheese-1.jpg",
        ResponseTemplate::new(200).set_body_bytes(vec![4, 5]),
        1,
    )
    .await;
    mount_get(
        server,
        "/img/cheese-2.jpg",
        ResponseTemplate::new(200).set_body_bytes(vec![6]),
        1,
    )
    .await;
    mount_get(server, "/img/missing.jpg", ResponseTemplate::new(404), 1).await;
}

fn okala_coordinator(server: &MockServer, dir: &TempDir) -> (Coordinator, JsonCheckpointStore) {
    let config = create_test_config("okala.com", dir.path(), 3);
    let client = Client::new();
    let parser = Arc::new(OkalaParser::with_sitemap(
        client.clone(),
        format!("{}/sitemap.xml", server.uri()),
    ));
    let store = JsonCheckpointStore::for_run(&config.run_dir(), "okala.com");
    let coordinator = Coordinator::with_parts(
        config,
        parser,
        Arc::new(JsonCheckpointStore::new(store.path())),
        client,
    );
    (coordinator, store)
}

#[tokio::test]
async fn test_full_crawl_okala_site() {
    let mock_server = MockServer::start().await;
    mount_okala_site(&mock_server).await;
    let dir = TempDir::new().unwrap();

    let (mut coordinator, store) = okala_coordinator(&mock_server, &dir);
    let state = coordinator.run().await.expect("crawl should succeed");

    assert_eq!(state.site, "okala.com");
    assert_eq!(state.sections.len(), 1);
    let section = &state.sections[0];

    // the non-numeric /about entry is not a candidate
    assert_eq!(section.candidate_urls.len(), 4);
    assert_eq!(section.resume_position, section.candidate_urls.len());

    let mut titles: Vec<&str> = section.products.iter().map(|p| p.title.as_str()).collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["Bread", "Cheese", "Milk"]);

    let summary = RunSummary::from_state(&state);
    assert_eq!(summary.products + summary.invalid, summary.candidates);
    assert_eq!(summary.invalid, 1);

    let cheese = section
        .products
        .iter()
        .find(|p| p.title == "Cheese")
        .unwrap();
    assert_eq!(cheese.images.len(), 3);
    assert_eq!(cheese.resolved_images(), 2);
    assert!(!cheese.images[1].is_resolved());

    let cheese_dir = dir.path().join("1").join("okala.com").join("103");
    assert_eq!(std::fs::read_dir(&cheese_dir).unwrap().count(), 2);

    let bread = section.products.iter().find(|p| p.title == "Bread").unwrap();
    let bread_path = bread.images[0].local_path.as_ref().unwrap();
    assert!(bread_path.starts_with(dir.path().join("1").join("okala.com").join("102")));
    assert_eq!(bread_path.extension().unwrap(), "png");
    assert_eq!(std::fs::read(bread_path).unwrap(), vec![1, 2, 3]);

    let saved = store.load().unwrap().expect("checkpoint should exist");
    assert_eq!(saved, state);
    assert!(dir.path().join("1").join("info-okala.com.json").exists());
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let mock_server = MockServer::start().await;
    // every mock expects exactly one hit across both runs
    mount_okala_site(&mock_server).await;
    let dir = TempDir::new().unwrap();

    let (mut first, _) = okala_coordinator(&mock_server, &dir);
    let first_state = first.run().await.unwrap();

    let (mut second, _) = okala_coordinator(&mock_server, &dir);
    let second_state = second.run().await.unwrap();

    assert_eq!(first_state, second_state);
}

#[tokio::test]
async fn test_snapp_sitemap_index_and_api() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    let index = format!(
        r#"<sitemapindex>
             <sitemap><loc>{base}/sitemap-products.xml</loc></sitemap>
             <sitemap><loc>{base}/sitemap-gone.xml</loc></sitemap>
           </sitemapindex>"#
    );
    mount_get(&mock_server, "/sitemap.xml", ResponseTemplate::new(200).set_body_string(index), 1).await;
    mount_get(
        &mock_server,
        "/sitemap-products.xml",
        ResponseTemplate::new(200).set_body_string(urlset(&[
            format!("{}/products/rice/11", base),
            format!("{}/categories/rice", base),
            format!("{}/products/tea/12", base),
        ])),
        1,
    )
    .await;
    mount_get(&mock_server, "/sitemap-gone.xml", ResponseTemplate::new(404), 1).await;

    let rice = r#"{"product": {"id": 11, "title": "Rice", "price": 10, "discounted_price": 9,
                   "images": [{"image": "", "thumb": ""}], "brand": {"title": "Golestan"}},
                   "breadcrumb": [{"id": 1, "title": "Groceries", "slug": "g"}]}"#;
    mount_get(
        &mock_server,
        "/api/v1/vendors/0r5ryz/products/11",
        ResponseTemplate::new(200).set_body_raw(rice, "application/json"),
        1,
    )
    .await;
    mount_get(
        &mock_server,
        "/api/v1/vendors/0r5ryz/products/12",
        ResponseTemplate::new(200).set_body_raw(r#"{"product": {"id": 12}}"#, "application/json"),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config("snapp.market", dir.path(), 2);
    let client = Client::new();
    let parser = Arc::new(SnappParser::with_endpoints(
        client.clone(),
        format!("{}/sitemap.xml", base),
        base.clone(),
    ));
    let store = Arc::new(MemoryCheckpointStore::new());
    let mut coordinator = Coordinator::with_parts(config, parser, store.clone(), client);

    let state = coordinator.run().await.unwrap();

    assert_eq!(state.sections.len(), 2);
    assert_eq!(state.sections[0].candidate_urls.len(), 2);
    assert!(state.sections[1].candidate_urls.is_empty());
    assert_eq!(state.sections[1].resume_position, 0);

    // product 12 has no title and is dropped
    let products = &state.sections[0].products;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].title, "Rice");
    assert_eq!(products[0].brand, "Golestan");
    assert_eq!(products[0].price, "9");
    assert!(!products[0].images[0].is_resolved());

    // discovery, collector final, orchestrator checkpoint
    assert_eq!(store.save_count(), 3);
}

/// In-process parser with deterministic results and fetch accounting
struct CountingParser {
    fetches: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
    slow_url: Option<String>,
}

impl CountingParser {
    fn new() -> Self {
        Self {
            fetches: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            slow_url: None,
        }
    }

    /// Same parser, but `url` takes 200ms instead of 5ms
    fn with_slow_url(url: &str) -> Self {
        Self {
            slow_url: Some(url.to_string()),
            ..Self::new()
        }
    }
}

#[async_trait]
impl SiteParser for CountingParser {
    fn describe(&self) -> CrawlState {
        CrawlState::new("counting.test")
    }

    async fn fetch_product(&self, url: &str) -> ProductRecord {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let delay = if self.slow_url.as_deref() == Some(url) { 200 } else { 5 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        // URLs ending in 7 fail to parse
        if url.ends_with('7') {
            return ProductRecord::placeholder(url);
        }
        ProductRecord {
            url: url.to_string(),
            pid: url.to_string(),
            title: format!("Product {}", url),
            ..ProductRecord::default()
        }
    }

    fn is_candidate_url(&self, _url: &str) -> bool {
        true
    }
}

fn discovered_state(sections: &[usize]) -> CrawlState {
    CrawlState {
        site: "counting.test".to_string(),
        sitemap_index_url: None,
        sections: sections
            .iter()
            .enumerate()
            .map(|(s, &count)| {
                let mut entry = CatalogEntry::new(format!("section-{}", s));
                entry.candidate_urls = (0..count).map(|i| format!("{}-{}", s, i)).collect();
                entry
            })
            .collect(),
    }
}

fn counting_coordinator(
    dir: &TempDir,
    workers: usize,
    parser: Arc<CountingParser>,
    store: Arc<MemoryCheckpointStore>,
) -> Coordinator {
    let config = create_test_config("counting.test", dir.path(), workers);
    Coordinator::with_parts(config, parser, store, Client::new())
}

fn product_urls(state: &CrawlState) -> Vec<Vec<String>> {
    state
        .sections
        .iter()
        .map(|section| {
            let mut urls: Vec<String> = section.products.iter().map(|p| p.url.clone()).collect();
            urls.sort();
            urls
        })
        .collect()
}

#[tokio::test]
async fn test_concurrency_is_bounded_by_workers() {
    let dir = TempDir::new().unwrap();
    let parser = Arc::new(CountingParser::new());
    let store = Arc::new(MemoryCheckpointStore::with_state(discovered_state(&[40, 25])));

    let mut coordinator = counting_coordinator(&dir, 4, parser.clone(), store);
    let state = coordinator.run().await.unwrap();

    assert_eq!(parser.fetches.load(Ordering::SeqCst), 65);
    let peak = parser.peak.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= 4, "peak concurrency was {}", peak);

    for section in &state.sections {
        assert_eq!(section.resume_position, section.candidate_urls.len());
    }
}

#[tokio::test]
async fn test_checkpoint_cadence_counts_every_record() {
    let dir = TempDir::new().unwrap();
    let parser = Arc::new(CountingParser::new());
    let store = Arc::new(MemoryCheckpointStore::with_state(discovered_state(&[120])));

    let mut coordinator = counting_coordinator(&dir, 8, parser, store.clone());
    let state = coordinator.run().await.unwrap();

    let cursors: Vec<usize> = store
        .snapshots()
        .iter()
        .map(|s| s.sections[0].resume_position)
        .collect();
    // seeded, 50 records, 100 records, collector final, orchestrator
    assert_eq!(cursors.len(), 5);
    assert_eq!(cursors[0], 0);
    assert!(cursors[1] <= 50 && cursors[2] <= 100, "cursors {:?}", cursors);
    assert!(cursors.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(&cursors[3..], &[120, 120]);

    // 0-7, 0-17, ..., 0-117 are invalid
    assert_eq!(state.sections[0].products.len(), 108);
}

#[tokio::test]
async fn test_resume_from_checkpoint_with_slow_first_candidate() {
    let dir = TempDir::new().unwrap();

    let full_store = Arc::new(MemoryCheckpointStore::with_state(discovered_state(&[6])));
    let mut full_coordinator = counting_coordinator(&dir, 3, Arc::new(CountingParser::new()), full_store);
    let full = full_coordinator.run().await.unwrap();

    // candidate 0-0 is still in flight when the first checkpoint is written
    let store = Arc::new(MemoryCheckpointStore::with_state(discovered_state(&[6])));
    let mut config = create_test_config("counting.test", dir.path(), 3);
    config.crawler.checkpoint_interval = 2;
    Coordinator::with_parts(
        config,
        Arc::new(CountingParser::with_slow_url("0-0")),
        store.clone(),
        Client::new(),
    )
    .run()
    .await
    .unwrap();

    let checkpoint = store.snapshots()[1].clone();
    assert_eq!(checkpoint.sections[0].resume_position, 0);
    assert_eq!(checkpoint.sections[0].products.len(), 2);

    let resume_parser = Arc::new(CountingParser::new());
    let resume_store = Arc::new(MemoryCheckpointStore::with_state(checkpoint));
    let resumed = counting_coordinator(&dir, 3, resume_parser.clone(), resume_store)
        .run()
        .await
        .unwrap();

    // only the four candidates not yet collected are fetched again
    assert_eq!(resume_parser.fetches.load(Ordering::SeqCst), 4);
    assert_eq!(resumed.sections[0].products.len(), 6);
    assert_eq!(product_urls(&resumed), product_urls(&full));
    assert_eq!(resumed.sections[0].resume_position, 6);
}

#[tokio::test]
async fn test_finished_checkpoint_fetches_nothing() {
    let dir = TempDir::new().unwrap();
    let mut finished = discovered_state(&[5, 0]);
    finished.sections[0].resume_position = 5;

    let parser = Arc::new(CountingParser::new());
    let store = Arc::new(MemoryCheckpointStore::with_state(finished.clone()));
    let state = counting_coordinator(&dir, 2, parser.clone(), store.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(state, finished);
    assert_eq!(parser.fetches.load(Ordering::SeqCst), 0);
    assert_eq!(store.save_count(), 1);
}
