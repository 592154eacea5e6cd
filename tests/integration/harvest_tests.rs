//! Integration tests for the harvester
//!
//! These tests use wiremock to mock the marketplace (search pages, detail
//! pages, image bytes) and tempfile output roots to test the full harvest
//! cycle end-to-end.

use image::{ImageOutputFormat, Rgb, RgbImage};
use inserat_harvester::config::{
    Config, FilterConfig, HarvesterConfig, OutputConfig, SiteConfig,
};
use inserat_harvester::harvest::harvest;
use std::io::Cursor;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at a mock server and temp root
fn create_test_config(base_url: &str, output_root: &Path) -> Config {
    Config {
        harvester: HarvesterConfig {
            max_threads: 1,
            random_keywords: false,
            max_pages: 5,
        },
        filters: FilterConfig {
            min_price: 50.0,
            max_price: 200.0,
            min_pictures: 1,
            price_reduction: 0.8,
        },
        output: OutputConfig {
            root_path: output_root.to_string_lossy().into_owned(),
            forward_ready: true,
        },
        site: SiteConfig {
            base_url: base_url.to_string(),
        },
    }
}

/// Wraps listing items in the site's results-page markup
fn listing_page(items: &str) -> String {
    format!(
        r#"<html><body><ul class="items list-unstyled">{}</ul></body></html>"#,
        items
    )
}

fn empty_page() -> String {
    listing_page("")
}

/// One eligible listing node
fn listing_item(id: &str, title: &str, price: &str, img: &str) -> String {
    format!(
        r#"<li id="item-{id}"><a href="/listing/{id}">{title}</a><span class="price">{price}</span><img src="{img}" /></li>"#
    )
}

/// Detail page with a description in the primary selector
fn detail_page(description: &str) -> String {
    format!(
        r#"<html><body><div class="summary description"><span>{}</span></div></body></html>"#,
        description
    )
}

/// Search page used for link resolution of one id
fn resolution_page(id: &str) -> String {
    listing_page(&format!(
        r#"<li id="item-{id}"><a href="/listing/{id}">match</a></li>"#
    ))
}

/// Small valid JPEG for image mocks
fn jpeg_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(8, 8, Rgb([120, 80, 40]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Jpeg(90)).unwrap();
    out.into_inner()
}

/// Mounts the standard mocks for one harvestable ad
async fn mount_ad_mocks(server: &MockServer, keyword: &str, id: &str) {
    // Page 1 carries the listing, page 2 ends pagination
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", keyword))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&listing_item(
            id,
            "Vintage Guitar",
            "EUR 120,00",
            "/img/main.jpg",
        ))))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", keyword))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty_page()))
        .mount(server)
        .await;

    // Link resolution searches for the exact id
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", id))
        .respond_with(ResponseTemplate::new(200).set_body_string(resolution_page(id)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/listing/{}", id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(detail_page("A lovely old guitar.")),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/main.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg_bytes()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_writes_record() {
    let server = MockServer::start().await;
    mount_ad_mocks(&server, "guitar", "111").await;

    let root = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), root.path());

    let summary = harvest(config, vec!["guitar".to_string()])
        .await
        .expect("harvest failed");

    assert_eq!(summary.keywords_processed, 1);
    assert_eq!(summary.keywords_aborted, 0);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.listings_found, 1);
    assert_eq!(summary.harvested, 1);
    assert_eq!(summary.failed, 0);

    // EUR 120,00 reduced by 0.8 and rounded is 96
    let record_dir = root.path().join("[96€] Vintage Guitar 111");
    assert!(record_dir.exists(), "record directory missing");

    let json = std::fs::read_to_string(record_dir.join("inserat.json")).unwrap();
    assert!(json.contains("\"id\": \"111\""));
    assert!(json.contains("\"price\": 96"));
    assert!(json.contains("A lovely old guitar."));
    assert!(json.contains("/listing/111"));

    // Sanitized image decodes and no staging directory is left behind
    let pic = std::fs::read(record_dir.join("pic0.jpg")).unwrap();
    assert!(image::load_from_memory(&pic).is_ok());
    assert!(!root.path().join("[96€] Vintage Guitar 111.tmp").exists());

    // Forward-ready digest: link, date, title, price, description
    let digest = std::fs::read_to_string(record_dir.join("fwimport.txt")).unwrap();
    let lines: Vec<&str> = digest.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].contains("/listing/111"));
    assert_eq!(lines[2], "Vintage Guitar");
    assert_eq!(lines[3], "96");
}

#[tokio::test]
async fn test_second_run_makes_no_detail_or_image_calls() {
    let server = MockServer::start().await;

    // Search pages are hit by both runs
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "guitar"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&listing_item(
            "111",
            "Vintage Guitar",
            "EUR 120,00",
            "/img/main.jpg",
        ))))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "guitar"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty_page()))
        .expect(2)
        .mount(&server)
        .await;

    // Enrichment endpoints must only be hit by the first run
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "111"))
        .respond_with(ResponseTemplate::new(200).set_body_string(resolution_page("111")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/listing/111"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(detail_page("A lovely old guitar.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/main.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg_bytes()))
        .expect(1)
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();

    let first = harvest(
        create_test_config(&server.uri(), root.path()),
        vec!["guitar".to_string()],
    )
    .await
    .expect("first run failed");
    assert_eq!(first.harvested, 1);

    let second = harvest(
        create_test_config(&server.uri(), root.path()),
        vec!["guitar".to_string()],
    )
    .await
    .expect("second run failed");

    assert_eq!(second.harvested, 0);
    assert_eq!(second.already_claimed, 1);

    // Dropping the server verifies the expect() counts
}

#[tokio::test]
async fn test_unresolvable_link_writes_no_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "lamp"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&listing_item(
            "222",
            "Rare Lamp",
            "EUR 80,00",
            "/img/lamp.jpg",
        ))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "lamp"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty_page()))
        .mount(&server)
        .await;

    // The id search finds nothing: the ad was delisted
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "222"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty_page()))
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let summary = harvest(
        create_test_config(&server.uri(), root.path()),
        vec!["lamp".to_string()],
    )
    .await
    .expect("harvest failed");

    assert_eq!(summary.link_unresolved, 1);
    assert_eq!(summary.harvested, 0);

    // No record directory appeared
    let entries: Vec<_> = std::fs::read_dir(root.path()).unwrap().collect();
    assert!(entries.is_empty(), "no record should have been created");
}

#[tokio::test]
async fn test_pagination_stops_at_max_pages() {
    let server = MockServer::start().await;

    // Every page returns the same listing; only max-pages bounds the crawl
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "amp"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&listing_item(
            "333",
            "Tube Amp",
            "EUR 150,00",
            "/img/amp.jpg",
        ))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "333"))
        .respond_with(ResponseTemplate::new(200).set_body_string(resolution_page("333")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/listing/333"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(
            "A warm sounding tube amplifier in good condition.",
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/amp.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg_bytes()))
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&server.uri(), root.path());
    config.harvester.max_pages = 3;

    let summary = harvest(config, vec!["amp".to_string()])
        .await
        .expect("harvest failed");

    assert_eq!(summary.pages_fetched, 3);
    // First sighting harvests, later pages hit the dedup gate
    assert_eq!(summary.harvested, 1);
    assert_eq!(summary.already_claimed, 2);
}

#[tokio::test]
async fn test_filtered_page_does_not_end_pagination() {
    let server = MockServer::start().await;

    // Page 1 carries only a listing priced below the minimum; the crawl
    // must still continue to page 2, which has a harvestable ad
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "radio"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&listing_item(
            "666",
            "Broken Radio",
            "EUR 10,00",
            "/img/broken.jpg",
        ))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "radio"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&listing_item(
            "777",
            "Tube Radio",
            "EUR 100,00",
            "/img/tube.jpg",
        ))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "radio"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty_page()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "777"))
        .respond_with(ResponseTemplate::new(200).set_body_string(resolution_page("777")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/listing/777"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(
            "A restored tube radio from the fifties, fully working.",
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/tube.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg_bytes()))
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let summary = harvest(
        create_test_config(&server.uri(), root.path()),
        vec!["radio".to_string()],
    )
    .await
    .expect("harvest failed");

    assert_eq!(summary.pages_fetched, 3);
    // Both nodes were seen even though only one passed the filters
    assert_eq!(summary.listings_found, 2);
    assert_eq!(summary.harvested, 1);
    assert!(root.path().join("[80€] Tube Radio 777").exists());
}

#[tokio::test]
async fn test_image_decode_failure_abandons_ad_retryably() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "cam"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&listing_item(
            "444",
            "Old Camera",
            "EUR 90,00",
            "/img/cam.jpg",
        ))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "cam"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty_page()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "444"))
        .respond_with(ResponseTemplate::new(200).set_body_string(resolution_page("444")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/listing/444"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(
            "A well preserved camera from the seventies.",
        )))
        .mount(&server)
        .await;

    // The image endpoint serves something that is not an image
    Mock::given(method("GET"))
        .and(path("/img/cam.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not an image"))
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let summary = harvest(
        create_test_config(&server.uri(), root.path()),
        vec!["cam".to_string()],
    )
    .await
    .expect("harvest failed");

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.harvested, 0);

    // The claim was released: nothing left under the root, so a later
    // run can retry the ad
    let entries: Vec<_> = std::fs::read_dir(root.path()).unwrap().collect();
    assert!(entries.is_empty(), "failed ad must not leave directories");
}

#[tokio::test]
async fn test_missing_description_falls_back_to_sentinel() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "mic"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&listing_item(
            "555",
            "Studio Mic",
            "EUR 75,00",
            "/img/mic.jpg",
        ))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "mic"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty_page()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "555"))
        .respond_with(ResponseTemplate::new(200).set_body_string(resolution_page("555")))
        .mount(&server)
        .await;

    // Detail page with no description container and no substantial text
    Mock::given(method("GET"))
        .and(path("/listing/555"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body><p>hi</p></body></html>"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/mic.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg_bytes()))
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let summary = harvest(
        create_test_config(&server.uri(), root.path()),
        vec!["mic".to_string()],
    )
    .await
    .expect("harvest failed");

    assert_eq!(summary.harvested, 1);

    let json =
        std::fs::read_to_string(root.path().join("[60€] Studio Mic 555").join("inserat.json"))
            .unwrap();
    assert!(json.contains("no description available"));
}

#[tokio::test]
async fn test_randomized_concurrent_draw_processes_each_keyword_once() {
    let server = MockServer::start().await;

    // Every keyword's first page is empty, so each crawl costs one fetch
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty_page()))
        .expect(6)
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&server.uri(), root.path());
    config.harvester.max_threads = 4;
    config.harvester.random_keywords = true;

    let keywords: Vec<String> = (0..6).map(|i| format!("keyword-{}", i)).collect();
    let summary = harvest(config, keywords).await.expect("harvest failed");

    assert_eq!(summary.keywords_processed, 6);
    assert_eq!(summary.keywords_aborted, 0);
    assert_eq!(summary.pages_fetched, 6);
}
