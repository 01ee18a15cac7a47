use anidump::catalog::{CatalogEntry, CatalogIndex, UNKNOWN_GENRE, UNKNOWN_TYPE};
use anidump::config::Config;
use anidump::crawler::Coordinator;
use anidump::output::CrawlReport;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DELAY: Duration = Duration::from_millis(600);

/// Creates a test configuration pointing every endpoint at the mock server
fn create_test_config(server: &MockServer, dump_dir: &Path) -> Config {
    let mut config = Config::default();
    config.source.sitemap_url = format!("{}/sitemap.xml", server.uri());
    config.source.api_url = format!("{}/v2/gettitle", server.uri());
    config.source.poster_base_url = server.uri();
    config.output.dump_dir = dump_dir.to_string_lossy().into_owned();
    config
}

fn release(id: u64, code: &str, name: &str, kind: Option<&str>, genres: &[&str]) -> Value {
    json!({
        "id": id,
        "code": code,
        "names": { "ru": name, "en": code },
        "posters": {
            "small": { "url": format!("/upload/release/200x280/{}.jpg", id) },
            "original": { "url": format!("/upload/release/350x500/{}.jpg", id) }
        },
        "type": { "full_string": kind.map(|k| format!("{} (12 эп.)", k)), "string": kind },
        "genres": genres,
        "season": { "year": 2020 }
    })
}

fn sitemap(codes: &[&str]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n\
         <url><loc>https://www.anilibria.tv/</loc></url>\n",
    );
    for code in codes {
        xml.push_str(&format!(
            "<url><loc>https://www.anilibria.tv/release/{}.html</loc></url>\n",
            code
        ));
    }
    xml.push_str("<url><loc>https://www.anilibria.tv/pages/schedule.php</loc></url>\n</urlset>\n");
    xml
}

async fn mount_sitemap(server: &MockServer, codes: &[&str], expected: u64) {
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap(codes)))
        .expect(expected)
        .mount(server)
        .await;
}

/// Mounts the metadata and poster endpoints for one release
async fn mount_release(server: &MockServer, record: &Value, expected: u64) {
    let code = record["code"].as_str().unwrap().to_string();
    let poster = record["posters"]["original"]["url"].as_str().unwrap().to_string();

    Mock::given(method("GET"))
        .and(path("/v2/gettitle"))
        .and(query_param("code", code.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(record.clone()))
        .expect(expected)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(poster.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(format!("JPEG:{}", code).into_bytes())
                .insert_header("content-type", "image/jpeg"),
        )
        .expect(expected)
        .mount(server)
        .await;
}

fn read_report(dump_dir: &Path) -> CrawlReport {
    let raw = std::fs::read_to_string(dump_dir.join("report.json")).expect("report exists");
    serde_json::from_str(&raw).expect("report is valid JSON")
}

fn catalog_files(dump_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dump_dir.join("catalogs"))
        .expect("catalogs dir exists")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Snapshot of every file under `dir`, keyed by path
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.insert(path.clone(), std::fs::read(&path).unwrap());
            }
        }
    }
    files
}

#[tokio::test]
async fn test_full_dump_from_sitemap() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dump_dir = dir.path().join("dump");

    let naruto = release(1, "naruto", "Наруто", Some("ТВ"), &["Приключения", "Сёнэн"]);
    let bleach = release(2, "bleach", "Блич", Some("ТВ"), &["Сёнэн"]);
    let akira = release(3, "akira", "Акира", Some("Фильм"), &["Фантастика"]);

    mount_sitemap(&mock_server, &["naruto", "bleach", "akira"], 1).await;
    for record in [&naruto, &bleach, &akira] {
        mount_release(&mock_server, record, 1).await;
    }

    let coordinator = Coordinator::new(create_test_config(&mock_server, &dump_dir))
        .expect("Failed to create coordinator");
    let started = Instant::now();
    let summary = coordinator.run().await.expect("Dump failed");

    // Three ingestions, each followed by the pause
    assert!(started.elapsed() >= DELAY * 3);
    assert!(summary.failures.is_empty());
    assert_eq!(summary.report.releases_in_dump, 3);

    assert_eq!(
        std::fs::read_to_string(dump_dir.join("releases.txt")).unwrap(),
        "naruto\nbleach\nakira"
    );

    // Metadata is stored verbatim
    let stored: Value = serde_json::from_slice(
        &std::fs::read(dump_dir.join("release/naruto/data.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(stored, naruto);
    assert_eq!(
        std::fs::read(dump_dir.join("release/akira/poster.jpg")).unwrap(),
        b"JPEG:akira"
    );

    // Newest first
    let catalogs = CatalogIndex::new(dump_dir.join("catalogs"));
    assert_eq!(
        catalogs.read("ТВ").await.unwrap(),
        vec![
            CatalogEntry::new("Блич", "bleach"),
            CatalogEntry::new("Наруто", "naruto"),
        ]
    );
    assert_eq!(
        catalogs.read("Фильм").await.unwrap(),
        vec![CatalogEntry::new("Акира", "akira")]
    );

    let report = read_report(&dump_dir);
    assert_eq!(report, summary.report);
    assert_eq!(
        report.available_catalogs,
        vec!["Приключения", "Сёнэн", "ТВ", "Фантастика", "Фильм"]
    );
    assert_eq!(
        std::fs::read_to_string(dump_dir.join("completed.txt")).unwrap(),
        "naruto\nbleach\nakira\n"
    );

    // Wiremock verifies the expected request counts when mock_server drops
}

#[tokio::test]
async fn test_existing_resume_list_drives_the_crawl() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dump_dir = dir.path().to_path_buf();

    // The cached sitemap and resume list are used as-is
    std::fs::write(dump_dir.join("sitemap.xml"), sitemap(&[])).unwrap();
    std::fs::write(dump_dir.join("releases.txt"), "one\ntwo\n\nthree\n").unwrap();
    mount_sitemap(&mock_server, &[], 0).await;

    let records = [
        release(11, "one", "Один", Some("ТВ"), &["Драма"]),
        release(12, "two", "Два", Some("ТВ"), &["Драма"]),
        release(13, "three", "Три", Some("OVA"), &["Драма"]),
    ];
    for record in &records {
        mount_release(&mock_server, record, 1).await;
    }

    let coordinator = Coordinator::new(create_test_config(&mock_server, &dump_dir)).unwrap();
    let started = Instant::now();
    let summary = coordinator.run().await.expect("Dump failed");

    assert!(started.elapsed() >= DELAY * 2);
    assert_eq!(summary.report.releases_in_dump, 3);

    let release_dirs = std::fs::read_dir(dump_dir.join("release")).unwrap().count();
    assert_eq!(release_dirs, 3);

    let requests = mock_server.received_requests().await.unwrap();
    let metadata = requests.iter().filter(|r| r.url.path() == "/v2/gettitle").count();
    let posters = requests
        .iter()
        .filter(|r| r.url.path().starts_with("/upload/"))
        .count();
    assert_eq!(metadata, 3);
    assert_eq!(posters, 3);

    // Requests are issued strictly in resume-list order
    let order: Vec<String> = requests
        .iter()
        .filter(|r| r.url.path() == "/v2/gettitle")
        .map(|r| r.url.query().unwrap_or_default().to_string())
        .collect();
    assert_eq!(order, vec!["code=one", "code=two", "code=three"]);
}

#[tokio::test]
async fn test_rerun_of_finished_dump_is_offline() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dump_dir = dir.path().join("dump");

    let naruto = release(1, "naruto", "Наруто", Some("ТВ"), &["Сёнэн"]);
    let bleach = release(2, "bleach", "Блич", Some("ТВ"), &["Сёнэн"]);
    mount_sitemap(&mock_server, &["naruto", "bleach"], 1).await;
    mount_release(&mock_server, &naruto, 1).await;
    mount_release(&mock_server, &bleach, 1).await;

    let config = create_test_config(&mock_server, &dump_dir);
    let first = Coordinator::new(config.clone()).unwrap().run().await.unwrap();
    assert_eq!(first.report.releases_in_dump, 2);

    let before = snapshot(&dump_dir);
    let requests_before = mock_server.received_requests().await.unwrap().len();

    let second = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(
        mock_server.received_requests().await.unwrap().len(),
        requests_before
    );
    assert_eq!(second.already_complete, 2);

    let after = snapshot(&dump_dir);
    let report_path = dump_dir.join("report.json");
    assert_eq!(before.keys().collect::<Vec<_>>(), after.keys().collect::<Vec<_>>());
    for (path, bytes) in &before {
        if *path != report_path {
            assert_eq!(bytes, &after[path], "{} changed", path.display());
        }
    }

    // The report describes only the current run
    let report = read_report(&dump_dir);
    assert_eq!(report.releases_in_dump, 0);
    assert!(report.available_catalogs.is_empty());
    assert!(report.dump_created_at >= first.report.dump_created_at);
}

#[tokio::test]
async fn test_unknown_type_and_genres_touch_two_catalogs() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dump_dir = dir.path().join("dump");

    let mystery = release(7, "mystery", "Загадка", None, &[]);
    mount_sitemap(&mock_server, &["mystery"], 1).await;
    mount_release(&mock_server, &mystery, 1).await;

    let summary = Coordinator::new(create_test_config(&mock_server, &dump_dir))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(
        catalog_files(&dump_dir),
        vec![
            format!("{}.json", UNKNOWN_TYPE),
            format!("{}.json", UNKNOWN_GENRE)
        ]
    );
    assert_eq!(
        summary.report.available_catalogs,
        vec![UNKNOWN_TYPE, UNKNOWN_GENRE]
    );
}

#[tokio::test]
async fn test_available_catalogs_are_distinct() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dump_dir = dir.path().join("dump");

    let codes = ["a", "b", "c"];
    mount_sitemap(&mock_server, &codes, 1).await;
    for (i, code) in codes.iter().enumerate() {
        let record = release(i as u64, code, code, Some("ТВ"), &["Комедия", "Романтика"]);
        mount_release(&mock_server, &record, 1).await;
    }

    let summary = Coordinator::new(create_test_config(&mock_server, &dump_dir))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(
        read_report(&dump_dir).available_catalogs,
        vec!["Комедия", "Романтика", "ТВ"]
    );
    assert_eq!(summary.report.releases_in_dump, 3);

    let catalogs = CatalogIndex::new(dump_dir.join("catalogs"));
    assert_eq!(catalogs.read("Комедия").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_failed_release_is_skipped_and_retried_next_run() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dump_dir = dir.path().join("dump");

    mount_sitemap(&mock_server, &["good", "broken", "later"], 1).await;
    mount_release(&mock_server, &release(1, "good", "Хороший", Some("ТВ"), &["Драма"]), 1).await;
    mount_release(&mock_server, &release(3, "later", "Потом", Some("ТВ"), &["Драма"]), 1).await;

    // Not JSON at all: the API is down behind a proxy
    Mock::given(method("GET"))
        .and(path("/v2/gettitle"))
        .and(query_param("code", "broken"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, &dump_dir);
    let summary = Coordinator::new(config.clone()).unwrap().run().await.unwrap();

    assert_eq!(summary.report.releases_in_dump, 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].identifier, "broken");
    assert_eq!(
        std::fs::read_to_string(dump_dir.join("completed.txt")).unwrap(),
        "good\nlater\n"
    );

    // Only the failed release is requested again
    let summary = Coordinator::new(config).unwrap().run().await.unwrap();
    assert_eq!(summary.already_complete, 2);
    assert_eq!(summary.failures.len(), 1);
}

#[tokio::test]
async fn test_sitemap_without_releases() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dump_dir = dir.path().join("dump");

    mount_sitemap(&mock_server, &[], 1).await;

    let summary = Coordinator::new(create_test_config(&mock_server, &dump_dir))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(dump_dir.join("releases.txt")).unwrap(), "");
    assert_eq!(summary.report.releases_in_dump, 0);
    assert!(catalog_files(&dump_dir).is_empty());
    assert!(dump_dir.join("report.json").exists());
}

#[tokio::test]
async fn test_non_success_poster_is_written_as_is() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dump_dir = dir.path().join("dump");

    let record = release(5, "lost", "Потерянный", Some("ТВ"), &["Драма"]);
    mount_sitemap(&mock_server, &["lost"], 1).await;

    Mock::given(method("GET"))
        .and(path("/v2/gettitle"))
        .and(query_param("code", "lost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/upload/release/350x500/5.jpg"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = Coordinator::new(create_test_config(&mock_server, &dump_dir))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.report.releases_in_dump, 1);
    assert_eq!(
        std::fs::read(dump_dir.join("release/lost/poster.jpg")).unwrap(),
        b"Not Found"
    );
}

#[tokio::test]
async fn test_unparseable_sitemap_aborts_run() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dump_dir = dir.path().join("dump");

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = Coordinator::new(create_test_config(&mock_server, &dump_dir))
        .unwrap()
        .run()
        .await;

    assert!(matches!(result, Err(anidump::DumpError::Sitemap(_))));
    assert!(!dump_dir.join("sitemap.xml").exists());
    assert!(!dump_dir.join("releases.txt").exists());
    assert!(!dump_dir.join("report.json").exists());
}

#[tokio::test]
async fn test_sitemap_outage_is_retried_next_run() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dump_dir = dir.path().join("dump");

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, &dump_dir);
    let first = Coordinator::new(config.clone()).unwrap().run().await;
    assert!(matches!(first, Err(anidump::DumpError::Sitemap(_))));
    assert!(!dump_dir.join("sitemap.xml").exists());

    // The site is back
    mock_server.reset().await;
    let naruto = release(1, "naruto", "Наруто", Some("ТВ"), &["Сёнэн"]);
    mount_sitemap(&mock_server, &["naruto"], 1).await;
    mount_release(&mock_server, &naruto, 1).await;

    let second = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(second.report.releases_in_dump, 1);
    assert_eq!(
        std::fs::read_to_string(dump_dir.join("sitemap.xml")).unwrap(),
        sitemap(&["naruto"])
    );
    assert_eq!(
        std::fs::read_to_string(dump_dir.join("releases.txt")).unwrap(),
        "naruto"
    );
}

#[tokio::test]
async fn test_truncated_sitemap_is_not_cached() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dump_dir = dir.path().join("dump");

    let full = sitemap(&["a", "b", "c"]);
    let cut = full.find("release/b.html").unwrap();
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&full[..cut]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = Coordinator::new(create_test_config(&mock_server, &dump_dir))
        .unwrap()
        .run()
        .await;

    assert!(matches!(result, Err(anidump::DumpError::Sitemap(_))));
    assert!(!dump_dir.join("sitemap.xml").exists());
    assert!(!dump_dir.join("releases.txt").exists());
}

#[tokio::test]
async fn test_duplicate_identifier_is_ingested_once() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let dump_dir = dir.path().to_path_buf();

    std::fs::write(dump_dir.join("sitemap.xml"), sitemap(&[])).unwrap();
    std::fs::write(dump_dir.join("releases.txt"), "naruto
bleach
naruto
").unwrap();
    mount_sitemap(&mock_server, &[], 0).await;

    let naruto = release(1, "naruto", "Наруто", Some("ТВ"), &["Сёнэн"]);
    let bleach = release(2, "bleach", "Блич", Some("ТВ"), &["Сёнэн"]);
    mount_release(&mock_server, &naruto, 1).await;
    mount_release(&mock_server, &bleach, 1).await;

    let summary = Coordinator::new(create_test_config(&mock_server, &dump_dir))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.report.releases_in_dump, 2);
    assert_eq!(summary.already_complete, 1);
    assert_eq!(
        std::fs::read_to_string(dump_dir.join("completed.txt")).unwrap(),
        "naruto\nbleach\n"
    );

    let catalogs = CatalogIndex::new(dump_dir.join("catalogs"));
    assert_eq!(
        catalogs.read("ТВ").await.unwrap(),
        vec![
            CatalogEntry::new("Блич", "bleach"),
            CatalogEntry::new("Наруто", "naruto"),
        ]
    );
}
