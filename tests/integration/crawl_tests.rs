//! Crawl behavior observed through complete scans

use crate::support::{mount_page, offline_settings, page, page_url};
use std::collections::HashSet;
use trust_lens::config::ScanConfig;
use trust_lens::model::Category;
use trust_lens::scan::{run_scan, ScanOptions};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn visited(report: &trust_lens::FinalReport) -> HashSet<String> {
    report
        .knowledge_graph
        .iter()
        .map(|node| node.id.clone())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("Home", &["/about", "/contact"])).await;
    mount_page(&server, "/about", page("About", &["/"])).await;
    mount_page(&server, "/contact", page("Contact", &["/about"])).await;

    let scan = ScanConfig::new(server.uri()).with_limits(10, 2);
    let report = run_scan(&scan, &offline_settings(), &ScanOptions::default())
        .await
        .expect("scan failed");

    assert_eq!(report.pages_scanned, 3);
    let expected: HashSet<String> = ["", "/about", "/contact"]
        .iter()
        .map(|route| page_url(&server, route))
        .collect();
    assert_eq!(visited(&report), expected);
    assert!(report.score.total <= 100);
}

#[tokio::test]
async fn test_page_cap_bounds_visits() {
    let server = MockServer::start().await;
    let links: Vec<String> = (1..=6).map(|i| format!("/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    mount_page(&server, "/", page("Home", &link_refs)).await;
    for link in &links {
        mount_page(&server, link, page("Leaf", &["/"])).await;
    }

    let scan = ScanConfig::new(server.uri()).with_limits(2, 3);
    let report = run_scan(&scan, &offline_settings(), &ScanOptions::default())
        .await
        .expect("scan failed");

    assert_eq!(report.pages_scanned, 2);
    assert_eq!(report.knowledge_graph.len(), 2);
}

#[tokio::test]
async fn test_depth_cap_stops_discovery() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("Home", &["/one"])).await;
    mount_page(&server, "/one", page("One", &["/two"])).await;
    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page("Two", &[]), "text/html"))
        .expect(0)
        .mount(&server)
        .await;

    let scan = ScanConfig::new(server.uri()).with_limits(10, 1);
    let report = run_scan(&scan, &offline_settings(), &ScanOptions::default())
        .await
        .expect("scan failed");

    assert_eq!(report.pages_scanned, 2);
    assert!(!visited(&report).contains(&page_url(&server, "/two")));
}

#[tokio::test]
async fn test_trailing_slash_variants_are_one_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("Home", &["/", "/docs", "/docs/"])).await;
    mount_page(&server, "/docs", page("Docs", &[])).await;
    mount_page(&server, "/docs/", page("Docs", &[])).await;

    let scan = ScanConfig::new(format!("{}/", server.uri())).with_limits(10, 2);
    let report = run_scan(&scan, &offline_settings(), &ScanOptions::default())
        .await
        .expect("scan failed");

    assert_eq!(report.pages_scanned, 2);
}

#[tokio::test]
async fn test_off_origin_links_are_not_followed() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", &["https://elsewhere.invalid/page", "mailto:team@example.com"]),
    )
    .await;

    let scan = ScanConfig::new(server.uri()).with_limits(10, 2);
    let report = run_scan(&scan, &offline_settings(), &ScanOptions::default())
        .await
        .expect("scan failed");

    assert_eq!(report.pages_scanned, 1);
    let home = &report.knowledge_graph[0];
    assert!(home
        .edges
        .contains(&"https://elsewhere.invalid/page".to_string()));
}

#[tokio::test]
async fn test_two_page_graph_edges_come_from_own_links() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("Home", &["/a", "/b", "/c"])).await;
    mount_page(&server, "/a", page("A", &["/d"])).await;
    mount_page(&server, "/b", page("B", &["/e"])).await;
    mount_page(&server, "/c", page("C", &["/f"])).await;

    let scan = ScanConfig::new(server.uri()).with_limits(2, 1);
    let report = run_scan(&scan, &offline_settings(), &ScanOptions::default())
        .await
        .expect("scan failed");

    assert!(report.knowledge_graph.len() <= 2);
    let own_links = |route: &str| -> Vec<String> {
        match route {
            "" => vec!["/a", "/b", "/c"],
            "/a" => vec!["/d"],
            "/b" => vec!["/e"],
            "/c" => vec!["/f"],
            _ => vec![],
        }
        .into_iter()
        .map(|link| format!("{}{}", server.uri(), link))
        .collect()
    };
    for node in &report.knowledge_graph {
        let route = node.id.trim_start_matches(&server.uri()).to_string();
        let allowed = own_links(&route);
        for edge in &node.edges {
            assert!(allowed.contains(edge), "{} is not a link of {}", edge, node.id);
        }
    }
}

#[tokio::test]
async fn test_failing_subresource_is_reported() {
    let server = MockServer::start().await;
    let html = page("Home", &[]).replace(
        "</head>",
        r#"<script src="/missing.js"></script><img src="/hero.png" alt="Hero"></head>"#,
    );
    mount_page(&server, "/", html).await;
    Mock::given(method("GET"))
        .and(path("/missing.js"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hero.png"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let scan = ScanConfig::new(server.uri()).with_limits(1, 0);
    let report = run_scan(&scan, &offline_settings(), &ScanOptions::default())
        .await
        .expect("scan failed");

    let http_errors: Vec<_> = report
        .issues
        .iter()
        .filter(|issue| issue.description.starts_with("HTTP Error"))
        .collect();
    assert_eq!(http_errors.len(), 1);
    assert_eq!(http_errors[0].description, "HTTP Error 404 for resource");
    assert_eq!(http_errors[0].category, Category::Functional);
    assert!(http_errors[0].url.ends_with("/missing.js"));
}

#[tokio::test]
async fn test_unreachable_pages_are_skipped() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("Home", &["/gone", "/fine"])).await;
    mount_page(&server, "/fine", page("Fine", &[])).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .mount(&server)
        .await;

    let scan = ScanConfig::new(server.uri()).with_limits(10, 1);
    let report = run_scan(&scan, &offline_settings(), &ScanOptions::default())
        .await
        .expect("scan failed");

    assert!(visited(&report).contains(&page_url(&server, "/fine")));
}
