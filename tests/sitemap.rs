use cache_warmer::{
    HttpSitemapResolver, SitemapOptions, SitemapResolver, TransportOptions, Warmer, WarmerConfig,
    WarmerError,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/xml"))
        .mount(server)
        .await;
}

fn urlset(locs: &[String]) -> String {
    let urls: String = locs
        .iter()
        .map(|loc| format!("<url><loc>{}</loc></url>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        urls
    )
}

fn index(locs: &[String]) -> String {
    let sitemaps: String = locs
        .iter()
        .map(|loc| format!("<sitemap><loc>{}</loc></sitemap>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        sitemaps
    )
}

#[tokio::test]
async fn resolves_nested_indexes_without_duplicates() {
    let server = MockServer::start().await;
    let uri = server.uri();

    serve(
        &server,
        "/sitemap.xml",
        index(&["/pages.xml".to_string(), format!("{}/more.xml", uri)]),
    )
    .await;
    serve(
        &server,
        "/pages.xml",
        urlset(&[format!("{}/", uri), format!("{}/about", uri)]),
    )
    .await;
    serve(
        &server,
        "/more.xml",
        index(&[format!("{}/posts.xml", uri), format!("{}/sitemap.xml", uri)]),
    )
    .await;
    serve(
        &server,
        "/posts.xml",
        urlset(&[format!("{}/about", uri), format!("{}/posts/1", uri)]),
    )
    .await;

    let resolver = HttpSitemapResolver::new(&TransportOptions::default()).unwrap();
    let pages = resolver
        .resolve(&format!("{}/sitemap.xml", uri))
        .await
        .unwrap();

    assert_eq!(
        pages,
        vec![
            format!("{}/", uri),
            format!("{}/about", uri),
            format!("{}/posts/1", uri),
        ]
    );
}

#[tokio::test]
async fn depth_limit_stops_expansion() {
    let server = MockServer::start().await;
    let uri = server.uri();

    serve(&server, "/sitemap.xml", index(&[format!("{}/level2.xml", uri)])).await;
    serve(&server, "/level2.xml", index(&[format!("{}/level3.xml", uri)])).await;
    serve(&server, "/level3.xml", urlset(&[format!("{}/deep", uri)])).await;

    let resolver = HttpSitemapResolver::new(&TransportOptions::default())
        .unwrap()
        .with_max_depth(2);
    let pages = resolver
        .resolve(&format!("{}/sitemap.xml", uri))
        .await
        .unwrap();
    assert!(pages.is_empty());

    let resolver = resolver.with_max_depth(3);
    let pages = resolver
        .resolve(&format!("{}/sitemap.xml", uri))
        .await
        .unwrap();
    assert_eq!(pages, vec![format!("{}/deep", uri)]);
}

#[tokio::test]
async fn text_sitemap_is_supported() {
    let server = MockServer::start().await;
    let uri = server.uri();
    Mock::given(method("GET"))
        .and(path("/sitemap.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!("{0}/a\n{0}/b\n", uri)),
        )
        .mount(&server)
        .await;

    let resolver = HttpSitemapResolver::new(&TransportOptions::default()).unwrap();
    let pages = resolver
        .resolve(&format!("{}/sitemap.txt", uri))
        .await
        .unwrap();
    assert_eq!(pages, vec![format!("{}/a", uri), format!("{}/b", uri)]);
}

#[tokio::test]
async fn missing_child_sitemap_fails_the_whole_parse() {
    let server = MockServer::start().await;
    let uri = server.uri();

    serve(
        &server,
        "/sitemap.xml",
        index(&[format!("{}/pages.xml", uri), format!("{}/gone.xml", uri)]),
    )
    .await;
    serve(&server, "/pages.xml", urlset(&[format!("{}/a", uri)])).await;
    Mock::given(method("GET"))
        .and(path("/gone.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut warmer = Warmer::new(WarmerConfig::default()).unwrap();
    let err = warmer
        .parse_sitemap(&format!("{}/sitemap.xml", uri), SitemapOptions::default())
        .await
        .err()
        .unwrap();

    match err {
        WarmerError::SitemapFetch { url, message } => {
            assert_eq!(url, format!("{}/gone.xml", uri));
            assert!(message.contains("404"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(warmer.size(), 0);
}

#[tokio::test]
async fn non_sitemap_document_is_a_parse_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html><body>hi</body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let mut warmer = Warmer::new(WarmerConfig::default()).unwrap();
    let result = warmer
        .parse_sitemap(&format!("{}/sitemap.xml", uri), SitemapOptions::default())
        .await;

    assert!(matches!(result, Err(WarmerError::SitemapParse { .. })));
    assert_eq!(warmer.size(), 0);
}

#[tokio::test]
async fn parse_sitemap_applies_ignore_rules() {
    let server = MockServer::start().await;
    let uri = server.uri();
    serve(
        &server,
        "/sitemap.xml",
        urlset(&[
            format!("{}/", uri),
            format!("{}/report.pdf", uri),
            format!("{}/admin/", uri),
        ]),
    )
    .await;

    let mut warmer = Warmer::new(WarmerConfig::default()).unwrap();
    warmer.add_url(&format!("{}/admin", uri));
    warmer
        .parse_sitemap(&format!("{}/sitemap.xml", uri), SitemapOptions::default())
        .await
        .unwrap()
        .ignore_url(&format!("{}/admin", uri))
        .ignore_regex(r"/\.pdf$/")
        .unwrap();

    assert_eq!(warmer.urls(), [uri]);
}
