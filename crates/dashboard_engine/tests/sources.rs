use std::sync::Arc;

use dashboard_core::{ListReference, MovieRecord, ProfileLocator, NO_RATING, UNKNOWN};
use dashboard_engine::{
    ApiSource, FailureKind, FetchSettings, Fetcher, MovieSource, ProxyMode, ReqwestFetcher,
    ScrapeSource, SourceError,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> Arc<dyn Fetcher> {
    Arc::new(ReqwestFetcher::new(FetchSettings::default()).unwrap())
}

const LIST_PAGE: &str = r#"
<div class="lister-item">
  <h3 class="lister-item-header"><a href="/title/tt1375666/">Inception</a>
  <span class="lister-item-year">(2010)</span></h3>
  <span class="genre">Sci-Fi, Action</span>
</div>
"#;

#[tokio::test]
async fn direct_scrape_discovers_and_extracts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/ur1/lists/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<a href="/list/ls1/">x</a><a href="/list/ls1/?ref_=a">x</a>"#,
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/list/ls1/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LIST_PAGE, "text/html"))
        .mount(&server)
        .await;

    let source = ScrapeSource::new(fetcher(), ProxyMode::Direct);
    let profile = ProfileLocator::parse(&format!("{}/user/ur1/lists/", server.uri())).unwrap();

    let lists = source.discover_lists(&profile).await.unwrap();
    assert_eq!(
        lists,
        vec![ListReference::new(format!("{}/list/ls1/", server.uri()))]
    );

    let records = source.fetch_list(&lists[0]).await.unwrap();
    assert_eq!(
        records,
        vec![MovieRecord::new("Inception", "2010", "Sci-Fi, Action", "")]
    );
    assert_eq!(records[0].rating(), NO_RATING);
}

#[tokio::test]
async fn stray_byte_on_profile_page_still_yields_lists() {
    let server = MockServer::start().await;
    let mut page = b"<p>Am".to_vec();
    page.push(0xe9);
    page.extend_from_slice(br#"lie fan</p><a href="/list/ls1/">x</a>"#);
    Mock::given(method("GET"))
        .and(path("/user/ur1/lists/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html; charset=utf-8"))
        .mount(&server)
        .await;

    let source = ScrapeSource::new(fetcher(), ProxyMode::Direct);
    let profile = ProfileLocator::parse(&format!("{}/user/ur1/lists/", server.uri())).unwrap();

    let lists = source.discover_lists(&profile).await.unwrap();
    assert_eq!(
        lists,
        vec![ListReference::new(format!("{}/list/ls1/", server.uri()))]
    );
}

#[tokio::test]
async fn proxied_scrape_unwraps_contents() {
    let server = MockServer::start().await;
    let target = "https://www.imdb.com/list/ls7/";
    Mock::given(method("GET"))
        .and(path("/get"))
        .and(query_param("url", target))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contents": LIST_PAGE,
            "status": { "http_code": 200 }
        })))
        .mount(&server)
        .await;

    let source = ScrapeSource::new(
        fetcher(),
        ProxyMode::AllOrigins {
            endpoint: format!("{}/get", server.uri()),
        },
    );

    let records = source.fetch_list(&ListReference::new(target)).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title(), "Inception");
}

#[tokio::test]
async fn proxied_scrape_without_contents_is_a_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "contents": null })))
        .mount(&server)
        .await;

    let source = ScrapeSource::new(
        fetcher(),
        ProxyMode::AllOrigins {
            endpoint: format!("{}/get", server.uri()),
        },
    );

    let err = source
        .fetch_list(&ListReference::new("https://www.imdb.com/list/ls7/"))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Parse { .. }), "got {err:?}");
}

#[tokio::test]
async fn api_source_uses_list_ids_and_defaults_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lists/ur14323971"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            "https://www.imdb.com/list/ls100/",
            "https://www.imdb.com/list/ls100/",
            "https://www.imdb.com/list/ls200/"
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/list/ls100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "title": "Inception", "year": "2010", "genre": "Sci-Fi, Action", "rating": "8.8" },
            { "title": "Untitled", "year": "", "rating": 7.5 }
        ])))
        .mount(&server)
        .await;

    let source = ApiSource::new(fetcher(), format!("{}/", server.uri()));
    let profile = ProfileLocator::parse("ur14323971").unwrap();

    let lists = source.discover_lists(&profile).await.unwrap();
    assert_eq!(lists.len(), 2);

    let records = source.fetch_list(&lists[0]).await.unwrap();
    assert_eq!(
        records,
        vec![
            MovieRecord::new("Inception", "2010", "Sci-Fi, Action", "8.8"),
            MovieRecord::new("Untitled", UNKNOWN, UNKNOWN, "7.5"),
        ]
    );
}

#[tokio::test]
async fn api_source_reports_http_failure_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lists/ur1"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let source = ApiSource::new(fetcher(), server.uri());
    let err = source
        .discover_lists(&ProfileLocator::parse("ur1").unwrap())
        .await
        .unwrap_err();

    match err {
        SourceError::Network { source, .. } => assert_eq!(source.kind, FailureKind::HttpStatus(502)),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn api_source_rejects_malformed_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/list/ls1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{\"oops\":", "application/json"))
        .mount(&server)
        .await;

    let source = ApiSource::new(fetcher(), server.uri());
    let err = source
        .fetch_list(&ListReference::new("https://www.imdb.com/list/ls1/"))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Parse { .. }));
}
