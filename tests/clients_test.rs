//! Single-request clients: data-links, ENA and Scopus.

use serde_json::json;
use sndg_etl::extractor::{with_session, ExtractorConfig};
use sndg_etl::{DataLinks, Ena, EtlError, HttpClient, Scopus};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http() -> HttpClient {
    HttpClient::with_timeout(Duration::from_secs(5)).unwrap()
}

// ================================================================================================
// Data-links
// ================================================================================================

#[tokio::test]
async fn test_datalinks_returns_categories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/MED/31000001/datalinks"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "6.9",
            "hitCount": 1,
            "dataLinkList": {"Category": [{
                "Name": "GEO",
                "CountLabel": "1",
                "Section": [{"Linklist": {"Link": [{
                    "Source": {"Identifier": {"IDScheme": "MED", "ID": "31000001"}},
                    "Target": {"Identifier": {"IDScheme": "GEO", "ID": "GSE1"}, "Title": "t"}
                }]}}]
            }]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = DataLinks::new(http()).with_endpoint(format!("{}/rest", server.uri()));
    let categories = api.categories("MED", "31000001").await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["Name"], json!("GEO"));

    // The categories feed straight into the extractor.
    let dir = tempfile::tempdir().unwrap();
    let rows = with_session(ExtractorConfig::new(dir.path()), |session| {
        let mut rows = 0;
        for category in &categories {
            rows += session.save_data(category)?;
        }
        Ok(rows)
    })
    .unwrap();
    assert_eq!(rows, 2);
}

#[tokio::test]
async fn test_datalinks_zero_hits_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/PMC/PMC1/datalinks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hitCount": 0})))
        .mount(&server)
        .await;

    let api = DataLinks::new(http()).with_endpoint(format!("{}/rest", server.uri()));
    assert!(api.categories("PMC", "PMC1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_datalinks_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such article"))
        .mount(&server)
        .await;

    let api = DataLinks::new(http()).with_endpoint(format!("{}/rest", server.uri()));
    match api.categories("MED", "0").await {
        Err(EtlError::Api { status, body, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such article");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

// ================================================================================================
// ENA
// ================================================================================================

#[tokio::test]
async fn test_ena_samples_from_xml() {
    let server = MockServer::start().await;
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<SAMPLE_SET>
  <SAMPLE accession="ERS1" alias="a"><TITLE>one</TITLE></SAMPLE>
  <SAMPLE accession="ERS2" alias="b"><TITLE>two</TITLE></SAMPLE>
</SAMPLE_SET>"#;
    Mock::given(method("GET"))
        .and(path("/api/xml/ERS1,ERS2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(xml))
        .expect(1)
        .mount(&server)
        .await;

    let api = Ena::new(http()).with_endpoint(format!("{}/api/xml/", server.uri()));
    let samples = api.samples(&["ERS1", "ERS2"]).await.unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[1]["@accession"], json!("ERS2"));
    assert_eq!(samples[0]["TITLE"], json!("one"));
}

#[tokio::test]
async fn test_ena_no_accessions_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let api = Ena::new(http()).with_endpoint(server.uri());
    let none: [&str; 0] = [];
    assert!(api.samples(&none).await.unwrap().is_empty());
}

// ================================================================================================
// Scopus
// ================================================================================================

#[tokio::test]
async fn test_scopus_by_pmid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/content/search/scopus"))
        .and(query_param("query", "PMID(31000001)"))
        .and(query_param("apiKey", "k3y"))
        .and(query_param("view", "COMPLETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "search-results": {"opensearch:totalResults": "1", "entry": [{"dc:identifier": "SCOPUS_ID:1"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = Scopus::new(http(), "k3y")
        .with_endpoint(format!("{}/content/search/scopus", server.uri()));
    let result = api.by_pmid("31000001").await.unwrap();
    assert_eq!(
        result["search-results"]["entry"][0]["dc:identifier"],
        json!("SCOPUS_ID:1")
    );
}

#[tokio::test]
async fn test_scopus_error_redacts_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&server)
        .await;

    let api = Scopus::new(http(), "s3cret").with_endpoint(server.uri());
    match api.by_pmid("1").await {
        Err(err @ EtlError::Api { .. }) => {
            assert!(!err.to_string().contains("s3cret"));
            if let EtlError::Api { status, .. } = err {
                assert_eq!(status, 401);
            }
        }
        other => panic!("expected API error, got {other:?}"),
    }
}
