//! Response decoding for the JSON APIs.

use crate::error::{EtlError, Result};
use crate::types::{parse_hit_count, Page};
use serde_json::Value;

fn parse_json(body: &str, api: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| EtlError::Parse(format!("Invalid {api} JSON: {e}")))
}

/// Decode a EuropePMC search page.
///
/// `resultList.result` and `nextPageUrl` are optional; `hitCount` is not.
pub fn parse_europepmc_page(body: &str) -> Result<Page> {
    let data = parse_json(body, "EuropePMC")?;
    let total = parse_hit_count(data.get("hitCount"))?;
    let records = data
        .get("resultList")
        .and_then(|list| list.get("result"))
        .and_then(Value::as_array)
        .cloned();
    let next_url = data
        .get("nextPageUrl")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    Ok(Page {
        total,
        records,
        next_url,
    })
}

/// Decode an EBI Search page.
pub fn parse_ebisearch_page(body: &str) -> Result<Page> {
    let data = parse_json(body, "EBI Search")?;
    let total = parse_hit_count(data.get("hitCount"))?;
    let records = data.get("entries").and_then(Value::as_array).cloned();

    Ok(Page {
        total,
        records,
        next_url: None,
    })
}

/// Decode a EuropePMC data-links response into its categories.
///
/// A zero hit count yields an empty list without looking further.
pub fn parse_datalinks_response(body: &str) -> Result<Vec<Value>> {
    let data = parse_json(body, "EuropePMC data-links")?;
    let total = parse_hit_count(data.get("hitCount"))?;
    if total == 0 {
        return Ok(Vec::new());
    }

    data.get("dataLinkList")
        .and_then(|list| list.get("Category"))
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| EtlError::Parse("data-links response has no dataLinkList.Category".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EUROPEPMC_PAGE: &str = r#"{
        "version": "6.9",
        "hitCount": 3,
        "nextCursorMark": "AoIIQ",
        "nextPageUrl": "https://www.ebi.ac.uk/europepmc/webservices/rest/search?cursorMark=AoIIQ&pageSize=2",
        "resultList": {
            "result": [
                {"id": "38000001", "source": "MED", "title": "First"},
                {"id": "38000002", "source": "MED", "title": "Second"}
            ]
        }
    }"#;

    #[test]
    fn test_parse_europepmc_page() {
        let page = parse_europepmc_page(EUROPEPMC_PAGE).unwrap();
        assert_eq!(page.total, 3);
        let records = page.records.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], json!("38000001"));
        assert!(page.next_url.unwrap().contains("cursorMark=AoIIQ"));
    }

    #[test]
    fn test_parse_europepmc_page_without_results() {
        let page = parse_europepmc_page(r#"{"hitCount": 5}"#).unwrap();
        assert_eq!(page.total, 5);
        assert!(page.records.is_none());
        assert!(page.next_url.is_none());
    }

    #[test]
    fn test_parse_europepmc_page_missing_hit_count() {
        let err = parse_europepmc_page(r#"{"resultList": {"result": []}}"#).unwrap_err();
        assert!(matches!(err, EtlError::Parse(_)));
    }

    #[test]
    fn test_parse_ebisearch_page() {
        let body = r#"{
            "hitCount": 1204,
            "entries": [{"id": "SAMEA1", "source": "sra-sample"}],
            "facets": []
        }"#;
        let page = parse_ebisearch_page(body).unwrap();
        assert_eq!(page.total, 1204);
        assert_eq!(page.records.unwrap().len(), 1);
        assert!(page.next_url.is_none());
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_ebisearch_page("<html>oops</html>"),
            Err(EtlError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_datalinks_empty() {
        let categories = parse_datalinks_response(r#"{"hitCount": 0}"#).unwrap();
        assert!(categories.is_empty());
    }

    #[test]
    fn test_parse_datalinks_categories() {
        let body = r#"{
            "hitCount": 2,
            "dataLinkList": {
                "Category": [
                    {"Name": "GEO", "Section": []},
                    {"Name": "Nucleotide Sequences", "Section": []}
                ]
            }
        }"#;
        let categories = parse_datalinks_response(body).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[1]["Name"], json!("Nucleotide Sequences"));
    }
}
