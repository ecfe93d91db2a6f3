//! Integration tests for `PimClient` using wiremock HTTP mocks.

use pimsync_source::{PimClient, SourceError};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT_PATH: &str = "/pimcore-graphql-webservices/products";

fn test_client(base_url: &str) -> PimClient {
    PimClient::new(base_url, "products", "test-key", 30)
        .expect("client construction should not fail")
}

fn listing_body(nodes: &[serde_json::Value]) -> serde_json::Value {
    let edges: Vec<serde_json::Value> = nodes
        .iter()
        .map(|node| serde_json::json!({ "node": node }))
        .collect();
    serde_json::json!({ "data": { "products": { "edges": edges } } })
}

#[tokio::test]
async fn fetch_products_maps_nodes_to_records() {
    let server = MockServer::start().await;

    let body = listing_body(&[serde_json::json!({
        "id": "1001",
        "sku": "ACM X100",
        "upc": "012345678905",
        "WebPrice": 19.99,
        "MAP": "17.50",
        "Retail": null,
        "Cost": 9.5,
        "BrandName": "Acme",
        "Model": "X100",
        "VendorPartNumber": "X-100",
        "Description_Short": "Short",
        "Description_Medium": "<p>Medium</p>",
        "Specifications_WYSIWYG": null,
        "WhatsInBox": "<ul><li>Widget</li></ul>",
        "ProductType": "Widgets",
        "PartPrefix": "ACM",
        "ProductURL": "https://acme.example.com/x100",
        "Weight": 2.5,
        "ImagePrimary": { "id": 552 }
    })]);

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .and(query_param("apikey", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "variables": { "limit": 5, "filter": "{\"PartPrefix\":\"ACM\"}" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let records = client
        .try_fetch_products("ACM", 5)
        .await
        .expect("should parse listing");

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.id, "1001");
    assert_eq!(record.sku, "ACM X100");
    assert_eq!(record.vendor_part_number, "X-100");
    assert_eq!(record.specifications_html, "");
    assert_eq!(record.image_asset_id.as_deref(), Some("552"));
    assert!((record.map_price - 17.5).abs() < f64::EPSILON);
    assert!(record.retail_price.abs() < f64::EPSILON);
}

#[tokio::test]
async fn fetch_products_skips_invalid_nodes() {
    let server = MockServer::start().await;

    let body = listing_body(&[
        serde_json::json!({ "id": "1", "sku": "ACM A1", "VendorPartNumber": "A1" }),
        serde_json::json!({ "id": "2", "sku": "", "VendorPartNumber": "A2" }),
        serde_json::json!({ "id": "3", "sku": "ACM A3" }),
        serde_json::json!({ "id": "4", "sku": ["not", "a", "string"] }),
        serde_json::json!({ "id": "5", "sku": "ACM A5", "VendorPartNumber": "A5" }),
    ]);

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let records = client.fetch_products("ACM", 10).await;

    let skus: Vec<&str> = records.iter().map(|r| r.sku.as_str()).collect();
    assert_eq!(skus, vec!["ACM A1", "ACM A5"]);
}

#[tokio::test]
async fn fetch_products_honours_limit() {
    let server = MockServer::start().await;

    let nodes: Vec<serde_json::Value> = (1..=4)
        .map(|i| serde_json::json!({ "id": i, "sku": format!("ACM {i}"), "VendorPartNumber": format!("P{i}") }))
        .collect();

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(&nodes)))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let records = client.fetch_products("ACM", 2).await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].sku, "ACM 2");
}

#[tokio::test]
async fn graphql_errors_surface_from_try_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": null,
            "errors": [{ "message": "Unknown listing" }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .try_fetch_products("ACM", 5)
        .await
        .expect_err("graphql errors should fail");
    assert!(
        matches!(err, SourceError::GraphQl(ref msg) if msg.contains("Unknown listing")),
        "unexpected error: {err:?}"
    );

    assert!(client.fetch_products("ACM", 5).await.is_empty());
}

#[tokio::test]
async fn http_failure_yields_empty_listing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(client.fetch_products("ACM", 5).await.is_empty());
    assert!(matches!(
        client.try_fetch_products("ACM", 5).await,
        Err(SourceError::Http(_))
    ));
}

#[tokio::test]
async fn fetch_asset_decodes_base64_payload() {
    let server = MockServer::start().await;

    // "hello image" with a line break, as the webservice sometimes wraps it
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .and(body_partial_json(serde_json::json!({ "variables": { "id": 552 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "asset": { "data": "aGVsbG8g\naW1hZ2U=" } }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let bytes = client.fetch_asset(" 552 ").await.expect("asset bytes");
    assert_eq!(bytes, b"hello image");
}

#[tokio::test]
async fn fetch_asset_rejects_non_numeric_id_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(client.fetch_asset("abc").await.is_none());
    assert!(matches!(
        client.try_fetch_asset("abc").await,
        Err(SourceError::InvalidAssetId(_))
    ));
}

#[tokio::test]
async fn fetch_asset_without_data_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "asset": { "data": null } }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(matches!(client.try_fetch_asset("7").await, Ok(None)));
}
