use std::sync::Arc;

use mockito::{Matcher, Mock, ServerGuard};
use rmcp::model::{CallToolResult, JsonObject};
use secrecy::SecretString;
use serde_json::{Value, json};
use shopify_mcp_server::graphql::AdminClient;
use shopify_mcp_server::tools::ToolRegistry;
use url::Url;

const GRAPHQL_PATH: &str = "/admin/api/2025-01/graphql.json";

async fn registry() -> (ServerGuard, ToolRegistry) {
    let server = mockito::Server::new_async().await;
    let endpoint = Url::parse(&format!("{}{GRAPHQL_PATH}", server.url())).unwrap();
    let client = AdminClient::with_endpoint(endpoint, SecretString::from("shpat_test")).unwrap();
    (server, ToolRegistry::new(Arc::new(client)))
}

fn arguments(value: Value) -> Option<JsonObject> {
    value.as_object().cloned()
}

/// The text of the result's single content block
fn text(result: &CallToolResult) -> String {
    let content = serde_json::to_value(&result.content).unwrap();
    content[0]["text"].as_str().unwrap().to_string()
}

fn data(result: &CallToolResult) -> Value {
    assert_ne!(result.is_error, Some(true), "{}", text(result));
    serde_json::from_str(&text(result)).unwrap()
}

async fn reply(server: &mut ServerGuard, operation: &str, body: Value) -> Mock {
    server
        .mock("POST", GRAPHQL_PATH)
        .match_header("x-shopify-access-token", "shpat_test")
        .match_body(Matcher::Regex(format!(r"\b{operation}\b")))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

fn product(id: u32, title: &str, inventory: i64) -> Value {
    json!({
        "node": {
            "id": format!("gid://shopify/Product/{id}"),
            "title": title,
            "description": "",
            "descriptionHtml": "",
            "handle": title.to_lowercase().replace(' ', "-"),
            "status": "ACTIVE",
            "createdAt": "2025-02-01T09:00:00Z",
            "updatedAt": "2025-02-02T09:00:00Z",
            "totalInventory": inventory,
            "priceRangeV2": {
                "minVariantPrice": { "amount": "29.99", "currencyCode": "USD" },
                "maxVariantPrice": { "amount": "34.99", "currencyCode": "USD" }
            },
            "images": { "edges": [] },
            "variants": { "edges": [] }
        }
    })
}

#[tokio::test]
async fn products_are_searched_by_title() {
    let (mut server, registry) = registry().await;
    let mock = server
        .mock("POST", GRAPHQL_PATH)
        .match_body(Matcher::PartialJson(json!({
            "variables": { "first": 2, "query": "title:*shirt*" }
        })))
        .with_status(200)
        .with_body(
            json!({ "data": { "products": { "edges": [
                product(1, "Blue Shirt", 7),
                product(2, "Red Shirt", 0)
            ] } } })
            .to_string(),
        )
        .create_async()
        .await;

    let result = registry
        .call(
            "get-products",
            arguments(json!({ "searchTitle": "shirt", "limit": 2 })),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    let products = &data(&result)["products"];
    assert_eq!(products.as_array().unwrap().len(), 2);
    assert_eq!(products[0]["title"], "Blue Shirt");
    assert_eq!(products[0]["priceRange"]["minPrice"]["amount"], "29.99");
    assert_eq!(products[1]["totalInventory"], 0);
    assert!(products[0]["imageUrl"].is_null());
}

#[tokio::test]
async fn repeated_reads_return_identical_results() {
    let (mut server, registry) = registry().await;
    let mock = server
        .mock("POST", GRAPHQL_PATH)
        .with_status(200)
        .with_body(json!({ "data": { "products": { "edges": [product(1, "Mug", 3)] } } }).to_string())
        .expect(2)
        .create_async()
        .await;

    let first = registry.call("get-products", None).await.unwrap();
    let second = registry.call("get-products", None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(data(&first), data(&second));
}

#[tokio::test]
async fn rejected_updates_are_error_results() {
    let (mut server, registry) = registry().await;
    reply(
        &mut server,
        "customerUpdate",
        json!({ "data": { "customerUpdate": {
            "customer": null,
            "userErrors": [
                { "field": ["input", "email"], "message": "Email has already been taken" }
            ]
        } } }),
    )
    .await;

    let result = registry
        .call(
            "update-customer",
            arguments(json!({ "id": "6276879810626", "email": "bob@example.com" })),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        text(&result),
        "Failed to update customer: input.email: Email has already been taken"
    );
}

#[tokio::test]
async fn invalid_input_never_reaches_the_store() {
    let (mut server, registry) = registry().await;
    let mock = server
        .mock("POST", GRAPHQL_PATH)
        .expect(0)
        .create_async()
        .await;

    let result = registry
        .call(
            "get-customer-orders",
            arguments(json!({ "customerId": "gid://shopify/Customer/1", "limit": 500 })),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.is_error, Some(true));
    let message = text(&result);
    assert!(message.starts_with("Invalid input for get-customer-orders"), "{message}");
    assert!(message.contains("customerId"), "{message}");
    assert!(message.contains("limit"), "{message}");
}

#[tokio::test]
async fn http_failures_name_the_action() {
    let (mut server, registry) = registry().await;
    server
        .mock("POST", GRAPHQL_PATH)
        .with_status(401)
        .with_body("[API] Invalid API key or access token")
        .create_async()
        .await;

    let result = registry
        .call("get-collections", arguments(json!({ "limit": 5 })))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        text(&result),
        "Failed to fetch collections: HTTP 401 Unauthorized: [API] Invalid API key or access token"
    );
}

#[tokio::test]
async fn missing_order_is_not_found() {
    let (mut server, registry) = registry().await;
    reply(&mut server, "GetOrderById", json!({ "data": { "order": null } })).await;

    let result = registry
        .call(
            "get-order-by-id",
            arguments(json!({ "orderId": "gid://shopify/Order/404" })),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        text(&result),
        "Failed to fetch order: Order with ID gid://shopify/Order/404 not found"
    );
}

#[tokio::test]
async fn search_survives_a_failing_type() {
    let (mut server, registry) = registry().await;
    reply(
        &mut server,
        "SearchArticles",
        json!({ "data": { "articles": { "nodes": [
            { "id": "gid://shopify/Article/1", "title": "Caring for linen", "handle": "linen", "summary": "Wash cold", "blog": { "title": "Journal" } }
        ] } } }),
    )
    .await;
    reply(
        &mut server,
        "SearchBlogs",
        json!({ "data": { "blogs": { "nodes": [] } } }),
    )
    .await;
    reply(
        &mut server,
        "SearchProducts",
        json!({ "data": { "products": { "nodes": [
            { "id": "gid://shopify/Product/9", "title": "Linen shirt", "handle": "linen-shirt", "description": "" }
        ] } } }),
    )
    .await;
    server
        .mock("POST", GRAPHQL_PATH)
        .match_body(Matcher::Regex(r"\bSearchPages\b".to_string()))
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let result = registry
        .call("search-shopify", arguments(json!({ "query": "linen" })))
        .await
        .unwrap();

    let results = &data(&result)["results"];
    assert_eq!(results.as_object().unwrap().len(), 4);
    assert_eq!(results["page"], json!([]));
    assert_eq!(results["blog"], json!([]));
    assert_eq!(results["article"][0]["blogTitle"], "Journal");
    assert_eq!(results["article"][0]["summary"], "Wash cold");
    assert!(results["product"][0]["summary"].is_null());
    assert!(results["product"][0].get("blogTitle").is_none());
}

#[tokio::test]
async fn update_product_runs_its_operations_in_order() {
    let (mut server, registry) = registry().await;
    let updated = json!({
        "id": "gid://shopify/Product/1",
        "title": "Linen shirt",
        "descriptionHtml": "",
        "handle": "linen-shirt",
        "status": "ACTIVE",
        "vendor": "Acme",
        "productType": "Shirts",
        "tags": [],
        "updatedAt": "2025-02-02T09:00:00Z",
        "variants": { "edges": [
            { "node": { "id": "gid://shopify/ProductVariant/11", "title": "S", "price": "39.00", "compareAtPrice": null, "barcode": null, "inventoryQuantity": 2, "sku": "LS-S" } }
        ] }
    });
    let update = reply(
        &mut server,
        "productUpdate",
        json!({ "data": { "productUpdate": { "product": updated.clone(), "userErrors": [] } } }),
    )
    .await;
    let variants = reply(
        &mut server,
        "productVariantsBulkUpdate",
        json!({ "data": { "productVariantsBulkUpdate": {
            "productVariants": [ { "id": "gid://shopify/ProductVariant/11" } ],
            "userErrors": []
        } } }),
    )
    .await;
    let refetch = reply(
        &mut server,
        "GetUpdatedProduct",
        json!({ "data": { "product": updated } }),
    )
    .await;

    let result = registry
        .call(
            "update-product",
            arguments(json!({
                "productId": "gid://shopify/Product/1",
                "variants": [ { "id": "gid://shopify/ProductVariant/11", "price": "39.00" } ]
            })),
        )
        .await
        .unwrap();

    update.assert_async().await;
    variants.assert_async().await;
    refetch.assert_async().await;
    assert_eq!(data(&result)["product"]["variants"][0]["price"], "39.00");
}
