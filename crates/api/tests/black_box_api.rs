use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use reqwest::StatusCode;
use rust_decimal::Decimal;

use catalog_api::app::services::AppServices;
use catalog_core::{BrandId, CategoryId, ItemId, StoreId, TenantId, Visibility};
use catalog_infra::{BrandEntry, CategoryEntry, InMemoryCatalog, ItemRecord};
use catalog_query::ResultAssembler;
use catalog_query::row::InventorySnapshot;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(catalog: Arc<InMemoryCatalog>) -> Self {
        // Same router as prod, but over a seeded in-memory catalog on an ephemeral port.
        let services = AppServices::in_memory(catalog, ResultAssembler::default());
        let app = catalog_api::app::build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn get(&self, path_and_query: &str) -> (StatusCode, serde_json::Value) {
        let res = reqwest::Client::new()
            .get(format!("{}{}", self.base_url, path_and_query))
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Tenant `t1` with 45 global items; every third one stocked in store `s1`.
fn seeded_catalog() -> Arc<InMemoryCatalog> {
    let tenant = || TenantId::new("t1").unwrap();
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let catalog = InMemoryCatalog::new();

    catalog.upsert_brand(BrandEntry {
        id: BrandId::new("b1").unwrap(),
        tenant_id: tenant(),
        name: "Gloria".into(),
        image_url: None,
    })
    .unwrap();
    catalog.upsert_category(CategoryEntry {
        id: CategoryId::new("c1").unwrap(),
        tenant_id: tenant(),
        name: "Dairy".into(),
        parent_id: None,
    })
    .unwrap();

    for i in 0..45u32 {
        let id = ItemId::new(format!("item-{i:02}")).unwrap();
        let created_at = base + Duration::minutes(i64::from(i));
        let mut item = ItemRecord::new(tenant(), id.clone(), format!("Milk {i:02}"), created_at);
        item.core.sku = Some(format!("SKU-{i:02}"));
        item.brand_id = Some(BrandId::new("b1").unwrap());
        if i == 3 {
            item.core.visibility = Visibility::Hidden;
            item.description = Some("Lactose free".into());
        }
        catalog.upsert_item(item).unwrap();
        catalog
            .link_category(id.clone(), CategoryId::new("c1").unwrap(), true)
            .unwrap();

        if i % 3 == 0 {
            catalog.upsert_inventory(
                tenant(),
                StoreId::new("s1").unwrap(),
                id,
                InventorySnapshot {
                    on_hand: Decimal::from(i),
                    reserved: Decimal::from(1),
                    reorder_point: None,
                    lot_code: None,
                    expires_at: None,
                },
            )
            .unwrap();
        }
    }
    Arc::new(catalog)
}

fn ids(body: &serde_json::Value) -> Vec<String> {
    body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_reports_in_memory_backend() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "catalog-api");
    assert_eq!(body["db"]["status"], "in_memory");
}

#[tokio::test]
async fn offset_listing_is_enveloped() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv
        .get("/catalog/items?tenantId=t1&limit=20&page=1&sortBy=createdAt&sortDir=desc")
        .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["items"].as_array().unwrap().len(), 20);
    assert_eq!(data["total"], 45);
    assert_eq!(data["totalPages"], 3);
    assert_eq!(data["page"], 1);
    assert_eq!(data["limit"], 20);

    let first = &data["items"][0];
    assert_eq!(first["id"], "item-44");
    assert_eq!(first["brandName"], "Gloria");
    assert_eq!(first["primaryCategoryName"], "Dairy");
    assert_eq!(first["taxRate"], 18.0);
    assert!(first["stock"].is_null());
    assert_eq!(first["createdAt"], "2024-05-01T12:44:00.000Z");
}

#[tokio::test]
async fn global_scope_never_carries_stock() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv.get("/catalog/items?tenantId=t1&storeId=global&limit=250").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 45);
    assert!(items.iter().all(|i| i["stock"].is_null()));
}

#[tokio::test]
async fn stock_sort_joins_store_inventory() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv
        .get("/catalog/items?tenantId=t1&storeId=s1&sortBy=stockOnHand&sortDir=desc&limit=250")
        .await;
    assert_eq!(status, StatusCode::OK);
    let stocks: Vec<f64> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["stock"].as_f64().unwrap())
        .collect();
    assert_eq!(stocks.len(), 15);
    assert_eq!(stocks[0], 41.0);
    assert!(stocks.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn stock_sort_without_store_is_rejected() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    for query in ["sortBy=stockOnHand", "sortBy=reorderPoint&storeId=global"] {
        let (status, body) = srv.get(&format!("/catalog/items?tenantId=t1&{query}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }
}

#[tokio::test]
async fn malformed_cursor_is_rejected() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv.get("/catalog/items?cursor=not-base64!!").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_cursor");
}

#[tokio::test]
async fn unparseable_query_string_is_a_validation_error() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv.get("/catalog/items?limit=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn feed_pages_follow_the_cursor() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, first) = srv.get("/catalog/items/feed?tenantId=t1&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["total"], 45);
    let cursor = first["data"]["nextCursor"].as_str().unwrap().to_string();

    let (status, second) = srv
        .get(&format!("/catalog/items/feed?tenantId=t1&limit=10&cursor={cursor}"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let a = ids(&first);
    let b = ids(&second);
    assert_eq!(a.last().unwrap(), "item-35");
    assert_eq!(b.first().unwrap(), "item-34");
    assert!(a.iter().all(|id| !b.contains(id)));
}

#[tokio::test]
async fn feed_rejects_page_numbers() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv.get("/catalog/items/feed?page=2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn last_feed_page_has_null_cursor() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (_, body) = srv.get("/catalog/items/feed?tenantId=t1&limit=250").await;
    assert_eq!(ids(&body).len(), 45);
    assert!(body["data"]["nextCursor"].is_null());
}

#[tokio::test]
async fn item_detail_with_store_overlay() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv.get("/catalog/items/item-03?tenantId=t1&storeId=s1").await;
    assert_eq!(status, StatusCode::OK);
    let item = &body["data"];
    assert_eq!(item["id"], "item-03");
    assert_eq!(item["visibility"], "HIDDEN");
    assert_eq!(item["description"], "Lactose free");
    assert_eq!(item["stock"], 2.0);
    assert_eq!(item["brand"]["id"], "b1");
    assert_eq!(item["categories"][0]["isPrimary"], true);
}

#[tokio::test]
async fn unknown_item_is_not_found() {
    let srv = TestServer::spawn(seeded_catalog()).await;
    let (status, body) = srv.get("/catalog/items/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = srv.get("/catalog/items/item-01?tenantId=t2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
