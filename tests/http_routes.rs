use sales_dashboard::config::{AppConfig, DataSource};
use sales_dashboard::http::{route, serve, AppContext, Request};
use sales_dashboard::loader::{DatasetLoader, SampleLoader};
use sales_dashboard::{Dataset, Transaction};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn context(dataset: Dataset) -> AppContext {
    let config = AppConfig {
        source: DataSource::Sample { rows: dataset.len() },
        ..AppConfig::default()
    };
    AppContext::new(dataset, config)
}

fn sample_context() -> AppContext {
    context(SampleLoader::new(200).load().unwrap())
}

fn get(path: &str) -> Request {
    Request::parse(&format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path)).unwrap()
}

#[tokio::test]
async fn test_metric_route_returns_payload() {
    let ctx = sample_context();
    let response = route(&ctx, &get("/api/sales_mix")).await;
    assert_eq!(response.status, 200);
    let body = response.json_body().unwrap();
    assert!(body.get("error").is_none());
    assert_eq!(body["item_types"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_growth_basis_query() {
    let ctx = sample_context();

    let retail = route(&ctx, &get("/api/month_over_month_growth?basis=retail")).await;
    assert_eq!(retail.json_body().unwrap()["basis"], "retail");

    let default = route(&ctx, &get("/api/month_over_month_growth")).await;
    assert_eq!(default.json_body().unwrap()["basis"], "total");

    let bad = route(&ctx, &get("/api/month_over_month_growth?basis=weekly")).await;
    assert_eq!(bad.status, 400);

    let encoded = route(&ctx, &get("/api/month_over_month_growth?basis=retail%20")).await;
    assert_eq!(encoded.status, 200);
    assert_eq!(encoded.json_body().unwrap()["basis"], "retail");
}

#[tokio::test]
async fn test_empty_dataset_errors_stay_in_band() {
    let ctx = context(Dataset::empty());
    let response = route(&ctx, &get("/api/kpi_data")).await;
    assert_eq!(response.status, 200);
    assert_eq!(
        response.json_body().unwrap(),
        serde_json::json!({ "error": "No data available" })
    );
}

#[tokio::test]
async fn test_status_codes() {
    let ctx = sample_context();

    assert_eq!(route(&ctx, &get("/api/unknown_metric")).await.status, 404);
    assert_eq!(route(&ctx, &get("/nowhere")).await.status, 404);

    let post = Request::parse("POST /api/kpi_data HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(route(&ctx, &post).await.status, 405);

    let preflight = Request::parse("OPTIONS /api/kpi_data HTTP/1.1\r\n\r\n").unwrap();
    let response = route(&ctx, &preflight).await;
    assert_eq!(response.status, 204);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_service_routes() {
    let ctx = sample_context();

    let health = route(&ctx, &get("/api/health")).await.json_body().unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["rows"], 200);

    let info = route(&ctx, &get("/api/data-info")).await.json_body().unwrap();
    assert_eq!(info["rows"], 200);
    assert_eq!(info["item_types"], 3);
    assert_eq!(info["columns"].as_array().unwrap().len(), 9);

    let catalogue = route(&ctx, &get("/")).await.json_body().unwrap();
    assert_eq!(catalogue["metrics"].as_array().unwrap().len(), 21);

    let suppliers = route(&ctx, &get("/api/supplier_performance")).await;
    assert_eq!(suppliers.status, 200);
    assert_eq!(suppliers.json_body().unwrap()["total_suppliers"], 4);

    let test = route(&ctx, &get("/api/test/")).await.json_body().unwrap();
    assert_eq!(test["message"], "API is working");
}

#[tokio::test]
async fn test_end_to_end_over_tcp() {
    let dataset = Dataset::from_transactions(&[
        Transaction {
            year: 2024,
            month: 1,
            supplier: "ACME".to_string(),
            item_code: "100".to_string(),
            item_description: "Red Blend".to_string(),
            item_type: "WINE".to_string(),
            retail_sales: 100.0,
            retail_transfers: 0.0,
            warehouse_sales: 200.0,
        },
        Transaction {
            year: 2024,
            month: 2,
            supplier: "ACME".to_string(),
            item_code: "100".to_string(),
            item_description: "Red Blend".to_string(),
            item_type: "WINE".to_string(),
            retail_sales: 150.0,
            retail_transfers: 0.0,
            warehouse_sales: 100.0,
        },
    ])
    .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve(listener, Arc::new(context(dataset))));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /api/kpi_data HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(raw.contains("Access-Control-Allow-Origin: *"));
    let body = raw.split("\r\n\r\n").nth(1).unwrap();
    let value: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(value["retail_change_percent"], 50.0);
    assert_eq!(value["warehouse_change_percent"], -50.0);

    let mut garbage = TcpStream::connect(addr).await.unwrap();
    garbage.write_all(b"HELLO\r\n\r\n").await.unwrap();
    let mut raw = String::new();
    garbage.read_to_string(&mut raw).await.unwrap();
    assert!(raw.starts_with("HTTP/1.1 400 Bad Request"));

    // Bare LF line endings end the header block too
    let mut bare = TcpStream::connect(addr).await.unwrap();
    bare.write_all(b"GET /api/test HTTP/1.1\nHost: localhost\n\n").await.unwrap();
    let mut raw = String::new();
    bare.read_to_string(&mut raw).await.unwrap();
    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));

    server.abort();
}
