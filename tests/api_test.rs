use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use seace_scraper::api::{create_router, AppState};
use seace_scraper::domain::model::{CubsoLookup, Tender, TenderKind, TenderQuery};
use seace_scraper::domain::ports::TenderSource;
use seace_scraper::utils::error::{Result, ScrapeError};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Records every query and replies with a canned outcome.
struct StubSource {
    queries: Mutex<Vec<TenderQuery>>,
    fail: bool,
}

impl StubSource {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            queries: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            queries: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    fn queries(&self) -> Vec<TenderQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl TenderSource for StubSource {
    async fn scrape(&self, query: &TenderQuery) -> Result<Vec<Tender>> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail {
            return Err(ScrapeError::timeout(
                "div.bg-fondo-section",
                std::time::Duration::from_secs(60),
            ));
        }
        Ok(vec![Tender {
            code: "AS-SM-12-2025-GRC-1".to_string(),
            entity: "GOBIERNO REGIONAL DE CUSCO".to_string(),
            description: "Servicio: mantenimiento de vías".to_string(),
            kind: TenderKind::Servicio,
            published: "29/10/2025 08:30:00".to_string(),
            link: None,
            cubso: CubsoLookup::NotRequested,
        }])
    }
}

fn router(source: Arc<StubSource>) -> Router {
    create_router(AppState::new(source))
}

async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_root_reports_status() {
    let (status, body) = send(router(StubSource::ok()), Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "ok", "msg": "API SEACE activa. Usa POST /scrape"})
    );
}

#[tokio::test]
async fn test_scrape_returns_count_and_results() {
    let source = StubSource::ok();
    let (status, body) = send(
        router(source.clone()),
        Method::POST,
        "/scrape",
        Some(json!({
            "fecha_inicio": "27/10/2025",
            "fecha_fin": "02/11/2025",
            "max_resultados": 50,
            "incluir_cubso": true
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cantidad"], 1);
    assert_eq!(body["resultados"][0]["codigo"], "AS-SM-12-2025-GRC-1");
    assert_eq!(body["resultados"][0]["tipo"], "Servicio");
    assert_eq!(body["resultados"][0]["enlace"], "No disponible");
    assert!(body["resultados"][0]["cubso"].is_null());

    let queries = source.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].max_results, 50);
    assert!(queries[0].include_cubso);
    assert_eq!(queries[0].range.to_string(), "27/10/2025 - 02/11/2025");
}

#[tokio::test]
async fn test_scrape_applies_defaults() {
    let source = StubSource::ok();
    let (status, _) = send(
        router(source.clone()),
        Method::POST,
        "/scrape",
        Some(json!({"fecha_inicio": "01/10/2025", "fecha_fin": "31/10/2025"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let queries = source.queries();
    assert_eq!(queries[0].max_results, 2000);
    assert!(!queries[0].include_cubso);
}

#[tokio::test]
async fn test_malformed_date_is_bad_request() {
    let source = StubSource::ok();
    let (status, body) = send(
        router(source.clone()),
        Method::POST,
        "/scrape",
        Some(json!({"fecha_inicio": "2025-10-27", "fecha_fin": "02/11/2025"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Las fechas deben tener formato dd/mm/yyyy");
    assert!(source.queries().is_empty());
}

#[tokio::test]
async fn test_impossible_date_is_bad_request() {
    let (status, _) = send(
        router(StubSource::ok()),
        Method::POST,
        "/scrape",
        Some(json!({"fecha_inicio": "31/02/2025", "fecha_fin": "02/11/2025"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_padded_or_signed_dates_are_bad_requests() {
    for (start, end) in [(" 2/10/2025", "31/10/2025"), ("02/10/2025", "02/10/+025")] {
        let source = StubSource::ok();
        let (status, body) = send(
            router(source.clone()),
            Method::POST,
            "/scrape",
            Some(json!({"fecha_inicio": start, "fecha_fin": end})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{} - {}", start, end);
        assert_eq!(body["detail"], "Las fechas deben tener formato dd/mm/yyyy");
        assert!(source.queries().is_empty());
    }
}

#[tokio::test]
async fn test_missing_field_is_rejected() {
    let source = StubSource::ok();
    let (status, body) = send(
        router(source.clone()),
        Method::POST,
        "/scrape",
        Some(json!({"fecha_inicio": "27/10/2025"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("fecha_fin"));
    assert!(source.queries().is_empty());
}

#[tokio::test]
async fn test_negative_max_results_is_json_rejection() {
    let (status, body) = send(
        router(StubSource::ok()),
        Method::POST,
        "/scrape",
        Some(json!({
            "fecha_inicio": "27/10/2025",
            "fecha_fin": "02/11/2025",
            "max_resultados": -5
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_body_without_json_content_type_is_json_rejection() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/scrape")
        .body(Body::from(r#"{"fecha_inicio":"27/10/2025","fecha_fin":"02/11/2025"}"#))
        .unwrap();

    let response = router(StubSource::ok()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(
        response.headers()["content-type"],
        "application/json"
    );
}

#[tokio::test]
async fn test_scrape_failure_hides_internal_details() {
    let (status, body) = send(
        router(StubSource::failing()),
        Method::POST,
        "/scrape",
        Some(json!({"fecha_inicio": "27/10/2025", "fecha_fin": "02/11/2025"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "Error al procesar la solicitud"}));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, _) = send(router(StubSource::ok()), Method::GET, "/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
