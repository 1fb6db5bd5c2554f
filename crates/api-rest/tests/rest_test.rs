use api_rest::{router, AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use pms_core::{InMemoryStore, JsonFileStore, PatientService, PatientStore, RecordStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

fn app() -> Router {
    let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new(PatientStore::new()));
    router(AppState::new(PatientService::new(store)))
}

fn patient(id: &str, height: f64, weight: f64) -> Value {
    json!({
        "id": id,
        "name": "A",
        "city": "X",
        "age": 30,
        "gender": "male",
        "height": height,
        "weight": weight
    })
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn post_json(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    read(response).await
}

async fn create(app: &Router, body: &Value) -> (StatusCode, Value) {
    post_json(app, "/create", serde_json::to_string(body).unwrap()).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_static_endpoints() {
    let app = app();

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Patient Management System API");

    let (status, body) = get(&app, "/about").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("patient records"));
}

#[tokio::test]
async fn test_create_then_fetch_patient() {
    let app = app();

    let (status, body) = create(&app, &patient("P001", 1.8, 72.0)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Patient created successfully");

    let (status, body) = get(&app, "/patient/P001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "A");
    assert_eq!(body["city"], "X");
    assert_eq!(body["age"], 30);
    assert_eq!(body["gender"], "male");
    assert_eq!(body["bmi"], 22.22);
    assert_eq!(body["verdict"], "Normal");
    assert!(body.get("id").is_none());
}

#[tokio::test]
async fn test_unknown_patient_is_not_found() {
    let (status, body) = get(&app(), "/patient/P404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "patient id not found");
}

#[tokio::test]
async fn test_duplicate_create_is_bad_request() {
    let app = app();
    create(&app, &patient("P001", 1.8, 72.0)).await;

    let (status, body) = create(&app, &patient("P001", 1.6, 50.0)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "patient already exists");

    let (_, body) = get(&app, "/patient/P001").await;
    assert_eq!(body["weight"], 72.0);
}

#[tokio::test]
async fn test_invalid_patient_lists_every_violation() {
    let app = app();
    let body = json!({
        "id": "P002",
        "name": "",
        "city": "X",
        "age": 121,
        "gender": "unknown",
        "height": 0,
        "weight": 60
    });

    let (status, body) = create(&app, &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let fields: Vec<&str> = body["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["name", "age", "gender", "height"]);

    let (status, _) = get(&app, "/patient/P002").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unparseable_body_is_unprocessable() {
    let app = app();

    let (status, _) = post_json(&app, "/create", "{not json".into()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post_json(&app, "/create", "[]".into()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_mistyped_field_is_listed_with_other_violations() {
    let app = app();
    let body = json!({
        "id": "P1",
        "name": "",
        "city": "X",
        "age": "thirty",
        "gender": "other",
        "height": -1,
        "weight": 0
    });

    let (status, body) = create(&app, &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let violations = body["violations"].as_array().unwrap();
    let fields: Vec<&str> = violations
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["name", "age", "gender", "height", "weight"]);
    assert_eq!(violations[1]["message"], "must be an integer");
}

#[tokio::test]
async fn test_padded_text_is_stored_as_given() {
    let app = app();
    let mut body = patient(" P7 ", 1.8, 72.0);
    body["name"] = json!("  Anish ");

    let (status, _) = create(&app, &body).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = get(&app, "/view").await;
    assert_eq!(body[" P7 "]["name"], "  Anish ");
    assert!(body.get("P7").is_none());
}

#[tokio::test]
async fn test_measurements_overflowing_bmi_are_rejected() {
    let app = app();

    let (status, body) = create(&app, &patient("P8", 1e-200, 72.0)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["height", "weight"]);

    let (status, _) = get(&app, "/patient/P8").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sort_by_weight_desc() {
    let app = app();
    create(&app, &patient("P001", 1.7, 50.0)).await;
    create(&app, &patient("P002", 1.7, 70.0)).await;
    create(&app, &patient("P003", 1.7, 60.0)).await;

    let (status, body) = get(&app, "/sort?sort_by=weight&order=desc").await;
    assert_eq!(status, StatusCode::OK);

    let weights: Vec<f64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["weight"].as_f64().unwrap())
        .collect();
    assert_eq!(weights, [70.0, 60.0, 50.0]);
    assert_eq!(body[0]["id"], "P002");
}

#[tokio::test]
async fn test_sort_defaults_to_ascending() {
    let app = app();
    create(&app, &patient("P001", 1.9, 70.0)).await;
    create(&app, &patient("P002", 1.6, 70.0)).await;

    let (status, body) = get(&app, "/sort?sort_by=height").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "P002");
    assert_eq!(body[1]["id"], "P001");
}

#[tokio::test]
async fn test_sort_rejects_invalid_parameters() {
    let app = app();

    let (status, body) = get(&app, "/sort?sort_by=age").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("height, weight, bmi"));

    let (status, body) = get(&app, "/sort?sort_by=bmi&order=sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("asc, desc"));

    let (status, _) = get(&app, "/sort").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_view_returns_mapping_with_metrics() {
    let app = app();
    create(&app, &patient("P001", 1.8, 72.0)).await;
    create(&app, &patient("P002", 1.6, 90.0)).await;

    let (status, body) = get(&app, "/view").await;
    assert_eq!(status, StatusCode::OK);

    let map = body.as_object().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(body["P001"]["bmi"], 22.22);
    assert_eq!(body["P002"]["verdict"], "Obese");
}

#[tokio::test]
async fn test_missing_store_file_is_internal_error() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp_dir.path().join("patients.json"));
    let app = router(AppState::new(PatientService::new(Arc::new(store))));

    let (status, body) = get(&app, "/view").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal error");

    // Parameter errors are reported before the store is read.
    let (status, _) = get(&app, "/sort?sort_by=nope").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_file_backed_create_persists() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("patients.json");
    let store = JsonFileStore::new(&path);
    store.initialise().unwrap();
    let app = router(AppState::new(PatientService::new(Arc::new(store))));

    let (status, _) = create(&app, &patient("P001", 1.8, 72.0)).await;
    assert_eq!(status, StatusCode::CREATED);

    let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["P001"]["name"], "A");
    assert!(raw["P001"].get("bmi").is_none());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (status, body) = get(&app(), "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/sort").is_some());
    assert!(body["paths"].get("/patient/{id}").is_some());
}
