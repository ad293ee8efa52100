use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use movie_scout::{
    error::AppError,
    services::popularity::{appwrite::AppwriteSettings, AppwriteStore, PopularityStore},
};

const PROJECT: &str = "movie-project";
const DOCUMENTS: &str = "/v1/databases/movies/collections/metrics/documents";

type Documents = Arc<Mutex<Vec<Value>>>;

fn project_ok(headers: &HeaderMap) -> bool {
    headers
        .get("x-appwrite-project")
        .and_then(|v| v.to_str().ok())
        == Some(PROJECT)
}

fn forbidden() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Project not found", "code": 401 })),
    )
        .into_response()
}

/// Applies `equal`, `orderDesc` and `limit` queries in the order given
async fn list(
    State(docs): State<Documents>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> axum::response::Response {
    if !project_ok(&headers) {
        return forbidden();
    }
    let mut found = docs.lock().unwrap().clone();
    for (key, raw) in params {
        if key != "queries[]" {
            continue;
        }
        let query: Value = serde_json::from_str(&raw).unwrap();
        match query["method"].as_str() {
            Some("equal") => {
                let attribute = query["attribute"].as_str().unwrap();
                let wanted = &query["values"][0];
                found.retain(|doc| &doc[attribute] == wanted);
            }
            Some("orderDesc") => {
                let attribute = query["attribute"].as_str().unwrap().to_string();
                found.sort_by_key(|doc| std::cmp::Reverse(doc[&attribute].as_u64()));
            }
            Some("limit") => {
                let limit = query["values"][0].as_u64().unwrap() as usize;
                found.truncate(limit);
            }
            other => panic!("unexpected query method {:?}", other),
        }
    }
    Json(json!({ "total": found.len(), "documents": found })).into_response()
}

async fn create(
    State(docs): State<Documents>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if !project_ok(&headers) {
        return forbidden();
    }
    let mut doc = body["data"].clone();
    doc["$id"] = body["documentId"].clone();
    docs.lock().unwrap().push(doc.clone());
    (StatusCode::CREATED, Json(doc)).into_response()
}

async fn increment(
    State(docs): State<Documents>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if !project_ok(&headers) {
        return forbidden();
    }
    let by = body["value"].as_u64().unwrap_or(1);
    let mut docs = docs.lock().unwrap();
    match docs.iter_mut().find(|doc| doc["$id"] == id.as_str()) {
        Some(doc) => {
            doc["count"] = json!(doc["count"].as_u64().unwrap() + by);
            Json(doc.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, "document not found").into_response(),
    }
}

async fn spawn_stub() -> (String, Documents) {
    let docs: Documents = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route(DOCUMENTS, get(list).post(create))
        .route(&format!("{}/:id/count/increment", DOCUMENTS), patch(increment))
        .with_state(docs.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/v1", addr), docs)
}

fn store(endpoint: String, project_id: &str) -> AppwriteStore {
    AppwriteStore::new(AppwriteSettings {
        endpoint,
        project_id: project_id.to_string(),
        api_key: None,
        database_id: "movies".to_string(),
        collection_id: "metrics".to_string(),
    })
}

#[tokio::test]
async fn test_first_hit_creates_document() {
    let (endpoint, docs) = spawn_stub().await;
    let store = store(endpoint, PROJECT);

    let record = store
        .increment_or_insert("batman", 268, Some("https://img/batman.jpg".to_string()))
        .await
        .unwrap();

    assert_eq!(record.search_term, "batman");
    assert_eq!(record.count, 1);
    assert_eq!(record.movie_id, 268);

    let docs = docs.lock().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["searchTerm"], "batman");
    assert_eq!(docs[0]["poster_url"], "https://img/batman.jpg");
}

#[tokio::test]
async fn test_repeat_hit_increments_and_keeps_first_movie() {
    let (endpoint, docs) = spawn_stub().await;
    let store = store(endpoint, PROJECT);

    store.increment_or_insert("batman", 268, None).await.unwrap();
    let record = store.increment_or_insert("batman", 414, None).await.unwrap();

    assert_eq!(record.count, 2);
    assert_eq!(record.movie_id, 268);
    assert_eq!(docs.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_top_orders_by_count() {
    let (endpoint, _docs) = spawn_stub().await;
    let store = store(endpoint, PROJECT);

    for term in ["alien", "batman", "batman", "batman", "cars", "cars"] {
        store.increment_or_insert(term, 1, None).await.unwrap();
    }

    let top = store.top(2).await.unwrap();
    let terms: Vec<_> = top.iter().map(|r| r.search_term.as_str()).collect();
    assert_eq!(terms, vec!["batman", "cars"]);
    assert_eq!(top[0].count, 3);
    assert_eq!(store.name(), "appwrite");
}

#[tokio::test]
async fn test_rejected_request_is_document_store_error() {
    let (endpoint, _docs) = spawn_stub().await;
    let store = store(endpoint, "someone-else");

    let result = store.increment_or_insert("batman", 268, None).await;
    assert!(matches!(result, Err(AppError::DocumentStore(_))));
    assert!(matches!(store.top(5).await, Err(AppError::DocumentStore(_))));
}
