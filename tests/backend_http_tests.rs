use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use travelshare::models::{Coordinates, RouteMetrics, SaveRouteRequest};
use travelshare::services::backend::{HttpRouteBackend, RouteBackend};
use travelshare::services::credentials::SessionCredential;
use travelshare::AppError;

mod common;

const TOKEN: &str = "test-jwt";

#[derive(Clone, Default)]
struct MockState {
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl MockState {
    fn record(&self, headers: &HeaderMap) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.auth_headers.lock().unwrap().push(auth);
    }
}

fn route_json(id: i64, share_token: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": "Ankara to Istanbul",
        "description": "Weekend trip",
        "routeData": "{\"waypoints\":[{\"lat\":39.9,\"lng\":32.85},{\"lat\":41.01,\"lng\":28.98}],\"distanceKm\":451.4,\"durationMinutes\":319}",
        "startLocation": "Ankara",
        "endLocation": "Istanbul",
        "distanceKm": 451.4,
        "durationMinutes": 319,
        "createdAt": "2024-05-01T12:34:56.789",
        "isPublic": false,
        "userId": 1,
        "userName": "Ayse",
        "shareToken": share_token,
        "sharedWithUserIds": []
    })
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "message": "OK", "data": data }))
}

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "success": false, "message": message, "data": null })),
    )
}

async fn create_route(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(&headers);
    state.bodies.lock().unwrap().push(body);
    ok(route_json(10, None))
}

async fn my_routes(State(state): State<MockState>, headers: HeaderMap) -> Json<Value> {
    state.record(&headers);
    ok(json!([route_json(1, None), route_json(2, Some("tok-2"))]))
}

async fn shared_with_me() -> impl IntoResponse {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" })))
}

async fn route_by_id(Path(id): Path<i64>) -> impl IntoResponse {
    match id {
        1 => ok(route_json(1, None)).into_response(),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    }
}

async fn delete_route(Path(id): Path<i64>) -> impl IntoResponse {
    match id {
        1 => ok(Value::Null).into_response(),
        2 => failure(StatusCode::FORBIDDEN, "You can only delete your own routes").into_response(),
        _ => failure(
            StatusCode::BAD_REQUEST,
            "Failed to delete route: Route not found",
        )
        .into_response(),
    }
}

async fn generate_share_link(Path(id): Path<i64>) -> Json<Value> {
    ok(route_json(id, Some("tok-1")))
}

async fn shared_route(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(token): Path<String>,
) -> impl IntoResponse {
    state.record(&headers);
    if token == "tok-1" {
        ok(route_json(1, Some("tok-1"))).into_response()
    } else {
        failure(StatusCode::NOT_FOUND, "Shared route not found").into_response()
    }
}

async fn setup() -> (HttpRouteBackend, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/api/routes", post(create_route))
        .route("/api/routes/my-routes", get(my_routes))
        .route("/api/routes/shared-with-me", get(shared_with_me))
        .route("/api/routes/shared/{token}", get(shared_route))
        .route("/api/routes/{id}", get(route_by_id).delete(delete_route))
        .route(
            "/api/routes/{id}/generate-share-link",
            post(generate_share_link),
        )
        .with_state(state.clone());

    let base_url = common::spawn_mock_server(app).await;
    let backend = HttpRouteBackend::new(
        format!("{}/api/", base_url),
        Arc::new(SessionCredential::new(Some(TOKEN.to_string()))),
        Duration::from_secs(5),
    )
    .unwrap();
    (backend, state)
}

fn save_request() -> SaveRouteRequest {
    SaveRouteRequest::new(
        "Ankara to Istanbul",
        Some("Weekend trip"),
        vec![
            Coordinates::new(39.9, 32.85).unwrap(),
            Coordinates::new(41.01, 28.98).unwrap(),
        ],
        Some(RouteMetrics {
            distance_km: 451.4,
            duration_minutes: 319,
        }),
    )
    .unwrap()
    .with_locations("Ankara", "Istanbul")
}

#[tokio::test]
async fn test_create_route_sends_bearer_and_route_data() {
    let (backend, state) = setup().await;

    let saved = backend.create_route(&save_request()).await.unwrap();
    assert_eq!(saved.id, 10);
    assert_eq!(saved.waypoints.len(), 2);
    assert!(saved.share_token.is_none());

    let auth = state.auth_headers.lock().unwrap()[0].clone();
    assert_eq!(auth.as_deref(), Some("Bearer test-jwt"));

    let body = state.bodies.lock().unwrap()[0].clone();
    assert_eq!(body["name"], "Ankara to Istanbul");
    assert_eq!(body["startLocation"], "Ankara");
    assert_eq!(body["durationMinutes"], 319);
    let route_data: Value = serde_json::from_str(body["routeData"].as_str().unwrap()).unwrap();
    assert_eq!(route_data["waypoints"][1]["lat"], 41.01);
}

#[tokio::test]
async fn test_list_my_routes() {
    let (backend, _) = setup().await;
    let routes = backend.my_routes().await.unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[1].share_token.as_deref(), Some("tok-2"));
    assert_eq!(routes[0].owner_name, "Ayse");
}

#[tokio::test]
async fn test_delete_status_mapping() {
    let (backend, _) = setup().await;

    assert!(backend.delete_route(1).await.is_ok());
    assert!(matches!(
        backend.delete_route(2).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        backend.delete_route(3).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_unauthorized_and_server_errors() {
    let (backend, _) = setup().await;

    assert!(matches!(
        backend.routes_shared_with_me().await,
        Err(AppError::Unauthorized(_))
    ));
    assert_eq!(
        backend.get_route(99).await,
        Err(AppError::transport(Some(500), "boom"))
    );
}

#[tokio::test]
async fn test_missing_credential_makes_no_request() {
    let (_, state) = setup().await;
    let backend = HttpRouteBackend::new(
        "http://127.0.0.1:9/api".to_string(),
        Arc::new(SessionCredential::new(None)),
        Duration::from_secs(1),
    )
    .unwrap();

    assert!(matches!(
        backend.my_routes().await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(state.auth_headers.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_shared_route_is_unauthenticated() {
    let (backend, state) = setup().await;

    let route = backend.generate_share_token(1).await.unwrap();
    assert_eq!(route.share_token.as_deref(), Some("tok-1"));

    let shared = backend.shared_route("tok-1").await.unwrap();
    assert_eq!(shared.shared_view().owner_name, "Ayse");
    assert_eq!(state.auth_headers.lock().unwrap().last().cloned(), Some(None));

    assert!(matches!(
        backend.shared_route("revoked").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let backend = HttpRouteBackend::new(
        "http://127.0.0.1:9/api".to_string(),
        Arc::new(SessionCredential::new(Some(TOKEN.to_string()))),
        Duration::from_secs(2),
    )
    .unwrap();

    assert!(matches!(
        backend.my_routes().await,
        Err(AppError::Transport { status: None, .. })
    ));
}
