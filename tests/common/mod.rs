use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use time::macros::datetime;
use tokio::sync::Notify;
use travelshare::models::{Coordinates, RouteId, SaveRouteRequest, SavedRoute, UserId};
use travelshare::services::backend::RouteBackend;
use travelshare::services::directions::{
    DirectionsProvider, DirectionsRequest, DirectionsResponse, DirectionsStatus, ProviderRoute,
    RouteLeg,
};
use travelshare::services::resolver::RouteResolver;
use travelshare::{AppError, Result, RoutePlanner};

/// Road distance is roughly this much longer than the great-circle distance
const ROAD_FACTOR: f64 = 1.29;
const AVERAGE_SPEED_KMH: f64 = 85.0;

/// Directions provider that answers from geometry instead of a network call.
#[allow(dead_code)]
pub struct FakeDirections {
    status: Mutex<DirectionsStatus>,
    calls: AtomicUsize,
    requests: Mutex<Vec<DirectionsRequest>>,
    gate: Option<Gate>,
}

/// Holds each request until the test releases it.
#[allow(dead_code)]
pub struct Gate {
    pub started: Notify,
    pub release: Notify,
}

#[allow(dead_code)]
impl FakeDirections {
    pub fn new() -> Self {
        Self::with_status(DirectionsStatus::Ok)
    }

    pub fn with_status(status: DirectionsStatus) -> Self {
        FakeDirections {
            status: Mutex::new(status),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn gated() -> Self {
        FakeDirections {
            gate: Some(Gate {
                started: Notify::new(),
                release: Notify::new(),
            }),
            ..Self::new()
        }
    }

    pub fn set_status(&self, status: DirectionsStatus) {
        *self.status.lock().unwrap() = status;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<DirectionsRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Wait until a request reached the provider.
    pub async fn wait_started(&self) {
        if let Some(ref gate) = self.gate {
            gate.started.notified().await;
        }
    }

    pub fn release(&self) {
        if let Some(ref gate) = self.gate {
            gate.release.notify_one();
        }
    }
}

#[async_trait]
impl DirectionsProvider for FakeDirections {
    async fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if let Some(ref gate) = self.gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }

        let status = *self.status.lock().unwrap();
        if status != DirectionsStatus::Ok {
            return Ok(DirectionsResponse::with_status(status));
        }

        let mut path = vec![request.origin];
        path.extend(request.waypoints.iter().copied());
        path.push(request.destination);

        let legs = path
            .windows(2)
            .map(|pair| {
                let km = pair[0].distance_to(&pair[1]) * ROAD_FACTOR;
                RouteLeg {
                    distance_meters: km * 1000.0,
                    duration_seconds: km / AVERAGE_SPEED_KMH * 3600.0,
                }
            })
            .collect();

        Ok(DirectionsResponse {
            status: DirectionsStatus::Ok,
            routes: vec![ProviderRoute {
                legs,
                path,
                waypoint_order: Vec::new(),
            }],
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

#[allow(dead_code)]
pub fn planner_with(provider: Arc<FakeDirections>) -> RoutePlanner {
    RoutePlanner::new(RouteResolver::new(provider))
}

#[allow(dead_code)]
pub fn ankara() -> Coordinates {
    Coordinates::new(39.90, 32.85).unwrap()
}

#[allow(dead_code)]
pub fn istanbul() -> Coordinates {
    Coordinates::new(41.01, 28.98).unwrap()
}

#[allow(dead_code)]
pub fn bolu() -> Coordinates {
    Coordinates::new(40.73, 31.61).unwrap()
}

/// In-memory route backend that enforces ownership like the real one.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeBackend {
    routes: Mutex<HashMap<RouteId, SavedRoute>>,
    next_id: AtomicUsize,
    current_user: Mutex<UserId>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeBackend {
    pub fn new(user_id: UserId) -> Self {
        FakeBackend {
            current_user: Mutex::new(user_id),
            ..Default::default()
        }
    }

    /// Switch the signed-in user
    pub fn sign_in_as(&self, user_id: UserId) {
        *self.current_user.lock().unwrap() = user_id;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn user(&self) -> UserId {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.current_user.lock().unwrap()
    }

    fn with_owned<T>(
        &self,
        route_id: RouteId,
        f: impl FnOnce(&mut SavedRoute) -> T,
    ) -> Result<T> {
        let user = self.user();
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&route_id) {
            Some(route) if route.owner_id == user => Ok(f(route)),
            _ => Err(AppError::NotFound("Route not found".to_string())),
        }
    }
}

#[async_trait]
impl RouteBackend for FakeBackend {
    async fn create_route(&self, request: &SaveRouteRequest) -> Result<SavedRoute> {
        let user = self.user();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as RouteId + 1;
        let route = SavedRoute {
            id,
            name: request.name.clone(),
            description: request.description.clone(),
            waypoints: request.waypoints.clone(),
            distance_km: request.metrics.distance_km,
            duration_minutes: request.metrics.duration_minutes,
            start_location: request.start_location.clone(),
            end_location: request.end_location.clone(),
            owner_id: user,
            owner_name: format!("user-{}", user),
            created_at: datetime!(2024-05-01 12:00),
            is_public: request.is_public,
            share_token: None,
            shared_with_user_ids: Vec::new(),
        };
        self.routes.lock().unwrap().insert(id, route.clone());
        Ok(route)
    }

    async fn my_routes(&self) -> Result<Vec<SavedRoute>> {
        let user = self.user();
        let mut routes: Vec<SavedRoute> = self
            .routes
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.owner_id == user)
            .cloned()
            .collect();
        routes.sort_by_key(|r| r.id);
        Ok(routes)
    }

    async fn routes_shared_with_me(&self) -> Result<Vec<SavedRoute>> {
        let user = self.user();
        let mut routes: Vec<SavedRoute> = self
            .routes
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.shared_with_user_ids.contains(&user))
            .cloned()
            .collect();
        routes.sort_by_key(|r| r.id);
        Ok(routes)
    }

    async fn get_route(&self, route_id: RouteId) -> Result<SavedRoute> {
        let user = self.user();
        self.routes
            .lock()
            .unwrap()
            .get(&route_id)
            .filter(|r| r.owner_id == user || r.shared_with_user_ids.contains(&user))
            .cloned()
            .ok_or_else(|| AppError::NotFound("Route not found".to_string()))
    }

    async fn update_route(
        &self,
        route_id: RouteId,
        request: &SaveRouteRequest,
    ) -> Result<SavedRoute> {
        self.with_owned(route_id, |route| {
            route.name = request.name.clone();
            route.description = request.description.clone();
            route.waypoints = request.waypoints.clone();
            route.distance_km = request.metrics.distance_km;
            route.duration_minutes = request.metrics.duration_minutes;
            route.start_location = request.start_location.clone();
            route.end_location = request.end_location.clone();
            route.is_public = request.is_public;
            route.clone()
        })
    }

    async fn delete_route(&self, route_id: RouteId) -> Result<()> {
        self.with_owned(route_id, |_| ())?;
        self.routes.lock().unwrap().remove(&route_id);
        Ok(())
    }

    async fn share_with_friends(
        &self,
        route_id: RouteId,
        friend_ids: &[UserId],
    ) -> Result<SavedRoute> {
        self.with_owned(route_id, |route| {
            for id in friend_ids {
                if *id != route.owner_id && !route.shared_with_user_ids.contains(id) {
                    route.shared_with_user_ids.push(*id);
                }
            }
            route.clone()
        })
    }

    async fn unshare_with_friend(
        &self,
        route_id: RouteId,
        user_id: UserId,
    ) -> Result<SavedRoute> {
        self.with_owned(route_id, |route| {
            route.shared_with_user_ids.retain(|id| *id != user_id);
            route.clone()
        })
    }

    async fn generate_share_token(&self, route_id: RouteId) -> Result<SavedRoute> {
        self.with_owned(route_id, |route| {
            if route.share_token.is_none() {
                route.share_token = Some(uuid::Uuid::new_v4().to_string());
            }
            route.clone()
        })
    }

    async fn revoke_share_token(&self, route_id: RouteId) -> Result<SavedRoute> {
        self.with_owned(route_id, |route| {
            route.share_token = None;
            route.clone()
        })
    }

    async fn shared_route(&self, token: &str) -> Result<SavedRoute> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.routes
            .lock()
            .unwrap()
            .values()
            .find(|r| r.share_token.as_deref() == Some(token))
            .cloned()
            .ok_or_else(|| AppError::NotFound("Shared route not found".to_string()))
    }
}

/// Serve `app` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_mock_server(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("Mock server has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}", addr)
}

/// Check if we should skip real API tests
#[allow(dead_code)]
pub fn should_skip_real_api_tests() -> bool {
    std::env::var("SKIP_REAL_API_TESTS").is_ok()
}
