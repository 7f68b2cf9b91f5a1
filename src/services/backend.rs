use crate::error::{AppError, Result};
use crate::models::route::{ApiResponse, RouteDto, SaveRouteBody, ShareWithFriendsBody};
use crate::models::{RouteId, SaveRouteRequest, SavedRoute, UserId};
use crate::services::credentials::CredentialProvider;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// The backend route API as seen by this client. The backend owns the wire
/// format and enforces ownership; implementations map its failures onto
/// [`AppError`] (`NotFound` for missing or foreign routes).
#[async_trait]
pub trait RouteBackend: Send + Sync {
    async fn create_route(&self, request: &SaveRouteRequest) -> Result<SavedRoute>;

    async fn my_routes(&self) -> Result<Vec<SavedRoute>>;

    async fn routes_shared_with_me(&self) -> Result<Vec<SavedRoute>>;

    async fn get_route(&self, route_id: RouteId) -> Result<SavedRoute>;

    async fn update_route(&self, route_id: RouteId, request: &SaveRouteRequest)
        -> Result<SavedRoute>;

    async fn delete_route(&self, route_id: RouteId) -> Result<()>;

    async fn share_with_friends(
        &self,
        route_id: RouteId,
        friend_ids: &[UserId],
    ) -> Result<SavedRoute>;

    async fn unshare_with_friend(&self, route_id: RouteId, user_id: UserId)
        -> Result<SavedRoute>;

    /// Returns the route carrying its share token; an existing token is kept.
    async fn generate_share_token(&self, route_id: RouteId) -> Result<SavedRoute>;

    async fn revoke_share_token(&self, route_id: RouteId) -> Result<SavedRoute>;

    /// Unauthenticated lookup by share token
    async fn shared_route(&self, token: &str) -> Result<SavedRoute>;
}

/// [`RouteBackend`] over the TravelShare REST API.
#[derive(Clone)]
pub struct HttpRouteBackend {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpRouteBackend {
    pub fn new(
        base_url: String,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpRouteBackend {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/routes{}", self.base_url, path))
    }

    fn authenticated(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self
            .credentials
            .bearer_token()
            .ok_or_else(|| AppError::Unauthorized("No session credential available".to_string()))?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    /// Send the request and unwrap the backend envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<Option<T>> {
        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "Request timed out".to_string()
            } else {
                format!("Request failed: {}", e)
            };
            tracing::warn!("{} failed before a response: {}", context, message);
            AppError::transport(None, message)
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::transport(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            let message = envelope_message(&text).unwrap_or_else(|| text.clone());
            tracing::warn!(
                status = %status,
                "{} failed with HTTP {}: {}",
                context, status, message
            );
            return Err(map_status(status, message));
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            AppError::transport(
                Some(status.as_u16()),
                format!("Failed to parse response: {}", e),
            )
        })?;

        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| format!("{} failed", context));
            return Err(map_status(StatusCode::BAD_REQUEST, message));
        }

        tracing::debug!("{} succeeded", context);
        Ok(envelope.data)
    }

    async fn send_route(&self, request: RequestBuilder, context: &str) -> Result<SavedRoute> {
        let dto: RouteDto = self
            .send(request, context)
            .await?
            .ok_or_else(|| AppError::transport(None, format!("{}: empty response", context)))?;
        into_saved_route(dto)
    }

    async fn send_routes(&self, request: RequestBuilder, context: &str) -> Result<Vec<SavedRoute>> {
        let dtos: Vec<RouteDto> = self.send(request, context).await?.unwrap_or_default();
        dtos.into_iter().map(into_saved_route).collect()
    }

    fn save_body(request: &SaveRouteRequest) -> Result<SaveRouteBody> {
        SaveRouteBody::from_request(request)
            .map_err(|e| AppError::Validation(format!("Failed to encode route: {}", e)))
    }
}

#[async_trait]
impl RouteBackend for HttpRouteBackend {
    async fn create_route(&self, request: &SaveRouteRequest) -> Result<SavedRoute> {
        let body = Self::save_body(request)?;
        let builder = self.authenticated(Method::POST, "")?.json(&body);
        self.send_route(builder, "Create route").await
    }

    async fn my_routes(&self) -> Result<Vec<SavedRoute>> {
        let builder = self.authenticated(Method::GET, "/my-routes")?;
        self.send_routes(builder, "List my routes").await
    }

    async fn routes_shared_with_me(&self) -> Result<Vec<SavedRoute>> {
        let builder = self.authenticated(Method::GET, "/shared-with-me")?;
        self.send_routes(builder, "List shared routes").await
    }

    async fn get_route(&self, route_id: RouteId) -> Result<SavedRoute> {
        let builder = self.authenticated(Method::GET, &format!("/{}", route_id))?;
        self.send_route(builder, "Get route").await
    }

    async fn update_route(
        &self,
        route_id: RouteId,
        request: &SaveRouteRequest,
    ) -> Result<SavedRoute> {
        let body = Self::save_body(request)?;
        let builder = self
            .authenticated(Method::PUT, &format!("/{}", route_id))?
            .json(&body);
        self.send_route(builder, "Update route").await
    }

    async fn delete_route(&self, route_id: RouteId) -> Result<()> {
        let builder = self.authenticated(Method::DELETE, &format!("/{}", route_id))?;
        self.send::<serde_json::Value>(builder, "Delete route")
            .await
            .map(|_| ())
    }

    async fn share_with_friends(
        &self,
        route_id: RouteId,
        friend_ids: &[UserId],
    ) -> Result<SavedRoute> {
        let body = ShareWithFriendsBody {
            friend_ids: friend_ids.to_vec(),
        };
        let builder = self
            .authenticated(Method::POST, &format!("/{}/share", route_id))?
            .json(&body);
        self.send_route(builder, "Share route").await
    }

    async fn unshare_with_friend(
        &self,
        route_id: RouteId,
        user_id: UserId,
    ) -> Result<SavedRoute> {
        let builder =
            self.authenticated(Method::DELETE, &format!("/{}/share/{}", route_id, user_id))?;
        self.send_route(builder, "Unshare route").await
    }

    async fn generate_share_token(&self, route_id: RouteId) -> Result<SavedRoute> {
        let builder = self.authenticated(
            Method::POST,
            &format!("/{}/generate-share-link", route_id),
        )?;
        self.send_route(builder, "Generate share link").await
    }

    async fn revoke_share_token(&self, route_id: RouteId) -> Result<SavedRoute> {
        let builder =
            self.authenticated(Method::DELETE, &format!("/{}/share-link", route_id))?;
        self.send_route(builder, "Revoke share link").await
    }

    async fn shared_route(&self, token: &str) -> Result<SavedRoute> {
        let builder = self.request(
            Method::GET,
            &format!("/shared/{}", urlencoding::encode(token)),
        );
        self.send_route(builder, "Get shared route").await
    }
}

fn into_saved_route(dto: RouteDto) -> Result<SavedRoute> {
    SavedRoute::try_from(dto).map_err(|e| AppError::transport(None, e))
}

fn envelope_message(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

/// Map a failed backend response onto the client error taxonomy. The backend
/// answers 403 for foreign routes and 400 with a "not found" message for
/// missing ones; both are `NotFound` to the caller.
fn map_status(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        StatusCode::BAD_REQUEST if message.to_lowercase().contains("not found") => {
            AppError::NotFound(message)
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            AppError::Validation(message)
        }
        _ => AppError::transport(Some(status.as_u16()), message),
    }
}
