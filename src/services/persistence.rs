use crate::error::{AppError, Result};
use crate::models::{
    Coordinates, RouteId, RouteMetrics, SaveRouteRequest, SavedRoute, ShareLink, SharedRouteView,
    UserId,
};
use crate::planner::{ResolveOutcome, RoutePlanner};
use crate::services::backend::RouteBackend;
use std::sync::Arc;

/// Save, list, load and share routes through a [`RouteBackend`].
///
/// Nothing is cached: every listing is fetched again so it reflects the
/// backend's current state.
#[derive(Clone)]
pub struct RoutePersistenceClient {
    backend: Arc<dyn RouteBackend>,
    public_base_url: String,
}

impl RoutePersistenceClient {
    pub fn new(backend: Arc<dyn RouteBackend>, public_base_url: impl Into<String>) -> Self {
        RoutePersistenceClient {
            backend,
            public_base_url: public_base_url.into(),
        }
    }

    /// Persist the current route. Validation happens before any backend call,
    /// and a fresh route never carries a share token.
    pub async fn save(
        &self,
        name: &str,
        description: Option<&str>,
        waypoints: &[Coordinates],
        metrics: Option<RouteMetrics>,
    ) -> Result<SavedRoute> {
        let request = SaveRouteRequest::new(name, description, waypoints.to_vec(), metrics)
            .map_err(AppError::Validation)?;
        self.save_request(request).await
    }

    /// Persist a prepared request, e.g. one with resolved location labels.
    pub async fn save_request(&self, request: SaveRouteRequest) -> Result<SavedRoute> {
        request.validate().map_err(AppError::Validation)?;

        let saved = self.backend.create_route(&request).await?;
        tracing::info!(
            route_id = saved.id,
            waypoints = saved.waypoints.len(),
            "Saved route {} '{}' with {} waypoints",
            saved.id,
            saved.name,
            saved.waypoints.len()
        );
        Ok(saved)
    }

    pub async fn list_mine(&self) -> Result<Vec<SavedRoute>> {
        self.backend.my_routes().await
    }

    pub async fn list_shared_with_me(&self) -> Result<Vec<SavedRoute>> {
        self.backend.routes_shared_with_me().await
    }

    pub async fn get(&self, route_id: RouteId) -> Result<SavedRoute> {
        self.backend.get_route(route_id).await
    }

    /// Change the name and description of an owned route. Waypoints, metrics
    /// and location labels are carried over from the stored route.
    pub async fn update_details(
        &self,
        route_id: RouteId,
        name: &str,
        description: Option<&str>,
    ) -> Result<SavedRoute> {
        let existing = self.backend.get_route(route_id).await?;
        let request = SaveRouteRequest::new(
            name,
            description,
            existing.waypoints.clone(),
            Some(existing.stored_metrics()),
        )
        .map_err(AppError::Validation)?
        .with_locations(existing.start_location, existing.end_location);

        let request = SaveRouteRequest {
            is_public: existing.is_public,
            ..request
        };
        request.validate().map_err(AppError::Validation)?;

        let updated = self.backend.update_route(route_id, &request).await?;
        tracing::info!(route_id = route_id, "Updated details of route {}", route_id);
        Ok(updated)
    }

    pub async fn delete(&self, route_id: RouteId) -> Result<()> {
        self.backend.delete_route(route_id).await?;
        tracing::info!(route_id = route_id, "Deleted route {}", route_id);
        Ok(())
    }

    /// Returns the route's public link, minting a token only when none exists.
    pub async fn generate_share_link(&self, route_id: RouteId) -> Result<ShareLink> {
        let route = self.backend.generate_share_token(route_id).await?;
        let token = route.share_token.ok_or_else(|| {
            AppError::transport(None, format!("No share token returned for route {}", route_id))
        })?;

        tracing::debug!(route_id = route_id, "Share link ready for route {}", route_id);
        Ok(ShareLink::new(&self.public_base_url, token))
    }

    pub async fn revoke_share_link(&self, route_id: RouteId) -> Result<()> {
        let route = self.backend.revoke_share_token(route_id).await?;
        if route.share_token.is_some() {
            tracing::warn!(
                route_id = route_id,
                "Backend still reports a share token for route {} after revoke",
                route_id
            );
        }
        tracing::info!(route_id = route_id, "Revoked share link of route {}", route_id);
        Ok(())
    }

    /// Look up a route by share token. Does not need a session.
    pub async fn resolve_shared(&self, token: &str) -> Result<SharedRouteView> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::NotFound("Shared route not found".to_string()));
        }
        Ok(self.backend.shared_route(token).await?.shared_view())
    }

    pub async fn share_with_friends(
        &self,
        route_id: RouteId,
        friend_ids: &[UserId],
    ) -> Result<SavedRoute> {
        if friend_ids.is_empty() {
            return Err(AppError::Validation(
                "Select at least one friend to share with".to_string(),
            ));
        }
        self.backend.share_with_friends(route_id, friend_ids).await
    }

    pub async fn unshare_with_friend(
        &self,
        route_id: RouteId,
        user_id: UserId,
    ) -> Result<SavedRoute> {
        self.backend.unshare_with_friend(route_id, user_id).await
    }

    /// Replace the planner's waypoints with a saved route and resolve it again.
    /// Metrics always come from the fresh resolve, never from the stored copy.
    pub async fn load_into_collector(
        &self,
        route: &SavedRoute,
        planner: &RoutePlanner,
    ) -> Result<ResolveOutcome> {
        planner.replace_all(route.waypoints.clone())?;
        tracing::debug!(
            route_id = route.id,
            waypoints = route.waypoints.len(),
            "Loaded route {} into the planner",
            route.id
        );
        planner.resolve().await
    }
}
