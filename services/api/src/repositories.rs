//! Repositories for the marketplace backend endpoints
//!
//! Each repository wraps the shared [`ApiClient`] and knows the paths and
//! payload shapes of one area of the backend. They return the transport's
//! [`ApiResult`]; session handling happens in the views.

use auth::SessionUser;
use common::{ApiClient, ApiError, ApiResult};
use serde_json::Value;
use tracing::info;

use crate::models::{
    Booking, CancelRequest, CustomerProfileUpdate, NewRating, NewServiceRequest, Provider,
    ProviderProfileUpdate, ProviderSearch, Rating, StatusChange, list_or_empty,
};

pub mod messaging;

fn into_user(body: Value) -> ApiResult<SessionUser> {
    SessionUser::from_value(body)
        .ok_or_else(|| ApiError::Decode("Expected a user object".to_string()))
}

/// Human-readable message of an acknowledgement body, if any
fn message_of(body: Value) -> Option<String> {
    match body {
        Value::String(text) => Some(text),
        Value::Object(fields) => ["message", "error"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str).map(str::to_string)),
        _ => None,
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: Value) -> ApiResult<T> {
    serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// `/api/users` endpoints
#[derive(Debug, Clone)]
pub struct UserRepository {
    client: ApiClient,
}

impl UserRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch a user record by id
    pub async fn get(&self, token: &str, id: i64) -> ApiResult<SessionUser> {
        let body: Value = self.client.get(&format!("/api/users/{}", id), Some(token)).await?;
        into_user(body)
    }

    /// Delete the account with the given id
    pub async fn delete(&self, token: &str, id: i64) -> ApiResult<Option<String>> {
        info!("Deleting account {}", id);
        let body: Value = self
            .client
            .delete(&format!("/api/users/{}", id), Some(token))
            .await?;
        Ok(message_of(body))
    }
}

/// `/api/customers` endpoints
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    client: ApiClient,
}

impl CustomerRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The signed-in customer's service requests
    pub async fn bookings(&self, token: &str) -> ApiResult<Vec<Booking>> {
        let body: Value = self.client.get("/api/customers/requests", Some(token)).await?;
        list_or_empty(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Create a service request
    pub async fn create_request(
        &self,
        token: &str,
        request: &NewServiceRequest,
    ) -> ApiResult<Booking> {
        info!("Booking provider {} on {}", request.provider_id, request.service_date);
        self.client
            .post("/api/customers/requests", request, Some(token))
            .await
    }

    /// Cancel a service request
    pub async fn cancel(
        &self,
        token: &str,
        request: &CancelRequest,
    ) -> ApiResult<Option<String>> {
        info!("Cancelling booking {}", request.service_request_id);
        let body: Value = self
            .client
            .put("/api/customers/requests/cancel", request, Some(token))
            .await?;
        Ok(message_of(body))
    }

    /// Rate a completed service request
    pub async fn rate(&self, token: &str, rating: &NewRating) -> ApiResult<Option<String>> {
        info!("Rating booking {}", rating.service_request_id);
        let body: Value = self
            .client
            .post("/api/customers/ratings", rating, Some(token))
            .await?;
        Ok(message_of(body))
    }

    /// Update the customer profile; returns the stored record
    pub async fn update_profile(
        &self,
        token: &str,
        update: &CustomerProfileUpdate,
    ) -> ApiResult<SessionUser> {
        let body: Value = self
            .client
            .put("/api/customers/profile/update", update, Some(token))
            .await?;
        into_user(body)
    }
}

/// `/api/provider` and `/api/providers` endpoints
#[derive(Debug, Clone)]
pub struct ProviderRepository {
    client: ApiClient,
}

impl ProviderRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch a provider's own profile
    pub async fn profile(&self, token: &str, id: i64) -> ApiResult<SessionUser> {
        let body: Value = self
            .client
            .get(&format!("/api/provider/{}", id), Some(token))
            .await?;
        into_user(body)
    }

    /// Requests addressed to the signed-in provider; a non-array answer is empty
    pub async fn bookings(&self, token: &str) -> ApiResult<Vec<Booking>> {
        let body: Value = self.client.get("/api/provider/requests", Some(token)).await?;
        list_or_empty(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Move a request to a new status; returns the backend's updated request
    pub async fn update_status(&self, token: &str, change: &StatusChange) -> ApiResult<Booking> {
        info!(
            "Setting booking {} to {}",
            change.service_request_id, change.new_status
        );
        let body: Value = self
            .client
            .put("/api/provider/requests/status", change, Some(token))
            .await?;
        decode(body)
    }

    /// Update the provider profile; returns the stored record
    pub async fn update_profile(
        &self,
        token: &str,
        update: &ProviderProfileUpdate,
    ) -> ApiResult<SessionUser> {
        let body: Value = self
            .client
            .put("/api/providers/profile/update", update, Some(token))
            .await?;
        into_user(body)
    }
}

/// Public `/api/public/provider` endpoints; no token needed
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    client: ApiClient,
}

impl DirectoryRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Providers offering a category, filtered
    pub async fn search(&self, search: &ProviderSearch) -> ApiResult<Vec<Provider>> {
        let path = format!("/api/public/provider/category/{}", search.category);
        let body: Value = self
            .client
            .get_with_query(&path, &search.query(), None)
            .await?;
        list_or_empty(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// A provider's public profile
    pub async fn provider(&self, id: i64) -> ApiResult<Provider> {
        self.client
            .get(&format!("/api/public/provider/{}", id), None)
            .await
    }

    /// A provider's reviews; a provider without reviews answers 404
    pub async fn ratings(&self, id: i64) -> ApiResult<Vec<Rating>> {
        match self
            .client
            .get::<Value>(&format!("/api/public/provider/{}/ratings", id), None)
            .await
        {
            Ok(body) => list_or_empty(body).map_err(|e| ApiError::Decode(e.to_string())),
            Err(err) if err.status() == Some(404) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }
}
