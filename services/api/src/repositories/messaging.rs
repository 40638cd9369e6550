//! Conversation and message endpoints

use auth::Role;
use common::{ApiClient, ApiError, ApiResult};
use serde_json::Value;
use tracing::info;

use crate::models::{ChatMessage, Conversation, NewMessage, list_or_empty};

/// Path prefix of the messaging endpoints for a role
pub fn role_prefix(role: Role) -> Option<&'static str> {
    match role {
        Role::Customer => Some("/api/customers"),
        Role::Provider => Some("/api/provider"),
        Role::Admin => None,
    }
}

#[derive(Debug, Clone)]
pub struct MessagingRepository {
    client: ApiClient,
}

impl MessagingRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Provider side: open (or reuse) the conversation with a customer
    pub async fn start_with_customer(&self, token: &str, customer_id: i64) -> ApiResult<Conversation> {
        info!("Starting conversation with customer {}", customer_id);
        self.client
            .post_empty(
                &format!("/api/provider/conversations/start/{}", customer_id),
                Some(token),
            )
            .await
    }

    /// Customer side: find the conversation between two participants
    pub async fn find_between(
        &self,
        token: &str,
        participant1: i64,
        participant2: i64,
    ) -> ApiResult<Conversation> {
        self.client
            .get_with_query(
                "/api/messages/conversation",
                &[
                    ("participant1Id", participant1.to_string()),
                    ("participant2Id", participant2.to_string()),
                ],
                Some(token),
            )
            .await
    }

    /// Messages of a conversation, oldest first
    pub async fn messages(
        &self,
        token: &str,
        prefix: &str,
        conversation_id: i64,
    ) -> ApiResult<Vec<ChatMessage>> {
        let path = format!("{}/conversations/{}/messages", prefix, conversation_id);
        let body: Value = self.client.get(&path, Some(token)).await?;
        list_or_empty(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send a message; returns the stored message
    pub async fn send(&self, token: &str, prefix: &str, message: &NewMessage) -> ApiResult<ChatMessage> {
        self.client
            .post(&format!("{}/messages", prefix), message, Some(token))
            .await
    }
}
