//! Messaging between a customer and a provider

use auth::{Role, SessionStore};

use crate::error::{ViewError, ViewResult};
use crate::middleware::{Credentials, guarded, require_session};
use crate::models::{ChatMessage, Conversation, NewMessage};
use crate::repositories::messaging::{MessagingRepository, role_prefix};
use crate::state::AppState;

const NOT_SIGNED_IN: &str = "Please log in to use chat.";

/// A message tagged with who sent it
#[derive(Debug, Clone, PartialEq)]
pub struct ChatLine {
    pub message: ChatMessage,
    pub mine: bool,
}

pub struct ChatView {
    session: SessionStore,
    messaging: MessagingRepository,
}

impl ChatView {
    pub fn new(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
            messaging: state.messaging_repository.clone(),
        }
    }

    fn chat_session(&self) -> ViewResult<(Credentials, &'static str)> {
        let credentials = require_session(&self.session, NOT_SIGNED_IN)?;
        let prefix = credentials
            .role()
            .and_then(role_prefix)
            .ok_or_else(|| ViewError::Invalid("Invalid user role for chat.".to_string()))?;
        Ok((credentials, prefix))
    }

    /// Open the conversation with the other party
    ///
    /// Providers start (or reuse) one with a customer; customers look up the
    /// one they share with a provider.
    pub async fn open(&self, counterpart_id: i64) -> ViewResult<Conversation> {
        let (credentials, _) = self.chat_session()?;
        match credentials.role() {
            Some(Role::Provider) => {
                guarded(
                    &self.session,
                    self.messaging
                        .start_with_customer(&credentials.token, counterpart_id),
                )
                .await
            }
            _ => {
                guarded(
                    &self.session,
                    self.messaging.find_between(
                        &credentials.token,
                        credentials.user_id,
                        counterpart_id,
                    ),
                )
                .await
            }
        }
    }

    pub async fn messages(&self, conversation_id: i64) -> ViewResult<Vec<ChatLine>> {
        let (credentials, prefix) = self.chat_session()?;
        let messages = guarded(
            &self.session,
            self.messaging
                .messages(&credentials.token, prefix, conversation_id),
        )
        .await?;

        Ok(messages
            .into_iter()
            .map(|message| ChatLine {
                mine: message.sender_id == credentials.user_id,
                message,
            })
            .collect())
    }

    /// Send `content`; blank input is ignored
    pub async fn send(&self, conversation_id: i64, content: &str) -> ViewResult<Option<ChatLine>> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        let (credentials, prefix) = self.chat_session()?;
        let message = guarded(
            &self.session,
            self.messaging.send(
                &credentials.token,
                prefix,
                &NewMessage {
                    conversation_id,
                    content: content.to_string(),
                },
            ),
        )
        .await?;

        Ok(Some(ChatLine {
            mine: message.sender_id == credentials.user_id,
            message,
        }))
    }
}
