//! Rating a completed service request

use auth::{Role, SessionStore};

use crate::error::{ViewError, ViewResult};
use crate::middleware::{guarded, require_role};
use crate::models::NewRating;
use crate::repositories::CustomerRepository;
use crate::state::AppState;

pub struct RatingView {
    session: SessionStore,
    customers: CustomerRepository,
}

impl RatingView {
    pub fn new(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
            customers: state.customer_repository.clone(),
        }
    }

    /// Submit 1 to 5 stars with a comment
    pub async fn submit(&self, booking_id: i64, score: u8, comment: &str) -> ViewResult<String> {
        if score == 0 {
            return Err(ViewError::Invalid("Please select a star rating.".to_string()));
        }
        if score > 5 {
            return Err(ViewError::Invalid(
                "Rating must be between 1 and 5 stars.".to_string(),
            ));
        }
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ViewError::Invalid(
                "Please provide a comment for your review.".to_string(),
            ));
        }

        let credentials = require_role(
            &self.session,
            Role::Customer,
            "Only customers can rate services.",
        )?;
        let message = guarded(
            &self.session,
            self.customers.rate(
                &credentials.token,
                &NewRating {
                    service_request_id: booking_id,
                    score,
                    comment: comment.to_string(),
                },
            ),
        )
        .await?;

        Ok(message.unwrap_or_else(|| "Rating submitted successfully!".to_string()))
    }
}
