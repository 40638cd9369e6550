//! Booking actions: create, cancel, and provider status changes

use auth::{Role, SessionStore};
use chrono::{NaiveDate, NaiveTime};

use crate::error::{ViewError, ViewResult};
use crate::middleware::{guarded, require_role};
use crate::models::{
    Booking, BookingStatus, CancelRequest, NewServiceRequest, Provider, StatusChange,
};
use crate::repositories::{CustomerRepository, ProviderRepository};
use crate::state::AppState;

const MISSING_FIELDS: &str = "Please fill in all required fields (date, time, and description).";

pub struct BookingsView {
    session: SessionStore,
    customers: CustomerRepository,
    providers: ProviderRepository,
}

impl BookingsView {
    pub fn new(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
            customers: state.customer_repository.clone(),
            providers: state.provider_repository.clone(),
        }
    }

    /// Book `provider` for a date (`YYYY-MM-DD`) and time (`HH:MM`)
    pub async fn create(
        &self,
        provider: &Provider,
        date: &str,
        time: &str,
        description: &str,
    ) -> ViewResult<Booking> {
        if self.session.is_ready() && !self.session.is_authenticated() {
            return Err(ViewError::NotSignedIn(
                "You must be logged in to book a service.".to_string(),
            ));
        }
        let credentials =
            require_role(&self.session, Role::Customer, "Only customers can book services.")?;
        if !credentials.user.account_verified() {
            return Err(ViewError::Invalid(
                "Your account is not verified. Please verify your mobile number before booking."
                    .to_string(),
            ));
        }

        let description = description.trim();
        if date.trim().is_empty() || time.trim().is_empty() || description.is_empty() {
            return Err(ViewError::Invalid(MISSING_FIELDS.to_string()));
        }
        let service_date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| ViewError::Invalid("Service date must look like YYYY-MM-DD.".to_string()))?;
        let service_time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .map_err(|_| ViewError::Invalid("Service time must look like HH:MM.".to_string()))?;

        let (Some(provider_id), Some(service_type)) =
            (provider.provider_id(), provider.service_type.clone())
        else {
            return Err(ViewError::Invalid(
                "This provider cannot be booked right now.".to_string(),
            ));
        };

        let request = NewServiceRequest {
            provider_id,
            service_type,
            description: description.to_string(),
            service_date,
            service_time,
        };
        guarded(
            &self.session,
            self.customers.create_request(&credentials.token, &request),
        )
        .await
    }

    /// Cancel one of the signed-in customer's bookings
    pub async fn cancel(&self, booking_id: i64) -> ViewResult<String> {
        let credentials = require_role(
            &self.session,
            Role::Customer,
            "Only customers can cancel bookings.",
        )?;
        let message = guarded(
            &self.session,
            self.customers.cancel(
                &credentials.token,
                &CancelRequest {
                    service_request_id: booking_id,
                },
            ),
        )
        .await?;
        Ok(message.unwrap_or_else(|| "Booking cancelled successfully!".to_string()))
    }

    /// Forward a status change and replace the listed booking with the answer
    pub async fn update_status(
        &self,
        bookings: &mut Vec<Booking>,
        booking_id: i64,
        new_status: BookingStatus,
    ) -> ViewResult<Booking> {
        let credentials = require_role(
            &self.session,
            Role::Provider,
            "Only providers can update request status.",
        )?;
        let updated = guarded(
            &self.session,
            self.providers.update_status(
                &credentials.token,
                &StatusChange {
                    service_request_id: booking_id,
                    new_status,
                },
            ),
        )
        .await?;

        match bookings.iter_mut().find(|booking| booking.id == updated.id) {
            Some(slot) => *slot = updated.clone(),
            None => bookings.push(updated.clone()),
        }
        Ok(updated)
    }
}
