//! Checkout orchestration, webhook handling, and booking CRUD.

use crate::booking_gate::BookingGate;
use crate::domain::{Booking, BookingId, BookingUpdate, NewBooking, Role, TourId};
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::policy::{require_role, Actor};
use crate::providers::{CheckoutSession, Notifier};
use crate::query::QueryPlan;
use std::sync::Arc;

/// Roles allowed on the admin booking endpoints.
const BOOKING_ADMINS: [Role; 2] = [Role::Admin, Role::LeadGuide];

/// Booking operations.
///
/// Whether this deployment can take payments was decided when the
/// [`Environment`] was built; checkout operations fail with `Upstream`
/// when it cannot, all other operations work either way.
#[derive(Debug, Clone)]
pub struct BookingService {
    env: Environment,
    gate: Arc<BookingGate>,
}

impl BookingService {
    /// Build the service over an environment and the shared gate.
    #[must_use]
    pub const fn new(env: Environment, gate: Arc<BookingGate>) -> Self {
        Self { env, gate }
    }

    /// Open a checkout session for the actor buying `tour_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] when no gateway is configured,
    /// [`Error::NotFound`] for a missing tour, [`Error::Conflict`] when the
    /// actor already booked it.
    pub async fn checkout_session(
        &self,
        actor: &Actor,
        tour_id: TourId,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession> {
        let gateway = self.env.payments()?;
        let tour = self.env.tours.find_by_id(tour_id).await?;
        self.gate
            .assert_not_already_booked(actor.user_id, tour_id)
            .await?;
        let user = self.env.users.find_by_id(actor.user_id).await?;
        gateway
            .create_checkout_session(&tour, &user, success_url, cancel_url)
            .await
    }

    /// Handle a webhook delivery from the payment provider.
    ///
    /// A verified payment-completed event creates the booking and spawns
    /// the confirmation email. A duplicate delivery hits the unique
    /// (tour, user) constraint and is treated as already-handled, so
    /// redeliveries are idempotent. Events for unknown payer emails are
    /// logged and acknowledged; bouncing them would only make the provider
    /// redeliver forever.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] when no gateway is configured,
    /// [`Error::Validation`] for undecodable or badly signed payloads.
    pub async fn handle_payment_event(&self, payload: &[u8], signature: Option<&str>) -> Result<()> {
        let gateway = self.env.payments()?;
        let Some(event) = gateway.parse_completed_event(payload, signature)? else {
            return Ok(());
        };

        let Some(user) = self.env.users.find_active_by_email(&event.payer_email).await? else {
            tracing::warn!(email = %event.payer_email, "payment completed for unknown payer");
            return Ok(());
        };

        let booking = Booking::new(event.tour_id, user.id, event.amount_cents);
        match self.env.bookings.create(&booking).await {
            Ok(()) => {}
            Err(Error::Conflict(_)) => {
                tracing::info!(tour = %event.tour_id, user = %user.id, "duplicate payment event, booking already exists");
                return Ok(());
            }
            Err(other) => return Err(other),
        }

        match self.env.tours.find_by_id(event.tour_id).await {
            Ok(tour) => {
                let notifier: Arc<dyn Notifier> = Arc::clone(&self.env.notifier);
                tokio::spawn(async move {
                    if let Err(error) = notifier.send_booking_confirmation(&user, &tour).await {
                        tracing::warn!(%error, "booking confirmation email failed");
                    }
                });
            }
            Err(error) => {
                tracing::warn!(%error, tour = %event.tour_id, "booked tour not found for confirmation email");
            }
        }
        Ok(())
    }

    /// The actor's own bookings, newest first.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub async fn my_bookings(&self, actor: &Actor) -> Result<Vec<Booking>> {
        self.env.bookings.list_by_user(actor.user_id).await
    }

    /// Whether the actor has booked the given tour.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub async fn has_booked(&self, actor: &Actor, tour_id: TourId) -> Result<bool> {
        Ok(self
            .env
            .bookings
            .find_by_user_and_tour(actor.user_id, tour_id)
            .await?
            .is_some())
    }

    /// Admin listing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for non-admin roles.
    pub async fn list(&self, actor: &Actor, plan: QueryPlan) -> Result<Vec<Booking>> {
        require_role(actor, &BOOKING_ADMINS)?;
        self.env.bookings.list(&plan).await
    }

    /// Admin fetch by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for non-admin roles,
    /// [`Error::NotFound`] when absent.
    pub async fn get(&self, actor: &Actor, id: BookingId) -> Result<Booking> {
        require_role(actor, &BOOKING_ADMINS)?;
        self.env.bookings.find_by_id(id).await
    }

    /// Admin direct create, bypassing payment but not uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for non-admin roles,
    /// [`Error::NotFound`] for a missing tour or user,
    /// [`Error::Conflict`] when the pair is already booked.
    pub async fn create(&self, actor: &Actor, input: NewBooking) -> Result<Booking> {
        require_role(actor, &BOOKING_ADMINS)?;
        self.env.tours.find_by_id(input.tour_id).await?;
        self.env.users.find_by_id(input.user_id).await?;
        let booking = Booking::new(input.tour_id, input.user_id, input.price);
        self.env.bookings.create(&booking).await?;
        Ok(booking)
    }

    /// Admin patch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for non-admin roles,
    /// [`Error::NotFound`] when absent.
    pub async fn update(
        &self,
        actor: &Actor,
        id: BookingId,
        patch: BookingUpdate,
    ) -> Result<Booking> {
        require_role(actor, &BOOKING_ADMINS)?;
        let mut booking = self.env.bookings.find_by_id(id).await?;
        if let Some(price) = patch.price {
            booking.price = price;
        }
        self.env.bookings.update(&booking).await?;
        Ok(booking)
    }

    /// Admin delete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for non-admin roles,
    /// [`Error::NotFound`] when absent.
    pub async fn delete(&self, actor: &Actor, id: BookingId) -> Result<()> {
        require_role(actor, &BOOKING_ADMINS)?;
        self.env.bookings.delete(id).await
    }
}
