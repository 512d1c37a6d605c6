//! Payment gateway trait and the development mock.

use crate::domain::{Tour, TourId, User};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A hosted checkout session created at the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    /// Provider-side session id.
    pub id: String,
    /// URL the client is redirected to for payment.
    pub url: String,
}

/// A verified payment-completed event, extracted from a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCheckout {
    /// The paid-for tour.
    pub tour_id: TourId,
    /// Email the payer checked out with.
    pub payer_email: String,
    /// Amount charged, in cents.
    pub amount_cents: i64,
}

/// Checkout orchestration seam.
///
/// `parse_completed_event` owns signature verification; the services only
/// ever see verified, already-decoded events. `Ok(None)` means a valid
/// delivery of an event type we do not act on.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a checkout session for `user` buying `tour`.
    async fn create_checkout_session(
        &self,
        tour: &Tour,
        user: &User,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession>;

    /// Verify and decode a webhook delivery.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for undecodable or badly signed
    /// payloads.
    fn parse_completed_event(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<Option<CompletedCheckout>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MockEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    checkout: CompletedCheckout,
}

/// In-process gateway for development and tests. Sessions point at the
/// success URL directly and webhook payloads are plain JSON events of the
/// shape `{"type": "checkout.completed", "tourId": ..., "payerEmail": ...,
/// "amountCents": ...}`; the signature, when present, must equal `"mock"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockPaymentGateway;

impl MockPaymentGateway {
    /// Event type string the mock acts on.
    pub const COMPLETED: &'static str = "checkout.completed";
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(
        &self,
        tour: &Tour,
        user: &User,
        success_url: &str,
        _cancel_url: &str,
    ) -> Result<CheckoutSession> {
        let id = format!("mock_cs_{}", Uuid::new_v4().simple());
        tracing::debug!(session = %id, tour = %tour.id, user = %user.id, "mock checkout session");
        Ok(CheckoutSession {
            id,
            url: success_url.to_string(),
        })
    }

    fn parse_completed_event(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<Option<CompletedCheckout>> {
        if let Some(sig) = signature {
            if sig != "mock" {
                return Err(Error::validation("bad webhook signature"));
            }
        }
        let event: MockEvent = serde_json::from_slice(payload)
            .map_err(|e| Error::validation(format!("undecodable webhook payload: {e}")))?;
        if event.kind == Self::COMPLETED {
            Ok(Some(event.checkout))
        } else {
            Ok(None)
        }
    }
}
