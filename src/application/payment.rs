use super::lifecycle::RequestLifecycle;
use crate::domain::payment::{Amount, Payment, PaymentStatus};
use crate::domain::ports::{AdvisorStore, PaymentStore, RequestStore};
use crate::domain::request::{RequestStatus, RequestType};
use crate::error::{BuddyError, Result};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use tracing::{info, warn};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Returned once a gateway callback has been verified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Confirmation {
    pub request_id: Uuid,
    pub advisor_name: Option<String>,
    pub scheduling_link: Option<String>,
}

/// Opens payments for paid requests and settles them from gateway callbacks.
pub struct PaymentBridge<'a> {
    advisors: &'a dyn AdvisorStore,
    requests: &'a dyn RequestStore,
    payments: &'a dyn PaymentStore,
    secret: &'a str,
    currency: &'a str,
}

impl<'a> PaymentBridge<'a> {
    pub fn new(
        advisors: &'a dyn AdvisorStore,
        requests: &'a dyn RequestStore,
        payments: &'a dyn PaymentStore,
        secret: &'a str,
        currency: &'a str,
    ) -> Self {
        Self {
            advisors,
            requests,
            payments,
            secret,
            currency,
        }
    }

    /// Opens a pending payment for a paid, outstanding request. A request that
    /// already has a pending payment gets that payment back.
    pub async fn initiate(&self, request_id: Uuid, amount: Amount) -> Result<Payment> {
        let request = self
            .requests
            .get(request_id)
            .await?
            .ok_or_else(|| BuddyError::not_found("request", request_id))?;

        if request.request_type != RequestType::Paid {
            return Err(BuddyError::invalid(
                "request_id",
                "payments can only be opened for paid requests",
            ));
        }
        if !request.status.is_outstanding() {
            return Err(BuddyError::InvalidTransition {
                from: request.status.to_string(),
                to: "PAYMENT".to_string(),
            });
        }

        let existing = self.payments.find_by_request(request_id).await?;
        if let Some(pending) = existing
            .into_iter()
            .find(|p| p.status == PaymentStatus::Pending)
        {
            return Ok(pending);
        }

        let payment = Payment::open(request_id, amount, self.currency);
        self.payments.store(payment.clone()).await?;
        info!(request = %request_id, order = %payment.order_id, "payment opened");
        Ok(payment)
    }

    /// Verifies a gateway callback and settles the payment and its request.
    ///
    /// A tampered signature changes nothing. Replaying a verified callback
    /// re-checks the signature and returns the same confirmation. A pending
    /// payment whose request was closed in the meantime is left pending.
    pub async fn verify(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<Confirmation> {
        let mut payment = self
            .payments
            .get_by_order(order_id)
            .await?
            .ok_or_else(|| BuddyError::not_found("payment", order_id))?;

        if !signature_matches(self.secret, order_id, payment_id, signature) {
            warn!(order = %order_id, "payment signature mismatch");
            return Err(BuddyError::InvalidSignature);
        }

        let mut request = self
            .requests
            .get(payment.request_id)
            .await?
            .ok_or_else(|| BuddyError::not_found("request", payment.request_id))?;

        if payment.status == PaymentStatus::Pending {
            if !request.status.is_outstanding() {
                warn!(
                    order = %order_id,
                    request = %request.id,
                    status = %request.status,
                    "payment for closed request"
                );
                return Err(BuddyError::InvalidTransition {
                    from: request.status.to_string(),
                    to: RequestStatus::Completed.to_string(),
                });
            }
            request = RequestLifecycle::new(self.advisors, self.requests)
                .complete(request.id)
                .await?;
            payment.settle(payment_id, signature);
            self.payments.store(payment).await?;
            info!(order = %order_id, request = %request.id, "payment verified");
        }

        let advisor_name = match request.advisor_id {
            Some(id) => self.advisors.get(id).await?.map(|a| a.name),
            None => None,
        };

        Ok(Confirmation {
            request_id: request.id,
            advisor_name,
            scheduling_link: request.scheduling_link,
        })
    }
}

/// Lowercase hex HMAC-SHA256 of `"{order_id}|{payment_id}"`, the signature
/// the gateway attaches to its callback.
pub fn sign(secret: &str, order_id: &str, payment_id: &str) -> Option<String> {
    let mac = mac(secret, order_id, payment_id)?;
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Only the exact lowercase encoding matches, so uppercase hex is rejected
/// before the constant-time byte comparison.
fn signature_matches(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    if signature.bytes().any(|b| b.is_ascii_uppercase()) {
        return false;
    }
    let Ok(bytes) = hex::decode(signature) else {
        return false;
    };
    mac(secret, order_id, payment_id).is_some_and(|mac| mac.verify_slice(&bytes).is_ok())
}

fn mac(secret: &str, order_id: &str, payment_id: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    Some(mac)
}
