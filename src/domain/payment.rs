use crate::error::{BuddyError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A strictly positive amount charged for a paid session.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(BuddyError::invalid("amount", "must be positive"))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = BuddyError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

/// Payment attached to exactly one paid `BuddyRequest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub request_id: Uuid,
    /// Gateway order id; unique across payments.
    pub order_id: String,
    pub amount: Amount,
    pub currency: String,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn open(request_id: Uuid, amount: Amount, currency: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id,
            order_id: format!("order_{}", Uuid::new_v4().simple()),
            amount,
            currency: currency.to_string(),
            gateway_payment_id: None,
            gateway_signature: None,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Records the gateway's confirmation. Callers verify the signature first.
    pub fn settle(&mut self, payment_id: &str, signature: &str) {
        self.gateway_payment_id = Some(payment_id.to_string());
        self.gateway_signature = Some(signature.to_string());
        self.status = PaymentStatus::Completed;
    }
}
