use super::advisor::Advisor;
use super::payment::Payment;
use super::request::{BuddyRequest, RequestFilter};
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait AdvisorStore: Send + Sync {
    /// Inserts or replaces an advisor keyed by its id.
    async fn store(&self, advisor: Advisor) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Advisor>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Advisor>>;
    /// All advisors in creation order.
    async fn get_all(&self) -> Result<Vec<Advisor>>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Inserts `request` unless another outstanding request already holds the
    /// same advisor, date and time slot. The check and the write happen
    /// atomically. Returns `false` when the slot was taken.
    async fn insert_if_slot_free(&self, request: BuddyRequest) -> Result<bool>;
    async fn store(&self, request: BuddyRequest) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<BuddyRequest>>;
    /// Matching requests, newest first.
    async fn find(&self, filter: &RequestFilter) -> Result<Vec<BuddyRequest>>;
    async fn count_outstanding(&self, advisor_id: Uuid) -> Result<usize>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn store(&self, payment: Payment) -> Result<()>;
    async fn get_by_order(&self, order_id: &str) -> Result<Option<Payment>>;
    async fn find_by_request(&self, request_id: Uuid) -> Result<Vec<Payment>>;
}

pub type AdvisorStoreBox = Box<dyn AdvisorStore>;
pub type RequestStoreBox = Box<dyn RequestStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
