use crate::domain::advisor::Advisor;
use crate::domain::payment::Payment;
use crate::domain::ports::{AdvisorStore, PaymentStore, RequestStore};
use crate::domain::request::{BuddyRequest, RequestFilter};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory advisor store.
///
/// Advisors are kept in a `Vec` so listings come back in insertion order,
/// which is the tie-break order the assignment engine relies on.
#[derive(Default, Clone)]
pub struct InMemoryAdvisorStore {
    advisors: Arc<RwLock<Vec<Advisor>>>,
}

impl InMemoryAdvisorStore {
    /// Creates a new, empty in-memory advisor store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdvisorStore for InMemoryAdvisorStore {
    async fn store(&self, advisor: Advisor) -> Result<()> {
        let mut advisors = self.advisors.write().await;
        match advisors.iter_mut().find(|a| a.id == advisor.id) {
            Some(existing) => *existing = advisor,
            None => advisors.push(advisor),
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Advisor>> {
        let advisors = self.advisors.read().await;
        Ok(advisors.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Advisor>> {
        let advisors = self.advisors.read().await;
        Ok(advisors.iter().find(|a| a.email == email).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Advisor>> {
        Ok(self.advisors.read().await.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut advisors = self.advisors.write().await;
        let before = advisors.len();
        advisors.retain(|a| a.id != id);
        Ok(advisors.len() != before)
    }
}

/// A thread-safe in-memory request store.
///
/// The slot check in `insert_if_slot_free` runs under the write lock, so two
/// concurrent bookings cannot both claim the same advisor slot.
#[derive(Default, Clone)]
pub struct InMemoryRequestStore {
    requests: Arc<RwLock<Vec<BuddyRequest>>>,
}

impl InMemoryRequestStore {
    /// Creates a new, empty in-memory request store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn insert_if_slot_free(&self, request: BuddyRequest) -> Result<bool> {
        let mut requests = self.requests.write().await;
        if let Some(advisor_id) = request.advisor_id
            && requests
                .iter()
                .any(|r| r.occupies(advisor_id, request.date, &request.time_slot))
        {
            return Ok(false);
        }
        requests.push(request);
        Ok(true)
    }

    async fn store(&self, request: BuddyRequest) -> Result<()> {
        let mut requests = self.requests.write().await;
        match requests.iter_mut().find(|r| r.id == request.id) {
            Some(existing) => *existing = request,
            None => requests.push(request),
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<BuddyRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.iter().find(|r| r.id == id).cloned())
    }

    async fn find(&self, filter: &RequestFilter) -> Result<Vec<BuddyRequest>> {
        let requests = self.requests.read().await;
        // Newest first; the Vec is in insertion order.
        Ok(requests
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn count_outstanding(&self, advisor_id: Uuid) -> Result<usize> {
        let requests = self.requests.read().await;
        Ok(requests
            .iter()
            .filter(|r| r.status.is_outstanding() && r.advisor_id == Some(advisor_id))
            .count())
    }
}

/// A thread-safe in-memory payment store keyed by gateway order id.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<String, Payment>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.order_id.clone(), payment);
        Ok(())
    }

    async fn get_by_order(&self, order_id: &str) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(order_id).cloned())
    }

    async fn find_by_request(&self, request_id: Uuid) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        let mut found: Vec<Payment> = payments
            .values()
            .filter(|p| p.request_id == request_id)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.created_at);
        Ok(found)
    }
}
