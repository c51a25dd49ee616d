use crate::domain::advisor::Advisor;
use crate::domain::payment::Payment;
use crate::domain::ports::{AdvisorStore, PaymentStore, RequestStore};
use crate::domain::request::{BuddyRequest, RequestFilter};
use crate::error::{BuddyError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for advisor records.
pub const CF_ADVISORS: &str = "advisors";
/// Column Family for buddy requests.
pub const CF_REQUESTS: &str = "requests";
/// Column Family for payments, keyed by gateway order id.
pub const CF_PAYMENTS: &str = "payments";

impl From<rocksdb::Error> for BuddyError {
    fn from(e: rocksdb::Error) -> Self {
        BuddyError::Storage(e.to_string())
    }
}

/// A persistent store implementation using RocksDB.
///
/// Advisors, requests and payments live in separate Column Families and are
/// encoded as JSON. `Clone` shares the underlying `Arc<DB>` and the write
/// guard, so every clone serializes slot claims against the others.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    slot_guard: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at `path`, creating the column
    /// families on first use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_ADVISORS, CF_REQUESTS, CF_PAYMENTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            slot_guard: Arc::new(Mutex::new(())),
        })
    }

    fn put<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(&cf, key, bytes)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(&cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| BuddyError::Storage(format!("{} column family not found", name)))
    }
}

#[async_trait]
impl AdvisorStore for RocksDBStore {
    async fn store(&self, advisor: Advisor) -> Result<()> {
        self.put(CF_ADVISORS, advisor.id.as_bytes(), &advisor)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Advisor>> {
        self.fetch(CF_ADVISORS, id.as_bytes())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Advisor>> {
        let advisors: Vec<Advisor> = self.scan(CF_ADVISORS)?;
        Ok(advisors.into_iter().find(|a| a.email == email))
    }

    async fn get_all(&self) -> Result<Vec<Advisor>> {
        let mut advisors: Vec<Advisor> = self.scan(CF_ADVISORS)?;
        // Keys are random UUIDs, so restore creation order explicitly.
        advisors.sort_by_key(|a| a.created_at);
        Ok(advisors)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let cf = self.cf(CF_ADVISORS)?;
        let existed = self.db.get_pinned_cf(&cf, id.as_bytes())?.is_some();
        if existed {
            self.db.delete_cf(&cf, id.as_bytes())?;
        }
        Ok(existed)
    }
}

#[async_trait]
impl RequestStore for RocksDBStore {
    async fn insert_if_slot_free(&self, request: BuddyRequest) -> Result<bool> {
        let _guard = self.slot_guard.lock().await;
        if let Some(advisor_id) = request.advisor_id {
            let existing: Vec<BuddyRequest> = self.scan(CF_REQUESTS)?;
            if existing
                .iter()
                .any(|r| r.occupies(advisor_id, request.date, &request.time_slot))
            {
                return Ok(false);
            }
        }
        self.put(CF_REQUESTS, request.id.as_bytes(), &request)?;
        Ok(true)
    }

    async fn store(&self, request: BuddyRequest) -> Result<()> {
        let _guard = self.slot_guard.lock().await;
        self.put(CF_REQUESTS, request.id.as_bytes(), &request)
    }

    async fn get(&self, id: Uuid) -> Result<Option<BuddyRequest>> {
        self.fetch(CF_REQUESTS, id.as_bytes())
    }

    async fn find(&self, filter: &RequestFilter) -> Result<Vec<BuddyRequest>> {
        let mut requests: Vec<BuddyRequest> = self.scan(CF_REQUESTS)?;
        requests.retain(|r| filter.matches(r));
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn count_outstanding(&self, advisor_id: Uuid) -> Result<usize> {
        let requests: Vec<BuddyRequest> = self.scan(CF_REQUESTS)?;
        Ok(requests
            .iter()
            .filter(|r| r.status.is_outstanding() && r.advisor_id == Some(advisor_id))
            .count())
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        self.put(CF_PAYMENTS, payment.order_id.as_bytes(), &payment)
    }

    async fn get_by_order(&self, order_id: &str) -> Result<Option<Payment>> {
        self.fetch(CF_PAYMENTS, order_id.as_bytes())
    }

    async fn find_by_request(&self, request_id: Uuid) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self.scan(CF_PAYMENTS)?;
        payments.retain(|p| p.request_id == request_id);
        payments.sort_by_key(|p| p.created_at);
        Ok(payments)
    }
}
