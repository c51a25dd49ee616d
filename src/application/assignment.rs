use crate::domain::advisor::Advisor;
use crate::domain::ports::{AdvisorStore, RequestStore};
use crate::domain::request::RequestFilter;
use crate::error::{BuddyError, Result};
use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

/// Picks the least-loaded active advisor who is free for a slot.
///
/// Load is the number of outstanding (pending or assigned) requests an
/// advisor holds across all slots. Ties keep the advisor listing order, so
/// the result is deterministic for a fixed store content.
pub struct AssignmentEngine<'a> {
    advisors: &'a dyn AdvisorStore,
    requests: &'a dyn RequestStore,
}

impl<'a> AssignmentEngine<'a> {
    pub fn new(advisors: &'a dyn AdvisorStore, requests: &'a dyn RequestStore) -> Self {
        Self { advisors, requests }
    }

    pub async fn select(&self, date: NaiveDate, time_slot: &str) -> Result<Advisor> {
        self.select_excluding(date, time_slot, &[]).await
    }

    /// Like `select`, skipping the advisors in `excluded`.
    pub async fn select_excluding(
        &self,
        date: NaiveDate,
        time_slot: &str,
        excluded: &[Uuid],
    ) -> Result<Advisor> {
        let active = self
            .advisors
            .get_all()
            .await?
            .into_iter()
            .filter(|a| a.active && !excluded.contains(&a.id));

        let mut candidates = Vec::new();
        for advisor in active {
            let filter = RequestFilter {
                advisor_id: Some(advisor.id),
                ..Default::default()
            };
            let outstanding: Vec<_> = self
                .requests
                .find(&filter)
                .await?
                .into_iter()
                .filter(|r| r.status.is_outstanding())
                .collect();

            if outstanding
                .iter()
                .any(|r| r.occupies(advisor.id, date, time_slot))
            {
                debug!(advisor = %advisor.id, %date, time_slot, "advisor busy for slot");
                continue;
            }
            candidates.push((outstanding.len(), advisor));
        }

        // Stable sort keeps listing order among equal loads.
        candidates.sort_by_key(|(load, _)| *load);
        candidates
            .into_iter()
            .next()
            .map(|(_, advisor)| advisor)
            .ok_or(BuddyError::NoAdvisorAvailable)
    }
}
