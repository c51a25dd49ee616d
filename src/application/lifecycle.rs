use super::assignment::AssignmentEngine;
use super::intake::{self, BookingForm};
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{AdvisorStore, RequestStore};
use crate::domain::request::{BuddyRequest, RequestFilter};
use crate::error::{BuddyError, Result};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// What a requester gets back after a successful booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    pub request_id: Uuid,
    pub advisor_name: String,
    pub scheduling_link: String,
}

/// Creates requests and moves them through their states.
pub struct RequestLifecycle<'a> {
    advisors: &'a dyn AdvisorStore,
    requests: &'a dyn RequestStore,
}

impl<'a> RequestLifecycle<'a> {
    pub fn new(advisors: &'a dyn AdvisorStore, requests: &'a dyn RequestStore) -> Self {
        Self { advisors, requests }
    }

    /// Validates the form, assigns an advisor and persists the request.
    ///
    /// The slot claim is atomic in the store. If another booking claimed the
    /// chosen advisor's slot in between, assignment is retried without that
    /// advisor until a claim succeeds or nobody is left.
    pub async fn book(&self, form: BookingForm) -> Result<Booking> {
        let booking = intake::validate(form)?;
        let engine = AssignmentEngine::new(self.advisors, self.requests);
        let mut excluded = Vec::new();

        loop {
            let advisor = engine
                .select_excluding(booking.date, &booking.time_slot, &excluded)
                .await?;
            let request = booking.assign_to(&advisor);
            let request_id = request.id;

            if self.requests.insert_if_slot_free(request).await? {
                info!(
                    request = %request_id,
                    advisor = %advisor.id,
                    date = %booking.date,
                    time_slot = %booking.time_slot,
                    "buddy request assigned"
                );
                return Ok(Booking {
                    request_id,
                    advisor_name: advisor.name,
                    scheduling_link: advisor.scheduling_link,
                });
            }

            warn!(advisor = %advisor.id, "slot claimed concurrently, reassigning");
            excluded.push(advisor.id);
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<BuddyRequest> {
        self.requests
            .get(id)
            .await?
            .ok_or_else(|| BuddyError::not_found("request", id))
    }

    pub async fn list(&self, filter: &RequestFilter, page: PageRequest) -> Result<Page<BuddyRequest>> {
        let page = PageRequest::new(page.page, page.page_size)?;
        let matching = self.requests.find(filter).await?;
        Ok(Page::slice(matching, page))
    }

    pub async fn cancel(&self, id: Uuid) -> Result<BuddyRequest> {
        let mut request = self.get(id).await?;
        request.cancel()?;
        self.requests.store(request.clone()).await?;
        info!(request = %id, "buddy request cancelled");
        Ok(request)
    }

    pub async fn complete(&self, id: Uuid) -> Result<BuddyRequest> {
        let mut request = self.get(id).await?;
        request.complete()?;
        self.requests.store(request.clone()).await?;
        info!(request = %id, "buddy request completed");
        Ok(request)
    }
}
