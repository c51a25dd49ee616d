use crate::domain::advisor::{Advisor, AdvisorUpdate, NewAdvisor};
use crate::domain::ports::{AdvisorStore, RequestStore};
use crate::domain::request::{BuddyRequest, RequestFilter};
use crate::error::{BuddyError, Result};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// An advisor together with every request ever bound to it.
#[derive(Debug, Clone, Serialize)]
pub struct AdvisorDetail {
    #[serde(flatten)]
    pub advisor: Advisor,
    pub requests: Vec<BuddyRequest>,
}

/// Admin-facing advisor management.
pub struct AdvisorRegistry<'a> {
    advisors: &'a dyn AdvisorStore,
    requests: &'a dyn RequestStore,
}

impl<'a> AdvisorRegistry<'a> {
    pub fn new(advisors: &'a dyn AdvisorStore, requests: &'a dyn RequestStore) -> Self {
        Self { advisors, requests }
    }

    pub async fn list(&self, active: Option<bool>) -> Result<Vec<Advisor>> {
        let all = self.advisors.get_all().await?;
        Ok(all
            .into_iter()
            .filter(|a| active.is_none_or(|flag| a.active == flag))
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Advisor> {
        self.advisors
            .get(id)
            .await?
            .ok_or_else(|| BuddyError::not_found("advisor", id))
    }

    pub async fn get_with_requests(&self, id: Uuid) -> Result<AdvisorDetail> {
        let advisor = self.get(id).await?;
        let requests = self
            .requests
            .find(&RequestFilter {
                advisor_id: Some(id),
                ..Default::default()
            })
            .await?;
        Ok(AdvisorDetail { advisor, requests })
    }

    pub async fn create(&self, input: NewAdvisor) -> Result<Advisor> {
        let advisor = Advisor::new(input)?;
        if self.advisors.find_by_email(&advisor.email).await?.is_some() {
            return Err(BuddyError::DuplicateEmail(advisor.email));
        }
        self.advisors.store(advisor.clone()).await?;
        info!(advisor = %advisor.id, email = %advisor.email, "advisor created");
        Ok(advisor)
    }

    pub async fn update(&self, id: Uuid, update: AdvisorUpdate) -> Result<Advisor> {
        let mut advisor = self.get(id).await?;
        advisor.apply(update)?;

        if let Some(other) = self.advisors.find_by_email(&advisor.email).await?
            && other.id != id
        {
            return Err(BuddyError::DuplicateEmail(advisor.email));
        }

        self.advisors.store(advisor.clone()).await?;
        info!(advisor = %id, active = advisor.active, "advisor updated");
        Ok(advisor)
    }

    /// Removes an advisor that holds no outstanding requests. Advisors with
    /// open work should be deactivated through `update` instead.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.get(id).await?;
        let count = self.requests.count_outstanding(id).await?;
        if count > 0 {
            return Err(BuddyError::AdvisorHasActiveRequests { count });
        }
        if !self.advisors.delete(id).await? {
            return Err(BuddyError::not_found("advisor", id));
        }
        info!(advisor = %id, "advisor deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::{CommunicationMode, RequestStatus, RequestType};
    use crate::infrastructure::in_memory::{InMemoryAdvisorStore, InMemoryRequestStore};
    use chrono::{NaiveDate, Utc};

    fn input(email: &str) -> NewAdvisor {
        NewAdvisor {
            name: "Lena".to_string(),
            email: email.to_string(),
            phone: None,
            scheduling_link: "https://cal.example.com/lena".to_string(),
            active: true,
        }
    }

    fn request_for(advisor_id: Uuid, status: RequestStatus) -> BuddyRequest {
        BuddyRequest {
            id: Uuid::new_v4(),
            request_type: RequestType::Free,
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            phone: None,
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            time_slot: "14:00".to_string(),
            communication_mode: CommunicationMode::Chat,
            message: "Questions about grad school".to_string(),
            extra_info: None,
            status,
            advisor_id: Some(advisor_id),
            scheduling_link: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let advisors = InMemoryAdvisorStore::new();
        let requests = InMemoryRequestStore::new();
        let registry = AdvisorRegistry::new(&advisors, &requests);

        registry.create(input("lena@example.com")).await.unwrap();
        let dup = registry.create(input("LENA@example.com ")).await;

        assert!(matches!(dup, Err(BuddyError::DuplicateEmail(_))));
        assert_eq!(registry.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_email_collision() {
        let advisors = InMemoryAdvisorStore::new();
        let requests = InMemoryRequestStore::new();
        let registry = AdvisorRegistry::new(&advisors, &requests);

        let first = registry.create(input("one@example.com")).await.unwrap();
        registry.create(input("two@example.com")).await.unwrap();

        let clash = registry
            .update(
                first.id,
                AdvisorUpdate {
                    email: Some("two@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(clash, Err(BuddyError::DuplicateEmail(_))));

        // Re-submitting its own email is fine.
        let same = registry
            .update(
                first.id,
                AdvisorUpdate {
                    email: Some("one@example.com".to_string()),
                    name: Some("Lena R".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(same.name, "Lena R");
        assert_eq!(registry.get(first.id).await.unwrap().email, "one@example.com");
    }

    #[tokio::test]
    async fn test_list_active_filter() {
        let advisors = InMemoryAdvisorStore::new();
        let requests = InMemoryRequestStore::new();
        let registry = AdvisorRegistry::new(&advisors, &requests);

        registry.create(input("on@example.com")).await.unwrap();
        let mut off = input("off@example.com");
        off.active = false;
        registry.create(off).await.unwrap();

        assert_eq!(registry.list(None).await.unwrap().len(), 2);
        assert_eq!(registry.list(Some(true)).await.unwrap().len(), 1);
        assert_eq!(registry.list(Some(false)).await.unwrap()[0].email, "off@example.com");
    }

    #[tokio::test]
    async fn test_delete_blocked_by_outstanding_requests() {
        let advisors = InMemoryAdvisorStore::new();
        let requests = InMemoryRequestStore::new();
        let registry = AdvisorRegistry::new(&advisors, &requests);
        let advisor = registry.create(input("busy@example.com")).await.unwrap();

        requests.store(request_for(advisor.id, RequestStatus::Assigned)).await.unwrap();
        requests.store(request_for(advisor.id, RequestStatus::Pending)).await.unwrap();
        requests.store(request_for(advisor.id, RequestStatus::Completed)).await.unwrap();

        let result = registry.delete(advisor.id).await;
        assert!(matches!(
            result,
            Err(BuddyError::AdvisorHasActiveRequests { count: 2 })
        ));
        assert_eq!(registry.get(advisor.id).await.unwrap(), advisor);
    }

    #[tokio::test]
    async fn test_delete_with_only_terminal_requests() {
        let advisors = InMemoryAdvisorStore::new();
        let requests = InMemoryRequestStore::new();
        let registry = AdvisorRegistry::new(&advisors, &requests);
        let advisor = registry.create(input("done@example.com")).await.unwrap();
        requests.store(request_for(advisor.id, RequestStatus::Cancelled)).await.unwrap();

        registry.delete(advisor.id).await.unwrap();
        assert!(matches!(
            registry.get(advisor.id).await,
            Err(BuddyError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_detail_includes_requests() {
        let advisors = InMemoryAdvisorStore::new();
        let requests = InMemoryRequestStore::new();
        let registry = AdvisorRegistry::new(&advisors, &requests);
        let advisor = registry.create(input("detail@example.com")).await.unwrap();
        requests.store(request_for(advisor.id, RequestStatus::Assigned)).await.unwrap();
        requests.store(request_for(Uuid::new_v4(), RequestStatus::Assigned)).await.unwrap();

        let detail = registry.get_with_requests(advisor.id).await.unwrap();
        assert_eq!(detail.requests.len(), 1);
    }
}
