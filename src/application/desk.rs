use super::assignment::AssignmentEngine;
use super::lifecycle::RequestLifecycle;
use super::payment::PaymentBridge;
use super::registry::AdvisorRegistry;
use crate::domain::ports::{AdvisorStoreBox, PaymentStoreBox, RequestStoreBox};
use crate::infrastructure::in_memory::{
    InMemoryAdvisorStore, InMemoryPaymentStore, InMemoryRequestStore,
};

/// Settings the payment bridge needs.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    /// Shared secret used to verify gateway callback signatures.
    pub secret: String,
    pub currency: String,
}

/// The entry point for every booking operation.
pub struct BuddyDesk {
    advisors: AdvisorStoreBox,
    requests: RequestStoreBox,
    payments: PaymentStoreBox,
    settings: PaymentSettings,
}

impl BuddyDesk {
    /// Creates a new `BuddyDesk` over the given stores.
    ///
    /// # Arguments
    ///
    /// * `advisors` - The store for advisor records.
    /// * `requests` - The store for buddy requests.
    /// * `payments` - The store for payments.
    /// * `settings` - Payment secret and currency.
    pub fn new(
        advisors: AdvisorStoreBox,
        requests: RequestStoreBox,
        payments: PaymentStoreBox,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            advisors,
            requests,
            payments,
            settings,
        }
    }

    /// A desk backed entirely by in-memory stores.
    pub fn in_memory(settings: PaymentSettings) -> Self {
        Self::new(
            Box::new(InMemoryAdvisorStore::new()),
            Box::new(InMemoryRequestStore::new()),
            Box::new(InMemoryPaymentStore::new()),
            settings,
        )
    }

    pub fn registry(&self) -> AdvisorRegistry<'_> {
        AdvisorRegistry::new(self.advisors.as_ref(), self.requests.as_ref())
    }

    pub fn assignment(&self) -> AssignmentEngine<'_> {
        AssignmentEngine::new(self.advisors.as_ref(), self.requests.as_ref())
    }

    pub fn lifecycle(&self) -> RequestLifecycle<'_> {
        RequestLifecycle::new(self.advisors.as_ref(), self.requests.as_ref())
    }

    pub fn payments(&self) -> PaymentBridge<'_> {
        PaymentBridge::new(
            self.advisors.as_ref(),
            self.requests.as_ref(),
            self.payments.as_ref(),
            &self.settings.secret,
            &self.settings.currency,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::intake::BookingForm;
    use crate::domain::advisor::NewAdvisor;
    use chrono::NaiveDate;

    fn settings() -> PaymentSettings {
        PaymentSettings {
            secret: "s3cret".to_string(),
            currency: "INR".to_string(),
        }
    }

    #[tokio::test]
    async fn test_views_share_the_same_stores() {
        let desk = BuddyDesk::in_memory(settings());
        let advisor = desk
            .registry()
            .create(NewAdvisor {
                name: "Ines".to_string(),
                email: "ines@example.com".to_string(),
                phone: None,
                scheduling_link: "https://cal.example.com/ines".to_string(),
                active: true,
            })
            .await
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(desk.assignment().select(date, "14:00").await.unwrap().id, advisor.id);

        desk.lifecycle()
            .book(BookingForm {
                request_type: "free".to_string(),
                name: "Jo".to_string(),
                email: "jo@example.com".to_string(),
                phone: None,
                date: "2024-01-10".to_string(),
                time_slot: "14:00".to_string(),
                communication_mode: "video".to_string(),
                message: "Talk through a job offer".to_string(),
                extra_info: None,
                acknowledged: true,
            })
            .await
            .unwrap();

        let detail = desk.registry().get_with_requests(advisor.id).await.unwrap();
        assert_eq!(detail.requests.len(), 1);
    }

    #[tokio::test]
    async fn test_desk_is_send_and_sync() {
        let desk = std::sync::Arc::new(BuddyDesk::in_memory(settings()));
        let handle = tokio::spawn({
            let desk = desk.clone();
            async move { desk.registry().list(None).await.unwrap().len() }
        });
        assert_eq!(handle.await.unwrap(), 0);
    }
}
