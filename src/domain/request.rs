use crate::error::{BuddyError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    #[default]
    Pending,
    Assigned,
    Completed,
    Cancelled,
}

impl RequestStatus {
    /// Pending and assigned requests occupy their advisor's slot and count
    /// towards the advisor's load.
    pub fn is_outstanding(self) -> bool {
        matches!(self, Self::Pending | Self::Assigned)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Assigned => "ASSIGNED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Free,
    Paid,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationMode {
    Chat,
    Call,
    Video,
}

/// A booked advice session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuddyRequest {
    pub id: Uuid,
    pub request_type: RequestType,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date: NaiveDate,
    pub time_slot: String,
    pub communication_mode: CommunicationMode,
    pub message: String,
    pub extra_info: Option<String>,
    pub status: RequestStatus,
    pub advisor_id: Option<Uuid>,
    /// Copy of the advisor's link taken at booking time. Later edits to the
    /// advisor do not touch it.
    pub scheduling_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BuddyRequest {
    /// True when this request blocks `advisor_id` at `date`/`time_slot`.
    pub fn occupies(&self, advisor_id: Uuid, date: NaiveDate, time_slot: &str) -> bool {
        self.status.is_outstanding()
            && self.advisor_id == Some(advisor_id)
            && self.date == date
            && self.time_slot == time_slot
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.transition(RequestStatus::Cancelled)
    }

    pub fn complete(&mut self) -> Result<()> {
        self.transition(RequestStatus::Completed)
    }

    fn transition(&mut self, to: RequestStatus) -> Result<()> {
        if !self.status.is_outstanding() {
            return Err(BuddyError::InvalidTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }
}

/// Filters for request listings. Unset fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub advisor_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub request_type: Option<RequestType>,
}

impl RequestFilter {
    pub fn matches(&self, request: &BuddyRequest) -> bool {
        self.status.is_none_or(|s| request.status == s)
            && self.advisor_id.is_none_or(|id| request.advisor_id == Some(id))
            && self.request_type.is_none_or(|t| request.request_type == t)
    }
}
