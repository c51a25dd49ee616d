use crate::domain::advisor::{Advisor, check_email, normalize_optional, required};
use crate::domain::request::{BuddyRequest, CommunicationMode, RequestStatus, RequestType};
use crate::error::{BuddyError, FieldError, Result};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

pub const MIN_MESSAGE_LEN: usize = 10;
pub const MAX_TIME_SLOT_LEN: usize = 32;

/// Raw booking submission as received from a client.
///
/// Enumerated fields arrive as strings and every field defaults to empty, so
/// bad or missing values are reported per field instead of failing the body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookingForm {
    #[serde(rename = "type")]
    pub request_type: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date: String,
    pub time_slot: String,
    pub communication_mode: String,
    pub message: String,
    pub extra_info: Option<String>,
    pub acknowledged: bool,
}

/// A booking that passed intake and only lacks an advisor.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBooking {
    pub request_type: RequestType,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date: NaiveDate,
    pub time_slot: String,
    pub communication_mode: CommunicationMode,
    pub message: String,
    pub extra_info: Option<String>,
}

impl ValidatedBooking {
    /// Binds the booking to `advisor`, copying its current scheduling link.
    pub fn assign_to(&self, advisor: &Advisor) -> BuddyRequest {
        BuddyRequest {
            id: Uuid::new_v4(),
            request_type: self.request_type,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            date: self.date,
            time_slot: self.time_slot.clone(),
            communication_mode: self.communication_mode,
            message: self.message.clone(),
            extra_info: self.extra_info.clone(),
            status: RequestStatus::Assigned,
            advisor_id: Some(advisor.id),
            scheduling_link: Some(advisor.scheduling_link.clone()),
            created_at: Utc::now(),
        }
    }
}

pub fn validate(form: BookingForm) -> Result<ValidatedBooking> {
    let mut errors = Vec::new();

    let request_type = match form.request_type.trim().to_lowercase().as_str() {
        "free" => Some(RequestType::Free),
        "paid" => Some(RequestType::Paid),
        _ => {
            errors.push(FieldError::new("type", "must be one of: free, paid"));
            None
        }
    };
    let communication_mode = match form.communication_mode.trim().to_lowercase().as_str() {
        "chat" => Some(CommunicationMode::Chat),
        "call" => Some(CommunicationMode::Call),
        "video" => Some(CommunicationMode::Video),
        _ => {
            errors.push(FieldError::new(
                "communication_mode",
                "must be one of: chat, call, video",
            ));
            None
        }
    };

    let name = required("name", &form.name, &mut errors);
    let email = check_email("email", &form.email, &mut errors);

    let date = NaiveDate::parse_from_str(form.date.trim(), "%Y-%m-%d")
        .map_err(|_| errors.push(FieldError::new("date", "must be a date in YYYY-MM-DD format")))
        .ok();

    let time_slot = required("time_slot", &form.time_slot, &mut errors);
    if time_slot.len() > MAX_TIME_SLOT_LEN {
        errors.push(FieldError::new(
            "time_slot",
            format!("must be at most {} characters", MAX_TIME_SLOT_LEN),
        ));
    }

    let message = form.message.trim().to_string();
    if message.chars().count() < MIN_MESSAGE_LEN {
        errors.push(FieldError::new(
            "message",
            format!("must be at least {} characters", MIN_MESSAGE_LEN),
        ));
    }

    if !form.acknowledged {
        errors.push(FieldError::new("acknowledged", "must be accepted"));
    }

    match (request_type, communication_mode, date) {
        (Some(request_type), Some(communication_mode), Some(date)) if errors.is_empty() => {
            Ok(ValidatedBooking {
                request_type,
                name,
                email,
                phone: normalize_optional(form.phone),
                date,
                time_slot,
                communication_mode,
                message,
                extra_info: normalize_optional(form.extra_info),
            })
        }
        _ => Err(BuddyError::Validation(errors)),
    }
}
