use crate::error::{BuddyError, FieldError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An advisor ("buddy") that requests can be assigned to.
///
/// Advisors are deactivated rather than deleted while they still carry
/// outstanding requests; see `AdvisorRegistry::delete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisor {
    pub id: Uuid,
    pub name: String,
    /// Unique across advisors. Stored lowercased and trimmed.
    pub email: String,
    pub phone: Option<String>,
    /// Booking link handed to requesters when they get assigned.
    pub scheduling_link: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an advisor.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAdvisor {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub scheduling_link: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvisorUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub scheduling_link: Option<String>,
    pub active: Option<bool>,
}

impl Advisor {
    pub fn new(input: NewAdvisor) -> Result<Self> {
        let mut errors = Vec::new();
        let name = required("name", &input.name, &mut errors);
        let email = check_email("email", &input.email, &mut errors);
        let scheduling_link = check_link("scheduling_link", &input.scheduling_link, &mut errors);
        if !errors.is_empty() {
            return Err(BuddyError::Validation(errors));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            email,
            phone: normalize_optional(input.phone),
            scheduling_link,
            active: input.active,
            created_at: Utc::now(),
        })
    }

    /// Applies a partial update in place, validating every provided field.
    pub fn apply(&mut self, update: AdvisorUpdate) -> Result<()> {
        let mut errors = Vec::new();
        let name = update.name.map(|n| required("name", &n, &mut errors));
        let email = update.email.map(|e| check_email("email", &e, &mut errors));
        let link = update
            .scheduling_link
            .map(|l| check_link("scheduling_link", &l, &mut errors));
        if !errors.is_empty() {
            return Err(BuddyError::Validation(errors));
        }

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(link) = link {
            self.scheduling_link = link;
        }
        if update.phone.is_some() {
            self.phone = normalize_optional(update.phone);
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        Ok(())
    }
}

pub(crate) fn required(field: &str, value: &str, errors: &mut Vec<FieldError>) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
    }
    trimmed.to_string()
}

pub(crate) fn check_email(field: &str, value: &str, errors: &mut Vec<FieldError>) -> String {
    let email = normalize_email(value);
    if !is_valid_email(&email) {
        errors.push(FieldError::new(field, "must be a valid email address"));
    }
    email
}

fn check_link(field: &str, value: &str, errors: &mut Vec<FieldError>) -> String {
    let link = value.trim();
    let has_scheme = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_scheme {
        errors.push(FieldError::new(field, "must be an http(s) URL"));
    }
    link.to_string()
}

pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewAdvisor {
        NewAdvisor {
            name: " Asha ".to_string(),
            email: "Asha@Example.com ".to_string(),
            phone: Some("  ".to_string()),
            scheduling_link: "https://cal.example.com/asha".to_string(),
            active: true,
        }
    }

    #[test]
    fn test_new_advisor_normalizes_fields() {
        let advisor = Advisor::new(input()).unwrap();
        assert_eq!(advisor.name, "Asha");
        assert_eq!(advisor.email, "asha@example.com");
        assert_eq!(advisor.phone, None);
        assert!(advisor.active);
    }

    #[test]
    fn test_new_advisor_reports_every_bad_field() {
        let mut bad = input();
        bad.name = "".to_string();
        bad.email = "not-an-email".to_string();
        bad.scheduling_link = "cal.example.com".to_string();

        match Advisor::new(bad) {
            Err(BuddyError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email", "scheduling_link"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_apply_partial_update() {
        let mut advisor = Advisor::new(input()).unwrap();
        advisor
            .apply(AdvisorUpdate {
                active: Some(false),
                scheduling_link: Some("https://cal.example.com/asha-2".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert!(!advisor.active);
        assert_eq!(advisor.scheduling_link, "https://cal.example.com/asha-2");
        assert_eq!(advisor.email, "asha@example.com");
    }

    #[test]
    fn test_apply_rejects_invalid_email_without_mutating() {
        let mut advisor = Advisor::new(input()).unwrap();
        let before = advisor.clone();
        let result = advisor.apply(AdvisorUpdate {
            name: Some("New".to_string()),
            email: Some("broken@".to_string()),
            ..Default::default()
        });

        assert!(matches!(result, Err(BuddyError::Validation(_))));
        assert_eq!(advisor, before);
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@b.io"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.io"));
        assert!(!is_valid_email("a@@b.io"));
        assert!(!is_valid_email("a b@c.io"));
    }
}
