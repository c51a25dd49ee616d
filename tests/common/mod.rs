#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use buddy_desk::application::desk::{BuddyDesk, PaymentSettings};
use buddy_desk::application::intake::BookingForm;
use buddy_desk::domain::advisor::NewAdvisor;
use buddy_desk::interfaces::http::{AppState, build_router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

pub const SECRET: &str = "test-payment-secret";
pub const ADMIN_TOKEN: &str = "test-admin-token";

pub fn settings() -> PaymentSettings {
    PaymentSettings {
        secret: SECRET.to_string(),
        currency: "INR".to_string(),
    }
}

pub fn desk() -> Arc<BuddyDesk> {
    Arc::new(BuddyDesk::in_memory(settings()))
}

pub fn router() -> Router {
    build_router(AppState::new(BuddyDesk::in_memory(settings()), ADMIN_TOKEN))
}

pub fn advisor(name: &str) -> NewAdvisor {
    let slug = name.to_lowercase();
    NewAdvisor {
        name: name.to_string(),
        email: format!("{slug}@example.com"),
        phone: None,
        scheduling_link: format!("https://cal.example.com/{slug}"),
        active: true,
    }
}

pub fn form(request_type: &str, date: &str, time_slot: &str) -> BookingForm {
    BookingForm {
        request_type: request_type.to_string(),
        name: "Jordan".to_string(),
        email: "jordan@example.com".to_string(),
        phone: None,
        date: date.to_string(),
        time_slot: time_slot.to_string(),
        communication_mode: "video".to_string(),
        message: "I would like advice on switching careers".to_string(),
        extra_info: None,
        acknowledged: true,
    }
}

pub fn booking_json(request_type: &str, date: &str, time_slot: &str) -> Value {
    json!({
        "type": request_type,
        "name": "Jordan",
        "email": "jordan@example.com",
        "date": date,
        "time_slot": time_slot,
        "communication_mode": "video",
        "message": "I would like advice on switching careers",
        "acknowledged": true,
    })
}

pub fn advisor_json(name: &str) -> Value {
    let slug = name.to_lowercase();
    json!({
        "name": name,
        "email": format!("{slug}@example.com"),
        "scheduling_link": format!("https://cal.example.com/{slug}"),
    })
}

/// Sends a request through the router and returns the status and JSON body
/// (`Value::Null` for an empty body).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}
