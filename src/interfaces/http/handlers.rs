use super::AppState;
use crate::application::intake::BookingForm;
use crate::domain::advisor::{AdvisorUpdate, NewAdvisor};
use crate::domain::page::{DEFAULT_PAGE_SIZE, PageRequest};
use crate::domain::payment::Amount;
use crate::domain::request::{RequestFilter, RequestStatus, RequestType};
use crate::error::Result;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

type Shared = State<Arc<AppState>>;

#[derive(Deserialize)]
pub struct ActiveQuery {
    active: Option<bool>,
}

#[derive(Deserialize)]
pub struct RequestListQuery {
    status: Option<RequestStatus>,
    advisor_id: Option<Uuid>,
    #[serde(rename = "type")]
    request_type: Option<RequestType>,
    page: Option<usize>,
    page_size: Option<usize>,
}

#[derive(Deserialize)]
pub struct InitiatePayment {
    amount: Amount,
}

/// Gateway callback body. Accepts the gateway's own field names as aliases.
#[derive(Deserialize)]
pub struct VerifyPayment {
    #[serde(alias = "razorpay_order_id")]
    order_id: String,
    #[serde(alias = "razorpay_payment_id")]
    payment_id: String,
    #[serde(alias = "razorpay_signature")]
    signature: String,
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn book(
    State(state): Shared,
    payload: std::result::Result<Json<BookingForm>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(form) = payload?;
    let booking = state.desk.lifecycle().book(form).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn initiate_payment(
    State(state): Shared,
    id: std::result::Result<Path<Uuid>, PathRejection>,
    payload: std::result::Result<Json<InitiatePayment>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = id?;
    let Json(body) = payload?;
    let payment = state.desk.payments().initiate(id, body.amount).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn verify_payment(
    State(state): Shared,
    payload: std::result::Result<Json<VerifyPayment>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(body) = payload?;
    let confirmation = state
        .desk
        .payments()
        .verify(&body.order_id, &body.payment_id, &body.signature)
        .await?;
    Ok(Json(confirmation))
}

pub async fn list_advisors(
    State(state): Shared,
    query: std::result::Result<Query<ActiveQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    Ok(Json(state.desk.registry().list(query.active).await?))
}

pub async fn get_advisor(
    State(state): Shared,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = id?;
    Ok(Json(state.desk.registry().get_with_requests(id).await?))
}

pub async fn create_advisor(
    State(state): Shared,
    payload: std::result::Result<Json<NewAdvisor>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(input) = payload?;
    let advisor = state.desk.registry().create(input).await?;
    Ok((StatusCode::CREATED, Json(advisor)))
}

pub async fn update_advisor(
    State(state): Shared,
    id: std::result::Result<Path<Uuid>, PathRejection>,
    payload: std::result::Result<Json<AdvisorUpdate>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = id?;
    let Json(update) = payload?;
    Ok(Json(state.desk.registry().update(id, update).await?))
}

pub async fn delete_advisor(
    State(state): Shared,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = id?;
    state.desk.registry().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_requests(
    State(state): Shared,
    query: std::result::Result<Query<RequestListQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let filter = RequestFilter {
        status: query.status,
        advisor_id: query.advisor_id,
        request_type: query.request_type,
    };
    let page = PageRequest::new(
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;
    Ok(Json(state.desk.lifecycle().list(&filter, page).await?))
}

pub async fn get_request(
    State(state): Shared,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = id?;
    Ok(Json(state.desk.lifecycle().get(id).await?))
}

pub async fn cancel_request(
    State(state): Shared,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = id?;
    Ok(Json(state.desk.lifecycle().cancel(id).await?))
}
